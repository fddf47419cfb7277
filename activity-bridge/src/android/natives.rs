//! Native methods registered on the activity class.
//!
//! | Java declaration | Signature |
//! |---|---|
//! | `long nativeCreate(Activity activity)` | `(Landroid/app/Activity;)J` |
//! | `boolean nativeLoadApplication(long handle, Bundle loaderParams)` | `(JLandroid/os/Bundle;)Z` |
//! | `boolean nativeStartApplication(long handle)` | `(J)Z` |
//! | `void nativeOnCreate(long handle, Bundle savedInstanceState)` | `(JLandroid/os/Bundle;)V` |
//! | `void nativeOnResume(long handle)` | `(J)V` |
//! | `void nativeOnPause(long handle)` | `(J)V` |
//! | `void nativeOnTerminate(long handle)` | `(J)V` |
//! | `void nativeOnRetainNonConfigurationInstance(long handle)` | `(J)V` |
//! | `boolean nativeOnDestroy(long handle)` | `(J)Z` |
//! | `void nativeOnSaveInstanceState(long handle, Bundle outState)` | `(JLandroid/os/Bundle;)V` |
//! | `void nativeOnRestoreInstanceState(long handle, Bundle savedInstanceState)` | `(JLandroid/os/Bundle;)V` |
//! | `boolean nativeOnKeyDown(long handle, int keyCode, KeyEvent event)` | `(JILandroid/view/KeyEvent;)Z` |
//! | `boolean nativeOnKeyUp(long handle, int keyCode, KeyEvent event)` | `(JILandroid/view/KeyEvent;)Z` |
//! | `boolean nativeDispatchKeyEvent(long handle, KeyEvent event)` | `(JLandroid/view/KeyEvent;)Z` |
//! | `void nativeSendTouchEvent(long handle, int windowId, MotionEvent event)` | `(JILandroid/view/MotionEvent;)V` |
//! | `void nativeSendTrackballEvent(long handle, int windowId, MotionEvent event)` | `(JILandroid/view/MotionEvent;)V` |
//! | `void nativeSetDisplayMetrics(long handle, int screenWidth, int screenHeight, int desktopWidth, int desktopHeight, double xdpi, double ydpi)` | `(JIIIIDD)V` |
//! | `void nativeSetSurface(long handle, Surface surface)` | `(JLandroid/view/Surface;)V` |
//! | `void nativeDestroySurface(long handle)` | `(J)V` |
//!
//! `nativeCreate` is called from `onCreate` before anything else and returns
//! the handle every other method takes. `nativeOnDestroy` releases the handle
//! and returns whether the process should exit.
//!
//! The activity's `SurfaceHolder.Callback` calls `nativeSetSurface` from
//! `surfaceCreated` and `surfaceChanged`, and `nativeDestroySurface` from
//! `surfaceDestroyed`.

use std::ffi::c_void;
use std::sync::{Arc, Mutex};

use jni::{
    objects::{JClass, JObject},
    JNIEnv, NativeMethod,
};
use jni_sys::{jboolean, jdouble, jint, jlong, JNI_FALSE, JNI_TRUE};
use ndk::native_window::NativeWindow;

use super::bundle;
use super::input::{event_meta_state, key_event_characters, key_input, motion_snapshot, KEY_ACTION_MULTIPLE};
use super::jni_utils::{clear_and_map_exception_to_err, log_jni_error};
use super::{JniActivity, JniDelegate, LooperHost};
use crate::error::{AppError, InternalResult, Result};
use crate::util::abort_on_panic;
use crate::{ActivityDelegate, Bundle, DisplayMetrics, Surface};

struct NativeHandle {
    delegate: Arc<JniDelegate>,
    host: Arc<LooperHost>,
    /// Keeps the window handed to the engine acquired
    window: Mutex<Option<NativeWindow>>,
}

impl NativeHandle {
    fn destroy_surface(&self) {
        let mut window = self.window.lock().unwrap();
        if window.is_some() {
            self.delegate.bridge().destroy_surface();
            *window = None;
        }
    }
}

/// The handle whose activity is currently published through `ndk_context`
static CONTEXT_OWNER: Mutex<Option<jlong>> = Mutex::new(None);

fn native(name: &str, sig: &str, fn_ptr: *mut c_void) -> NativeMethod {
    NativeMethod {
        name: name.into(),
        sig: sig.into(),
        fn_ptr,
    }
}

pub(crate) fn register(env: &mut JNIEnv, activity_class: &str) -> InternalResult<()> {
    let methods = [
        native("nativeCreate", "(Landroid/app/Activity;)J", native_create as *mut c_void),
        native(
            "nativeLoadApplication",
            "(JLandroid/os/Bundle;)Z",
            native_load_application as *mut c_void,
        ),
        native("nativeStartApplication", "(J)Z", native_start_application as *mut c_void),
        native("nativeOnCreate", "(JLandroid/os/Bundle;)V", native_on_create as *mut c_void),
        native("nativeOnResume", "(J)V", native_on_resume as *mut c_void),
        native("nativeOnPause", "(J)V", native_on_pause as *mut c_void),
        native("nativeOnTerminate", "(J)V", native_on_terminate as *mut c_void),
        native(
            "nativeOnRetainNonConfigurationInstance",
            "(J)V",
            native_on_retain_non_configuration_instance as *mut c_void,
        ),
        native("nativeOnDestroy", "(J)Z", native_on_destroy as *mut c_void),
        native(
            "nativeOnSaveInstanceState",
            "(JLandroid/os/Bundle;)V",
            native_on_save_instance_state as *mut c_void,
        ),
        native(
            "nativeOnRestoreInstanceState",
            "(JLandroid/os/Bundle;)V",
            native_on_restore_instance_state as *mut c_void,
        ),
        native("nativeOnKeyDown", "(JILandroid/view/KeyEvent;)Z", native_on_key_down as *mut c_void),
        native("nativeOnKeyUp", "(JILandroid/view/KeyEvent;)Z", native_on_key_up as *mut c_void),
        native(
            "nativeDispatchKeyEvent",
            "(JLandroid/view/KeyEvent;)Z",
            native_dispatch_key_event as *mut c_void,
        ),
        native(
            "nativeSendTouchEvent",
            "(JILandroid/view/MotionEvent;)V",
            native_send_touch_event as *mut c_void,
        ),
        native(
            "nativeSendTrackballEvent",
            "(JILandroid/view/MotionEvent;)V",
            native_send_trackball_event as *mut c_void,
        ),
        native(
            "nativeSetDisplayMetrics",
            "(JIIIIDD)V",
            native_set_display_metrics as *mut c_void,
        ),
        native(
            "nativeSetSurface",
            "(JLandroid/view/Surface;)V",
            native_set_surface as *mut c_void,
        ),
        native("nativeDestroySurface", "(J)V", native_destroy_surface as *mut c_void),
    ];

    env.register_native_methods(activity_class, &methods)
        .map_err(|err| clear_and_map_exception_to_err(env, err))
}

fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// Runs `f` with the handle's state, or returns `default` for a null handle.
fn with_handle<R>(handle: jlong, default: R, f: impl FnOnce(&NativeHandle) -> R) -> R {
    abort_on_panic(|| {
        if handle == 0 {
            log::error!("Native method called without an activity handle");
            return default;
        }
        // Safety: the handle stays valid from nativeCreate until nativeOnDestroy
        let handle = unsafe { &*(handle as *const NativeHandle) };
        f(handle)
    })
}

fn create_handle(env: &mut JNIEnv, activity: &JObject) -> Result<jlong> {
    let bridge = super::bridge()
        .ok_or_else(|| AppError::JavaError("activity created before on_load".to_owned()))?
        .clone();

    let activity = JniActivity::new(env, activity)?;
    let vm = activity.jvm().get_java_vm_pointer();
    let context = activity.object().as_raw();

    let delegate = Arc::new(ActivityDelegate::new(bridge, activity));
    let host = LooperHost::new(Arc::downgrade(&delegate))?;
    let handle = Box::into_raw(Box::new(NativeHandle {
        delegate,
        host,
        window: Mutex::new(None),
    })) as jlong;

    let mut owner = CONTEXT_OWNER.lock().unwrap();
    unsafe {
        if owner.is_some() {
            ndk_context::release_android_context();
        }
        ndk_context::initialize_android_context(vm.cast(), context.cast());
    }
    *owner = Some(handle);

    Ok(handle)
}

extern "system" fn native_create<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    activity: JObject<'local>,
) -> jlong {
    abort_on_panic(|| match create_handle(&mut env, &activity) {
        Ok(handle) => handle,
        Err(err) => {
            log::error!("Failed to create activity delegate: {err}");
            0
        }
    })
}

extern "system" fn native_load_application<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    loader_params: JObject<'local>,
) -> jboolean {
    with_handle(handle, JNI_FALSE, |handle| {
        let params = match bundle::from_java(&mut env, &loader_params) {
            Ok(params) => params,
            Err(err) => {
                log_jni_error(&mut env, "Failed to read loader parameters", err);
                return JNI_FALSE;
            }
        };
        match handle.delegate.load_application(handle.host.clone(), &params) {
            Ok(()) => JNI_TRUE,
            Err(err) => {
                log::error!("Failed to load application: {err}");
                JNI_FALSE
            }
        }
    })
}

extern "system" fn native_start_application<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
) -> jboolean {
    with_handle(handle, JNI_FALSE, |handle| {
        to_jboolean(handle.delegate.start_application())
    })
}

/// Converts a saved instance state, which is null when there is none.
fn saved_state(env: &mut JNIEnv, saved: &JObject) -> Option<Bundle> {
    if saved.is_null() {
        return None;
    }
    match bundle::from_java(env, saved) {
        Ok(bundle) => Some(bundle),
        Err(err) => {
            log_jni_error(env, "Failed to read saved instance state", err);
            Some(Bundle::new())
        }
    }
}

extern "system" fn native_on_create<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    saved_instance_state: JObject<'local>,
) {
    with_handle(handle, (), |handle| {
        let saved = saved_state(&mut env, &saved_instance_state);
        handle.delegate.on_create(saved.as_ref());
    })
}

extern "system" fn native_on_resume<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
) {
    with_handle(handle, (), |handle| handle.delegate.on_resume())
}

extern "system" fn native_on_pause<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
) {
    with_handle(handle, (), |handle| handle.delegate.on_pause())
}

extern "system" fn native_on_terminate<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
) {
    with_handle(handle, (), |handle| handle.delegate.on_terminate())
}

extern "system" fn native_on_retain_non_configuration_instance<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
) {
    with_handle(handle, (), |handle| {
        handle.delegate.on_retain_non_configuration_instance()
    })
}

extern "system" fn native_on_destroy<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
) -> jboolean {
    abort_on_panic(|| {
        if handle == 0 {
            return JNI_FALSE;
        }
        // Safety: the handle was created by nativeCreate and Java doesn't use
        // it after this call
        let native_handle = unsafe { Box::from_raw(handle as *mut NativeHandle) };
        native_handle.destroy_surface();
        let quit = native_handle.delegate.on_destroy();

        let mut owner = CONTEXT_OWNER.lock().unwrap();
        if *owner == Some(handle) {
            unsafe { ndk_context::release_android_context() };
            *owner = None;
        }
        drop(owner);

        // Drops the looper host on the main thread that created it
        drop(native_handle);
        to_jboolean(quit)
    })
}

extern "system" fn native_on_save_instance_state<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    out_state: JObject<'local>,
) {
    with_handle(handle, (), |handle| {
        let mut state = Bundle::new();
        handle.delegate.on_save_instance_state(&mut state);
        if let Err(err) = bundle::put_into(&mut env, &state, &out_state) {
            log_jni_error(&mut env, "Failed to save instance state", err);
        }
    })
}

extern "system" fn native_on_restore_instance_state<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    saved_instance_state: JObject<'local>,
) {
    with_handle(handle, (), |handle| {
        if let Some(saved) = saved_state(&mut env, &saved_instance_state) {
            handle.delegate.on_restore_instance_state(&saved);
        }
    })
}

extern "system" fn native_on_key_down<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    key_code: jint,
    event: JObject<'local>,
) -> jboolean {
    with_handle(handle, JNI_FALSE, |handle| {
        match key_input(&mut env, key_code, &event) {
            Ok(key) => to_jboolean(handle.delegate.on_key_down(&key)),
            Err(err) => {
                log_jni_error(&mut env, "Failed to read key event", err);
                JNI_FALSE
            }
        }
    })
}

extern "system" fn native_on_key_up<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    key_code: jint,
    event: JObject<'local>,
) -> jboolean {
    with_handle(handle, JNI_FALSE, |handle| {
        match key_input(&mut env, key_code, &event) {
            Ok(key) => to_jboolean(handle.delegate.on_key_up(&key)),
            Err(err) => {
                log_jni_error(&mut env, "Failed to read key event", err);
                JNI_FALSE
            }
        }
    })
}

extern "system" fn native_dispatch_key_event<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    event: JObject<'local>,
) -> jboolean {
    with_handle(handle, JNI_FALSE, |handle| {
        let read = key_event_characters(&mut env, &event)
            .and_then(|characters| Ok((characters, event_meta_state(&mut env, &event)?)));
        match read {
            Ok(((KEY_ACTION_MULTIPLE, key_code, Some(characters)), meta_state)) => to_jboolean(
                handle
                    .delegate
                    .dispatch_key_multiple(key_code, &characters, meta_state),
            ),
            Ok(_) => JNI_FALSE,
            Err(err) => {
                log_jni_error(&mut env, "Failed to read key event", err);
                JNI_FALSE
            }
        }
    })
}

extern "system" fn native_send_touch_event<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    window_id: jint,
    event: JObject<'local>,
) {
    with_handle(handle, (), |handle| match motion_snapshot(&mut env, &event) {
        Ok(snapshot) => handle
            .delegate
            .bridge()
            .send_touch_event(window_id, &snapshot),
        Err(err) => log_jni_error(&mut env, "Failed to read touch event", err),
    })
}

extern "system" fn native_send_trackball_event<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    window_id: jint,
    event: JObject<'local>,
) {
    with_handle(handle, (), |handle| match motion_snapshot(&mut env, &event) {
        Ok(snapshot) => handle
            .delegate
            .bridge()
            .send_trackball_event(window_id, &snapshot),
        Err(err) => log_jni_error(&mut env, "Failed to read trackball event", err),
    })
}

#[allow(clippy::too_many_arguments)]
extern "system" fn native_set_display_metrics<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    screen_width: jint,
    screen_height: jint,
    desktop_width: jint,
    desktop_height: jint,
    x_dpi: jdouble,
    y_dpi: jdouble,
) {
    with_handle(handle, (), |handle| {
        handle.delegate.bridge().set_display_metrics(DisplayMetrics {
            screen_width,
            screen_height,
            desktop_width,
            desktop_height,
            x_dpi,
            y_dpi,
        })
    })
}

extern "system" fn native_set_surface<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    surface: JObject<'local>,
) {
    with_handle(handle, (), |handle| {
        if surface.is_null() {
            handle.destroy_surface();
            return;
        }
        // Safety: `surface` is a live `android.view.Surface` reference
        let window = unsafe { NativeWindow::from_surface(env.get_raw(), surface.as_raw()) };
        let Some(window) = window else {
            log::error!("Surface has no native window");
            return;
        };
        // Safety: the window stays acquired until the engine is given another
        // one or told to destroy it
        let engine_surface =
            unsafe { Surface::from_ptr(window.ptr().cast(), window.width(), window.height()) };

        let mut current = handle.window.lock().unwrap();
        handle.delegate.bridge().set_surface(engine_surface);
        // Any previous window is released once the engine switched over
        *current = Some(window);
    })
}

extern "system" fn native_destroy_surface<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
) {
    with_handle(handle, (), |handle| handle.destroy_surface())
}
