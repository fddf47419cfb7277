use std::path::PathBuf;

use jni::{
    errors::Result as JniResult,
    objects::{GlobalRef, JObject, JValue},
    JNIEnv,
};

use super::bundle;
use super::intent::{Action, Intent};
use super::jni_utils::{java_string, CloneJavaVM};
use crate::error::{InternalAppError, Result};
use crate::input::SoftKeyboardRequest;
use crate::{Activity, Bundle, DisplayMetrics, Rect};

// android.view.WindowManager.LayoutParams
const FLAG_FULLSCREEN: i32 = 0x400;
const FLAG_FORCE_NOT_FULLSCREEN: i32 = 0x800;
const SOFT_INPUT_STATE_UNCHANGED: i32 = 0x1;
const SOFT_INPUT_ADJUST_RESIZE: i32 = 0x10;
const SOFT_INPUT_ADJUST_PAN: i32 = 0x20;

/// `Context.INPUT_METHOD_SERVICE`
const INPUT_METHOD_SERVICE: &str = "input_method";

/// An `android.app.Activity` reached over JNI
#[derive(Debug, Clone)]
pub struct JniActivity {
    jvm: CloneJavaVM,
    activity: GlobalRef,
}

impl JniActivity {
    pub(crate) fn new(env: &mut JNIEnv, activity: &JObject) -> crate::Result<Self> {
        let jvm = CloneJavaVM::from_env(env)?;
        let activity = env
            .new_global_ref(activity)
            .map_err(InternalAppError::from)?;
        Ok(Self { jvm, activity })
    }

    pub(crate) fn jvm(&self) -> &CloneJavaVM {
        &self.jvm
    }

    pub(crate) fn object(&self) -> &JObject<'static> {
        self.activity.as_obj()
    }

    fn call<T>(&self, f: impl FnOnce(&mut JNIEnv, &JObject) -> JniResult<T>) -> Result<T> {
        let activity = self.activity.as_obj();
        self.jvm.with_env(|env| f(env, activity))
    }
}

fn window<'local>(env: &mut JNIEnv<'local>, activity: &JObject) -> JniResult<JObject<'local>> {
    env.call_method(activity, "getWindow", "()Landroid/view/Window;", &[])?.l()
}

fn decor_view<'local>(env: &mut JNIEnv<'local>, activity: &JObject) -> JniResult<JObject<'local>> {
    let window = window(env, activity)?;
    env.call_method(&window, "getDecorView", "()Landroid/view/View;", &[])?.l()
}

/// The `InputMethodManager`, which may be null.
fn input_method_manager<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
) -> JniResult<JObject<'local>> {
    let name = env.new_string(INPUT_METHOD_SERVICE)?;
    env.call_method(
        activity,
        "getSystemService",
        "(Ljava/lang/String;)Ljava/lang/Object;",
        &[JValue::Object(&name)],
    )?
    .l()
}

fn application_info_dir(env: &mut JNIEnv, activity: &JObject, field: &str) -> JniResult<PathBuf> {
    let info = env
        .call_method(
            activity,
            "getApplicationInfo",
            "()Landroid/content/pm/ApplicationInfo;",
            &[],
        )?
        .l()?;
    let dir = env.get_field(&info, field, "Ljava/lang/String;")?.l()?;
    Ok(PathBuf::from(java_string(env, dir)?.unwrap_or_default()))
}

fn call_void(env: &mut JNIEnv, activity: &JObject, method: &str) -> JniResult<()> {
    env.call_method(activity, method, "()V", &[])?;
    Ok(())
}

impl Activity for JniActivity {
    fn display_metrics(&self) -> Result<DisplayMetrics> {
        self.call(|env, activity| {
            let window_manager = env
                .call_method(
                    activity,
                    "getWindowManager",
                    "()Landroid/view/WindowManager;",
                    &[],
                )?
                .l()?;
            let display = env
                .call_method(
                    &window_manager,
                    "getDefaultDisplay",
                    "()Landroid/view/Display;",
                    &[],
                )?
                .l()?;
            let metrics = env.new_object("android/util/DisplayMetrics", "()V", &[])?;
            env.call_method(
                &display,
                "getMetrics",
                "(Landroid/util/DisplayMetrics;)V",
                &[JValue::Object(&metrics)],
            )?;

            let width = env.get_field(&metrics, "widthPixels", "I")?.i()?;
            let height = env.get_field(&metrics, "heightPixels", "I")?.i()?;
            let x_dpi = env.get_field(&metrics, "xdpi", "F")?.f()?;
            let y_dpi = env.get_field(&metrics, "ydpi", "F")?.f()?;
            Ok(DisplayMetrics::new(width, height, x_dpi as f64, y_dpi as f64))
        })
    }

    fn set_full_screen(&self, full_screen: bool) -> Result<()> {
        let (add, clear) = if full_screen {
            (FLAG_FULLSCREEN, FLAG_FORCE_NOT_FULLSCREEN)
        } else {
            (FLAG_FORCE_NOT_FULLSCREEN, FLAG_FULLSCREEN)
        };
        self.call(|env, activity| {
            let window = window(env, activity)?;
            env.call_method(&window, "addFlags", "(I)V", &[JValue::Int(add)])?;
            env.call_method(&window, "clearFlags", "(I)V", &[JValue::Int(clear)])?;
            Ok(())
        })
    }

    fn redraw_window(&self, rect: Rect) -> Result<()> {
        self.call(|env, activity| {
            let view = decor_view(env, activity)?;
            env.call_method(
                &view,
                "invalidate",
                "(IIII)V",
                &[
                    JValue::Int(rect.left),
                    JValue::Int(rect.top),
                    JValue::Int(rect.right),
                    JValue::Int(rect.bottom),
                ],
            )?;
            Ok(())
        })
    }

    /// Focuses the decor view and shows the keyboard for it, then restarts
    /// input so the keyboard picks up the engine's field.
    ///
    /// The field's position and width are not used: the decor view stands in
    /// for the field and only the height decides whether the window is resized
    /// or panned.
    fn show_soft_keyboard(&self, request: &SoftKeyboardRequest) -> Result<()> {
        let field_height = request.rect.height();
        self.call(|env, activity| {
            let imm = input_method_manager(env, activity)?;
            if imm.is_null() {
                log::warn!("No input method manager, can't show the soft keyboard");
                return Ok(());
            }

            let view = decor_view(env, activity)?;
            let view_height = env.call_method(&view, "getHeight", "()I", &[])?.i()?;
            // Tall input fields resize the window, others pan it
            let mode = if field_height > view_height * 2 / 3 {
                SOFT_INPUT_STATE_UNCHANGED | SOFT_INPUT_ADJUST_RESIZE
            } else {
                SOFT_INPUT_STATE_UNCHANGED | SOFT_INPUT_ADJUST_PAN
            };
            let window = window(env, activity)?;
            env.call_method(&window, "setSoftInputMode", "(I)V", &[JValue::Int(mode)])?;

            env.call_method(&view, "requestFocus", "()Z", &[])?;
            env.call_method(
                &imm,
                "showSoftInput",
                "(Landroid/view/View;I)Z",
                &[JValue::Object(&view), JValue::Int(0)],
            )?;
            env.call_method(
                &imm,
                "restartInput",
                "(Landroid/view/View;)V",
                &[JValue::Object(&view)],
            )?;
            Ok(())
        })
    }

    fn reset_soft_keyboard(&self) -> Result<()> {
        self.call(|env, activity| {
            let imm = input_method_manager(env, activity)?;
            if imm.is_null() {
                return Ok(());
            }
            let view = decor_view(env, activity)?;
            env.call_method(
                &imm,
                "restartInput",
                "(Landroid/view/View;)V",
                &[JValue::Object(&view)],
            )?;
            Ok(())
        })
    }

    fn hide_soft_keyboard(&self) -> Result<()> {
        self.call(|env, activity| {
            let imm = input_method_manager(env, activity)?;
            if imm.is_null() {
                return Ok(());
            }
            let view = decor_view(env, activity)?;
            let token = env
                .call_method(&view, "getWindowToken", "()Landroid/os/IBinder;", &[])?
                .l()?;
            env.call_method(
                &imm,
                "hideSoftInputFromWindow",
                "(Landroid/os/IBinder;I)Z",
                &[JValue::Object(&token), JValue::Int(0)],
            )?;
            Ok(())
        })
    }

    fn open_options_menu(&self) -> Result<()> {
        self.call(|env, activity| call_void(env, activity, "openOptionsMenu"))
    }

    fn close_options_menu(&self) -> Result<()> {
        self.call(|env, activity| call_void(env, activity, "closeOptionsMenu"))
    }

    fn open_context_menu(&self) -> Result<()> {
        self.call(|env, activity| {
            let view = decor_view(env, activity)?;
            let args = [JValue::Object(&view)];
            env.call_method(activity, "registerForContextMenu", "(Landroid/view/View;)V", &args)?;
            env.call_method(activity, "openContextMenu", "(Landroid/view/View;)V", &args)?;
            Ok(())
        })
    }

    fn close_context_menu(&self) -> Result<()> {
        self.call(|env, activity| call_void(env, activity, "closeContextMenu"))
    }

    fn open_url(&self, url: &str) -> Result<()> {
        self.call(|env, activity| {
            Intent::new_with_uri(env, Action::View, url)?.start_activity(env, activity)
        })
    }

    fn finish(&self) -> Result<()> {
        self.call(|env, activity| call_void(env, activity, "finish"))
    }

    fn dead_char(&self, accent: u32, base: u32) -> Result<u32> {
        self.call(|env, _activity| {
            let composed = env
                .call_static_method(
                    "android/view/KeyEvent",
                    "getDeadChar",
                    "(II)I",
                    &[JValue::Int(accent as i32), JValue::Int(base as i32)],
                )?
                .i()?;
            Ok(composed as u32)
        })
    }

    fn files_dir(&self) -> Result<PathBuf> {
        self.call(|env, activity| {
            let dir = env
                .call_method(activity, "getFilesDir", "()Ljava/io/File;", &[])?
                .l()?;
            let path = env
                .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])?
                .l()?;
            Ok(PathBuf::from(java_string(env, path)?.unwrap_or_default()))
        })
    }

    fn data_dir(&self) -> Result<PathBuf> {
        self.call(|env, activity| application_info_dir(env, activity, "dataDir"))
    }

    fn native_library_dir(&self) -> Result<PathBuf> {
        self.call(|env, activity| application_info_dir(env, activity, "nativeLibraryDir"))
    }

    fn intent_extras(&self) -> Result<Bundle> {
        self.call(|env, activity| {
            let intent = env
                .call_method(activity, "getIntent", "()Landroid/content/Intent;", &[])?
                .l()?;
            if intent.is_null() {
                return Ok(Bundle::new());
            }
            let extras = env
                .call_method(&intent, "getExtras", "()Landroid/os/Bundle;", &[])?
                .l()?;
            bundle::from_java(env, &extras)
        })
    }

    fn init_static_classes(&self, class_names: &[String]) {
        for class_name in class_names {
            let result = self.call(|env, activity| {
                let loader = env
                    .call_method(activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])?
                    .l()?;
                let name = env.new_string(class_name)?;
                let class = env
                    .call_method(
                        &loader,
                        "loadClass",
                        "(Ljava/lang/String;)Ljava/lang/Class;",
                        &[JValue::Object(&name)],
                    )?
                    .l()?;
                let class = jni::objects::JClass::from(class);
                let instance = env.new_object(&class, "()V", &[])?;
                env.call_method(
                    &instance,
                    "setActivity",
                    "(Landroid/app/Activity;Ljava/lang/Object;)V",
                    &[JValue::Object(activity), JValue::Object(&JObject::null())],
                )?;
                Ok(())
            });
            if let Err(err) = result {
                log::error!("Failed to initialize static class {class_name}: {err}");
            }
        }
    }
}
