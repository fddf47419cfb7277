//! The JNI side of the bridge.
//!
//! A library using this crate calls [`on_load`] from its `JNI_OnLoad` to
//! create the process-wide [`Bridge`] and register the native methods of its
//! activity class:
//!
//! ```no_run
//! # use std::ffi::c_void;
//! # use jni::{sys::{jint, JNI_ERR, JNI_VERSION_1_6}, JavaVM};
//! # fn create_engine() -> Box<dyn activity_bridge::Engine> { unimplemented!() }
//! #[no_mangle]
//! pub extern "system" fn JNI_OnLoad(vm: JavaVM, _: *mut c_void) -> jint {
//!     match activity_bridge::android::on_load(&vm, "org/example/MainActivity", create_engine) {
//!         Ok(()) => JNI_VERSION_1_6,
//!         Err(_) => JNI_ERR,
//!     }
//! }
//! ```
//!
//! The activity class declares the natives listed in [`natives`] as
//! `private static native` methods and forwards its lifecycle and input
//! callbacks to them, calling `super` itself.

use std::sync::{Arc, Once, OnceLock};

use jni::JavaVM;

use crate::error::{InternalAppError, Result};
use crate::util::redirect_stdio_to_logcat;
use crate::{ActivityDelegate, Bridge, Engine};

mod activity;
mod bundle;
mod host;
mod input;
mod intent;
mod jni_utils;
pub mod natives;

pub use activity::JniActivity;
pub use host::LooperHost;

pub(crate) type JniDelegate = ActivityDelegate<JniActivity>;

/// Logcat tag of the crate's own log records
pub const LOG_TAG: &str = "activity-bridge";

static BRIDGE: OnceLock<Arc<Bridge>> = OnceLock::new();

/// The process-wide bridge, once [`on_load`] ran.
pub fn bridge() -> Option<&'static Arc<Bridge>> {
    BRIDGE.get()
}

/// Initializes logging, creates the process-wide [`Bridge`] and registers the
/// native methods of `activity_class` (e.g. `"org/example/MainActivity"`).
///
/// The engine is only created the first time this is called.
pub fn on_load(
    vm: &JavaVM,
    activity_class: &str,
    create_engine: impl FnOnce() -> Box<dyn Engine>,
) -> Result<()> {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Trace)
            .with_tag(LOG_TAG),
    );
    static REDIRECT_STDIO: Once = Once::new();
    REDIRECT_STDIO.call_once(redirect_stdio_to_logcat);

    BRIDGE.get_or_init(|| Bridge::new(create_engine()));

    let mut env = vm.get_env().map_err(InternalAppError::from)?;
    natives::register(&mut env, activity_class)?;
    log::info!("Registered native methods on {activity_class}");
    Ok(())
}
