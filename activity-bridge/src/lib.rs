//! Glue between an Android `Activity` and a native application engine.
//!
//! The [`Bridge`] owns the [`Engine`] and forwards activity lifecycle, touch,
//! trackball and key input to it. Requests the engine makes of the activity
//! (repaints, soft keyboard, menus, full screen, opening URLs, quitting) are
//! posted to the attached [`Host`] as [`HostCommand`]s, or kept until an
//! activity attaches if there is none. An [`ActivityDelegate`] ties one
//! activity to the bridge and runs those commands on its main thread.
//!
//! On Android the [`android`] module implements the host and activity over
//! JNI and registers the native methods the Java activity calls.

mod bridge;
mod bundle;
mod config;
mod delegate;
mod engine;
mod error;
mod host;
pub mod input;
mod library;
mod util;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(test)]
mod testing;

pub use bridge::{Bridge, StartRequest};
pub use bundle::{Bundle, BundleValue};
pub use config::{
    append_parameter, DebugOptions, DisplayMetrics, LoaderParams, NativeDebugger,
    DEFAULT_APPLICATION_PARAMETERS, DENSITY_LOW,
};
pub use delegate::{Activity, ActivityDelegate, FULL_SCREEN_STATE_KEY, STARTED_STATE_KEY};
pub use engine::{Engine, Surface};
pub use error::{AppError, Result};
pub use host::{Host, HostCommand};
pub use library::{library_path, load_bundled_libraries, load_libraries, load_library, LoadedLibrary};

/// Loader parameter and intent extra names
pub mod keys {
    pub use crate::config::{
        API_LEVEL_KEY, APPLICATION_PARAMETERS_KEY, BUNDLED_LIBRARIES_KEY,
        DEFAULT_GDBSERVER_SOCKET, DEFAULT_SCRIPT_DEBUGGER, ENVIRONMENT_VARIABLES_KEY,
        GDBSERVER_PATH_EXTRA, GDBSERVER_SOCKET_EXTRA, MAIN_LIBRARY_KEY, NATIVE_DEBUG_EXTRA,
        NATIVE_LIBRARIES_KEY, SCRIPT_DEBUGGER_EXTRA, SCRIPT_DEBUG_EXTRA, STATIC_INIT_CLASSES_KEY,
    };
}

// Note: this has signed components (consistent with Android's `Rect`) since
// the engine may report regions with a negative/off-screen origin.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[test]
fn test_bridge_is_send_sync() {
    fn needs_send_sync<T: Send + Sync>() {}
    needs_send_sync::<Bridge>();
    needs_send_sync::<HostCommand>();
    needs_send_sync::<Surface>();
}
