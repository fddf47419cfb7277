use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Weak;

use crate::input::{MetaState, TouchPhase, TouchPoint};
use crate::{Bridge, DisplayMetrics};

/// A native window the engine renders into
///
/// On Android this is the `ANativeWindow` behind the activity's
/// `SurfaceView`. The engine draws into it directly (e.g. with
/// `ANativeWindow_lock`/`ANativeWindow_unlockAndPost`). The window stays valid
/// until [`Engine::destroy_surface`] returns or another surface is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    window: NonNull<c_void>,
    width: i32,
    height: i32,
}

// The window is only handed over, the engine synchronizes its own drawing.
unsafe impl Send for Surface {}
unsafe impl Sync for Surface {}

impl Surface {
    /// # Safety
    ///
    /// `window` must point to a native window that stays valid until the
    /// engine is told to let go of it.
    pub unsafe fn from_ptr(window: NonNull<c_void>, width: i32, height: i32) -> Self {
        Self {
            window,
            width,
            height,
        }
    }

    pub fn window(&self) -> NonNull<c_void> {
        self.window
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }
}

/// The native application engine
///
/// Every method maps to one entry point of the engine. Calls are
/// synchronous: the engine owns its own threads and event loop and is
/// expected to return promptly. The engine may call back into the
/// [`Bridge`] (e.g. [`Bridge::redraw_surface`]) from any thread, including
/// from within one of these methods.
pub trait Engine: Send + Sync {
    /// Called once the [`Bridge`] owning this engine has been created, with a
    /// handle the engine can use for its callbacks.
    fn connect(&self, _bridge: Weak<Bridge>) {}

    /// Starts the engine's platform plugin, returning whether it started.
    fn start_plugin(&self) -> bool;

    /// Starts the application.
    ///
    /// `arguments` is the tab separated command line, starting with the path
    /// of the main library. `environment` is a tab separated list of
    /// `NAME=value` pairs.
    fn start_application(&self, arguments: &str, environment: &str);

    fn pause(&self);
    fn resume(&self);
    fn terminate(&self);

    fn set_display_metrics(&self, metrics: &DisplayMetrics);

    /// A window to render into was created or changed size.
    fn set_surface(&self, surface: &Surface);
    /// Stop using the current surface before returning.
    fn destroy_surface(&self);

    /// The window geometry or visibility changed; re-layout and repaint.
    fn update_window(&self);

    fn mouse_down(&self, window_id: i32, x: i32, y: i32);
    fn mouse_up(&self, window_id: i32, x: i32, y: i32);
    fn mouse_move(&self, window_id: i32, x: i32, y: i32);

    fn touch_begin(&self, window_id: i32);
    fn touch_add(&self, window_id: i32, point: &TouchPoint);
    fn touch_end(&self, window_id: i32, phase: TouchPhase);

    fn key_down(&self, key_code: i32, unicode: u32, modifiers: MetaState);
    fn key_up(&self, key_code: i32, unicode: u32, modifiers: MetaState);
}
