//! Recording fakes for the engine and the host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::input::{MetaState, TouchPhase, TouchPoint};
use crate::{Bridge, DisplayMetrics, Engine, Host, HostCommand, Surface};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineCall {
    StartPlugin,
    StartApplication {
        arguments: String,
        environment: String,
    },
    Pause,
    Resume,
    Terminate,
    DisplayMetrics(DisplayMetrics),
    SetSurface(Surface),
    DestroySurface,
    UpdateWindow,
    MouseDown(i32, i32, i32),
    MouseUp(i32, i32, i32),
    MouseMove(i32, i32, i32),
    TouchBegin(i32),
    TouchAdd(i32, TouchPoint),
    TouchEnd(i32, TouchPhase),
    KeyDown(i32, u32, MetaState),
    KeyUp(i32, u32, MetaState),
}

#[derive(Default)]
pub(crate) struct EngineLog {
    calls: Mutex<Vec<EngineCall>>,
    bridge: Mutex<Weak<Bridge>>,
    redraw_on_update: AtomicBool,
}

impl EngineLog {
    fn push(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Returns and forgets the calls recorded so far.
    pub fn take(&self) -> Vec<EngineCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    /// Makes every window update redraw the whole surface through the
    /// bridge, from within the engine call.
    pub fn redraw_on_update(&self, enabled: bool) {
        self.redraw_on_update.store(enabled, Ordering::SeqCst);
    }

    pub fn is_connected_to(&self, bridge: &Arc<Bridge>) -> bool {
        self.bridge
            .lock()
            .unwrap()
            .upgrade()
            .map_or(false, |connected| Arc::ptr_eq(&connected, bridge))
    }
}

pub(crate) struct RecordingEngine(Arc<EngineLog>);

impl Engine for RecordingEngine {
    fn connect(&self, bridge: Weak<Bridge>) {
        *self.0.bridge.lock().unwrap() = bridge;
    }

    fn start_plugin(&self) -> bool {
        self.0.push(EngineCall::StartPlugin);
        true
    }

    fn start_application(&self, arguments: &str, environment: &str) {
        self.0.push(EngineCall::StartApplication {
            arguments: arguments.to_owned(),
            environment: environment.to_owned(),
        });
    }

    fn pause(&self) {
        self.0.push(EngineCall::Pause);
    }

    fn resume(&self) {
        self.0.push(EngineCall::Resume);
    }

    fn terminate(&self) {
        self.0.push(EngineCall::Terminate);
    }

    fn set_display_metrics(&self, metrics: &DisplayMetrics) {
        self.0.push(EngineCall::DisplayMetrics(*metrics));
    }

    fn set_surface(&self, surface: &Surface) {
        self.0.push(EngineCall::SetSurface(*surface));
    }

    fn destroy_surface(&self) {
        self.0.push(EngineCall::DestroySurface);
    }

    fn update_window(&self) {
        self.0.push(EngineCall::UpdateWindow);
        if self.0.redraw_on_update.load(Ordering::SeqCst) {
            let bridge = self.0.bridge.lock().unwrap().upgrade();
            if let Some(bridge) = bridge {
                bridge.redraw_surface(0, 0, 0, 0);
            }
        }
    }

    fn mouse_down(&self, window_id: i32, x: i32, y: i32) {
        self.0.push(EngineCall::MouseDown(window_id, x, y));
    }

    fn mouse_up(&self, window_id: i32, x: i32, y: i32) {
        self.0.push(EngineCall::MouseUp(window_id, x, y));
    }

    fn mouse_move(&self, window_id: i32, x: i32, y: i32) {
        self.0.push(EngineCall::MouseMove(window_id, x, y));
    }

    fn touch_begin(&self, window_id: i32) {
        self.0.push(EngineCall::TouchBegin(window_id));
    }

    fn touch_add(&self, window_id: i32, point: &TouchPoint) {
        self.0.push(EngineCall::TouchAdd(window_id, *point));
    }

    fn touch_end(&self, window_id: i32, phase: TouchPhase) {
        self.0.push(EngineCall::TouchEnd(window_id, phase));
    }

    fn key_down(&self, key_code: i32, unicode: u32, modifiers: MetaState) {
        self.0.push(EngineCall::KeyDown(key_code, unicode, modifiers));
    }

    fn key_up(&self, key_code: i32, unicode: u32, modifiers: MetaState) {
        self.0.push(EngineCall::KeyUp(key_code, unicode, modifiers));
    }
}

/// A bridge over a [`RecordingEngine`], plus the engine's call log.
pub(crate) fn recording_bridge() -> (Arc<Bridge>, Arc<EngineLog>) {
    let log = Arc::new(EngineLog::default());
    let bridge = Bridge::new(Box::new(RecordingEngine(log.clone())));
    (bridge, log)
}

/// A surface over a dangling window, for engines that never draw.
pub(crate) fn test_surface(width: i32, height: i32) -> Surface {
    unsafe { Surface::from_ptr(std::ptr::NonNull::dangling(), width, height) }
}

/// A host that queues commands instead of running them
#[derive(Default)]
pub(crate) struct QueueHost {
    commands: Mutex<Vec<HostCommand>>,
}

impl QueueHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<HostCommand> {
        std::mem::take(&mut *self.commands.lock().unwrap())
    }
}

impl Host for QueueHost {
    fn run_on_main_thread(&self, command: HostCommand) {
        self.commands.lock().unwrap().push(command);
    }
}
