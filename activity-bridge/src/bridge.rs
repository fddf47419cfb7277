use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use parking_lot::ReentrantMutex;

use crate::config::{DisplayMetrics, DEFAULT_APPLICATION_PARAMETERS};
use crate::engine::{Engine, Surface};
use crate::error::{AppError, Result};
use crate::host::{Host, HostCommand};
use crate::input::{
    InputHints, MotionSnapshot, MouseEmulator, MouseEvent, SoftKeyboardRequest,
    TOUCH_MOVE_THRESHOLD, TRACKBALL_MOVE_THRESHOLD,
};
use crate::library::library_path;
use crate::Rect;

/// What the engine needs to start the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    /// Name of the main library, without the `lib` prefix or `.so` suffix
    pub main_library: String,
    pub native_library_dir: PathBuf,
    /// Tab separated application parameters, [`DEFAULT_APPLICATION_PARAMETERS`]
    /// if `None`
    pub parameters: Option<String>,
    /// Tab separated `NAME=value` pairs
    pub environment: String,
}

impl StartRequest {
    pub fn main_library_path(&self) -> PathBuf {
        library_path(&self.native_library_dir, &self.main_library)
    }
}

#[derive(Default)]
struct BridgeState {
    host: Option<Arc<dyn Host>>,
    lost_actions: Vec<HostCommand>,
    started: bool,
    pending_metrics: DisplayMetrics,
    surface: Option<Surface>,
}

/// The connection between the host activity and the engine
///
/// There is one bridge per process. Activities come and go (e.g. across
/// configuration changes) and attach themselves as the [`Host`] while they
/// are alive; engine requests made while no host is attached are kept and
/// replayed once one is.
///
/// A single lock guards the host, the deferred requests, the pending display
/// metrics, the surface and the started flag. The lock is reentrant so that the engine can
/// call back into the bridge from within an engine call made under the lock.
pub struct Bridge {
    engine: Box<dyn Engine>,
    state: ReentrantMutex<RefCell<BridgeState>>,
    mouse: Mutex<MouseEmulator>,
}

impl Bridge {
    pub fn new(engine: Box<dyn Engine>) -> Arc<Self> {
        let bridge = Arc::new(Self {
            engine,
            state: ReentrantMutex::new(RefCell::new(BridgeState::default())),
            mouse: Mutex::new(MouseEmulator::new()),
        });
        bridge.engine.connect(Arc::downgrade(&bridge));
        bridge
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    pub fn attach_host(&self, host: Arc<dyn Host>) {
        let state = self.state.lock();
        state.borrow_mut().host = Some(host);
    }

    /// Detaches the current host, if any. Requests made from now on are
    /// deferred.
    pub fn detach_host(&self) -> Option<Arc<dyn Host>> {
        let state = self.state.lock();
        let host = state.borrow_mut().host.take();
        host
    }

    pub fn has_host(&self) -> bool {
        self.state.lock().borrow().host.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().borrow().started
    }

    pub fn lost_action_count(&self) -> usize {
        self.state.lock().borrow().lost_actions.len()
    }

    /// The surface the engine currently renders into.
    pub fn surface(&self) -> Option<Surface> {
        self.state.lock().borrow().surface
    }

    /// The metrics that will be handed to the engine when it starts.
    pub fn pending_display_metrics(&self) -> DisplayMetrics {
        self.state.lock().borrow().pending_metrics
    }

    /// Posts `command` to the host, or defers it if no host is attached.
    ///
    /// Commands are also deferred while older deferred commands haven't been
    /// replayed yet, so the host always sees them in the order they were
    /// requested.
    ///
    /// Returns whether the command was posted.
    pub fn run_action(&self, command: HostCommand) -> bool {
        let state = self.state.lock();
        let host = {
            let state = state.borrow();
            state
                .host
                .clone()
                .filter(|_| state.lost_actions.is_empty())
        };
        match host {
            Some(host) => {
                host.run_on_main_thread(command);
                true
            }
            None => {
                log::debug!("Deferring {command:?}");
                state.borrow_mut().lost_actions.push(command);
                false
            }
        }
    }

    /// Posts every deferred command to the attached host, once the engine has
    /// started. Returns `None` if there's no host or the engine didn't start.
    fn post_lost_actions(state: &RefCell<BridgeState>) -> Option<usize> {
        let (host, lost_actions) = {
            let mut state = state.borrow_mut();
            match state.host.clone() {
                Some(host) if state.started => (host, std::mem::take(&mut state.lost_actions)),
                _ => return None,
            }
        };

        let count = lost_actions.len();
        if count > 0 {
            log::debug!("Replaying {count} deferred host commands");
        }
        for command in lost_actions {
            host.run_on_main_thread(command);
        }
        Some(count)
    }

    /// Posts every deferred command to the attached host, in the order they
    /// were requested, and asks the engine to update its window.
    ///
    /// Nothing happens unless a host is attached and the engine has started;
    /// the deferred commands are then kept for a later replay. Returns the
    /// number of commands posted.
    pub fn replay_lost_actions(&self) -> usize {
        let state = self.state.lock();
        match Self::post_lost_actions(&state) {
            Some(count) => {
                self.engine.update_window();
                count
            }
            None => 0,
        }
    }

    /// Resumes the engine and replays the deferred commands, with a single
    /// window update for both.
    ///
    /// Does nothing until the engine has started. Returns the number of
    /// commands posted.
    pub fn resume_and_replay(&self) -> usize {
        let state = self.state.lock();
        let started = state.borrow().started;
        if !started {
            return 0;
        }
        self.engine.resume();
        let count = Self::post_lost_actions(&state).unwrap_or(0);
        self.engine.update_window();
        count
    }

    /// Starts the engine and the application.
    ///
    /// Fails only if the main library doesn't exist. Returns whether the
    /// engine's platform plugin started.
    pub fn start_application(&self, request: &StartRequest) -> Result<bool> {
        let path = request.main_library_path();
        if !path.exists() {
            return Err(AppError::MainLibraryNotFound(path));
        }

        let parameters = request
            .parameters
            .as_deref()
            .unwrap_or(DEFAULT_APPLICATION_PARAMETERS);
        // The engine splits on single tabs, so unlike older loaders there's no
        // doubled or trailing separator.
        let arguments = if parameters.is_empty() {
            path.display().to_string()
        } else {
            format!("{}\t{parameters}", path.display())
        };

        let state = self.state.lock();
        let plugin_started = self.engine.start_plugin();
        if !plugin_started {
            log::warn!("Engine platform plugin failed to start");
        }
        let metrics = state.borrow().pending_metrics;
        self.engine.set_display_metrics(&metrics);
        log::info!("Starting application: {arguments:?}");
        self.engine.start_application(&arguments, &request.environment);
        state.borrow_mut().started = true;

        Ok(plugin_started)
    }

    /// Reports new display metrics, clamping bogus dpi values.
    ///
    /// The engine gets them right away once started; until then they are
    /// kept for [`Bridge::start_application`].
    pub fn set_display_metrics(&self, metrics: DisplayMetrics) {
        let metrics = metrics.sanitized();
        let state = self.state.lock();
        let started = state.borrow().started;
        if started {
            self.engine.set_display_metrics(&metrics);
        } else {
            state.borrow_mut().pending_metrics = metrics;
        }
    }

    pub fn pause(&self) {
        let state = self.state.lock();
        let started = state.borrow().started;
        if started {
            self.engine.pause();
        }
    }

    pub fn resume(&self) {
        let state = self.state.lock();
        let started = state.borrow().started;
        if started {
            self.engine.resume();
            self.engine.update_window();
        }
    }

    /// Hands the engine the window to render into, replacing any previous
    /// one. A started engine also updates its window.
    pub fn set_surface(&self, surface: Surface) {
        let state = self.state.lock();
        state.borrow_mut().surface = Some(surface);
        self.engine.set_surface(&surface);
        let started = state.borrow().started;
        if started {
            self.engine.update_window();
        }
    }

    /// Takes the surface away from the engine. The window may be released
    /// once this returns.
    pub fn destroy_surface(&self) {
        let state = self.state.lock();
        let had_surface = state.borrow_mut().surface.take().is_some();
        if had_surface {
            self.engine.destroy_surface();
        }
    }

    pub fn terminate(&self) {
        self.engine.terminate();
    }

    pub fn update_window(&self) {
        self.engine.update_window();
    }

    /// Forwards a touch screen event: every pointer as a classified touch
    /// point, plus the primary pointer as a mouse.
    pub fn send_touch_event(&self, window_id: i32, event: &MotionSnapshot) {
        self.engine.touch_begin(window_id);
        for point in event.touch_points() {
            self.engine.touch_add(window_id, &point);
        }
        self.engine.touch_end(window_id, event.touch_phase());

        self.emulate_mouse(window_id, event, TOUCH_MOVE_THRESHOLD);
    }

    /// Forwards a trackball event as a mouse.
    pub fn send_trackball_event(&self, window_id: i32, event: &MotionSnapshot) {
        self.emulate_mouse(window_id, event, TRACKBALL_MOVE_THRESHOLD);
    }

    fn emulate_mouse(&self, window_id: i32, event: &MotionSnapshot, threshold: i32) {
        let Some(primary) = event.primary() else {
            return;
        };
        let mouse_event = self.mouse.lock().unwrap().track(
            event.action(),
            primary.position.x,
            primary.position.y,
            threshold,
        );
        match mouse_event {
            Some(MouseEvent::Down { x, y }) => self.engine.mouse_down(window_id, x, y),
            Some(MouseEvent::Move { x, y }) => self.engine.mouse_move(window_id, x, y),
            Some(MouseEvent::Up { x, y }) => self.engine.mouse_up(window_id, x, y),
            None => {}
        }
    }

    // Engine callbacks

    pub fn redraw_surface(&self, left: i32, top: i32, right: i32, bottom: i32) {
        self.run_action(HostCommand::RedrawWindow(Rect {
            left,
            top,
            right,
            bottom,
        }));
    }

    pub fn show_software_keyboard(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        hints: InputHints,
    ) {
        let request = SoftKeyboardRequest::new(x, y, width, height, hints);
        self.run_action(HostCommand::ShowSoftwareKeyboard(request));
    }

    pub fn reset_software_keyboard(&self) {
        self.run_action(HostCommand::ResetSoftwareKeyboard);
    }

    pub fn hide_software_keyboard(&self) {
        self.run_action(HostCommand::HideSoftwareKeyboard);
    }

    pub fn set_full_screen(&self, full_screen: bool) {
        self.run_action(HostCommand::SetFullScreen(full_screen));
    }

    pub fn show_options_menu(&self) {
        self.run_action(HostCommand::ShowOptionsMenu);
    }

    pub fn hide_options_menu(&self) {
        self.run_action(HostCommand::HideOptionsMenu);
    }

    pub fn show_context_menu(&self) {
        self.run_action(HostCommand::ShowContextMenu);
    }

    pub fn hide_context_menu(&self) {
        self.run_action(HostCommand::HideContextMenu);
    }

    pub fn open_url(&self, url: &str) {
        self.run_action(HostCommand::OpenUrl(url.to_owned()));
    }

    /// The engine quit.
    pub fn quit(&self) {
        self.run_action(HostCommand::Finish);
    }
}
