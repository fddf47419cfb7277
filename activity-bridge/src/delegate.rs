use std::path::PathBuf;
use std::process::Child;
use std::sync::{Arc, Mutex};

use crate::bundle::Bundle;
use crate::config::{DebugOptions, DisplayMetrics, LoaderParams, MAIN_LIBRARY_KEY};
use crate::error::{AppError, Result};
use crate::host::{Host, HostCommand};
use crate::input::{KeyComposer, KeyInput, MetaState, SoftKeyboardRequest, KEYCODE_BACK};
use crate::library::{load_bundled_libraries, load_libraries};
use crate::{Bridge, Rect, StartRequest};

pub const FULL_SCREEN_STATE_KEY: &str = "FullScreen";
pub const STARTED_STATE_KEY: &str = "Started";

/// Operations on the host activity
///
/// Everything except the directory and intent queries must be called on the
/// activity's main thread.
pub trait Activity: Send + Sync {
    /// Metrics of the default display
    fn display_metrics(&self) -> Result<DisplayMetrics>;

    fn set_full_screen(&self, full_screen: bool) -> Result<()>;

    /// The engine posted a new frame for `rect` to its surface. Views drawn
    /// over the surface are invalidated for that region.
    fn redraw_window(&self, rect: Rect) -> Result<()>;

    /// Shows the soft keyboard for the input field at `request.rect`.
    ///
    /// Implementations may only use the field's height to choose between
    /// resizing and panning the window.
    fn show_soft_keyboard(&self, request: &SoftKeyboardRequest) -> Result<()>;
    fn reset_soft_keyboard(&self) -> Result<()>;
    fn hide_soft_keyboard(&self) -> Result<()>;

    fn open_options_menu(&self) -> Result<()>;
    fn close_options_menu(&self) -> Result<()>;
    fn open_context_menu(&self) -> Result<()>;
    fn close_context_menu(&self) -> Result<()>;

    fn open_url(&self, url: &str) -> Result<()>;

    fn finish(&self) -> Result<()>;

    /// Composes a combining `accent` with `base`, returning 0 when they
    /// don't compose.
    fn dead_char(&self, accent: u32, base: u32) -> Result<u32>;

    /// The application's private files directory
    fn files_dir(&self) -> Result<PathBuf>;
    /// The application's data directory
    fn data_dir(&self) -> Result<PathBuf>;
    fn native_library_dir(&self) -> Result<PathBuf>;

    /// Extras of the intent that launched the activity
    fn intent_extras(&self) -> Result<Bundle>;

    /// Instantiates each class and hands it the activity. Failures are
    /// logged.
    fn init_static_classes(&self, class_names: &[String]);
}

#[derive(Debug, Default)]
struct DelegateState {
    created: bool,
    started: bool,
    full_screen: bool,
    quit_app: bool,
    keyboard_visible: bool,
    keyboard_hiding: bool,
    keys: KeyComposer,
    main_library: Option<String>,
    environment: String,
    parameters: Option<String>,
    native_library_dir: Option<PathBuf>,
    debugger: Option<Child>,
}

/// Forwards one activity's lifecycle and input to the [`Bridge`], and runs
/// the engine's [`HostCommand`]s against the activity.
pub struct ActivityDelegate<A: Activity> {
    bridge: Arc<Bridge>,
    activity: A,
    state: Mutex<DelegateState>,
}

impl<A: Activity> ActivityDelegate<A> {
    pub fn new(bridge: Arc<Bridge>, activity: A) -> Self {
        Self {
            bridge,
            activity,
            state: Mutex::new(DelegateState::default()),
        }
    }

    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    pub fn activity(&self) -> &A {
        &self.activity
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().unwrap().started
    }

    pub fn is_full_screen(&self) -> bool {
        self.state.lock().unwrap().full_screen
    }

    pub fn is_keyboard_visible(&self) -> bool {
        self.state.lock().unwrap().keyboard_visible
    }

    /// Validates the loader parameters, attaches `host` to the bridge and
    /// loads the application's native libraries.
    pub fn load_application(&self, host: Arc<dyn Host>, loader_params: &Bundle) -> Result<()> {
        let params = LoaderParams::from_bundle(loader_params)?;

        self.bridge.attach_host(host);
        self.activity.init_static_classes(&params.static_init_classes);

        let native_library_dir = self.activity.native_library_dir()?;
        load_libraries(&params.native_libraries);
        load_bundled_libraries(&params.bundled_libraries, &native_library_dir);

        let environment = params.environment(&self.activity.files_dir()?);
        log::debug!("Application environment: {environment:?}");

        let mut state = self.state.lock().unwrap();
        state.main_library = params.main_library;
        state.environment = environment;
        state.parameters = params.application_parameters;
        state.native_library_dir = Some(native_library_dir);
        Ok(())
    }

    /// Starts the application, returning whether it started.
    pub fn start_application(&self) -> bool {
        match self.try_start_application() {
            Ok(()) => true,
            Err(err) => {
                log::error!("Failed to start application: {err}");
                false
            }
        }
    }

    fn try_start_application(&self) -> Result<()> {
        let extras = self.activity.intent_extras().unwrap_or_else(|err| {
            log::warn!("Failed to read intent extras: {err}");
            Bundle::new()
        });
        let data_dir = self.activity.data_dir()?;
        let debug = DebugOptions::from_extras(&extras, &data_dir);

        if let Some(debugger) = &debug.native_debugger {
            match debugger.command(std::process::id(), &data_dir).spawn() {
                Ok(child) => self.state.lock().unwrap().debugger = Some(child),
                Err(err) => log::error!("Can't start debugger: {err}"),
            }
        }

        let created = self.state.lock().unwrap().created;
        if !created {
            self.on_create(None);
        }

        let request = {
            let mut state = self.state.lock().unwrap();
            state.parameters = debug.apply_to_parameters(state.parameters.take());
            StartRequest {
                main_library: state
                    .main_library
                    .clone()
                    .ok_or(AppError::MissingLoaderParam(MAIN_LIBRARY_KEY))?,
                native_library_dir: match &state.native_library_dir {
                    Some(dir) => dir.clone(),
                    None => self.activity.native_library_dir()?,
                },
                parameters: state.parameters.clone(),
                environment: state.environment.clone(),
            }
        };

        let plugin_started = self.bridge.start_application(&request)?;
        log::info!("Application started (platform plugin started: {plugin_started})");
        self.state.lock().unwrap().started = true;
        Ok(())
    }

    pub fn on_create(&self, saved_state: Option<&Bundle>) {
        {
            let mut state = self.state.lock().unwrap();
            state.created = true;
            state.quit_app = true;
        }
        if saved_state.is_none() {
            match self.activity.display_metrics() {
                Ok(metrics) => self.bridge.set_display_metrics(metrics),
                Err(err) => log::error!("Failed to query display metrics: {err}"),
            }
        }
    }

    pub fn on_resume(&self) {
        self.bridge.resume_and_replay();
    }

    pub fn on_pause(&self) {
        self.bridge.pause();
    }

    pub fn on_terminate(&self) {
        self.bridge.terminate();
    }

    /// The activity is being recreated for a configuration change; the
    /// process must survive the coming destroy.
    pub fn on_retain_non_configuration_instance(&self) {
        self.state.lock().unwrap().quit_app = false;
    }

    /// Detaches the activity from the bridge and returns whether the process
    /// should exit.
    pub fn on_destroy(&self) -> bool {
        self.bridge.detach_host();

        let mut state = self.state.lock().unwrap();
        if state.quit_app {
            log::info!("onDestroy");
            if let Some(mut debugger) = state.debugger.take() {
                if let Err(err) = debugger.kill() {
                    log::warn!("Failed to stop debugger: {err}");
                }
            }
        }
        state.quit_app
    }

    pub fn on_save_instance_state(&self, out_state: &mut Bundle) {
        let state = self.state.lock().unwrap();
        out_state.insert(FULL_SCREEN_STATE_KEY, state.full_screen);
        out_state.insert(STARTED_STATE_KEY, state.started);
    }

    pub fn on_restore_instance_state(&self, saved_state: &Bundle) {
        self.state.lock().unwrap().started =
            saved_state.get_bool(STARTED_STATE_KEY).unwrap_or(false);
    }

    /// Returns whether the key was consumed.
    pub fn on_key_down(&self, key: &KeyInput) -> bool {
        let unicode = {
            let mut state = self.state.lock().unwrap();
            if !state.started {
                return false;
            }
            state.keys.compose(key, |accent, base| {
                self.activity.dead_char(accent, base).unwrap_or_else(|err| {
                    log::warn!("Failed to compose dead key: {err}");
                    0
                })
            })
        };

        if key.key_code != KEYCODE_BACK {
            self.bridge
                .engine()
                .key_down(key.key_code, unicode, key.meta_state);
        }
        true
    }

    /// Returns whether the key was consumed.
    pub fn on_key_up(&self, key: &KeyInput) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            if !state.started {
                return false;
            }
            if key.key_code == KEYCODE_BACK && state.keyboard_visible {
                if !state.keyboard_hiding {
                    state.keyboard_hiding = true;
                    drop(state);
                    self.bridge.hide_software_keyboard();
                }
                return true;
            }
        }

        self.bridge
            .engine()
            .key_up(key.key_code, key.unicode, key.meta_state);
        true
    }

    /// Handles a key event carrying a character sequence instead of a key
    /// code. A single character is forwarded as a press and release.
    ///
    /// Returns whether the event was forwarded.
    pub fn dispatch_key_multiple(&self, key_code: i32, characters: &str, meta: MetaState) -> bool {
        if !self.is_started() || key_code != 0 {
            return false;
        }
        let mut chars = characters.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return false;
        };

        let engine = self.bridge.engine();
        engine.key_down(0, c as u32, meta);
        engine.key_up(0, c as u32, meta);
        true
    }

    /// Runs an engine request. Must be called on the activity's main thread.
    pub fn execute(&self, command: HostCommand) {
        log::trace!("Executing {command:?}");
        let result = match command {
            HostCommand::RedrawWindow(rect) => self.activity.redraw_window(rect),
            HostCommand::ShowSoftwareKeyboard(request) => {
                let result = self.activity.show_soft_keyboard(&request);
                if result.is_ok() {
                    let mut state = self.state.lock().unwrap();
                    state.keyboard_visible = true;
                    state.keyboard_hiding = false;
                }
                result
            }
            HostCommand::ResetSoftwareKeyboard => self.activity.reset_soft_keyboard(),
            HostCommand::HideSoftwareKeyboard => {
                let result = self.activity.hide_soft_keyboard();
                let mut state = self.state.lock().unwrap();
                state.keyboard_visible = false;
                state.keyboard_hiding = false;
                result
            }
            HostCommand::SetFullScreen(full_screen) => {
                let changed = {
                    let mut state = self.state.lock().unwrap();
                    std::mem::replace(&mut state.full_screen, full_screen) != full_screen
                };
                let result = if changed {
                    self.activity.set_full_screen(full_screen)
                } else {
                    Ok(())
                };
                self.bridge.update_window();
                result
            }
            HostCommand::ShowOptionsMenu => self.activity.open_options_menu(),
            HostCommand::HideOptionsMenu => self.activity.close_options_menu(),
            HostCommand::ShowContextMenu => self.activity.open_context_menu(),
            HostCommand::HideContextMenu => self.activity.close_context_menu(),
            HostCommand::OpenUrl(url) => self.activity.open_url(&url),
            HostCommand::Finish => self.activity.finish(),
        };

        if let Err(err) = result {
            log::error!("Host command failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        APPLICATION_PARAMETERS_KEY, BUNDLED_LIBRARIES_KEY, ENVIRONMENT_VARIABLES_KEY,
        NATIVE_LIBRARIES_KEY, SCRIPT_DEBUG_EXTRA,
    };
    use crate::input::{InputHints, COMBINING_ACCENT};
    use crate::library::library_path;
    use crate::testing::{recording_bridge, EngineCall, EngineLog, QueueHost};

    #[derive(Debug, Clone, PartialEq)]
    enum ActivityCall {
        FullScreen(bool),
        Redraw(Rect),
        ShowKeyboard(SoftKeyboardRequest),
        ResetKeyboard,
        HideKeyboard,
        OpenOptionsMenu,
        CloseOptionsMenu,
        OpenContextMenu,
        CloseContextMenu,
        OpenUrl(String),
        Finish,
        DeadChar(u32, u32),
        StaticInit(Vec<String>),
    }

    struct FakeActivity {
        dir: PathBuf,
        extras: Bundle,
        calls: Mutex<Vec<ActivityCall>>,
    }

    impl FakeActivity {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "activity-bridge-delegate-{name}-{}",
                std::process::id()
            ));
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(library_path(&dir, "app"), b"").unwrap();
            Self {
                dir,
                extras: Bundle::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: ActivityCall) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    impl Activity for FakeActivity {
        fn display_metrics(&self) -> Result<DisplayMetrics> {
            Ok(DisplayMetrics::new(480, 800, 160.0, 160.0))
        }
        fn set_full_screen(&self, full_screen: bool) -> Result<()> {
            self.record(ActivityCall::FullScreen(full_screen))
        }
        fn redraw_window(&self, rect: Rect) -> Result<()> {
            self.record(ActivityCall::Redraw(rect))
        }
        fn show_soft_keyboard(&self, request: &SoftKeyboardRequest) -> Result<()> {
            self.record(ActivityCall::ShowKeyboard(*request))
        }
        fn reset_soft_keyboard(&self) -> Result<()> {
            self.record(ActivityCall::ResetKeyboard)
        }
        fn hide_soft_keyboard(&self) -> Result<()> {
            self.record(ActivityCall::HideKeyboard)
        }
        fn open_options_menu(&self) -> Result<()> {
            self.record(ActivityCall::OpenOptionsMenu)
        }
        fn close_options_menu(&self) -> Result<()> {
            self.record(ActivityCall::CloseOptionsMenu)
        }
        fn open_context_menu(&self) -> Result<()> {
            self.record(ActivityCall::OpenContextMenu)
        }
        fn close_context_menu(&self) -> Result<()> {
            self.record(ActivityCall::CloseContextMenu)
        }
        fn open_url(&self, url: &str) -> Result<()> {
            self.record(ActivityCall::OpenUrl(url.to_owned()))
        }
        fn finish(&self) -> Result<()> {
            self.record(ActivityCall::Finish)
        }
        fn dead_char(&self, accent: u32, base: u32) -> Result<u32> {
            self.record(ActivityCall::DeadChar(accent, base))?;
            Ok(if accent == 'e' as u32 && base == 0x301 {
                'é' as u32
            } else {
                0
            })
        }
        fn files_dir(&self) -> Result<PathBuf> {
            Ok(self.dir.join("files"))
        }
        fn data_dir(&self) -> Result<PathBuf> {
            Ok(self.dir.clone())
        }
        fn native_library_dir(&self) -> Result<PathBuf> {
            Ok(self.dir.clone())
        }
        fn intent_extras(&self) -> Result<Bundle> {
            Ok(self.extras.clone())
        }
        fn init_static_classes(&self, class_names: &[String]) {
            let _ = self.record(ActivityCall::StaticInit(class_names.to_vec()));
        }
    }

    fn loader_params() -> Bundle {
        let mut bundle = Bundle::new()
            .with(NATIVE_LIBRARIES_KEY, Vec::<String>::new())
            .with(BUNDLED_LIBRARIES_KEY, &["app"][..]);
        bundle.insert_null(ENVIRONMENT_VARIABLES_KEY);
        bundle.insert_null(APPLICATION_PARAMETERS_KEY);
        bundle
    }

    fn delegate(
        activity: FakeActivity,
    ) -> (ActivityDelegate<FakeActivity>, Arc<EngineLog>, Arc<QueueHost>) {
        let (bridge, engine) = recording_bridge();
        let delegate = ActivityDelegate::new(bridge, activity);
        let host = QueueHost::new();
        (delegate, engine, host)
    }

    fn started(name: &str) -> (ActivityDelegate<FakeActivity>, Arc<EngineLog>, Arc<QueueHost>) {
        let (delegate, engine, host) = delegate(FakeActivity::new(name));
        delegate
            .load_application(host.clone(), &loader_params())
            .unwrap();
        assert!(delegate.start_application());
        engine.take();
        (delegate, engine, host)
    }

    fn key(key_code: i32, unicode: u32) -> KeyInput {
        KeyInput::new(key_code, unicode, MetaState::empty())
    }

    #[test]
    fn load_and_start() {
        let (delegate, engine, host) = delegate(FakeActivity::new("start"));
        let dir = delegate.activity().dir.clone();
        delegate
            .load_application(host.clone(), &loader_params())
            .unwrap();
        assert!(delegate.bridge().has_host());
        assert!(!delegate.is_started());

        assert!(delegate.start_application());
        assert!(delegate.is_started());
        assert!(delegate.bridge().is_started());

        let files = dir.join("files");
        assert_eq!(
            engine.take(),
            vec![
                EngineCall::StartPlugin,
                EngineCall::DisplayMetrics(DisplayMetrics::new(480, 800, 160.0, 160.0)),
                EngineCall::StartApplication {
                    arguments: format!(
                        "{}\t-platform\tandroid",
                        library_path(&dir, "app").display()
                    ),
                    environment: format!(
                        "NECESSITAS_API_LEVEL=1\tHOME={0}\tTMPDIR={0}",
                        files.display()
                    ),
                },
            ]
        );
        assert_eq!(
            delegate.activity().calls.lock().unwrap()[0],
            ActivityCall::StaticInit(vec![])
        );
    }

    #[test]
    fn invalid_loader_params() {
        let (delegate, _engine, host) = delegate(FakeActivity::new("invalid"));
        let result = delegate.load_application(host, &Bundle::new());
        assert!(matches!(result, Err(AppError::MissingLoaderParam(_))));
        assert!(!delegate.bridge().has_host());
    }

    #[test]
    fn start_without_main_library_fails() {
        let (delegate, engine, host) = delegate(FakeActivity::new("nomain"));
        let params = loader_params().with(BUNDLED_LIBRARIES_KEY, &["missing"][..]);
        delegate.load_application(host, &params).unwrap();
        assert!(!delegate.start_application());
        assert!(!delegate.is_started());
        // on_create still pushed the display metrics
        assert!(engine.take().is_empty());
        assert_eq!(
            delegate.bridge().pending_display_metrics(),
            DisplayMetrics::new(480, 800, 160.0, 160.0)
        );
    }

    #[test]
    fn script_debugger_extra() {
        let mut activity = FakeActivity::new("qmldebug");
        activity.extras = Bundle::new().with(SCRIPT_DEBUG_EXTRA, "true");
        let (delegate, engine, host) = delegate(activity);
        delegate
            .load_application(host.clone(), &loader_params())
            .unwrap();
        assert!(delegate.start_application());
        let calls = engine.take();
        match &calls[2] {
            EngineCall::StartApplication { arguments, .. } => assert!(arguments
                .ends_with("\t-platform\tandroid\t-qmljsdebugger=port:3768")),
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn keys_are_ignored_before_start() {
        let (delegate, engine, _host) = delegate(FakeActivity::new("keys"));
        assert!(!delegate.on_key_down(&key(29, 'a' as u32)));
        assert!(!delegate.on_key_up(&key(29, 'a' as u32)));
        assert!(!delegate.dispatch_key_multiple(0, "a", MetaState::empty()));
        assert!(engine.take().is_empty());
    }

    #[test]
    fn key_forwarding() {
        let (delegate, engine, _host) = started("forward");
        assert!(delegate.on_key_down(&key(29, 'a' as u32)));
        assert!(delegate.on_key_up(&key(29, 'a' as u32)));
        assert_eq!(
            engine.take(),
            vec![
                EngineCall::KeyDown(29, 'a' as u32, MetaState::empty()),
                EngineCall::KeyUp(29, 'a' as u32, MetaState::empty()),
            ]
        );

        // Back is consumed on press and forwarded on release
        assert!(delegate.on_key_down(&key(KEYCODE_BACK, 0)));
        assert!(delegate.on_key_up(&key(KEYCODE_BACK, 0)));
        assert_eq!(
            engine.take(),
            vec![EngineCall::KeyUp(KEYCODE_BACK, 0, MetaState::empty())]
        );
    }

    #[test]
    fn dead_keys_compose() {
        let (delegate, engine, _host) = started("dead");
        delegate.on_key_down(&key(33, 'e' as u32));
        delegate.on_key_down(&key(75, COMBINING_ACCENT | 0x301));
        assert_eq!(
            engine.take(),
            vec![
                EngineCall::KeyDown(33, 'e' as u32, MetaState::empty()),
                EngineCall::KeyDown(75, 'é' as u32, MetaState::empty()),
            ]
        );
        assert!(delegate
            .activity()
            .calls
            .lock()
            .unwrap()
            .contains(&ActivityCall::DeadChar('e' as u32, 0x301)));
    }

    #[test]
    fn multiple_key_events() {
        let (delegate, engine, _host) = started("multiple");
        assert!(delegate.dispatch_key_multiple(0, "ß", MetaState::SHIFT_ON));
        assert_eq!(
            engine.take(),
            vec![
                EngineCall::KeyDown(0, 'ß' as u32, MetaState::SHIFT_ON),
                EngineCall::KeyUp(0, 'ß' as u32, MetaState::SHIFT_ON),
            ]
        );

        assert!(!delegate.dispatch_key_multiple(0, "ab", MetaState::empty()));
        assert!(!delegate.dispatch_key_multiple(0, "", MetaState::empty()));
        assert!(!delegate.dispatch_key_multiple(29, "a", MetaState::empty()));
        assert!(engine.take().is_empty());
    }

    #[test]
    fn back_hides_visible_keyboard() {
        let (delegate, engine, host) = started("back");
        delegate.execute(HostCommand::ShowSoftwareKeyboard(SoftKeyboardRequest::new(
            0,
            0,
            100,
            20,
            InputHints::empty(),
        )));
        assert!(delegate.is_keyboard_visible());

        assert!(delegate.on_key_up(&key(KEYCODE_BACK, 0)));
        // A second press while the hide is pending doesn't queue another
        assert!(delegate.on_key_up(&key(KEYCODE_BACK, 0)));
        assert!(engine.take().is_empty());

        let commands = host.take();
        assert_eq!(commands, vec![HostCommand::HideSoftwareKeyboard]);
        for command in commands {
            delegate.execute(command);
        }
        assert!(!delegate.is_keyboard_visible());
        assert_eq!(
            delegate.activity().calls.lock().unwrap().last(),
            Some(&ActivityCall::HideKeyboard)
        );
    }

    #[test]
    fn full_screen_applies_changes_only() {
        let (delegate, engine, _host) = started("fullscreen");
        delegate.execute(HostCommand::SetFullScreen(true));
        delegate.execute(HostCommand::SetFullScreen(true));
        delegate.execute(HostCommand::SetFullScreen(false));
        assert!(!delegate.is_full_screen());

        let calls: Vec<_> = delegate
            .activity()
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, ActivityCall::FullScreen(_)))
            .cloned()
            .collect();
        assert_eq!(
            calls,
            vec![ActivityCall::FullScreen(true), ActivityCall::FullScreen(false)]
        );
        assert_eq!(engine.take(), vec![EngineCall::UpdateWindow; 3]);
    }

    #[test]
    fn commands_reach_the_activity() {
        let (delegate, _engine, _host) = started("commands");
        delegate.activity().calls.lock().unwrap().clear();
        let rect = Rect {
            left: 1,
            top: 2,
            right: 3,
            bottom: 4,
        };
        for command in [
            HostCommand::RedrawWindow(rect),
            HostCommand::ResetSoftwareKeyboard,
            HostCommand::ShowOptionsMenu,
            HostCommand::HideOptionsMenu,
            HostCommand::ShowContextMenu,
            HostCommand::HideContextMenu,
            HostCommand::OpenUrl("https://example.org".to_owned()),
            HostCommand::Finish,
        ] {
            delegate.execute(command);
        }
        assert_eq!(
            *delegate.activity().calls.lock().unwrap(),
            vec![
                ActivityCall::Redraw(rect),
                ActivityCall::ResetKeyboard,
                ActivityCall::OpenOptionsMenu,
                ActivityCall::CloseOptionsMenu,
                ActivityCall::OpenContextMenu,
                ActivityCall::CloseContextMenu,
                ActivityCall::OpenUrl("https://example.org".to_owned()),
                ActivityCall::Finish,
            ]
        );
    }

    #[test]
    fn lifecycle() {
        let (delegate, engine, host) = started("lifecycle");
        delegate.on_create(Some(&Bundle::new()));
        delegate.on_pause();
        delegate.on_resume();
        assert_eq!(
            engine.take(),
            vec![EngineCall::Pause, EngineCall::Resume, EngineCall::UpdateWindow]
        );

        let mut saved = Bundle::new();
        delegate.on_save_instance_state(&mut saved);
        assert_eq!(saved.get_bool(FULL_SCREEN_STATE_KEY), Some(false));
        assert_eq!(saved.get_bool(STARTED_STATE_KEY), Some(true));

        // Configuration change: the process survives and requests made
        // meanwhile are replayed on the next activity
        delegate.on_retain_non_configuration_instance();
        assert!(!delegate.on_destroy());
        assert!(!delegate.bridge().has_host());
        delegate.bridge().show_options_menu();
        assert!(host.take().is_empty());

        let next = ActivityDelegate::new(delegate.bridge().clone(), FakeActivity::new("next"));
        next.on_restore_instance_state(&saved);
        assert!(next.is_started());
        let next_host = QueueHost::new();
        next.load_application(next_host.clone(), &loader_params())
            .unwrap();
        next.on_create(Some(&saved));
        next.on_resume();
        assert_eq!(next_host.take(), vec![HostCommand::ShowOptionsMenu]);

        next.on_terminate();
        assert!(engine.take().contains(&EngineCall::Terminate));
        assert!(next.on_destroy());
    }
}
