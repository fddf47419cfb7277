//! Launch configuration: the loader parameters an application ships in its
//! activity metadata, debug requests carried by the launching intent and the
//! display metrics handed to the engine.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::bundle::{Bundle, BundleValue};
use crate::error::{AppError, Result};

pub const NATIVE_LIBRARIES_KEY: &str = "native.libraries";
pub const BUNDLED_LIBRARIES_KEY: &str = "bundled.libraries";
pub const MAIN_LIBRARY_KEY: &str = "main.library";
pub const ENVIRONMENT_VARIABLES_KEY: &str = "environment.variables";
pub const APPLICATION_PARAMETERS_KEY: &str = "application.parameters";
pub const STATIC_INIT_CLASSES_KEY: &str = "static.init.classes";
pub const API_LEVEL_KEY: &str = "necessitas.api.level";

/// Name of the environment variable that tells the engine which loader API
/// level launched it
pub const API_LEVEL_ENV: &str = "NECESSITAS_API_LEVEL";

/// Parameters used when the loader doesn't provide any
pub const DEFAULT_APPLICATION_PARAMETERS: &str = "-platform\tandroid";

pub const NATIVE_DEBUG_EXTRA: &str = "native_debug";
pub const GDBSERVER_PATH_EXTRA: &str = "gdbserver_path";
pub const GDBSERVER_SOCKET_EXTRA: &str = "gdbserver_socket";
pub const DEFAULT_GDBSERVER_SOCKET: &str = "+debug-socket";
pub const SCRIPT_DEBUG_EXTRA: &str = "qml_debug";
pub const SCRIPT_DEBUGGER_EXTRA: &str = "qmljsdebugger";
pub const DEFAULT_SCRIPT_DEBUGGER: &str = "port:3768";

/// `DisplayMetrics.DENSITY_LOW`; devices occasionally report a bogus dpi
/// below this.
pub const DENSITY_LOW: f64 = 120.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayMetrics {
    pub screen_width: i32,
    pub screen_height: i32,
    pub desktop_width: i32,
    pub desktop_height: i32,
    pub x_dpi: f64,
    pub y_dpi: f64,
}

impl DisplayMetrics {
    /// Metrics for a display whose desktop covers the whole screen.
    pub fn new(width: i32, height: i32, x_dpi: f64, y_dpi: f64) -> Self {
        Self {
            screen_width: width,
            screen_height: height,
            desktop_width: width,
            desktop_height: height,
            x_dpi,
            y_dpi,
        }
    }

    /// Returns a copy with both dpi values raised to at least
    /// [`DENSITY_LOW`].
    pub fn sanitized(self) -> Self {
        Self {
            x_dpi: self.x_dpi.max(DENSITY_LOW),
            y_dpi: self.y_dpi.max(DENSITY_LOW),
            ..self
        }
    }
}

/// The loader parameters an application declares for its activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderParams {
    /// Full paths of libraries to load before anything else
    pub native_libraries: Vec<String>,
    /// Names of libraries bundled in the application's native library
    /// directory
    pub bundled_libraries: Vec<String>,
    pub main_library: Option<String>,
    pub environment_variables: Option<String>,
    pub application_parameters: Option<String>,
    /// Java classes to instantiate and hand the activity to
    pub static_init_classes: Vec<String>,
    pub api_level: i32,
}

impl LoaderParams {
    /// Parses loader parameters.
    ///
    /// The library lists, environment and application parameters must be
    /// present (they may be null). Older loaders don't name a main library,
    /// in which case the last bundled library is the main one.
    pub fn from_bundle(bundle: &Bundle) -> Result<Self> {
        for key in [
            NATIVE_LIBRARIES_KEY,
            BUNDLED_LIBRARIES_KEY,
            ENVIRONMENT_VARIABLES_KEY,
            APPLICATION_PARAMETERS_KEY,
        ] {
            if !bundle.contains_key(key) {
                return Err(AppError::MissingLoaderParam(key));
            }
        }

        let bundled_libraries = string_list(bundle, BUNDLED_LIBRARIES_KEY)?;
        let main_library = optional_string(bundle, MAIN_LIBRARY_KEY)?
            .or_else(|| bundled_libraries.last().cloned());

        let api_level = match bundle.get(API_LEVEL_KEY) {
            None => 1,
            Some(BundleValue::Int(level)) => *level,
            Some(_) => return Err(AppError::InvalidLoaderParam(API_LEVEL_KEY)),
        };

        Ok(Self {
            native_libraries: string_list(bundle, NATIVE_LIBRARIES_KEY)?,
            bundled_libraries,
            main_library,
            environment_variables: optional_string(bundle, ENVIRONMENT_VARIABLES_KEY)?,
            application_parameters: optional_string(bundle, APPLICATION_PARAMETERS_KEY)?,
            static_init_classes: string_list(bundle, STATIC_INIT_CLASSES_KEY)?,
            api_level,
        })
    }

    /// The tab separated environment handed to the engine.
    ///
    /// `HOME` and `TMPDIR` both point at the application's private files
    /// directory; the application's own variables follow.
    pub fn environment(&self, files_dir: &Path) -> String {
        let files_dir = files_dir.display();
        let mut environment = format!(
            "{API_LEVEL_ENV}={}\tHOME={files_dir}\tTMPDIR={files_dir}",
            self.api_level
        );
        match self.environment_variables.as_deref() {
            Some(extra) if !extra.is_empty() => {
                environment.push('\t');
                environment.push_str(extra);
            }
            _ => {}
        }
        environment
    }
}

fn string_list(bundle: &Bundle, key: &'static str) -> Result<Vec<String>> {
    match bundle.get(key) {
        None => Ok(Vec::new()),
        Some(BundleValue::StringList(list)) => Ok(list.clone()),
        Some(_) => Err(AppError::InvalidLoaderParam(key)),
    }
}

fn optional_string(bundle: &Bundle, key: &'static str) -> Result<Option<String>> {
    match bundle.get(key) {
        None => Ok(None),
        Some(BundleValue::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(AppError::InvalidLoaderParam(key)),
    }
}

/// Appends one tab separated parameter, starting from the default
/// parameters when there are none yet.
pub fn append_parameter(parameters: Option<&str>, parameter: &str) -> String {
    let parameters = parameters.unwrap_or(DEFAULT_APPLICATION_PARAMETERS);
    if parameters.is_empty() {
        parameter.to_owned()
    } else {
        format!("{parameters}\t{parameter}")
    }
}

/// A native debugger to attach to the application process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeDebugger {
    pub program: PathBuf,
    pub socket: String,
}

impl NativeDebugger {
    pub fn command(&self, pid: u32, data_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg(&self.socket)
            .arg("--attach")
            .arg(pid.to_string())
            .current_dir(data_dir);
        command
    }
}

/// Debugging requested by the intent that launched the activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugOptions {
    pub native_debugger: Option<NativeDebugger>,
    /// Value of the script debugger parameter, without whitespace
    pub script_debugger: Option<String>,
}

impl DebugOptions {
    pub fn from_extras(extras: &Bundle, data_dir: &Path) -> Self {
        let enabled = |key| extras.get_string(key) == Some("true");

        let native_debugger = enabled(NATIVE_DEBUG_EXTRA).then(|| NativeDebugger {
            program: extras
                .get_string(GDBSERVER_PATH_EXTRA)
                .map(|path| PathBuf::from(path.trim()))
                .unwrap_or_else(|| data_dir.join("lib").join("gdbserver")),
            socket: extras
                .get_string(GDBSERVER_SOCKET_EXTRA)
                .unwrap_or(DEFAULT_GDBSERVER_SOCKET)
                .to_owned(),
        });

        let script_debugger = enabled(SCRIPT_DEBUG_EXTRA).then(|| {
            extras
                .get_string(SCRIPT_DEBUGGER_EXTRA)
                .unwrap_or(DEFAULT_SCRIPT_DEBUGGER)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
        });

        Self {
            native_debugger,
            script_debugger,
        }
    }

    /// Adds the script debugger parameter, if requested, to the
    /// application parameters.
    pub fn apply_to_parameters(&self, parameters: Option<String>) -> Option<String> {
        match &self.script_debugger {
            Some(debugger) => Some(append_parameter(
                parameters.as_deref(),
                &format!("-qmljsdebugger={debugger}"),
            )),
            None => parameters,
        }
    }
}
