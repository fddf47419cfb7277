use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Can't find main library '{}'", .0.display())]
    MainLibraryNotFound(PathBuf),

    #[error("Loader parameters are missing the required '{0}' entry")]
    MissingLoaderParam(&'static str),

    #[error("Loader parameter '{0}' has an unexpected type")]
    InvalidLoaderParam(&'static str),

    #[error("Can't load '{}': {reason}", path.display())]
    LibraryLoad { path: PathBuf, reason: String },

    #[error("Java VM or JNI error, including Java exceptions")]
    JavaError(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

// XXX: we don't want to expose jni-rs in the public API
// so we have an internal error type that we can generally
// use in the Android layer and then we can strip the error
// in the frontend of the API.
//
// This way we avoid exposing a public trait implementation for
// `From<jni::errors::Error>`
#[cfg(target_os = "android")]
#[derive(Error, Debug)]
pub(crate) enum InternalAppError {
    #[error("A JNI error")]
    JniError(jni::errors::JniError),
    #[error("A Java Exception was thrown via a JNI method call: {0}")]
    JniException(String),
    #[error("A Java VM error")]
    JvmError(jni::errors::Error),
}

#[cfg(target_os = "android")]
pub(crate) type InternalResult<T> = std::result::Result<T, InternalAppError>;

#[cfg(target_os = "android")]
impl From<jni::errors::Error> for InternalAppError {
    fn from(value: jni::errors::Error) -> Self {
        InternalAppError::JvmError(value)
    }
}

#[cfg(target_os = "android")]
impl From<jni::errors::JniError> for InternalAppError {
    fn from(value: jni::errors::JniError) -> Self {
        InternalAppError::JniError(value)
    }
}

#[cfg(target_os = "android")]
impl From<InternalAppError> for AppError {
    fn from(value: InternalAppError) -> Self {
        match value {
            InternalAppError::JniError(err) => AppError::JavaError(err.to_string()),
            InternalAppError::JniException(msg) => AppError::JavaError(msg),
            InternalAppError::JvmError(err) => AppError::JavaError(err.to_string()),
        }
    }
}
