//! Most of the JNI calls we make are not part of a Java native method
//! implementation (e.g. host commands run from a looper callback) so we can't
//! assume there's a JNI local frame that is going to unwind and free local
//! references, and we also can't leave exceptions to get thrown when
//! returning to Java.
//!
//! These utilities help us check + clear exceptions and map them into Rust
//! errors.

use std::ops::Deref;

use jni::{
    objects::{JObject, JString},
    JNIEnv, JavaVM,
};

use crate::error::{AppError, InternalAppError, InternalResult};

/// Local references a single JNI call sequence may create before we make a
/// new frame for it
const LOCAL_FRAME_CAPACITY: i32 = 16;

// TODO: JavaVM should implement Clone
#[derive(Debug)]
pub(crate) struct CloneJavaVM {
    pub jvm: JavaVM,
}
impl Clone for CloneJavaVM {
    fn clone(&self) -> Self {
        Self {
            jvm: unsafe { JavaVM::from_raw(self.jvm.get_java_vm_pointer()).unwrap() },
        }
    }
}
impl CloneJavaVM {
    pub fn from_env(env: &JNIEnv) -> InternalResult<Self> {
        Ok(Self {
            jvm: env.get_java_vm()?,
        })
    }

    /// Attaches the current thread (if needed) and runs `f` in its own local
    /// frame, clearing and mapping any Java exception it throws.
    pub fn with_env<T>(
        &self,
        f: impl FnOnce(&mut JNIEnv) -> jni::errors::Result<T>,
    ) -> crate::Result<T> {
        let mut env = self
            .jvm
            .attach_current_thread()
            .map_err(InternalAppError::from)?;
        let result = env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| f(env));
        result.map_err(|err| AppError::from(clear_and_map_exception_to_err(&mut env, err)))
    }
}
unsafe impl Send for CloneJavaVM {}
unsafe impl Sync for CloneJavaVM {}

impl Deref for CloneJavaVM {
    type Target = JavaVM;

    fn deref(&self) -> &Self::Target {
        &self.jvm
    }
}

/// Use with `.map_err()` to map `jni::errors::Error::JavaException` into a
/// richer error based on the actual contents of the `JThrowable`
///
/// (The `jni` crate doesn't do that automatically since it's more
/// common to let the exception get thrown when returning to Java)
///
/// This will also clear the exception
pub(crate) fn clear_and_map_exception_to_err(
    env: &mut JNIEnv<'_>,
    err: jni::errors::Error,
) -> InternalAppError {
    if !matches!(err, jni::errors::Error::JavaException) {
        return err.into();
    }

    let result = env.with_local_frame::<_, _, InternalAppError>(5, |env| {
        let throwable = env.exception_occurred()?;
        env.exception_clear()?;
        if throwable.is_null() {
            return Ok("exception already cleared".to_owned());
        }

        let msg = env
            .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])?
            .l()?;
        Ok(java_string(env, msg)?.unwrap_or_default())
    });

    match result {
        Ok(msg) => InternalAppError::JniException(msg),
        Err(err) => InternalAppError::JniException(format!(
            "UNKNOWN (Failed to query JThrowable: {err:?})"
        )),
    }
}

/// Converts a `java.lang.String` reference, which may be null.
pub(crate) fn java_string(
    env: &mut JNIEnv<'_>,
    object: JObject<'_>,
) -> jni::errors::Result<Option<String>> {
    if object.is_null() {
        return Ok(None);
    }
    let string = JString::from(object);
    let value: String = env.get_string(&string)?.into();
    Ok(Some(value))
}

/// Logs a failed JNI call made on behalf of Java, clearing any pending
/// exception so it doesn't get thrown on return.
pub(crate) fn log_jni_error(env: &mut JNIEnv<'_>, context: &str, err: jni::errors::Error) {
    let err = clear_and_map_exception_to_err(env, err);
    log::error!("{context}: {err}");
}
