use std::any::Any;

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> Option<&str> {
    if let Some(msg) = panic.downcast_ref::<String>() {
        Some(msg.as_str())
    } else {
        panic.downcast_ref::<&str>().copied()
    }
}

pub(crate) fn log_panic(panic: Box<dyn Any + Send>) {
    match panic_message(panic.as_ref()) {
        Some(msg) => log::error!("RustPanic: {msg}"),
        None => log::error!("UnknownPanic"),
    }
}

/// Run a closure and abort the program if it panics.
///
/// This is generally used to ensure Rust callbacks won't unwind past the JNI
/// boundary, which leads to undefined behaviour.
pub(crate) fn abort_on_panic<R>(f: impl FnOnce() -> R) -> R {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).unwrap_or_else(|panic| {
        // Try logging the panic, the abort happens either way.
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| log_panic(panic)));
        std::process::abort();
    })
}

#[cfg(target_os = "android")]
pub(crate) fn android_log(level: log::Level, tag: &std::ffi::CStr, msg: &std::ffi::CStr) {
    use log::Level;

    let prio = match level {
        Level::Error => ndk_sys::android_LogPriority::ANDROID_LOG_ERROR,
        Level::Warn => ndk_sys::android_LogPriority::ANDROID_LOG_WARN,
        Level::Info => ndk_sys::android_LogPriority::ANDROID_LOG_INFO,
        Level::Debug => ndk_sys::android_LogPriority::ANDROID_LOG_DEBUG,
        Level::Trace => ndk_sys::android_LogPriority::ANDROID_LOG_VERBOSE,
    };
    unsafe {
        ndk_sys::__android_log_write(prio.0 as libc::c_int, tag.as_ptr(), msg.as_ptr());
    }
}

/// Pipes stdout and stderr into logcat, one log line per text line.
#[cfg(target_os = "android")]
pub(crate) fn redirect_stdio_to_logcat() {
    use std::ffi::{CStr, CString};
    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use std::os::unix::prelude::{FromRawFd, RawFd};

    unsafe {
        let mut logpipe: [RawFd; 2] = Default::default();
        if libc::pipe(logpipe.as_mut_ptr()) != 0 {
            log::error!(
                "Failed to create stdout/stderr pipe: {}",
                std::io::Error::last_os_error()
            );
            return;
        }
        libc::dup2(logpipe[1], libc::STDOUT_FILENO);
        libc::dup2(logpipe[1], libc::STDERR_FILENO);
        std::thread::spawn(move || {
            let tag = CStr::from_bytes_with_nul(b"RustStdoutStderr\0").unwrap();
            let file = File::from_raw_fd(logpipe[0]);
            let mut reader = BufReader::new(file);
            let mut buffer = String::new();
            loop {
                buffer.clear();
                if let Ok(len) = reader.read_line(&mut buffer) {
                    if len == 0 {
                        break;
                    } else if let Ok(msg) = CString::new(buffer.clone()) {
                        android_log(log::Level::Info, tag, &msg);
                    }
                }
            }
        });
    }
}
