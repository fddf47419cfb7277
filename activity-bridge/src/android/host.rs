use std::collections::VecDeque;
use std::os::unix::prelude::RawFd;
use std::sync::{Arc, Mutex, Weak};

use ndk::looper::ForeignLooper;

use super::JniDelegate;
use crate::error::{AppError, Result};
use crate::{Host, HostCommand};

struct Mailbox {
    commands: Mutex<VecDeque<HostCommand>>,
    delegate: Weak<JniDelegate>,
}

impl Mailbox {
    fn run_pending(&self) {
        loop {
            // The lock isn't held while running a command since commands may
            // post more commands
            let command = self.commands.lock().unwrap().pop_front();
            let Some(command) = command else {
                break;
            };
            match self.delegate.upgrade() {
                Some(delegate) => delegate.execute(command),
                None => log::debug!("Activity gone, dropping {command:?}"),
            }
        }
    }
}

/// A [`Host`] that runs commands on the thread that created it, through that
/// thread's `ALooper`
///
/// The Java main thread's `Looper` is backed by an `ALooper`, so creating the
/// host from a native method called on the main thread schedules commands on
/// the UI thread. The host must be dropped on that same thread.
pub struct LooperHost {
    looper: ForeignLooper,
    msg_read: RawFd,
    msg_write: RawFd,
    mailbox: *mut Mailbox,
}

// The mailbox is shared with the looper callback and is only freed once the
// callback has been removed.
unsafe impl Send for LooperHost {}
unsafe impl Sync for LooperHost {}

impl LooperHost {
    pub(crate) fn new(delegate: Weak<JniDelegate>) -> Result<Arc<Self>> {
        let looper = ForeignLooper::for_thread().ok_or_else(|| {
            AppError::JavaError("No looper associated with the current thread".to_owned())
        })?;

        let mut msgpipe: [libc::c_int; 2] = [-1, -1];
        unsafe {
            if libc::pipe(msgpipe.as_mut_ptr()) != 0 {
                return Err(AppError::JavaError(format!(
                    "could not create Rust -> Java main thread pipe: {}",
                    std::io::Error::last_os_error()
                )));
            }
        }

        let mailbox = Box::into_raw(Box::new(Mailbox {
            commands: Mutex::new(VecDeque::new()),
            delegate,
        }));

        let added = unsafe {
            ndk_sys::ALooper_addFd(
                looper.ptr().as_ptr(),
                msgpipe[0],
                ndk_sys::ALOOPER_POLL_CALLBACK as libc::c_int,
                ndk_sys::ALOOPER_EVENT_INPUT as libc::c_int,
                Some(looper_callback),
                mailbox.cast(),
            )
        };
        if added != 1 {
            unsafe {
                drop(Box::from_raw(mailbox));
                libc::close(msgpipe[0]);
                libc::close(msgpipe[1]);
            }
            return Err(AppError::JavaError(
                "Failed to add the command pipe to the main thread looper".to_owned(),
            ));
        }

        Ok(Arc::new(Self {
            looper,
            msg_read: msgpipe[0],
            msg_write: msgpipe[1],
            mailbox,
        }))
    }
}

impl Host for LooperHost {
    fn run_on_main_thread(&self, command: HostCommand) {
        let mailbox = unsafe { &*self.mailbox };
        mailbox.commands.lock().unwrap().push_back(command);

        let wake: u8 = 1;
        unsafe {
            if libc::write(self.msg_write, &wake as *const _ as *const _, 1) != 1 {
                log::error!(
                    "Failure writing host command to main thread: {}",
                    std::io::Error::last_os_error()
                );
            }
        }
    }
}

impl Drop for LooperHost {
    fn drop(&mut self) {
        unsafe {
            ndk_sys::ALooper_removeFd(self.looper.ptr().as_ptr(), self.msg_read);
            libc::close(self.msg_read);
            libc::close(self.msg_write);
            drop(Box::from_raw(self.mailbox));
        }
    }
}

unsafe extern "C" fn looper_callback(
    fd: libc::c_int,
    events: libc::c_int,
    data: *mut libc::c_void,
) -> libc::c_int {
    crate::util::abort_on_panic(|| {
        if events & ndk_sys::ALOOPER_EVENT_INPUT as libc::c_int != 0 {
            let mut buf = [0u8; 64];
            if libc::read(fd, buf.as_mut_ptr() as *mut _, buf.len()) < 0 {
                log::error!(
                    "Failure reading host command wake up: {}",
                    std::io::Error::last_os_error()
                );
            }
            let mailbox = &*(data as *const Mailbox);
            mailbox.run_pending();
        }

        // Keep the callback registered until the host is dropped
        1
    })
}
