/*!
 * Process Latch
 * Self-pipe wakeup that can be set from a signal handler
 */

use crate::signals::traits::Latch;
use crate::signals::types::{SignalError, SignalResult};
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::unistd::{pipe, read, write};
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::{Duration, Instant};

const NO_FD: RawFd = -1;

fn os_error(op: &'static str) -> impl Fn(Errno) -> SignalError {
    move |errno| SignalError::OperationFailed(format!("{} failed: {}", op, errno))
}

/// Latch waited on by normal context and set by the signal handler
///
/// `set` only touches an atomic and writes one byte to a non-blocking
/// pipe, both async-signal-safe. The pipe is created by [`init`](Self::init);
/// before that, `set` still records the flag but cannot wake a sleeper.
pub struct ProcessLatch {
    is_set: AtomicBool,
    read_fd: AtomicI32,
    write_fd: AtomicI32,
}

impl ProcessLatch {
    pub const fn new() -> Self {
        Self {
            is_set: AtomicBool::new(false),
            read_fd: AtomicI32::new(NO_FD),
            write_fd: AtomicI32::new(NO_FD),
        }
    }

    /// Create the self-pipe. Idempotent.
    pub fn init(&self) -> SignalResult<()> {
        if self.read_fd.load(Ordering::Acquire) != NO_FD {
            return Ok(());
        }

        let (read_end, write_end) = pipe().map_err(os_error("pipe"))?;
        for fd in [read_end.as_raw_fd(), write_end.as_raw_fd()] {
            fcntl(fd, FcntlArg::F_SETFL(OFlag::O_NONBLOCK)).map_err(os_error("fcntl"))?;
        }

        // Lost the race: our descriptors close on drop
        if self
            .read_fd
            .compare_exchange(
                NO_FD,
                read_end.as_raw_fd(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Ok(());
        }

        let _ = read_end.into_raw_fd();
        self.write_fd
            .store(write_end.into_raw_fd(), Ordering::Release);
        Ok(())
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.is_set.load(Ordering::Acquire)
    }

    /// Clear the latch and drain queued wakeups
    ///
    /// Callers reset before re-checking the condition they wait for, so a
    /// set that races with the check is not lost.
    pub fn reset(&self) {
        self.is_set.store(false, Ordering::Release);
        self.drain();
    }

    /// Block until the latch is set or `timeout` elapses
    ///
    /// Returns whether the latch was set.
    pub fn wait(&self, timeout: Duration) -> SignalResult<bool> {
        let read_fd = self.read_fd.load(Ordering::Acquire);
        if read_fd == NO_FD {
            return Err(SignalError::OperationFailed(
                "latch wait before init".to_string(),
            ));
        }

        let deadline = Instant::now() + timeout;
        loop {
            if self.is_set() {
                return Ok(true);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }
            let millis = u16::try_from(remaining.as_millis().max(1)).unwrap_or(u16::MAX);

            // SAFETY: the read end stays open for the lifetime of the latch
            let fd = unsafe { BorrowedFd::borrow_raw(read_fd) };
            let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
            match poll(&mut fds, PollTimeout::from(millis)) {
                Ok(_) | Err(Errno::EINTR) => self.drain(),
                Err(errno) => return Err(os_error("poll")(errno)),
            }
        }
    }

    fn drain(&self) {
        let read_fd = self.read_fd.load(Ordering::Acquire);
        if read_fd == NO_FD {
            return;
        }

        let mut buf = [0u8; 16];
        loop {
            match read(read_fd, &mut buf) {
                Ok(n) if n == buf.len() => continue,
                Err(Errno::EINTR) => continue,
                _ => break,
            }
        }
    }
}

impl Latch for ProcessLatch {
    fn set(&self) {
        if self.is_set.swap(true, Ordering::AcqRel) {
            return;
        }

        let write_fd = self.write_fd.load(Ordering::Acquire);
        if write_fd != NO_FD {
            // SAFETY: the write end stays open for the lifetime of the latch
            let fd = unsafe { BorrowedFd::borrow_raw(write_fd) };
            // EAGAIN means the pipe is full and a wakeup is already queued
            let _ = write(fd, &[0u8]);
        }
    }
}

impl Default for ProcessLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessLatch {
    fn drop(&mut self) {
        for fd in [self.read_fd.get_mut(), self.write_fd.get_mut()] {
            if *fd != NO_FD {
                // SAFETY: the descriptor was created by `init` and is owned here
                drop(unsafe { OwnedFd::from_raw_fd(*fd) });
                *fd = NO_FD;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_times_out() {
        let latch = ProcessLatch::new();
        latch.init().unwrap();
        let start = Instant::now();
        assert!(!latch.wait(Duration::from_millis(30)).unwrap());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_set_wakes_waiter() {
        let latch = Arc::new(ProcessLatch::new());
        latch.init().unwrap();

        let setter = latch.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            setter.set();
        });

        assert!(latch.wait(Duration::from_secs(5)).unwrap());
        handle.join().unwrap();

        latch.reset();
        assert!(!latch.is_set());
        assert!(!latch.wait(Duration::from_millis(10)).unwrap());
    }

    #[test]
    fn test_wait_requires_init() {
        let latch = ProcessLatch::new();
        assert!(latch.wait(Duration::from_millis(1)).is_err());
        // Setting before init only records the flag
        latch.set();
        assert!(latch.is_set());
    }
}
