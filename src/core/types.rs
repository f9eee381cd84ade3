/*!
 * Core Types
 * Common types used across the signalling layer
 */

/// Process ID type
pub type Pid = u32;

/// Convert a process ID into the representation used by the OS layer
///
/// `None` for 0 and for anything above `i32::MAX`, which `kill` would read
/// as the caller's process group or a broadcast.
#[inline]
pub fn os_pid(pid: Pid) -> Option<nix::unistd::Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(nix::unistd::Pid::from_raw(raw)),
        _ => None,
    }
}

/// Whether `pid` names a single process
#[inline]
pub fn is_valid_pid(pid: Pid) -> bool {
    os_pid(pid).is_some()
}

/// Process ID of the calling process
#[inline]
pub fn current_pid() -> Pid {
    nix::unistd::getpid().as_raw() as Pid
}
