//! Pseudo-terminal allocation for the child's input channel.
//!
//! Only the stdin side of a child is ever attached to the pty. Both halves
//! are held as owned descriptors, so they are closed when dropped on every
//! path, including a failed spawn.

use std::io;

/// A master/slave pty pair.
#[derive(Debug)]
pub struct PtyPair {
    #[cfg(unix)]
    pub(crate) master: std::os::fd::OwnedFd,
    #[cfg(unix)]
    pub(crate) slave: std::os::fd::OwnedFd,
    #[cfg(not(unix))]
    _unsupported: (),
}

/// Open a new pty pair using `openpty(3)`.
#[cfg(unix)]
pub fn open() -> io::Result<PtyPair> {
    use std::os::fd::{FromRawFd, OwnedFd, RawFd};

    let mut master_raw: RawFd = -1;
    let mut slave_raw: RawFd = -1;

    let ret = unsafe {
        libc::openpty(
            &mut master_raw,
            &mut slave_raw,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    };

    if ret != 0 {
        return Err(io::Error::last_os_error());
    }

    // Safety: openpty returned two fresh descriptors that nothing else owns.
    let master = unsafe { OwnedFd::from_raw_fd(master_raw) };
    let slave = unsafe { OwnedFd::from_raw_fd(slave_raw) };

    Ok(PtyPair { master, slave })
}

/// Ptys are not available on this platform.
#[cfg(not(unix))]
pub fn open() -> io::Result<PtyPair> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "pseudo-terminals are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_open_returns_distinct_descriptors() {
        use std::os::fd::AsRawFd;

        // Containers without /dev/ptmx legitimately fail here.
        if let Ok(pair) = open() {
            assert_ne!(pair.master.as_raw_fd(), pair.slave.as_raw_fd());
            assert!(pair.master.as_raw_fd() >= 0);
        }
    }

    #[test]
    #[cfg(not(unix))]
    fn test_open_unsupported() {
        let err = open().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
