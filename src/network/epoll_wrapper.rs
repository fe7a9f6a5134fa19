use std::io;
use std::os::unix::io::RawFd;

const MAX_EVENTS: usize = 128;

/// Readiness reported for one descriptor
pub struct SocketEvent {
    pub fd: RawFd,
    pub can_read: bool,
    pub can_write: bool,
    pub has_error: bool,
    pub hung_up: bool,
}

/// What a descriptor is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Readable,
    Writable,
}

impl Interest {
    fn mask(self) -> u32 {
        let base = match self {
            Interest::Readable => libc::EPOLLIN,
            Interest::Writable => libc::EPOLLOUT,
        };
        // errors and hangups are always reported
        (base | libc::EPOLLERR | libc::EPOLLHUP) as u32
    }
}

/// Thin owner of an epoll instance
pub struct Epoll {
    epoll_fd: RawFd,
    events: Vec<libc::epoll_event>,
}

impl Epoll {
    pub fn create() -> io::Result<Self> {
        let fd = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self {
            epoll_fd: fd,
            events: vec![libc::epoll_event { events: 0, u64: 0 }; MAX_EVENTS],
        })
    }

    pub fn register(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.ctl(libc::EPOLL_CTL_ADD, fd, Some(interest))
    }

    pub fn modify(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.ctl(libc::EPOLL_CTL_MOD, fd, Some(interest))
    }

    /// Remove `fd`; an fd that is already gone is not an error.
    pub fn unregister(&self, fd: RawFd) -> io::Result<()> {
        match self.ctl(libc::EPOLL_CTL_DEL, fd, None) {
            Err(err) if err.raw_os_error() == Some(libc::ENOENT) => Ok(()),
            other => other,
        }
    }

    fn ctl(&self, op: libc::c_int, fd: RawFd, interest: Option<Interest>) -> io::Result<()> {
        let mut ev = libc::epoll_event {
            events: interest.map(Interest::mask).unwrap_or(0),
            u64: fd as u64,
        };
        let ev_ptr = if interest.is_some() {
            &mut ev as *mut libc::epoll_event
        } else {
            std::ptr::null_mut()
        };

        let result = unsafe { libc::epoll_ctl(self.epoll_fd, op, fd, ev_ptr) };
        if result < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Wait up to `timeout_ms` (-1 blocks). EINTR yields no events.
    pub fn poll(&mut self, timeout_ms: i32) -> io::Result<Vec<SocketEvent>> {
        let count = unsafe {
            libc::epoll_wait(
                self.epoll_fd,
                self.events.as_mut_ptr(),
                self.events.len() as i32,
                timeout_ms,
            )
        };

        if count < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(Vec::new());
            }
            return Err(err);
        }

        Ok(self.events[..count as usize]
            .iter()
            .map(|ev| {
                let flags = ev.events;
                SocketEvent {
                    fd: ev.u64 as RawFd,
                    can_read: flags & libc::EPOLLIN as u32 != 0,
                    can_write: flags & libc::EPOLLOUT as u32 != 0,
                    has_error: flags & libc::EPOLLERR as u32 != 0,
                    hung_up: flags & libc::EPOLLHUP as u32 != 0,
                }
            })
            .collect())
    }
}

impl Drop for Epoll {
    fn drop(&mut self) {
        unsafe { libc::close(self.epoll_fd) };
    }
}
