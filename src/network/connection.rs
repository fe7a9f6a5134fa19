use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

const READ_CHUNK: usize = 4096;

/// Connection state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Reading,
    Writing,
    Closing,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConnectionError {
    Closed,
    TooLarge,
    Io(io::ErrorKind),
}

/// One accepted client socket and its buffers
pub struct ClientConnection {
    pub stream: TcpStream,
    pub peer: SocketAddr,
    pub state: ConnState,

    pub read_buffer: Vec<u8>,
    /// Bytes at the front of `read_buffer` taken by the request being answered
    pub consumed: usize,
    pub write_buffer: Vec<u8>,
    pub bytes_written: usize,

    pub last_activity: Instant,
    /// Set on the first byte of a request, cleared once it is answered
    pub request_started_at: Option<Instant>,

    pub keep_alive: bool,
    pub requests_handled: u32,
}

impl ClientConnection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            state: ConnState::Reading,
            read_buffer: Vec::with_capacity(READ_CHUNK),
            consumed: 0,
            write_buffer: Vec::new(),
            bytes_written: 0,
            last_activity: Instant::now(),
            request_started_at: None,
            keep_alive: true,
            requests_handled: 0,
        }
    }

    /// One non-blocking read. `Ok(0)` means nothing was available.
    pub fn try_read(&mut self, max_buffer: usize) -> Result<usize, ConnectionError> {
        let mut temp = [0u8; READ_CHUNK];

        match self.stream.read(&mut temp) {
            Ok(0) => Err(ConnectionError::Closed),
            Ok(n) => {
                if self.read_buffer.len() + n > max_buffer {
                    return Err(ConnectionError::TooLarge);
                }
                self.read_buffer.extend_from_slice(&temp[..n]);
                self.last_activity = Instant::now();
                self.request_started_at.get_or_insert(self.last_activity);
                Ok(n)
            }
            Err(e) if is_retryable(&e) => Ok(0),
            Err(e) => Err(ConnectionError::Io(e.kind())),
        }
    }

    /// One non-blocking write. `Ok(true)` once the whole response is out.
    pub fn try_write(&mut self) -> Result<bool, ConnectionError> {
        if self.write_complete() {
            return Ok(true);
        }

        match self.stream.write(&self.write_buffer[self.bytes_written..]) {
            Ok(n) => {
                self.bytes_written += n;
                if n > 0 {
                    self.last_activity = Instant::now();
                }
                Ok(self.write_complete())
            }
            Err(e) if is_retryable(&e) => Ok(false),
            Err(e) => Err(ConnectionError::Io(e.kind())),
        }
    }

    pub fn queue_response(&mut self, data: Vec<u8>) {
        self.write_buffer = data;
        self.bytes_written = 0;
        self.state = ConnState::Writing;
    }

    /// Keep-alive: get ready for the next request on the same socket.
    /// Bytes past the answered request are kept; they are the start of the
    /// next pipelined one.
    pub fn reset_for_next_request(&mut self) {
        let consumed = self.consumed.min(self.read_buffer.len());
        self.read_buffer.drain(..consumed);
        self.consumed = 0;
        self.write_buffer.clear();
        self.bytes_written = 0;
        self.state = ConnState::Reading;
        self.requests_handled += 1;
        self.request_started_at = (!self.read_buffer.is_empty()).then(Instant::now);
    }

    pub fn write_complete(&self) -> bool {
        self.bytes_written >= self.write_buffer.len()
    }

    /// Idle for too long, or stuck on a half-received request
    pub fn is_timed_out(&self, idle: Duration, request: Duration) -> bool {
        if self.last_activity.elapsed() > idle {
            return true;
        }
        match (self.state, self.request_started_at) {
            (ConnState::Reading, Some(started)) => started.elapsed() > request,
            _ => false,
        }
    }
}

fn is_retryable(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted)
}
