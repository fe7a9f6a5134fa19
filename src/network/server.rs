use std::collections::HashMap;
use std::io;
use std::net::TcpListener;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::http::{HttpRequest, HttpResponse};

use super::connection::{ClientConnection, ConnState, ConnectionError};
use super::epoll_wrapper::{Epoll, Interest};
use super::route_request;

/// Maximum idle time before closing a connection
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum time to receive one complete request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How often to check for timeouts (milliseconds)
const TIMEOUT_CHECK_MS: i32 = 1000;

const MAX_REQUESTS_PER_CONN: u32 = 100;

/// Room for request line and headers on top of the body limit
const HEADER_ALLOWANCE: usize = 16 * 1024;

/// Bind a non-blocking TCP listener on `address`
pub fn create_listener(address: &str) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(address)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> io::Result<()> {
        let mut listeners: HashMap<RawFd, TcpListener> = HashMap::new();

        for addr in &self.config.listen_addresses {
            match create_listener(addr) {
                Ok(listener) => {
                    info!(address = %addr, "listening");
                    listeners.insert(listener.as_raw_fd(), listener);
                }
                Err(e) => warn!(address = %addr, error = %e, "failed to bind"),
            }
        }

        if listeners.is_empty() {
            return Err(io::Error::other("no listeners created"));
        }

        let mut poller = Epoll::create()?;
        for fd in listeners.keys() {
            poller.register(*fd, Interest::Readable)?;
        }

        let mut clients: HashMap<RawFd, ClientConnection> = HashMap::new();
        info!("ready to accept connections");

        loop {
            let events = poller.poll(TIMEOUT_CHECK_MS)?;

            for event in &events {
                if let Some(listener) = listeners.get(&event.fd) {
                    self.accept_connections(listener, &poller, &mut clients);
                    continue;
                }

                let Some(client) = clients.get_mut(&event.fd) else {
                    continue;
                };

                let mut should_close = event.has_error || event.hung_up;
                let previous = client.state;

                if event.can_read && !should_close {
                    should_close = self.handle_read(client).is_err();
                }

                if event.can_write && !should_close && client.state == ConnState::Writing {
                    match client.try_write() {
                        Ok(true) => {
                            if client.keep_alive && client.requests_handled < MAX_REQUESTS_PER_CONN {
                                client.reset_for_next_request();
                                // a pipelined request may already be buffered
                                self.process_buffered(client);
                            } else {
                                should_close = true;
                            }
                        }
                        Ok(false) => {}
                        Err(_) => should_close = true,
                    }
                }

                if !should_close && client.state != previous {
                    let interest = match client.state {
                        ConnState::Writing => Interest::Writable,
                        _ => Interest::Readable,
                    };
                    if let Err(e) = poller.modify(event.fd, interest) {
                        warn!(error = %e, "epoll modify failed");
                        should_close = true;
                    }
                }

                if should_close {
                    client.state = ConnState::Closing;
                }
            }

            self.cleanup_connections(&poller, &mut clients);
        }
    }

    fn accept_connections(
        &self,
        listener: &TcpListener,
        poller: &Epoll,
        clients: &mut HashMap<RawFd, ClientConnection>,
    ) {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nonblocking(true) {
                        warn!(peer = %addr, error = %e, "cannot make client non-blocking");
                        continue;
                    }

                    let fd = stream.as_raw_fd();
                    if let Err(e) = poller.register(fd, Interest::Readable) {
                        warn!(peer = %addr, error = %e, "failed to register client");
                        continue;
                    }

                    debug!(peer = %addr, "accepted connection");
                    clients.insert(fd, ClientConnection::new(stream, addr));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!(error = %e, "accept error");
                    break;
                }
            }
        }
    }

    /// Read what is available; queue a response once a full request arrived.
    fn handle_read(&self, client: &mut ClientConnection) -> Result<(), ConnectionError> {
        let limit = self.config.client_body_size_limit + HEADER_ALLOWANCE;
        match client.try_read(limit) {
            Ok(0) => Ok(()),
            Ok(_) => {
                self.process_buffered(client);
                Ok(())
            }
            Err(ConnectionError::TooLarge) => {
                warn!(peer = %client.peer, "request too large");
                client.keep_alive = false;
                client.queue_response(HttpResponse::bad_request().to_bytes(true));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Answer the request at the front of `read_buffer`, if it is complete.
    fn process_buffered(&self, client: &mut ClientConnection) {
        if client.state != ConnState::Reading {
            return;
        }
        match HttpRequest::parse_prefix(&client.read_buffer) {
            Ok(Some((request, used))) => {
                client.consumed = used;
                self.respond(client, &request);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(peer = %client.peer, error = %e, "malformed request");
                client.keep_alive = false;
                client.consumed = client.read_buffer.len();
                let mut response = HttpResponse::bad_request();
                response.set_header("Connection", "close");
                client.queue_response(response.to_bytes(true));
            }
        }
    }

    fn respond(&self, client: &mut ClientConnection, request: &HttpRequest) {
        client.keep_alive = request
            .header("Connection")
            .map(|v| !v.eq_ignore_ascii_case("close"))
            .unwrap_or(true);

        let mut response = route_request(request, &self.config);

        info!(
            peer = %client.peer,
            method = %request.method,
            path = %request.path,
            status = response.status_code,
            "request"
        );

        if client.keep_alive {
            response.set_header("Connection", "keep-alive");
            response.set_header(
                "Keep-Alive",
                &format!("timeout={}, max={}", IDLE_TIMEOUT.as_secs(), MAX_REQUESTS_PER_CONN),
            );
        } else {
            response.set_header("Connection", "close");
        }

        let include_body = !request.method.eq_ignore_ascii_case("HEAD");
        client.queue_response(response.to_bytes(include_body));
    }

    fn cleanup_connections(&self, poller: &Epoll, clients: &mut HashMap<RawFd, ClientConnection>) {
        let expired: Vec<RawFd> = clients
            .iter()
            .filter(|(_, conn)| {
                conn.state == ConnState::Closing || conn.is_timed_out(IDLE_TIMEOUT, REQUEST_TIMEOUT)
            })
            .map(|(fd, _)| *fd)
            .collect();

        for fd in expired {
            if let Some(conn) = clients.remove(&fd) {
                let _ = poller.unregister(fd);
                let _ = conn.stream.shutdown(std::net::Shutdown::Both);

                if conn.state == ConnState::Closing {
                    debug!(peer = %conn.peer, "connection closed");
                } else {
                    debug!(peer = %conn.peer, "connection timed out");
                }
            }
        }
    }
}
