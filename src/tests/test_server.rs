use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use super::test_router::site;
use crate::network::Server;

/// Start a server for the test site on a free loopback port.
fn spawn_server() -> (TempDir, String) {
    let (tmp, mut config) = site();
    let addr = {
        let spare = TcpListener::bind("127.0.0.1:0").unwrap();
        spare.local_addr().unwrap().to_string()
    };
    config.listen_addresses = vec![addr.clone()];
    thread::spawn(move || Server::new(config).run());
    (tmp, addr)
}

fn connect(addr: &str) -> TcpStream {
    for _ in 0..100 {
        if let Ok(stream) = TcpStream::connect(addr) {
            stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
            return stream;
        }
        thread::sleep(Duration::from_millis(20));
    }
    panic!("server at {addr} never came up");
}

fn exchange(addr: &str, raw: &[u8]) -> String {
    let mut stream = connect(addr);
    stream.write_all(raw).unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

#[test]
fn garbage_request_gets_bad_request_and_close() {
    let (_tmp, addr) = spawn_server();
    let reply = exchange(&addr, b"GARBAGE\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 400"), "{reply}");
    assert!(reply.contains("Connection: close"), "{reply}");
}

#[test]
fn bad_content_length_gets_bad_request() {
    let (_tmp, addr) = spawn_server();
    let reply = exchange(&addr, b"GET / HTTP/1.1\r\nContent-Length: abc\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 400"), "{reply}");
}

#[test]
fn non_utf8_request_line_gets_bad_request() {
    let (_tmp, addr) = spawn_server();
    let reply = exchange(&addr, b"GET /\xff HTTP/1.1\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 400"), "{reply}");
}

#[test]
fn pipelined_requests_are_all_answered() {
    let (_tmp, addr) = spawn_server();
    let reply = exchange(
        &addr,
        b"GET /?dir=.%2Fdocs HTTP/1.1\r\nHost: x\r\n\r\n\
          GET /docs/small.txt HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n",
    );
    assert_eq!(reply.matches("HTTP/1.1 200 OK").count(), 2, "{reply}");
    assert!(reply.contains(">big.txt</a>"));
    assert!(reply.ends_with("tiny"));
}
