use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

/// A request that can never become valid, however much more data arrives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request line: {0:?}")]
    RequestLine(String),

    #[error("request headers are not valid UTF-8")]
    NotUtf8,

    #[error("invalid Content-Length: {0:?}")]
    ContentLength(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    /// Raw request path, still percent-encoded
    pub path: String,
    /// Everything after `?`, still percent-encoded
    pub query: String,
    pub version: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

struct RequestLine {
    method: String,
    path: String,
    query: String,
    version: String,
}

impl HttpRequest {
    /// Parse HTTP request from buffer
    /// Returns Ok(None) if not enough data yet (keep reading!)
    pub fn parse(buffer: &[u8]) -> Result<Option<Self>, ParseError> {
        Ok(Self::parse_prefix(buffer)?.map(|(request, _)| request))
    }

    /// Like [`HttpRequest::parse`], also returning how many bytes of
    /// `buffer` the request occupied. Anything after that belongs to the
    /// next pipelined request.
    pub fn parse_prefix(buffer: &[u8]) -> Result<Option<(Self, usize)>, ParseError> {
        let Some(headers_end) = find_double_crlf(buffer) else {
            return Ok(None);
        };
        let header_text =
            std::str::from_utf8(&buffer[..headers_end]).map_err(|_| ParseError::NotUtf8)?;
        let mut lines = header_text.lines();

        let first_line = lines.next().unwrap_or_default();
        let request_line = parse_request_line(first_line)
            .ok_or_else(|| ParseError::RequestLine(first_line.to_string()))?;
        let headers = parse_headers(lines);

        let body_start = headers_end + 4;
        let body_len = match header_value(&headers, "Content-Length") {
            Some(len) => len
                .parse::<usize>()
                .map_err(|_| ParseError::ContentLength(len.to_string()))?,
            None => 0,
        };

        let available = buffer.len().saturating_sub(body_start);
        if available < body_len {
            debug!(expected = body_len, available, "waiting for request body");
            return Ok(None);
        }
        let body = buffer[body_start..body_start + body_len].to_vec();

        let request = HttpRequest {
            method: request_line.method,
            path: request_line.path,
            query: request_line.query,
            version: request_line.version,
            headers,
            body,
        };
        Ok(Some((request, body_start + body_len)))
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Percent-decoded request path
    pub fn decoded_path(&self) -> String {
        decode_component(&self.path, false)
    }

    /// Decoded value of a query parameter; the last occurrence wins.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query
            .split('&')
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key, true) == name).then(|| decode_component(value, true))
            })
            .last()
    }
}

fn decode_component(raw: &str, plus_as_space: bool) -> String {
    let raw = if plus_as_space {
        raw.replace('+', " ")
    } else {
        raw.to_string()
    };
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn find_double_crlf(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

fn parse_request_line(line: &str) -> Option<RequestLine> {
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?;
    let version = parts.next()?.to_string();
    if parts.next().is_some() || !version.starts_with("HTTP/") {
        return None;
    }

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (target.to_string(), String::new()),
    };

    Some(RequestLine { method, path, query, version })
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line_and_query() {
        let raw = b"GET /files?dir=.%2Fdocs&order=-size HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let req = HttpRequest::parse(raw).unwrap().unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/files");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.header("host"), Some("localhost"));
        assert_eq!(req.query_param("dir").as_deref(), Some("./docs"));
        assert_eq!(req.query_param("order").as_deref(), Some("-size"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn query_decoding_handles_plus_and_repeats() {
        let raw = b"GET /?dir=my+dir&dir=other%20dir&flag HTTP/1.1\r\n\r\n";
        let req = HttpRequest::parse(raw).unwrap().unwrap();
        assert_eq!(req.query_param("dir").as_deref(), Some("other dir"));
        assert_eq!(req.query_param("flag").as_deref(), Some(""));
    }

    #[test]
    fn path_decoding_keeps_plus() {
        let raw = b"GET /a+b/c%20d.txt HTTP/1.1\r\n\r\n";
        let req = HttpRequest::parse(raw).unwrap().unwrap();
        assert_eq!(req.decoded_path(), "/a+b/c d.txt");
    }

    #[test]
    fn incomplete_requests_wait_for_more_data() {
        assert_eq!(HttpRequest::parse(b"GET / HTTP/1.1\r\nHost: x\r\n").unwrap(), None);
        assert_eq!(
            HttpRequest::parse(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nab").unwrap(),
            None
        );

        let req = HttpRequest::parse(b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nab")
            .unwrap()
            .unwrap();
        assert_eq!(req.body, b"ab");
    }

    #[test]
    fn garbage_request_line_is_an_error() {
        assert!(matches!(
            HttpRequest::parse(b"GARBAGE\r\n\r\n"),
            Err(ParseError::RequestLine(_))
        ));
        assert!(matches!(
            HttpRequest::parse(b"GET / FTP/1.0\r\n\r\n"),
            Err(ParseError::RequestLine(_))
        ));
    }

    #[test]
    fn non_numeric_content_length_is_an_error() {
        assert_eq!(
            HttpRequest::parse(b"GET / HTTP/1.1\r\nContent-Length: abc\r\n\r\n").unwrap_err(),
            ParseError::ContentLength("abc".to_string())
        );
    }

    #[test]
    fn non_utf8_headers_are_an_error() {
        assert_eq!(
            HttpRequest::parse(b"GET /\xff HTTP/1.1\r\n\r\n").unwrap_err(),
            ParseError::NotUtf8
        );
    }

    #[test]
    fn prefix_length_covers_headers_and_body_only() {
        let raw = b"POST /a HTTP/1.1\r\nContent-Length: 2\r\n\r\nabGET /b HTTP/1.1\r\n\r\n";
        let (first, used) = HttpRequest::parse_prefix(raw).unwrap().unwrap();
        assert_eq!(first.path, "/a");
        assert_eq!(used, raw.len() - b"GET /b HTTP/1.1\r\n\r\n".len());

        let (second, rest) = HttpRequest::parse_prefix(&raw[used..]).unwrap().unwrap();
        assert_eq!(second.path, "/b");
        assert_eq!(rest, raw.len() - used);
    }
}
