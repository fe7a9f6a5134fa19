use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status_code: u16, status_text: &str) -> Self {
        Self {
            status_code,
            status_text: status_text.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Response for any status code this server emits
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            200 => Self::ok(),
            400 => Self::bad_request(),
            404 => Self::not_found(),
            405 => Self::method_not_allowed(),
            _ => Self::internal_error(),
        }
    }

    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.insert(key.to_string(), value.to_string());
    }

    pub fn set_body(&mut self, text: &str) {
        self.body = text.as_bytes().to_vec();
    }

    pub fn set_body_bytes(&mut self, bytes: Vec<u8>) {
        self.body = bytes;
    }

    /// 200 with an HTML body
    pub fn html(body: String) -> Self {
        let mut resp = Self::ok();
        resp.set_header("Content-Type", "text/html; charset=utf-8");
        resp.set_body_bytes(body.into_bytes());
        resp
    }

    /// Serialize for the socket. HEAD responses keep their headers but drop the body.
    pub fn to_bytes(&self, include_body: bool) -> Vec<u8> {
        let mut output = Vec::new();

        let status_line = format!("HTTP/1.1 {} {}\r\n", self.status_code, self.status_text);
        output.extend_from_slice(status_line.as_bytes());

        for (key, value) in &self.headers {
            output.extend_from_slice(format!("{}: {}\r\n", key, value).as_bytes());
        }

        if !self.headers.contains_key("Content-Length") {
            output.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }

        output.extend_from_slice(b"\r\n");

        if include_body {
            output.extend_from_slice(&self.body);
        }

        output
    }

    pub fn ok() -> Self {
        Self::new(200, "OK")
    }

    pub fn not_found() -> Self {
        Self::new(404, "Not Found")
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }

    pub fn bad_request() -> Self {
        Self::new(400, "Bad Request")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(405, "Method Not Allowed")
    }
}
