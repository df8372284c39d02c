//! Proxy reply head parsing

/// Status line and headers of the proxy's reply to CONNECT.
///
/// Only used for classification; it is dropped once the attempt resolves and
/// never forwarded to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub(crate) version: String,
    pub(crate) status: u16,
    pub(crate) reason: String,
    pub(crate) headers: Vec<(String, String)>,
}

impl ProxyResponse {
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Headers in arrival order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Header slots offered to the parser; a longer reply head is rejected.
const MAX_HEADERS: usize = 64;

/// How far the buffered reply head has been parsed.
#[derive(Debug)]
pub(crate) enum ParsedHead {
    /// The status line is not complete yet.
    Incomplete,
    /// Status line parsed, header block still open.
    StatusLine(ProxyResponse),
    /// Whole head parsed; `len` counts the bytes up to and including the blank line.
    Complete { response: ProxyResponse, len: usize },
    Invalid(httparse::Error),
}

/// Parse the reply head buffered so far.
///
/// Safe to call again with a longer buffer after every read.
pub(crate) fn parse_head(buf: &[u8]) -> ParsedHead {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parsed = httparse::Response::new(&mut headers);
    let status = match parsed.parse(buf) {
        Ok(status) => status,
        Err(e) => return ParsedHead::Invalid(e),
    };

    // `reason` is only filled once the status line terminator was seen.
    let (Some(minor), Some(code), Some(reason)) = (parsed.version, parsed.code, parsed.reason) else {
        return ParsedHead::Incomplete;
    };
    if !(100..=599).contains(&code) {
        return ParsedHead::Invalid(httparse::Error::Status);
    }

    let mut response = ProxyResponse {
        version: format!("1.{minor}"),
        status: code,
        reason: reason.trim().to_owned(),
        headers: Vec::new(),
    };
    match status {
        httparse::Status::Partial => ParsedHead::StatusLine(response),
        httparse::Status::Complete(len) => {
            response.headers = parsed
                .headers
                .iter()
                .map(|h| (h.name.to_owned(), String::from_utf8_lossy(h.value).trim().to_owned()))
                .collect();
            ParsedHead::Complete { response, len }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(head: &[u8]) -> (ProxyResponse, usize) {
        match parse_head(head) {
            ParsedHead::Complete { response, len } => (response, len),
            other => panic!("expected a complete head, got {other:?}"),
        }
    }

    #[test]
    fn parses_connection_established() {
        let (response, len) = complete(b"HTTP/1.1 200 Connection established\r\nProxy-Agent: mitmproxy\r\n\r\nTLS");
        assert_eq!(response.version(), "1.1");
        assert_eq!(response.status(), 200);
        assert_eq!(response.reason(), "Connection established");
        assert_eq!(response.header("proxy-agent"), Some("mitmproxy"));
        assert_eq!(len, 63);
        assert!(response.is_success());
    }

    #[test]
    fn reason_phrase_is_optional() {
        let (response, _) = complete(b"HTTP/1.0 407\r\n\r\n");
        assert_eq!(response.version(), "1.0");
        assert_eq!(response.status(), 407);
        assert_eq!(response.reason(), "");
        assert!(!response.is_success());
    }

    #[test]
    fn status_line_is_reported_before_headers_end() {
        assert!(matches!(parse_head(b"HTTP/1.1 407 Proxy Auth"), ParsedHead::Incomplete));
        match parse_head(b"HTTP/1.1 407 Proxy Authentication Required\r\nProxy-Authen") {
            ParsedHead::StatusLine(response) => {
                assert_eq!(response.status(), 407);
                assert_eq!(response.reason(), "Proxy Authentication Required");
                assert!(response.headers().is_empty());
            }
            other => panic!("expected a status line, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_heads() {
        for head in [
            &b"foo bar baz hallo\r\n"[..],
            b"HTTP/1.1 20 OK\r\n",
            b"HTTP/1.1 abc OK\r\n",
            b"HTTP/x.y 200 OK\r\n",
            b"HTTP/1.1 999 Nope\r\n",
            b"ICY 200 OK\r\n",
            b"HTTP/1.1 200 OK\r\nBad Name: x\r\n\r\n",
        ] {
            assert!(
                matches!(parse_head(head), ParsedHead::Invalid(_)),
                "{}",
                String::from_utf8_lossy(head)
            );
        }
    }

    #[test]
    fn header_flood_is_rejected() {
        let mut head = b"HTTP/1.1 200 OK\r\n".to_vec();
        for i in 0..=MAX_HEADERS {
            head.extend_from_slice(format!("X-{i}: v\r\n").as_bytes());
        }
        head.extend_from_slice(b"\r\n");
        assert!(matches!(parse_head(&head), ParsedHead::Invalid(httparse::Error::TooManyHeaders)));
    }
}
