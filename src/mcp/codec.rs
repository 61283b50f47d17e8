//! Framing of JSON-RPC messages over a byte stream
//!
//! Messages are bare JSON values with no length prefix. A value may span
//! several lines and several values may share one line; whitespace between
//! them is ignored. Responses are written as one compact JSON line each.

use std::io::ErrorKind;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::errors::CodecError;
use crate::mcp::rpc::{Request, Response};

pub struct Codec<R, W> {
    reader: R,
    writer: W,
    buffer: String,
    scanner: Scanner,
    eof: bool,
}

enum Frame {
    Complete { value: Value, consumed: usize },
    Partial,
    Blank,
    Invalid(String),
}

/// Tracks bracket depth across reads so each byte is inspected once.
#[derive(Debug, Default)]
struct Scanner {
    offset: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Scanner {
    /// Returns the end of the first top-level object or array in `bytes`.
    fn scan(&mut self, bytes: &[u8]) -> Option<usize> {
        while self.offset < bytes.len() {
            let byte = bytes[self.offset];
            self.offset += 1;

            if self.in_string {
                match byte {
                    _ if self.escaped => self.escaped = false,
                    b'\\' => self.escaped = true,
                    b'"' => self.in_string = false,
                    _ => {}
                }
                continue;
            }

            match byte {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' if self.depth > 0 => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Some(self.offset);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

impl<R, W> Codec<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            buffer: String::new(),
            scanner: Scanner::default(),
            eof: false,
        }
    }

    /// Reads the next request.
    ///
    /// Returns [`CodecError::Closed`] once the input is exhausted and
    /// [`CodecError::Malformed`] for input that is not a request envelope; the
    /// offending input is discarded so the next call starts clean.
    pub async fn decode(&mut self) -> Result<Request, CodecError> {
        loop {
            match self.next_frame() {
                Frame::Complete { value, consumed } => {
                    self.buffer.replace_range(..consumed, "");
                    self.scanner = Scanner::default();
                    return serde_json::from_value(value)
                        .map_err(|err| CodecError::malformed(err.to_string()));
                }
                Frame::Invalid(message) => {
                    self.discard();
                    return Err(CodecError::malformed(message));
                }
                Frame::Blank => self.discard(),
                Frame::Partial => {}
            }

            if self.eof {
                if self.buffer.is_empty() {
                    return Err(CodecError::Closed);
                }
                self.discard();
                return Err(CodecError::malformed("stream ended inside a message"));
            }

            match self.reader.read_line(&mut self.buffer).await {
                Ok(0) => self.eof = true,
                Ok(_) => {}
                Err(err) if err.kind() == ErrorKind::InvalidData => {
                    self.discard();
                    return Err(CodecError::malformed(err.to_string()));
                }
                Err(err) => return Err(CodecError::Io(err)),
            }
        }
    }

    pub async fn encode(&mut self, response: &Response) -> Result<(), CodecError> {
        let mut line = serde_json::to_vec(response).map_err(CodecError::Encode)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Objects and arrays are parsed once the scanner sees them close; any
    /// other leading token is handed to the parser directly, since it cannot
    /// span lines.
    fn next_frame(&mut self) -> Frame {
        let Some(start) = self.buffer.find(|c: char| !c.is_whitespace()) else {
            return Frame::Blank;
        };

        if !self.buffer[start..].starts_with(['{', '[']) {
            return frame(&self.buffer);
        }

        match self.scanner.scan(self.buffer.as_bytes()) {
            Some(end) => match frame(&self.buffer[..end]) {
                Frame::Partial => Frame::Invalid("unbalanced JSON value".to_string()),
                complete => complete,
            },
            None => Frame::Partial,
        }
    }

    fn discard(&mut self) {
        self.buffer.clear();
        self.scanner = Scanner::default();
    }
}

fn frame(buffer: &str) -> Frame {
    let mut values = serde_json::Deserializer::from_str(buffer).into_iter::<Value>();
    match values.next() {
        Some(Ok(value)) => Frame::Complete {
            value,
            consumed: values.byte_offset(),
        },
        Some(Err(err)) if err.is_eof() => Frame::Partial,
        Some(Err(err)) => Frame::Invalid(err.to_string()),
        None => Frame::Blank,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mcp::rpc::RequestId;

    fn codec(input: &str) -> Codec<&[u8], Vec<u8>> {
        Codec::new(input.as_bytes(), Vec::new())
    }

    #[tokio::test]
    async fn decodes_newline_delimited_requests() {
        let mut codec = codec(concat!(
            r#"{"jsonrpc":"2.0","method":"initialize","id":"1"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialize","id":"2"}"#,
            "\n"
        ));

        let first = codec.decode().await.expect("first request");
        let second = codec.decode().await.expect("second request");

        assert_eq!(first.method, "initialize");
        assert_eq!(second.id, Some(RequestId::from("2")));
        assert!(matches!(codec.decode().await, Err(CodecError::Closed)));
    }

    #[tokio::test]
    async fn decodes_value_spanning_lines() {
        let mut codec = codec(
            "{\n  \"jsonrpc\": \"2.0\",\n  \"method\": \"initialize\",\n  \"id\": \"1\",\n  \"params\": {\"clientInfo\": {\"name\": \"test-client\"}}\n}\n",
        );

        let request = codec.decode().await.expect("request");
        assert_eq!(request.method, "initialize");
        assert_eq!(
            request.params,
            Some(json!({"clientInfo": {"name": "test-client"}}))
        );
    }

    #[tokio::test]
    async fn decodes_several_values_on_one_line() {
        let mut codec = codec(
            r#"{"jsonrpc":"2.0","method":"a","id":"1"} {"jsonrpc":"2.0","method":"b","id":"2"}"#,
        );

        assert_eq!(codec.decode().await.expect("first").method, "a");
        assert_eq!(codec.decode().await.expect("second").method, "b");
        assert!(matches!(codec.decode().await, Err(CodecError::Closed)));
    }

    #[tokio::test]
    async fn malformed_input_is_skipped() {
        let mut codec = codec(concat!(
            "{not json}\n",
            r#"{"jsonrpc":"2.0","method":"initialize","id":"1"}"#,
            "\n"
        ));

        let err = codec.decode().await.expect_err("malformed");
        assert!(matches!(err, CodecError::Malformed(_)));
        assert!(!err.is_terminal());
        assert_eq!(codec.decode().await.expect("recovered").method, "initialize");
    }

    #[tokio::test]
    async fn non_object_value_is_malformed() {
        let mut codec = codec("[1, 2, 3]\n");

        assert!(matches!(
            codec.decode().await,
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(codec.decode().await, Err(CodecError::Closed)));
    }

    #[tokio::test]
    async fn truncated_message_then_closed() {
        let mut codec = codec(r#"{"jsonrpc":"2.0","method":"#);

        assert!(matches!(
            codec.decode().await,
            Err(CodecError::Malformed(_))
        ));
        let err = codec.decode().await.expect_err("closed");
        assert!(matches!(err, CodecError::Closed));
        assert!(err.is_terminal());
    }

    #[tokio::test]
    async fn empty_and_blank_input_is_closed() {
        assert!(matches!(codec("").decode().await, Err(CodecError::Closed)));
        assert!(matches!(
            codec("\n  \n\t\n").decode().await,
            Err(CodecError::Closed)
        ));
    }

    #[tokio::test]
    async fn decodes_large_pretty_printed_message() {
        let mut input = String::from(
            "{\n  \"jsonrpc\": \"2.0\",\n  \"method\": \"initialize\",\n  \"id\": \"1\",\n  \"params\": {\n    \"items\": [\n",
        );
        for index in 0..20_000 {
            input.push_str(&format!("      \"item-{index} {{[\\\"}}]\",\n"));
        }
        input.push_str("      \"last\"\n    ]\n  }\n}\n");
        input.push_str(r#"{"jsonrpc":"2.0","method":"next","id":"2"}"#);

        let mut codec = codec(&input);

        let request = codec.decode().await.expect("large request");
        let items = request.params.expect("params")["items"]
            .as_array()
            .expect("items array")
            .len();
        assert_eq!(items, 20_001);
        assert_eq!(codec.decode().await.expect("following request").method, "next");
    }

    #[test]
    fn scanner_ignores_brackets_inside_strings() {
        let mut scanner = Scanner::default();
        let text = br#"{"a": "}]\"{", "b": [1, {"c": "]"}]} trailing"#;

        let end = scanner.scan(text).expect("complete value");

        assert_eq!(&text[..end], br#"{"a": "}]\"{", "b": [1, {"c": "]"}]}"#);
    }

    #[test]
    fn scanner_resumes_across_chunks() {
        let mut scanner = Scanner::default();
        let mut text = br#"{"a": ["x","#.to_vec();

        assert_eq!(scanner.scan(&text), None);
        text.extend_from_slice(br#" "y"]}"#);
        assert_eq!(scanner.scan(&text), Some(text.len()));
    }

    #[tokio::test]
    async fn encode_writes_one_compact_line() {
        let mut codec = codec("");
        let response =
            Response::success(RequestId::from("1"), &json!({"ok": true})).expect("response");

        codec.encode(&response).await.expect("encode");

        assert_eq!(
            String::from_utf8(codec.writer().clone()).expect("utf8"),
            "{\"jsonrpc\":\"2.0\",\"id\":\"1\",\"result\":{\"ok\":true}}\n"
        );
    }
}
