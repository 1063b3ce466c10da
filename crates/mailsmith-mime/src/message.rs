//! MIME message structure, serialization, and parsing.

use crate::content_type::ContentType;
use crate::encoding::{
    decode_base64, decode_charset, decode_quoted_printable, encode_base64_wrapped,
    encode_quoted_printable,
};
use crate::error::{Error, Result};
use crate::header::Headers;
use std::fmt;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit text.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Parses a transfer encoding from its header value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
        }
    }
}

/// Generates a fresh multipart boundary.
#[must_use]
pub fn generate_boundary() -> String {
    format!("----=_Part_{}", uuid::Uuid::new_v4().simple())
}

/// MIME message part.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body, already transfer-encoded for the wire.
    pub body: Vec<u8>,
}

impl Part {
    /// Creates an empty part tagged with a content type.
    #[must_use]
    pub fn new(content_type: &ContentType) -> Self {
        let mut headers = Headers::new();
        headers.set("Content-Type", content_type.to_string());
        Self {
            headers,
            body: Vec::new(),
        }
    }

    /// Creates a part from parsed headers and raw body.
    #[must_use]
    pub const fn from_raw(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Gets the content type.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers.get("content-type").map_or_else(
            || Ok(ContentType::new("text", "plain")),
            ContentType::parse,
        )
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Stores a 7-bit-clean payload as-is and tags it "7bit".
    pub fn set_payload_7bit(&mut self, data: Vec<u8>) {
        self.headers.set(
            "Content-Transfer-Encoding",
            TransferEncoding::SevenBit.to_string(),
        );
        self.body = data;
    }

    /// Quoted-printable encodes the payload and tags it.
    pub fn set_payload_quoted_printable(&mut self, data: &[u8]) {
        self.headers.set(
            "Content-Transfer-Encoding",
            TransferEncoding::QuotedPrintable.to_string(),
        );
        self.body = encode_quoted_printable(data).into_bytes();
    }

    /// Base64 encodes the payload and tags it.
    pub fn set_payload_base64(&mut self, data: &[u8]) {
        self.headers.set(
            "Content-Transfer-Encoding",
            TransferEncoding::Base64.to_string(),
        );
        self.body = encode_base64_wrapped(data).into_bytes();
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => {
                let body_str = String::from_utf8_lossy(&self.body);
                let cleaned: String = body_str.chars().filter(|c| !c.is_whitespace()).collect();
                decode_base64(&cleaned)
            }
            TransferEncoding::QuotedPrintable => {
                decode_quoted_printable(&String::from_utf8_lossy(&self.body))
            }
            _ => Ok(self.body.clone()),
        }
    }

    /// Gets the decoded body as text, honoring the declared charset.
    ///
    /// # Errors
    ///
    /// Returns an error if transfer decoding fails.
    pub fn body_text(&self) -> Result<String> {
        let decoded = self.decode_body()?;
        let charset = self
            .content_type()
            .ok()
            .and_then(|ct| ct.charset().map(str::to_string))
            .unwrap_or_else(|| "utf-8".to_string());
        Ok(decode_charset(&decoded, &charset))
    }

    fn parse(segment: &str) -> Result<Self> {
        let (header_text, body_text) = split_at_blank_line(segment);
        let headers = Headers::parse(header_text)?;
        let body = body_text.trim_end_matches(['\r', '\n']).to_string();
        Ok(Self::from_raw(headers, body.into_bytes()))
    }

    fn write_wire(&self, out: &mut Vec<u8>) {
        let mut head = String::new();
        self.headers.write_wire(&mut head);
        head.push_str("\r\n");
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(&self.body);
        if !self.body.ends_with(b"\r\n") {
            out.extend_from_slice(b"\r\n");
        }
    }
}

/// MIME message: top-level headers plus either one body or multipart parts.
#[derive(Debug, Clone)]
pub struct Message {
    /// Message headers.
    pub headers: Headers,
    /// Message parts (empty for single-part messages).
    pub parts: Vec<Part>,
    /// Body for single-part messages, already transfer-encoded.
    pub body: Option<Vec<u8>>,
}

impl Message {
    /// Creates a single-part message.
    #[must_use]
    pub const fn single_part(headers: Headers, body: Vec<u8>) -> Self {
        Self {
            headers,
            parts: Vec::new(),
            body: Some(body),
        }
    }

    /// Creates a multipart message. The headers must already carry a
    /// multipart content type with a boundary.
    #[must_use]
    pub const fn multipart(headers: Headers, parts: Vec<Part>) -> Self {
        Self {
            headers,
            parts,
            body: None,
        }
    }

    /// Gets the content type.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers.get("content-type").map_or_else(
            || Ok(ContentType::new("text", "plain")),
            ContentType::parse,
        )
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get("from")
    }

    /// Gets the To header.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.headers.get("to")
    }

    /// Gets the Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// Gets the Date header.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.headers.get("date")
    }

    /// Gets the decoded body text for single-part messages.
    ///
    /// # Errors
    ///
    /// Returns an error for multipart messages or if decoding fails.
    pub fn body_text(&self) -> Result<String> {
        if !self.parts.is_empty() {
            return Err(Error::InvalidMultipart(
                "Use parts for multipart messages".to_string(),
            ));
        }

        let body = self
            .body
            .as_ref()
            .ok_or_else(|| Error::Parse("No body".to_string()))?;

        let part = Part::from_raw(self.headers.clone(), body.clone());
        part.body_text()
    }

    /// Serializes the message to its wire byte form.
    ///
    /// # Errors
    ///
    /// Returns an error if a multipart message lacks a boundary.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut head = String::new();
        self.headers.write_wire(&mut head);
        head.push_str("\r\n");
        let mut out = head.into_bytes();

        if self.parts.is_empty() {
            if let Some(body) = &self.body {
                out.extend_from_slice(body);
            }
            return Ok(out);
        }

        let boundary = self
            .content_type()?
            .boundary()
            .ok_or_else(|| Error::InvalidMultipart("Missing boundary".to_string()))?
            .to_string();

        out.extend_from_slice(b"This is a multi-part message in MIME format.\r\n");
        for part in &self.parts {
            out.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
            part.write_wire(&mut out);
        }
        out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Ok(out)
    }

    /// Parses a message from raw text, splitting multipart bodies into
    /// parts when a boundary is declared.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed headers or multipart structure.
    pub fn parse(raw: &str) -> Result<Self> {
        let (header_text, body_text) = split_at_blank_line(raw);
        let headers = Headers::parse(header_text)?;

        let content_type = headers
            .get("content-type")
            .map_or_else(|| Ok(ContentType::new("text", "plain")), ContentType::parse)?;

        if !content_type.is_multipart() {
            return Ok(Self::single_part(headers, body_text.as_bytes().to_vec()));
        }

        let boundary = content_type
            .boundary()
            .ok_or_else(|| Error::InvalidMultipart("Missing boundary".to_string()))?;
        let delimiter = format!("--{boundary}");
        let terminator = format!("--{boundary}--");

        let mut parts = Vec::new();
        let mut segment: Option<String> = None;
        for line in body_text.lines() {
            if line == terminator {
                break;
            }
            if line == delimiter {
                if let Some(text) = segment.take() {
                    parts.push(Part::parse(&text)?);
                }
                segment = Some(String::new());
                continue;
            }
            if let Some(text) = &mut segment {
                text.push_str(line);
                text.push_str("\r\n");
            }
        }
        if let Some(text) = segment {
            parts.push(Part::parse(&text)?);
        }

        Ok(Self::multipart(headers, parts))
    }
}

/// Splits raw message text into header text and body text at the first
/// blank line.
fn split_at_blank_line(raw: &str) -> (&str, &str) {
    if let Some(idx) = raw.find("\r\n\r\n") {
        (&raw[..idx], &raw[idx + 4..])
    } else if let Some(idx) = raw.find("\n\n") {
        (&raw[..idx], &raw[idx + 2..])
    } else {
        (raw, "")
    }
}
