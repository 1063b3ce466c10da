//! MIME encoding and decoding utilities.
//!
//! Supports Base64, Quoted-Printable, and RFC 2047 header words.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Returns true iff every byte has an ordinal value of 127 or less.
#[must_use]
pub fn is_7bit(data: &[u8]) -> bool {
    data.iter().all(|&b| b <= 0x7F)
}

/// Returns true iff every character has an ordinal value of 127 or less.
#[must_use]
pub fn is_7bit_str(text: &str) -> bool {
    text.is_ascii()
}

/// Encodes data as Base64 without line wrapping.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 wrapped at 76 columns with CRLF line endings,
/// ready to be used as a transfer-encoded part payload.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let b64 = STANDARD.encode(data);
    let mut out = String::with_capacity(b64.len() + (b64.len() / 76 + 1) * 2);
    for chunk in b64.as_bytes().chunks(76) {
        out.push_str(std::str::from_utf8(chunk).unwrap_or(""));
        out.push_str("\r\n");
    }
    out
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Maximum line length for Quoted-Printable encoding.
const MAX_LINE_LENGTH: usize = 76;

/// Maximum length of a single RFC 2047 encoded word.
const MAX_ENCODED_WORD_LEN: usize = 75;

/// Encodes a payload using Quoted-Printable encoding (RFC 2045).
///
/// The input is the already charset-encoded byte form of the text; bytes
/// that are not printable ASCII are escaped as `=XX` and lines are kept
/// under the 76-column limit with soft breaks.
#[must_use]
pub fn encode_quoted_printable(data: &[u8]) -> String {
    let mut result = String::new();
    let mut line_length = 0;

    for byte in data {
        if line_length >= MAX_LINE_LENGTH - 3 {
            result.push_str("=\r\n");
            line_length = 0;
        }

        match byte {
            // Printable ASCII except '=' and space (handled separately)
            b'!'..=b'<' | b'>'..=b'~' => {
                result.push(*byte as char);
                line_length += 1;
            }
            // Space is literal except at the line limit
            b' ' => {
                if line_length >= MAX_LINE_LENGTH - 1 {
                    result.push_str("=20");
                    line_length += 3;
                } else {
                    result.push(' ');
                    line_length += 1;
                }
            }
            _ => {
                result.push('=');
                let _ = write!(result, "{byte:02X}");
                line_length += 3;
            }
        }
    }

    result
}

/// Decodes Quoted-Printable data (RFC 2045) back to raw bytes.
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(text: &str) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '=' {
            // Soft line break
            if chars.peek() == Some(&'\r') {
                chars.next();
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    continue;
                }
            } else if chars.peek() == Some(&'\n') {
                chars.next();
                continue;
            }

            let hex: String = chars.by_ref().take(2).collect();
            if hex.len() == 2 {
                let byte = u8::from_str_radix(&hex, 16)
                    .map_err(|e| Error::InvalidEncoding(format!("Invalid hex: {e}")))?;
                result.push(byte);
            } else {
                return Err(Error::InvalidEncoding(
                    "Incomplete escape sequence".to_string(),
                ));
            }
        } else {
            let mut buf = [0u8; 4];
            result.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }

    Ok(result)
}

/// Encodes charset-encoded bytes as one or more RFC 2047 Q encoded words.
///
/// Format: `=?charset?Q?encoded-text?=`. Input longer than a single word
/// allows is split across several words joined with folding whitespace; a
/// decoder reassembles the payload before interpreting the charset.
#[must_use]
pub fn encode_q_words(data: &[u8], charset: &str) -> String {
    // "=?" + charset + "?Q?" + "?=" around each word
    let overhead = charset.len() + 7;
    let budget = MAX_ENCODED_WORD_LEN.saturating_sub(overhead).max(3);
    // Worst case every byte escapes to three characters
    let chunk_len = (budget / 3).max(1);

    let mut words = Vec::new();
    for chunk in data.chunks(chunk_len) {
        let mut enc = String::with_capacity(chunk.len() * 3);
        for &byte in chunk {
            match byte {
                b' ' => enc.push('_'),
                b'!'..=b'~' if byte != b'=' && byte != b'?' && byte != b'_' => {
                    enc.push(byte as char);
                }
                _ => {
                    enc.push('=');
                    let _ = write!(enc, "{byte:02X}");
                }
            }
        }
        words.push(format!("=?{charset}?Q?{enc}?="));
    }

    words.join("\r\n ")
}

/// Decodes bytes in the named charset to text.
///
/// Unknown labels fall back to UTF-8; malformed sequences are replaced,
/// never an error.
#[must_use]
pub fn decode_charset(data: &[u8], label: &str) -> String {
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes()).unwrap_or(encoding_rs::UTF_8);
    encoding.decode(data).0.into_owned()
}

/// One piece of a decoded header value.
enum Piece {
    Literal(String),
    Word {
        charset: String,
        scheme: u8,
        payload: Vec<u8>,
    },
}

/// Parses a single `=?charset?X?payload?=` token.
fn parse_encoded_word(token: &str) -> Option<Piece> {
    let inner = token.strip_prefix("=?")?.strip_suffix("?=")?;
    let mut fields = inner.splitn(3, '?');
    let charset = fields.next()?;
    let scheme = fields.next()?;
    let encoded = fields.next()?;

    if scheme.len() != 1 {
        return None;
    }
    let scheme = scheme.as_bytes()[0].to_ascii_uppercase();

    let payload = match scheme {
        b'B' => decode_base64(encoded).ok()?,
        b'Q' => decode_quoted_printable(&encoded.replace('_', " ")).ok()?,
        _ => return None,
    };

    Some(Piece::Word {
        charset: charset.to_ascii_lowercase(),
        scheme,
        payload,
    })
}

/// Decodes a header value that may contain RFC 2047 encoded words.
///
/// Whitespace between adjacent encoded words is ignored, and words sharing
/// a charset are reassembled before charset interpretation so that
/// multi-byte characters split across words survive.
///
/// # Errors
///
/// Returns an error if an encoded word carries invalid Base64 or
/// Quoted-Printable payload in a way that cannot be decoded.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    if !text.contains("=?") {
        return Ok(text.to_string());
    }

    let mut pieces: Vec<Piece> = Vec::new();
    for token in text.split_ascii_whitespace() {
        match parse_encoded_word(token) {
            Some(Piece::Word {
                charset,
                scheme,
                payload,
            }) => {
                if let Some(Piece::Word {
                    charset: prev_charset,
                    scheme: prev_scheme,
                    payload: prev_payload,
                }) = pieces.last_mut()
                    && *prev_charset == charset
                    && *prev_scheme == scheme
                {
                    prev_payload.extend_from_slice(&payload);
                } else {
                    pieces.push(Piece::Word {
                        charset,
                        scheme,
                        payload,
                    });
                }
            }
            _ => pieces.push(Piece::Literal(token.to_string())),
        }
    }

    let mut out = String::new();
    for (i, piece) in pieces.iter().enumerate() {
        if i > 0
            && (matches!(piece, Piece::Literal(_)) || matches!(pieces[i - 1], Piece::Literal(_)))
        {
            out.push(' ');
        }
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Word {
                charset, payload, ..
            } => out.push_str(&decode_charset(payload, charset)),
        }
    }

    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seven_bit_classification() {
        assert!(is_7bit(b"Hello, World!"));
        assert!(is_7bit_str("plain ascii 123"));
        assert!(!is_7bit(&[0x48, 0xC3, 0xA9]));
        assert!(!is_7bit_str("Héllo"));
        assert!(is_7bit(b""));
    }

    #[test]
    fn base64_encode_decode() {
        let data = b"Hello, World!";
        let encoded = encode_base64(data);
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");

        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn base64_wrapped_lines() {
        let data = vec![0xAB; 200];
        let encoded = encode_base64_wrapped(&data);
        for line in encoded.split("\r\n") {
            assert!(line.len() <= 76);
        }
        let joined: String = encoded.split("\r\n").collect();
        assert_eq!(decode_base64(&joined).unwrap(), data);
    }

    #[test]
    fn quoted_printable_encode() {
        assert_eq!(encode_quoted_printable(b"Hello, World!"), "Hello, World!");

        let encoded = encode_quoted_printable("Héllo".as_bytes());
        assert_eq!(encoded, "H=C3=A9llo");
    }

    #[test]
    fn quoted_printable_decode() {
        let decoded = decode_quoted_printable("Hello, World!").unwrap();
        assert_eq!(decoded, b"Hello, World!");

        let decoded = decode_quoted_printable("H=C3=A9llo").unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "Héllo");
    }

    #[test]
    fn quoted_printable_soft_line_break() {
        let decoded = decode_quoted_printable("Hello=\r\nWorld").unwrap();
        assert_eq!(decoded, b"HelloWorld");
    }

    #[test]
    fn quoted_printable_long_lines_stay_under_limit() {
        let data = vec![b'x'; 500];
        let encoded = encode_quoted_printable(&data);
        for line in encoded.split("\r\n") {
            assert!(line.len() <= MAX_LINE_LENGTH);
        }
    }

    #[test]
    fn q_word_ascii_specials() {
        let encoded = encode_q_words(b"a=b? c_d", "utf-8");
        assert!(encoded.starts_with("=?utf-8?Q?"));
        assert!(encoded.contains("=3D"));
        assert!(encoded.contains("=3F"));
        assert!(encoded.contains("=5F"));
        assert!(encoded.contains('_'));
    }

    #[test]
    fn q_word_round_trip() {
        let text = "Привет, мир";
        let encoded = encode_q_words(text.as_bytes(), "utf-8");
        let decoded = decode_rfc2047(&encoded).unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn q_words_stay_under_length_limit() {
        let text = "очень длинная тема письма с большим количеством кириллицы";
        let encoded = encode_q_words(text.as_bytes(), "utf-8");
        for word in encoded.split("\r\n ") {
            assert!(word.len() <= MAX_ENCODED_WORD_LEN, "word too long: {word}");
        }
        assert_eq!(decode_rfc2047(&encoded).unwrap(), text);
    }

    #[test]
    fn rfc2047_decode_b_word() {
        let decoded = decode_rfc2047("=?utf-8?B?SMOpbGxv?=").unwrap();
        assert_eq!(decoded, "Héllo");
    }

    #[test]
    fn rfc2047_decode_mixed_literal_and_word() {
        let decoded = decode_rfc2047("=?utf-8?Q?H=C3=A9llo?= <user@example.com>").unwrap();
        assert_eq!(decoded, "Héllo <user@example.com>");

        let decoded = decode_rfc2047("Hello =?utf-8?Q?=C3=A9?=").unwrap();
        assert_eq!(decoded, "Hello é");
    }

    #[test]
    fn rfc2047_plain_text_passes_through() {
        assert_eq!(decode_rfc2047("Hello").unwrap(), "Hello");
    }

    #[test]
    fn charset_decode_latin() {
        // "café" in ISO-8859-1
        let bytes = [0x63, 0x61, 0x66, 0xE9];
        assert_eq!(decode_charset(&bytes, "iso-8859-1"), "café");
    }

    proptest! {
        #[test]
        fn quoted_printable_round_trips(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let encoded = encode_quoted_printable(&data);
            let decoded = decode_quoted_printable(&encoded).unwrap();
            prop_assert_eq!(decoded, data);
        }

        #[test]
        fn q_words_round_trip_any_text(text in "\\PC{0,80}") {
            let encoded = encode_q_words(text.as_bytes(), "utf-8");
            let decoded = decode_rfc2047(&encoded).unwrap();
            prop_assert_eq!(decoded, text);
        }
    }
}
