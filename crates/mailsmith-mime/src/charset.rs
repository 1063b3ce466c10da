//! Charset-bound text encoding and header-word profiles.
//!
//! A [`Charset`] converts logical text to bytes in a declared character set
//! and picks between the two header-word encoding profiles: pass-through
//! for 7-bit-clean content, RFC 2047 Q words otherwise.

use crate::encoding::{encode_q_words, is_7bit};
use std::fmt::Write as _;

/// Header-word encoding profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordProfile {
    /// Identity: the word goes on the wire as-is.
    Raw,
    /// RFC 2047 Q encoded word(s) carrying the charset label.
    Quoted,
}

/// A declared character set and its encoding behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    label: String,
}

impl Charset {
    /// Creates a charset from its MIME label (e.g. `"utf-8"`, `"koi8-r"`).
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Returns the charset label as declared.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Encodes text to bytes in this charset.
    ///
    /// Characters the charset cannot represent are substituted with
    /// numeric character references (`&#NNNN;`); encoding never fails.
    /// Unknown labels fall back to UTF-8.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let encoding =
            encoding_rs::Encoding::for_label(self.label.as_bytes()).unwrap_or(encoding_rs::UTF_8);
        let (bytes, _, _) = encoding.encode(text);
        bytes.into_owned()
    }

    /// Encodes text to pure ASCII, substituting numeric character
    /// references for everything above 127.
    ///
    /// This is the force-7-bit body path; it is not routed through the
    /// label registry because the WHATWG registry maps "us-ascii" to
    /// windows-1252.
    #[must_use]
    pub fn encode_ascii(text: &str) -> Vec<u8> {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch.is_ascii() {
                out.push(ch);
            } else {
                let _ = write!(out, "&#{};", u32::from(ch));
            }
        }
        out.into_bytes()
    }

    /// Selects the word profile for already charset-encoded content:
    /// [`WordProfile::Raw`] when 7-bit-clean, [`WordProfile::Quoted`]
    /// otherwise.
    #[must_use]
    pub fn select(&self, encoded: &[u8]) -> WordProfile {
        if is_7bit(encoded) {
            WordProfile::Raw
        } else {
            WordProfile::Quoted
        }
    }

    /// Renders charset-encoded content as a header word under the given
    /// profile.
    #[must_use]
    pub fn word(&self, encoded: &[u8], profile: WordProfile) -> String {
        match profile {
            WordProfile::Raw => String::from_utf8_lossy(encoded).into_owned(),
            WordProfile::Quoted => encode_q_words(encoded, &self.label),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::encoding::decode_rfc2047;

    #[test]
    fn utf8_encode_is_identity() {
        let cs = Charset::new("utf-8");
        assert_eq!(cs.encode("Héllo"), "Héllo".as_bytes());
    }

    #[test]
    fn latin1_encode_maps_code_points() {
        let cs = Charset::new("iso-8859-1");
        assert_eq!(cs.encode("café"), vec![0x63, 0x61, 0x66, 0xE9]);
    }

    #[test]
    fn unrepresentable_becomes_character_reference() {
        let cs = Charset::new("iso-8859-1");
        // Cyrillic is not representable in Latin-1
        let bytes = cs.encode("Ж");
        assert_eq!(bytes, b"&#1046;");
    }

    #[test]
    fn ascii_path_substitutes_references() {
        assert_eq!(Charset::encode_ascii("abc"), b"abc");
        assert_eq!(Charset::encode_ascii("Жuk"), b"&#1046;uk");
    }

    #[test]
    fn profile_selection() {
        let cs = Charset::new("utf-8");
        assert_eq!(cs.select(b"Hello"), WordProfile::Raw);
        assert_eq!(cs.select("Héllo".as_bytes()), WordProfile::Quoted);
    }

    #[test]
    fn raw_word_is_identity() {
        let cs = Charset::new("utf-8");
        assert_eq!(cs.word(b"Hello", WordProfile::Raw), "Hello");
    }

    #[test]
    fn quoted_word_round_trips() {
        let cs = Charset::new("utf-8");
        let encoded = cs.encode("Тема");
        let word = cs.word(&encoded, WordProfile::Quoted);
        assert!(word.starts_with("=?utf-8?Q?"));
        assert_eq!(decode_rfc2047(&word).unwrap(), "Тема");
    }
}
