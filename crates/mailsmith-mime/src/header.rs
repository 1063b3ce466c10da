//! Message headers and the folding header-value builder.

use crate::charset::{Charset, WordProfile};
use crate::error::Result;
use std::fmt;

/// Ordered collection of message headers.
///
/// Entries keep their insertion order on the wire; setting a name that is
/// already present replaces its value in place. Name lookup is
/// case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header value, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Gets the value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Removes a header.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no headers are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes all headers in wire form (`Name: value` with CRLF endings).
    pub fn write_wire(&self, out: &mut String) {
        for (name, value) in &self.entries {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
    }

    /// Parses headers from raw text, honoring continuation lines.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature matches the other parsers in
    /// this crate.
    pub fn parse(text: &str) -> Result<Self> {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = &mut current {
                    value.push(' ');
                    value.push_str(line.trim());
                }
            } else {
                if let Some((name, value)) = current.take() {
                    headers.set(name, value.trim().to_string());
                }
                if let Some((name, value)) = line.split_once(':') {
                    current = Some((name.trim().to_string(), value.trim().to_string()));
                }
            }
        }

        if let Some((name, value)) = current {
            headers.set(name, value.trim().to_string());
        }

        Ok(headers)
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_wire(&mut out);
        f.write_str(&out)
    }
}

/// Builds one logical header value from an ordered sequence of word
/// fragments, each encoded under the profile the 7-bit check selects.
///
/// Fragments are separated by a single space when rendered, except that a
/// literal comma fragment attaches to the fragment before it.
#[derive(Debug)]
pub struct HeaderValue<'a> {
    charset: &'a Charset,
    chunks: Vec<String>,
}

impl<'a> HeaderValue<'a> {
    /// Creates an empty value bound to a charset.
    #[must_use]
    pub fn new(charset: &'a Charset) -> Self {
        Self {
            charset,
            chunks: Vec::new(),
        }
    }

    /// Appends logical text: encoded to the charset, then emitted raw if
    /// 7-bit-clean or as Q encoded words otherwise.
    pub fn append_text(&mut self, text: &str) {
        let encoded = self.charset.encode(text);
        let profile = self.charset.select(&encoded);
        self.chunks.push(self.charset.word(&encoded, profile));
    }

    /// Appends a fragment under the Raw profile unconditionally
    /// (bracketed addresses, separators).
    pub fn append_raw(&mut self, text: &str) {
        self.chunks.push(text.to_string());
    }

    /// Returns true if nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Renders the folded header value.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, chunk) in self.chunks.iter().enumerate() {
            if i > 0 && !chunk.starts_with(',') {
                out.push(' ');
            }
            out.push_str(chunk);
        }
        out
    }
}
