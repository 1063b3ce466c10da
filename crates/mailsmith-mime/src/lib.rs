//! # mailsmith-mime
//!
//! MIME generation and encoding for outbound email.
//!
//! ## Features
//!
//! - **Message generation**: single-part and multipart/mixed messages with
//!   attachments, serialized to wire bytes
//! - **Encoding/Decoding**: Base64, Quoted-Printable, RFC 2047 header words
//! - **Charset profiles**: pass-through vs Q-encoded header words selected
//!   by a 7-bit check, with numeric character references for characters a
//!   charset cannot represent
//! - **Ordered headers**: insertion order is preserved on the wire
//!
//! ## Quick Start
//!
//! ### Building a message
//!
//! ```ignore
//! use mailsmith_mime::{ContentType, Headers, Message, Part};
//!
//! let ct = ContentType::new("text", "plain").with_parameter("charset", "utf-8");
//! let mut part = Part::new(&ct);
//! part.set_payload_7bit(b"Hello, World!".to_vec());
//!
//! let mut headers = Headers::new();
//! headers.set("Subject", "Test");
//! let message = Message::single_part(headers, part.body);
//! let wire = message.to_bytes()?;
//! ```
//!
//! ### Header words
//!
//! ```ignore
//! use mailsmith_mime::{Charset, HeaderValue};
//!
//! let charset = Charset::new("utf-8");
//! let mut value = HeaderValue::new(&charset);
//! value.append_text("Тема письма");       // becomes =?utf-8?Q?...?=
//! value.append_raw("<user@example.com>"); // addresses stay literal
//! let rendered = value.render();
//! ```
//!
//! ### Encoding/Decoding
//!
//! ```ignore
//! use mailsmith_mime::encoding::{encode_quoted_printable, decode_rfc2047};
//!
//! let encoded = encode_quoted_printable("Héllo, Wørld!".as_bytes());
//! let decoded = decode_rfc2047("=?utf-8?Q?H=C3=A9llo?=")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod charset;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use charset::{Charset, WordProfile};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::{HeaderValue, Headers};
pub use message::{Message, Part, TransferEncoding, generate_boundary};
