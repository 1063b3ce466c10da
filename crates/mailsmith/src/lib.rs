//! # mailsmith
//!
//! Outbound email composition and delivery.
//!
//! Mailsmith assembles headers, body text, and file attachments (any of
//! which may contain non-ASCII characters) into a correctly encoded MIME
//! message, and submits it over SMTP. A POP3 pass-through covers basic
//! mailbox maintenance.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailsmith::{Account, Attachment, Email, Mailer};
//!
//! let account = Account::new("me@example.com", "Me", "smtp.example.com")
//!     .with_credentials("me@example.com", "secret")
//!     .with_tls(true)
//!     .with_port(465);
//!
//! let email = Email::new("you@example.com", "Report", "See attached.")
//!     .with_cc(("Bob", "bob@example.com"))
//!     .attach(Attachment::new("report.csv", csv_bytes));
//!
//! let mailer = Mailer::new(account);
//! mailer.send(&email).await?;
//! ```
//!
//! ## Encoding behavior
//!
//! - Header words that are 7-bit-clean go out literally; anything else
//!   becomes RFC 2047 Q encoded words in the declared charset.
//! - Bodies are tagged `7bit` when clean, quoted-printable otherwise;
//!   attachments are always base64.
//! - Characters the declared charset cannot represent are substituted
//!   with numeric character references instead of failing.
//!
//! ## Crates
//!
//! The heavy lifting lives in the sibling crates: `mailsmith-mime`
//! (assembly/encoding primitives), `mailsmith-smtp` and `mailsmith-pop`
//! (transport clients).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod account;
mod address;
mod assemble;
mod email;
mod error;
mod send;

pub use account::{Account, DEFAULT_SMTP_PORT};
pub use address::{AddressEntry, AddressField, AddressPolicy, Mailbox, normalize};
pub use assemble::{AssembledMessage, assemble};
pub use email::{Attachment, Email};
pub use error::{Error, Result};
pub use send::Mailer;

pub use mailsmith_mime as mime;
pub use mailsmith_pop as pop;
pub use mailsmith_smtp as smtp;
