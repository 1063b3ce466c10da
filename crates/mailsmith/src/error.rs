//! Error types for composition and delivery.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing or delivering mail.
#[derive(Debug, Error)]
pub enum Error {
    /// An address-list entry failed validation under the strict policy.
    #[error("Invalid address in \"{field}\": {reason}")]
    InvalidAddressField {
        /// Name of the offending address field (rcpt, cc, bcc, reply-to).
        field: String,
        /// What was wrong with the entry.
        reason: String,
    },

    /// An attachment could not be turned into a MIME part.
    #[error("Invalid attachment \"{filename}\": {reason}")]
    InvalidAttachment {
        /// Attachment filename.
        filename: String,
        /// What was wrong with it.
        reason: String,
    },

    /// MIME assembly failed.
    #[error("MIME error: {0}")]
    Mime(#[from] mailsmith_mime::Error),

    /// SMTP transport failure.
    #[error("SMTP error: {0}")]
    Smtp(#[from] mailsmith_smtp::Error),

    /// POP3 transport failure.
    #[error("POP3 error: {0}")]
    Pop(#[from] mailsmith_pop::Error),

    /// Mailbox access was requested but the account has no POP3 server.
    #[error("Account has no POP3 server configured")]
    NoPopServer,

    /// Mailbox access was requested without login credentials.
    #[error("Account has no login credentials")]
    MissingCredentials,
}
