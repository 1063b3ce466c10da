//! Outbound message and attachment value types.

use crate::address::AddressField;

/// One file to embed in a message.
///
/// A content-id marks the attachment as inline (referenced from an HTML
/// body via `cid:`); without one it gets the attachment disposition.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Filename shown to the recipient.
    pub filename: String,
    /// Raw content bytes.
    pub content: Vec<u8>,
    /// Explicit MIME type; guessed from the filename extension when
    /// absent.
    pub mimetype: Option<String>,
    /// Charset the content bytes are in, for text attachments.
    pub charset: Option<String>,
    /// Content-ID for inline use.
    pub content_id: Option<String>,
}

impl Attachment {
    /// Creates an attachment from a filename and its content.
    #[must_use]
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            mimetype: None,
            charset: None,
            content_id: None,
        }
    }

    /// Sets an explicit MIME type.
    #[must_use]
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    /// Declares the charset of the content bytes.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Marks the attachment inline under the given Content-ID.
    #[must_use]
    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }
}

/// One logical outbound message.
///
/// Address fields accept a bare address, a (name, address) pair, or a
/// list of either; they are normalized at assembly time without mutating
/// the email.
#[derive(Debug, Clone)]
pub struct Email {
    /// Primary recipients.
    pub rcpt: AddressField,
    /// Carbon-copy recipients.
    pub cc: AddressField,
    /// Blind-carbon-copy recipients.
    pub bcc: AddressField,
    /// Reply-To addresses, if any.
    pub reply_to: Option<AddressField>,
    /// Subject line (logical text, not yet encoded).
    pub subject: String,
    /// Body text (logical text, not yet encoded).
    pub body: String,
    /// Declared body MIME type, `type/subtype`.
    pub mimetype: String,
    /// Declared charset name.
    pub charset: String,
    /// Encode the body to pure ASCII regardless of charset.
    pub force_7bit: bool,
    /// Files to embed, in order.
    pub attachments: Vec<Attachment>,
}

impl Email {
    /// Creates a text/plain UTF-8 email.
    #[must_use]
    pub fn new(
        rcpt: impl Into<AddressField>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            rcpt: rcpt.into(),
            cc: AddressField::new(),
            bcc: AddressField::new(),
            reply_to: None,
            subject: subject.into(),
            body: body.into(),
            mimetype: "text/plain".to_string(),
            charset: "utf-8".to_string(),
            force_7bit: false,
            attachments: Vec::new(),
        }
    }

    /// Sets the declared body MIME type (e.g. "text/html").
    #[must_use]
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = mimetype.into();
        self
    }

    /// Sets the CC list.
    #[must_use]
    pub fn with_cc(mut self, cc: impl Into<AddressField>) -> Self {
        self.cc = cc.into();
        self
    }

    /// Sets the BCC list.
    #[must_use]
    pub fn with_bcc(mut self, bcc: impl Into<AddressField>) -> Self {
        self.bcc = bcc.into();
        self
    }

    /// Sets the Reply-To addresses.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: impl Into<AddressField>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Sets the declared charset.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Forces the body onto the wire as pure ASCII.
    #[must_use]
    pub const fn with_force_7bit(mut self, force: bool) -> Self {
        self.force_7bit = force;
        self
    }

    /// Appends an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_defaults() {
        let email = Email::new("a@example.com", "Subject", "Body");
        assert_eq!(email.mimetype, "text/plain");
        assert_eq!(email.charset, "utf-8");
        assert!(!email.force_7bit);
        assert!(email.cc.is_empty());
        assert!(email.bcc.is_empty());
        assert!(email.reply_to.is_none());
        assert!(email.attachments.is_empty());
    }

    #[test]
    fn builder_chain() {
        let email = Email::new("a@example.com", "S", "B")
            .with_mimetype("text/html")
            .with_cc(("Bob", "bob@example.com"))
            .with_bcc("hidden@example.com")
            .with_reply_to("reply@example.com")
            .with_charset("koi8-r")
            .with_force_7bit(true)
            .attach(Attachment::new("a.txt", b"data".to_vec()));

        assert_eq!(email.mimetype, "text/html");
        assert_eq!(email.cc.len(), 1);
        assert_eq!(email.bcc.len(), 1);
        assert!(email.reply_to.is_some());
        assert_eq!(email.charset, "koi8-r");
        assert!(email.force_7bit);
        assert_eq!(email.attachments.len(), 1);
    }

    #[test]
    fn attachment_builders() {
        let attachment = Attachment::new("logo.png", vec![0x89, 0x50])
            .with_mimetype("image/png")
            .with_content_id("logo");
        assert_eq!(attachment.mimetype.as_deref(), Some("image/png"));
        assert_eq!(attachment.content_id.as_deref(), Some("logo"));
        assert!(attachment.charset.is_none());
    }
}
