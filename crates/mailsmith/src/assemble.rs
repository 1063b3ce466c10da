//! Message assembly: turns an [`Email`] into a wire-ready MIME message
//! plus its delivery envelope.

use crate::account::Account;
use crate::address::{AddressPolicy, Mailbox, normalize};
use crate::email::{Attachment, Email};
use crate::error::{Error, Result};
use chrono::Local;
use mailsmith_mime::{
    Charset, ContentType, HeaderValue, Headers, Message, Part, encoding::is_7bit,
    generate_boundary,
};

/// A fully assembled message with its envelope.
#[derive(Debug)]
pub struct AssembledMessage {
    /// The MIME message, ready to serialize.
    pub message: Message,
    /// Envelope sender address.
    pub sender: String,
    /// Flattened envelope recipients: rcpt, then cc, then bcc.
    pub recipients: Vec<String>,
}

/// Assembles one email into a message and envelope.
///
/// Address fields are normalized into local copies; the email itself is
/// not modified.
///
/// # Errors
///
/// Returns an error when an address fails strict validation, the
/// declared MIME type is malformed, or an attachment cannot be built.
pub fn assemble(
    account: &Account,
    email: &Email,
    policy: AddressPolicy,
) -> Result<AssembledMessage> {
    let rcpt = normalize(&email.rcpt, "rcpt", policy)?;
    let cc = normalize(&email.cc, "cc", policy)?;
    let bcc = normalize(&email.bcc, "bcc", policy)?;
    let reply_to = match &email.reply_to {
        Some(field) => Some(normalize(field, "reply-to", policy)?),
        None => None,
    };

    let charset = Charset::new(&email.charset);

    // Primary body part
    let (main_type, sub_type) = ContentType::split_type(&email.mimetype)?;
    let mut content_type = ContentType::new(main_type, sub_type);
    if !email.force_7bit {
        content_type.set_parameter("charset", &email.charset);
    }
    let mut body_part = Part::new(&content_type);

    let body_bytes = if email.force_7bit {
        Charset::encode_ascii(&email.body)
    } else {
        charset.encode(&email.body)
    };
    if is_7bit(&body_bytes) {
        body_part.set_payload_7bit(body_bytes);
    } else {
        body_part.set_payload_quoted_printable(&body_bytes);
    }

    // Top-level headers
    let mut headers = Headers::new();
    headers.set(
        "Date",
        Local::now().format("%a, %d %b %Y %H:%M:%S %z").to_string(),
    );

    let mut from = HeaderValue::new(&charset);
    from.append_text(&account.from_name);
    from.append_raw(&format!("<{}>", account.email));
    headers.set("From", from.render());

    headers.set("To", address_list_value(&charset, &rcpt));
    if !cc.is_empty() {
        headers.set("CC", address_list_value(&charset, &cc));
    }
    if !bcc.is_empty() {
        headers.set("BCC", address_list_value(&charset, &bcc));
    }

    let mut subject = HeaderValue::new(&charset);
    subject.append_text(&email.subject);
    headers.set("Subject", subject.render());

    if let Some(reply_to) = &reply_to {
        headers.set("Reply-To", address_list_value(&charset, reply_to));
    }

    headers.set("MIME-Version", "1.0");

    let message = if email.attachments.is_empty() {
        for (name, value) in body_part.headers.iter() {
            headers.set(name, value);
        }
        Message::single_part(headers, body_part.body)
    } else {
        headers.set(
            "Content-Type",
            ContentType::multipart_mixed(generate_boundary()).to_string(),
        );
        let mut parts = Vec::with_capacity(email.attachments.len() + 1);
        parts.push(body_part);
        for attachment in &email.attachments {
            parts.push(build_attachment_part(attachment)?);
        }
        Message::multipart(headers, parts)
    };

    let recipients = rcpt
        .iter()
        .chain(&cc)
        .chain(&bcc)
        .map(|mailbox| mailbox.address.clone())
        .collect();

    Ok(AssembledMessage {
        message,
        sender: account.email.clone(),
        recipients,
    })
}

/// Renders a recipient-list header value: entries in normalized order,
/// comma-separated, display names encoded per the 7-bit check and
/// addresses always literal.
fn address_list_value(charset: &Charset, mailboxes: &[Mailbox]) -> String {
    let mut value = HeaderValue::new(charset);
    for (i, mailbox) in mailboxes.iter().enumerate() {
        if i > 0 {
            value.append_raw(",");
        }
        if let Some(name) = &mailbox.name {
            value.append_text(name);
            value.append_raw(&format!("<{}>", mailbox.address));
        } else {
            value.append_raw(&mailbox.address);
        }
    }
    value.render()
}

/// Builds one attachment part: resolved content type, doubly-set
/// filename, disposition, optional Content-ID, base64 payload.
fn build_attachment_part(attachment: &Attachment) -> Result<Part> {
    let mimetype = attachment
        .mimetype
        .clone()
        .or_else(|| {
            mime_guess::from_path(&attachment.filename)
                .first_raw()
                .map(str::to_string)
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let (main_type, sub_type) =
        ContentType::split_type(&mimetype).map_err(|e| Error::InvalidAttachment {
            filename: attachment.filename.clone(),
            reason: e.to_string(),
        })?;

    // Older Outlook does not understand RFC 2231 extended parameters; the
    // filename goes out as an RFC 2047 word in both places instead.
    let filename_charset = Charset::new("utf-8");
    let encoded = filename_charset.encode(&attachment.filename);
    let profile = filename_charset.select(&encoded);
    let filename_word = filename_charset.word(&encoded, profile);

    let mut content_type =
        ContentType::new(main_type, sub_type).with_parameter("name", filename_word.as_str());
    if let Some(charset) = &attachment.charset {
        content_type.set_parameter("charset", charset);
    }

    let mut part = Part::new(&content_type);

    let disposition = if attachment.content_id.is_some() {
        "inline"
    } else {
        "attachment"
    };
    part.headers.set(
        "Content-Disposition",
        format!("{disposition}; {}", format_param("filename", &filename_word)),
    );
    if let Some(content_id) = &attachment.content_id {
        part.headers.set("Content-ID", format!("<{content_id}>"));
    }

    // Attachments are base64 regardless of content
    part.set_payload_base64(&attachment.content);
    Ok(part)
}

/// Formats a header parameter, quoting values that carry tspecials or
/// whitespace.
fn format_param(key: &str, value: &str) -> String {
    if value.contains(|c: char| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c)) {
        format!("{key}=\"{value}\"")
    } else {
        format!("{key}={value}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailsmith_mime::TransferEncoding;

    fn account() -> Account {
        Account::new("sender@example.com", "Sender", "smtp.example.com")
    }

    #[test]
    fn date_header_is_rfc5322() {
        let email = Email::new("a@example.com", "Hello", "Hi there");
        let assembled = assemble(&account(), &email, AddressPolicy::Strict).unwrap();
        let date = assembled.message.date().unwrap();
        assert!(
            chrono::DateTime::parse_from_str(date, "%a, %d %b %Y %H:%M:%S %z").is_ok(),
            "unparseable Date: {date}"
        );
    }

    #[test]
    fn from_header_combines_name_and_address() {
        let email = Email::new("a@example.com", "Hello", "Hi");
        let assembled = assemble(&account(), &email, AddressPolicy::Strict).unwrap();
        assert_eq!(
            assembled.message.from(),
            Some("Sender <sender@example.com>")
        );
    }

    #[test]
    fn force_7bit_strips_charset_param_and_substitutes() {
        let email = Email::new("a@example.com", "S", "Жук").with_force_7bit(true);
        let assembled = assemble(&account(), &email, AddressPolicy::Strict).unwrap();
        let headers = &assembled.message.headers;
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("Content-Transfer-Encoding"), Some("7bit"));
        assert_eq!(
            assembled.message.body.as_deref(),
            Some(b"&#1046;&#1091;&#1082;".as_slice())
        );
    }

    #[test]
    fn non_ascii_body_is_quoted_printable() {
        let email = Email::new("a@example.com", "S", "Привет");
        let assembled = assemble(&account(), &email, AddressPolicy::Strict).unwrap();
        assert_eq!(
            assembled.message.headers.get("Content-Transfer-Encoding"),
            Some("quoted-printable")
        );
        assert_eq!(assembled.message.body_text().unwrap(), "Привет");
    }

    #[test]
    fn malformed_mimetype_fails_assembly() {
        let email = Email::new("a@example.com", "S", "B").with_mimetype("textplain");
        assert!(assemble(&account(), &email, AddressPolicy::Strict).is_err());
    }

    #[test]
    fn attachment_part_guesses_type_from_extension() {
        let part = build_attachment_part(&Attachment::new("report.csv", b"a,b\n".to_vec()))
            .unwrap();
        let ct = part.content_type().unwrap();
        assert_eq!(ct.main_type, "text");
        assert_eq!(ct.sub_type, "csv");
    }

    #[test]
    fn attachment_part_falls_back_to_octet_stream() {
        let part =
            build_attachment_part(&Attachment::new("blob.zz9", vec![1, 2, 3])).unwrap();
        let ct = part.content_type().unwrap();
        assert_eq!(ct.main_type, "application");
        assert_eq!(ct.sub_type, "octet-stream");
    }

    #[test]
    fn attachment_part_is_always_base64() {
        let part = build_attachment_part(&Attachment::new("a.txt", b"ascii only".to_vec()))
            .unwrap();
        assert_eq!(part.transfer_encoding(), TransferEncoding::Base64);
        assert_eq!(part.decode_body().unwrap(), b"ascii only");
    }

    #[test]
    fn attachment_filename_set_in_both_places() {
        let part = build_attachment_part(&Attachment::new("report.csv", b"x".to_vec())).unwrap();
        assert_eq!(
            part.content_type().unwrap().parameter("name"),
            Some("report.csv")
        );
        assert_eq!(
            part.headers.get("Content-Disposition"),
            Some("attachment; filename=report.csv")
        );
    }

    #[test]
    fn attachment_non_ascii_filename_is_encoded_word() {
        let part =
            build_attachment_part(&Attachment::new("отчёт.csv", b"x".to_vec())).unwrap();
        let name = part.content_type().unwrap().parameter("name").unwrap().to_string();
        assert!(name.starts_with("=?utf-8?Q?"));
        let disposition = part.headers.get("Content-Disposition").unwrap();
        assert!(disposition.starts_with("attachment; filename=\"=?utf-8?Q?"));
    }

    #[test]
    fn content_id_switches_disposition_to_inline() {
        let part = build_attachment_part(
            &Attachment::new("logo.png", vec![0x89]).with_content_id("logo"),
        )
        .unwrap();
        assert_eq!(
            part.headers.get("Content-Disposition"),
            Some("inline; filename=logo.png")
        );
        assert_eq!(part.headers.get("Content-ID"), Some("<logo>"));
    }

    #[test]
    fn attachment_charset_lands_on_content_type() {
        let part = build_attachment_part(
            &Attachment::new("text.txt", b"data".to_vec())
                .with_mimetype("text/plain")
                .with_charset("utf-8"),
        )
        .unwrap();
        assert_eq!(part.content_type().unwrap().charset(), Some("utf-8"));
    }

    #[test]
    fn invalid_attachment_mimetype_aborts() {
        let email = Email::new("a@example.com", "S", "B")
            .attach(Attachment::new("x.bin", vec![0]).with_mimetype("not-a-type"));
        let err = assemble(&account(), &email, AddressPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::InvalidAttachment { .. }));
    }

    #[test]
    fn envelope_flattens_rcpt_cc_bcc_in_order() {
        let email = Email::new("a@example.com", "S", "B")
            .with_cc("c@example.com")
            .with_bcc("b@example.com");
        let assembled = assemble(&account(), &email, AddressPolicy::Strict).unwrap();
        assert_eq!(
            assembled.recipients,
            vec!["a@example.com", "c@example.com", "b@example.com"]
        );
        assert_eq!(assembled.sender, "sender@example.com");
    }

    #[test]
    fn multipart_only_outer_carries_mime_version() {
        let email = Email::new("a@example.com", "S", "B")
            .attach(Attachment::new("a.txt", b"x".to_vec()));
        let assembled = assemble(&account(), &email, AddressPolicy::Strict).unwrap();
        assert_eq!(assembled.message.headers.get("MIME-Version"), Some("1.0"));
        for part in &assembled.message.parts {
            assert!(!part.headers.contains("MIME-Version"));
        }
    }
}
