//! Address-list input, normalization, and validation policy.

use crate::error::{Error, Result};
use mailsmith_smtp::Address;

/// One entry of an address-list field.
///
/// This is a closed set: anything that is not a bare address or a
/// (display name, address) pair cannot be constructed, so shape
/// validation happens at the type level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressEntry {
    /// A bare email address.
    Bare(String),
    /// A display name with an email address.
    Named(String, String),
}

impl From<&str> for AddressEntry {
    fn from(addr: &str) -> Self {
        Self::Bare(addr.to_string())
    }
}

impl From<String> for AddressEntry {
    fn from(addr: String) -> Self {
        Self::Bare(addr)
    }
}

impl<N: Into<String>, A: Into<String>> From<(N, A)> for AddressEntry {
    fn from((name, addr): (N, A)) -> Self {
        Self::Named(name.into(), addr.into())
    }
}

impl From<&Mailbox> for AddressEntry {
    fn from(mailbox: &Mailbox) -> Self {
        mailbox.name.as_ref().map_or_else(
            || Self::Bare(mailbox.address.clone()),
            |name| Self::Named(name.clone(), mailbox.address.clone()),
        )
    }
}

/// An address-list field as given by the caller: zero or more entries in
/// caller order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressField(Vec<AddressEntry>);

impl AddressField {
    /// Creates an empty field. Each instance is fresh; empty fields are
    /// never shared.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: impl Into<AddressEntry>) {
        self.0.push(entry.into());
    }

    /// Returns true if the field has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the entries in caller order.
    pub fn iter(&self) -> impl Iterator<Item = &AddressEntry> {
        self.0.iter()
    }
}

impl From<AddressEntry> for AddressField {
    fn from(entry: AddressEntry) -> Self {
        Self(vec![entry])
    }
}

impl From<&str> for AddressField {
    fn from(addr: &str) -> Self {
        Self(vec![addr.into()])
    }
}

impl From<String> for AddressField {
    fn from(addr: String) -> Self {
        Self(vec![addr.into()])
    }
}

impl<N: Into<String>, A: Into<String>> From<(N, A)> for AddressField {
    fn from(pair: (N, A)) -> Self {
        Self(vec![pair.into()])
    }
}

impl<T: Into<AddressEntry>> FromIterator<T> for AddressField {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AddressEntry>> From<Vec<T>> for AddressField {
    fn from(entries: Vec<T>) -> Self {
        entries.into_iter().collect()
    }
}

/// A normalized (display-name-or-absent, address) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Display name (optional).
    pub name: Option<String>,
    /// Email address.
    pub address: String,
}

/// What to do with an address that fails syntax validation.
///
/// The strict policy fails the message; the lenient policy passes the
/// entry through best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressPolicy {
    /// Fail the message on the first invalid address.
    #[default]
    Strict,
    /// Accept invalid addresses as given.
    Lenient,
}

/// Normalizes an address-list field into ordered mailbox pairs.
///
/// Pure: the input field is not modified, entry order is preserved, and
/// normalizing an already-normalized list yields the same pairs.
///
/// # Errors
///
/// Under [`AddressPolicy::Strict`], returns [`Error::InvalidAddressField`]
/// naming the field when an address fails syntax validation.
pub fn normalize(
    field: &AddressField,
    field_name: &str,
    policy: AddressPolicy,
) -> Result<Vec<Mailbox>> {
    let mut mailboxes = Vec::with_capacity(field.len());

    for entry in field.iter() {
        let (name, address) = match entry {
            AddressEntry::Bare(addr) => (None, addr),
            AddressEntry::Named(name, addr) => (Some(name.clone()), addr),
        };

        if let Err(e) = Address::new(address) {
            match policy {
                AddressPolicy::Strict => {
                    return Err(Error::InvalidAddressField {
                        field: field_name.to_string(),
                        reason: e.to_string(),
                    });
                }
                AddressPolicy::Lenient => {
                    tracing::warn!(field = field_name, %address, "keeping invalid address");
                }
            }
        }

        mailboxes.push(Mailbox {
            name,
            address: address.clone(),
        });
    }

    Ok(mailboxes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_becomes_unnamed_pair() {
        let field = AddressField::from("a@example.com");
        let normalized = normalize(&field, "rcpt", AddressPolicy::Strict).unwrap();
        assert_eq!(
            normalized,
            vec![Mailbox {
                name: None,
                address: "a@example.com".to_string()
            }]
        );
    }

    #[test]
    fn named_pair_is_kept() {
        let field = AddressField::from(("Bob", "bob@example.com"));
        let normalized = normalize(&field, "cc", AddressPolicy::Strict).unwrap();
        assert_eq!(normalized[0].name.as_deref(), Some("Bob"));
        assert_eq!(normalized[0].address, "bob@example.com");
    }

    #[test]
    fn order_is_preserved() {
        let field: AddressField = vec!["c@example.com", "a@example.com", "b@example.com"]
            .into_iter()
            .collect();
        let normalized = normalize(&field, "rcpt", AddressPolicy::Strict).unwrap();
        let addresses: Vec<&str> = normalized.iter().map(|m| m.address.as_str()).collect();
        assert_eq!(
            addresses,
            vec!["c@example.com", "a@example.com", "b@example.com"]
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let field: AddressField = vec![
            AddressEntry::from("a@example.com"),
            AddressEntry::from(("Bob", "bob@example.com")),
        ]
        .into();
        let first = normalize(&field, "rcpt", AddressPolicy::Strict).unwrap();

        let refield: AddressField = first.iter().collect();
        let second = normalize(&refield, "rcpt", AddressPolicy::Strict).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn strict_rejects_bad_address_naming_field() {
        let field = AddressField::from("not-an-address");
        let err = normalize(&field, "bcc", AddressPolicy::Strict).unwrap_err();
        match err {
            Error::InvalidAddressField { field, .. } => assert_eq!(field, "bcc"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lenient_keeps_bad_address() {
        let field = AddressField::from("not-an-address");
        let normalized = normalize(&field, "rcpt", AddressPolicy::Lenient).unwrap();
        assert_eq!(normalized[0].address, "not-an-address");
    }

    #[test]
    fn empty_field_normalizes_to_empty() {
        let field = AddressField::new();
        assert!(normalize(&field, "cc", AddressPolicy::Strict)
            .unwrap()
            .is_empty());
    }
}
