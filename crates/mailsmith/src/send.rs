//! Delivery driver: batch submission over one SMTP connection, plus the
//! POP3 mailbox pass-throughs.

use crate::account::Account;
use crate::address::AddressPolicy;
use crate::assemble::assemble;
use crate::email::Email;
use crate::error::{Error, Result};
use mailsmith_mime::Message;
use mailsmith_pop::PopClient;
use mailsmith_smtp::{Address, SmtpClient};

/// Sends and retrieves mail for one [`Account`].
///
/// Each `send` call opens one SMTP connection, pushes the batch through
/// it sequentially, and closes it; the first transport failure aborts
/// the remaining batch. The POP3 session is opened lazily on first
/// mailbox access and kept for the lifetime of the mailer.
#[derive(Debug)]
pub struct Mailer {
    account: Account,
    policy: AddressPolicy,
    pop: Option<PopClient>,
}

impl Mailer {
    /// Creates a mailer for an account with strict address validation.
    #[must_use]
    pub const fn new(account: Account) -> Self {
        Self {
            account,
            policy: AddressPolicy::Strict,
            pop: None,
        }
    }

    /// Overrides the address validation policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: AddressPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the account.
    #[must_use]
    pub const fn account(&self) -> &Account {
        &self.account
    }

    /// Sends one email.
    ///
    /// # Errors
    ///
    /// Returns an error if assembly or any transport step fails.
    pub async fn send(&self, email: &Email) -> Result<()> {
        self.send_batch(std::slice::from_ref(email)).await
    }

    /// Sends a batch of emails over one connection, in order.
    ///
    /// Messages already accepted by the server stay sent when a later
    /// message fails; there is no rollback and no retry.
    ///
    /// # Errors
    ///
    /// Returns an error on the first assembly or transport failure.
    pub async fn send_batch(&self, emails: &[Email]) -> Result<()> {
        let account = &self.account;
        tracing::debug!(
            server = %account.server,
            port = account.port,
            count = emails.len(),
            "opening SMTP connection"
        );

        let stream = if account.tls {
            mailsmith_smtp::connect_tls(&account.server, account.port).await?
        } else {
            mailsmith_smtp::connect(&account.server, account.port).await?
        };
        let mut client = SmtpClient::from_stream(stream).await?;
        client.ehlo("localhost").await?;

        if let (Some(login), Some(password)) = (&account.login, &account.password) {
            let mechanisms = client.server_info().auth_mechanisms();
            if mechanisms.iter().any(|m| m == "LOGIN") && !mechanisms.iter().any(|m| m == "PLAIN")
            {
                client.auth_login(login, password).await?;
            } else {
                client.auth_plain(login, password).await?;
            }
        }

        for email in emails {
            let assembled = assemble(account, email, self.policy)?;
            let sender = Address::new(&assembled.sender)?;
            let recipients = assembled
                .recipients
                .iter()
                .map(Address::new)
                .collect::<mailsmith_smtp::Result<Vec<_>>>()?;
            let bytes = assembled.message.to_bytes()?;
            client.send_mail(&sender, &recipients, &bytes).await?;
        }

        client.quit().await?;
        Ok(())
    }

    /// Returns the mailbox statistics: message count and total size.
    ///
    /// # Errors
    ///
    /// Returns an error if the POP3 session cannot be established or the
    /// command fails.
    pub async fn stat(&mut self) -> Result<(usize, usize)> {
        let client = self.pop_client().await?;
        Ok(client.stat().await?)
    }

    /// Retrieves a mailbox message by its 1-based index and parses it.
    ///
    /// # Errors
    ///
    /// Returns an error if the POP3 session cannot be established, the
    /// command fails, or the message does not parse.
    pub async fn retrieve(&mut self, index: usize) -> Result<Message> {
        let client = self.pop_client().await?;
        let lines = client.retr(index).await?;
        let raw = lines.join("\r\n");
        Ok(Message::parse(&raw)?)
    }

    /// Marks a mailbox message for deletion by its 1-based index.
    ///
    /// # Errors
    ///
    /// Returns an error if the POP3 session cannot be established or the
    /// command fails.
    pub async fn delete(&mut self, index: usize) -> Result<()> {
        let client = self.pop_client().await?;
        client.dele(index).await?;
        Ok(())
    }

    /// Lazily connects and authenticates the POP3 session.
    async fn pop_client(&mut self) -> Result<&mut PopClient> {
        if self.pop.is_none() {
            let account = &self.account;
            let host = account.pop_server.as_deref().ok_or(Error::NoPopServer)?;
            let (Some(login), Some(password)) = (&account.login, &account.password) else {
                return Err(Error::MissingCredentials);
            };

            tracing::debug!(host, "opening POP3 connection");
            let stream = if account.tls {
                let port = account.pop_port.unwrap_or(mailsmith_pop::DEFAULT_TLS_PORT);
                mailsmith_pop::connect_tls(host, port).await?
            } else {
                let port = account.pop_port.unwrap_or(mailsmith_pop::DEFAULT_PORT);
                mailsmith_pop::connect(host, port).await?
            };
            let mut client = PopClient::from_stream(stream).await?;
            client.login(login, password).await?;
            self.pop = Some(client);
        }

        self.pop.as_mut().ok_or(Error::NoPopServer)
    }
}
