//! SMTP submission client.

use crate::command::{AuthMechanism, Command};
use crate::error::{Error, Result};
use crate::reply::{Reply, ReplyCode, is_last_reply_line, parse_reply};
use crate::stream::SmtpStream;
use crate::types::Address;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Server capabilities captured from the EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from the greeting.
    pub hostname: String,
    /// Extension keyword lines advertised by EHLO.
    pub extensions: Vec<String>,
}

impl ServerInfo {
    /// Checks if the server advertises an extension keyword.
    #[must_use]
    pub fn supports(&self, keyword: &str) -> bool {
        self.extensions
            .iter()
            .any(|line| line.split_whitespace().next() == Some(keyword))
    }

    /// Returns the SASL mechanisms advertised on the AUTH line.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<String> {
        self.extensions
            .iter()
            .find(|line| line.starts_with("AUTH"))
            .map(|line| {
                line.split_whitespace()
                    .skip(1)
                    .map(str::to_uppercase)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// SMTP client over one exclusively owned connection.
///
/// The protocol sequence is the caller's responsibility only as far as
/// [`SmtpClient::ehlo`] before [`SmtpClient::send_mail`]; within a
/// transaction the client drives MAIL FROM / RCPT TO / DATA itself, so a
/// whole batch can be pushed through one connection.
#[derive(Debug)]
pub struct SmtpClient {
    stream: SmtpStream,
    server_info: ServerInfo,
}

impl SmtpClient {
    /// Creates a client from a connected stream and reads the greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or the server
    /// greets with an error code.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = read_reply(&mut stream).await?;
        if !greeting.is_success() {
            return Err(greeting.into_error());
        }

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        tracing::debug!(%hostname, "SMTP greeting received");

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                extensions: Vec::new(),
            },
        })
    }

    /// Returns the server information.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Sends EHLO and records the advertised capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(&mut self, client_hostname: &str) -> Result<()> {
        let reply = self
            .send_command(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?;

        if !reply.is_success() {
            return Err(reply.into_error());
        }

        // First line repeats the greeting; the rest are extensions
        self.server_info.extensions = reply.message.iter().skip(1).cloned().collect();
        tracing::debug!(
            extensions = self.server_info.extensions.len(),
            "EHLO capabilities captured"
        );
        Ok(())
    }

    /// Authenticates with AUTH PLAIN.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the credentials.
    pub async fn auth_plain(&mut self, username: &str, password: &str) -> Result<()> {
        // PLAIN initial response: \0username\0password
        let credentials = format!("\0{username}\0{password}");
        let encoded = STANDARD.encode(credentials.as_bytes());

        let reply = self
            .send_command(Command::Auth {
                mechanism: AuthMechanism::Plain,
                initial_response: Some(encoded),
            })
            .await?;

        if !reply.is_success() {
            return Err(reply.into_error());
        }
        tracing::debug!(username, "authenticated (PLAIN)");
        Ok(())
    }

    /// Authenticates with AUTH LOGIN (challenge/response).
    ///
    /// # Errors
    ///
    /// Returns an error if a challenge is not issued or the server
    /// rejects the credentials.
    pub async fn auth_login(&mut self, username: &str, password: &str) -> Result<()> {
        let reply = self
            .send_command(Command::Auth {
                mechanism: AuthMechanism::Login,
                initial_response: None,
            })
            .await?;
        if reply.code != ReplyCode::AUTH_CONTINUE {
            return Err(reply.into_error());
        }

        let encoded = format!("{}\r\n", STANDARD.encode(username.as_bytes()));
        self.stream.write_all(encoded.as_bytes()).await?;
        let reply = read_reply(&mut self.stream).await?;
        if reply.code != ReplyCode::AUTH_CONTINUE {
            return Err(reply.into_error());
        }

        let encoded = format!("{}\r\n", STANDARD.encode(password.as_bytes()));
        self.stream.write_all(encoded.as_bytes()).await?;
        let reply = read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }
        tracing::debug!(username, "authenticated (LOGIN)");
        Ok(())
    }

    /// Runs one full mail transaction: envelope sender, envelope
    /// recipients, then the message data with dot-stuffing.
    ///
    /// # Errors
    ///
    /// Returns an error on the first rejected command or I/O failure;
    /// the transaction is not retried.
    pub async fn send_mail(
        &mut self,
        from: &Address,
        recipients: &[Address],
        message: &[u8],
    ) -> Result<()> {
        if recipients.is_empty() {
            return Err(Error::Protocol("No envelope recipients".into()));
        }

        let reply = self
            .send_command(Command::MailFrom { from: from.clone() })
            .await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        for recipient in recipients {
            let reply = self
                .send_command(Command::RcptTo {
                    to: recipient.clone(),
                })
                .await?;
            if !reply.is_success() {
                return Err(reply.into_error());
            }
        }

        let reply = self.send_command(Command::Data).await?;
        if reply.code != ReplyCode::START_DATA {
            return Err(reply.into_error());
        }

        // Normalize line endings and byte-stuff leading dots
        for line in message.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.first() == Some(&b'.') {
                self.stream.write_all(b".").await?;
            }
            self.stream.write_all(line).await?;
            self.stream.write_all(b"\r\n").await?;
        }
        self.stream.write_all(b".\r\n").await?;

        let reply = read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        tracing::debug!(
            from = from.as_str(),
            recipients = recipients.len(),
            bytes = message.len(),
            "message accepted"
        );
        Ok(())
    }

    /// Sends QUIT and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT exchange fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;
        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(reply.into_error());
        }
        Ok(())
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        self.stream.write_all(&cmd.serialize()).await?;
        read_reply(&mut self.stream).await
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        if line.is_empty() {
            continue;
        }

        let is_last = is_last_reply_line(&line);
        lines.push(line);

        if is_last {
            break;
        }
    }

    parse_reply(&lines)
}
