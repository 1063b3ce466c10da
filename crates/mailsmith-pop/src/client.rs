//! POP3 mailbox client.

use crate::error::{Error, Result};
use crate::stream::PopStream;

/// Parses a POP3 status line, returning the text after `+OK`.
///
/// # Errors
///
/// `-ERR` becomes a typed server error; anything else is a protocol
/// error.
pub fn parse_status(line: &str) -> Result<String> {
    if let Some(info) = line.strip_prefix("+OK") {
        return Ok(info.trim_start().to_string());
    }
    if let Some(info) = line.strip_prefix("-ERR") {
        return Err(Error::Server(info.trim_start().to_string()));
    }
    Err(Error::Protocol(format!("Unexpected status line: {line}")))
}

/// POP3 client over one exclusively owned connection.
#[derive(Debug)]
pub struct PopClient {
    stream: PopStream,
}

impl PopClient {
    /// Creates a client from a connected stream and reads the greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting is missing or negative.
    pub async fn from_stream(mut stream: PopStream) -> Result<Self> {
        let greeting = stream.read_line().await?;
        let info = parse_status(&greeting)?;
        tracing::debug!(greeting = %info, "POP3 greeting received");
        Ok(Self { stream })
    }

    /// Authenticates with USER/PASS.
    ///
    /// # Errors
    ///
    /// Returns an error if either step is rejected.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.command(&format!("USER {username}")).await?;
        self.command(&format!("PASS {password}")).await?;
        tracing::debug!(username, "POP3 authenticated");
        Ok(())
    }

    /// Returns the mailbox statistics: message count and total size in
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the STAT reply is rejected or malformed.
    pub async fn stat(&mut self) -> Result<(usize, usize)> {
        let info = self.command("STAT").await?;
        let mut fields = info.split_whitespace();
        let count = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::Protocol(format!("Malformed STAT reply: {info}")))?;
        let size = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::Protocol(format!("Malformed STAT reply: {info}")))?;
        Ok((count, size))
    }

    /// Retrieves a message by its 1-based index, returning its raw lines
    /// with byte-stuffed dots undone.
    ///
    /// # Errors
    ///
    /// Returns an error if the RETR reply is rejected or the connection
    /// drops mid-message.
    pub async fn retr(&mut self, index: usize) -> Result<Vec<String>> {
        self.command(&format!("RETR {index}")).await?;

        let mut lines = Vec::new();
        loop {
            let line = self.stream.read_line().await?;
            if line == "." {
                break;
            }
            // Undo byte stuffing
            if let Some(stripped) = line.strip_prefix('.') {
                lines.push(stripped.to_string());
            } else {
                lines.push(line);
            }
        }
        tracing::debug!(index, lines = lines.len(), "message retrieved");
        Ok(lines)
    }

    /// Marks a message for deletion by its 1-based index.
    ///
    /// # Errors
    ///
    /// Returns an error if the DELE reply is rejected.
    pub async fn dele(&mut self, index: usize) -> Result<()> {
        self.command(&format!("DELE {index}")).await?;
        tracing::debug!(index, "message marked for deletion");
        Ok(())
    }

    /// Sends QUIT and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT exchange fails.
    pub async fn quit(mut self) -> Result<()> {
        self.command("QUIT").await?;
        Ok(())
    }

    async fn command(&mut self, line: &str) -> Result<String> {
        self.stream.write_all(format!("{line}\r\n").as_bytes()).await?;
        let status = self.stream.read_line().await?;
        parse_status(&status)
    }
}
