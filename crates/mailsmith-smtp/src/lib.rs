//! # mailsmith-smtp
//!
//! Async SMTP submission client implementing the client side of RFC 5321.
//!
//! ## Features
//!
//! - **Protocol plumbing**: EHLO, AUTH (PLAIN/LOGIN), MAIL FROM, RCPT TO,
//!   DATA with dot-stuffing, QUIT
//! - **TLS support**: plain TCP or implicit TLS (rustls)
//! - **Batch friendly**: one client can run several mail transactions over
//!   a single connection
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailsmith_smtp::{Address, SmtpClient, connect};
//!
//! let stream = connect("smtp.example.com", 25).await?;
//! let mut client = SmtpClient::from_stream(stream).await?;
//! client.ehlo("localhost").await?;
//! client.auth_plain("user@example.com", "password").await?;
//!
//! let from = Address::new("sender@example.com")?;
//! let to = Address::new("recipient@example.com")?;
//! client
//!     .send_mail(&from, &[to], b"Subject: Test\r\n\r\nHello!\r\n")
//!     .await?;
//! client.quit().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod command;
mod error;
mod reply;
mod stream;
mod types;

pub use client::{ServerInfo, SmtpClient};
pub use command::{AuthMechanism, Command};
pub use error::{Error, Result};
pub use reply::{Reply, ReplyCode, is_last_reply_line, parse_reply};
pub use stream::{SmtpStream, connect, connect_tls};
pub use types::Address;
