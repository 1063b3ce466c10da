//! # mailsmith-pop
//!
//! Async POP3 mailbox client implementing the client side of RFC 1939.
//!
//! ## Features
//!
//! - **Session commands**: USER/PASS, STAT, RETR, DELE, QUIT
//! - **Multi-line responses**: dot-terminated bodies with byte-stuffing
//!   undone
//! - **TLS support**: plain TCP or implicit TLS (rustls)
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailsmith_pop::{PopClient, connect, DEFAULT_PORT};
//!
//! let stream = connect("pop.example.com", DEFAULT_PORT).await?;
//! let mut client = PopClient::from_stream(stream).await?;
//! client.login("user@example.com", "password").await?;
//!
//! let (count, size) = client.stat().await?;
//! let lines = client.retr(1).await?;
//! client.quit().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod stream;

pub use client::{PopClient, parse_status};
pub use error::{Error, Result};
pub use stream::{DEFAULT_PORT, DEFAULT_TLS_PORT, PopStream, connect, connect_tls};
