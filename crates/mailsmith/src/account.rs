//! Delivery identity configuration.

/// Default SMTP submission port.
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Email account configuration: the delivery identity plus the servers to
/// speak to. Constructed once by the caller and reused across send calls.
#[derive(Debug, Clone)]
pub struct Account {
    /// Sender email address (also the envelope sender).
    pub email: String,
    /// Display name used in the From header.
    pub from_name: String,
    /// SMTP server hostname.
    pub server: String,
    /// SMTP server port.
    pub port: u16,
    /// POP3 server hostname, if mailbox access is wanted.
    pub pop_server: Option<String>,
    /// POP3 port override; the protocol default is used when absent.
    pub pop_port: Option<u16>,
    /// Login for SMTP AUTH and POP3.
    pub login: Option<String>,
    /// Password for SMTP AUTH and POP3.
    pub password: Option<String>,
    /// Use implicit TLS for both transports.
    pub tls: bool,
}

impl Account {
    /// Creates an account with the default port, no credentials, and no
    /// TLS.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        from_name: impl Into<String>,
        server: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            from_name: from_name.into(),
            server: server.into(),
            port: DEFAULT_SMTP_PORT,
            pop_server: None,
            pop_port: None,
            login: None,
            password: None,
            tls: false,
        }
    }

    /// Overrides the SMTP port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the POP3 server for mailbox access.
    #[must_use]
    pub fn with_pop_server(mut self, host: impl Into<String>) -> Self {
        self.pop_server = Some(host.into());
        self
    }

    /// Overrides the POP3 port.
    #[must_use]
    pub const fn with_pop_port(mut self, port: u16) -> Self {
        self.pop_port = Some(port);
        self
    }

    /// Sets login credentials for SMTP AUTH and POP3.
    #[must_use]
    pub fn with_credentials(
        mut self,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.login = Some(login.into());
        self.password = Some(password.into());
        self
    }

    /// Enables implicit TLS for both transports.
    #[must_use]
    pub const fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }
}
