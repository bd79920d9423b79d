use std::fmt::Write as _;

use tiberius::Config as TiberiusConfig;

use crate::builder::FluentSql;
use crate::error::FluentSqlError;

/// Connection settings for SQL Server, rendered to an ADO.NET-style connection string.
#[derive(Debug, Clone)]
pub struct MssqlOptions {
    pub server: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: Option<u16>,
    pub instance_name: Option<String>,
    pub application_name: Option<String>,
    pub trust_server_certificate: bool,
}

impl MssqlOptions {
    #[must_use]
    pub fn new(server: String, database: String, user: String, password: String) -> Self {
        Self {
            server,
            database,
            user,
            password,
            port: None,
            instance_name: None,
            application_name: None,
            trust_server_certificate: false,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_instance_name(mut self, instance_name: Option<String>) -> Self {
        self.instance_name = instance_name;
        self
    }

    /// Render as `Server=tcp:host,port;Database=..;User Id=..;Password=..`.
    ///
    /// A named instance takes the place of the port (`host\instance`).
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        let mut server = format!("tcp:{}", self.server);
        if let Some(instance) = &self.instance_name {
            let _ = write!(server, "\\{instance}");
        } else {
            let _ = write!(server, ",{}", self.port.unwrap_or(1433));
        }

        let mut out = String::new();
        push_pair(&mut out, "Server", &server);
        push_pair(&mut out, "Database", &self.database);
        push_pair(&mut out, "User Id", &self.user);
        push_pair(&mut out, "Password", &self.password);
        if let Some(app) = &self.application_name {
            push_pair(&mut out, "Application Name", app);
        }
        if self.trust_server_certificate {
            push_pair(&mut out, "TrustServerCertificate", "true");
        }
        out
    }
}

/// Fluent builder for [`MssqlOptions`].
#[derive(Debug, Clone)]
pub struct MssqlOptionsBuilder {
    opts: MssqlOptions,
}

impl MssqlOptionsBuilder {
    #[must_use]
    pub fn new(server: String, database: String, user: String, password: String) -> Self {
        Self {
            opts: MssqlOptions::new(server, database, user, password),
        }
    }

    #[must_use]
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn instance_name(mut self, instance_name: Option<String>) -> Self {
        self.opts.instance_name = instance_name;
        self
    }

    #[must_use]
    pub fn application_name(mut self, application_name: Option<String>) -> Self {
        self.opts.application_name = application_name;
        self
    }

    /// Accept the server certificate without validation (development servers).
    #[must_use]
    pub fn trust_server_certificate(mut self, trust: bool) -> Self {
        self.opts.trust_server_certificate = trust;
        self
    }

    #[must_use]
    pub fn finish(self) -> MssqlOptions {
        self.opts
    }

    /// A [`FluentSql`] session over these options.
    ///
    /// # Errors
    /// Returns `FluentSqlError::ConfigError` if the rendered connection string does not parse.
    pub fn build(self) -> Result<FluentSql, FluentSqlError> {
        let connection_string = self.finish().to_connection_string();
        parse_connection_string(&connection_string)?;
        Ok(FluentSql::connect(connection_string))
    }
}

/// Parse an ADO.NET-style connection string.
pub(crate) fn parse_connection_string(
    connection_string: &str,
) -> Result<TiberiusConfig, FluentSqlError> {
    TiberiusConfig::from_ado_string(connection_string).map_err(|e| {
        FluentSqlError::ConfigError(format!("invalid SQL Server connection string: {e}"))
    })
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    if !out.is_empty() {
        out.push(';');
    }
    let needs_quotes = value.contains([';', '"', '\'']) || value.trim() != value;
    if needs_quotes {
        let _ = write!(out, "{key}=\"{}\"", value.replace('"', "\"\""));
    } else {
        let _ = write!(out, "{key}={value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> MssqlOptionsBuilder {
        MssqlOptionsBuilder::new(
            "db.local".into(),
            "app".into(),
            "sa".into(),
            "p@ss".into(),
        )
    }

    #[test]
    fn renders_default_port() {
        let cs = builder().finish().to_connection_string();
        assert_eq!(
            cs,
            "Server=tcp:db.local,1433;Database=app;User Id=sa;Password=p@ss"
        );
        assert!(parse_connection_string(&cs).is_ok());
    }

    #[test]
    fn renders_instance_and_flags() {
        let cs = builder()
            .instance_name(Some("SQLEXPRESS".into()))
            .application_name(Some("reports".into()))
            .trust_server_certificate(true)
            .finish()
            .to_connection_string();
        assert_eq!(
            cs,
            "Server=tcp:db.local\\SQLEXPRESS;Database=app;User Id=sa;Password=p@ss;\
             Application Name=reports;TrustServerCertificate=true"
        );
    }

    #[test]
    fn quotes_values_with_separators() {
        let opts = MssqlOptions::new("h".into(), "d".into(), "u".into(), "a;b\"c".into())
            .with_port(Some(14330));
        assert_eq!(
            opts.to_connection_string(),
            "Server=tcp:h,14330;Database=d;User Id=u;Password=\"a;b\"\"c\""
        );
    }
}
