//! Environment-driven server configuration.

use std::net::SocketAddr;

use questline_core::ids::ParticipantId;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Server settings read at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite connection URL.
    pub database_url: String,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Recipients of stats notices and reports; also allowed to request them.
    pub admins: Vec<ParticipantId>,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// `DATABASE_URL` and `QUESTLINE_ADMINS` are required; `HOST` and `PORT`
    /// have defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing, the port
    /// is not a valid `u16`, or the admin list is empty or not numeric.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config("DATABASE_URL environment variable must be set".into()))?;

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };

        let admins = parse_admins(&lookup("QUESTLINE_ADMINS").unwrap_or_default())?;

        Ok(Self {
            database_url,
            host,
            port,
            admins,
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_admins(raw: &str) -> Result<Vec<ParticipantId>, AppError> {
    let admins = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<ParticipantId>()
                .map_err(|e| AppError::Config(format!("QUESTLINE_ADMINS: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if admins.is_empty() {
        return Err(AppError::Config(
            "QUESTLINE_ADMINS must list at least one participant id".into(),
        ));
    }
    Ok(admins)
}
