use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChirpConfig {
    pub port: u16,
    /// Base URL used when building confirmation links.
    pub public_url: String,
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    /// Outgoing mail. Without it confirmation links are only logged.
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Promoted to administrator at startup if the account already exists,
    /// otherwise when it confirms its email.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub session_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    /// Report refused authorization checks as "not found".
    #[serde(default)]
    pub conceal_forbidden: bool,
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_smtp_port() -> u16 {
    587
}

impl ChirpConfig {
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }

    pub fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("CHIRP_").split("__"))
    }
}
