use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// Plain connection upgraded with STARTTLS (port 587).
    #[default]
    Starttls,
    /// Implicit TLS from the first byte (port 465).
    Tls,
    /// No TLS at all. Only useful against a local catcher such as MailHog.
    None,
}

/// Outbound mail transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// SMTP relay host.
    /// TOML: `mail.host`. Default: `smtp.gmail.com`.
    #[serde(default = "default_host")]
    pub host: String,

    /// SMTP port.
    /// TOML: `mail.port`. Default: `587`.
    #[serde(default = "default_port")]
    pub port: u16,

    /// TOML: `mail.tls`. One of `starttls`, `tls`, `none`. Default: `starttls`.
    #[serde(default)]
    pub tls: SmtpTls,

    /// SMTP login. Empty means no AUTH.
    /// TOML: `mail.username`.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub username: String,

    /// TOML: `mail.password`.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub password: String,

    /// Sender address. Falls back to `username` when unset.
    /// TOML: `mail.from`.
    #[serde(default)]
    pub from: Option<String>,

    /// Upper bound on pooled SMTP connections.
    /// TOML: `mail.pool_max_size`. Default: `4`.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,

    /// Idle pooled connections are closed after this many seconds.
    /// TOML: `mail.pool_idle_timeout_secs`. Default: `60`.
    #[serde(default = "default_pool_idle_timeout_secs")]
    pub pool_idle_timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls: SmtpTls::default(),
            username: String::new(),
            password: String::new(),
            from: None,
            pool_max_size: default_pool_max_size(),
            pool_idle_timeout_secs: default_pool_idle_timeout_secs(),
        }
    }
}

impl MailConfig {
    /// Effective sender address.
    pub fn sender(&self) -> &str {
        match self.from.as_deref() {
            Some(from) if !from.trim().is_empty() => from,
            _ => self.username.as_str(),
        }
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for mail credentials",
        )),
    }
}

fn default_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_port() -> u16 {
    587
}

fn default_pool_max_size() -> u32 {
    4
}

fn default_pool_idle_timeout_secs() -> u64 {
    60
}
