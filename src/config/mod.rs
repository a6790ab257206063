mod basic;
mod mail;
mod reminders;

pub use basic::BasicConfig;
pub use mail::{MailConfig, SmtpTls};
pub use reminders::{MAX_SCHEDULE_SECS, ReminderConfig, SweepPolicy};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// SMTP transport (see `mail` table in config.toml).
    #[serde(default)]
    pub mail: MailConfig,

    /// Reminder scheduling (see `reminders` table in config.toml).
    #[serde(default)]
    pub reminders: ReminderConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "POSTGRAD_";

impl Config {
    /// Builds a Figment that merges defaults, `config.toml` if present, then
    /// `POSTGRAD_`-prefixed environment variables (`__` separates tables,
    /// e.g. `POSTGRAD_MAIL__PASSWORD`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads and validates the configuration. Panics on invalid values so the
    /// process never starts half-configured.
    pub fn load() -> Self {
        let cfg: Self = Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml + env): {err}")
        });
        if let Err(msg) = cfg.validate() {
            panic!("invalid configuration: {msg}");
        }
        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if let SweepPolicy::Interval { every_secs } = self.reminders.sweep {
            if every_secs == 0 {
                return Err("reminders.sweep.every_secs must be greater than zero".to_string());
            }
            if every_secs > MAX_SCHEDULE_SECS {
                return Err(format!(
                    "reminders.sweep.every_secs must be at most {MAX_SCHEDULE_SECS}"
                ));
            }
        }
        if self.reminders.registration_delay_secs > MAX_SCHEDULE_SECS {
            return Err(format!(
                "reminders.registration_delay_secs must be at most {MAX_SCHEDULE_SECS}"
            ));
        }
        if self.mail.pool_max_size == 0 {
            return Err("mail.pool_max_size must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::load);
