use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Upper bound for `registration_delay_secs` and `every_secs` (ten years).
pub const MAX_SCHEDULE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Recurring sweep policy.
///
/// TOML examples:
/// - `sweep = { mode = "disabled" }`
/// - `sweep = { mode = "interval", every_secs = 3600 }`
/// - `sweep = { mode = "daily", at = "09:00" }` (process local time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SweepPolicy {
    #[default]
    Disabled,
    Interval {
        every_secs: u64,
    },
    Daily {
        #[serde(
            serialize_with = "serialize_hh_mm",
            deserialize_with = "deserialize_hh_mm"
        )]
        at: NaiveTime,
    },
}

/// Reminder scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReminderConfig {
    /// Delay between registration and the one-shot reminder. `0` disables it.
    /// TOML: `reminders.registration_delay_secs`. Default: `3600`.
    #[serde(default = "default_registration_delay_secs")]
    pub registration_delay_secs: u64,

    /// TOML: `reminders.sweep`. Default: disabled.
    #[serde(default)]
    pub sweep: SweepPolicy,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            registration_delay_secs: default_registration_delay_secs(),
            sweep: SweepPolicy::default(),
        }
    }
}

fn default_registration_delay_secs() -> u64 {
    60 * 60
}

fn serialize_hh_mm<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

fn deserialize_hh_mm<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
        .map_err(|e| serde::de::Error::custom(format!("invalid time of day {raw:?}: {e}")))
}
