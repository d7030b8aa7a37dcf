use std::env;
use tracing::warn;

/// Daily booking window and slot granularity for the practice calendar.
///
/// Operators change these through the environment; nothing in the
/// scheduling cells hardcodes business hours.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Hour of day (0-23) the practice opens.
    pub open_hour: u32,
    /// Hour of day (0-23) the practice closes. Slots never extend past it.
    pub close_hour: u32,
    /// Grid interval for candidate slot starts, in minutes.
    pub slot_interval_minutes: i64,
    /// Minimum notice a client must give when cancelling, in hours.
    pub client_cancellation_notice_hours: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 17,
            slot_interval_minutes: 30,
            client_cancellation_notice_hours: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scheduling: SchedulingConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = SchedulingConfig::default();

        let config = Self {
            scheduling: SchedulingConfig {
                open_hour: parse_var("PAWCAL_OPEN_HOUR", defaults.open_hour),
                close_hour: parse_var("PAWCAL_CLOSE_HOUR", defaults.close_hour),
                slot_interval_minutes: parse_var(
                    "PAWCAL_SLOT_INTERVAL_MINUTES",
                    defaults.slot_interval_minutes,
                ),
                client_cancellation_notice_hours: parse_var(
                    "PAWCAL_CLIENT_CANCEL_NOTICE_HOURS",
                    defaults.client_cancellation_notice_hours,
                ),
            },
        };

        if !config.is_configured() {
            warn!("Scheduling window is inconsistent - falling back to defaults");
            return Self {
                scheduling: SchedulingConfig::default(),
            };
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        let s = &self.scheduling;
        s.open_hour < s.close_hour
            && s.close_hour <= 24
            && s.slot_interval_minutes > 0
            && s.client_cancellation_notice_hours >= 0
    }
}

fn parse_var<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid value, using default", name);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_a_standard_business_day() {
        let config = AppConfig {
            scheduling: SchedulingConfig::default(),
        };
        assert!(config.is_configured());
        assert_eq!(config.scheduling.open_hour, 9);
        assert_eq!(config.scheduling.close_hour, 17);
        assert_eq!(config.scheduling.slot_interval_minutes, 30);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let config = AppConfig {
            scheduling: SchedulingConfig {
                open_hour: 18,
                close_hour: 9,
                ..SchedulingConfig::default()
            },
        };
        assert!(!config.is_configured());
    }
}
