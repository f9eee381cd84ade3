/*!
 * Signalling Configuration
 *
 * Runtime configuration for process-signal delivery
 */

use super::errors::ConfigError;
use nix::sys::signal::Signal;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable selecting the OS signal that carries process signals
pub const ENV_NOTIFY_SIGNAL: &str = "PROCSIGNAL_NOTIFY_SIGNAL";
/// Environment variable for the latch wait timeout in milliseconds
pub const ENV_LATCH_TIMEOUT_MS: &str = "PROCSIGNAL_LATCH_TIMEOUT_MS";
/// Environment variable enabling JSON trace output
pub const ENV_TRACE_JSON: &str = "PROCSIGNAL_TRACE_JSON";

/// Process-signal configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcSignalConfig {
    /// OS signal raised on the target after its slot bit is set
    pub notify_signal: Signal,
    /// How long a waiter blocks on the process latch before re-checking
    pub latch_timeout: Duration,
    /// Emit traces as JSON
    pub trace_json: bool,
}

impl Default for ProcSignalConfig {
    fn default() -> Self {
        Self {
            notify_signal: Signal::SIGUSR1,
            latch_timeout: Duration::from_secs(1),
            trace_json: false,
        }
    }
}

impl ProcSignalConfig {
    /// Configuration suited to tests: short waits, default signal
    pub const fn quick() -> Self {
        Self {
            notify_signal: Signal::SIGUSR1,
            latch_timeout: Duration::from_millis(50),
            trace_json: false,
        }
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_NOTIFY_SIGNAL) {
            config.notify_signal = parse_signal(&raw)?;
        }

        if let Some(raw) = lookup(ENV_LATCH_TIMEOUT_MS) {
            let millis = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_LATCH_TIMEOUT_MS.to_string(),
                value: raw.clone(),
            })?;
            config.latch_timeout = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(ENV_TRACE_JSON) {
            config.trace_json = matches!(raw.trim(), "1" | "true");
        }

        Ok(config)
    }
}

/// Parse a signal given by name (`SIGUSR2`, `USR2`) or number
fn parse_signal(raw: &str) -> Result<Signal, ConfigError> {
    let trimmed = raw.trim();
    let signal = if let Ok(number) = trimmed.parse::<i32>() {
        Signal::try_from(number).ok()
    } else {
        let upper = trimmed.to_ascii_uppercase();
        let name = if upper.starts_with("SIG") {
            upper
        } else {
            format!("SIG{}", upper)
        };
        Signal::from_str(&name).ok()
    };

    match signal {
        Some(Signal::SIGKILL) | Some(Signal::SIGSTOP) => {
            Err(ConfigError::UnusableSignal(trimmed.to_string()))
        }
        Some(signal) => Ok(signal),
        None => Err(ConfigError::InvalidValue {
            key: ENV_NOTIFY_SIGNAL.to_string(),
            value: raw.to_string(),
        }),
    }
}
