use std::path::PathBuf;
use std::time::Duration;

use crate::error::SettingsError;

pub const BIND_ADDR_VAR: &str = "CHESS_BIND_ADDR";
pub const ENGINE_PATH_VAR: &str = "CHESS_ENGINE_PATH";
pub const STATIC_DIR_VAR: &str = "CHESS_STATIC_DIR";
pub const TICK_MS_VAR: &str = "CHESS_TICK_MS";
pub const ENGINE_DELAY_MS_VAR: &str = "CHESS_ENGINE_DELAY_MS";

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    /// UCI engine executable, looked up on `PATH` when not absolute.
    pub engine_path: PathBuf,
    pub static_dir: PathBuf,
    /// How often the side to move loses a second.
    pub tick_interval: Duration,
    /// Pause between handing the turn to the engine and asking it to move.
    pub engine_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            engine_path: PathBuf::from("stockfish"),
            static_dir: PathBuf::from("./static"),
            tick_interval: Duration::from_millis(1000),
            engine_delay: Duration::from_millis(500),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key/value source; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(addr) = lookup(BIND_ADDR_VAR) {
            settings.bind_addr = non_empty(BIND_ADDR_VAR, addr)?;
        }
        if let Some(path) = lookup(ENGINE_PATH_VAR) {
            settings.engine_path = PathBuf::from(non_empty(ENGINE_PATH_VAR, path)?);
        }
        if let Some(dir) = lookup(STATIC_DIR_VAR) {
            settings.static_dir = PathBuf::from(non_empty(STATIC_DIR_VAR, dir)?);
        }
        if let Some(value) = lookup(TICK_MS_VAR) {
            settings.tick_interval = millis(TICK_MS_VAR, &value)?;
        }
        if let Some(value) = lookup(ENGINE_DELAY_MS_VAR) {
            settings.engine_delay = millis(ENGINE_DELAY_MS_VAR, &value)?;
        }

        Ok(settings)
    }
}

fn non_empty(key: &'static str, value: String) -> Result<String, SettingsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(SettingsError::Empty { key })
    } else {
        Ok(trimmed.to_string())
    }
}

fn millis(key: &'static str, value: &str) -> Result<Duration, SettingsError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(SettingsError::InvalidMillis {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(Settings::from_lookup(lookup(&[])).unwrap(), Settings::default());
    }

    #[test]
    fn overrides_are_applied() {
        let settings = Settings::from_lookup(lookup(&[
            (BIND_ADDR_VAR, "0.0.0.0:9000"),
            (ENGINE_PATH_VAR, "/usr/games/stockfish"),
            (TICK_MS_VAR, "250"),
            (ENGINE_DELAY_MS_VAR, " 10 "),
        ]))
        .unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:9000");
        assert_eq!(settings.engine_path, PathBuf::from("/usr/games/stockfish"));
        assert_eq!(settings.tick_interval, Duration::from_millis(250));
        assert_eq!(settings.engine_delay, Duration::from_millis(10));
        assert_eq!(settings.static_dir, PathBuf::from("./static"));
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = Settings::from_lookup(lookup(&[(TICK_MS_VAR, "soon")])).unwrap_err();
        assert_eq!(
            err,
            SettingsError::InvalidMillis {
                key: TICK_MS_VAR,
                value: "soon".to_string(),
            }
        );
        assert!(Settings::from_lookup(lookup(&[(ENGINE_DELAY_MS_VAR, "0")])).is_err());
        assert_eq!(
            Settings::from_lookup(lookup(&[(ENGINE_PATH_VAR, "  ")])).unwrap_err(),
            SettingsError::Empty {
                key: ENGINE_PATH_VAR
            }
        );
    }
}
