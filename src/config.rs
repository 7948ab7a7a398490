//! Environment-driven configuration for the demo services.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `KITE_ADDR` | `0.0.0.0:8003` | listen address |
//! | `KITE_MAX_MULTIPART_MEMORY` | `8388608` | file bytes kept in memory per form before spilling |
//! | `KITE_MAX_BODY_SIZE` | `33554432` | largest request body accepted; bigger ones answer `413` |
//! | `KITE_SAVE_DIR` | `.` | where the single-file upload lands |
//! | `KITE_UPLOAD_DIR` | `./uploads` | where the multi-file upload lands |

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::multipart::DEFAULT_MAX_MEMORY;
use crate::router::DEFAULT_BODY_LIMIT;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8003";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: String,
    pub max_multipart_memory: u64,
    pub max_body_size: usize,
    pub save_dir: PathBuf,
    pub upload_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_owned(),
            max_multipart_memory: DEFAULT_MAX_MEMORY,
            max_body_size: DEFAULT_BODY_LIMIT,
            save_dir: PathBuf::from("."),
            upload_dir: PathBuf::from("./uploads"),
        }
    }
}

impl Config {
    /// Reads every setting from the environment, falling back to the
    /// defaults above for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            addr: lookup("KITE_ADDR").unwrap_or(defaults.addr),
            max_multipart_memory: lookup("KITE_MAX_MULTIPART_MEMORY")
                .and_then(|v| parse_or_warn("KITE_MAX_MULTIPART_MEMORY", &v))
                .unwrap_or(defaults.max_multipart_memory),
            max_body_size: lookup("KITE_MAX_BODY_SIZE")
                .and_then(|v| parse_or_warn("KITE_MAX_BODY_SIZE", &v))
                .unwrap_or(defaults.max_body_size),
            save_dir: lookup("KITE_SAVE_DIR").map(PathBuf::from).unwrap_or(defaults.save_dir),
            upload_dir: lookup("KITE_UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
        }
    }
}

fn parse_or_warn<T>(key: &str, value: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(key, value, "ignoring unparsable setting: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_demo_services() {
        let cfg = config(&[]);
        assert_eq!(cfg.addr, "0.0.0.0:8003");
        assert_eq!(cfg.max_multipart_memory, 8 << 20);
        assert_eq!(cfg.max_body_size, 32 << 20);
        assert_eq!(cfg.upload_dir, PathBuf::from("./uploads"));
    }

    #[test]
    fn overrides_from_environment() {
        let cfg = config(&[
            ("KITE_ADDR", "127.0.0.1:9000"),
            ("KITE_MAX_MULTIPART_MEMORY", "1024"),
            ("KITE_MAX_BODY_SIZE", "4096"),
            ("KITE_UPLOAD_DIR", "/tmp/up"),
        ]);
        assert_eq!(cfg.max_body_size, 4096);
        assert_eq!(cfg.addr, "127.0.0.1:9000");
        assert_eq!(cfg.max_multipart_memory, 1024);
        assert_eq!(cfg.upload_dir, PathBuf::from("/tmp/up"));
        assert_eq!(cfg.save_dir, PathBuf::from("."));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let cfg = config(&[("KITE_MAX_MULTIPART_MEMORY", "8MB"), ("KITE_MAX_BODY_SIZE", "-1")]);
        assert_eq!(cfg.max_multipart_memory, 8 << 20);
        assert_eq!(cfg.max_body_size, 32 << 20);
    }
}
