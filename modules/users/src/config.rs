use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsersConfig {
    /// Upper bound for `/api/test-db`.
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
    pub max_name_length: usize,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            max_name_length: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humantime_timeout() {
        let cfg: UsersConfig = serde_json::from_value(serde_json::json!({"probe_timeout": "750ms"})).unwrap();
        assert_eq!(cfg.probe_timeout, Duration::from_millis(750));
        assert_eq!(cfg.max_name_length, 100);
    }
}
