use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewsConfig {
    pub max_title_length: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            max_title_length: 200,
        }
    }
}
