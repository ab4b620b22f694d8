use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventsConfig {
    /// JSON array of events; relative paths resolve under the home dir.
    pub data_file: String,
    /// Environment variable that may carry a full snapshot of the collection.
    pub snapshot_env: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            data_file: "data/events.json".to_string(),
            snapshot_env: "HARBORLINE_EVENTS_SNAPSHOT".to_string(),
        }
    }
}
