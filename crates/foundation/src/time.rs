use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instant as milliseconds since the Unix epoch, the unit feeds publish.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.0)
    }

    /// IMF-fixdate rendering, e.g. `Tue, 14 Nov 2023 22:13:20 GMT`.
    ///
    /// Out-of-range instants render as `Invalid Date`.
    pub fn to_utc_string(self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
            None => "Invalid Date".to_string(),
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_utc_string())
    }
}
