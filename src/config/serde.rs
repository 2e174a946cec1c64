use std::time::Duration;

use humantime::parse_duration;
use serde::Deserialize;
use serde_with::DeserializeAs;

/// Reads a duration written either as a humantime string (`"10s"`, `"1m 30s"`)
/// or as a bare number of seconds.
pub(crate) struct HumantimeDuration;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Text(String),
}

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match RawDuration::deserialize(deserializer)? {
            RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
            RawDuration::Text(raw) => parse_duration(raw.trim()).map_err(serde::de::Error::custom),
        }
    }
}
