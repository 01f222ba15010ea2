use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Weather document returned by the provider.
///
/// The contents are never interpreted; the document is archived as-is. It must
/// be a JSON object, anything else fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherPayload(Map<String, Value>);

impl WeatherPayload {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Indented JSON, the on-disk and archived representation.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.0)
    }
}
