use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{NodeUri, SuppressionMode, SuppressionState};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Body of `POST /Query`. Values are bound server-side through `@name`
/// placeholders, never spliced into the SWQL text.
#[derive(Debug, Serialize)]
pub(crate) struct QueryRequest<'a> {
    pub(crate) query: &'a str,
    pub(crate) parameters: BTreeMap<&'a str, &'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse<T> {
    pub(crate) results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UriRow {
    #[serde(rename = "Uri")]
    pub(crate) uri: NodeUri,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntityUris<'a> {
    pub(crate) entity_uris: [&'a str; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SuppressRequest<'a> {
    pub(crate) entity_uris: [&'a str; 1],
    pub(crate) suppress_from: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawSuppressionState {
    #[serde(default)]
    pub(crate) entity_uri: Option<NodeUri>,
    pub(crate) suppression_mode: i64,
    #[serde(default)]
    pub(crate) suppressed_from: Option<String>,
    #[serde(default)]
    pub(crate) suppressed_until: Option<String>,
}

impl From<RawSuppressionState> for SuppressionState {
    fn from(value: RawSuppressionState) -> Self {
        Self {
            entity_uri: value.entity_uri,
            mode: SuppressionMode::from(value.suppression_mode),
            suppressed_from: value.suppressed_from,
            suppressed_until: value.suppressed_until,
        }
    }
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "<empty>".to_string();
    }
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    let mut preview = String::from_utf8_lossy(&body[..end]).to_string();
    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::{RawSuppressionState, body_preview};
    use crate::types::{SuppressionMode, SuppressionState};

    #[test]
    fn suppression_state_from_swis_json() {
        let raw: RawSuppressionState = match serde_json::from_str(
            r#"{
                "EntityUri": "swis://orion/Orion/Orion.Nodes/NodeID=7",
                "SuppressionMode": 1,
                "SuppressedFrom": "2024-05-01T10:00:00Z",
                "SuppressedUntil": null
            }"#,
        ) {
            Ok(raw) => raw,
            Err(err) => panic!("failed to parse state: {err}"),
        };
        let state = SuppressionState::from(raw);
        assert_eq!(state.mode, SuppressionMode::Suppressed);
        assert!(state.is_suppressed());
        assert_eq!(state.suppressed_until, None);
    }

    #[test]
    fn suppression_mode_is_required() {
        let res = serde_json::from_str::<RawSuppressionState>(r#"{"EntityUri":"swis://x"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn body_preview_truncates_and_escapes() {
        assert_eq!(body_preview(b""), "<empty>");
        assert_eq!(body_preview(b"a\nb"), "a\\nb");
        let long = vec![b'x'; 300];
        let preview = body_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.len(), 259);
    }
}
