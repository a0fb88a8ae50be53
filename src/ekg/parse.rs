use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: Option<String>,
    data: T,
    #[serde(default)]
    message: Option<String>,
}

/// Unwraps the backend's `{status, data, message}` envelope around a payload.
pub(super) fn unwrap_envelope<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let envelope: Envelope<T> =
        serde_json::from_str(raw).context("invalid JSON envelope from backend")?;

    if let Some(status) = &envelope.status
        && status == "error"
    {
        let message = envelope
            .message
            .unwrap_or_else(|| "backend reported an error without a message".to_owned());
        return Err(anyhow!("{message}"));
    }

    Ok(envelope.data)
}

/// Paginated responses carry the page metadata at the top level rather than
/// inside `data`, so they deserialize as-is.
pub(super) fn parse_page<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).context("invalid paginated JSON from backend")
}

/// Best-effort extraction of the human-readable `message` from an error body.
pub(super) fn error_message(raw: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(raw).ok()?;
    parsed
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ekg::GraphStats;

    #[test]
    fn unwraps_success_envelope() {
        let raw = r#"{"status":"success","data":{"totalEvents":12,"totalEntities":4}}"#;
        let stats: GraphStats = unwrap_envelope(raw).expect("envelope parses");
        assert_eq!(stats.total_events, 12);
        assert_eq!(stats.total_entities, 4);
    }

    #[test]
    fn error_status_surfaces_the_message() {
        let raw = r#"{"status":"error","data":null,"message":"SPARQL endpoint timed out"}"#;
        let result: Result<Option<GraphStats>> = unwrap_envelope(raw);
        let error = result.expect_err("error status must fail");
        assert!(error.to_string().contains("SPARQL endpoint timed out"));
    }

    #[test]
    fn error_message_reads_plain_bodies() {
        assert_eq!(
            error_message(r#"{"message":"graph store unreachable"}"#).as_deref(),
            Some("graph store unreachable")
        );
        assert_eq!(error_message("not json"), None);
    }
}
