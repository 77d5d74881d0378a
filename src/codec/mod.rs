//! Portable encodings of a [`Flow`].
//!
//! The text format is JSON mirroring the data model in camelCase. Unknown fields
//! are ignored on decode. [`decode`] only checks shape; use [`import`] when the
//! document comes from outside and its references must be trusted.

use crate::error::FlowError;
use crate::model::Flow;
use crate::ops::validate;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};

/// Encodes a flow as compact JSON text.
pub fn encode(flow: &Flow) -> String {
    // A Flow holds only strings, numbers, bools and sequences, so JSON encoding cannot fail.
    serde_json::to_string(flow).unwrap_or_default()
}

/// Encodes a flow as indented JSON, for export files meant to be read by people.
pub fn encode_pretty(flow: &Flow) -> String {
    serde_json::to_string_pretty(flow).unwrap_or_default()
}

/// Parses JSON text into a flow without checking cross references.
pub fn decode(text: &str) -> Result<Flow, FlowError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::warn!(error = %e, "rejecting malformed flow document");
        FlowError::MalformedInput(e.to_string())
    })
}

/// Decodes a flow and re-checks every invariant, as done for operator imports.
pub fn import(text: &str) -> Result<Flow, FlowError> {
    checked(decode(text)?)
}

/// Binary counterpart of [`import`].
pub fn import_bytes(bytes: &[u8]) -> Result<Flow, FlowError> {
    checked(from_bytes(bytes)?)
}

fn checked(flow: Flow) -> Result<Flow, FlowError> {
    if flow.steps.is_empty() {
        return Err(FlowError::InvariantViolation(vec![
            "flow has no steps".to_string(),
        ]));
    }
    validate(&flow).map_err(|violations| {
        FlowError::InvariantViolation(violations.iter().map(|v| v.to_string()).collect())
    })?;
    Ok(flow)
}

/// Serializes a flow into a compact binary snapshot.
pub fn to_bytes(flow: &Flow) -> Result<Vec<u8>, FlowError> {
    encode_to_vec(flow, standard())
        .map_err(|e| FlowError::MalformedInput(format!("Serialization failed: {}", e)))
}

/// Deserializes a binary snapshot produced by [`to_bytes`].
///
/// Traffic shares must be finite, so every decoded flow can also be written as JSON.
pub fn from_bytes(bytes: &[u8]) -> Result<Flow, FlowError> {
    let flow: Flow = decode_from_slice(bytes, standard())
        .map(|(flow, _)| flow) // bincode 2 returns (value, bytes_read)
        .map_err(|e| FlowError::MalformedInput(format!("Deserialization failed: {}", e)))?;
    if let Some(v) = flow.variants.iter().find(|v| !v.traffic_percent.is_finite()) {
        tracing::warn!(variant_id = %v.id, "rejecting snapshot with non-finite traffic");
        return Err(FlowError::MalformedInput(format!(
            "variant '{}' has non-finite traffic",
            v.id
        )));
    }
    Ok(flow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_field_is_malformed() {
        let err = decode(r#"{"steps":[{"id":"s1","status":"Running"}]}"#).unwrap_err();
        assert!(matches!(err, FlowError::MalformedInput(msg) if msg.contains("title")));
    }

    #[test]
    fn missing_collections_are_malformed() {
        for text in ["{}", "[]", r#"{"steps":[],"variants":[]}"#] {
            assert!(
                matches!(decode(text), Err(FlowError::MalformedInput(_))),
                "{} decoded",
                text
            );
        }
    }

    #[test]
    fn variant_without_winner_flag_is_malformed() {
        let text = r#"{
            "steps": [{"id":"s1","title":"Landing","status":"Running","variantIds":["v1"]}],
            "variants": [{"id":"v1","title":"Control","trafficPercent":100,"status":"Running","launched":false}],
            "edges": []
        }"#;
        let err = decode(text).unwrap_err();
        assert!(matches!(err, FlowError::MalformedInput(msg) if msg.contains("winner")));
    }

    #[test]
    fn import_rejects_flow_without_steps() {
        let text = r#"{"steps":[],"variants":[],"edges":[]}"#;
        assert!(decode(text).is_ok());
        match import(text) {
            Err(FlowError::InvariantViolation(msgs)) => assert_eq!(msgs, vec!["flow has no steps"]),
            other => panic!("expected invariant violation, got {:?}", other),
        }
    }

    #[test]
    fn snapshot_with_nan_traffic_is_malformed() {
        let mut flow = crate::ops::create_skeleton("Landing").unwrap();
        flow.variants[0].traffic_percent = f64::NAN;
        let bytes = to_bytes(&flow).unwrap();

        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, FlowError::MalformedInput(msg) if msg.contains("non-finite")));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let flow = decode(
            r#"{
                "schema": 2,
                "steps": [{"id":"s1","title":"Landing","status":"Running","variantIds":[],"color":"red"}],
                "variants": [],
                "edges": []
            }"#,
        )
        .unwrap();
        assert_eq!(flow.steps[0].title, "Landing");
    }

    #[test]
    fn import_rejects_dangling_references() {
        let text = r#"{"steps":[{"id":"s1","title":"Landing","status":"Running","variantIds":["ghost"]}],"variants":[],"edges":[]}"#;
        assert!(decode(text).is_ok());
        assert!(matches!(
            import(text).unwrap_err(),
            FlowError::InvariantViolation(_)
        ));
    }
}
