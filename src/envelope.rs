//! Durable message envelopes
//!
//! One envelope per message hop. The envelope is a plain serde value with no
//! in-memory references, so a durable substrate can persist and replay it
//! across restarts.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors encoding or decoding envelopes
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("failed to serialize envelope payload: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to deserialize {what}: {error}")]
    Deserialize {
        what: String,
        #[source]
        error: serde_json::Error,
    },
}

/// A message in flight between executors, or the workflow's initial input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableMessageEnvelope {
    message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_executor_id: Option<String>,
}

impl DurableMessageEnvelope {
    /// Envelope for the workflow's external input; it has no source executor
    pub fn for_input(message: impl Into<String>, input_type_name: Option<String>) -> Self {
        Self {
            message: message.into(),
            input_type_name,
            source_executor_id: None,
        }
    }

    /// Envelope for a producer-to-successor hop.
    ///
    /// `source_executor_id` must be the id of the producing executor.
    pub fn from_executor(
        source_executor_id: impl Into<String>,
        message: impl Into<String>,
        input_type_name: Option<String>,
    ) -> Self {
        let source_executor_id = source_executor_id.into();
        debug_assert!(!source_executor_id.is_empty(), "source executor id is empty");
        Self {
            message: message.into(),
            input_type_name,
            source_executor_id: Some(source_executor_id),
        }
    }

    /// Encode `value` as JSON into an initial-input envelope
    pub fn encode_input<T: Serialize>(value: &T) -> Result<Self, EnvelopeError> {
        let message = serde_json::to_string(value).map_err(EnvelopeError::Serialize)?;
        Ok(Self::for_input(message, Some(std::any::type_name::<T>().to_string())))
    }

    /// Encode `value` as JSON into an envelope produced by `source_executor_id`
    pub fn encode_from_executor<T: Serialize>(
        source_executor_id: impl Into<String>,
        value: &T,
    ) -> Result<Self, EnvelopeError> {
        let message = serde_json::to_string(value).map_err(EnvelopeError::Serialize)?;
        Ok(Self::from_executor(
            source_executor_id,
            message,
            Some(std::any::type_name::<T>().to_string()),
        ))
    }

    /// Decode the JSON payload
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, EnvelopeError> {
        serde_json::from_str(&self.message).map_err(|error| EnvelopeError::Deserialize {
            what: self
                .input_type_name
                .clone()
                .unwrap_or_else(|| "message payload".into()),
            error,
        })
    }

    /// Payload as a JSON value, for condition evaluation
    pub fn payload(&self) -> Result<serde_json::Value, EnvelopeError> {
        self.decode()
    }

    pub fn to_json(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(EnvelopeError::Serialize)
    }

    pub fn from_json(json: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(json).map_err(|error| EnvelopeError::Deserialize {
            what: "envelope".into(),
            error,
        })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn input_type_name(&self) -> Option<&str> {
        self.input_type_name.as_deref()
    }

    pub fn source_executor_id(&self) -> Option<&str> {
        self.source_executor_id.as_deref()
    }

    /// True for the workflow's initial external input
    pub fn is_initial_input(&self) -> bool {
        self.source_executor_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ticket {
        id: u32,
        title: String,
    }

    #[test]
    fn test_for_input_has_no_source() {
        let env = DurableMessageEnvelope::for_input("x", Some("T".into()));
        assert_eq!(env.source_executor_id(), None);
        assert_eq!(env.message(), "x");
        assert_eq!(env.input_type_name(), Some("T"));
        assert!(env.is_initial_input());
    }

    #[test]
    fn test_from_executor_keeps_source() {
        let env = DurableMessageEnvelope::from_executor("E1", "x", Some("T".into()));
        assert_eq!(env.source_executor_id(), Some("E1"));
        assert!(!env.is_initial_input());
    }

    #[test]
    fn test_json_shape_omits_absent_fields() {
        let env = DurableMessageEnvelope::for_input("{\"n\":1}", None);
        let value: serde_json::Value = serde_json::from_str(&env.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"message": "{\"n\":1}"}));

        let env = DurableMessageEnvelope::from_executor("E1", "42", Some("i64".into()));
        let value: serde_json::Value = serde_json::from_str(&env.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"message": "42", "input_type_name": "i64", "source_executor_id": "E1"})
        );
    }

    #[test]
    fn test_from_json_restores_envelope() {
        let env = DurableMessageEnvelope::from_executor("reviewer", "\"ok\"", None);
        let restored = DurableMessageEnvelope::from_json(&env.to_json().unwrap()).unwrap();
        assert_eq!(restored, env);

        let minimal = DurableMessageEnvelope::from_json(r#"{"message":"hi"}"#).unwrap();
        assert!(minimal.is_initial_input());
        assert_eq!(minimal.input_type_name(), None);
    }

    #[test]
    fn test_from_json_rejects_missing_message() {
        let err = DurableMessageEnvelope::from_json(r#"{"source_executor_id":"a"}"#).unwrap_err();
        assert!(err.to_string().contains("envelope"));
    }

    #[test]
    fn test_typed_encode_decode() {
        let ticket = Ticket {
            id: 7,
            title: "flaky test".into(),
        };
        let env = DurableMessageEnvelope::encode_from_executor("triage", &ticket).unwrap();

        assert_eq!(env.source_executor_id(), Some("triage"));
        assert!(env.input_type_name().unwrap().ends_with("Ticket"));
        assert_eq!(env.decode::<Ticket>().unwrap(), ticket);
        assert_eq!(env.payload().unwrap()["id"], 7);
    }

    #[test]
    fn test_decode_error_names_type() {
        let env = DurableMessageEnvelope::for_input("not json", Some("app::Ticket".into()));
        let err = env.decode::<Ticket>().unwrap_err();
        assert!(err.to_string().contains("app::Ticket"));

        let input = DurableMessageEnvelope::encode_input(&vec![1, 2, 3]).unwrap();
        assert!(input.is_initial_input());
        assert_eq!(input.decode::<Vec<i32>>().unwrap(), vec![1, 2, 3]);
    }
}
