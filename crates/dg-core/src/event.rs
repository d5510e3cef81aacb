//! Wire types at both ends of the trigger.
//!
//! - [`ContactFlowEvent`]: what the contact flow sends when it invokes us.
//! - [`IntegratorPayload`]: what we hand to the integrator to start a session.
//! - [`LambdaResult`]: what the contact flow gets back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::params::ParamSet;

// ─────────────────────────────────────────────────────────────────────────────
// Inbound event
// ─────────────────────────────────────────────────────────────────────────────

/// Contact-flow invocation event. Unknown fields are ignored.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactFlowEvent {
    /// Event discriminant, expected to be `ContactFlowEvent`.
    pub name: String,
    /// Event body.
    pub details: EventDetails,
}

/// `Details` block of the event.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventDetails {
    /// Data about the contact that triggered the flow.
    pub contact_data: ContactData,
}

/// `ContactData` block of the event.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactData {
    /// Contact identifier, substituted into the callback URL.
    pub contact_id: String,
    /// Raw contact attributes. Kept untyped so a malformed container can be
    /// reported instead of failing the whole event decode.
    #[serde(default)]
    pub attributes: Option<Value>,
    /// Media streams attached to the contact.
    pub media_streams: MediaStreams,
}

/// `MediaStreams` block of the event.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaStreams {
    /// Customer-side streams.
    pub customer: CustomerStreams,
}

/// `MediaStreams.Customer` block of the event.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerStreams {
    /// Audio stream descriptor.
    pub audio: AudioStream,
}

/// Kinesis Video stream carrying the call audio.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AudioStream {
    /// ARN of the stream.
    #[serde(rename = "StreamARN")]
    pub stream_arn: String,
    /// Fragment to start reading from.
    pub start_fragment_number: String,
}

impl ContactFlowEvent {
    /// The audio stream descriptor.
    pub fn audio(&self) -> &AudioStream {
        &self.details.contact_data.media_streams.customer.audio
    }

    /// The contact ID.
    pub fn contact_id(&self) -> &str {
        &self.details.contact_data.contact_id
    }

    /// The raw contact attributes, if any were sent.
    pub fn attributes(&self) -> Option<&Value> {
        self.details.contact_data.attributes.as_ref()
    }
}

/// Read the `Name` discriminant without decoding the rest of the event.
pub fn event_name(event: &Value) -> Option<&str> {
    event.get("Name").and_then(Value::as_str)
}

// ─────────────────────────────────────────────────────────────────────────────
// Integrator payload
// ─────────────────────────────────────────────────────────────────────────────

/// Errors encoding or decoding an [`IntegratorPayload`].
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The JSON was malformed, incomplete or carried unexpected fields.
    #[error("invalid integrator arguments: {0}")]
    Decode(#[source] serde_json::Error),
    /// The payload could not be serialized.
    #[error("failed to encode integrator arguments: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Stream the integrator should read audio from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KvsStream {
    /// Stream ARN.
    pub arn: String,
    /// Fragment to start from.
    pub start_fragment_number: String,
}

/// Arguments for one integrator session.
///
/// Decoding is strict: every field is required, none may be null and
/// unknown fields are rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IntegratorPayload {
    /// Contact the session belongs to.
    pub contact_id: String,
    /// Audio source.
    pub kvs_stream: KvsStream,
    /// Query params for the Deepgram streaming API.
    pub dg_params: ParamSet,
    /// Whether the integrator should pace audio at real time.
    pub enforce_realtime: bool,
}

impl IntegratorPayload {
    /// Build the payload for a contact-flow event and its DG params.
    pub fn for_event(
        event: &ContactFlowEvent,
        dg_params: ParamSet,
        enforce_realtime: bool,
    ) -> Self {
        let audio = event.audio();
        Self {
            contact_id: event.contact_id().to_string(),
            kvs_stream: KvsStream {
                arn: audio.stream_arn.clone(),
                start_fragment_number: audio.start_fragment_number.clone(),
            },
            dg_params,
            enforce_realtime,
        }
    }

    /// Strictly decode integrator arguments.
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        serde_json::from_str(json).map_err(PayloadError::Decode)
    }

    /// Encode as compact JSON.
    pub fn to_json(&self) -> Result<String, PayloadError> {
        serde_json::to_string(self).map_err(PayloadError::Encode)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outbound result
// ─────────────────────────────────────────────────────────────────────────────

/// Result object returned to the contact flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LambdaResult {
    /// `"success"` or `"fail"`.
    #[serde(rename = "lambdaResult")]
    pub lambda_result: String,
}

impl LambdaResult {
    /// Result for the given outcome.
    pub fn from_success(is_success: bool) -> Self {
        let text = if is_success { "success" } else { "fail" };
        Self {
            lambda_result: text.to_string(),
        }
    }

    /// A failed result.
    pub fn fail() -> Self {
        Self::from_success(false)
    }

    /// Whether this reports success.
    pub fn is_success(&self) -> bool {
        self.lambda_result == "success"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use assert_matches::assert_matches;
    use serde_json::json;

    const ARN: &str = "arn:aws:kinesisvideo:eu-west-2:111111111111:stream/instance-alias-contact-ddddddd-bbbb-dddd-eeee-ffffffffffff/9999999999999";

    fn sample_event() -> Value {
        json!({
            "Name": "ContactFlowEvent",
            "Details": {
                "ContactData": {
                    "ContactId": "4a573372-1f28-4e26-b97b-XXXXXXXXXXX",
                    "Attributes": {"dg_model": "nova"},
                    "Channel": "VOICE",
                    "MediaStreams": {
                        "Customer": {
                            "Audio": {
                                "StreamARN": ARN,
                                "StartFragmentNumber": "100",
                                "StartTimestamp": "1665000000000"
                            }
                        }
                    }
                },
                "Parameters": {}
            }
        })
    }

    fn sample_payload_json() -> Value {
        json!({
            "contactId": "4a573372-1f28-4e26-b97b-XXXXXXXXXXX",
            "kvsStream": {"arn": ARN, "startFragmentNumber": "100"},
            "dgParams": {
                "model": "nova",
                "tag": ["someTag1", "someTag2"],
                "callback": "https://example.com/4a573372-1f28-4e26-b97b-XXXXXXXXXXX"
            },
            "enforceRealtime": true
        })
    }

    // ── ContactFlowEvent ────────────────────────────────────────────

    #[test]
    fn event_decodes_and_ignores_extra_fields() {
        let event: ContactFlowEvent = serde_json::from_value(sample_event()).unwrap();
        assert_eq!(event.name, "ContactFlowEvent");
        assert_eq!(event.contact_id(), "4a573372-1f28-4e26-b97b-XXXXXXXXXXX");
        assert_eq!(event.audio().stream_arn, ARN);
        assert_eq!(event.audio().start_fragment_number, "100");
        assert_eq!(event.attributes(), Some(&json!({"dg_model": "nova"})));
    }

    #[test]
    fn event_without_attributes() {
        let mut raw = sample_event();
        let _ = raw["Details"]["ContactData"]
            .as_object_mut()
            .unwrap()
            .remove("Attributes");
        let event: ContactFlowEvent = serde_json::from_value(raw).unwrap();
        assert!(event.attributes().is_none());
    }

    #[test]
    fn event_with_null_attributes() {
        let mut raw = sample_event();
        raw["Details"]["ContactData"]["Attributes"] = Value::Null;
        let event: ContactFlowEvent = serde_json::from_value(raw).unwrap();
        assert!(event.attributes().is_none());
    }

    #[test]
    fn event_keeps_malformed_attributes_for_later() {
        let mut raw = sample_event();
        raw["Details"]["ContactData"]["Attributes"] = json!(["dg_model"]);
        let event: ContactFlowEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.attributes(), Some(&json!(["dg_model"])));
    }

    #[test]
    fn event_name_peek() {
        assert_eq!(event_name(&sample_event()), Some("ContactFlowEvent"));
        assert_eq!(event_name(&json!({"Name": 3})), None);
        assert_eq!(event_name(&json!({})), None);
    }

    // ── IntegratorPayload ───────────────────────────────────────────

    #[test]
    fn payload_for_event() {
        let event: ContactFlowEvent = serde_json::from_value(sample_event()).unwrap();
        let params: ParamSet = [("model", ParamValue::from("nova"))].into_iter().collect();
        let payload = IntegratorPayload::for_event(&event, params.clone(), false);
        assert_eq!(payload.contact_id, "4a573372-1f28-4e26-b97b-XXXXXXXXXXX");
        assert_eq!(payload.kvs_stream.arn, ARN);
        assert_eq!(payload.kvs_stream.start_fragment_number, "100");
        assert_eq!(payload.dg_params, params);
        assert!(!payload.enforce_realtime);
    }

    #[test]
    fn payload_wire_names() {
        let payload = IntegratorPayload::from_json(&sample_payload_json().to_string()).unwrap();
        let back: Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(back, sample_payload_json());
    }

    #[test]
    fn payload_decodes_param_shapes() {
        let payload = IntegratorPayload::from_json(&sample_payload_json().to_string()).unwrap();
        assert_eq!(payload.dg_params.get("model"), Some(&ParamValue::from("nova")));
        assert_eq!(
            payload.dg_params.get("tag"),
            Some(&ParamValue::List(vec!["someTag1".into(), "someTag2".into()]))
        );
        assert!(payload.enforce_realtime);
    }

    #[test]
    fn payload_rejects_extra_field() {
        let mut raw = sample_payload_json();
        raw["something"] = json!("else");
        assert_matches!(
            IntegratorPayload::from_json(&raw.to_string()),
            Err(PayloadError::Decode(_))
        );
    }

    #[test]
    fn payload_rejects_missing_fields() {
        for field in ["contactId", "kvsStream", "dgParams", "enforceRealtime"] {
            let mut raw = sample_payload_json();
            let _ = raw.as_object_mut().unwrap().remove(field);
            assert!(
                IntegratorPayload::from_json(&raw.to_string()).is_err(),
                "missing {field} should fail"
            );
        }
    }

    #[test]
    fn payload_rejects_null_fields() {
        for field in ["contactId", "kvsStream", "dgParams"] {
            let mut raw = sample_payload_json();
            raw[field] = Value::Null;
            assert!(
                IntegratorPayload::from_json(&raw.to_string()).is_err(),
                "null {field} should fail"
            );
        }
    }

    #[test]
    fn payload_rejects_empty_param_array() {
        let mut raw = sample_payload_json();
        raw["dgParams"]["tag"] = json!([]);
        let err = IntegratorPayload::from_json(&raw.to_string()).unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn payload_rejects_non_string_param() {
        let mut raw = sample_payload_json();
        raw["dgParams"]["model"] = json!(3);
        assert!(IntegratorPayload::from_json(&raw.to_string()).is_err());
    }

    // ── LambdaResult ────────────────────────────────────────────────

    #[test]
    fn lambda_result_wire_format() {
        assert_eq!(
            serde_json::to_value(LambdaResult::from_success(true)).unwrap(),
            json!({"lambdaResult": "success"})
        );
        assert_eq!(
            serde_json::to_value(LambdaResult::fail()).unwrap(),
            json!({"lambdaResult": "fail"})
        );
    }

    #[test]
    fn lambda_result_is_success() {
        assert!(LambdaResult::from_success(true).is_success());
        assert!(!LambdaResult::fail().is_success());
    }
}
