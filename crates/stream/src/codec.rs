//! Wire codec for inbound transaction records and outbound decisions
//!
//! Field names are fixed by the upstream contract; unknown fields on inbound
//! records are ignored. Amounts travel as JSON numbers, matching the
//! float-typed producer on the other side of the stream.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use txgate_core::{Decision, TransactionEvent};

use crate::error::StreamError;

/// Wire shape of one inbound transaction record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundRecord {
    pub client_id: i64,
    pub account_id: i64,
    pub transaction_id: i64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "transaction_amount", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "account_balance", with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl From<InboundRecord> for TransactionEvent {
    fn from(record: InboundRecord) -> Self {
        TransactionEvent {
            client_id: record.client_id,
            account_id: record.account_id,
            transaction_id: record.transaction_id,
            timestamp: record.timestamp,
            amount: record.amount,
            balance: record.balance,
        }
    }
}

impl From<&TransactionEvent> for InboundRecord {
    fn from(event: &TransactionEvent) -> Self {
        InboundRecord {
            client_id: event.client_id,
            account_id: event.account_id,
            transaction_id: event.transaction_id,
            timestamp: event.timestamp,
            amount: event.amount,
            balance: event.balance,
        }
    }
}

/// Accept both ISO-8601 forms seen on the inbound stream: timestamps with
/// an explicit offset (RFC 3339) and the upstream producer's zone-less
/// local-datetime form, which is interpreted as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Decode one inbound payload into a transaction event
pub fn decode_event(payload: &str) -> Result<TransactionEvent, StreamError> {
    let record: InboundRecord = serde_json::from_str(payload).map_err(StreamError::Decode)?;
    Ok(record.into())
}

/// Encode a transaction event as an inbound payload (producer side, tests)
pub fn encode_event(event: &TransactionEvent) -> Result<String, StreamError> {
    serde_json::to_string(&InboundRecord::from(event)).map_err(StreamError::Encode)
}

/// Encode a decision as an outbound payload
pub fn encode_decision(decision: &Decision) -> Result<String, StreamError> {
    serde_json::to_string(decision).map_err(StreamError::Encode)
}

/// Decode an outbound payload back into a decision (consumer side, tests)
pub fn decode_decision(payload: &str) -> Result<Decision, StreamError> {
    serde_json::from_str(payload).map_err(StreamError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_inbound_record() {
        let payload = r#"{
            "client_id": 1,
            "account_id": 100,
            "transaction_id": 555,
            "timestamp": "2024-03-01T10:15:30Z",
            "transaction_amount": 10.5,
            "account_balance": 100.0
        }"#;

        let event = decode_event(payload).unwrap();

        assert_eq!(event.client_id, 1);
        assert_eq!(event.account_id, 100);
        assert_eq!(event.transaction_id, 555);
        assert_eq!(event.amount, dec!(10.5));
        assert_eq!(event.balance, dec!(100));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let payload = r#"{
            "client_id": 1,
            "account_id": 100,
            "transaction_id": 555,
            "timestamp": "2024-03-01T10:15:30Z",
            "transaction_amount": 10.0,
            "account_balance": 100.0,
            "merchant": "ACME",
            "channel": "web"
        }"#;

        assert!(decode_event(payload).is_ok());
    }

    #[test]
    fn test_zoneless_timestamp_decoded_as_utc() {
        // The upstream producer emits local datetimes without an offset
        let payload = r#"{
            "client_id": 1,
            "account_id": 100,
            "transaction_id": 555,
            "timestamp": "2024-03-01T10:15:30",
            "transaction_amount": 10.0,
            "account_balance": 100.0
        }"#;

        let event = decode_event(payload).unwrap();
        assert_eq!(
            event.timestamp,
            "2024-03-01T10:15:30Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_zoneless_timestamp_with_fraction() {
        let payload = r#"{
            "client_id": 1,
            "account_id": 100,
            "transaction_id": 555,
            "timestamp": "2024-03-01T10:15:30.250",
            "transaction_amount": 10.0,
            "account_balance": 100.0
        }"#;

        let event = decode_event(payload).unwrap();
        assert_eq!(
            event.timestamp,
            "2024-03-01T10:15:30.250Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_offset_timestamp_normalized_to_utc() {
        let payload = r#"{
            "client_id": 1,
            "account_id": 100,
            "transaction_id": 555,
            "timestamp": "2024-03-01T11:15:30+01:00",
            "transaction_amount": 10.0,
            "account_balance": 100.0
        }"#;

        let event = decode_event(payload).unwrap();
        assert_eq!(
            event.timestamp,
            "2024-03-01T10:15:30Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_decode_failure() {
        let payload = r#"{
            "client_id": 1,
            "account_id": 100,
            "transaction_id": 555,
            "timestamp": "yesterday at noon",
            "transaction_amount": 10.0,
            "account_balance": 100.0
        }"#;

        assert!(matches!(
            decode_event(payload).unwrap_err(),
            StreamError::Decode(_)
        ));
    }

    #[test]
    fn test_decode_failure_on_malformed_payload() {
        let err = decode_event("not json at all").unwrap_err();
        assert!(matches!(err, StreamError::Decode(_)));

        let err = decode_event(r#"{"client_id": "abc"}"#).unwrap_err();
        assert!(matches!(err, StreamError::Decode(_)));
    }

    #[test]
    fn test_missing_field_is_decode_failure() {
        let payload = r#"{"client_id": 1, "account_id": 100}"#;
        assert!(decode_event(payload).is_err());
    }

    #[test]
    fn test_event_round_trip() {
        let event = TransactionEvent {
            client_id: 2,
            account_id: 200,
            transaction_id: 9,
            timestamp: "2024-03-01T10:15:30Z".parse().unwrap(),
            amount: dec!(10),
            balance: dec!(5),
        };

        let payload = encode_event(&event).unwrap();
        assert!(payload.contains("\"transaction_amount\":10.0"));
        assert!(payload.contains("\"account_balance\":5.0"));

        let decoded = decode_event(&payload).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_encode_decision_wire_shape() {
        let payload = encode_decision(&Decision::rejected(9, 200)).unwrap();
        assert_eq!(
            payload,
            r#"{"transaction_id":9,"account_id":200,"status":"REJECTED"}"#
        );
    }
}
