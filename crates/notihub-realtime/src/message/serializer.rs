//! JSON serialization for stream messages.

use serde_json;

use super::types::StreamMessage;

/// Deserialize a stream message from an event's `data` payload.
pub fn decode_message(data: &str) -> Result<StreamMessage, serde_json::Error> {
    serde_json::from_str(data)
}

/// Serialize a stream message into an event `data` payload.
pub fn encode_message(message: &StreamMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::ContentChange;
    use notihub_core::types::Notification;

    #[test]
    fn decodes_notification_envelope() {
        let raw = r#"{"type":"notification","data":{"_id":"c","title":"عنوان","message":"نص","titleEn":"Title","isRead":false}}"#;
        match decode_message(raw).unwrap() {
            StreamMessage::Notification { data } => {
                assert_eq!(data.id.as_str(), "c");
                assert_eq!(data.title_alt.as_deref(), Some("Title"));
                assert!(!data.is_read);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn decodes_change_envelope() {
        let raw = r#"{"type":"change","collection":"comments","operationType":"insert","documentId":"x1"}"#;
        let msg = decode_message(raw).unwrap();
        assert_eq!(
            msg,
            StreamMessage::Change(ContentChange {
                collection: "comments".to_string(),
                operation: Some("insert".to_string()),
                document_id: Some("x1".to_string()),
            })
        );
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        let msg = decode_message(r#"{"type":"heartbeat","at":1}"#).unwrap();
        assert_eq!(msg, StreamMessage::Unknown);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(decode_message("{not json").is_err());
        assert!(decode_message(r#"{"type":"notification","data":{"title":"no id"}}"#).is_err());
    }

    #[test]
    fn encoded_notification_decodes_back() {
        let msg = StreamMessage::Notification {
            data: Notification::new("n1", "t", "m"),
        };
        let text = encode_message(&msg).unwrap();
        assert!(text.contains(r#""type":"notification""#));
        match decode_message(&text).unwrap() {
            StreamMessage::Notification { data } => assert_eq!(data.id.as_str(), "n1"),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
