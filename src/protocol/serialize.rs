// Serialization layer - Convert operations and messages to/from wire text
//!
//! Every message is a single colon-delimited string:
//!
//! ```text
//! CONNECTED:<clientId>
//! INIT_DOCUMENT:<text>
//! INSERT:<clientId>:<operationId>:<docVersion>:<pos>:<text>
//! DELETE:<clientId>:<operationId>:<docVersion>:<pos>:<length>
//! ```
//!
//! Inserted and snapshot text may contain colons and newlines; it is always
//! the verbatim remainder after the last fixed field.

use super::message::Message;
use crate::error::{EditError, Result};
use crate::ops::{Delete, Insert, OperationId, TextOperation};

pub const CONNECTED: &str = "CONNECTED";
pub const INIT_DOCUMENT: &str = "INIT_DOCUMENT";
pub const INSERT: &str = "INSERT";
pub const DELETE: &str = "DELETE";

/// Number of colon-delimited fields in an operation message
const OPERATION_FIELDS: usize = 6;

/// Serialize a text operation to wire format
pub fn serialize_operation(op: &TextOperation) -> String {
    match op {
        TextOperation::Insert(op) => format!(
            "{}:{}:{}:{}:{}:{}",
            INSERT, op.client_id, op.operation_id, op.doc_version, op.pos, op.text
        ),
        TextOperation::Delete(op) => format!(
            "{}:{}:{}:{}:{}:{}",
            DELETE, op.client_id, op.operation_id, op.doc_version, op.pos, op.length
        ),
    }
}

/// Deserialize a text operation from wire format
///
/// The text of an `INSERT` is everything after the fifth colon, taken
/// verbatim. Unknown keywords and missing fields are protocol errors.
pub fn deserialize_operation(message: &str) -> Result<TextOperation> {
    let keyword = message
        .split_once(':')
        .map(|(keyword, _)| keyword)
        .ok_or_else(|| EditError::Protocol(format!("Missing operation keyword: {:?}", message)))?;

    match keyword {
        INSERT => {
            let fields: Vec<&str> = message.splitn(OPERATION_FIELDS, ':').collect();
            if fields.len() < OPERATION_FIELDS {
                return Err(EditError::Protocol(format!(
                    "INSERT needs {} fields, got {}",
                    OPERATION_FIELDS,
                    fields.len()
                )));
            }

            Ok(TextOperation::Insert(Insert {
                client_id: fields[1].to_string(),
                operation_id: OperationId::from(fields[2]),
                doc_version: parse_field(fields[3], "docVersion")?,
                pos: parse_field(fields[4], "pos")?,
                text: fields[5].to_string(),
            }))
        }
        DELETE => {
            let fields: Vec<&str> = message.split(':').collect();
            if fields.len() < OPERATION_FIELDS {
                return Err(EditError::Protocol(format!(
                    "DELETE needs {} fields, got {}",
                    OPERATION_FIELDS,
                    fields.len()
                )));
            }

            Ok(TextOperation::Delete(Delete {
                client_id: fields[1].to_string(),
                operation_id: OperationId::from(fields[2]),
                doc_version: parse_field(fields[3], "docVersion")?,
                pos: parse_field(fields[4], "pos")?,
                length: parse_field(fields[5], "length")?,
            }))
        }
        other => Err(EditError::Protocol(format!(
            "Unrecognized operation keyword: {}",
            other
        ))),
    }
}

/// Serialize any protocol message
pub fn encode_message(message: &Message) -> String {
    match message {
        Message::Connected { client_id } => format!("{}:{}", CONNECTED, client_id),
        Message::InitDocument { text } => format!("{}:{}", INIT_DOCUMENT, text),
        Message::Operation(op) => serialize_operation(op),
    }
}

/// Deserialize any protocol message
pub fn decode_message(message: &str) -> Result<Message> {
    if let Some(text) = message
        .strip_prefix(INIT_DOCUMENT)
        .and_then(|rest| rest.strip_prefix(':'))
    {
        return Ok(Message::InitDocument {
            text: text.to_string(),
        });
    }

    if let Some(rest) = message
        .strip_prefix(CONNECTED)
        .and_then(|rest| rest.strip_prefix(':'))
    {
        let client_id = rest.split(':').next().unwrap_or_default();
        if client_id.is_empty() {
            return Err(EditError::Protocol("CONNECTED without client id".to_string()));
        }
        return Ok(Message::Connected {
            client_id: client_id.to_string(),
        });
    }

    deserialize_operation(message).map(Message::Operation)
}

fn parse_field<T>(raw: &str, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| EditError::Protocol(format!("Invalid {} {:?}: {}", name, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(text: &str) -> TextOperation {
        TextOperation::Insert(
            Insert::new(text, 4, "c1")
                .with_id(OperationId::from("c1_1700000000000_3"))
                .with_version(7),
        )
    }

    #[test]
    fn test_serialize_insert() {
        assert_eq!(
            serialize_operation(&insert("abc")),
            "INSERT:c1:c1_1700000000000_3:7:4:abc"
        );
    }

    #[test]
    fn test_serialize_delete() {
        let op = TextOperation::Delete(
            Delete::new(6, 5, "c2")
                .with_id(OperationId::from("c2_9_0"))
                .with_version(11),
        );
        assert_eq!(serialize_operation(&op), "DELETE:c2:c2_9_0:11:6:5");
    }

    #[test]
    fn test_insert_text_keeps_colons_and_newlines() {
        let op = insert("key: value\nnext:line:");
        let wire = serialize_operation(&op);
        assert_eq!(deserialize_operation(&wire).unwrap(), op);
    }

    #[test]
    fn test_insert_with_empty_text() {
        let op = deserialize_operation("INSERT:c1:id:0:3:").unwrap();
        assert!(op.is_noop());
        assert_eq!(op.pos(), 3);
    }

    #[test]
    fn test_delete_ignores_trailing_fields() {
        let op = deserialize_operation("DELETE:c1:id:2:3:4:junk").unwrap();
        match op {
            TextOperation::Delete(op) => {
                assert_eq!(op.doc_version, 2);
                assert_eq!(op.pos, 3);
                assert_eq!(op.length, 4);
            }
            other => panic!("expected delete, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_operations_are_errors() {
        for bad in [
            "",
            "INSERT",
            "INSERT:c1:id:0:5",
            "DELETE:c1:id:0:5",
            "DELETE:c1:id:zero:5:1",
            "INSERT:c1:id:0:-1:x",
            "REPLACE:c1:id:0:5:x",
            "CURSOR:5",
        ] {
            let err = deserialize_operation(bad).unwrap_err();
            assert!(err.is_protocol(), "{:?} should be a protocol error", bad);
        }
    }

    #[test]
    fn test_decode_connected() {
        assert_eq!(
            decode_message("CONNECTED:alice").unwrap(),
            Message::Connected {
                client_id: "alice".to_string()
            }
        );
        assert!(decode_message("CONNECTED:").is_err());
    }

    #[test]
    fn test_decode_init_document() {
        assert_eq!(
            decode_message("INIT_DOCUMENT:a:b\nc").unwrap(),
            Message::InitDocument {
                text: "a:b\nc".to_string()
            }
        );
        assert_eq!(
            decode_message("INIT_DOCUMENT:").unwrap(),
            Message::InitDocument {
                text: String::new()
            }
        );
    }

    #[test]
    fn test_encode_decode_messages() {
        for message in [
            Message::connected("bob"),
            Message::init_document("Hello: World"),
            Message::Operation(insert("x")),
        ] {
            assert_eq!(decode_message(&encode_message(&message)).unwrap(), message);
        }
    }
}
