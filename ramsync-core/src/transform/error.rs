use thiserror::Error;

use crate::EndpointKind;

/// Errors raised while mapping a raw record into a typed row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The record does not have the expected shape.
    #[error("malformed {kind} record {}: {message}", display_id(.record_id))]
    Malformed {
        /// Entity kind being transformed.
        kind: EndpointKind,
        /// Record id, when it could be read.
        record_id: Option<i64>,
        /// Decoder error description.
        message: String,
    },
    /// The `created` field is not in the expected timestamp format.
    #[error("{kind} record {record_id} has an unparsable {field} timestamp {value:?}")]
    InvalidTimestamp {
        /// Entity kind being transformed.
        kind: EndpointKind,
        /// Record id.
        record_id: i64,
        /// Offending field name.
        field: &'static str,
        /// Raw value.
        value: String,
        /// Parser error.
        #[source]
        source: chrono::ParseError,
    },
    /// A reference URL does not end in a numeric id.
    #[error("{kind} record {record_id} has a non-numeric reference in {field}: {url:?}")]
    InvalidReference {
        /// Entity kind being transformed.
        kind: EndpointKind,
        /// Record id.
        record_id: i64,
        /// Offending field name.
        field: &'static str,
        /// Raw reference URL.
        url: String,
    },
}

fn display_id(record_id: &Option<i64>) -> String {
    record_id.map_or_else(|| "<unknown id>".to_owned(), |id| id.to_string())
}
