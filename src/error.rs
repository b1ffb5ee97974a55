use std::io;

use thiserror::Error;

use crate::traffic::FieldKind;

/// Failures that abort a wordlist run. Rejected tokens are never errors.
#[derive(Debug, Error)]
pub enum WordlistError {
    #[error("traffic log is not a proxy history export: {0}")]
    Malformed(#[from] quick_xml::DeError),
    #[error("traffic log is empty")]
    EmptyLog,
    #[error("record {record}: missing <{field}> element")]
    MissingField { record: usize, field: FieldKind },
    #[error("record {record}: {field} body is not valid base64")]
    Base64 {
        record: usize,
        field: FieldKind,
        #[source]
        source: base64::DecodeError,
    },
    #[error("record {record}: {field} body does not decode to text")]
    NotText {
        record: usize,
        field: FieldKind,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("rule '{id}' is invalid: {reason}")]
    InvalidRule { id: String, reason: String },
    #[error("failed to parse filter rules: {0}")]
    Rules(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
