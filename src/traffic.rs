//! Proxy history export reader.
//!
//! The export is an `<items>` document with one `<item>` per captured
//! transaction. Only `<path>`, `<request>` and `<response>` are read; the
//! bodies are base64 unless the element says `base64="false"`.

use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tracing::debug;

use crate::error::WordlistError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Path,
    Request,
    Response,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Path => "path",
            FieldKind::Request => "request",
            FieldKind::Response => "response",
        };
        f.write_str(name)
    }
}

/// One logged HTTP transaction with its bodies already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub index: usize,
    pub path: String,
    pub request_body: String,
    /// `None` when no response was captured
    pub response_body: Option<String>,
}

impl Record {
    /// Text fields in log order, tagged with where they came from.
    pub fn fields(&self) -> impl Iterator<Item = (FieldKind, &str)> {
        [
            Some((FieldKind::Path, self.path.as_str())),
            Some((FieldKind::Request, self.request_body.as_str())),
            self.response_body
                .as_deref()
                .map(|body| (FieldKind::Response, body)),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Replace invalid UTF-8 in decoded bodies instead of failing the run
    pub lossy: bool,
}

#[derive(Deserialize)]
struct Items {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    path: Option<String>,
    request: Option<Payload>,
    response: Option<Payload>,
}

#[derive(Deserialize)]
struct Payload {
    #[serde(rename = "@base64", default)]
    base64: Option<String>,
    #[serde(rename = "$text", default)]
    content: Option<String>,
}

impl Payload {
    fn is_base64(&self) -> bool {
        !matches!(self.base64.as_deref(), Some("false"))
    }

    fn decode(
        &self,
        record: usize,
        field: FieldKind,
        options: DecodeOptions,
    ) -> Result<String, WordlistError> {
        let content = self.content.as_deref().unwrap_or("");
        if !self.is_base64() {
            return Ok(content.to_string());
        }

        let compact: String = content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|source| WordlistError::Base64 {
                record,
                field,
                source,
            })?;

        if options.lossy {
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }
        String::from_utf8(bytes).map_err(|source| WordlistError::NotText {
            record,
            field,
            source,
        })
    }

    fn is_empty(&self) -> bool {
        self.content.as_deref().map_or(true, |c| c.trim().is_empty())
    }
}

/// Parse a full export into decoded records.
///
/// Any record that is missing a path or request, or whose body does not
/// decode, fails the whole parse.
pub fn parse_log(data: &[u8], options: DecodeOptions) -> Result<Vec<Record>, WordlistError> {
    if data.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(WordlistError::EmptyLog);
    }

    let doc: Items = quick_xml::de::from_reader(data)?;
    let mut records = Vec::with_capacity(doc.items.len());

    for (index, item) in doc.items.into_iter().enumerate() {
        let path = item.path.ok_or(WordlistError::MissingField {
            record: index,
            field: FieldKind::Path,
        })?;
        let request = item.request.ok_or(WordlistError::MissingField {
            record: index,
            field: FieldKind::Request,
        })?;
        let request_body = request.decode(index, FieldKind::Request, options)?;

        let response_body = match item.response {
            Some(response) if !response.is_empty() => {
                Some(response.decode(index, FieldKind::Response, options)?)
            }
            _ => {
                debug!("Record {} has no captured response", index);
                None
            }
        };

        records.push(Record {
            index,
            path,
            request_body,
            response_body,
        });
    }

    Ok(records)
}
