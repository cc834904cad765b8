//! `multipart/form-data` request bodies for file uploads.
//!
//! Implements the [GraphQL multipart request convention]: the body carries an
//! `operations` field holding the usual `{query, variables}` object with a
//! `null` placeholder wherever a file goes, a `map` field pointing each file
//! part at its placeholder, and one part per file named by its index.
//!
//! For `mutation ($file: Upload!) { singleUpload(file: $file) { id } }` with a
//! single attachment `a.txt` the body looks like:
//!
//! ```text
//! --<boundary>
//! Content-Disposition: form-data; name="operations"
//!
//! {"query":"mutation ($file: Upload!) { singleUpload(file: $file) { id } }","variables":{"file":null}}
//! --<boundary>
//! Content-Disposition: form-data; name="map"
//!
//! {"0":["variables.file"]}
//! --<boundary>
//! Content-Disposition: form-data; name="0"; filename="a.txt"
//! Content-Type: text/plain; charset=utf-8
//!
//! Alpha file content.
//! --<boundary>--
//! ```
//!
//! Lines end with `\r\n` on the wire.
//!
//! [GraphQL multipart request convention]: https://github.com/jaydenseric/graphql-multipart-request-spec

use std::collections::HashMap;
use std::fmt::Write as _;

use bytes::Bytes;
use rand::Rng;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::EncodedBody;
use super::json::Operations;
use super::mime::{self, MimeLookup};
use crate::error::{ClientError, Result};
use crate::graphql::GraphQLRequest;

/// Random bytes in a generated boundary (hex-encoded to twice this length).
const BOUNDARY_BYTES: usize = 30;

/// Upper bound on boundary length from RFC 2046.
const MAX_BOUNDARY_LEN: usize = 70;

const GENERATE_ATTEMPTS: usize = 8;

/// Maps each file part index to the variable path it fills, in index order.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct FileMap(Vec<(usize, String)>);

impl Serialize for FileMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (index, path) in &self.0 {
            map.serialize_entry(&index.to_string(), &[path])?;
        }
        map.end()
    }
}

/// Substitute file placeholders into a copy of the request's variables.
///
/// A field with one file becomes `null`; a field with N files becomes a list
/// of N `null`s. Indices follow global attachment order while list positions
/// follow the order within each field.
pub(crate) fn placeholders(request: &GraphQLRequest) -> (serde_json::Map<String, Value>, FileMap) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for file in request.files() {
        *counts.entry(file.field_name.as_str()).or_default() += 1;
    }

    let mut variables = request.variables().clone();
    for (&field, &count) in &counts {
        let placeholder = if count == 1 {
            Value::Null
        } else {
            Value::Array(vec![Value::Null; count])
        };
        variables.insert(field.to_string(), placeholder);
    }

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut file_map = FileMap::default();
    for (index, file) in request.files().iter().enumerate() {
        let field = file.field_name.as_str();
        let position = positions.entry(field).or_default();
        let path = if counts[field] == 1 {
            format!("variables.{field}")
        } else {
            format!("variables.{field}.{position}")
        };
        *position += 1;
        file_map.0.push((index, path));
    }

    (variables, file_map)
}

/// One form-data part before the boundary is chosen.
struct Part {
    disposition: String,
    content_type: Option<&'static str>,
    content: Bytes,
}

/// Encodes requests as `multipart/form-data`.
#[derive(Clone, Debug)]
pub struct MultipartEncoder {
    boundary: Option<String>,
    mime_lookup: MimeLookup,
}

impl Default for MultipartEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartEncoder {
    /// An encoder with random boundaries and the built-in MIME table.
    pub fn new() -> Self {
        Self {
            boundary: None,
            mime_lookup: mime::by_extension,
        }
    }

    /// Always use `boundary` instead of a random one.
    ///
    /// The boundary must be 1 to 70 characters from the RFC 2046 set and must
    /// not end with a space.
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Result<Self> {
        let boundary = boundary.into();
        validate_boundary(&boundary)?;
        self.boundary = Some(boundary);
        Ok(self)
    }

    /// Use a different extension to MIME type table.
    pub fn mime_lookup(mut self, lookup: MimeLookup) -> Self {
        self.mime_lookup = lookup;
        self
    }

    /// Encode `request` without modifying it.
    ///
    /// Every file source is read here. A request with no files still
    /// produces a valid body with an empty map.
    pub fn encode(&self, request: &GraphQLRequest) -> Result<EncodedBody> {
        request.check_variables()?;

        let (variables, file_map) = placeholders(request);
        let operations = Operations {
            query: request.query(),
            variables: &variables,
        }
        .to_vec()?;
        let map = serde_json::to_vec(&file_map)
            .map_err(|e| ClientError::Encoding(format!("Failed to serialize file map: {e}")))?;

        let mut parts = Vec::with_capacity(request.files().len() + 2);
        parts.push(Part {
            disposition: form_data("operations", None),
            content_type: None,
            content: Bytes::from(operations),
        });
        parts.push(Part {
            disposition: form_data("map", None),
            content_type: None,
            content: Bytes::from(map),
        });

        for (index, file) in request.files().iter().enumerate() {
            let content = file.source.read_all().map_err(|e| {
                ClientError::Encoding(format!("Error reading file {}: {e}", file.file_name))
            })?;
            parts.push(Part {
                disposition: form_data(&index.to_string(), Some(file.file_name.as_str())),
                content_type: Some(mime::content_type_for(&file.file_name, self.mime_lookup)),
                content,
            });
        }

        let boundary = self.choose_boundary(&parts)?;
        let body = write_parts(&parts, &boundary);

        tracing::debug!(
            target: "graphql_http::multipart",
            files = request.files().len(),
            body_len = body.len(),
            "Encoded multipart request"
        );

        Ok(EncodedBody {
            content_type: content_type_header(&boundary),
            body: Bytes::from(body),
        })
    }

    fn choose_boundary(&self, parts: &[Part]) -> Result<String> {
        if let Some(ref boundary) = self.boundary {
            if collides(boundary, parts) {
                return Err(ClientError::Encoding(format!(
                    "Boundary '{boundary}' occurs in the request content"
                )));
            }
            return Ok(boundary.clone());
        }

        for _ in 0..GENERATE_ATTEMPTS {
            let boundary = random_boundary();
            if !collides(&boundary, parts) {
                return Ok(boundary);
            }
            tracing::trace!(target: "graphql_http::multipart", "Boundary collision, regenerating");
        }
        Err(ClientError::Encoding(
            "Could not generate a boundary absent from the request content".into(),
        ))
    }
}

fn random_boundary() -> String {
    let mut bytes = [0u8; BOUNDARY_BYTES];
    rand::thread_rng().fill(&mut bytes[..]);
    let mut boundary = String::with_capacity(BOUNDARY_BYTES * 2);
    for b in bytes {
        let _ = write!(boundary, "{b:02x}");
    }
    boundary
}

fn validate_boundary(boundary: &str) -> Result<()> {
    let valid_char = |c: char| c.is_ascii_alphanumeric() || "'()+_,-./:=? ".contains(c);
    if boundary.is_empty()
        || boundary.len() > MAX_BOUNDARY_LEN
        || boundary.ends_with(' ')
        || !boundary.chars().all(valid_char)
    {
        return Err(ClientError::Configuration(format!(
            "Invalid multipart boundary: {boundary:?}"
        )));
    }
    Ok(())
}

fn content_type_header(boundary: &str) -> String {
    let token = boundary
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "'+_-.".contains(c));
    if token {
        format!("multipart/form-data; boundary={boundary}")
    } else {
        format!("multipart/form-data; boundary=\"{boundary}\"")
    }
}

fn collides(boundary: &str, parts: &[Part]) -> bool {
    let needle = boundary.as_bytes();
    parts.iter().any(|part| {
        part.content.windows(needle.len()).any(|w| w == needle)
            || part.disposition.contains(boundary)
    })
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn form_data(name: &str, file_name: Option<&str>) -> String {
    match file_name {
        Some(file_name) => format!(
            r#"form-data; name="{}"; filename="{}""#,
            escape_quotes(name),
            escape_quotes(file_name)
        ),
        None => format!(r#"form-data; name="{}""#, escape_quotes(name)),
    }
}

fn write_parts(parts: &[Part], boundary: &str) -> Vec<u8> {
    let size: usize = parts
        .iter()
        .map(|p| p.content.len() + p.disposition.len() + boundary.len() + 96)
        .sum();
    let mut buf = Vec::with_capacity(size);

    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        buf.extend_from_slice(format!("Content-Disposition: {}\r\n", part.disposition).as_bytes());
        if let Some(content_type) = part.content_type {
            buf.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(&part.content);
    }
    buf.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    buf
}
