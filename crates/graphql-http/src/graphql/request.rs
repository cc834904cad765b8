//! GraphQL request types.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ClientError, Result};

/// Where the bytes of an uploaded file come from.
///
/// Sources are read fully, once, when the request is encoded. In-memory and
/// path-backed sources can be encoded any number of times; a reader is
/// consumed by the first encode.
pub enum FileSource {
    /// Bytes already held in memory.
    Bytes(Bytes),
    /// A file on disk, read at encode time.
    Path(PathBuf),
    /// A one-shot reader.
    Reader(Mutex<Option<Box<dyn Read + Send>>>),
}

impl FileSource {
    /// Wrap a reader as a one-shot source.
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Self::Reader(Mutex::new(Some(Box::new(reader))))
    }

    /// Read the whole source.
    pub(crate) fn read_all(&self) -> std::io::Result<Bytes> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Path(path) => std::fs::read(path).map(Bytes::from),
            Self::Reader(slot) => {
                let mut reader = slot.lock().take().ok_or_else(|| {
                    std::io::Error::other("reader was already consumed by an earlier encode")
                })?;
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Reader(_) => f.write_str("Reader"),
        }
    }
}

impl From<Bytes> for FileSource {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for FileSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}

impl From<&'static [u8]> for FileSource {
    fn from(bytes: &'static [u8]) -> Self {
        Self::Bytes(Bytes::from_static(bytes))
    }
}

impl From<&'static str> for FileSource {
    fn from(text: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

impl From<String> for FileSource {
    fn from(text: String) -> Self {
        Self::Bytes(text.into())
    }
}

impl From<PathBuf> for FileSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// A file attached to a request.
#[derive(Debug)]
pub struct FileUpload {
    /// The variable the file is bound to.
    pub field_name: String,
    /// The file name sent in the part's `Content-Disposition`.
    pub file_name: String,
    /// Where the file's bytes come from.
    pub source: FileSource,
}

/// A GraphQL request.
///
/// Holds the operation text, its variables, any file attachments, and extra
/// headers. Requests carrying files are sent as `multipart/form-data`
/// following the GraphQL multipart request convention; all others are sent
/// as JSON.
#[derive(Debug)]
pub struct GraphQLRequest {
    query: String,
    variables: Map<String, Value>,
    files: Vec<FileUpload>,
    headers: http::HeaderMap,
    /// Variables whose value could not be serialized, with the reason.
    rejected: Vec<(String, String)>,
}

impl GraphQLRequest {
    /// Create a new request from a query string.
    ///
    /// The text is not validated; malformed documents are reported by the
    /// server.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = GraphQLRequest::new(r#"
    ///     query GetUser($id: ID!) {
    ///         user(id: $id) { name }
    ///     }
    /// "#)
    /// .variable("id", "123");
    /// ```
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
            files: Vec::new(),
            headers: http::HeaderMap::new(),
            rejected: Vec::new(),
        }
    }

    /// Set a variable value, replacing any previous value under that name.
    ///
    /// A value that fails to serialize is remembered and reported as an
    /// encoding error when the request is sent.
    ///
    /// JSON has no NaN or infinity. Non-finite floats anywhere in `value`
    /// are sent as `null`, following `serde_json`.
    pub fn variable(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        let name = name.into();
        self.rejected.retain(|(rejected, _)| *rejected != name);
        match serde_json::to_value(value) {
            Ok(value) => {
                self.variables.insert(name, value);
            }
            Err(e) => {
                tracing::warn!(
                    target: "graphql_http::graphql",
                    variable = %name,
                    "Variable is not JSON-serializable: {e}"
                );
                self.variables.remove(&name);
                self.rejected.push((name, e.to_string()));
            }
        }
        self
    }

    /// Set a header, replacing any previous values under the same name.
    ///
    /// Invalid names or values are dropped with a warning.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        match (name.try_into(), value.try_into()) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                tracing::warn!(target: "graphql_http::graphql", "Dropping invalid header");
            }
        }
        self
    }

    /// Add a header value, keeping any values already set under that name.
    pub fn append_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        match (name.try_into(), value.try_into()) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => {
                tracing::warn!(target: "graphql_http::graphql", "Dropping invalid header");
            }
        }
        self
    }

    /// Attach a file to the variable `field_name`.
    ///
    /// Files keep the order they were attached in. Attaching several files
    /// to the same field turns that variable into a list upload.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = GraphQLRequest::new("mutation ($files: [Upload!]!) { multipleUpload(files: $files) { id } }")
    ///     .file("files", "a.txt", "Alpha")
    ///     .file("files", "b.png", PathBuf::from("b.png"));
    /// ```
    pub fn file(
        mut self,
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        source: impl Into<FileSource>,
    ) -> Self {
        self.files.push(FileUpload {
            field_name: field_name.into(),
            file_name: file_name.into(),
            source: source.into(),
        });
        self
    }

    /// The operation text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The variables set so far.
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// The attached files, in attachment order.
    pub fn files(&self) -> &[FileUpload] {
        &self.files
    }

    /// The extra headers sent with this request.
    pub fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    /// Whether the request has file attachments.
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// Fail if any variable could not be serialized.
    pub(crate) fn check_variables(&self) -> Result<()> {
        match self.rejected.first() {
            Some((name, reason)) => Err(ClientError::Encoding(format!(
                "Variable '{name}' is not JSON-serializable: {reason}"
            ))),
            None => Ok(()),
        }
    }
}
