//! Wire encodings for GraphQL requests.
//!
//! A request is encoded either as a JSON document or, when it carries files,
//! as `multipart/form-data`. Encoding never mutates the request, so the same
//! request can be encoded again (as long as its file sources allow it).

mod json;
pub mod mime;
mod multipart;

use bytes::Bytes;

pub use json::{JSON_CONTENT_TYPE, encode_json};
pub use mime::MimeLookup;
pub use multipart::MultipartEncoder;

use crate::error::Result;
use crate::graphql::GraphQLRequest;

/// An encoded request body and the `Content-Type` it must be sent with.
#[derive(Clone, Debug)]
pub struct EncodedBody {
    /// Value for the `Content-Type` header.
    pub content_type: String,
    /// The request body.
    pub body: Bytes,
}

/// Which wire encoding a request is sent with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// `application/json`.
    Json,
    /// `multipart/form-data`.
    Multipart,
}

/// Picks and runs the encoder for a request.
#[derive(Clone, Debug, Default)]
pub struct RequestEncoder {
    multipart: MultipartEncoder,
    always_multipart: bool,
}

impl RequestEncoder {
    /// An encoder that uses JSON unless the request has files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send every request as multipart, even without files.
    pub fn always_multipart(mut self, always: bool) -> Self {
        self.always_multipart = always;
        self
    }

    /// Use a customized multipart encoder.
    pub fn multipart(mut self, encoder: MultipartEncoder) -> Self {
        self.multipart = encoder;
        self
    }

    /// The encoding `request` will be sent with.
    pub fn encoding_for(&self, request: &GraphQLRequest) -> Encoding {
        if self.always_multipart || request.has_files() {
            Encoding::Multipart
        } else {
            Encoding::Json
        }
    }

    /// Encode `request` with the encoding picked by [`Self::encoding_for`].
    pub fn encode(&self, request: &GraphQLRequest) -> Result<EncodedBody> {
        match self.encoding_for(request) {
            Encoding::Json => encode_json(request),
            Encoding::Multipart => self.multipart.encode(request),
        }
    }
}
