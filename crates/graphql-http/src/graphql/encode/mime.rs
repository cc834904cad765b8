//! Content-type inference for uploaded files.

use std::path::Path;

/// Maps a file extension (without the dot) to a MIME type.
///
/// Lookups are plain functions so callers can swap the table without any
/// process-wide registration.
pub type MimeLookup = fn(&str) -> Option<&'static str>;

/// Content type used when the extension is missing or unknown.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// The built-in extension table. Matching is case-insensitive.
pub fn by_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "txt" | "text" | "log" => "text/plain; charset=utf-8",
        "htm" | "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "graphql" | "gql" => "application/graphql",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(mime)
}

/// The content type for `file_name`, falling back to [`OCTET_STREAM`].
pub fn content_type_for(file_name: &str, lookup: MimeLookup) -> &'static str {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(lookup)
        .unwrap_or(OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(
            content_type_for("a.txt", by_extension),
            "text/plain; charset=utf-8"
        );
        assert_eq!(content_type_for("photo.JPG", by_extension), "image/jpeg");
        assert_eq!(content_type_for("dir/report.pdf", by_extension), "application/pdf");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(content_type_for("blob.unknownext", by_extension), OCTET_STREAM);
        assert_eq!(content_type_for("Makefile", by_extension), OCTET_STREAM);
        assert_eq!(content_type_for("", by_extension), OCTET_STREAM);
    }

    #[test]
    fn test_custom_lookup() {
        fn only_dat(ext: &str) -> Option<&'static str> {
            (ext == "dat").then_some("application/x-dat")
        }
        assert_eq!(content_type_for("x.dat", only_dat), "application/x-dat");
        assert_eq!(content_type_for("x.txt", only_dat), OCTET_STREAM);
    }
}
