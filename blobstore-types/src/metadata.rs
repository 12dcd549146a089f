//! Metadata records describing a single blob.
//!
//! A metadata record carries the blob's key, the full set of headers the storage service returned
//! for it, and its content type. Records are produced in two steps:
//!
//!  1. A [`BlobMetadataFactory`] creates an empty record bound to a key.
//!  2. The extractor copies the response headers into the record via [`MutableBlobMetadata`] and
//!     sets the content type.
//!
//! [`BlobMetadata`] is the default record. Any `Fn(&str) -> M` closure is a factory, so
//! `BlobMetadata::new` can be passed wherever a factory is expected.

use std::borrow::Cow;
use std::collections::BTreeMap;

use http::HeaderMap;
use http::header::{CONTENT_LENGTH, ETAG, LAST_MODIFIED};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// Write access to a metadata record, as required by the extractor.
///
/// Implement this for custom record types that carry additional, service-specific fields.
pub trait MutableBlobMetadata {
    /// The key identifying the blob within the storage service.
    fn key(&self) -> &str;

    /// All headers attached to the blob.
    fn all_headers(&self) -> &HeaderMap;

    /// Mutable access to all headers attached to the blob.
    fn all_headers_mut(&mut self) -> &mut HeaderMap;

    /// The MIME type of the blob, if already known.
    fn content_type(&self) -> Option<&str>;

    /// Sets the MIME type of the blob.
    fn set_content_type(&mut self, content_type: String);
}

/// Creates empty metadata records bound to a key.
///
/// This is blanket-implemented for closures and functions of the shape `Fn(&str) -> M`.
pub trait BlobMetadataFactory {
    /// The type of record this factory creates.
    type Metadata: MutableBlobMetadata;

    /// Creates an empty record for the blob identified by `key`.
    fn create(&self, key: &str) -> Self::Metadata;
}

impl<F, M> BlobMetadataFactory for F
where
    F: Fn(&str) -> M,
    M: MutableBlobMetadata,
{
    type Metadata = M;

    fn create(&self, key: &str) -> M {
        self(key)
    }
}

/// The default metadata record of a blob.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BlobMetadata {
    /// The key identifying the blob within the storage service.
    pub key: String,

    /// The MIME type of the blob.
    ///
    /// This is always set on records returned by the extractor.
    pub content_type: Option<String>,

    /// All headers returned by the storage service, including multiple values per name.
    #[serde(rename = "headers", serialize_with = "serialize_headers")]
    pub all_headers: HeaderMap,
}

impl BlobMetadata {
    /// Creates an empty record for the given key.
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            ..Default::default()
        }
    }

    /// Returns the entity tag of the blob, including surrounding quotes.
    pub fn etag(&self) -> Option<&str> {
        self.first_header_str(ETAG.as_str())
    }

    /// Returns the size of the blob in bytes, if the service reported a valid `Content-Length`.
    pub fn content_length(&self) -> Option<u64> {
        self.first_header_str(CONTENT_LENGTH.as_str())?.parse().ok()
    }

    /// Returns the raw `Last-Modified` value of the blob.
    pub fn last_modified(&self) -> Option<&str> {
        self.first_header_str(LAST_MODIFIED.as_str())
    }

    /// Collects user-defined metadata stored in headers starting with `prefix`.
    ///
    /// The prefix is matched case-insensitively and stripped from the returned keys. Only the
    /// first value of each header is used, and values that are not valid strings are skipped.
    pub fn user_metadata(&self, prefix: &str) -> BTreeMap<String, String> {
        let prefix = prefix.to_ascii_lowercase();

        self.all_headers
            .keys()
            .filter_map(|name| {
                let field = name.as_str().strip_prefix(prefix.as_str())?;
                let value = self.all_headers.get(name)?.to_str().ok()?;
                Some((field.to_owned(), value.to_owned()))
            })
            .collect()
    }

    fn first_header_str(&self, name: &str) -> Option<&str> {
        self.all_headers.get(name)?.to_str().ok()
    }
}

impl MutableBlobMetadata for BlobMetadata {
    fn key(&self) -> &str {
        &self.key
    }

    fn all_headers(&self) -> &HeaderMap {
        &self.all_headers
    }

    fn all_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.all_headers
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn set_content_type(&mut self, content_type: String) {
        self.content_type = Some(content_type);
    }
}

/// Serializes headers as a map from name to the list of all values, in header map order.
fn serialize_headers<S>(headers: &HeaderMap, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(headers.keys_len()))?;
    for name in headers.keys() {
        let values: Vec<Cow<'_, str>> = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
            .collect();
        map.serialize_entry(name.as_str(), &values)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use http::header::{CONTENT_TYPE, ETAG};

    use super::*;

    fn metadata_with(headers: &[(&'static str, &'static str)]) -> BlobMetadata {
        let mut metadata = BlobMetadata::new("bucket/object");
        for (name, value) in headers {
            metadata
                .all_headers
                .append(*name, HeaderValue::from_static(*value));
        }
        metadata
    }

    #[test]
    fn new_is_empty() {
        let metadata = BlobMetadata::new("bucket/object");
        assert_eq!(metadata.key, "bucket/object");
        assert_eq!(metadata.content_type, None);
        assert!(metadata.all_headers.is_empty());
    }

    #[test]
    fn function_is_factory() {
        let factory = BlobMetadata::new;
        let metadata = factory.create("some/key");
        assert_eq!(metadata, BlobMetadata::new("some/key"));

        let prefixed = |key: &str| BlobMetadata::new(&format!("prefix/{key}"));
        assert_eq!(prefixed.create("key").key(), "prefix/key");
    }

    #[test]
    fn well_known_headers() {
        let metadata = metadata_with(&[
            ("etag", "\"abc123\""),
            ("content-length", "1024"),
            ("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT"),
        ]);

        assert_eq!(metadata.etag(), Some("\"abc123\""));
        assert_eq!(metadata.content_length(), Some(1024));
        assert_eq!(
            metadata.last_modified(),
            Some("Wed, 21 Oct 2015 07:28:00 GMT")
        );
    }

    #[test]
    fn invalid_content_length() {
        let metadata = metadata_with(&[("content-length", "lots")]);
        assert_eq!(metadata.content_length(), None);
        assert_eq!(BlobMetadata::default().content_length(), None);
    }

    #[test]
    fn user_metadata_strips_prefix() {
        let metadata = metadata_with(&[
            ("x-amz-meta-owner", "alice"),
            ("x-amz-meta-color", "blue"),
            ("x-amz-meta-color", "red"),
            ("etag", "abc"),
        ]);

        let user = metadata.user_metadata("X-Amz-Meta-");
        assert_eq!(
            user,
            [
                ("color".to_owned(), "blue".to_owned()),
                ("owner".to_owned(), "alice".to_owned()),
            ]
            .into()
        );
    }

    #[test]
    fn mutable_access() {
        let mut metadata = BlobMetadata::new("key");
        metadata.set_content_type("text/plain".into());
        metadata
            .all_headers_mut()
            .insert(ETAG, HeaderValue::from_static("abc"));

        assert_eq!(MutableBlobMetadata::content_type(&metadata), Some("text/plain"));
        assert_eq!(metadata.all_headers().get(ETAG).unwrap(), "abc");
        assert_eq!(MutableBlobMetadata::key(&metadata), "key");
    }

    #[test]
    fn serializes_all_header_values() {
        let mut metadata = metadata_with(&[("etag", "abc"), ("vary", "a"), ("vary", "b")]);
        metadata.content_type = Some("text/plain".into());
        metadata
            .all_headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": "bucket/object",
                "content_type": "text/plain",
                "headers": {
                    "etag": ["abc"],
                    "vary": ["a", "b"],
                    "content-type": ["text/plain"],
                },
            })
        );
    }
}
