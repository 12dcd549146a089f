//! Extraction of [`BlobMetadata`](blobstore_types::BlobMetadata) from HTTP responses.
//!
//! The extractor takes the request that was sent and the response that came back, and produces a
//! metadata record:
//!
//!  - The key is the request path with a single leading `/` removed. Paths taken from URLs are
//!    percent-decoded first; the key is not normalized any further.
//!  - All response headers are copied into the record, keeping every value of every header.
//!  - The `Content-Type` header is required. Without it, extraction fails with
//!    [`Error::MissingHeader`].
//!
//! ```
//! use blobstore_client::extract_metadata;
//! use blobstore_types::BlobMetadata;
//!
//! let response = http::Response::builder()
//!     .header("content-type", "text/plain")
//!     .body(())
//!     .unwrap();
//!
//! let metadata = extract_metadata("/mybucket/myfile.txt", &response, &BlobMetadata::new).unwrap();
//! assert_eq!(metadata.key, "mybucket/myfile.txt");
//! assert_eq!(metadata.content_type.as_deref(), Some("text/plain"));
//! ```

use std::borrow::Cow;

use blobstore_types::{BlobMetadataFactory, Error, MutableBlobMetadata};
use http::header::{AsHeaderName, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Uri};
use percent_encoding::percent_decode_str;

/// A request from which the key of a blob can be derived.
///
/// URL types return their path percent-decoded. Strings are taken as paths that are already
/// decoded and returned verbatim.
pub trait RequestPath {
    /// Returns the decoded path component of the request's endpoint.
    fn path(&self) -> Cow<'_, str>;
}

/// Decodes a path as it appears in a URL. Invalid UTF-8 sequences are replaced.
fn decode_path(path: &str) -> Cow<'_, str> {
    percent_decode_str(path).decode_utf8_lossy()
}

impl RequestPath for str {
    fn path(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl RequestPath for String {
    fn path(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl RequestPath for Uri {
    fn path(&self) -> Cow<'_, str> {
        decode_path(Uri::path(self))
    }
}

impl<B> RequestPath for http::Request<B> {
    fn path(&self) -> Cow<'_, str> {
        decode_path(self.uri().path())
    }
}

impl RequestPath for http::request::Parts {
    fn path(&self) -> Cow<'_, str> {
        decode_path(self.uri.path())
    }
}

impl RequestPath for url::Url {
    fn path(&self) -> Cow<'_, str> {
        decode_path(url::Url::path(self))
    }
}

impl RequestPath for reqwest::Request {
    fn path(&self) -> Cow<'_, str> {
        decode_path(self.url().path())
    }
}

/// A response carrying the headers of a blob.
pub trait ResponseHeaders {
    /// Returns all headers of the response.
    fn headers(&self) -> &HeaderMap;

    /// Returns the first value of the given header, if present.
    fn first_header<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.headers().get(name)
    }
}

impl ResponseHeaders for HeaderMap {
    fn headers(&self) -> &HeaderMap {
        self
    }
}

impl<B> ResponseHeaders for http::Response<B> {
    fn headers(&self) -> &HeaderMap {
        http::Response::headers(self)
    }
}

impl ResponseHeaders for http::response::Parts {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl ResponseHeaders for reqwest::Response {
    fn headers(&self) -> &HeaderMap {
        reqwest::Response::headers(self)
    }
}

/// Derives the key of a blob from a request path.
///
/// Exactly one leading `/` is removed, everything else is kept verbatim.
pub fn key_from_path(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Extracts a metadata record from a `request` and its `response`.
///
/// The record is created through `factory`, populated with all response headers, and has its
/// content type set from the first `Content-Type` header.
///
/// # Errors
///
/// Returns [`Error::MissingHeader`] if the response has no `Content-Type` header.
#[tracing::instrument(level = "trace", skip_all, fields(key = tracing::field::Empty))]
pub fn extract_metadata<Req, Res, F>(
    request: &Req,
    response: &Res,
    factory: &F,
) -> Result<F::Metadata, Error>
where
    Req: RequestPath + ?Sized,
    Res: ResponseHeaders + ?Sized,
    F: BlobMetadataFactory + ?Sized,
{
    let path = request.path();
    let key = key_from_path(&path);
    tracing::Span::current().record("key", key);

    let mut metadata = factory.create(key);
    add_all_headers(response.headers(), &mut metadata);
    set_content_type(response, &mut metadata)?;

    Ok(metadata)
}

/// Copies all headers into the record.
///
/// Names present in `from` replace all existing values of that name in the record. Names that only
/// exist in the record are left alone.
fn add_all_headers<M>(from: &HeaderMap, metadata: &mut M)
where
    M: MutableBlobMetadata + ?Sized,
{
    let headers = metadata.all_headers_mut();
    for name in from.keys() {
        let mut values = from.get_all(name).iter();
        if let Some(first) = values.next() {
            headers.insert(name.clone(), first.clone());
        }
        for value in values {
            headers.append(name.clone(), value.clone());
        }
    }
}

fn set_content_type<Res, M>(response: &Res, metadata: &mut M) -> Result<(), Error>
where
    Res: ResponseHeaders + ?Sized,
    M: MutableBlobMetadata + ?Sized,
{
    let Some(value) = response.first_header(CONTENT_TYPE) else {
        tracing::debug!("content-type not found in response headers");
        return Err(Error::MissingHeader(CONTENT_TYPE));
    };

    // Values are not restricted to ASCII, invalid UTF-8 is replaced rather than rejected.
    let content_type = String::from_utf8_lossy(value.as_bytes()).into_owned();
    metadata.set_content_type(content_type);

    Ok(())
}

/// A reusable extractor bound to a [`BlobMetadataFactory`].
///
/// The parser holds no per-request state and can be shared between threads whenever the factory
/// can.
#[derive(Clone, Debug)]
pub struct MetadataParser<F> {
    factory: F,
}

impl<F> MetadataParser<F>
where
    F: BlobMetadataFactory,
{
    /// Creates a parser that creates records through `factory`.
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Returns the factory used by this parser.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Extracts a metadata record from a `request` and its `response`.
    ///
    /// See [`extract_metadata`] for details.
    pub fn parse<Req, Res>(&self, request: &Req, response: &Res) -> Result<F::Metadata, Error>
    where
        Req: RequestPath + ?Sized,
        Res: ResponseHeaders + ?Sized,
    {
        extract_metadata(request, response, &self.factory)
    }
}
