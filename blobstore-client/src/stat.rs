use std::fmt;

use blobstore_types::{BlobMetadata, BlobMetadataFactory};
use reqwest::StatusCode;

use crate::Client;
use crate::parse::extract_metadata;

/// The factory used by [`Client::stat`] unless another one is configured.
pub type DefaultFactory = fn(&str) -> BlobMetadata;

impl Client {
    /// Requests the metadata of the object at `path`, relative to the service URL.
    ///
    /// This issues a single `HEAD` request and builds the metadata record from its response.
    pub fn stat<'a>(&'a self, path: &'a str) -> StatBuilder<'a> {
        StatBuilder {
            client: self,
            path,
            factory: BlobMetadata::new,
        }
    }
}

/// A [`stat`](Client::stat) request builder.
pub struct StatBuilder<'a, F = DefaultFactory> {
    client: &'a Client,
    path: &'a str,
    factory: F,
}

impl<F> fmt::Debug for StatBuilder<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatBuilder")
            .field("client", &self.client)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<'a, F> StatBuilder<'a, F>
where
    F: BlobMetadataFactory,
{
    /// Uses `factory` to create the metadata record instead of [`BlobMetadata::new`].
    pub fn factory<G>(self, factory: G) -> StatBuilder<'a, G>
    where
        G: BlobMetadataFactory,
    {
        StatBuilder {
            client: self.client,
            path: self.path,
            factory,
        }
    }

    /// Sends the `HEAD` request.
    ///
    /// The key of the record is derived from the decoded path of the URL the request was sent to,
    /// so it includes any path prefix of the service URL.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The object URL is invalid
    /// - The request fails to send
    /// - The server returns an error response (other than 404)
    /// - The response lacks a `Content-Type` header
    #[tracing::instrument(level = "debug", skip_all, fields(path = self.path))]
    pub async fn send(self) -> crate::Result<Option<F::Metadata>> {
        let url = self.client.object_url(self.path)?;
        let request = self.client.inner.reqwest.head(url).build()?;
        let sent_url = request.url().clone();

        let response = self.client.inner.reqwest.execute(request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Object not found");
            return Ok(None);
        }
        let response = response.error_for_status()?;

        let metadata = extract_metadata(&sent_url, &response, &self.factory)?;
        Ok(Some(metadata))
    }
}
