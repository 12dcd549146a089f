use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

const USER_AGENT: &str = concat!("blobstore-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
struct ClientBuilderInner {
    service_url: Url,
    default_headers: HeaderMap,
    reqwest_builder: reqwest::ClientBuilder,
}

/// Builder to create a [`Client`].
#[must_use]
#[derive(Debug)]
pub struct ClientBuilder(crate::Result<ClientBuilderInner>);

impl ClientBuilder {
    /// Creates a new [`ClientBuilder`], configured with the given `service_url`.
    ///
    /// All object paths passed to the [`Client`] are resolved relative to this URL. An invalid URL
    /// is reported by [`build`](Self::build).
    pub fn new(service_url: impl reqwest::IntoUrl) -> Self {
        let service_url = match service_url.into_url() {
            Ok(url) => url,
            Err(err) => return Self(Err(err.into())),
        };

        let reqwest_builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .read_timeout(Duration::from_secs(5))
            .user_agent(USER_AGENT);

        Self(Ok(ClientBuilderInner {
            service_url,
            default_headers: HeaderMap::new(),
            reqwest_builder,
        }))
    }

    /// Sets both the connect and the read timeout for the [`reqwest::Client`].
    /// For more fine-grained configuration, use [`Self::configure_reqwest`].
    pub fn timeout(self, timeout: Duration) -> Self {
        self.configure_reqwest(|builder| builder.connect_timeout(timeout).read_timeout(timeout))
    }

    /// Adds a header that is sent with every request.
    ///
    /// Adding the same name multiple times sends all values.
    pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        if let Ok(ref mut inner) = self.0 {
            inner.default_headers.append(name, value);
        }
        self
    }

    /// Calls the closure with the underlying [`reqwest::ClientBuilder`].
    pub fn configure_reqwest<F>(self, closure: F) -> Self
    where
        F: FnOnce(reqwest::ClientBuilder) -> reqwest::ClientBuilder,
    {
        let Ok(inner) = self.0 else { return self };
        Self(Ok(ClientBuilderInner {
            reqwest_builder: closure(inner.reqwest_builder),
            ..inner
        }))
    }

    /// Returns a [`Client`] that uses this [`ClientBuilder`] configuration.
    ///
    /// # Errors
    ///
    /// This method fails if:
    /// - the given `service_url` is invalid
    /// - the [`reqwest::Client`] fails to build. Refer to [`reqwest::ClientBuilder::build`] for
    ///   more information on when this can happen.
    pub fn build(self) -> crate::Result<Client> {
        let inner = self.0?;
        let reqwest = inner
            .reqwest_builder
            .default_headers(inner.default_headers)
            .build()?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                reqwest,
                service_url: inner.service_url,
            }),
        })
    }
}

#[derive(Debug)]
pub(crate) struct ClientInner {
    pub(crate) reqwest: reqwest::Client,
    service_url: Url,
}

/// A client that reads blob metadata from an object storage service.
///
/// Use [`Client::builder`] to configure and construct this. Cloning is cheap and shares the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl Client {
    /// Convenience function to create a [`ClientBuilder`].
    pub fn builder(service_url: impl reqwest::IntoUrl) -> ClientBuilder {
        ClientBuilder::new(service_url)
    }

    /// Returns the base URL all object paths are resolved against.
    pub fn service_url(&self) -> &Url {
        &self.inner.service_url
    }

    /// Resolves an object `path` against the service URL.
    ///
    /// Leading slashes of `path` are ignored, so the result always stays below the service URL.
    /// Every segment of `path` is percent-encoded, so characters like `?`, `#` or `%` are part of
    /// the object name rather than URL syntax.
    pub(crate) fn object_url(&self, path: &str) -> crate::Result<Url> {
        let mut url = self.inner.service_url.clone();
        url.path_segments_mut()
            .map_err(|()| crate::Error::InvalidUrl {
                message: format!("service url {} cannot be a base", self.inner.service_url),
            })?
            .pop_if_empty()
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_url_joins_paths() {
        let client = Client::builder("http://localhost:8888").build().unwrap();
        assert_eq!(
            client.object_url("bucket/a.txt").unwrap().as_str(),
            "http://localhost:8888/bucket/a.txt"
        );
        assert_eq!(
            client.object_url("/bucket/a.txt").unwrap().as_str(),
            "http://localhost:8888/bucket/a.txt"
        );

        let client = Client::builder("http://localhost:8888/prefix/")
            .build()
            .unwrap();
        assert_eq!(
            client.object_url("a.txt").unwrap().as_str(),
            "http://localhost:8888/prefix/a.txt"
        );
    }

    #[test]
    fn object_url_encodes_segments() {
        let client = Client::builder("http://localhost:8888/prefix")
            .build()
            .unwrap();
        assert_eq!(
            client.object_url("a?b#c.txt").unwrap().as_str(),
            "http://localhost:8888/prefix/a%3Fb%23c.txt"
        );
        assert_eq!(
            client.object_url("my bucket/100%.txt").unwrap().as_str(),
            "http://localhost:8888/prefix/my%20bucket/100%25.txt"
        );
    }

    #[test]
    fn invalid_service_url() {
        let err = Client::builder("not a url").build().unwrap_err();
        assert!(matches!(err, crate::Error::Reqwest(_)));
    }
}
