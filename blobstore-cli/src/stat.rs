//! The `stat` command.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use blobstore_client::{BlobMetadata, Client};
use http::{HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::config::Config;

/// The JSON document printed by `blobstore stat`.
#[derive(Debug, Serialize)]
struct StatOutput<'a> {
    #[serde(flatten)]
    metadata: &'a BlobMetadata,
    user_metadata: BTreeMap<String, String>,
}

/// Builds a [`Client`] from the configured service URL, timeout and headers.
pub fn build_client(config: &Config) -> Result<Client> {
    let mut builder = Client::builder(config.service_url.as_str()).timeout(config.timeout);

    for (name, value) in &config.headers {
        let name = HeaderName::try_from(name.as_str())
            .with_context(|| format!("invalid header name {name:?}"))?;
        let mut value = HeaderValue::try_from(value.expose_secret().as_str())
            .with_context(|| format!("invalid value for header {name}"))?;
        value.set_sensitive(true);
        builder = builder.default_header(name, value);
    }

    builder.build().context("failed to build client")
}

/// Retrieves the metadata of the object at `path`.
///
/// A missing object is an error here, unlike in [`Client::stat`].
pub async fn fetch(config: &Config, path: &str) -> Result<BlobMetadata> {
    let client = build_client(config)?;
    let metadata = client
        .stat(path)
        .send()
        .await
        .with_context(|| format!("failed to read metadata of {path:?}"))?;

    metadata.with_context(|| format!("object not found: {path:?}"))
}

/// Renders the metadata as pretty-printed JSON, including user metadata matching `prefix`.
pub fn render(metadata: &BlobMetadata, prefix: &str) -> Result<String> {
    let output = StatOutput {
        metadata,
        user_metadata: metadata.user_metadata(prefix),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Runs `blobstore stat` and prints the result to stdout.
pub async fn stat(config: &Config, path: &str) -> Result<()> {
    let metadata = fetch(config, path).await?;
    tracing::debug!(key = %metadata.key, "received metadata");

    println!("{}", render(&metadata, &config.user_metadata_prefix)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use blobstore_test::server::{TestObject, TestServer};
    use secrecy::SecretBox;

    use super::*;
    use crate::config::ConfigSecret;

    fn config_for(server: &TestServer) -> Config {
        Config {
            service_url: server.url("/"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fetches_and_renders() {
        blobstore_test::tracing::init();
        let object = TestObject::new()
            .header("content-type", "application/json")
            .header("etag", "abc123")
            .header("x-amz-meta-owner", "alice");
        let server = TestServer::new([("bucket/file.txt", object)]).await;
        let config = config_for(&server);

        let metadata = fetch(&config, "bucket/file.txt").await.unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render(&metadata, &config.user_metadata_prefix).unwrap())
                .unwrap();

        assert_eq!(json["key"], "bucket/file.txt");
        assert_eq!(json["content_type"], "application/json");
        assert_eq!(json["headers"]["etag"], serde_json::json!(["abc123"]));
        assert_eq!(json["user_metadata"], serde_json::json!({"owner": "alice"}));
    }

    #[tokio::test]
    async fn missing_object_is_error() {
        let objects: [(&str, TestObject); 0] = [];
        let server = TestServer::new(objects).await;

        let err = fetch(&config_for(&server), "nope").await.unwrap_err();
        assert_eq!(err.to_string(), r#"object not found: "nope""#);
    }

    #[test]
    fn rejects_invalid_headers() {
        let mut config = Config::default();
        let value = SecretBox::new(Box::new(ConfigSecret::from("value")));
        config.headers.insert("bad header".into(), value);

        let err = build_client(&config).unwrap_err();
        assert_eq!(err.to_string(), r#"invalid header name "bad header""#);
    }
}
