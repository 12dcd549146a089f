//! Exposes an in-process object storage stand-in for use in integration tests.
//!
//! The server answers `GET` and `HEAD` requests for a fixed set of objects with canned headers.
//! Unknown paths return `404 Not Found`.
//!
//! ```
//! use blobstore_test::server::{TestObject, TestServer};
//!
//! #[tokio::main]
//! async fn main() {
//!    let object = TestObject::new().header("content-type", "text/plain");
//!    let server = TestServer::new([("bucket/file.txt", object)]).await;
//!    let url = server.url("/bucket/file.txt");
//!    // use the URL in tests...
//! }
//! ```

use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;

/// The canned response for a single object.
#[derive(Clone, Debug)]
pub struct TestObject {
    status: StatusCode,
    headers: HeaderMap,
}

impl TestObject {
    /// Creates an object that responds with `200 OK` and no headers.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }

    /// Appends a response header. Repeated names send multiple values.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name: HeaderName = name.parse().unwrap();
        let value = HeaderValue::from_str(value).unwrap();
        self.headers.append(name, value);
        self
    }

    /// Overrides the response status.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl Default for TestObject {
    fn default() -> Self {
        Self::new()
    }
}

type Objects = Arc<HashMap<String, TestObject>>;

async fn serve_object(State(objects): State<Objects>, Path(key): Path<String>) -> Response {
    let Some(object) = objects.get(&key) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    // Build the response by hand, body conversions would add their own content type.
    let mut response = Response::new(Body::empty());
    *response.status_mut() = object.status;
    *response.headers_mut() = object.headers.clone();
    response
}

/// An in-process test server for use in integration tests.
///
/// The server listens on a random available port on localhost and is shut down when dropped.
#[derive(Debug)]
pub struct TestServer {
    handle: tokio::task::JoinHandle<()>,
    socket: SocketAddr,
}

impl TestServer {
    /// Starts a server serving the given objects, keyed by their path without leading slash.
    pub async fn new<'a, I>(objects: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, TestObject)>,
    {
        let objects: Objects = Arc::new(
            objects
                .into_iter()
                .map(|(key, object)| (key.to_owned(), object))
                .collect(),
        );

        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = TcpListener::bind(addr).unwrap();
        listener.set_nonblocking(true).unwrap();
        let socket = listener.local_addr().unwrap();

        let app = Router::new()
            .route("/{*key}", get(serve_object))
            .with_state(objects);

        let handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });

        Self { handle, socket }
    }

    /// Returns a full URL pointing to the given path.
    ///
    /// This URL uses `localhost` as hostname.
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("http://localhost:{}/{}", self.socket.port(), path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_canned_headers() {
        let object = TestObject::new()
            .header("content-type", "text/plain")
            .header("x-amz-meta-owner", "alice");
        let server = TestServer::new([("bucket/file.txt", object)]).await;

        let client = reqwest::Client::new();
        let response = client
            .head(server.url("/bucket/file.txt"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert_eq!(response.headers()["x-amz-meta-owner"], "alice");
    }

    #[tokio::test]
    async fn unknown_objects_are_missing() {
        let objects: [(&str, TestObject); 0] = [];
        let server = TestServer::new(objects).await;

        let response = reqwest::get(server.url("/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
