use blobstore_client::{BlobMetadata, MetadataParser, extract_metadata};
use blobstore_test::server::{TestObject, TestServer};

#[tokio::test]
async fn extracts_from_reqwest_response() {
    let object = TestObject::new()
        .header("content-type", "application/json")
        .header("etag", "abc123")
        .header("vary", "accept")
        .header("vary", "accept-encoding");
    let server = TestServer::new([("file.json", object)]).await;

    let url = reqwest::Url::parse(&server.url("/file.json")).unwrap();
    let response = reqwest::Client::new()
        .head(url.clone())
        .send()
        .await
        .unwrap();

    let metadata = extract_metadata(&url, &response, &BlobMetadata::new).unwrap();

    assert_eq!(metadata.key, "file.json");
    assert_eq!(metadata.content_type.as_deref(), Some("application/json"));
    assert_eq!(metadata.all_headers["etag"], "abc123");
    let vary: Vec<_> = metadata.all_headers.get_all("vary").iter().collect();
    assert_eq!(vary, ["accept", "accept-encoding"]);
}

#[tokio::test]
async fn parser_is_reusable_across_tasks() {
    let object = TestObject::new().header("content-type", "text/plain");
    let server = TestServer::new([("a", object.clone()), ("b", object)]).await;
    let parser = std::sync::Arc::new(MetadataParser::new(BlobMetadata::new));

    let mut tasks = Vec::new();
    for key in ["a", "b"] {
        let parser = parser.clone();
        let url = reqwest::Url::parse(&server.url(key)).unwrap();
        tasks.push(tokio::spawn(async move {
            let response = reqwest::Client::new().head(url.clone()).send().await.unwrap();
            parser.parse(&url, &response).unwrap()
        }));
    }

    let mut keys = Vec::new();
    for task in tasks {
        keys.push(task.await.unwrap().key);
    }
    assert_eq!(keys, ["a", "b"]);
}
