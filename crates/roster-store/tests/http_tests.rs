use pretty_assertions::assert_eq;
use roster_session::AccessToken;
use roster_store::{Document, DocumentStore, HttpDocumentStore, StoreError};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Serves `replies` (status, JSON body) to successive connections and
/// returns every raw request it received.
async fn stub(replies: Vec<(u16, &'static str)>) -> (HttpDocumentStore, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let mut seen = Vec::new();
        for (status, body) in replies {
            let (mut socket, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut socket).await);
            let reply = format!(
                "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                reason(status),
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
        seen
    });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let store = HttpDocumentStore::with_client(client, format!("http://{addr}/v1"), "students");
    (store, server)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Other",
    }
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + body_len {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn token() -> AccessToken {
    AccessToken::new("tok-123")
}

fn has_bearer(request: &str) -> bool {
    request
        .to_ascii_lowercase()
        .contains("authorization: bearer tok-123")
}

#[tokio::test]
async fn list_decodes_documents_and_sends_bearer_token() {
    let (store, server) = stub(vec![(
        200,
        r#"[{"id":"s1","fields":{"name":"Asha Rao","class":"10"}},{"id":"s2","fields":{}}]"#,
    )])
    .await;

    let listed = store.list_all(&token()).await.unwrap();

    assert_eq!(
        listed,
        vec![
            Document {
                id: "s1".into(),
                fields: json!({"name": "Asha Rao", "class": "10"})
                    .as_object()
                    .cloned()
                    .unwrap(),
            },
            Document {
                id: "s2".into(),
                fields: serde_json::Map::new(),
            },
        ]
    );
    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("GET /v1/students HTTP/1.1"));
    assert!(has_bearer(&requests[0]));
}

#[tokio::test]
async fn create_posts_fields_and_returns_store_id() {
    let (store, server) = stub(vec![(201, r#"{"id":"01NEW"}"#)]).await;
    let fields = json!({"name": "Asha Rao"}).as_object().cloned().unwrap();

    let id = store.create(&token(), fields).await.unwrap();

    assert_eq!(id, "01NEW");
    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /v1/students HTTP/1.1"));
    assert!(has_bearer(&requests[0]));
    assert!(requests[0].ends_with(r#"{"name":"Asha Rao"}"#));
}

#[tokio::test]
async fn update_and_delete_target_the_document_path() {
    let (store, server) = stub(vec![(200, ""), (200, "")]).await;

    store
        .update(&token(), "s1", serde_json::Map::new())
        .await
        .unwrap();
    store.delete(&token(), "s1").await.unwrap();

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("PUT /v1/students/s1 HTTP/1.1"));
    assert!(requests[1].starts_with("DELETE /v1/students/s1 HTTP/1.1"));
    assert!(requests.iter().all(|r| has_bearer(r)));
}

#[tokio::test]
async fn missing_documents_and_refusals_map_to_store_errors() {
    let (store, server) = stub(vec![
        (404, r#"{"error":"missing"}"#),
        (404, r#"{"error":"missing"}"#),
        (403, r#"{"error":"denied"}"#),
        (403, r#"{"error":"denied"}"#),
    ])
    .await;

    assert_eq!(
        store.update(&token(), "gone", serde_json::Map::new()).await,
        Err(StoreError::NotFound("gone".into()))
    );
    assert_eq!(
        store.delete(&token(), "gone").await,
        Err(StoreError::NotFound("gone".into()))
    );
    assert!(matches!(
        store.delete(&token(), "s1").await,
        Err(StoreError::WriteRejected(_))
    ));
    assert!(matches!(
        store.list_all(&token()).await,
        Err(StoreError::Unavailable(_))
    ));
    server.await.unwrap();
}

#[tokio::test]
async fn undecodable_listing_is_unavailable() {
    let (store, server) = stub(vec![(200, r#"{"not":"a list"}"#)]).await;
    assert!(matches!(
        store.list_all(&token()).await,
        Err(StoreError::Unavailable(_))
    ));
    server.await.unwrap();
}
