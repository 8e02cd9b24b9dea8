use axum::Router;
use mailsink::{
    app::AppState,
    db, http,
    store::{Envelope, Store, raw::RawStore},
};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use uuid::Uuid;

async fn start_server(api_token: Option<&str>) -> (String, AppState, TempDir, JoinHandle<()>) {
    let tmp = tempfile::tempdir().unwrap();
    let pool = db::open_pool(&tmp.path().join("messages.db")).await.unwrap();
    let raw = RawStore::open(tmp.path().join("store")).await.unwrap();
    let state = AppState {
        store: Store::new(pool, raw),
        api_token: api_token.map(String::from),
    };
    let app: Router = http::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state, tmp, handle)
}

async fn seed(state: &AppState, from: &str, to: &[&str], raw: &[u8]) -> Uuid {
    state
        .store
        .capture(Envelope {
            from_addr: from.to_string(),
            to_addrs: to.iter().map(|s| s.to_string()).collect(),
            raw: raw.to_vec(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn healthz_is_open() {
    let (base, _state, _tmp, _srv) = start_server(None).await;

    let client = reqwest::Client::new();
    let res = client.get(format!("{}/healthz", base)).send().await.unwrap();
    assert!(res.status().is_success());
    let v: serde_json::Value = res.json().await.unwrap();
    assert_eq!(v["ok"], serde_json::Value::Bool(true));
}

#[tokio::test]
async fn list_on_a_fresh_server_is_empty() {
    let (base, _state, _tmp, _srv) = start_server(None).await;

    let client = reqwest::Client::new();
    let res = client.get(format!("{}/messages", base)).send().await.unwrap();
    assert!(res.status().is_success());
    let arr: serde_json::Value = res.json().await.unwrap();
    assert!(arr.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_returns_newest_first_with_limit() {
    let (base, state, _tmp, _srv) = start_server(None).await;
    for subj in ["One", "Two", "Three"] {
        let eml = format!("From: dev@example.test\r\nSubject: {subj}\r\n\r\nx\r\n");
        seed(&state, "dev@example.test", &["you@example.test"], eml.as_bytes()).await;
    }

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/messages?limit=2", base))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let arr: serde_json::Value = res.json().await.unwrap();
    let arr = arr.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["subject"].as_str(), Some("Three"));
    assert_eq!(arr[1]["subject"].as_str(), Some("Two"));
}

#[tokio::test]
async fn query_filters_case_insensitively() {
    let (base, state, _tmp, _srv) = start_server(None).await;
    seed(
        &state,
        "alice@example.test",
        &["you@example.test"],
        b"Subject: Hello World\r\n\r\nx\r\n",
    )
    .await;
    seed(
        &state,
        "bob@example.test",
        &["you@example.test"],
        b"Subject: Weekly report\r\n\r\nx\r\n",
    )
    .await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/messages?q=hello", base))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let arr: serde_json::Value = res.json().await.unwrap();
    let arr = arr.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["subject"].as_str(), Some("Hello World"));

    // Sender matches count too
    let res = client
        .get(format!("{}/messages?q=BOB@", base))
        .send()
        .await
        .unwrap();
    let arr: serde_json::Value = res.json().await.unwrap();
    assert_eq!(arr.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn get_message_returns_detail_or_404() {
    let (base, state, _tmp, _srv) = start_server(None).await;
    let payload = b"From: dev@example.test\r\nSubject: Detail\r\n\r\nbody\r\n";
    let id = seed(&state, "dev@example.test", &["a@b", "c@d"], payload).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/messages/{}", base, id))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let v: serde_json::Value = res.json().await.unwrap();
    assert_eq!(v["id"].as_str(), Some(id.to_string().as_str()));
    assert_eq!(v["subject"].as_str(), Some("Detail"));
    assert_eq!(v["size_bytes"].as_i64(), Some(payload.len() as i64));
    let to: Vec<&str> = v["to_addrs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|x| x.as_str().unwrap())
        .collect();
    assert_eq!(to, vec!["a@b", "c@d"]);

    let res = client
        .get(format!("{}/messages/{}", base, Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preview_returns_headers_and_text_body() {
    let (base, state, _tmp, _srv) = start_server(None).await;
    let id = seed(
        &state,
        "a@b",
        &["c@d"],
        b"From: a@b\r\nSubject: hi\r\n\r\nhello\n",
    )
    .await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/messages/{}/preview", base, id))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let v: serde_json::Value = res.json().await.unwrap();
    assert_eq!(v["headers"]["From"].as_str(), Some("a@b"));
    assert_eq!(v["headers"]["Subject"].as_str(), Some("hi"));
    assert!(v["headers"].get("Date").is_none());
    assert_eq!(v["body"].as_str(), Some("hello\n"));
}

#[tokio::test]
async fn raw_download_is_byte_identical() {
    let (base, state, _tmp, _srv) = start_server(None).await;
    let payload = b"From: dev@example.test\r\nSubject: Raw\r\n\r\nexact bytes\r\n";
    let id = seed(&state, "dev@example.test", &["you@example.test"], payload).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/messages/{}/raw", base, id))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "message/rfc822"
    );
    let body = res.bytes().await.unwrap();
    assert_eq!(&body[..], payload);
}

#[tokio::test]
async fn delete_removes_message_then_404s() {
    let (base, state, _tmp, _srv) = start_server(None).await;
    let id = seed(
        &state,
        "dev@example.test",
        &["you@example.test"],
        b"Subject: Bye\r\n\r\nx\r\n",
    )
    .await;

    let client = reqwest::Client::new();
    let res = client
        .delete(format!("{}/messages/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/messages/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("{}/messages/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bearer_token_guards_message_routes() {
    let (base, state, _tmp, _srv) = start_server(Some("sekrit")).await;
    seed(
        &state,
        "dev@example.test",
        &["you@example.test"],
        b"Subject: Locked\r\n\r\nx\r\n",
    )
    .await;
    let client = reqwest::Client::new();

    // Health stays open
    let res = client.get(format!("{}/healthz", base)).send().await.unwrap();
    assert!(res.status().is_success());

    let res = client.get(format!("{}/messages", base)).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(res.text().await.unwrap(), "missing token");

    let res = client
        .get(format!("{}/messages", base))
        .header("Authorization", "Bearer wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(res.text().await.unwrap(), "invalid token");

    let res = client
        .get(format!("{}/messages", base))
        .bearer_auth("sekrit")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let arr: serde_json::Value = res.json().await.unwrap();
    assert_eq!(arr.as_array().unwrap().len(), 1);
}
