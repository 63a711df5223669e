//! End-to-end flows over HTTP.

use std::time::Duration;

use serde_json::json;

mod common;
use common::{ScriptedReload, TestServer};

#[tokio::test]
async fn test_create_update_apply_scenario() {
    let reload = ScriptedReload::ok();
    let server = TestServer::start(reload.clone(), Duration::from_secs(5)).await;

    let (status, body) = server.create("site.conf", b"# base\n").await;
    assert_eq!(status, 200);
    assert_eq!(body["biz_code"], 0);

    let (status, body) = server
        .update("site.conf", b"# base\n", b"# base\nserver {}\n")
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["biz_code"], 0);
    assert_eq!(body["data"]["outcome"], "applied");

    assert_eq!(
        server.content("site.conf").await.unwrap(),
        b"# base\nserver {}\n"
    );

    let (_, body) = server.apply_status().await;
    assert_eq!(body["data"]["pendingChanges"], true);

    let (status, body) = server.apply().await;
    assert_eq!(status, 200);
    assert_eq!(body["biz_code"], 0);
    assert_eq!(body["data"]["outcome"], "succeeded");
    assert_eq!(reload.calls(), 1);

    let (_, body) = server.apply_status().await;
    assert_eq!(body["data"]["state"], "idle");
    assert_eq!(body["data"]["pendingChanges"], false);
    assert_eq!(body["data"]["last"]["result"], "succeeded");
}

#[tokio::test]
async fn test_list_reports_metadata_in_name_order() {
    let server = TestServer::start(ScriptedReload::ok(), Duration::from_secs(5)).await;
    server.create("b.conf", b"bbbb").await;
    server.create("a.conf", b"a").await;
    std::fs::write(server.dir.path().join("readme.md"), "not managed").unwrap();

    let (status, body) = server.list().await;
    assert_eq!(status, 200);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "a.conf");
    assert_eq!(entries[1]["name"], "b.conf");
    assert_eq!(entries[1]["size"], 4);
    assert!(entries[0]["modTime"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn test_get_multiple_names() {
    let server = TestServer::start(ScriptedReload::ok(), Duration::from_secs(5)).await;
    server.create("a.conf", b"A").await;
    server.create("b.conf", &[0, 159, 146, 150]).await;

    let (status, body) = server.get(&["a.conf", "b.conf"]).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["a.conf"], "QQ==");
    assert_eq!(server.content("b.conf").await.unwrap(), [0u8, 159, 146, 150]);

    let (status, body) = server.get(&["a.conf", "missing.conf"]).await;
    assert_eq!(status, 404);
    assert_eq!(body["biz_code"], 1);

    let (status, body) = server.get(&[]).await;
    assert_eq!(status, 400);
    assert_eq!(body["biz_code"], 10);
}

#[tokio::test]
async fn test_stale_update_conflicts() {
    let server = TestServer::start(ScriptedReload::ok(), Duration::from_secs(5)).await;
    server.create("site.conf", b"X").await;

    let (status, body) = server.update("site.conf", b"Z", b"Y").await;
    assert_eq!(status, 409);
    assert_eq!(body["biz_code"], 5);
    assert_eq!(body["data"]["outcome"], "conflict");
    assert_eq!(server.content("site.conf").await.unwrap(), b"X");
}

#[tokio::test]
async fn test_create_rejections() {
    let server = TestServer::start(ScriptedReload::ok(), Duration::from_secs(5)).await;

    let (status, body) = server.create("../etc/passwd", b"root").await;
    assert_eq!(status, 400);
    assert_eq!(body["biz_code"], 3);

    let (_, body) = server.create("noext", b"x").await;
    assert_eq!(body["biz_code"], 3);
    assert_eq!(std::fs::read_dir(server.dir.path()).unwrap().count(), 0);

    server.create("site.conf", b"first").await;
    let (status, body) = server.create("site.conf", b"second").await;
    assert_eq!(status, 409);
    assert_eq!(body["biz_code"], 2);
    assert_eq!(server.content("site.conf").await.unwrap(), b"first");

    let body = json!({ "name": "new.conf", "content": "***" });
    let (status, body) = common::send(server.client.post(server.url("/conf")).json(&body)).await;
    assert_eq!(status, 400);
    assert_eq!(body["biz_code"], 4);
}

#[tokio::test]
async fn test_update_rejections() {
    let server = TestServer::start(ScriptedReload::ok(), Duration::from_secs(5)).await;

    let (status, body) = server.update("absent.conf", b"", b"x").await;
    assert_eq!(status, 404);
    assert_eq!(body["biz_code"], 1);

    server.create("site.conf", b"X").await;
    let body = json!({
        "name": "site.conf",
        "currentContent": "WA==",
        "expectedContent": "not base64!",
    });
    let (status, body) = common::send(server.client.put(server.url("/conf")).json(&body)).await;
    assert_eq!(status, 400);
    assert_eq!(body["biz_code"], 4);
    assert_eq!(server.content("site.conf").await.unwrap(), b"X");

    let (status, body) = common::send(
        server
            .client
            .put(server.url("/conf"))
            .header("content-type", "application/json")
            .body("{\"name\": 1}"),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["biz_code"], 10);
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let server = TestServer::start(ScriptedReload::ok(), Duration::from_secs(5)).await;
    let res = server
        .client
        .get(format!("http://{}/status", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["status"], "operational");
}
