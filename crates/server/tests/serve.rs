use std::path::Path;

use deckhand_server::{LocalServer, ServerConfig, ServerHandle};

async fn start(root: &Path, live_reload: bool) -> ServerHandle {
    LocalServer::start(ServerConfig {
        root: root.to_path_buf(),
        host: "127.0.0.1".to_string(),
        port: 0,
        live_reload,
    })
    .await
    .expect("server starts")
}

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("test")).unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        "<html><body><div class=\"reveal\"></div></body></html>",
    )
    .unwrap();
    std::fs::write(dir.path().join("test/test.js"), "QUnit.test('x', function () {});").unwrap();
    dir
}

#[tokio::test]
async fn serves_files_under_root() {
    let dir = fixture();
    let server = start(dir.path(), false).await;

    let url = server.url_for(Path::new("test/test.js"));
    let resp = reqwest::get(url).await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.unwrap(), "QUnit.test('x', function () {});");

    let missing = reqwest::get(server.url_for(Path::new("test/missing.html"))).await.unwrap();
    assert_eq!(missing.status().as_u16(), 404);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn directory_requests_resolve_index() {
    let dir = fixture();
    let server = start(dir.path(), false).await;

    let body = reqwest::get(server.base_url().clone()).await.unwrap().text().await.unwrap();
    assert!(body.contains("class=\"reveal\""));
    assert!(!body.contains("__livereload"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn live_reload_injects_client() {
    let dir = fixture();
    let server = start(dir.path(), true).await;

    let page = reqwest::get(server.url_for(Path::new("index.html")))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.ends_with("<script src=\"/__livereload.js\"></script></body></html>"));

    let script = reqwest::get(server.base_url().join("__livereload.js").unwrap())
        .await
        .unwrap();
    assert!(script.status().is_success());
    assert!(script.text().await.unwrap().contains("/__livereload"));

    // non-HTML assets pass through untouched
    let js = reqwest::get(server.url_for(Path::new("test/test.js")))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!js.contains("__livereload"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn stop_releases_the_port() {
    let dir = fixture();
    let server = start(dir.path(), true).await;
    let addr = server.local_addr();

    server.stop().await.unwrap();

    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}
