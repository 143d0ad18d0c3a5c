mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::{response::Html, routing::get, Router};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{expect_error, TestApp};
use pinbox_api::config::TitleConfig;
use pinbox_api::services::{HttpTitleResolver, TitleResolver};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve a couple of pages for the resolver to fetch
async fn spawn_pages() -> Result<String> {
    let pages = Router::new()
        .route(
            "/titled",
            get(|| async { Html("<html><head><title> Pinbox Docs </title></head></html>") }),
        )
        .route("/untitled", get(|| async { Html("<html><body>nothing</body></html>") }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "gone") }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, pages).await.expect("page server");
    });
    Ok(format!("http://{}", addr))
}

/// Raw HTTP server whose response body never ends: `head` first, then 4 KiB
/// of filler every 50 ms until the client hangs up.
async fn spawn_endless_page(head: &'static str) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;

                let preamble = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n{}",
                    head
                );
                if socket.write_all(preamble.as_bytes()).await.is_err() {
                    return;
                }

                let filler = vec![b'x'; 4096];
                loop {
                    if socket.write_all(&filler).await.is_err() {
                        return;
                    }
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            });
        }
    });

    Ok(format!("http://{}/", addr))
}

fn small_resolver() -> Result<HttpTitleResolver> {
    Ok(HttpTitleResolver::new(&TitleConfig {
        fetch_enabled: true,
        fetch_timeout_secs: 5,
        max_body_bytes: 1024,
    })?)
}

async fn create_bookmark(app: &TestApp, token: &str, body: Value) -> Result<Value> {
    let res = app.post("/api/bookmarks").bearer_auth(token).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(res.json().await?)
}

#[tokio::test]
async fn unresolved_title_falls_back_to_url() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.register_and_login("alice").await?;

    let bookmark = create_bookmark(&app, &alice, json!({ "url": "https://example.com" })).await?;
    assert_eq!(bookmark["url"], "https://example.com");
    assert_eq!(bookmark["title"], "https://example.com");
    assert_eq!(bookmark["description"], "");
    assert_eq!(bookmark["favorite"], false);
    assert_eq!(bookmark["ownerId"], 1);
    Ok(())
}

#[tokio::test]
async fn supplied_title_is_kept() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.register_and_login("alice").await?;

    let bookmark = create_bookmark(
        &app,
        &alice,
        json!({
            "url": "https://doc.rust-lang.org/book/",
            "title": "The Book",
            "description": "Rust reference",
            "tags": ["Rust"],
            "favorite": true
        }),
    )
    .await?;
    assert_eq!(bookmark["title"], "The Book");
    assert_eq!(bookmark["description"], "Rust reference");
    assert_eq!(bookmark["tags"], json!(["Rust"]));
    assert_eq!(bookmark["favorite"], true);
    Ok(())
}

#[tokio::test]
async fn title_is_fetched_from_page() -> Result<()> {
    let pages = spawn_pages().await?;
    let resolver = HttpTitleResolver::new(&TitleConfig {
        fetch_enabled: true,
        fetch_timeout_secs: 5,
        max_body_bytes: 64 * 1024,
    })?;
    let app = TestApp::spawn_with_titles(Arc::new(resolver)).await?;
    let alice = app.register_and_login("alice").await?;

    let titled = format!("{}/titled", pages);
    let bookmark = create_bookmark(&app, &alice, json!({ "url": titled })).await?;
    assert_eq!(bookmark["title"], "Pinbox Docs");

    let untitled = format!("{}/untitled", pages);
    let bookmark = create_bookmark(&app, &alice, json!({ "url": untitled })).await?;
    assert_eq!(bookmark["title"], untitled.as_str());

    let missing = format!("{}/missing", pages);
    let bookmark = create_bookmark(&app, &alice, json!({ "url": missing })).await?;
    assert_eq!(bookmark["title"], missing.as_str());

    // Update without a title re-resolves
    let res = app
        .put("/api/bookmarks/3")
        .bearer_auth(&alice)
        .json(&json!({ "url": titled }))
        .send()
        .await?;
    let updated: Value = res.json().await?;
    assert_eq!(updated["title"], "Pinbox Docs");
    Ok(())
}

#[tokio::test]
async fn invalid_url_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.register_and_login("alice").await?;

    for body in [json!({}), json!({ "url": "not a url" }), json!({ "url": 42 })] {
        let res = app.post("/api/bookmarks").bearer_auth(&alice).json(&body).send().await?;
        let err = expect_error(res, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await?;
        assert_eq!(err["error"], "A valid URL is required.");
    }
    Ok(())
}

#[tokio::test]
async fn search_matches_title_or_description() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.register_and_login("alice").await?;

    create_bookmark(&app, &alice, json!({ "url": "https://a.test", "title": "Tokio Guide" })).await?;
    create_bookmark(
        &app,
        &alice,
        json!({ "url": "https://b.test", "title": "Axum", "description": "built on tokio" }),
    )
    .await?;
    create_bookmark(&app, &alice, json!({ "url": "https://c.test", "title": "Serde" })).await?;

    let res = app.get("/api/bookmarks?q=TOKIO").bearer_auth(&alice).send().await?;
    let found: Vec<Value> = res.json().await?;
    let ids: Vec<u64> = found.iter().filter_map(|b| b["id"].as_u64()).collect();
    assert_eq!(ids, vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn bookmarks_and_notes_have_separate_ids() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.register_and_login("alice").await?;

    let res = app
        .post("/api/notes")
        .bearer_auth(&alice)
        .json(&json!({ "content": "n" }))
        .send()
        .await?;
    let note: Value = res.json().await?;
    let bookmark = create_bookmark(&app, &alice, json!({ "url": "https://example.com" })).await?;

    assert_eq!(note["id"], 1);
    assert_eq!(bookmark["id"], 1);
    Ok(())
}

#[tokio::test]
async fn bookmark_isolation_and_favorite() -> Result<()> {
    let app = TestApp::spawn().await?;
    let alice = app.register_and_login("alice").await?;
    let bob = app.register_and_login("bob").await?;

    create_bookmark(&app, &alice, json!({ "url": "https://example.com", "tags": ["read"] })).await?;

    let res = app.get("/api/bookmarks?tags=read").bearer_auth(&bob).send().await?;
    let found: Vec<Value> = res.json().await?;
    assert!(found.is_empty());

    let res = app.patch("/api/bookmarks/1/favorite").bearer_auth(&bob).send().await?;
    let body = expect_error(res, StatusCode::NOT_FOUND, "NOT_FOUND").await?;
    assert_eq!(body["error"], "Bookmark not found.");

    let res = app.patch("/api/bookmarks/1/favorite").bearer_auth(&alice).send().await?;
    let toggled: Value = res.json().await?;
    assert_eq!(toggled["favorite"], true);

    let res = app.delete("/api/bookmarks/1").bearer_auth(&alice).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = app.get("/api/bookmarks/1").bearer_auth(&alice).send().await?;
    expect_error(res, StatusCode::NOT_FOUND, "NOT_FOUND").await?;
    Ok(())
}

#[tokio::test]
async fn early_title_is_read_without_waiting_for_body_end() -> Result<()> {
    let url = spawn_endless_page("<html><head><title>Early</title></head><body>").await?;
    let resolver = small_resolver()?;

    let started = Instant::now();
    let title = resolver.resolve(&url).await;

    assert_eq!(title, "Early");
    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    Ok(())
}

#[tokio::test]
async fn endless_body_stops_at_size_cap() -> Result<()> {
    let url = spawn_endless_page("<html><body>").await?;
    let resolver = small_resolver()?;

    let started = Instant::now();
    let title = resolver.resolve(&url).await;

    assert_eq!(title, "");
    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    Ok(())
}
