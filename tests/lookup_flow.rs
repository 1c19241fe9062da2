use std::collections::HashMap;
use std::time::Duration;

use axum::{
    Router,
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use sdwv_client::{
    BufferRegion, ClientConfig, LookupController, LookupOutcome, Reaction, SuggestPolicy, UiEvent,
};
use tokio::net::TcpListener;

const WORDS: &[&str] = &["cat", "catalog", "catch", "category", "dog", "doge"];

async fn neigh(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let prefix = params.get("w").cloned().unwrap_or_default();
    let offset: usize = params.get("off").and_then(|v| v.parse().ok()).unwrap_or(0);
    let len: usize = params.get("len").and_then(|v| v.parse().ok()).unwrap_or(10);
    WORDS
        .iter()
        .filter(|word| word.starts_with(prefix.as_str()))
        .skip(offset)
        .take(len)
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

async fn page(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let word = params.get("w").cloned().unwrap_or_default();
    if params.get("co").map(String::as_str) != Some("c") {
        return (StatusCode::OK, Html("<html><body>full page</body></html>".to_string()));
    }
    if !WORDS.contains(&word.as_str()) {
        return (StatusCode::NOT_FOUND, Html("<h1>no entry</h1>".to_string()));
    }
    let body = match word.as_str() {
        "cat" => r#"<div class="entry"><b>cat</b> a small feline; compare <a href="/dict/?w=dog">dog</a></div>"#
            .to_string(),
        other => format!("<div class=\"entry\"><b>{other}</b></div>"),
    };
    (StatusCode::OK, Html(body))
}

async fn start_server() -> String {
    let router = Router::new()
        .route("/dict/neigh", get(neigh))
        .route("/dict/", get(page));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/dict/")
}

fn config(page_url: String) -> ClientConfig {
    ClientConfig {
        page_url,
        max_suggestions: 3,
        timeout: Duration::from_secs(5),
        link_rewrite: true,
        suggest: SuggestPolicy {
            delay: Duration::ZERO,
            min_length: 1,
        },
    }
}

#[tokio::test]
async fn type_select_and_follow_link() {
    let page_url = start_server().await;
    let mut controller =
        LookupController::connect(&config(page_url), BufferRegion::new()).unwrap();

    let reaction = controller
        .dispatch(UiEvent::QueryChanged("cat".to_string()))
        .await;
    assert_eq!(
        reaction,
        Reaction::Suggestions(vec![
            "cat".to_string(),
            "catalog".to_string(),
            "catch".to_string()
        ])
    );

    controller
        .dispatch(UiEvent::ItemSelected("cat".to_string()))
        .await;
    let reaction = controller.dispatch(UiEvent::ListClosed).await;
    assert_eq!(reaction, Reaction::Submitted(LookupOutcome::Loaded));
    assert!(controller.region().html().contains("a small feline"));

    let links = controller.cross_references().to_vec();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].word.as_deref(), Some("dog"));

    let reaction = controller
        .dispatch(UiEvent::LinkClicked(links[0].href.clone()))
        .await;
    assert_eq!(reaction, Reaction::Submitted(LookupOutcome::Loaded));
    assert_eq!(controller.query(), "dog");
    assert_eq!(
        controller.region().html(),
        "<div class=\"entry\"><b>dog</b></div>"
    );
}

#[tokio::test]
async fn unknown_word_renders_reason_phrase() {
    let page_url = start_server().await;
    let mut controller =
        LookupController::connect(&config(page_url), BufferRegion::new()).unwrap();
    controller.set_query("zebra");
    let reaction = controller.dispatch(UiEvent::FormSubmitted).await;
    assert_eq!(
        reaction,
        Reaction::Submitted(LookupOutcome::Failed("Not Found".to_string()))
    );
    assert_eq!(controller.region().html(), "Not Found");
}

#[tokio::test]
async fn unreachable_server_degrades_to_sentinel() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let mut controller = LookupController::connect(
        &config(format!("http://{addr}/dict/")),
        BufferRegion::new(),
    )
    .unwrap();

    let reaction = controller
        .dispatch(UiEvent::QueryChanged("ca".to_string()))
        .await;
    assert_eq!(reaction, Reaction::Suggestions(vec!["ERROR".to_string()]));

    let outcome = controller.submit().await;
    assert_eq!(outcome, LookupOutcome::Failed("error".to_string()));
    assert_eq!(controller.region().html(), "error");
}

#[test]
fn invalid_page_url_is_rejected() {
    let result = LookupController::connect(&config("not a url".to_string()), BufferRegion::new());
    assert!(result.is_err());
}
