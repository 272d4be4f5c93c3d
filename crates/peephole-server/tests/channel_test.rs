//! HTTP-level tests for the channel routes, against a live server.

mod common;

use chrono::Duration;
use serde_json::Value;

use common::{at, TestHarness, AT};
use peephole_core::config::{Config, Selection};
use peephole_core::NOTHING_ON;

#[tokio::test]
async fn empty_store_shows_placeholder() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/raw/peephole"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let ct = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(ct.starts_with("text/html"), "{ct}");
    let body = resp.text().await.unwrap();
    assert!(body.contains(NOTHING_ON));
    assert!(body.starts_with("<!DOCTYPE html>"));
}

#[tokio::test]
async fn youtube_post_is_embedded() {
    let (h, addr) = TestHarness::with_server().await;
    h.add_post(
        "Check this [video](https://www.youtube.com/watch?v=abc123) now",
        at() - Duration::days(1),
    );

    let client = reqwest::Client::new();
    let body = client
        .get(format!("http://{addr}/raw/peephole"))
        .query(&[("at", AT)])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(r#"<iframe width="560" height="315""#));
    assert!(body.contains(r#"src="https://www.youtube.com/embed/abc123""#));
}

#[tokio::test]
async fn json_formats_agree() {
    let (h, addr) = TestHarness::with_server().await;
    h.add_post("sounds https://e.example/track.mp3", at() - Duration::days(2));

    let client = reqwest::Client::new();
    let a: Value = client
        .get(format!("http://{addr}/raw/peephole.json"))
        .query(&[("at", AT)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let b: Value = client
        .get(format!("http://{addr}/raw/peephole"))
        .query(&[("at", AT), ("format", "json")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(a["kind"], "audio");
    assert_eq!(a["url"], "https://e.example/track.mp3");
    assert_eq!(a["html"], "<audio src='https://e.example/track.mp3' controls></audio>");
}

#[tokio::test]
async fn posts_outside_window_are_ignored() {
    let (h, addr) = TestHarness::with_server().await;
    h.add_post("old https://e.example/old.png", at() - Duration::days(15));
    h.add_post("future https://e.example/new.png", at() + Duration::days(15));

    let client = reqwest::Client::new();
    let v: Value = client
        .get(format!("http://{addr}/raw/peephole.json"))
        .query(&[("at", AT)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(v["kind"], "dummy");
    assert!(v["url"].is_null());
}

#[tokio::test]
async fn selection_follows_config() {
    let mut config = Config::default();
    config.channel.selection = Selection::Latest;
    let (h, addr) = TestHarness::with_server_config(config).await;
    h.add_post("https://e.example/first.png", at() - Duration::days(3));
    h.add_post("https://e.example/second.ogv", at() - Duration::days(1));

    let client = reqwest::Client::new();
    let v: Value = client
        .get(format!("http://{addr}/raw/peephole.json"))
        .query(&[("at", AT)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(v["kind"], "video");
    assert_eq!(v["url"], "https://e.example/second.ogv");
}

#[tokio::test]
async fn programme_lists_items_in_order() {
    let (h, addr) = TestHarness::with_server().await;
    h.add_post("https://e.example/b.gif https://vimeo.com/7", at() - Duration::days(1));
    h.add_post("https://e.example/a.wav", at() - Duration::days(5));
    h.add_post("no media", at());

    let client = reqwest::Client::new();
    let v: Value = client
        .get(format!("http://{addr}/api/programme"))
        .query(&[("at", AT)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let kinds: Vec<&str> = v["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["audio", "image", "vimeo"]);
    assert_eq!(v["start"], "2024-06-01T12:00:00Z");
    assert_eq!(v["end"], "2024-06-29T12:00:00Z");
}

#[tokio::test]
async fn invalid_at_is_rejected() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/raw/peephole.json"))
        .query(&[("at", "not-a-time")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let echoed = resp.headers()["x-request-id"].to_str().unwrap().to_string();
    let v: Value = resp.json().await.unwrap();
    assert_eq!(v["code"], "validation_error");
    assert_eq!(v["request_id"], echoed.as_str());
}
