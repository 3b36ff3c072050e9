// local stand-ins for an addon and a couple of cdn files, bound to a random port per test
#![allow(dead_code)]

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;

use addon_proxy::Stream;

pub const MOVIE_ID: &str = "tt0000001";
pub const MISSING_STREAMS_ID: &str = "tt0000002";
pub const EMPTY_STREAMS_ID: &str = "tt0000003";

pub async fn spawn_fixture() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let app = Router::new()
        .route("/files/movie.mp4", get(|| typed("video/mp4")))
        .route("/files/movie.mkv", get(|| typed("video/x-matroska")))
        .route("/files/blob.mkv", get(|| typed("application/octet-stream")))
        .route("/files/blob.bin", get(|| typed("application/octet-stream")))
        .route("/files/live", get(|| typed("application/x-mpegURL; charset=utf-8")))
        .route("/files/page", get(|| typed("text/html; charset=utf-8")))
        .route("/files/mislabeled.mp4", get(|| typed("text/plain")))
        .route("/files/untyped/{name}", get(|| async { StatusCode::OK }))
        .route("/files/missing.mp4", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/files/slow.mp4",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                ([(header::CONTENT_TYPE, "video/mp4")], "")
            }),
        )
        .route("/addon/manifest.json", get(manifest))
        .route("/broken/manifest.json", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/addon/stream/movie/{id}", get(movie_streams))
        .route("/addon/stream/series/{id}", get(series_streams))
        .with_state(base.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base
}

async fn typed(content_type: &'static str) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, content_type)], "")
}

async fn manifest() -> impl IntoResponse {
    Json(json!({
        "id": "org.test.addon",
        "name": "Test Addon",
        "version": "1.2.3",
        "description": "fixture addon",
        "resources": ["stream"],
        "types": ["movie", "series"]
    }))
}

async fn movie_streams(State(base): State<String>, Path(id): Path<String>) -> impl IntoResponse {
    match id.strip_suffix(".json") {
        Some(MOVIE_ID) => Json(json!({
            "streams": [
                { "title": "Broken 1080p", "url": format!("{}/files/missing.mp4", base) },
                { "title": "Movie 1080p 2.1GB", "url": format!("{}/files/movie.mp4", base) }
            ]
        }))
        .into_response(),
        Some(MISSING_STREAMS_ID) => Json(json!({})).into_response(),
        Some(EMPTY_STREAMS_ID) => Json(json!({ "streams": [] })).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn series_streams(State(base): State<String>, Path(id): Path<String>) -> impl IntoResponse {
    if id == format!("{}:1:2.json", MOVIE_ID) {
        Json(json!({
            "streams": [{ "name": "Episode 720p", "url": format!("{}/files/movie.mkv", base) }]
        }))
        .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

pub fn stream(url: &str, title: &str) -> Stream {
    Stream {
        url: Some(url.to_string()),
        title: Some(title.to_string()),
        ..Default::default()
    }
}

/// nothing listens on port 1, connects fail right away
pub fn unreachable(path: &str) -> String {
    format!("http://127.0.0.1:1/{}", path)
}
