mod common;

use std::io::Read;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use flate2::read::GzDecoder;
use serde_json::Value;
use tower::ServiceExt;

use addon_proxy::server::error::Error;
use addon_proxy::{
    AddonProxyServer, AppConfig, ConfiguredAddon, DynAddonClient, Manifest, MediaRequest,
    MockAddonClientTrait, ProxyServices, ResponseMode, Stream,
};

use common::{stream, unreachable};

fn manifest() -> Manifest {
    Manifest {
        name: Some("Mock Addon".into()),
        version: Some("0.0.1".into()),
        description: Some("mocked".into()),
    }
}

fn configured_app(client: MockAddonClientTrait, config: AppConfig) -> Router {
    let addon = ConfiguredAddon::new(
        "http://addon.test/u/s3cr3t-key".into(),
        manifest(),
        Arc::new(client) as DynAddonClient,
    );
    AddonProxyServer::router(ProxyServices::new(
        Arc::new(config),
        ProxyServices::http_client().unwrap(),
        Some(addon),
    ))
}

fn unconfigured_app() -> Router {
    AddonProxyServer::router(ProxyServices::new(
        Arc::new(AppConfig::default()),
        ProxyServices::http_client().unwrap(),
        None,
    ))
}

/// a client that fails the test if the handler ever reaches the addon
fn untouched_client() -> MockAddonClientTrait {
    let mut client = MockAddonClientTrait::new();
    client.expect_fetch_streams().times(0);
    client
}

fn client_returning(streams: Vec<Stream>) -> MockAddonClientTrait {
    let mut client = MockAddonClientTrait::new();
    client
        .expect_fetch_streams()
        .returning(move |_| Ok(streams.clone()));
    client
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn answer_meta_routes_without_configuration() {
    for uri in ["/", "/health", "/info"] {
        let response = get(unconfigured_app(), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    let health = json_body(get(unconfigured_app(), "/health").await).await;
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["addon"]["configured"], false);

    let info = json_body(get(unconfigured_app(), "/info").await).await;
    assert_eq!(info["configured"], false);
    assert!(info["manifest"].is_null());
    assert!(info["supportedFormats"].as_array().unwrap().len() > 5);
}

#[tokio::test]
async fn answer_503_everywhere_else_when_unconfigured() {
    for uri in [
        "/movie/tt0111161",
        "/tv/tt0903747/1/1",
        "/movie/not-an-id",
        "/anything/else",
    ] {
        let response = get(unconfigured_app(), uri).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{}", uri);

        let body = json_body(response).await;
        assert_eq!(body["error"], "Service not configured");
        assert_eq!(body["missing"], "ADDON_MANIFEST_URL");
    }
}

#[tokio::test]
async fn report_configuration_on_info_and_health() {
    let app = configured_app(untouched_client(), AppConfig::default());
    let health = json_body(get(app, "/health").await).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["addon"]["host"], "http://addon.test");
    assert!(!health.to_string().contains("s3cr3t-key"));

    let config = AppConfig {
        addon_manifest_url: Some("http://addon.test/u/s3cr3t-key/manifest.json".into()),
        ..AppConfig::default()
    };
    let app = configured_app(untouched_client(), config);
    let info = json_body(get(app, "/info").await).await;
    assert_eq!(info["configured"], true);
    assert_eq!(info["addonHost"], "http://addon.test");
    assert!(!info.to_string().contains("s3cr3t-key"));
    assert_eq!(info["manifest"]["name"], "Mock Addon");
    assert_eq!(info["responseMode"], "json");

    let unknown = get(configured_app(untouched_client(), AppConfig::default()), "/nope").await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reject_malformed_imdb_ids_before_calling_the_addon() {
    for id in ["abc123", "tt", "123", "tt12a", "TT123"] {
        for uri in [format!("/movie/{}", id), format!("/tv/{}/1/1", id)] {
            let app = configured_app(untouched_client(), AppConfig::default());
            let response = get(app, &uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

            let body = json_body(response).await;
            assert!(
                body["message"].as_str().unwrap().contains("IMDb"),
                "{}: {}",
                uri,
                body
            );
        }
    }
}

#[tokio::test]
async fn reject_non_numeric_season_or_episode() {
    for uri in ["/tv/tt0903747/one/1", "/tv/tt0903747/1/two", "/tv/tt0903747/-1/2"] {
        let response = get(configured_app(untouched_client(), AppConfig::default()), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn reject_unsupported_formats_and_modes_before_calling_the_addon() {
    let response = get(
        configured_app(untouched_client(), AppConfig::default()),
        "/movie/tt0111161?format=exe",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Unsupported format: exe");
    assert!(body["supportedFormats"].as_array().unwrap().contains(&Value::from("mkv")));

    let response = get(
        configured_app(untouched_client(), AppConfig::default()),
        "/movie/tt0111161?mode=teleport",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn answer_malformed_query_strings_with_json() {
    let response = get(
        configured_app(untouched_client(), AppConfig::default()),
        "/movie/tt0111161?format=mp4&format=mkv",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("format"));
}

#[tokio::test]
async fn answer_404_when_the_addon_has_no_streams() {
    let no_urls = vec![Stream {
        title: Some("magnet only".into()),
        ..Default::default()
    }];

    for streams in [Vec::new(), no_urls] {
        let response = get(
            configured_app(client_returning(streams), AppConfig::default()),
            "/movie/tt0111161",
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "No streams found");
    }
}

#[tokio::test]
async fn answer_500_when_the_addon_fails() {
    let mut client = MockAddonClientTrait::new();
    client
        .expect_fetch_streams()
        .times(1)
        .returning(|_| Err(Error::Upstream("addon returned 502 Bad Gateway".into())));

    let response = get(configured_app(client, AppConfig::default()), "/movie/tt0111161").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to fetch streams");
    assert!(body["details"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn answer_404_when_no_candidate_is_reachable() {
    let streams = vec![
        stream(&unreachable("a.mp4"), "A 1080p"),
        stream(&unreachable("b.mkv"), "B 720p"),
    ];
    let config = AppConfig {
        probe_timeout_secs: 1,
        ..Default::default()
    };

    let response = get(configured_app(client_returning(streams), config), "/movie/tt0111161").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["error"], "No matching stream found");
    assert_eq!(body["totalStreams"], 2);
    assert!(body["supportedFormats"].is_array());
}

#[tokio::test]
async fn pass_the_episode_through_to_the_addon() {
    let base = common::spawn_fixture().await;
    let mut client = MockAddonClientTrait::new();
    let url = format!("{}/files/movie.mkv", base);
    client
        .expect_fetch_streams()
        .withf(|media| {
            *media
                == MediaRequest::Episode {
                    imdb: "tt0903747".into(),
                    season: 2,
                    episode: 13,
                }
        })
        .times(1)
        .returning(move |_| Ok(vec![stream(&url, "Episode 720p")]));

    let response = get(configured_app(client, AppConfig::default()), "/tv/tt0903747/2/13").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["media"], "tt0903747 S02E13");
    assert_eq!(body["detectedType"], "video/x-matroska");
}

#[tokio::test]
async fn describe_the_selected_stream_as_json() {
    let base = common::spawn_fixture().await;
    let streams = vec![
        stream(&format!("{}/files/missing.mp4", base), "Gone 1080p"),
        stream(&format!("{}/files/page", base), "Ad page"),
        stream(&format!("{}/files/movie.mkv", base), "Real 1080p"),
    ];

    for format in ["mkv", "MKV"] {
        let uri = format!("/movie/tt0111161?format={}", format);
        let app = configured_app(client_returning(streams.clone()), AppConfig::default());
        let response = get(app, &uri).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["url"], format!("{}/files/movie.mkv", base));
        assert_eq!(body["detectedType"], "video/x-matroska");
        assert_eq!(body["detectedBy"], "contentType");
        assert_eq!(body["candidateIndex"], 2);
        assert_eq!(body["totalStreams"], 3);
        assert_eq!(body["stream"]["title"], "Real 1080p");
    }
}

#[tokio::test]
async fn redirect_to_the_selected_stream() {
    let base = common::spawn_fixture().await;
    let url = format!("{}/files/movie.mp4", base);

    let response = get(
        configured_app(client_returning(vec![stream(&url, "A")]), AppConfig::default()),
        "/movie/tt0111161?mode=redirect",
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], url.as_str());

    // same thing when redirect is the configured default
    let config = AppConfig {
        response_mode: ResponseMode::Redirect,
        ..Default::default()
    };
    let response = get(
        configured_app(client_returning(vec![stream(&url, "A")]), config),
        "/movie/tt0111161",
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn render_a_player_page() {
    let base = common::spawn_fixture().await;
    let url = format!("{}/files/movie.mp4", base);

    let response = get(
        configured_app(client_returning(vec![stream(&url, "<Movie>")]), AppConfig::default()),
        "/movie/tt0111161?mode=player",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );

    let page = text_body(response).await;
    assert!(page.contains(&format!(r#"src="{}""#, url)));
    assert!(page.contains("&lt;Movie&gt;"));
}

#[tokio::test]
async fn serve_every_stream_as_a_playlist_without_probing() {
    // nothing here is reachable, the unfiltered playlist never probes
    let streams = vec![
        stream(&unreachable("a.mkv"), "Source A 1080p 2.1GB"),
        stream(&unreachable("b.mp4"), "Source B 720p"),
    ];

    let response = get(
        configured_app(client_returning(streams), AppConfig::default()),
        "/movie/tt0111161?mode=playlist",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.apple.mpegurl"
    );
    assert!(response.headers().get(header::CONTENT_ENCODING).is_none());

    let playlist = text_body(response).await;
    assert!(playlist.starts_with("#EXTM3U\n#EXT-X-VERSION:3\n"));
    assert_eq!(playlist.matches("#EXTINF").count(), 2);
    assert!(playlist.contains("BANDWIDTH=8000000"));
    assert!(playlist.contains("BANDWIDTH=5000000"));
}

#[tokio::test]
async fn gzip_playlists_when_the_client_accepts_it() {
    let streams = vec![stream("https://cdn.example/a.mkv", "Source A 1080p")];
    let app = configured_app(client_returning(streams), AppConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/movie/tt0111161?mode=m3u8")
                .header(header::ACCEPT_ENCODING, "gzip, deflate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let mut playlist = String::new();
    GzDecoder::new(&bytes[..]).read_to_string(&mut playlist).unwrap();
    assert!(playlist.contains("https://cdn.example/a.mkv"));
}

#[tokio::test]
async fn limit_a_filtered_playlist_to_the_selected_stream() {
    let base = common::spawn_fixture().await;
    let streams = vec![
        stream(&format!("{}/files/movie.mp4", base), "A 1080p"),
        stream(&format!("{}/files/movie.mkv", base), "B 720p"),
    ];

    let response = get(
        configured_app(client_returning(streams), AppConfig::default()),
        "/movie/tt0111161?mode=playlist&format=mkv",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let playlist = text_body(response).await;
    assert_eq!(playlist.matches("#EXTINF").count(), 1);
    assert!(playlist.contains(&format!("{}/files/movie.mkv", base)));
}
