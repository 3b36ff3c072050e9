mod common;

use std::time::Duration;

use addon_proxy::{AddonClient, AddonClientTrait, MediaRequest};
use addon_proxy::server::error::Error;

fn client(base: &str) -> AddonClient {
    AddonClient::new(
        format!("{}/addon", base),
        reqwest::Client::new(),
        Duration::from_secs(5),
    )
}

#[test]
fn build_stremio_style_urls() {
    let client = client("https://addon.example");

    assert_eq!(
        client.stream_url(&MediaRequest::Movie {
            imdb: "tt0111161".into()
        }),
        "https://addon.example/addon/stream/movie/tt0111161.json"
    );
    assert_eq!(
        client.stream_url(&MediaRequest::Episode {
            imdb: "tt0903747".into(),
            season: 5,
            episode: 14,
        }),
        "https://addon.example/addon/stream/series/tt0903747:5:14.json"
    );
}

#[tokio::test]
async fn fetch_movie_and_episode_streams() {
    let base = common::spawn_fixture().await;
    let client = client(&base);

    let movie = client
        .fetch_streams(&MediaRequest::Movie {
            imdb: common::MOVIE_ID.into(),
        })
        .await
        .unwrap();
    assert_eq!(movie.len(), 2);
    assert_eq!(movie[1].title.as_deref(), Some("Movie 1080p 2.1GB"));

    let episode = client
        .fetch_streams(&MediaRequest::Episode {
            imdb: common::MOVIE_ID.into(),
            season: 1,
            episode: 2,
        })
        .await
        .unwrap();
    assert_eq!(episode.len(), 1);
    assert_eq!(episode[0].name.as_deref(), Some("Episode 720p"));
}

#[tokio::test]
async fn treat_missing_streams_key_as_empty() {
    let base = common::spawn_fixture().await;
    let client = client(&base);

    for imdb in [common::MISSING_STREAMS_ID, common::EMPTY_STREAMS_ID] {
        let streams = client
            .fetch_streams(&MediaRequest::Movie { imdb: imdb.into() })
            .await
            .unwrap();
        assert!(streams.is_empty());
    }
}

#[tokio::test]
async fn surface_upstream_failures() {
    let base = common::spawn_fixture().await;

    let not_found = client(&base)
        .fetch_streams(&MediaRequest::Movie {
            imdb: "tt9999999".into(),
        })
        .await;
    assert!(matches!(not_found, Err(Error::Upstream(msg)) if msg.contains("404")));

    let unreachable = AddonClient::new(
        common::unreachable("addon"),
        reqwest::Client::new(),
        Duration::from_secs(5),
    )
    .fetch_streams(&MediaRequest::Movie {
        imdb: common::MOVIE_ID.into(),
    })
    .await;
    assert!(matches!(unreachable, Err(Error::Upstream(_))));
}
