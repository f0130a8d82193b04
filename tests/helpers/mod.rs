use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param, query_param_is_missing},
    Mock, MockServer, ResponseTemplate,
};

use yt_reaction::config::{Config, Endpoints, RetryPolicy};

/// Config pointed at a mock server, with no courtesy delay and no retries
pub fn config(server: &MockServer, output_dir: &Path) -> Config {
    let mut config = Config::new("test-key").expect("valid api key");
    config.endpoints = Endpoints::with_base_url(&server.uri());
    config.output_dir = output_dir.to_path_buf();
    config.courtesy_delay = Duration::ZERO;
    config.retry = RetryPolicy::none();
    config
}

pub fn search_page(ids: &[&str], next_page_token: Option<&str>) -> Value {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "kind": "youtube#searchResult", "id": { "kind": "youtube#video", "videoId": id } }))
        .collect();
    match next_page_token {
        Some(token) => json!({ "items": items, "nextPageToken": token }),
        None => json!({ "items": items }),
    }
}

pub fn video_item(id: &str, channel_id: &str, views: u64) -> Value {
    json!({
        "kind": "youtube#video",
        "id": id,
        "snippet": {
            "title": format!("Video {}", id),
            "channelTitle": format!("Channel {}", channel_id),
            "channelId": channel_id,
            "publishedAt": "2024-03-15T09:30:00Z"
        },
        "statistics": { "viewCount": views.to_string(), "likeCount": "1" },
        "contentDetails": { "duration": "PT1H2M3S" }
    })
}

pub fn channel_item(id: &str, subscribers: u64) -> Value {
    json!({
        "kind": "youtube#channel",
        "id": id,
        "statistics": { "subscriberCount": subscribers.to_string(), "hiddenSubscriberCount": false }
    })
}

/// Serve `pages` in order, linking them with page tokens
pub async fn mount_search(server: &MockServer, pages: &[&[&str]]) {
    for (i, ids) in pages.iter().enumerate() {
        let next = (i + 1 < pages.len()).then(|| format!("page-{}", i + 2));
        let body = search_page(ids, next.as_deref());

        let mock = Mock::given(method("GET")).and(path("/youtube/v3/search"));
        let mock = if i == 0 {
            mock.and(query_param_is_missing("pageToken"))
        } else {
            mock.and(query_param("pageToken", format!("page-{}", i + 1)))
        };

        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }
}

pub async fn mount_videos(server: &MockServer, items: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(server)
        .await;
}

pub async fn mount_channels(server: &MockServer, items: Vec<Value>, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .expect(expected_calls)
        .mount(server)
        .await;
}
