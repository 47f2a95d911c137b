//! Integration tests for share-input classification and the HTTP redirect probe.

use std::sync::Arc;
use std::time::Duration;

use url::Url;
use vidshare_core::classifier::{
    Candidate, HttpRedirectProbe, PROBE_ATTEMPTS, RedirectProbe, probe_with_retry,
};
use vidshare_core::{Classifier, ErrorKind, HttpTimeouts, Platform};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

fn probe() -> HttpRedirectProbe {
    HttpRedirectProbe::new(HttpTimeouts {
        connect: Duration::from_secs(2),
        request: Duration::from_secs(2),
    })
    .unwrap()
}

#[tokio::test]
async fn test_http_probe_follows_redirect_chain() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/s/iRNBho6u/"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/hop", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hop"))
        .respond_with(
            ResponseTemplate::new(301).insert_header(
                "Location",
                format!("{}/video/7298145681699622182", server.uri()).as_str(),
            ),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/video/7298145681699622182"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let start = Url::parse(&format!("{}/s/iRNBho6u/", server.uri())).unwrap();
    let target = probe().resolve_redirect(&start).await.unwrap();
    assert_eq!(target.path(), "/video/7298145681699622182");
}

#[tokio::test]
async fn test_http_probe_accepts_client_error_final_page() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let start = Url::parse(&format!("{}/gone", server.uri())).unwrap();
    let target = probe().resolve_redirect(&start).await.unwrap();
    assert_eq!(target, start);
}

#[tokio::test]
async fn test_probe_with_retry_retries_once_then_fails() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .expect(u64::from(PROBE_ATTEMPTS))
        .mount(&server)
        .await;

    let start = Url::parse(&format!("{}/flaky", server.uri())).unwrap();
    let err = probe_with_retry(&probe(), &start, Duration::from_secs(2))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionNetworkError);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_probe_with_retry_times_out_each_attempt() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let start = Url::parse(&format!("{}/slow", server.uri())).unwrap();
    let err = probe_with_retry(&probe(), &start, Duration::from_millis(200))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionNetworkError);
    assert!(err.to_string().contains("timed out"), "got: {err}");
}

#[tokio::test]
async fn test_classifier_short_link_unreachable_is_network_error() {
    // Port 9 (discard) on localhost is closed in test environments.
    let classifier = Classifier::new(Arc::new(probe()), Duration::from_secs(1));
    let candidate = classifier.detect("https://v.douyin.com/iRNBho6u/").unwrap();
    assert!(matches!(candidate, Candidate::ShortLink { platform: Platform::Douyin, .. }));

    let unreachable = Candidate::ShortLink {
        platform: Platform::Douyin,
        url: Url::parse("http://127.0.0.1:9/s/abc").unwrap(),
    };
    let err = classifier.finish(unreachable).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionNetworkError);
}

#[test]
fn test_classifier_detects_each_platform_url_form() {
    let classifier = Classifier::new(Arc::new(probe()), Duration::from_secs(1));
    let cases = [
        ("https://www.douyin.com/video/7298145681699622182", Platform::Douyin, "7298145681699622182"),
        ("https://www.douyin.com/note/7298145681699622182", Platform::Douyin, "7298145681699622182"),
        ("https://www.douyin.com/discover?modal_id=7298145681699622182", Platform::Douyin, "7298145681699622182"),
        ("https://www.tiktok.com/@scout2015/video/6718335390845095173", Platform::TikTok, "6718335390845095173"),
        ("https://m.tiktok.com/v/6718335390845095173.html", Platform::TikTok, "6718335390845095173"),
        ("https://www.bilibili.com/video/BV1GJ411x7h7/?p=2", Platform::Bilibili, "BV1GJ411x7h7"),
        ("BV1GJ411x7h7", Platform::Bilibili, "BV1GJ411x7h7"),
    ];

    for (input, platform, token) in cases {
        match classifier.detect(input).unwrap() {
            Candidate::Resolved(id) => {
                assert_eq!(id.platform(), platform, "input: {input}");
                assert_eq!(id.token(), token, "input: {input}");
            }
            Candidate::ShortLink { .. } => panic!("expected resolved candidate for {input}"),
        }
    }
}
