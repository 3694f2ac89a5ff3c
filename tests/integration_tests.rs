//! Integration tests for the translation client
//!
//! These tests run the whole lookup chain against a mocked translation
//! service and temporary snapshot files.

use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use polyglot_client::{ClientConfig, Language, PolyglotClient, RetryConfig, TranslationParams};

const PRODUCT_PATH: &str = "/products/test.ai.boost";
const LISTING_PATH: &str = "/products/test.ai.boost/strings";

// ==================== Test Helpers ====================

fn create_test_config(api_url: &str) -> ClientConfig {
    ClientConfig::new(
        "test-token",
        "test.ai.boost",
        [Language::ENGLISH, Language::BRAZILIAN_PORTUGUESE, Language::RUSSIAN],
    )
    .with_api_url(api_url)
    .with_alias(Language::PORTUGUESE, Language::BRAZILIAN_PORTUGUESE)
    .with_retry(RetryConfig::disabled())
}

async fn mount_registration(mock_server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path(PRODUCT_PATH))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(mock_server)
        .await;
}

async fn mount_share_creation(mock_server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path("/products/test.ai.boost/strings/BTN_SHARE"))
        .and(body_json(json!({
            "translations": { "en": "Share" },
            "description": "Mobile app"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stringId": "BTN_SHARE",
            "description": "Mobile app",
            "translations": {
                "en": { "value": "Share" },
                "ru": { "value": "Поделиться" },
                "pt-BR": { "value": "Compartilhar" }
            }
        })))
        .expect(1)
        .mount(mock_server)
        .await;
}

async fn request_count(mock_server: &MockServer, request_path: &str) -> usize {
    mock_server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

fn listing_body() -> serde_json::Value {
    json!([
        {
            "stringId": "BTN_SHARE",
            "translations": {
                "en": { "value": "Share" },
                "ru": { "value": "Поделиться" }
            }
        },
        {
            "stringId": "Crop",
            "description": "Image processing tool",
            "translations": { "ru": { "value": "Обрезать" } }
        }
    ])
}

// ==================== Lookup Chain Tests ====================

#[tokio::test]
async fn test_get_or_translate_then_cached_lookup() {
    let mock_server = MockServer::start().await;
    mount_registration(&mock_server).await;
    mount_share_creation(&mock_server).await;

    let client = PolyglotClient::connect(create_test_config(&mock_server.uri()))
        .await
        .expect("Should initialize");

    let params = TranslationParams::default();
    let created = client
        .get_or_translate_with(
            Language::RUSSIAN,
            "Share",
            Some("Mobile app"),
            "BTN_SHARE",
            &params,
        )
        .await;
    assert_eq!(created.as_deref(), Some("Поделиться"));

    let fetches_before = request_count(
        &mock_server,
        "/products/test.ai.boost/strings/BTN_SHARE/translations/ru",
    )
    .await;

    assert_eq!(
        client
            .get_translation(Language::RUSSIAN, "BTN_SHARE")
            .await
            .as_deref(),
        Some("Поделиться")
    );
    // Other languages from the creation response are cached too.
    assert_eq!(
        client
            .get_translation(Language::BRAZILIAN_PORTUGUESE, "BTN_SHARE")
            .await
            .as_deref(),
        Some("Compartilhar")
    );

    let fetches_after = request_count(
        &mock_server,
        "/products/test.ai.boost/strings/BTN_SHARE/translations/ru",
    )
    .await;
    assert_eq!(fetches_before, fetches_after);
    assert_eq!(client.metrics().hot_hits, 2);
}

#[tokio::test]
async fn test_aliases_agree_after_population() {
    let mock_server = MockServer::start().await;
    mount_registration(&mock_server).await;
    mount_share_creation(&mock_server).await;

    let client = PolyglotClient::connect(create_test_config(&mock_server.uri()))
        .await
        .unwrap();

    assert!(!client.has_translation(Language::PORTUGUESE, "BTN_SHARE", false).await);

    let translated = client
        .get_or_translate_with(
            Language::PORTUGUESE,
            "Share",
            Some("Mobile app"),
            "BTN_SHARE",
            &TranslationParams::default(),
        )
        .await;
    assert_eq!(translated.as_deref(), Some("Compartilhar"));

    assert!(client.has_translation(Language::PORTUGUESE, "BTN_SHARE", false).await);
    assert!(
        client
            .has_translation(Language::BRAZILIAN_PORTUGUESE, "BTN_SHARE", false)
            .await
    );
}

#[tokio::test]
async fn test_has_translation_asks_remote_after_eviction() {
    let mock_server = MockServer::start().await;
    mount_registration(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/products/test.ai.boost/strings/4K/translations/pt-BR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "language": "pt-BR",
            "translation": "4K",
            "manual": false
        })))
        .mount(&mock_server)
        .await;

    // Without the source-text fallback only a real remote value counts.
    let client = PolyglotClient::connect(
        create_test_config(&mock_server.uri()).with_base_string_as_fallback(false),
    )
    .await
    .unwrap();

    assert_eq!(
        client
            .get_or_translate(Language::BRAZILIAN_PORTUGUESE, "4K", Some("Online player"))
            .await
            .as_deref(),
        Some("4K")
    );
    assert!(client.has_translation(Language::BRAZILIAN_PORTUGUESE, "4K", false).await);

    client.evict("4K");
    assert!(!client.has_translation(Language::BRAZILIAN_PORTUGUESE, "4K", false).await);
    assert!(client.has_translation(Language::BRAZILIAN_PORTUGUESE, "4K", true).await);
    assert!(!client.has_translation(Language::RUSSIAN, "4K", true).await);
}

// ==================== Fallback Tests ====================

#[tokio::test]
async fn test_fallback_toggle_has_no_lasting_effect() {
    let mock_server = MockServer::start().await;
    mount_registration(&mock_server).await;

    let client = PolyglotClient::connect(create_test_config(&mock_server.uri()))
        .await
        .unwrap();
    let quiet = TranslationParams {
        base_string_as_fallback: Some(false),
        ..Default::default()
    };

    // Unmocked string paths answer 404, and creation of NOT_EXISTS fails too.
    assert_eq!(
        client
            .get_translation(Language::RUSSIAN, "NOT_EXISTS")
            .await
            .as_deref(),
        Some("NOT_EXISTS")
    );
    assert_eq!(
        client
            .get_or_translate_with(Language::RUSSIAN, "NOT_EXISTS", None, "NOT_EXISTS", &quiet)
            .await,
        None
    );
    assert_eq!(
        client
            .get_or_translate(Language::RUSSIAN, "NOT_EXISTS", None)
            .await
            .as_deref(),
        Some("NOT_EXISTS")
    );
}

#[tokio::test]
async fn test_instance_fallback_disabled() {
    let mock_server = MockServer::start().await;
    mount_registration(&mock_server).await;

    let config = create_test_config(&mock_server.uri()).with_base_string_as_fallback(false);
    let client = PolyglotClient::connect(config).await.unwrap();

    assert_eq!(client.get_translation(Language::RUSSIAN, "NOT_EXISTS").await, None);

    let loud = TranslationParams {
        base_string_as_fallback: Some(true),
        ..Default::default()
    };
    assert_eq!(
        client
            .get_or_translate_with(Language::RUSSIAN, "NOT_EXISTS", None, "NOT_EXISTS", &loud)
            .await
            .as_deref(),
        Some("NOT_EXISTS")
    );
}

#[tokio::test]
async fn test_unconfigured_language_returns_source_without_request() {
    let mock_server = MockServer::start().await;
    mount_registration(&mock_server).await;

    let client = PolyglotClient::connect(create_test_config(&mock_server.uri()))
        .await
        .unwrap();
    let requests_before = mock_server.received_requests().await.unwrap().len();

    let indonesian = Language::from_code("id").unwrap();
    assert_eq!(
        client.get_translation(indonesian, "Crop").await.as_deref(),
        Some("Crop")
    );
    assert_eq!(mock_server.received_requests().await.unwrap().len(), requests_before);
}

// ==================== Preload Tests ====================

#[tokio::test]
async fn test_concurrent_preload_lists_once() {
    let mock_server = MockServer::start().await;
    mount_registration(&mock_server).await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing_body())
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PolyglotClient::connect(create_test_config(&mock_server.uri()))
        .await
        .unwrap();

    let started = [client.preload(), client.preload(), client.preload()];
    assert_eq!(started, [true, false, false]);

    let (first, second, translation) = tokio::join!(
        client.wait_for_preload(),
        client.wait_for_preload(),
        client.get_translation(Language::RUSSIAN, "Crop"),
    );
    assert_eq!(first, Some(2));
    assert_eq!(second, Some(2));
    assert_eq!(translation.as_deref(), Some("Обрезать"));
    assert_eq!(client.metrics().snapshot_hits, 1);
}

#[tokio::test]
async fn test_snapshot_hits_are_not_copied_to_hot_cache() {
    let mock_server = MockServer::start().await;
    mount_registration(&mock_server).await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri()).with_preload(true);
    let client = PolyglotClient::connect(config).await.unwrap();

    for _ in 0..2 {
        assert_eq!(
            client
                .get_translation(Language::RUSSIAN, "BTN_SHARE")
                .await
                .as_deref(),
            Some("Поделиться")
        );
    }

    let report = client.metrics();
    assert_eq!(report.snapshot_hits, 2);
    assert_eq!(report.hot_hits, 0);
    assert_eq!(report.remote_fetches, 0);
}

#[tokio::test]
async fn test_failed_preload_falls_through_to_fetch() {
    let mock_server = MockServer::start().await;
    mount_registration(&mock_server).await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/test.ai.boost/strings/Crop/translations/ru"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "language": "ru",
            "translation": "Обрезка",
            "manual": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri()).with_preload(true);
    let client = PolyglotClient::connect(config).await.unwrap();

    assert_eq!(client.wait_for_preload().await, Some(0));
    assert_eq!(
        client.get_translation(Language::RUSSIAN, "Crop").await.as_deref(),
        Some("Обрезка")
    );
}

#[tokio::test]
async fn test_disk_snapshot_shared_between_instances() {
    let temp_dir = TempDir::new().unwrap();
    let cache_path = temp_dir.path().join("polyglot-cache.json");

    // First instance registers, lists and writes the snapshot file.
    let first_server = MockServer::start().await;
    mount_registration(&first_server).await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
        .expect(1)
        .mount(&first_server)
        .await;

    let first = PolyglotClient::connect(
        create_test_config(&first_server.uri())
            .with_preload(true)
            .with_cache_path(&cache_path),
    )
    .await
    .unwrap();
    assert_eq!(first.wait_for_preload().await, Some(2));
    assert!(cache_path.exists());

    // Second instance finds the file: no registration, no listing.
    let second_server = MockServer::start().await;
    let second = PolyglotClient::connect(
        create_test_config(&second_server.uri())
            .with_preload(true)
            .with_cache_path(&cache_path),
    )
    .await
    .unwrap();

    assert_eq!(second.wait_for_preload().await, Some(2));
    assert_eq!(
        second
            .get_translation(Language::RUSSIAN, "BTN_SHARE")
            .await
            .as_deref(),
        Some("Поделиться")
    );
    assert!(second_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_token_fails_init() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(PRODUCT_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&mock_server)
        .await;

    let result = PolyglotClient::connect(create_test_config(&mock_server.uri())).await;

    let err = result.unwrap_err();
    assert!(format!("{}", err).contains("403"));
}
