//! Connection server client tests
//!
//! Tests for the bearer token session against an in-process mock server:
//! login on first use, refresh on 401, fallback to login, and the single
//! retry bound; and the UAG basic-auth client.

mod common;

use common::{connection_server_settings, mock_connection_server, MockBehaviour};
use horizon_exporter::error::ExporterError;
use horizon_exporter::horizon::{ConnectionServerClient, UagClient};
use serde_json::json;

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_retried_once() {
    // Given: Login hands out a token the monitoring endpoint rejects
    let behaviour = MockBehaviour {
        gateways: json!([{"name": "gw1", "active_connection_count": 3}]),
        ..MockBehaviour::default()
    };
    let (url, counters) = mock_connection_server(behaviour).await;
    let client = ConnectionServerClient::new(connection_server_settings(&url)).unwrap();

    // When: Querying gateways
    let gateways = client.monitor_gateways().await.expect("query should succeed");

    // Then: One login, one refresh, and exactly two GETs reached the server
    assert_eq!(gateways, json!([{"name": "gw1", "active_connection_count": 3}]));
    assert_eq!(counters.logins(), 1);
    assert_eq!(counters.refreshes(), 1);
    assert_eq!(counters.gets(), 2);

    let stats = client.auth_stats();
    assert_eq!(stats.logins, 1);
    assert_eq!(stats.refreshes, 1);
}

#[tokio::test]
async fn test_valid_token_is_reused_across_requests() {
    // Given: Login hands out a token that is accepted
    let behaviour = MockBehaviour {
        login_token: Some("fresh".to_string()),
        ..MockBehaviour::default()
    };
    let (url, counters) = mock_connection_server(behaviour).await;
    let client = ConnectionServerClient::new(connection_server_settings(&url)).unwrap();

    // When: Querying twice
    client.monitor_gateways().await.unwrap();
    client.monitor_connection_servers().await.unwrap();

    // Then: The session logged in once and never refreshed
    assert_eq!(counters.logins(), 1);
    assert_eq!(counters.refreshes(), 0);
    assert_eq!(counters.gets(), 2);
}

#[tokio::test]
async fn test_failed_refresh_falls_back_to_login() {
    // Given: Refresh is broken and each login hands out `login-n`
    let behaviour = MockBehaviour {
        login_token: None,
        refresh_ok: false,
        accepted_token: Some("login-2".to_string()),
        ..MockBehaviour::default()
    };
    let (url, counters) = mock_connection_server(behaviour).await;
    let client = ConnectionServerClient::new(connection_server_settings(&url)).unwrap();

    // When: Querying gateways
    let result = client.monitor_gateways().await;

    // Then: The second login's token is used for the retry
    assert!(result.is_ok(), "expected success, got {:?}", result);
    assert_eq!(counters.logins(), 2);
    assert_eq!(counters.refreshes(), 1);
    assert_eq!(counters.gets(), 2);
}

#[tokio::test]
async fn test_persistent_rejection_is_an_auth_error() {
    // Given: The monitoring endpoint rejects every token
    let behaviour = MockBehaviour {
        accepted_token: None,
        ..MockBehaviour::default()
    };
    let (url, counters) = mock_connection_server(behaviour).await;
    let client = ConnectionServerClient::new(connection_server_settings(&url)).unwrap();

    // When: Querying gateways
    let result = client.monitor_gateways().await;

    // Then: The request is retried once, then reported as an auth failure
    assert!(matches!(result, Err(ExporterError::Auth(_))));
    assert_eq!(counters.gets(), 2);
}

#[tokio::test]
async fn test_rejected_login_is_an_auth_error() {
    let behaviour = MockBehaviour {
        login_ok: false,
        ..MockBehaviour::default()
    };
    let (url, counters) = mock_connection_server(behaviour).await;
    let client = ConnectionServerClient::new(connection_server_settings(&url)).unwrap();

    let result = client.monitor_gateways().await;

    assert!(matches!(result, Err(ExporterError::Auth(_))));
    assert_eq!(counters.gets(), 0);
}

#[tokio::test]
async fn test_concurrent_rejections_refresh_once() {
    // Given: Two requests will both see the expired token
    let (url, counters) = mock_connection_server(MockBehaviour::default()).await;
    let client = ConnectionServerClient::new(connection_server_settings(&url)).unwrap();

    // When: Both endpoints are queried concurrently
    let (gateways, servers) = tokio::join!(
        client.monitor_gateways(),
        client.monitor_connection_servers()
    );

    // Then: Both succeed after a single login and a single refresh
    assert!(gateways.is_ok());
    assert!(servers.is_ok());
    assert_eq!(counters.logins(), 1);
    assert_eq!(counters.refreshes(), 1);
    assert_eq!(counters.gets(), 4);
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    // Given: A port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let client = ConnectionServerClient::new(connection_server_settings(&url)).unwrap();

    // When: Querying gateways
    let result = client.monitor_gateways().await;

    // Then: The login request fails at the transport level
    assert!(matches!(result, Err(ExporterError::Transport(_))));
}

#[test]
fn test_uag_target_forms() {
    // Given: A UAG client configured for https
    let mut settings = common::uag_settings();
    settings.scheme = "https".to_string();
    let client = UagClient::new(settings).unwrap();

    // When/Then: Bare hosts get the scheme, full URLs are kept, blanks are rejected
    assert_eq!(client.base_url("uag1").unwrap(), "https://uag1");
    assert_eq!(client.base_url(" uag1:9443 ").unwrap(), "https://uag1:9443");
    assert_eq!(
        client.base_url("http://uag1:9443/").unwrap(),
        "http://uag1:9443"
    );
    assert!(matches!(
        client.base_url("  "),
        Err(ExporterError::Config(_))
    ));
}

#[tokio::test]
async fn test_uag_stats_are_decoded() {
    // Given: A UAG serving the captured document
    let upstream = common::mock_uag(common::UAG_STATS).await;
    let client = UagClient::new(common::uag_settings()).unwrap();

    // When: Fetching its statistics
    let document = client.monitor_stats(&upstream).await.unwrap();

    // Then: The XML body is returned as a document tree
    assert_eq!(
        document["accessPointStatusAndStats"]["sessionCount"],
        json!("5")
    );
}

#[tokio::test]
async fn test_uag_rejected_credentials_are_an_auth_error() {
    let upstream = common::mock_uag(common::UAG_STATS).await;
    let mut settings = common::uag_settings();
    settings.password = secrecy::SecretString::new("wrong".into());
    let client = UagClient::new(settings).unwrap();

    let result = client.monitor_stats(&upstream).await;

    assert!(matches!(result, Err(ExporterError::Auth(_))));
}
