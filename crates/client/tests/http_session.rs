//! End-to-end tests: an `EditSession` driving a real `livetext-api` server
//! over HTTP through `HttpLedgerClient`.

use std::sync::Arc;

use assert_matches::assert_matches;
use livetext_api::auth::jwt::{generate_access_token, JwtConfig};
use livetext_api::config::ServerConfig;
use livetext_api::router::build_app_router;
use livetext_api::state::AppState;
use livetext_client::HttpLedgerClient;
use livetext_core::error::CoreError;
use livetext_core::ledger::{LedgerGateway, LedgerStore, MemoryLedger};
use livetext_core::session::EditSession;
use livetext_core::text_field::{SaveAction, SaveEntry};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "client-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        history_retention_keep: None,
        history_retention_interval_secs: 86_400,
    }
}

/// Serve the real router on an ephemeral port and return its base URL.
async fn spawn_server(ledger: Arc<MemoryLedger>) -> String {
    let config = test_config();
    let store: Arc<dyn LedgerStore> = ledger;
    let state = AppState {
        ledger: store,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str, subject: &str, role: &str) -> HttpLedgerClient {
    let token = generate_access_token(subject, role, &test_config().jwt).unwrap();
    HttpLedgerClient::new(base_url).with_token(token)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_key_and_version_are_none() {
    let base_url = spawn_server(Arc::new(MemoryLedger::new())).await;
    let client = client(&base_url, "ada@example.com", "editor");

    assert!(client.get_current("never-saved").await.unwrap().is_none());
    assert!(client.get_version("never-saved", 1).await.unwrap().is_none());
    assert!(client.list_history("never-saved", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn dot_segment_keys_are_rejected_over_http() {
    let ledger = Arc::new(MemoryLedger::new());
    let base_url = spawn_server(Arc::clone(&ledger)).await;
    let client = client(&base_url, "ada@example.com", "editor");

    for key in [".", ".."] {
        let result = client.batch_save(&[SaveEntry::new(key, "saved")]).await;
        assert_matches!(result, Err(CoreError::Validation(_)), "key {key:?}");
        assert!(ledger.get_current(key).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn dotted_keys_round_trip_over_http() {
    let ledger = Arc::new(MemoryLedger::new());
    let base_url = spawn_server(Arc::clone(&ledger)).await;
    let client = client(&base_url, "ada@example.com", "editor");

    for key in ["home.hero.title", "a..b", "footer."] {
        client
            .batch_save(&[SaveEntry::new(key, "first")])
            .await
            .unwrap();
        client
            .batch_save(&[SaveEntry::new(key, "second")])
            .await
            .unwrap();

        let field = client.get_current(key).await.unwrap().expect("field saved");
        assert_eq!(field.key, key);
        assert_eq!(field.content, "second");

        let history = client.list_history(key, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].key, key);
        assert_eq!(history[0].content, "first");
    }
}

#[tokio::test]
async fn session_edits_undo_and_save_over_http() {
    let ledger = Arc::new(MemoryLedger::new());
    ledger
        .batch_save(&[SaveEntry::new("hero-title", "Welcome")], "grace@example.com")
        .await
        .unwrap();
    let base_url = spawn_server(Arc::clone(&ledger)).await;

    let mut session = EditSession::new(client(&base_url, "ada@example.com", "editor"));
    assert_eq!(session.get_current("hero-title", "").await.unwrap(), "Welcome");

    session.stage("hero-title", "Welcome 2");
    session.stage("hero-title", "Welcome 3");
    session.undo();
    assert_eq!(session.pending().get("hero-title"), Some("Welcome 2"));

    let outcomes = session.save_all().await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].action, SaveAction::Versioned);
    assert_eq!(outcomes[0].version_number, Some(1));

    let field = ledger.get_current("hero-title").await.unwrap().unwrap();
    assert_eq!(field.content, "Welcome 2");
    assert_eq!(field.updated_by, "ada@example.com");

    let history = session.list_history("hero-title", 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "Welcome");
    assert_eq!(history[0].created_by, "grace@example.com");
}

#[tokio::test]
async fn restore_over_http_stages_old_content() {
    let ledger = Arc::new(MemoryLedger::new());
    for content in ["A", "B", "C"] {
        ledger
            .batch_save(&[SaveEntry::new("k", content)], "grace@example.com")
            .await
            .unwrap();
    }
    let base_url = spawn_server(Arc::clone(&ledger)).await;
    let mut session = EditSession::new(client(&base_url, "ada@example.com", "admin"));

    let record = session.restore("k", 1).await.unwrap();
    assert_eq!(record.content, "A");
    assert_matches!(session.restore("k", 7).await, Err(CoreError::NotFound { .. }));

    session.save_all().await.unwrap();
    assert_eq!(ledger.get_current("k").await.unwrap().unwrap().content, "A");
    assert_eq!(ledger.list_history("k", 10).await.unwrap().len(), 3);
}

#[tokio::test]
async fn forbidden_save_keeps_pending_state() {
    let ledger = Arc::new(MemoryLedger::new());
    let base_url = spawn_server(Arc::clone(&ledger)).await;
    let mut session = EditSession::new(client(&base_url, "guest@example.com", "viewer"));

    session.stage("k", "draft");
    assert_matches!(session.save_all().await, Err(CoreError::Forbidden(_)));
    assert_eq!(session.pending().get("k"), Some("draft"));
    assert!(ledger.get_current("k").await.unwrap().is_none());
}

#[tokio::test]
async fn unreachable_server_is_a_storage_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut session = EditSession::new(
        HttpLedgerClient::new(format!("http://{addr}")).with_token("irrelevant"),
    );
    session.stage("k", "draft");
    assert_matches!(session.save_all().await, Err(CoreError::Storage(_)));
    assert!(session.signals().has_pending_changes);
}
