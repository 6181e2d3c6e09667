//! End-to-end tests against a live server instance.
//!
//! Each test starts the real server on a random port with a throwaway
//! database, then drives it through the public client API.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use todo_client::{
    ApiClient, ApiError, CategoryFilter, CategoryPayload, ClientConfig, Dashboard, Filters,
    Priority, TodoPayload,
};

struct TestServer {
    addr: SocketAddr,
    dir: tempfile::TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = server::config::ServerConfig {
            jwt_secret: "integration-secret".to_string(),
            ..server::config::ServerConfig::with_base_dir(dir.path())
        };
        let state = server::init_state(&config).await.unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server::serve(listener, state));

        TestServer { addr, dir }
    }

    fn session_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("session-{name}.json"))
    }

    fn client(&self, session_path: &Path) -> ApiClient {
        ApiClient::with_config(ClientConfig {
            base_url: format!("http://{}", self.addr),
            session_path: session_path.to_path_buf(),
            ..ClientConfig::default()
        })
        .unwrap()
    }
}

fn payload(title: &str, days_from_today: i64) -> TodoPayload {
    TodoPayload {
        title: title.to_string(),
        description: String::new(),
        completed: false,
        priority: Priority::Medium,
        due_date: Utc::now().date_naive() + Duration::days(days_from_today),
        category_id: None,
    }
}

#[tokio::test]
async fn fresh_client_is_not_logged_in() {
    let server = TestServer::start().await;
    let client = server.client(&server.session_path("nobody"));

    assert!(!client.is_logged_in().await);
    assert!(matches!(
        client.list_todos().await,
        Err(ApiError::NotLoggedIn)
    ));
}

#[tokio::test]
async fn login_with_bad_password_fails() {
    let server = TestServer::start().await;
    let client = server.client(&server.session_path("alice"));

    client.register("alice", "hunter2").await.unwrap();
    let err = client.login("alice", "wrong").await.unwrap_err();

    assert!(matches!(err, ApiError::Http { status: 401, .. }));
    assert!(!client.is_logged_in().await);
}

#[tokio::test]
async fn full_flow() {
    let server = TestServer::start().await;
    let session_path = server.session_path("alice");
    let client = server.client(&session_path);

    // Register and log in
    let user = client.register("alice", "hunter2").await.unwrap();
    assert_eq!(user.username, "alice");
    client.login("alice", "hunter2").await.unwrap();
    assert!(client.is_logged_in().await);
    assert!(session_path.exists());

    let me = client.current_user().await.unwrap();
    assert_eq!(me.username, "alice");

    // Build up a dashboard
    let mut dashboard = Dashboard::load(&client).await.unwrap();
    assert!(dashboard.todos.is_empty());

    let work = dashboard
        .create_category(
            &client,
            &CategoryPayload {
                name: "Work".to_string(),
                color: "#FF0000".to_string(),
            },
        )
        .await
        .unwrap()
        .clone();

    let mut report = payload("Write report", 1);
    report.category_id = Some(work.id);
    report.priority = Priority::High;
    let report = dashboard.create_todo(&client, &report).await.unwrap().clone();

    let groceries = dashboard
        .create_todo(&client, &payload("Buy groceries", 3))
        .await
        .unwrap()
        .clone();
    let overdue = dashboard
        .create_todo(&client, &payload("Return library book", -2))
        .await
        .unwrap()
        .clone();

    assert_eq!(dashboard.todos.len(), 3);

    // Filters and counters see the same list the server holds
    let today = Utc::now().date_naive();
    let in_work = todo_client::apply(
        &dashboard.todos,
        &Filters {
            category: CategoryFilter::Only(work.id),
            ..Filters::default()
        },
        today,
    );
    assert_eq!(in_work.len(), 1);
    assert_eq!(in_work[0].id, report.id);

    let stats = todo_client::stats(&dashboard.todos, today);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 3);
    assert_eq!(stats.overdue, 1);

    // Toggle round-trips through the server
    let toggled = dashboard.toggle_todo(&client, overdue.id).await.unwrap();
    assert!(toggled.completed);
    let stats = todo_client::stats(&dashboard.todos, today);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.overdue, 0);

    // Full replace via update
    let mut renamed = TodoPayload::from(&report);
    renamed.title = "Write quarterly report".to_string();
    let updated = dashboard
        .update_todo(&client, report.id, &renamed)
        .await
        .unwrap();
    assert_eq!(updated.title, "Write quarterly report");

    // Deleting the category moves its todos to uncategorized, locally too
    dashboard.delete_category(&client, work.id).await.unwrap();
    assert!(dashboard.categories.is_empty());
    let local = dashboard
        .todos
        .iter()
        .find(|t| t.id == report.id)
        .unwrap();
    assert_eq!(local.category_id, None);
    let remote = client.get_todo(report.id).await.unwrap();
    assert_eq!(remote.category_id, None);

    // Bulk complete is best-effort per item
    let outcome = dashboard
        .complete_todos(&client, &[report.id, groceries.id])
        .await;
    assert!(outcome.all_ok());
    assert_eq!(outcome.done.len(), 2);
    assert!(dashboard.todos.iter().all(|t| t.completed));

    // Bulk move into a new category
    let home = dashboard
        .create_category(
            &client,
            &CategoryPayload {
                name: "Home".to_string(),
                color: "#00FF00".to_string(),
            },
        )
        .await
        .unwrap()
        .clone();
    let outcome = dashboard
        .move_todos(&client, &[report.id, overdue.id], Some(home.id))
        .await;
    assert!(outcome.all_ok());
    let moved = client.get_todo(overdue.id).await.unwrap();
    assert_eq!(moved.category_id, Some(home.id));

    // Unknown ids fail without affecting the rest
    let outcome = dashboard.delete_todos(&client, &[groceries.id, 99999]).await;
    assert_eq!(outcome.done, vec![groceries.id]);
    assert_eq!(outcome.failed.len(), 1);
    assert!(matches!(outcome.failed[0].1, ApiError::NotFound));
    assert_eq!(dashboard.todos.len(), 2);

    // Logout drops the session locally and revokes it remotely
    client.logout().await.unwrap();
    assert!(!client.is_logged_in().await);
    assert!(!session_path.exists());
    assert!(matches!(
        client.list_todos().await,
        Err(ApiError::NotLoggedIn)
    ));
}

#[tokio::test]
async fn stale_access_token_is_refreshed_transparently() {
    let server = TestServer::start().await;
    let session_path = server.session_path("alice");

    let client = server.client(&session_path);
    client.register("alice", "hunter2").await.unwrap();
    client.login("alice", "hunter2").await.unwrap();
    client.create_todo(&payload("Water plants", 1)).await.unwrap();

    // Corrupt the stored access token but keep the valid refresh token
    let pair = client.token_pair().await.unwrap();
    std::fs::write(
        &session_path,
        serde_json::json!({"access": "stale-garbage", "refresh": pair.refresh}).to_string(),
    )
    .unwrap();

    // A fresh client picks up the stale token, gets a 401, refreshes, retries
    let reopened = server.client(&session_path);
    let todos = reopened.list_todos().await.unwrap();
    assert_eq!(todos.len(), 1);

    // The pair was rotated and persisted
    let rotated = reopened.token_pair().await.unwrap();
    assert_ne!(rotated.access, "stale-garbage");
    assert_ne!(rotated.refresh, pair.refresh);
}

#[tokio::test]
async fn concurrent_requests_share_one_refresh() {
    let server = TestServer::start().await;
    let session_path = server.session_path("alice");

    let client = server.client(&session_path);
    client.register("alice", "hunter2").await.unwrap();
    client.login("alice", "hunter2").await.unwrap();

    let mut dashboard = Dashboard::new();
    for title in ["one", "two", "three"] {
        dashboard
            .create_todo(&client, &payload(title, 1))
            .await
            .unwrap();
    }
    let ids: Vec<i64> = dashboard.todos.iter().map(|t| t.id).collect();

    // Every parallel request starts with the same stale access token. The
    // rotated refresh token is single-use, so this only succeeds if the
    // client serializes the refresh.
    let pair = client.token_pair().await.unwrap();
    std::fs::write(
        &session_path,
        serde_json::json!({"access": "stale-garbage", "refresh": pair.refresh}).to_string(),
    )
    .unwrap();

    let reopened = server.client(&session_path);
    let outcome = dashboard.complete_todos(&reopened, &ids).await;

    assert!(outcome.all_ok(), "failed: {:?}", outcome.failed);
    assert_eq!(outcome.done.len(), 3);
    assert!(reopened.is_logged_in().await);
}

#[tokio::test]
async fn rejected_refresh_clears_the_session() {
    let server = TestServer::start().await;
    let session_path = server.session_path("alice");

    let client = server.client(&session_path);
    client.register("alice", "hunter2").await.unwrap();
    client.login("alice", "hunter2").await.unwrap();

    // Both tokens bogus: the retry path has nothing left to try
    std::fs::write(
        &session_path,
        serde_json::json!({"access": "bad", "refresh": "also-bad"}).to_string(),
    )
    .unwrap();

    let reopened = server.client(&session_path);
    let err = reopened.list_todos().await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert!(!reopened.is_logged_in().await);
    assert!(!session_path.exists());
}

#[tokio::test]
async fn logout_revokes_the_refresh_token() {
    let server = TestServer::start().await;
    let session_path = server.session_path("alice");

    let client = server.client(&session_path);
    client.register("alice", "hunter2").await.unwrap();
    client.login("alice", "hunter2").await.unwrap();

    let pair = client.token_pair().await.unwrap();
    client.logout().await.unwrap();

    // A session carrying the revoked refresh token cannot recover
    std::fs::write(
        &session_path,
        serde_json::json!({"access": "stale", "refresh": pair.refresh}).to_string(),
    )
    .unwrap();

    let reopened = server.client(&session_path);
    assert!(matches!(
        reopened.list_todos().await,
        Err(ApiError::SessionExpired)
    ));
}
