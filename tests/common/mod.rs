//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use toolkeeper::config::{Settings, SettingsLoader};
use toolkeeper::http::AppState;
use toolkeeper::lifecycle::{compose_with_database, Application, Shutdown, Startup, StartupError};
use toolkeeper::persistence::{ContextFactory, MigrationReport, PersistenceError, Session};

/// Start a mock model API that answers every request with a fixed response.
pub async fn start_mock_backend(status: u16, body: &'static str) -> SocketAddr {
    start_programmable_backend(move || async move { (status, body.to_string()) }).await
}

/// Start a mock model API whose response is computed per request.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 2048];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Complete settings pointing the model API at `port`.
pub fn settings_for(port: u16, timeout_secs: u64) -> Settings {
    let toml = format!(
        r#"
        [server]
        bind_address = "127.0.0.1:0"

        [app_settings.model_api]
        host = "127.0.0.1"
        port = {port}
        timeout_secs = {timeout_secs}

        [connection_strings]
        default_connection = "postgres://toolkeeper@localhost/toolkeeper"
        "#
    );

    SettingsLoader::new()
        .toml_str(toml)
        .env_vars(Vec::<(String, String)>::new())
        .load()
        .unwrap()
}

/// In-memory stand-in for PostgreSQL.
///
/// Sessions are never available; migrations succeed or fail on demand and
/// are counted.
pub struct FakeDatabase {
    fail_migration: bool,
    migrations: AtomicUsize,
}

impl FakeDatabase {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self {
            fail_migration: false,
            migrations: AtomicUsize::new(0),
        })
    }

    pub fn broken_schema() -> Arc<Self> {
        Arc::new(Self {
            fail_migration: true,
            migrations: AtomicUsize::new(0),
        })
    }

    pub fn migrations(&self) -> usize {
        self.migrations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextFactory for FakeDatabase {
    async fn session(&self) -> Result<Session, PersistenceError> {
        Err(PersistenceError::Unavailable("database offline".into()))
    }

    async fn migrate(&self) -> Result<MigrationReport, PersistenceError> {
        self.migrations.fetch_add(1, Ordering::SeqCst);
        if self.fail_migration {
            return Err(PersistenceError::Unavailable("migration 20240301000000 failed".into()));
        }
        Ok(MigrationReport {
            available: 1,
            elapsed: Duration::from_millis(1),
        })
    }
}

/// Compose and prepare an application over a fake database.
pub async fn prepare(
    settings: Settings,
    db: Arc<FakeDatabase>,
    routes: Router<AppState>,
) -> Result<Application, StartupError> {
    let state = compose_with_database(settings, db)?;
    Startup::new(state).prepare(routes).await
}

/// A running backend bound to a loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    handle: tokio::task::JoinHandle<Result<(), StartupError>>,
}

impl TestServer {
    pub async fn start(application: Application) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();
        let receiver: broadcast::Receiver<()> = shutdown.subscribe();

        let handle = tokio::spawn(application.serve(listener, receiver));

        Self { addr, shutdown, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not drain in time")
            .expect("server task panicked");
        assert!(result.is_ok());
    }
}
