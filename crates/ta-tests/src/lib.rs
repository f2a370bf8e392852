//! Integration tests for the ta-server API.
//!
//! Each test starts its own in-process server on a free loopback port and
//! drives it through [`ta_client::TaClient`].

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use ta_client::{ClientConfig, TaClient};
use ta_server::api::create_router;
use ta_server::config::ServerConfig;
use ta_server::error::ErrorSink;
use ta_server::server::{Phase, Server, ShutdownReport};
use ta_server::state::AppState;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Returns a loopback port that was free a moment ago.
#[must_use]
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// An in-process server running on a background task.
pub struct TestServer {
    /// Bound address.
    pub addr: SocketAddr,
    trigger: oneshot::Sender<String>,
    handle: JoinHandle<ShutdownReport>,
}

impl TestServer {
    /// Starts a server with default services.
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Starts a server, optionally in debug mode.
    pub async fn start_with(debug: bool) -> Self {
        let config = loopback_config(debug);
        let state = AppState::from_config(&config);
        Self::serve(config, create_router(Arc::new(state))).await
    }

    /// Starts a server whose errors go to `sink`.
    pub async fn start_with_sink(sink: Arc<dyn ErrorSink>) -> Self {
        let config = loopback_config(false);
        let state = AppState::from_config(&config).with_error_sink(sink);
        Self::serve(config, create_router(Arc::new(state))).await
    }

    /// Starts a server for an arbitrary router on a free loopback port.
    pub async fn start_router(router: Router) -> Self {
        Self::serve(loopback_config(false), router).await
    }

    async fn serve(config: ServerConfig, router: Router) -> Self {
        let server = Server::new(config, router).expect("valid config");

        let mut phase = server.phase();
        let (trigger, rx) = oneshot::channel::<String>();
        let handle = tokio::spawn(server.run_until(async move {
            rx.await.unwrap_or_else(|_| "dropped".to_string())
        }));

        let addr = {
            let current = tokio::time::timeout(
                Duration::from_secs(5),
                phase.wait_for(|p| matches!(p, Phase::Listening { .. })),
            )
            .await
            .expect("server did not start listening")
            .expect("server stopped before listening");
            match *current {
                Phase::Listening { addr } => addr,
                _ => unreachable!(),
            }
        };

        Self {
            addr,
            trigger,
            handle,
        }
    }

    /// `http://host:port`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Typed client for this server.
    #[must_use]
    pub fn client(&self) -> TaClient {
        TaClient::new(ClientConfig {
            base_url: self.base_url(),
            timeout: Duration::from_secs(10),
        })
        .expect("build client")
    }

    /// Triggers shutdown and waits for the report.
    pub async fn shutdown(self) -> ShutdownReport {
        let Self { trigger, handle, .. } = self;
        let _ = trigger.send("test".to_string());
        tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("server did not shut down")
            .expect("server task panicked")
    }

    /// Waits for the server to stop on its own.
    pub async fn wait(self) -> ShutdownReport {
        let Self { trigger, handle, .. } = self;
        let report = tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("server did not shut down")
            .expect("server task panicked");
        drop(trigger);
        report
    }
}

fn loopback_config(debug: bool) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: free_port(),
        debug,
    }
}

/// Generates a unique user id so tests never share watchlists.
#[must_use]
pub fn unique_user(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{}_{}_{}", prefix, std::process::id(), counter)
}
