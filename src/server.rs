//! Server lifecycle.
//!
//! A [`Server`] moves through `Idle → Starting → Listening → Draining →
//! Stopped`. The listener task, the signal watcher and an optional external
//! trigger all report on one termination channel; the first event wins and
//! starts the drain. In-flight requests get [`SHUTDOWN_DEADLINE`] to finish
//! before every open connection is aborted.
//!
//! Connections are served over HTTP/1.1 and must deliver their request
//! headers within [`HEADER_READ_TIMEOUT`].

use crate::api::middleware::{client_ip_middleware, handle_panic, make_request_span};
use crate::config::{ConfigError, ServerConfig};
use axum::Router;
use axum::extract::ConnectInfo;
use axum::http::Request;
use futures::FutureExt;
use futures::future::BoxFuture;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::fmt;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, TraceLayer};
use tracing::{Level, debug, error, info, warn};


/// Time in-flight requests get to finish once draining starts.
pub const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(30);

/// Time a connection gets to send complete request headers.
pub const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Lifecycle phase, published on [`Server::phase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, not yet running.
    Idle,
    /// Building the handler chain and binding.
    Starting,
    /// Accepting connections on `addr`.
    Listening {
        /// Bound address.
        addr: SocketAddr,
    },
    /// Refusing new connections, waiting for in-flight requests.
    Draining,
    /// Fully shut down.
    Stopped,
}

/// First event that ended the listening phase.
#[derive(Debug)]
pub enum Termination {
    /// OS signal or external trigger, by name.
    Signal(String),
    /// The listener could not bind or failed while serving.
    ListenerFailed(io::Error),
    /// The listener stopped on its own.
    ListenerExited,
}

impl Termination {
    /// Whether the process should exit non-zero.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Signal(_))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(name) => write!(f, "signal {}", name),
            Self::ListenerFailed(err) => write!(f, "listener failed: {}", err),
            Self::ListenerExited => write!(f, "listener exited"),
        }
    }
}

/// How draining ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request finished before the deadline.
    Clean,
    /// The deadline passed and the remaining connections were aborted.
    Forced,
}

/// Result of a full server run.
#[derive(Debug)]
pub struct ShutdownReport {
    /// What ended the listening phase.
    pub cause: Termination,
    /// How draining ended.
    pub outcome: DrainOutcome,
}

/// HTTP server owning the router and its lifecycle.
pub struct Server {
    config: ServerConfig,
    router: Router,
    drain_deadline: Duration,
    header_read_timeout: Duration,
    phase: watch::Sender<Phase>,
}

impl Server {
    /// Creates a server for `router` after validating `config`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for an empty host or port 0.
    pub fn new(config: ServerConfig, router: Router) -> Result<Self, ConfigError> {
        config.validate()?;
        let (phase, _) = watch::channel(Phase::Idle);
        Ok(Self {
            config,
            router,
            drain_deadline: SHUTDOWN_DEADLINE,
            header_read_timeout: HEADER_READ_TIMEOUT,
            phase,
        })
    }

    /// Overrides the drain deadline.
    #[must_use]
    pub fn with_drain_deadline(mut self, deadline: Duration) -> Self {
        self.drain_deadline = deadline;
        self
    }

    /// Overrides the header-read timeout.
    #[must_use]
    pub fn with_header_read_timeout(mut self, timeout: Duration) -> Self {
        self.header_read_timeout = timeout;
        self
    }

    /// Subscribes to phase changes.
    #[must_use]
    pub fn phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Runs until SIGINT, SIGTERM or a listener failure.
    pub async fn run(self) -> ShutdownReport {
        self.run_until(std::future::pending()).await
    }

    /// Runs until `trigger` resolves, a termination signal arrives or the
    /// listener fails. The string `trigger` yields names the cause.
    pub async fn run_until<F>(self, trigger: F) -> ShutdownReport
    where
        F: Future<Output = String> + Send + 'static,
    {
        let Self {
            config,
            router,
            drain_deadline,
            header_read_timeout,
            phase,
        } = self;

        phase.send_replace(Phase::Starting);
        info!(address = %config.address(), debug = config.debug, "starting HTTP server");

        let app = layered(router);
        let (term_tx, mut term_rx) = mpsc::channel::<Termination>(1);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (force_tx, force_rx) = watch::channel(false);

        // Signal handlers are installed here, before binding.
        let signal = termination_signal();
        let signal_tx = term_tx.clone();
        let signals = tokio::spawn(async move {
            let name = signal.await;
            let _ = signal_tx.send(Termination::Signal(name)).await;
        });

        let listener = Listener {
            config,
            app,
            header_read_timeout,
            phase: phase.clone(),
            events: term_tx.clone(),
            cancel: cancel_rx,
            force: force_rx,
        };
        let mut handle = tokio::spawn(listener.run());

        let trigger_tx = term_tx;
        let external = tokio::spawn(async move {
            let name = trigger.await;
            let _ = trigger_tx.send(Termination::Signal(name)).await;
        });

        let cause = term_rx.recv().await.unwrap_or(Termination::ListenerExited);
        drop(term_rx);
        signals.abort();
        external.abort();

        phase.send_replace(Phase::Draining);
        if cause.is_failure() {
            error!(cause = %cause, "shutting down HTTP server");
        } else {
            info!(cause = %cause, "shutting down HTTP server");
        }
        let _ = cancel_tx.send(true);

        let outcome = match tokio::time::timeout(drain_deadline, &mut handle).await {
            Ok(_) => {
                info!("HTTP server shut down cleanly");
                DrainOutcome::Clean
            }
            Err(_) => {
                let _ = force_tx.send(true);
                let _ = (&mut handle).await;
                error!(
                    deadline = ?drain_deadline,
                    "shutdown deadline exceeded, open connections aborted"
                );
                DrainOutcome::Forced
            }
        };

        phase.send_replace(Phase::Stopped);
        info!("exited");
        ShutdownReport { cause, outcome }
    }
}

/// Wraps `router` in the handler chain. Outermost first: CORS, request id
/// assignment and propagation, client IP, request span, panic recovery.
fn layered(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_request(DefaultOnRequest::new().level(Level::INFO)),
        )
        .layer(axum::middleware::from_fn(client_ip_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}

/// Accept loop and the connections it spawned.
struct Listener {
    config: ServerConfig,
    app: Router,
    header_read_timeout: Duration,
    phase: watch::Sender<Phase>,
    events: mpsc::Sender<Termination>,
    cancel: watch::Receiver<bool>,
    force: watch::Receiver<bool>,
}

impl Listener {
    /// Binds, accepts until cancelled or failed, then drains.
    ///
    /// A bind or accept failure is sent as the termination event. Draining
    /// waits for every connection unless `force` is raised, in which case
    /// all of them are aborted before returning.
    async fn run(self) {
        let Self {
            config,
            app,
            header_read_timeout,
            phase,
            events,
            mut cancel,
            mut force,
        } = self;

        let listener = match TcpListener::bind((config.host.as_str(), config.port)).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(address = %config.address(), error = %e, "failed to bind listener");
                let _ = events.send(Termination::ListenerFailed(e)).await;
                return;
            }
        };
        let addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                let _ = events.send(Termination::ListenerFailed(e)).await;
                return;
            }
        };
        phase.send_replace(Phase::Listening { addr });
        info!(%addr, "HTTP server listening");
        info!("Swagger UI available at http://{}/swagger-ui/", addr);

        let mut builder = http1::Builder::new();
        builder.timer(TokioTimer::new()).header_read_timeout(header_read_timeout);
        let mut connections = JoinSet::new();

        let failure = loop {
            tokio::select! {
                () = raised(&mut cancel) => break None,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        connections.spawn(serve_connection(
                            builder.clone(),
                            stream,
                            peer,
                            app.clone(),
                            cancel.clone(),
                        ));
                    }
                    Err(e) if is_transient(&e) => {
                        debug!(error = %e, "accept failed");
                    }
                    Err(e) => break Some(e),
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        };
        drop(listener);

        if let Some(e) = failure {
            error!(%addr, error = %e, "listener failed");
            let _ = events.send(Termination::ListenerFailed(e)).await;
            raised(&mut cancel).await;
        }
        drop(events);
        info!(open = connections.len(), "listener closed, draining connections");

        loop {
            tokio::select! {
                biased;
                () = raised(&mut force) => {
                    connections.abort_all();
                    while connections.join_next().await.is_some() {}
                    return;
                }
                next = connections.join_next() => {
                    if next.is_none() {
                        return;
                    }
                }
            }
        }
    }
}

/// Serves one connection, finishing its current request once `cancel` is
/// raised.
async fn serve_connection(
    builder: http1::Builder,
    stream: TcpStream,
    peer: SocketAddr,
    app: Router,
    mut cancel: watch::Receiver<bool>,
) {
    let service = service_fn(move |mut request: Request<Incoming>| {
        request.extensions_mut().insert(ConnectInfo(peer));
        app.clone().oneshot(request)
    });

    let conn = builder.serve_connection(TokioIo::new(stream), service);
    let mut conn = std::pin::pin!(conn);
    let result = tokio::select! {
        result = conn.as_mut() => result,
        () = raised(&mut cancel) => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };

    if let Err(e) = result {
        debug!(%peer, error = %e, "connection closed with error");
    }
}

/// Resolves once `flag` is true or its sender is gone.
async fn raised(flag: &mut watch::Receiver<bool>) {
    let _ = flag.wait_for(|raised| *raised).await;
}

/// Accept errors that concern a single connection, not the listener.
fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
    )
}

/// Watches SIGINT and SIGTERM. The handlers are installed on call.
#[cfg(unix)]
fn termination_signal() -> BoxFuture<'static, String> {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
        (Ok(mut interrupt), Ok(mut terminate)) => async move {
            tokio::select! {
                _ = interrupt.recv() => "SIGINT".to_string(),
                _ = terminate.recv() => "SIGTERM".to_string(),
            }
        }
        .boxed(),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "failed to install signal handlers");
            std::future::pending().boxed()
        }
    }
}

#[cfg(not(unix))]
fn termination_signal() -> BoxFuture<'static, String> {
    async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "ctrl-c".to_string(),
            Err(e) => {
                warn!(error = %e, "failed to install ctrl-c handler");
                std::future::pending().await
            }
        }
    }
    .boxed()
}
