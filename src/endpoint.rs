//! Endpoint layer.
//!
//! Every service method is wrapped in an [`Endpoint`] exposing the same
//! `invoke(ctx, payload)` contract. Endpoints carry an ordered chain of
//! [`Interceptor`]s that observe the payload before the call and the result
//! after it. Interceptors run in attachment order on both sides; the first
//! one that fails aborts the call and its error becomes the result.

use crate::models::{AddPayload, FeedPayload, Insight, ListPayload, RemovePayload, TickerItem};
use crate::service::{FeedService, WatchlistService};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};


/// Error produced by the endpoint layer.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// An interceptor refused the call or its result.
    #[error("interceptor {interceptor} rejected {method}: {reason}")]
    Rejected {
        /// Interceptor name.
        interceptor: &'static str,
        /// Endpoint method name.
        method: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Per-call context handed to interceptors.
#[derive(Debug, Clone, Default)]
pub struct EndpointContext {
    /// Correlation id assigned by the transport, if any.
    pub request_id: Option<String>,
}

impl EndpointContext {
    /// Creates a context carrying the given request id.
    #[must_use]
    pub fn new(request_id: Option<String>) -> Self {
        Self { request_id }
    }
}

/// Request/response interceptor.
pub trait Interceptor: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Runs before the service call.
    ///
    /// # Errors
    /// Returning an error aborts the call; the service is not invoked.
    fn before(
        &self,
        method: &'static str,
        ctx: &EndpointContext,
        payload: &dyn Debug,
    ) -> Result<(), EndpointError>;

    /// Runs after a successful service call.
    ///
    /// # Errors
    /// Returning an error replaces the service result.
    fn after(
        &self,
        method: &'static str,
        ctx: &EndpointContext,
        result: &dyn Debug,
    ) -> Result<(), EndpointError>;
}

type Handler<P, R> = Arc<dyn Fn(P) -> BoxFuture<'static, Result<R, EndpointError>> + Send + Sync>;

/// A service method behind the uniform invoke contract.
pub struct Endpoint<P, R> {
    method: &'static str,
    handler: Handler<P, R>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl<P, R> Endpoint<P, R>
where
    P: Debug + Send + 'static,
    R: Debug + Send + 'static,
{
    /// Wraps `handler` as the endpoint `method`.
    pub fn new<F, Fut>(method: &'static str, handler: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, EndpointError>> + Send + 'static,
    {
        Self {
            method,
            handler: Arc::new(move |payload| handler(payload).boxed()),
            interceptors: Vec::new(),
        }
    }

    /// Method name, e.g. `watchlist.add`.
    #[must_use]
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Appends an interceptor to the chain.
    pub fn use_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Builder form of [`Endpoint::use_interceptor`].
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.use_interceptor(interceptor);
        self
    }

    /// Invokes the endpoint.
    ///
    /// # Errors
    /// Returns the error of the first failing interceptor, or of the
    /// underlying handler.
    pub async fn invoke(&self, ctx: &EndpointContext, payload: P) -> Result<R, EndpointError> {
        for interceptor in &self.interceptors {
            interceptor.before(self.method, ctx, &payload)?;
        }

        let result = (self.handler)(payload).await?;

        for interceptor in &self.interceptors {
            interceptor.after(self.method, ctx, &result)?;
        }

        Ok(result)
    }
}

impl<P, R> std::fmt::Debug for Endpoint<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

// ============================================================================
// Payload logging
// ============================================================================

/// Runtime switch for verbose payload logging.
#[derive(Debug, Default)]
pub struct DebugToggle {
    enabled: AtomicBool,
}

impl DebugToggle {
    /// Creates a toggle in the given state.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    /// Whether verbose logging is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Switches verbose logging on or off.
    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

/// Interceptor logging payloads and results.
///
/// Records are emitted at debug level, or at info level while the debug
/// toggle is on. Never fails.
#[derive(Debug, Clone)]
pub struct PayloadLogger {
    toggle: Arc<DebugToggle>,
}

impl PayloadLogger {
    /// Creates a logger bound to `toggle`.
    #[must_use]
    pub fn new(toggle: Arc<DebugToggle>) -> Self {
        Self { toggle }
    }

    fn log(&self, method: &str, ctx: &EndpointContext, kind: &str, value: &dyn Debug) {
        let request_id = ctx.request_id.as_deref().unwrap_or("-");
        if self.toggle.is_enabled() {
            info!(method, request_id, "{}: {:?}", kind, value);
        } else {
            debug!(method, request_id, "{}: {:?}", kind, value);
        }
    }
}

impl Interceptor for PayloadLogger {
    fn name(&self) -> &'static str {
        "payload_logger"
    }

    fn before(
        &self,
        method: &'static str,
        ctx: &EndpointContext,
        payload: &dyn Debug,
    ) -> Result<(), EndpointError> {
        self.log(method, ctx, "payload", payload);
        Ok(())
    }

    fn after(
        &self,
        method: &'static str,
        ctx: &EndpointContext,
        result: &dyn Debug,
    ) -> Result<(), EndpointError> {
        self.log(method, ctx, "result", result);
        Ok(())
    }
}

// ============================================================================
// Endpoint set
// ============================================================================

/// All endpoints served over HTTP.
#[derive(Debug)]
pub struct Endpoints {
    /// `watchlist.list`
    pub watchlist_list: Endpoint<ListPayload, Vec<TickerItem>>,
    /// `watchlist.add`
    pub watchlist_add: Endpoint<AddPayload, TickerItem>,
    /// `watchlist.remove`
    pub watchlist_remove: Endpoint<RemovePayload, ()>,
    /// `insights.list`
    pub insights_list: Endpoint<FeedPayload, Vec<Insight>>,
    /// `portfolio.list`
    pub portfolio_list: Endpoint<FeedPayload, Vec<Insight>>,
}

impl Endpoints {
    /// Wraps the services in endpoints.
    #[must_use]
    pub fn new(
        watchlist: Arc<dyn WatchlistService>,
        insights: Arc<dyn FeedService>,
        portfolio: Arc<dyn FeedService>,
    ) -> Self {
        let svc = Arc::clone(&watchlist);
        let watchlist_list = Endpoint::new("watchlist.list", move |payload: ListPayload| {
            let svc = Arc::clone(&svc);
            async move { Ok::<_, EndpointError>(svc.list(&payload)) }
        });

        let svc = Arc::clone(&watchlist);
        let watchlist_add = Endpoint::new("watchlist.add", move |payload: AddPayload| {
            let svc = Arc::clone(&svc);
            async move { Ok::<_, EndpointError>(svc.add(&payload)) }
        });

        let svc = watchlist;
        let watchlist_remove = Endpoint::new("watchlist.remove", move |payload: RemovePayload| {
            let svc = Arc::clone(&svc);
            async move {
                svc.remove(&payload);
                Ok::<_, EndpointError>(())
            }
        });

        let insights_list = Endpoint::new("insights.list", move |payload: FeedPayload| {
            let svc = Arc::clone(&insights);
            async move { Ok::<_, EndpointError>(svc.list(&payload)) }
        });

        let portfolio_list = Endpoint::new("portfolio.list", move |payload: FeedPayload| {
            let svc = Arc::clone(&portfolio);
            async move { Ok::<_, EndpointError>(svc.list(&payload)) }
        });

        Self {
            watchlist_list,
            watchlist_add,
            watchlist_remove,
            insights_list,
            portfolio_list,
        }
    }

    /// Appends `interceptor` to every endpoint.
    pub fn use_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.watchlist_list.use_interceptor(Arc::clone(&interceptor));
        self.watchlist_add.use_interceptor(Arc::clone(&interceptor));
        self.watchlist_remove.use_interceptor(Arc::clone(&interceptor));
        self.insights_list.use_interceptor(Arc::clone(&interceptor));
        self.portfolio_list.use_interceptor(interceptor);
    }

    /// Method names of every endpoint.
    #[must_use]
    pub fn methods(&self) -> [&'static str; 5] {
        [
            self.watchlist_list.method(),
            self.watchlist_add.method(),
            self.watchlist_remove.method(),
            self.insights_list.method(),
            self.portfolio_list.method(),
        ]
    }
}
