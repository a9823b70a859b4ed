//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, response headers)
//! - Bind server to listener with connect info for the peer fallback
//! - Apply policy updates from the config watcher without restarting

use arc_swap::ArcSwap;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::classifier::ClassifierPolicy;
use crate::config::{resolve_policy, AppConfig};
use crate::http::handlers;
use crate::http::request::make_request_span;
use crate::http::response::default_headers;
use crate::lifecycle::shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<ArcSwap<ClassifierPolicy>>,
}

/// HTTP server for the caller-info pages.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    policy: Arc<ArcSwap<ClassifierPolicy>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and the
    /// already-resolved classifier policy.
    pub fn new(config: AppConfig, policy: ClassifierPolicy) -> Self {
        let policy = Arc::new(ArcSwap::from_pointee(policy));
        let state = AppState {
            policy: policy.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            policy,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let [cache_control, content_type_options, referrer_policy] = default_headers();

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetResponseHeaderLayer::if_not_present(cache_control.0, cache_control.1))
            .layer(SetResponseHeaderLayer::if_not_present(
                content_type_options.0,
                content_type_options.1,
            ))
            .layer(SetResponseHeaderLayer::if_not_present(referrer_policy.0, referrer_policy.1))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/", get(handlers::dashboard))
            .route("/api/caller", get(handlers::caller_json))
            .route("/test", get(handlers::ssr_test))
            .route("/healthz", get(handlers::healthz))
            .with_state(state)
            .layer(middleware)
    }

    /// The fully layered router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires. Configs arriving on `config_updates` replace the
    /// classifier policy; listener and timeout changes need a restart.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<AppConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            enforce_access_control = self.policy.load().enforce_access_control,
            "HTTP server starting"
        );

        let reload = tokio::spawn(apply_updates(
            self.policy.clone(),
            self.config.clone(),
            config_updates,
        ));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await;

        reload.abort();
        result?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Swap in a new policy for every valid config update.
async fn apply_updates(
    policy: Arc<ArcSwap<ClassifierPolicy>>,
    mut current: AppConfig,
    mut updates: mpsc::UnboundedReceiver<AppConfig>,
) {
    while let Some(next) = updates.recv().await {
        if next.listener != current.listener || next.timeouts != current.timeouts {
            tracing::warn!("Listener and timeout changes take effect after a restart");
        }

        match resolve_policy(&next.access) {
            Ok(new_policy) => {
                tracing::info!(
                    enforce_access_control = new_policy.enforce_access_control,
                    min_security_score = new_policy.min_security_score,
                    "Access policy reloaded"
                );
                policy.store(Arc::new(new_policy));
                current = next;
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected config update, keeping current policy");
            }
        }
    }
}
