//! The operation gateway.
//!
//! # Responsibilities
//! - Expose typed CRUD and auth operations over named resources
//! - Run every call through the pipeline: admission → cache → retry with
//!   per-attempt timeout → metrics → cache population/invalidation
//! - Convert every terminal state into the uniform [`Outcome`] envelope
//!
//! # Design Decisions
//! - Pipelines run as spawned tasks: a caller that stops awaiting abandons
//!   the await, not the work — retries, cache updates, and metrics still
//!   complete
//! - Admission denial is terminal and consumes no retry or network
//!   round-trip
//! - Sign-out clears local state even when the remote call fails

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use serde_json::Value;
use uuid::Uuid;

use crate::backend::query::Filter;
use crate::backend::session::{AuthState, SessionStore};
use crate::backend::types::{BackendError, BackendResult, Credentials};
use crate::backend::BackendClient;
use crate::cache::{fingerprint, resource_prefix, ResponseCache};
use crate::config::schema::{BackstopConfig, CallConfig, CallOverrides};
use crate::gateway::types::{OpKind, Outcome, OutcomeStatus};
use crate::observability::{Metric, MetricsLog, MetricsSummary};
use crate::ratelimit::RateLimiter;
use crate::resilience::{with_deadline, with_retry};

/// Resource label used for auth operations in rate-limit keys and metrics.
const AUTH_RESOURCE: &str = "auth";

/// Resilient data-access gateway over a hosted backend.
///
/// Cheap to clone; clones share the cache, rate windows, metrics log, and
/// session store. Tests construct isolated instances instead of relying on
/// process-wide state.
#[derive(Clone)]
pub struct Gateway {
    backend: BackendClient,
    cache: ResponseCache,
    limiter: Arc<RateLimiter>,
    metrics: Arc<MetricsLog>,
    defaults: Arc<ArcSwap<CallConfig>>,
}

impl Gateway {
    /// Create a gateway from configuration.
    pub fn new(config: BackstopConfig) -> BackendResult<Self> {
        let backend = BackendClient::new(&config.backend)?;

        backend.sessions().subscribe(|state| match state {
            AuthState::SignedIn(_) => tracing::info!("Auth state changed: signed in"),
            AuthState::SignedOut => tracing::info!("Auth state changed: signed out"),
        });

        Ok(Self {
            backend,
            cache: ResponseCache::new(),
            limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
            metrics: Arc::new(MetricsLog::new(config.metrics.capacity)),
            defaults: Arc::new(ArcSwap::from_pointee(config.defaults)),
        })
    }

    /// Session store of the underlying backend client.
    pub fn sessions(&self) -> &SessionStore {
        self.backend.sessions()
    }

    /// Read rows from `resource`, through the cache when enabled.
    pub async fn read(
        &self,
        resource: &str,
        columns: Option<Vec<String>>,
        filter: Filter,
        overrides: CallOverrides,
    ) -> Outcome {
        let this = self.clone();
        let resource = resource.to_string();
        detach(async move { this.read_pipeline(resource, columns, filter, overrides).await }).await
    }

    /// Insert `payload` into `resource`.
    pub async fn create(&self, resource: &str, payload: Value, overrides: CallOverrides) -> Outcome {
        let this = self.clone();
        let resource = resource.to_string();
        detach(async move {
            this.mutation_pipeline(OpKind::Create, resource, payload, Filter::new(), overrides)
                .await
        })
        .await
    }

    /// Update rows of `resource` matching `filter`.
    pub async fn update(
        &self,
        resource: &str,
        payload: Value,
        filter: Filter,
        overrides: CallOverrides,
    ) -> Outcome {
        let this = self.clone();
        let resource = resource.to_string();
        detach(async move {
            this.mutation_pipeline(OpKind::Update, resource, payload, filter, overrides)
                .await
        })
        .await
    }

    /// Delete rows of `resource` matching `filter`.
    pub async fn delete(&self, resource: &str, filter: Filter, overrides: CallOverrides) -> Outcome {
        let this = self.clone();
        let resource = resource.to_string();
        detach(async move {
            this.mutation_pipeline(OpKind::Delete, resource, Value::Null, filter, overrides)
                .await
        })
        .await
    }

    /// Sign in; on success the session is adopted and subscribers notified.
    pub async fn sign_in(&self, credentials: Credentials, overrides: CallOverrides) -> Outcome {
        let this = self.clone();
        detach(async move { this.auth_pipeline(OpKind::SignIn, credentials, overrides).await })
            .await
    }

    /// Sign up; session material is adopted when the backend returns it.
    pub async fn sign_up(&self, credentials: Credentials, overrides: CallOverrides) -> Outcome {
        let this = self.clone();
        detach(async move { this.auth_pipeline(OpKind::SignUp, credentials, overrides).await })
            .await
    }

    /// Sign out remotely, then clear the cache and drop the session.
    ///
    /// Local cleanup runs regardless of the remote result; a failing
    /// backend cannot block it. The returned outcome still reports the
    /// remote status.
    pub async fn sign_out(&self, overrides: CallOverrides) -> Outcome {
        let this = self.clone();
        detach(async move { this.sign_out_pipeline(overrides).await }).await
    }

    /// Drop every cached read payload.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Snapshot of the metrics log, oldest first.
    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics.snapshot()
    }

    /// Per-status counts over the metrics log.
    pub fn metrics_summary(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    /// Whether the backend currently answers HTTP at all.
    pub async fn is_healthy(&self) -> bool {
        self.backend.is_healthy().await
    }

    /// Replace the per-call defaults. In-flight calls keep the config they
    /// resolved at start.
    pub fn update_config(&self, defaults: CallConfig) {
        self.defaults.store(Arc::new(defaults));
    }

    /// Current per-call defaults.
    pub fn config(&self) -> CallConfig {
        self.defaults.load().as_ref().clone()
    }

    // ---- pipelines ----

    async fn read_pipeline(
        self,
        resource: String,
        columns: Option<Vec<String>>,
        filter: Filter,
        overrides: CallOverrides,
    ) -> Outcome {
        let config = self.resolve(&overrides);
        let call_id = Uuid::new_v4();
        let started = Instant::now();

        if let Some(denied) =
            self.check_admission(OpKind::Read, &resource, &config, call_id, started)
        {
            return denied;
        }

        let cache_key = fingerprint(&resource, OpKind::Read, &filter);
        if config.cache {
            if let Some(payload) =
                self.cache.get(&cache_key, Duration::from_millis(config.cache_duration_ms))
            {
                tracing::debug!(%call_id, resource = %resource, "Cache hit");
                let outcome = Outcome::success(payload, started.elapsed(), 0);
                self.finish(OpKind::Read, &resource, &config, call_id, &outcome);
                return outcome;
            }
        }

        let backend = self.backend.clone();
        let target = resource.clone();
        let query = filter.clone();
        let (result, retries) = self
            .attempts(&config, move || {
                let backend = backend.clone();
                let target = target.clone();
                let columns = columns.clone();
                let query = query.clone();
                async move { backend.select(&target, columns.as_deref(), &query).await }
            })
            .await;

        let outcome = match result {
            Ok(payload) => {
                if config.cache {
                    self.cache.put(cache_key, payload.clone());
                }
                Outcome::success(payload, started.elapsed(), retries)
            }
            Err(e) => Outcome::failure(
                classify(&config, &e, retries),
                e.to_string(),
                started.elapsed(),
                retries,
            ),
        };
        self.finish(OpKind::Read, &resource, &config, call_id, &outcome);
        outcome
    }

    async fn mutation_pipeline(
        self,
        kind: OpKind,
        resource: String,
        payload: Value,
        filter: Filter,
        overrides: CallOverrides,
    ) -> Outcome {
        let config = self.resolve(&overrides);
        let call_id = Uuid::new_v4();
        let started = Instant::now();

        if let Some(denied) = self.check_admission(kind, &resource, &config, call_id, started) {
            return denied;
        }

        let backend = self.backend.clone();
        let target = resource.clone();
        let query = filter.clone();
        let (result, retries) = self
            .attempts(&config, move || {
                let backend = backend.clone();
                let target = target.clone();
                let payload = payload.clone();
                let query = query.clone();
                async move {
                    match kind {
                        OpKind::Create => backend.insert(&target, &payload).await,
                        OpKind::Update => backend.update(&target, &payload, &query).await,
                        OpKind::Delete => backend.delete(&target, &query).await,
                        _ => unreachable!("mutation pipeline only handles mutations"),
                    }
                }
            })
            .await;

        // Invalidation runs once the final outcome is known, success or
        // exhausted alike: the remote state may have changed on any attempt.
        self.cache.invalidate(&resource_prefix(&resource));

        let outcome = match result {
            Ok(payload) => Outcome::success(payload, started.elapsed(), retries),
            Err(e) => Outcome::failure(
                classify(&config, &e, retries),
                e.to_string(),
                started.elapsed(),
                retries,
            ),
        };
        self.finish(kind, &resource, &config, call_id, &outcome);
        outcome
    }

    async fn auth_pipeline(
        self,
        kind: OpKind,
        credentials: Credentials,
        overrides: CallOverrides,
    ) -> Outcome {
        let config = self.resolve(&overrides);
        let call_id = Uuid::new_v4();
        let started = Instant::now();

        let backend = self.backend.clone();
        let (result, retries) = self
            .attempts(&config, move || {
                let backend = backend.clone();
                let credentials = credentials.clone();
                async move {
                    match kind {
                        OpKind::SignIn => backend
                            .sign_in(&credentials)
                            .await
                            .map(|session| serde_json::to_value(session).unwrap_or(Value::Null)),
                        OpKind::SignUp => backend.sign_up(&credentials).await,
                        _ => unreachable!("auth pipeline only handles sign-in/sign-up"),
                    }
                }
            })
            .await;

        let outcome = match result {
            Ok(payload) => Outcome::success(payload, started.elapsed(), retries),
            Err(e) => Outcome::failure(
                classify(&config, &e, retries),
                e.to_string(),
                started.elapsed(),
                retries,
            ),
        };
        self.finish(kind, AUTH_RESOURCE, &config, call_id, &outcome);
        outcome
    }

    async fn sign_out_pipeline(self, overrides: CallOverrides) -> Outcome {
        let config = self.resolve(&overrides);
        let call_id = Uuid::new_v4();
        let started = Instant::now();

        let backend = self.backend.clone();
        let (result, retries) = self
            .attempts(&config, move || {
                let backend = backend.clone();
                async move { backend.sign_out().await }
            })
            .await;

        // Local cleanup must not be blocked by backend errors.
        self.cache.clear();
        self.backend.sessions().set(None);

        let outcome = match result {
            Ok(payload) => Outcome::success(payload, started.elapsed(), retries),
            Err(e) => {
                tracing::warn!(%call_id, error = %e, "Remote sign-out failed; local state cleared anyway");
                Outcome::failure(
                    classify(&config, &e, retries),
                    e.to_string(),
                    started.elapsed(),
                    retries,
                )
            }
        };
        self.finish(OpKind::SignOut, AUTH_RESOURCE, &config, call_id, &outcome);
        outcome
    }

    // ---- pipeline pieces ----

    fn resolve(&self, overrides: &CallOverrides) -> CallConfig {
        let base = self.defaults.load_full();
        overrides.apply(base.as_ref())
    }

    /// Rate-limit gate. Returns the terminal denial outcome, already
    /// metered, or `None` when the call is admitted.
    fn check_admission(
        &self,
        kind: OpKind,
        resource: &str,
        config: &CallConfig,
        call_id: Uuid,
        started: Instant,
    ) -> Option<Outcome> {
        let key = format!("{}:{}", resource, kind.as_str());
        if self.limiter.admit(&key) {
            return None;
        }

        let outcome = Outcome::failure(
            OutcomeStatus::Error,
            format!("rate limit exceeded for {}", key),
            started.elapsed(),
            0,
        );
        self.finish(kind, resource, config, call_id, &outcome);
        Some(outcome)
    }

    /// Drive `attempt` through the retry loop with a per-attempt deadline.
    async fn attempts<F, Fut>(&self, config: &CallConfig, mut attempt: F) -> (BackendResult<Value>, u32)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = BackendResult<Value>>,
    {
        let deadline = Duration::from_millis(config.timeout_ms);
        let max_retries = if config.enable_retry { config.max_retries } else { 0 };

        with_retry(max_retries, config.base_delay_ms, |_| {
            let fut = attempt();
            async move {
                match with_deadline(deadline, fut).await {
                    Ok(result) => result,
                    Err(expired) => Err(BackendError::from(expired)),
                }
            }
        })
        .await
    }

    /// Append the metric record (unconditional) and the diagnostic log
    /// line (gated by `log_requests`).
    fn finish(
        &self,
        kind: OpKind,
        resource: &str,
        config: &CallConfig,
        call_id: Uuid,
        outcome: &Outcome,
    ) {
        self.metrics.record(
            kind,
            resource,
            Duration::from_millis(outcome.duration_ms),
            outcome.status,
            outcome.error.clone(),
        );

        if config.log_requests {
            tracing::info!(
                %call_id,
                kind = kind.as_str(),
                resource = %resource,
                status = ?outcome.status,
                duration_ms = outcome.duration_ms,
                retries = outcome.retries,
                "Call finished"
            );
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("cache_entries", &self.cache.len())
            .field("metrics_recorded", &self.metrics.len())
            .finish()
    }
}

/// Run a pipeline as a spawned task and await its handle.
///
/// Dropping the returned future abandons the await, not the pipeline: the
/// task keeps retrying, backing off, and updating cache and metrics until
/// it reaches a terminal state. The per-attempt timeout is the only
/// built-in abandonment mechanism.
async fn detach<F>(pipeline: F) -> Outcome
where
    F: std::future::Future<Output = Outcome> + Send + 'static,
{
    match tokio::spawn(pipeline).await {
        Ok(outcome) => outcome,
        Err(e) => Outcome::failure(
            OutcomeStatus::Error,
            format!("pipeline task failed: {}", e),
            Duration::ZERO,
            0,
        ),
    }
}

/// Map the final failure of the retry loop onto an outcome status.
///
/// Exhaustion wins when the retry loop actually ran out; a lone timed-out
/// attempt (retry disabled) is reported as `timeout`; everything else is
/// `error`.
fn classify(config: &CallConfig, error: &BackendError, retries: u32) -> OutcomeStatus {
    if config.enable_retry && retries >= config.max_retries {
        OutcomeStatus::RetryExhausted
    } else if error.is_timeout() {
        OutcomeStatus::Timeout
    } else {
        OutcomeStatus::Error
    }
}
