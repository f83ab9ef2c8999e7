//! Built-in middleware wrapping the base formatter invocation. Each is
//! independent and composable; registration order determines nesting
//! (first registered is outermost), per `spec.md` §4.5.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::types::{Error, OrchestratorConfig, Result};

use super::cache::FormatterCache;
use super::types::{FormatRequest, FormatResult};

/// The signature every middleware wraps: take ownership of the request and
/// the ambient cancellation token, return the eventual result.
pub type FormatFn = Arc<dyn Fn(FormatRequest, CancellationToken) -> BoxFuture<'static, Result<FormatResult>> + Send + Sync>;

pub trait Middleware: Send + Sync + std::fmt::Debug {
    fn wrap(&self, next: FormatFn) -> FormatFn;
}

/// Composes `middlewares` around `base`; first entry ends up outermost.
pub fn build_chain(base: FormatFn, middlewares: &[Arc<dyn Middleware>]) -> FormatFn {
    let mut chain = base;
    for middleware in middlewares.iter().rev() {
        chain = middleware.wrap(chain);
    }
    chain
}

/// Sets the per-request deadline to `req.timeout` else `default_timeout`.
#[derive(Debug)]
pub struct TimeoutMiddleware {
    pub default_timeout: Duration,
}

impl TimeoutMiddleware {
    /// Builds from C5's `default_timeout` tuning knob.
    pub fn new(config: &OrchestratorConfig) -> Self {
        Self { default_timeout: config.default_timeout }
    }
}

impl Middleware for TimeoutMiddleware {
    fn wrap(&self, next: FormatFn) -> FormatFn {
        let default_timeout = self.default_timeout;
        Arc::new(move |req, token| {
            let next = next.clone();
            let deadline = req.timeout.unwrap_or(default_timeout);
            Box::pin(async move {
                tokio::select! {
                    result = tokio::time::timeout(deadline, next(req, token.clone())) => match result {
                        Ok(inner) => inner,
                        Err(_) => Err(Error::timeout(format!("formatter execution timed out after {deadline:?}"))),
                    },
                    _ = token.cancelled() => Err(Error::cancelled("formatter execution cancelled")),
                }
            })
        })
    }
}

/// Exponential backoff retry, capped to `[0, 30]` attempts beyond the first.
#[derive(Debug)]
pub struct RetryMiddleware {
    max_retries: usize,
}

impl RetryMiddleware {
    pub fn new(max_retries: usize) -> Self {
        Self { max_retries: max_retries.min(30) }
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }
}

impl Middleware for RetryMiddleware {
    fn wrap(&self, next: FormatFn) -> FormatFn {
        let max_retries = self.max_retries;
        Arc::new(move |req, token| {
            let next = next.clone();
            Box::pin(async move {
                let mut last_err: Option<Error> = None;
                for attempt in 0..=max_retries {
                    if attempt > 0 {
                        let backoff = Duration::from_secs(1u64 << (attempt - 1));
                        tokio::select! {
                            _ = tokio::time::sleep(backoff) => {}
                            _ = token.cancelled() => return Err(Error::cancelled("retry backoff cancelled")),
                        }
                    }
                    match next(req.clone(), token.clone()).await {
                        Ok(result) => return Ok(result),
                        Err(e) => {
                            if token.is_cancelled() {
                                return Err(Error::cancelled("retry loop cancelled"));
                            }
                            last_err = Some(e);
                        }
                    }
                }
                Err(Error::internal(format!(
                    "failed after {max_retries} retries: {}",
                    last_err.map(|e| e.to_string()).unwrap_or_default()
                )))
            })
        })
    }
}

/// Reads/writes the C4 cache. Bypassed entirely for check-only requests.
#[derive(Debug)]
pub struct CacheMiddleware {
    pub cache: FormatterCache,
}

impl Middleware for CacheMiddleware {
    fn wrap(&self, next: FormatFn) -> FormatFn {
        let cache = self.cache.clone();
        Arc::new(move |req, token| {
            let next = next.clone();
            let cache = cache.clone();
            Box::pin(async move {
                if req.check_only {
                    return next(req, token).await;
                }
                if let Some(cached) = cache.get(&req) {
                    return Ok(cached);
                }
                let result = next(req.clone(), token).await?;
                if result.success {
                    cache.set(&req, result.clone());
                }
                Ok(result)
            })
        })
    }
}

/// Pre: reject empty content. Post: reject a successful-but-empty result.
#[derive(Debug, Default)]
pub struct ValidationMiddleware;

impl Middleware for ValidationMiddleware {
    fn wrap(&self, next: FormatFn) -> FormatFn {
        Arc::new(move |req, token| {
            let next = next.clone();
            Box::pin(async move {
                if req.content.is_empty() {
                    return Err(Error::validation("empty content provided"));
                }
                let result = next(req, token).await?;
                if result.success && result.content.is_empty() {
                    return Err(Error::validation("formatter returned empty content"));
                }
                Ok(result)
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormatterMetricsSnapshot {
    pub calls: u64,
    pub total_duration: Duration,
    pub total_bytes: u64,
}

/// Per-language duration/byte counters, shared across clones (the registered
/// middleware instance and any handle the caller keeps for reading back
/// `snapshot()` point at the same counters).
#[derive(Debug, Clone, Default)]
pub struct MetricsMiddleware {
    counters: Arc<RwLock<HashMap<String, FormatterMetricsSnapshot>>>,
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, language: &str) -> FormatterMetricsSnapshot {
        self.counters.read().get(language).cloned().unwrap_or_default()
    }
}

impl Middleware for MetricsMiddleware {
    fn wrap(&self, next: FormatFn) -> FormatFn {
        let counters = self.counters.clone();
        Arc::new(move |req, token| {
            let next = next.clone();
            let counters = counters.clone();
            Box::pin(async move {
                let language = req.language.clone().unwrap_or_default();
                let started = Instant::now();
                let result = next(req, token).await;
                if let Ok(ref r) = result {
                    let mut counters = counters.write();
                    let entry = counters.entry(language).or_default();
                    entry.calls += 1;
                    entry.total_duration += started.elapsed();
                    entry.total_bytes += r.content.len() as u64;
                }
                result
            })
        })
    }
}

/// Opens a tracing span around the inner call.
#[derive(Debug, Default)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn wrap(&self, next: FormatFn) -> FormatFn {
        Arc::new(move |req, token| {
            let next = next.clone();
            let language = req.language.clone().unwrap_or_default();
            let span = tracing::info_span!("format", language = %language);
            Box::pin(async move { next(req, token).await }.instrument(span))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_ok() -> FormatFn {
        Arc::new(|req: FormatRequest, _token| {
            Box::pin(async move { Ok(FormatResult::success(req.content, false, Duration::from_millis(1))) })
        })
    }

    fn base_always_fails() -> FormatFn {
        Arc::new(|_req: FormatRequest, _token| Box::pin(async move { Err(Error::transient("boom")) }))
    }

    #[tokio::test]
    async fn validation_rejects_empty_content() {
        let chain = ValidationMiddleware.wrap(base_ok());
        let err = chain(FormatRequest::new(""), CancellationToken::new()).await.unwrap_err();
        assert!(err.to_string().contains("empty content"));
    }

    #[tokio::test]
    async fn retry_invokes_inner_exactly_max_retries_plus_one_times() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let base: FormatFn = Arc::new(move |_req, _token| {
            calls_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Box::pin(async move { Err(Error::transient("boom")) })
        });
        let chain = RetryMiddleware::new(3).wrap(base);
        let err = chain(FormatRequest::new("x"), CancellationToken::new()).await.unwrap_err();
        assert!(err.to_string().contains("failed after 3 retries"));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn retry_caps_at_thirty() {
        assert_eq!(RetryMiddleware::new(999).max_retries(), 30);
    }

    #[tokio::test]
    async fn retry_aborts_promptly_on_cancellation() {
        let token = CancellationToken::new();
        let chain = RetryMiddleware::new(30).wrap(base_always_fails());
        let token_clone = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            token_clone.cancel();
        });
        let started = Instant::now();
        let err = chain(FormatRequest::new("x"), token).await.unwrap_err();
        assert!(err.to_string().contains("cancelled"));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn timeout_middleware_reports_timeout_on_expiry() {
        let slow: FormatFn = Arc::new(|_req, _token| {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(FormatResult::success("x", false, Duration::from_millis(50)))
            })
        });
        let mw = TimeoutMiddleware { default_timeout: Duration::from_millis(5) };
        let chain = mw.wrap(slow);
        let err = chain(FormatRequest::new("x"), CancellationToken::new()).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn metrics_middleware_records_calls_per_language() {
        let metrics = MetricsMiddleware::new();
        let chain = metrics.wrap(base_ok());
        let req = FormatRequest::new("x=1").with_language("python");
        chain(req, CancellationToken::new()).await.unwrap();
        let snapshot = metrics.snapshot("python");
        assert_eq!(snapshot.calls, 1);
        assert_eq!(snapshot.total_bytes, 3);
    }

    #[tokio::test]
    async fn cache_middleware_bypasses_on_check_only() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let base: FormatFn = Arc::new(move |req: FormatRequest, _token| {
            calls_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Box::pin(async move { Ok(FormatResult::success(req.content, false, Duration::from_millis(1))) })
        });
        let cache = FormatterCache::new(crate::types::FormatterCacheConfig {
            max_size: 10,
            ttl: Duration::from_secs(60),
            cleanup_freq: Duration::from_secs(3600),
        });
        let chain = CacheMiddleware { cache }.wrap(base);
        let req = FormatRequest::new("x=1").with_check_only(true);
        chain(req.clone(), CancellationToken::new()).await.unwrap();
        chain(req, CancellationToken::new()).await.unwrap();
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
