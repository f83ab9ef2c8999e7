//! Health checker — bounded-parallelism health check sweep over every
//! instantiated formatter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::types::OrchestratorConfig;

use super::registry::FormatterRegistry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatterHealth {
    pub name: String,
    pub healthy: bool,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub total: usize,
    pub healthy_count: usize,
    pub unhealthy_count: usize,
    pub results: Vec<FormatterHealth>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.unhealthy_count == 0
    }

    pub fn health_percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.healthy_count as f64 / self.total as f64) * 100.0
        }
    }
}

#[derive(Debug)]
pub struct HealthChecker {
    registry: Arc<FormatterRegistry>,
    global_timeout: Duration,
    concurrency: usize,
}

impl HealthChecker {
    /// Builds the checker from C5's tuning knobs: `health_check_timeout` caps
    /// each individual check, `health_check_concurrency` bounds the semaphore
    /// (spec.md §4.5 fixes this at 10, but the default config is the only
    /// place that constant now lives).
    pub fn new(registry: Arc<FormatterRegistry>, config: &OrchestratorConfig) -> Self {
        Self {
            registry,
            global_timeout: config.health_check_timeout,
            concurrency: config.health_check_concurrency.max(1),
        }
    }

    pub async fn check_all(&self) -> HealthReport {
        let formatters = self.registry.instantiated();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let global_timeout = self.global_timeout;

        let checks = formatters.into_iter().map(|formatter| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore is never closed");
                let name = formatter.name().to_string();
                let started = Instant::now();
                let outcome = tokio::time::timeout(global_timeout, formatter.health()).await;
                let duration = started.elapsed();
                match outcome {
                    Ok(Ok(())) => FormatterHealth { name, healthy: true, duration, error_message: None },
                    Ok(Err(e)) => FormatterHealth { name, healthy: false, duration, error_message: Some(e.to_string()) },
                    Err(_) => FormatterHealth {
                        name,
                        healthy: false,
                        duration,
                        error_message: Some(format!("health check timed out after {global_timeout:?}")),
                    },
                }
            }
        });

        let results: Vec<FormatterHealth> = join_all(checks).await;
        let healthy_count = results.iter().filter(|r| r.healthy).count();
        let total = results.len();
        HealthReport { total, healthy_count, unhealthy_count: total - healthy_count, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::formatter::{Formatter, FormatterCapabilities};
    use crate::formatters::types::{FormatRequest, FormatResult};
    use crate::types::Result;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct HealthyFormatter;
    #[derive(Debug)]
    struct UnhealthyFormatter;

    #[async_trait]
    impl Formatter for HealthyFormatter {
        fn name(&self) -> &str {
            "healthy"
        }
        fn version(&self) -> &str {
            "1.0.0"
        }
        fn languages(&self) -> &[String] {
            &[]
        }
        fn capabilities(&self) -> FormatterCapabilities {
            Default::default()
        }
        async fn format(&self, _req: &FormatRequest) -> Result<FormatResult> {
            unimplemented!()
        }
        async fn health(&self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl Formatter for UnhealthyFormatter {
        fn name(&self) -> &str {
            "unhealthy"
        }
        fn version(&self) -> &str {
            "1.0.0"
        }
        fn languages(&self) -> &[String] {
            &[]
        }
        fn capabilities(&self) -> FormatterCapabilities {
            Default::default()
        }
        async fn format(&self, _req: &FormatRequest) -> Result<FormatResult> {
            unimplemented!()
        }
        async fn health(&self) -> Result<()> {
            Err(crate::types::Error::transient("down"))
        }
    }

    #[tokio::test]
    async fn reports_mixed_health_and_percentage() {
        let registry = Arc::new(FormatterRegistry::new());
        registry.register(Arc::new(HealthyFormatter)).unwrap();
        registry.register(Arc::new(UnhealthyFormatter)).unwrap();

        let checker = HealthChecker::new(
            registry,
            &OrchestratorConfig { health_check_timeout: Duration::from_secs(1), ..Default::default() },
        );
        let report = checker.check_all().await;

        assert_eq!(report.total, 2);
        assert_eq!(report.healthy_count, 1);
        assert_eq!(report.unhealthy_count, 1);
        assert!(!report.is_healthy());
        assert_eq!(report.health_percentage(), 50.0);
    }

    #[tokio::test]
    async fn empty_registry_reports_full_health() {
        let registry = Arc::new(FormatterRegistry::new());
        let checker = HealthChecker::new(
            registry,
            &OrchestratorConfig { health_check_timeout: Duration::from_secs(1), ..Default::default() },
        );
        let report = checker.check_all().await;
        assert_eq!(report.total, 0);
        assert!(report.is_healthy());
        assert_eq!(report.health_percentage(), 100.0);
    }
}
