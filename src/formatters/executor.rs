//! Executor — resolves a formatter, builds the middleware chain, runs it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::types::{Error, Result};

use super::language::detect_language_from_path;
use super::middleware::{build_chain, FormatFn, Middleware};
use super::registry::FormatterRegistry;
use super::types::{FormatRequest, FormatResult};

/// Registry + ordered middleware chain + concurrent batch dispatch.
#[derive(Clone)]
pub struct Executor {
    registry: Arc<FormatterRegistry>,
    middlewares: Arc<Vec<Arc<dyn Middleware>>>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").field("middlewares", &self.middlewares.len()).finish()
    }
}

impl Executor {
    pub fn new(registry: Arc<FormatterRegistry>, middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        Self { registry, middlewares: Arc::new(middlewares) }
    }

    async fn resolve_language(&self, req: &FormatRequest) -> Result<String> {
        if let Some(language) = &req.language {
            return Ok(language.clone());
        }
        if let Some(path) = &req.file_path {
            let language = detect_language_from_path(path);
            if language.is_empty() {
                return Err(Error::validation(format!("could not detect a language for path '{path}'")));
            }
            return Ok(language);
        }
        Err(Error::validation("either language or file_path must be specified"))
    }

    pub async fn execute(&self, req: FormatRequest, cancel: CancellationToken) -> Result<FormatResult> {
        let language = self.resolve_language(&req).await?;
        let formatter = self.registry.get_by_language(&language).await?;

        let base: FormatFn = Arc::new(move |req, _cancel| {
            let formatter = formatter.clone();
            Box::pin(async move {
                let started = Instant::now();
                match formatter.format(&req).await {
                    Ok(mut result) => {
                        result.duration = started.elapsed();
                        Ok(result)
                    }
                    Err(e) => Err(e),
                }
            })
        });

        let chain = build_chain(base, &self.middlewares);
        chain(req, cancel).await
    }

    /// Dispatches every request concurrently; every slot is filled even if
    /// some fail. Returns `(results, first_error)`.
    pub async fn execute_batch(
        &self,
        reqs: Vec<FormatRequest>,
        cancel: CancellationToken,
    ) -> (Vec<Result<FormatResult>>, Option<Error>) {
        let futures = reqs.into_iter().map(|req| {
            let this = self.clone();
            let cancel = cancel.clone();
            async move { this.execute(req, cancel).await }
        });
        let results: Vec<Result<FormatResult>> = join_all(futures).await;
        let first_error = results.iter().find_map(|r| r.as_ref().err()).map(error_clone);
        (results, first_error)
    }

    pub fn registry(&self) -> &Arc<FormatterRegistry> {
        &self.registry
    }

    pub async fn preferred_formatter_name(&self, language: &str, prefs: &HashMap<String, String>) -> Result<String> {
        let formatter = self.registry.get_preferred_formatter(language, prefs).await?;
        Ok(formatter.name().to_string())
    }
}

fn error_clone(e: &Error) -> Error {
    Error::internal(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::formatter::{Formatter, FormatterCapabilities};
    use crate::formatters::middleware::ValidationMiddleware;
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Debug)]
    struct UppercaseFormatter {
        languages: Vec<String>,
    }

    #[async_trait]
    impl Formatter for UppercaseFormatter {
        fn name(&self) -> &str {
            "uppercase"
        }
        fn version(&self) -> &str {
            "1.0.0"
        }
        fn languages(&self) -> &[String] {
            &self.languages
        }
        fn capabilities(&self) -> FormatterCapabilities {
            Default::default()
        }
        async fn format(&self, req: &FormatRequest) -> Result<FormatResult> {
            let upper = req.content.to_uppercase();
            let changed = upper != req.content;
            Ok(FormatResult::success(upper, changed, Duration::from_millis(0)))
        }
        async fn health(&self) -> Result<()> {
            Ok(())
        }
    }

    fn executor() -> Executor {
        let registry = Arc::new(FormatterRegistry::new());
        registry.register(Arc::new(UppercaseFormatter { languages: vec!["python".to_string()] })).unwrap();
        Executor::new(registry, vec![Arc::new(ValidationMiddleware)])
    }

    #[tokio::test]
    async fn resolves_formatter_by_explicit_language() {
        let executor = executor();
        let req = FormatRequest::new("x").with_language("python");
        let result = executor.execute(req, CancellationToken::new()).await.unwrap();
        assert_eq!(result.content, "X");
    }

    #[tokio::test]
    async fn resolves_formatter_by_file_path_extension() {
        let executor = executor();
        let req = FormatRequest::new("x").with_file_path("main.py");
        let result = executor.execute(req, CancellationToken::new()).await.unwrap();
        assert_eq!(result.content, "X");
    }

    #[tokio::test]
    async fn missing_language_and_path_is_a_validation_error() {
        let executor = executor();
        let err = executor.execute(FormatRequest::new("x"), CancellationToken::new()).await.unwrap_err();
        assert!(err.to_string().contains("either language or file_path"));
    }

    #[tokio::test]
    async fn batch_executes_concurrently_and_fills_every_slot() {
        let executor = executor();
        let reqs = vec![
            FormatRequest::new("a").with_language("python"),
            FormatRequest::new("").with_language("python"),
            FormatRequest::new("c").with_language("python"),
        ];
        let (results, first_error) = executor.execute_batch(reqs, CancellationToken::new()).await;
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
        assert!(first_error.is_some());
    }
}
