//! `Formatter` — the contract every pluggable code formatter backend meets.

use async_trait::async_trait;
use serde_json::Value;

use crate::types::Result;

use super::types::{FormatRequest, FormatResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatterCapabilities {
    pub stdin: bool,
    pub in_place: bool,
    pub check: bool,
    pub config: bool,
}

#[async_trait]
pub trait Formatter: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn languages(&self) -> &[String];
    fn capabilities(&self) -> FormatterCapabilities;

    async fn format(&self, req: &FormatRequest) -> Result<FormatResult>;

    async fn format_batch(&self, reqs: &[FormatRequest]) -> Vec<Result<FormatResult>> {
        let mut results = Vec::with_capacity(reqs.len());
        for req in reqs {
            results.push(self.format(req).await);
        }
        results
    }

    async fn health(&self) -> Result<()>;

    fn validate_config(&self, _config: &Value) -> Result<()> {
        Ok(())
    }

    fn default_config(&self) -> Value {
        Value::Object(serde_json::Map::new())
    }
}
