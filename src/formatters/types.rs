//! `FormatRequest` / `FormatResult` — the value types carried through the
//! executor and middleware chain.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::RequestId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatRequest {
    pub content: String,
    pub file_path: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub config: HashMap<String, String>,
    pub line_length: Option<u32>,
    pub indent: Option<u32>,
    #[serde(default)]
    pub check_only: bool,
    #[serde(default, with = "humantime_serde::option")]
    pub timeout: Option<Duration>,
    pub agent_id: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub request_id: RequestId,
}

impl FormatRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            file_path: None,
            language: None,
            config: HashMap::new(),
            line_length: None,
            indent: None,
            check_only: false,
            timeout: None,
            agent_id: None,
            session_id: None,
            request_id: RequestId::new(),
        }
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_check_only(mut self, check_only: bool) -> Self {
        self.check_only = check_only;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatStats {
    pub lines_total: usize,
    pub lines_changed: usize,
    pub bytes_total: usize,
    pub bytes_changed: usize,
    pub violations_fixed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatResult {
    pub content: String,
    pub changed: bool,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub success: bool,
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub stats: FormatStats,
}

impl FormatResult {
    pub fn success(content: impl Into<String>, changed: bool, duration: Duration) -> Self {
        Self {
            content: content.into(),
            changed,
            duration,
            success: true,
            error: None,
            warnings: Vec::new(),
            stats: FormatStats::default(),
        }
    }

    pub fn failure(error: impl Into<String>, duration: Duration) -> Self {
        Self {
            content: String::new(),
            changed: false,
            duration,
            success: false,
            error: Some(error.into()),
            warnings: Vec::new(),
            stats: FormatStats::default(),
        }
    }
}
