//! `FormatterRegistry` — eager + lazy formatter maps, language index.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::OnceCell;

use crate::types::{Error, Result};

use super::formatter::Formatter;

/// Metadata required to register a lazily-constructed formatter.
#[derive(Debug, Clone)]
pub struct LazyFormatterMeta {
    pub languages: Vec<String>,
}

type Factory = Arc<dyn Fn() -> Result<Arc<dyn Formatter>> + Send + Sync>;

/// One lazily-constructed formatter: a builder closure plus a one-shot cell
/// caching either the built instance or the sticky construction error.
struct LazyFormatterEntry {
    meta: LazyFormatterMeta,
    factory: Factory,
    cell: OnceCell<std::result::Result<Arc<dyn Formatter>, String>>,
}

impl LazyFormatterEntry {
    async fn get(&self) -> Result<Arc<dyn Formatter>> {
        let result = self
            .cell
            .get_or_init(|| async { (self.factory)().map_err(|e| e.to_string()) })
            .await;
        result.clone().map_err(Error::internal)
    }
}

#[derive(Default)]
struct Tables {
    eager: HashMap<String, Arc<dyn Formatter>>,
    lazy: HashMap<String, Arc<LazyFormatterEntry>>,
    by_language: HashMap<String, Vec<String>>,
}

/// Registry of known formatters, indexed eager + lazy, keyed by name and by
/// language.
pub struct FormatterRegistry {
    tables: RwLock<Tables>,
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("FormatterRegistry")
            .field("eager", &tables.eager.len())
            .field("lazy", &tables.lazy.len())
            .finish()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self { tables: RwLock::new(Tables::default()) }
    }

    /// Registers an already-constructed formatter instance. Errors if the
    /// name is already used in either map.
    pub fn register(&self, instance: Arc<dyn Formatter>) -> Result<()> {
        let name = instance.name().to_string();
        let mut tables = self.tables.write();
        if tables.eager.contains_key(&name) || tables.lazy.contains_key(&name) {
            return Err(Error::validation(format!("formatter '{name}' is already registered")));
        }
        for language in instance.languages() {
            tables.by_language.entry(language.clone()).or_default().push(name.clone());
        }
        tables.eager.insert(name, instance);
        Ok(())
    }

    /// Registers a formatter built on first access. Construction failure is
    /// cached and returned on every future `get`/`get_by_language` call.
    pub fn register_lazy(
        &self,
        name: impl Into<String>,
        meta: LazyFormatterMeta,
        factory: impl Fn() -> Result<Arc<dyn Formatter>> + Send + Sync + 'static,
    ) -> Result<()> {
        let name = name.into();
        let mut tables = self.tables.write();
        if tables.eager.contains_key(&name) || tables.lazy.contains_key(&name) {
            return Err(Error::validation(format!("formatter '{name}' is already registered")));
        }
        for language in &meta.languages {
            tables.by_language.entry(language.clone()).or_default().push(name.clone());
        }
        tables.lazy.insert(
            name,
            Arc::new(LazyFormatterEntry { meta, factory: Arc::new(factory), cell: OnceCell::new() }),
        );
        Ok(())
    }

    pub fn unregister(&self, name: &str) {
        let mut tables = self.tables.write();
        tables.eager.remove(name);
        tables.lazy.remove(name);
        for names in tables.by_language.values_mut() {
            names.retain(|n| n != name);
        }
        tables.by_language.retain(|_, names| !names.is_empty());
    }

    /// Resolves a formatter by name, building it if it's a lazy entry whose
    /// cell hasn't fired yet.
    pub async fn get(&self, name: &str) -> Result<Arc<dyn Formatter>> {
        let (eager, lazy) = {
            let tables = self.tables.read();
            (tables.eager.get(name).cloned(), tables.lazy.get(name).cloned())
        };
        if let Some(instance) = eager {
            return Ok(instance);
        }
        if let Some(entry) = lazy {
            return entry.get().await;
        }
        Err(Error::not_found(format!("no formatter registered for '{name}'")))
    }

    /// Names registered for `language`, in registration order.
    pub fn names_for_language(&self, language: &str) -> Vec<String> {
        self.tables.read().by_language.get(language).cloned().unwrap_or_default()
    }

    pub async fn get_by_language(&self, language: &str) -> Result<Arc<dyn Formatter>> {
        let name = self
            .names_for_language(language)
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("no formatter registered for language '{language}'")))?;
        self.get(&name).await
    }

    /// If `prefs[language]` names a registered formatter, use it; else the
    /// first formatter registered for the language.
    pub async fn get_preferred_formatter(
        &self,
        language: &str,
        prefs: &HashMap<String, String>,
    ) -> Result<Arc<dyn Formatter>> {
        if let Some(name) = prefs.get(language) {
            return self.get(name).await;
        }
        self.get_by_language(language).await
    }

    /// Every currently-eager (already-built) formatter instance, for health
    /// checks — lazy entries that have never been touched are not forced.
    pub fn instantiated(&self) -> Vec<Arc<dyn Formatter>> {
        let tables = self.tables.read();
        let mut instances: Vec<Arc<dyn Formatter>> = tables.eager.values().cloned().collect();
        for entry in tables.lazy.values() {
            if let Some(Ok(instance)) = entry.cell.get() {
                instances.push(instance.clone());
            }
        }
        instances
    }
}
