//! Console runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into
//! services; nothing in this crate reads process-wide environment variables
//! during request handling. The binaries read the environment, build a
//! `ConsoleConfig`, and hand the resulting store client to the
//! [`crate::service::ServiceRegistry`].

use crate::service::DEFAULT_PAGE_LIMIT;
use hms_store::{HttpRecordStore, MemoryStore, RecordStore, StoreError};
use hms_types::NonEmptyText;
use std::sync::Arc;

/// Upper bound on the configurable page size; the store refuses larger reads.
pub const MAX_PAGE_LIMIT: usize = 200;

/// Errors from building a [`ConsoleConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("page limit must be between 1 and {MAX_PAGE_LIMIT}, got {0}")]
    PageLimit(usize),
    #[error("store configuration invalid: {0}")]
    Store(#[from] StoreError),
}

/// Configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    store_url: Option<NonEmptyText>,
    store_token: Option<NonEmptyText>,
    page_limit: usize,
}

impl ConsoleConfig {
    /// Creates a new `ConsoleConfig`.
    ///
    /// `store_url: None` selects the in-memory store (the original
    /// console's mock mode). Blank URLs and tokens collapse to absent via
    /// [`NonEmptyText`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::PageLimit` for an out-of-range page limit.
    pub fn new(
        store_url: Option<String>,
        store_token: Option<String>,
        page_limit: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let page_limit = page_limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if page_limit == 0 || page_limit > MAX_PAGE_LIMIT {
            return Err(ConfigError::PageLimit(page_limit));
        }

        Ok(Self {
            store_url: store_url.and_then(|u| NonEmptyText::new(u).ok()),
            store_token: store_token.and_then(|t| NonEmptyText::new(t).ok()),
            page_limit,
        })
    }

    pub fn page_limit(&self) -> usize {
        self.page_limit
    }

    pub fn store_url(&self) -> Option<&str> {
        self.store_url.as_ref().map(NonEmptyText::as_str)
    }

    /// Builds the process-wide store client this configuration selects.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Store` if the configured URL is malformed.
    pub fn build_store(&self) -> Result<Arc<dyn RecordStore>, ConfigError> {
        match &self.store_url {
            Some(url) => {
                let store = HttpRecordStore::new(url.as_str(), self.store_token.clone())?;
                tracing::info!(url = url.as_str(), "using remote record store");
                Ok(Arc::new(store))
            }
            None => {
                tracing::warn!("no store URL configured, falling back to in-memory store");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_url_and_token_are_treated_as_absent() {
        let cfg = ConsoleConfig::new(Some("   ".into()), Some("".into()), None)
            .expect("config should build");
        assert!(cfg.store_url().is_none());
        assert_eq!(cfg.page_limit(), DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn page_limit_bounds_are_enforced() {
        assert!(ConsoleConfig::new(None, None, Some(0)).is_err());
        assert!(ConsoleConfig::new(None, None, Some(MAX_PAGE_LIMIT + 1)).is_err());
        assert!(ConsoleConfig::new(None, None, Some(MAX_PAGE_LIMIT)).is_ok());
    }

    #[test]
    fn missing_url_selects_the_memory_store() {
        let cfg = ConsoleConfig::new(None, None, None).expect("config should build");
        assert!(cfg.build_store().is_ok());
    }

    #[test]
    fn malformed_url_is_rejected_at_startup() {
        let cfg = ConsoleConfig::new(Some("not-a-url".into()), None, None)
            .expect("config should build");
        assert!(matches!(cfg.build_store(), Err(ConfigError::Store(_))));
    }
}
