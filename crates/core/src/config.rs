//! Configuration for a Weft context.

use crate::error::{Error, Result};
use crate::types::{ErrorPolicy, FetchPolicy};
use serde::Deserialize;

/// Default prefix of allocated query instance keys.
pub const DEFAULT_QUERY_PREFIX: &str = "q";

/// Default prefix of allocated mutation instance keys.
pub const DEFAULT_MUTATION_PREFIX: &str = "m";

/// Settings shared by every component bound to one context.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use weft_core::ContextConfig;
///
/// let config = ContextConfig::from_json_str(r#"{ "flush_batch": 32 }"#).unwrap();
/// assert_eq!(config.flush_batch, Some(32));
/// assert_eq!(config.query_prefix, "q");
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextConfig {
    /// Prefix of allocated query instance keys.
    pub query_prefix: String,
    /// Prefix of allocated mutation instance keys.
    pub mutation_prefix: String,
    /// Maximum number of notifications applied by one flush. `None` drains
    /// the whole inbox.
    pub flush_batch: Option<usize>,
    /// Fetch policy applied to queries that do not set one.
    pub default_fetch_policy: Option<FetchPolicy>,
    /// Error policy applied to queries that do not set one.
    pub default_error_policy: Option<ErrorPolicy>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            query_prefix: DEFAULT_QUERY_PREFIX.into(),
            mutation_prefix: DEFAULT_MUTATION_PREFIX.into(),
            flush_batch: None,
            default_fetch_policy: None,
            default_error_policy: None,
        }
    }
}

impl ContextConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ContextConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.query_prefix.is_empty() || self.mutation_prefix.is_empty() {
            return Err(Error::config("key prefixes must not be empty"));
        }
        // Keys are `<prefix><counter>`; when one prefix starts the other,
        // a query and a mutation can be allocated the same key.
        if self.query_prefix.starts_with(self.mutation_prefix.as_str())
            || self.mutation_prefix.starts_with(self.query_prefix.as_str())
        {
            return Err(Error::config(
                "query and mutation prefixes must not start with one another",
            ));
        }
        if self.flush_batch == Some(0) {
            return Err(Error::config("flush_batch must be greater than zero"));
        }
        Ok(())
    }

    /// Sets the key prefixes.
    pub fn with_prefixes(mut self, query: impl Into<String>, mutation: impl Into<String>) -> Self {
        self.query_prefix = query.into();
        self.mutation_prefix = mutation.into();
        self
    }

    /// Limits how many notifications one flush applies.
    pub fn with_flush_batch(mut self, batch: usize) -> Self {
        self.flush_batch = Some(batch);
        self
    }

    /// Sets the default fetch policy.
    pub fn with_default_fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.default_fetch_policy = Some(policy);
        self
    }

    /// Sets the default error policy.
    pub fn with_default_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.default_error_policy = Some(policy);
        self
    }
}
