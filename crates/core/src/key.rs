//! Instance keys identifying one mounted query or mutation component.

use crate::error::{Error, Result};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Global counter for instance key allocation.
static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(0);

/// Gets the next process-unique instance number.
pub fn next_instance_id() -> u64 {
    NEXT_INSTANCE.fetch_add(1, Ordering::SeqCst)
}

/// A process-unique identifier for one component's data-fetching lifecycle.
///
/// Allocated keys look like `q3`; adding a user key yields `q3[todo-7]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey(String);

impl InstanceKey {
    /// Wraps a caller-chosen key. The key must be non-empty.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(Error::invalid_key("instance key must not be empty"));
        }
        Ok(Self(raw))
    }

    /// Allocates a fresh key from the process-wide counter.
    pub fn allocate(prefix: &str) -> Self {
        Self(format!("{}{}", prefix, next_instance_id()))
    }

    /// Derives the key of one use of a component from its base key.
    pub fn with_user_key(&self, user_key: &str) -> Self {
        Self(format!("{}[{}]", self.0, user_key))
    }

    /// Derives a key from an optional user key.
    pub fn scoped(&self, user_key: Option<&str>) -> Self {
        match user_key {
            Some(key) => self.with_user_key(key),
            None => self.clone(),
        }
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the allocated part of the key, without any user key.
    pub fn base(&self) -> &str {
        match self.0.find('[') {
            Some(idx) if self.0.ends_with(']') => &self.0[..idx],
            _ => &self.0,
        }
    }

    /// Returns the user key, if the key was derived with one.
    pub fn user_key(&self) -> Option<&str> {
        let idx = self.0.find('[')?;
        self.0[idx + 1..].strip_suffix(']')
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InstanceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_unique() {
        let a = InstanceKey::allocate("q");
        let b = InstanceKey::allocate("q");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with('q'));
        assert!(a.user_key().is_none());
    }

    #[test]
    fn test_with_user_key() {
        let base = InstanceKey::allocate("m");
        let key = base.with_user_key("todo-7");
        assert_eq!(key.as_str(), format!("{}[todo-7]", base));
        assert_eq!(key.base(), base.as_str());
        assert_eq!(key.user_key(), Some("todo-7"));
    }

    #[test]
    fn test_scoped() {
        let base = InstanceKey::allocate("m");
        assert_eq!(base.scoped(None), base);
        assert_eq!(base.scoped(Some("x")).user_key(), Some("x"));
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(InstanceKey::new("").is_err());
        assert!(InstanceKey::new("  ").is_err());
        assert_eq!(InstanceKey::new("pokedex").unwrap().as_str(), "pokedex");
    }

    proptest::proptest! {
        #[test]
        fn test_user_key_round_trip(user in "[a-z0-9-]{1,12}") {
            let base = InstanceKey::allocate("q");
            let key = base.with_user_key(&user);
            proptest::prop_assert_eq!(key.base(), base.as_str());
            proptest::prop_assert_eq!(key.user_key(), Some(user.as_str()));
        }
    }
}
