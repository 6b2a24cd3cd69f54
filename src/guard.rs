//! Caller allow-list check.

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    allowed: HashSet<String>,
}

impl AccessGuard {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: ids
                .into_iter()
                .map(Into::<String>::into)
                .filter(|id| !id.is_empty())
                .collect(),
        }
    }

    /// Exact match only. Absent and empty identities are never allowed.
    #[must_use]
    pub fn is_allowed(&self, identity: Option<&str>) -> bool {
        match identity {
            Some(id) if !id.is_empty() => self.allowed.contains(id),
            _ => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
