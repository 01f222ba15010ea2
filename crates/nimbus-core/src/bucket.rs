//! Bucket naming.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Name of the bucket archives are written to.
///
/// Always lowercase. Resolved once per run, either from an explicit override or
/// derived from the team/user pair so repeated runs address the same bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketIdentity(String);

impl BucketIdentity {
    /// `weather-data-{team}-{user}`, lowercased.
    pub fn derive(team: &str, user: &str) -> Self {
        BucketIdentity(format!("weather-data-{}-{}", team, user).to_lowercase())
    }

    /// Use an explicitly configured name (lowercased).
    pub fn from_override(name: &str) -> Self {
        BucketIdentity(name.to_lowercase())
    }

    /// Prefer the override when one is configured.
    pub fn resolve(override_name: Option<&str>, team: &str, user: &str) -> Self {
        match override_name {
            Some(name) => Self::from_override(name),
            None => Self::derive(team, user),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BucketIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
