//! Strongly-typed identifiers for the snapcheck agent

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Backend identifier of the authenticated guardian account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Application package identifier, normalized to lowercase.
///
/// Icon URLs and the backend's per-app keys are keyed on the lowercased
/// package name, so the normalization happens at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(package: impl AsRef<str>) -> Self {
        Self(package.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final dot-separated segment, capitalized. Used as a fallback display
    /// name when the platform reports no app label.
    pub fn fallback_app_name(&self) -> String {
        let last = self.0.rsplit('.').next().unwrap_or(&self.0);
        let mut chars = last.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one monitoring session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_id_lowercases() {
        let pkg = PackageId::new("com.WhatsApp");
        assert_eq!(pkg.as_str(), "com.whatsapp");
    }

    #[test]
    fn fallback_app_name_from_last_segment() {
        assert_eq!(PackageId::new("com.whatsapp").fallback_app_name(), "Whatsapp");
        assert_eq!(PackageId::new("org.mozilla.firefox").fallback_app_name(), "Firefox");
        assert_eq!(PackageId::new("standalone").fallback_app_name(), "Standalone");
    }

    #[test]
    fn session_id_uniqueness() {
        let s1 = SessionId::new();
        let s2 = SessionId::new();
        assert_ne!(s1, s2);
    }

    #[test]
    fn ids_serialize_deserialize() {
        let user_id = UserId::new("64fe2a1b");
        let json = serde_json::to_string(&user_id).unwrap();
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(user_id, parsed);
    }
}
