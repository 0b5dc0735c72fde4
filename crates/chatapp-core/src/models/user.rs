//! User profile model

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Avatars offered by the profile editor.
pub const AVATAR_PRESETS: [&str; 3] = [
    "/Images/Avatar_1.png",
    "/Images/Avatar_2.png",
    "/Images/Avatar_3.png",
];

/// Avatar assigned on registration and used when a profile has none.
pub const DEFAULT_AVATAR: &str = AVATAR_PRESETS[0];

/// Identifier of a user record, shared with the auth provider's user id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier issued by the auth provider
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (UUID v7)
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A record in the `users` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Record key, equal to the auth user id
    pub id: UserId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Sign-in email, shown in the user directory
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar image reference
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            avatar_url: None,
        }
    }

    /// Avatar reference, falling back to [`DEFAULT_AVATAR`]
    pub fn avatar_or_default(&self) -> &str {
        self.avatar_url.as_deref().unwrap_or(DEFAULT_AVATAR)
    }

    /// Merge the fields present in `patch` into this profile
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(avatar_url) = &patch.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
    }
}

/// Partial user record for merge writes; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserPatch {
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.avatar_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_generate_unique() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn test_user_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn test_profile_apply_merges_present_fields_only() {
        let mut profile = UserProfile {
            id: UserId::new("u1"),
            name: "Alice".to_string(),
            email: Some("alice@example.com".to_string()),
            avatar_url: Some(AVATAR_PRESETS[1].to_string()),
        };
        profile.apply(&UserPatch {
            name: Some("Alicia".to_string()),
            ..Default::default()
        });

        assert_eq!(profile.name, "Alicia");
        assert_eq!(profile.email.as_deref(), Some("alice@example.com"));
        assert_eq!(profile.avatar_url.as_deref(), Some(AVATAR_PRESETS[1]));
    }

    #[test]
    fn test_patch_skips_absent_fields_when_serialized() {
        let patch = UserPatch {
            avatar_url: Some(DEFAULT_AVATAR.to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "avatar_url": DEFAULT_AVATAR }));
        assert!(UserPatch::default().is_empty());
    }

    #[test]
    fn test_profile_missing_fields_deserialize_to_defaults() {
        let profile: UserProfile = serde_json::from_str(r#"{ "id": "u9" }"#).unwrap();
        assert_eq!(profile.name, "");
        assert_eq!(profile.avatar_or_default(), DEFAULT_AVATAR);
    }
}
