//! Profile editing: form state, change detection and the merge write.

use garde::Validate;

use crate::backend::DocumentStore;
use crate::forms::{validate_display_name, FieldErrors};
use crate::models::{UserPatch, UserProfile, AVATAR_PRESETS, DEFAULT_AVATAR};
use crate::{Error, Result};

pub const PROFILE_SAVED_NOTICE: &str = "Profile updated successfully!";
pub const PROFILE_SAVE_FAILED_NOTICE: &str = "Failed to update profile.";

fn validate_avatar(value: &str, _ctx: &()) -> garde::Result {
    if AVATAR_PRESETS.contains(&value) {
        Ok(())
    } else {
        Err(garde::Error::new("Choose one of the available avatars"))
    }
}

/// Editable profile fields
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ProfileForm {
    #[garde(custom(validate_display_name))]
    pub name: String,
    #[garde(custom(validate_avatar))]
    pub avatar_url: String,
}

impl ProfileForm {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            avatar_url: profile.avatar_or_default().to_string(),
        }
    }
}

/// Form state seeded from the session profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEditor {
    initial: ProfileForm,
    pub values: ProfileForm,
}

impl ProfileEditor {
    pub fn new(profile: &UserProfile) -> Self {
        let initial = ProfileForm::from_profile(profile);
        Self {
            values: initial.clone(),
            initial,
        }
    }

    /// Submission is allowed only when a field differs from the snapshot
    pub fn has_changes(&self) -> bool {
        self.values != self.initial
    }

    /// Patch holding only the changed fields
    pub fn changes(&self) -> UserPatch {
        let name = self.values.name.trim();
        UserPatch {
            name: (name != self.initial.name).then(|| name.to_string()),
            email: None,
            avatar_url: (self.values.avatar_url != self.initial.avatar_url)
                .then(|| self.values.avatar_url.clone()),
        }
    }

    pub fn errors(&self) -> FieldErrors {
        self.values
            .validate()
            .err()
            .map(|report| FieldErrors::from_report(&report))
            .unwrap_or_default()
    }

    /// Re-seed after a successful save, so the form starts clean again
    pub fn rebase(&mut self, profile: &UserProfile) {
        *self = Self::new(profile);
    }

    pub fn select_avatar(&mut self, index: usize) {
        self.values.avatar_url = AVATAR_PRESETS
            .get(index)
            .copied()
            .unwrap_or(DEFAULT_AVATAR)
            .to_string();
    }
}

/// Validate and merge-write the changed profile fields.
///
/// Fails with [`Error::NoChanges`] without writing when nothing differs.
/// The session store picks the change up through its live subscription.
pub async fn save_profile<S: DocumentStore>(
    store: &S,
    profile: &UserProfile,
    editor: &ProfileEditor,
) -> Result<UserPatch> {
    let errors = editor.errors();
    if !errors.is_empty() {
        return Err(Error::Validation(errors.to_string()));
    }

    let patch = editor.changes();
    if !editor.has_changes() || patch.is_empty() {
        return Err(Error::NoChanges);
    }

    store.merge_user(&profile.id, &patch).await.map_err(|error| {
        tracing::error!("Error updating profile {}: {}", profile.id, error);
        Error::from(error)
    })?;

    tracing::info!("Profile {} updated", profile.id);
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backend::MemoryBackend;

    async fn alice(backend: &MemoryBackend) -> UserProfile {
        let id = backend.add_account("alice@example.com", "secret1", "Alice");
        backend.get_user(&id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn unchanged_form_cannot_be_saved() {
        let backend = MemoryBackend::new();
        let profile = alice(&backend).await;
        let editor = ProfileEditor::new(&profile);

        assert!(!editor.has_changes());
        let result = save_profile(&backend, &profile, &editor).await;
        assert!(matches!(result, Err(Error::NoChanges)));
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn only_changed_fields_are_written() {
        let backend = MemoryBackend::new();
        let profile = alice(&backend).await;
        let mut editor = ProfileEditor::new(&profile);
        editor.select_avatar(2);

        let patch = save_profile(&backend, &profile, &editor).await.unwrap();
        assert_eq!(
            patch,
            UserPatch {
                avatar_url: Some(AVATAR_PRESETS[2].to_string()),
                ..UserPatch::default()
            }
        );

        let stored = backend.get_user(&profile.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Alice");
        assert_eq!(stored.avatar_url.as_deref(), Some(AVATAR_PRESETS[2]));
    }

    #[tokio::test]
    async fn invalid_name_is_rejected_without_writing() {
        let backend = MemoryBackend::new();
        let profile = alice(&backend).await;
        let mut editor = ProfileEditor::new(&profile);
        editor.values.name = "A".to_string();

        assert_eq!(
            editor.errors().get("name"),
            Some("Name must be at least 2 characters")
        );
        let result = save_profile(&backend, &profile, &editor).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn saved_name_reaches_user_watch() {
        let backend = MemoryBackend::new();
        let profile = alice(&backend).await;
        let mut watch = backend.watch_user(&profile.id);
        watch.latest();

        let mut editor = ProfileEditor::new(&profile);
        editor.values.name = "  Alicia ".to_string();
        save_profile(&backend, &profile, &editor).await.unwrap();

        let updated = watch.latest().flatten().unwrap();
        assert_eq!(updated.name, "Alicia");
        editor.rebase(&updated);
        assert!(!editor.has_changes());
    }

    #[test]
    fn profile_without_avatar_starts_on_default() {
        let profile = UserProfile::new("u".into(), "Bob");
        let editor = ProfileEditor::new(&profile);
        assert_eq!(editor.values.avatar_url, DEFAULT_AVATAR);
        assert!(editor.errors().is_empty());
    }
}
