//! Contact card data model.
//!
//! This module defines the stored [`ContactCard`] record, the [`CardDraft`]
//! input accepted by save, and the [`CardPatch`] partial update, along with
//! the normalization rules shared by all write paths: required names are
//! trimmed and must be non-empty, and `last_name`/`profession` are folded to
//! lowercase so the secondary-index prefix search matches case-folded
//! queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A stored contact card.
///
/// `last_name` and `profession` are always held in their normalized
/// (trimmed, lowercased) form; the free-form fields are stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCard {
    /// Unique identifier, assigned by the storage layer on first insert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Given name, trimmed, never empty.
    pub first_name: String,

    /// Family name, trimmed and lowercased, never empty. Indexed.
    pub last_name: String,

    /// Profession, trimmed and lowercased, empty string when absent. Indexed.
    pub profession: String,

    /// Honorific or job title, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Postal address, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Email address, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Phone number, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Logo image as a `data:` URL, embedded on render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// QR code image as a `data:` URL, embedded on render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,

    /// When the card was first saved. Never overwritten. Indexed.
    pub created_at: DateTime<Utc>,

    /// When the card was last written. Refreshed on every write.
    pub updated_at: DateTime<Utc>,
}

impl ContactCard {
    /// The full display name, `"first last"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Input to a save operation.
///
/// A draft with no `id` creates a new card; a draft carrying an `id`
/// replaces that card. `created_at` is assigned at save time when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDraft {
    /// Existing card id, or `None` to let storage assign one.
    pub id: Option<i64>,
    /// Given name. Required, checked after trimming.
    pub first_name: String,
    /// Family name. Required, checked after trimming.
    pub last_name: String,
    /// Profession, if any.
    pub profession: Option<String>,
    /// Honorific or job title, if any.
    pub title: Option<String>,
    /// Postal address, if any.
    pub address: Option<String>,
    /// Email address, if any.
    pub email: Option<String>,
    /// Phone number, if any.
    pub phone: Option<String>,
    /// Logo image `data:` URL, if any.
    pub logo_url: Option<String>,
    /// QR code image `data:` URL, if any.
    pub qr_code_url: Option<String>,
    /// Creation timestamp, kept as-is when resaving an existing card.
    pub created_at: Option<DateTime<Utc>>,
}

impl CardDraft {
    /// Create a draft with the two required names set.
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    /// Validate and normalize the draft into a complete [`ContactCard`].
    ///
    /// Runs entirely in memory, before any storage I/O. `created_at` is
    /// taken from the draft when present, otherwise set to `now`;
    /// `updated_at` is always `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `first_name` or `last_name` is
    /// empty after trimming.
    pub fn normalize(self, now: DateTime<Utc>) -> Result<ContactCard> {
        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            return Err(Error::validation("first_name must not be empty"));
        }
        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            return Err(Error::validation("last_name must not be empty"));
        }

        Ok(ContactCard {
            id: self.id,
            first_name: first_name.to_string(),
            last_name: last_name.to_lowercase(),
            profession: self
                .profession
                .as_deref()
                .map(|p| p.trim().to_lowercase())
                .unwrap_or_default(),
            title: self.title,
            address: self.address,
            email: self.email,
            phone: self.phone,
            logo_url: self.logo_url,
            qr_code_url: self.qr_code_url,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        })
    }
}

/// A partial update applied over an existing card.
///
/// Every field is optional. The merge rule is fixed: a field is taken from
/// the patch only when present and non-empty after trimming, otherwise the
/// existing value is kept. `id` and `created_at` are never touched by a
/// patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardPatch {
    /// New given name, if changing.
    pub first_name: Option<String>,
    /// New family name, if changing. Lowercased when taken.
    pub last_name: Option<String>,
    /// New profession, if changing. Lowercased when taken.
    pub profession: Option<String>,
    /// New title, if changing.
    pub title: Option<String>,
    /// New address, if changing.
    pub address: Option<String>,
    /// New email, if changing.
    pub email: Option<String>,
    /// New phone, if changing.
    pub phone: Option<String>,
    /// New logo `data:` URL, if changing.
    pub logo_url: Option<String>,
    /// New QR code `data:` URL, if changing.
    pub qr_code_url: Option<String>,
}

impl CardPatch {
    /// Merge this patch over `existing`, producing the updated card.
    ///
    /// `updated_at` is set to `now`; `id` and `created_at` carry over from
    /// `existing` unconditionally.
    #[must_use]
    pub fn apply_to(&self, existing: &ContactCard, now: DateTime<Utc>) -> ContactCard {
        ContactCard {
            id: existing.id,
            first_name: merge_required(self.first_name.as_deref(), &existing.first_name),
            last_name: merge_required(self.last_name.as_deref(), &existing.last_name)
                .to_lowercase(),
            profession: merge_required(self.profession.as_deref(), &existing.profession)
                .to_lowercase(),
            title: merge_optional(self.title.as_deref(), existing.title.as_ref()),
            address: merge_optional(self.address.as_deref(), existing.address.as_ref()),
            email: merge_optional(self.email.as_deref(), existing.email.as_ref()),
            phone: merge_optional(self.phone.as_deref(), existing.phone.as_ref()),
            logo_url: merge_optional(self.logo_url.as_deref(), existing.logo_url.as_ref()),
            qr_code_url: merge_optional(self.qr_code_url.as_deref(), existing.qr_code_url.as_ref()),
            created_at: existing.created_at,
            updated_at: now,
        }
    }
}

/// Take the new value when present and non-empty after trimming, else keep
/// the old one.
fn merge_required(new: Option<&str>, old: &str) -> String {
    match new.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => old.to_string(),
    }
}

fn merge_optional(new: Option<&str>, old: Option<&String>) -> Option<String> {
    match new.map(str::trim) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => old.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_normalize_trims_and_folds() {
        let card = CardDraft::new("  Jean ", " Dupont  ")
            .normalize(now())
            .unwrap();

        assert_eq!(card.first_name, "Jean");
        assert_eq!(card.last_name, "dupont");
        assert_eq!(card.profession, "");
        assert!(card.id.is_none());
    }

    #[test]
    fn test_normalize_profession_folded() {
        let mut draft = CardDraft::new("Jean", "Dupont");
        draft.profession = Some("  Architecte DPLG ".to_string());

        let card = draft.normalize(now()).unwrap();
        assert_eq!(card.profession, "architecte dplg");
    }

    #[test]
    fn test_normalize_rejects_empty_first_name() {
        let err = CardDraft::new("", "Dupont").normalize(now()).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("first_name"));
    }

    #[test]
    fn test_normalize_rejects_blank_last_name() {
        let err = CardDraft::new("Jean", "   ").normalize(now()).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("last_name"));
    }

    #[test]
    fn test_normalize_assigns_created_at_when_absent() {
        let stamp = now();
        let card = CardDraft::new("Jean", "Dupont").normalize(stamp).unwrap();
        assert_eq!(card.created_at, stamp);
        assert_eq!(card.updated_at, stamp);
    }

    #[test]
    fn test_normalize_keeps_explicit_created_at() {
        let created = "2024-03-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut draft = CardDraft::new("Jean", "Dupont");
        draft.created_at = Some(created);

        let stamp = now();
        let card = draft.normalize(stamp).unwrap();
        assert_eq!(card.created_at, created);
        assert_eq!(card.updated_at, stamp);
    }

    #[test]
    fn test_normalize_preserves_free_form_fields() {
        let mut draft = CardDraft::new("Jean", "Dupont");
        draft.email = Some("  Jean@Example.COM ".to_string());
        draft.phone = Some("0102030405".to_string());

        let card = draft.normalize(now()).unwrap();
        // Free-form fields are untouched by normalization.
        assert_eq!(card.email.as_deref(), Some("  Jean@Example.COM "));
        assert_eq!(card.phone.as_deref(), Some("0102030405"));
    }

    #[test]
    fn test_full_name() {
        let card = CardDraft::new("Jean", "Dupont").normalize(now()).unwrap();
        assert_eq!(card.full_name(), "Jean dupont");
    }

    fn existing() -> ContactCard {
        let mut draft = CardDraft::new("Jean", "Dupont");
        draft.id = Some(7);
        draft.profession = Some("Chef".to_string());
        draft.phone = Some("0102030405".to_string());
        draft.normalize(now()).unwrap()
    }

    #[test]
    fn test_patch_overwrites_present_fields() {
        let card = existing();
        let patch = CardPatch {
            profession: Some("Sommelier".to_string()),
            ..CardPatch::default()
        };

        let stamp = now();
        let merged = patch.apply_to(&card, stamp);
        assert_eq!(merged.profession, "sommelier");
        assert_eq!(merged.updated_at, stamp);
    }

    #[test]
    fn test_patch_preserves_absent_fields() {
        let card = existing();
        let patch = CardPatch {
            email: Some("jean@example.com".to_string()),
            ..CardPatch::default()
        };

        let merged = patch.apply_to(&card, now());
        assert_eq!(merged.phone.as_deref(), Some("0102030405"));
        assert_eq!(merged.profession, "chef");
        assert_eq!(merged.email.as_deref(), Some("jean@example.com"));
    }

    #[test]
    fn test_patch_empty_value_keeps_old() {
        let card = existing();
        let patch = CardPatch {
            last_name: Some("   ".to_string()),
            phone: Some(String::new()),
            ..CardPatch::default()
        };

        let merged = patch.apply_to(&card, now());
        assert_eq!(merged.last_name, "dupont");
        assert_eq!(merged.phone.as_deref(), Some("0102030405"));
    }

    #[test]
    fn test_patch_never_touches_id_or_created_at() {
        let card = existing();
        let patch = CardPatch {
            first_name: Some("Marie".to_string()),
            ..CardPatch::default()
        };

        let merged = patch.apply_to(&card, now());
        assert_eq!(merged.id, Some(7));
        assert_eq!(merged.created_at, card.created_at);
    }

    #[test]
    fn test_patch_folds_last_name() {
        let card = existing();
        let patch = CardPatch {
            last_name: Some("MARTINEZ".to_string()),
            ..CardPatch::default()
        };

        let merged = patch.apply_to(&card, now());
        assert_eq!(merged.last_name, "martinez");
    }

    #[test]
    fn test_card_serialization_round_trip() {
        let card = existing();
        let json = serde_json::to_string(&card).unwrap();
        let back: ContactCard = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
    }

    #[test]
    fn test_draft_deserializes_with_defaults() {
        let draft: CardDraft =
            serde_json::from_str(r#"{"first_name": "Jean", "last_name": "Dupont"}"#).unwrap();
        assert!(draft.id.is_none());
        assert!(draft.profession.is_none());
        assert!(draft.created_at.is_none());
    }
}
