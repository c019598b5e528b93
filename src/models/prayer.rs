use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// A prayer request as the backend stores it. Ids and timestamps are
/// server-assigned; the client never fabricates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prayer {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub answered: bool,
    pub tag_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted when creating a prayer. The owner id is attached by the
/// gateway, not the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewPrayer {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub answered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
}

/// Partial update: absent fields stay untouched. `tag_id` is doubly optional
/// so the tag can be cleared (outer None = unchanged, inner None = clear).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<Option<String>>,
}

impl PrayerPatch {
    pub fn answered(value: bool) -> Self {
        Self {
            answered: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.answered.is_none()
            && self.tag_id.is_none()
    }
}

impl Entity for Prayer {
    type Patch = PrayerPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: &PrayerPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(answered) = patch.answered {
            self.answered = answered;
        }
        if let Some(tag_id) = &patch.tag_id {
            self.tag_id = tag_id.clone();
        }
    }
}
