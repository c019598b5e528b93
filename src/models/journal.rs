use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// A dated journal entry, optionally linked to a prayer. The link is
/// advisory: deleting the prayer leaves the entry (and its link) in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub date: String,
    pub linked_prayer_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewJournal {
    pub content: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_prayer_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct JournalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_prayer_id: Option<Option<String>>,
}

impl JournalPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.date.is_none() && self.linked_prayer_id.is_none()
    }
}

impl Entity for Journal {
    type Patch = JournalPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: &JournalPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        if let Some(link) = &patch.linked_prayer_id {
            self.linked_prayer_id = link.clone();
        }
    }
}
