use serde::{Deserialize, Serialize};

/// Global reference data: predefined prayer tags, ordered for display.
/// Tags are immutable and unowned, so they bypass the entity stores and are
/// fetched directly where needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub icon_name: String,
    pub display_order: i32,
    pub created_at: String,
}
