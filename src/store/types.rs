//! To-do item types.

use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;

/// Priority of a to-do item.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    /// Flagged as important.
    High,
    /// No particular priority.
    #[default]
    None,
}

/// A single to-do record.
///
/// `id` is chosen by the caller and is not checked for uniqueness. `description`
/// doubles as the owner used by the `user` list filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TodoItem {
    /// Caller supplied identifier.
    pub id: i64,
    /// Short title.
    pub title: String,
    /// Free text, also matched by the `user` filter.
    pub description: String,
    /// Whether the item is done.
    pub completed: bool,
    /// Priority, `none` when omitted.
    #[serde(default)]
    pub priority: Priority,
}
