//! Item store module.
//!
//! This module handles:
//! - The to-do item data model
//! - Loading and saving the whole collection to a JSON file

pub mod json_file;
pub mod types;

pub use json_file::JsonFileStore;
pub use types::{Priority, TodoItem};
