//! Content trees authored in the CMS: rendering to HTML for analysis and
//! applying remediation patches.
//!
//! A tree is a JSON object ("blok") with a `component` name, a `_uid`, scalar
//! fields, and children under `body` or `columns`.

mod patch;
mod render;

pub use patch::{apply_suggestion, field_patch, rewrite_tree, PatchOutcome, CHILD_KEYS};
pub use render::{escape_html, render_blok, render_story};

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("content tree must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Reject anything but an object at the root of a content tree.
pub fn ensure_tree(tree: &Value) -> Result<(), ContentError> {
    match tree {
        Value::Object(_) => Ok(()),
        Value::Null => Err(ContentError::NotAnObject("null")),
        Value::Bool(_) => Err(ContentError::NotAnObject("a boolean")),
        Value::Number(_) => Err(ContentError::NotAnObject("a number")),
        Value::String(_) => Err(ContentError::NotAnObject("a string")),
        Value::Array(_) => Err(ContentError::NotAnObject("an array")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_objects_are_trees() {
        assert!(ensure_tree(&json!({ "component": "page" })).is_ok());
        assert_eq!(
            ensure_tree(&json!([1, 2])),
            Err(ContentError::NotAnObject("an array"))
        );
    }
}
