use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::audit::parse_color;
use crate::remediation::{RemediationSuggestion, SuggestionType};

/// Keys under which a blok nests its children.
pub const CHILD_KEYS: &[&str] = &["body", "columns"];

/// Result of applying one suggestion. `content` is the input tree when nothing
/// was applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchOutcome {
    pub applied: bool,
    pub content: Value,
}

/// Rebuild `tree` with the first node accepted by `matches` replaced by its
/// patched copy. Ancestors of that node are copied; the input is never touched.
/// Returns `None` when no node matches.
pub fn rewrite_tree<M, P>(tree: &Value, matches: &M, patch: &P) -> Option<Value>
where
    M: Fn(&Map<String, Value>) -> bool,
    P: Fn(&mut Map<String, Value>),
{
    let node = tree.as_object()?;
    if matches(node) {
        let mut patched = node.clone();
        patch(&mut patched);
        return Some(Value::Object(patched));
    }

    for key in CHILD_KEYS {
        let Some(children) = node.get(*key).and_then(Value::as_array) else {
            continue;
        };
        for (index, child) in children.iter().enumerate() {
            if let Some(replacement) = rewrite_tree(child, matches, patch) {
                let mut siblings = children.clone();
                siblings[index] = replacement;
                let mut rebuilt = node.clone();
                rebuilt.insert((*key).to_string(), Value::Array(siblings));
                return Some(Value::Object(rebuilt));
            }
        }
    }

    None
}

/// Field values a suggestion writes onto its target node, keyed by type.
/// `None` when the type has no patch or the suggestion lacks usable values.
pub fn field_patch(suggestion: &RemediationSuggestion) -> Option<Map<String, Value>> {
    let text = suggestion.suggestion.trim();
    let fields = match suggestion.kind {
        SuggestionType::AltText => json!({ "alt": text }),
        SuggestionType::AriaLabel => json!({ "aria_label": text }),
        SuggestionType::HeadingStructure => json!({ "level": heading_level(text)? }),
        SuggestionType::ColorContrast => {
            let (color, background) = color_pair(text)?;
            json!({ "color": color, "background_color": background })
        }
        SuggestionType::FocusManagement => json!({ "tabindex": 0, "focusable": true }),
        SuggestionType::Unknown => return None,
    };

    match fields {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Apply `suggestion` to the node whose `_uid` equals its `componentId`.
pub fn apply_suggestion(tree: &Value, suggestion: &RemediationSuggestion) -> PatchOutcome {
    let unchanged = || PatchOutcome {
        applied: false,
        content: tree.clone(),
    };

    let Some(component_id) = suggestion.component_id.as_deref() else {
        debug!(kind = ?suggestion.kind, "suggestion has no component id; nothing to patch");
        return unchanged();
    };
    let Some(fields) = field_patch(suggestion) else {
        debug!(kind = ?suggestion.kind, component_id, "no content patch for suggestion");
        return unchanged();
    };

    let matches = |node: &Map<String, Value>| {
        node.get("_uid").and_then(Value::as_str) == Some(component_id)
    };
    let patch = |node: &mut Map<String, Value>| {
        for (key, value) in &fields {
            node.insert(key.clone(), value.clone());
        }
    };

    match rewrite_tree(tree, &matches, &patch) {
        Some(content) => PatchOutcome {
            applied: true,
            content,
        },
        None => {
            debug!(component_id, "remediation target not found in content tree");
            unchanged()
        }
    }
}

/// Target heading level: the last `h1`..`h6` named in the text ("change the h3
/// to an h2" means 2), else the last bare digit 1 to 6.
fn heading_level(text: &str) -> Option<u8> {
    static HEADING: OnceLock<Option<Regex>> = OnceLock::new();
    let named = HEADING
        .get_or_init(|| Regex::new(r"(?i)\bh([1-6])\b").ok())
        .as_ref()
        .and_then(|pattern| pattern.captures_iter(text).last())
        .and_then(|caps| caps[1].parse::<u8>().ok());
    if named.is_some() {
        return named;
    }

    text.chars()
        .filter_map(|c| c.to_digit(10))
        .filter(|digit| (1..=6).contains(digit))
        .last()
        .map(|digit| digit as u8)
}

fn color_pair(text: &str) -> Option<(String, String)> {
    static HEX: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = HEX
        .get_or_init(|| Regex::new(r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b").ok())
        .as_ref()?;

    let mut colors = pattern
        .find_iter(text)
        .filter_map(|found| parse_color(found.as_str()))
        .map(|rgb| rgb.to_string());
    Some((colors.next()?, colors.next()?))
}
