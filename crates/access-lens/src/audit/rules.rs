//! Built-in rule auditor over parsed HTML.
//!
//! Implements the axe-core rules the preview relies on (`image-alt`, `label`,
//! `link-name`, `color-contrast`) with the same tag vocabulary, so the records
//! it emits score identically to those of the browser-side engine. A rule with
//! no applicable nodes is reported in neither list.

use std::collections::HashSet;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::contrast::{contrast_ratio, inline_colors, AA_NORMAL_TEXT};
use super::{Impact, NodeRef, RuleAuditResult, RuleAuditor, RuleRecord, RuleSet};
use crate::content::escape_html;
use crate::oracle::OracleError;

const HELP_URL_BASE: &str = "https://dequeuniversity.com/rules/axe/4.8";

/// Auditor evaluating inline HTML without a browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRuleAuditor;

#[async_trait]
impl RuleAuditor for HtmlRuleAuditor {
    async fn run_audit(
        &self,
        html: &str,
        rules: &RuleSet,
    ) -> Result<RuleAuditResult, OracleError> {
        Ok(audit_html(html, rules))
    }
}

/// Run every enabled built-in rule against `html`.
pub fn audit_html(html: &str, rules: &RuleSet) -> RuleAuditResult {
    let document = Html::parse_document(html);
    let mut result = RuleAuditResult::default();

    for definition in RULES.iter().filter(|rule| rules.is_enabled(rule.id)) {
        let evaluation = (definition.evaluate)(&document);
        if evaluation.applicable == 0 {
            continue;
        }

        if evaluation.failures.is_empty() {
            result.passes.push(definition.record());
        } else {
            result.violations.push(
                definition
                    .record()
                    .with_impact(definition.impact)
                    .with_nodes(evaluation.failures),
            );
        }
    }

    debug!(
        passes = result.passes.len(),
        violations = result.violations.len(),
        "html audit finished"
    );
    result
}

struct RuleDefinition {
    id: &'static str,
    tags: &'static [&'static str],
    impact: Impact,
    description: &'static str,
    help: &'static str,
    evaluate: fn(&Html) -> RuleEvaluation,
}

impl RuleDefinition {
    fn record(&self) -> RuleRecord {
        let mut record = RuleRecord::new(self.id, self.tags.iter().copied());
        record.description = self.description.to_string();
        record.help = self.help.to_string();
        record.help_url = format!("{HELP_URL_BASE}/{}", self.id);
        record
    }
}

#[derive(Default)]
struct RuleEvaluation {
    applicable: usize,
    failures: Vec<NodeRef>,
}

impl RuleEvaluation {
    fn check(&mut self, element: ElementRef<'_>, passed: bool, failure_summary: impl Into<String>) {
        self.applicable += 1;
        if !passed {
            self.failures.push(node_ref(element, failure_summary.into()));
        }
    }
}

const RULES: &[RuleDefinition] = &[
    RuleDefinition {
        id: RuleSet::COLOR_CONTRAST,
        tags: &["cat.color", "wcag2aa", "wcag143"],
        impact: Impact::Serious,
        description: "Ensures the contrast between foreground and background colors meets WCAG 2 AA minimum contrast ratio thresholds",
        help: "Elements must meet minimum color contrast ratio thresholds",
        evaluate: evaluate_color_contrast,
    },
    RuleDefinition {
        id: RuleSet::IMAGE_ALT,
        tags: &["cat.text-alternatives", "wcag2a", "wcag111", "section508"],
        impact: Impact::Critical,
        description: "Ensures <img> elements have alternate text or a role of none or presentation",
        help: "Images must have alternate text",
        evaluate: evaluate_image_alt,
    },
    RuleDefinition {
        id: RuleSet::LABEL,
        tags: &["cat.forms", "wcag2a", "wcag412", "wcag131"],
        impact: Impact::Critical,
        description: "Ensures every form element has a label",
        help: "Form elements must have labels",
        evaluate: evaluate_label,
    },
    RuleDefinition {
        id: RuleSet::LINK_NAME,
        tags: &["cat.name-role-value", "wcag2a", "wcag412", "wcag244"],
        impact: Impact::Serious,
        description: "Ensures links have discernible text",
        help: "Links must have discernible text",
        evaluate: evaluate_link_name,
    },
];

fn evaluate_image_alt(document: &Html) -> RuleEvaluation {
    let mut evaluation = RuleEvaluation::default();
    for image in document.select(&selector("img")) {
        let attrs = image.value();
        let presentational = attrs
            .attr("role")
            .map(|role| matches!(role.trim(), "presentation" | "none"))
            .unwrap_or(false);
        let passed = attrs.attr("alt").is_some() || presentational || has_aria_name(image);
        evaluation.check(
            image,
            passed,
            "Element does not have an alt attribute, aria-label, or a role of none or presentation",
        );
    }
    evaluation
}

fn evaluate_label(document: &Html) -> RuleEvaluation {
    let explicit_labels: HashSet<&str> = document
        .select(&selector("label[for]"))
        .filter_map(|label| label.value().attr("for"))
        .map(str::trim)
        .collect();

    let mut evaluation = RuleEvaluation::default();
    for control in document.select(&selector("input, select, textarea")) {
        if control.value().name() == "input" {
            let kind = control
                .value()
                .attr("type")
                .unwrap_or("text")
                .trim()
                .to_ascii_lowercase();
            if matches!(
                kind.as_str(),
                "hidden" | "submit" | "button" | "reset" | "image"
            ) {
                continue;
            }
        }

        let wrapped = control
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| ancestor.value().name() == "label");
        let explicit = control
            .value()
            .id()
            .map(|id| explicit_labels.contains(id))
            .unwrap_or(false);
        let passed = wrapped || explicit || has_aria_name(control);

        evaluation.check(
            control,
            passed,
            "Form element does not have an implicit (wrapped) <label>, an explicit <label>, or an aria-label",
        );
    }
    evaluation
}

fn evaluate_link_name(document: &Html) -> RuleEvaluation {
    let image_selector = selector("img[alt]");
    let mut evaluation = RuleEvaluation::default();
    for link in document.select(&selector("a[href]")) {
        let has_text = link.text().any(|chunk| !chunk.trim().is_empty());
        let has_image_name = link
            .select(&image_selector)
            .any(|image| non_blank(image.value().attr("alt")));
        let passed = has_text || has_image_name || has_aria_name(link);
        evaluation.check(
            link,
            passed,
            "Element is in tab order and does not have accessible text",
        );
    }
    evaluation
}

fn evaluate_color_contrast(document: &Html) -> RuleEvaluation {
    let mut evaluation = RuleEvaluation::default();
    for element in document.select(&selector("[style]")) {
        let Some(colors) = element.value().attr("style").and_then(inline_colors) else {
            continue;
        };
        if !element.text().any(|chunk| !chunk.trim().is_empty()) {
            continue;
        }

        let ratio = contrast_ratio(colors.foreground, colors.background);
        evaluation.check(
            element,
            ratio >= AA_NORMAL_TEXT,
            format!(
                "Element has insufficient color contrast of {ratio:.2} (foreground color: {}, background color: {}, expected contrast ratio of {AA_NORMAL_TEXT}:1)",
                colors.foreground, colors.background
            ),
        );
    }
    evaluation
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

fn non_blank(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

fn has_aria_name(element: ElementRef<'_>) -> bool {
    let attrs = element.value();
    non_blank(attrs.attr("aria-label"))
        || non_blank(attrs.attr("aria-labelledby"))
        || non_blank(attrs.attr("title"))
}

fn node_ref(element: ElementRef<'_>, failure_summary: String) -> NodeRef {
    let attrs: String = element
        .value()
        .attrs()
        .map(|(name, value)| format!(" {name}=\"{}\"", escape_html(value)))
        .collect();

    NodeRef {
        html: format!("<{}{}>", element.value().name(), attrs),
        target: vec![target_selector(element)],
        failure_summary: Some(failure_summary),
    }
}

/// CSS path from the nearest id-carrying ancestor (or `body`) to `element`.
fn target_selector(element: ElementRef<'_>) -> String {
    let mut segments = Vec::new();
    let mut current = Some(element);

    while let Some(node) = current {
        let name = node.value().name();
        if matches!(name, "html" | "body") {
            break;
        }
        if let Some(id) = node.value().id() {
            segments.push(format!("#{id}"));
            break;
        }

        let same_tag = |sibling: &ElementRef<'_>| sibling.value().name() == name;
        let earlier = node
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .filter(same_tag)
            .count();
        let later = node
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .any(|sibling| same_tag(&sibling));

        if earlier == 0 && !later {
            segments.push(name.to_string());
        } else {
            segments.push(format!("{name}:nth-of-type({})", earlier + 1));
        }
        current = node.parent().and_then(ElementRef::wrap);
    }

    segments.reverse();
    segments.join(" > ")
}
