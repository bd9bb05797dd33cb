// Inline CSS inference.
//
// Reads the handful of declarations from an element's `style` attribute that
// map onto inline styles. This is not a CSS engine: declarations are looked up
// by exact property name, shorthands are not expanded.

use std::collections::HashSet;

use markup5ever_rcdom::Handle;

use super::util::get_attr;
use crate::model::InlineStyle;

pub(crate) const BOLD: &str = "BOLD";
pub(crate) const ITALIC: &str = "ITALIC";
pub(crate) const UNDERLINE: &str = "UNDERLINE";
pub(crate) const STRIKETHROUGH: &str = "STRIKETHROUGH";
pub(crate) const CODE: &str = "CODE";
pub(crate) const HIGHLIGHT: &str = "HIGHLIGHT";

// https://developer.mozilla.org/en-US/docs/Web/CSS/font-weight
const BOLD_VALUES: &[&str] = &["bold", "bolder", "500", "600", "700", "800", "900"];
const NOT_BOLD_VALUES: &[&str] = &["light", "lighter", "normal", "100", "200", "300", "400"];

/// Inline style implied by a tag name alone.
pub(crate) fn style_for_tag(tag: &str) -> Option<&'static str> {
    match tag {
        "b" | "strong" => Some(BOLD),
        "i" | "em" => Some(ITALIC),
        "u" => Some(UNDERLINE),
        "s" | "strike" | "del" => Some(STRIKETHROUGH),
        "code" => Some(CODE),
        "mark" => Some(HIGHLIGHT),
        _ => None,
    }
}

/// Parsed declarations of a `style` attribute.
#[derive(Debug, Default)]
pub(crate) struct Declarations {
    entries: Vec<(String, String)>,
}

impl Declarations {
    pub fn parse(style: &str) -> Self {
        let entries = style
            .split(';')
            .filter_map(|declaration| {
                let (name, value) = declaration.split_once(':')?;
                let name = name.trim().to_ascii_lowercase();
                let value = value.trim();
                let value = value
                    .strip_suffix("!important")
                    .map_or(value, str::trim_end);
                if name.is_empty() || value.is_empty() || !balanced_quotes(value) {
                    return None;
                }
                Some((name, value.to_string()))
            })
            .collect();
        Self { entries }
    }

    /// Declarations from an element's `style` attribute.
    pub fn of(handle: &Handle) -> Self {
        get_attr(handle, "style").map(|s| Self::parse(&s)).unwrap_or_default()
    }

    /// Value of the last declaration for `property`.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Keyword value, lowercased.
    fn keyword(&self, property: &str) -> Option<String> {
        self.get(property).map(str::to_ascii_lowercase)
    }

    pub fn is_pre_wrap(&self) -> bool {
        self.keyword("white-space").as_deref() == Some("pre-wrap")
    }

    pub fn is_monospace(&self) -> bool {
        self.keyword("font-family")
            .is_some_and(|family| family.contains("monospace"))
    }
}

/// Browsers drop a declaration whose quotes never close.
fn balanced_quotes(value: &str) -> bool {
    value.matches('"').count() % 2 == 0 && value.matches('\'').count() % 2 == 0
}

/// Whether the raw `style` attribute mentions `monospace` anywhere, even in a
/// declaration too malformed to parse (some code editors emit those).
pub(crate) fn mentions_monospace(handle: &Handle) -> bool {
    get_attr(handle, "style").is_some_and(|style| style.contains("monospace"))
}

/// Apply style deltas implied by the element's inline CSS.
///
/// Colours are admitted only when `color-<value>` / `bgcolor-<value>` is in
/// `custom_styles`, so pasted content cannot grow the style set without bound.
pub(crate) fn style_from_node_attributes(
    declarations: &Declarations,
    mut style: InlineStyle,
    custom_styles: &HashSet<String>,
) -> InlineStyle {
    if let Some(weight) = declarations.keyword("font-weight") {
        if BOLD_VALUES.contains(&weight.as_str()) {
            style.insert(BOLD.to_string());
        } else if NOT_BOLD_VALUES.contains(&weight.as_str()) {
            style.remove(BOLD);
        }
    }

    match declarations.keyword("font-style").as_deref() {
        Some("italic") => {
            style.insert(ITALIC.to_string());
        }
        Some("normal") => {
            style.remove(ITALIC);
        }
        _ => {}
    }

    match declarations.keyword("text-decoration").as_deref() {
        Some("underline") => {
            style.insert(UNDERLINE.to_string());
        }
        Some("line-through") => {
            style.insert(STRIKETHROUGH.to_string());
        }
        Some("none") => {
            style.remove(UNDERLINE);
            style.remove(STRIKETHROUGH);
        }
        _ => {}
    }

    for (property, prefix) in [("color", "color"), ("background-color", "bgcolor")] {
        if let Some(color) = declarations.get(property) {
            let name = format!("{prefix}-{}", strip_whitespace(&normalize_color(color)));
            if custom_styles.contains(&name) {
                style.insert(name);
            }
        }
    }

    style
}

/// `CODE` when the element's font family is monospace.
pub(crate) fn detect_inline_style(declarations: &Declarations) -> Option<&'static str> {
    declarations.is_monospace().then_some(CODE)
}

/// Report colours the way a browser serializes them: hex notation becomes
/// `rgb(r, g, b)`, keywords are lowercased.
fn normalize_color(value: &str) -> String {
    let value = value.trim().to_ascii_lowercase();
    let Some(hex) = value.strip_prefix('#') else {
        return value;
    };
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return value,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => format!("rgb({r}, {g}, {b})"),
        _ => value,
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}
