// Tag → block type resolution.
//
// A render map may bind several block types to one tag (`li` is both the
// ordered and the unordered list item). Those tags resolve through
// `disambiguate`, which reads the editor's class-name conventions.

use std::collections::HashMap;

use markup5ever_rcdom::Handle;

use super::util::has_class;
use super::Wrapper;
use crate::render_map::BlockRenderMap;

/// Candidate block types for one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BlockTypes {
    Single(String),
    Multiple(Vec<String>),
}

/// Mapping from lowercase tag name to candidate block types.
#[derive(Debug, Clone, Default)]
pub(crate) struct BlockTypeMap {
    by_tag: HashMap<String, BlockTypes>,
}

impl BlockTypeMap {
    /// Build the tag lookup out of a render map.
    ///
    /// For the default render map this yields:
    ///   h1..h6 → header-one..header-six, blockquote → blockquote,
    ///   figure → atomic, pre → code-block, div/p → unstyled,
    ///   li → [unordered-list-item, ordered-list-item]
    pub fn from_render_map(render_map: &BlockRenderMap) -> Self {
        let mut by_tag: HashMap<String, BlockTypes> = HashMap::new();
        for (block_type, config) in render_map.iter() {
            let elements = std::iter::once(&config.element).chain(config.aliased_elements.iter());
            for element in elements {
                let element = element.to_ascii_lowercase();
                let entry = match by_tag.remove(&element) {
                    None => BlockTypes::Single(block_type.to_string()),
                    Some(BlockTypes::Single(first)) => {
                        BlockTypes::Multiple(vec![first, block_type.to_string()])
                    }
                    Some(BlockTypes::Multiple(mut types)) => {
                        types.push(block_type.to_string());
                        BlockTypes::Multiple(types)
                    }
                };
                by_tag.insert(element, entry);
            }
        }
        Self { by_tag }
    }

    pub fn get(&self, tag: &str) -> Option<&BlockTypes> {
        self.by_tag.get(tag)
    }
}

const HEADING_CLASSES: &[&str] = &["h1", "h2", "h3", "h4", "h5"];

/// Pick one concrete block type for a tag bound to several.
///
/// List items compose `multi-[qu-][hN-]{ol|ck|ul}` from their classes;
/// blockquotes and h1–h4 map to `multi-qu` / `multi-hN`.
pub(crate) fn disambiguate(tag: &str, _wrapper: Option<Wrapper>, node: &Handle) -> Option<String> {
    match tag {
        "li" => {
            let mut parts = vec!["multi"];
            if has_class(node, "qu") {
                parts.push("qu");
            }
            if let Some(heading) = HEADING_CLASSES.iter().find(|h| has_class(node, h)) {
                parts.push(*heading);
            }
            parts.push(if has_class(node, "ol-item") {
                "ol"
            } else if has_class(node, "ck-item") {
                "ck"
            } else {
                "ul"
            });
            Some(parts.join("-"))
        }
        "blockquote" => Some("multi-qu".to_string()),
        "h1" | "h2" | "h3" | "h4" => Some(format!("multi-{tag}")),
        _ => None,
    }
}

/// Resolve candidates to one block type: disambiguator, then first
/// candidate, then `unstyled`.
pub(crate) fn resolve(
    types: &BlockTypes,
    tag: &str,
    wrapper: Option<Wrapper>,
    node: &Handle,
) -> String {
    match types {
        BlockTypes::Single(block_type) => block_type.clone(),
        BlockTypes::Multiple(candidates) => disambiguate(tag, wrapper, node)
            .or_else(|| candidates.first().cloned())
            .unwrap_or_else(|| "unstyled".to_string()),
    }
}
