// html2blocks: HTML to rich-text content blocks, plus incremental text insertion.
//
// Architecture:
//   HTML string → cleanup → html5ever parse → walk (block config tree) → content blocks
//   content state + caret + text → new content state + diff ops
//
// Content blocks follow the Draft.js model: one block per paragraph-like
// element, per-character style/entity metadata, entities in a side map.

/// Debug logging, compiled out unless the `tracing` feature is enabled.
macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

pub mod edit;
mod error;
mod html_to_blocks;
mod keys;
pub mod model;
pub mod raw;
mod render_map;

use std::collections::HashSet;

use url::Url;

pub use edit::{insert_text, Op, PathSegment};
pub use error::EditError;
pub use html_to_blocks::{BlocksFromHtml, DomBuilder, Html5everDomBuilder, ParsedDom};
pub use model::{
    BlockKey, BlockLinks, CharacterMetadata, ContentBlock, ContentState, Entity, EntityData,
    EntityKey, EntityMap, EntityType, InlineStyle, Mutability, SelectionState,
};
pub use raw::{to_raw, RawContentState};
pub use render_map::{BlockRenderConfig, BlockRenderMap};

/// Conversion options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Block types and the elements that produce them.
    pub block_render_map: BlockRenderMap,
    /// Colour styles (`color-rgb(…)`, `bgcolor-rgb(…)`) that inline CSS may
    /// produce. Colours outside this set are ignored.
    pub custom_style_map: HashSet<String>,
    /// Keep nested blocks as a tree (with parent/child/sibling links) instead
    /// of flattening them.
    pub tree_data: bool,
    /// Base for resolving relative link targets. Without it, relative links
    /// are not turned into entities.
    pub base_url: Option<Url>,
}

impl Options {
    /// Create a new Options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block render map.
    pub fn with_block_render_map(mut self, block_render_map: BlockRenderMap) -> Self {
        self.block_render_map = block_render_map;
        self
    }

    /// Allow a custom (colour) style.
    pub fn with_custom_style(mut self, style: impl Into<String>) -> Self {
        self.custom_style_map.insert(style.into());
        self
    }

    /// Set whether to keep the block tree.
    pub fn with_tree_data(mut self, tree_data: bool) -> Self {
        self.tree_data = tree_data;
        self
    }

    /// Set the base URL for relative links.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }
}

/// Convert an HTML string to content blocks using default options.
///
/// Returns `None` only when no DOM tree could be built.
///
/// # Examples
///
/// ```
/// let result = html2blocks::convert("<h1>Hello</h1><p>World</p>").unwrap();
/// assert_eq!(result.content_blocks.len(), 2);
/// assert_eq!(result.content_blocks[0].block_type, "header-one");
/// ```
pub fn convert(html: &str) -> Option<BlocksFromHtml> {
    convert_with(html, &Options::default())
}

/// Convert an HTML string to content blocks with custom options.
///
/// # Examples
///
/// ```
/// use html2blocks::{convert_with, Options};
///
/// let options = Options::new().with_tree_data(true);
/// let result = convert_with("<blockquote><p>Hi</p></blockquote>", &options).unwrap();
/// assert!(result.content_blocks[0].links.is_some());
/// ```
pub fn convert_with(html: &str, options: &Options) -> Option<BlocksFromHtml> {
    convert_with_builder(html, options, &Html5everDomBuilder)
}

/// Convert an HTML string using a custom DOM builder.
pub fn convert_with_builder(
    html: &str,
    options: &Options,
    dom_builder: &dyn DomBuilder,
) -> Option<BlocksFromHtml> {
    html_to_blocks::transform(html, options, dom_builder)
}
