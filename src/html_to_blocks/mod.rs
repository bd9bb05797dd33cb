// HTML tree → content blocks transform.
//
// Parses HTML via html5ever and walks the resulting tree in two passes: the
// walk accumulates inline text and per-character metadata into a tree of
// block configs, then `finalize` turns that tree into content blocks, either
// flattened or with resolved parent/sibling links.

pub(crate) mod block_type;
pub(crate) mod css;
pub(crate) mod entity;
pub(crate) mod finalize;
pub(crate) mod handlers;
pub(crate) mod table;
pub(crate) mod util;
pub(crate) mod whitespace;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, RcDom};

use self::block_type::BlockTypeMap;
use self::whitespace::{split_lines, trim_block_configs, trim_current_text};
use crate::keys::KeyGenerator;
use crate::model::{BlockKey, CharacterMetadata, ContentBlock, EntityKey, EntityMap, InlineStyle};
use crate::Options;

/// Produces a DOM tree out of (already cleaned) HTML.
///
/// Be sure the builder never executes scripts or fetches resources; the
/// converter only reads the returned tree.
pub trait DomBuilder {
    /// Return the parsed tree and the element to convert (normally `<body>`),
    /// or `None` when the markup cannot be turned into a tree.
    fn build(&self, html: &str) -> Option<ParsedDom>;
}

/// Default DOM builder backed by html5ever; converts the `<body>` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5everDomBuilder;

impl DomBuilder for Html5everDomBuilder {
    fn build(&self, html: &str) -> Option<ParsedDom> {
        parse_body(html)
    }
}

/// A parsed document and the element of it to convert.
///
/// Owns the whole tree. Dropping an `RcDom` empties the child lists of all its
/// nodes, including nodes still referenced elsewhere, so `root` is only
/// walkable while this value is alive.
pub struct ParsedDom {
    dom: RcDom,
    root: Handle,
}

impl ParsedDom {
    /// `root` must be a node of `dom`.
    pub fn new(dom: RcDom, root: Handle) -> Self {
        Self { dom, root }
    }

    /// Convert the whole document, starting at its document node.
    pub fn from_document(dom: RcDom) -> Self {
        let root = dom.document.clone();
        Self { dom, root }
    }

    pub fn root(&self) -> &Handle {
        &self.root
    }

    pub fn document(&self) -> &Handle {
        &self.dom.document
    }
}

/// Content blocks and the entities they reference.
#[derive(Debug, Clone, PartialEq)]
pub struct BlocksFromHtml {
    pub content_blocks: Vec<ContentBlock>,
    pub entity_map: EntityMap,
}

/// Clean, parse and convert an HTML string.
pub(crate) fn transform(
    html: &str,
    options: &Options,
    dom_builder: &dyn DomBuilder,
) -> Option<BlocksFromHtml> {
    let html = whitespace::clean_html(html);
    let Some(dom) = dom_builder.build(&html) else {
        debug!("DOM builder produced no tree");
        return None;
    };
    let mut builder = BlocksBuilder::new(options);
    builder.add_dom_node(dom.root());
    Some(builder.finish())
}

/// Parse an HTML string into an html5ever RcDom.
fn parse_html(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

/// Parse an HTML string, rooted at its `<body>` element.
pub(crate) fn parse_body(html: &str) -> Option<ParsedDom> {
    let dom = parse_html(html);
    let body = find_body(&dom.document)?;
    Some(ParsedDom::new(dom, body))
}

fn find_body(handle: &Handle) -> Option<Handle> {
    if util::is_element(handle, "body") {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(find_body)
}

// ---------------------------------------------------------------------------
// Block configs
// ---------------------------------------------------------------------------

/// A block under construction. Lives only while one conversion runs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BlockConfig {
    pub key: BlockKey,
    pub block_type: String,
    pub text: String,
    pub character_list: Vec<CharacterMetadata>,
    pub depth: usize,
    pub child_configs: Vec<BlockConfig>,
}

#[cfg(test)]
impl BlockConfig {
    /// Config with unstyled characters and a throwaway key.
    pub(crate) fn plain(block_type: &str, text: &str, depth: usize) -> Self {
        Self {
            key: BlockKey::new(format!("{block_type}:{text}")),
            block_type: block_type.to_string(),
            text: text.to_string(),
            character_list: vec![CharacterMetadata::empty(); text.chars().count()],
            depth,
            child_configs: Vec::new(),
        }
    }
}

/// Ancestor context that changes how text and depth are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wrapper {
    Pre,
    Ul,
    Ol,
}

impl Wrapper {
    fn is_list(self) -> bool {
        matches!(self, Wrapper::Ul | Wrapper::Ol)
    }
}

/// Walk state inherited by a subtree. Passed by value so nothing set for one
/// subtree leaks into its siblings.
#[derive(Debug, Clone, Default)]
pub(crate) struct Context {
    pub style: InlineStyle,
    pub depth: usize,
    pub wrapper: Option<Wrapper>,
    pub entity: Option<EntityKey>,
    /// Inside an element styled as code (whitespace is preserved).
    pub is_code_block: bool,
    /// Element nesting level, bounded by `handlers::MAX_NESTING`.
    pub nesting: usize,
}

impl Context {
    /// Whether whitespace must be preserved verbatim.
    pub fn in_code(&self) -> bool {
        self.wrapper == Some(Wrapper::Pre) || self.is_code_block
    }

    fn flush_type(&self) -> &'static str {
        if self.wrapper == Some(Wrapper::Pre) {
            "code-block"
        } else {
            "unstyled"
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulates text and block configs across one walk of the DOM.
///
/// Not reentrant: nested conversions (table cells) use their own builder.
pub(crate) struct BlocksBuilder<'a> {
    options: &'a Options,
    block_type_map: BlockTypeMap,
    current_text: String,
    character_list: Vec<CharacterMetadata>,
    block_configs: Vec<BlockConfig>,
    entity_map: EntityMap,
    keys: KeyGenerator,
}

impl<'a> BlocksBuilder<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self {
            options,
            block_type_map: BlockTypeMap::from_render_map(&options.block_render_map),
            current_text: String::new(),
            character_list: Vec::new(),
            block_configs: Vec::new(),
            entity_map: EntityMap::new(),
            keys: KeyGenerator::new(),
        }
    }

    /// Convert `node` and its subtree, appending to the configs built so far.
    pub fn add_dom_node(&mut self, node: &Handle) -> &mut Self {
        self.add_subtree(node, 0)
    }

    /// `add_dom_node` for a subtree found `nesting` levels down another walk.
    pub(crate) fn add_subtree(&mut self, node: &Handle, nesting: usize) -> &mut Self {
        let context = Context {
            nesting,
            ..Context::default()
        };
        let configs = self.to_block_configs(std::slice::from_ref(node), &context);
        self.block_configs.extend(configs);
        // Text left over after the walk becomes trailing blocks.
        let rest = self.make_block_list_by_current_text(context.flush_type(), context.depth);
        self.block_configs.extend(rest);
        trim_block_configs(&mut self.block_configs, false);
        self
    }

    /// Finalize the configs into content blocks.
    pub fn finish(mut self) -> BlocksFromHtml {
        let configs = std::mem::take(&mut self.block_configs);
        let content_blocks = if self.options.tree_data {
            finalize::to_content_blocks(&configs)
        } else {
            finalize::to_flat_content_blocks(configs, &mut self.keys)
        };
        debug!(
            blocks = content_blocks.len(),
            entities = self.entity_map.len(),
            "converted HTML to content blocks"
        );
        BlocksFromHtml {
            content_blocks,
            entity_map: self.entity_map,
        }
    }

    /// Append text to the buffer, one metadata entry per character.
    fn append_text(&mut self, text: &str, context: &Context) {
        self.current_text.push_str(text);
        let metadata = CharacterMetadata::new(context.style.clone(), context.entity);
        let len = text.chars().count();
        self.character_list.extend(std::iter::repeat_n(metadata, len));
    }

    fn trim_current_text(&mut self) {
        trim_current_text(&mut self.current_text, &mut self.character_list);
    }

    fn has_pending_text(&self) -> bool {
        !self.current_text.is_empty()
    }

    /// Build a config with a fresh key.
    fn block_config(
        &mut self,
        block_type: &str,
        depth: usize,
        (text, character_list): (String, Vec<CharacterMetadata>),
        child_configs: Vec<BlockConfig>,
    ) -> BlockConfig {
        BlockConfig {
            key: self.keys.block_key(),
            block_type: block_type.to_string(),
            text,
            character_list,
            depth,
            child_configs,
        }
    }

    /// Take the buffer, split into lines.
    fn take_lines(&mut self) -> Vec<(String, Vec<CharacterMetadata>)> {
        let text = std::mem::take(&mut self.current_text);
        let characters = std::mem::take(&mut self.character_list);
        split_lines(&text, &characters)
    }

    /// Trim the buffer and split it on line breaks, one block per line.
    fn make_block_list_by_current_text(&mut self, block_type: &str, depth: usize) -> Vec<BlockConfig> {
        self.trim_current_text();
        if !self.has_pending_text() {
            return Vec::new();
        }
        self.take_lines()
            .into_iter()
            .map(|line| self.block_config(block_type, depth, line, Vec::new()))
            .collect()
    }
}
