// Node handlers for the HTML → blocks walk.
//
// Every node is classified once into a `NodeKind`, then routed to the handler
// for that kind. Handlers either append to the builder's pending text buffer
// or return finished block configs; the buffer is flushed into blocks at
// container and block boundaries.

use markup5ever_rcdom::{Handle, NodeData};
use url::Url;

use super::block_type::{self, BlockTypes};
use super::css::{self, Declarations};
use super::entity;
use super::util::{children, first_descendant_where, get_attr, has_class, tag_name};
use super::whitespace::{normalize_text, ENTITY_PLACEHOLDER};
use super::{BlockConfig, BlocksBuilder, Context, Wrapper};
use crate::model::{EntityKey, EntityType, Mutability};

/// Deeper elements are dropped, subtree and all.
pub(crate) const MAX_NESTING: usize = 128;

/// Marker classes of editor chrome that never carries content.
const SKIPPED_CLASSES: &[&str] = &["brick-code-block-toolbar", "not-display-enter"];

/// Cell marker that makes a `<table>` a table entity.
pub(crate) const TABLE_CELL_CLASS: &str = "brick-table-td";

const MAX_LIST_DEPTH: usize = 4;

/// What a DOM node is, as far as the walk is concerned.
enum NodeKind {
    /// `body` (wrapper `None`), `ul` or `ol`.
    Container(Option<Wrapper>),
    Skipped,
    Block(String, BlockTypes),
    Text(String),
    Break,
    File,
    Table,
    Image,
    Anchor(Url),
    Inline(String),
    Ignored,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

impl BlocksBuilder<'_> {
    fn classify(&self, node: &Handle) -> NodeKind {
        let tag = match &node.data {
            NodeData::Text { contents } => return NodeKind::Text(contents.borrow().to_string()),
            NodeData::Document => return NodeKind::Inline(String::new()),
            NodeData::Element { .. } => tag_name(node).unwrap_or_default(),
            _ => return NodeKind::Ignored,
        };

        match tag.as_str() {
            "body" => return NodeKind::Container(None),
            "ul" => return NodeKind::Container(Some(Wrapper::Ul)),
            "ol" => return NodeKind::Container(Some(Wrapper::Ol)),
            _ => {}
        }
        if SKIPPED_CLASSES.iter().any(|class| has_class(node, class)) {
            return NodeKind::Skipped;
        }
        if let Some(types) = self.block_type_map.get(&tag) {
            return NodeKind::Block(tag, types.clone());
        }
        if tag == "br" {
            return NodeKind::Break;
        }
        if entity::is_valid_file(node) {
            return NodeKind::File;
        }
        if tag == "table" && is_table_entity(node) {
            return NodeKind::Table;
        }
        if entity::is_valid_image(node) {
            return NodeKind::Image;
        }
        if let Some(url) = entity::valid_anchor_url(node, self.options.base_url.as_ref()) {
            return NodeKind::Anchor(url);
        }
        NodeKind::Inline(tag)
    }

    /// Convert sibling nodes, returning the block configs they close.
    /// Inline content stays in the pending buffer.
    pub(crate) fn to_block_configs(&mut self, nodes: &[Handle], context: &Context) -> Vec<BlockConfig> {
        let mut configs = Vec::new();
        for node in nodes {
            match self.classify(node) {
                NodeKind::Container(wrapper) => {
                    configs.extend(self.add_container(node, wrapper, context));
                }
                NodeKind::Block(tag, types) => {
                    configs.extend(self.add_block(node, &tag, &types, context));
                }
                NodeKind::Text(text) => {
                    let text = normalize_text(&text, context.in_code());
                    self.append_text(&text, context);
                }
                NodeKind::Break => self.append_text("\n", context),
                NodeKind::File => {
                    let data = entity::file_data(node);
                    let key = self.entity_map.create(EntityType::File, Mutability::Immutable, data);
                    self.append_placeholder(key, context);
                }
                NodeKind::Table => {
                    let data = self.table_data(node, context.nesting);
                    let key = self.entity_map.create(EntityType::Table, Mutability::Immutable, data);
                    self.append_placeholder(key, context);
                }
                NodeKind::Image => {
                    let data = entity::image_data(node);
                    let key = self.entity_map.create(EntityType::Image, Mutability::Immutable, data);
                    self.append_placeholder(key, context);
                }
                NodeKind::Anchor(url) => {
                    let data = entity::link_data(node, &url);
                    let key = self.entity_map.create(EntityType::Link, Mutability::Mutable, data);
                    let mut child = context.clone();
                    child.entity = Some(key);
                    configs.extend(self.walk_children(node, child));
                }
                NodeKind::Inline(tag) => {
                    configs.extend(self.add_inline(node, &tag, context));
                }
                NodeKind::Skipped | NodeKind::Ignored => {}
            }
        }
        configs
    }

    /// Walk a node's children one level deeper.
    fn walk_children(&mut self, node: &Handle, mut context: Context) -> Vec<BlockConfig> {
        if context.nesting >= MAX_NESTING {
            debug!(nesting = context.nesting, "dropping subtree nested too deep");
            return Vec::new();
        }
        context.nesting += 1;
        self.to_block_configs(&children(node), &context)
    }

    /// Flush pending inline text as unstyled blocks ahead of a new block.
    fn flush_before(&mut self, context: &Context) -> Vec<BlockConfig> {
        self.make_block_list_by_current_text("unstyled", context.depth)
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    fn add_container(
        &mut self,
        node: &Handle,
        list: Option<Wrapper>,
        context: &Context,
    ) -> Vec<BlockConfig> {
        let mut configs = self.flush_before(context);
        let mut child = context.clone();
        if let Some(list) = list {
            if context.wrapper.is_some_and(Wrapper::is_list) {
                child.depth += 1;
            }
            child.wrapper = Some(list);
        }
        configs.extend(self.walk_children(node, child));
        if list.is_none() {
            configs.extend(self.make_block_list_by_current_text(context.flush_type(), context.depth));
        }
        configs
    }

    fn add_block(
        &mut self,
        node: &Handle,
        tag: &str,
        types: &BlockTypes,
        context: &Context,
    ) -> Vec<BlockConfig> {
        let mut configs = self.flush_before(context);

        let mut child = context.clone();
        if tag == "pre" || Declarations::of(node).is_pre_wrap() {
            child.wrapper = Some(Wrapper::Pre);
        }
        let block_type = block_type::resolve(types, tag, child.wrapper, node);
        if !self.options.tree_data && block_type.contains("multi-") {
            child.depth = list_item_depth(node, child.depth);
        }
        let is_monospace = css::mentions_monospace(node);
        child.is_code_block = context.is_code_block || is_monospace;
        let depth = child.depth;
        let in_pre = child.wrapper == Some(Wrapper::Pre);

        let mut child_configs = self.walk_children(node, child);
        self.trim_current_text();
        if in_pre {
            let residual_type = if get_attr(node, "yne-bulb-block").as_deref() == Some("code") {
                "code-block"
            } else {
                block_type.as_str()
            };
            child_configs.extend(self.make_block_list_by_current_text(residual_type, depth));
        }
        if is_monospace {
            for config in &mut child_configs {
                config.block_type = "code-block".to_string();
            }
        }

        // The first line of what is left is this block's own text; further
        // lines (from <br>) become sibling blocks of the same type.
        let mut lines = self.take_lines().into_iter();
        let own = lines.next().unwrap_or_default();
        configs.push(self.block_config(&block_type, depth, own, child_configs));
        for line in lines {
            configs.push(self.block_config(&block_type, depth, line, Vec::new()));
        }
        configs
    }

    fn add_inline(&mut self, node: &Handle, tag: &str, context: &Context) -> Vec<BlockConfig> {
        let declarations = Declarations::of(node);
        let mut child = context.clone();
        if let Some(style) = css::style_for_tag(tag) {
            child.style.insert(style.to_string());
        }
        child.style =
            css::style_from_node_attributes(&declarations, child.style, &self.options.custom_style_map);
        if let Some(style) = css::detect_inline_style(&declarations) {
            child.style.insert(style.to_string());
        }
        if tag == "pre" && declarations.is_monospace() {
            child.wrapper = Some(Wrapper::Pre);
        }
        self.walk_children(node, child)
    }

    /// One placeholder character carrying `key`.
    fn append_placeholder(&mut self, key: EntityKey, context: &Context) {
        let mut child = context.clone();
        child.entity = Some(key);
        let mut placeholder = [0; 4];
        self.append_text(ENTITY_PLACEHOLDER.encode_utf8(&mut placeholder), &child);
    }
}

/// A table is an entity only when it holds editor table cells.
fn is_table_entity(node: &Handle) -> bool {
    first_descendant_where(node, &|n| has_class(n, TABLE_CELL_CLASS)).is_some()
}

/// Depth from the editor's `public-DraftStyleDefault-depthN` class, if any.
fn list_item_depth(node: &Handle, depth: usize) -> usize {
    (0..=MAX_LIST_DEPTH)
        .rev()
        .find(|n| has_class(node, &format!("public-DraftStyleDefault-depth{n}")))
        .unwrap_or(depth)
}
