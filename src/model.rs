// Rich-text document model: content blocks, per-character metadata, entities.
//
// Blocks own their text plus one `CharacterMetadata` per `char`. Metadata is
// an immutable shared value, so long runs of identical styling clone an `Arc`
// rather than copying style sets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::edit::Op;

/// Set of inline style identifiers (`BOLD`, `ITALIC`, `color-rgb(0,0,0)`, ...).
pub type InlineStyle = BTreeSet<String>;

/// Arbitrary entity payload.
pub type EntityData = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Character metadata
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Hash, Default)]
struct MetadataInner {
    style: InlineStyle,
    entity: Option<EntityKey>,
}

/// Style set and entity reference attached to a single character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CharacterMetadata(Arc<MetadataInner>);

impl CharacterMetadata {
    pub fn new(style: InlineStyle, entity: Option<EntityKey>) -> Self {
        Self(Arc::new(MetadataInner { style, entity }))
    }

    /// Metadata with no style and no entity.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn style(&self) -> &InlineStyle {
        &self.0.style
    }

    pub fn entity(&self) -> Option<EntityKey> {
        self.0.entity
    }

    pub fn has_style(&self, style: &str) -> bool {
        self.0.style.contains(style)
    }

    /// True when neither a style nor an entity is set.
    pub fn is_empty(&self) -> bool {
        self.0.style.is_empty() && self.0.entity.is_none()
    }

    pub fn with_style(&self, style: &str) -> Self {
        let mut styles = self.0.style.clone();
        styles.insert(style.to_string());
        Self::new(styles, self.0.entity)
    }

    pub fn without_style(&self, style: &str) -> Self {
        let mut styles = self.0.style.clone();
        styles.remove(style);
        Self::new(styles, self.0.entity)
    }

    pub fn with_entity(&self, entity: Option<EntityKey>) -> Self {
        Self::new(self.0.style.clone(), entity)
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Key of an entity in an `EntityMap`. Keys start at 1 and never repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(pub u32);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Link,
    Image,
    File,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mutability {
    Mutable,
    Immutable,
}

/// Structured annotation referenced by characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub mutability: Mutability,
    pub data: EntityData,
}

/// Append-only entity storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityMap {
    entities: BTreeMap<EntityKey, Entity>,
    next_key: u32,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new entity and return its key.
    pub fn create(
        &mut self,
        entity_type: EntityType,
        mutability: Mutability,
        data: EntityData,
    ) -> EntityKey {
        self.next_key += 1;
        let key = EntityKey(self.next_key);
        self.entities.insert(
            key,
            Entity {
                entity_type,
                mutability,
                data,
            },
        );
        key
    }

    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter().map(|(k, v)| (*k, v))
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Unique block identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(pub String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tree references of a block (tree-data mode only).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockLinks {
    pub parent: Option<BlockKey>,
    pub children: Vec<BlockKey>,
    pub prev_sibling: Option<BlockKey>,
    pub next_sibling: Option<BlockKey>,
}

/// A finalized paragraph-like unit of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub key: BlockKey,
    pub block_type: String,
    pub text: String,
    pub character_list: Vec<CharacterMetadata>,
    pub depth: usize,
    /// Present only when the document was built in tree-data mode.
    pub links: Option<BlockLinks>,
}

impl ContentBlock {
    /// An unstyled block holding `text` with empty metadata.
    pub fn unstyled(key: BlockKey, text: &str) -> Self {
        let len = text.chars().count();
        Self {
            key,
            block_type: "unstyled".to_string(),
            text: text.to_string(),
            character_list: vec![CharacterMetadata::empty(); len],
            depth: 0,
            links: None,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.character_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.character_list.is_empty()
    }

    /// Copy of this block with `text` spliced in at `offset`, every new
    /// character carrying `metadata`.
    pub(crate) fn with_inserted_text(
        &self,
        offset: usize,
        text: &str,
        metadata: &CharacterMetadata,
    ) -> Self {
        let byte = char_to_byte(&self.text, offset);
        let mut new_text = String::with_capacity(self.text.len() + text.len());
        new_text.push_str(&self.text[..byte]);
        new_text.push_str(text);
        new_text.push_str(&self.text[byte..]);

        let len = text.chars().count();
        let mut character_list = Vec::with_capacity(self.character_list.len() + len);
        character_list.extend_from_slice(&self.character_list[..offset]);
        character_list.extend(std::iter::repeat_n(metadata.clone(), len));
        character_list.extend_from_slice(&self.character_list[offset..]);

        Self {
            text: new_text,
            character_list,
            ..self.clone()
        }
    }
}

/// Byte index of the `index`-th char (or the end of the string).
pub(crate) fn char_to_byte(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map_or(text.len(), |(byte, _)| byte)
}

// ---------------------------------------------------------------------------
// Selection and content state
// ---------------------------------------------------------------------------

/// A range inside the document; collapsed when anchor and focus coincide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub anchor_key: BlockKey,
    pub anchor_offset: usize,
    pub focus_key: BlockKey,
    pub focus_offset: usize,
    pub is_backward: bool,
}

impl SelectionState {
    /// A caret at `offset` inside block `key`.
    pub fn collapsed(key: BlockKey, offset: usize) -> Self {
        Self {
            anchor_key: key.clone(),
            anchor_offset: offset,
            focus_key: key,
            focus_offset: offset,
            is_backward: false,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    pub fn start_key(&self) -> &BlockKey {
        if self.is_backward {
            &self.focus_key
        } else {
            &self.anchor_key
        }
    }

    pub fn start_offset(&self) -> usize {
        if self.is_backward {
            self.focus_offset
        } else {
            self.anchor_offset
        }
    }

    /// Same selection with anchor and focus both moved to `offset`.
    pub fn with_offset(&self, offset: usize) -> Self {
        Self {
            anchor_offset: offset,
            focus_offset: offset,
            ..self.clone()
        }
    }
}

/// Immutable snapshot of a document: ordered blocks plus their entities.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentState {
    pub(crate) blocks: Vec<ContentBlock>,
    pub(crate) entity_map: EntityMap,
    pub(crate) selection_before: SelectionState,
    pub(crate) selection_after: SelectionState,
    pub(crate) op: Option<Vec<Op>>,
}

impl ContentState {
    /// Build a content state from blocks. Selections start collapsed at the
    /// beginning of the first block.
    ///
    /// # Panics
    ///
    /// Panics if `blocks` is empty; a document always has at least one block.
    pub fn from_blocks(blocks: Vec<ContentBlock>, entity_map: EntityMap) -> Self {
        assert!(!blocks.is_empty(), "a content state needs at least one block");
        let selection = SelectionState::collapsed(blocks[0].key.clone(), 0);
        Self {
            blocks,
            entity_map,
            selection_before: selection.clone(),
            selection_after: selection,
            op: None,
        }
    }

    /// One unstyled block per line of `text`.
    pub fn create_from_text(text: &str) -> Self {
        let mut keys = crate::keys::KeyGenerator::new();
        let blocks = text
            .split('\n')
            .map(|line| ContentBlock::unstyled(keys.block_key(), line))
            .collect();
        Self::from_blocks(blocks, EntityMap::new())
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn entity_map(&self) -> &EntityMap {
        &self.entity_map
    }

    pub fn selection_before(&self) -> &SelectionState {
        &self.selection_before
    }

    pub fn selection_after(&self) -> &SelectionState {
        &self.selection_after
    }

    /// Diff operations computed by the last edit, if any.
    pub fn op(&self) -> Option<&[Op]> {
        self.op.as_deref()
    }

    pub fn block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|block| &block.key == key)
    }

    pub fn block_for_key(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.blocks.iter().find(|block| &block.key == key)
    }
}
