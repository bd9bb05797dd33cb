// Raw (serializable) document form.
//
// Styles and entities are stored as ranges over each block's text instead of
// per-character metadata. Entity keys are renumbered from 0 in order of first
// appearance, so the entity map only holds entities that blocks reference.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    CharacterMetadata, ContentBlock, EntityData, EntityKey, EntityMap, EntityType, Mutability,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContentState {
    pub blocks: Vec<RawBlock>,
    /// Keyed by the renumbered entity index, as a string.
    pub entity_map: BTreeMap<String, RawEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub key: String,
    pub text: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub depth: usize,
    pub inline_style_ranges: Vec<InlineStyleRange>,
    pub entity_ranges: Vec<EntityRange>,
    pub data: EntityData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub mutability: Mutability,
    pub data: EntityData,
}

/// Encode blocks and the entities they reference.
pub fn to_raw(blocks: &[ContentBlock], entity_map: &EntityMap) -> RawContentState {
    let mut storage: Vec<EntityKey> = Vec::new();
    let mut raw_entities = BTreeMap::new();

    let blocks = blocks
        .iter()
        .map(|block| {
            let entity_ranges = encode_entity_ranges(block, |key| {
                if let Some(index) = storage.iter().position(|k| *k == key) {
                    return index;
                }
                storage.push(key);
                let index = storage.len() - 1;
                if let Some(entity) = entity_map.get(key) {
                    raw_entities.insert(
                        index.to_string(),
                        RawEntity {
                            entity_type: entity.entity_type,
                            mutability: entity.mutability,
                            data: entity.data.clone(),
                        },
                    );
                }
                index
            });
            RawBlock {
                key: block.key.to_string(),
                text: block.text.clone(),
                block_type: block.block_type.clone(),
                depth: block.depth,
                inline_style_ranges: encode_inline_style_ranges(block),
                entity_ranges,
                data: EntityData::new(),
            }
        })
        .collect();

    RawContentState {
        blocks,
        entity_map: raw_entities,
    }
}

/// One range per maximal run of each style. Styles come in the order they
/// first appear in the block; runs of one style in text order.
pub fn encode_inline_style_ranges(block: &ContentBlock) -> Vec<InlineStyleRange> {
    let mut styles: Vec<&str> = Vec::new();
    for metadata in &block.character_list {
        for style in metadata.style() {
            if !styles.contains(&style.as_str()) {
                styles.push(style);
            }
        }
    }

    styles
        .into_iter()
        .flat_map(|style| {
            runs(&block.character_list, move |c| c.has_style(style)).map(move |(offset, length)| {
                InlineStyleRange {
                    offset,
                    length,
                    style: style.to_string(),
                }
            })
        })
        .collect()
}

/// One range per maximal run of the same entity.
fn encode_entity_ranges(
    block: &ContentBlock,
    mut storage_key: impl FnMut(EntityKey) -> usize,
) -> Vec<EntityRange> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let characters = &block.character_list;
    for end in 1..=characters.len() {
        let current = characters[start].entity();
        if end < characters.len() && characters[end].entity() == current {
            continue;
        }
        if let Some(key) = current {
            ranges.push(EntityRange {
                offset: start,
                length: end - start,
                key: storage_key(key),
            });
        }
        start = end;
    }
    ranges
}

/// `(offset, length)` of each maximal run of characters matching `pred`.
fn runs<'a>(
    characters: &'a [CharacterMetadata],
    pred: impl Fn(&CharacterMetadata) -> bool + 'a,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let mut i = 0;
    std::iter::from_fn(move || {
        while i < characters.len() && !pred(&characters[i]) {
            i += 1;
        }
        if i == characters.len() {
            return None;
        }
        let start = i;
        while i < characters.len() && pred(&characters[i]) {
            i += 1;
        }
        Some((start, i - start))
    })
}
