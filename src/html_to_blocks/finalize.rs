// Block config tree → content blocks.

use super::BlockConfig;
use crate::keys::KeyGenerator;
use crate::model::{BlockKey, BlockLinks, CharacterMetadata, ContentBlock};

/// Tree mode: every config becomes a block, pre-order, with parent, children
/// and sibling keys resolved.
pub(crate) fn to_content_blocks(configs: &[BlockConfig]) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    push_tree(configs, None, &mut blocks);
    blocks
}

fn push_tree(configs: &[BlockConfig], parent: Option<&BlockKey>, blocks: &mut Vec<ContentBlock>) {
    for (i, config) in configs.iter().enumerate() {
        let links = BlockLinks {
            parent: parent.cloned(),
            children: config.child_configs.iter().map(|c| c.key.clone()).collect(),
            prev_sibling: i.checked_sub(1).map(|prev| configs[prev].key.clone()),
            next_sibling: configs.get(i + 1).map(|next| next.key.clone()),
        };
        blocks.push(ContentBlock {
            key: config.key.clone(),
            block_type: config.block_type.clone(),
            text: config.text.clone(),
            character_list: config.character_list.clone(),
            depth: config.depth,
            links: Some(links),
        });
        push_tree(&config.child_configs, Some(&config.key), blocks);
    }
}

/// Flat mode: empty `unstyled` containers are replaced by their children,
/// every remaining config absorbs its descendants' text, and an empty block
/// is added before a leading and after a trailing `atomic` block so they
/// cannot merge with neighbouring content.
pub(crate) fn to_flat_content_blocks(
    configs: Vec<BlockConfig>,
    keys: &mut KeyGenerator,
) -> Vec<ContentBlock> {
    let mut configs = hoist_containers(configs);
    if configs.first().is_some_and(is_atomic) {
        configs.insert(0, spacer(keys));
    }
    if configs.last().is_some_and(is_atomic) {
        configs.push(spacer(keys));
    }

    configs
        .into_iter()
        .map(|config| {
            let mut text = config.text;
            let mut character_list = config.character_list;
            extract_text(&config.child_configs, &mut text, &mut character_list);
            ContentBlock {
                key: config.key,
                block_type: config.block_type,
                text,
                character_list,
                depth: config.depth,
                links: None,
            }
        })
        .collect()
}

fn hoist_containers(configs: Vec<BlockConfig>) -> Vec<BlockConfig> {
    configs
        .into_iter()
        .flat_map(|config| {
            if config.block_type != "unstyled" || !config.text.is_empty() {
                vec![config]
            } else {
                hoist_containers(config.child_configs)
            }
        })
        .collect()
}

/// Append descendant text depth-first. Each non-`unstyled` descendant (once
/// there is text) ends a line: the next text that follows is preceded by a
/// `\n` per ended line, copying the metadata of the character before it.
/// Lines still pending at the end are dropped.
fn extract_text(configs: &[BlockConfig], text: &mut String, characters: &mut Vec<CharacterMetadata>) {
    let mut extracted = Extracted::default();
    extracted.push_all(configs);
    text.push_str(&extracted.text);
    characters.extend(extracted.characters);
}

#[derive(Default)]
struct Extracted {
    text: String,
    characters: Vec<CharacterMetadata>,
    pending_breaks: usize,
}

impl Extracted {
    fn push_all(&mut self, configs: &[BlockConfig]) {
        for config in configs {
            if !config.text.is_empty() {
                self.break_lines();
                self.text.push_str(&config.text);
                self.characters.extend(config.character_list.iter().cloned());
            }
            if !self.text.is_empty() && config.block_type != "unstyled" {
                self.pending_breaks += 1;
            }
            self.push_all(&config.child_configs);
        }
    }

    fn break_lines(&mut self) {
        let last = self.characters.last().cloned().unwrap_or_default();
        for _ in 0..std::mem::take(&mut self.pending_breaks) {
            self.text.push('\n');
            self.characters.push(last.clone());
        }
    }
}

fn is_atomic(config: &BlockConfig) -> bool {
    config.block_type == "atomic"
}

fn spacer(keys: &mut KeyGenerator) -> BlockConfig {
    BlockConfig {
        key: keys.block_key(),
        block_type: "unstyled".to_string(),
        text: String::new(),
        character_list: Vec::new(),
        depth: 0,
        child_configs: Vec::new(),
    }
}
