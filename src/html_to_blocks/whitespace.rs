// Whitespace handling for HTML → blocks conversion.
//
// HTML collapses whitespace, so text nodes are normalized on the way in, the
// pending text buffer is trimmed before it becomes a block, and a final pass
// strips leading whitespace from every non-code block.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::BlockConfig;
use crate::model::{char_to_byte, CharacterMetadata};

/// Anchor text for entities. Never whitespace, so trimming cannot remove it.
pub(crate) const ENTITY_PLACEHOLDER: char = '\u{1F4F7}';

static CARRIAGE_RETURN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r|&#13;?").unwrap());
static NBSP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&nbsp;").unwrap());
static ZERO_WIDTH_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#8203;?").unwrap());

/// Remove characters that editors and word processors leak into pasted HTML.
pub(crate) fn clean_html(html: &str) -> String {
    let html = CARRIAGE_RETURN.replace_all(html.trim(), "");
    let html = NBSP.replace_all(&html, " ");
    ZERO_WIDTH_SPACE.replace_all(&html, "").into_owned()
}

/// Normalize a text node's content.
///
/// Outside code, whitespace-only text collapses to one space, a single leading
/// line feed is dropped and remaining line feeds become spaces. Only `<br>`
/// produces real line breaks.
pub(crate) fn normalize_text(text: &str, in_code: bool) -> Cow<'_, str> {
    if in_code {
        return Cow::Borrowed(text);
    }
    if text.trim().is_empty() {
        return Cow::Borrowed(" ");
    }
    let text = text.strip_prefix('\n').unwrap_or(text);
    if text.contains('\n') {
        Cow::Owned(text.replace('\n', " "))
    } else {
        Cow::Borrowed(text)
    }
}

/// Trim trailing whitespace from the pending buffer, never cutting through a
/// character that carries an entity. Leading whitespace is kept so code blocks
/// keep their indentation; `trim_block_configs` strips it later.
pub(crate) fn trim_current_text(text: &mut String, characters: &mut Vec<CharacterMetadata>) {
    let trimmed_len = text.trim_end().chars().count();
    let entity_end = characters
        .iter()
        .rposition(|c| c.entity().is_some())
        .map_or(0, |i| i + 1);
    let end = trimmed_len.max(entity_end);
    if end == 0 {
        text.clear();
        characters.clear();
        return;
    }
    text.truncate(char_to_byte(text, end));
    characters.truncate(end);
}

/// Split text and its metadata on line feeds. The line feeds are dropped; an
/// empty input yields one empty line.
pub(crate) fn split_lines(
    text: &str,
    characters: &[CharacterMetadata],
) -> Vec<(String, Vec<CharacterMetadata>)> {
    let mut lines = Vec::new();
    let mut start = 0;
    for line in text.split('\n') {
        let len = line.chars().count();
        let end = (start + len).min(characters.len());
        lines.push((line.to_string(), characters[start.min(end)..end].to_vec()));
        start += len + 1;
    }
    lines
}

/// Strip leading whitespace from every non-code block, recursively.
///
/// Placeholder glyphs that end up at the very start of a trimmed block are
/// turned into spaces so no anchor artifact dangles in front of the text.
pub(crate) fn trim_block_configs(configs: &mut [BlockConfig], is_code_block: bool) {
    if is_code_block {
        return;
    }
    for config in configs.iter_mut() {
        if config.block_type == "code-block" {
            continue;
        }
        let text_len = config.text.chars().count();
        let kept = config.text.trim_start();
        let trimmed = text_len - kept.chars().count();
        if trimmed > 0 {
            let placeholders = kept.chars().take_while(|c| *c == ENTITY_PLACEHOLDER).count();
            let mut text = " ".repeat(placeholders);
            text.push_str(&kept[char_to_byte(kept, placeholders)..]);
            config.text = text;
            config.character_list.drain(..trimmed);
        }
        trim_block_configs(&mut config.child_configs, false);
    }
}
