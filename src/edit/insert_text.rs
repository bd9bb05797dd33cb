// Insert text at a collapsed selection and report the change as diff ops.

use std::borrow::Cow;

use super::Op;
use crate::error::EditError;
use crate::model::{CharacterMetadata, ContentBlock, ContentState, SelectionState};
use crate::raw::{encode_inline_style_ranges, InlineStyleRange};

/// Splice `text` into the block under the caret. Every inserted character
/// gets `metadata`. The returned state's `selection_after` sits right after
/// the inserted text and `op()` describes the edit.
///
/// Missing or empty text returns the input unchanged (borrowed).
///
/// # Panics
///
/// Panics if `selection` is not collapsed.
///
/// # Errors
///
/// Fails when the selection points at a block that does not exist or past
/// the end of its block.
pub fn insert_text<'a>(
    content: &'a ContentState,
    selection: &SelectionState,
    text: Option<&str>,
    metadata: &CharacterMetadata,
) -> Result<Cow<'a, ContentState>, EditError> {
    assert!(
        selection.is_collapsed(),
        "insert_text should only be called with a collapsed selection"
    );

    let Some(text) = text.filter(|text| !text.is_empty()) else {
        return Ok(Cow::Borrowed(content));
    };
    let len = text.chars().count();

    let key = selection.start_key();
    let offset = selection.start_offset();
    let block_index = content
        .block_index(key)
        .ok_or_else(|| EditError::UnknownBlock(key.clone()))?;
    let block = &content.blocks[block_index];
    if offset > block.len() {
        return Err(EditError::OffsetOutOfRange {
            key: key.clone(),
            offset,
            length: block.len(),
        });
    }

    debug!(block = %key, block_index, offset, len, "inserting text");

    let op = diff_ops(block_index, block, metadata, text, offset, len);
    let mut blocks = content.blocks.clone();
    blocks[block_index] = block.with_inserted_text(offset, text, metadata);

    Ok(Cow::Owned(ContentState {
        blocks,
        entity_map: content.entity_map.clone(),
        selection_before: content.selection_before.clone(),
        selection_after: selection.with_offset(offset + len),
        op: Some(op),
    }))
}

/// Diff ops for inserting `len` chars at `offset` of `block`, computed
/// against the block before the edit.
///
/// The inserted metadata's entity is not reported.
fn diff_ops(
    block_index: usize,
    block: &ContentBlock,
    metadata: &CharacterMetadata,
    text: &str,
    offset: usize,
    len: usize,
) -> Vec<Op> {
    let mut ops = vec![Op::insert_text(block_index, offset, text)];

    if offset == block.character_list.len() {
        append_style_after_offset(metadata, &mut ops, block_index, offset, len);
        return ops;
    }

    for (index, range) in encode_inline_style_ranges(block).into_iter().enumerate() {
        if range.offset >= offset {
            ops.push(Op::replace_style_range_field(
                block_index,
                index,
                "offset",
                range.offset,
                range.offset + len,
            ));
        } else if range.offset + range.length > offset {
            // The insertion splits this range: keep the head, re-add the tail
            // after the inserted text.
            let head_length = offset - range.offset;
            ops.push(Op::replace_style_range_field(
                block_index,
                index,
                "length",
                range.length,
                head_length,
            ));
            let tail = InlineStyleRange {
                offset: offset + len,
                length: range.length - head_length,
                style: range.style,
            };
            ops.push(Op::insert_style_range(block_index, index, &tail));
            append_style_after_offset(metadata, &mut ops, block_index, offset, len);
        }
    }
    ops
}

/// One list-insert op per style of the inserted metadata.
fn append_style_after_offset(
    metadata: &CharacterMetadata,
    ops: &mut Vec<Op>,
    block_index: usize,
    offset: usize,
    len: usize,
) {
    for (index, style) in metadata.style().iter().enumerate() {
        let range = InlineStyleRange {
            offset,
            length: len,
            style: style.clone(),
        };
        ops.push(Op::insert_style_range(block_index, index, &range));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::PathSegment;
    use crate::model::{BlockKey, EntityKey, EntityMap};

    fn bold_block(key: &str, text: &str, bold: std::ops::Range<usize>) -> ContentBlock {
        let mut block = ContentBlock::unstyled(BlockKey::new(key), text);
        for metadata in &mut block.character_list[bold] {
            *metadata = metadata.with_style("BOLD");
        }
        block
    }

    fn state(blocks: Vec<ContentBlock>) -> ContentState {
        ContentState::from_blocks(blocks, EntityMap::new())
    }

    fn caret(key: &str, offset: usize) -> SelectionState {
        SelectionState::collapsed(BlockKey::new(key), offset)
    }

    #[test]
    fn test_empty_text_is_a_no_op() {
        let content = state(vec![bold_block("a", "abc", 0..3)]);
        let meta = CharacterMetadata::empty();
        let result = insert_text(&content, &caret("a", 1), Some(""), &meta).unwrap();
        assert!(matches!(result, Cow::Borrowed(c) if std::ptr::eq(c, &content)));
        let result = insert_text(&content, &caret("a", 1), None, &meta).unwrap();
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_insert_at_end_without_style() {
        let content = state(vec![bold_block("a", "abc", 0..3)]);
        let result = insert_text(&content, &caret("a", 3), Some("xy"), &CharacterMetadata::empty())
            .unwrap();
        let block = &result.blocks()[0];
        assert_eq!(block.text, "abcxy");
        assert_eq!(block.character_list.len(), 5);
        assert_eq!(result.op().unwrap(), &[Op::insert_text(0, 3, "xy")]);
        assert_eq!(result.selection_after().anchor_offset, 5);
        assert_eq!(result.selection_after().focus_offset, 5);
    }

    #[test]
    fn test_insert_at_end_with_styles() {
        let content = state(vec![ContentBlock::unstyled(BlockKey::new("a"), "ab")]);
        let meta = CharacterMetadata::empty().with_style("ITALIC").with_style("BOLD");
        let result = insert_text(&content, &caret("a", 2), Some("c"), &meta).unwrap();
        let ops = result.op().unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[1].p.last(), Some(&PathSegment::Index(0)));
        assert_eq!(ops[1].li.as_ref().unwrap()["style"], "BOLD");
        assert_eq!(ops[2].li.as_ref().unwrap()["style"], "ITALIC");
        assert_eq!(ops[2].li.as_ref().unwrap()["offset"], 2);
    }

    #[test]
    fn test_mid_block_insert_shifts_later_ranges() {
        let content = state(vec![bold_block("a", "abcdef", 4..6)]);
        let result = insert_text(&content, &caret("a", 1), Some("XY"), &CharacterMetadata::empty())
            .unwrap();
        assert_eq!(result.blocks()[0].text, "aXYbcdef");
        assert_eq!(
            result.op().unwrap(),
            &[
                Op::insert_text(0, 1, "XY"),
                Op::replace_style_range_field(0, 0, "offset", 4, 6),
            ]
        );
        assert!(result.blocks()[0].character_list[6].has_style("BOLD"));
    }

    #[test]
    fn test_mid_block_insert_splits_range() {
        let content = state(vec![bold_block("a", "abcdef", 1..5)]);
        let meta = CharacterMetadata::empty().with_style("ITALIC");
        let result = insert_text(&content, &caret("a", 3), Some("Z"), &meta).unwrap();
        let tail = InlineStyleRange {
            offset: 4,
            length: 2,
            style: "BOLD".to_string(),
        };
        let inserted = InlineStyleRange {
            offset: 3,
            length: 1,
            style: "ITALIC".to_string(),
        };
        assert_eq!(
            result.op().unwrap(),
            &[
                Op::insert_text(0, 3, "Z"),
                Op::replace_style_range_field(0, 0, "length", 4, 2),
                Op::insert_style_range(0, 0, &tail),
                Op::insert_style_range(0, 0, &inserted),
            ]
        );
    }

    #[test]
    fn test_range_ending_before_insert_emits_nothing() {
        let content = state(vec![bold_block("a", "abcdef", 0..2)]);
        let result = insert_text(&content, &caret("a", 4), Some("!"), &CharacterMetadata::empty())
            .unwrap();
        assert_eq!(result.op().unwrap(), &[Op::insert_text(0, 4, "!")]);
    }

    #[test]
    fn test_insert_where_a_range_ends_mid_block() {
        // Typing bold right after a bold run: only the text op, no style ops.
        let content = state(vec![bold_block("a", "abcdef", 0..3)]);
        let meta = CharacterMetadata::empty().with_style("BOLD");
        let result = insert_text(&content, &caret("a", 3), Some("x"), &meta).unwrap();
        assert_eq!(result.op().unwrap(), &[Op::insert_text(0, 3, "x")]);
        assert_eq!(result.blocks()[0].text, "abcxdef");
        assert!(result.blocks()[0].character_list[..4].iter().all(|c| c.has_style("BOLD")));
    }

    #[test]
    fn test_other_blocks_untouched() {
        let content = state(vec![
            bold_block("a", "one", 0..0),
            bold_block("b", "two", 0..3),
        ]);
        let meta = CharacterMetadata::empty().with_entity(Some(EntityKey(1)));
        let result = insert_text(&content, &caret("b", 0), Some("ab"), &meta).unwrap();
        assert_eq!(result.blocks()[0], content.blocks()[0]);
        let block = &result.blocks()[1];
        assert_eq!(block.text, "abtwo");
        assert_eq!(block.character_list[..2], [meta.clone(), meta]);
        assert!(block.character_list[2..].iter().all(|c| c.has_style("BOLD")));
        // Index is taken from the block order.
        assert_eq!(result.op().unwrap()[0], Op::insert_text(1, 0, "ab"));
        assert_eq!(result.op().unwrap()[1], Op::replace_style_range_field(1, 0, "offset", 0, 2));
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        let content = state(vec![ContentBlock::unstyled(BlockKey::new("a"), "héllo")]);
        let result = insert_text(&content, &caret("a", 2), Some("→"), &CharacterMetadata::empty())
            .unwrap();
        assert_eq!(result.blocks()[0].text, "hé→llo");
        assert_eq!(result.blocks()[0].character_list.len(), 6);
        assert_eq!(result.selection_after().anchor_offset, 3);
    }

    #[test]
    fn test_unknown_block_and_bad_offset() {
        let content = state(vec![ContentBlock::unstyled(BlockKey::new("a"), "ab")]);
        let meta = CharacterMetadata::empty();
        assert!(matches!(
            insert_text(&content, &caret("zz", 0), Some("x"), &meta),
            Err(EditError::UnknownBlock(_))
        ));
        assert!(matches!(
            insert_text(&content, &caret("a", 3), Some("x"), &meta),
            Err(EditError::OffsetOutOfRange { offset: 3, length: 2, .. })
        ));
    }

    #[test]
    #[should_panic(expected = "collapsed")]
    fn test_expanded_selection_panics() {
        let content = state(vec![ContentBlock::unstyled(BlockKey::new("a"), "abc")]);
        let mut selection = caret("a", 0);
        selection.focus_offset = 2;
        let _ = insert_text(&content, &selection, Some("x"), &CharacterMetadata::empty());
    }
}
