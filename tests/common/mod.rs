// Shared test helpers for html2blocks.

#![allow(dead_code)]

use html2blocks::{BlocksFromHtml, ContentBlock, Options};

/// Convert with default options; the default DOM builder always yields a tree.
pub fn convert(html: &str) -> BlocksFromHtml {
    html2blocks::convert(html).expect("html5ever always builds a body")
}

pub fn convert_with(html: &str, options: &Options) -> BlocksFromHtml {
    html2blocks::convert_with(html, options).expect("html5ever always builds a body")
}

/// `(type, text)` of each block, in order.
pub fn blocks(result: &BlocksFromHtml) -> Vec<(String, String)> {
    result
        .content_blocks
        .iter()
        .map(|b| (b.block_type.clone(), b.text.clone()))
        .collect()
}

/// Shorthand for building the expected side of `blocks`.
pub fn expected(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(t, s)| (t.to_string(), s.to_string())).collect()
}

/// Char offsets `[start, end)` of each run of characters carrying `style`.
pub fn style_runs(block: &ContentBlock, style: &str) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, metadata) in block.character_list.iter().enumerate() {
        match (metadata.has_style(style), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, block.character_list.len()));
    }
    runs
}

/// Every block has exactly one metadata entry per character.
pub fn assert_lengths_match(result: &BlocksFromHtml) {
    for block in &result.content_blocks {
        assert_eq!(
            block.text.chars().count(),
            block.character_list.len(),
            "length mismatch in block {:?}",
            block.text
        );
    }
}
