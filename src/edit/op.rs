// Positional patch operations (json0 shape).
//
// `p` addresses a value inside the raw document, e.g.
// `["blocks", 2, "inlineStyleRanges", 0, "length"]`. An op carries one of
// `si` (string insert), `li` (list insert) or an `od`/`oi` replacement.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::raw::InlineStyleRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Op {
    pub p: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub si: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub li: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub od: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oi: Option<Value>,
}

impl Op {
    fn at(p: Vec<PathSegment>) -> Self {
        Self {
            p,
            si: None,
            li: None,
            od: None,
            oi: None,
        }
    }

    /// Insert `text` into a block's text at `offset`.
    pub fn insert_text(block_index: usize, offset: usize, text: &str) -> Self {
        Self {
            si: Some(text.to_string()),
            ..Self::at(vec!["blocks".into(), block_index.into(), "text".into(), offset.into()])
        }
    }

    /// Insert a style range at position `index` of a block's range list.
    pub fn insert_style_range(block_index: usize, index: usize, range: &InlineStyleRange) -> Self {
        Self {
            li: serde_json::to_value(range).ok(),
            ..Self::at(style_range_path(block_index, index))
        }
    }

    /// Replace a numeric field (`offset` or `length`) of a style range.
    pub fn replace_style_range_field(
        block_index: usize,
        index: usize,
        field: &str,
        old: usize,
        new: usize,
    ) -> Self {
        let mut p = style_range_path(block_index, index);
        p.push(field.into());
        Self {
            od: Some(old.into()),
            oi: Some(new.into()),
            ..Self::at(p)
        }
    }
}

fn style_range_path(block_index: usize, index: usize) -> Vec<PathSegment> {
    vec![
        "blocks".into(),
        block_index.into(),
        "inlineStyleRanges".into(),
        index.into(),
    ]
}
