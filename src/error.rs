use crate::model::BlockKey;

/// Errors that can occur while editing a content state.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EditError {
    #[error("no block with key {0}")]
    UnknownBlock(BlockKey),
    #[error("offset {offset} is past the end of block {key} (length {length})")]
    OffsetOutOfRange {
        key: BlockKey,
        offset: usize,
        length: usize,
    },
}
