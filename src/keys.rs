// Random key generation for blocks and table ids.

use std::collections::HashSet;

use uuid::Uuid;

use crate::model::BlockKey;

const BLOCK_KEY_LEN: usize = 5;

/// Hands out random keys, never repeating one within its own lifetime.
#[derive(Debug, Default)]
pub(crate) struct KeyGenerator {
    seen: HashSet<String>,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short random block key.
    pub fn block_key(&mut self) -> BlockKey {
        loop {
            let key = Uuid::new_v4().simple().to_string()[..BLOCK_KEY_LEN].to_string();
            if self.seen.insert(key.clone()) {
                return BlockKey(key);
            }
        }
    }

    /// Random id with a readable prefix, e.g. `rowId-…`.
    pub fn prefixed_id(&mut self, prefix: &str) -> String {
        loop {
            let id = format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..12]);
            if self.seen.insert(id.clone()) {
                return id;
            }
        }
    }
}
