// Editing side: text insertion and the diff ops it reports.

mod insert_text;
mod op;

pub use self::insert_text::insert_text;
pub use self::op::{Op, PathSegment};
