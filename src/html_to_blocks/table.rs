// TABLE entity extraction.
//
// Editor tables carry one nested editor per cell. The grid is read from
// `tr` rows and `.brick-table-td` cells, merged cells are backfilled with
// empty slots so every row lines up with the column ids, and each cell's
// editor content is converted on its own and stored as a raw document.

use markup5ever_rcdom::Handle;
use serde_json::{json, Map, Value};

use super::handlers::TABLE_CELL_CLASS;
use super::util::{descendants_where, first_descendant_where, get_non_empty_attr, has_class, is_element};
use super::BlocksBuilder;
use crate::model::{ContentBlock, EntityData};
use crate::raw::{to_raw, RawContentState};

const EDITOR_ROOT_CLASS: &str = "DraftEditor-root";
const DEFAULT_COLUMN_WIDTH: u32 = 100;
const MAX_ROW_SPAN: u32 = 65534;
const MAX_COL_SPAN: u32 = 1000;
/// Upper bounds on the declared grid; each slot gets ids and a cell document.
const MAX_ROWS: usize = 1000;
const MAX_COLUMNS: usize = 100;

/// One grid slot: a cell element, or an empty slot covered by a merged cell.
type Slot = Option<Handle>;

impl BlocksBuilder<'_> {
    pub(crate) fn table_data(&mut self, table: &Handle, nesting: usize) -> EntityData {
        let mut rows: Vec<Vec<Slot>> = descendants_where(table, &|n| is_element(n, "tr"))
            .iter()
            .map(|tr| {
                descendants_where(tr, &|n| has_class(n, TABLE_CELL_CLASS))
                    .into_iter()
                    .map(Some)
                    .collect()
            })
            .collect();
        let cols = descendants_where(table, &|n| is_element(n, "col"));

        let row_count = positive_attr(table, "data-rows")
            .unwrap_or(rows.len())
            .min(MAX_ROWS);
        let column_count = positive_attr(table, "data-cols")
            .unwrap_or(cols.len())
            .min(MAX_COLUMNS);

        let mut rows_id = Vec::new();
        let mut cols_id: Vec<String> = Vec::new();
        let mut combine = Vec::new();
        let mut column_width = Map::new();
        let mut cell = Map::new();

        for index in 0..row_count {
            let row_id = self.keys.prefixed_id("rowId");
            rows_id.push(Value::String(row_id.clone()));
            let mut row_cells = Map::new();

            for index_col in 0..column_count {
                if index == 0 {
                    let col_id = self.keys.prefixed_id("colId");
                    let width = cols
                        .get(index_col)
                        .and_then(|col| get_non_empty_attr(col, "width"))
                        .and_then(|width| number_value(&width))
                        .unwrap_or_else(|| json!(DEFAULT_COLUMN_WIDTH));
                    column_width.insert(col_id.clone(), width);
                    cols_id.push(col_id);
                }

                let td = rows.get(index).and_then(|row| row.get(index_col)).cloned().flatten();
                let spans = td.as_ref().map(|td| (span(td, "rowspan"), span(td, "colspan")));
                if let Some((Some(row_span), Some(col_span))) = spans {
                    if row_span > 1 || col_span > 1 {
                        backfill_spanned_slots(&mut rows, index, index_col, row_span, col_span);
                    }
                }

                // Absent cell: 0. Cell without a usable span: null.
                let (rowspan, colspan) = match spans {
                    None => (json!(0), json!(0)),
                    Some((row_span, col_span)) => (json!(row_span), json!(col_span)),
                };
                let col_id = cols_id.get(index_col).cloned().unwrap_or_default();
                if let Some((Some(row_span), Some(col_span))) = spans {
                    if row_span > 1 || col_span > 1 {
                        combine.push(json!({
                            "key": self.keys.prefixed_id("cbId"),
                            "firstRowId": row_id,
                            "firstColId": col_id,
                            "minRow": index,
                            "minCol": index_col,
                            "maxRow": row_span as usize - 1 + index,
                            "maxCol": col_span as usize - 1 + index_col,
                        }));
                    }
                }

                let editor_state = self.cell_editor_state(td.as_ref(), nesting);
                row_cells.insert(
                    col_id,
                    json!({
                        "cellId": self.keys.prefixed_id("cellId"),
                        "rowspan": rowspan,
                        "colspan": colspan,
                        "editorState": editor_state,
                    }),
                );
            }
            cell.insert(row_id, Value::Object(row_cells));
        }

        debug!(rows = row_count, columns = column_count, "extracted table entity");

        let mut data = EntityData::new();
        data.insert("row".to_string(), json!(row_count));
        data.insert("column".to_string(), json!(column_count));
        data.insert("rowsId".to_string(), Value::Array(rows_id));
        data.insert("colsId".to_string(), json!(cols_id));
        data.insert("cell".to_string(), Value::Object(cell));
        data.insert("combine".to_string(), Value::Array(combine));
        data.insert("columnWidth".to_string(), Value::Object(column_width));
        data
    }

    /// Convert a cell's editor content with a fresh builder.
    fn cell_editor_state(&mut self, td: Option<&Handle>, nesting: usize) -> Value {
        let root = td.and_then(|td| first_descendant_where(td, &|n| has_class(n, EDITOR_ROOT_CLASS)));
        let raw = match root {
            Some(root) => {
                let mut builder = BlocksBuilder::new(self.options);
                builder.add_subtree(&root, nesting);
                let converted = builder.finish();
                if converted.content_blocks.is_empty() {
                    self.empty_document()
                } else {
                    to_raw(&converted.content_blocks, &converted.entity_map)
                }
            }
            None => self.empty_document(),
        };
        serde_json::to_value(raw).unwrap_or_default()
    }

    fn empty_document(&mut self) -> RawContentState {
        let block = ContentBlock::unstyled(self.keys.block_key(), "");
        to_raw(std::slice::from_ref(&block), &Default::default())
    }
}

/// Make room for a merged cell: every slot it covers in the rows below (and to
/// its right in its own row) gets an empty slot inserted, or appended when the
/// row is already short.
fn backfill_spanned_slots(
    rows: &mut [Vec<Slot>],
    index: usize,
    index_col: usize,
    row_span: u32,
    col_span: u32,
) {
    for i in 0..row_span as usize {
        let Some(row) = rows.get_mut(index + i) else {
            break;
        };
        let first = if i == 0 { 1 } else { 0 };
        for j in first..col_span as usize {
            let at = index_col + j;
            if row.get(at).is_some_and(Option::is_some) {
                row.insert(at, None);
            } else {
                row.push(None);
            }
        }
    }
}

/// `rowspan` / `colspan` as a browser reports them for a table cell.
/// Elements that are not table cells have no span; a zero span counts as none.
fn span(cell: &Handle, attr: &str) -> Option<u32> {
    if !is_element(cell, "td") && !is_element(cell, "th") {
        return None;
    }
    let parsed = get_non_empty_attr(cell, attr).and_then(|value| leading_integer(&value));
    let value = match attr {
        "rowspan" => parsed.unwrap_or(1).min(MAX_ROW_SPAN),
        _ => parsed.filter(|v| *v > 0).unwrap_or(1).min(MAX_COL_SPAN),
    };
    (value > 0).then_some(value)
}

/// Digits at the start of an attribute value (`"2px"` reads as 2).
fn leading_integer(value: &str) -> Option<u32> {
    let value = value.trim_start();
    let digits = value.find(|c: char| !c.is_ascii_digit()).unwrap_or(value.len());
    value[..digits].parse().ok()
}

fn positive_attr(handle: &Handle, attr: &str) -> Option<usize> {
    get_non_empty_attr(handle, attr)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}

fn number_value(value: &str) -> Option<Value> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u64>() {
        return Some(json!(n));
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n != 0.0)
        .map(|n| json!(n))
}
