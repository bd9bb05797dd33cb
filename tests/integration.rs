// End-to-end API tests for html2blocks.

mod common;

use common::{assert_lengths_match, blocks, convert, convert_with, expected, style_runs};
use html2blocks::{
    to_raw, BlockRenderConfig, BlockRenderMap, EntityKey, EntityType, Mutability, Options,
};
use pretty_assertions::assert_eq;
use url::Url;

const PLACEHOLDER: &str = "\u{1F4F7}";

#[test]
fn test_empty_input() {
    let result = convert("");
    assert!(result.content_blocks.is_empty());
    assert!(result.entity_map.is_empty());
}

#[test]
fn test_plain_text() {
    let result = convert("Hello, world!");
    assert_eq!(blocks(&result), expected(&[("unstyled", "Hello, world!")]));
}

#[test]
fn test_paragraph_with_bold() {
    let result = convert("<p>Hello <b>world</b></p>");
    assert_eq!(blocks(&result), expected(&[("unstyled", "Hello world")]));
    assert_eq!(style_runs(&result.content_blocks[0], "BOLD"), vec![(6, 11)]);
}

#[test]
fn test_unordered_list() {
    let result = convert("<ul><li>A</li><li>B</li></ul>");
    assert_eq!(blocks(&result), expected(&[("multi-ul", "A"), ("multi-ul", "B")]));
    assert!(result.content_blocks.iter().all(|b| b.depth == 0));
}

#[test]
fn test_list_item_classes() {
    let result = convert(
        r#"<ol><li class="ol-item">one</li><li class="ck-item qu">two</li><li class="h2">three</li></ol>"#,
    );
    assert_eq!(
        blocks(&result),
        expected(&[("multi-ol", "one"), ("multi-qu-ck", "two"), ("multi-h2-ul", "three")])
    );
}

#[test]
fn test_nested_list_depth() {
    let result = convert("<ul><li>A</li><ul><li>B</li><ol><li>C</li></ol></ul></ul>");
    let depths: Vec<_> = result.content_blocks.iter().map(|b| b.depth).collect();
    assert_eq!(depths, vec![0, 1, 2]);
}

#[test]
fn test_headings_and_quote() {
    let result = convert("<h1>Title</h1><h3>Sub</h3><blockquote>Quote</blockquote>");
    assert_eq!(
        blocks(&result),
        expected(&[("header-one", "Title"), ("header-three", "Sub"), ("blockquote", "Quote")])
    );
}

#[test]
fn test_whitespace_between_blocks_is_dropped() {
    let result = convert("<p>a</p>\n   \n<p>  b</p>");
    assert_eq!(blocks(&result), expected(&[("unstyled", "a"), ("unstyled", "b")]));
}

#[test]
fn test_line_breaks() {
    // Empty lines become empty unstyled blocks, which flat output drops.
    let result = convert("<p>one<br>two<br><br>three</p>");
    assert_eq!(
        blocks(&result),
        expected(&[("unstyled", "one"), ("unstyled", "two"), ("unstyled", "three")])
    );
}

#[test]
fn test_source_line_feeds_are_spaces() {
    let result = convert("<p>one\ntwo</p>");
    assert_eq!(blocks(&result), expected(&[("unstyled", "one two")]));
}

#[test]
fn test_inline_styles() {
    let result = convert("<p><i>a</i><u>b</u><s>c</s><code>d</code><mark>e</mark></p>");
    let block = &result.content_blocks[0];
    assert_eq!(style_runs(block, "ITALIC"), vec![(0, 1)]);
    assert_eq!(style_runs(block, "UNDERLINE"), vec![(1, 2)]);
    assert_eq!(style_runs(block, "STRIKETHROUGH"), vec![(2, 3)]);
    assert_eq!(style_runs(block, "CODE"), vec![(3, 4)]);
    assert_eq!(style_runs(block, "HIGHLIGHT"), vec![(4, 5)]);
}

#[test]
fn test_css_styles() {
    let result = convert(
        r#"<p><span style="font-weight: 700">b</span><b><span style="font-weight: normal">n</span></b><span style="font-family: Menlo, monospace">m</span></p>"#,
    );
    let block = &result.content_blocks[0];
    assert_eq!(block.text, "bnm");
    assert_eq!(style_runs(block, "BOLD"), vec![(0, 1)]);
    assert_eq!(style_runs(block, "CODE"), vec![(2, 3)]);
}

#[test]
fn test_colour_allow_list() {
    let html = r#"<p><span style="color: #ff0000">red</span></p>"#;
    let plain = convert(html);
    assert!(plain.content_blocks[0].character_list[0].style().is_empty());

    let options = Options::new().with_custom_style("color-rgb(255,0,0)");
    let styled = convert_with(html, &options);
    assert_eq!(style_runs(&styled.content_blocks[0], "color-rgb(255,0,0)"), vec![(0, 3)]);
}

#[test]
fn test_pre_block() {
    let result = convert("<pre>fn main() {\n    body();\n}</pre>");
    assert_eq!(
        blocks(&result),
        expected(&[("code-block", "fn main() {\n    body();\n}")])
    );
    assert_lengths_match(&result);
}

#[test]
fn test_monospace_block_becomes_code() {
    let result = convert(r#"<div style="font-family: monospace"><p>  x = 1</p></div>"#);
    assert_eq!(blocks(&result), expected(&[("code-block", "  x = 1")]));
}

#[test]
fn test_image_entity() {
    let result = convert(r#"<p>see <img src="cat.png" alt="Cat" width="40"></p>"#);
    let block = &result.content_blocks[0];
    assert_eq!(block.text, format!("see {PLACEHOLDER}"));
    let key = block.character_list[4].entity().unwrap();
    let entity = result.entity_map.get(key).unwrap();
    assert_eq!(entity.entity_type, EntityType::Image);
    assert_eq!(entity.mutability, Mutability::Immutable);
    assert_eq!(entity.data["url"], "cat.png");
    assert_eq!(entity.data["alt"], "Cat");
    assert_eq!(entity.data["width"], "40");
}

#[test]
fn test_entity_keys_follow_document_order() {
    let result = convert(
        r#"<p><img src="1.png"><a href="https://a.org">a</a><img src="2.png"></p>"#,
    );
    let block = &result.content_blocks[0];
    let keys: Vec<EntityKey> = block.character_list.iter().filter_map(|c| c.entity()).collect();
    assert_eq!(keys, vec![EntityKey(1), EntityKey(2), EntityKey(3)]);
    let types: Vec<_> = result.entity_map.iter().map(|(_, e)| e.entity_type).collect();
    assert_eq!(types, vec![EntityType::Image, EntityType::Link, EntityType::Image]);
}

#[test]
fn test_link_entity() {
    let result = convert(r#"<p>go <a href="HTTP://Example.COM/a" title="t">here</a></p>"#);
    let block = &result.content_blocks[0];
    assert_eq!(block.text, "go here");
    let key = block.character_list[3].entity().unwrap();
    assert!(block.character_list[3..].iter().all(|c| c.entity() == Some(key)));
    let entity = result.entity_map.get(key).unwrap();
    assert_eq!(entity.entity_type, EntityType::Link);
    assert_eq!(entity.mutability, Mutability::Mutable);
    assert_eq!(entity.data["url"], "http://example.com/a");
    assert_eq!(entity.data["href"], "HTTP://Example.COM/a");
    assert_eq!(entity.data["title"], "t");
}

#[test]
fn test_relative_links_need_a_base() {
    let html = r#"<p><a href="/docs">docs</a></p>"#;
    assert!(convert(html).entity_map.is_empty());

    let options = Options::new().with_base_url(Url::parse("https://example.com/a/").unwrap());
    let result = convert_with(html, &options);
    let (_, entity) = result.entity_map.iter().next().unwrap();
    assert_eq!(entity.data["url"], "https://example.com/docs");
}

#[test]
fn test_unsafe_links_are_plain_text() {
    let result = convert(r#"<p><a href="javascript:alert(1)">x</a></p>"#);
    assert_eq!(blocks(&result), expected(&[("unstyled", "x")]));
    assert!(result.entity_map.is_empty());
}

#[test]
fn test_file_entity() {
    let result = convert(
        r#"<p><span title="file-entity" data-bucketname="bucket" data-objectkey="a/b.pdf" data-name="b.pdf">b.pdf</span></p>"#,
    );
    let block = &result.content_blocks[0];
    assert_eq!(block.text, PLACEHOLDER);
    let entity = result.entity_map.get(EntityKey(1)).unwrap();
    assert_eq!(entity.entity_type, EntityType::File);
    assert_eq!(entity.data["bucketName"], "bucket");
    assert_eq!(entity.data["objectKey"], "a/b.pdf");
    assert_eq!(entity.data["name"], "b.pdf");
}

#[test]
fn test_atomic_block_gets_spacers() {
    let result = convert(r#"<figure><img src="a.png"></figure>"#);
    assert_eq!(
        blocks(&result),
        expected(&[("unstyled", ""), ("atomic", PLACEHOLDER), ("unstyled", "")])
    );
}

#[test]
fn test_table_entity() {
    let html = r#"<table data-rows="1" data-cols="2"><colgroup><col width="80"><col></colgroup>
        <tr>
          <td class="brick-table-td"><div class="DraftEditor-root"><div><b>bold</b> cell</div></div></td>
          <td class="brick-table-td"><div class="DraftEditor-root"><div>two</div></div></td>
        </tr></table>"#;
    let result = convert(html);
    assert_eq!(blocks(&result), expected(&[("unstyled", PLACEHOLDER)]));

    let entity = result.entity_map.get(EntityKey(1)).unwrap();
    assert_eq!(entity.entity_type, EntityType::Table);
    assert_eq!(entity.data["row"], 1);
    assert_eq!(entity.data["column"], 2);
    let row_id = entity.data["rowsId"][0].as_str().unwrap();
    let col_id = entity.data["colsId"][0].as_str().unwrap();
    assert_eq!(entity.data["columnWidth"][col_id], 80);

    let editor_state = &entity.data["cell"][row_id][col_id]["editorState"];
    assert_eq!(editor_state["blocks"][0]["text"], "bold cell");
    assert_eq!(editor_state["blocks"][0]["inlineStyleRanges"][0]["style"], "BOLD");
    assert_eq!(editor_state["blocks"][0]["inlineStyleRanges"][0]["length"], 4);
}

#[test]
fn test_plain_table_is_not_an_entity() {
    let result = convert("<table><tr><td>a</td><td>b</td></tr></table>");
    assert!(result.entity_map.is_empty());
    assert_eq!(blocks(&result), expected(&[("unstyled", "ab")]));
}

#[test]
fn test_skipped_editor_chrome() {
    let result = convert(
        r#"<pre><div class="brick-code-block-toolbar">Copy</div>code</pre><p>a<span class="not-display-enter">x</span></p>"#,
    );
    assert_eq!(blocks(&result), expected(&[("code-block", "code"), ("unstyled", "a")]));
}

#[test]
fn test_custom_render_map() {
    let render_map = BlockRenderMap::empty()
        .with("paragraph", BlockRenderConfig::new("p"))
        .with("quote", BlockRenderConfig::new("blockquote"));
    let options = Options::new().with_block_render_map(render_map);
    let result = convert_with("<p>a</p><blockquote>b</blockquote><h1>c</h1>", &options);
    assert_eq!(
        blocks(&result),
        expected(&[("paragraph", "a"), ("quote", "b"), ("unstyled", "c")])
    );
}

#[test]
fn test_tree_mode_links() {
    let options = Options::new().with_tree_data(true);
    let result = convert_with("<blockquote><p>a</p><p>b</p></blockquote><p>c</p>", &options);
    assert_eq!(
        blocks(&result),
        expected(&[("blockquote", ""), ("unstyled", "a"), ("unstyled", "b"), ("unstyled", "c")])
    );

    let [quote, a, b, c] = &result.content_blocks[..] else {
        panic!("expected four blocks");
    };
    let quote_links = quote.links.as_ref().unwrap();
    assert_eq!(quote_links.children, vec![a.key.clone(), b.key.clone()]);
    assert_eq!(quote_links.parent, None);
    assert_eq!(quote_links.next_sibling.as_ref(), Some(&c.key));

    let a_links = a.links.as_ref().unwrap();
    assert_eq!(a_links.parent.as_ref(), Some(&quote.key));
    assert_eq!(a_links.next_sibling.as_ref(), Some(&b.key));
    assert_eq!(b.links.as_ref().unwrap().prev_sibling.as_ref(), Some(&a.key));
    assert_eq!(c.links.as_ref().unwrap().prev_sibling.as_ref(), Some(&quote.key));
}

#[test]
fn test_tree_mode_ignores_depth_classes() {
    let html = r#"<ul><li class="public-DraftStyleDefault-depth2">x</li></ul>"#;
    assert_eq!(convert(html).content_blocks[0].depth, 2);
    let tree = convert_with(html, &Options::new().with_tree_data(true));
    assert_eq!(tree.content_blocks[0].depth, 0);
}

#[test]
fn test_block_keys_are_unique() {
    let items: String = (0..300).map(|i| format!("<p>{i}</p>")).collect();
    let result = convert(&items);
    let keys: std::collections::HashSet<_> =
        result.content_blocks.iter().map(|b| b.key.clone()).collect();
    assert_eq!(keys.len(), 300);
}

#[test]
fn test_lengths_match_everywhere() {
    let inputs = [
        "<p>Hello <b>wörld</b> ✨</p>",
        "<ul><li>a<br>b</li></ul>",
        r#"<p> <img src="x.png"> y </p>"#,
        "<pre>  a\n\tb  </pre>",
        "<div><p>x</p>tail<p>y</p></div>",
        "<h1>T<br></h1>",
    ];
    for html in inputs {
        assert_lengths_match(&convert(html));
        assert_lengths_match(&convert_with(html, &Options::new().with_tree_data(true)));
    }
}

#[test]
fn test_raw_encoding() {
    let result = convert(r#"<p><b>Hi</b> <a href="https://x.org">there</a></p>"#);
    let raw = to_raw(&result.content_blocks, &result.entity_map);
    let json = serde_json::to_value(&raw).unwrap();
    let block = &json["blocks"][0];
    assert_eq!(block["text"], "Hi there");
    assert_eq!(
        block["inlineStyleRanges"],
        serde_json::json!([{"offset": 0, "length": 2, "style": "BOLD"}])
    );
    assert_eq!(
        block["entityRanges"],
        serde_json::json!([{"offset": 3, "length": 5, "key": 0}])
    );
    assert_eq!(json["entityMap"]["0"]["type"], "LINK");
    assert_eq!(json["entityMap"]["0"]["mutability"], "MUTABLE");
}
