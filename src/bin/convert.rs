use std::io::{self, Read};

fn main() {
    let mut html = String::new();
    io::stdin().read_to_string(&mut html).expect("read stdin");
    let Some(result) = html2blocks::convert(&html) else {
        eprintln!("could not build a DOM tree from the input");
        std::process::exit(1);
    };
    let raw = html2blocks::to_raw(&result.content_blocks, &result.entity_map);
    let json = serde_json::to_string_pretty(&raw).expect("serialize raw document");
    println!("{json}");
}
