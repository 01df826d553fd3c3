//! Render markup from stdin and print the resulting HTML.
//!
//! Input is fed in small fragments to exercise carry-over:
//!
//!     echo '<p>Hello <script>x</script>world</p>' | cargo run --example stdin_render

use std::io::Read;
use tagstream_core::{Document, Node, NodeKind, Utf8Decoder};

fn dump(node: Node<'_>, depth: usize) {
    for child in node.children() {
        match child.kind() {
            NodeKind::Element { name } => {
                eprintln!("{:indent$}<{}>", "", name, indent = depth * 2);
                dump(child, depth + 1);
            }
            NodeKind::Text(text) => eprintln!("{:indent$}{:?}", "", text, indent = depth * 2),
            NodeKind::Root => {}
        }
    }
}

fn main() {
    let mut input = Vec::new();
    std::io::stdin().read_to_end(&mut input).unwrap();

    let mut decoder = Utf8Decoder::new();
    let mut pieces: Vec<String> = input.chunks(8).map(|c| decoder.decode(c)).collect();
    pieces.push(decoder.finish());

    let doc = Document::render_chunks(&pieces);
    dump(doc.root(), 0);
    println!("{}", doc.to_html());
}
