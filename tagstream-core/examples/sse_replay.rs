//! Replay a captured SSE response through a session.
//!
//! Each record's data is JSON; the `completion` field is rendered and
//! `error` events report their `message`. The capture is read from the
//! path given as the first argument (or stdin) and delivered in reads of
//! the size given as the second argument (default 64 bytes).
//!
//!     cargo run --example sse_replay -- capture.txt 16

use std::error::Error;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::executor::block_on;
use futures::stream;
use serde_json::Value;
use tagstream_core::{Document, NodeId, Outcome, Session};

fn field(data: &str, name: &str) -> Result<String, serde_json::Error> {
    let value: Value = serde_json::from_str(data)?;
    Ok(value[name].as_str().unwrap_or_default().to_owned())
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let capture = match args.next() {
        Some(path) if path != "-" => std::fs::read(path)?,
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    let read_size: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(64);

    let code_blocks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&code_blocks);

    let mut doc = Document::new();
    let reply = doc.push_element(doc.root_id(), "div");

    let reads = capture
        .chunks(read_size.max(1))
        .map(Ok::<_, std::io::Error>);
    let mut session = Session::new(stream::iter(reads), &mut doc, reply)
        .on_success_event(|data| field(&data, "completion"))
        .on_error_event(|data| field(&data, "message"))
        .on_tag_added("pre", move |doc: &mut Document, pre: NodeId| {
            counter.fetch_add(1, Ordering::Relaxed);
            doc.push_element(pre, "menu");
        })
        .on_complete(|output| eprintln!("completed: {} records", output.len()));

    let outcome = block_on(session.run())?;
    let text = session.text();
    drop(session);

    assert_eq!(outcome, Outcome::Completed);
    eprintln!(
        "reply: {} chars, {} code blocks",
        text.chars().count(),
        code_blocks.load(Ordering::Relaxed)
    );
    println!("{}", doc.to_html());
    Ok(())
}
