//! Test harness for rendering fixtures canonically and re-chunked

use crate::common::{Gen, TestCase};
use tagstream_core::{Document, Node, NodeKind};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub chunks: Vec<String>,
    pub expected: String,
    pub actual: String,
    pub seed: u64,
    pub errors: Vec<String>,
}

impl TestResult {
    pub fn print_failure(&self, label: &str) {
        eprintln!("\n=== FAILED: {} ===", label);
        eprintln!("chunks:   {:?}", self.chunks);
        eprintln!("expected: {}", self.expected);
        eprintln!("actual:   {}", self.actual);
        if self.seed != 0 {
            eprintln!("seed:     {}", self.seed);
        }
        for err in &self.errors {
            eprintln!("  - {}", err);
        }
    }
}

/// Compact structural dump: elements as `name(...)`, text as a quoted
/// string, siblings separated by spaces.
pub fn shape(node: Node<'_>) -> String {
    let parts: Vec<String> = node
        .children()
        .map(|child| match child.kind() {
            NodeKind::Text(text) => format!("{:?}", text),
            NodeKind::Element { name } => format!("{}({})", name, shape(child)),
            NodeKind::Root => String::from("#root"),
        })
        .collect();
    parts.join(" ")
}

/// Render fragments and dump the result
pub fn render(chunks: &[&str]) -> (String, String) {
    let doc = Document::render_chunks(chunks.iter().copied());
    (doc.to_html(), shape(doc.root()))
}

fn check(case: &TestCase, chunks: &[&str], seed: u64) -> TestResult {
    let (html, actual_shape) = render(chunks);
    let mut errors = Vec::new();

    if html != case.html {
        errors.push(format!("html: expected {:?}, got {:?}", case.html, html));
    }
    if let Some(expected) = &case.shape {
        if &actual_shape != expected {
            errors.push(format!("shape: expected {}, got {}", expected, actual_shape));
        }
    }

    TestResult {
        passed: errors.is_empty(),
        chunks: chunks.iter().map(|c| c.to_string()).collect(),
        expected: case.shape.clone().unwrap_or_else(|| case.html.clone()),
        actual: if case.shape.is_some() { actual_shape } else { html },
        seed,
        errors,
    }
}

/// Run a single test case (canonical, whole input)
pub fn run_test(case: &TestCase) -> TestResult {
    check(case, &[case.input.as_str()], 0)
}

/// Run a test case with the input split into random fragments
pub fn run_with_variations(case: &TestCase, gen: &mut Gen) -> TestResult {
    let density = match gen.geometric(0.5) {
        0 => 0.05,
        1 => 0.3,
        _ => 1.0,
    };
    let chunks = gen.chunk(&case.input, density);
    check(case, &chunks, gen.seed)
}
