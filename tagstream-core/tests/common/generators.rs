//! Stochastic generators for test variations
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from environment or random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("TAGSTREAM_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Poisson-like count (simplified)
    pub fn poisson(&mut self, lambda: f64) -> usize {
        let l = (-lambda).exp();
        let mut k = 0;
        let mut p = 1.0;
        loop {
            k += 1;
            p *= self.rng.gen::<f64>();
            if p <= l {
                break;
            }
        }
        k - 1
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Split text into random fragments at char boundaries.
    ///
    /// Fragments may be empty; on average a fragment holds 1/p chars.
    pub fn chunk<'a>(&mut self, text: &'a str, p: f64) -> Vec<&'a str> {
        let mut chunks = Vec::new();
        let mut start = 0;
        for (i, _) in text.char_indices().skip(1) {
            if self.chance(p) {
                chunks.push(&text[start..i]);
                start = i;
            }
        }
        chunks.push(&text[start..]);
        if self.chance(0.1) {
            let at = self.rng.gen_range(0..=chunks.len());
            chunks.insert(at, "");
        }
        chunks
    }

    /// Split bytes into random fragments, ignoring char boundaries.
    pub fn chunk_bytes<'a>(&mut self, bytes: &'a [u8], p: f64) -> Vec<&'a [u8]> {
        let mut chunks = Vec::new();
        let mut start = 0;
        for i in 1..bytes.len() {
            if self.chance(p) {
                chunks.push(&bytes[start..i]);
                start = i;
            }
        }
        chunks.push(&bytes[start..]);
        chunks
    }

    /// Random tag name, sometimes upper-cased or denylisted
    pub fn tag_name(&mut self) -> String {
        const NAMES: &[&str] = &[
            "p", "div", "span", "pre", "code", "ul", "li", "em", "strong", "br", "hr", "script",
            "style", "a", "img", "title",
        ];
        let name = NAMES[self.rng.gen_range(0..NAMES.len())];
        if self.chance(0.1) {
            name.to_uppercase()
        } else {
            name.to_owned()
        }
    }

    /// Random word of plain text
    pub fn word(&mut self) -> String {
        const WORDS: &[&str] = &[
            "hello", "world", "a", "fish", "&amp;", "chips", "héllo", "日本", "x=1", "",
        ];
        WORDS[self.rng.gen_range(0..WORDS.len())].to_owned()
    }

    /// Random markup made of tags, attributes and words
    pub fn markup(&mut self) -> String {
        let mut out = String::new();
        let count = 1 + self.poisson(8.0);
        for _ in 0..count {
            match self.rng.gen_range(0..10) {
                0..=2 => {
                    out.push('<');
                    out.push_str(&self.tag_name());
                    if self.chance(0.2) {
                        out.push_str(" class=\"x y\"");
                    }
                    out.push('>');
                }
                3..=4 => {
                    out.push_str("</");
                    out.push_str(&self.tag_name());
                    out.push('>');
                }
                _ => {
                    out.push_str(&self.word());
                    if self.chance(0.5) {
                        out.push(' ');
                    }
                }
            }
        }
        out
    }
}
