//! Static tag tables.
//!
//! Both sets are fixed at compile time. Lookups take the already
//! lower-cased tag name with any leading `/` removed.

use phf::phf_set;

/// Tags whose occurrence suppresses rendered text.
///
/// Document-structural and script-bearing tags, plus hyperlink, image and
/// frame tags. Neither the opening nor the closing form of these ever
/// creates or pops a node.
pub static BLOCKED_TAGS: phf::Set<&'static str> = phf_set! {
    "!doctype",
    "html",
    "head",
    "title",
    "script",
    "style",
    "link",
    "meta",
    "body",
    "a",
    "iframe",
    "img",
};

/// Tags that never receive children.
pub static VOID_TAGS: phf::Set<&'static str> = phf_set! {
    "br",
    "hr",
};

/// Check if a tag name is on the denylist.
#[inline]
pub fn is_blocked(name: &str) -> bool {
    BLOCKED_TAGS.contains(name)
}

/// Check if a tag name is self-closing.
#[inline]
pub fn is_void(name: &str) -> bool {
    VOID_TAGS.contains(name)
}
