//! String equality predicates used for text and attribute values.

use std::fmt::Debug;

/// An equality predicate over strings.
///
/// Implementations must be pure: the same pair of inputs always gives the same answer,
/// which lets a single [`HtmlComparer`](crate::HtmlComparer) be shared across threads.
pub trait StringComparer: Debug + Send + Sync {
    /// Returns `true` when `x` and `y` are considered equal.
    fn equals(&self, x: &str, y: &str) -> bool;
}

/// Case-sensitive byte-wise comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ordinal;

impl StringComparer for Ordinal {
    fn equals(&self, x: &str, y: &str) -> bool {
        x == y
    }
}

/// Case-insensitive comparison, folding Unicode case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrdinalIgnoreCase;

impl StringComparer for OrdinalIgnoreCase {
    fn equals(&self, x: &str, y: &str) -> bool {
        if x.is_ascii() && y.is_ascii() {
            return x.eq_ignore_ascii_case(y);
        }
        x.to_lowercase() == y.to_lowercase()
    }
}

/// Compares text the way a browser renders it: every run of whitespace counts as a single
/// space before the inner comparer sees the strings.
///
/// Leading and trailing runs are collapsed, not removed, so `"text"` and `" text"` differ.
/// A string made only of whitespace collapses to the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTextComparer<C = Ordinal> {
    inner: C,
}

impl HtmlTextComparer<Ordinal> {
    /// Whitespace-collapsing, case-sensitive comparer. This is the default text comparer.
    pub fn ordinal() -> Self {
        Self { inner: Ordinal }
    }
}

impl<C: StringComparer> HtmlTextComparer<C> {
    /// Wrap another comparer so it only sees collapsed whitespace.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: StringComparer> StringComparer for HtmlTextComparer<C> {
    fn equals(&self, x: &str, y: &str) -> bool {
        self.inner.equals(&collapse_whitespace(x), &collapse_whitespace(y))
    }
}

/// Strip the ASCII whitespace HTML treats as insignificant. Other space characters, such as
/// U+00A0 from `&nbsp;`, are content.
pub(crate) fn trim_html_whitespace(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Replace each whitespace run with one space. A trailing run is only kept when something
/// precedes it.
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_whitespace = false;

    for c in s.chars() {
        if c.is_ascii_whitespace() {
            in_whitespace = true;
            continue;
        }
        if in_whitespace {
            result.push(' ');
            in_whitespace = false;
        }
        result.push(c);
    }

    if in_whitespace && !result.is_empty() {
        result.push(' ');
    }

    result
}
