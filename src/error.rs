use crate::options::ElementComparisonMode;
use thiserror::Error;

/// Usage errors. Comparison outcomes, including "element not found", are reported through
/// [`HtmlCompareResult`](crate::HtmlCompareResult) instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HtmlCompareError {
    #[error("Selector cannot be empty")]
    EmptySelector,
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("Expected HTML must have exactly one root element in {mode:?} mode, found {found} root nodes")]
    ExpectedRootCount {
        mode: ElementComparisonMode,
        found: usize,
    },
    #[error("Expected HTML element cannot have children in ElementOnly mode")]
    ExpectedHasChildren,
}
