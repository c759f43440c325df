use crate::comparer::{HtmlTextComparer, Ordinal, StringComparer};
use std::sync::Arc;

const DEFAULT_WILDCARD_ELEMENT_NAME: &str = "any";

/// How the elements matched by a selector are turned into a single result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ElementSelectionMode {
    /// Only the first matched element is compared.
    #[default]
    First,
    /// Exactly one element may match; more than one is a mismatch.
    Single,
    /// Every matched element must equal the expected HTML.
    All,
    /// At least one matched element must equal the expected HTML.
    Any,
}

/// What part of a selected element is compared against the expected HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ElementComparisonMode {
    /// Only the children of the selected element.
    #[default]
    InnerContent,
    /// The selected element together with its children. The expected HTML must have a single
    /// root element.
    OuterElement,
    /// Tag name, id, classes and attributes of the selected element, nothing below it. The
    /// expected HTML must be a single element without children.
    ElementOnly,
}

/// Configuration for HTML comparison.
///
/// Options are handed to [`HtmlComparer::with_options`](crate::HtmlComparer::with_options) by
/// value and are read-only from then on.
#[derive(Debug, Clone)]
pub struct HtmlCompareOptions {
    /// Tag name in the expected HTML that matches any tag in the candidate (ASCII
    /// case-insensitive).
    pub wildcard_element_name: String,
    /// How multiple selector matches are aggregated.
    pub element_selection_mode: ElementSelectionMode,
    /// Compare the selected element itself rather than only its content. Only affects
    /// [`ElementComparisonMode::InnerContent`], which then behaves as
    /// [`ElementComparisonMode::OuterElement`].
    pub include_selected_element: bool,
    /// What part of a selected element is compared.
    pub element_comparison_mode: ElementComparisonMode,
    /// Ignore the order of class names
    pub ignore_class_name_order: bool,
    /// Tolerate class names on the candidate that the expected element does not have
    pub ignore_additional_class_names: bool,
    /// Tolerate attributes (including an `id`) on the candidate that the expected element does
    /// not have
    pub ignore_additional_attributes: bool,
    /// Skip whitespace-only text nodes
    pub ignore_empty_text_nodes: bool,
    /// Parse HTML as a body fragment instead of a full document
    pub treat_as_fragment: bool,
    /// Equality used for text nodes
    pub text_comparer: Arc<dyn StringComparer>,
    /// Equality used for attribute values other than `id` and `class`, which are always
    /// compared ordinally
    pub attribute_comparer: Arc<dyn StringComparer>,
}

impl Default for HtmlCompareOptions {
    fn default() -> Self {
        Self {
            wildcard_element_name: DEFAULT_WILDCARD_ELEMENT_NAME.to_string(),
            element_selection_mode: ElementSelectionMode::First,
            include_selected_element: false,
            element_comparison_mode: ElementComparisonMode::InnerContent,
            ignore_class_name_order: true,
            ignore_additional_class_names: false,
            ignore_additional_attributes: false,
            ignore_empty_text_nodes: true,
            treat_as_fragment: false,
            text_comparer: Arc::new(HtmlTextComparer::ordinal()),
            attribute_comparer: Arc::new(Ordinal),
        }
    }
}

impl HtmlCompareOptions {
    /// The comparison mode actually applied to a selected element, folding in
    /// `include_selected_element`.
    pub fn effective_comparison_mode(&self) -> ElementComparisonMode {
        match self.element_comparison_mode {
            ElementComparisonMode::InnerContent if self.include_selected_element => {
                ElementComparisonMode::OuterElement
            }
            mode => mode,
        }
    }
}

/// Convenience functions for creating common comparison configurations
pub mod presets {
    use super::*;

    /// Default tolerances, with input parsed as body fragments
    pub fn fragment() -> HtmlCompareOptions {
        HtmlCompareOptions {
            treat_as_fragment: true,
            ..Default::default()
        }
    }

    /// Tolerate instrumentation on the candidate: extra attributes, ids and class names
    pub fn lenient() -> HtmlCompareOptions {
        HtmlCompareOptions {
            ignore_additional_attributes: true,
            ignore_additional_class_names: true,
            treat_as_fragment: true,
            ..Default::default()
        }
    }

    /// Class order matters and whitespace inside text is compared verbatim
    pub fn strict() -> HtmlCompareOptions {
        HtmlCompareOptions {
            ignore_class_name_order: false,
            text_comparer: Arc::new(Ordinal),
            treat_as_fragment: true,
            ..Default::default()
        }
    }
}
