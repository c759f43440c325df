//! Structural HTML equivalence checks for tests.
//!
//! Two snippets are considered the same when their element trees match under a configurable
//! tolerance policy: attribute order, class order, insignificant whitespace, comments and
//! (optionally) extra attributes or class names on the candidate are not differences.
//!
//! # Example
//! ```
//! use html_equiv::HtmlComparer;
//!
//! let expected = "<div><p class='a b'>Hello</p></div>";
//! let actual = "<div>\n  <p class=\"b a\">Hello</p>\n</div>";
//!
//! let comparer = HtmlComparer::new();
//! assert!(comparer.compare(expected, actual).matches());
//! ```
//!
//! A sub-element of a larger document can be located with a CSS selector:
//! ```
//! use html_equiv::{HtmlComparer, MismatchReason};
//!
//! let page = "<main><p class='greeting'>Hello <em>there</em></p></main>";
//! let comparer = HtmlComparer::new();
//!
//! assert!(comparer.compare_element("Hello <em>there</em>", page, ".greeting").unwrap().matches());
//! assert_eq!(
//!     comparer.compare_element("Hi", page, ".missing").unwrap().reason(),
//!     Some(MismatchReason::ElementNotFound)
//! );
//! ```
//!
//! For testing, you can use the provided assertion macros:
//! ```
//! # use html_equiv::assert_html_eq;
//! assert_html_eq!(
//!     "<div><p>Hello</p></div>",
//!     "<div>\n  <p>Hello</p>\n</div>"
//! );
//! ```

/// Asserts that two HTML strings are equivalent according to the given comparison options.
///
/// # Examples
/// ```
/// use html_equiv::assert_html_eq;
///
/// assert_html_eq!(
///     "<div><p>Hello</p></div>",
///     "<div>\n  <p>Hello</p>\n</div>"
/// );
///
/// // With custom options
/// use html_equiv::HtmlCompareOptions;
/// assert_html_eq!(
///     "<p class='one'>Hello</p>",
///     "<p class='one two' data-test='1'>Hello</p>",
///     HtmlCompareOptions {
///         ignore_additional_attributes: true,
///         ignore_additional_class_names: true,
///         ..Default::default()
///     }
/// );
/// ```
#[macro_export]
macro_rules! assert_html_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_html_eq!($left, $right, $crate::HtmlCompareOptions::default())
    };
    ($left:expr, $right:expr, $options:expr $(,)?) => {{
        match (&$left, &$right, &$options) {
            (left_val, right_val, options) => {
                let comparer = $crate::HtmlComparer::with_options(options.clone());
                let result = comparer.compare(left_val, right_val);
                if !result.matches() {
                    panic!(
                        "\n\
                        HTML comparison failed:\n\
                        {}\n\n\
                        left HTML:\n\
                        {}\n\n\
                        right HTML:\n\
                        {}\n\n\
                        options: {:#?}\
                    ",
                        result, left_val, right_val, options
                    );
                }
            }
        }
    }};
}

/// Asserts that two HTML strings are not equivalent according to the given comparison options.
///
/// # Examples
/// ```
/// use html_equiv::assert_html_ne;
///
/// assert_html_ne!(
///     "<div><p>Hello</p></div>",
///     "<div><p>Different</p></div>"
/// );
/// ```
#[macro_export]
macro_rules! assert_html_ne {
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_html_ne!($left, $right, $crate::HtmlCompareOptions::default())
    };
    ($left:expr, $right:expr, $options:expr $(,)?) => {{
        match (&$left, &$right, &$options) {
            (left_val, right_val, options) => {
                let comparer = $crate::HtmlComparer::with_options(options.clone());
                if comparer.compare(left_val, right_val).matches() {
                    panic!(
                        "\n\
                        HTML strings were equal but expected to be different:\n\n\
                        HTML:\n\
                        {}\n\n\
                        options: {:#?}\
                    ",
                        left_val, options
                    );
                }
            }
        }
    }};
}

/// Asserts that the element located by a selector matches the expected HTML.
///
/// Without options, the HTML is parsed as a fragment and the element's content is compared.
///
/// # Examples
/// ```
/// use html_equiv::{assert_html_element, ElementComparisonMode, HtmlCompareOptions};
///
/// assert_html_element!("Hello", "<div><p id='greeting'>Hello</p></div>", "#greeting");
///
/// assert_html_element!(
///     "<p id='greeting'>Hello</p>",
///     "<div><p id='greeting'>Hello</p></div>",
///     "div > p",
///     HtmlCompareOptions {
///         element_comparison_mode: ElementComparisonMode::OuterElement,
///         ..Default::default()
///     }
/// );
/// ```
#[macro_export]
macro_rules! assert_html_element {
    ($expected:expr, $html:expr, $selector:expr $(,)?) => {
        $crate::assert_html_element!($expected, $html, $selector, $crate::presets::fragment())
    };
    ($expected:expr, $html:expr, $selector:expr, $options:expr $(,)?) => {{
        match (&$expected, &$html, &$selector, &$options) {
            (expected_val, html_val, selector_val, options) => {
                let comparer = $crate::HtmlComparer::with_options(options.clone());
                match comparer.compare_element(expected_val, html_val, selector_val) {
                    Ok(result) if result.matches() => {}
                    Ok(result) => panic!(
                        "\n\
                        HTML element comparison failed for selector '{}':\n\
                        {}\n\n\
                        options: {:#?}\
                    ",
                        selector_val, result, options
                    ),
                    Err(err) => panic!("HTML element comparison could not run: {}", err),
                }
            }
        }
    }};
}

/// Asserts that the HTML contains an element matched by a selector.
///
/// # Examples
/// ```
/// use html_equiv::assert_html_contains;
///
/// assert_html_contains!("<ul><li class='item'>One</li></ul>", "ul > li.item");
/// ```
#[macro_export]
macro_rules! assert_html_contains {
    ($html:expr, $selector:expr $(,)?) => {
        $crate::assert_html_contains!($html, $selector, $crate::HtmlCompareOptions::default())
    };
    ($html:expr, $selector:expr, $options:expr $(,)?) => {{
        match (&$html, &$selector, &$options) {
            (html_val, selector_val, options) => {
                let comparer = $crate::HtmlComparer::with_options(options.clone());
                match comparer.contains(html_val, selector_val) {
                    Ok(true) => {}
                    Ok(false) => panic!(
                        "\n\
                        Expected element with selector '{}'.\n\n\
                        Actual HTML:\n\
                        {}\
                    ",
                        selector_val, html_val
                    ),
                    Err(err) => panic!("HTML contains check could not run: {}", err),
                }
            }
        }
    }};
}

mod comparer;
mod equality;
mod error;
mod options;
mod result;
mod view;

pub use comparer::{HtmlTextComparer, Ordinal, OrdinalIgnoreCase, StringComparer};
pub use error::HtmlCompareError;
pub use options::{presets, ElementComparisonMode, ElementSelectionMode, HtmlCompareOptions};
pub use result::{HtmlCompareResult, MismatchReason};
pub use view::{NodeTreeIter, NodeTreeView, ScopedNode};

use comparer::trim_html_whitespace;
use equality::TreeComparer;
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Main struct for comparing HTML
///
/// A comparer owns its options and never changes them, so one instance can be shared freely
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct HtmlComparer {
    options: HtmlCompareOptions,
}

impl HtmlComparer {
    /// Create a new HTML comparer with default options. Input is parsed as full documents.
    pub fn new() -> Self {
        Self {
            options: HtmlCompareOptions::default(),
        }
    }

    /// Create a comparer with default tolerances that parses input as body fragments.
    pub fn fragment() -> Self {
        Self::with_options(presets::fragment())
    }

    /// Create a new HTML comparer with custom options
    pub fn with_options(options: HtmlCompareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HtmlCompareOptions {
        &self.options
    }

    /// Compare two HTML strings.
    ///
    /// Two blank strings match; a blank string never matches a non-blank one.
    pub fn compare(&self, expected: &str, candidate: &str) -> HtmlCompareResult {
        let trimmed_expected = trim_html_whitespace(expected);
        let trimmed_candidate = trim_html_whitespace(candidate);

        match (trimmed_expected.is_empty(), trimmed_candidate.is_empty()) {
            (true, true) => return HtmlCompareResult::Match,
            (true, false) | (false, true) => {
                return HtmlCompareResult::mismatch(expected, candidate)
            }
            (false, false) => {}
        }

        if trimmed_expected == trimmed_candidate {
            return HtmlCompareResult::Match;
        }

        let expected_doc = self.parse(expected);
        let candidate_doc = self.parse(candidate);

        let equal = TreeComparer::new(&self.options).views_equal(
            &self.view(expected_doc.root_element(), false),
            &self.view(candidate_doc.root_element(), false),
        );
        debug!(equal, "compared HTML");

        if equal {
            HtmlCompareResult::Match
        } else {
            HtmlCompareResult::mismatch(expected, candidate)
        }
    }

    /// Compare the element(s) located by `selector` in `html` against the `expected` fragment.
    ///
    /// How multiple matches are handled follows
    /// [`element_selection_mode`](HtmlCompareOptions::element_selection_mode), and what part
    /// of each element is compared follows
    /// [`element_comparison_mode`](HtmlCompareOptions::element_comparison_mode).
    ///
    /// Fails when the selector is blank or invalid, or when `expected` does not have the
    /// shape the comparison mode needs.
    pub fn compare_element(
        &self,
        expected: &str,
        html: &str,
        selector: &str,
    ) -> Result<HtmlCompareResult, HtmlCompareError> {
        let parsed_selector = parse_selector(selector)?;
        let mode = self.options.effective_comparison_mode();

        let expected_doc = Html::parse_fragment(expected);
        let expected_root = self.expected_root(&expected_doc, mode)?;

        let candidate_doc = self.parse(html);
        let mut elements = self.select(&candidate_doc, &parsed_selector);
        let compare = |element| self.compare_selected(expected, expected_root, element, mode);

        let result = match self.options.element_selection_mode {
            ElementSelectionMode::First => match elements.next() {
                Some(element) => compare(element),
                None => HtmlCompareResult::element_not_found(),
            },
            ElementSelectionMode::Single => match (elements.next(), elements.next()) {
                (None, _) => HtmlCompareResult::element_not_found(),
                (Some(_), Some(_)) => HtmlCompareResult::multiple_elements_found(),
                (Some(element), None) => compare(element),
            },
            ElementSelectionMode::All => {
                let mut found = false;
                let mut failure = None;
                for element in elements {
                    found = true;
                    let result = compare(element);
                    if !result.matches() {
                        failure = Some(result);
                        break;
                    }
                }
                match (found, failure) {
                    (false, _) => HtmlCompareResult::element_not_found(),
                    (true, Some(failure)) => failure,
                    (true, None) => HtmlCompareResult::Match,
                }
            }
            ElementSelectionMode::Any => {
                let mut first_failure = None;
                let mut matched = false;
                for element in elements {
                    let result = compare(element);
                    if result.matches() {
                        matched = true;
                        break;
                    }
                    first_failure.get_or_insert(result);
                }
                match (matched, first_failure) {
                    (true, _) => HtmlCompareResult::Match,
                    (false, Some(failure)) => failure,
                    (false, None) => HtmlCompareResult::element_not_found(),
                }
            }
        };

        debug!(
            selector,
            selection_mode = ?self.options.element_selection_mode,
            comparison_mode = ?mode,
            matches = result.matches(),
            reason = ?result.reason(),
            "compared selected HTML"
        );
        Ok(result)
    }

    /// Check whether `html` contains an element matched by `selector`.
    ///
    /// Under [`ElementSelectionMode::Single`] exactly one element must match; every other mode
    /// needs at least one. Blank HTML contains nothing.
    pub fn contains(&self, html: &str, selector: &str) -> Result<bool, HtmlCompareError> {
        let parsed_selector = parse_selector(selector)?;

        if trim_html_whitespace(html).is_empty() {
            return Ok(false);
        }

        let doc = self.parse(html);
        let mut elements = self.select(&doc, &parsed_selector);

        let found = match self.options.element_selection_mode {
            ElementSelectionMode::Single => elements.next().is_some() && elements.next().is_none(),
            ElementSelectionMode::First | ElementSelectionMode::All | ElementSelectionMode::Any => {
                elements.next().is_some()
            }
        };
        debug!(selector, found, "checked HTML for element");
        Ok(found)
    }

    fn parse(&self, html: &str) -> Html {
        if self.options.treat_as_fragment {
            Html::parse_fragment(html)
        } else {
            Html::parse_document(html)
        }
    }

    fn view<'a>(&self, root: ElementRef<'a>, include_root: bool) -> NodeTreeView<'a> {
        NodeTreeView::new(root)
            .include_root(include_root)
            .skip_empty_text(self.options.ignore_empty_text_nodes)
    }

    /// Elements matching `selector` below the root, in document order. Neither a document's
    /// `<html>` element nor the wrapper holding a parsed fragment is ever returned.
    fn select<'a>(
        &self,
        doc: &'a Html,
        selector: &'a Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let root = doc.root_element();
        doc.select(selector).filter(move |element| *element != root)
    }

    /// The node the expected side of a selector comparison is rooted at: the fragment wrapper
    /// for [`ElementComparisonMode::InnerContent`], its single element otherwise.
    fn expected_root<'a>(
        &self,
        expected: &'a Html,
        mode: ElementComparisonMode,
    ) -> Result<ElementRef<'a>, HtmlCompareError> {
        let wrapper = expected.root_element();

        match mode {
            ElementComparisonMode::InnerContent => Ok(wrapper),
            ElementComparisonMode::OuterElement | ElementComparisonMode::ElementOnly => {
                let roots: Vec<_> = NodeTreeView::new(wrapper)
                    .iter()
                    .filter(|scoped| scoped.depth == 0)
                    .collect();

                let element = match roots.as_slice() {
                    [root] => ElementRef::wrap(root.node),
                    _ => None,
                };
                let element = element.ok_or(HtmlCompareError::ExpectedRootCount {
                    mode,
                    found: roots.len(),
                })?;

                let has_children = !self.view(element, false).is_empty();
                if mode == ElementComparisonMode::ElementOnly && has_children {
                    return Err(HtmlCompareError::ExpectedHasChildren);
                }

                Ok(element)
            }
        }
    }

    fn compare_selected(
        &self,
        expected: &str,
        expected_root: ElementRef,
        element: ElementRef,
        mode: ElementComparisonMode,
    ) -> HtmlCompareResult {
        let tree = TreeComparer::new(&self.options);

        let (equal, actual) = match mode {
            ElementComparisonMode::InnerContent => (
                tree.views_equal(
                    &self.view(expected_root, false),
                    &self.view(element, false),
                ),
                element.inner_html(),
            ),
            ElementComparisonMode::OuterElement => (
                tree.views_equal(&self.view(expected_root, true), &self.view(element, true)),
                element.html(),
            ),
            ElementComparisonMode::ElementOnly => (
                tree.elements_equal(expected_root.value(), element.value()),
                open_tag(element.value()),
            ),
        };

        if equal {
            HtmlCompareResult::Match
        } else {
            HtmlCompareResult::mismatch(expected, actual)
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, HtmlCompareError> {
    if selector.trim().is_empty() {
        return Err(HtmlCompareError::EmptySelector);
    }

    Selector::parse(selector).map_err(|err| HtmlCompareError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

/// Render the start tag of an element, e.g. `<p class="lead">`.
fn open_tag(element: &Element) -> String {
    let mut tag = format!("<{}", element.name());
    for (name, value) in element.attrs() {
        let value = value.replace('&', "&amp;").replace('"', "&quot;");
        tag.push_str(&format!(" {}=\"{}\"", name, value));
    }
    tag.push('>');
    tag
}
