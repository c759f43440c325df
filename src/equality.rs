//! Structural equality between two node trees.

use crate::comparer::trim_html_whitespace;
use crate::options::HtmlCompareOptions;
use crate::view::{NodeTreeView, ScopedNode};
use ego_tree::NodeRef;
use scraper::node::Element;
use scraper::{ElementRef, Node};
use std::collections::HashSet;
use std::iter;
use tracing::trace;

const ID_ATTRIBUTE: &str = "id";
const CLASS_ATTRIBUTE: &str = "class";

/// Elements whose text keeps its edge whitespace significant.
fn is_inline_element(name: &str) -> bool {
    matches!(
        name,
        "a" | "abbr"
            | "acronym"
            | "b"
            | "bdi"
            | "bdo"
            | "big"
            | "br"
            | "button"
            | "cite"
            | "code"
            | "data"
            | "del"
            | "dfn"
            | "em"
            | "i"
            | "img"
            | "input"
            | "ins"
            | "kbd"
            | "label"
            | "map"
            | "mark"
            | "object"
            | "output"
            | "q"
            | "s"
            | "samp"
            | "select"
            | "small"
            | "span"
            | "strong"
            | "sub"
            | "sup"
            | "textarea"
            | "time"
            | "tt"
            | "u"
            | "var"
            | "wbr"
    )
}

/// Pair two sequences positionally. Once one side runs out, the other side's remaining
/// items are paired with `None`.
fn pair_up<I, J, T>(mut left: I, mut right: J) -> impl Iterator<Item = (Option<T>, Option<T>)>
where
    I: Iterator<Item = T>,
    J: Iterator<Item = T>,
{
    iter::from_fn(move || match (left.next(), right.next()) {
        (None, None) => None,
        pair => Some(pair),
    })
}

/// Applies the node-level equality rules under a fixed set of options.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeComparer<'o> {
    options: &'o HtmlCompareOptions,
}

impl<'o> TreeComparer<'o> {
    pub(crate) fn new(options: &'o HtmlCompareOptions) -> Self {
        Self { options }
    }

    /// Walk both views in lockstep; every pair must be equal and both must end together.
    pub(crate) fn views_equal<'a>(
        &self,
        expected: &NodeTreeView<'a>,
        candidate: &NodeTreeView<'a>,
    ) -> bool {
        pair_up(expected.iter(), candidate.iter())
            .all(|(expected, candidate)| self.nodes_equal(expected, candidate))
    }

    fn nodes_equal(&self, expected: Option<ScopedNode>, candidate: Option<ScopedNode>) -> bool {
        let (expected, candidate) = match (expected, candidate) {
            (Some(expected), Some(candidate)) => (expected, candidate),
            (expected, candidate) => {
                trace!(
                    missing = expected.is_none(),
                    extra = candidate.is_some(),
                    "node count mismatch"
                );
                return false;
            }
        };

        // Equal depths along the walk is what keeps the two trees the same shape, including
        // a childless node paired with one that has children.
        if expected.depth != candidate.depth {
            trace!(
                expected = expected.depth,
                actual = candidate.depth,
                "node depth mismatch"
            );
            return false;
        }

        match (expected.node.value(), candidate.node.value()) {
            (Node::Text(x), Node::Text(y)) => {
                self.texts_equal(expected.node, x, candidate.node, y)
            }
            (Node::Element(x), Node::Element(y)) => self.elements_equal(x, y),
            (x, y) => {
                trace!(expected = ?x, actual = ?y, "node type mismatch");
                false
            }
        }
    }

    fn texts_equal(
        &self,
        expected_node: NodeRef<Node>,
        expected: &str,
        candidate_node: NodeRef<Node>,
        candidate: &str,
    ) -> bool {
        let inline = in_inline_context(expected_node) && in_inline_context(candidate_node);
        let (expected, candidate) = if inline {
            (expected, candidate)
        } else {
            (trim_html_whitespace(expected), trim_html_whitespace(candidate))
        };

        let equal = self.options.text_comparer.equals(expected, candidate);
        if !equal {
            trace!(expected, actual = candidate, "text content mismatch");
        }
        equal
    }

    /// Compare tag name, id, classes and attributes of two elements. Children are not
    /// looked at.
    pub(crate) fn elements_equal(&self, expected: &Element, candidate: &Element) -> bool {
        if expected.name() != candidate.name()
            && !expected
                .name()
                .eq_ignore_ascii_case(&self.options.wildcard_element_name)
        {
            trace!(
                expected = expected.name(),
                actual = candidate.name(),
                "tag name mismatch"
            );
            return false;
        }

        if !self.ids_equal(expected.id(), candidate.id()) {
            trace!(expected = ?expected.id(), actual = ?candidate.id(), "id mismatch");
            return false;
        }

        let expected_classes = class_list(expected);
        let candidate_classes = class_list(candidate);
        if !self.class_lists_equal(&expected_classes, &candidate_classes) {
            trace!(
                expected = ?expected_classes,
                actual = ?candidate_classes,
                "class list mismatch"
            );
            return false;
        }

        self.attributes_equal(expected, candidate)
    }

    fn ids_equal(&self, expected: Option<&str>, candidate: Option<&str>) -> bool {
        if expected == candidate {
            return true;
        }

        // An id only present on the candidate counts as an additional attribute
        expected.map_or(true, str::is_empty) && self.options.ignore_additional_attributes
    }

    fn class_lists_equal(&self, expected: &[&str], candidate: &[&str]) -> bool {
        if self.options.ignore_additional_class_names {
            if expected.len() > candidate.len() {
                return false;
            }

            if self.options.ignore_class_name_order {
                let candidate: HashSet<_> = candidate.iter().collect();
                return expected.iter().all(|class| candidate.contains(class));
            }

            return candidate
                .iter()
                .filter(|class| expected.contains(class))
                .eq(expected.iter());
        }

        if expected.len() != candidate.len() {
            return false;
        }

        if self.options.ignore_class_name_order {
            let union: HashSet<_> = expected.iter().chain(candidate).collect();
            return union.len() == expected.len();
        }

        expected == candidate
    }

    fn attributes_equal(&self, expected: &Element, candidate: &Element) -> bool {
        let expected_attrs: Vec<_> = significant_attributes(expected).collect();
        let candidate_attrs: Vec<_> = significant_attributes(candidate).collect();

        let count_ok = if self.options.ignore_additional_attributes {
            expected_attrs.len() <= candidate_attrs.len()
        } else {
            expected_attrs.len() == candidate_attrs.len()
        };
        if !count_ok {
            trace!(
                expected = ?expected_attrs,
                actual = ?candidate_attrs,
                "attribute count mismatch"
            );
            return false;
        }

        for (name, value) in &expected_attrs {
            let found = candidate_attrs
                .iter()
                .find(|(candidate_name, _)| candidate_name == name);

            match found {
                Some((_, candidate_value))
                    if self.options.attribute_comparer.equals(value, candidate_value) => {}
                _ => {
                    trace!(
                        attribute = name,
                        expected = value,
                        actual = ?found.map(|(_, v)| v),
                        "attribute mismatch"
                    );
                    return false;
                }
            }
        }

        true
    }
}

fn in_inline_context(node: NodeRef<Node>) -> bool {
    node.parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| is_inline_element(parent.value().name()))
}

/// Class names in source order, duplicates removed.
fn class_list(element: &Element) -> Vec<&str> {
    let mut classes: Vec<&str> = Vec::new();
    for class in element
        .attr(CLASS_ATTRIBUTE)
        .into_iter()
        .flat_map(str::split_ascii_whitespace)
    {
        if !classes.contains(&class) {
            classes.push(class);
        }
    }
    classes
}

/// Attributes other than `id` and `class`, which have their own rules.
fn significant_attributes(element: &Element) -> impl Iterator<Item = (&str, &str)> {
    element
        .attrs()
        .filter(|(name, _)| *name != ID_ATTRIBUTE && *name != CLASS_ATTRIBUTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::OrdinalIgnoreCase;
    use scraper::Html;
    use std::sync::Arc;

    fn fragments_equal(expected: &str, candidate: &str, options: &HtmlCompareOptions) -> bool {
        let expected = Html::parse_fragment(expected);
        let candidate = Html::parse_fragment(candidate);
        TreeComparer::new(options).views_equal(
            &scoped_view(&expected, options),
            &scoped_view(&candidate, options),
        )
    }

    fn scoped_view<'a>(html: &'a Html, options: &HtmlCompareOptions) -> NodeTreeView<'a> {
        NodeTreeView::new(html.root_element()).skip_empty_text(options.ignore_empty_text_nodes)
    }

    fn equal(expected: &str, candidate: &str) -> bool {
        fragments_equal(expected, candidate, &HtmlCompareOptions::default())
    }

    #[test]
    fn test_pair_up() {
        let pairs: Vec<_> = pair_up([1, 2, 3].into_iter(), [4].into_iter()).collect();
        assert_eq!(pairs, vec![(Some(1), Some(4)), (Some(2), None), (Some(3), None)]);

        let pairs: Vec<_> = pair_up(iter::empty(), [7].into_iter()).collect();
        assert_eq!(pairs, vec![(None, Some(7))]);
    }

    #[test]
    fn test_structure() {
        assert!(equal("<p>text</p>", "<p>text</p>"));
        assert!(!equal("<p>text</p>", "<strong>text</strong>"));
        assert!(!equal("<p>text</p>", "<p><strong>text</strong></p>"));
        assert!(!equal("<p>text</p>", "<p>text<strong>content</strong></p>"));
        assert!(!equal("<p>text<strong>content</strong></p>", "<p>text</p>"));
        assert!(!equal(
            "<p>text<span>content</span></p>",
            "<p>text<strong>content</strong></p>"
        ));
        assert!(!equal(
            "<p><span>text</span><span>content</span></p>",
            "<p><span>text</span></p>"
        ));
        assert!(!equal("<div><p></p>x</div>", "<div><p>x</p></div>"));
        assert!(!equal("<p></p>", "<p>x</p>"));
    }

    #[test]
    fn test_text_edge_whitespace() {
        // block context trims, inline context does not
        assert!(equal("<p>text</p>", "<p> text </p>"));
        assert!(equal("<div>\n  text\n</div>", "<div>text</div>"));
        assert!(!equal("<p><span>text</span></p>", "<p><span> text</span></p>"));
        assert!(equal("<p><span>a  b</span></p>", "<p><span>a b</span></p>"));
        assert!(!equal("<p>Text</p>", "<p>text</p>"));
    }

    #[test]
    fn test_non_breaking_space_is_significant() {
        assert!(!equal("<p></p>", "<p>&nbsp;</p>"));
        assert!(!equal("<p>x</p>", "<p>&nbsp;x</p>"));
        assert!(!equal("<p>x</p>", "<p>x&nbsp;</p>"));
        assert!(!equal("<p>a b</p>", "<p>a&nbsp;b</p>"));
        assert!(equal("<p>&nbsp;x</p>", "<p>\n  &nbsp;x </p>"));
    }

    #[test]
    fn test_comments_and_empty_text() {
        assert!(equal("<p>text</p>", "<p><!--c-->text</p>"));
        assert!(equal("<div><div>text</div></div>", "<div> <div>text</div> </div>"));
        assert!(equal("<p></p>", "<p><!--c--></p>"));

        let options = HtmlCompareOptions {
            ignore_empty_text_nodes: false,
            ..Default::default()
        };
        assert!(!fragments_equal(
            "<div><div>text</div></div>",
            "<div> <div>text</div> </div>",
            &options
        ));
    }

    #[test]
    fn test_wildcard() {
        assert!(equal("<any>text</any>", "<p>text</p>"));
        assert!(equal("<ANY>text</ANY>", "<section>text</section>"));
        assert!(!equal("<p>text</p>", "<any>text</any>"));

        let options = HtmlCompareOptions {
            wildcard_element_name: "star".to_string(),
            ..Default::default()
        };
        assert!(fragments_equal("<star>x</star>", "<b>x</b>", &options));
        assert!(!fragments_equal("<any>x</any>", "<b>x</b>", &options));
    }

    #[test]
    fn test_ids() {
        assert!(equal("<p id='one'>text</p>", "<p id=\"one\">text</p>"));
        assert!(!equal("<p id='one'>text</p>", "<p id='two'>text</p>"));
        assert!(!equal("<p>text</p>", "<p id='two'>text</p>"));
        assert!(!equal("<p id=''>t</p>", "<p id='x'>t</p>"));

        let options = HtmlCompareOptions {
            ignore_additional_attributes: true,
            attribute_comparer: Arc::new(OrdinalIgnoreCase),
            ..Default::default()
        };
        assert!(fragments_equal("<p>text</p>", "<p id='two'>text</p>", &options));
        assert!(fragments_equal("<p id=''>t</p>", "<p id='x'>t</p>", &options));
        assert!(!fragments_equal("<p id='one'>t</p>", "<p>t</p>", &options));
        // ids stay ordinal whatever the attribute comparer
        assert!(!fragments_equal("<p id='one'>t</p>", "<p id='ONE'>t</p>", &options));
    }

    #[test]
    fn test_class_policies() {
        let options = |additional: bool, order: bool| HtmlCompareOptions {
            ignore_additional_class_names: additional,
            ignore_class_name_order: order,
            ..Default::default()
        };
        let check = |expected: &str, candidate: &str, additional: bool, order: bool| {
            fragments_equal(
                &format!("<p class='{expected}'>x</p>"),
                &format!("<p class='{candidate}'>x</p>"),
                &options(additional, order),
            )
        };

        // strict, ordered
        assert!(check("a b", "a b", false, false));
        assert!(!check("a b", "b a", false, false));
        assert!(!check("a", "a b", false, false));

        // strict, unordered
        assert!(check("a b", "b a", false, true));
        assert!(!check("a b", "a c", false, true));
        assert!(!check("a b", "a", false, true));

        // superset, ordered
        assert!(check("a b", "a x b", true, false));
        assert!(!check("a b", "b x a", true, false));
        assert!(!check("a b c", "a b", true, false));

        // superset, unordered
        assert!(check("a b", "b x a", true, true));
        assert!(!check("a b", "b x", true, true));

        // classes stay ordinal
        assert!(!check("one", "ONE", false, true));
    }

    #[test]
    fn test_attributes() {
        assert!(equal(
            "<p id='one' class='two' longdesc='three'>text</p>",
            "<p class='two' longdesc='three' id='one'>text</p>"
        ));
        assert!(!equal("<p data-one='value'>t</p>", "<p data-two='value'>t</p>"));
        assert!(!equal("<p longdesc='one'>t</p>", "<p longdesc='two'>t</p>"));
        assert!(!equal("<p longdesc='one'>t</p>", "<p longdesc='ONE'>t</p>"));
        assert!(!equal("<p>t</p>", "<p data-extra='1'>t</p>"));
        assert!(!equal("<p data-a='1'>t</p>", "<p>t</p>"));

        let ignore_case = HtmlCompareOptions {
            attribute_comparer: Arc::new(OrdinalIgnoreCase),
            ..Default::default()
        };
        assert!(fragments_equal(
            "<p longdesc='one'>t</p>",
            "<p longdesc='ONE'>t</p>",
            &ignore_case
        ));

        let additional = HtmlCompareOptions {
            ignore_additional_attributes: true,
            ..Default::default()
        };
        assert!(fragments_equal(
            "<p class='one'>t</p>",
            "<p id='x' class='one' data-v='y'>t</p>",
            &additional
        ));
        assert!(!fragments_equal(
            "<p data-a='1' data-b='2'>t</p>",
            "<p data-a='1' data-c='2'>t</p>",
            &additional
        ));
    }
}
