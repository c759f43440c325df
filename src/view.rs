//! Scoped, filtered walks over a parsed subtree.
//!
//! Both sides of every comparison are read through a [`NodeTreeView`] built with the same
//! settings, so filtering never differs between the expected and the candidate tree.

use crate::comparer::trim_html_whitespace;
use ego_tree::iter::{Edge, Traverse};
use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

/// A node yielded by a [`NodeTreeView`], with its depth relative to the view's scope.
///
/// Nodes at the top of the scope have depth 0: the root itself when the root is included,
/// otherwise the root's children.
#[derive(Debug, Clone, Copy)]
pub struct ScopedNode<'a> {
    pub node: NodeRef<'a, Node>,
    pub depth: usize,
}

/// A replayable depth-first (pre-order) sequence over the subtree rooted at an element.
///
/// Comments are never yielded. Whitespace-only text nodes are skipped when
/// `skip_empty_text` is set. Siblings of the root are never part of the view. Each call to
/// [`NodeTreeView::iter`] starts a fresh traversal.
#[derive(Debug, Clone, Copy)]
pub struct NodeTreeView<'a> {
    root: ElementRef<'a>,
    include_root: bool,
    skip_empty_text: bool,
}

impl<'a> NodeTreeView<'a> {
    /// View over the descendants of `root`, skipping whitespace-only text.
    pub fn new(root: ElementRef<'a>) -> Self {
        Self {
            root,
            include_root: false,
            skip_empty_text: true,
        }
    }

    /// Yield `root` itself (at depth 0) ahead of its descendants.
    pub fn include_root(mut self, include_root: bool) -> Self {
        self.include_root = include_root;
        self
    }

    pub fn skip_empty_text(mut self, skip_empty_text: bool) -> Self {
        self.skip_empty_text = skip_empty_text;
        self
    }

    pub fn iter(&self) -> NodeTreeIter<'a> {
        let root: NodeRef<'a, Node> = *self.root;
        NodeTreeIter {
            traverse: root.traverse(),
            depth: 0,
            include_root: self.include_root,
            skip_empty_text: self.skip_empty_text,
        }
    }

    /// Whether the view yields no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> IntoIterator for &NodeTreeView<'a> {
    type Item = ScopedNode<'a>;
    type IntoIter = NodeTreeIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`NodeTreeView::iter`].
pub struct NodeTreeIter<'a> {
    traverse: Traverse<'a, Node>,
    // number of currently open ancestors, the root counting as one
    depth: usize,
    include_root: bool,
    skip_empty_text: bool,
}

impl NodeTreeIter<'_> {
    fn admits(&self, node: &Node) -> bool {
        match node {
            Node::Element(_) => true,
            Node::Text(text) => {
                !(self.skip_empty_text && trim_html_whitespace(text).is_empty())
            }
            _ => false,
        }
    }
}

impl<'a> Iterator for NodeTreeIter<'a> {
    type Item = ScopedNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.traverse.next()? {
                Edge::Open(node) => {
                    let depth = self.depth;
                    self.depth += 1;

                    if depth == 0 && !self.include_root {
                        continue;
                    }
                    if !self.admits(node.value()) {
                        continue;
                    }

                    let depth = if self.include_root { depth } else { depth - 1 };
                    return Some(ScopedNode { node, depth });
                }
                Edge::Close(_) => self.depth -= 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn describe(view: &NodeTreeView) -> Vec<String> {
        view.iter()
            .map(|scoped| match scoped.node.value() {
                Node::Element(element) => format!("{}:{}", scoped.depth, element.name()),
                Node::Text(text) => format!("{}:{:?}", scoped.depth, &**text),
                other => format!("{}:{:?}", scoped.depth, other),
            })
            .collect()
    }

    fn select<'a>(html: &'a Html, selector: &str) -> ElementRef<'a> {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector).next().unwrap()
    }

    #[test]
    fn test_descendants_in_document_order() {
        let html = Html::parse_fragment("<div><p>a<b>b</b></p><!--c--><span>d</span></div>");
        let view = NodeTreeView::new(select(&html, "div"));
        assert_eq!(
            describe(&view),
            vec!["0:p", "1:\"a\"", "1:b", "2:\"b\"", "0:span", "1:\"d\""]
        );
    }

    #[test]
    fn test_include_root_excludes_siblings() {
        let html = Html::parse_fragment("<p>before</p><div><i>x</i></div><p>after</p>");
        let view = NodeTreeView::new(select(&html, "div")).include_root(true);
        assert_eq!(describe(&view), vec!["0:div", "1:i", "2:\"x\""]);
    }

    #[test]
    fn test_empty_text_filtering() {
        let html = Html::parse_fragment("<div> <p>x</p> </div>");
        let div = select(&html, "div");

        assert_eq!(describe(&NodeTreeView::new(div)), vec!["0:p", "1:\"x\""]);
        assert_eq!(
            describe(&NodeTreeView::new(div).skip_empty_text(false)),
            vec!["0:\" \"", "0:p", "1:\"x\"", "0:\" \""]
        );
    }

    #[test]
    fn test_view_is_replayable() {
        let html = Html::parse_fragment("<ul><li>1</li><li>2</li></ul>");
        let view = NodeTreeView::new(select(&html, "ul"));
        let first: Vec<_> = view.iter().map(|n| n.node.id()).collect();
        let second: Vec<_> = (&view).into_iter().map(|n| n.node.id()).collect();
        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_breaking_space_is_not_empty_text() {
        let html = Html::parse_fragment("<div> <p>\u{a0}</p> </div>");
        let nodes: Vec<_> = NodeTreeView::new(select(&html, "div"))
            .iter()
            .map(|scoped| (scoped.depth, scoped.node.value().is_text()))
            .collect();
        assert_eq!(nodes, vec![(0, false), (1, true)]);
    }

    #[test]
    fn test_empty_views() {
        let html = Html::parse_fragment("<div><!-- only a comment --> </div>");
        let div = select(&html, "div");
        assert!(NodeTreeView::new(div).is_empty());
        assert!(!NodeTreeView::new(div).include_root(true).is_empty());
    }
}
