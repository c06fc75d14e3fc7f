//! One pre-order traversal shared by the Python syntax trees and the XML element trees.

/// A node from either of the two tree kinds the scanner walks.
#[derive(Debug, Clone, Copy)]
pub enum TreeNode<'a> {
    Syntax(tree_sitter::Node<'a>),
    Markup(roxmltree::Node<'a, 'a>),
}

impl<'a> TreeNode<'a> {
    /// The grammar kind of a syntax node, or the local tag name of a markup element.
    ///
    /// Markup nodes that are not elements (text, comments, processing instructions) have an empty tag.
    #[must_use]
    pub fn tag(&self) -> &'a str {
        match self {
            Self::Syntax(node) => node.kind(),
            Self::Markup(node) => {
                if node.is_element() {
                    node.tag_name().name()
                } else {
                    ""
                }
            }
        }
    }

    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        match self {
            Self::Syntax(node) => {
                let mut cursor = node.walk();
                node.children(&mut cursor).map(Self::Syntax).collect()
            }
            Self::Markup(node) => node.children().map(Self::Markup).collect(),
        }
    }

    #[must_use]
    pub const fn as_syntax(self) -> Option<tree_sitter::Node<'a>> {
        match self {
            Self::Syntax(node) => Some(node),
            Self::Markup(_) => None,
        }
    }

    #[must_use]
    pub const fn as_markup(self) -> Option<roxmltree::Node<'a, 'a>> {
        match self {
            Self::Markup(node) => Some(node),
            Self::Syntax(_) => None,
        }
    }

    /// All nodes of the tree rooted here, the root included, in document order.
    #[must_use]
    pub fn descendants(self) -> Descendants<'a> {
        Descendants { stack: vec![self] }
    }

    /// All nodes at any depth (the root included) whose tag equals `tag`, in document order.
    pub fn find_all(self, tag: &str) -> impl Iterator<Item = Self> {
        self.descendants().filter(move |node| node.tag() == tag)
    }
}

/// Iterator returned by [`TreeNode::descendants`].
///
/// Uses an explicit stack so arbitrarily deep input cannot exhaust the call stack.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<TreeNode<'a>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = TreeNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}
