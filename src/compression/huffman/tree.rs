use super::frequency::FrequencyTable;
use super::Symbol;
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Represents a node in the Huffman tree.
///
/// Trees read back from a header carry zero weights; only their shape and
/// leaf symbols are meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    /// A leaf node holds one symbol and its frequency.
    Leaf { symbol: Symbol, weight: u64 },
    /// An internal node with left and right children and combined weight.
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    /// Creates a leaf.
    pub fn leaf(symbol: Symbol, weight: u64) -> Self {
        HuffNode::Leaf { symbol, weight }
    }

    /// Creates an internal node whose weight is the sum of its children's.
    pub fn internal(left: HuffNode, right: HuffNode) -> Self {
        HuffNode::Internal {
            weight: left.weight().saturating_add(right.weight()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Returns the weight of the node.
    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    /// Returns the symbol of a leaf, `None` for internal nodes.
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            HuffNode::Leaf { symbol, .. } => Some(*symbol),
            HuffNode::Internal { .. } => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    /// Number of leaves below (and including) this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 1,
            HuffNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 0,
            HuffNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// True if some leaf holds `symbol`.
    pub fn contains(&self, symbol: Symbol) -> bool {
        match self {
            HuffNode::Leaf { symbol: s, .. } => *s == symbol,
            HuffNode::Internal { left, right, .. } => left.contains(symbol) || right.contains(symbol),
        }
    }

    /// Compares structure and leaf symbols, ignoring weights.
    pub fn same_shape(&self, other: &HuffNode) -> bool {
        match (self, other) {
            (HuffNode::Leaf { symbol: a, .. }, HuffNode::Leaf { symbol: b, .. }) => a == b,
            (
                HuffNode::Internal {
                    left: left1,
                    right: right1,
                    ..
                },
                HuffNode::Internal {
                    left: left2,
                    right: right2,
                    ..
                },
            ) => left1.same_shape(left2) && right1.same_shape(right2),
            _ => false,
        }
    }
}

/// A subtree waiting in the merge queue.
///
/// `key` is the smallest symbol in the subtree. Subtrees are disjoint, so keys
/// are unique and `(weight, key)` is a strict total order.
#[derive(Debug)]
struct Pending {
    weight: u64,
    key: Symbol,
    node: HuffNode,
}

impl Pending {
    /// Joins two subtrees, smaller key on the left.
    fn merge(a: Pending, b: Pending) -> Result<Pending> {
        let (left, right) = if a.key < b.key { (a, b) } else { (b, a) };
        let weight = left.weight.checked_add(right.weight).ok_or_else(|| {
            Error::Construction("combined weight overflows u64".to_string())
        })?;
        Ok(Pending {
            weight,
            key: left.key,
            node: HuffNode::Internal {
                weight,
                left: Box::new(left.node),
                right: Box::new(right.node),
            },
        })
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.key == other.key
    }
}

impl Eq for Pending {}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: BinaryHeap is a max-heap, lowest (weight, key) must pop first.
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.key.cmp(&self.key))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Build the Huffman tree for a frequency table.
///
/// Repeatedly removes the two lightest subtrees and joins them until one
/// remains. Ties on weight go to the subtree holding the smaller symbol, and
/// that subtree also becomes the left child, so equal tables always give the
/// same shape. A table with a single positive symbol yields a lone leaf.
pub fn build_tree(table: &FrequencyTable) -> Result<HuffNode> {
    let mut queue: BinaryHeap<Pending> = table
        .symbols()
        .map(|(symbol, weight)| Pending {
            weight,
            key: symbol,
            node: HuffNode::leaf(symbol, weight),
        })
        .collect();

    loop {
        let first = queue.pop().ok_or_else(|| {
            Error::Construction("frequency table has no positive counts".to_string())
        })?;
        match queue.pop() {
            None => return Ok(first.node),
            Some(second) => queue.push(Pending::merge(first, second)?),
        }
    }
}
