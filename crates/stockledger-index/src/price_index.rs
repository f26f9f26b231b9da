//! AVL tree holding one [`Position`] per symbol.
//!
//! Each node owns its children outright (`Option<Box<Node>>`); there are no
//! parent links. Insertion recurses down to a leaf and rebalances every
//! ancestor on the way back up, so the height stays O(log n).
//!
//! Positions are never removed: a symbol sold down to zero keeps its node.

use std::cmp::Ordering;

use stockledger_types::{LedgerError, Position, Result};

type Link = Option<Box<Node>>;

#[derive(Debug, Clone)]
struct Node {
    position: Position,
    left: Link,
    right: Link,
    /// 1 for a leaf; `height(None)` is 0.
    height: usize,
}

impl Node {
    fn leaf(position: Position) -> Box<Self> {
        Box::new(Self {
            position,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn left_heavy(&self) -> bool {
        height(&self.left) > height(&self.right) + 1
    }

    fn right_heavy(&self) -> bool {
        height(&self.right) > height(&self.left) + 1
    }
}

fn height(link: &Link) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

/// Promote `y`'s left child into `y`'s place.
fn rotate_right(mut y: Box<Node>) -> Box<Node> {
    let Some(mut x) = y.left.take() else {
        return y;
    };
    y.left = x.right.take();
    y.update_height();
    x.right = Some(y);
    x.update_height();
    x
}

/// Promote `x`'s right child into `x`'s place.
fn rotate_left(mut x: Box<Node>) -> Box<Node> {
    let Some(mut y) = x.right.take() else {
        return x;
    };
    x.right = y.left.take();
    x.update_height();
    y.left = Some(x);
    y.update_height();
    y
}

fn insert_node(link: Link, position: Position, key: &str) -> Box<Node> {
    let Some(mut node) = link else {
        return Node::leaf(position);
    };

    if key < node.position.symbol.as_str() {
        node.left = Some(insert_node(node.left.take(), position, key));
    } else {
        node.right = Some(insert_node(node.right.take(), position, key));
    }

    node.update_height();

    if node.left_heavy() {
        let outer = node
            .left
            .as_ref()
            .is_some_and(|l| key < l.position.symbol.as_str());
        if !outer {
            // Left-right: straighten the kink first.
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    if node.right_heavy() {
        let outer = node
            .right
            .as_ref()
            .is_some_and(|r| key > r.position.symbol.as_str());
        if !outer {
            // Right-left.
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

/// Balanced ordered map from symbol to [`Position`].
#[derive(Debug, Clone, Default)]
pub struct PriceIndex {
    root: Link,
    len: usize,
}

impl PriceIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index by inserting every position in turn.
    ///
    /// # Errors
    /// Returns [`LedgerError::DuplicateSymbol`] if a symbol repeats.
    pub fn from_positions(positions: impl IntoIterator<Item = Position>) -> Result<Self> {
        let mut index = Self::new();
        for position in positions {
            index.insert(position)?;
        }
        Ok(index)
    }

    /// Look up a symbol. O(log n).
    #[must_use]
    pub fn search(&self, symbol: &str) -> Option<&Position> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match symbol.cmp(node.position.symbol.as_str()) {
                Ordering::Equal => return Some(&node.position),
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
            }
        }
        None
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.search(symbol).is_some()
    }

    /// Insert a position under a symbol not yet in the index, then rebalance.
    ///
    /// # Errors
    /// Returns [`LedgerError::DuplicateSymbol`] if the symbol is already
    /// indexed; callers decide between update and insert by searching first.
    pub fn insert(&mut self, position: Position) -> Result<()> {
        if self.contains(&position.symbol) {
            return Err(LedgerError::DuplicateSymbol(position.symbol));
        }
        let key = position.symbol.clone();
        self.root = Some(insert_node(self.root.take(), position, &key));
        self.len += 1;
        Ok(())
    }

    /// Swap in new figures for an indexed symbol; returns the old position.
    /// The tree shape is untouched because the key does not change.
    ///
    /// # Errors
    /// Returns [`LedgerError::SymbolNotFound`] if the symbol is not indexed.
    pub fn replace(&mut self, position: Position) -> Result<Position> {
        let mut cur = self.root.as_deref_mut();
        while let Some(node) = cur {
            match position.symbol.as_str().cmp(node.position.symbol.as_str()) {
                Ordering::Equal => return Ok(std::mem::replace(&mut node.position, position)),
                Ordering::Less => cur = node.left.as_deref_mut(),
                Ordering::Greater => cur = node.right.as_deref_mut(),
            }
        }
        Err(LedgerError::SymbolNotFound(position.symbol))
    }

    /// Positions in ascending symbol order.
    #[must_use]
    pub fn inorder(&self) -> Inorder<'_> {
        Inorder::new(self.root.as_deref())
    }

    /// Positions node-first, then left subtree, then right subtree.
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            stack: self.root.as_deref().into_iter().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; 0 when empty.
    #[must_use]
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Verify ordering, balance, stored heights and the element count.
    ///
    /// # Errors
    /// Returns [`LedgerError::Internal`] describing the first violation found.
    pub fn check_invariants(&self) -> Result<()> {
        fn walk<'a>(
            link: &'a Link,
            lower: Option<&'a str>,
            upper: Option<&'a str>,
            count: &mut usize,
        ) -> std::result::Result<usize, String> {
            let Some(node) = link else {
                return Ok(0);
            };
            let sym = node.position.symbol.as_str();
            if lower.is_some_and(|lo| sym <= lo) || upper.is_some_and(|hi| sym >= hi) {
                return Err(format!("symbol {sym:?} out of order"));
            }
            *count += 1;
            let lh = walk(&node.left, lower, Some(sym), count)?;
            let rh = walk(&node.right, Some(sym), upper, count)?;
            if lh.abs_diff(rh) > 1 {
                return Err(format!("node {sym:?} unbalanced: left {lh}, right {rh}"));
            }
            let expected = 1 + lh.max(rh);
            if node.height != expected {
                return Err(format!(
                    "node {sym:?} stores height {} but has height {expected}",
                    node.height
                ));
            }
            Ok(expected)
        }

        let mut count = 0;
        walk(&self.root, None, None, &mut count).map_err(LedgerError::Internal)?;
        if count != self.len {
            return Err(LedgerError::Internal(format!(
                "index counts {} positions but holds {count}",
                self.len
            )));
        }
        Ok(())
    }
}

/// Lazy ascending walk over a [`PriceIndex`].
#[derive(Debug, Clone)]
pub struct Inorder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Inorder<'a> {
    fn new(root: Option<&'a Node>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut cur: Option<&'a Node>) {
        while let Some(node) = cur {
            self.stack.push(node);
            cur = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for Inorder<'a> {
    type Item = &'a Position;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.position)
    }
}

/// Lazy node-left-right walk over a [`PriceIndex`].
#[derive(Debug, Clone)]
pub struct Preorder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Position;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right.as_deref() {
            self.stack.push(right);
        }
        if let Some(left) = node.left.as_deref() {
            self.stack.push(left);
        }
        Some(&node.position)
    }
}
