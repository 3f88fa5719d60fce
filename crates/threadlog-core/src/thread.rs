//! Reply-thread reconstruction.
//!
//! Turns the flat comment list fetched from a post's pages into a forest.
//! Each comment is attached under its parent when the parent is present in
//! the input; otherwise it becomes a root. A comment whose parent is missing
//! (for example because the page holding the parent failed to load) is an
//! *orphan*: it is promoted to the top level and flagged, never dropped.
//!
//! Sibling order and root order follow input order. The forest is rebuilt
//! from scratch on every call and keeps no state between calls.

use std::collections::HashMap;

use serde::Serialize;

use crate::records::{Comment, IndexedComment, ParentRef};

/// A comment and its replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadNode {
    /// Position in the post's append order.
    pub global_index: u64,
    /// The comment itself.
    pub comment: Comment,
    /// True if the comment replies to a comment that was not in the input.
    pub orphaned: bool,
    /// Direct replies, in input order.
    pub replies: Vec<ThreadNode>,
}

impl Drop for ThreadNode {
    // Unlink replies onto a heap stack so deep chains drop without recursion.
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.replies);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.replies);
        }
    }
}

/// An ordered list of root threads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ThreadForest {
    roots: Vec<ThreadNode>,
}

impl ThreadForest {
    /// Root nodes in input order.
    #[must_use]
    pub fn roots(&self) -> &[ThreadNode] {
        &self.roots
    }

    /// Consume the forest, returning its roots.
    #[must_use]
    pub fn into_roots(self) -> Vec<ThreadNode> {
        self.roots
    }

    /// Total number of comments in the forest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the forest holds no comments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first, pre-order walk yielding `(depth, node)`; roots have depth 0.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ThreadNode)> + '_ {
        let mut stack: Vec<(usize, &ThreadNode)> =
            self.roots.iter().rev().map(|node| (0, node)).collect();
        std::iter::from_fn(move || {
            let (depth, node) = stack.pop()?;
            stack.extend(node.replies.iter().rev().map(|reply| (depth + 1, reply)));
            Some((depth, node))
        })
    }

    /// Find the node with the given global index.
    #[must_use]
    pub fn find(&self, global_index: u64) -> Option<&ThreadNode> {
        self.iter()
            .map(|(_, node)| node)
            .find(|node| node.global_index == global_index)
    }

    /// Nodes that were promoted to the top level because their parent was missing.
    pub fn orphans(&self) -> impl Iterator<Item = &ThreadNode> + '_ {
        self.roots.iter().filter(|node| node.orphaned)
    }
}

/// Build a reply forest from a flat list of comments.
#[must_use]
pub fn build_forest(comments: Vec<IndexedComment>) -> ThreadForest {
    let n = comments.len();

    // First occurrence wins when a global index appears twice.
    let mut by_index: HashMap<u64, usize> = HashMap::with_capacity(n);
    for (position, item) in comments.iter().enumerate() {
        by_index.entry(item.global_index).or_insert(position);
    }

    let mut parent_of: Vec<Option<usize>> = vec![None; n];
    let mut orphaned = vec![false; n];
    for (position, item) in comments.iter().enumerate() {
        if let ParentRef::Parent(parent) = item.comment.parent {
            match by_index.get(&parent) {
                Some(&p) if p != position => parent_of[position] = Some(p),
                Some(_) => {}
                None => orphaned[position] = true,
            }
        }
    }

    break_cycles(&mut parent_of);

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (position, parent) in parent_of.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(position),
            None => roots.push(position),
        }
    }

    let mut slots: Vec<Option<IndexedComment>> = comments.into_iter().map(Some).collect();
    let mut built: Vec<Option<ThreadNode>> = (0..n).map(|_| None).collect();

    // Post-order over each root without recursion.
    for &root in &roots {
        let mut stack = vec![(root, false)];
        while let Some((position, expanded)) = stack.pop() {
            if expanded {
                let replies = children[position]
                    .iter()
                    .filter_map(|child| built[*child].take())
                    .collect();
                if let Some(item) = slots[position].take() {
                    built[position] = Some(ThreadNode {
                        global_index: item.global_index,
                        comment: item.comment,
                        orphaned: orphaned[position],
                        replies,
                    });
                }
            } else {
                stack.push((position, true));
                stack.extend(children[position].iter().rev().map(|child| (*child, false)));
            }
        }
    }

    ThreadForest {
        roots: roots
            .into_iter()
            .filter_map(|position| built[position].take())
            .collect(),
    }
}

/// Detach the earliest node of every parent cycle so each node reaches a root.
fn break_cycles(parent_of: &mut [Option<usize>]) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; parent_of.len()];
    for start in 0..parent_of.len() {
        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(position) = current {
            match marks[position] {
                Mark::Done => break,
                Mark::InProgress => {
                    // `position` closes a cycle; cut the cycle at its earliest member.
                    let cycle_start = path.iter().position(|p| *p == position).unwrap_or(0);
                    if let Some(&earliest) = path[cycle_start..].iter().min() {
                        parent_of[earliest] = None;
                    }
                    break;
                }
                Mark::Unvisited => {
                    marks[position] = Mark::InProgress;
                    path.push(position);
                    current = parent_of[position];
                }
            }
        }
        for position in path {
            marks[position] = Mark::Done;
        }
    }
}
