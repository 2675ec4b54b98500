// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::{INVALID, WindowId};
use super::store::WindowStore;

/// An iterator over the direct children of a window, topmost first.
///
/// Created by [`WindowStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a WindowStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a WindowStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = WindowId;

    fn next(&mut self) -> Option<WindowId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// Pre-order walk with an explicit stack.
///
/// The cursor does not borrow the store, so callers may mutate windows
/// between steps. Children of the most recently yielded window are pushed
/// lazily on the following [`next`](Self::next) call, reading the tree as it
/// is at that moment, unless [`skip_children`](Self::skip_children) was
/// called in between.
#[derive(Debug)]
pub(crate) struct PreOrder {
    stack: Vec<u32>,
    descend: u32,
}

impl PreOrder {
    /// Walks the subtree rooted at `root`.
    pub(crate) fn new(root: u32) -> Self {
        let mut stack = Vec::new();
        if root != INVALID {
            stack.push(root);
        }
        Self {
            stack,
            descend: INVALID,
        }
    }

    /// Walks the subtrees of `first` and of every later sibling of `first`,
    /// in stacking order.
    pub(crate) fn from_sibling(store: &WindowStore, first: u32) -> Self {
        let mut stack = Vec::new();
        if first != INVALID {
            let parent = store.parent[first as usize];
            let mut s = store.last_child[parent as usize];
            while s != INVALID {
                stack.push(s);
                if s == first {
                    break;
                }
                s = store.prev_sibling[s as usize];
            }
        }
        Self {
            stack,
            descend: INVALID,
        }
    }

    /// Do not visit the children of the window yielded last.
    pub(crate) fn skip_children(&mut self) {
        self.descend = INVALID;
    }

    pub(crate) fn next(&mut self, store: &WindowStore) -> Option<u32> {
        if self.descend != INVALID {
            let mut c = store.last_child[self.descend as usize];
            while c != INVALID {
                self.stack.push(c);
                c = store.prev_sibling[c as usize];
            }
        }
        let idx = self.stack.pop()?;
        self.descend = idx;
        Some(idx)
    }
}
