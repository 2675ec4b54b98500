// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-operation validation state.
//!
//! Every restructuring operation (map, unmap, move, resize, restack,
//! reshape, border change) runs the same pipeline:
//!
//! ```text
//!   mark_overlapped ──► geometry update ──► validate_tree
//!          │                                     │
//!          ▼                                     ▼
//!   ValidationTable ◄── gravity migration ◄── clips recomputed
//!          │
//!          ▼
//!   handle_exposures ──► Screen::paint_window / window_exposures
//! ```
//!
//! Windows touched by the operation carry a [`ValidationState`] in the
//! [`ValidationTable`] from the moment they are marked until the exposure
//! dispatcher releases them. Each state moves through
//! `Marked → ClipValidated → [Migrated] → released`; the table is empty
//! between operations.

mod clip;
mod mark;

use alloc::collections::BTreeMap;

use crate::region::Region;
use crate::window::WindowId;

pub use clip::validate_tree;
pub use mark::{Overlap, mark_overlapped, mark_window};

pub(crate) use clip::recompute_exposures;

/// What kind of change a validation pass follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VtKind {
    /// A window became viewable.
    Map,
    /// A window stopped being viewable.
    Unmap,
    /// A window moved without changing size.
    Move,
    /// Only the stacking order changed.
    Stack,
    /// Size, shape or border changed.
    Other,
}

/// Progress of one window through an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Attached by the overlap marker.
    Marked,
    /// Clip regions recomputed; exposures recorded.
    ClipValidated,
    /// Exposures reduced by gravity migration.
    Migrated,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Before {
    pub(crate) old_abs: (i32, i32),
    pub(crate) border_visible: Option<Region>,
    pub(crate) resized: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct After {
    pub(crate) exposed: Region,
    pub(crate) border_exposed: Region,
}

/// Scratch record attached to a window for the duration of one operation.
#[derive(Clone, Debug)]
pub struct ValidationState {
    pub(crate) before: Before,
    pub(crate) after: After,
    pub(crate) phase: Phase,
}

impl ValidationState {
    fn new(old_abs: (i32, i32)) -> Self {
        Self {
            before: Before {
                old_abs,
                ..Before::default()
            },
            after: After::default(),
            phase: Phase::Marked,
        }
    }

    /// Absolute interior origin when the window was marked.
    #[must_use]
    pub fn old_abs_origin(&self) -> (i32, i32) {
        self.before.old_abs
    }

    /// Border pixels known to be visible before the change, if recorded.
    #[must_use]
    pub fn border_visible(&self) -> Option<&Region> {
        self.before.border_visible.as_ref()
    }

    /// Whether the operation changed the window's size or shape.
    #[must_use]
    pub fn is_resized(&self) -> bool {
        self.before.resized
    }

    /// Interior pixels that still need repainting.
    #[must_use]
    pub fn exposed(&self) -> &Region {
        &self.after.exposed
    }

    /// Border pixels that still need repainting.
    #[must_use]
    pub fn border_exposed(&self) -> &Region {
        &self.after.border_exposed
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// Side table of [`ValidationState`]s keyed by window slot.
#[derive(Clone, Debug, Default)]
pub struct ValidationTable {
    entries: BTreeMap<u32, ValidationState>,
}

impl ValidationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no window carries validation state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of windows carrying validation state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the state attached to `id`, if any.
    #[must_use]
    pub fn get(&self, id: WindowId) -> Option<&ValidationState> {
        self.entries.get(&id.idx)
    }

    /// Returns whether `id` is part of the operation in flight.
    #[must_use]
    pub fn is_marked(&self, id: WindowId) -> bool {
        self.entries.contains_key(&id.idx)
    }

    /// Attaches fresh state to `idx`. Returns `false` if already marked.
    pub(crate) fn mark_at(&mut self, idx: u32, old_abs: (i32, i32)) -> bool {
        if self.entries.contains_key(&idx) {
            return false;
        }
        self.entries.insert(idx, ValidationState::new(old_abs));
        true
    }

    pub(crate) fn contains_at(&self, idx: u32) -> bool {
        self.entries.contains_key(&idx)
    }

    pub(crate) fn get_mut_at(&mut self, idx: u32) -> Option<&mut ValidationState> {
        self.entries.get_mut(&idx)
    }

    pub(crate) fn remove_at(&mut self, idx: u32) -> Option<ValidationState> {
        self.entries.remove(&idx)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (u32, &ValidationState)> {
        self.entries.iter().map(|(&idx, state)| (idx, state))
    }

    /// Returns the state of `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` carries no state.
    pub(crate) fn state_mut(&mut self, idx: u32) -> &mut ValidationState {
        match self.entries.get_mut(&idx) {
            Some(state) => state,
            None => panic!("window slot {idx} carries no validation state"),
        }
    }
}
