// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The screen contract.
//!
//! A [`Screen`] is the strategy object a [`WindowTree`](crate::tree::WindowTree)
//! is built with. It has two roles:
//!
//! 1. **Collaborator callbacks.** Painting, forwarding exposures, copying
//!    pixels and repositioning platform surfaces are not done here; the
//!    restructuring code calls out to the screen for each. Callbacks receive
//!    the store by shared reference, so a callback can inspect the tree but
//!    cannot start another restructuring while one is in flight.
//! 2. **Replaceable algorithms.** [`mark_overlapped`](Screen::mark_overlapped),
//!    [`validate_tree`](Screen::validate_tree) and
//!    [`handle_exposures`](Screen::handle_exposures) default to the built-in
//!    implementations and may be overridden, e.g. to wrap them with extra
//!    bookkeeping.
//!
//! # Implementing a screen
//!
//! ```rust,ignore
//! struct Surfaces { /* native handles */ }
//!
//! impl Screen for Surfaces {
//!     fn paint_window(&mut self, windows: &WindowStore, id: WindowId, region: &Region, part: PaintPart) {
//!         // fill `region` with the background or border pixel of `id`
//!     }
//!     fn window_exposures(&mut self, windows: &WindowStore, id: WindowId, exposed: &Region, _: Option<&Region>) {
//!         // paint the background, then queue expose events for the client
//!     }
//!     fn copy_window(&mut self, windows: &WindowStore, id: WindowId, source: &Region, dx: i32, dy: i32) {
//!         // blit `source` to `source + (dx, dy)`
//!     }
//! }
//! ```

use crate::expose;
use crate::region::Region;
use crate::validate::{self, Overlap, ValidationTable, VtKind};
use crate::window::{Visibility, WindowId, WindowStore};

/// Which part of a window a paint request covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaintPart {
    /// The interior, filled with the window background.
    Background,
    /// The border frame.
    Border,
}

/// Callbacks and strategy hooks used by window restructuring.
pub trait Screen {
    /// Paints `region` (absolute coordinates) of window `id`.
    fn paint_window(&mut self, windows: &WindowStore, id: WindowId, region: &Region, part: PaintPart);

    /// Delivers the interior exposure of `id` after an operation.
    ///
    /// Called once for every window that took part in the operation, even
    /// when `exposed` is empty. `backing_store` carries pixels restored from
    /// a backing store, when one exists.
    fn window_exposures(
        &mut self,
        windows: &WindowStore,
        id: WindowId,
        exposed: &Region,
        backing_store: Option<&Region>,
    );

    /// Copies the pixels in `source` to `source` translated by `(dx, dy)`.
    ///
    /// Both regions are in absolute coordinates. The destination always lies
    /// inside the window's new `border_clip`.
    fn copy_window(
        &mut self,
        windows: &WindowStore,
        id: WindowId,
        source: &Region,
        dx: i32,
        dy: i32,
    );

    /// Reports the new absolute interior origin of a window.
    fn position_window(&mut self, windows: &WindowStore, id: WindowId, x: i32, y: i32) {
        _ = (windows, id, x, y);
    }

    /// Called when a window first receives validation state in an operation.
    fn mark_window(&mut self, windows: &WindowStore, id: WindowId) {
        _ = (windows, id);
    }

    /// Called after the clip list of `id` was recomputed; `(dx, dy)` is the
    /// window's displacement during the operation.
    fn clip_notify(&mut self, windows: &WindowStore, id: WindowId, dx: i32, dy: i32) {
        _ = (windows, id, dx, dy);
    }

    /// Called when validation changes the visibility of `id`.
    fn visibility_notify(&mut self, windows: &WindowStore, id: WindowId, visibility: Visibility) {
        _ = (windows, id, visibility);
    }

    /// Called once an operation has dispatched all of its exposures.
    fn post_validate_tree(
        &mut self,
        windows: &WindowStore,
        parent: WindowId,
        first: Option<WindowId>,
        kind: VtKind,
    ) {
        _ = (windows, parent, first, kind);
    }

    /// Marks the windows affected by a change to `win`.
    ///
    /// Defaults to [`validate::mark_overlapped`].
    fn mark_overlapped(
        &mut self,
        windows: &mut WindowStore,
        valdata: &mut ValidationTable,
        win: WindowId,
        first: Option<WindowId>,
    ) -> Overlap {
        validate::mark_overlapped(self, windows, valdata, win, first)
    }

    /// Recomputes the clips of `parent`'s marked children from `first` on.
    ///
    /// Defaults to [`validate::validate_tree`].
    fn validate_tree(
        &mut self,
        windows: &mut WindowStore,
        valdata: &mut ValidationTable,
        parent: WindowId,
        first: Option<WindowId>,
        kind: VtKind,
    ) {
        validate::validate_tree(self, windows, valdata, parent, first, kind);
    }

    /// Paints and forwards every exposure recorded below `root`, releasing
    /// the validation state.
    ///
    /// Defaults to [`expose::handle_exposures`].
    fn handle_exposures(
        &mut self,
        windows: &WindowStore,
        valdata: &mut ValidationTable,
        root: WindowId,
    ) {
        expose::handle_exposures(self, windows, valdata, root);
    }
}
