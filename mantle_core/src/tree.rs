// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Restructuring operations.
//!
//! [`WindowTree`] owns the [`WindowStore`], the per-operation
//! [`ValidationTable`], the [`Screen`] strategy and an optional
//! [`TraceSink`]. Every operation that changes what is visible follows the
//! same shape:
//!
//! 1. mark the windows the change can affect (with the old geometry),
//! 2. apply the change,
//! 3. mark again (with the new geometry),
//! 4. validate clips under the parent,
//! 5. move retained pixels (move and resize only),
//! 6. dispatch exposures and release the validation state.
//!
//! Operations on the root window that would move, resize, restack, reshape
//! or unmap it return without doing anything.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::region::{BoxRect, Region};
use crate::screen::{PaintPart, Screen};
use crate::trace::{
    CopyEvent, ExposeEvent, MarkEvent, OpBeginEvent, OpEndEvent, OpKind, TraceSink, Tracer,
    ValidateEvent,
};
use crate::validate::{self, Overlap, ValidationTable, VtKind, recompute_exposures};
use crate::window::{
    GRAVITY_COUNT, Geometry, Gravity, INVALID, PreOrder, ROOT, StackPosition, Visibility,
    WindowId, WindowStore, gravity_translate,
};

/// A partial configure request. `None` fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WindowChanges {
    /// New outer left edge relative to the parent's interior.
    pub x: Option<i32>,
    /// New outer top edge relative to the parent's interior.
    pub y: Option<i32>,
    /// New interior width.
    pub width: Option<u32>,
    /// New interior height.
    pub height: Option<u32>,
    /// New border width.
    pub border_width: Option<u32>,
    /// New stacking position.
    pub stack: StackPosition,
}

/// A window tree bound to a screen.
pub struct WindowTree<S> {
    windows: WindowStore,
    valdata: ValidationTable,
    screen: S,
    sink: Option<Box<dyn TraceSink>>,
    seq: u64,
}

impl<S: fmt::Debug> fmt::Debug for WindowTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowTree")
            .field("windows", &self.windows)
            .field("valdata", &self.valdata)
            .field("screen", &self.screen)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

impl<S: Screen> WindowTree<S> {
    /// Creates a tree holding only the root of a `width` × `height` screen.
    #[must_use]
    pub fn new(width: u32, height: u32, screen: S) -> Self {
        Self {
            windows: WindowStore::new(width, height),
            valdata: ValidationTable::new(),
            screen,
            sink: None,
            seq: 0,
        }
    }

    /// Returns the root window.
    #[must_use]
    pub fn root(&self) -> WindowId {
        self.windows.root()
    }

    /// Read access to the window store.
    #[must_use]
    pub fn windows(&self) -> &WindowStore {
        &self.windows
    }

    /// Returns the screen strategy.
    #[must_use]
    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Returns the screen strategy mutably.
    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    /// Returns the validation table. Always empty between operations.
    #[must_use]
    pub fn validation(&self) -> &ValidationTable {
        &self.valdata
    }

    /// Installs (or removes) the trace sink, returning the previous one.
    pub fn set_trace_sink(
        &mut self,
        sink: Option<Box<dyn TraceSink>>,
    ) -> Option<Box<dyn TraceSink>> {
        core::mem::replace(&mut self.sink, sink)
    }

    /// Sets the bit gravity used the next time `id` is resized.
    pub fn set_bit_gravity(&mut self, id: WindowId, gravity: Gravity) {
        self.windows.set_bit_gravity(id, gravity);
    }

    /// Sets the win gravity used the next time the parent of `id` is resized.
    pub fn set_win_gravity(&mut self, id: WindowId, gravity: Gravity) {
        self.windows.set_win_gravity(id, gravity);
    }

    // -- Lifecycle --

    /// Creates an unmapped window on top of its siblings.
    pub fn create_window(&mut self, parent: WindowId, geometry: Geometry) -> WindowId {
        self.windows.create_window(parent, geometry)
    }

    /// Destroys a childless window, unmapping it first if necessary.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, if the window is the root or has
    /// children.
    pub fn destroy_window(&mut self, id: WindowId) {
        self.windows.validate(id);
        assert!(id.idx != ROOT, "cannot destroy the root window");
        assert!(
            self.windows.first_child[id.idx as usize] == INVALID,
            "cannot destroy window with children"
        );
        if self.windows.mapped[id.idx as usize] {
            self.unmap_window(id);
        }
        self.windows.destroy_window(id);
    }

    // -- Visibility --

    /// Maps `id`. If its parent is viewable, the window and its mapped
    /// descendants become viewable and are exposed.
    pub fn map_window(&mut self, id: WindowId) {
        self.windows.validate(id);
        let w = id.idx;
        if self.windows.mapped[w as usize] {
            return;
        }
        self.begin(OpKind::Map, id);
        self.windows.mapped[w as usize] = true;
        let p = self.windows.parent[w as usize];
        if !self.windows.viewable[p as usize] {
            self.end(OpKind::Map, id, false);
            return;
        }

        self.realize_tree(w);
        let overlap = self.mark(w, w);
        let p = self.windows.parent[overlap.layer.idx as usize];
        self.validate(p, overlap.layer.idx, VtKind::Map);
        self.commit(p, overlap.layer.idx, VtKind::Map);
        self.end(OpKind::Map, id, true);
    }

    /// Unmaps `id`, exposing whatever it covered.
    pub fn unmap_window(&mut self, id: WindowId) {
        self.windows.validate(id);
        let w = id.idx;
        if w == ROOT || !self.windows.mapped[w as usize] {
            return;
        }
        self.begin(OpKind::Unmap, id);
        let was_viewable = self.windows.viewable[w as usize];
        let p = self.windows.parent[w as usize];
        if was_viewable {
            validate::mark_window(&mut self.screen, &self.windows, &mut self.valdata, id);
            let next = self.windows.next_sibling[w as usize];
            self.mark(w, next);
            let parent = self.windows.id_at(p);
            validate::mark_window(&mut self.screen, &self.windows, &mut self.valdata, parent);
        }
        self.windows.mapped[w as usize] = false;
        if was_viewable {
            self.unrealize_tree(w, false);
            self.validate(p, w, VtKind::Unmap);
            self.commit(p, w, VtKind::Unmap);
        }
        self.end(OpKind::Unmap, id, was_viewable);
    }

    // -- Geometry --

    /// Moves `id` so its outer corner lands at `(x, y)` in the parent's
    /// interior, optionally restacking it. Pixels are copied rather than
    /// re-exposed wherever the window stays visible.
    pub fn move_window(&mut self, id: WindowId, x: i32, y: i32, stack: StackPosition) {
        self.windows.validate(id);
        let w = id.idx;
        if w == ROOT {
            return;
        }
        self.begin(OpKind::Move, id);
        let p = self.windows.parent[w as usize];
        let was_viewable = self.windows.viewable[w as usize];
        let (old_x, old_y) = (self.windows.abs_x[w as usize], self.windows.abs_y[w as usize]);

        let mut old_region = Region::new();
        let mut any_marked = false;
        if was_viewable {
            old_region = self.windows.border_clip[w as usize].clone();
            any_marked = self.mark(w, w).any_marked;
        }

        let geometry = &mut self.windows.geometry[w as usize];
        geometry.x = x;
        geometry.y = y;
        self.windows.update_position(w);
        self.windows.update_regions(w);
        let (new_x, new_y) = (self.windows.abs_x[w as usize], self.windows.abs_y[w as usize]);
        self.screen.position_window(&self.windows, id, new_x, new_y);

        let next = self.windows.resolve_stack(w, stack);
        let first_change = self.windows.move_in_stack(w, next);
        self.resize_children(w, new_x.saturating_sub(old_x), new_y.saturating_sub(old_y), 0, 0);

        if was_viewable {
            any_marked |= self.mark(w, first_change).any_marked;
            if any_marked {
                self.validate(p, INVALID, VtKind::Move);
                self.copy_bits(
                    w,
                    &old_region,
                    new_x.saturating_sub(old_x),
                    new_y.saturating_sub(old_y),
                );
                self.commit(p, INVALID, VtKind::Move);
            }
        }
        self.end(OpKind::Move, id, was_viewable && any_marked);
    }

    /// Moves and resizes `id`, keeping as many pixels as its bit gravity and
    /// its children's win gravities allow.
    ///
    /// Children with [`Gravity::UNMAP`] win gravity are unmapped. Every other
    /// child is repositioned by its win gravity and its visible pixels are
    /// copied along; the window's own pixels follow its bit gravity unless
    /// that is [`Gravity::Forget`].
    pub fn slide_and_resize(
        &mut self,
        id: WindowId,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        stack: StackPosition,
    ) {
        self.windows.validate(id);
        let w = id.idx;
        if w == ROOT {
            return;
        }
        self.begin(OpKind::Resize, id);
        let p = self.windows.parent[w as usize];
        let was_viewable = self.windows.viewable[w as usize];
        let old = self.windows.geometry[w as usize];
        let (old_x, old_y) = (self.windows.abs_x[w as usize], self.windows.abs_y[w as usize]);
        let bw = old.border();
        let (new_x, new_y) = (
            self.windows.abs_x[p as usize].saturating_add(x).saturating_add(bw),
            self.windows.abs_y[p as usize].saturating_add(y).saturating_add(bw),
        );

        let mut buckets: [Option<Region>; GRAVITY_COUNT] = core::array::from_fn(|_| None);
        let mut old_pool = Region::new();
        let mut old_win_clip = None;
        let mut border_visible = None;
        if was_viewable {
            old_pool = self.windows.win_size[w as usize].clone();
            self.fill_gravity_buckets(w, &mut buckets);
            self.mark(w, w);
            if self.windows.bit_gravity[w as usize] != Gravity::Forget {
                old_win_clip = Some(self.windows.clip_list[w as usize].clone());
            }
            let shrunk = old.width > width || old.height > height;
            let moved = new_x != old_x || new_y != old_y;
            if (old.width != width || old.height != height) && self.windows.has_border(w) {
                let clip = &self.windows.border_clip[w as usize];
                border_visible = Some(if shrunk || moved {
                    clip.subtract(&self.windows.win_size[w as usize])
                } else {
                    clip.clone()
                });
            }
        }

        let geometry = &mut self.windows.geometry[w as usize];
        geometry.x = x;
        geometry.y = y;
        geometry.width = width;
        geometry.height = height;
        self.windows.update_position(w);
        self.windows.update_regions(w);

        let dw = size_delta(width, old.width);
        let dh = size_delta(height, old.height);
        self.resize_children(
            w,
            new_x.saturating_sub(old_x),
            new_y.saturating_sub(old_y),
            dw,
            dh,
        );
        self.screen.position_window(&self.windows, id, new_x, new_y);

        let next = self.windows.resolve_stack(w, stack);
        let first_change = self.windows.move_in_stack(w, next);

        if !was_viewable {
            self.end(OpKind::Resize, id, false);
            return;
        }

        self.mark(w, first_change);
        let state = self.valdata.state_mut(w);
        state.before.resized = true;
        state.before.border_visible = border_visible;
        self.validate(p, first_change, VtKind::Other);
        // Everything is lost unless a gravity bucket brings it back.
        self.valdata.state_mut(w).after.exposed = self.windows.clip_list[w as usize].clone();

        let (x, y) = (new_x, new_y);
        if self.windows.has_border(w) {
            // Keep child pixels off the border: clip each bucket (old
            // coordinates) to the new interior aligned to its gravity.
            for g in Gravity::ALL {
                let Some(bucket) = &mut buckets[g.index()] else {
                    continue;
                };
                let (nx, ny) = gravity_translate(x, y, old_x, old_y, dw, dh, g);
                let interior = self.windows.win_size[w as usize]
                    .translated(old_x.saturating_sub(nx), old_y.saturating_sub(ny));
                *bucket = bucket.intersect(&interior);
            }
        }

        let bit = self.windows.bit_gravity[w as usize];
        if let Some(old_clip) = old_win_clip {
            let (nx, ny) = gravity_translate(x, y, old_x, old_y, dw, dh, bit);
            let mut kept = old_clip
                .translated(nx.saturating_sub(old_x), ny.saturating_sub(old_y))
                .intersect(&self.windows.clip_list[w as usize]);
            // Buckets copied later must not be overwritten by this one.
            for later in buckets.iter().skip(bit.index() + 1).flatten() {
                kept = kept.subtract(later);
            }
            kept.translate(old_x.saturating_sub(nx), old_y.saturating_sub(ny));
            let slot = &mut buckets[bit.index()];
            *slot = Some(match slot.take() {
                Some(bucket) => bucket.union(&kept),
                None => kept,
            });
        }

        let mut written: Option<Region> = None;
        for g in Gravity::ALL {
            let Some(mut bucket) = buckets[g.index()].take() else {
                continue;
            };
            let (nx, ny) = gravity_translate(x, y, old_x, old_y, dw, dh, g);
            let (dx, dy) = (nx.saturating_sub(old_x), ny.saturating_sub(old_y));

            bucket = bucket.intersect(&old_pool);
            if let Some(done) = &written {
                bucket = bucket.subtract(&done.translated(-dx, -dy));
            }
            self.copy_bits(w, &bucket, dx, dy);
            bucket.translate(dx, dy);
            old_pool = old_pool.subtract(&bucket);

            let mut c = self.windows.first_child[w as usize];
            while c != INVALID {
                if self.windows.win_gravity[c as usize] == g {
                    let valid = self.windows.border_clip[c as usize].intersect(&bucket);
                    recompute_exposures(&self.windows, &mut self.valdata, c, &valid);
                }
                c = self.windows.next_sibling[c as usize];
            }

            if g == bit {
                let state = self.valdata.state_mut(w);
                state.after.exposed = state.after.exposed.subtract(&bucket);
            }
            written = Some(match written {
                Some(done) => done.union(&bucket),
                None => bucket,
            });
        }

        self.commit(p, first_change, VtKind::Other);
        self.end(OpKind::Resize, id, true);
    }

    /// Moves `id` within its parent's stacking order.
    pub fn restack_window(&mut self, id: WindowId, stack: StackPosition) {
        self.windows.validate(id);
        let w = id.idx;
        if w == ROOT {
            return;
        }
        let next = self.windows.resolve_stack(w, stack);
        if next == self.windows.next_sibling[w as usize] {
            return;
        }
        self.begin(OpKind::Restack, id);
        let first_change = self.windows.move_in_stack(w, next);
        let mut any_marked = false;
        if self.windows.viewable[w as usize] {
            let overlap = self.mark(w, first_change);
            any_marked = overlap.any_marked;
            if any_marked {
                let p = self.windows.parent[overlap.layer.idx as usize];
                self.validate(p, first_change, VtKind::Stack);
                self.commit(p, first_change, VtKind::Stack);
            }
        }
        self.end(OpKind::Restack, id, any_marked);
    }

    /// Replaces the bounding shape of `id`. `shape` is relative to the
    /// window's interior origin; `None` restores the rectangular shape.
    pub fn set_shape(&mut self, id: WindowId, shape: Option<Region>) {
        self.windows.validate(id);
        let w = id.idx;
        if w == ROOT {
            return;
        }
        self.begin(OpKind::Reshape, id);
        let was_viewable = self.windows.viewable[w as usize];
        if was_viewable {
            self.mark(w, w);
            let border_visible = self.windows.has_border(w).then(|| {
                self.windows.border_clip[w as usize].subtract(&self.windows.win_size[w as usize])
            });
            let state = self.valdata.state_mut(w);
            state.before.border_visible = border_visible;
            state.before.resized = true;
        }

        self.windows.shape[w as usize] = shape;
        self.windows.update_regions(w);
        self.resize_children(w, 0, 0, 0, 0);

        if was_viewable {
            self.mark(w, w);
            let p = self.windows.parent[w as usize];
            self.validate(p, INVALID, VtKind::Other);
            self.commit(p, INVALID, VtKind::Other);
        }
        self.end(OpKind::Reshape, id, was_viewable);
    }

    /// Changes the border width of `id`, keeping its interior where it is.
    pub fn change_border_width(&mut self, id: WindowId, border_width: u32) {
        self.windows.validate(id);
        let w = id.idx;
        let old = self.windows.geometry[w as usize];
        if w == ROOT || old.border_width == border_width {
            return;
        }
        self.begin(OpKind::Reborder, id);
        let was_viewable = self.windows.viewable[w as usize];
        let had_border = old.border_width > 0;
        let growing = border_width > old.border_width;

        let mut overlap = None;
        if was_viewable && !growing {
            overlap = Some(self.mark(w, w));
        }

        let geometry = &mut self.windows.geometry[w as usize];
        geometry.border_width = border_width;
        let shift = old.border() - geometry.border();
        geometry.x = geometry.x.saturating_add(shift);
        geometry.y = geometry.y.saturating_add(shift);
        self.windows.update_position(w);
        self.windows.update_regions(w);

        if was_viewable {
            if growing {
                overlap = Some(self.mark(w, w));
                if had_border {
                    let visible = self.windows.border_clip[w as usize]
                        .subtract(&self.windows.win_size[w as usize]);
                    self.valdata.state_mut(w).before.border_visible = Some(visible);
                }
            }
            if let Some(overlap) = overlap.filter(|o| o.any_marked) {
                let layer = overlap.layer.idx;
                let p = self.windows.parent[layer as usize];
                self.validate(p, layer, VtKind::Other);
                self.commit(p, layer, VtKind::Other);
            }
        }
        self.end(OpKind::Reborder, id, was_viewable);
    }

    /// Applies a partial configure request.
    ///
    /// A border change is applied first (keeping the interior origin), then
    /// the position and size, then the stacking position. Requests that
    /// change nothing do nothing.
    ///
    /// A border-only request differs from X's `ConfigureWindow`, which keeps
    /// the outer corner fixed when `x` and `y` are omitted: here the
    /// interior stays put and the outer corner moves by the border delta.
    pub fn configure_window(&mut self, id: WindowId, changes: WindowChanges) {
        self.windows.validate(id);
        if id.idx == ROOT {
            return;
        }
        if let Some(bw) = changes.border_width {
            self.change_border_width(id, bw);
        }

        let current = self.windows.geometry[id.idx as usize];
        let x = changes.x.unwrap_or(current.x);
        let y = changes.y.unwrap_or(current.y);
        let width = changes.width.unwrap_or(current.width);
        let height = changes.height.unwrap_or(current.height);

        if width != current.width || height != current.height {
            self.slide_and_resize(id, x, y, width, height, changes.stack);
        } else if x != current.x || y != current.y {
            self.move_window(id, x, y, changes.stack);
        } else if changes.stack != StackPosition::Keep {
            self.restack_window(id, changes.stack);
        }
    }

    /// Clears a box of `id` to its background.
    ///
    /// The box is relative to the interior origin; a zero `width` or
    /// `height` extends it to the window's right or bottom edge. The result
    /// is clipped to the window's `clip_list` and either delivered as an
    /// exposure or painted directly.
    pub fn clear_to_background(
        &mut self,
        id: WindowId,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        generate_exposures: bool,
    ) {
        self.windows.validate(id);
        self.begin(OpKind::Clear, id);
        let w = id.idx as usize;
        let geometry = self.windows.geometry[w];
        let x1 = self.windows.abs_x[w].saturating_add(x);
        let y1 = self.windows.abs_y[w].saturating_add(y);
        let x2 = if width != 0 {
            x1.saturating_add_unsigned(width)
        } else {
            x1.saturating_add_unsigned(geometry.width).saturating_sub(x)
        };
        let y2 = if height != 0 {
            y1.saturating_add_unsigned(height)
        } else {
            y1.saturating_add_unsigned(geometry.height).saturating_sub(y)
        };

        let region = self.windows.clip_list[w].intersect_box(BoxRect::new(x1, y1, x2, y2));
        if generate_exposures {
            self.screen.window_exposures(&self.windows, id, &region, None);
        } else {
            self.screen
                .paint_window(&self.windows, id, &region, PaintPart::Background);
        }
        self.end(OpKind::Clear, id, false);
    }

    // -- Pipeline steps --

    fn mark(&mut self, win: u32, first: u32) -> Overlap {
        let window = self.windows.id_at(win);
        let first = (first != INVALID).then(|| self.windows.id_at(first));
        let overlap =
            self.screen
                .mark_overlapped(&mut self.windows, &mut self.valdata, window, first);
        let e = MarkEvent {
            seq: self.next_seq(),
            window,
            layer: overlap.layer,
            any_marked: overlap.any_marked,
            marked: count(self.valdata.len()),
        };
        self.tracer().mark(&e);
        overlap
    }

    fn validate(&mut self, parent: u32, first: u32, kind: VtKind) {
        let parent = self.windows.id_at(parent);
        let first = (first != INVALID).then(|| self.windows.id_at(first));
        self.screen
            .validate_tree(&mut self.windows, &mut self.valdata, parent, first, kind);
        let e = ValidateEvent {
            seq: self.next_seq(),
            parent,
            kind,
            validated: count(self.valdata.len()),
        };
        self.tracer().validate(&e);
    }

    /// Dispatches every pending exposure under `parent`.
    fn commit(&mut self, parent: u32, first: u32, kind: VtKind) {
        let parent = self.windows.id_at(parent);
        let first = (first != INVALID).then(|| self.windows.id_at(first));
        self.trace_exposures();
        self.screen
            .handle_exposures(&self.windows, &mut self.valdata, parent);
        self.screen
            .post_validate_tree(&self.windows, parent, first, kind);
    }

    /// Asks the screen to copy `source` by `(dx, dy)`, restricted to what
    /// lands inside the window's new `border_clip`.
    fn copy_bits(&mut self, w: u32, source: &Region, dx: i32, dy: i32) {
        if (dx == 0 && dy == 0) || source.is_empty() {
            return;
        }
        let source = source.intersect(&self.windows.border_clip[w as usize].translated(-dx, -dy));
        if source.is_empty() {
            return;
        }
        let window = self.windows.id_at(w);
        let e = CopyEvent {
            seq: self.next_seq(),
            window,
            dx,
            dy,
            rects: count(source.rects().len()),
            extents: source.bounding_rect(),
        };
        self.tracer().copy(&e);
        self.screen
            .copy_window(&self.windows, window, &source, dx, dy);
    }

    fn begin(&mut self, op: OpKind, window: WindowId) {
        assert!(
            self.valdata.is_empty(),
            "validation table must be empty when an operation starts"
        );
        let e = OpBeginEvent {
            seq: self.next_seq(),
            op,
            window,
        };
        self.tracer().op_begin(&e);
    }

    fn end(&mut self, op: OpKind, window: WindowId, marked: bool) {
        assert!(
            self.valdata.is_empty(),
            "validation table must be empty when an operation ends"
        );
        let e = OpEndEvent {
            seq: self.next_seq(),
            op,
            window,
            marked,
        };
        self.tracer().op_end(&e);
    }

    // -- Tree helpers --

    /// Sorts the children of `w` into per-win-gravity buckets of their
    /// `border_clip`, unmapping children with [`Gravity::UNMAP`].
    fn fill_gravity_buckets(&mut self, w: u32, buckets: &mut [Option<Region>; GRAVITY_COUNT]) {
        let mut c = self.windows.first_child[w as usize];
        while c != INVALID {
            let next = self.windows.next_sibling[c as usize];
            let g = self.windows.win_gravity[c as usize];
            if g == Gravity::UNMAP {
                self.unmap_from_configure(c);
            } else {
                let clip = &self.windows.border_clip[c as usize];
                let bucket = buckets[g.index()].get_or_insert_with(Region::new);
                debug_assert!(
                    bucket.intersect(clip).is_empty(),
                    "sibling border clips must be disjoint"
                );
                *bucket = bucket.union(clip);
            }
            c = next;
        }
    }

    /// Repositions the children of `w` after it moved by `(dx, dy)` and grew
    /// by `(dw, dh)`, then refreshes the position and size regions of every
    /// descendant.
    fn resize_children(&mut self, w: u32, dx: i32, dy: i32, dw: i32, dh: i32) {
        if dw != 0 || dh != 0 {
            let mut c = self.windows.first_child[w as usize];
            while c != INVALID {
                let g = self.windows.win_gravity[c as usize];
                if g != Gravity::UNMAP {
                    let geometry = &mut self.windows.geometry[c as usize];
                    let bw = geometry.border();
                    let (ox, oy) = (geometry.x.saturating_add(bw), geometry.y.saturating_add(bw));
                    let (nx, ny) = gravity_translate(
                        ox,
                        oy,
                        ox.saturating_sub(dx),
                        oy.saturating_sub(dy),
                        dw,
                        dh,
                        g,
                    );
                    geometry.x = nx.saturating_sub(bw);
                    geometry.y = ny.saturating_sub(bw);
                }
                c = self.windows.next_sibling[c as usize];
            }
        }

        let mut walk = PreOrder::new(w);
        while let Some(idx) = walk.next(&self.windows) {
            if idx == w {
                continue;
            }
            self.windows.update_position(idx);
            self.windows.update_regions(idx);
            let (x, y) = (self.windows.abs_x[idx as usize], self.windows.abs_y[idx as usize]);
            let id = self.windows.id_at(idx);
            self.screen.position_window(&self.windows, id, x, y);
        }
    }

    /// Makes `w` and its mapped descendants viewable.
    fn realize_tree(&mut self, w: u32) {
        let mut walk = PreOrder::new(w);
        while let Some(idx) = walk.next(&self.windows) {
            if idx != w && !self.windows.mapped[idx as usize] {
                walk.skip_children();
                continue;
            }
            self.windows.viewable[idx as usize] = true;
        }
    }

    /// Makes `w` and its viewable descendants non-viewable and drops their
    /// clips. The clips of `w` itself are kept for validation to hand back
    /// unless `from_configure` is set.
    fn unrealize_tree(&mut self, w: u32, from_configure: bool) {
        let mut walk = PreOrder::new(w);
        while let Some(idx) = walk.next(&self.windows) {
            let i = idx as usize;
            if !self.windows.viewable[i] {
                walk.skip_children();
                continue;
            }
            self.windows.viewable[i] = false;
            self.windows.visibility[i] = Visibility::NotViewable;
            if idx != w || from_configure {
                self.windows.clip_list[i].clear();
                let id = self.windows.id_at(idx);
                self.screen.clip_notify(&self.windows, id, 0, 0);
                self.windows.border_clip[i].clear();
            }
        }
    }

    /// Unmaps a child during its parent's resize. The parent's validation
    /// accounts for the freed pixels.
    fn unmap_from_configure(&mut self, c: u32) {
        if !self.windows.mapped[c as usize] {
            return;
        }
        self.windows.mapped[c as usize] = false;
        if self.windows.viewable[c as usize] {
            self.unrealize_tree(c, true);
        }
    }

    // -- Tracing --

    fn next_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    fn tracer(&mut self) -> Tracer<'_> {
        match self.sink.as_deref_mut() {
            Some(sink) => Tracer::new(sink),
            None => Tracer::none(),
        }
    }

    /// Reports every pending exposure, in slot order.
    fn trace_exposures(&mut self) {
        if !self.tracer().is_active() {
            return;
        }
        let pending: Vec<(WindowId, Region, u32)> = self
            .valdata
            .iter()
            .map(|(idx, state)| {
                (
                    self.windows.id_at(idx),
                    state.exposed().clone(),
                    count(state.border_exposed().rects().len()),
                )
            })
            .collect();
        for (window, exposed, border_rects) in pending {
            let seq = self.next_seq();
            let e = ExposeEvent {
                seq,
                window,
                exposed_rects: count(exposed.rects().len()),
                exposed_extents: exposed.bounding_rect(),
                border_rects,
            };
            let mut tracer = self.tracer();
            tracer.expose(&e);
            #[cfg(feature = "trace-rich")]
            {
                let rects: Vec<crate::trace::ExposedRect> = exposed
                    .rects()
                    .iter()
                    .map(|r| crate::trace::ExposedRect {
                        x: r.x1,
                        y: r.y1,
                        width: r.width(),
                        height: r.height(),
                    })
                    .collect();
                tracer.exposed_rects(seq, window, &rects);
            }
        }
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn size_delta(new: u32, old: u32) -> i32 {
    let d = i64::from(new) - i64::from(old);
    i32::try_from(d).unwrap_or(if d < 0 { i32::MIN } else { i32::MAX })
}
