// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays window storage with allocation, stacking, and region
//! bookkeeping.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::gravity::Gravity;
use super::id::{INVALID, WindowId};
use super::traverse::Children;
use crate::dirty;
use crate::region::{BoxRect, Region};

/// Slot index of the root window.
pub(crate) const ROOT: u32 = 0;

/// Size and placement of a window.
///
/// `x` and `y` locate the outer (border) corner relative to the parent's
/// interior origin, so the window's own interior starts at
/// `(x + border_width, y + border_width)` in parent coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Geometry {
    /// Outer left edge relative to the parent's interior.
    pub x: i32,
    /// Outer top edge relative to the parent's interior.
    pub y: i32,
    /// Interior width.
    pub width: u32,
    /// Interior height.
    pub height: u32,
    /// Border width on every side.
    pub border_width: u32,
}

impl Geometry {
    /// Creates a geometry record.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32, border_width: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            border_width,
        }
    }

    /// Border width as a signed offset.
    #[inline]
    #[must_use]
    pub fn border(&self) -> i32 {
        i32::try_from(self.border_width).unwrap_or(i32::MAX)
    }
}

/// How much of a window can be seen, as last computed by clip validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Every pixel of the window (border included) is visible.
    Unobscured,
    /// Part of the window is visible.
    PartiallyObscured,
    /// The window is viewable but nothing of it can be seen.
    FullyObscured,
    /// The window or an ancestor is unmapped.
    #[default]
    NotViewable,
}

/// Where to put a window in its parent's stacking order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackPosition {
    /// Leave the stacking order alone.
    #[default]
    Keep,
    /// Above every sibling.
    Top,
    /// Below every sibling.
    Bottom,
    /// Directly above the given sibling.
    Above(WindowId),
    /// Directly below the given sibling.
    Below(WindowId),
}

/// Struct-of-arrays storage for all windows of one screen.
///
/// Windows are addressed by [`WindowId`] handles. Slot 0 always holds the
/// root, which covers the whole screen and is always mapped. Destroyed
/// windows are recycled via a free list, and generation counters prevent
/// stale handle access.
///
/// Children are kept in stacking order: the first child is the topmost and
/// occludes every later sibling.
#[derive(Debug)]
pub struct WindowStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Attributes (set by callers) --
    pub(crate) geometry: Vec<Geometry>,
    pub(crate) bit_gravity: Vec<Gravity>,
    pub(crate) win_gravity: Vec<Gravity>,
    pub(crate) shape: Vec<Option<Region>>,
    pub(crate) mapped: Vec<bool>,

    // -- Derived state (written by restructuring) --
    pub(crate) abs_x: Vec<i32>,
    pub(crate) abs_y: Vec<i32>,
    pub(crate) viewable: Vec<bool>,
    pub(crate) visibility: Vec<Visibility>,
    pub(crate) win_size: Vec<Region>,
    pub(crate) border_size: Vec<Region>,
    pub(crate) clip_list: Vec<Region>,
    pub(crate) border_clip: Vec<Region>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    screen: BoxRect,
}

impl WindowStore {
    /// Creates a store holding only the root window of a `width` × `height`
    /// screen.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let screen = BoxRect::from_origin_size(0, 0, width, height);
        let full = Region::from_box(screen);
        let mut store = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            last_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            geometry: Vec::new(),
            bit_gravity: Vec::new(),
            win_gravity: Vec::new(),
            shape: Vec::new(),
            mapped: Vec::new(),
            abs_x: Vec::new(),
            abs_y: Vec::new(),
            viewable: Vec::new(),
            visibility: Vec::new(),
            win_size: Vec::new(),
            border_size: Vec::new(),
            clip_list: Vec::new(),
            border_clip: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            screen,
        };
        let root = store.alloc_slot(Geometry::new(0, 0, width, height, 0));
        debug_assert_eq!(root, ROOT, "root must occupy slot 0");
        store.mapped[ROOT as usize] = true;
        store.viewable[ROOT as usize] = true;
        store.visibility[ROOT as usize] = Visibility::Unobscured;
        store.win_size[ROOT as usize] = full.clone();
        store.border_size[ROOT as usize] = full.clone();
        store.clip_list[ROOT as usize] = full.clone();
        store.border_clip[ROOT as usize] = full;
        store
    }

    /// Returns the root window.
    #[must_use]
    pub fn root(&self) -> WindowId {
        self.id_at(ROOT)
    }

    /// Returns the screen rectangle covered by the root.
    #[must_use]
    pub fn screen_bounds(&self) -> BoxRect {
        self.screen
    }

    // -- Allocation API --

    /// Creates an unmapped window as the topmost child of `parent`.
    ///
    /// The new window's regions stay broken until it is first mapped or
    /// [`repair_regions`](Self::repair_regions) runs.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub fn create_window(&mut self, parent: WindowId, geometry: Geometry) -> WindowId {
        self.validate(parent);
        let p = parent.idx;
        let idx = self.alloc_slot(geometry);
        let first = self.first_child[p as usize];
        self.attach_before(idx, p, first);
        self.update_position(idx);

        let _ = self.dirty.add_dependency(idx, p, dirty::SHAPE);
        self.dirty.mark_with(idx, dirty::SHAPE, &EagerPolicy);

        self.id_at(idx)
    }

    /// Destroys an unmapped, childless window, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, if the window is the root, is mapped,
    /// or still has children.
    pub fn destroy_window(&mut self, id: WindowId) {
        self.validate(id);
        let idx = id.idx;
        assert!(idx != ROOT, "cannot destroy the root window");
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy window with children"
        );
        assert!(
            !self.mapped[idx as usize],
            "cannot destroy a mapped window"
        );

        let p = self.parent[idx as usize];
        self.detach(idx);
        self.dirty.remove_dependency(idx, p, dirty::SHAPE);
        self.dirty.remove_key(idx);

        self.win_size[idx as usize].clear();
        self.border_size[idx as usize].clear();
        self.clip_list[idx as usize].clear();
        self.border_clip[idx as usize].clear();
        self.shape[idx as usize] = None;

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live window.
    #[must_use]
    pub fn is_alive(&self, id: WindowId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology queries --

    /// Returns the parent of a window (`None` for the root).
    #[must_use]
    pub fn parent(&self, id: WindowId) -> Option<WindowId> {
        self.validate(id);
        self.opt_id(self.parent[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a window, topmost
    /// first.
    #[must_use]
    pub fn children(&self, id: WindowId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the sibling directly below `id`.
    #[must_use]
    pub fn next_sibling(&self, id: WindowId) -> Option<WindowId> {
        self.validate(id);
        self.opt_id(self.next_sibling[id.idx as usize])
    }

    /// Returns the sibling directly above `id`.
    #[must_use]
    pub fn prev_sibling(&self, id: WindowId) -> Option<WindowId> {
        self.validate(id);
        self.opt_id(self.prev_sibling[id.idx as usize])
    }

    // -- Attribute getters --

    /// Returns the geometry of a window.
    #[must_use]
    pub fn geometry(&self, id: WindowId) -> Geometry {
        self.validate(id);
        self.geometry[id.idx as usize]
    }

    /// Returns the absolute screen position of the window's interior origin.
    #[must_use]
    pub fn abs_origin(&self, id: WindowId) -> (i32, i32) {
        self.validate(id);
        (self.abs_x[id.idx as usize], self.abs_y[id.idx as usize])
    }

    /// Returns the bit gravity of a window.
    #[must_use]
    pub fn bit_gravity(&self, id: WindowId) -> Gravity {
        self.validate(id);
        self.bit_gravity[id.idx as usize]
    }

    /// Returns the win gravity of a window.
    #[must_use]
    pub fn win_gravity(&self, id: WindowId) -> Gravity {
        self.validate(id);
        self.win_gravity[id.idx as usize]
    }

    /// Returns the bounding shape, relative to the interior origin.
    #[must_use]
    pub fn shape(&self, id: WindowId) -> Option<&Region> {
        self.validate(id);
        self.shape[id.idx as usize].as_ref()
    }

    /// Returns whether the window itself is mapped.
    #[must_use]
    pub fn is_mapped(&self, id: WindowId) -> bool {
        self.validate(id);
        self.mapped[id.idx as usize]
    }

    /// Returns whether the window and all its ancestors are mapped.
    #[must_use]
    pub fn is_viewable(&self, id: WindowId) -> bool {
        self.validate(id);
        self.viewable[id.idx as usize]
    }

    /// Returns the visibility computed by the last validation.
    #[must_use]
    pub fn visibility(&self, id: WindowId) -> Visibility {
        self.validate(id);
        self.visibility[id.idx as usize]
    }

    // -- Region getters --

    /// Interior box clipped by the parent's interior and the shape.
    ///
    /// May be stale for windows that are not viewable until the next
    /// [`repair_regions`](Self::repair_regions).
    #[must_use]
    pub fn win_size(&self, id: WindowId) -> &Region {
        self.validate(id);
        &self.win_size[id.idx as usize]
    }

    /// Outer box (interior plus border) clipped like [`win_size`](Self::win_size).
    #[must_use]
    pub fn border_size(&self, id: WindowId) -> &Region {
        self.validate(id);
        &self.border_size[id.idx as usize]
    }

    /// Visible interior pixels, excluding viewable children.
    #[must_use]
    pub fn clip_list(&self, id: WindowId) -> &Region {
        self.validate(id);
        &self.clip_list[id.idx as usize]
    }

    /// Visible pixels of the window including its border and children.
    #[must_use]
    pub fn border_clip(&self, id: WindowId) -> &Region {
        self.validate(id);
        &self.border_clip[id.idx as usize]
    }

    // -- Attribute setters --

    /// Sets the bit gravity used the next time the window is resized.
    pub fn set_bit_gravity(&mut self, id: WindowId, gravity: Gravity) {
        self.validate(id);
        self.bit_gravity[id.idx as usize] = gravity;
    }

    /// Sets the win gravity used the next time the parent is resized.
    pub fn set_win_gravity(&mut self, id: WindowId, gravity: Gravity) {
        self.validate(id);
        self.win_gravity[id.idx as usize] = gravity;
    }

    /// Recomputes every broken `win_size` / `border_size`, parents first.
    pub fn repair_regions(&mut self) {
        let broken: Vec<u32> = self
            .dirty
            .drain(dirty::SHAPE)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in broken {
            if idx < self.len && !self.free_list.contains(&idx) {
                self.set_win_size(idx);
                self.set_border_size(idx);
            }
        }
    }

    // -- Crate-internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: WindowId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale WindowId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn id_at(&self, idx: u32) -> WindowId {
        WindowId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn opt_id(&self, idx: u32) -> Option<WindowId> {
        if idx == INVALID {
            None
        } else {
            Some(self.id_at(idx))
        }
    }

    pub(crate) fn has_border(&self, idx: u32) -> bool {
        self.geometry[idx as usize].border_width > 0
    }

    /// Unclipped interior box in screen coordinates.
    pub(crate) fn interior_box(&self, idx: u32) -> BoxRect {
        let g = self.geometry[idx as usize];
        BoxRect::from_origin_size(self.abs_x[idx as usize], self.abs_y[idx as usize], g.width, g.height)
    }

    /// Unclipped outer box (interior plus border) in screen coordinates.
    pub(crate) fn outer_box(&self, idx: u32) -> BoxRect {
        let g = self.geometry[idx as usize];
        let bw = g.border();
        let twice = g.border_width.saturating_mul(2);
        BoxRect::from_origin_size(
            self.abs_x[idx as usize].saturating_sub(bw),
            self.abs_y[idx as usize].saturating_sub(bw),
            g.width.saturating_add(twice),
            g.height.saturating_add(twice),
        )
    }

    /// Outer box intersected with the bounding shape, ignoring the parent.
    pub(crate) fn unclipped_border_region(&self, idx: u32) -> Region {
        self.apply_shape(idx, Region::from_box(self.outer_box(idx)))
    }

    fn apply_shape(&self, idx: u32, region: Region) -> Region {
        match &self.shape[idx as usize] {
            Some(shape) => {
                region.intersect(&shape.translated(self.abs_x[idx as usize], self.abs_y[idx as usize]))
            }
            None => region,
        }
    }

    /// `b` clipped to the parent's `win_size`.
    fn clipped_by_parent(&self, parent: u32, b: BoxRect) -> Region {
        let parent_size = &self.win_size[parent as usize];
        let clipped = b.intersect(&parent_size.extents());
        if clipped.is_empty() {
            return Region::new();
        }
        parent_size.intersect_box(clipped)
    }

    pub(crate) fn set_win_size(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let region = if p == INVALID {
            Region::from_box(self.screen)
        } else {
            let clipped = self.clipped_by_parent(p, self.interior_box(idx));
            self.apply_shape(idx, clipped)
        };
        self.win_size[idx as usize] = region;
    }

    pub(crate) fn set_border_size(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let region = if p == INVALID || !self.has_border(idx) {
            self.win_size[idx as usize].clone()
        } else {
            let clipped = self.clipped_by_parent(p, self.outer_box(idx));
            self.apply_shape(idx, clipped)
        };
        self.border_size[idx as usize] = region;
    }

    /// Recomputes both size regions now if the window is viewable, otherwise
    /// marks them broken.
    pub(crate) fn update_regions(&mut self, idx: u32) {
        if self.viewable[idx as usize] {
            self.set_win_size(idx);
            self.set_border_size(idx);
        } else {
            self.dirty.mark_with(idx, dirty::SHAPE, &EagerPolicy);
        }
    }

    /// Recomputes the absolute interior origin from the parent's, saturating
    /// at the `i32` range.
    pub(crate) fn update_position(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p == INVALID {
            return;
        }
        let g = self.geometry[idx as usize];
        let bw = g.border();
        self.abs_x[idx as usize] = self.abs_x[p as usize].saturating_add(g.x).saturating_add(bw);
        self.abs_y[idx as usize] = self.abs_y[p as usize].saturating_add(g.y).saturating_add(bw);
    }

    /// Translates a stacking request into the sibling `idx` should end up
    /// directly above (`INVALID` for the bottom).
    ///
    /// # Panics
    ///
    /// Panics if the reference sibling is stale, is `idx` itself, or has a
    /// different parent.
    pub(crate) fn resolve_stack(&self, idx: u32, position: StackPosition) -> u32 {
        let p = self.parent[idx as usize];
        match position {
            StackPosition::Keep => self.next_sibling[idx as usize],
            StackPosition::Bottom => INVALID,
            StackPosition::Top => {
                let first = self.first_child[p as usize];
                if first == idx {
                    self.next_sibling[idx as usize]
                } else {
                    first
                }
            }
            StackPosition::Above(sibling) => {
                self.check_sibling(idx, sibling);
                sibling.idx
            }
            StackPosition::Below(sibling) => {
                self.check_sibling(idx, sibling);
                let next = self.next_sibling[sibling.idx as usize];
                if next == idx {
                    self.next_sibling[idx as usize]
                } else {
                    next
                }
            }
        }
    }

    fn check_sibling(&self, idx: u32, sibling: WindowId) {
        self.validate(sibling);
        assert!(
            sibling.idx != idx && self.parent[sibling.idx as usize] == self.parent[idx as usize],
            "stacking reference must be a distinct sibling"
        );
    }

    /// Moves `idx` directly above `next` (to the bottom when `INVALID`).
    ///
    /// Returns the topmost window whose stacking position changed: `idx` when
    /// it moved up or stayed put, its old lower neighbour when it moved down.
    pub(crate) fn move_in_stack(&mut self, idx: u32, next: u32) -> u32 {
        let old_next = self.next_sibling[idx as usize];
        if old_next == next {
            return idx;
        }
        let p = self.parent[idx as usize];
        let old_pos = self.stack_position(idx);
        self.detach(idx);
        self.attach_before(idx, p, next);
        if self.stack_position(idx) < old_pos {
            idx
        } else {
            old_next
        }
    }

    fn stack_position(&self, idx: u32) -> usize {
        let mut pos = 0;
        let mut s = self.prev_sibling[idx as usize];
        while s != INVALID {
            pos += 1;
            s = self.prev_sibling[s as usize];
        }
        pos
    }

    /// Links `idx` into `parent`'s child list directly above `next`
    /// (at the bottom when `next` is `INVALID`).
    fn attach_before(&mut self, idx: u32, parent: u32, next: u32) {
        let prev = if next == INVALID {
            self.last_child[parent as usize]
        } else {
            self.prev_sibling[next as usize]
        };
        self.parent[idx as usize] = parent;
        self.next_sibling[idx as usize] = next;
        self.prev_sibling[idx as usize] = prev;
        if prev == INVALID {
            self.first_child[parent as usize] = idx;
        } else {
            self.next_sibling[prev as usize] = idx;
        }
        if next == INVALID {
            self.last_child[parent as usize] = idx;
        } else {
            self.prev_sibling[next as usize] = idx;
        }
    }

    /// Removes `idx` from its parent's child list.
    fn detach(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        } else {
            self.last_child[p as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn alloc_slot(&mut self, geometry: Geometry) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; the generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.last_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.geometry[i] = geometry;
            self.bit_gravity[i] = Gravity::Forget;
            self.win_gravity[i] = Gravity::NorthWest;
            self.shape[i] = None;
            self.mapped[i] = false;
            self.abs_x[i] = 0;
            self.abs_y[i] = 0;
            self.viewable[i] = false;
            self.visibility[i] = Visibility::NotViewable;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.last_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.geometry.push(geometry);
            self.bit_gravity.push(Gravity::Forget);
            self.win_gravity.push(Gravity::NorthWest);
            self.shape.push(None);
            self.mapped.push(false);
            self.abs_x.push(0);
            self.abs_y.push(0);
            self.viewable.push(false);
            self.visibility.push(Visibility::NotViewable);
            self.win_size.push(Region::new());
            self.border_size.push(Region::new());
            self.clip_list.push(Region::new());
            self.border_clip.push(Region::new());
            self.generation.push(0);
            idx
        }
    }
}
