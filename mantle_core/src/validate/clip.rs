// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip validation: recomputing `border_clip` / `clip_list` for marked
//! windows and recording what became newly visible.

use alloc::vec::Vec;

use super::{Phase, ValidationTable, VtKind};
use crate::region::Region;
use crate::screen::Screen;
use crate::window::{INVALID, PreOrder, Visibility, WindowId, WindowStore};

/// Recomputes the clips of every marked child of `parent` from `first`
/// (default: the topmost child) downwards, and of all their marked
/// descendants.
///
/// The space handed out is the parent's current `clip_list` (except for
/// [`VtKind::Stack`], where the parent's own clip cannot change) plus the
/// old `border_clip` of every marked child, viewable or not. Each marked child takes what it
/// can see of that space, and elder siblings deny their `border_size` to the
/// ones below. Marked children that are no longer viewable lose their clips
/// and their validation state.
///
/// Afterwards every surviving marked window is in
/// [`Phase::ClipValidated`](super::Phase::ClipValidated) with its exposures
/// recorded.
pub fn validate_tree<S: Screen + ?Sized>(
    screen: &mut S,
    windows: &mut WindowStore,
    valdata: &mut ValidationTable,
    parent: WindowId,
    first: Option<WindowId>,
    kind: VtKind,
) {
    windows.validate(parent);
    let p = parent.idx;
    let first = match first {
        Some(f) => {
            windows.validate(f);
            f.idx
        }
        None => windows.first_child[p as usize],
    };

    let mut total = Region::new();
    let mut c = first;
    while c != INVALID {
        if valdata.contains_at(c) {
            total = total.union(&windows.border_clip[c as usize]);
        }
        c = windows.next_sibling[c as usize];
    }
    if kind != VtKind::Stack {
        total = total.union(&windows.clip_list[p as usize]);
    }

    let mut c = first;
    while c != INVALID {
        let next = windows.next_sibling[c as usize];
        if windows.viewable[c as usize] {
            if valdata.contains_at(c) {
                let universe = total.intersect(&windows.border_size[c as usize]);
                compute_clips(screen, windows, valdata, c, universe, kind);
                total = total.subtract(&windows.border_size[c as usize]);
            }
        } else if valdata.contains_at(c) {
            windows.clip_list[c as usize].clear();
            screen.clip_notify(windows, windows.id_at(c), 0, 0);
            windows.border_clip[c as usize].clear();
            valdata.remove_at(c);
        }
        c = next;
    }

    let clip = &mut windows.clip_list[p as usize];
    let state = valdata.state_mut(p);
    state.after.border_exposed.clear();
    match kind {
        VtKind::Stack => state.after.exposed.clear(),
        VtKind::Map => {
            state.after.exposed.clear();
            *clip = total;
        }
        _ => {
            state.after.exposed = total.subtract(clip);
            *clip = total;
        }
    }
    state.phase = Phase::ClipValidated;
    screen.clip_notify(windows, parent, 0, 0);
}

/// One window being clipped, with the part of its universe not yet handed
/// to children.
#[derive(Debug)]
struct ClipFrame {
    win: u32,
    universe: Region,
    cursor: u32,
    old_vis: Visibility,
    new_vis: Visibility,
    dx: i32,
    dy: i32,
}

/// Clips `win` to `universe` and recurses into its marked descendants.
///
/// Uses an explicit frame stack so deep trees cannot exhaust the call stack.
fn compute_clips<S: Screen + ?Sized>(
    screen: &mut S,
    windows: &mut WindowStore,
    valdata: &mut ValidationTable,
    win: u32,
    universe: Region,
    kind: VtKind,
) {
    let mut stack: Vec<ClipFrame> = Vec::new();
    if let Some(frame) = enter(screen, windows, valdata, win, universe, kind) {
        stack.push(frame);
    }

    while let Some(top) = stack.last_mut() {
        let mut c = top.cursor;
        while c != INVALID && !windows.viewable[c as usize] {
            c = windows.next_sibling[c as usize];
        }
        if c == INVALID {
            if let Some(frame) = stack.pop() {
                finish(screen, windows, valdata, frame);
            }
            continue;
        }
        top.cursor = windows.next_sibling[c as usize];

        let border_size = &windows.border_size[c as usize];
        let child_universe = valdata
            .contains_at(c)
            .then(|| top.universe.intersect(border_size));
        top.universe = top.universe.subtract(border_size);

        if let Some(universe) = child_universe
            && let Some(frame) = enter(screen, windows, valdata, c, universe, kind)
        {
            stack.push(frame);
        }
    }
}

/// Visibility of `win` given the pixels it may occupy.
fn classify(windows: &WindowStore, win: u32, universe: &Region) -> Visibility {
    let full = windows.unclipped_border_region(win);
    let seen = universe.intersect(&full);
    if seen.is_empty() {
        Visibility::FullyObscured
    } else if seen == full {
        Visibility::Unobscured
    } else {
        Visibility::PartiallyObscured
    }
}

/// Updates visibility, assigns `border_clip` and border exposure, and
/// prepares the frame for visiting children. Returns `None` when the move
/// fast path handled the whole subtree.
fn enter<S: Screen + ?Sized>(
    screen: &mut S,
    windows: &mut WindowStore,
    valdata: &mut ValidationTable,
    win: u32,
    mut universe: Region,
    kind: VtKind,
) -> Option<ClipFrame> {
    let w = win as usize;
    let old_vis = windows.visibility[w];
    let new_vis = classify(windows, win, &universe);
    windows.visibility[w] = new_vis;
    if old_vis != new_vis {
        screen.visibility_notify(windows, windows.id_at(win), new_vis);
    }

    let state = valdata.state_mut(win);
    let dx = windows.abs_x[w].saturating_sub(state.before.old_abs.0);
    let dy = windows.abs_y[w].saturating_sub(state.before.old_abs.1);
    let resized = state.before.resized;

    match kind {
        VtKind::Map | VtKind::Unmap | VtKind::Stack => {}
        VtKind::Move
            if !resized
                && old_vis == new_vis
                && matches!(old_vis, Visibility::Unobscured | Visibility::FullyObscured) =>
        {
            slide_subtree(screen, windows, valdata, win, dx, dy);
            return None;
        }
        VtKind::Move | VtKind::Other => {
            windows.border_clip[w].translate(dx, dy);
            windows.clip_list[w].translate(dx, dy);
        }
    }

    let state = valdata.state_mut(win);
    let border_visible = state.before.border_visible.take();
    state.after.exposed.clear();
    if windows.has_border(win) {
        let seen_before = border_visible.as_ref().unwrap_or(&windows.border_clip[w]);
        let newly = universe.subtract(seen_before);
        state.after.border_exposed = newly.subtract(&windows.win_size[w]);
        windows.border_clip[w] = universe.clone();
        universe = universe.intersect(&windows.win_size[w]);
    } else {
        state.after.border_exposed.clear();
        windows.border_clip[w] = universe.clone();
    }

    let cursor = if windows.mapped[w] {
        windows.first_child[w]
    } else {
        INVALID
    };
    Some(ClipFrame {
        win,
        universe,
        cursor,
        old_vis,
        new_vis,
        dx,
        dy,
    })
}

/// Assigns the window's new `clip_list` once every child took its share.
fn finish<S: Screen + ?Sized>(
    screen: &mut S,
    windows: &mut WindowStore,
    valdata: &mut ValidationTable,
    frame: ClipFrame,
) {
    let w = frame.win as usize;
    let state = valdata.state_mut(frame.win);
    match (frame.old_vis, frame.new_vis) {
        (Visibility::FullyObscured | Visibility::NotViewable, _) => {
            state.after.exposed = frame.universe.clone();
        }
        (_, Visibility::Unobscured | Visibility::PartiallyObscured) => {
            state.after.exposed = frame.universe.subtract(&windows.clip_list[w]);
        }
        _ => {}
    }
    state.phase = Phase::ClipValidated;
    windows.clip_list[w] = frame.universe;
    screen.clip_notify(windows, windows.id_at(frame.win), frame.dx, frame.dy);
}

/// Move fast path: nothing about the subtree's visibility changed, so every
/// clip simply travels with the window and nothing is exposed.
fn slide_subtree<S: Screen + ?Sized>(
    screen: &mut S,
    windows: &mut WindowStore,
    valdata: &mut ValidationTable,
    win: u32,
    dx: i32,
    dy: i32,
) {
    let mut walk = PreOrder::new(win);
    while let Some(idx) = walk.next(windows) {
        let i = idx as usize;
        if !windows.viewable[i] {
            walk.skip_children();
            continue;
        }
        if windows.visibility[i] != Visibility::FullyObscured {
            windows.border_clip[i].translate(dx, dy);
            windows.clip_list[i].translate(dx, dy);
            screen.clip_notify(windows, windows.id_at(idx), dx, dy);
        }
        if let Some(state) = valdata.get_mut_at(idx) {
            state.after.exposed.clear();
            state.after.border_exposed.clear();
            state.before.border_visible = None;
            state.phase = Phase::ClipValidated;
        }
    }
}

/// Recomputes exposures in the subtree of `child` after gravity migration
/// copied the pixels in `valid` into place.
///
/// Every marked window in the subtree now needs only its visible pixels
/// outside `valid` repainted.
pub(crate) fn recompute_exposures(
    windows: &WindowStore,
    valdata: &mut ValidationTable,
    child: u32,
    valid: &Region,
) {
    let mut walk = PreOrder::new(child);
    while let Some(idx) = walk.next(windows) {
        let i = idx as usize;
        let Some(state) = valdata.get_mut_at(idx) else {
            continue;
        };
        state.after.exposed = windows.clip_list[i].subtract(valid);
        state.after.border_exposed = windows.border_clip[i]
            .subtract(&windows.win_size[i])
            .subtract(valid);
        state.phase = Phase::Migrated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::BoxRect;
    use crate::testing::{RecordingScreen, realized};
    use crate::validate::mark_overlapped;
    use crate::window::Geometry;

    fn boxed(x1: i32, y1: i32, x2: i32, y2: i32) -> Region {
        Region::from_box(BoxRect::new(x1, y1, x2, y2))
    }

    /// Builds a root with two overlapping children and validates them as if
    /// both had just been mapped.
    fn overlapping_pair() -> (WindowStore, WindowId, WindowId) {
        let mut windows = WindowStore::new(100, 100);
        let root = windows.root();
        let lower = realized(&mut windows, root, Geometry::new(20, 20, 40, 40, 0));
        let upper = realized(&mut windows, root, Geometry::new(0, 0, 40, 40, 0));

        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        mark_overlapped(&mut screen, &mut windows, &mut valdata, lower, Some(lower));
        mark_overlapped(&mut screen, &mut windows, &mut valdata, upper, Some(upper));
        validate_tree(&mut screen, &mut windows, &mut valdata, root, None, VtKind::Map);
        (windows, upper, lower)
    }

    #[test]
    fn elder_sibling_occludes_younger() {
        let (windows, upper, lower) = overlapping_pair();
        let root = windows.root();
        assert_eq!(windows.clip_list(upper), &boxed(0, 0, 40, 40));
        assert_eq!(
            windows.clip_list(lower),
            &boxed(20, 20, 60, 60).subtract(&boxed(0, 0, 40, 40))
        );
        assert_eq!(windows.visibility(upper), Visibility::Unobscured);
        assert_eq!(windows.visibility(lower), Visibility::PartiallyObscured);
        assert_eq!(
            windows.clip_list(root),
            &boxed(0, 0, 100, 100)
                .subtract(&boxed(0, 0, 40, 40))
                .subtract(&boxed(20, 20, 60, 60))
        );
    }

    #[test]
    fn newly_viewable_window_is_fully_exposed() {
        let mut windows = WindowStore::new(100, 100);
        let root = windows.root();
        let w = realized(&mut windows, root, Geometry::new(10, 10, 30, 30, 0));

        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        mark_overlapped(&mut screen, &mut windows, &mut valdata, w, Some(w));
        validate_tree(&mut screen, &mut windows, &mut valdata, root, None, VtKind::Map);

        let state = valdata.get(w).map(|s| (s.exposed().clone(), s.phase()));
        assert_eq!(state, Some((boxed(10, 10, 40, 40), Phase::ClipValidated)));
        assert!(valdata.get(root).is_some_and(|s| s.exposed().is_empty()));
    }

    #[test]
    fn revalidation_exposes_nothing() {
        let (mut windows, upper, lower) = overlapping_pair();
        let root = windows.root();
        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        mark_overlapped(&mut screen, &mut windows, &mut valdata, lower, Some(lower));
        validate_tree(&mut screen, &mut windows, &mut valdata, root, None, VtKind::Other);

        for id in [root, upper, lower] {
            if let Some(state) = valdata.get(id) {
                assert!(state.exposed().is_empty(), "{id:?} re-exposed");
                assert!(state.border_exposed().is_empty());
            }
        }
    }

    #[test]
    fn border_is_exposed_outside_interior() {
        let mut windows = WindowStore::new(100, 100);
        let root = windows.root();
        let w = realized(&mut windows, root, Geometry::new(10, 10, 20, 20, 2));

        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        mark_overlapped(&mut screen, &mut windows, &mut valdata, w, Some(w));
        validate_tree(&mut screen, &mut windows, &mut valdata, root, None, VtKind::Map);

        assert_eq!(windows.border_clip(w), &boxed(10, 10, 34, 34));
        assert_eq!(windows.clip_list(w), &boxed(12, 12, 32, 32));
        let border = valdata.get(w).map(|s| s.border_exposed().clone());
        assert_eq!(
            border,
            Some(boxed(10, 10, 34, 34).subtract(&boxed(12, 12, 32, 32)))
        );
    }

    #[test]
    fn unmapped_marked_child_loses_clips() {
        let (mut windows, upper, lower) = overlapping_pair();
        let root = windows.root();
        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        mark_overlapped(&mut screen, &mut windows, &mut valdata, upper, Some(upper));
        windows.mapped[upper.idx as usize] = false;
        windows.viewable[upper.idx as usize] = false;
        validate_tree(&mut screen, &mut windows, &mut valdata, root, None, VtKind::Unmap);

        assert!(windows.clip_list(upper).is_empty());
        assert!(windows.border_clip(upper).is_empty());
        assert!(!valdata.is_marked(upper));
        // The lower sibling takes back the pixels it had lost.
        assert_eq!(windows.clip_list(lower), &boxed(20, 20, 60, 60));
    }

    #[test]
    fn recompute_subtracts_valid_pixels() {
        let mut windows = WindowStore::new(100, 100);
        let root = windows.root();
        let w = realized(&mut windows, root, Geometry::new(0, 0, 50, 50, 0));

        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        mark_overlapped(&mut screen, &mut windows, &mut valdata, w, Some(w));
        validate_tree(&mut screen, &mut windows, &mut valdata, root, None, VtKind::Map);

        recompute_exposures(&windows, &mut valdata, w.idx, &boxed(0, 0, 50, 25));
        let state = valdata.get(w).map(|s| (s.exposed().clone(), s.phase()));
        assert_eq!(state, Some((boxed(0, 25, 50, 50), Phase::Migrated)));
    }
}
