// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap marking: deciding which windows an operation can affect.

use super::ValidationTable;
use crate::region::RectIn;
use crate::screen::Screen;
use crate::window::{INVALID, PreOrder, WindowId, WindowStore};

/// Result of [`mark_overlapped`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Overlap {
    /// Whether any window was marked.
    pub any_marked: bool,
    /// The window whose parent must be validated. With a single stacking
    /// layer this is always the window passed in.
    pub layer: WindowId,
}

/// Attaches validation state to `id` unless it already has some.
pub fn mark_window<S: Screen + ?Sized>(
    screen: &mut S,
    windows: &WindowStore,
    valdata: &mut ValidationTable,
    id: WindowId,
) {
    let idx = id.idx;
    let old_abs = (windows.abs_x[idx as usize], windows.abs_y[idx as usize]);
    if valdata.mark_at(idx, old_abs) {
        screen.mark_window(windows, id);
    }
}

/// Marks every window whose pixels a change to `win` may affect.
///
/// Broken regions are repaired first. When `first == Some(win)` the whole
/// viewable subtree of `win` is marked and the scan continues with the next
/// sibling. From `first` through the last sibling, each viewable window whose
/// `border_size` touches the bounding box of `win`'s `border_size` is marked
/// and its children are scanned the same way. If anything was marked, the
/// parent of `win` is marked too.
pub fn mark_overlapped<S: Screen + ?Sized>(
    screen: &mut S,
    windows: &mut WindowStore,
    valdata: &mut ValidationTable,
    win: WindowId,
    first: Option<WindowId>,
) -> Overlap {
    windows.validate(win);
    windows.repair_regions();

    let w = win.idx;
    let mut any_marked = false;
    let mut first = match first {
        Some(f) => {
            windows.validate(f);
            f.idx
        }
        None => INVALID,
    };

    if first == w {
        let mut walk = PreOrder::new(w);
        while let Some(idx) = walk.next(windows) {
            if !windows.viewable[idx as usize] {
                walk.skip_children();
                continue;
            }
            mark_window(screen, windows, valdata, windows.id_at(idx));
        }
        any_marked = true;
        first = windows.next_sibling[w as usize];
    }

    if first != INVALID {
        let bounds = windows.border_size[w as usize].extents();
        let mut walk = PreOrder::from_sibling(windows, first);
        while let Some(idx) = walk.next(windows) {
            let touches = windows.viewable[idx as usize]
                && windows.border_size[idx as usize].rect_in(bounds) != RectIn::Out;
            if touches {
                mark_window(screen, windows, valdata, windows.id_at(idx));
                any_marked = true;
            } else {
                walk.skip_children();
            }
        }
    }

    let p = windows.parent[w as usize];
    if any_marked && p != INVALID {
        mark_window(screen, windows, valdata, windows.id_at(p));
    }

    Overlap {
        any_marked,
        layer: win,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingScreen, realized};
    use crate::window::Geometry;

    #[test]
    fn marks_subtree_intersecting_siblings_and_parent() {
        let mut windows = WindowStore::new(200, 200);
        let root = windows.root();
        let far = realized(&mut windows, root, Geometry::new(150, 150, 20, 20, 0));
        let below = realized(&mut windows, root, Geometry::new(40, 40, 50, 50, 0));
        let top = realized(&mut windows, root, Geometry::new(0, 0, 60, 60, 0));
        let inner = realized(&mut windows, top, Geometry::new(5, 5, 10, 10, 0));
        let below_child = realized(&mut windows, below, Geometry::new(30, 30, 10, 10, 0));

        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        let overlap = mark_overlapped(&mut screen, &mut windows, &mut valdata, top, Some(top));

        assert!(overlap.any_marked);
        assert_eq!(overlap.layer, top);
        assert!(valdata.is_marked(top));
        assert!(valdata.is_marked(inner));
        assert!(valdata.is_marked(below));
        // Marked sibling's children are scanned against the same box.
        assert!(!valdata.is_marked(below_child));
        assert!(!valdata.is_marked(far));
        assert!(valdata.is_marked(root));
        assert_eq!(valdata.len(), 4);
    }

    #[test]
    fn non_viewable_windows_are_skipped() {
        let mut windows = WindowStore::new(200, 200);
        let root = windows.root();
        let hidden = windows.create_window(root, Geometry::new(0, 0, 50, 50, 0));
        let top = realized(&mut windows, root, Geometry::new(0, 0, 50, 50, 0));

        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        mark_overlapped(&mut screen, &mut windows, &mut valdata, top, Some(top));
        assert!(!valdata.is_marked(hidden));
    }

    #[test]
    fn nothing_below_marks_nothing() {
        let mut windows = WindowStore::new(200, 200);
        let root = windows.root();
        let only = realized(&mut windows, root, Geometry::new(0, 0, 50, 50, 0));

        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        let overlap = mark_overlapped(&mut screen, &mut windows, &mut valdata, only, None);
        assert!(!overlap.any_marked);
        assert!(valdata.is_empty());
    }

    #[test]
    fn remarking_keeps_old_corner() {
        let mut windows = WindowStore::new(200, 200);
        let root = windows.root();
        let w = realized(&mut windows, root, Geometry::new(10, 10, 50, 50, 0));

        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        mark_window(&mut screen, &windows, &mut valdata, w);
        windows.abs_x[w.idx as usize] = 99;
        mark_window(&mut screen, &windows, &mut valdata, w);
        assert_eq!(valdata.get(w).map(|s| s.old_abs_origin()), Some((10, 10)));
    }
}
