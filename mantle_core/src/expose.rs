// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exposure dispatch: the last step of every restructuring operation.

use crate::screen::{PaintPart, Screen};
use crate::validate::{Phase, ValidationTable};
use crate::window::{PreOrder, WindowId, WindowStore};

/// Walks the subtree of `root` in pre-order and, for each window carrying
/// validation state, paints its newly exposed border, hands its interior
/// exposure to [`Screen::window_exposures`] and releases the state.
///
/// Children of windows without state are not visited: marking always marks
/// a window's parent, so unmarked windows have no marked descendants here.
pub fn handle_exposures<S: Screen + ?Sized>(
    screen: &mut S,
    windows: &WindowStore,
    valdata: &mut ValidationTable,
    root: WindowId,
) {
    windows.validate(root);
    let mut walk = PreOrder::new(root.idx);
    while let Some(idx) = walk.next(windows) {
        let Some(state) = valdata.remove_at(idx) else {
            walk.skip_children();
            continue;
        };
        debug_assert!(
            state.phase != Phase::Marked,
            "window slot {idx} reached exposure dispatch without clip validation"
        );
        let id = windows.id_at(idx);
        if !state.after.border_exposed.is_empty() {
            screen.paint_window(windows, id, &state.after.border_exposed, PaintPart::Border);
        }
        screen.window_exposures(windows, id, &state.after.exposed, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{BoxRect, Region};
    use crate::testing::{Call, RecordingScreen, realized};
    use crate::validate::{VtKind, mark_overlapped, validate_tree};
    use crate::window::Geometry;

    #[test]
    fn border_painted_before_interior_exposure() {
        let mut windows = WindowStore::new(100, 100);
        let root = windows.root();
        let w = realized(&mut windows, root, Geometry::new(10, 10, 20, 20, 1));

        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        mark_overlapped(&mut screen, &mut windows, &mut valdata, w, Some(w));
        validate_tree(&mut screen, &mut windows, &mut valdata, root, None, VtKind::Map);
        handle_exposures(&mut screen, &windows, &mut valdata, root);

        assert!(valdata.is_empty());
        let calls: alloc::vec::Vec<_> = screen.calls_for(w).collect();
        assert!(matches!(
            calls.as_slice(),
            [
                Call::Paint {
                    part: PaintPart::Border,
                    ..
                },
                Call::Exposures { .. }
            ]
        ));
        assert_eq!(
            screen.exposed(w),
            Some(Region::from_box(BoxRect::new(11, 11, 31, 31)))
        );
    }

    #[test]
    fn every_marked_window_receives_exposures() {
        let mut windows = WindowStore::new(100, 100);
        let root = windows.root();
        let w = realized(&mut windows, root, Geometry::new(10, 10, 20, 20, 0));
        let inner = realized(&mut windows, w, Geometry::new(0, 0, 5, 5, 0));

        let mut screen = RecordingScreen::default();
        let mut valdata = ValidationTable::new();
        mark_overlapped(&mut screen, &mut windows, &mut valdata, w, Some(w));
        validate_tree(&mut screen, &mut windows, &mut valdata, root, None, VtKind::Map);
        handle_exposures(&mut screen, &windows, &mut valdata, root);

        assert_eq!(screen.exposed(root), Some(Region::new()));
        assert!(screen.exposed(w).is_some());
        assert_eq!(
            screen.exposed(inner),
            Some(Region::from_box(BoxRect::new(10, 10, 15, 15)))
        );
    }
}
