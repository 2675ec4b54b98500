// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test fixtures: a screen that records every callback.

use alloc::vec::Vec;

use crate::region::Region;
use crate::screen::{PaintPart, Screen};
use crate::window::{Geometry, WindowId, WindowStore};

/// One recorded screen callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Paint {
        window: WindowId,
        region: Region,
        part: PaintPart,
    },
    Exposures {
        window: WindowId,
        region: Region,
    },
    Copy {
        window: WindowId,
        source: Region,
        dx: i32,
        dy: i32,
    },
    Position {
        window: WindowId,
        x: i32,
        y: i32,
    },
}

impl Call {
    fn window(&self) -> WindowId {
        match self {
            Self::Paint { window, .. }
            | Self::Exposures { window, .. }
            | Self::Copy { window, .. }
            | Self::Position { window, .. } => *window,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingScreen {
    pub(crate) calls: Vec<Call>,
}

impl RecordingScreen {
    pub(crate) fn clear(&mut self) {
        self.calls.clear();
    }

    pub(crate) fn calls_for(&self, id: WindowId) -> impl Iterator<Item = &Call> {
        self.calls.iter().filter(move |c| c.window() == id)
    }

    /// The interior exposure last delivered to `id`.
    pub(crate) fn exposed(&self, id: WindowId) -> Option<Region> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Exposures { window, region } if *window == id => Some(region.clone()),
            _ => None,
        })
    }

    /// Union of everything painted for `id` with `part`.
    pub(crate) fn painted(&self, id: WindowId, part: PaintPart) -> Region {
        self.calls.iter().fold(Region::new(), |acc, c| match c {
            Call::Paint {
                window,
                region,
                part: p,
            } if *window == id && *p == part => acc.union(region),
            _ => acc,
        })
    }

    pub(crate) fn copies(&self) -> Vec<(WindowId, Region, i32, i32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Copy {
                    window,
                    source,
                    dx,
                    dy,
                } => Some((*window, source.clone(), *dx, *dy)),
                _ => None,
            })
            .collect()
    }

    /// Union of every interior exposure delivered, over all windows.
    pub(crate) fn all_exposed(&self) -> Region {
        self.calls.iter().fold(Region::new(), |acc, c| match c {
            Call::Exposures { region, .. } => acc.union(region),
            _ => acc,
        })
    }
}

impl Screen for RecordingScreen {
    fn paint_window(&mut self, _: &WindowStore, id: WindowId, region: &Region, part: PaintPart) {
        self.calls.push(Call::Paint {
            window: id,
            region: region.clone(),
            part,
        });
    }

    fn window_exposures(
        &mut self,
        _: &WindowStore,
        id: WindowId,
        exposed: &Region,
        _: Option<&Region>,
    ) {
        self.calls.push(Call::Exposures {
            window: id,
            region: exposed.clone(),
        });
    }

    fn copy_window(&mut self, _: &WindowStore, id: WindowId, source: &Region, dx: i32, dy: i32) {
        self.calls.push(Call::Copy {
            window: id,
            source: source.clone(),
            dx,
            dy,
        });
    }

    fn position_window(&mut self, _: &WindowStore, id: WindowId, x: i32, y: i32) {
        self.calls.push(Call::Position { window: id, x, y });
    }
}

/// Creates a mapped window under a viewable `parent` with its size regions
/// computed but its clips not yet validated.
pub(crate) fn realized(windows: &mut WindowStore, parent: WindowId, geometry: Geometry) -> WindowId {
    let id = windows.create_window(parent, geometry);
    windows.mapped[id.idx as usize] = true;
    windows.viewable[id.idx as usize] = true;
    windows.repair_regions();
    id
}
