// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge gravity for retained window contents and child placement.

/// Number of distinct gravity values, including [`Gravity::Forget`].
pub const GRAVITY_COUNT: usize = 11;

/// Where content stays anchored when a window changes size.
///
/// As a window's *bit gravity* it decides which part of the old contents is
/// kept; [`Forget`](Self::Forget) discards them. As a child's *win gravity*
/// it decides where the child moves when its parent resizes;
/// [`UNMAP`](Self::UNMAP) unmaps the child instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Gravity {
    /// Contents are discarded (bit gravity) or the child is unmapped (win gravity).
    #[default]
    Forget = 0,
    /// Anchored to the top-left corner.
    NorthWest = 1,
    /// Anchored to the middle of the top edge.
    North = 2,
    /// Anchored to the top-right corner.
    NorthEast = 3,
    /// Anchored to the middle of the left edge.
    West = 4,
    /// Anchored to the center.
    Center = 5,
    /// Anchored to the middle of the right edge.
    East = 6,
    /// Anchored to the bottom-left corner.
    SouthWest = 7,
    /// Anchored to the middle of the bottom edge.
    South = 8,
    /// Anchored to the bottom-right corner.
    SouthEast = 9,
    /// Keeps the absolute screen position.
    Static = 10,
}

impl Gravity {
    /// Win gravity that unmaps the child when its parent resizes.
    pub const UNMAP: Self = Self::Forget;

    /// Every value in ascending index order.
    pub const ALL: [Self; GRAVITY_COUNT] = [
        Self::Forget,
        Self::NorthWest,
        Self::North,
        Self::NorthEast,
        Self::West,
        Self::Center,
        Self::East,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
        Self::Static,
    ];

    /// Returns the bucket index of this gravity.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the gravity at `index`, or `None` past [`Static`](Self::Static).
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < GRAVITY_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }
}

/// Computes where a point anchored with gravity `g` ends up after its window
/// grew by `(dw, dh)`.
///
/// `(x, y)` is the new position of the window, `(old_x, old_y)` the old one.
/// Half-size offsets truncate toward zero. Results saturate at the `i32`
/// range.
#[must_use]
pub const fn gravity_translate(
    x: i32,
    y: i32,
    old_x: i32,
    old_y: i32,
    dw: i32,
    dh: i32,
    g: Gravity,
) -> (i32, i32) {
    match g {
        Gravity::North => (x.saturating_add(dw / 2), y),
        Gravity::NorthEast => (x.saturating_add(dw), y),
        Gravity::West => (x, y.saturating_add(dh / 2)),
        Gravity::Center => (x.saturating_add(dw / 2), y.saturating_add(dh / 2)),
        Gravity::East => (x.saturating_add(dw), y.saturating_add(dh / 2)),
        Gravity::SouthWest => (x, y.saturating_add(dh)),
        Gravity::South => (x.saturating_add(dw / 2), y.saturating_add(dh)),
        Gravity::SouthEast => (x.saturating_add(dw), y.saturating_add(dh)),
        Gravity::Static => (old_x, old_y),
        Gravity::Forget | Gravity::NorthWest => (x, y),
    }
}
