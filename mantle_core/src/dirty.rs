// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! A window's `win_size` and `border_size` regions depend on its own geometry
//! and shape and on its parent's `win_size`. They are recomputed eagerly
//! while the window is viewable. For windows that are not viewable the work
//! is deferred: the window is marked on [`SHAPE`] with
//! [`EagerPolicy`](understory_dirty::EagerPolicy), which also marks every
//! descendant through the child-to-parent dependency edges. Such regions are
//! *broken* until the next repair pass drains the channel, which happens at
//! the start of every overlap-marking pass and on demand through
//! [`WindowStore::repair_regions`](crate::window::WindowStore::repair_regions).

use understory_dirty::Channel;

/// Geometry or shape changed while not viewable; `win_size` and
/// `border_size` must be recomputed for the window and its descendants.
pub const SHAPE: Channel = Channel::new(0);
