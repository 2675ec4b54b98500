// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window tree data model.
//!
//! A *window* is a node in a single-root tree that mirrors the stacking of
//! rectangles on one screen. Each window has:
//!
//! - An identity ([`WindowId`]), a generational handle that becomes stale
//!   when the window is destroyed.
//! - Topology: parent, first/last child and sibling links. Siblings are kept
//!   topmost first; an earlier sibling occludes every later one.
//! - **Attributes** set by the caller: [`Geometry`], bit and win
//!   [`Gravity`], an optional bounding shape, and the mapped flag.
//! - **Derived regions** maintained by restructuring:
//!   - `win_size`: the interior box clipped by the parent and the shape,
//!   - `border_size`: the same for the box including the border,
//!   - `border_clip`: `border_size` minus what ancestors and elder siblings
//!     cover,
//!   - `clip_list`: `border_clip` restricted to the interior, minus viewable
//!     children.
//!
//! Windows are stored in struct-of-arrays layout with index-based handles.
//! Per-operation scratch state lives in a separate
//! [`ValidationTable`](crate::validate::ValidationTable), never in the node
//! records.

mod gravity;
mod id;
mod store;
mod traverse;

pub use gravity::{GRAVITY_COUNT, Gravity, gravity_translate};
pub use id::{INVALID, WindowId};
pub use store::{Geometry, StackPosition, Visibility, WindowStore};
pub use traverse::Children;

pub(crate) use store::ROOT;
pub(crate) use traverse::PreOrder;
