// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window tree, clip validation, and exposure tracking for a display server.
//!
//! `mantle_core` keeps a tree of rectangular windows on one screen and,
//! whenever the tree is restructured, works out exactly which pixels each
//! window may draw, which pixels can be kept by copying and which must be
//! repainted. It is `no_std` compatible (with `alloc`) and uses
//! struct-of-arrays storage with generational index handles.
//!
//! # Architecture
//!
//! Every restructuring operation runs the same pipeline:
//!
//! ```text
//!   WindowTree::{map, unmap, move, resize, restack, reshape, ...}
//!       │
//!       ▼
//!   mark_overlapped() ──► ValidationTable (old corner, saved border)
//!       │
//!       ▼
//!   apply change ──► WindowStore (geometry, stacking, size regions)
//!       │
//!       ▼
//!   mark_overlapped() ──► validate_tree() ──► clip_list / border_clip
//!                                                  │
//!                 ┌────────────────────────────────┘
//!                 ▼
//!   Screen::copy_window() ──► handle_exposures() ──► Screen::paint_window()
//!                                                    Screen::window_exposures()
//! ```
//!
//! **[`region`]**: Y-X banded rectangle sets with union, intersection,
//! subtraction and translation.
//!
//! **[`window`]**: Struct-of-arrays window tree with generational handles,
//! gravity rules and the per-window size regions.
//!
//! **[`dirty`]**: Lazy size-region maintenance via `understory_dirty`.
//! Windows that change while not viewable are repaired on the next marking
//! pass.
//!
//! **[`validate`]**: Overlap marking, per-operation validation state and
//! the recursive clip computation.
//!
//! **[`expose`]**: Exposure dispatch to the screen.
//!
//! **[`screen`]**: The [`Screen`](screen::Screen) trait through which the
//! engine paints, copies and reports. Its marking, validation and exposure
//! steps are overridable strategies.
//!
//! **[`tree`]**: [`WindowTree`](tree::WindowTree), the restructuring
//! operations themselves.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! pipeline instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-window
//!   exposed-rectangle events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod expose;
pub mod region;
pub mod screen;
pub mod trace;
pub mod tree;
pub mod validate;
pub mod window;

#[cfg(test)]
mod testing;
