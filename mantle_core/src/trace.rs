// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for window restructuring.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`WindowTree`](crate::tree::WindowTree) calls at each stage of an
//! operation. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Events carry a per-tree sequence number instead of a timestamp: the
//! restructuring code has no clock, and the order of events is what matters.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`ExposedRect`] events and the
//!   corresponding `TraceSink` method.

use kurbo::Rect;

use crate::validate::VtKind;
use crate::window::WindowId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which restructuring operation an event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// A window was mapped.
    Map,
    /// A window was unmapped.
    Unmap,
    /// A window moved without changing size.
    Move,
    /// A window was resized (and possibly moved).
    Resize,
    /// Only the stacking order changed.
    Restack,
    /// The bounding shape changed.
    Reshape,
    /// The border width changed.
    Reborder,
    /// Part of a window was cleared to its background.
    Clear,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of an operation.
#[derive(Clone, Copy, Debug)]
pub struct OpBeginEvent {
    /// Sequence number.
    pub seq: u64,
    /// Which operation is starting.
    pub op: OpKind,
    /// The window being restructured.
    pub window: WindowId,
}

/// Marks the end of an operation.
#[derive(Clone, Copy, Debug)]
pub struct OpEndEvent {
    /// Sequence number.
    pub seq: u64,
    /// Which operation is ending.
    pub op: OpKind,
    /// The window that was restructured.
    pub window: WindowId,
    /// Whether any window was marked, i.e. whether validation ran.
    pub marked: bool,
}

/// Emitted after an overlap-marking pass.
#[derive(Clone, Copy, Debug)]
pub struct MarkEvent {
    /// Sequence number.
    pub seq: u64,
    /// Window whose change triggered the pass.
    pub window: WindowId,
    /// Layer window reported by the pass.
    pub layer: WindowId,
    /// Whether the pass marked anything.
    pub any_marked: bool,
    /// Windows carrying validation state after the pass.
    pub marked: u32,
}

/// Emitted after a clip-validation pass.
#[derive(Clone, Copy, Debug)]
pub struct ValidateEvent {
    /// Sequence number.
    pub seq: u64,
    /// Parent whose children were validated.
    pub parent: WindowId,
    /// Kind of change validated.
    pub kind: VtKind,
    /// Windows carrying validation state after the pass.
    pub validated: u32,
}

/// Emitted for every pixel copy requested from the screen.
#[derive(Clone, Copy, Debug)]
pub struct CopyEvent {
    /// Sequence number.
    pub seq: u64,
    /// Window whose pixels are copied.
    pub window: WindowId,
    /// Horizontal offset.
    pub dx: i32,
    /// Vertical offset.
    pub dy: i32,
    /// Number of boxes in the source region.
    pub rects: u32,
    /// Bounding box of the source region.
    pub extents: Rect,
}

/// Emitted for every window whose exposures are about to be dispatched.
#[derive(Clone, Copy, Debug)]
pub struct ExposeEvent {
    /// Sequence number.
    pub seq: u64,
    /// Window receiving the exposure.
    pub window: WindowId,
    /// Number of boxes in the interior exposure.
    pub exposed_rects: u32,
    /// Bounding box of the interior exposure.
    pub exposed_extents: Rect,
    /// Number of boxes in the border exposure.
    pub border_rects: u32,
}

/// An exposed rectangle in screen coordinates.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExposedRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from window restructuring.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when an operation starts.
    fn on_op_begin(&mut self, e: &OpBeginEvent) {
        _ = e;
    }

    /// Called when an operation ends.
    fn on_op_end(&mut self, e: &OpEndEvent) {
        _ = e;
    }

    /// Called after each overlap-marking pass.
    fn on_mark(&mut self, e: &MarkEvent) {
        _ = e;
    }

    /// Called after each clip-validation pass.
    fn on_validate(&mut self, e: &ValidateEvent) {
        _ = e;
    }

    /// Called before each pixel copy.
    fn on_copy(&mut self, e: &CopyEvent) {
        _ = e;
    }

    /// Called before a window's exposures are dispatched.
    fn on_expose(&mut self, e: &ExposeEvent) {
        _ = e;
    }

    /// Called with the interior exposure of a window, box by box (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_exposed_rects(&mut self, seq: u64, window: WindowId, rects: &[ExposedRect]) {
        _ = (seq, window, rects);
    }
}

/// Shared sinks, so a caller can keep inspecting a sink it handed to a tree.
impl<T: TraceSink + ?Sized> TraceSink for alloc::rc::Rc<core::cell::RefCell<T>> {
    fn on_op_begin(&mut self, e: &OpBeginEvent) {
        self.borrow_mut().on_op_begin(e);
    }

    fn on_op_end(&mut self, e: &OpEndEvent) {
        self.borrow_mut().on_op_end(e);
    }

    fn on_mark(&mut self, e: &MarkEvent) {
        self.borrow_mut().on_mark(e);
    }

    fn on_validate(&mut self, e: &ValidateEvent) {
        self.borrow_mut().on_validate(e);
    }

    fn on_copy(&mut self, e: &CopyEvent) {
        self.borrow_mut().on_copy(e);
    }

    fn on_expose(&mut self, e: &ExposeEvent) {
        self.borrow_mut().on_expose(e);
    }

    #[cfg(feature = "trace-rich")]
    fn on_exposed_rects(&mut self, seq: u64, window: WindowId, rects: &[ExposedRect]) {
        self.borrow_mut().on_exposed_rects(seq, window, rects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self::from_option(Some(sink))
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::from_option(None)
    }

    /// Creates a tracer from an optional sink.
    #[inline]
    #[must_use]
    pub fn from_option(sink: Option<&'a mut dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns `true` if events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits an [`OpBeginEvent`].
    #[inline]
    pub fn op_begin(&mut self, e: &OpBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_op_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`OpEndEvent`].
    #[inline]
    pub fn op_end(&mut self, e: &OpEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_op_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MarkEvent`].
    #[inline]
    pub fn mark(&mut self, e: &MarkEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_mark(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ValidateEvent`].
    #[inline]
    pub fn validate(&mut self, e: &ValidateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_validate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CopyEvent`].
    #[inline]
    pub fn copy(&mut self, e: &CopyEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_copy(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ExposeEvent`].
    #[inline]
    pub fn expose(&mut self, e: &ExposeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_expose(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits exposed rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn exposed_rects(&mut self, seq: u64, window: WindowId, rects: &[ExposedRect]) {
        if let Some(s) = &mut self.sink {
            s.on_exposed_rects(seq, window, rects);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
