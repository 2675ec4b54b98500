// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use kurbo::Rect;
use mantle_core::trace::{
    CopyEvent, ExposeEvent, ExposedRect, MarkEvent, OpBeginEvent, OpEndEvent, OpKind, TraceSink,
    ValidateEvent,
};
use mantle_core::window::WindowId;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn op_name(op: OpKind) -> &'static str {
    match op {
        OpKind::Map => "map",
        OpKind::Unmap => "unmap",
        OpKind::Move => "move",
        OpKind::Resize => "resize",
        OpKind::Restack => "restack",
        OpKind::Reshape => "reshape",
        OpKind::Reborder => "reborder",
        OpKind::Clear => "clear",
    }
}

/// `w3`, ignoring the generation.
struct Win(WindowId);

impl std::fmt::Display for Win {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "w{}", self.0.index())
    }
}

/// `x0,y0..x1,y1`, or `-` for an empty box.
struct Extents(Rect);

impl std::fmt::Display for Extents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = self.0;
        if r.is_zero_area() {
            return f.write_str("-");
        }
        write!(f, "{},{}..{},{}", r.x0, r.y0, r.x1, r.y1)
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_op_begin(&mut self, e: &OpBeginEvent) {
        let _ = writeln!(
            self.writer,
            "#{} [{}:begin] {}",
            e.seq,
            op_name(e.op),
            Win(e.window),
        );
    }

    fn on_op_end(&mut self, e: &OpEndEvent) {
        let _ = writeln!(
            self.writer,
            "#{} [{}:end] {} marked={}",
            e.seq,
            op_name(e.op),
            Win(e.window),
            e.marked,
        );
    }

    fn on_mark(&mut self, e: &MarkEvent) {
        let _ = writeln!(
            self.writer,
            "#{} [mark] {} layer={} any={} total={}",
            e.seq,
            Win(e.window),
            Win(e.layer),
            e.any_marked,
            e.marked,
        );
    }

    fn on_validate(&mut self, e: &ValidateEvent) {
        let _ = writeln!(
            self.writer,
            "#{} [validate] parent={} kind={:?} windows={}",
            e.seq,
            Win(e.parent),
            e.kind,
            e.validated,
        );
    }

    fn on_copy(&mut self, e: &CopyEvent) {
        let _ = writeln!(
            self.writer,
            "#{} [copy] {} by {},{} src={} rects={}",
            e.seq,
            Win(e.window),
            e.dx,
            e.dy,
            Extents(e.extents),
            e.rects,
        );
    }

    fn on_expose(&mut self, e: &ExposeEvent) {
        let _ = writeln!(
            self.writer,
            "#{} [expose] {} interior={} rects={} border_rects={}",
            e.seq,
            Win(e.window),
            Extents(e.exposed_extents),
            e.exposed_rects,
            e.border_rects,
        );
    }

    fn on_exposed_rects(&mut self, seq: u64, window: WindowId, rects: &[ExposedRect]) {
        for r in rects {
            let _ = writeln!(
                self.writer,
                "#{seq} [exposed] {} {},{} {}x{}",
                Win(window),
                r.x,
                r.y,
                r.width,
                r.height,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantle_core::window::WindowStore;

    #[test]
    fn pretty_print_copy() {
        let root = WindowStore::new(10, 10).root();
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_copy(&CopyEvent {
            seq: 3,
            window: root,
            dx: 10,
            dy: -2,
            rects: 1,
            extents: Rect::new(0.0, 0.0, 100.0, 100.0),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(output, "#3 [copy] w0 by 10,-2 src=0,0..100,100 rects=1\n");
    }

    #[test]
    fn empty_exposure_prints_dash() {
        let root = WindowStore::new(10, 10).root();
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_expose(&ExposeEvent {
            seq: 0,
            window: root,
            exposed_rects: 0,
            exposed_extents: Rect::ZERO,
            border_rects: 0,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("interior=- "), "got: {output}");
    }
}
