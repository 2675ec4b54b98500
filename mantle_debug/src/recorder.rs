// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Window handles are recorded by slot index only; generations are dropped.
//! Rich events ([`on_exposed_rects`](TraceSink::on_exposed_rects)) store only
//! the count.

use kurbo::Rect;
use mantle_core::trace::{
    CopyEvent, ExposeEvent, ExposedRect, MarkEvent, OpBeginEvent, OpEndEvent, OpKind, TraceSink,
    ValidateEvent,
};
use mantle_core::validate::VtKind;
use mantle_core::window::WindowId;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_OP_BEGIN: u8 = 1;
const TAG_OP_END: u8 = 2;
const TAG_MARK: u8 = 3;
const TAG_VALIDATE: u8 = 4;
const TAG_COPY: u8 = 5;
const TAG_EXPOSE: u8 = 6;
const TAG_EXPOSED_RECTS_COUNT: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_window(&mut self, id: WindowId) {
        self.write_u32(id.index());
    }

    fn write_rect(&mut self, r: Rect) {
        self.write_f64(r.x0);
        self.write_f64(r.y0);
        self.write_f64(r.x1);
        self.write_f64(r.y1);
    }

    fn write_op(&mut self, op: OpKind) {
        self.write_u8(match op {
            OpKind::Map => 0,
            OpKind::Unmap => 1,
            OpKind::Move => 2,
            OpKind::Resize => 3,
            OpKind::Restack => 4,
            OpKind::Reshape => 5,
            OpKind::Reborder => 6,
            OpKind::Clear => 7,
        });
    }

    fn write_kind(&mut self, kind: VtKind) {
        self.write_u8(match kind {
            VtKind::Map => 0,
            VtKind::Unmap => 1,
            VtKind::Move => 2,
            VtKind::Stack => 3,
            VtKind::Other => 4,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_op_begin(&mut self, e: &OpBeginEvent) {
        self.write_u8(TAG_OP_BEGIN);
        self.write_u64(e.seq);
        self.write_op(e.op);
        self.write_window(e.window);
    }

    fn on_op_end(&mut self, e: &OpEndEvent) {
        self.write_u8(TAG_OP_END);
        self.write_u64(e.seq);
        self.write_op(e.op);
        self.write_window(e.window);
        self.write_u8(u8::from(e.marked));
    }

    fn on_mark(&mut self, e: &MarkEvent) {
        self.write_u8(TAG_MARK);
        self.write_u64(e.seq);
        self.write_window(e.window);
        self.write_window(e.layer);
        self.write_u8(u8::from(e.any_marked));
        self.write_u32(e.marked);
    }

    fn on_validate(&mut self, e: &ValidateEvent) {
        self.write_u8(TAG_VALIDATE);
        self.write_u64(e.seq);
        self.write_window(e.parent);
        self.write_kind(e.kind);
        self.write_u32(e.validated);
    }

    fn on_copy(&mut self, e: &CopyEvent) {
        self.write_u8(TAG_COPY);
        self.write_u64(e.seq);
        self.write_window(e.window);
        self.write_i32(e.dx);
        self.write_i32(e.dy);
        self.write_u32(e.rects);
        self.write_rect(e.extents);
    }

    fn on_expose(&mut self, e: &ExposeEvent) {
        self.write_u8(TAG_EXPOSE);
        self.write_u64(e.seq);
        self.write_window(e.window);
        self.write_u32(e.exposed_rects);
        self.write_rect(e.exposed_extents);
        self.write_u32(e.border_rects);
    }

    fn on_exposed_rects(&mut self, seq: u64, window: WindowId, rects: &[ExposedRect]) {
        self.write_u8(TAG_EXPOSED_RECTS_COUNT);
        self.write_u64(seq);
        self.write_window(window);
        self.write_u32(u32::try_from(rects.len()).unwrap_or(u32::MAX));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
///
/// Windows are identified by slot index.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// An [`OpBeginEvent`].
    OpBegin {
        /// Sequence number.
        seq: u64,
        /// Operation.
        op: OpKind,
        /// Window slot.
        window: u32,
    },
    /// An [`OpEndEvent`].
    OpEnd {
        /// Sequence number.
        seq: u64,
        /// Operation.
        op: OpKind,
        /// Window slot.
        window: u32,
        /// Whether validation ran.
        marked: bool,
    },
    /// A [`MarkEvent`].
    Mark {
        /// Sequence number.
        seq: u64,
        /// Window slot that triggered the pass.
        window: u32,
        /// Layer window slot.
        layer: u32,
        /// Whether anything was marked.
        any_marked: bool,
        /// Windows carrying validation state.
        marked: u32,
    },
    /// A [`ValidateEvent`].
    Validate {
        /// Sequence number.
        seq: u64,
        /// Parent window slot.
        parent: u32,
        /// Kind of change.
        kind: VtKind,
        /// Windows carrying validation state.
        validated: u32,
    },
    /// A [`CopyEvent`].
    Copy {
        /// Sequence number.
        seq: u64,
        /// Window slot.
        window: u32,
        /// Horizontal offset.
        dx: i32,
        /// Vertical offset.
        dy: i32,
        /// Boxes in the source region.
        rects: u32,
        /// Source bounding box.
        extents: Rect,
    },
    /// An [`ExposeEvent`].
    Expose {
        /// Sequence number.
        seq: u64,
        /// Window slot.
        window: u32,
        /// Boxes in the interior exposure.
        exposed_rects: u32,
        /// Interior exposure bounding box.
        exposed_extents: Rect,
        /// Boxes in the border exposure.
        border_rects: u32,
    },
    /// Exposed-rect count for a window.
    ExposedRectsCount {
        /// Sequence number of the matching [`RecordedEvent::Expose`].
        seq: u64,
        /// Window slot.
        window: u32,
        /// Number of rects.
        count: u32,
    },
}

impl RecordedEvent {
    /// Returns the sequence number of the event.
    #[must_use]
    pub fn seq(&self) -> u64 {
        match self {
            Self::OpBegin { seq, .. }
            | Self::OpEnd { seq, .. }
            | Self::Mark { seq, .. }
            | Self::Validate { seq, .. }
            | Self::Copy { seq, .. }
            | Self::Expose { seq, .. }
            | Self::ExposedRectsCount { seq, .. } => *seq,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_rect(&mut self) -> Option<Rect> {
        Some(Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        ))
    }

    fn read_op(&mut self) -> Option<OpKind> {
        Some(match self.read_u8()? {
            0 => OpKind::Map,
            1 => OpKind::Unmap,
            2 => OpKind::Move,
            3 => OpKind::Resize,
            4 => OpKind::Restack,
            5 => OpKind::Reshape,
            6 => OpKind::Reborder,
            _ => OpKind::Clear,
        })
    }

    fn read_kind(&mut self) -> Option<VtKind> {
        Some(match self.read_u8()? {
            0 => VtKind::Map,
            1 => VtKind::Unmap,
            2 => VtKind::Move,
            3 => VtKind::Stack,
            _ => VtKind::Other,
        })
    }

    fn decode_op_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::OpBegin {
            seq: self.read_u64()?,
            op: self.read_op()?,
            window: self.read_u32()?,
        })
    }

    fn decode_op_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::OpEnd {
            seq: self.read_u64()?,
            op: self.read_op()?,
            window: self.read_u32()?,
            marked: self.read_bool()?,
        })
    }

    fn decode_mark(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Mark {
            seq: self.read_u64()?,
            window: self.read_u32()?,
            layer: self.read_u32()?,
            any_marked: self.read_bool()?,
            marked: self.read_u32()?,
        })
    }

    fn decode_validate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Validate {
            seq: self.read_u64()?,
            parent: self.read_u32()?,
            kind: self.read_kind()?,
            validated: self.read_u32()?,
        })
    }

    fn decode_copy(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Copy {
            seq: self.read_u64()?,
            window: self.read_u32()?,
            dx: self.read_i32()?,
            dy: self.read_i32()?,
            rects: self.read_u32()?,
            extents: self.read_rect()?,
        })
    }

    fn decode_expose(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Expose {
            seq: self.read_u64()?,
            window: self.read_u32()?,
            exposed_rects: self.read_u32()?,
            exposed_extents: self.read_rect()?,
            border_rects: self.read_u32()?,
        })
    }

    fn decode_exposed_rects_count(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ExposedRectsCount {
            seq: self.read_u64()?,
            window: self.read_u32()?,
            count: self.read_u32()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_OP_BEGIN => self.decode_op_begin(),
            TAG_OP_END => self.decode_op_end(),
            TAG_MARK => self.decode_mark(),
            TAG_VALIDATE => self.decode_validate(),
            TAG_COPY => self.decode_copy(),
            TAG_EXPOSE => self.decode_expose(),
            TAG_EXPOSED_RECTS_COUNT => self.decode_exposed_rects_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use mantle_core::window::WindowStore;

    use super::*;

    fn two_windows() -> (WindowId, WindowId) {
        let mut windows = WindowStore::new(100, 100);
        let root = windows.root();
        let child = windows.create_window(
            root,
            mantle_core::window::Geometry::new(0, 0, 10, 10, 0),
        );
        (root, child)
    }

    #[test]
    fn records_operation_lifecycle() {
        let (root, child) = two_windows();
        let mut rec = RecorderSink::new();
        rec.on_op_begin(&OpBeginEvent {
            seq: 0,
            op: OpKind::Resize,
            window: child,
        });
        rec.on_mark(&MarkEvent {
            seq: 1,
            window: child,
            layer: child,
            any_marked: true,
            marked: 2,
        });
        rec.on_validate(&ValidateEvent {
            seq: 2,
            parent: root,
            kind: VtKind::Other,
            validated: 2,
        });
        rec.on_op_end(&OpEndEvent {
            seq: 3,
            op: OpKind::Resize,
            window: child,
            marked: true,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            [
                RecordedEvent::OpBegin {
                    seq: 0,
                    op: OpKind::Resize,
                    window: child.index(),
                },
                RecordedEvent::Mark {
                    seq: 1,
                    window: child.index(),
                    layer: child.index(),
                    any_marked: true,
                    marked: 2,
                },
                RecordedEvent::Validate {
                    seq: 2,
                    parent: root.index(),
                    kind: VtKind::Other,
                    validated: 2,
                },
                RecordedEvent::OpEnd {
                    seq: 3,
                    op: OpKind::Resize,
                    window: child.index(),
                    marked: true,
                },
            ]
        );
    }

    #[test]
    fn copy_keeps_signed_offsets_and_extents() {
        let (_, child) = two_windows();
        let mut rec = RecorderSink::new();
        rec.on_copy(&CopyEvent {
            seq: 9,
            window: child,
            dx: -15,
            dy: 4,
            rects: 3,
            extents: Rect::new(10.0, 20.0, 60.0, 90.0),
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::Copy {
                dx, dy, extents, ..
            }] => {
                assert_eq!((*dx, *dy), (-15, 4));
                assert_eq!(*extents, Rect::new(10.0, 20.0, 60.0, 90.0));
            }
            other => panic!("expected one Copy, got {other:?}"),
        }
    }

    #[test]
    fn exposed_rects_store_count_only() {
        let (_, child) = two_windows();
        let mut rec = RecorderSink::new();
        let rects = [
            ExposedRect {
                x: 0,
                y: 0,
                width: 5,
                height: 5,
            },
            ExposedRect {
                x: 5,
                y: 0,
                width: 5,
                height: 2,
            },
        ];
        rec.on_exposed_rects(4, child, &rects);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            [RecordedEvent::ExposedRectsCount {
                seq: 4,
                window: child.index(),
                count: 2,
            }]
        );
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let (_, child) = two_windows();
        let mut rec = RecorderSink::new();
        rec.on_expose(&ExposeEvent {
            seq: 1,
            window: child,
            exposed_rects: 1,
            exposed_extents: Rect::new(0.0, 0.0, 10.0, 10.0),
            border_rects: 0,
        });
        let bytes = rec.into_bytes();
        assert_eq!(decode(&bytes).count(), 1);
        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 0);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
