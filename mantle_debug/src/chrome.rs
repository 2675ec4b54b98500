// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Recordings carry sequence numbers rather than times, so each event's
//! sequence number is used as its timestamp in microseconds. Operations
//! become duration slices; everything inside them is an instant event.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use kurbo::Rect;
use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let ts = recorded.seq();
        let event = match recorded {
            RecordedEvent::OpBegin { op, window, .. } => json!({
                "ph": "B",
                "name": format!("{op:?}"),
                "cat": "Op",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": { "window": window },
            }),
            RecordedEvent::OpEnd {
                op, window, marked, ..
            } => json!({
                "ph": "E",
                "name": format!("{op:?}"),
                "cat": "Op",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": { "window": window, "marked": marked },
            }),
            RecordedEvent::Mark {
                window,
                layer,
                any_marked,
                marked,
                ..
            } => instant(
                "Mark",
                "Validate",
                ts,
                json!({
                    "window": window,
                    "layer": layer,
                    "any_marked": any_marked,
                    "marked": marked,
                }),
            ),
            RecordedEvent::Validate {
                parent,
                kind,
                validated,
                ..
            } => instant(
                "ValidateTree",
                "Validate",
                ts,
                json!({
                    "parent": parent,
                    "kind": format!("{kind:?}"),
                    "validated": validated,
                }),
            ),
            RecordedEvent::Copy {
                window,
                dx,
                dy,
                rects,
                extents,
                ..
            } => instant(
                "CopyWindow",
                "Pixels",
                ts,
                json!({
                    "window": window,
                    "dx": dx,
                    "dy": dy,
                    "rects": rects,
                    "extents": rect_json(extents),
                }),
            ),
            RecordedEvent::Expose {
                window,
                exposed_rects,
                exposed_extents,
                border_rects,
                ..
            } => instant(
                "Expose",
                "Pixels",
                ts,
                json!({
                    "window": window,
                    "rects": exposed_rects,
                    "extents": rect_json(exposed_extents),
                    "border_rects": border_rects,
                }),
            ),
            RecordedEvent::ExposedRectsCount { window, count, .. } => instant(
                "ExposedRects",
                "Rich",
                ts,
                json!({ "window": window, "count": count }),
            ),
        };
        events.push(event);
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: u64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn rect_json(r: Rect) -> Value {
    json!([r.x0, r.y0, r.x1, r.y1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use mantle_core::trace::{CopyEvent, OpBeginEvent, OpEndEvent, OpKind, TraceSink};
    use mantle_core::window::WindowStore;

    #[test]
    fn export_produces_valid_json() {
        let root = WindowStore::new(10, 10).root();
        let mut rec = RecorderSink::new();
        rec.on_op_begin(&OpBeginEvent {
            seq: 0,
            op: OpKind::Move,
            window: root,
        });
        rec.on_copy(&CopyEvent {
            seq: 1,
            window: root,
            dx: 10,
            dy: 10,
            rects: 1,
            extents: Rect::new(0.0, 0.0, 100.0, 100.0),
        });
        rec.on_op_end(&OpEndEvent {
            seq: 2,
            op: OpKind::Move,
            window: root,
            marked: true,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "Move");

        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["name"], "CopyWindow");
        assert_eq!(parsed[1]["ts"], 1);
        assert_eq!(parsed[1]["args"]["dx"], 10);

        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["args"]["marked"], true);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
