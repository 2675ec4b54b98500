// Copyright 2026 the Mantle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel regions.
//!
//! A [`Region`] is a set of pixels stored as y-x banded, non-overlapping
//! [`BoxRect`]s: bands are sorted top to bottom, boxes inside a band left to
//! right. Touching boxes in a band are merged and vertically adjacent bands
//! with identical spans are coalesced, so the representation is canonical and
//! two regions covering the same pixels compare equal.
//!
//! Regions are plain values. Set operations return a new region and never
//! alias their inputs.

use alloc::vec::Vec;

use kurbo::Rect;

/// An axis-aligned pixel box. The lower-right corner is exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoxRect {
    /// Left edge.
    pub x1: i32,
    /// Top edge.
    pub y1: i32,
    /// Right edge (exclusive).
    pub x2: i32,
    /// Bottom edge (exclusive).
    pub y2: i32,
}

impl BoxRect {
    /// The canonical empty box.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Creates a box from its edges.
    #[inline]
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Creates a box from a corner and a size, saturating at `i32::MAX`.
    #[must_use]
    pub fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(x, y, saturating_extend(x, width), saturating_extend(y, height))
    }

    /// Returns `true` if the box covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    /// Width in pixels (zero for inverted boxes).
    #[must_use]
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1).max(0).unsigned_abs()
    }

    /// Height in pixels (zero for inverted boxes).
    #[must_use]
    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1).max(0).unsigned_abs()
    }

    /// Returns the overlap of two boxes, or [`EMPTY`](Self::EMPTY).
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let r = Self::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        if r.is_empty() { Self::EMPTY } else { r }
    }

    /// Returns `true` if the boxes share at least one pixel.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }

    /// Returns `true` if the pixel at `(x, y)` lies inside the box.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    /// Returns the box shifted by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x1.saturating_add(dx),
            self.y1.saturating_add(dy),
            self.x2.saturating_add(dx),
            self.y2.saturating_add(dy),
        )
    }

    /// Converts to a floating-point [`kurbo::Rect`].
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x1),
            f64::from(self.y1),
            f64::from(self.x2),
            f64::from(self.y2),
        )
    }
}

impl From<BoxRect> for Rect {
    fn from(b: BoxRect) -> Self {
        b.to_rect()
    }
}

fn saturating_extend(origin: i32, len: u32) -> i32 {
    i32::try_from(i64::from(origin) + i64::from(len)).unwrap_or(i32::MAX)
}

/// How a box relates to a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RectIn {
    /// The box and the region share no pixels.
    Out,
    /// Every pixel of the box is in the region.
    In,
    /// Some, but not all, pixels of the box are in the region.
    Part,
}

/// A canonical set of pixels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    rects: Vec<BoxRect>,
    extents: BoxRect,
}

impl Region {
    /// Creates an empty region.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rects: Vec::new(),
            extents: BoxRect::EMPTY,
        }
    }

    /// Creates a region covering a single box. Empty boxes give an empty region.
    #[must_use]
    pub fn from_box(b: BoxRect) -> Self {
        if b.is_empty() {
            return Self::new();
        }
        let mut rects = Vec::with_capacity(1);
        rects.push(b);
        Self { rects, extents: b }
    }

    /// Creates a region covering the union of arbitrary (possibly overlapping)
    /// boxes.
    #[must_use]
    pub fn from_rects(rects: impl IntoIterator<Item = BoxRect>) -> Self {
        rects
            .into_iter()
            .fold(Self::new(), |acc, b| acc.union(&Self::from_box(b)))
    }

    /// Returns `true` if the region covers no pixels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Bounding box of the region ([`BoxRect::EMPTY`] when empty).
    #[inline]
    #[must_use]
    pub fn extents(&self) -> BoxRect {
        self.extents
    }

    /// The banded boxes making up the region.
    #[inline]
    #[must_use]
    pub fn rects(&self) -> &[BoxRect] {
        &self.rects
    }

    /// Bounding box as a [`kurbo::Rect`].
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        self.extents.to_rect()
    }

    /// Number of pixels covered.
    #[must_use]
    pub fn area(&self) -> u64 {
        self.rects
            .iter()
            .map(|r| u64::from(r.width()) * u64::from(r.height()))
            .sum()
    }

    /// Empties the region, keeping its allocation.
    pub fn clear(&mut self) {
        self.rects.clear();
        self.extents = BoxRect::EMPTY;
    }

    /// Pixels in `self` or `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() || self == other {
            return self.clone();
        }
        combine(self, other, SetOp::Union)
    }

    /// Pixels in both `self` and `other`.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() || !self.extents.overlaps(&other.extents) {
            return Self::new();
        }
        combine(self, other, SetOp::Intersect)
    }

    /// Pixels in both `self` and the box `b`.
    #[must_use]
    pub fn intersect_box(&self, b: BoxRect) -> Self {
        self.intersect(&Self::from_box(b))
    }

    /// Pixels in `self` but not in `other`.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() || !self.extents.overlaps(&other.extents) {
            return self.clone();
        }
        combine(self, other, SetOp::Subtract)
    }

    /// Shifts the region in place.
    ///
    /// Coordinates saturate at the `i32` range; boxes pushed flat against
    /// the edge are dropped.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        if (dx == 0 && dy == 0) || self.is_empty() {
            return;
        }
        for r in &mut self.rects {
            *r = r.translate(dx, dy);
        }
        self.extents = self.extents.translate(dx, dy);
        if self.rects.iter().any(BoxRect::is_empty) {
            let rects = core::mem::take(&mut self.rects);
            *self = Self::from_rects(rects.into_iter().filter(|r| !r.is_empty()));
        }
    }

    /// Returns a shifted copy of the region.
    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        let mut r = self.clone();
        r.translate(dx, dy);
        r
    }

    /// Returns `true` if the pixel at `(x, y)` is in the region.
    #[must_use]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.extents.contains(x, y) && self.rects.iter().any(|r| r.contains(x, y))
    }

    /// Classifies how `b` relates to the region.
    #[must_use]
    pub fn rect_in(&self, b: BoxRect) -> RectIn {
        if b.is_empty() || self.is_empty() || !self.extents.overlaps(&b) {
            return RectIn::Out;
        }
        let inside = self.intersect_box(b);
        if inside.is_empty() {
            RectIn::Out
        } else if inside.rects.len() == 1 && inside.rects[0] == b {
            RectIn::In
        } else {
            RectIn::Part
        }
    }
}

impl From<BoxRect> for Region {
    fn from(b: BoxRect) -> Self {
        Self::from_box(b)
    }
}

// ---------------------------------------------------------------------------
// Band sweep
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
enum SetOp {
    Union,
    Intersect,
    Subtract,
}

impl SetOp {
    const fn keeps(self, in_a: bool, in_b: bool) -> bool {
        match self {
            Self::Union => in_a || in_b,
            Self::Intersect => in_a && in_b,
            Self::Subtract => in_a && !in_b,
        }
    }
}

fn same_band(a: &BoxRect, b: &BoxRect) -> bool {
    a.y1 == b.y1 && a.y2 == b.y2
}

/// Sweeps every horizontal edge of both operands and emits one output band
/// per edge interval.
fn combine(a: &Region, b: &Region, op: SetOp) -> Region {
    let a_bands: Vec<&[BoxRect]> = a.rects.chunk_by(same_band).collect();
    let b_bands: Vec<&[BoxRect]> = b.rects.chunk_by(same_band).collect();

    let mut edges: Vec<i32> = Vec::with_capacity(2 * (a_bands.len() + b_bands.len()));
    for band in a_bands.iter().chain(b_bands.iter()) {
        edges.push(band[0].y1);
        edges.push(band[0].y2);
    }
    edges.sort_unstable();
    edges.dedup();

    let mut builder = BandBuilder::default();
    let mut spans: Vec<(i32, i32)> = Vec::new();
    let mut xs: Vec<i32> = Vec::new();
    let (mut ia, mut ib) = (0, 0);
    for pair in edges.windows(2) {
        let (top, bottom) = (pair[0], pair[1]);
        let sa = band_at(&a_bands, &mut ia, top);
        let sb = band_at(&b_bands, &mut ib, top);
        spans.clear();
        merge_spans(sa, sb, op, &mut xs, &mut spans);
        builder.push_band(top, bottom, &spans);
    }
    builder.finish()
}

/// Returns the band of `bands` covering row `y`, advancing `cursor`
/// monotonically.
fn band_at<'a>(bands: &[&'a [BoxRect]], cursor: &mut usize, y: i32) -> &'a [BoxRect] {
    while *cursor < bands.len() && bands[*cursor][0].y2 <= y {
        *cursor += 1;
    }
    match bands.get(*cursor) {
        Some(band) if band[0].y1 <= y => band,
        _ => &[],
    }
}

fn merge_spans(
    sa: &[BoxRect],
    sb: &[BoxRect],
    op: SetOp,
    xs: &mut Vec<i32>,
    out: &mut Vec<(i32, i32)>,
) {
    xs.clear();
    for r in sa.iter().chain(sb) {
        xs.push(r.x1);
        xs.push(r.x2);
    }
    xs.sort_unstable();
    xs.dedup();

    let (mut ia, mut ib) = (0, 0);
    for pair in xs.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        while ia < sa.len() && sa[ia].x2 <= left {
            ia += 1;
        }
        while ib < sb.len() && sb[ib].x2 <= left {
            ib += 1;
        }
        let in_a = ia < sa.len() && sa[ia].x1 <= left;
        let in_b = ib < sb.len() && sb[ib].x1 <= left;
        if !op.keeps(in_a, in_b) {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.1 == left => last.1 = right,
            _ => out.push((left, right)),
        }
    }
}

#[derive(Debug, Default)]
struct BandBuilder {
    rects: Vec<BoxRect>,
    last_band: Option<usize>,
}

impl BandBuilder {
    fn push_band(&mut self, top: i32, bottom: i32, spans: &[(i32, i32)]) {
        if spans.is_empty() {
            return;
        }
        if let Some(start) = self.last_band {
            let prev = &self.rects[start..];
            let coalesce = prev[0].y2 == top
                && prev.len() == spans.len()
                && prev
                    .iter()
                    .zip(spans)
                    .all(|(r, &(x1, x2))| r.x1 == x1 && r.x2 == x2);
            if coalesce {
                for r in &mut self.rects[start..] {
                    r.y2 = bottom;
                }
                return;
            }
        }
        self.last_band = Some(self.rects.len());
        self.rects
            .extend(spans.iter().map(|&(x1, x2)| BoxRect::new(x1, top, x2, bottom)));
    }

    fn finish(self) -> Region {
        let (Some(first), Some(last)) = (self.rects.first(), self.rects.last()) else {
            return Region::new();
        };
        let mut extents = BoxRect::new(first.x1, first.y1, first.x2, last.y2);
        for r in &self.rects {
            extents.x1 = extents.x1.min(r.x1);
            extents.x2 = extents.x2.max(r.x2);
        }
        Region {
            rects: self.rects,
            extents,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x1: i32, y1: i32, x2: i32, y2: i32) -> Region {
        Region::from_box(BoxRect::new(x1, y1, x2, y2))
    }

    #[test]
    fn empty_box_gives_empty_region() {
        assert!(boxed(5, 5, 5, 10).is_empty());
        assert!(boxed(5, 5, 4, 10).is_empty());
        assert_eq!(Region::new().extents(), BoxRect::EMPTY);
    }

    #[test]
    fn union_of_adjacent_boxes_is_one_box() {
        let left = boxed(0, 0, 10, 10);
        let right = boxed(10, 0, 20, 10);
        let below = boxed(0, 10, 20, 20);
        let all = left.union(&right).union(&below);
        assert_eq!(all.rects(), &[BoxRect::new(0, 0, 20, 20)]);
        assert_eq!(all, boxed(0, 0, 20, 20));
    }

    #[test]
    fn subtract_leaves_frame() {
        let outer = boxed(0, 0, 30, 30);
        let inner = boxed(10, 10, 20, 20);
        let frame = outer.subtract(&inner);
        assert_eq!(frame.area(), 900 - 100);
        assert_eq!(frame.rects().len(), 4);
        assert!(!frame.contains_point(15, 15));
        assert!(frame.contains_point(5, 15));
        assert_eq!(frame.extents(), BoxRect::new(0, 0, 30, 30));
        assert_eq!(frame.union(&inner), outer);
    }

    #[test]
    fn intersect_overlapping_boxes() {
        let a = boxed(0, 0, 20, 20);
        let b = boxed(10, 5, 30, 15);
        assert_eq!(a.intersect(&b), boxed(10, 5, 20, 15));
        assert!(a.intersect(&boxed(20, 0, 30, 20)).is_empty());
    }

    #[test]
    fn canonical_form_is_order_independent() {
        let a = Region::from_rects([
            BoxRect::new(0, 0, 10, 10),
            BoxRect::new(5, 5, 15, 15),
            BoxRect::new(20, 0, 25, 5),
        ]);
        let b = Region::from_rects([
            BoxRect::new(20, 0, 25, 5),
            BoxRect::new(5, 5, 15, 15),
            BoxRect::new(0, 0, 10, 10),
        ]);
        assert_eq!(a, b);
        assert_eq!(a.area(), 100 + 100 - 25 + 25);
    }

    #[test]
    fn translate_moves_rects_and_extents() {
        let mut r = boxed(0, 0, 10, 10).union(&boxed(20, 20, 30, 30));
        r.translate(5, -5);
        assert_eq!(r.extents(), BoxRect::new(5, -5, 35, 25));
        assert!(r.contains_point(5, -5));
        assert!(!r.contains_point(4, -5));
        assert_eq!(r.translated(-5, 5), boxed(0, 0, 10, 10).union(&boxed(20, 20, 30, 30)));
    }

    #[test]
    fn translate_past_the_edge_drops_flattened_boxes() {
        let mut r = boxed(0, 0, 10, 10).union(&boxed(20, 20, 30, 30));
        r.translate(i32::MAX - 15, 0);
        assert_eq!(r, boxed(i32::MAX - 15, 0, i32::MAX - 5, 10));
        assert_eq!(r.extents(), BoxRect::new(i32::MAX - 15, 0, i32::MAX - 5, 10));

        let mut gone = boxed(10, 10, 20, 20);
        gone.translate(i32::MAX, 0);
        assert!(gone.is_empty());
        assert_eq!(gone, Region::new());
    }

    #[test]
    fn rect_in_classification() {
        let r = boxed(0, 0, 10, 10).union(&boxed(10, 0, 20, 5));
        assert_eq!(r.rect_in(BoxRect::new(2, 2, 8, 8)), RectIn::In);
        assert_eq!(r.rect_in(BoxRect::new(5, 0, 15, 5)), RectIn::In);
        assert_eq!(r.rect_in(BoxRect::new(5, 0, 15, 10)), RectIn::Part);
        assert_eq!(r.rect_in(BoxRect::new(12, 6, 20, 10)), RectIn::Out);
        assert_eq!(r.rect_in(BoxRect::new(40, 40, 50, 50)), RectIn::Out);
    }

    #[test]
    fn subtract_then_union_restores() {
        let a = boxed(0, 0, 50, 40);
        let b = boxed(10, 30, 70, 90);
        let a_minus_b = a.subtract(&b);
        assert!(a_minus_b.intersect(&b).is_empty());
        assert_eq!(a_minus_b.union(&a.intersect(&b)), a);
    }

    #[test]
    fn bounding_rect_matches_extents() {
        let r = boxed(-3, 4, 7, 9);
        assert_eq!(r.bounding_rect(), Rect::new(-3.0, 4.0, 7.0, 9.0));
    }

    #[test]
    fn from_origin_size_saturates() {
        let b = BoxRect::from_origin_size(i32::MAX - 5, 0, 100, 10);
        assert_eq!(b.x2, i32::MAX);
        assert_eq!(b.width(), 5);
    }
}
