use std::marker::PhantomData;

use crate::Point;

pub trait BBoxFormat: std::fmt::Debug {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

/// X-y-width-height format, contains coordinates of the center of bbox and width-height
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Xywh;
impl BBoxFormat for Xywh {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BBox<F: BBoxFormat>([i32; 4], PhantomData<F>);

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        BBox([left, top, right, bottom], Default::default())
    }

    #[inline(always)]
    pub fn left(&self) -> i32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> i32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> i32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> i32 {
        self.0[3]
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.right().saturating_sub(self.left())
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom().saturating_sub(self.top())
    }

    /// Zero or negative area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    #[inline]
    pub fn center(&self) -> Point {
        let mid = |a: i32, b: i32| ((a as i64 + b as i64).div_euclid(2)) as i32;

        Point::new(mid(self.left(), self.right()), mid(self.top(), self.bottom()))
    }

    /// Intersects the box with a `width` x `height` frame anchored at the origin.
    pub fn clamp(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width.min(i32::MAX as u32) as i32, height.min(i32::MAX as u32) as i32);

        BBox::ltrb(
            self.left().clamp(0, w),
            self.top().clamp(0, h),
            self.right().clamp(0, w),
            self.bottom().clamp(0, h),
        )
    }
}

impl BBox<Xywh> {
    #[inline]
    pub fn xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        BBox([x, y, w, h], Default::default())
    }

    #[inline(always)]
    pub fn cx(&self) -> i32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn cy(&self) -> i32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn width(&self) -> i32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> i32 {
        self.0[3]
    }

    #[inline]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }
}

impl<'a> From<&'a BBox<Xywh>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Xywh>) -> Self {
        let left = v.cx().saturating_sub(v.width() / 2);
        let top = v.cy().saturating_sub(v.height() / 2);

        BBox::ltrb(
            left,
            top,
            left.saturating_add(v.width()),
            top.saturating_add(v.height()),
        )
    }
}
