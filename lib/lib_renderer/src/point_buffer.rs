use std::ops::{Bound, Range, RangeBounds};

use bytemuck::{Pod, Zeroable};
use lib_gpu::{Buffer, BufferInitDescriptor, BufferUsages, DeviceExt};
use lib_math::Vec3;

use crate::RendererContext;

// Points are uploaded once at creation and never rewritten.
const POINT_BUFFER_USAGES: BufferUsages = BufferUsages::VERTEX;

/// One point of the cloud as laid out in the vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Point {
    pub position: Vec3,
    pub stress: f32,
}

#[derive(Debug, Clone)]
pub struct PointBuffer {
    buf: Buffer,
}

#[derive(Debug, Clone, Copy)]
pub struct PointBufferSlice<'a> {
    pub(crate) buf: &'a Buffer,
    pub(crate) start: u64,
    pub(crate) end: u64,
}

impl PointBuffer {
    /// A buffer holding exactly `points`.
    pub fn new_init(points: &[Point], ctx: RendererContext<'_>) -> Self {
        Self {
            buf: ctx.device.create_buffer_init(&BufferInitDescriptor {
                label: Some("lib_renderer point buffer"),
                contents: bytemuck::cast_slice(points),
                usage: POINT_BUFFER_USAGES,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.size() as usize / size_of::<Point>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slice(&self, range: impl RangeBounds<usize>) -> PointBufferSlice<'_> {
        let (start, end) = resolve_range(range, self.len());

        PointBufferSlice {
            buf: &self.buf,
            start,
            end,
        }
    }
}

impl PointBufferSlice<'_> {
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub(crate) fn byte_range(&self) -> Range<u64> {
        point_bytes(self.start, self.end)
    }
}

fn point_bytes(start: u64, end: u64) -> Range<u64> {
    start * size_of::<Point>() as u64..end * size_of::<Point>() as u64
}

/// Turns `range` into `start..end` point indices, panicking when it reaches
/// past `len`.
fn resolve_range(range: impl RangeBounds<usize>, len: usize) -> (u64, u64) {
    let start = match range.start_bound() {
        Bound::Included(start) => *start as u64,
        Bound::Excluded(start) => *start as u64 + 1,
        Bound::Unbounded => 0,
    };

    let end = match range.end_bound() {
        Bound::Included(end) => *end as u64 + 1,
        Bound::Excluded(end) => *end as u64,
        Bound::Unbounded => len as u64,
    };

    assert!(start <= end, "point range starts after it ends");
    assert!(end <= len as u64, "point range out of bounds");

    (start, end)
}

#[cfg(test)]
mod tests {
    use std::mem::offset_of;

    use super::*;

    #[test]
    fn point_layout() {
        assert_eq!(size_of::<Point>(), 16);
        assert_eq!(offset_of!(Point, position), 0);
        assert_eq!(offset_of!(Point, stress), 12);
    }

    #[test]
    fn full_range() {
        assert_eq!(resolve_range(.., 10_000), (0, 10_000));
    }

    #[test]
    fn bounded_ranges() {
        assert_eq!(resolve_range(2..5, 10), (2, 5));
        assert_eq!(resolve_range(2..=5, 10), (2, 6));
        assert_eq!(resolve_range(..3, 10), (0, 3));
        assert_eq!(resolve_range(7.., 10), (7, 10));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn range_past_end_panics() {
        resolve_range(0..11, 10);
    }

    #[test]
    fn slice_covers_whole_points() {
        assert_eq!(point_bytes(0, 10_000), 0..160_000);
        assert_eq!(point_bytes(3, 5), 48..80);
    }

    #[test]
    fn buffer_is_vertex_only() {
        assert_eq!(POINT_BUFFER_USAGES, BufferUsages::VERTEX);
        assert!(!POINT_BUFFER_USAGES.contains(BufferUsages::COPY_DST));
    }

    #[test]
    fn points_cast_to_packed_floats() {
        let points = [
            Point {
                position: Vec3::new(1.0, 2.0, 3.0),
                stress: 0.5,
            },
            Point {
                position: Vec3::new(-1.0, 0.0, 1.0),
                stress: 0.25,
            },
        ];

        let floats: &[f32] = bytemuck::cast_slice(&points);

        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.5, -1.0, 0.0, 1.0, 0.25]);
    }
}
