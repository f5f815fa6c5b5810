//! Directional stamping of greyscale images.
//!
//! A stamp draws a `length × width` mono image turned by a multiple of 90°
//! clockwise on screen around an anchor point. The image's length runs along
//! its texture X axis; texel `(0, 0)` always sits at the anchor.

use crate::coords::{Point, Rect, YAxis};

use super::mode::Rotation;

/// Screen direction the image's length axis points to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];

    /// Clockwise quarter turns on screen from [`Direction::Right`].
    #[inline]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }

    /// Quarter turns in caller space. With Y up, a clockwise turn on screen is
    /// counter-clockwise in caller coordinates.
    #[inline]
    pub const fn caller_turns(self, axis: YAxis) -> u8 {
        let q = self.quarter_turns();
        match axis {
            YAxis::Down => q,
            YAxis::Up => (4 - q) % 4,
        }
    }
}

/// Destination, texture origin and rotation of one stamp.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stamp {
    pub rect: Rect,
    /// Corner of `rect` that maps back to texel `(0, 0)`.
    pub origin: Point,
    pub rotation: Rotation,
}

impl Stamp {
    pub fn new(direction: Direction, anchor: Point, length: i32, width: i32, axis: YAxis) -> Self {
        let Point { x, y } = anchor;
        let (l, w) = (length, width);

        let (rect, sin, cos) = match direction.caller_turns(axis) {
            0 => (Rect::new(x, y, l, w), 0.0, 1.0),
            1 => (Rect::new(x - w, y, w, l), 1.0, 0.0),
            2 => (Rect::new(x - l, y - w, l, w), 0.0, -1.0),
            _ => (Rect::new(x, y - l, w, l), -1.0, 0.0),
        };

        Self {
            rect,
            origin: anchor,
            rotation: Rotation { sin, cos },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::sampling::modulate_texel;

    const AXES: [YAxis; 2] = [YAxis::Up, YAxis::Down];
    const L: i32 = 7;
    const W: i32 = 3;

    fn anchor() -> Point {
        Point::new(40, 25)
    }

    // Screen space: Y down, coordinates doubled so pixel centres are integers.
    fn to_screen2(p: [i32; 2], axis: YAxis) -> [i32; 2] {
        match axis {
            YAxis::Down => p,
            YAxis::Up => [p[0], -p[1]],
        }
    }

    fn pixel_centre2(pixel: Point, axis: YAxis) -> [i32; 2] {
        to_screen2([2 * pixel.x + 1, 2 * pixel.y + 1], axis)
    }

    fn centre2_to_pixel(c: [i32; 2], axis: YAxis) -> Point {
        let c = to_screen2(c, axis);
        Point::new((c[0] - 1) / 2, (c[1] - 1).div_euclid(2))
    }

    /// Undoes `turns` clockwise screen quarter turns about `about`.
    fn unrotate2(c: [i32; 2], about: [i32; 2], turns: u8) -> [i32; 2] {
        let (mut dx, mut dy) = (c[0] - about[0], c[1] - about[1]);
        for _ in 0..turns {
            (dx, dy) = (dy, -dx);
        }
        [about[0] + dx, about[1] + dy]
    }

    fn pixels(rect: Rect) -> impl Iterator<Item = Point> {
        (rect.y..rect.y + rect.h).flat_map(move |y| (rect.x..rect.x + rect.w).map(move |x| Point::new(x, y)))
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn right_stamp_is_the_unrotated_reference() {
        for axis in AXES {
            let s = Stamp::new(Direction::Right, anchor(), L, W, axis);
            assert_eq!(s.rect, Rect::new(40, 25, L, W));
            assert_eq!(s.rotation, Rotation::IDENTITY);
            assert_eq!(s.origin, anchor());
        }
    }

    #[test]
    fn every_stamp_keeps_its_area_and_touches_the_anchor() {
        for axis in AXES {
            for dir in Direction::ALL {
                let s = Stamp::new(dir, anchor(), L, W, axis);
                assert_eq!(s.rect.area(), (L * W) as i64, "{axis:?} {dir:?}");

                let a = anchor();
                let corners = [
                    s.rect.origin(),
                    Point::new(s.rect.x + s.rect.w, s.rect.y),
                    Point::new(s.rect.x, s.rect.y + s.rect.h),
                    s.rect.max(),
                ];
                assert!(corners.contains(&a), "{axis:?} {dir:?}");
            }
        }
    }

    #[test]
    fn down_stamp_extends_below_the_anchor_on_screen() {
        let down = Stamp::new(Direction::Down, anchor(), L, W, YAxis::Down);
        assert_eq!(down.rect, Rect::new(40 - W, 25, W, L));

        let up_axis = Stamp::new(Direction::Down, anchor(), L, W, YAxis::Up);
        assert_eq!(up_axis.rect, Rect::new(40, 25 - L, W, L));
    }

    // ── sampling ──────────────────────────────────────────────────────────

    /// Each rotated stamp samples, at every pixel, the texel the reference
    /// samples at that pixel's pre-image under the screen rotation.
    #[test]
    fn stamps_are_exact_rotations_of_the_reference() {
        let dims = (L as u32, W as u32);

        for axis in AXES {
            let reference = Stamp::new(Direction::Right, anchor(), L, W, axis);
            let anchor2 = to_screen2([2 * anchor().x, 2 * anchor().y], axis);

            for dir in Direction::ALL {
                let s = Stamp::new(dir, anchor(), L, W, axis);
                let mut seen = std::collections::HashSet::new();

                for pixel in pixels(s.rect) {
                    let texel = modulate_texel(pixel, s.origin, Point::zero(), s.rotation, dims);

                    let pre = unrotate2(pixel_centre2(pixel, axis), anchor2, dir.quarter_turns());
                    let ref_pixel = centre2_to_pixel(pre, axis);
                    assert!(reference.rect.contains(ref_pixel), "{axis:?} {dir:?} {pixel:?}");

                    let ref_texel = modulate_texel(
                        ref_pixel,
                        reference.origin,
                        Point::zero(),
                        reference.rotation,
                        dims,
                    );
                    assert_eq!(texel, ref_texel, "{axis:?} {dir:?} {pixel:?}");
                    seen.insert(texel);
                }

                assert_eq!(seen.len(), (L * W) as usize, "{axis:?} {dir:?}");
            }
        }
    }
}
