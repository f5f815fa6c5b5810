/// Drawing viewport in framebuffer pixels.
///
/// `x`/`y` locate the viewport's top-left corner inside the render target
/// (wgpu framebuffer convention). Caller coordinates are relative to the
/// viewport regardless of the canvas Y-axis convention.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0 && self.x >= 0 && self.y >= 0
    }

    /// Restricts the viewport to a `target_width` × `target_height` attachment.
    ///
    /// Returns `None` when nothing of the viewport lies on the target.
    pub fn clamped_to(self, target_width: u32, target_height: u32) -> Option<Viewport> {
        let x0 = self.x.max(0) as i64;
        let y0 = self.y.max(0) as i64;
        let x1 = (self.x as i64 + self.width as i64).min(target_width as i64);
        let y1 = (self.y as i64 + self.height as i64).min(target_height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Viewport::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_inside_target_is_identity() {
        let vp = Viewport::new(10, 20, 100, 50);
        assert_eq!(vp.clamped_to(640, 480), Some(vp));
    }

    #[test]
    fn clamped_cuts_overhang() {
        let vp = Viewport::new(600, 400, 100, 100);
        assert_eq!(vp.clamped_to(640, 480), Some(Viewport::new(600, 400, 40, 80)));
    }

    #[test]
    fn clamped_off_target_is_none() {
        assert_eq!(Viewport::new(700, 0, 10, 10).clamped_to(640, 480), None);
        assert_eq!(Viewport::new(0, 0, 0, 10).clamped_to(640, 480), None);
    }
}
