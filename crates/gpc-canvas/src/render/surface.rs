//! Context/surface state: viewport, batch bracketing and the clip rectangle.
//!
//! Clip rectangles are given in caller coordinates. They pass through the
//! *device* convention (GL/window-system: origin at the viewport's bottom-left)
//! and are then mapped onto the wgpu framebuffer (origin at the top-left) when
//! the batch is encoded.

use crate::coords::{Rect, Viewport, YAxis};
use crate::paint::Color;

/// Clip rectangle in device convention, relative to the viewport.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DeviceRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl DeviceRect {
    /// Framebuffer rectangle (top-left origin) covered by this device rect.
    pub fn to_framebuffer(self, viewport: Viewport) -> Rect {
        let fb_y = viewport.y + (viewport.height as i32 - (self.y + self.h));
        Rect::new(viewport.x + self.x, fb_y, self.w, self.h)
    }
}

/// Caller clip rectangle to device convention.
///
/// Y down: `device_y = viewport_height - (y + h)`. Y up: `y` unchanged.
pub fn clip_to_device(rect: Rect, viewport_height: i32, axis: YAxis) -> DeviceRect {
    let r = rect.normalized();
    let y = match axis {
        YAxis::Down => viewport_height - (r.y + r.h),
        YAxis::Up => r.y,
    };
    DeviceRect { x: r.x, y, w: r.w, h: r.h }
}

/// Scissor rectangle in framebuffer pixels, ready for `set_scissor_rect`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Scissor {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Scissor {
    fn from_rect(r: Rect) -> Self {
        Self {
            x: r.x as u32,
            y: r.y as u32,
            width: r.w as u32,
            height: r.h as u32,
        }
    }
}

/// Effective scissor for one draw: viewport ∩ clip ∩ target.
///
/// `None` when nothing remains visible.
pub fn scissor_for(
    clip: Option<Rect>,
    viewport: Viewport,
    axis: YAxis,
    target: (u32, u32),
) -> Option<Scissor> {
    let visible = viewport.clamped_to(target.0, target.1)?;
    let mut area = Rect::new(visible.x, visible.y, visible.width as i32, visible.height as i32);

    if let Some(clip) = clip {
        let fb = clip_to_device(clip, viewport.height as i32, axis).to_framebuffer(viewport);
        area = area.intersect(fb)?;
    }

    Some(Scissor::from_rect(area))
}

/// Per-canvas context state.
#[derive(Debug, Clone)]
pub(crate) struct SurfaceState {
    axis: YAxis,
    viewport: Viewport,
    /// Viewport captured by `enter`; every draw of the batch uses it.
    batch_viewport: Viewport,
    clip: Option<Rect>,
    text_color: Color,
    in_context: bool,
}

impl SurfaceState {
    pub fn new(axis: YAxis) -> Self {
        Self {
            axis,
            viewport: Viewport::default(),
            batch_viewport: Viewport::default(),
            clip: None,
            text_color: Color::BLACK,
            in_context: false,
        }
    }

    #[inline]
    pub fn axis(&self) -> YAxis {
        self.axis
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn batch_viewport(&self) -> Viewport {
        self.batch_viewport
    }

    #[inline]
    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    #[inline]
    pub fn text_color(&self) -> Color {
        self.text_color
    }

    #[inline]
    pub fn in_context(&self) -> bool {
        self.in_context
    }

    pub fn define_viewport(&mut self, viewport: Viewport) {
        if !viewport.is_valid() {
            log::warn!("viewport {viewport:?} is empty or has a negative origin");
        }
        self.viewport = viewport;
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    pub fn enter(&mut self) {
        debug_assert!(!self.in_context, "enter_context() while already inside a context");
        self.in_context = true;
        self.batch_viewport = self.viewport;
    }

    pub fn leave(&mut self) {
        debug_assert!(self.in_context, "leave_context() without enter_context()");
        self.in_context = false;
    }

    pub fn set_clip(&mut self, rect: Rect) {
        debug_assert!(self.clip.is_none(), "clipping rectangle set twice");
        self.clip = Some(rect);
    }

    pub fn cancel_clip(&mut self) {
        debug_assert!(self.clip.is_some(), "cancel_clipping() without an active clip");
        self.clip = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport::new(0, 0, 640, 480);

    // ── device convention ─────────────────────────────────────────────────

    #[test]
    fn y_down_clip_is_flipped_to_device() {
        let d = clip_to_device(Rect::new(10, 20, 100, 50), 480, YAxis::Down);
        assert_eq!(d, DeviceRect { x: 10, y: 480 - (20 + 50), w: 100, h: 50 });
    }

    #[test]
    fn y_up_clip_passes_through() {
        let d = clip_to_device(Rect::new(10, 20, 100, 50), 480, YAxis::Up);
        assert_eq!(d, DeviceRect { x: 10, y: 20, w: 100, h: 50 });
    }

    #[test]
    fn both_conventions_agree_on_screen_for_the_same_logical_rect() {
        // 50 px band starting 20 px from the top (Y down) is the band starting
        // 410 px from the bottom (Y up).
        let down = clip_to_device(Rect::new(10, 20, 100, 50), 480, YAxis::Down);
        let up = clip_to_device(Rect::new(10, 410, 100, 50), 480, YAxis::Up);
        assert_eq!(down, up);
        assert_eq!(down.to_framebuffer(VP), Rect::new(10, 20, 100, 50));
    }

    // ── framebuffer mapping ───────────────────────────────────────────────

    #[test]
    fn framebuffer_mapping_respects_viewport_origin() {
        let vp = Viewport::new(100, 50, 200, 100);
        let d = DeviceRect { x: 0, y: 0, w: 10, h: 10 };
        // Device bottom-left of the viewport is framebuffer (100, 140).
        assert_eq!(d.to_framebuffer(vp), Rect::new(100, 140, 10, 10));
    }

    // ── scissor ───────────────────────────────────────────────────────────

    #[test]
    fn no_clip_scissors_to_the_visible_viewport() {
        let s = scissor_for(None, Viewport::new(600, 0, 100, 100), YAxis::Down, (640, 480));
        assert_eq!(s, Some(Scissor { x: 600, y: 0, width: 40, height: 100 }));
    }

    #[test]
    fn clip_is_intersected_with_the_viewport() {
        let clip = Rect::new(-10, -10, 30, 30);
        let s = scissor_for(Some(clip), VP, YAxis::Down, (640, 480));
        assert_eq!(s, Some(Scissor { x: 0, y: 0, width: 20, height: 20 }));

        let s = scissor_for(Some(clip), VP, YAxis::Up, (640, 480));
        assert_eq!(s, Some(Scissor { x: 0, y: 460, width: 20, height: 20 }));
    }

    #[test]
    fn clip_outside_the_viewport_suppresses_drawing() {
        let clip = Rect::new(700, 10, 20, 20);
        assert_eq!(scissor_for(Some(clip), VP, YAxis::Down, (640, 480)), None);
    }

    // ── state ─────────────────────────────────────────────────────────────

    #[test]
    fn clip_set_and_cancel() {
        let mut s = SurfaceState::new(YAxis::Down);
        s.define_viewport(VP);
        s.set_clip(Rect::new(1, 2, 3, 4));
        assert_eq!(s.clip(), Some(Rect::new(1, 2, 3, 4)));
        s.cancel_clip();
        assert_eq!(s.clip(), None);
    }

    #[test]
    fn viewport_is_fixed_for_the_batch() {
        let mut s = SurfaceState::new(YAxis::Down);
        s.define_viewport(VP);
        s.enter();
        s.define_viewport(Viewport::new(0, 0, 32, 32));

        assert_eq!(s.batch_viewport(), VP);
        assert_eq!(s.viewport(), Viewport::new(0, 0, 32, 32));

        s.leave();
        s.enter();
        assert_eq!(s.batch_viewport(), Viewport::new(0, 0, 32, 32));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "set twice")]
    fn double_clip_is_caught_in_debug() {
        let mut s = SurfaceState::new(YAxis::Up);
        s.set_clip(Rect::new(0, 0, 1, 1));
        s.set_clip(Rect::new(0, 0, 1, 1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already inside")]
    fn nested_enter_is_caught_in_debug() {
        let mut s = SurfaceState::new(YAxis::Down);
        s.enter();
        s.enter();
    }
}
