/// Direction of the caller's Y axis.
///
/// Chosen once when a canvas is constructed. Every helper that turns caller
/// coordinates into device coordinates takes the convention explicitly.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum YAxis {
    /// Origin at the bottom edge, +Y up (the GL/window-system convention).
    Up,
    /// Origin at the top edge, +Y down (the usual GUI convention).
    #[default]
    Down,
}

impl YAxis {
    #[inline]
    pub const fn is_down(self) -> bool {
        matches!(self, YAxis::Down)
    }

    /// Value of the `y_axis_down` uniform.
    #[inline]
    pub const fn uniform_flag(self) -> u32 {
        match self {
            YAxis::Up => 0,
            YAxis::Down => 1,
        }
    }
}
