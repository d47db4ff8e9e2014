pub use kurbo::{Point, Vec2};

/// Logical milliseconds advanced per scheduled tick.
///
/// The accumulator is a tick count, not a wall-clock reading: real frame
/// timing jitter never changes animation speed.
pub const TICK_MILLIS: f64 = 16.0;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    pub fn next(self) -> Tick {
        Tick(self.0.saturating_add(1))
    }

    /// Logical time at this tick, in milliseconds.
    pub fn millis(self) -> f64 {
        (self.0 as f64) * TICK_MILLIS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-area viewport; no drawing surface can be acquired for it.
    pub fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn min_dim(self) -> u32 {
        self.width.min(self.height)
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_millis_uses_fixed_step() {
        assert_eq!(Tick::ZERO.millis(), 0.0);
        assert_eq!(Tick(1).millis(), TICK_MILLIS);
        assert_eq!(Tick(100).millis(), 1600.0);
    }

    #[test]
    fn tick_next_is_monotonic() {
        let mut t = Tick::ZERO;
        for i in 1..=10 {
            t = t.next();
            assert_eq!(t.0, i);
        }
        assert_eq!(Tick(u64::MAX).next(), Tick(u64::MAX));
    }

    #[test]
    fn viewport_degeneracy() {
        assert!(Viewport::new(0, 100).is_degenerate());
        assert!(Viewport::new(100, 0).is_degenerate());
        assert!(!Viewport::new(1, 1).is_degenerate());
        assert_eq!(Viewport::new(320, 180).min_dim(), 180);
    }

    #[test]
    fn premul_from_straight_halves_channels_at_half_alpha() {
        let c = Rgba8Premul::from_straight_rgba(255, 0, 255, 128);
        assert_eq!(c.a, 128);
        assert_eq!(c.r, 128);
        assert_eq!(c.g, 0);
        assert_eq!(c.b, 128);
    }
}
