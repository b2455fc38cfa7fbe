//! Built-in [`Easing`] implementations.

use crate::animation::{Easing, ZeroToOne};

/// An [`Easing`] function that produces a steady, linear transition.
#[derive(Clone, Copy, Debug)]
pub struct Linear;

impl Easing for Linear {
    fn ease(&self, progress: ZeroToOne) -> f32 {
        *progress
    }
}

macro_rules! declare_easing_function {
    ($name:ident, $description:literal, $closure:expr) => {
        /// An [`Easing`] function that eases
        #[doc = $description]
        #[doc = "."]
        #[derive(Clone, Copy, Debug)]
        pub struct $name;

        impl Easing for $name {
            fn ease(&self, progress: ZeroToOne) -> f32 {
                let closure: fn(f32) -> f32 = $closure;
                closure(*progress)
            }
        }
    };
}

declare_easing_function!(EaseInQuadratic, "in quadratically", |percent| percent * percent);

declare_easing_function!(
    EaseOutQuadratic,
    "out quadratically",
    |percent| 1. - (1. - percent) * (1. - percent)
);

declare_easing_function!(
    EaseInOutQuadratic,
    "in and out quadratically",
    |percent| {
        if percent < 0.5 {
            2. * percent * percent
        } else {
            1. - (-2. * percent + 2.).powi(2) / 2.
        }
    }
);

/// A cubic bézier easing curve anchored at (0, 0) and (1, 1), in the shape
/// used by CSS timing functions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl CubicBezier {
    /// The standard CSS `ease` timing curve, `cubic-bezier(0.25, 0.1, 0.25,
    /// 1.0)`.
    pub const EASE: Self = Self::new(0.25, 0.1, 0.25, 1.0);

    /// Returns a curve with control points (`x1`, `y1`) and (`x2`, `y2`).
    #[must_use]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn sample(p1: f32, p2: f32, t: f32) -> f32 {
        // Cubic bézier with fixed anchors at 0 and 1.
        let one_minus = 1. - t;
        3. * one_minus * one_minus * t * p1 + 3. * one_minus * t * t * p2 + t * t * t
    }

    fn solve_t_for_x(&self, x: f32) -> f32 {
        let mut low = 0.;
        let mut high = 1.;
        let mut t = x;
        for _ in 0..32 {
            let sampled = Self::sample(self.x1, self.x2, t);
            if (sampled - x).abs() < 1e-5 {
                break;
            }
            if sampled < x {
                low = t;
            } else {
                high = t;
            }
            t = (low + high) / 2.;
        }
        t
    }
}

impl Easing for CubicBezier {
    fn ease(&self, progress: ZeroToOne) -> f32 {
        let t = self.solve_t_for_x(*progress);
        Self::sample(self.y1, self.y2, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed() {
        let curves: [&dyn Easing; 5] = [
            &Linear,
            &EaseInQuadratic,
            &EaseOutQuadratic,
            &EaseInOutQuadratic,
            &CubicBezier::EASE,
        ];
        for curve in curves {
            assert!((curve.ease(ZeroToOne::ZERO)).abs() < 1e-4, "{curve:?}");
            assert!((curve.ease(ZeroToOne::ONE) - 1.).abs() < 1e-4, "{curve:?}");
        }
    }

    #[test]
    fn ease_accelerates_then_settles() {
        // CSS `ease` front-loads most of its motion.
        let early = CubicBezier::EASE.ease(ZeroToOne::new(0.25));
        let late = CubicBezier::EASE.ease(ZeroToOne::new(0.75));
        assert!(early > 0.25);
        assert!(late > 0.9);
    }
}
