//! Interpolation of animated values

/// A value a timing animation can move between two endpoints
pub trait Interpolate: Clone {
    /// Value at progress `t`, where 0 is `self` and 1 is `other`
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        // Exact at both ends so finished animations land on their targets
        if t <= 0.0 {
            *self
        } else if t >= 1.0 {
            *other
        } else {
            self + (other - self) * t
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_interpolation() {
        assert!((0.0_f32.lerp(&1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((10.0_f32.lerp(&20.0, 0.25) - 12.5).abs() < 1e-6);
    }

    #[test]
    fn test_float_interpolation_endpoints() {
        assert_eq!(100.0_f32.lerp(&-100.0, 0.0), 100.0);
        assert_eq!(0.1_f32.lerp(&0.7, 1.0), 0.7);
    }
}
