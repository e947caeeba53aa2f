use crate::pose::Position;
use std::ops::Sub;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    x: f32,
    y: f32,
}

impl Vector {
    /// Planar vector; depth is ignored even when the position carries one.
    pub fn planar(position: Position) -> Self {
        Self {
            x: position.x,
            y: position.y,
        }
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn norm(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).norm()
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Angle in degrees at vertex `b` between the rays `b -> a` and `b -> c`.
///
/// The cosine is clamped to [-1, 1] before inversion. A degenerate ray has no
/// direction, so the angle collapses to zero.
pub fn joint_angle(a: Position, b: Position, c: Position) -> f32 {
    let (a, b, c) = (Vector::planar(a), Vector::planar(b), Vector::planar(c));
    let ba = a - b;
    let bc = c - b;
    let denominator = ba.norm() * bc.norm();
    if denominator == 0.0 {
        return 0.0;
    }
    (ba.dot(bc) / denominator).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Signed vertical offset of `a` relative to `b`; positive when `a` is lower
/// in image space.
#[inline]
pub fn vertical_offset(a: Position, b: Position) -> f32 {
    a.y - b.y
}

#[inline]
pub fn horizontal_offset(a: Position, b: Position) -> f32 {
    (a.x - b.x).abs()
}

/// Absolute difference between the lengths of the segments `a -> b` and
/// `b -> c`.
pub fn segment_asymmetry(a: Position, b: Position, c: Position) -> f32 {
    let (a, b, c) = (Vector::planar(a), Vector::planar(b), Vector::planar(c));
    (a.distance(b) - b.distance(c)).abs()
}

#[inline]
pub fn depth_offset(a_z: f32, b_z: f32) -> f32 {
    a_z - b_z
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn p(x: f32, y: f32) -> Position {
        Position::new(x, y).unwrap()
    }

    mod joint_angle_tests {
        use super::*;

        #[test]
        fn right_angle() {
            assert_approx_eq!(
                joint_angle(p(0.0, 1.0), p(0.0, 0.0), p(1.0, 0.0)),
                90.0,
                1e-3
            );
        }

        #[test]
        fn straight_line() {
            assert_approx_eq!(
                joint_angle(p(0.0, 0.0), p(0.0, 50.0), p(0.0, 100.0)),
                180.0,
                1e-3
            );
        }

        #[test]
        fn collinear_overshoot_is_clamped() {
            let angle = joint_angle(p(0.1, 0.1), p(0.2, 0.2), p(0.3, 0.3));
            assert!(!angle.is_nan());
            assert_approx_eq!(angle, 180.0, 0.1);
        }

        #[test]
        fn degenerate_ray() {
            assert_eq!(joint_angle(p(1.0, 1.0), p(1.0, 1.0), p(2.0, 3.0)), 0.0);
        }

        #[test]
        fn depth_is_ignored() {
            let a = Position::with_depth(0.0, 1.0, 40.0).unwrap();
            assert_approx_eq!(joint_angle(a, p(0.0, 0.0), p(1.0, 0.0)), 90.0, 1e-3);
        }
    }

    mod offset_tests {
        use super::*;

        #[test]
        fn vertical_is_signed() {
            assert_eq!(vertical_offset(p(0.0, 130.0), p(0.0, 100.0)), 30.0);
            assert_eq!(vertical_offset(p(0.0, 70.0), p(0.0, 100.0)), -30.0);
        }

        #[test]
        fn horizontal_is_absolute() {
            assert_eq!(horizontal_offset(p(10.0, 0.0), p(25.0, 0.0)), 15.0);
        }

        #[test]
        fn segment_asymmetry_of_unequal_bones() {
            assert_approx_eq!(
                segment_asymmetry(p(0.0, 0.0), p(3.0, 4.0), p(3.0, 14.0)),
                5.0,
                1e-4
            );
        }
    }
}
