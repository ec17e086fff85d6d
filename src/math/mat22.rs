use core::ops::{Add, Mul};

use crate::math::Vec2;

/// 2×2 matrix stored as two column vectors.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Mat22 {
    pub col1: Vec2,
    pub col2: Vec2,
}

impl Mat22 {
    #[inline]
    pub const fn new(col1: Vec2, col2: Vec2) -> Self {
        Self { col1, col2 }
    }

    /// Rotation by `angle` radians: `Mat22::from_angle(a) * v` rotates `v`
    /// counter-clockwise by `a`.
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(Vec2::new(c, s), Vec2::new(-s, c))
    }

    #[inline]
    pub fn transpose(self) -> Self {
        Self::new(
            Vec2::new(self.col1.x, self.col2.x),
            Vec2::new(self.col1.y, self.col2.y),
        )
    }

    /// Inverse. The matrix must be non-singular; feeding a singular matrix
    /// here is a programmer error.
    #[inline]
    pub fn invert(self) -> Self {
        let (a, c) = (self.col1.x, self.col2.x);
        let (b, d) = (self.col1.y, self.col2.y);

        let det = a * d - b * c;
        debug_assert!(det != 0.0, "Mat22::invert: singular matrix");
        let inv_det = 1.0 / det;

        Self::new(
            Vec2::new(inv_det * d, -inv_det * b),
            Vec2::new(-inv_det * c, inv_det * a),
        )
    }

    #[inline]
    pub fn abs(self) -> Self {
        Self::new(self.col1.abs(), self.col2.abs())
    }
}

impl Mul<Vec2> for Mat22 {
    type Output = Vec2;
    #[inline]
    fn mul(self, v: Vec2) -> Vec2 {
        self.col1 * v.x + self.col2 * v.y
    }
}

impl Mul for Mat22 {
    type Output = Mat22;
    #[inline]
    fn mul(self, rhs: Mat22) -> Mat22 {
        Mat22::new(self * rhs.col1, self * rhs.col2)
    }
}

impl Add for Mat22 {
    type Output = Mat22;
    #[inline]
    fn add(self, rhs: Mat22) -> Mat22 {
        Mat22::new(self.col1 + rhs.col1, self.col2 + rhs.col2)
    }
}
