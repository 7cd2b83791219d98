//! Vector and matrix element types stored by datums.

use std::ops::{Index, IndexMut};

/// Four-component single-precision vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec4(pub [f32; 4]);

impl Vec4 {
    /// All components zero.
    pub const ZERO: Vec4 = Vec4([0.0; 4]);

    /// Build a vector from its components.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self([x, y, z, w])
    }

    /// Vector with every component set to `v`.
    pub const fn splat(v: f32) -> Self {
        Self([v; 4])
    }

    /// First component.
    pub fn x(&self) -> f32 {
        self.0[0]
    }

    /// Second component.
    pub fn y(&self) -> f32 {
        self.0[1]
    }

    /// Third component.
    pub fn z(&self) -> f32 {
        self.0[2]
    }

    /// Fourth component.
    pub fn w(&self) -> f32 {
        self.0[3]
    }
}

impl From<[f32; 4]> for Vec4 {
    fn from(v: [f32; 4]) -> Self {
        Self(v)
    }
}

impl Index<usize> for Vec4 {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        &self.0[i]
    }
}

impl IndexMut<usize> for Vec4 {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.0[i]
    }
}

/// 4x4 single-precision matrix stored as four [`Vec4`] groups.
///
/// Group `i` is the `i`-th parenthesized group of the textual form, so a
/// matrix round-trips through text without any transposition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mat4(pub [Vec4; 4]);

impl Mat4 {
    /// All elements zero.
    pub const ZERO: Mat4 = Mat4([Vec4::ZERO; 4]);

    /// The identity matrix.
    pub const IDENTITY: Mat4 = Mat4([
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    ]);

    /// Build a matrix from its four groups.
    pub const fn new(groups: [Vec4; 4]) -> Self {
        Self(groups)
    }

    /// Matrix with `v` on the diagonal and zero elsewhere.
    pub fn diagonal(v: f32) -> Self {
        let mut m = Self::ZERO;
        for i in 0..4 {
            m.0[i].0[i] = v;
        }
        m
    }
}

impl From<[[f32; 4]; 4]> for Mat4 {
    fn from(m: [[f32; 4]; 4]) -> Self {
        Self(m.map(Vec4))
    }
}

impl Index<usize> for Mat4 {
    type Output = Vec4;

    fn index(&self, i: usize) -> &Vec4 {
        &self.0[i]
    }
}

impl IndexMut<usize> for Mat4 {
    fn index_mut(&mut self, i: usize) -> &mut Vec4 {
        &mut self.0[i]
    }
}
