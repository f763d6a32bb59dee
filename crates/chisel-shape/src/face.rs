use chisel_geom::Vec3;
use serde::{Deserialize, Serialize};

/// Lattice axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One of the six cell faces. The discriminant is the bit index used by `FaceFlags`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a face index `[0..6)` back into a `Face` value.
    /// Falls back to `PosY` for out-of-range indices.
    #[inline]
    pub fn from_index(i: usize) -> Face {
        match i {
            0 => Face::PosY,
            1 => Face::NegY,
            2 => Face::PosX,
            3 => Face::NegX,
            4 => Face::PosZ,
            5 => Face::NegZ,
            _ => Face::PosY,
        }
    }

    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            Face::PosX | Face::NegX => Axis::X,
            Face::PosY | Face::NegY => Axis::Y,
            Face::PosZ | Face::NegZ => Axis::Z,
        }
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Face::PosX | Face::PosY | Face::PosZ)
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    /// Returns the unit-normal vector for this face.
    #[inline]
    pub fn normal(self) -> Vec3 {
        let (dx, dy, dz) = self.delta();
        Vec3::new(dx as f32, dy as f32, dz as f32)
    }

    /// The face this one becomes after `turns` quarter turns about +Y
    /// (+X goes to -Z, -Z to -X, -X to +Z, +Z to +X).
    #[inline]
    pub fn rotated_y(self, turns: u8) -> Face {
        let mut f = self;
        for _ in 0..(turns % 4) {
            f = match f {
                Face::PosX => Face::NegZ,
                Face::NegZ => Face::NegX,
                Face::NegX => Face::PosZ,
                Face::PosZ => Face::PosX,
                vertical => vertical,
            };
        }
        f
    }

    /// The face this one becomes after mirroring across `axis`.
    #[inline]
    pub fn flipped(self, axis: Axis) -> Face {
        if self.axis() == axis { self.opposite() } else { self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_quarter_turns_are_identity() {
        for f in Face::ALL {
            assert_eq!(f.rotated_y(4), f);
            assert_eq!(f.rotated_y(1).rotated_y(3), f);
        }
        assert_eq!(Face::PosY.rotated_y(1), Face::PosY);
    }

    #[test]
    fn flip_swaps_only_the_axis_pair() {
        assert_eq!(Face::PosX.flipped(Axis::X), Face::NegX);
        assert_eq!(Face::PosX.flipped(Axis::Y), Face::PosX);
        assert_eq!(Face::NegY.flipped(Axis::Y), Face::PosY);
    }

    #[test]
    fn index_roundtrip() {
        for f in Face::ALL {
            assert_eq!(Face::from_index(f.index()), f);
        }
    }
}
