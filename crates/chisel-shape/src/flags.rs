use serde::{Deserialize, Serialize};

use crate::face::{Axis, Face};

/// One bit per cell face, indexed by `Face::index`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceFlags(u8);

impl FaceFlags {
    pub const NONE: FaceFlags = FaceFlags(0);
    pub const ALL: FaceFlags = FaceFlags(0b11_1111);

    /// Keeps only the six face bits.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        FaceFlags(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn has(self, face: Face) -> bool {
        (self.0 >> face.index()) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, face: Face, on: bool) {
        if on {
            self.0 |= 1 << face.index();
        } else {
            self.0 &= !(1 << face.index());
        }
    }

    #[inline]
    pub fn with(mut self, face: Face) -> Self {
        self.set(face, true);
        self
    }

    pub fn iter(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |f| self.has(*f))
    }

    /// Flags after the cell turned `turns` quarter turns about +Y.
    pub fn rotated_y(self, turns: u8) -> Self {
        let mut out = FaceFlags::NONE;
        for f in self.iter() {
            out.set(f.rotated_y(turns), true);
        }
        out
    }

    /// Flags after the cell was mirrored across `axis`.
    pub fn flipped(self, axis: Axis) -> Self {
        let mut out = FaceFlags::NONE;
        for f in self.iter() {
            out.set(f.flipped(axis), true);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_moves_east_to_north() {
        let f = FaceFlags::NONE.with(Face::PosX).with(Face::PosY);
        let r = f.rotated_y(1);
        assert!(r.has(Face::NegZ));
        assert!(r.has(Face::PosY));
        assert!(!r.has(Face::PosX));
        assert_eq!(r.rotated_y(3), f);
    }

    #[test]
    fn from_bits_masks_upper_bits() {
        assert_eq!(FaceFlags::from_bits(0xFF), FaceFlags::ALL);
    }
}
