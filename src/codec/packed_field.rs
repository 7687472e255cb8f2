use std::ops::{BitAnd, BitOr, Not, Shl, Shr};

/// Integer container that can hold bit-packed sub-fields (u8, u16, u32).
pub trait PackedContainer:
    Copy
    + Eq
    + Not<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
{
}

impl<T> PackedContainer for T where
    T: Copy
        + Eq
        + Not<Output = T>
        + BitAnd<Output = T>
        + BitOr<Output = T>
        + Shl<u32, Output = T>
        + Shr<u32, Output = T>
{
}

/// Read the sub-value selected by `mask`, shifted down by `shift`.
pub fn extract_field<T: PackedContainer>(container: T, mask: T, shift: u32) -> T {
    (container & mask) >> shift
}

/// Replace the sub-value selected by `mask` with `value << shift`.
///
/// Only the bits of `mask` change. The caller validates that `value` fits.
pub fn store_field<T: PackedContainer>(container: T, mask: T, shift: u32, value: T) -> T {
    (container & !mask) | ((value << shift) & mask)
}

/// A named bit range inside a packed container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField<T> {
    pub mask: T,
    pub shift: u32,
}

impl<T: PackedContainer> BitField<T> {
    pub const fn new(mask: T, shift: u32) -> Self {
        Self { mask, shift }
    }

    pub fn get(self, container: T) -> T {
        extract_field(container, self.mask, self.shift)
    }

    pub fn set(self, container: &mut T, value: T) {
        *container = store_field(*container, self.mask, self.shift, value);
    }

    /// Whether every bit of the mask is set (single-bit flags)
    pub fn is_set(self, container: T) -> bool {
        container & self.mask == self.mask
    }

    pub fn set_flag(self, container: &mut T, set: bool) {
        if set {
            *container = *container | self.mask;
        } else {
            *container = *container & !self.mask;
        }
    }
}

/// Single-bit flag stored at `mask`.
pub const fn flag_u8(mask: u8) -> BitField<u8> {
    BitField::new(mask, mask.trailing_zeros())
}

pub const fn flag_u16(mask: u16) -> BitField<u16> {
    BitField::new(mask, mask.trailing_zeros())
}

pub const fn flag_u32(mask: u32) -> BitField<u32> {
    BitField::new(mask, mask.trailing_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_clears_only_its_mask() {
        let container: u8 = 0b1111_1111;
        let stored = store_field(container, 0b0000_1110, 1, 0b010);
        assert_eq!(stored, 0b1111_0101);
    }

    #[test]
    fn test_store_truncates_to_mask() {
        let stored = store_field(0u8, 0x0f, 0, 0xff);
        assert_eq!(stored, 0x0f);
    }

    #[test]
    fn test_extract_u16() {
        let container: u16 = 0x1a2b;
        assert_eq!(extract_field(container, 0xf000, 12), 0x1);
        assert_eq!(extract_field(container, 0x0f00, 8), 0xa);
        assert_eq!(extract_field(container, 0x00f0, 4), 0x2);
        assert_eq!(extract_field(container, 0x000f, 0), 0xb);
    }

    #[test]
    fn test_bit_field_u32() {
        const DURATION: BitField<u32> = BitField::new(0xff00_0000, 24);
        let mut data: u32 = 0x0000_00ff;
        DURATION.set(&mut data, 16);
        assert_eq!(data, 0x1000_00ff);
        assert_eq!(DURATION.get(data), 16);
        DURATION.set(&mut data, 4);
        assert_eq!(DURATION.get(data), 4);
        assert_eq!(data & 0xff, 0xff);
    }

    #[test]
    fn test_flags() {
        let sharps = flag_u8(0x01);
        let sign = flag_u8(0x80);
        assert_eq!(sign.shift, 7);
        let mut data = 0u8;
        sharps.set_flag(&mut data, true);
        sign.set_flag(&mut data, true);
        assert_eq!(data, 0x81);
        sharps.set_flag(&mut data, false);
        assert_eq!(data, 0x80);
        assert!(sign.is_set(data));
        assert!(!sharps.is_set(data));
    }
}
