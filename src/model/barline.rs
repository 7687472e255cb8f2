use std::io::Write;

use crate::codec::{BitField, FileVersion, InputStream, OutputStream, Serializable};
use crate::{StreamError, ValidationError};

// Barline types
pub const BAR: u8 = 0;
pub const DOUBLE_BAR: u8 = 1;
pub const FREE_TIME_BAR: u8 = 2;
pub const REPEAT_START: u8 = 3;
pub const REPEAT_END: u8 = 4;
pub const DOUBLE_BAR_FINE: u8 = 5;

pub const MIN_REPEAT_COUNT: u8 = 2;
pub const MAX_REPEAT_COUNT: u8 = 24;

pub const DEFAULT_POSITION: u8 = 0;
pub const DEFAULT_DATA: u8 = BAR << 5;

const BARLINE_TYPE: BitField<u8> = BitField::new(0xe0, 5);
const REPEAT_COUNT: BitField<u8> = BitField::new(0x1f, 0);

/// Barline at a position within a system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Barline {
    position: u8,
    data: u8,
}

impl Default for Barline {
    fn default() -> Self {
        Barline {
            position: DEFAULT_POSITION,
            data: DEFAULT_DATA,
        }
    }
}

impl Barline {
    pub fn new(position: u8, barline_type: u8, repeat_count: u8) -> Result<Self, ValidationError> {
        let mut barline = Barline {
            position,
            ..Barline::default()
        };
        barline.set_barline_data(barline_type, repeat_count)?;
        Ok(barline)
    }

    pub const fn position(&self) -> u8 {
        self.position
    }

    pub fn set_position(&mut self, position: u8) {
        self.position = position;
    }

    pub const fn is_valid_barline_type(barline_type: u8) -> bool {
        barline_type <= DOUBLE_BAR_FINE
    }

    /// Zero means no repeat; otherwise the repeat count only applies to a repeat end
    pub const fn is_valid_repeat_count(barline_type: u8, repeat_count: u8) -> bool {
        repeat_count == 0
            || (barline_type == REPEAT_END
                && repeat_count >= MIN_REPEAT_COUNT
                && repeat_count <= MAX_REPEAT_COUNT)
    }

    /// Set type and repeat count together
    pub fn set_barline_data(
        &mut self,
        barline_type: u8,
        repeat_count: u8,
    ) -> Result<(), ValidationError> {
        if !Self::is_valid_barline_type(barline_type) {
            return Err(ValidationError::BarlineType(barline_type));
        }
        if !Self::is_valid_repeat_count(barline_type, repeat_count) {
            return Err(ValidationError::RepeatCount {
                barline_type,
                count: repeat_count,
            });
        }
        BARLINE_TYPE.set(&mut self.data, barline_type);
        REPEAT_COUNT.set(&mut self.data, repeat_count);
        Ok(())
    }

    /// Changing the type away from a repeat end clears the repeat count
    pub fn set_barline_type(&mut self, barline_type: u8) -> Result<(), ValidationError> {
        if !Self::is_valid_barline_type(barline_type) {
            return Err(ValidationError::BarlineType(barline_type));
        }
        BARLINE_TYPE.set(&mut self.data, barline_type);
        if barline_type != REPEAT_END {
            REPEAT_COUNT.set(&mut self.data, 0);
        }
        Ok(())
    }

    pub fn barline_type(&self) -> u8 {
        BARLINE_TYPE.get(self.data)
    }

    pub fn set_repeat_count(&mut self, repeat_count: u8) -> Result<(), ValidationError> {
        let barline_type = self.barline_type();
        if !Self::is_valid_repeat_count(barline_type, repeat_count) {
            return Err(ValidationError::RepeatCount {
                barline_type,
                count: repeat_count,
            });
        }
        REPEAT_COUNT.set(&mut self.data, repeat_count);
        Ok(())
    }

    pub fn repeat_count(&self) -> u8 {
        REPEAT_COUNT.get(self.data)
    }

    pub fn is_bar(&self) -> bool {
        self.barline_type() == BAR
    }

    pub fn is_double_bar(&self) -> bool {
        self.barline_type() == DOUBLE_BAR
    }

    pub fn is_free_time_bar(&self) -> bool {
        self.barline_type() == FREE_TIME_BAR
    }

    pub fn is_repeat_start(&self) -> bool {
        self.barline_type() == REPEAT_START
    }

    pub fn is_repeat_end(&self) -> bool {
        self.barline_type() == REPEAT_END
    }

    pub fn is_double_bar_fine(&self) -> bool {
        self.barline_type() == DOUBLE_BAR_FINE
    }
}

impl Serializable for Barline {
    fn serialize<W: Write>(&self, stream: &mut OutputStream<W>) -> Result<(), StreamError> {
        stream.write_u8(self.position);
        stream.write_u8(self.data);
        stream.check_state()
    }

    fn deserialize(
        &mut self,
        stream: &mut InputStream<'_>,
        _version: FileVersion,
    ) -> Result<(), StreamError> {
        let position = stream.read_u8();
        let data = stream.read_u8();
        stream.check_state()?;
        *self = Barline { position, data };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};

    #[test]
    fn test_repeat_end_keeps_count() {
        let barline = Barline::new(7, REPEAT_END, 3).unwrap();
        assert!(barline.is_repeat_end());
        assert_eq!(barline.repeat_count(), 3);
        assert_eq!(to_bytes(&barline).unwrap(), vec![7, 0x83]);
    }

    #[test]
    fn test_repeat_count_requires_repeat_end() {
        let mut barline = Barline::new(0, REPEAT_START, 0).unwrap();
        let before = barline;
        assert_eq!(
            barline.set_repeat_count(4),
            Err(ValidationError::RepeatCount {
                barline_type: REPEAT_START,
                count: 4
            })
        );
        assert_eq!(barline.set_barline_type(6), Err(ValidationError::BarlineType(6)));
        assert_eq!(barline, before);
        assert!(Barline::new(0, REPEAT_END, 1).is_err());
        assert!(Barline::new(0, REPEAT_END, 25).is_err());
    }

    #[test]
    fn test_changing_type_clears_repeat_count() {
        let mut barline = Barline::new(2, REPEAT_END, 24).unwrap();
        barline.set_barline_type(REPEAT_END).unwrap();
        assert_eq!(barline.repeat_count(), 24);
        barline.set_barline_type(DOUBLE_BAR_FINE).unwrap();
        assert!(barline.is_double_bar_fine());
        assert_eq!(barline.repeat_count(), 0);
    }

    #[test]
    fn test_type_predicates() {
        let cases = [
            (BAR, Barline::is_bar as fn(&Barline) -> bool),
            (DOUBLE_BAR, Barline::is_double_bar),
            (FREE_TIME_BAR, Barline::is_free_time_bar),
            (REPEAT_START, Barline::is_repeat_start),
            (REPEAT_END, Barline::is_repeat_end),
            (DOUBLE_BAR_FINE, Barline::is_double_bar_fine),
        ];
        for (barline_type, predicate) in cases {
            let barline = Barline::new(0, barline_type, 0).unwrap();
            assert!(predicate(&barline));
            let matching = cases.iter().filter(|(_, other)| other(&barline)).count();
            assert_eq!(matching, 1);
        }
    }

    #[test]
    fn test_barline_round_trip() {
        let barline = Barline::new(30, FREE_TIME_BAR, 0).unwrap();
        let decoded: Barline =
            from_bytes(&to_bytes(&barline).unwrap(), FileVersion::V1_0_2).unwrap();
        assert_eq!(decoded, barline);
    }
}
