use std::fmt;
use std::io::Write;

use crate::codec::{FileVersion, InputStream, OutputStream, Serializable};
use crate::StreamError;

/// Discrete volume levels, stored as their MIDI-like volume value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum VolumeLevel {
    Off = 0,
    Ppp = 13,
    Pp = 26,
    P = 39,
    Mp = 52,
    #[default]
    Mf = 65,
    F = 78,
    Ff = 91,
    Fff = 104,
}

impl VolumeLevel {
    pub const fn from_u8(value: u8) -> Option<VolumeLevel> {
        match value {
            0 => Some(VolumeLevel::Off),
            13 => Some(VolumeLevel::Ppp),
            26 => Some(VolumeLevel::Pp),
            39 => Some(VolumeLevel::P),
            52 => Some(VolumeLevel::Mp),
            65 => Some(VolumeLevel::Mf),
            78 => Some(VolumeLevel::F),
            91 => Some(VolumeLevel::Ff),
            104 => Some(VolumeLevel::Fff),
            _ => None,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for VolumeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            VolumeLevel::Off => "off",
            VolumeLevel::Ppp => "ppp",
            VolumeLevel::Pp => "pp",
            VolumeLevel::P => "p",
            VolumeLevel::Mp => "mp",
            VolumeLevel::Mf => "mf",
            VolumeLevel::F => "f",
            VolumeLevel::Ff => "ff",
            VolumeLevel::Fff => "fff",
        };
        f.write_str(text)
    }
}

/// Volume change anchored at a position within a staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dynamic {
    position: i32,
    volume: VolumeLevel,
}

impl Dynamic {
    pub const fn new(position: i32, volume: VolumeLevel) -> Self {
        Dynamic { position, volume }
    }

    pub const fn position(&self) -> i32 {
        self.position
    }

    pub fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    pub const fn volume(&self) -> VolumeLevel {
        self.volume
    }

    pub fn set_volume(&mut self, volume: VolumeLevel) {
        self.volume = volume;
    }
}

impl Serializable for Dynamic {
    fn serialize<W: Write>(&self, stream: &mut OutputStream<W>) -> Result<(), StreamError> {
        stream.write_i32(self.position);
        stream.write_u8(self.volume.as_u8());
        stream.check_state()
    }

    // Single layout for every file version
    fn deserialize(
        &mut self,
        stream: &mut InputStream<'_>,
        _version: FileVersion,
    ) -> Result<(), StreamError> {
        let position = stream.read_i32();
        let level = stream.read_u8();
        stream.check_state()?;
        let Some(volume) = VolumeLevel::from_u8(level) else {
            stream.invalid_data(format!("unknown volume level {level}"));
            return stream.check_state();
        };
        *self = Dynamic { position, volume };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};

    #[test]
    fn test_dynamic_round_trip() {
        let dynamic = Dynamic::new(-3, VolumeLevel::Ff);
        let bytes = to_bytes(&dynamic).unwrap();
        assert_eq!(bytes, vec![0xfd, 0xff, 0xff, 0xff, 91]);
        for version in [FileVersion::V1_0, FileVersion::CURRENT] {
            let decoded: Dynamic = from_bytes(&bytes, version).unwrap();
            assert_eq!(decoded, dynamic);
        }
    }

    #[test]
    fn test_unknown_volume_poisons_stream() {
        let bytes = [4, 0, 0, 0, 50];
        let mut dynamic = Dynamic::new(1, VolumeLevel::P);
        let mut stream = InputStream::new(&bytes);
        let err = dynamic
            .deserialize(&mut stream, FileVersion::CURRENT)
            .unwrap_err();
        assert!(matches!(err, StreamError::InvalidData { offset: 5, .. }));
        assert_eq!(dynamic, Dynamic::new(1, VolumeLevel::P));
        assert_eq!(stream.read_u8(), 0);
        assert!(!stream.is_ok());
    }

    #[test]
    fn test_volume_level_values() {
        for value in 0..=u8::MAX {
            if let Some(level) = VolumeLevel::from_u8(value) {
                assert_eq!(level.as_u8(), value);
            }
        }
        assert_eq!(VolumeLevel::from_u8(104), Some(VolumeLevel::Fff));
        assert_eq!(VolumeLevel::Pp.to_string(), "pp");
        assert!(VolumeLevel::Ppp < VolumeLevel::Fff);
    }

    #[test]
    fn test_setters() {
        let mut dynamic = Dynamic::default();
        dynamic.set_position(12);
        dynamic.set_volume(VolumeLevel::Off);
        assert_eq!(dynamic.position(), 12);
        assert_eq!(dynamic.volume(), VolumeLevel::Off);
    }
}
