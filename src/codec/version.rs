use std::fmt;
use std::str::FromStr;

use crate::PtbError;

/// Power Tab file format versions, as stored in the document header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FileVersion {
    V1_0 = 1,
    V1_0_2 = 2,
    V1_5 = 3,
    #[default]
    V1_7 = 4,
}

/// Encoding families an entity may have been written with.
///
/// Every deserializer matches on this once instead of comparing versions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Layout {
    /// 1.0 and 1.0.2: sub-values stored in separate, wider fields
    Unpacked,
    /// 1.5 and later: sub-values packed into shared bytes and words
    Packed,
}

impl FileVersion {
    /// Version emitted by every serializer
    pub const CURRENT: FileVersion = FileVersion::V1_7;

    pub const fn from_u16(value: u16) -> Option<FileVersion> {
        match value {
            1 => Some(FileVersion::V1_0),
            2 => Some(FileVersion::V1_0_2),
            3 => Some(FileVersion::V1_5),
            4 => Some(FileVersion::V1_7),
            _ => None,
        }
    }

    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    pub const fn layout(self) -> Layout {
        match self {
            FileVersion::V1_0 | FileVersion::V1_0_2 => Layout::Unpacked,
            FileVersion::V1_5 | FileVersion::V1_7 => Layout::Packed,
        }
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FileVersion::V1_0 => "1.0",
            FileVersion::V1_0_2 => "1.0.2",
            FileVersion::V1_5 => "1.5",
            FileVersion::V1_7 => "1.7",
        };
        write!(f, "{text}")
    }
}

impl FromStr for FileVersion {
    type Err = PtbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.0" => Ok(FileVersion::V1_0),
            "1.0.2" => Ok(FileVersion::V1_0_2),
            "1.5" => Ok(FileVersion::V1_5),
            "1.7" => Ok(FileVersion::V1_7),
            other => Err(PtbError::ParsingError(format!(
                "unsupported file version '{other}'"
            ))),
        }
    }
}
