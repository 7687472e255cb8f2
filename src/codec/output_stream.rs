use std::io::Write;

use encoding_rs::WINDOWS_1252;

use crate::codec::Serializable;
use crate::StreamError;

/// Sequential little-endian writer with a sticky failure state.
///
/// After the first failed write every later write is skipped.
#[derive(Debug)]
pub struct OutputStream<W: Write> {
    sink: W,
    written: usize,
    failure: Option<StreamError>,
}

impl<W: Write> OutputStream<W> {
    pub const fn new(sink: W) -> Self {
        Self {
            sink,
            written: 0,
            failure: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    pub fn check_state(&self) -> Result<(), StreamError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub const fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    /// Number of bytes written so far
    pub const fn position(&self) -> usize {
        self.written
    }

    pub fn poison(&mut self, error: StreamError) {
        if self.failure.is_none() {
            log::warn!("Output stream poisoned: {error}");
            self.failure = Some(error);
        }
    }

    fn invalid_data(&mut self, message: String) {
        let error = StreamError::InvalidData {
            offset: self.written,
            message,
        };
        self.poison(error);
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        if self.failure.is_some() {
            return;
        }
        match self.sink.write_all(bytes) {
            Ok(()) => self.written += bytes.len(),
            Err(err) => self.poison(StreamError::Io(err.to_string())),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_raw(&[value]);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_raw(&value.to_le_bytes());
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_raw(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_raw(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_raw(&value.to_le_bytes());
    }

    /// Write a length-prefixed Windows-1252 string
    pub fn write_string(&mut self, value: &str) {
        let (bytes, encoding_used, had_unmappable) = WINDOWS_1252.encode(value);
        if had_unmappable {
            log::warn!("String {value:?} is not representable in {encoding_used:?}");
        }
        let len = bytes.len();
        if len < 0xff {
            self.write_u8(len as u8);
        } else if len < 0xfffe {
            self.write_u8(0xff);
            self.write_u16(len as u16);
        } else {
            let Ok(len) = u32::try_from(len) else {
                self.invalid_data(format!("string of {len} bytes is too long"));
                return;
            };
            self.write_u8(0xff);
            self.write_u16(0xffff);
            self.write_u32(len);
        }
        self.write_raw(&bytes);
    }

    /// Write a byte sequence prefixed by a u8 count
    pub fn write_bytes(&mut self, values: &[u8]) {
        let Ok(count) = u8::try_from(values.len()) else {
            self.invalid_data(format!("{} bytes do not fit a byte sequence", values.len()));
            return;
        };
        self.write_u8(count);
        self.write_raw(values);
    }

    /// Element count prefix: [u16] or [0xFFFF][u32]
    pub fn write_count(&mut self, count: usize) {
        match u16::try_from(count) {
            Ok(short) if short < 0xffff => self.write_u16(short),
            _ => {
                let Ok(count) = u32::try_from(count) else {
                    self.invalid_data(format!("{count} elements are too many to count"));
                    return;
                };
                self.write_u16(0xffff);
                self.write_u32(count);
            }
        }
    }

    /// Write a counted sequence of entities in order.
    pub fn write_vector<T: Serializable>(&mut self, items: &[T]) -> Result<(), StreamError> {
        self.write_count(items.len());
        self.check_state()?;
        for item in items {
            item.serialize(self)?;
        }
        self.check_state()
    }
}
