use encoding_rs::WINDOWS_1252;
use nom::bytes::complete::take;
use nom::{number, IResult};

use crate::codec::{FileVersion, Serializable};
use crate::StreamError;

/// Sequential little-endian reader with a sticky failure state.
///
/// The first failed read poisons the stream: every later read returns a zero value
/// and consumes nothing. Callers check `check_state` after each group of reads.
#[derive(Debug)]
pub struct InputStream<'a> {
    input: &'a [u8],
    consumed: usize,
    failure: Option<StreamError>,
}

impl<'a> InputStream<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            input: data,
            consumed: 0,
            failure: None,
        }
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

    /// Number of bytes consumed so far
    pub const fn position(&self) -> usize {
        self.consumed
    }

    pub const fn remaining(&self) -> &'a [u8] {
        self.input
    }

    /// Record a failure; only the first one is kept.
    pub fn poison(&mut self, error: StreamError) {
        if self.failure.is_none() {
            log::warn!("Input stream poisoned: {error}");
            self.failure = Some(error);
        }
    }

    /// Poison the stream because decoded bytes make no sense.
    pub fn invalid_data(&mut self, message: impl Into<String>) {
        let error = StreamError::InvalidData {
            offset: self.consumed,
            message: message.into(),
        };
        self.poison(error);
    }

    fn read_with<T: Default>(
        &mut self,
        what: &'static str,
        parser: fn(&'a [u8]) -> IResult<&'a [u8], T>,
    ) -> T {
        if self.failure.is_some() {
            return T::default();
        }
        match parser(self.input) {
            Ok((rest, value)) => {
                self.consumed += self.input.len() - rest.len();
                self.input = rest;
                value
            }
            Err(_) => {
                let offset = self.consumed;
                self.poison(StreamError::UnexpectedEof { offset, what });
                T::default()
            }
        }
    }

    pub fn read_u8(&mut self) -> u8 {
        self.read_with("u8", number::complete::le_u8)
    }

    pub fn read_i8(&mut self) -> i8 {
        self.read_with("i8", number::complete::le_i8)
    }

    pub fn read_u16(&mut self) -> u16 {
        self.read_with("u16", number::complete::le_u16)
    }

    pub fn read_u32(&mut self) -> u32 {
        self.read_with("u32", number::complete::le_u32)
    }

    pub fn read_i32(&mut self) -> i32 {
        self.read_with("i32", number::complete::le_i32)
    }

    fn take_bytes(&mut self, len: usize, what: &'static str) -> &'a [u8] {
        if self.failure.is_some() {
            return &[];
        }
        let result: IResult<&'a [u8], &'a [u8]> = take(len)(self.input);
        match result {
            Ok((rest, bytes)) => {
                self.consumed += len;
                self.input = rest;
                bytes
            }
            Err(_) => {
                let offset = self.consumed;
                self.poison(StreamError::UnexpectedEof { offset, what });
                &[]
            }
        }
    }

    /// Length prefix of a string.
    /// [u8 len] or [0xFF][u16 len] or [0xFF][0xFFFF][u32 len]
    fn read_string_length(&mut self) -> usize {
        let short = self.read_u8();
        if short < 0xff {
            return usize::from(short);
        }
        let medium = self.read_u16();
        match medium {
            0xfffe => {
                self.invalid_data("UTF-16 strings are not supported");
                0
            }
            0xffff => self.read_u32() as usize,
            _ => usize::from(medium),
        }
    }

    /// Read a length-prefixed Windows-1252 string
    pub fn read_string(&mut self) -> String {
        let len = self.read_string_length();
        let bytes = self.take_bytes(len, "string");
        if bytes.is_empty() {
            return String::new();
        }
        let (cow, encoding_used, had_errors) = WINDOWS_1252.decode(bytes);
        if had_errors {
            log::debug!("Malformed string for {encoding_used:?}: {bytes:02X?}");
        }
        cow.into_owned()
    }

    /// Read a byte sequence prefixed by a u8 count
    pub fn read_bytes(&mut self) -> Vec<u8> {
        let count = self.read_u8();
        self.take_bytes(usize::from(count), "byte sequence").to_vec()
    }

    /// Element count prefix: [u16] or [0xFFFF][u32]
    pub fn read_count(&mut self) -> u32 {
        let count = self.read_u16();
        if count == 0xffff {
            self.read_u32()
        } else {
            u32::from(count)
        }
    }

    /// Read a counted sequence of entities, threading `version` to each element.
    pub fn read_vector<T: Serializable + Default>(
        &mut self,
        version: FileVersion,
    ) -> Result<Vec<T>, StreamError> {
        let count = self.read_count();
        self.check_state()?;
        log::debug!("Reading {count} elements at offset {}", self.consumed);
        // every element takes at least one byte
        let mut items = Vec::with_capacity((count as usize).min(self.input.len()));
        for _ in 0..count {
            let mut item = T::default();
            item.deserialize(self, version)?;
            items.push(item);
        }
        Ok(items)
    }
}
