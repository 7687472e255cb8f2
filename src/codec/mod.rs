//! Binary codec shared by every document entity.
//!
//! Entities are written field by field in declaration order, little-endian, and
//! read back with the file version threaded through every nested call so that
//! each entity can pick its own decode branch.

pub mod input_stream;
pub mod output_stream;
pub mod packed_field;
pub mod version;

use std::io::Write;

pub use input_stream::InputStream;
pub use output_stream::OutputStream;
pub use packed_field::{extract_field, store_field, BitField};
pub use version::{FileVersion, Layout};

use crate::StreamError;

/// Two-method binary contract implemented by every entity.
///
/// `serialize` always emits the current packed layout. `deserialize` accepts any
/// supported version and leaves `self` untouched when it fails.
pub trait Serializable {
    fn serialize<W: Write>(&self, stream: &mut OutputStream<W>) -> Result<(), StreamError>;

    fn deserialize(
        &mut self,
        stream: &mut InputStream<'_>,
        version: FileVersion,
    ) -> Result<(), StreamError>;
}

/// Serialize a single entity into a fresh buffer
pub fn to_bytes<T: Serializable>(item: &T) -> Result<Vec<u8>, StreamError> {
    let mut stream = OutputStream::new(Vec::new());
    item.serialize(&mut stream)?;
    Ok(stream.into_inner())
}

/// Deserialize a single entity written with `version`
pub fn from_bytes<T: Serializable + Default>(
    data: &[u8],
    version: FileVersion,
) -> Result<T, StreamError> {
    let mut stream = InputStream::new(data);
    let mut item = T::default();
    item.deserialize(&mut stream, version)?;
    let trailing = stream.remaining().len();
    if trailing > 0 {
        log::debug!("{trailing} trailing bytes left after decoding");
    }
    Ok(item)
}
