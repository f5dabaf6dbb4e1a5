
//! Error type definitions of this crate.

use std::borrow::Cow;
use std::convert::TryInto;
use std::fmt;

/// A result that may contain an error from this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains an error from this crate.
pub type UnitResult = Result<()>;

pub use std::io::Error as IoError;
pub use std::io::Result as IoResult;

/// An error that may happen while reading, writing, compressing
/// or decompressing a yuv image.
#[derive(Debug)]
pub enum Error {

    /// The file could not be opened, read, or written.
    Io(IoError),

    /// The file header is not a valid yuv header:
    /// wrong magic bytes, unknown fourcc, zero sizes,
    /// or a resolution that is not a multiple of 16.
    BadHeader(Cow<'static, str>),

    /// The combination of pixel format and compression method
    /// is not registered in this crate.
    UnsupportedFormat(Cow<'static, str>),

    /// The supplied compression parameters are not usable,
    /// for example a quality value outside of `1..=100`.
    BadParameters(Cow<'static, str>),

    /// `compress` was called on an image that is already compressed.
    AlreadyCompressed,

    /// The contents of the file do not match the sizes that it declares,
    /// or an encoded block cannot be decoded.
    Corrupt(Cow<'static, str>),

    /// An encoded block would not fit the on-disk representation:
    /// either a huffman code would be longer than 8 bits,
    /// or a coded block would be larger than 255 bytes.
    HuffmanOverflow,
}

impl Error {

    /// Create an error signalling an invalid file header.
    pub(crate) fn bad_header(message: impl Into<Cow<'static, str>>) -> Self {
        Error::BadHeader(message.into())
    }

    /// Create an error signalling an unregistered format and compression pair.
    pub(crate) fn unsupported(message: impl Into<Cow<'static, str>>) -> Self {
        Error::UnsupportedFormat(message.into())
    }

    /// Create an error signalling unusable compression parameters.
    pub(crate) fn bad_parameters(message: impl Into<Cow<'static, str>>) -> Self {
        Error::BadParameters(message.into())
    }

    /// Create an error signalling contents that contradict their declared sizes.
    pub(crate) fn corrupt(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Corrupt(message.into())
    }
}

/// Enable using the `?` operator on `std::io::Result`.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        Error::Io(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(error) => write!(formatter, "i/o error: {}", error),
            Error::BadHeader(message) => write!(formatter, "invalid yuv header: {}", message),
            Error::UnsupportedFormat(message) => write!(formatter, "unsupported format: {}", message),
            Error::BadParameters(message) => write!(formatter, "invalid parameters: {}", message),
            Error::AlreadyCompressed => write!(formatter, "the image is already compressed"),
            Error::Corrupt(message) => write!(formatter, "corrupt contents: {}", message),
            Error::HuffmanOverflow => write!(formatter, "encoded block exceeds the representable size"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            _ => None,
        }
    }
}

/// Panics on overflow. The data formats of this crate
/// never require indices that exceed `u32`.
pub(crate) fn usize_to_u32(value: usize) -> u32 {
    value.try_into().expect("index exceeds u32 range")
}

/// Convert a declared file size to an in-memory index.
pub(crate) fn u32_to_usize(value: u32) -> usize {
    value.try_into().expect("u32 does not fit usize")
}
