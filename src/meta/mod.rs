
//! Describes the fixed-size header of a yuv file.

pub mod attribute;

use crate::error::{Error, Result, UnitResult, u32_to_usize};
use crate::io::{Data, Read, Write};
use crate::math::Vec2;
use self::attribute::{Compression, Format};


/// Number of bytes the fixed-size header occupies in a file.
/// The compression parameters follow the header,
/// the image data follows the compression parameters.
pub const HEADER_BYTE_SIZE: usize = 64;

/// Number of reserved trailing bytes in the header. Always zero.
const UNUSED_BYTE_COUNT: usize = 32;

/// Both image dimensions must be divisible by this value,
/// so that the subsampled chroma planes can be cut into 8×8 blocks.
pub const RESOLUTION_ALIGNMENT: usize = 16;


/// The first two bytes of each yuv file.
/// Used to abort reading files of other types.
pub mod magic_number {
    use super::*;

    /// The first two bytes of each yuv file.
    pub const BYTES: [u8; 2] = *b"YU";

    /// Without validation, write this instance to the byte stream.
    pub fn write(write: &mut impl Write) -> UnitResult {
        u8::write_slice(write, &self::BYTES)
    }

    /// Consumes two bytes from the reader and returns whether the file may be a yuv file.
    pub fn is_yuv(read: &mut impl Read) -> Result<bool> {
        let mut magic_num = [0; 2];
        u8::read_slice(read, &mut magic_num)?;
        Ok(magic_num == self::BYTES)
    }

    /// Validate this image. If it is a yuv file, return `Ok(())`.
    pub fn validate_yuv(read: &mut impl Read) -> UnitResult {
        if self::is_yuv(read)? {
            Ok(())
        }
        else {
            Err(Error::bad_header("file identifier missing"))
        }
    }
}


/// The meta data of a yuv image, stored as the fixed-size
/// header at the start of each file.
///
/// The positional fields are byte offsets from the start of the file.
/// After loading, they are re-normalized to their canonical values:
/// parameters immediately after the header, data immediately after the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {

    /// How the color samples of the image are laid out.
    pub format: Format,

    /// How the image data is compressed. May be `Compression::None`.
    pub compression: Compression,

    /// Byte length of the image data blob.
    pub data_size: u32,

    /// Byte length of the compression parameters. Zero if not compressed.
    pub compression_params_size: u32,

    /// Byte offset of the compression parameters within the file.
    pub compression_params_pos: u32,

    /// Number of pixel columns. A multiple of 16.
    pub width: u32,

    /// Number of pixel rows. A multiple of 16.
    pub height: u32,

    /// Byte offset of the image data blob within the file.
    pub data_pos: u32,
}

impl Header {

    /// A header for an uncompressed image of the
    /// specified format and resolution, with canonical offsets.
    pub fn uncompressed(format: Format, resolution: Vec2<usize>) -> Self {
        use crate::error::usize_to_u32;

        Header {
            format,
            compression: Compression::None,
            data_size: usize_to_u32(format.uncompressed_byte_size(resolution)),
            compression_params_size: 0,
            compression_params_pos: usize_to_u32(HEADER_BYTE_SIZE),
            width: usize_to_u32(resolution.width()),
            height: usize_to_u32(resolution.height()),
            data_pos: usize_to_u32(HEADER_BYTE_SIZE),
        }
    }

    /// The resolution of the full-size luma plane.
    pub fn resolution(&self) -> Vec2<usize> {
        Vec2(u32_to_usize(self.width), u32_to_usize(self.height))
    }

    /// Overwrite the positional fields with their canonical values:
    /// compression parameters immediately follow the header,
    /// image data immediately follows the compression parameters.
    pub fn normalize_positions(&mut self) {
        let header_size = HEADER_BYTE_SIZE as u32;
        self.compression_params_pos = header_size;
        self.data_pos = header_size + self.compression_params_size;
    }

    /// Validate this header. Does not inspect the image data.
    pub fn validate(&self) -> UnitResult {
        if self.width == 0 || self.height == 0 {
            return Err(Error::bad_header("zero image resolution"));
        }

        let alignment = RESOLUTION_ALIGNMENT as u32;
        if self.width % alignment != 0 || self.height % alignment != 0 {
            return Err(Error::bad_header("image resolution not divisible by 16"));
        }

        if self.data_size == 0 {
            return Err(Error::bad_header("zero data size"));
        }

        if u32_to_usize(self.data_pos) < HEADER_BYTE_SIZE + u32_to_usize(self.compression_params_size) {
            return Err(Error::bad_header("data position overlaps header"));
        }

        if self.compression != Compression::None && self.compression_params_size == 0 {
            return Err(Error::bad_header("compressed image without compression parameters"));
        }

        Ok(())
    }

    /// Without validation, read the header from the byte stream.
    /// Returns `Error::BadHeader` for unknown fourcc codes and compression tags.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        magic_number::validate_yuv(read)?;

        let fourcc = u32::read(read)?;
        let data_size = u32::read(read)?;
        let compression_tag = u16::read(read)?;
        let compression_params_size = u32::read(read)?;
        let compression_params_pos = u32::read(read)?;
        let width = u32::read(read)?;
        let height = u32::read(read)?;
        let data_pos = u32::read(read)?;

        let mut unused = [0_u8; UNUSED_BYTE_COUNT];
        u8::read_slice(read, &mut unused)?;

        let format = Format::from_fourcc(fourcc)
            .ok_or_else(|| Error::bad_header("unknown fourcc format"))?;

        let compression = Compression::from_tag(compression_tag)
            .ok_or_else(|| Error::bad_header("unknown compression method"))?;

        Ok(Header {
            format, compression, data_size,
            compression_params_size, compression_params_pos,
            width, height, data_pos,
        })
    }

    /// Without validation, write this header to the byte stream.
    pub fn write(&self, write: &mut impl Write) -> UnitResult {
        magic_number::write(write)?;

        self.format.fourcc().write(write)?;
        self.data_size.write(write)?;
        self.compression.tag().write(write)?;
        self.compression_params_size.write(write)?;
        self.compression_params_pos.write(write)?;
        self.width.write(write)?;
        self.height.write(write)?;
        self.data_pos.write(write)?;

        u8::write_slice(write, &[0_u8; UNUSED_BYTE_COUNT])?;
        Ok(())
    }
}


#[cfg(test)]
mod test {
    use super::*;

    fn valid_header() -> Header {
        Header::uncompressed(Format::Iyuv, Vec2(32, 16))
    }

    #[test]
    fn byte_size_matches_layout() {
        let mut bytes = Vec::new();
        valid_header().write(&mut bytes).unwrap();
        assert_eq!(bytes.len(), HEADER_BYTE_SIZE);
    }

    #[test]
    fn round_trip() {
        let header = valid_header();
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();

        let parsed = Header::read(&mut bytes.as_slice()).unwrap();
        assert_eq!(parsed, header);
        parsed.validate().unwrap();
    }

    #[test]
    fn rejects_wrong_magic_bytes() {
        let mut bytes = Vec::new();
        valid_header().write(&mut bytes).unwrap();
        bytes[0] = b'X';

        assert!(matches!(
            Header::read(&mut bytes.as_slice()),
            Err(Error::BadHeader(_))
        ));
    }

    #[test]
    fn rejects_misaligned_resolution() {
        let mut header = valid_header();
        header.width = 24;
        assert!(matches!(header.validate(), Err(Error::BadHeader(_))));
    }

    #[test]
    fn rejects_unknown_fourcc() {
        let mut bytes = Vec::new();
        valid_header().write(&mut bytes).unwrap();
        bytes[2 .. 6].copy_from_slice(b"ABCD");

        assert!(matches!(
            Header::read(&mut bytes.as_slice()),
            Err(Error::BadHeader(_))
        ));
    }

    #[test]
    fn rejects_data_position_inside_header() {
        let mut header = valid_header();
        header.data_pos = 32;
        assert!(matches!(header.validate(), Err(Error::BadHeader(_))));
    }
}
