
//! The in-memory yuv image and its top-level operations:
//! color conversion from rgb, compression, and file round trips.

use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom};
use std::path::Path;

use smallvec::SmallVec;

use crate::compression;
use crate::convert;
use crate::error::{Error, Result, UnitResult, usize_to_u32, u32_to_usize};
use crate::io::{Data, Read, Write};
use crate::math::Vec2;
use crate::meta::Header;
use crate::meta::attribute::{Compression, Format};


/// The parameter bytes of the compression method.
/// For dct compression, these are the three per-plane quality bytes.
pub type CompressionParams = SmallVec<[u8; 3]>;


/// A yuv image: a validated header, the compression parameters,
/// and one contiguous data blob.
///
/// For an uncompressed planar image, the blob stores the planes
/// back to back; use `planes` to borrow them individually.
/// Created by `from_rgb` or by `load`, and transformed into new
/// images by `compress` and `decompress`.
#[derive(Debug, Clone, PartialEq)]
pub struct Yuv {

    /// The meta data, with canonical byte offsets.
    pub header: Header,

    /// Empty unless the image is compressed.
    pub compression_params: CompressionParams,

    /// The image data blob that the header describes.
    pub data: Vec<u8>,
}

impl Yuv {

    /// Convert an interleaved rgb(a) pixel buffer into a planar yuv image.
    ///
    /// The buffer uses the bmp byte order, blue first, with rows running
    /// top to bottom, and `bits_per_pixel` of either 24 or 32. Any alpha
    /// byte is ignored. Both dimensions must be multiples of 16.
    pub fn from_rgb(pixels: &[u8], width: u32, height: u32, bits_per_pixel: u32, format: Format) -> Result<Self> {
        let bytes_per_pixel = match bits_per_pixel {
            24 => 3,
            32 => 4,
            _ => return Err(Error::bad_parameters("only 24 and 32 bits per pixel are supported")),
        };

        let header = Header::uncompressed(format, Vec2(u32_to_usize(width), u32_to_usize(height)));
        header.validate()?; // rejects empty and misaligned resolutions

        if pixels.len() != header.resolution().area() * bytes_per_pixel {
            return Err(Error::bad_parameters("pixel buffer size does not match the resolution"));
        }

        let data = match format {
            Format::Iyuv => convert::rgb_to_iyuv(pixels, header.resolution(), bytes_per_pixel),
        };

        Ok(Yuv { header, compression_params: SmallVec::new(), data })
    }

    /// How the color samples of this image are laid out.
    #[inline]
    pub fn format(&self) -> Format { self.header.format }

    /// How the data blob of this image is compressed.
    #[inline]
    pub fn compression(&self) -> Compression { self.header.compression }

    /// The resolution of the full-size luma plane.
    #[inline]
    pub fn resolution(&self) -> Vec2<usize> { self.header.resolution() }

    /// Whether `decompress` would have to do any work.
    #[inline]
    pub fn is_compressed(&self) -> bool { self.compression() != Compression::None }

    /// The resolution of the specified plane. Chroma planes are smaller.
    pub fn plane_resolution(&self, plane_index: usize) -> Vec2<usize> {
        self.format().plane_resolution(plane_index, self.resolution())
    }

    /// Number of bytes the uncompressed data blob of this image occupies.
    pub fn uncompressed_size(&self) -> usize {
        self.format().uncompressed_byte_size(self.resolution())
    }

    /// Borrow the three planes of an uncompressed planar image.
    pub fn planes(&self) -> Result<[&[u8]; 3]> {
        self.validate_plane_access()?;

        let (luma, chroma) = self.data.split_at(self.plane_resolution(0).area());
        let (chroma_u, chroma_v) = chroma.split_at(self.plane_resolution(1).area());
        Ok([luma, chroma_u, chroma_v])
    }

    /// Mutably borrow the three planes of an uncompressed planar image.
    pub fn planes_mut(&mut self) -> Result<[&mut [u8]; 3]> {
        self.validate_plane_access()?;

        let luma_size = self.plane_resolution(0).area();
        let chroma_size = self.plane_resolution(1).area();

        let (luma, chroma) = self.data.split_at_mut(luma_size);
        let (chroma_u, chroma_v) = chroma.split_at_mut(chroma_size);
        Ok([luma, chroma_u, chroma_v])
    }

    fn validate_plane_access(&self) -> UnitResult {
        if !self.format().is_planar() {
            return Err(Error::unsupported("only planar formats store separate planes"));
        }

        if self.is_compressed() {
            return Err(Error::bad_parameters("cannot access the planes of a compressed image"));
        }

        if self.data.len() != self.uncompressed_size() {
            return Err(Error::corrupt("image data does not match its resolution"));
        }

        Ok(())
    }

    /// Compress this image with the specified method, returning a new image.
    /// For dct compression, the parameters are three quality bytes in `1..=100`,
    /// one per plane.
    pub fn compress(&self, method: Compression, params: &[u8]) -> Result<Yuv> {
        compression::compress(self, method, params)
    }

    /// Decompress this image, returning a new image.
    /// An uncompressed image decompresses to a copy of itself.
    pub fn decompress(&self) -> Result<Yuv> {
        compression::decompress(self)
    }

    /// Whether the header, the parameters, and the data agree with each other.
    pub fn is_valid(&self) -> bool {
        self.header.validate().is_ok()
            && self.data.len() == u32_to_usize(self.header.data_size)
            && self.compression_params.len() == u32_to_usize(self.header.compression_params_size)
    }

    /// Read a yuv image from the file at the specified path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::read_from_buffered(BufReader::new(File::open(path)?))
    }

    /// Read a yuv image from a seekable byte source.
    /// Use `load` if you have a file path.
    ///
    /// The positional header fields are honored while reading and then
    /// re-normalized to their canonical values. For uncompressed images,
    /// the data size is recomputed from the format and resolution.
    pub fn read_from_buffered(mut read: impl Read + Seek) -> Result<Self> {
        let mut header = Header::read(&mut read)?;
        header.validate()?;

        let compression_params = if header.compression_params_size > 0 {
            read.seek(SeekFrom::Start(u64::from(header.compression_params_pos)))?;

            let params = u8::read_vec(
                &mut read, u32_to_usize(header.compression_params_size),
                256, "compression parameter size"
            )?;

            SmallVec::from_vec(params)
        }
        else {
            SmallVec::new()
        };

        read.seek(SeekFrom::Start(u64::from(header.data_pos)))?;
        header.normalize_positions();

        if header.compression == Compression::None {
            header.data_size = usize_to_u32(header.format.uncompressed_byte_size(header.resolution()));
        }

        // no valid compressed payload outgrows its uncompressed form
        // by more than the worst case coded block expansion
        let data_size_limit = 16 + 8 * header.format.uncompressed_byte_size(header.resolution());
        let data = u8::read_vec(&mut read, u32_to_usize(header.data_size), data_size_limit, "data size")?;

        Ok(Yuv { header, compression_params, data })
    }

    /// Write this image to the file at the specified path.
    pub fn dump(&self, path: impl AsRef<Path>) -> UnitResult {
        let mut write = BufWriter::new(File::create(path)?);
        self.write_to_buffered(&mut write)?;
        write.flush()?; // catch delayed io errors before returning
        Ok(())
    }

    /// Write this image to a byte destination: header,
    /// compression parameters, and data, in that order.
    pub fn write_to_buffered(&self, write: &mut impl Write) -> UnitResult {
        if !self.is_valid() {
            return Err(Error::corrupt("image does not match its header"));
        }

        self.header.write(write)?;
        u8::write_slice(write, &self.compression_params)?;
        u8::write_slice(write, &self.data)?;
        Ok(())
    }
}
