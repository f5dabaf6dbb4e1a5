
//! Contains the compression method implementations
//! and the dispatch over (format, compression) pairs.


// private modules make non-breaking changes easier
mod dct;

use crate::error::{Error, Result};
use crate::image::Yuv;
use crate::meta::attribute::{Compression, Format};


/// Compress the image with the specified method and parameters,
/// returning a new image. The set of (format, method) pairs is closed,
/// so the dispatch is a plain match instead of a registry.
///
/// Returns `Error::AlreadyCompressed` if the image is compressed, and
/// `Error::UnsupportedFormat` if the pair has no implementation.
pub fn compress(image: &Yuv, method: Compression, params: &[u8]) -> Result<Yuv> {
    if image.compression() != Compression::None {
        return Err(Error::AlreadyCompressed);
    }

    match (image.format(), method) {
        (Format::Iyuv, Compression::Dct) => dct::compress_planar(image, params),

        (format, method) => Err(Error::unsupported(
            format!("cannot compress {} with {}", format, method)
        )),
    }
}

/// Decompress the image, returning a new image.
/// An uncompressed image decompresses to a copy of itself.
pub fn decompress(image: &Yuv) -> Result<Yuv> {
    match (image.format(), image.compression()) {
        (_, Compression::None) => Ok(image.clone()),
        (Format::Iyuv, Compression::Dct) => dct::decompress_planar(image),
    }
}
