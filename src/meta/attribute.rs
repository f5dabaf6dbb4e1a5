
//! The attributes that describe a yuv image:
//! the pixel format and the compression method.

use crate::math::Vec2;


/// How the color samples of the image are laid out in memory.
/// Identified by a fourcc code in the file header.
/// See <https://fourcc.org/yuv.php> for the list of common formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {

    /// Planar 4:2:0: a full resolution Y plane,
    /// followed by the U and the V planes,
    /// each at half the resolution in both dimensions.
    Iyuv,
}

/// Specifies which compression method the image data uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {

    /// Store uncompressed planes.
    /// Produces large files that can be read and written very quickly.
    None,

    /// A jpeg-style lossy method: each plane is cut into 8×8 blocks,
    /// every block is transformed with the discrete cosine transform,
    /// quantized by a quality-scaled table, and huffman coded.
    /// Quality is controlled by one byte per plane, each in `1..=100`.
    Dct,
}


impl Format {

    /// The fourcc code of this format, as stored in the file header.
    pub const fn fourcc(self) -> u32 {
        match self {
            Format::Iyuv => 0x5655_5949, // ascii "IYUV", little endian
        }
    }

    /// Returns the format with the specified fourcc code, if it is known.
    pub fn from_fourcc(fourcc: u32) -> Option<Self> {
        match fourcc {
            0x5655_5949 => Some(Format::Iyuv),
            _ => None,
        }
    }

    /// Whether the samples of this format are stored
    /// as one contiguous plane per channel.
    pub const fn is_planar(self) -> bool {
        match self {
            Format::Iyuv => true,
        }
    }

    /// Number of sample planes that this format stores.
    pub const fn plane_count(self) -> usize {
        match self {
            Format::Iyuv => 3,
        }
    }

    /// By what factor the chroma planes are
    /// smaller than the luma plane, per dimension.
    pub const fn chroma_subsampling(self) -> Vec2<usize> {
        match self {
            Format::Iyuv => Vec2(2, 2),
        }
    }

    /// The resolution of the specified plane,
    /// given the resolution of the image.
    pub fn plane_resolution(self, plane_index: usize, resolution: Vec2<usize>) -> Vec2<usize> {
        debug_assert!(plane_index < self.plane_count(), "plane index out of range");

        match plane_index {
            0 => resolution,
            _ => {
                let subsampling = self.chroma_subsampling();
                Vec2(resolution.width() / subsampling.x(), resolution.height() / subsampling.y())
            }
        }
    }

    /// Number of bytes that the uncompressed image data occupies.
    pub fn uncompressed_byte_size(self, resolution: Vec2<usize>) -> usize {
        (0 .. self.plane_count())
            .map(|plane| self.plane_resolution(plane, resolution).area())
            .sum()
    }
}

impl Compression {

    /// The numerical tag of this method, as stored in the file header.
    pub const fn tag(self) -> u16 {
        match self {
            Compression::None => 0,
            Compression::Dct => 1,
        }
    }

    /// Returns the compression method with the specified tag, if it is known.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            0 => Some(Compression::None),
            1 => Some(Compression::Dct),
            _ => None,
        }
    }

    /// Number of compression parameter bytes this method requires.
    pub const fn parameter_count(self) -> usize {
        match self {
            Compression::None => 0,
            Compression::Dct => 3, // one quality byte per plane
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", match self {
            Format::Iyuv => "iyuv",
        })
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{} compression", match self {
            Compression::None => "no",
            Compression::Dct => "dct",
        })
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fourcc_round_trip() {
        assert_eq!(Format::from_fourcc(Format::Iyuv.fourcc()), Some(Format::Iyuv));
        assert_eq!(Format::Iyuv.fourcc(), u32::from_le_bytes(*b"IYUV"));
        assert_eq!(Format::from_fourcc(0), None);
    }

    #[test]
    fn compression_tag_round_trip() {
        assert_eq!(Compression::from_tag(0), Some(Compression::None));
        assert_eq!(Compression::from_tag(1), Some(Compression::Dct));
        assert_eq!(Compression::from_tag(2), None);
    }

    #[test]
    fn plane_resolutions() {
        let resolution = Vec2(32, 16);
        assert_eq!(Format::Iyuv.plane_resolution(0, resolution), Vec2(32, 16));
        assert_eq!(Format::Iyuv.plane_resolution(1, resolution), Vec2(16, 8));
        assert_eq!(Format::Iyuv.plane_resolution(2, resolution), Vec2(16, 8));
        assert_eq!(Format::Iyuv.uncompressed_byte_size(resolution), 32 * 16 * 3 / 2);
    }
}
