
//! The jpeg-style lossy compression method:
//! 8×8 blockwise dct, quality-scaled quantization, and huffman coding.
//!
//! Each plane is stored as a chunk-size index followed by the concatenated
//! coded blocks, so any block can be located with a prefix sum. All blocks
//! are independent, which makes both directions embarrassingly parallel.

pub mod bits;
pub mod huffman;
pub mod transform;

use smallvec::SmallVec;

use crate::error::{Error, Result, UnitResult, usize_to_u32, u32_to_usize};
use crate::image::Yuv;
use crate::io::{Data, Read, Write};
use crate::math::Vec2;
use crate::meta::attribute::Compression;
use self::huffman::{CodedBlock, MAX_CODED_BLOCK_BYTES};


/// Width and height of one coding block.
pub const BLOCK_SIZE: usize = 8;

/// Number of samples in one coding block.
pub const BLOCK_AREA: usize = BLOCK_SIZE * BLOCK_SIZE;


/// One compressed plane: the byte length of every coded block,
/// followed by the concatenated coded blocks.
#[derive(Debug, Clone, PartialEq)]
struct CompressedPlane {
    chunk_sizes: Vec<u8>,
    content: Vec<u8>,
}

impl CompressedPlane {

    /// Number of bytes this plane occupies inside the payload.
    fn byte_size(&self) -> usize {
        2 * u32::BYTE_SIZE + self.chunk_sizes.len() + self.content.len()
    }

    /// The byte offset of every coded block within the content,
    /// derived as the prefix sum of the chunk sizes.
    fn content_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.chunk_sizes.len());
        let mut offset = 0_usize;

        for &size in &self.chunk_sizes {
            offsets.push(offset);
            offset += usize::from(size);
        }

        offsets
    }

    fn write(&self, write: &mut impl Write) -> UnitResult {
        usize_to_u32(self.chunk_sizes.len()).write(write)?;
        usize_to_u32(self.content.len()).write(write)?;
        u8::write_slice(write, &self.chunk_sizes)?;
        u8::write_slice(write, &self.content)?;
        Ok(())
    }

    /// Read one plane, validating all declared sizes against
    /// `expected_blocks`, the block count implied by the plane resolution.
    fn read(read: &mut impl Read, expected_blocks: usize) -> Result<Self> {
        let chunk_count = u32_to_usize(u32::read(read)?);
        let content_size = u32_to_usize(u32::read(read)?);

        if chunk_count == 0 || content_size == 0 {
            return Err(Error::corrupt("empty compressed plane"));
        }

        if chunk_count != expected_blocks {
            return Err(Error::corrupt("chunk count does not match the plane resolution"));
        }

        let chunk_sizes = u8::read_vec(read, chunk_count, expected_blocks, "chunk count")?;

        let declared: usize = chunk_sizes.iter().map(|&size| usize::from(size)).sum();
        if declared != content_size {
            return Err(Error::corrupt("chunk sizes do not sum to the content size"));
        }

        let content = u8::read_vec(
            read, content_size,
            expected_blocks * MAX_CODED_BLOCK_BYTES, "content size"
        )?;

        Ok(CompressedPlane { chunk_sizes, content })
    }
}


/// The compressed image data blob: three plane byte sizes,
/// followed by the three compressed planes.
#[derive(Debug, Clone, PartialEq)]
struct Payload {
    planes: [CompressedPlane; 3],
}

impl Payload {

    fn byte_size(&self) -> usize {
        3 * u32::BYTE_SIZE + self.planes.iter().map(CompressedPlane::byte_size).sum::<usize>()
    }

    fn write(&self, write: &mut impl Write) -> UnitResult {
        for plane in &self.planes {
            usize_to_u32(plane.byte_size()).write(write)?;
        }

        for plane in &self.planes {
            plane.write(write)?;
        }

        Ok(())
    }

    fn read(read: &mut impl Read, expected_blocks: [usize; 3]) -> Result<Self> {
        let mut declared_sizes = [0_u32; 3];
        u32::read_slice(read, &mut declared_sizes)?;

        // a zero size marks an absent plane, which no current format produces
        if declared_sizes.iter().any(|&size| size == 0) {
            return Err(Error::corrupt("missing compressed plane"));
        }

        let mut planes = Vec::with_capacity(3);
        for (&declared_size, &expected) in declared_sizes.iter().zip(expected_blocks.iter()) {
            let plane = CompressedPlane::read(read, expected)?;

            if plane.byte_size() != u32_to_usize(declared_size) {
                return Err(Error::corrupt("compressed plane does not match its declared size"));
            }

            planes.push(plane);
        }

        let mut planes = planes.into_iter();
        Ok(Payload {
            planes: [
                planes.next().expect("three planes were read"),
                planes.next().expect("three planes were read"),
                planes.next().expect("three planes were read"),
            ],
        })
    }
}


/// The quantization base table of the specified plane:
/// luma for plane 0, chroma for planes 1 and 2.
fn base_table(plane_index: usize) -> &'static [f32; BLOCK_AREA] {
    if plane_index == 0 { &transform::LUMA_BASE_TABLE } else { &transform::CHROMA_BASE_TABLE }
}

/// Check the per-plane quality bytes: exactly three, each in `1..=100`.
fn validate_qualities(params: &[u8]) -> Result<[u8; 3]> {
    if params.len() != Compression::Dct.parameter_count() {
        return Err(Error::bad_parameters("exactly one quality byte per plane is required"));
    }

    for &quality in params {
        if !(1 ..= 100).contains(&quality) {
            return Err(Error::bad_parameters("quality must be between 1 and 100"));
        }
    }

    Ok([params[0], params[1], params[2]])
}


/// Compress all three planes of the uncompressed planar image.
/// The caller has already rejected images that are compressed.
pub(crate) fn compress_planar(image: &Yuv, params: &[u8]) -> Result<Yuv> {
    let qualities = validate_qualities(params)?;

    debug_assert_eq!(image.compression(), Compression::None, "caller must reject compressed images");
    debug_assert!(image.format().is_planar(), "dct compression requires a planar format");

    let format = image.format();
    let resolution = image.header.resolution();
    let planes = image.planes()?;

    #[cfg(feature = "rayon")]
    let compressed: Vec<Result<CompressedPlane>> = {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        (0 .. 3_usize).into_par_iter()
            .map(|plane_index| encode_plane(
                planes[plane_index],
                format.plane_resolution(plane_index, resolution),
                qualities[plane_index],
                base_table(plane_index),
            ))
            .collect()
    };

    #[cfg(not(feature = "rayon"))]
    let compressed: Vec<Result<CompressedPlane>> = (0 .. 3_usize)
        .map(|plane_index| encode_plane(
            planes[plane_index],
            format.plane_resolution(plane_index, resolution),
            qualities[plane_index],
            base_table(plane_index),
        ))
        .collect();

    // re-raise the first error after the parallel region has completed
    let mut compressed_planes = Vec::with_capacity(3);
    for plane in compressed {
        compressed_planes.push(plane?);
    }

    let mut compressed_planes = compressed_planes.into_iter();
    let payload = Payload {
        planes: [
            compressed_planes.next().expect("three planes were compressed"),
            compressed_planes.next().expect("three planes were compressed"),
            compressed_planes.next().expect("three planes were compressed"),
        ],
    };

    let mut data = Vec::with_capacity(payload.byte_size());
    payload.write(&mut data)?;

    let mut header = image.header;
    header.compression = Compression::Dct;
    header.compression_params_size = usize_to_u32(qualities.len());
    header.data_size = usize_to_u32(data.len());
    header.normalize_positions();

    Ok(Yuv { header, compression_params: SmallVec::from_slice(&qualities), data })
}

/// Decompress all three planes back into a contiguous planar image.
pub(crate) fn decompress_planar(image: &Yuv) -> Result<Yuv> {
    let qualities = validate_qualities(&image.compression_params)?;

    debug_assert_eq!(image.compression(), Compression::Dct);
    debug_assert!(image.format().is_planar());

    let format = image.format();
    let resolution = image.header.resolution();

    let plane_resolutions = [
        format.plane_resolution(0, resolution),
        format.plane_resolution(1, resolution),
        format.plane_resolution(2, resolution),
    ];

    let expected_blocks = [
        block_count(plane_resolutions[0]),
        block_count(plane_resolutions[1]),
        block_count(plane_resolutions[2]),
    ];

    let payload = Payload::read(&mut image.data.as_slice(), expected_blocks)?;

    let mut header = image.header;
    header.compression = Compression::None;
    header.compression_params_size = 0;
    header.data_size = usize_to_u32(format.uncompressed_byte_size(resolution));
    header.normalize_positions();

    let mut data = vec![0_u8; format.uncompressed_byte_size(resolution)];
    let (luma, chroma) = data.split_at_mut(plane_resolutions[0].area());
    let (chroma_u, chroma_v) = chroma.split_at_mut(plane_resolutions[1].area());

    let tasks: Vec<(&mut [u8], &CompressedPlane, Vec2<usize>, u8, usize)> = vec![
        (luma, &payload.planes[0], plane_resolutions[0], qualities[0], 0),
        (chroma_u, &payload.planes[1], plane_resolutions[1], qualities[1], 1),
        (chroma_v, &payload.planes[2], plane_resolutions[2], qualities[2], 2),
    ];

    #[cfg(feature = "rayon")]
    let decoded: Vec<UnitResult> = {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        tasks.into_par_iter()
            .map(|(output, plane, plane_resolution, quality, plane_index)|
                decode_plane(plane, output, plane_resolution, quality, base_table(plane_index)))
            .collect()
    };

    #[cfg(not(feature = "rayon"))]
    let decoded: Vec<UnitResult> = tasks.into_iter()
        .map(|(output, plane, plane_resolution, quality, plane_index)|
            decode_plane(plane, output, plane_resolution, quality, base_table(plane_index)))
        .collect();

    for plane in decoded {
        plane?;
    }

    Ok(Yuv { header, compression_params: SmallVec::new(), data })
}


/// Number of 8×8 blocks that tile a plane of the specified resolution.
fn block_count(resolution: Vec2<usize>) -> usize {
    (resolution.width() / BLOCK_SIZE) * (resolution.height() / BLOCK_SIZE)
}

/// Encode one plane: cut it into 8×8 tiles in row major order, code every
/// tile, and assemble the chunk-size index and the concatenated content.
fn encode_plane(
    samples: &[u8], resolution: Vec2<usize>,
    quality: u8, base: &'static [f32; BLOCK_AREA],
) -> Result<CompressedPlane>
{
    let Vec2(width, height) = resolution;
    debug_assert_eq!(samples.len(), width * height, "plane size mismatch");
    debug_assert!(width % BLOCK_SIZE == 0 && height % BLOCK_SIZE == 0, "plane not divisible into blocks");

    let table = transform::quantization_table(quality, base);
    let blocks_x = width / BLOCK_SIZE;
    let blocks_y = height / BLOCK_SIZE;

    #[cfg(feature = "rayon")]
    let coded_blocks: Vec<Result<Vec<u8>>> = {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        (0 .. blocks_y).into_par_iter()
            .flat_map(|block_y| (0 .. blocks_x).into_par_iter().map(move |block_x| (block_y, block_x)))
            .map(|(block_y, block_x)| encode_tile(samples, width, block_x, block_y, &table))
            .collect()
    };

    #[cfg(not(feature = "rayon"))]
    let coded_blocks: Vec<Result<Vec<u8>>> = (0 .. blocks_y)
        .flat_map(|block_y| (0 .. blocks_x).map(move |block_x| (block_y, block_x)))
        .map(|(block_y, block_x)| encode_tile(samples, width, block_x, block_y, &table))
        .collect();

    let mut chunk_sizes = Vec::with_capacity(blocks_x * blocks_y);
    let mut content = Vec::new();

    // the workers wrote into independent buffers; this assembles
    // them in row major block order and re-raises the first error
    for coded in coded_blocks {
        let coded = coded?;
        debug_assert!(!coded.is_empty() && coded.len() <= MAX_CODED_BLOCK_BYTES);

        chunk_sizes.push(coded.len() as u8);
        content.extend_from_slice(&coded);
    }

    Ok(CompressedPlane { chunk_sizes, content })
}

/// Transform and code a single 8×8 tile of the plane.
fn encode_tile(
    samples: &[u8], width: usize,
    block_x: usize, block_y: usize,
    table: &[f32; BLOCK_AREA],
) -> Result<Vec<u8>>
{
    let mut block = [0.0_f32; BLOCK_AREA];

    for row in 0 .. BLOCK_SIZE {
        for column in 0 .. BLOCK_SIZE {
            let sample = samples[(block_y * BLOCK_SIZE + row) * width + block_x * BLOCK_SIZE + column];
            block[row * BLOCK_SIZE + column] = f32::from(sample) - 128.0;
        }
    }

    let coefficients = transform::forward_block(&block, table);
    huffman::encode(&coefficients)?.to_bytes()
}

/// Decode one plane into the preallocated output samples.
/// The rows are processed in bands of eight, which write
/// into disjoint regions of the output.
fn decode_plane(
    plane: &CompressedPlane, output: &mut [u8],
    resolution: Vec2<usize>, quality: u8, base: &'static [f32; BLOCK_AREA],
) -> UnitResult
{
    let Vec2(width, height) = resolution;
    debug_assert_eq!(output.len(), width * height, "plane size mismatch");
    debug_assert_eq!(plane.chunk_sizes.len(), block_count(resolution), "validated when reading the payload");

    let table = transform::quantization_table(quality, base);
    let offsets = plane.content_offsets();

    #[cfg(feature = "rayon")]
    let decoded_bands: Vec<UnitResult> = {
        use rayon::iter::{IndexedParallelIterator, ParallelIterator};
        use rayon::slice::ParallelSliceMut;

        output.par_chunks_mut(BLOCK_SIZE * width).enumerate()
            .map(|(block_y, band)| decode_band(plane, &offsets, band, width, block_y, &table))
            .collect()
    };

    #[cfg(not(feature = "rayon"))]
    let decoded_bands: Vec<UnitResult> = output.chunks_mut(BLOCK_SIZE * width).enumerate()
        .map(|(block_y, band)| decode_band(plane, &offsets, band, width, block_y, &table))
        .collect();

    for band in decoded_bands {
        band?;
    }

    Ok(())
}

/// Decode one band of eight sample rows, one tile at a time.
fn decode_band(
    plane: &CompressedPlane, offsets: &[usize],
    band: &mut [u8], width: usize, block_y: usize,
    table: &[f32; BLOCK_AREA],
) -> UnitResult
{
    let blocks_x = width / BLOCK_SIZE;

    for block_x in 0 .. blocks_x {
        let index = block_y * blocks_x + block_x;
        let start = offsets[index];
        let size = usize::from(plane.chunk_sizes[index]);

        let coefficients = CodedBlock::from_bytes(&plane.content[start .. start + size])?.decode()?;
        let restored = transform::inverse_block(&coefficients, table);

        for row in 0 .. BLOCK_SIZE {
            for column in 0 .. BLOCK_SIZE {
                let value = restored[row * BLOCK_SIZE + column].round() as i32 + 128;
                band[row * width + block_x * BLOCK_SIZE + column] = value.clamp(0, 255) as u8;
            }
        }
    }

    Ok(())
}
