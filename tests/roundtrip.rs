
//! Full pipeline tests: color conversion, compression,
//! decompression, and file round trips.

use std::io::Cursor;

use rand::prelude::*;

use myyuv::prelude::*;


fn random_pixels(random: &mut StdRng, resolution: Vec2<usize>) -> Vec<u8> {
    (0 .. resolution.area() * 4).map(|_| random.random()).collect()
}

/// Pixels that vary smoothly with small superimposed noise,
/// resembling natural image content.
fn smooth_pixels(random: &mut StdRng, resolution: Vec2<usize>) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(resolution.area() * 4);

    for y in 0 .. resolution.height() {
        for x in 0 .. resolution.width() {
            let base = ((x * 5 + y * 3) % 200) as i32;
            for _ in 0 .. 4 {
                let noise = random.random_range(-8 .. 8_i32);
                pixels.push((base + 30 + noise).clamp(0, 255) as u8);
            }
        }
    }

    pixels
}

/// The largest per-sample difference in the specified plane of both images.
fn max_plane_difference(a: &Yuv, b: &Yuv, plane_index: usize) -> i16 {
    let plane_a = a.planes().unwrap()[plane_index];
    let plane_b = b.planes().unwrap()[plane_index];
    assert_eq!(plane_a.len(), plane_b.len(), "plane sizes differ");

    plane_a.iter().zip(plane_b.iter())
        .map(|(&a, &b)| (i16::from(a) - i16::from(b)).abs())
        .max().expect("planes are not empty")
}


#[test]
fn compressed_round_trip_keeps_resolutions_and_stays_bounded() {
    let mut random = StdRng::seed_from_u64(1994);

    for &quality in &[1_u8, 50, 100] {
        for &width in &[16_u32, 32, 64, 128] {
            for &height in &[16_u32, 32, 64, 128] {
                let resolution = Vec2(width as usize, height as usize);
                let pixels = random_pixels(&mut random, resolution);

                let original = Yuv::from_rgb(&pixels, width, height, 32, Format::Iyuv).unwrap();
                let restored = original
                    .compress(Compression::Dct, &[quality; 3]).unwrap()
                    .decompress().unwrap();

                assert_eq!(restored.resolution(), original.resolution());
                assert_eq!(restored.compression(), Compression::None);

                for plane_index in 0 .. 3 {
                    assert_eq!(
                        restored.planes().unwrap()[plane_index].len(),
                        original.planes().unwrap()[plane_index].len()
                    );
                }

                // with all divisors at one, only float rounding remains
                if quality == 100 {
                    for plane_index in 0 .. 3 {
                        assert!(max_plane_difference(&original, &restored, plane_index) <= 8);
                    }
                }
            }
        }
    }
}

#[test]
fn smooth_content_survives_mid_quality() {
    let mut random = StdRng::seed_from_u64(7);
    let resolution = Vec2(64_usize, 64);
    let pixels = smooth_pixels(&mut random, resolution);

    let original = Yuv::from_rgb(&pixels, 64, 64, 32, Format::Iyuv).unwrap();
    let restored = original
        .compress(Compression::Dct, &[50, 50, 50]).unwrap()
        .decompress().unwrap();

    for plane_index in 0 .. 3 {
        assert!(
            max_plane_difference(&original, &restored, plane_index) <= 20,
            "plane {} differs too much at quality 50", plane_index
        );
    }
}

#[test]
fn decompress_is_idempotent_beyond_the_first_call() {
    let mut random = StdRng::seed_from_u64(3);
    let pixels = random_pixels(&mut random, Vec2(32, 32));

    let compressed = Yuv::from_rgb(&pixels, 32, 32, 32, Format::Iyuv).unwrap()
        .compress(Compression::Dct, &[80, 60, 60]).unwrap();

    let once = compressed.decompress().unwrap();
    let twice = once.decompress().unwrap();

    assert_eq!(once.planes().unwrap(), twice.planes().unwrap());
}

#[test]
fn file_round_trip_is_bytewise_identical() {
    let mut random = StdRng::seed_from_u64(11);
    let pixels = random_pixels(&mut random, Vec2(32, 16));

    let uncompressed = Yuv::from_rgb(&pixels, 32, 16, 32, Format::Iyuv).unwrap();
    let compressed = uncompressed.compress(Compression::Dct, &[90, 90, 90]).unwrap();

    for (image, name) in [(&uncompressed, "plain"), (&compressed, "dct")] {
        let path = std::env::temp_dir().join(format!("myyuv_file_round_trip_{}.myyuv", name));

        image.dump(&path).unwrap();
        let loaded = Yuv::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(&loaded, image, "reloaded {} image differs", name);
    }
}

#[test]
fn compressed_file_decompresses_like_the_in_memory_image() {
    let mut random = StdRng::seed_from_u64(23);
    let pixels = random_pixels(&mut random, Vec2(16, 32));

    let compressed = Yuv::from_rgb(&pixels, 16, 32, 32, Format::Iyuv).unwrap()
        .compress(Compression::Dct, &[75, 75, 75]).unwrap();

    let mut bytes = Vec::new();
    compressed.write_to_buffered(&mut bytes).unwrap();

    let reloaded = Yuv::read_from_buffered(Cursor::new(bytes)).unwrap();
    assert_eq!(reloaded.decompress().unwrap(), compressed.decompress().unwrap());
}

#[test]
fn solid_white_compresses_to_a_small_uniform_file() {
    let pixels = vec![255_u8; 16 * 16 * 4];
    let image = Yuv::from_rgb(&pixels, 16, 16, 32, Format::Iyuv).unwrap();
    let compressed = image.compress(Compression::Dct, &[50, 50, 50]).unwrap();

    let mut file = Vec::new();
    compressed.write_to_buffered(&mut file).unwrap();
    assert!(file.len() <= 300, "solid white file too large: {} bytes", file.len());

    let restored = compressed.decompress().unwrap();
    let planes = restored.planes().unwrap();

    // solid white has full luma and neutral chroma, and survives uniformly
    assert!(planes[0].iter().all(|&luma| luma >= 250));
    assert!(planes[1].iter().all(|&chroma| (123 ..= 133).contains(&chroma)));
    assert!(planes[2].iter().all(|&chroma| (123 ..= 133).contains(&chroma)));
}

#[test]
fn red_gradient_survives_high_quality() {
    let mut pixels = Vec::with_capacity(32 * 32 * 4);
    for _y in 0 .. 32 {
        for x in 0 .. 32 {
            let red = (x * 255 / 31) as u8;
            pixels.extend_from_slice(&[0, 0, red, 255]); // bmp byte order: blue first
        }
    }

    let original = Yuv::from_rgb(&pixels, 32, 32, 32, Format::Iyuv).unwrap();
    let restored = original
        .compress(Compression::Dct, &[90, 90, 90]).unwrap()
        .decompress().unwrap();

    assert!(max_plane_difference(&original, &restored, 0) <= 4, "luma error too large");
    assert!(max_plane_difference(&original, &restored, 1) <= 6, "blue chroma error too large");
    assert!(max_plane_difference(&original, &restored, 2) <= 6, "red chroma error too large");
}

#[test]
fn tampered_chunk_sizes_are_rejected() {
    let mut random = StdRng::seed_from_u64(31);
    let pixels = random_pixels(&mut random, Vec2(16, 16));

    let compressed = Yuv::from_rgb(&pixels, 16, 16, 32, Format::Iyuv).unwrap()
        .compress(Compression::Dct, &[50, 50, 50]).unwrap();

    let mut bytes = Vec::new();
    compressed.write_to_buffered(&mut bytes).unwrap();

    // the first chunk size of the luma plane lives behind the header,
    // the parameters, the three payload plane sizes, and two plane fields
    let chunk_size_offset = 64 + 3 + 12 + 8;
    bytes[chunk_size_offset] = bytes[chunk_size_offset].wrapping_add(1);

    let tampered = Yuv::read_from_buffered(Cursor::new(bytes)).unwrap();
    assert!(matches!(tampered.decompress(), Err(Error::Corrupt(_))));
}

#[test]
fn quality_outside_the_valid_range_is_rejected() {
    let pixels = vec![0_u8; 16 * 16 * 4];
    let image = Yuv::from_rgb(&pixels, 16, 16, 32, Format::Iyuv).unwrap();

    assert!(matches!(
        image.compress(Compression::Dct, &[0, 50, 50]),
        Err(Error::BadParameters(_))
    ));

    assert!(matches!(
        image.compress(Compression::Dct, &[50, 101, 50]),
        Err(Error::BadParameters(_))
    ));

    assert!(matches!(
        image.compress(Compression::Dct, &[50, 50]),
        Err(Error::BadParameters(_))
    ));
}

#[test]
fn compressing_twice_is_rejected() {
    let pixels = vec![127_u8; 16 * 16 * 4];
    let compressed = Yuv::from_rgb(&pixels, 16, 16, 32, Format::Iyuv).unwrap()
        .compress(Compression::Dct, &[50, 50, 50]).unwrap();

    assert!(matches!(
        compressed.compress(Compression::Dct, &[50, 50, 50]),
        Err(Error::AlreadyCompressed)
    ));
}

#[test]
fn minimum_image_has_the_expected_plane_sizes() {
    let pixels = vec![90_u8; 16 * 16 * 4];
    let image = Yuv::from_rgb(&pixels, 16, 16, 32, Format::Iyuv).unwrap();

    // four 8×8 luma blocks, one block per chroma plane
    let planes = image.planes().unwrap();
    assert_eq!(planes[0].len(), 4 * 64);
    assert_eq!(planes[1].len(), 64);
    assert_eq!(planes[2].len(), 64);

    let restored = image.compress(Compression::Dct, &[50, 50, 50]).unwrap()
        .decompress().unwrap();
    assert_eq!(restored.planes().unwrap()[0].len(), 4 * 64);
}

#[test]
fn truncated_file_is_rejected() {
    let pixels = vec![50_u8; 16 * 16 * 4];
    let image = Yuv::from_rgb(&pixels, 16, 16, 32, Format::Iyuv).unwrap();

    let mut bytes = Vec::new();
    image.write_to_buffered(&mut bytes).unwrap();
    bytes.truncate(bytes.len() - 10);

    assert!(Yuv::read_from_buffered(Cursor::new(bytes)).is_err());
}
