#[macro_use]
extern crate bencher;

extern crate myyuv;
use myyuv::prelude::*;

use bencher::Bencher;

fn gradient_image(width: u32, height: u32) -> Yuv {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);

    for y in 0 .. height {
        for x in 0 .. width {
            pixels.extend_from_slice(&[
                (x % 256) as u8,
                (y % 256) as u8,
                ((x + y) % 256) as u8,
                255,
            ]);
        }
    }

    Yuv::from_rgb(&pixels, width, height, 32, Format::Iyuv).unwrap()
}

/// Convert an rgba buffer to a planar image
fn convert_512(bench: &mut Bencher) {
    let pixels = vec![120_u8; 512 * 512 * 4];

    bench.iter(|| {
        bencher::black_box(Yuv::from_rgb(&pixels, 512, 512, 32, Format::Iyuv).unwrap());
    })
}

/// Compress with dct at medium quality
fn compress_512(bench: &mut Bencher) {
    let image = gradient_image(512, 512);

    bench.iter(|| {
        bencher::black_box(image.compress(Compression::Dct, &[50, 50, 50]).unwrap());
    })
}

/// Decompress a dct compressed image
fn decompress_512(bench: &mut Bencher) {
    let compressed = gradient_image(512, 512).compress(Compression::Dct, &[50, 50, 50]).unwrap();

    bench.iter(|| {
        bencher::black_box(compressed.decompress().unwrap());
    })
}

benchmark_group!(codec,
    convert_512,
    compress_512,
    decompress_512
);

benchmark_main!(codec);
