
//! The 8×8 discrete cosine transform and its quality-scaled quantization.
//!
//! The basis matrix is stored as explicit single-precision constants so that
//! two machines always produce bit-identical quantized coefficients.

use super::BLOCK_AREA;


/// The orthonormal type-II dct basis matrix, row major.
/// Row `k` samples the `k`-th cosine frequency at the eight pixel centers.
const DCT_BASIS: [f32; BLOCK_AREA] = [
    0.3535533845424652, 0.3535533845424652, 0.3535533845424652, 0.3535533845424652, 0.3535533845424652, 0.3535533845424652, 0.3535533845424652, 0.3535533845424652,
    0.4903925955295563, 0.4157347679138184, 0.277785062789917, 0.09754510968923569, -0.09754515439271927, -0.2777851521968842, -0.4157347977161407, -0.4903926253318787,
    0.4619397222995758, 0.1913416981697083, -0.1913417428731918, -0.4619397819042206, -0.4619397222995758, -0.1913415491580963, 0.1913417875766754, 0.4619397521018982,
    0.4157347679138184, -0.09754515439271927, -0.4903926253318787, -0.2777849733829498, 0.2777851819992065, 0.4903925955295563, 0.09754502773284912, -0.4157348573207855,
    0.3535533547401428, -0.3535533547401428, -0.353553295135498, 0.3535534739494324, 0.3535533547401428, -0.3535535931587219, -0.3535532355308533, 0.3535533845424652,
    0.277785062789917, -0.4903926253318787, 0.09754519909620285, 0.4157346487045288, -0.4157348573207855, -0.09754510223865509, 0.4903926253318787, -0.2777853906154633,
    0.1913416981697083, -0.4619397222995758, 0.4619397521018982, -0.1913419365882874, -0.1913414746522903, 0.4619396328926086, -0.4619398415088654, 0.1913419365882874,
    0.09754510968923569, -0.2777849733829498, 0.4157346487045288, -0.4903925657272339, 0.4903926849365234, -0.4157347679138184, 0.2777855396270752, -0.09754576534032822,
];

/// The standard jpeg luminance quantization table, used for plane 0.
/// Tuned for a quality of 50; `quantization_table` scales it to other qualities.
pub const LUMA_BASE_TABLE: [f32; BLOCK_AREA] = [
    16.0, 11.0, 10.0, 16.0, 24.0, 40.0, 51.0, 61.0,
    12.0, 12.0, 14.0, 19.0, 26.0, 58.0, 60.0, 55.0,
    14.0, 13.0, 16.0, 24.0, 40.0, 57.0, 69.0, 56.0,
    14.0, 17.0, 22.0, 29.0, 51.0, 87.0, 80.0, 62.0,
    18.0, 22.0, 37.0, 56.0, 68.0, 109.0, 103.0, 77.0,
    24.0, 35.0, 55.0, 64.0, 81.0, 104.0, 113.0, 92.0,
    49.0, 64.0, 78.0, 87.0, 103.0, 121.0, 120.0, 101.0,
    72.0, 92.0, 95.0, 98.0, 112.0, 100.0, 103.0, 99.0,
];

/// The standard jpeg chrominance quantization table, used for planes 1 and 2.
pub const CHROMA_BASE_TABLE: [f32; BLOCK_AREA] = [
    17.0, 18.0, 24.0, 47.0, 99.0, 99.0, 99.0, 99.0,
    18.0, 21.0, 26.0, 66.0, 99.0, 99.0, 99.0, 99.0,
    24.0, 26.0, 56.0, 99.0, 99.0, 99.0, 99.0, 99.0,
    47.0, 66.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0,
    99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0,
    99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0,
    99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0,
    99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0, 99.0,
];


/// Scale a base quantization table to the specified quality in `1..=100`.
/// Entries stay within `1.0..=255.0`.
pub fn quantization_table(quality: u8, base: &[f32; BLOCK_AREA]) -> [f32; BLOCK_AREA] {
    debug_assert!((1 ..= 100).contains(&quality), "quality out of range");

    let quality = f32::from(quality);
    let scale = if quality >= 50.5 { (100.0 - quality) / 50.0 } else { 50.0 / quality };

    let mut table = [0.0; BLOCK_AREA];
    for (entry, &base_entry) in table.iter_mut().zip(base.iter()) {
        *entry = (base_entry * scale).round().clamp(1.0, 255.0);
    }

    table
}


/// Transform one block of centered samples into quantized frequency
/// coefficients: `round((A · block · Aᵀ)[i] / table[i])`, clamped to `i16`.
/// The caller centers the samples by subtracting 128 beforehand.
pub fn forward_block(samples: &[f32; BLOCK_AREA], table: &[f32; BLOCK_AREA]) -> [i16; BLOCK_AREA] {
    let transformed = multiply_right_transposed(&multiply(&DCT_BASIS, samples), &DCT_BASIS);

    let mut coefficients = [0_i16; BLOCK_AREA];
    for (coefficient, (value, divisor)) in coefficients.iter_mut().zip(transformed.iter().zip(table.iter())) {
        *coefficient = (value / divisor).round()
            .clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
    }

    coefficients
}

/// Transform quantized coefficients back into centered samples:
/// `Aᵀ · (coefficients · table) · A`. The caller adds 128 and
/// clamps each sample to `0..=255` afterwards.
pub fn inverse_block(coefficients: &[i16; BLOCK_AREA], table: &[f32; BLOCK_AREA]) -> [f32; BLOCK_AREA] {
    let mut dequantized = [0.0; BLOCK_AREA];
    for (value, (&coefficient, factor)) in dequantized.iter_mut().zip(coefficients.iter().zip(table.iter())) {
        *value = f32::from(coefficient) * factor;
    }

    multiply(&multiply_left_transposed(&DCT_BASIS, &dequantized), &DCT_BASIS)
}


/// `a · b` for row-major 8×8 matrices.
fn multiply(a: &[f32; BLOCK_AREA], b: &[f32; BLOCK_AREA]) -> [f32; BLOCK_AREA] {
    let mut product = [0.0; BLOCK_AREA];

    for row in 0 .. 8 {
        for inner in 0 .. 8 {
            for column in 0 .. 8 {
                product[row * 8 + column] += a[row * 8 + inner] * b[inner * 8 + column];
            }
        }
    }

    product
}

/// `a · bᵀ` for row-major 8×8 matrices.
fn multiply_right_transposed(a: &[f32; BLOCK_AREA], b: &[f32; BLOCK_AREA]) -> [f32; BLOCK_AREA] {
    let mut product = [0.0; BLOCK_AREA];

    for row in 0 .. 8 {
        for inner in 0 .. 8 {
            for column in 0 .. 8 {
                product[row * 8 + column] += a[row * 8 + inner] * b[column * 8 + inner];
            }
        }
    }

    product
}

/// `aᵀ · b` for row-major 8×8 matrices.
fn multiply_left_transposed(a: &[f32; BLOCK_AREA], b: &[f32; BLOCK_AREA]) -> [f32; BLOCK_AREA] {
    let mut product = [0.0; BLOCK_AREA];

    for row in 0 .. 8 {
        for inner in 0 .. 8 {
            for column in 0 .. 8 {
                product[row * 8 + column] += a[inner * 8 + row] * b[inner * 8 + column];
            }
        }
    }

    product
}
