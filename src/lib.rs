
//! Read and write myyuv images: planar yuv 4:2:0 pixel data in a
//! self-describing container, optionally compressed with a jpeg-style
//! pipeline of blockwise dct, quantization, and huffman coding.

#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
    missing_debug_implementations,

    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
)]

#![deny(
    unused_variables,
    unused_assignments,
    dead_code,
    unused_must_use,
    missing_copy_implementations,
    trivial_numeric_casts,
    redundant_semicolons
)]

#![forbid(unsafe_code)]

pub mod error;
pub mod io;
pub mod math;
pub mod meta;
pub mod image;
pub mod compression;

mod convert;

/// Re-exports of all types commonly required
/// for simple reading, writing, and converting of a yuv image.
pub mod prelude {

    // main exports
    pub use crate::image::Yuv;

    // secondary data types
    pub use crate::meta;
    pub use crate::meta::Header;
    pub use crate::meta::attribute::{Compression, Format};
    pub use crate::error;
    pub use crate::error::{Error, Result};
    pub use crate::math::Vec2;
}
