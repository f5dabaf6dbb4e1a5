
//! Specialized binary input and output.
//! Uses the error handling for this crate.

pub use ::std::io::{Read, Write};
use lebe::prelude::*;
use crate::error::{Error, Result, UnitResult};


/// Extension trait for primitive types like numbers and arrays.
/// Everything in a yuv file is stored as little endian.
pub trait Data: Sized + Default + Clone {

    /// Number of bytes this would consume in a yuv file.
    const BYTE_SIZE: usize = ::std::mem::size_of::<Self>();

    /// Read a value of type `Self`.
    fn read(read: &mut impl Read) -> Result<Self>;

    /// Read as many values of type `Self` as fit into the specified slice.
    /// If the slice cannot be filled completely, returns `Error::Io`.
    fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> UnitResult;

    /// Read as many values of type `Self` as specified with `data_size`.
    /// The `soft_max` should be a reasonable upper bound for the expected
    /// number of values. If a file declares more than that,
    /// it is considered corrupt instead of allocating the memory.
    #[inline]
    fn read_vec(read: &mut impl Read, data_size: usize, soft_max: usize, purpose: &'static str) -> Result<Vec<Self>> {
        if data_size > soft_max {
            return Err(Error::corrupt(purpose));
        }

        let mut vec = vec![Self::default(); data_size];
        Self::read_slice(read, &mut vec)?;
        Ok(vec)
    }

    /// Write this value to the writer.
    fn write(self, write: &mut impl Write) -> UnitResult;

    /// Write all values of that slice to the writer.
    fn write_slice(write: &mut impl Write, slice: &[Self]) -> UnitResult;
}


macro_rules! implement_data_for_primitive {
    ($kind: ident) => {
        impl Data for $kind {
            #[inline]
            fn read(read: &mut impl Read) -> Result<Self> {
                Ok(read.read_from_little_endian()?)
            }

            #[inline]
            fn write(self, write: &mut impl Write) -> UnitResult {
                write.write_as_little_endian(&self)?;
                Ok(())
            }

            #[inline]
            fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> UnitResult {
                read.read_from_little_endian_into(slice)?;
                Ok(())
            }

            #[inline]
            fn write_slice(write: &mut impl Write, slice: &[Self]) -> UnitResult {
                write.write_as_little_endian(slice)?;
                Ok(())
            }
        }
    };
}

implement_data_for_primitive!(u8);
implement_data_for_primitive!(i8);
implement_data_for_primitive!(u16);
implement_data_for_primitive!(i16);
implement_data_for_primitive!(u32);
implement_data_for_primitive!(i32);
implement_data_for_primitive!(u64);
implement_data_for_primitive!(i64);
implement_data_for_primitive!(f32);
implement_data_for_primitive!(f64);


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_primitives() {
        let mut bytes = Vec::new();
        0x0102_0304_u32.write(&mut bytes).unwrap();
        0x4142_u16.write(&mut bytes).unwrap();
        (-3_i16).write(&mut bytes).unwrap();

        assert_eq!(bytes, vec![0x04, 0x03, 0x02, 0x01, 0x42, 0x41, 0xfd, 0xff]);

        let mut read = bytes.as_slice();
        assert_eq!(u32::read(&mut read).unwrap(), 0x0102_0304);
        assert_eq!(u16::read(&mut read).unwrap(), 0x4142);
        assert_eq!(i16::read(&mut read).unwrap(), -3);
    }

    #[test]
    fn reject_oversized_vector() {
        let bytes = [0_u8; 16];
        assert!(matches!(
            u8::read_vec(&mut bytes.as_slice(), 12, 8, "test size"),
            Err(Error::Corrupt(_))
        ));
    }
}
