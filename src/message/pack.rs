//! Little-endian placement of fixed-width integers into a message payload.

/// A fixed-width integer that can be packed into a message payload.
pub trait PackValue: Copy {
    /// Number of payload bytes taken by one value.
    const WIDTH: usize;

    /// Writes the value little-endian at `start_byte`, byte `i` of the value landing at
    /// `start_byte + i`.
    ///
    /// # Panics
    ///
    /// Panics if the value does not fit. `Message` checks its capacity before packing.
    fn pack_into(self, payload: &mut [u8], start_byte: usize);
}

macro_rules! impl_pack_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PackValue for $ty {
                const WIDTH: usize = core::mem::size_of::<$ty>();

                fn pack_into(self, payload: &mut [u8], start_byte: usize) {
                    payload[start_byte..start_byte + Self::WIDTH]
                        .copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_pack_value!(u8, i8, u16, i16, u32, i32, u64, i64);
