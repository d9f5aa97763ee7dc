pub(crate) struct BytesReader<'a> {
    buf: &'a [u8],
    idx: usize,
}

impl<'a> BytesReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, idx: 0 }
    }

    pub fn next(&mut self) -> Option<u8> {
        let val = self.buf.get(self.idx).copied()?;
        self.idx += 1;
        Some(val)
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.idx..]
    }
}

/// Reads a little-endian `u32` starting at `offset`.
pub(crate) fn le_u32_at<const N: usize>(buf: &[u8; N], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}
