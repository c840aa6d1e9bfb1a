use crate::error::MeshError;

/// Bounded little-endian cursor over an immutable byte span.
///
/// Any out-of-range read returns `MeshError::Format`, never a panic.
///
/// # Example
/// ```
/// use gm_mesh::reader::ByteReader;
/// let data = [1u8, 0, 0, 0, 0xff];
/// let mut r = ByteReader::new(&data);
/// assert_eq!(r.read_u32().unwrap(), 1);
/// assert!(r.read_u32().is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Consumes `len` bytes.
    ///
    /// # Errors
    /// `MeshError::Format` if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], MeshError> {
        let bytes = self.slice_at(self.pos, len)?;
        self.pos += len;
        Ok(bytes)
    }

    /// # Errors
    /// `MeshError::Format` if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32, MeshError> {
        let v = self.u32_at(self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    /// Absolute sub-slice `[offset, offset + len)`.
    ///
    /// # Errors
    /// `MeshError::Format` if the range overflows or exceeds the buffer.
    pub fn slice_at(&self, offset: usize, len: usize) -> Result<&'a [u8], MeshError> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                MeshError::format(format!(
                    "lecture hors limites : {len} octets à l'offset {offset} (taille {})",
                    self.data.len()
                ))
            })
    }

    /// # Errors
    /// `MeshError::Format` on out-of-range read.
    pub fn u8_at(&self, offset: usize) -> Result<u8, MeshError> {
        Ok(self.slice_at(offset, 1)?[0])
    }

    /// # Errors
    /// `MeshError::Format` on out-of-range read.
    pub fn u16_at(&self, offset: usize) -> Result<u16, MeshError> {
        let b = self.slice_at(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// # Errors
    /// `MeshError::Format` on out-of-range read.
    pub fn u32_at(&self, offset: usize) -> Result<u32, MeshError> {
        let b = self.slice_at(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// # Errors
    /// `MeshError::Format` on out-of-range read.
    pub fn f32_at(&self, offset: usize) -> Result<f32, MeshError> {
        let b = self.slice_at(offset, 4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Three consecutive little-endian `f32` starting at `offset`.
    ///
    /// # Errors
    /// `MeshError::Format` if the 12-byte range overflows or exceeds the buffer.
    pub fn vec3_at(&self, offset: usize) -> Result<[f32; 3], MeshError> {
        let r = ByteReader::new(self.slice_at(offset, 12)?);
        Ok([r.f32_at(0)?, r.f32_at(4)?, r.f32_at(8)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_values() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0102u16.to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        let r = ByteReader::new(&data);
        assert_eq!(r.u16_at(0).unwrap(), 0x0102);
        assert_eq!(r.f32_at(2).unwrap(), 1.5);
        assert_eq!(r.u8_at(0).unwrap(), 0x02);
    }

    #[test]
    fn offset_overflow_is_format_error() {
        let r = ByteReader::new(&[0u8; 8]);
        assert!(matches!(r.slice_at(usize::MAX, 2), Err(MeshError::Format(_))));
        assert!(r.f32_at(5).is_err());
        assert!(r.vec3_at(usize::MAX - 4).is_err());
        assert!(r.vec3_at(0).is_err());
    }

    #[test]
    fn failed_read_does_not_advance() {
        let mut r = ByteReader::new(&[0u8; 6]);
        r.read_u32().unwrap();
        assert!(r.read_u32().is_err());
        assert_eq!(r.remaining(), 2);
    }
}
