use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemError {
    #[error("address out of range: 0x{0:08x}")]
    Oob(u32),

    #[error("misaligned {width}-byte access at 0x{addr:08x}")]
    Misaligned { addr: u32, width: u32 },
}

/// Flat RAM starting at address 0, stored as little-endian 32-bit words.
pub struct Memory {
    words: Vec<u32>,
}

impl Memory {
    pub fn new(words: usize) -> Self {
        Self {
            words: vec![0; words],
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.words.len() * 4
    }

    /// Returns the word index for an access of `width` bytes at `addr`.
    fn check(&self, addr: u32, width: u32) -> Result<usize, MemError> {
        if addr % width != 0 {
            return Err(MemError::Misaligned { addr, width });
        }
        let idx = (addr >> 2) as usize;
        if idx >= self.words.len() {
            return Err(MemError::Oob(addr));
        }
        Ok(idx)
    }

    pub fn read_u32(&self, addr: u32) -> Result<u32, MemError> {
        let idx = self.check(addr, 4)?;
        Ok(self.words[idx])
    }

    pub fn write_u32(&mut self, addr: u32, v: u32) -> Result<(), MemError> {
        let idx = self.check(addr, 4)?;
        self.words[idx] = v;
        Ok(())
    }

    pub fn read_u16(&self, addr: u32) -> Result<u16, MemError> {
        let idx = self.check(addr, 2)?;
        let shift = (addr & 2) * 8;
        Ok((self.words[idx] >> shift) as u16)
    }

    pub fn write_u16(&mut self, addr: u32, v: u16) -> Result<(), MemError> {
        let idx = self.check(addr, 2)?;
        let shift = (addr & 2) * 8;
        let word = &mut self.words[idx];
        *word = (*word & !(0xffff << shift)) | ((v as u32) << shift);
        Ok(())
    }

    pub fn read_u8(&self, addr: u32) -> Result<u8, MemError> {
        let idx = self.check(addr, 1)?;
        let shift = (addr & 3) * 8;
        Ok((self.words[idx] >> shift) as u8)
    }

    pub fn write_u8(&mut self, addr: u32, v: u8) -> Result<(), MemError> {
        let idx = self.check(addr, 1)?;
        let shift = (addr & 3) * 8;
        let word = &mut self.words[idx];
        *word = (*word & !(0xff << shift)) | ((v as u32) << shift);
        Ok(())
    }

    /// Copies `bytes` into RAM starting at address 0. Anything past the end of
    /// RAM is ignored; returns how many bytes were stored.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.size_bytes());
        for (i, chunk) in bytes[..n].chunks(4).enumerate() {
            // a trailing partial word keeps whatever was there before
            let mut lane = self.words[i].to_le_bytes();
            lane[..chunk.len()].copy_from_slice(chunk);
            self.words[i] = u32::from_le_bytes(lane);
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_store_keeps_neighbours() {
        let mut mem = Memory::new(4);
        mem.write_u32(4, 0xaabb_ccdd).unwrap();
        mem.write_u8(5, 0x11).unwrap();
        assert_eq!(mem.read_u32(4).unwrap(), 0xaabb_11dd);
        assert_eq!(mem.read_u8(5).unwrap(), 0x11);
        assert_eq!(mem.read_u8(7).unwrap(), 0xaa);
    }

    #[test]
    fn half_store_keeps_neighbours() {
        let mut mem = Memory::new(4);
        mem.write_u32(8, 0x1234_5678).unwrap();
        mem.write_u16(10, 0xbeef).unwrap();
        assert_eq!(mem.read_u32(8).unwrap(), 0xbeef_5678);
        assert_eq!(mem.read_u16(8).unwrap(), 0x5678);
    }

    #[test]
    fn misaligned_and_out_of_range() {
        let mut mem = Memory::new(4);
        assert_eq!(
            mem.read_u32(2),
            Err(MemError::Misaligned { addr: 2, width: 4 })
        );
        assert_eq!(
            mem.write_u16(1, 0),
            Err(MemError::Misaligned { addr: 1, width: 2 })
        );
        assert_eq!(mem.read_u8(16), Err(MemError::Oob(16)));
        assert_eq!(mem.write_u32(0xffff_fffc, 0), Err(MemError::Oob(0xffff_fffc)));
    }

    #[test]
    fn load_is_little_endian_and_truncated() {
        let mut mem = Memory::new(2);
        let stored = mem.load_bytes(&[0x13, 0x05, 0x50, 0x00, 0xaa, 0xbb, 0xcc, 0xdd, 0xee]);
        assert_eq!(stored, 8);
        assert_eq!(mem.read_u32(0).unwrap(), 0x0050_0513);
        assert_eq!(mem.read_u32(4).unwrap(), 0xddcc_bbaa);
    }

    #[test]
    fn short_load_leaves_tail_zeroed() {
        let mut mem = Memory::new(2);
        assert_eq!(mem.load_bytes(&[1, 2, 3, 4, 5]), 5);
        assert_eq!(mem.read_u32(4).unwrap(), 5);
    }
}
