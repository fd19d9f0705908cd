// Mon Oct 12 2026 - Alex

use crate::memory::{Address, MemoryError};

fn to_array<const N: usize>(bytes: Vec<u8>, addr: Address) -> Result<[u8; N], MemoryError> {
    bytes
        .try_into()
        .map_err(|_| MemoryError::ShortRead { addr: addr.as_u64(), len: N })
}

/// Read access to a post-mortem image. All multi-byte values are little-endian
/// unless the method name says otherwise.
pub trait MemoryReader: Send + Sync {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError>;

    fn pointer_size(&self) -> usize {
        8
    }

    fn is_readable(&self, addr: Address, len: usize) -> bool {
        self.read_bytes(addr, len).is_ok()
    }

    fn read_u8(&self, addr: Address) -> Result<u8, MemoryError> {
        Ok(to_array::<1>(self.read_bytes(addr, 1)?, addr)?[0])
    }

    fn read_u16(&self, addr: Address) -> Result<u16, MemoryError> {
        Ok(u16::from_le_bytes(to_array(self.read_bytes(addr, 2)?, addr)?))
    }

    fn read_u16_be(&self, addr: Address) -> Result<u16, MemoryError> {
        Ok(u16::from_be_bytes(to_array(self.read_bytes(addr, 2)?, addr)?))
    }

    fn read_u32(&self, addr: Address) -> Result<u32, MemoryError> {
        Ok(u32::from_le_bytes(to_array(self.read_bytes(addr, 4)?, addr)?))
    }

    fn read_u64(&self, addr: Address) -> Result<u64, MemoryError> {
        Ok(u64::from_le_bytes(to_array(self.read_bytes(addr, 8)?, addr)?))
    }

    fn read_i32(&self, addr: Address) -> Result<i32, MemoryError> {
        Ok(i32::from_le_bytes(to_array(self.read_bytes(addr, 4)?, addr)?))
    }

    fn read_i64(&self, addr: Address) -> Result<i64, MemoryError> {
        Ok(i64::from_le_bytes(to_array(self.read_bytes(addr, 8)?, addr)?))
    }

    /// Reads an unsigned pointer-sized word.
    fn read_udata(&self, addr: Address) -> Result<u64, MemoryError> {
        match self.pointer_size() {
            4 => Ok(self.read_u32(addr)? as u64),
            8 => self.read_u64(addr),
            other => Err(MemoryError::UnsupportedPointerSize(other)),
        }
    }

    fn read_idata(&self, addr: Address) -> Result<i64, MemoryError> {
        match self.pointer_size() {
            4 => Ok(self.read_i32(addr)? as i64),
            8 => self.read_i64(addr),
            other => Err(MemoryError::UnsupportedPointerSize(other)),
        }
    }

    fn read_ptr(&self, addr: Address) -> Result<Address, MemoryError> {
        Ok(Address::new(self.read_udata(addr)?))
    }

    /// Self-relative pointer: a signed 32-bit offset from its own location.
    /// A zero offset encodes null.
    fn read_srp(&self, addr: Address) -> Result<Option<Address>, MemoryError> {
        let delta = self.read_i32(addr)?;
        Ok((delta != 0).then(|| addr.offset(delta as i64)))
    }

    /// Wide self-relative pointer, pointer-sized.
    fn read_wsrp(&self, addr: Address) -> Result<Option<Address>, MemoryError> {
        let delta = self.read_idata(addr)?;
        Ok((delta != 0).then(|| addr.offset(delta)))
    }

    /// Length-prefixed modified UTF-8 string: a u16 byte count followed by the bytes.
    fn read_utf8(&self, addr: Address) -> Result<String, MemoryError> {
        let len = self.read_u16(addr)? as usize;
        let data = self.read_bytes(addr + 2, len)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}
