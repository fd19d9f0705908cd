// Mon Oct 12 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Read failed at address 0x{0:x}")]
    ReadFailed(u64),
    #[error("Memory fault at address 0x{0:x}")]
    Fault(u64),
    #[error("Short read of {len} bytes at address 0x{addr:x}")]
    ShortRead { addr: u64, len: usize },
    #[error("Unsupported pointer size: {0}")]
    UnsupportedPointerSize(usize),
}
