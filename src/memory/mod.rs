// Mon Oct 12 2026 - Alex

pub mod address;
pub mod error;
pub mod image;
pub mod range;
pub mod traits;

pub use address::Address;
pub use error::MemoryError;
pub use image::{ImageMemory, Segment};
pub use range::MemoryRange;
pub use traits::MemoryReader;
