// Sun Oct 18 2026 - Alex

pub mod catalog;
pub mod config;
pub mod dumper;
pub mod memory;
pub mod utils;
pub mod walker;

pub use catalog::StructureCatalog;
pub use config::Config;
pub use dumper::{ClassSummaryHelper, LinearDumper, RegionPrinter};
pub use memory::{Address, ImageMemory, MemoryReader};
pub use walker::{ClassWalkCallbacks, ClassWalker, WalkContext};
