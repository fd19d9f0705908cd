// Fri Oct 16 2026 - Alex

pub mod format;
pub mod linear;
pub mod region;
pub mod render;
pub mod summary;

pub use linear::{LinearDumper, STRINGS_SECTION};
pub use region::{layout_order, Region, RegionNode, PADDING_NAME};
pub use render::RegionPrinter;
pub use summary::{ClassSummaryHelper, SummaryEntry};
