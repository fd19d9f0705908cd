// Tue Oct 13 2026 - Alex

pub mod logging;
#[cfg(test)]
pub mod testing;

pub use logging::LoggingUtils;
