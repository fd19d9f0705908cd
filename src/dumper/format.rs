// Sat Oct 17 2026 - Alex

use crate::memory::Address;

// Column widths are part of the output format.
pub const VALUE_WIDTH: usize = 20;
pub const NAME_WIDTH: usize = 28;
pub const SUMMARY_PATH_WIDTH: usize = 39;

/// `<start>-<end> [ <value> <name> ] <detail>`, with the value right-aligned
/// and the name left-aligned.
pub fn detail_line(start: Address, end: Address, value: &str, name: &str, detail: &str) -> String {
    let line = format!(
        "{}-{} [ {:>vw$} {:<nw$} ]",
        start,
        end,
        value,
        name,
        vw = VALUE_WIDTH,
        nw = NAME_WIDTH
    );
    if detail.is_empty() {
        line
    } else {
        format!("{} {}", line, detail)
    }
}

pub fn section_start_banner(name: &str, length: u64) -> String {
    format!("Section Start: {} ({} bytes)", name, length)
}

pub fn section_end_banner(name: &str) -> String {
    format!("Section End: {}", name)
}

pub fn summary_header() -> String {
    format!("{:<pw$} {:<8} {:<8} {:<6}", "Section", "Bytes", "kB", "%", pw = SUMMARY_PATH_WIDTH)
}

pub fn summary_line(path: &str, bytes: u64, kilobytes: f64, percent: f64) -> String {
    format!("{:<pw$} {:<8} {:<8.2} {:<6.2}", path, bytes, kilobytes, percent, pw = SUMMARY_PATH_WIDTH)
}
