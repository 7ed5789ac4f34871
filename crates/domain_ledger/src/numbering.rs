//! Sequence number formatting
//!
//! Numbers are shown zero-padded to four digits (`0001`). When reading a
//! number back, only its trailing run of digits counts, so numbers typed
//! with a prefix such as `FA-2024-0007` still take part in numbering.

/// Minimum width of a formatted sequence number
pub const NUMBER_WIDTH: usize = 4;

/// Formats a sequence number, e.g. `7` → `"0007"`
///
/// Numbers above 9999 keep all their digits.
pub fn format_number(value: u32) -> String {
    format!("{:0width$}", value, width = NUMBER_WIDTH)
}

/// Numeric value of a document number
///
/// Returns 0 when the number has no trailing digits or does not fit in a
/// `u32`.
pub fn parse_number(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let digits_start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    match digits_start {
        Some(start) => trimmed[start..].parse().unwrap_or(0),
        None => 0,
    }
}
