//! Conversion of raw table cell text into numbers

/// Rows with fewer meaningful cells than this are not data rows
pub const MIN_MEANINGFUL_CELLS: usize = 5;

const PLACEHOLDERS: [&str; 4] = ["", "-", "\u{2013}", "\u{2212}"];

/// Empty cell or a bare dash (hyphen, en-dash, minus sign)
pub fn is_placeholder(cell: &str) -> bool {
    PLACEHOLDERS.contains(&cell.trim())
}

/// Parse one cell. Placeholders and anything unparsable become 0.0.
pub fn parse_cell(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if is_placeholder(trimmed) {
        return 0.0;
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != ',')
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();
    let cleaned = cleaned.strip_suffix('%').unwrap_or(&cleaned);

    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Turn a raw row into `expected` numbers, or `None` when the row is not a
/// data row (empty, or too few meaningful cells). Short rows are padded with
/// 0.0 and long rows truncated.
pub fn sanitize_row<S: AsRef<str>>(cells: &[S], expected: usize) -> Option<Vec<f64>> {
    if cells.is_empty() {
        return None;
    }

    let meaningful = cells
        .iter()
        .filter(|cell| !is_placeholder(cell.as_ref()))
        .count();
    if meaningful < MIN_MEANINGFUL_CELLS {
        return None;
    }

    let mut values: Vec<f64> = cells
        .iter()
        .take(expected)
        .map(|cell| parse_cell(cell.as_ref()))
        .collect();
    values.resize(expected, 0.0);
    Some(values)
}
