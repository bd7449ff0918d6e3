use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Cell text for an optional field. Missing values render as an empty cell.
pub(crate) fn text_cell(value: Option<&str>) -> String {
    value.map(single_line).unwrap_or_default()
}

/// Cell text for an optional year.
pub(crate) fn number_cell(value: Option<i64>) -> String {
    value.map(|number| number.to_string()).unwrap_or_default()
}

/// Collapse embedded newlines. The artist display string from the API puts
/// nationality and dates on their own lines.
pub(crate) fn single_line(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 1-based record range shown on a page, or `None` when it is empty.
pub(crate) fn record_range(offset: u64, visible: usize) -> Option<(u64, u64)> {
    if visible == 0 {
        return None;
    }
    Some((offset + 1, offset + visible as u64))
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artist_display_is_flattened() {
        assert_eq!(
            single_line("Georges Seurat\nFrench, 1859-1891\n"),
            "Georges Seurat, French, 1859-1891"
        );
        assert_eq!(text_cell(None), "");
        assert_eq!(number_cell(Some(-500)), "-500");
        assert_eq!(number_cell(None), "");
    }

    #[test]
    fn record_range_is_one_based() {
        assert_eq!(record_range(20, 10), Some((21, 30)));
        assert_eq!(record_range(0, 3), Some((1, 3)));
        assert_eq!(record_range(40, 0), None);
    }

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = anyhow::anyhow!("root cause").context("outer");
        assert_eq!(surface_error(&err), "root cause");
    }
}
