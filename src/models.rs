//! Domain models shared by the fetcher, the table controller and the TUI.
//! They are plain data holders: normalization happens in `api`, selection
//! bookkeeping in `selection`, and presentation in `ui`.

use std::fmt;

/// Base URL of the public artwork pages on the museum website.
const ARTWORK_PAGE_BASE: &str = "https://www.artic.edu/artworks";

#[derive(Debug, Clone, PartialEq, Eq)]
/// One normalized row from the artworks endpoint. Only `id` is guaranteed;
/// every other field carries an explicit `None` when the API omitted it or
/// sent a value of the wrong type.
pub struct Artwork {
    /// Stable catalog identifier. Selection is keyed on it.
    pub id: u64,
    pub title: Option<String>,
    pub place_of_origin: Option<String>,
    pub artist_display: Option<String>,
    pub inscriptions: Option<String>,
    /// Start of the creation date range. Kept only when the API sent a number.
    pub date_start: Option<i64>,
    pub date_end: Option<i64>,
}

impl Artwork {
    /// Construct a record with only the identifier set. Handy for tests and
    /// for callers that fill fields incrementally.
    pub fn with_id(id: u64) -> Self {
        Self {
            id,
            title: None,
            place_of_origin: None,
            artist_display: None,
            inscriptions: None,
            date_start: None,
            date_end: None,
        }
    }

    /// Title used by list views, falling back to a placeholder for untitled
    /// records so the selection panel never shows an empty line.
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => "(no title)".to_string(),
        }
    }

    /// Public web page for this record.
    pub fn web_url(&self) -> String {
        format!("{ARTWORK_PAGE_BASE}/{}", self.id)
    }
}

impl fmt::Display for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.display_title())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Result of one page request: the rows to display plus the server-reported
/// total used by the paginator.
pub struct ArtworkPage {
    pub rows: Vec<Artwork>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_title_falls_back_for_missing_or_blank_titles() {
        let mut art = Artwork::with_id(7);
        assert_eq!(art.display_title(), "(no title)");

        art.title = Some("   ".to_string());
        assert_eq!(art.display_title(), "(no title)");

        art.title = Some(" Nighthawks ".to_string());
        assert_eq!(art.display_title(), "Nighthawks");
    }

    #[test]
    fn web_url_points_at_the_artwork_page() {
        assert_eq!(
            Artwork::with_id(111628).web_url(),
            "https://www.artic.edu/artworks/111628"
        );
    }
}
