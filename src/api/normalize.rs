use serde_json::Value;
use tracing::warn;

use crate::models::{Artwork, ArtworkPage};

/// Turn a raw artworks response body into an [`ArtworkPage`]. Any shape the
/// endpoint might send is tolerated: a missing `data` array yields no rows and
/// a missing `pagination.total` yields zero.
pub fn normalize_response(body: &Value) -> ArtworkPage {
    let rows = body
        .get("data")
        .and_then(Value::as_array)
        .map(|records| records.iter().filter_map(normalize_record).collect())
        .unwrap_or_default();

    let total = body
        .get("pagination")
        .and_then(|pagination| pagination.get("total"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    ArtworkPage { rows, total }
}

/// Coerce one record. Records without an integer id cannot be selected, so
/// they are dropped rather than shown.
fn normalize_record(record: &Value) -> Option<Artwork> {
    let Some(id) = record.get("id").and_then(Value::as_u64) else {
        warn!(record = %record, "dropping artwork without a numeric id");
        return None;
    };

    Some(Artwork {
        id,
        title: text_field(record, "title"),
        place_of_origin: text_field(record, "place_of_origin"),
        artist_display: text_field(record, "artist_display"),
        inscriptions: text_field(record, "inscriptions"),
        date_start: numeric_field(record, "date_start"),
        date_end: numeric_field(record, "date_end"),
    })
}

fn text_field(record: &Value, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Only values that already are JSON numbers survive; a string such as
/// `"1990"` becomes `None`.
fn numeric_field(record: &Value, key: &str) -> Option<i64> {
    let value = record.get(key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.fract() == 0.0 && number.abs() < i64::MAX as f64)
            .map(|number| number as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_present_fields_and_marks_missing_ones() {
        let body = json!({
            "data": [{
                "id": 27992,
                "title": "A Sunday on La Grande Jatte",
                "place_of_origin": "France",
                "artist_display": "Georges Seurat\nFrench, 1859-1891",
                "date_start": 1884,
                "date_end": 1886
            }],
            "pagination": { "total": 129000, "limit": 10 }
        });

        let page = normalize_response(&body);
        assert_eq!(page.total, 129000);
        assert_eq!(page.rows.len(), 1);
        let art = &page.rows[0];
        assert_eq!(art.id, 27992);
        assert_eq!(art.title.as_deref(), Some("A Sunday on La Grande Jatte"));
        assert_eq!(art.place_of_origin.as_deref(), Some("France"));
        assert_eq!(art.inscriptions, None);
        assert_eq!(art.date_start, Some(1884));
        assert_eq!(art.date_end, Some(1886));
    }

    #[test]
    fn string_dates_become_none() {
        let body = json!({
            "data": [{ "id": 5, "date_start": "1990", "date_end": null }]
        });

        let page = normalize_response(&body);
        assert_eq!(page.rows[0].date_start, None);
        assert_eq!(page.rows[0].date_end, None);
    }

    #[test]
    fn integral_floats_are_accepted_as_dates() {
        let body = json!({ "data": [{ "id": 5, "date_start": 1990.0, "date_end": 1990.5 }] });

        let page = normalize_response(&body);
        assert_eq!(page.rows[0].date_start, Some(1990));
        assert_eq!(page.rows[0].date_end, None);
    }

    #[test]
    fn non_string_text_fields_become_none() {
        let body = json!({ "data": [{ "id": 1, "title": 42, "inscriptions": ["a"] }] });

        let art = &normalize_response(&body).rows[0];
        assert_eq!(art.title, None);
        assert_eq!(art.inscriptions, None);
    }

    #[test]
    fn unexpected_shapes_fall_back_to_empty_defaults() {
        assert_eq!(normalize_response(&json!({})), ArtworkPage::default());
        assert_eq!(
            normalize_response(&json!({ "data": "nope", "pagination": { "total": "many" } })),
            ArtworkPage::default()
        );
        assert_eq!(normalize_response(&json!([1, 2, 3])), ArtworkPage::default());
    }

    #[test]
    fn records_without_numeric_id_are_dropped() {
        let body = json!({
            "data": [{ "title": "orphan" }, { "id": "12" }, { "id": 12 }],
            "pagination": { "total": 3 }
        });

        let page = normalize_response(&body);
        assert_eq!(page.rows, vec![Artwork::with_id(12)]);
        assert_eq!(page.total, 3);
    }
}
