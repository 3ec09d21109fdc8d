//! Payload normalization.
//!
//! The report API is assembled from several backends that disagree on key
//! casing (`jobNo`, `JobNo`, `jobno`, ...), so every field access goes through
//! alias-based, case-insensitive lookup. Each report kind has its own
//! normalizer that maps the raw payload to a [`CanonicalRecord`].

mod cm;
mod record;
mod rtu_pm;
mod server_pm;

pub use record::{
    CanonicalRecord, CellValue, Field, ImageRef, Outcome, Section, SectionBody, SignatureRef,
    UNSPECIFIED,
};

use serde_json::Value;

use crate::report::{ReportKind, ReportType};

/// Normalize a raw payload into the canonical record for its report type.
pub fn normalize(report_type: ReportType, payload: &Value) -> CanonicalRecord {
    match report_type.kind {
        ReportKind::ServerPm => server_pm::normalize(report_type, payload),
        ReportKind::Cm => cm::normalize(report_type, payload),
        ReportKind::RtuPm => rtu_pm::normalize(report_type, payload),
    }
}

/// Find a value under any of the given key aliases.
///
/// Aliases are tried in order. For each alias an exact match is preferred,
/// then a case-insensitive scan of the object's keys. The first alias that
/// resolves wins even if a later alias also matches.
pub fn lookup<'a>(value: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    let object = value.as_object()?;
    for alias in aliases {
        if let Some(v) = object.get(*alias) {
            return Some(v);
        }
        if let Some((_, v)) = object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(alias))
        {
            return Some(v);
        }
    }
    None
}

/// Look up a field and render it as display text, falling back to the
/// unspecified placeholder.
pub fn text(value: &Value, aliases: &[&str]) -> String {
    text_opt(value, aliases).unwrap_or_else(|| UNSPECIFIED.to_string())
}

/// Like [`text`] but returns `None` for missing, null, or empty values.
pub fn text_opt(value: &Value, aliases: &[&str]) -> Option<String> {
    let v = lookup(value, aliases)?;
    render(v)
}

fn render(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Value::Bool(true) => Some("Yes".to_string()),
        Value::Bool(false) => Some("No".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(_) => None,
    }
}

/// Render a percentage field. A trailing `%` is appended only when a value is
/// actually present.
pub fn percent(value: &Value, aliases: &[&str]) -> String {
    match text_opt(value, aliases) {
        Some(s) if s.ends_with('%') => s,
        Some(s) => format!("{s}%"),
        None => UNSPECIFIED.to_string(),
    }
}

/// Extract the row objects for a tabular section.
///
/// The payload stores rows either directly as an array, or wrapped in an
/// object with a `details` array, or as an array of entries each carrying its
/// own nested `details`. Nested details are flattened; keys on the nested
/// object win over keys on the wrapper.
pub fn detail_rows(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.iter().flat_map(flatten_entry).collect(),
        Value::Object(_) => match lookup(value, &["details"]) {
            Some(Value::Array(items)) => items.clone(),
            _ => vec![value.clone()],
        },
        _ => Vec::new(),
    }
}

fn flatten_entry(entry: &Value) -> Vec<Value> {
    match lookup(entry, &["details"]) {
        Some(Value::Array(details)) => details
            .iter()
            .map(|detail| merge_nested_wins(entry, detail))
            .collect(),
        _ => vec![entry.clone()],
    }
}

fn merge_nested_wins(outer: &Value, inner: &Value) -> Value {
    let (Some(outer), Some(inner)) = (outer.as_object(), inner.as_object()) else {
        return inner.clone();
    };
    let mut merged = outer.clone();
    merged.remove("details");
    for (k, v) in inner {
        merged.insert(k.clone(), v.clone());
    }
    Value::Object(merged)
}

const POSITIVE_WORDS: &[&str] = &[
    "pass", "passed", "ok", "good", "yes", "normal", "healthy", "done", "completed", "synced",
    "up",
];
const NEGATIVE_WORDS: &[&str] = &["fail", "failed", "bad", "no", "error", "down", "faulty"];
const WARNING_WORDS: &[&str] = &["warn", "warning", "caution", "degraded"];

/// Classify a status string by keyword.
pub fn classify(text: &str) -> Outcome {
    let lowered = text.trim().to_ascii_lowercase();
    if POSITIVE_WORDS.contains(&lowered.as_str()) {
        Outcome::Positive
    } else if NEGATIVE_WORDS.contains(&lowered.as_str()) {
        Outcome::Negative
    } else if WARNING_WORDS.contains(&lowered.as_str()) {
        Outcome::Warning
    } else {
        Outcome::Unknown
    }
}

/// Build a status cell: text plus its classified outcome.
pub fn status_cell(text: String) -> CellValue {
    let outcome = classify(&text);
    CellValue {
        text,
        outcome: Some(outcome),
    }
}

/// Extract image references from an array field. Entries missing either the
/// directory or the file name are skipped.
pub fn images(value: &Value, aliases: &[&str]) -> Vec<ImageRef> {
    let Some(Value::Array(items)) = lookup(value, aliases) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let directory = text_opt(item, &["storedDirectory", "storedDirectoryName"])?;
            let name = text_opt(item, &["imageName", "imageFileName", "fileName"])?;
            Some(ImageRef { directory, name })
        })
        .collect()
}

/// Format an ISO timestamp as a date, passing unparseable values through
/// untouched.
pub fn format_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Format an ISO timestamp as date and time.
pub fn format_datetime(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_timestamp(raw: &str) -> Option<chrono::NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok()
}

/// Look up a timestamp field and render it as a date.
pub fn date_field(value: &Value, aliases: &[&str]) -> String {
    match text_opt(value, aliases) {
        Some(raw) => format_date(&raw),
        None => UNSPECIFIED.to_string(),
    }
}

/// Look up a timestamp field and render it as date and time.
pub fn datetime_field(value: &Value, aliases: &[&str]) -> String {
    match text_opt(value, aliases) {
        Some(raw) => format_datetime(&raw),
        None => UNSPECIFIED.to_string(),
    }
}

/// Pull section-level remarks out of row data: the first non-empty remarks
/// value across all rows.
pub fn hoist_remarks(rows: &[Value], aliases: &[&str]) -> Option<String> {
    rows.iter().find_map(|row| text_opt(row, aliases))
}

/// Signature images attached to the form, for `_signature` report types.
pub fn signatures(payload: &Value, form: &Value) -> Vec<SignatureRef> {
    let mut refs = Vec::new();
    for (label, name_aliases, image_aliases) in [
        (
            "Attended By",
            &["attendedBy", "attendedByName"][..],
            &["attendedBySignature", "attendedBySignatureImage"][..],
        ),
        (
            "Approved By",
            &["approvedBy", "approvedByName"][..],
            &["approvedBySignature", "approvedBySignatureImage"][..],
        ),
    ] {
        let name = text_opt(form, name_aliases)
            .or_else(|| text_opt(payload, name_aliases))
            .unwrap_or_else(|| UNSPECIFIED.to_string());
        let image = lookup(payload, image_aliases)
            .or_else(|| lookup(form, image_aliases))
            .and_then(|v| {
                let directory = text_opt(v, &["storedDirectory", "storedDirectoryName"])?;
                let file = text_opt(v, &["imageName", "imageFileName", "fileName"])?;
                Some(ImageRef {
                    directory,
                    name: file,
                })
            });
        refs.push(SignatureRef {
            label: label.to_string(),
            name,
            image,
        });
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_exact_match_wins() {
        let v = json!({"jobNo": "J-1", "jobno": "J-2"});
        assert_eq!(*lookup(&v, &["jobNo"]).unwrap(), "J-1");
    }

    #[test]
    fn test_lookup_case_insensitive_fallback() {
        let v = json!({"JOBNO": "J-1"});
        assert_eq!(*lookup(&v, &["jobNo"]).unwrap(), "J-1");
    }

    #[test]
    fn test_lookup_first_alias_priority() {
        let v = json!({"stationName": "Alpha", "warehouseName": "Beta"});
        assert_eq!(
            *lookup(&v, &["stationName", "warehouseName"]).unwrap(),
            "Alpha"
        );
        assert_eq!(
            *lookup(&v, &["warehouseName", "stationName"]).unwrap(),
            "Beta"
        );
    }

    #[test]
    fn test_text_placeholder_for_missing_and_empty() {
        let v = json!({"a": "", "b": null, "c": "  "});
        assert_eq!(text(&v, &["a"]), UNSPECIFIED);
        assert_eq!(text(&v, &["b"]), UNSPECIFIED);
        assert_eq!(text(&v, &["c"]), UNSPECIFIED);
        assert_eq!(text(&v, &["missing"]), UNSPECIFIED);
    }

    #[test]
    fn test_text_renders_scalars() {
        let v = json!({"flag": true, "off": false, "n": 42, "list": ["a", "b"]});
        assert_eq!(text(&v, &["flag"]), "Yes");
        assert_eq!(text(&v, &["off"]), "No");
        assert_eq!(text(&v, &["n"]), "42");
        assert_eq!(text(&v, &["list"]), "a, b");
    }

    #[test]
    fn test_percent_only_when_present() {
        let v = json!({"usage": "82", "styled": "90%", "empty": ""});
        assert_eq!(percent(&v, &["usage"]), "82%");
        assert_eq!(percent(&v, &["styled"]), "90%");
        assert_eq!(percent(&v, &["empty"]), UNSPECIFIED);
        assert_eq!(percent(&v, &["missing"]), UNSPECIFIED);
    }

    #[test]
    fn test_detail_rows_flattening_nested_wins() {
        let v = json!([
            {
                "serverName": "SRV-1",
                "remarks": "outer",
                "details": [
                    {"disk": "C:", "remarks": "inner"},
                    {"disk": "D:"}
                ]
            }
        ]);
        let rows = detail_rows(&v);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["serverName"], "SRV-1");
        assert_eq!(rows[0]["remarks"], "inner");
        assert_eq!(rows[1]["serverName"], "SRV-1");
        assert_eq!(rows[1]["remarks"], "outer");
    }

    #[test]
    fn test_detail_rows_plain_array_passthrough() {
        let v = json!([{"a": 1}, {"a": 2}]);
        assert_eq!(detail_rows(&v).len(), 2);
    }

    #[test]
    fn test_classify_keywords() {
        assert_eq!(classify("Pass"), Outcome::Positive);
        assert_eq!(classify(" HEALTHY "), Outcome::Positive);
        assert_eq!(classify("failed"), Outcome::Negative);
        assert_eq!(classify("Down"), Outcome::Negative);
        assert_eq!(classify("Degraded"), Outcome::Warning);
        assert_eq!(classify("pending review"), Outcome::Unknown);
        assert_eq!(classify(""), Outcome::Unknown);
    }

    #[test]
    fn test_images_skips_incomplete_entries() {
        let v = json!({
            "photos": [
                {"storedDirectory": "2024/07", "imageName": "a.jpg"},
                {"storedDirectory": "2024/07"},
                {"imageName": "b.jpg"}
            ]
        });
        let refs = images(&v, &["photos"]);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "a.jpg");
    }

    #[test]
    fn test_format_date_and_datetime() {
        assert_eq!(format_date("2024-07-15T08:30:00Z"), "2024-07-15");
        assert_eq!(format_datetime("2024-07-15T08:30:00"), "2024-07-15 08:30");
        // Unparseable values pass through untouched.
        assert_eq!(format_date("last Tuesday"), "last Tuesday");
    }

    #[test]
    fn test_hoist_remarks_first_non_empty() {
        let rows = vec![
            json!({"remarks": ""}),
            json!({"remarks": "replace fan"}),
            json!({"remarks": "later"}),
        ];
        assert_eq!(
            hoist_remarks(&rows, &["remarks"]),
            Some("replace fan".to_string())
        );
    }
}
