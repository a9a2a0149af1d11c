//! Utility functions for the admin client

use chrono::{DateTime, NaiveDate};

/// Image shown when an entity has no stored picture
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

/// Longest chart label kept before truncation
pub const LABEL_MAX_CHARS: usize = 15;

/// Resolve a stored image path against the backend host
///
/// Absolute `http(s)` URLs are returned unchanged. Relative paths are joined
/// to `host` with exactly one `/`, and character art still stored under the
/// legacy `assets/` folder is served from `personajes/`.
#[must_use]
pub fn resolve_image_url(host: &str, path: Option<&str>) -> String {
    let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
        return PLACEHOLDER_IMAGE.to_string();
    };

    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let relative = path.trim_start_matches('/');
    let relative = relative
        .strip_prefix("assets/")
        .map_or_else(|| relative.to_string(), |rest| format!("personajes/{rest}"));

    format!("{}/{relative}", host.trim_end_matches('/'))
}

/// Shorten a label to [`LABEL_MAX_CHARS`] characters plus `...`
#[must_use]
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > LABEL_MAX_CHARS {
        let head: String = label.chars().take(LABEL_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

/// Render a backend timestamp or date as `dd/mm/yyyy`
///
/// Unparseable input is returned as given.
#[must_use]
pub fn format_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_or_else(|_| raw.to_string(), |date| date.format("%d/%m/%Y").to_string())
}

/// Render a lesson time limit as `M min S s`
#[must_use]
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    match (seconds / 60, seconds % 60) {
        (0, secs) => format!("{secs} s"),
        (mins, 0) => format!("{mins} min"),
        (mins, secs) => format!("{mins} min {secs} s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(None, PLACEHOLDER_IMAGE)]
    #[case(Some("  "), PLACEHOLDER_IMAGE)]
    #[case(Some("https://cdn.example.com/a.png"), "https://cdn.example.com/a.png")]
    #[case(Some("uploads/temas/a.png"), "http://localhost:3000/uploads/temas/a.png")]
    #[case(Some("/uploads/temas/a.png"), "http://localhost:3000/uploads/temas/a.png")]
    #[case(Some("assets/llama.png"), "http://localhost:3000/personajes/llama.png")]
    fn test_resolve_image_url(#[case] path: Option<&str>, #[case] expected: &str) {
        assert_eq!(resolve_image_url("http://localhost:3000/", path), expected);
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Universidad"), "Universidad");
        assert_eq!(truncate_label("123456789012345"), "123456789012345");
        assert_eq!(
            truncate_label("Universidad Nacional de Ingeniería"),
            "Universidad Nac..."
        );
        assert_eq!(truncate_label("ÁÉÍÓÚáéíóúÑñÜüÇç"), "ÁÉÍÓÚáéíóúÑñÜüÇ...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-03-14T10:20:00.000Z"), "14/03/2026");
        assert_eq!(format_date("2026-03-14"), "14/03/2026");
        assert_eq!(format_date("ayer"), "ayer");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(1200), "20 min");
        assert_eq!(format_duration(95), "1 min 35 s");
        assert_eq!(format_duration(45), "45 s");
        assert_eq!(format_duration(-3), "0 s");
    }
}
