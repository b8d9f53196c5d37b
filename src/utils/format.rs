use std::cmp::Ordering;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an ISO timestamp or date string to a readable short form
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Case-insensitive comparison without allocating lowered copies
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().flat_map(char::to_lowercase);
    let mut b_chars = b.chars().flat_map(char::to_lowercase);
    loop {
        match (a_chars.next(), b_chars.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}

/// Case-insensitive substring check
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-08-10T12:00:00Z"), "Aug 10, 2026");
        assert_eq!(format_date("2026-06-01"), "2026-06-01");
        assert_eq!(format_date("n/a"), "n/a");
    }

    #[test]
    fn test_cmp_ignore_case() {
        assert_eq!(cmp_ignore_case("alpha", "ALPHA"), Ordering::Equal);
        assert_eq!(cmp_ignore_case("alpha", "beta"), Ordering::Less);
        assert_eq!(cmp_ignore_case("Gamma", "beta"), Ordering::Greater);
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Springfield", "spring"));
        assert!(!contains_ignore_case("Springfield", "shelby"));
    }
}
