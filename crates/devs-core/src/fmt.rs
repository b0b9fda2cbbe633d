//! Shared formatting helpers for table cells, API payloads and slugs.
//!
//! All pure formatting functions (no layout, no styling) live here.
//! Functions that differ between compact table cells and verbose detail views
//! are parameterized via [`FmtStyle`].

use chrono::{DateTime, Utc};

/// Controls compact (table cells) vs verbose (detail views) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmtStyle {
    /// Compact: short suffixes ("1.5K", "3d")
    Compact,
    /// Detail: full values ("1,500", "3 days ago")
    Detail,
}

// ---------------------------------------------------------------------------
// Style-parameterized functions
// ---------------------------------------------------------------------------

/// Format a counter (views, posts) as human-readable.
///
/// Compact: `"1.5M"`, `"12.3K"`, `"999"`
/// Detail:  `"1,500,000"`, `"12,300"`, `"999"`
pub fn format_count(n: i64, style: FmtStyle) -> String {
    match style {
        FmtStyle::Compact => {
            let f = n as f64;
            let abs = n.unsigned_abs();
            if abs >= 1_000_000 {
                format!("{:.1}M", f / 1_000_000.0)
            } else if abs >= 1_000 {
                format!("{:.1}K", f / 1_000.0)
            } else {
                n.to_string()
            }
        }
        FmtStyle::Detail => {
            let digits = n.unsigned_abs().to_string();
            let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
            if n < 0 {
                out.push('-');
            }
            for (i, ch) in digits.chars().enumerate() {
                if i > 0 && (digits.len() - i) % 3 == 0 {
                    out.push(',');
                }
                out.push(ch);
            }
            out
        }
    }
}

/// Format a timestamp.
///
/// Compact: `"2024-03-01"`
/// Detail:  `"2024-03-01 14:05 UTC"`
pub fn format_date(ts: DateTime<Utc>, style: FmtStyle) -> String {
    match style {
        FmtStyle::Compact => ts.format("%Y-%m-%d").to_string(),
        FmtStyle::Detail => ts.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

/// Format a web-vitals timing in milliseconds: `"230ms"`, `"2.48s"`.
pub fn format_ms(ms: f64) -> String {
    if ms.abs() >= 1_000.0 {
        format!("{:.2}s", ms / 1_000.0)
    } else {
        format!("{}ms", ms.round() as i64)
    }
}

/// Estimated reading time in whole minutes (at least 1) at 200 words per minute.
pub fn reading_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count() as u32;
    words.div_ceil(200).max(1)
}

// ---------------------------------------------------------------------------
// Text normalization
// ---------------------------------------------------------------------------

/// Truncate string to `max_chars` characters with unicode ellipsis (`…`).
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Collapse all whitespace (newlines, tabs, runs of spaces) into single spaces.
pub fn normalize_for_display(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a URL slug: lowercase ASCII alphanumerics separated by single dashes.
///
/// `"Hello, Rust World!"` -> `"hello-rust-world"`
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut pending_dash = false;
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_compact_and_detail() {
        assert_eq!(format_count(999, FmtStyle::Compact), "999");
        assert_eq!(format_count(12_300, FmtStyle::Compact), "12.3K");
        assert_eq!(format_count(1_500_000, FmtStyle::Compact), "1.5M");
        assert_eq!(format_count(1_500_000, FmtStyle::Detail), "1,500,000");
        assert_eq!(format_count(-1234, FmtStyle::Detail), "-1,234");
        assert_eq!(format_count(100, FmtStyle::Detail), "100");
    }

    #[test]
    fn ms_switches_to_seconds() {
        assert_eq!(format_ms(229.6), "230ms");
        assert_eq!(format_ms(0.4), "0ms");
        assert_eq!(format_ms(2480.0), "2.48s");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_for_display("  a\n\tb   c "), "a b c");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello, Rust World!"), "hello-rust-world");
        assert_eq!(slugify("  --Already-Slugged--  "), "already-slugged");
        assert_eq!(slugify("Ünïcode ok 2024"), "n-code-ok-2024");
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("héllo wörld", 5), "héll…");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_minutes(""), 1);
        let text = "word ".repeat(401);
        assert_eq!(reading_minutes(&text), 3);
    }
}
