use chrono::{DateTime, Utc};

const ELLIPSIS: &str = "...";
const SUFFIX_LEN: usize = 2;

pub const DEFAULT_FILE_NAME_LEN: usize = 18;

/// Shortens a file name to at most `len` characters as `prefix...suffix.ext`, keeping the
/// extension and the last two characters before it. A leading dot is part of the name.
pub fn format_file_name(name: &str, len: usize) -> String {
    if len == 0 {
        return String::new();
    }
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= len {
        return name.to_string();
    }

    let (base, ext) = match chars.iter().rposition(|c| *c == '.') {
        Some(dot) if dot > 0 => (&chars[..dot], &chars[dot..]),
        _ => (&chars[..], &chars[chars.len()..]),
    };
    let ext: String = ext.iter().collect();

    let available = len as isize - ext.chars().count() as isize - ELLIPSIS.len() as isize;
    if available <= 0 {
        let take = len.saturating_sub(ELLIPSIS.len());
        return format!("{}{ELLIPSIS}", chars[..take].iter().collect::<String>());
    }
    let available = available as usize;

    let suffix_len = SUFFIX_LEN.min(base.len());
    if available <= suffix_len {
        let prefix: String = base[..available].iter().collect();
        return format!("{prefix}{ELLIPSIS}{ext}");
    }

    let prefix: String = base[..available - suffix_len].iter().collect();
    let suffix: String = base[base.len() - suffix_len..].iter().collect();
    format!("{prefix}{ELLIPSIS}{suffix}{ext}")
}

/// `N bytes` below 1 KiB, otherwise the largest unit up to tb with two decimals.
pub fn format_size(bytes: u64) -> String {
    const STEP: f64 = 1024.0;
    if bytes < 1024 {
        return format!("{bytes} bytes");
    }
    let mut n = bytes as f64 / STEP;
    let mut unit = "kb";
    for next in ["mb", "gb", "tb"] {
        if n < STEP {
            break;
        }
        n /= STEP;
        unit = next;
    }
    format!("{n:.2} {unit}")
}

pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{} min ago", s / 60),
        s if s < 86_400 => format!("{} h ago", s / 3_600),
        s if s < 7 * 86_400 => format!("{} d ago", s / 86_400),
        _ => at.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn short_names_untouched() {
        assert_eq!(format_file_name("notes.txt", 18), "notes.txt");
    }

    #[test]
    fn keeps_extension_and_tail() {
        assert_eq!(
            format_file_name("quarterly-report-final.pdf", 18),
            "quarterly...al.pdf"
        );
        assert_eq!(format_file_name("quarterly-report-final.pdf", 18).len(), 18);
    }

    #[test]
    fn leading_dot_is_not_an_extension() {
        assert_eq!(format_file_name(".environment-local", 10), ".envi...al");
    }

    #[test]
    fn long_extension_falls_back_to_front_truncation() {
        assert_eq!(format_file_name("a.verylongextension", 10), "a.veryl...");
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(1024), "1.00 kb");
        assert_eq!(format_size(1536), "1.50 kb");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 mb");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024 * 1024), "3.00 tb");
    }

    #[test]
    fn relative() {
        let now = Utc::now();
        assert_eq!(relative_time(now - Duration::seconds(5), now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(12), now), "12 min ago");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3 h ago");
    }
}
