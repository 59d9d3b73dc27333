use std::time::Duration;

/// Characters that are unsafe in file names on common filesystems or special to shells.
const UNSAFE_CHARS: &[char] = &[
    '/', '\\', ':', '*', '?', '"', '<', '>', '|', '$', '`', '&', ';', '!', '\'', '~', '#', '%',
    '{', '}', '(', ')', '[', ']',
];

/// Strips unsafe characters from a title and collapses whitespace runs into single spaces.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !UNSAFE_CHARS.contains(c) && !c.is_control())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}

/// Formats a duration as whole minutes and seconds, e.g. `2 min 5 sec`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{} min {} sec", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("hello/world"), "helloworld");
        assert_eq!(sanitize_title("test<>file"), "testfile");
        assert_eq!(sanitize_title("normal_file"), "normal_file");
        assert_eq!(sanitize_title("  padded   title\t"), "padded title");
    }

    #[test]
    fn test_sanitize_title_punctuation() {
        let sanitized = sanitize_title("My Video: Part 1?");
        assert!(!sanitized.contains(':'));
        assert!(!sanitized.contains('?'));
        assert_eq!(sanitized, "My Video Part 1");
    }

    #[test]
    fn test_sanitize_title_is_stable() {
        let title = "Rock & Roll | Live (2019) \"Remastered\"";
        assert_eq!(sanitize_title(title), sanitize_title(title));
        assert_eq!(sanitize_title(title), "Rock Roll Live 2019 Remastered");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1_572_864), "1.50 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0 min 0 sec");
        assert_eq!(format_duration(Duration::from_millis(125_900)), "2 min 5 sec");
    }
}
