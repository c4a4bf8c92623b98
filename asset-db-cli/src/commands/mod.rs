pub(crate) mod config;
pub(crate) mod deps;
pub(crate) mod products;
pub(crate) mod scan_folders;
pub(crate) mod stat;
pub(crate) mod stats;
pub(crate) mod vacuum;

/// Truncate a string to a maximum width, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max).collect()
    }
}
