use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};

/// Resolve a caller-supplied path against the process working directory.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        Ok(candidate.to_path_buf())
    } else {
        // Handle relative paths like "." or "../data"
        Ok(std::env::current_dir()?.join(candidate))
    }
}

/// Human-readable size: "512 B", "1.5 KB", "3.2 MB".
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn format_date(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Read an environment variable, falling back to `default` when it is unset
/// or does not parse.
pub fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_resolve_relative_path() {
        let resolved = resolve_path("some/dir").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/dir"));
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("FILE_TOOLBOX_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("FILE_TOOLBOX_TEST_GARBAGE", 7usize), 7);
        assert_eq!(env_or("FILE_TOOLBOX_TEST_UNSET_VAR", 3u64), 3);
    }
}
