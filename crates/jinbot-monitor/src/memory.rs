//! Process memory usage lookup.

/// Resident set size of the current process, in megabytes.
///
/// Reads `/proc/self/status`; returns `None` on platforms without
/// procfs, which skips the memory check rather than failing the run.
pub fn process_rss_mb() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    rss_from_status(&status)
}

fn rss_from_status(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb / 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rss_parsed_from_status() {
        let status = "Name:\tjinbot\nVmPeak:\t  20480 kB\nVmRSS:\t  10240 kB\nThreads:\t4\n";
        assert_eq!(rss_from_status(status), Some(10));
    }

    #[test]
    fn test_rss_missing_line() {
        assert_eq!(rss_from_status("Name:\tjinbot\n"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_rss_available_on_linux() {
        assert!(process_rss_mb().is_some());
    }
}
