use super::{CollectError, ProcessCollector, RawProcess};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::thread;
use std::time::{Duration, Instant};

/// Fields pulled out of `/proc/<pid>/stat`.
struct StatLine {
    name: String,
    total_ticks: u64, // utime + stime
    rss_pages: u64,
}

pub struct LinuxProcessCollector {
    page_size: u64,
    clock_ticks: u64,
    cpu_window: Duration,
}

impl LinuxProcessCollector {
    pub fn new(cpu_window: Duration) -> Self {
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        let clock_ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        Self {
            page_size: if page_size > 0 { page_size as u64 } else { 4096 },
            clock_ticks: if clock_ticks > 0 { clock_ticks as u64 } else { 100 },
            cpu_window,
        }
    }

    fn list_pids() -> Vec<u32> {
        let mut pids = Vec::new();
        if let Ok(entries) = fs::read_dir("/proc") {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    if let Ok(pid) = name.parse::<u32>() {
                        pids.push(pid);
                    }
                }
            }
        }
        pids
    }

    fn read_stat(pid: u32) -> Result<StatLine, CollectError> {
        let content = fs::read_to_string(format!("/proc/{}/stat", pid)).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => CollectError::AccessDenied(pid),
            _ => CollectError::Vanished(pid),
        })?;
        parse_stat(&content).ok_or(CollectError::Vanished(pid))
    }

    fn cpu_percent(&self, before: u64, after: u64, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        let cpu_seconds = after.saturating_sub(before) as f64 / self.clock_ticks as f64;
        (cpu_seconds / secs) * 100.0
    }
}

impl Default for LinuxProcessCollector {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

/// Parses the comm and counters out of a stat line. The comm field may
/// itself contain spaces and parentheses, so it is delimited by the first
/// '(' and the last ')'.
fn parse_stat(content: &str) -> Option<StatLine> {
    let open = content.find('(')?;
    let close = content.rfind(')')?;
    if close < open {
        return None;
    }
    let name = content[open + 1..close].to_string();
    // rest[0] is field 3 (state), so field n lives at rest[n - 3]
    let rest: Vec<&str> = content[close + 1..].split_whitespace().collect();
    if rest.len() < 22 {
        return None;
    }
    let utime: u64 = rest[11].parse().unwrap_or(0);
    let stime: u64 = rest[12].parse().unwrap_or(0);
    let rss_pages: u64 = rest[21].parse().unwrap_or(0);
    Some(StatLine {
        name,
        total_ticks: utime + stime,
        rss_pages,
    })
}

impl ProcessCollector for LinuxProcessCollector {
    fn snapshot(&self) -> Vec<Result<RawProcess, CollectError>> {
        let pids = Self::list_pids();

        // One shared measurement window for every process.
        let started = Instant::now();
        let baseline: HashMap<u32, u64> = pids
            .iter()
            .filter_map(|&pid| Self::read_stat(pid).ok().map(|s| (pid, s.total_ticks)))
            .collect();
        thread::sleep(self.cpu_window);
        let elapsed = started.elapsed();

        pids.into_iter()
            .map(|pid| {
                let stat = Self::read_stat(pid)?;
                let cpu_percent = match baseline.get(&pid) {
                    Some(&before) => self.cpu_percent(before, stat.total_ticks, elapsed),
                    None => 0.0, // started during the window
                };
                let name = if stat.name.is_empty() { None } else { Some(stat.name) };
                Ok(RawProcess {
                    name,
                    pid,
                    resident_memory_bytes: stat.rss_pages * self.page_size,
                    cpu_percent,
                })
            })
            .collect()
    }
}
