//! Progress reporting for transfers
//!
//! The engine only parses what yt-dlp prints and forwards it; rendering
//! progress (message edits, bars) is up to whoever holds the receiver.

use std::time::Duration;

/// Snapshot of one transfer's progress
#[derive(Debug, Clone, PartialEq)]
pub struct TransferProgress {
    /// 0.0 ..= 100.0
    pub percent: f64,
    /// Bytes per second, 0 when unknown
    pub speed_bps: f64,
    /// 0 when unknown
    pub total_bytes: u64,
    pub eta: Option<Duration>,
}

impl TransferProgress {
    /// Parse a yt-dlp progress line such as
    /// `[download]  42.5% of ~ 150.00MiB at  5.20MiB/s ETA 00:15`
    pub fn parse_line(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let pct_idx = tokens.iter().position(|t| t.ends_with('%'))?;
        let percent = tokens[pct_idx].trim_end_matches('%').parse::<f64>().ok()?;

        let after = |keyword: &str| -> Option<&str> {
            let idx = tokens.iter().position(|t| *t == keyword)?;
            tokens[idx + 1..]
                .iter()
                .copied()
                .find(|t| *t != "~")
                .map(|t| t.trim_start_matches('~'))
        };

        let total_bytes = after("of")
            .and_then(parse_size)
            .map(|b| b as u64)
            .unwrap_or(0);
        let speed_bps = after("at")
            .and_then(|t| t.strip_suffix("/s"))
            .and_then(parse_size)
            .unwrap_or(0.0);
        let eta = after("ETA").and_then(parse_clock);

        Some(Self {
            percent: percent.clamp(0.0, 100.0),
            speed_bps,
            total_bytes,
            eta,
        })
    }

    pub fn downloaded_bytes(&self) -> u64 {
        (self.percent / 100.0 * self.total_bytes as f64) as u64
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }
}

/// "150.00MiB" -> bytes
fn parse_size(token: &str) -> Option<f64> {
    let split = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    if split == 0 {
        return None;
    }
    let value = token[..split].parse::<f64>().ok()?;
    let multiplier = match &token[split..] {
        "" | "B" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        "KB" | "kB" => 1_000.0,
        "MB" => 1_000_000.0,
        "GB" => 1_000_000_000.0,
        _ => return None,
    };
    Some(value * multiplier)
}

/// "01:02:03" / "02:03" -> duration
fn parse_clock(token: &str) -> Option<Duration> {
    let mut secs = 0u64;
    for part in token.split(':') {
        secs = secs * 60 + part.parse::<u64>().ok()?;
    }
    Some(Duration::from_secs(secs))
}
