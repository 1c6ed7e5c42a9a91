//! yt-dlp backend
//!
//! Probes run `yt-dlp --dump-single-json`, transfers run `yt-dlp -f <id>` and
//! read the final path back through `--print after_move:...`. Both are single
//! attempts bounded by a timeout; on expiry the child is killed.

use crate::downloader::progress::TransferProgress;
use crate::extractor::models::{FetchRequest, FetchedMedia, ProbeInfo};
use crate::extractor::traits::Backend;
use crate::utils::config::AppSettings;
use crate::utils::error::MediaError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as AsyncCommand;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

const FILE_MARKER: &str = "medialoader:file=";
const TITLE_MARKER: &str = "medialoader:title=";
const ABR_MARKER: &str = "medialoader:abr=";

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(1800);

/// Backend driving a local yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlpBackend {
    ytdlp_path: PathBuf,
    output_template: String,
    probe_timeout: Duration,
    transfer_timeout: Duration,
}

impl YtDlpBackend {
    /// Use an explicit executable with default template and timeouts
    pub fn new(ytdlp_path: impl Into<PathBuf>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            output_template: "%(title)s.%(ext)s".to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
        }
    }

    /// Locate yt-dlp and apply the configured template and timeouts
    pub fn from_settings(settings: &AppSettings) -> Result<Self, MediaError> {
        let ytdlp_path = match find_ytdlp(settings.ytdlp_path.as_deref()) {
            Some(path) => {
                info!("Found yt-dlp at: {}", path.display());
                path
            }
            None => {
                error!("yt-dlp not found anywhere!");
                return Err(MediaError::YtDlpNotFound);
            }
        };

        Ok(Self {
            ytdlp_path,
            output_template: settings.output_template.clone(),
            probe_timeout: Duration::from_secs(settings.probe_timeout_secs),
            transfer_timeout: Duration::from_secs(settings.transfer_timeout_secs),
        })
    }

    pub fn with_timeouts(mut self, probe: Duration, transfer: Duration) -> Self {
        self.probe_timeout = probe;
        self.transfer_timeout = transfer;
        self
    }

    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }

    fn probe_args(url: &str) -> Vec<OsString> {
        ["--dump-single-json", "--no-download", "--no-warnings", "--no-playlist", url]
            .into_iter()
            .map(OsString::from)
            .collect()
    }

    fn fetch_args(&self, request: &FetchRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            request.format.as_str().into(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--newline".into(),
            "--progress".into(),
            "--no-simulate".into(),
            "--print".into(),
            format!("after_move:{}%(filepath)s", FILE_MARKER).into(),
            "--print".into(),
            format!("after_move:{}%(title)s", TITLE_MARKER).into(),
            "-P".into(),
            request.output_dir.as_os_str().to_owned(),
            "-o".into(),
            self.output_template.as_str().into(),
        ];

        if let Some(audio) = &request.audio {
            args.extend([
                "-x".into(),
                "--audio-format".into(),
                audio.codec.as_str().into(),
                "--audio-quality".into(),
                audio.quality.as_str().into(),
                "--print".into(),
                format!("after_move:{}%(abr)s", ABR_MARKER).into(),
            ]);
        }

        args.push(request.url.as_str().into());
        args
    }
}

#[async_trait]
impl Backend for YtDlpBackend {
    fn id(&self) -> &'static str {
        "yt-dlp"
    }

    async fn probe(&self, url: &str) -> Result<ProbeInfo, MediaError> {
        debug!("Probing {} with {}", url, self.ytdlp_path.display());

        let mut cmd = AsyncCommand::new(&self.ytdlp_path);
        cmd.args(Self::probe_args(url)).kill_on_drop(true);

        let output = match timeout(self.probe_timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!("Failed to start yt-dlp: {}", e);
                return Err(MediaError::Extraction(format!("failed to start yt-dlp: {}", e)));
            }
            Err(_) => {
                error!("yt-dlp probe timed out for {}", url);
                return Err(MediaError::Extraction(format!(
                    "metadata probe timed out after {}s",
                    self.probe_timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let message = stderr_message(&output.stderr, output.status);
            error!("yt-dlp extraction failed: {}", message);
            return Err(MediaError::Extraction(message));
        }

        serde_json::from_slice::<ProbeInfo>(&output.stdout).map_err(|e| {
            error!("Unreadable yt-dlp metadata: {}", e);
            MediaError::Extraction(format!("unreadable yt-dlp metadata: {}", e))
        })
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedMedia, MediaError> {
        let args = self.fetch_args(request);
        debug!("Running {} {:?}", self.ytdlp_path.display(), args);

        let mut child = AsyncCommand::new(&self.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaError::Transfer(format!("failed to start yt-dlp: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::Transfer("yt-dlp stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::Transfer("yt-dlp stderr unavailable".to_string()))?;

        let stdout_task = tokio::spawn(collect_lines(stdout, request.progress.clone()));
        let stderr_task = tokio::spawn(collect_lines(stderr, request.progress.clone()));

        let status = match timeout(self.transfer_timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                return Err(MediaError::Transfer(format!("failed to wait for yt-dlp: {}", e)));
            }
            Err(_) => {
                warn!("yt-dlp transfer timed out, killing process");
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill yt-dlp: {}", e);
                }
                return Err(MediaError::Transfer(format!(
                    "download timed out after {}s",
                    self.transfer_timeout.as_secs()
                )));
            }
        };

        let stdout_lines = stdout_task.await.unwrap_or_default();
        let stderr_lines = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let errors: Vec<String> = stderr_lines
                .iter()
                .map(|l| String::from_utf8_lossy(l).into_owned())
                .filter(|l| l.contains("ERROR"))
                .collect();
            let message = if errors.is_empty() {
                format!("yt-dlp exited with {}", status)
            } else {
                errors.join("\n")
            };
            error!("yt-dlp download failed: {}", message);
            return Err(MediaError::Transfer(message));
        }

        parse_print_output(&stdout_lines).ok_or_else(|| {
            MediaError::Transfer("yt-dlp did not report an output file".to_string())
        })
    }
}

/// Drain a child stream, forwarding progress lines and keeping the rest.
///
/// Lines are kept as raw bytes: titles and paths are not guaranteed to be
/// UTF-8, and the stream must be read to EOF so yt-dlp never blocks on a
/// full pipe.
async fn collect_lines<R>(
    stream: R,
    progress: Option<mpsc::Sender<TransferProgress>>,
) -> Vec<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut kept = Vec::new();

    loop {
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Stopped reading yt-dlp output: {}", e);
                break;
            }
        }
        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }

        if line.starts_with(b"[download]") {
            let update = std::str::from_utf8(&line)
                .ok()
                .and_then(TransferProgress::parse_line);
            if let Some(update) = update {
                if let Some(tx) = &progress {
                    // full or closed channel: the update is dropped
                    let _ = tx.try_send(update);
                }
                continue;
            }
        }
        kept.push(line);
    }

    kept
}

/// Pull the `--print` markers out of yt-dlp's stdout
fn parse_print_output(lines: &[Vec<u8>]) -> Option<FetchedMedia> {
    let mut local_path = None;
    let mut title = None;
    let mut audio_bitrate_kbps = None;

    // the last file wins: post-processing may print after each move
    for line in lines {
        if let Some(path) = line.strip_prefix(FILE_MARKER.as_bytes()) {
            local_path = Some(path_from_bytes(path));
        } else if let Some(t) = line.strip_prefix(TITLE_MARKER.as_bytes()) {
            title = Some(String::from_utf8_lossy(t).into_owned());
        } else if let Some(abr) = line.strip_prefix(ABR_MARKER.as_bytes()) {
            // yt-dlp prints "NA" for unknown fields
            audio_bitrate_kbps = std::str::from_utf8(abr)
                .ok()
                .and_then(|v| v.trim().parse::<f32>().ok())
                .filter(|v| v.is_finite() && *v > 0.0);
        }
    }

    let local_path = local_path?;
    let title = title.unwrap_or_else(|| {
        local_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    Some(FetchedMedia {
        local_path,
        title,
        reported_size: None,
        audio_bitrate_kbps,
    })
}

fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
    }

    #[cfg(not(unix))]
    {
        PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
    }
}

fn stderr_message(stderr: &[u8], status: std::process::ExitStatus) -> String {
    let text = String::from_utf8_lossy(stderr).trim().to_string();
    if text.is_empty() {
        format!("yt-dlp exited with {}", status)
    } else {
        text
    }
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Configured path
/// 2. Next to the running executable
/// 3. System PATH
/// 4. Common installation paths
pub fn find_ytdlp(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if is_executable(path) {
            return Some(path.to_path_buf());
        }
        warn!("Configured yt-dlp is not executable: {}", path.display());
    }

    if let Some(adjacent) = find_adjacent_ytdlp() {
        debug!("Using yt-dlp next to executable: {}", adjacent.display());
        return Some(adjacent);
    }

    if let Ok(system) = which::which("yt-dlp") {
        debug!("Using system yt-dlp: {}", system.display());
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        debug!("Using yt-dlp from common path: {}", common.display());
        return Some(common);
    }

    warn!("yt-dlp not found anywhere");
    None
}

fn find_adjacent_ytdlp() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let name = if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" };
    let candidate = exe_path.parent()?.join(name);
    is_executable(&candidate).then_some(candidate)
}

fn find_in_common_paths() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
        "/snap/bin/yt-dlp",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    // pip --user
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join("yt-dlp"));
    }

    candidates.into_iter().find(|p| is_executable(p))
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
