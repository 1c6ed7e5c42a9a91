//! Integration tests for the download flow, using scripted backends instead of
//! yt-dlp so nothing touches the network.

use async_trait::async_trait;
use medialoader::extractor::models::{FetchRequest, FetchedMedia, ProbeInfo, RawEncoding};
use medialoader::extractor::Backend;
use medialoader::{
    AppSettings, AudioTier, DegradedBackend, DownloadOrchestrator, MediaError, QualityRequest,
    QualityTier, TransferProgress,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn encoding(id: &str, note: &str, vcodec: &str, acodec: &str, size: u64) -> RawEncoding {
    RawEncoding {
        format_id: id.to_string(),
        format_note: Some(note.to_string()),
        ext: Some("mp4".to_string()),
        vcodec: Some(vcodec.to_string()),
        acodec: Some(acodec.to_string()),
        filesize: Some(size),
        ..Default::default()
    }
}

fn youtube_encodings() -> Vec<RawEncoding> {
    vec![
        encoding("sb0", "storyboard", "none", "none", 10),
        encoding("18", "360p", "avc1", "mp4a", 2_000_000),
        encoding("22", "720p", "avc1", "mp4a", 5_000_000),
        encoding("140", "128kbps", "none", "mp4a", 1_000_000),
    ]
}

/// Probe and fetch behavior fixed up front; fetch writes a real file so the
/// orchestrator's stat path is exercised.
struct ScriptedBackend {
    encodings: Vec<RawEncoding>,
    probe_error: Option<String>,
    fetch_error: Option<String>,
    probes: AtomicUsize,
    fetched_formats: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    fn new(encodings: Vec<RawEncoding>) -> Self {
        Self {
            encodings,
            probe_error: None,
            fetch_error: None,
            probes: AtomicUsize::new(0),
            fetched_formats: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn id(&self) -> &'static str {
        "scripted"
    }

    async fn probe(&self, url: &str) -> Result<ProbeInfo, MediaError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.probe_error {
            return Err(MediaError::Extraction(message.clone()));
        }
        if url.contains("broken") {
            return Err(MediaError::Extraction(format!("ERROR: Unsupported URL: {}", url)));
        }
        Ok(ProbeInfo {
            id: "abc".to_string(),
            title: "Scripted clip".to_string(),
            uploader: Some("Tester".to_string()),
            duration: Some(42.0),
            formats: self.encodings.clone(),
            ..Default::default()
        })
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedMedia, MediaError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.fetched_formats
            .lock()
            .expect("lock")
            .push(request.format.clone());

        if let Some(message) = &self.fetch_error {
            return Err(MediaError::Transfer(message.clone()));
        }

        if let Some(tx) = &request.progress {
            for percent in [50.0, 100.0] {
                let _ = tx
                    .send(TransferProgress {
                        percent,
                        speed_bps: 1024.0,
                        total_bytes: 2048,
                        eta: None,
                    })
                    .await;
            }
        }

        let name = format!(
            "{}-{}.{}",
            request.url.rsplit('/').next().unwrap_or("clip"),
            request.format.replace('/', "_"),
            if request.audio.is_some() { "mp3" } else { "mp4" }
        );
        let path = request.output_dir.join(name);
        tokio::fs::write(&path, vec![0u8; 2048]).await?;

        Ok(FetchedMedia {
            local_path: path,
            title: "Scripted clip".to_string(),
            reported_size: None,
            audio_bitrate_kbps: None,
        })
    }
}

fn engine_with(backend: ScriptedBackend) -> (DownloadOrchestrator, Arc<ScriptedBackend>) {
    let backend = Arc::new(backend);
    (DownloadOrchestrator::new(backend.clone()), backend)
}

#[tokio::test]
async fn resolve_partitions_and_drops_streamless_entries() {
    let (engine, backend) = engine_with(ScriptedBackend::new(youtube_encodings()));
    let catalog = engine.resolve("https://youtube.com/watch?v=abc").await.unwrap();

    assert_eq!(backend.probes.load(Ordering::SeqCst), 1);
    assert_eq!(catalog.len(), 3);
    let combined: Vec<&str> = catalog.combined().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(combined, vec!["22", "18"]);
    assert!(catalog.find("sb0").is_none());
    assert_eq!(catalog.best_audio().map(|d| d.id.as_str()), Some("140"));
}

#[tokio::test]
async fn youtube_scenario_best_and_360() {
    let temp = TempDir::new().expect("temp dir");
    let (engine, backend) = engine_with(ScriptedBackend::new(youtube_encodings()));
    let url = "https://youtube.com/watch?v=abc";

    let best = engine
        .download(url, temp.path(), &QualityRequest::Best)
        .await
        .unwrap();
    assert_eq!(best.encoding_id, "22");
    assert_eq!(best.quality_label, "720p");
    assert_eq!(best.size_bytes, 2048);
    assert!(best.file_path.exists());

    let low = engine
        .download(url, temp.path(), &QualityRequest::Tier(QualityTier::P360))
        .await
        .unwrap();
    assert_eq!(low.encoding_id, "18");

    assert_eq!(
        *backend.fetched_formats.lock().expect("lock"),
        vec!["22".to_string(), "18".to_string()]
    );
}

#[tokio::test]
async fn encoding_id_round_trip_keeps_label() {
    let temp = TempDir::new().expect("temp dir");
    let (engine, _) = engine_with(ScriptedBackend::new(youtube_encodings()));
    let url = "https://youtube.com/watch?v=abc";

    let catalog = engine.resolve(url).await.unwrap();
    let listed = catalog.find("18").unwrap().clone();

    let media = engine
        .download_by_encoding_id(url, temp.path(), &listed.id)
        .await
        .unwrap();
    assert_eq!(media.encoding_id, listed.id);
    assert_eq!(media.quality_label, listed.quality_label);
}

#[tokio::test]
async fn nearest_substitution_is_silent() {
    let temp = TempDir::new().expect("temp dir");
    let (engine, _) = engine_with(ScriptedBackend::new(vec![encoding(
        "18", "360p", "avc1", "mp4a", 100,
    )]));

    let media = engine
        .download(
            "https://a.example/v",
            temp.path(),
            &QualityRequest::Tier(QualityTier::P1080),
        )
        .await
        .unwrap();
    assert_eq!(media.quality_label, "360p");
}

#[tokio::test]
async fn extraction_failure_is_verbatim_and_skips_fetch() {
    let temp = TempDir::new().expect("temp dir");
    let mut scripted = ScriptedBackend::new(youtube_encodings());
    scripted.probe_error = Some("ERROR: [generic] Unable to download webpage".to_string());
    let (engine, backend) = engine_with(scripted);

    let err = engine
        .download("https://a.example/v", temp.path(), &QualityRequest::Best)
        .await
        .unwrap_err();
    match err {
        MediaError::Extraction(message) => {
            assert_eq!(message, "ERROR: [generic] Unable to download webpage")
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(backend.fetched_formats.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn transfer_failure_is_verbatim() {
    let temp = TempDir::new().expect("temp dir");
    let mut scripted = ScriptedBackend::new(youtube_encodings());
    scripted.fetch_error = Some("ERROR: Requested format is not available".to_string());
    let (engine, _) = engine_with(scripted);

    let err = engine
        .download("https://a.example/v", temp.path(), &QualityRequest::Best)
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::Transfer(_)));
    assert_eq!(err.to_string(), "ERROR: Requested format is not available");
}

#[tokio::test]
async fn audio_only_catalog_has_no_video_match() {
    let temp = TempDir::new().expect("temp dir");
    let (engine, backend) = engine_with(ScriptedBackend::new(vec![encoding(
        "140", "128kbps", "none", "mp4a", 100,
    )]));

    let err = engine
        .download("https://soundcloud.com/a/b", temp.path(), &QualityRequest::Best)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MediaError::NoMatchingEncoding { ref requested } if requested == "best"
    ));
    assert!(backend.fetched_formats.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn audio_download_uses_audio_selector() {
    let temp = TempDir::new().expect("temp dir");
    let (engine, backend) = engine_with(ScriptedBackend::new(youtube_encodings()));

    let media = engine
        .download_audio("https://youtube.com/watch?v=abc", temp.path(), AudioTier::High)
        .await
        .unwrap();
    assert_eq!(media.quality_label, "192kbps");
    assert!(media.file_name.ends_with(".mp3"));
    // audio skips the probe
    assert_eq!(backend.probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn progress_is_forwarded() {
    let temp = TempDir::new().expect("temp dir");
    let (engine, _) = engine_with(ScriptedBackend::new(youtube_encodings()));
    let (tx, mut rx) = mpsc::channel(8);

    engine
        .download_with_progress(
            "https://youtube.com/watch?v=abc",
            temp.path(),
            &QualityRequest::Best,
            Some(tx),
        )
        .await
        .unwrap();

    let mut seen = Vec::new();
    while let Some(p) = rx.recv().await {
        seen.push(p.percent);
    }
    assert_eq!(seen, vec![50.0, 100.0]);
}

#[tokio::test]
async fn batch_keeps_order_and_bounds_concurrency() {
    let temp = TempDir::new().expect("temp dir");
    let (engine, backend) = engine_with(ScriptedBackend::new(youtube_encodings()));
    let engine = engine.with_max_concurrent(2);

    let urls: Vec<String> = vec![
        "https://a.example/one".to_string(),
        "https://a.example/broken".to_string(),
        "https://a.example/three".to_string(),
        "https://a.example/four".to_string(),
    ];
    let results = engine
        .download_batch(&urls, temp.path(), &QualityRequest::Best)
        .await;

    let order: Vec<&str> = results.iter().map(|(u, _)| u.as_str()).collect();
    assert_eq!(order, urls.iter().map(String::as_str).collect::<Vec<_>>());
    assert!(results[0].1.is_ok());
    assert!(matches!(results[1].1, Err(MediaError::Extraction(_))));
    assert_eq!(results.iter().filter(|(_, r)| r.is_ok()).count(), 3);
    assert!(backend.peak_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn degraded_mode_resolves_and_downloads() {
    let temp = TempDir::new().expect("temp dir");
    let engine = DownloadOrchestrator::new(Arc::new(DegradedBackend::new()));
    assert!(engine.is_degraded());

    let url = "https://youtube.com/watch?v=abc";
    let catalog = engine.resolve(url).await.unwrap();
    assert!(!catalog.is_empty());

    let first = engine
        .download(url, temp.path(), &QualityRequest::Best)
        .await
        .unwrap();
    let second = engine
        .download(url, temp.path(), &QualityRequest::Best)
        .await
        .unwrap();
    assert_eq!(first.file_path, second.file_path);
    assert_eq!(first.file_path, temp.path().join("test_video.mp4"));
    assert_eq!(first.size_mb, 25.5);
}

#[cfg(unix)]
#[test]
fn configured_executable_selects_ytdlp() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().expect("temp dir");
    let script = temp.path().join("yt-dlp");
    std::fs::write(&script, "#!/bin/sh\nexit 0\n").expect("write script");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).expect("chmod");

    let settings = AppSettings {
        ytdlp_path: Some(script),
        max_concurrent: 2,
        ..Default::default()
    };
    let engine = DownloadOrchestrator::from_settings(&settings);
    assert_eq!(engine.backend_id(), "yt-dlp");
    assert!(!engine.is_degraded());
    assert_eq!(engine.classify_platform("https://vimeo.com/1"), "Vimeo");
}

#[tokio::test]
async fn inspect_combines_metadata_and_catalog() {
    let (engine, backend) = engine_with(ScriptedBackend::new(youtube_encodings()));
    let info = engine.inspect("https://youtu.be/abc").await.unwrap();

    assert_eq!(backend.probes.load(Ordering::SeqCst), 1);
    assert_eq!(info.title, "Scripted clip");
    assert_eq!(info.platform, "YouTube");
    assert_eq!(info.catalog.combined().len(), 2);
    assert!(info.to_string().contains("[22] 720p (mp4)"));
}
