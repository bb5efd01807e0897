//! Editor walkthrough against the synthetic backend:
//!
//! 1. Ingest two photos, watch the demo cap reject a second batch
//! 2. Tune the generation config
//! 3. Run a generation while tailing live progress
//! 4. Play and download the preview

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use editor_core::config::{AnimationStyle, ConfigPatch, FrameDuration, TransitionStyle};
use editor_core::job::JobPhase;
use editor_core::photo::CandidateFile;
use editor_core::session::{EditorSession, SessionOptions};
use editor_core::synthetic::SyntheticBackend;

fn sample_photo(name: &str, shade: u8) -> CandidateFile {
    let img = image::RgbImage::from_pixel(64, 64, image::Rgb([shade, shade, 245]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("png encode");
    CandidateFile {
        name: name.to_string(),
        media_type: "image/png".to_string(),
        bytes: Bytes::from(buf.into_inner()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("photomotion editor demo (synthetic backend)\n");

    let backend = Arc::new(SyntheticBackend::new());
    let options = SessionOptions { simulated_tick: Duration::from_millis(50) };
    let (mut session, mut channels) = EditorSession::new(backend, options);

    println!("step 1: ingest two photos");
    let added = session.ingest(vec![
        sample_photo("beach.png", 80),
        sample_photo("sunset.png", 200),
    ])?;
    println!("   added {added}, collection {}/3", session.photos().len());

    println!("step 2: the demo cap holds");
    let rejected = session.ingest(vec![
        sample_photo("mountain.png", 40),
        sample_photo("forest.png", 120),
    ]);
    println!("   second batch rejected: {}", rejected.unwrap_err());

    println!("step 3: configure");
    session.update_config(ConfigPatch {
        frame_duration: Some(FrameDuration::new(4)?),
        animation: Some(AnimationStyle::Dynamic),
        transition: Some(TransitionStyle::Zoom),
    });
    println!("   {:?}", session.config());

    println!("step 4: generate");
    let mut job = channels.job.clone();
    let watcher = tokio::spawn(async move {
        loop {
            if job.changed().await.is_err() {
                break;
            }
            let snapshot = job.borrow().clone();
            println!("   [{:?}] {}%", snapshot.phase, snapshot.progress);
            if matches!(snapshot.phase, JobPhase::Succeeded | JobPhase::Failed) {
                break;
            }
        }
    });

    let result = session.start_generation().await?;
    watcher.await?;
    println!("   preview: {}", result.preview_url);
    if let Some(video_url) = &result.video_url {
        println!("   video:   {video_url}");
    }

    while let Ok(notice) = channels.notices.try_recv() {
        println!("   toast [{:?}]: {}", notice.kind, notice.message);
    }

    println!("step 5: play and download");
    if let Some(playback) = session.play_preview() {
        println!("   playing {} for {}s", playback.preview_url, playback.duration_seconds);
    }
    if let Some(download) = session.download_preview().await {
        println!("   exported {} ({} bytes)", download.file_name, download.bytes.len());
    }

    Ok(())
}
