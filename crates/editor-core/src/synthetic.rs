use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};
use tracing::warn;
use uuid::Uuid;

use crate::backend::{BackendInfo, ComposeEntry, ComposeResult, GenerationBackend};
use crate::config::{AnimationStyle, GenerationConfig, TransitionStyle};

const PREVIEW_WIDTH: u32 = 1280;
const PREVIEW_HEIGHT: u32 = 720;

/// Brand gradient stops of the hosted preview renderer, top to bottom.
const GRADIENT: [[u8; 3]; 3] = [[155, 135, 245], [217, 70, 239], [249, 115, 22]];

/// Smallest valid PNG (1x1 transparent), substituted when the
/// placeholder render itself is unavailable.
const STATIC_PREVIEW_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Offline stand-in for the generation backend. Uploads mint local
/// references without I/O; compose renders a deterministic placeholder
/// that encodes the photo count and the chosen configuration.
#[derive(Debug, Default)]
pub struct SyntheticBackend {
    artifacts: Mutex<HashMap<String, Bytes>>,
}

impl SyntheticBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GenerationBackend for SyntheticBackend {
    async fn upload(&self, file_name: &str, _bytes: Bytes) -> anyhow::Result<String> {
        let ext = match file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => "jpg",
        };
        Ok(format!("synthetic://photos/{}.{ext}", Uuid::new_v4()))
    }

    async fn compose(
        &self,
        photos: &[ComposeEntry],
        config: &GenerationConfig,
    ) -> anyhow::Result<ComposeResult> {
        if photos.is_empty() {
            anyhow::bail!("no photos provided");
        }

        let png = match render_preview(photos.len(), config) {
            Ok(png) => png,
            Err(e) => {
                // Rendering surface unavailable: a static placeholder
                // keeps the job on the success path.
                warn!(error = %e, "placeholder render failed, using static preview");
                Bytes::from_static(STATIC_PREVIEW_PNG)
            }
        };

        let video_id = Uuid::new_v4();
        let preview_url = format!("synthetic://videos/{video_id}/preview.png");
        let video_url = format!("synthetic://videos/{video_id}/output.mp4");
        self.artifacts
            .lock()
            .expect("artifact map lock")
            .insert(preview_url.clone(), png);

        Ok(ComposeResult {
            preview_url,
            video_url: Some(video_url),
            total_seconds: photos.len() as u32 * u32::from(config.frame_duration.seconds()),
        })
    }

    async fn fetch_artifact(&self, artifact_url: &str) -> anyhow::Result<Bytes> {
        self.artifacts
            .lock()
            .expect("artifact map lock")
            .get(artifact_url)
            .cloned()
            .ok_or_else(|| anyhow!("unknown artifact: {artifact_url}"))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "synthetic".to_string(),
            base_url: None,
            synthetic: true,
        }
    }
}

/// 1280x720 PNG: darkened brand gradient, one white marker block per
/// composited photo, accent bands indexed by the style choices.
fn render_preview(photo_count: usize, config: &GenerationConfig) -> anyhow::Result<Bytes> {
    let mut img = RgbImage::new(PREVIEW_WIDTH, PREVIEW_HEIGHT);

    for y in 0..PREVIEW_HEIGHT {
        let ratio = y as f32 / PREVIEW_HEIGHT as f32;
        let (from, to, t) = if ratio < 0.5 {
            (GRADIENT[0], GRADIENT[1], ratio * 2.0)
        } else {
            (GRADIENT[1], GRADIENT[2], (ratio - 0.5) * 2.0)
        };
        let pixel = Rgb([
            darken(lerp(from[0], to[0], t)),
            darken(lerp(from[1], to[1], t)),
            darken(lerp(from[2], to[2], t)),
        ]);
        for x in 0..PREVIEW_WIDTH {
            img.put_pixel(x, y, pixel);
        }
    }

    // One marker per photo, centered as a row.
    let count = photo_count.max(1) as u32;
    let marker = 80u32;
    let gap = 40u32;
    let row_width = count * marker + (count - 1) * gap;
    let mut x0 = (PREVIEW_WIDTH - row_width.min(PREVIEW_WIDTH)) / 2;
    let y0 = (PREVIEW_HEIGHT - marker) / 2;
    for _ in 0..count {
        fill_rect(&mut img, x0, y0, marker, marker, Rgb([255, 255, 255]));
        x0 = (x0 + marker + gap).min(PREVIEW_WIDTH - marker);
    }

    // Style bands along the bottom edge.
    let animation_index = match config.animation {
        AnimationStyle::Subtle => 0,
        AnimationStyle::Medium => 1,
        AnimationStyle::Dynamic => 2,
    };
    let transition_index = match config.transition {
        TransitionStyle::Fade => 0,
        TransitionStyle::Slide => 1,
        TransitionStyle::Zoom => 2,
        TransitionStyle::Dissolve => 3,
    };
    let band_height = 24u32;
    fill_rect(
        &mut img,
        0,
        PREVIEW_HEIGHT - 2 * band_height,
        (animation_index + 1) * PREVIEW_WIDTH / 3,
        band_height,
        Rgb(GRADIENT[0]),
    );
    fill_rect(
        &mut img,
        0,
        PREVIEW_HEIGHT - band_height,
        (transition_index + 1) * PREVIEW_WIDTH / 4,
        band_height,
        Rgb(GRADIENT[2]),
    );
    // Frame-duration notch: one column of full brand color per second.
    fill_rect(
        &mut img,
        0,
        0,
        u32::from(config.frame_duration.seconds()) * 16,
        16,
        Rgb(GRADIENT[1]),
    );

    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img).write_to(&mut buf, ImageFormat::Png)?;
    Ok(Bytes::from(buf.into_inner()))
}

fn lerp(from: u8, to: u8, t: f32) -> u8 {
    (f32::from(from) + (f32::from(to) - f32::from(from)) * t) as u8
}

/// Matches the 60% black overlay of the hosted renderer.
fn darken(channel: u8) -> u8 {
    (f32::from(channel) * 0.4) as u8
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, width: u32, height: u32, pixel: Rgb<u8>) {
    for y in y0..(y0 + height).min(PREVIEW_HEIGHT) {
        for x in x0..(x0 + width).min(PREVIEW_WIDTH) {
            img.put_pixel(x, y, pixel);
        }
    }
}
