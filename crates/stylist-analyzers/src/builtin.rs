//! In-process skin-tone detection
//!
//! The centre of the image is sampled, pixels outside a loose skin-colour
//! range are discarded, and the remainder is clustered with k-means. The most
//! frequent cluster that looks like skin (`r > g > b`, `r > 60`) becomes the
//! reading; without one the most frequent cluster is used.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use image::RgbImage;
use stylist_core::{Rgb, SkinToneReading, UploadedImage};

use crate::analyzer::{read_image_bytes, with_timeout, AnalyzerError, SkinToneDetector};

const CLUSTER_COUNT: usize = 5;
const MAX_CROP_HALF_SIZE: u32 = 100;
const MAX_ITERATIONS: usize = 25;
const SKIN_MIN_GREEN: u8 = 20;
const SKIN_MIN_BLUE: u8 = 70;

pub struct BuiltinSkinToneDetector {
    timeout: Duration,
}

impl BuiltinSkinToneDetector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl SkinToneDetector for BuiltinSkinToneDetector {
    fn name(&self) -> &str {
        "builtin"
    }

    #[tracing::instrument(skip(self, image), fields(analyzer = "builtin", key = %image.key))]
    async fn detect(&self, image: &UploadedImage) -> Result<SkinToneReading, AnalyzerError> {
        let start = Instant::now();
        let bytes = read_image_bytes(image).await?;

        let reading = with_timeout(self.timeout, async move {
            tokio::task::spawn_blocking(move || analyze_bytes(&bytes))
                .await
                .map_err(|e| AnalyzerError::Failed(format!("Skin tone task failed: {}", e)))?
        })
        .await?;

        tracing::info!(
            label = %reading.label,
            hex = %reading.hex,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Skin tone detected"
        );

        Ok(reading)
    }
}

/// Decode an encoded image and analyze it.
pub fn analyze_bytes(bytes: &[u8]) -> Result<SkinToneReading, AnalyzerError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AnalyzerError::InvalidImage(format!("Could not read image: {}", e)))?
        .to_rgb8();
    analyze_image(&img)
}

pub fn analyze_image(img: &RgbImage) -> Result<SkinToneReading, AnalyzerError> {
    let crop = center_crop(img);
    if crop.is_empty() {
        return Err(AnalyzerError::InvalidImage("Image has no pixels".to_string()));
    }

    let skin: Vec<[f64; 3]> = crop
        .iter()
        .filter(|p| p[1] >= SKIN_MIN_GREEN && p[2] >= SKIN_MIN_BLUE)
        .map(|p| to_point(*p))
        .collect();
    let pixels = if skin.is_empty() {
        crop.iter().map(|p| to_point(*p)).collect()
    } else {
        skin
    };

    let clusters = kmeans(&pixels, CLUSTER_COUNT);
    let chosen = clusters
        .iter()
        .find(|c| looks_like_skin(&c.centroid))
        .or_else(|| clusters.first())
        .ok_or_else(|| AnalyzerError::Failed("No colour clusters found".to_string()))?;

    // Truncate towards zero, matching integer conversion of the centroid.
    let rgb = Rgb::new(
        chosen.centroid[0] as u8,
        chosen.centroid[1] as u8,
        chosen.centroid[2] as u8,
    );

    Ok(SkinToneReading {
        label: classify_skin_tone(rgb).to_string(),
        hex: rgb.to_hex(),
        rgb,
    })
}

/// Map a colour to a tone label by its channel average.
pub fn classify_skin_tone(rgb: Rgb) -> &'static str {
    let avg = (rgb.r as f64 + rgb.g as f64 + rgb.b as f64) / 3.0;
    if avg > 220.0 {
        "Very Fair"
    } else if avg > 190.0 {
        "Fair"
    } else if avg > 160.0 {
        "Medium"
    } else if avg > 120.0 {
        "Olive"
    } else if avg > 90.0 {
        "Brown"
    } else {
        "Dark"
    }
}

fn to_point(p: [u8; 3]) -> [f64; 3] {
    [p[0] as f64, p[1] as f64, p[2] as f64]
}

fn looks_like_skin(c: &[f64; 3]) -> bool {
    c[0] > c[1] && c[1] > c[2] && c[0] > 60.0
}

/// Pixels of the square centred on the image, falling back to the whole image
/// when the square is empty.
fn center_crop(img: &RgbImage) -> Vec<[u8; 3]> {
    let (w, h) = img.dimensions();
    let mut half = MAX_CROP_HALF_SIZE.min(h / 3).min(w / 3);
    if half == 0 {
        half = h.min(w) / 2;
    }

    let (cx, cy) = (w / 2, h / 2);
    let (x0, x1) = (cx.saturating_sub(half), (cx + half).min(w));
    let (y0, y1) = (cy.saturating_sub(half), (cy + half).min(h));

    let mut pixels = Vec::with_capacity(((x1 - x0) * (y1 - y0)) as usize);
    for y in y0..y1 {
        for x in x0..x1 {
            pixels.push(img.get_pixel(x, y).0);
        }
    }

    if pixels.is_empty() {
        pixels = img.pixels().map(|p| p.0).collect();
    }
    pixels
}

#[derive(Debug, Clone)]
struct Cluster {
    centroid: [f64; 3],
    count: usize,
}

/// Deterministic k-means. Initial centroids are taken at evenly spaced ranks
/// of pixel brightness. Returns non-empty clusters, most populated first.
fn kmeans(pixels: &[[f64; 3]], k: usize) -> Vec<Cluster> {
    if pixels.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..pixels.len()).collect();
    order.sort_by(|&a, &b| brightness(&pixels[a]).total_cmp(&brightness(&pixels[b])));

    let k = k.min(pixels.len());
    let mut centroids: Vec<[f64; 3]> = (0..k)
        .map(|i| {
            let rank = if k == 1 { 0 } else { i * (pixels.len() - 1) / (k - 1) };
            pixels[order[rank]]
        })
        .collect();

    let mut assignment = vec![usize::MAX; pixels.len()];
    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, p) in pixels.iter().enumerate() {
            let nearest = nearest_centroid(p, &centroids);
            if assignment[i] != nearest {
                assignment[i] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (p, &c) in pixels.iter().zip(&assignment) {
            for ch in 0..3 {
                sums[c][ch] += p[ch];
            }
            counts[c] += 1;
        }
        for c in 0..k {
            // An empty cluster keeps its previous centroid.
            if counts[c] > 0 {
                let n = counts[c] as f64;
                centroids[c] = [sums[c][0] / n, sums[c][1] / n, sums[c][2] / n];
            }
        }
    }

    let mut counts = vec![0usize; k];
    for &c in &assignment {
        counts[c] += 1;
    }

    let mut clusters: Vec<Cluster> = centroids
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(centroid, count)| Cluster { centroid, count })
        .collect();
    // Stable sort keeps the brightness order among equal counts.
    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters
}

fn brightness(p: &[f64; 3]) -> f64 {
    p[0] + p[1] + p[2]
}

fn nearest_centroid(p: &[f64; 3], centroids: &[[f64; 3]]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let dist = (p[0] - c[0]).powi(2) + (p[1] - c[1]).powi(2) + (p[2] - c[2]).powi(2);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}
