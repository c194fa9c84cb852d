//! Deterministic playlist cover images.
//!
//! The seed is the SHA-256 of all track URIs concatenated in playlist order, so
//! a given final order always produces the same picture and any reorder
//! produces a new one.

use std::{io::Cursor, path::PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use rand::{Rng, SeedableRng, rngs::StdRng};
use sha2::{Digest, Sha256};

use crate::{Res, config};

pub const COVER_SIZE: u32 = 256;

/// Color stops of a diverging red-yellow-blue ("spectral") palette.
const SPECTRAL: [[u8; 3]; 11] = [
    [158, 1, 66],
    [213, 62, 79],
    [244, 109, 67],
    [253, 174, 97],
    [254, 224, 139],
    [255, 255, 191],
    [230, 245, 152],
    [171, 221, 164],
    [102, 194, 165],
    [50, 136, 189],
    [94, 79, 162],
];

struct Blob {
    x: f64,
    y: f64,
    color: [f64; 3],
    spread: f64,
}

pub fn cover_seed(uris: &[String]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for uri in uris {
        hasher.update(uri.as_bytes());
    }
    hasher.finalize().into()
}

/// Samples the spectral palette at `t` in `[0, 1]`.
fn spectral(t: f64) -> [f64; 3] {
    let scaled = t.clamp(0.0, 1.0) * (SPECTRAL.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(SPECTRAL.len() - 1);
    let frac = scaled - lower as f64;

    let mut color = [0.0; 3];
    for (channel, value) in color.iter_mut().enumerate() {
        let a = SPECTRAL[lower][channel] as f64;
        let b = SPECTRAL[upper][channel] as f64;
        *value = a + (b - a) * frac;
    }
    color
}

/// Renders the cover for `uris`.
pub fn generate_cover(uris: &[String]) -> RgbImage {
    let mut rng = StdRng::from_seed(cover_seed(uris));
    let size = COVER_SIZE as f64;

    let blobs: Vec<Blob> = (0..rng.random_range(6..=12))
        .map(|_| Blob {
            x: rng.random_range(0.0..size),
            y: rng.random_range(0.0..size),
            color: spectral(rng.random::<f64>()),
            spread: rng.random_range(200.0..2400.0),
        })
        .collect();

    RgbImage::from_fn(COVER_SIZE, COVER_SIZE, |px, py| {
        let (x, y) = (px as f64, py as f64);
        let mut acc = [0.0; 3];
        let mut total = 0.0;

        for blob in &blobs {
            let d2 = (x - blob.x).powi(2) + (y - blob.y).powi(2);
            let weight = (-d2 / blob.spread).exp() + 1e-6;
            for (channel, value) in acc.iter_mut().enumerate() {
                *value += blob.color[channel] * weight;
            }
            total += weight;
        }

        Rgb(acc.map(|v| (v / total).round().clamp(0.0, 255.0) as u8))
    })
}

/// Encodes a cover as JPEG, the only format Spotify accepts for uploads.
pub fn encode_jpeg(image: &RgbImage) -> Res<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;
    Ok(bytes)
}

/// Writes the JPEG to `<data_dir>/covers/<playlist_id>.jpg` and returns the path.
pub async fn save_cover(playlist_id: &str, jpeg: &[u8]) -> Res<PathBuf> {
    let mut path = config::data_dir();
    path.push("covers");
    async_fs::create_dir_all(&path).await?;

    path.push(format!("{}.jpg", playlist_id));
    async_fs::write(&path, jpeg).await?;
    Ok(path)
}
