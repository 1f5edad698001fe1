// sun_textures.rs — background loading of the time-of-day images
//
// Images live in assets/sun/sun_00.png .. sun_39.png. Each one is decoded on a
// worker thread and sent back over a channel; a missing or broken file is
// replaced by a generated sky gradient for that hour so the blend always has
// something to sample.

use image::io::Reader as ImageReader;
use image::{Rgba, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use walkthrough_viewer::config::find_asset;
use walkthrough_viewer::emission::time_of_day_hour;
use walkthrough_viewer::{Result, WalkthroughError};

const FALLBACK_SIZE: u32 = 64;

pub struct SunImage {
    pub index: usize,
    pub image: RgbaImage,
}

/// Images received so far, indexed by time sample.
pub struct SunTextures {
    images: Vec<Option<RgbaImage>>,
}

impl SunTextures {
    pub fn new(count: usize) -> Self {
        Self {
            images: vec![None; count],
        }
    }

    pub fn insert(&mut self, sun: SunImage) {
        if let Some(slot) = self.images.get_mut(sun.index) {
            *slot = Some(sun.image);
        }
    }

    pub fn get(&self, index: usize) -> Option<&RgbaImage> {
        self.images.get(index).and_then(Option::as_ref)
    }

    pub fn loaded(&self) -> usize {
        self.images.iter().filter(|i| i.is_some()).count()
    }

    pub fn total(&self) -> usize {
        self.images.len()
    }
}

fn sun_image_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("sun_{index:02}.png"))
}

fn decode_file(path: &Path) -> Result<RgbaImage> {
    let file = File::open(path).map_err(|source| WalkthroughError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    ImageReader::new(reader)
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|mut r| {
            r.no_limits();
            r.decode()
        })
        .map(|img| img.to_rgba8())
        .map_err(|source| WalkthroughError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })
}

/// A vertical sky gradient tinted by the hour of the sample.
pub fn generated_sky(index: usize) -> RgbaImage {
    let hour = time_of_day_hour(index) as f32;
    // 0 at sunrise/sunset, 1 at noon
    let daylight = (1.0 - ((hour - 13.5) / 7.5).abs()).clamp(0.0, 1.0);
    let zenith = [
        0.25 + 0.15 * daylight,
        0.3 + 0.4 * daylight,
        0.45 + 0.5 * daylight,
    ];
    let horizon = [1.0, 0.55 + 0.4 * daylight, 0.3 + 0.6 * daylight];

    RgbaImage::from_fn(FALLBACK_SIZE, FALLBACK_SIZE, |_, y| {
        let t = y as f32 / (FALLBACK_SIZE - 1) as f32;
        let c = |i: usize| ((zenith[i] + (horizon[i] - zenith[i]) * t) * 255.0) as u8;
        Rgba([c(0), c(1), c(2), 255])
    })
}

pub fn start_loading(count: usize, tx: Sender<SunImage>) {
    thread::spawn(move || {
        let dir = find_asset("sun");
        if dir.is_none() {
            log::warn!("assets/sun not found, using generated sun textures");
        }

        for index in 0..count {
            let image = match dir.as_deref().map(|d| decode_file(&sun_image_path(d, index))) {
                Some(Ok(image)) => image,
                Some(Err(e)) => {
                    log::warn!("{e}; using generated texture for sample {index}");
                    generated_sky(index)
                }
                None => generated_sky(index),
            };

            if tx.send(SunImage { index, image }).is_err() {
                log::error!("Sun texture receiver closed");
                return;
            }
        }
        log::info!("Loaded {count} sun textures");
    });
}
