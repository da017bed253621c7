//! Pure Rust recognizer using `pure-onnx-ocr`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::{Recognizer, Result};
use crate::error::OcrError;

/// Detection model file name inside the model directory.
pub const DETECTION_MODEL: &str = "det.onnx";
/// Recognition model file name inside the model directory.
pub const RECOGNITION_MODEL: &str = "latin_rec.onnx";
/// Character dictionary file name inside the model directory.
pub const DICTIONARY: &str = "latin_dict.txt";

/// Recognizer backed by `pure-onnx-ocr` (no external binaries).
pub struct OnnxRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
    model_dir: PathBuf,
}

impl OnnxRecognizer {
    /// Load the models from a directory.
    pub fn from_dir(model_dir: &Path) -> std::result::Result<Self, OcrError> {
        let missing = missing_models(model_dir);
        if !missing.is_empty() {
            return Err(OcrError::ModelLoad(format!(
                "missing {} in {}",
                missing.join(", "),
                model_dir.display()
            )));
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&model_dir.join(DETECTION_MODEL))
            .rec_model_path(&model_dir.join(RECOGNITION_MODEL))
            .dictionary_path(&model_dir.join(DICTIONARY))
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr models from {}", model_dir.display());

        Ok(Self {
            engine,
            model_dir: model_dir.to_path_buf(),
        })
    }
}

fn missing_models(model_dir: &Path) -> Vec<&'static str> {
    [DETECTION_MODEL, RECOGNITION_MODEL, DICTIONARY]
        .into_iter()
        .filter(|name| !model_dir.join(name).is_file())
        .collect()
}

impl Recognizer for OnnxRecognizer {
    fn name(&self) -> &'static str {
        "pure-onnx-ocr"
    }

    fn probe(&self) -> std::result::Result<(), String> {
        let missing = missing_models(&self.model_dir);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "model files {} are missing from {}",
                missing.join(", "),
                self.model_dir.display()
            ))
        }
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Backend(format!("pure-onnx-ocr: {}", e)))?;

        // Reading order: rows of ~20px top to bottom, then left to right.
        let mut lines: Vec<(i32, f32, String)> = results
            .iter()
            .map(|r| {
                let mut min_x = f32::INFINITY;
                let mut min_y = f32::INFINITY;
                for coord in r.bounding_box.exterior().coords().take(4) {
                    min_x = min_x.min(coord.x as f32);
                    min_y = min_y.min(coord.y as f32);
                }
                ((min_y / 20.0) as i32, min_x, r.text.replace("[UNK]", " "))
            })
            .collect();
        lines.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        });

        debug!(
            "pure-onnx-ocr: {} regions in {}x{} image, {}ms",
            lines.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(lines
            .into_iter()
            .map(|(_, _, text)| text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
