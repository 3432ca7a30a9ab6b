//! QR provider.
//!
//! The verification payload is either encoded locally with the `qrcode` crate
//! or fetched from a remote rendering endpoint. Both paths hand back a bitmap
//! resized to exactly `QR_SIZE` x `QR_SIZE`.

use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageBuffer, Rgba};
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

use crate::config::{QrSource, QR_SIZE};

const QUIET_ZONE: u32 = 1;
const MODULE_PX: u32 = 10;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("failed to encode qr payload")]
    Encode,

    #[error("qr service request failed: {0}")]
    Fetch(String),

    #[error("qr service returned http {status}")]
    Status { status: reqwest::StatusCode },

    #[error("failed to decode qr image from remote service")]
    Decode,
}

/// Verification string embedded in the QR code.
pub fn payload(reg_no: &str, name: &str, class_label: &str, section: &str) -> String {
    format!(
        "{reg_no}({name}),Class:{class_label},Sec:{section}/Exam:PRE BOARD-2/PRE BOARD-2-CHINMAYA"
    )
}

pub async fn fetch(
    http: &reqwest::Client,
    source: &QrSource,
    text: &str,
) -> Result<DynamicImage, QrError> {
    let img = match source {
        QrSource::Local => generate_local(text)?,
        QrSource::Remote { url, timeout } => fetch_remote(http, url, *timeout, text).await?,
    };
    Ok(normalize_size(img))
}

fn generate_local(text: &str) -> Result<DynamicImage, QrError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
        .map_err(|_| QrError::Encode)?;
    Ok(DynamicImage::ImageRgba8(render_modules(&code)))
}

fn render_modules(code: &QrCode) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    let width_modules = code.width() as u32;
    let total_modules = width_modules + 2 * QUIET_ZONE;
    let size = total_modules * MODULE_PX;

    let mut img = ImageBuffer::from_pixel(size, size, Rgba([255, 255, 255, 255]));

    for y in 0..width_modules {
        for x in 0..width_modules {
            if matches!(code[(x as usize, y as usize)], qrcode::Color::Dark) {
                let px0 = (x + QUIET_ZONE) * MODULE_PX;
                let py0 = (y + QUIET_ZONE) * MODULE_PX;
                for py in py0..(py0 + MODULE_PX) {
                    for px in px0..(px0 + MODULE_PX) {
                        img.put_pixel(px, py, Rgba([0, 0, 0, 255]));
                    }
                }
            }
        }
    }

    img
}

async fn fetch_remote(
    http: &reqwest::Client,
    url: &str,
    timeout: std::time::Duration,
    text: &str,
) -> Result<DynamicImage, QrError> {
    let size = format!("{QR_SIZE}x{QR_SIZE}");
    let resp = http
        .get(url)
        .query(&[("data", text), ("size", size.as_str())])
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| QrError::Fetch(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(QrError::Status {
            status: resp.status(),
        });
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| QrError::Fetch(e.to_string()))?;

    image::load_from_memory(&bytes).map_err(|_| QrError::Decode)
}

fn normalize_size(img: DynamicImage) -> DynamicImage {
    if img.width() != QR_SIZE || img.height() != QR_SIZE {
        img.resize_exact(QR_SIZE, QR_SIZE, FilterType::Lanczos3)
    } else {
        img
    }
}
