//! Fixed layout settings and asset resolution.
//!
//! All coordinates and sizes are constants matched to the template artwork;
//! nothing here is derived at runtime. Asset locations default to the crate's
//! `assets/` directory and can be overridden per file through the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const FONT_SIZE: f32 = 28.0;

pub const POS_REG: (i32, i32) = (840, 560);
pub const POS_NAME: (i32, i32) = (840, 680);
pub const POS_CLASS: (i32, i32) = (490, 620);
pub const POS_SECTION: (i32, i32) = (950, 620);
pub const POS_ROLL: (i32, i32) = (530, 800);

pub const QR_POS: (u32, u32) = (1320, 1320);
pub const QR_SIZE: u32 = 200;

const DEFAULT_QR_REMOTE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";
const DEFAULT_QR_REMOTE_TIMEOUT_SECS: u64 = 10;

/// Where the QR bitmap comes from. Both sources yield the same fixed-size
/// bitmap; `Remote` delegates rendering to an external image endpoint.
#[derive(Clone, Debug)]
pub enum QrSource {
    Local,
    Remote { url: String, timeout: Duration },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub template_path: PathBuf,
    pub font_regular_path: PathBuf,
    pub font_bold_path: PathBuf,
    pub dataset_path: PathBuf,
    pub output_dir: PathBuf,
    pub qr_source: QrSource,
}

fn assets_dir() -> PathBuf {
    if let Ok(p) = std::env::var("ASSETS_DIR") {
        return PathBuf::from(p);
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn asset_path(var: &str, default_name: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| assets_dir().join(default_name))
}

impl Config {
    pub fn from_env() -> Self {
        let qr_source = match std::env::var("QR_SOURCE") {
            Ok(v) if v.eq_ignore_ascii_case("remote") => QrSource::Remote {
                url: std::env::var("QR_REMOTE_URL")
                    .unwrap_or_else(|_| DEFAULT_QR_REMOTE_URL.to_string()),
                timeout: Duration::from_secs(
                    std::env::var("QR_REMOTE_TIMEOUT_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(DEFAULT_QR_REMOTE_TIMEOUT_SECS),
                ),
            },
            Ok(v) if v.is_empty() || v.eq_ignore_ascii_case("local") => QrSource::Local,
            Ok(v) => {
                tracing::warn!("unrecognized QR_SOURCE {v:?}, falling back to local");
                QrSource::Local
            }
            Err(_) => QrSource::Local,
        };

        Self {
            template_path: asset_path("TEMPLATE_PATH", "template.png"),
            font_regular_path: asset_path("FONT_REGULAR_PATH", "calibri.ttf"),
            font_bold_path: asset_path("FONT_BOLD_PATH", "calibrib.ttf"),
            dataset_path: asset_path("DATASET_PATH", "students.json"),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            qr_source,
        }
    }
}
