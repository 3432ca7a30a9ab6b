//! Hall-ticket generation pipeline: lookup -> render -> composite -> PDF.

use std::path::PathBuf;

use image::{DynamicImage, ImageBuffer, Rgba};
use rusttype::{point, Font, Scale};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::{self, Config},
    dataset::{self, DatasetError, TicketFields},
    fonts::{self, FontError},
    pdf::{self, PdfError},
    qr::{self, QrError},
};

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Invalid Registration Number")]
    NotFound,

    #[error("required asset not found: {0}")]
    MissingAsset(PathBuf),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Font(#[from] FontError),

    #[error("failed to load template: {0}")]
    Template(String),

    #[error("qr: {0}")]
    Qr(#[from] QrError),

    #[error("pdf: {0}")]
    Pdf(#[from] PdfError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs the whole pipeline for one registration number and returns the path
/// of the written PDF. The caller owns the file and is expected to delete it
/// once the response has been built.
pub async fn generate_hall_ticket(
    http: &reqwest::Client,
    cfg: &Config,
    reg_no: &str,
) -> Result<PathBuf, TicketError> {
    for path in [
        &cfg.template_path,
        &cfg.font_regular_path,
        &cfg.font_bold_path,
        &cfg.dataset_path,
    ] {
        if !path.exists() {
            return Err(TicketError::MissingAsset(path.clone()));
        }
    }

    let data = dataset::load(&cfg.dataset_path)?;
    let (class_label, student) = dataset::find(&data, reg_no).ok_or(TicketError::NotFound)?;
    let fields = TicketFields::extract(class_label, student);

    let mut img = image::open(&cfg.template_path)
        .map_err(|e| TicketError::Template(e.to_string()))?
        .to_rgba8();

    let font_regular = fonts::load_font_cached(&cfg.font_regular_path)?;
    let font_bold = fonts::load_font_cached(&cfg.font_bold_path)?;

    let black = Rgba([0, 0, 0, 255]);
    let px = config::FONT_SIZE;
    draw_text(&mut img, &font_regular, px, config::POS_REG, black, &fields.reg_no);
    draw_text(&mut img, &font_bold, px, config::POS_NAME, black, &fields.name);
    draw_text(&mut img, &font_regular, px, config::POS_CLASS, black, &fields.class_label);
    draw_text(&mut img, &font_regular, px, config::POS_SECTION, black, &fields.section);
    draw_text(&mut img, &font_bold, px, config::POS_ROLL, black, &fields.roll_no);

    let payload = qr::payload(
        &fields.reg_no,
        &fields.name,
        &fields.class_label,
        &fields.section,
    );
    let qr_img = qr::fetch(http, &cfg.qr_source, &payload).await?;
    overlay_alpha(&mut img, &qr_img.to_rgba8(), config::QR_POS.0, config::QR_POS.1);

    std::fs::create_dir_all(&cfg.output_dir)?;
    let out_path = cfg
        .output_dir
        .join(format!("{}_{}.pdf", fields.reg_no, Uuid::new_v4()));
    pdf::write_single_page(&DynamicImage::ImageRgba8(img).to_rgb8(), &out_path)?;

    tracing::info!(reg_no = %fields.reg_no, path = %out_path.display(), "hall ticket generated");
    Ok(out_path)
}

fn draw_text(
    img: &mut ImageBuffer<Rgba<u8>, Vec<u8>>,
    font: &Font<'static>,
    px: f32,
    pos: (i32, i32),
    color: Rgba<u8>,
    text: &str,
) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let baseline_y = pos.1 as f32 + v_metrics.ascent;
    let mut caret_x = pos.0 as f32;

    for ch in text.chars() {
        let glyph = font.glyph(ch).scaled(scale).positioned(point(caret_x, baseline_y));
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if px >= img.width() || py >= img.height() {
                    return;
                }
                let a = (v * 255.0) as u8;
                if a == 0 {
                    return;
                }
                let dst = img.get_pixel_mut(px, py);
                let sa = a as f32 / 255.0;
                let inv = 1.0 - sa;
                dst.0[0] = (color.0[0] as f32 * sa + dst.0[0] as f32 * inv) as u8;
                dst.0[1] = (color.0[1] as f32 * sa + dst.0[1] as f32 * inv) as u8;
                dst.0[2] = (color.0[2] as f32 * sa + dst.0[2] as f32 * inv) as u8;
                dst.0[3] = 255;
            });
        }
        caret_x += glyph.unpositioned().h_metrics().advance_width;
    }
}

fn overlay_alpha(
    base: &mut ImageBuffer<Rgba<u8>, Vec<u8>>,
    over: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    x: u32,
    y: u32,
) {
    for oy in 0..over.height() {
        for ox in 0..over.width() {
            let p = over.get_pixel(ox, oy);
            let a = p.0[3] as f32 / 255.0;
            if a <= 0.0 {
                continue;
            }
            let bx = x + ox;
            let by = y + oy;
            if bx >= base.width() || by >= base.height() {
                continue;
            }
            let dst = base.get_pixel_mut(bx, by);
            let inv = 1.0 - a;
            dst.0[0] = (p.0[0] as f32 * a + dst.0[0] as f32 * inv) as u8;
            dst.0[1] = (p.0[1] as f32 * a + dst.0[1] as f32 * inv) as u8;
            dst.0[2] = (p.0[2] as f32 * a + dst.0[2] as f32 * inv) as u8;
            dst.0[3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_replaces_opaque_region() {
        let mut base = ImageBuffer::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let over = ImageBuffer::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        overlay_alpha(&mut base, &over, 3, 3);
        assert_eq!(base.get_pixel(3, 3).0, [0, 0, 0, 255]);
        assert_eq!(base.get_pixel(2, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn overlay_clips_at_the_base_edge() {
        let mut base = ImageBuffer::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let over = ImageBuffer::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        overlay_alpha(&mut base, &over, 8, 8);
        assert_eq!(base.get_pixel(9, 9).0, [0, 0, 0, 255]);
    }
}
