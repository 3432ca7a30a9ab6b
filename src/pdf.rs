//! PDF emitter: one A4 page with the composited bitmap stretched across it.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use image::RgbImage;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};
use thiserror::Error;

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

const MM_PER_INCH: f32 = 25.4;
const DPI: f32 = 300.0;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to create {path}: {source}")]
    Create { path: PathBuf, source: std::io::Error },

    #[error("failed to write pdf: {0}")]
    Save(String),
}

pub fn write_single_page(bitmap: &RgbImage, path: &Path) -> Result<(), PdfError> {
    let (doc, page, layer) = PdfDocument::new(
        "Hall Ticket",
        Mm(A4_WIDTH_MM),
        Mm(A4_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let xobject = ImageXObject {
        width: Px(bitmap.width() as usize),
        height: Px(bitmap.height() as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: bitmap.as_raw().clone(),
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    };

    // At DPI dots per inch the bitmap occupies px / DPI * 25.4 millimeters;
    // scale so it covers the full page in both directions.
    let natural_w_mm = bitmap.width() as f32 / DPI * MM_PER_INCH;
    let natural_h_mm = bitmap.height() as f32 / DPI * MM_PER_INCH;

    Image::from(xobject).add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(0.0)),
            scale_x: Some(A4_WIDTH_MM / natural_w_mm),
            scale_y: Some(A4_HEIGHT_MM / natural_h_mm),
            dpi: Some(DPI),
            ..Default::default()
        },
    );

    let file = File::create(path).map_err(|source| PdfError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| PdfError::Save(e.to_string()))?;
    Ok(())
}
