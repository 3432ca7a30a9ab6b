use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rusttype::Font;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse font {path}")]
    Parse { path: PathBuf },
}

static FONT_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<Font<'static>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

pub fn load_font_cached(path: &Path) -> Result<Arc<Font<'static>>, FontError> {
    if let Some(f) = FONT_CACHE.lock().get(path) {
        return Ok(Arc::clone(f));
    }

    let bytes = std::fs::read(path).map_err(|source| FontError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let font = Font::try_from_vec(bytes).ok_or_else(|| FontError::Parse {
        path: path.to_path_buf(),
    })?;

    let font = Arc::new(font);
    FONT_CACHE
        .lock()
        .insert(path.to_path_buf(), Arc::clone(&font));
    Ok(font)
}
