use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{DynamicImage, ImageFormat};
use log::info;

const OPEN_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];
const SAVE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Native open dialog. `None` when the user cancels.
pub fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Image", OPEN_EXTENSIONS)
        .pick_file()
}

/// Native save dialog. `None` when the user cancels.
pub fn pick_save_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Image", SAVE_EXTENSIONS)
        .save_file()
}

pub fn load_image(path: &Path) -> anyhow::Result<DynamicImage> {
    let image = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    info!("decoded {}", path.display());
    Ok(image)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
    Bmp,
}

impl SaveFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
        }
    }
}

/// Destination path and encoding for a requested save path. Unrecognized
/// extensions fall back to PNG with a `.png` suffix appended.
fn save_target(path: &Path) -> (PathBuf, SaveFormat) {
    match SaveFormat::from_path(path) {
        Some(format) => (path.to_owned(), format),
        None => {
            let mut name = path.as_os_str().to_owned();
            name.push(".png");
            (PathBuf::from(name), SaveFormat::Png)
        }
    }
}

/// Encode `image` at `path`, returning the path actually written (it differs
/// from `path` when the extension fell back to PNG).
pub fn save_image(image: &DynamicImage, path: &Path) -> anyhow::Result<PathBuf> {
    let (target, format) = save_target(path);
    image
        .save_with_format(&target, format.image_format())
        .with_context(|| format!("failed to save {}", target.display()))?;
    info!("saved {}", target.display());
    Ok(target)
}
