use rusttype::Font;
use std::path::Path;
use tracing::{debug, info};

use crate::error::StartupError;

const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn font_from_file(path: &Path) -> Result<Font<'static>, StartupError> {
    let data = std::fs::read(path)
        .map_err(|e| StartupError::file_io(path.display().to_string(), e))?;
    Font::try_from_vec(data).ok_or_else(|| StartupError::Font {
        message: format!("{} is not a TrueType/OpenType font", path.display()),
    })
}

/// Proportional font bundled with egui
#[cfg(feature = "gui")]
fn toolkit_font() -> Option<Font<'static>> {
    use eframe::egui::{FontDefinitions, FontFamily};

    let definitions = FontDefinitions::default();
    let name = definitions.families.get(&FontFamily::Proportional)?.first()?;
    let data = definitions.font_data.get(name)?;
    Font::try_from_vec(data.font.to_vec())
}

#[cfg(not(feature = "gui"))]
fn toolkit_font() -> Option<Font<'static>> {
    None
}

/// Loads the font used for chart labels and the word cloud.
///
/// An explicitly configured font must load. Otherwise common system fonts
/// are tried, then the GUI toolkit's bundled font.
pub fn load_font(configured: Option<&Path>) -> Result<Font<'static>, StartupError> {
    if let Some(path) = configured {
        let font = font_from_file(path)?;
        info!(font = %path.display(), "Loaded configured font");
        return Ok(font);
    }

    for candidate in SYSTEM_FONT_CANDIDATES {
        let path = Path::new(candidate);
        if !path.exists() {
            continue;
        }
        match font_from_file(path) {
            Ok(font) => {
                info!(font = %candidate, "Loaded system font");
                return Ok(font);
            }
            Err(e) => debug!(font = %candidate, error = %e, "Skipping unusable font"),
        }
    }

    toolkit_font()
        .map(|font| {
            info!("Using bundled toolkit font");
            font
        })
        .ok_or_else(|| StartupError::Font {
            message: "no system font found; set resources.font_path".to_string(),
        })
}
