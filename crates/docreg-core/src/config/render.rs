//! PDF rendering configuration.

use serde::{Deserialize, Serialize};

/// Settings for the genpdf-based renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Directory holding the TTF font files.
    #[serde(default = "default_font_dir")]
    pub font_dir: String,
    /// Font family name (files are `<family>-Regular.ttf`, `-Bold`, ...).
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Base font size in points.
    #[serde(default = "default_font_size")]
    pub font_size: u8,
    /// Page margins in millimetres.
    #[serde(default = "default_margins")]
    pub margins_mm: u8,
    /// Title embedded in generated PDFs.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_dir: default_font_dir(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            margins_mm: default_margins(),
            title: default_title(),
        }
    }
}

fn default_font_dir() -> String {
    "./fonts".to_string()
}

fn default_font_family() -> String {
    "LiberationSans".to_string()
}

fn default_font_size() -> u8 {
    11
}

fn default_margins() -> u8 {
    20
}

fn default_title() -> String {
    "DocReg document".to_string()
}
