//! Render configuration file handling (pigment.toml)

use anyhow::{Context, Result};
use pigment::{Color, LineCap, LineJoin, StrokeOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration; every section is optional
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PigmentConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub stroke: StrokeConfig,
}

/// Output image settings
#[derive(Debug, Deserialize, Serialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// `#rrggbb` or `#rrggbbaa`
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_width() -> u32 {
    256
}

fn default_height() -> u32 {
    256
}

fn default_background() -> String {
    "#00000000".to_string()
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background: default_background(),
        }
    }
}

/// Line settings for `--stroke`
#[derive(Debug, Deserialize, Serialize)]
pub struct StrokeConfig {
    #[serde(default = "default_stroke_width")]
    pub width: f32,
    /// butt, round or square
    #[serde(default = "default_cap")]
    pub cap: String,
    /// miter, round or bevel
    #[serde(default = "default_join")]
    pub join: String,
    #[serde(default = "default_miter_limit")]
    pub miter_limit: f32,
}

fn default_stroke_width() -> f32 {
    1.0
}

fn default_cap() -> String {
    "butt".to_string()
}

fn default_join() -> String {
    "miter".to_string()
}

fn default_miter_limit() -> f32 {
    pigment::DEFAULT_MITER_LIMIT
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            width: default_stroke_width(),
            cap: default_cap(),
            join: default_join(),
            miter_limit: default_miter_limit(),
        }
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`
pub fn parse_color(text: &str) -> Result<Color> {
    Color::parse_hex(text).with_context(|| format!("Invalid color {:?}, expected #rrggbb[aa]", text))
}

impl StrokeConfig {
    pub fn to_options(&self) -> Result<StrokeOptions> {
        let cap = match self.cap.as_str() {
            "butt" => LineCap::Butt,
            "round" => LineCap::Round,
            "square" => LineCap::Square,
            other => anyhow::bail!("Unknown line cap {:?}, expected butt, round or square", other),
        };
        let join = match self.join.as_str() {
            "miter" => LineJoin::Miter,
            "round" => LineJoin::Round,
            "bevel" => LineJoin::Bevel,
            other => anyhow::bail!("Unknown line join {:?}, expected miter, round or bevel", other),
        };
        Ok(StrokeOptions {
            width: self.width,
            cap,
            join,
            miter_limit: self.miter_limit,
            dashes: Vec::new(),
        })
    }
}

impl PigmentConfig {
    /// Load `path`, or `pigment.toml` in the working directory if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = Path::new("pigment.toml");
                if !default.exists() {
                    return Ok(Self::default());
                }
                default.to_path_buf()
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: PigmentConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }
}
