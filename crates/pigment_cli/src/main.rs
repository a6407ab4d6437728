//! Pigment CLI - render SVG path data and text to raster files
//!
//! ```text
//! pigment path "M 10 10 L 100 40 L 40 100 Z" -o shape.png --fill "#ff8800"
//! pigment text font.ttf "Hello" -o hello.png --size 48
//! pigment convert photo.jpg thumb.png --resize 64x64
//! ```

mod config;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use pigment::{
    parse_path, read_font, read_image, Color, Context, HorizontalAlignment, Image, Mat3, Paint,
    TextTarget, TypesetOptions, Vec2, WindingRule,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{parse_color, PigmentConfig};

/// Render path data and text with the Pigment engine
#[derive(Parser, Debug)]
#[command(name = "pigment")]
#[command(about = "Render SVG path data and text to PNG, BMP, JPEG or GIF")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./pigment.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill and/or stroke SVG path data
    Path {
        /// Path data, e.g. "M 0 0 L 10 10 Z"
        data: String,

        #[arg(short, long)]
        output: PathBuf,

        /// Fill color
        #[arg(long)]
        fill: Option<String>,

        /// Stroke color
        #[arg(long)]
        stroke: Option<String>,

        /// Overrides [stroke] width
        #[arg(long)]
        stroke_width: Option<f32>,

        #[arg(long)]
        even_odd: bool,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,
    },

    /// Typeset text in a TTF/OTF/SVG font
    Text {
        font: PathBuf,

        text: String,

        #[arg(short, long)]
        output: PathBuf,

        /// Font size in pixels
        #[arg(long, default_value = "24")]
        size: f32,

        /// Wrap width; the image is sized to the text when omitted
        #[arg(long)]
        width: Option<f32>,

        #[arg(long, default_value = "#000000")]
        color: String,

        /// left, center or right
        #[arg(long, default_value = "left")]
        align: String,
    },

    /// Re-encode an image, optionally resized and blurred
    Convert {
        input: PathBuf,

        output: PathBuf,

        /// New size as WIDTHxHEIGHT
        #[arg(long)]
        resize: Option<String>,

        /// Blur radius in pixels
        #[arg(long)]
        blur: Option<f32>,
    },
}

fn parse_size(text: &str) -> Result<(u32, u32)> {
    let (w, h) = text
        .split_once('x')
        .with_context(|| format!("Invalid size {:?}, expected WIDTHxHEIGHT", text))?;
    Ok((
        w.trim().parse().with_context(|| format!("Invalid width in {:?}", text))?,
        h.trim().parse().with_context(|| format!("Invalid height in {:?}", text))?,
    ))
}

fn parse_align(text: &str) -> Result<HorizontalAlignment> {
    Ok(match text {
        "left" => HorizontalAlignment::Left,
        "center" => HorizontalAlignment::Center,
        "right" => HorizontalAlignment::Right,
        other => anyhow::bail!("Unknown alignment {:?}, expected left, center or right", other),
    })
}

fn background(config: &PigmentConfig, width: u32, height: u32) -> Result<Image> {
    let mut image = Image::new(width, height);
    image.fill(parse_color(&config.canvas.background)?);
    Ok(image)
}

#[allow(clippy::too_many_arguments)]
fn render_path(
    config: &PigmentConfig,
    data: &str,
    output: &Path,
    fill: Option<String>,
    stroke: Option<String>,
    stroke_width: Option<f32>,
    even_odd: bool,
    size: (Option<u32>, Option<u32>),
) -> Result<()> {
    let path = parse_path(data).context("Failed to parse path data")?;
    let width = size.0.unwrap_or(config.canvas.width);
    let height = size.1.unwrap_or(config.canvas.height);

    let mut ctx = Context::new(background(config, width, height)?);
    let rule = if even_odd {
        WindingRule::EvenOdd
    } else {
        WindingRule::NonZero
    };

    // Fill black when nothing was asked for
    let fill = match (&fill, &stroke) {
        (None, None) => Some("#000000".to_string()),
        _ => fill,
    };
    if let Some(fill) = fill {
        ctx.set_fill_style(Paint::solid(parse_color(&fill)?));
        ctx.path_fill(&path, rule)?;
    }
    if let Some(stroke) = stroke {
        let mut options = config.stroke.to_options()?;
        if let Some(w) = stroke_width {
            options.width = w;
        }
        ctx.set_stroke_style(Paint::solid(parse_color(&stroke)?));
        ctx.set_line_width(options.width)?;
        ctx.set_line_cap(options.cap);
        ctx.set_line_join(options.join);
        ctx.set_miter_limit(options.miter_limit)?;
        ctx.path_stroke(&path)?;
    }

    let image = ctx.into_image();
    image
        .write_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(output = %output.display(), width, height, "rendered path");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn render_text(
    config: &PigmentConfig,
    font: &Path,
    text: &str,
    output: &Path,
    size: f32,
    wrap_width: Option<f32>,
    color: &str,
    align: &str,
) -> Result<()> {
    let mut font = read_font(font).with_context(|| format!("Failed to load font {}", font.display()))?;
    font.size = size;
    font.set_paint(Paint::solid(parse_color(color)?));

    let options = TypesetOptions {
        bounds: Vec2::new(wrap_width.unwrap_or(0.0), 0.0),
        h_align: parse_align(align)?,
        ..Default::default()
    };
    let arrangement = font.typeset(text, &options);
    let layout = arrangement.layout_size();
    let width = wrap_width.unwrap_or(layout.x).ceil().max(1.0) as u32;
    let height = layout.y.ceil().max(1.0) as u32;

    let mut image = background(config, width, height)?;
    image.fill_arrangement(&arrangement, &Mat3::IDENTITY)?;
    image
        .write_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(output = %output.display(), width, height, lines = arrangement.lines.len(), "rendered text");
    Ok(())
}

fn convert(input: &Path, output: &Path, resize: Option<String>, blur: Option<f32>) -> Result<()> {
    let mut image = read_image(input).with_context(|| format!("Failed to read {}", input.display()))?;
    if let Some(size) = resize {
        let (w, h) = parse_size(&size)?;
        image = image.resize(w, h)?;
    }
    if let Some(radius) = blur {
        image.blur(radius, Color::TRANSPARENT)?;
    }
    image
        .write_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(input = %input.display(), output = %output.display(), "converted image");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = PigmentConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Path {
            data,
            output,
            fill,
            stroke,
            stroke_width,
            even_odd,
            width,
            height,
        } => render_path(&config, &data, &output, fill, stroke, stroke_width, even_odd, (width, height)),
        Command::Text {
            font,
            text,
            output,
            size,
            width,
            color,
            align,
        } => render_text(&config, &font, &text, &output, size, width, &color, &align),
        Command::Convert {
            input,
            output,
            resize,
            blur,
        } => convert(&input, &output, resize, blur),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("64x32").unwrap(), (64, 32));
        assert!(parse_size("64").is_err());
        assert!(parse_size("ax2").is_err());
    }

    #[test]
    fn test_render_path_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tri.png");
        let config = PigmentConfig::default();
        render_path(
            &config,
            "M 0 0 L 16 0 L 0 16 Z",
            &output,
            Some("#ff0000".to_string()),
            Some("#0000ff".to_string()),
            Some(2.0),
            false,
            (Some(16), Some(16)),
        )
        .unwrap();
        let image = read_image(&output).unwrap();
        assert_eq!(image.wh(), (16, 16));
        assert_eq!(image.get_pixel(4, 4).r, 255);
    }

    #[test]
    fn test_bad_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_path(
            &PigmentConfig::default(),
            "L 1 2",
            &dir.path().join("x.png"),
            None,
            None,
            None,
            false,
            (Some(4), Some(4)),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("path data"));
    }
}
