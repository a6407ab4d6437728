//! Glyph outline sources
//!
//! A [`Typeface`] is immutable once loaded and is shared between fonts
//! through an `Arc`. OpenType data is kept as bytes; [`Typeface::glyphs`]
//! parses it into a borrowed [`Glyphs`] view that answers any number of
//! queries, since `ttf_parser::Face` borrows the buffer it reads.

use std::path::{Path as FsPath, PathBuf};

use pigment_core::{PigmentError, Result};
use pigment_paint::{parse_path, Path};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use ttf_parser::gpos::{PairAdjustment, PositioningSubtable};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Horizontal line metrics in font units, y up from the baseline
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineMetrics {
    pub position: f32,
    pub thickness: f32,
}

#[derive(Clone, Debug)]
struct SvgGlyph {
    advance: f32,
    path: Path,
}

#[derive(Clone, Debug)]
enum Outlines {
    OpenType { data: Vec<u8>, index: u32 },
    Svg {
        glyphs: FxHashMap<char, SvgGlyph>,
        missing: SvgGlyph,
        kerning: FxHashMap<(char, char), f32>,
    },
}

/// Glyph outlines and metrics, all in font units
#[derive(Clone, Debug)]
pub struct Typeface {
    file_path: Option<PathBuf>,
    outlines: Outlines,
    units_per_em: f32,
    ascent: f32,
    descent: f32,
    line_gap: f32,
    underline: LineMetrics,
    strikeout: LineMetrics,
}

/// Collects ttf-parser outlines into a [`Path`], still in font units
struct GlyphPathBuilder {
    path: Path,
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.path.quadratic_curve_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.path.bezier_curve_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

fn face_error(err: ttf_parser::FaceParsingError) -> PigmentError {
    PigmentError::decode("typeface", err.to_string())
}

impl Typeface {
    /// Parse an OpenType/TrueType font, or face `index` of a collection
    pub fn parse_otf(data: Vec<u8>, index: u32) -> Result<Typeface> {
        let face = Face::parse(&data, index).map_err(face_error)?;
        let units_per_em = face.units_per_em() as f32;
        let ascent = face.ascender() as f32;
        let descent = face.descender() as f32;
        let line_gap = face.line_gap() as f32;

        let underline = face
            .underline_metrics()
            .map(|m| LineMetrics {
                position: m.position as f32,
                thickness: m.thickness as f32,
            })
            .unwrap_or(LineMetrics {
                position: -units_per_em * 0.1,
                thickness: units_per_em * 0.05,
            });
        let strikeout = face
            .strikeout_metrics()
            .map(|m| LineMetrics {
                position: m.position as f32,
                thickness: m.thickness as f32,
            })
            .unwrap_or(LineMetrics {
                position: ascent * 0.3,
                thickness: underline.thickness,
            });
        debug!(
            units_per_em,
            ascent,
            descent,
            glyphs = face.number_of_glyphs(),
            "parsed OpenType face"
        );

        Ok(Typeface {
            file_path: None,
            outlines: Outlines::OpenType { data, index },
            units_per_em,
            ascent,
            descent,
            line_gap,
            underline,
            strikeout,
        })
    }

    /// Parse an SVG font document (`<font>`, `<font-face>`, `<glyph>`,
    /// `<missing-glyph>` and `<hkern>` elements)
    pub fn parse_svg_font(text: &str) -> Result<Typeface> {
        let doc = roxmltree::Document::parse(text)
            .map_err(|e| PigmentError::decode("SVG font", e.to_string()))?;

        let number = |node: roxmltree::Node, name: &str| -> Option<f32> {
            node.attribute(name).and_then(|v| v.trim().parse::<f32>().ok())
        };

        let font = doc
            .descendants()
            .find(|n| n.has_tag_name("font"))
            .ok_or_else(|| PigmentError::decode("SVG font", "no <font> element"))?;
        let default_advance = number(font, "horiz-adv-x").unwrap_or(0.0);

        let face = font.children().find(|n| n.has_tag_name("font-face"));
        let face_number = |name: &str| face.and_then(|f| number(f, name));
        let units_per_em = face_number("units-per-em").unwrap_or(1000.0);
        let ascent = face_number("ascent").unwrap_or(units_per_em * 0.8);
        let descent = face_number("descent").unwrap_or(-units_per_em * 0.2);
        let underline = LineMetrics {
            position: face_number("underline-position").unwrap_or(-units_per_em * 0.1),
            thickness: face_number("underline-thickness").unwrap_or(units_per_em * 0.05),
        };
        let strikeout = LineMetrics {
            position: face_number("strikethrough-position").unwrap_or(ascent * 0.3),
            thickness: face_number("strikethrough-thickness").unwrap_or(underline.thickness),
        };

        let glyph_of = |node: roxmltree::Node| -> Result<SvgGlyph> {
            let path = match node.attribute("d") {
                Some(d) => parse_path(d)?,
                None => Path::new(),
            };
            Ok(SvgGlyph {
                advance: number(node, "horiz-adv-x").unwrap_or(default_advance),
                path,
            })
        };

        let mut glyphs = FxHashMap::default();
        let mut missing = SvgGlyph {
            advance: default_advance,
            path: Path::new(),
        };
        let mut kerning = FxHashMap::default();

        for node in font.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "glyph" => {
                    let Some(unicode) = node.attribute("unicode") else {
                        continue;
                    };
                    let mut chars = unicode.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => {
                            glyphs.insert(c, glyph_of(node)?);
                        }
                        // Ligature glyphs are not addressable by a single codepoint
                        _ => debug!(unicode, "skipping multi-codepoint SVG glyph"),
                    }
                }
                "missing-glyph" => missing = glyph_of(node)?,
                "hkern" => {
                    let (Some(u1), Some(u2), Some(k)) =
                        (node.attribute("u1"), node.attribute("u2"), number(node, "k"))
                    else {
                        warn!("ignoring <hkern> without u1, u2 and k");
                        continue;
                    };
                    for left in kern_chars(u1) {
                        for right in kern_chars(u2) {
                            // SVG kerning narrows the gap
                            kerning.insert((left, right), -k);
                        }
                    }
                }
                _ => {}
            }
        }
        debug!(glyphs = glyphs.len(), kern_pairs = kerning.len(), "parsed SVG font");

        Ok(Typeface {
            file_path: None,
            outlines: Outlines::Svg {
                glyphs,
                missing,
                kerning,
            },
            units_per_em,
            ascent,
            descent,
            line_gap: 0.0,
            underline,
            strikeout,
        })
    }

    /// Where the typeface was loaded from, if it came from a file
    pub fn file_path(&self) -> Option<&FsPath> {
        self.file_path.as_deref()
    }

    pub fn units_per_em(&self) -> f32 {
        self.units_per_em
    }

    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    /// Negative below the baseline
    pub fn descent(&self) -> f32 {
        self.descent
    }

    pub fn line_gap(&self) -> f32 {
        self.line_gap
    }

    /// `ascent - descent + line_gap`
    pub fn line_height(&self) -> f32 {
        self.ascent - self.descent + self.line_gap
    }

    pub fn underline_position(&self) -> f32 {
        self.underline.position
    }

    pub fn underline_thickness(&self) -> f32 {
        self.underline.thickness
    }

    pub fn strikeout_position(&self) -> f32 {
        self.strikeout.position
    }

    pub fn strikeout_thickness(&self) -> f32 {
        self.strikeout.thickness
    }

    /// Parse once for a batch of glyph queries
    pub fn glyphs(&self) -> Glyphs<'_> {
        let source = match &self.outlines {
            Outlines::OpenType { data, index } => match Face::parse(data, *index) {
                Ok(face) => GlyphSource::OpenType(face),
                Err(err) => {
                    warn!(%err, "typeface data failed to re-parse");
                    GlyphSource::Unreadable
                }
            },
            Outlines::Svg {
                glyphs,
                missing,
                kerning,
            } => GlyphSource::Svg {
                glyphs,
                missing,
                kerning,
            },
        };
        Glyphs { source }
    }

    pub fn has_glyph(&self, c: char) -> bool {
        self.glyphs().has_glyph(c)
    }

    /// Glyph outline in font units, y up; the missing glyph for unmapped codepoints
    pub fn glyph_path(&self, c: char) -> Path {
        self.glyphs().glyph_path(c)
    }

    /// Horizontal advance in font units
    pub fn advance(&self, c: char) -> f32 {
        self.glyphs().advance(c)
    }

    /// Extra space between `left` and `right`, in font units (negative tightens)
    pub fn kerning_adjustment(&self, left: char, right: char) -> f32 {
        self.glyphs().kerning_adjustment(left, right)
    }
}

enum GlyphSource<'a> {
    OpenType(Face<'a>),
    Svg {
        glyphs: &'a FxHashMap<char, SvgGlyph>,
        missing: &'a SvgGlyph,
        kerning: &'a FxHashMap<(char, char), f32>,
    },
    Unreadable,
}

/// Glyph lookups against one parsed typeface
///
/// Obtained from [`Typeface::glyphs`]. Layout holds one of these per span
/// instead of re-parsing the font for every rune.
pub struct Glyphs<'a> {
    source: GlyphSource<'a>,
}

impl Glyphs<'_> {
    pub fn has_glyph(&self, c: char) -> bool {
        match &self.source {
            GlyphSource::OpenType(face) => face.glyph_index(c).is_some(),
            GlyphSource::Svg { glyphs, .. } => glyphs.contains_key(&c),
            GlyphSource::Unreadable => false,
        }
    }

    /// See [`Typeface::glyph_path`]
    pub fn glyph_path(&self, c: char) -> Path {
        match &self.source {
            GlyphSource::OpenType(face) => {
                let id = face.glyph_index(c).unwrap_or(GlyphId(0));
                let mut builder = GlyphPathBuilder { path: Path::new() };
                face.outline_glyph(id, &mut builder);
                builder.path
            }
            GlyphSource::Svg { glyphs, missing, .. } => glyphs
                .get(&c)
                .map(|g| g.path.clone())
                .unwrap_or_else(|| missing.path.clone()),
            GlyphSource::Unreadable => Path::new(),
        }
    }

    pub fn advance(&self, c: char) -> f32 {
        match &self.source {
            GlyphSource::OpenType(face) => {
                let id = face.glyph_index(c).unwrap_or(GlyphId(0));
                face.glyph_hor_advance(id).unwrap_or(0) as f32
            }
            GlyphSource::Svg { glyphs, missing, .. } => {
                glyphs.get(&c).map(|g| g.advance).unwrap_or(missing.advance)
            }
            GlyphSource::Unreadable => 0.0,
        }
    }

    /// GPOS pair adjustments first, then the legacy `kern` table
    pub fn kerning_adjustment(&self, left: char, right: char) -> f32 {
        match &self.source {
            GlyphSource::OpenType(face) => {
                let (Some(l), Some(r)) = (face.glyph_index(left), face.glyph_index(right)) else {
                    return 0.0;
                };
                gpos_kerning(face, l, r)
                    .or_else(|| kern_table_kerning(face, l, r))
                    .unwrap_or(0.0)
            }
            GlyphSource::Svg { kerning, .. } => kerning.get(&(left, right)).copied().unwrap_or(0.0),
            GlyphSource::Unreadable => 0.0,
        }
    }
}

/// X advance change for the first glyph of a pair, from GPOS lookup type 2
fn gpos_kerning(face: &Face<'_>, left: GlyphId, right: GlyphId) -> Option<f32> {
    let gpos = face.tables().gpos.as_ref()?;
    (0..gpos.lookups.len())
        .filter_map(|i| gpos.lookups.get(i))
        .find_map(|lookup| {
            (0..lookup.subtables.len())
                .filter_map(|i| lookup.subtables.get::<PositioningSubtable>(i))
                .find_map(|subtable| match subtable {
                    PositioningSubtable::Pair(pair) => pair_advance(&pair, left, right),
                    _ => None,
                })
        })
}

fn pair_advance(pair: &PairAdjustment<'_>, left: GlyphId, right: GlyphId) -> Option<f32> {
    let index = pair.coverage().get(left)?;
    let (first, _) = match pair {
        PairAdjustment::Format1 { sets, .. } => sets.get(index)?.get(right)?,
        PairAdjustment::Format2 { classes, matrix, .. } => {
            matrix.get((classes.0.get(left), classes.1.get(right)))?
        }
    };
    Some(first.x_advance as f32)
}

fn kern_table_kerning(face: &Face<'_>, left: GlyphId, right: GlyphId) -> Option<f32> {
    let kern = face.tables().kern?;
    kern.subtables
        .into_iter()
        .filter(|s| s.horizontal && !s.variable)
        .find_map(|s| s.glyphs_kerning(left, right))
        .map(|v| v as f32)
}

/// Characters named by an `<hkern>` `u1`/`u2` list
fn kern_chars(list: &str) -> Vec<char> {
    list.split(',')
        .map(str::trim)
        .filter_map(|item| {
            let mut chars = item.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        })
        .collect()
}

/// Load a typeface, picking the parser from the file extension
///
/// `.ttf`, `.otf` and `.ttc` (first face) go through ttf-parser; `.svg`
/// is read as an SVG font.
pub fn read_typeface(path: impl AsRef<FsPath>) -> Result<Typeface> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    debug!(path = %path.display(), "loading typeface");

    let mut typeface = match ext.as_str() {
        "ttf" | "otf" | "ttc" => {
            let data = std::fs::read(path).map_err(|e| PigmentError::io("read", path, e))?;
            Typeface::parse_otf(data, 0)?
        }
        "svg" => {
            let text = std::fs::read_to_string(path).map_err(|e| PigmentError::io("read", path, e))?;
            Typeface::parse_svg_font(&text)?
        }
        _ => {
            return Err(PigmentError::UnsupportedFormat(format!(
                "unknown typeface extension {:?} for {:?}",
                ext, path
            )))
        }
    };
    typeface.file_path = Some(path.to_path_buf());
    Ok(typeface)
}
