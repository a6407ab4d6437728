//! Multi-span text layout
//!
//! Turns styled spans into positioned glyphs:
//!
//! 1. Case transform per span
//! 2. Per-rune advances with pair kerning inside a span
//! 3. Word wrapping against the bounds width, breaking after whitespace
//! 4. Line stacking with each line as tall as its tallest font
//! 5. Horizontal and vertical alignment against the bounds

use std::ops::Range;

use pigment_core::{HorizontalAlignment, Mat3, Rect, TextCase, Vec2, VerticalAlignment};
use pigment_paint::Path;
use tracing::trace;

use crate::font::Font;
use crate::typeface::Glyphs;

/// A run of text in one font
#[derive(Clone, Debug)]
pub struct Span {
    pub text: String,
    pub font: Font,
}

impl Span {
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }
}

/// Layout box and alignment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypesetOptions {
    /// Layout box size; a zero width disables wrapping and aligns around
    /// x = 0, a zero height disables vertical alignment
    pub bounds: Vec2,
    pub h_align: HorizontalAlignment,
    pub v_align: VerticalAlignment,
    pub wrap: bool,
}

impl Default for TypesetOptions {
    fn default() -> Self {
        Self {
            bounds: Vec2::ZERO,
            h_align: HorizontalAlignment::Left,
            v_align: VerticalAlignment::Top,
            wrap: true,
        }
    }
}

/// Positioned glyphs produced by [`typeset`]
///
/// `runes`, `positions` and `selection_rects` are parallel. Positions are
/// glyph origins on the baseline in layout space, y down.
#[derive(Clone, Debug)]
pub struct Arrangement {
    /// Rune ranges per line, contiguous and covering every rune
    pub lines: Vec<Range<usize>>,
    /// Rune ranges per input span
    pub spans: Vec<Range<usize>>,
    /// Font of each span
    pub fonts: Vec<Font>,
    pub runes: Vec<char>,
    pub positions: Vec<Vec2>,
    /// Hit box of each rune: its advance by its line's height
    pub selection_rects: Vec<Rect>,
    size: Vec2,
}

struct Line {
    range: Range<usize>,
    /// Started by a soft wrap, so leading whitespace takes no room
    wrapped: bool,
}

fn apply_case(text: &str, case: TextCase, after_space: &mut bool) -> Vec<char> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match case {
            TextCase::Normal => out.push(c),
            TextCase::Upper => out.extend(c.to_uppercase()),
            TextCase::Lower => out.extend(c.to_lowercase()),
            TextCase::Title => {
                if *after_space {
                    out.extend(c.to_uppercase());
                } else {
                    out.push(c);
                }
            }
        }
        *after_space = c.is_whitespace();
    }
    out
}

/// Split runes into lines, breaking after the last whitespace that fits
///
/// A rune wider than the whole line still gets a line of its own, and
/// trailing whitespace may hang past the edge.
fn break_lines(runes: &[char], advances: &[f32], max_width: Option<f32>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut wrapped = false;
    let mut line_width = 0.0f32;
    let mut has_content = false;
    let mut last_word_end: Option<usize> = None;

    let mut i = 0;
    while i < runes.len() {
        let c = runes[i];

        // Explicit newline always ends the line it is on
        if c == '\n' {
            lines.push(Line {
                range: start..i + 1,
                wrapped,
            });
            start = i + 1;
            wrapped = false;
            line_width = 0.0;
            has_content = false;
            last_word_end = None;
            i += 1;
            continue;
        }

        if wrapped && !has_content && c.is_whitespace() {
            i += 1;
            continue;
        }

        let advance = advances[i];
        if let Some(max_width) = max_width {
            if has_content && !c.is_whitespace() && line_width + advance > max_width {
                let brk = match last_word_end {
                    Some(end) if end > start => end,
                    // No word boundary on this line, break mid-word
                    _ => i,
                };
                lines.push(Line {
                    range: start..brk,
                    wrapped,
                });
                start = brk;
                wrapped = true;
                line_width = 0.0;
                has_content = false;
                last_word_end = None;
                i = brk;
                continue;
            }
        }

        line_width += advance;
        has_content = true;
        if c.is_whitespace() {
            last_word_end = Some(i + 1);
        }
        i += 1;
    }

    if start < runes.len() || runes.last() == Some(&'\n') {
        lines.push(Line {
            range: start..runes.len(),
            wrapped,
        });
    }
    lines
}

/// Lay out `spans` against `options`
pub fn typeset(spans: &[Span], options: &TypesetOptions) -> Arrangement {
    let mut runes = Vec::new();
    let mut span_ranges = Vec::with_capacity(spans.len());
    let mut rune_span = Vec::new();
    let mut after_space = true;
    for (index, span) in spans.iter().enumerate() {
        let start = runes.len();
        runes.extend(apply_case(&span.text, span.font.text_case, &mut after_space));
        span_ranges.push(start..runes.len());
        rune_span.resize(runes.len(), index);
    }

    let mut advances = vec![0.0f32; runes.len()];
    for (span, range) in spans.iter().zip(&span_ranges) {
        let font = &span.font;
        let glyphs = font.typeface().glyphs();
        for i in range.clone() {
            let c = runes[i];
            if c == '\n' {
                continue;
            }
            let mut advance = glyphs.advance(c);
            if !font.no_kerning_adjustments && i + 1 < range.end {
                let next = runes[i + 1];
                if next != '\n' {
                    advance += glyphs.kerning_adjustment(c, next);
                }
            }
            advances[i] = advance * font.scale();
        }
    }

    let max_width = (options.wrap && options.bounds.x > 0.0).then_some(options.bounds.x);
    let lines = break_lines(&runes, &advances, max_width);

    let mut positions = vec![Vec2::ZERO; runes.len()];
    let mut selection_rects = vec![Rect::default(); runes.len()];
    let mut line_widths = Vec::with_capacity(lines.len());
    let mut line_top = 0.0f32;

    for line in &lines {
        // An empty line after a trailing newline takes the previous rune's font
        let fonts: Vec<&Font> = if line.range.is_empty() {
            line.range
                .start
                .checked_sub(1)
                .map(|i| vec![&spans[rune_span[i]].font])
                .unwrap_or_default()
        } else {
            line.range.clone().map(|i| &spans[rune_span[i]].font).collect()
        };
        let line_height = fonts
            .iter()
            .map(|f| f.resolved_line_height())
            .fold(0.0f32, f32::max);
        let baseline = line_top
            + fonts
                .iter()
                .map(|f| {
                    let s = f.scale();
                    let tf = f.typeface();
                    let glyph_height = (tf.ascent() - tf.descent()) * s;
                    (f.resolved_line_height() - glyph_height) / 2.0 + tf.ascent() * s
                })
                .fold(0.0f32, f32::max);

        let mut x = 0.0f32;
        let mut width = 0.0f32;
        let mut leading = line.wrapped;
        for i in line.range.clone() {
            let c = runes[i];
            let skip = c == '\n' || (leading && c.is_whitespace());
            if !c.is_whitespace() {
                leading = false;
            }
            let advance = if skip { 0.0 } else { advances[i] };
            positions[i] = Vec2::new(x, baseline);
            selection_rects[i] = Rect::new(x, line_top, advance, line_height);
            x += advance;
            if !c.is_whitespace() {
                width = x;
            }
        }
        line_widths.push(width);
        line_top += line_height;
    }

    let total_height = line_top;
    let y_offset = if options.bounds.y > 0.0 {
        match options.v_align {
            VerticalAlignment::Top => 0.0,
            VerticalAlignment::Middle => (options.bounds.y - total_height) / 2.0,
            VerticalAlignment::Bottom => options.bounds.y - total_height,
        }
    } else {
        0.0
    };

    for (line, width) in lines.iter().zip(&line_widths) {
        let x_offset = match options.h_align {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => (options.bounds.x - width) / 2.0,
            HorizontalAlignment::Right => options.bounds.x - width,
        };
        for i in line.range.clone() {
            positions[i] += Vec2::new(x_offset, y_offset);
            selection_rects[i].x += x_offset;
            selection_rects[i].y += y_offset;
        }
    }

    trace!(
        runes = runes.len(),
        lines = lines.len(),
        height = total_height,
        "typeset"
    );

    Arrangement {
        lines: lines.into_iter().map(|l| l.range).collect(),
        spans: span_ranges,
        fonts: spans.iter().map(|s| s.font.clone()).collect(),
        runes,
        positions,
        selection_rects,
        size: Vec2::new(line_widths.iter().copied().fold(0.0, f32::max), total_height),
    }
}

impl Arrangement {
    /// Widest line by total line height, before alignment
    pub fn layout_size(&self) -> Vec2 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.runes.is_empty()
    }

    /// Index of the span rune `index` came from
    pub fn span_of(&self, index: usize) -> Option<usize> {
        self.spans.iter().position(|r| r.contains(&index))
    }

    /// Font units to layout space for rune `index`
    pub fn glyph_transform(&self, index: usize) -> Option<Mat3> {
        let font = &self.fonts[self.span_of(index)?];
        let s = font.scale();
        let p = self.positions[index];
        Some(Mat3::translate(p.x, p.y) * Mat3::scale(s, -s))
    }

    /// Outline of rune `index` in layout space
    pub fn glyph_path(&self, index: usize) -> Path {
        match self.span_of(index) {
            Some(span) => self.positioned_glyph(&self.fonts[span].typeface().glyphs(), index),
            None => Path::new(),
        }
    }

    fn positioned_glyph(&self, glyphs: &Glyphs<'_>, index: usize) -> Path {
        let c = self.runes[index];
        let Some(transform) = self.glyph_transform(index) else {
            return Path::new();
        };
        if c.is_whitespace() {
            return Path::new();
        }
        let mut path = glyphs.glyph_path(c);
        path.transform(&transform);
        path
    }

    /// All glyph outlines of each span, one path per span
    pub fn span_paths(&self) -> Vec<Path> {
        self.spans
            .iter()
            .zip(&self.fonts)
            .map(|(range, font)| {
                let glyphs = font.typeface().glyphs();
                let mut path = Path::new();
                for i in range.clone() {
                    path.add_path(&self.positioned_glyph(&glyphs, i));
                }
                path
            })
            .collect()
    }

    /// Underline and strikethrough rectangles of each span, one path per span
    pub fn decoration_paths(&self) -> Vec<Path> {
        (0..self.spans.len())
            .map(|span| self.decoration_path(span, true))
            .collect()
    }

    fn decoration_path(&self, span: usize, clockwise: bool) -> Path {
        let mut path = Path::new();
        let (range, font) = (&self.spans[span], &self.fonts[span]);
        if !font.underline && !font.strikethrough {
            return path;
        }
        let s = font.scale();
        let tf = font.typeface();
        for line in &self.lines {
            let visible: Vec<usize> = (range.start.max(line.start)..range.end.min(line.end))
                .filter(|&i| self.runes[i] != '\n' && self.selection_rects[i].w > 0.0)
                .collect();
            let (Some(&first), Some(&last)) = (visible.first(), visible.last()) else {
                continue;
            };
            let x0 = self.positions[first].x;
            let x1 = self.selection_rects[last].right();
            let baseline = self.positions[first].y;
            let mut decorate = |position: f32, thickness: f32| {
                let t = thickness * s;
                let center = baseline - position * s;
                path.rect(x0, center - t / 2.0, x1 - x0, t, clockwise);
            };
            if font.underline {
                decorate(tf.underline_position(), tf.underline_thickness());
            }
            if font.strikethrough {
                decorate(tf.strikeout_position(), tf.strikeout_thickness());
            }
        }
        path
    }

    /// Glyphs and decorations of each span merged into one path per span
    ///
    /// Decorations run in the same direction as the glyph outlines, so a
    /// nonzero fill covers each overlap once.
    pub fn combined_paths(&self) -> Vec<Path> {
        self.span_paths()
            .into_iter()
            .enumerate()
            .map(|(span, mut path)| {
                let clockwise = path.signed_area() >= 0.0;
                path.add_path(&self.decoration_path(span, clockwise));
                path
            })
            .collect()
    }

    /// Tight box around every glyph outline and decoration
    pub fn compute_bounds(&self) -> Rect {
        self.span_paths()
            .iter()
            .chain(self.decoration_paths().iter())
            .filter(|p| !p.is_empty())
            .map(|p| p.compute_bounds(&Mat3::IDENTITY))
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }
}
