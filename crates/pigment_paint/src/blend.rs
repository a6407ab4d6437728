//! Per-pixel blend functions on premultiplied f32 colors

use pigment_core::BlendMode;

/// Premultiplied RGBA, components in 0.0..=1.0
pub type Premul = [f32; 4];

/// Composite `source` over `backdrop` using `mode`
pub fn blend(mode: BlendMode, backdrop: Premul, source: Premul) -> Premul {
    let (ab, a_s) = (backdrop[3], source[3]);
    match mode {
        BlendMode::Normal => [
            source[0] + backdrop[0] * (1.0 - a_s),
            source[1] + backdrop[1] * (1.0 - a_s),
            source[2] + backdrop[2] * (1.0 - a_s),
            a_s + ab * (1.0 - a_s),
        ],
        BlendMode::Mask => scale(backdrop, a_s),
        BlendMode::Overwrite => source,
        BlendMode::SubtractMask => scale(backdrop, 1.0 - a_s),
        BlendMode::ExcludeMask => {
            let alpha = (a_s - ab).abs();
            if alpha <= 0.0 {
                [0.0; 4]
            } else if a_s > ab {
                scale(source, alpha / a_s)
            } else {
                scale(backdrop, alpha / ab)
            }
        }
        BlendMode::Hue | BlendMode::Saturation | BlendMode::Color | BlendMode::Luminosity => {
            let cb = unpremultiply(backdrop);
            let cs = unpremultiply(source);
            let mixed = match mode {
                BlendMode::Hue => set_lum(set_sat(cs, sat(cb)), lum(cb)),
                BlendMode::Saturation => set_lum(set_sat(cb, sat(cs)), lum(cb)),
                BlendMode::Color => set_lum(cs, lum(cb)),
                _ => set_lum(cb, lum(cs)),
            };
            composite(backdrop, source, mixed)
        }
        _ => {
            let cb = unpremultiply(backdrop);
            let cs = unpremultiply(source);
            let f = separable(mode);
            composite(backdrop, source, [f(cb[0], cs[0]), f(cb[1], cs[1]), f(cb[2], cs[2])])
        }
    }
}

/// Combine two coverage values using `mode`
///
/// Only the mask-family modes and overwrite differ from source-over.
pub fn blend_mask(mode: BlendMode, backdrop: f32, source: f32) -> f32 {
    match mode {
        BlendMode::Mask => backdrop * source,
        BlendMode::Overwrite => source,
        BlendMode::SubtractMask => backdrop * (1.0 - source),
        BlendMode::ExcludeMask => (backdrop - source).abs(),
        _ => source + backdrop - source * backdrop,
    }
}

/// Source-over with the mixed color in the overlap region
fn composite(backdrop: Premul, source: Premul, mixed: [f32; 3]) -> Premul {
    let (ab, a_s) = (backdrop[3], source[3]);
    let both = a_s * ab;
    let channel = |i: usize| source[i] * (1.0 - ab) + backdrop[i] * (1.0 - a_s) + both * mixed[i];
    let alpha = a_s + ab - both;
    [
        channel(0).clamp(0.0, alpha),
        channel(1).clamp(0.0, alpha),
        channel(2).clamp(0.0, alpha),
        alpha,
    ]
}

fn scale(c: Premul, k: f32) -> Premul {
    [c[0] * k, c[1] * k, c[2] * k, c[3] * k]
}

fn unpremultiply(c: Premul) -> [f32; 3] {
    if c[3] <= 0.0 {
        return [0.0; 3];
    }
    [
        (c[0] / c[3]).min(1.0),
        (c[1] / c[3]).min(1.0),
        (c[2] / c[3]).min(1.0),
    ]
}

fn separable(mode: BlendMode) -> fn(f32, f32) -> f32 {
    match mode {
        BlendMode::Multiply => |b: f32, s: f32| b * s,
        BlendMode::Screen => screen,
        BlendMode::Overlay => |b: f32, s: f32| hard_light(s, b),
        BlendMode::Darken => f32::min,
        BlendMode::Lighten => f32::max,
        BlendMode::ColorDodge => |b: f32, s: f32| {
            if b == 0.0 {
                0.0
            } else if s >= 1.0 {
                1.0
            } else {
                (b / (1.0 - s)).min(1.0)
            }
        },
        BlendMode::ColorBurn => |b: f32, s: f32| {
            if b >= 1.0 {
                1.0
            } else if s <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - b) / s).min(1.0)
            }
        },
        BlendMode::HardLight => hard_light,
        BlendMode::SoftLight => |b: f32, s: f32| {
            if s <= 0.5 {
                b - (1.0 - 2.0 * s) * b * (1.0 - b)
            } else {
                let d = if b <= 0.25 {
                    ((16.0 * b - 12.0) * b + 4.0) * b
                } else {
                    b.sqrt()
                };
                b + (2.0 * s - 1.0) * (d - b)
            }
        },
        BlendMode::Difference => |b: f32, s: f32| (b - s).abs(),
        BlendMode::Exclusion => |b: f32, s: f32| b + s - 2.0 * b * s,
        _ => |_: f32, s: f32| s,
    }
}

fn screen(b: f32, s: f32) -> f32 {
    b + s - b * s
}

fn hard_light(b: f32, s: f32) -> f32 {
    if s <= 0.5 {
        b * 2.0 * s
    } else {
        screen(b, 2.0 * s - 1.0)
    }
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 && l - n > 0.0 {
        for v in out.iter_mut() {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 && x - l > 0.0 {
        for v in out.iter_mut() {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    if max <= min {
        return [0.0; 3];
    }
    let mut out = [0.0; 3];
    for (o, v) in out.iter_mut().zip(c.iter()) {
        *o = (v - min) * s / (max - min);
    }
    out
}
