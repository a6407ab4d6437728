//! SVG path data parsing

use pigment_core::{PigmentError, Result, Vec2};

use crate::path::Path;

/// Parse SVG path data (`M`, `L`, `H`, `V`, `C`, `S`, `Q`, `T`, `A`, `Z`
/// in absolute and relative forms) into a [`Path`]
pub fn parse_path(data: &str) -> Result<Path> {
    PathParser::new(data).parse()
}

struct PathParser<'a> {
    src: &'a str,
    pos: usize,
    path: Path,
    current: Vec2,
    subpath_start: Vec2,
    /// Second control point of the previous cubic, for `S`
    last_cubic: Option<Vec2>,
    /// Control point of the previous quadratic, for `T`
    last_quad: Option<Vec2>,
}

impl<'a> PathParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            path: Path::new(),
            current: Vec2::ZERO,
            subpath_start: Vec2::ZERO,
            last_cubic: None,
            last_quad: None,
        }
    }

    fn parse(mut self) -> Result<Path> {
        let mut command: Option<u8> = None;
        loop {
            self.skip_separators();
            let Some(&byte) = self.src.as_bytes().get(self.pos) else {
                break;
            };

            let cmd = if byte.is_ascii_alphabetic() {
                self.pos += 1;
                byte
            } else {
                match command {
                    // Extra coordinate pairs after a moveto are linetos
                    Some(b'M') => b'L',
                    Some(b'm') => b'l',
                    Some(b'Z') | Some(b'z') => {
                        return Err(self.error("unexpected number after closepath"));
                    }
                    Some(c) => c,
                    None => return Err(self.error("path data must start with a command")),
                }
            };
            if command.is_none() && !matches!(cmd, b'M' | b'm') {
                return Err(PigmentError::parse(
                    self.pos - 1,
                    (cmd as char).to_string(),
                    "path data must start with a moveto",
                ));
            }
            self.command(cmd)?;
            command = Some(cmd);
        }
        Ok(self.path)
    }

    fn command(&mut self, cmd: u8) -> Result<()> {
        let relative = cmd.is_ascii_lowercase();
        let origin = if relative { self.current } else { Vec2::ZERO };
        let mut cubic = None;
        let mut quad = None;

        match cmd.to_ascii_uppercase() {
            b'M' => {
                let p = origin + self.point()?;
                self.path.move_to(p.x, p.y);
                self.current = p;
                self.subpath_start = p;
            }
            b'L' => {
                let p = origin + self.point()?;
                self.line_to(p);
            }
            b'H' => {
                let x = self.number()? + origin.x;
                self.line_to(Vec2::new(x, self.current.y));
            }
            b'V' => {
                let y = self.number()? + origin.y;
                self.line_to(Vec2::new(self.current.x, y));
            }
            b'C' => {
                let c1 = origin + self.point()?;
                let c2 = origin + self.point()?;
                let end = origin + self.point()?;
                self.cubic_to(c1, c2, end);
                cubic = Some(c2);
            }
            b'S' => {
                let c1 = self.reflect(self.last_cubic);
                let c2 = origin + self.point()?;
                let end = origin + self.point()?;
                self.cubic_to(c1, c2, end);
                cubic = Some(c2);
            }
            b'Q' => {
                let c = origin + self.point()?;
                let end = origin + self.point()?;
                self.quad_to(c, end);
                quad = Some(c);
            }
            b'T' => {
                let c = self.reflect(self.last_quad);
                let end = origin + self.point()?;
                self.quad_to(c, end);
                quad = Some(c);
            }
            b'A' => {
                let rx = self.number()?.abs();
                let ry = self.number()?.abs();
                let rotation = self.number()?;
                let large_arc = self.flag()?;
                let sweep = self.flag()?;
                let end = origin + self.point()?;
                self.path
                    .elliptical_arc_to(rx, ry, rotation, large_arc, sweep, end.x, end.y)?;
                self.current = end;
            }
            b'Z' => {
                self.path.close_path();
                self.current = self.subpath_start;
            }
            _ => {
                return Err(PigmentError::parse(
                    self.pos - 1,
                    (cmd as char).to_string(),
                    "unknown path command",
                ));
            }
        }

        self.last_cubic = cubic;
        self.last_quad = quad;
        Ok(())
    }

    fn line_to(&mut self, p: Vec2) {
        self.path.line_to(p.x, p.y);
        self.current = p;
    }

    fn cubic_to(&mut self, c1: Vec2, c2: Vec2, end: Vec2) {
        self.path.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, end.x, end.y);
        self.current = end;
    }

    fn quad_to(&mut self, c: Vec2, end: Vec2) {
        self.path.quadratic_curve_to(c.x, c.y, end.x, end.y);
        self.current = end;
    }

    /// Mirror of the previous control point around the current point
    fn reflect(&self, control: Option<Vec2>) -> Vec2 {
        match control {
            Some(c) => self.current * 2.0 - c,
            None => self.current,
        }
    }

    fn skip_separators(&mut self) {
        let bytes = self.src.as_bytes();
        while let Some(b) = bytes.get(self.pos) {
            if b.is_ascii_whitespace() || *b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn point(&mut self) -> Result<Vec2> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Vec2::new(x, y))
    }

    fn number(&mut self) -> Result<f32> {
        self.skip_separators();
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut end = start;
        let digits = |from: usize| {
            let mut i = from;
            while bytes.get(i).map_or(false, |b| b.is_ascii_digit()) {
                i += 1;
            }
            i
        };

        if matches!(bytes.get(end), Some(b'+') | Some(b'-')) {
            end += 1;
        }
        let int_end = digits(end);
        let mut mantissa = int_end > end;
        end = int_end;
        if bytes.get(end) == Some(&b'.') {
            let frac_end = digits(end + 1);
            mantissa |= frac_end > end + 1;
            end = frac_end;
        }
        if !mantissa {
            return Err(self.error("expected a number"));
        }
        if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
                exp += 1;
            }
            let exp_end = digits(exp);
            if exp_end > exp {
                end = exp_end;
            }
        }

        let text = &self.src[start..end];
        let value: f32 = text
            .parse()
            .map_err(|_| PigmentError::parse(start, text, "invalid number"))?;
        if !value.is_finite() {
            return Err(PigmentError::parse(start, text, "number out of range"));
        }
        self.pos = end;
        Ok(value)
    }

    /// Arc flags are single characters and may be packed without separators
    fn flag(&mut self) -> Result<bool> {
        self.skip_separators();
        match self.src.as_bytes().get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(self.error("expected an arc flag (0 or 1)")),
        }
    }

    fn error(&self, message: &str) -> PigmentError {
        let token: String = self.src[self.pos..]
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != ',')
            .take(16)
            .collect();
        PigmentError::parse(self.pos, token, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathCommand;
    use pigment_core::{ErrorKind, Mat3, Rect};

    #[test]
    fn test_absolute_and_relative_commands() {
        let path = parse_path("M10 10 h 10 v10 H10 z").unwrap();
        assert_eq!(path.compute_bounds(&Mat3::IDENTITY), Rect::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(path.commands().len(), 5);
    }

    #[test]
    fn test_implicit_lineto_and_compact_numbers() {
        let path = parse_path("m1,1 2,0-1.5.5e1").unwrap();
        assert_eq!(
            path.commands(),
            &[
                PathCommand::MoveTo(Vec2::new(1.0, 1.0)),
                PathCommand::LineTo(Vec2::new(3.0, 1.0)),
                PathCommand::LineTo(Vec2::new(1.5, 6.0)),
            ]
        );
    }

    #[test]
    fn test_smooth_curves_reflect_control_points() {
        let path = parse_path("M0 0 C 0 10 10 10 10 0 S 20 -10 20 0").unwrap();
        match path.commands()[2] {
            PathCommand::CubicTo { control1, .. } => assert_eq!(control1, Vec2::new(10.0, -10.0)),
            other => panic!("unexpected {:?}", other),
        }
        let quad = parse_path("M0 0 Q5 5 10 0 T20 0").unwrap();
        match quad.commands()[2] {
            PathCommand::QuadTo { control, .. } => assert_eq!(control, Vec2::new(15.0, -5.0)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_packed_arc_flags() {
        let path = parse_path("M0 0a10 10 0 0120 0").unwrap();
        assert_eq!(path.current_point(), Some(Vec2::new(20.0, 0.0)));
    }

    #[test]
    fn test_errors_carry_offset_and_token() {
        let err = parse_path("M 0 0 L 10 foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        match err {
            PigmentError::Parse { offset, token, .. } => {
                assert_eq!(offset, 11);
                assert_eq!(token, "foo");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_path("L 1 1").is_err());
        assert!(parse_path("M 0 0 X 1 1").is_err());
        assert!(parse_path("M 0 0 Z 4").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let path = parse_path("M 0.5 1 C 2 3 4 5 6 7 Q 8 9 10 11 L -1 -2 Z").unwrap();
        assert_eq!(parse_path(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn test_empty_data_is_an_empty_path() {
        assert!(parse_path("  ").unwrap().is_empty());
    }
}
