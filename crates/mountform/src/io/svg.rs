//! SVG path outlines.
//!
//! Reading walks the first `<path>` element and follows move/line commands
//! (absolute and relative, including the horizontal and vertical forms).
//! The document is walked with the `svg` crate, but the `d` attribute is
//! tokenized here so coordinates keep full `f64` precision.
//!
//! Writing emits a standalone document sized in millimetres whose viewBox is
//! the contour bounds padded by `margin` on every side.

use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::str::CharIndices;

use ::svg::node::element::{tag, Path as PathElement};
use ::svg::parser::Event;
use ::svg::Document;
use nalgebra::Vector2;

use super::{IoError, IoResult};
use crate::contour::Contour;

/// Default padding around written outlines, same unit as the points.
pub const DEFAULT_MARGIN: f64 = 5.0;

/// Parse the first `<path d="…">` of `content` into a contour.
pub fn parse_path(content: &str) -> IoResult<Contour> {
    for event in ::svg::read(content)? {
        if let Event::Tag(tag::Path, _, attributes) = event {
            let Some(d) = attributes.get("d") else {
                continue;
            };
            let points = trace(d)?;
            if points.is_empty() {
                return Err(IoError::MissingPathData);
            }
            tracing::debug!(points = points.len(), "parsed svg path");
            return Ok(Contour::new(points));
        }
    }
    Err(IoError::MissingPathData)
}

/// Read and parse an SVG file.
pub fn read_contour(path: &Path) -> IoResult<Contour> {
    let content = fs::read_to_string(path)?;
    parse_path(&content)
}

/// Path data item: a command letter or a number.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

/// Split path data into commands and numbers. Separators are optional
/// where the grammar allows it (`10-5.5.25e1` is three numbers).
fn tokenize(d: &str) -> IoResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = d.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() || c == ',' {
            chars.next();
        } else if c.is_ascii_alphabetic() {
            chars.next();
            tokens.push(Token::Command(c));
        } else {
            let end = scan_number(&mut chars, d.len());
            let text = &d[start..end];
            let value = text
                .parse::<f64>()
                .map_err(|_| IoError::Svg(format!("bad number {text:?} in path data")))?;
            tokens.push(Token::Number(value));
        }
    }
    Ok(tokens)
}

/// Consume one number literal; returns the byte offset just past it.
fn scan_number(chars: &mut Peekable<CharIndices<'_>>, len: usize) -> usize {
    let mut has_dot = false;
    let mut has_exponent = false;
    if let Some(&(_, '+' | '-')) = chars.peek() {
        chars.next();
    }
    while let Some(&(i, c)) = chars.peek() {
        match c {
            '0'..='9' => {}
            '.' if !has_dot && !has_exponent => has_dot = true,
            'e' | 'E' if !has_exponent => {
                has_exponent = true;
                chars.next();
                if let Some(&(_, '+' | '-')) = chars.peek() {
                    chars.next();
                }
                continue;
            }
            _ => return i,
        }
        chars.next();
    }
    len
}

/// Pen positions visited by the straight-segment commands of path data `d`.
fn trace(d: &str) -> IoResult<Vec<Vector2<f64>>> {
    let tokens = tokenize(d)?;
    let mut points = Vec::new();
    let mut pen = Vector2::zeros();
    let mut start = Vector2::zeros();
    let mut k = 0;
    while k < tokens.len() {
        let Token::Command(cmd) = tokens[k] else {
            return Err(IoError::Svg("path data must start with a command".into()));
        };
        k += 1;
        let args: Vec<f64> = tokens[k..]
            .iter()
            .map_while(|t| match t {
                Token::Number(v) => Some(*v),
                Token::Command(_) => None,
            })
            .collect();
        k += args.len();
        let relative = cmd.is_ascii_lowercase();
        match cmd.to_ascii_uppercase() {
            'M' | 'L' => {
                if args.is_empty() || args.len() % 2 != 0 {
                    return Err(IoError::Svg(format!(
                        "{cmd} takes coordinate pairs, got {} numbers",
                        args.len()
                    )));
                }
                // Extra pairs after a moveto are implicit linetos.
                for (j, xy) in args.chunks_exact(2).enumerate() {
                    let xy = Vector2::new(xy[0], xy[1]);
                    pen = if relative { pen + xy } else { xy };
                    if j == 0 && cmd.eq_ignore_ascii_case(&'m') {
                        start = pen;
                    }
                    points.push(pen);
                }
            }
            'H' => {
                for &x in &args {
                    pen.x = if relative { pen.x + x } else { x };
                    points.push(pen);
                }
            }
            'V' => {
                for &y in &args {
                    pen.y = if relative { pen.y + y } else { y };
                    points.push(pen);
                }
            }
            'Z' if args.is_empty() => pen = start,
            'Z' => return Err(IoError::Svg("closepath takes no numbers".into())),
            _ => return Err(IoError::Svg(format!("unsupported path command {cmd:?}"))),
        }
    }
    Ok(points)
}

/// `M x,y L x,y … Z` with four decimals.
fn path_data(contour: &Contour) -> String {
    let mut d = String::new();
    for (k, p) in contour.points.iter().enumerate() {
        let op = if k == 0 { "M" } else { "L" };
        d.push_str(&format!("{op} {:.4},{:.4} ", p.x, p.y));
    }
    d.push('Z');
    d
}

/// Build an SVG document holding `contour` as one closed path.
pub fn write_document(contour: &Contour, margin: f64) -> IoResult<Document> {
    let (lo, hi) = contour.bounds().ok_or(IoError::MissingPathData)?;
    let (x, y) = (lo.x - margin, lo.y - margin);
    let (w, h) = (hi.x - lo.x + 2.0 * margin, hi.y - lo.y + 2.0 * margin);
    let path = PathElement::new()
        .set("d", path_data(contour))
        .set("style", "fill:none;stroke:black;stroke-width:1");
    Ok(Document::new()
        .set("width", format!("{w}mm"))
        .set("height", format!("{h}mm"))
        .set("viewBox", format!("{x} {y} {w} {h}"))
        .add(path))
}

/// Write `contour` to `path` as an SVG document.
pub fn write_contour(path: &Path, contour: &Contour, margin: f64) -> IoResult<()> {
    let doc = write_document(contour, margin)?;
    ::svg::save(path, &doc)?;
    tracing::debug!(path = %path.display(), points = contour.len(), "wrote svg");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector2<f64>, x: f64, y: f64) -> bool {
        (a.x - x).abs() < 1e-4 && (a.y - y).abs() < 1e-4
    }

    #[test]
    fn parses_absolute_polyline() {
        let doc = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <path d="M 10.5,20 L 30,20 L 30,45.25 L 10.5,20 Z" style="fill:none"/>
</svg>"#;
        let c = parse_path(doc).unwrap();
        // Closing duplicate dropped.
        assert_eq!(c.len(), 3);
        assert!(close(c.points[0], 10.5, 20.0));
        assert!(close(c.points[2], 30.0, 45.25));
    }

    #[test]
    fn parses_relative_and_axis_commands() {
        let doc = r#"<svg><path d="m 1,1 2,0 v 3 h -2 z"/></svg>"#;
        let c = parse_path(doc).unwrap();
        let expected = [(1.0, 1.0), (3.0, 1.0), (3.0, 4.0), (1.0, 4.0)];
        assert_eq!(c.len(), expected.len());
        for (p, (x, y)) in c.points.iter().zip(expected) {
            assert!(close(*p, x, y), "{p:?} vs ({x}, {y})");
        }
    }

    #[test]
    fn path_numbers_keep_full_precision() {
        let doc = concat!(
            r#"<svg><path d="M 1234.56789,9876.54321 "#,
            r#"L 4321.98765,1111.11119 V 3000.25 Z"/></svg>"#,
        );
        let c = parse_path(doc).unwrap();
        assert_eq!(c.points[0], Vector2::new(1234.56789, 9876.54321));
        assert_eq!(c.points[1], Vector2::new(4321.98765, 1111.11119));
    }

    #[test]
    fn compact_path_numbers_split_on_sign_and_dot() {
        let doc = r#"<svg><path d="M0,0L10-5.5L.25e1,3z"/></svg>"#;
        let c = parse_path(doc).unwrap();
        let expected = [
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, -5.5),
            Vector2::new(2.5, 3.0),
        ];
        assert_eq!(c.points, expected);
    }

    #[test]
    fn malformed_path_data_is_rejected() {
        for d in ["M 1,2 L 3", "1,2 L 3,4", "M 1,2 L 3,# 4", "M 1,2 Z 5"] {
            let doc = format!(r#"<svg><path d="{d}"/></svg>"#);
            assert!(matches!(parse_path(&doc), Err(IoError::Svg(_))), "{d}");
        }
    }

    #[test]
    fn missing_path_is_reported() {
        let doc = r#"<svg><rect width="3" height="4"/></svg>"#;
        assert!(matches!(parse_path(doc), Err(IoError::MissingPathData)));
        let no_d = r#"<svg><path style="fill:none"/></svg>"#;
        assert!(matches!(parse_path(no_d), Err(IoError::MissingPathData)));
    }

    #[test]
    fn curves_are_rejected() {
        let doc = r#"<svg><path d="M 0,0 C 1,1 2,1 3,0 Z"/></svg>"#;
        assert!(matches!(parse_path(doc), Err(IoError::Svg(_))));
    }

    #[test]
    fn written_document_has_margin_and_reparses() {
        let c = Contour::new(vec![
            Vector2::new(-2.0, 0.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(0.0, 3.0),
        ]);
        let text = write_document(&c, DEFAULT_MARGIN).unwrap().to_string();
        assert!(text.contains(r#"width="14mm""#), "{text}");
        assert!(text.contains(r#"height="13mm""#));
        assert!(text.contains(r#"viewBox="-7 -5 14 13""#));
        assert!(text.contains("M -2.0000,0.0000 L 2.0000,0.0000 L 0.0000,3.0000 Z"));
        assert!(text.contains("fill:none;stroke:black;stroke-width:1"));
        let back = parse_path(&text).unwrap();
        assert_eq!(back.len(), 3);
        for (a, b) in back.points.iter().zip(&c.points) {
            assert!(close(*a, b.x, b.y));
        }
    }

    #[test]
    fn empty_contour_cannot_be_written() {
        assert!(write_document(&Contour::default(), 1.0).is_err());
    }
}
