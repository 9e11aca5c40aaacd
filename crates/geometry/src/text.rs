use crate::outline::extrude;
use crate::{GeometryError, MeshData};
use lyon::math::point;
use lyon::path::Path;
use showcase_assets::{Font, OutlineCommand};

/// Lay out `text` with `font` and build one lyon path of all glyph outlines,
/// baseline at y = 0, newlines moving down by the font's line height.
pub fn text_path(font: &Font, text: &str, size: f32) -> Path {
    let scale = font.scale(size);
    let mut builder = Path::builder();
    let mut pen_x = 0.0;
    let mut pen_y = 0.0;

    for c in text.chars() {
        if c == '\n' {
            pen_x = 0.0;
            pen_y -= font.line_height(size);
            continue;
        }
        let Some(glyph) = font.glyph(c) else {
            continue;
        };
        let at = |[x, y]: [f32; 2]| point(pen_x + x * scale, pen_y + y * scale);

        let mut open = false;
        for cmd in &glyph.outline {
            match *cmd {
                OutlineCommand::MoveTo(p) => {
                    if open {
                        builder.end(true);
                    }
                    builder.begin(at(p));
                    open = true;
                }
                OutlineCommand::LineTo(p) if open => {
                    builder.line_to(at(p));
                }
                OutlineCommand::QuadTo { ctrl, to } if open => {
                    builder.quadratic_bezier_to(at(ctrl), at(to));
                }
                OutlineCommand::CubicTo { ctrl1, ctrl2, to } if open => {
                    builder.cubic_bezier_to(at(ctrl1), at(ctrl2), at(to));
                }
                OutlineCommand::Close if open => {
                    builder.end(true);
                    open = false;
                }
                _ => tracing::debug!("ignoring outline command outside a contour in {c:?}"),
            }
        }
        if open {
            builder.end(true);
        }
        pen_x += glyph.advance * scale;
    }
    builder.build()
}

/// Extruded text mesh. `curve_segments` controls how finely glyph curves are
/// flattened.
pub fn text_mesh(
    font: &Font,
    text: &str,
    size: f32,
    depth: f32,
    curve_segments: u32,
) -> Result<MeshData, GeometryError> {
    let tolerance = size / (curve_segments.max(1) as f32 * 20.0);
    extrude(&text_path(font, text, size), depth, tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK_FONT: &str = r#"{
        "resolution": 1000,
        "boundingBox": { "yMin": -200, "yMax": 800 },
        "glyphs": {
            "I": { "ha": 500, "o": "m 100 0 l 400 0 l 400 700 l 100 700 z" },
            "O": { "ha": 800, "o": "m 0 0 l 700 0 l 700 700 l 0 700 z m 200 200 l 200 500 l 500 500 l 500 200 z" },
            " ": { "ha": 300, "o": "" }
        }
    }"#;

    fn font() -> Font {
        Font::parse(BLOCK_FONT).unwrap()
    }

    #[test]
    fn advances_pen_per_glyph() {
        let m = text_mesh(&font(), "II", 1.0, 0.2, 4).unwrap();
        let bounds = m.bounding_box().unwrap();
        assert!((bounds.min.x - 0.1).abs() < 1e-5);
        assert!((bounds.max.x - 0.9).abs() < 1e-5);
        assert!((bounds.size().y - 0.7).abs() < 1e-5);
        assert!((bounds.size().z - 0.2).abs() < 1e-5);
    }

    #[test]
    fn holes_are_not_filled() {
        let solid = text_mesh(&font(), "I", 1.0, 0.2, 4).unwrap();
        let ring = text_mesh(&font(), "O", 1.0, 0.2, 4).unwrap();
        // Outer square + inner square walls, and a face with a hole.
        assert!(ring.triangle_count() > solid.triangle_count());
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        assert!(matches!(
            text_mesh(&font(), "   ", 1.0, 0.2, 4),
            Err(GeometryError::EmptyOutline)
        ));
    }

    #[test]
    fn unknown_characters_are_skipped_without_fallback() {
        // No '?' glyph in this font, so 'Z' contributes nothing.
        let m = text_mesh(&font(), "ZI", 1.0, 0.2, 4).unwrap();
        assert!((m.bounding_box().unwrap().min.x - 0.1).abs() < 1e-5);
    }
}
