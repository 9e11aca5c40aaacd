use crate::AssetError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One drawing command of a glyph outline, in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineCommand {
    MoveTo([f32; 2]),
    LineTo([f32; 2]),
    QuadTo { ctrl: [f32; 2], to: [f32; 2] },
    CubicTo { ctrl1: [f32; 2], ctrl2: [f32; 2], to: [f32; 2] },
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub advance: f32,
    pub x_min: f32,
    pub x_max: f32,
    pub outline: Vec<OutlineCommand>,
}

/// A parsed typeface font (the JSON glyph-outline format).
#[derive(Debug, Clone)]
pub struct Font {
    pub family_name: String,
    /// Font units per em.
    pub resolution: f32,
    pub ascent: f32,
    pub descent: f32,
    pub underline_thickness: f32,
    glyphs: BTreeMap<char, Glyph>,
}

#[derive(Deserialize)]
struct TypefaceFile {
    glyphs: BTreeMap<String, RawGlyph>,
    resolution: f32,
    #[serde(rename = "familyName", default)]
    family_name: String,
    #[serde(rename = "boundingBox")]
    bounding_box: RawBoundingBox,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f32,
}

#[derive(Deserialize)]
struct RawGlyph {
    ha: f32,
    #[serde(default)]
    x_min: f32,
    #[serde(default)]
    x_max: f32,
    #[serde(default)]
    o: String,
}

#[derive(Deserialize)]
struct RawBoundingBox {
    #[serde(rename = "yMin")]
    y_min: f32,
    #[serde(rename = "yMax")]
    y_max: f32,
}

impl Font {
    /// Read and parse a typeface file. Blocking; the loader calls this off the control thread.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&data)
    }

    pub fn parse(json: &str) -> Result<Self, AssetError> {
        let file: TypefaceFile = serde_json::from_str(json)?;
        if file.resolution <= 0.0 {
            return Err(AssetError::FontParse(format!(
                "invalid resolution {}",
                file.resolution
            )));
        }

        let mut glyphs = BTreeMap::new();
        for (key, raw) in file.glyphs {
            let mut chars = key.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                tracing::debug!("skipping multi-character glyph key {key:?}");
                continue;
            };
            let outline = parse_outline(&raw.o)
                .map_err(|e| AssetError::FontParse(format!("glyph {c:?}: {e}")))?;
            glyphs.insert(
                c,
                Glyph {
                    advance: raw.ha,
                    x_min: raw.x_min,
                    x_max: raw.x_max,
                    outline,
                },
            );
        }
        if glyphs.is_empty() {
            return Err(AssetError::MissingGlyphs);
        }

        Ok(Self {
            family_name: file.family_name,
            resolution: file.resolution,
            ascent: file.bounding_box.y_max,
            descent: file.bounding_box.y_min,
            underline_thickness: file.underline_thickness,
            glyphs,
        })
    }

    /// Glyph for `c`, falling back to `?` when the font lacks it.
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c).or_else(|| self.glyphs.get(&'?'))
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Factor from font units to scene units for text of height `size`.
    pub fn scale(&self, size: f32) -> f32 {
        size / self.resolution
    }

    pub fn line_height(&self, size: f32) -> f32 {
        (self.ascent - self.descent + self.underline_thickness) * self.scale(size)
    }
}

/// Parse the compact outline string: `m x y`, `l x y`, `q x y cx cy`,
/// `b x y c1x c1y c2x c2y`, `z`. End points come before control points.
fn parse_outline(o: &str) -> Result<Vec<OutlineCommand>, String> {
    let mut tokens = o.split_whitespace();
    let mut commands = Vec::new();

    let num = |tokens: &mut std::str::SplitWhitespace<'_>| -> Result<f32, String> {
        let tok = tokens.next().ok_or("truncated outline")?;
        tok.parse::<f32>().map_err(|_| format!("bad number {tok:?}"))
    };

    while let Some(op) = tokens.next() {
        let cmd = match op {
            "m" => OutlineCommand::MoveTo([num(&mut tokens)?, num(&mut tokens)?]),
            "l" => OutlineCommand::LineTo([num(&mut tokens)?, num(&mut tokens)?]),
            "q" => {
                let to = [num(&mut tokens)?, num(&mut tokens)?];
                let ctrl = [num(&mut tokens)?, num(&mut tokens)?];
                OutlineCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = [num(&mut tokens)?, num(&mut tokens)?];
                let ctrl1 = [num(&mut tokens)?, num(&mut tokens)?];
                let ctrl2 = [num(&mut tokens)?, num(&mut tokens)?];
                OutlineCommand::CubicTo { ctrl1, ctrl2, to }
            }
            "z" => OutlineCommand::Close,
            other => return Err(format!("unknown outline command {other:?}")),
        };
        commands.push(cmd);
    }
    Ok(commands)
}
