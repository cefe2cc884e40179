//! Fixed-grid bitmap font
//!
//! Glyphs live in a regular atlas grid covering a contiguous character
//! range, ASCII-printable by default. A JSON config describes the grid and
//! names the atlas image; the renderer uploads the image, this module only
//! computes UV rects and lays out text as glyph quads.

use crate::draw::{DrawList, Rect};
use kiln_core::{KilnError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
struct FontConfig {
    texture: String,
    glyph_width: f32,
    glyph_height: f32,
    columns: u32,
    rows: u32,
    #[serde(default = "default_first_char")]
    first_char: u8,
}

fn default_first_char() -> u8 {
    b' '
}

/// A bitmap font atlas description
#[derive(Debug, Clone)]
pub struct BitmapFont {
    /// Atlas image path, resolved against the config file's directory
    pub texture_path: PathBuf,
    pub glyph_width: f32,
    pub glyph_height: f32,
    columns: u32,
    rows: u32,
    first_char: u8,
}

impl Default for BitmapFont {
    /// 16x6 grid over the printable ASCII range
    fn default() -> Self {
        Self {
            texture_path: PathBuf::from("fonts/default.png"),
            glyph_width: 8.0,
            glyph_height: 12.0,
            columns: 16,
            rows: 6,
            first_char: b' ',
        }
    }
}

/// Load a font description from a JSON config file.
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<BitmapFont> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|_| {
        KilnError::ResourceNotFound(format!("could not read font config: {}", path.display()))
    })?;
    let config: FontConfig = serde_json::from_str(&source)?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(BitmapFont {
        texture_path: base_dir.join(config.texture),
        glyph_width: config.glyph_width,
        glyph_height: config.glyph_height,
        columns: config.columns,
        rows: config.rows,
        first_char: config.first_char,
    })
}

impl BitmapFont {
    /// UV rect `[u0, v0, u1, v1]` for a character, or `None` outside the
    /// atlas range.
    pub fn glyph_uv(&self, c: char) -> Option<[f32; 4]> {
        let code = c as u32;
        let first = self.first_char as u32;
        let count = self.columns * self.rows;
        if code < first || code >= first + count {
            return None;
        }

        let index = code - first;
        let col = index % self.columns;
        let row = index / self.columns;
        let du = 1.0 / self.columns as f32;
        let dv = 1.0 / self.rows as f32;
        Some([
            col as f32 * du,
            row as f32 * dv,
            (col + 1) as f32 * du,
            (row + 1) as f32 * dv,
        ])
    }

    /// Width of a laid-out string in pixels (monospace advance)
    pub fn text_width(&self, text: &str, scale: f32) -> f32 {
        text.chars().count() as f32 * self.glyph_width * scale
    }

    /// Append one quad per visible glyph, left-to-right from `(x, y)`.
    /// Characters outside the atlas still advance the pen so spacing holds.
    pub fn layout_text(
        &self,
        text: &str,
        x: f32,
        y: f32,
        scale: f32,
        color: [f32; 4],
        list: &mut DrawList,
    ) {
        let advance = self.glyph_width * scale;
        let mut pen_x = x;

        for c in text.chars() {
            if c != ' ' {
                if let Some(uv) = self.glyph_uv(c) {
                    list.push_glyph(
                        Rect::new(pen_x, y, advance, self.glyph_height * scale),
                        uv,
                        color,
                    );
                }
            }
            pen_x += advance;
        }
    }
}
