//! Safe raster preview of untrusted PDF content.
//!
//! The card summarises the first page's extracted text; nothing embedded in
//! the document is executed or re-interpreted. Rendering is total: between
//! extracted text, the caller's fallback title and the file name there is
//! always something to draw, so the card is never blank. PNG encoding is the
//! one fallible step and surfaces as `RenderDegradation`.

use slotbox_pdf::first_page_text;

use crate::error::RenderDegradation;
use crate::font::{glyph, GLYPH_ADVANCE, GLYPH_HEIGHT};

pub const PREVIEW_WIDTH: u32 = 400;
pub const PREVIEW_HEIGHT: u32 = 520;

/// Extracted text is capped before layout to bound memory on adversarial
/// input; the greedy wrap then caps the rendered output at 12 lines.
const MAX_BODY_CHARS: usize = 300;
const WRAP_COLUMNS: usize = 50;
const MAX_BODY_LINES: usize = 12;
const BODY_TOP: u32 = 140;
const LINE_ADVANCE: u32 = 18;

/// Fixed-size RGB8 canvas.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    fn new(width: u32, height: u32, color: [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&color);
        }
        RasterImage { width, height, pixels }
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x < self.width && y < self.height {
            let i = ((y * self.width + x) * 3) as usize;
            self.pixels[i..i + 3].copy_from_slice(&color);
        }
    }

    fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: [u8; 3]) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Draw `text` with the built-in face at the given integer scale,
    /// clipping at the canvas edges. `bold` doubles the strokes with a
    /// one-pixel horizontal offset.
    fn draw_text(&mut self, x: u32, y: u32, text: &str, color: [u8; 3], scale: u32, bold: bool) {
        let mut pen_x = x;
        for ch in text.chars() {
            if pen_x >= self.width {
                break;
            }
            let columns = glyph(ch);
            for (cx, column) in columns.iter().enumerate() {
                for cy in 0..GLYPH_HEIGHT {
                    if column & (1 << cy) == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            let px = pen_x + (cx as u32) * scale + sx;
                            let py = y + (cy as u32) * scale + sy;
                            self.set_pixel(px, py, color);
                            if bold {
                                self.set_pixel(px + 1, py, color);
                            }
                        }
                    }
                }
            }
            pen_x += GLYPH_ADVANCE as u32 * scale;
        }
    }

    /// Encode the canvas as a PNG byte stream.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderDegradation> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| RenderDegradation { reason: format!("png header: {e}") })?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| RenderDegradation { reason: format!("png data: {e}") })?;
        }
        Ok(out)
    }
}

/// Render the summary card for `document`. Body text priority: extracted
/// first-page text, then `fallback_title`, then `file_name`.
pub fn render_preview(document: &[u8], fallback_title: &str, file_name: &str) -> RasterImage {
    let text = first_page_text(document)
        .map(|t| normalise(&t))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            let title = fallback_title.trim();
            (!title.is_empty()).then(|| title.to_string())
        })
        .unwrap_or_else(|| file_name.to_string());

    let mut img = RasterImage::new(PREVIEW_WIDTH, PREVIEW_HEIGHT, [250, 250, 250]);
    // Header band with the file name in bold.
    img.fill_rect(8, 8, PREVIEW_WIDTH - 8, 120, [230, 230, 230]);
    img.draw_text(16, 14, file_name, [30, 30, 30], 2, true);

    let mut y = BODY_TOP;
    for line in wrap_body(&text).iter().take(MAX_BODY_LINES) {
        img.draw_text(16, y, line, [60, 60, 60], 1, false);
        y += LINE_ADVANCE;
    }
    img
}

/// Collapse line breaks to spaces, trim, and cap at 300 characters.
fn normalise(text: &str) -> String {
    text.trim()
        .replace(['\n', '\r'], " ")
        .chars()
        .take(MAX_BODY_CHARS)
        .collect()
}

/// Greedy line fill: append a word while the line stays within 50 columns,
/// otherwise start a new line. Text beyond the rendered-line cap is dropped
/// by the caller; the preview is a summary, not a full rendering.
fn wrap_body(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split(' ') {
        if line.len() + word.len() + 1 > WRAP_COLUMNS {
            lines.push(std::mem::take(&mut line));
            line = word.to_string();
        } else {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_blank(img: &RasterImage) -> bool {
        img.pixels.chunks(3).all(|p| p == [250, 250, 250])
    }

    #[test]
    fn textless_document_falls_back_to_title_then_filename() {
        let img = render_preview(b"not a pdf at all", "Fallback Title", "file.pdf");
        assert!(!is_blank(&img));
        // No text, no title: the file name still yields a non-blank card.
        let img = render_preview(b"", "   ", "file.pdf");
        assert!(!is_blank(&img));
    }

    #[test]
    fn canvas_has_fixed_dimensions_and_header_band() {
        let img = render_preview(b"", "t", "f.pdf");
        assert_eq!((img.width, img.height), (400, 520));
        // A pixel inside the band area but outside any glyph.
        let i = ((100 * img.width + 380) * 3) as usize;
        assert_eq!(&img.pixels[i..i + 3], &[230, 230, 230]);
    }

    #[test]
    fn wrap_is_greedy_at_fifty_columns() {
        let long = ["word"; 40].join(" ");
        let lines = wrap_body(&long);
        assert!(lines.iter().all(|l| l.len() <= WRAP_COLUMNS));
        assert!(lines.len() > 1);
        // Words are not split mid-word.
        assert!(lines.iter().all(|l| l.split(' ').all(|w| w == "word")));
    }

    #[test]
    fn body_text_is_capped_at_300_chars() {
        let noisy = "x".repeat(10_000);
        assert_eq!(normalise(&noisy).chars().count(), 300);
        assert_eq!(normalise("a\nb\r\nc"), "a b  c");
    }

    #[test]
    fn png_encoding_round_trips_header() {
        let img = render_preview(b"", "t", "f.pdf");
        let png = img.encode_png().expect("encode");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
