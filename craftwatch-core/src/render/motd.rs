// craftwatch-core/src/render/motd.rs
//
// Renders the server MOTD onto a fixed 600x100 card: dark fill, accent
// border, 24px text word-wrapped to 550px. Produced as an in-memory PNG
// buffer; nothing here touches the filesystem.

use std::io::Cursor;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use imageproc::rect::Rect;

use craftwatch_common::Error;

const CANVAS_WIDTH: u32 = 600;
const CANVAS_HEIGHT: u32 = 100;
const MAX_TEXT_WIDTH: f32 = 550.0;
const FONT_SIZE: f32 = 24.0;
const TEXT_X: i32 = 25;
const FIRST_BASELINE_Y: i32 = 40;
const LINE_ADVANCE: i32 = 30;
const BORDER_WIDTH: u32 = 3;

const BACKGROUND: Rgba<u8> = Rgba([0x2c, 0x2f, 0x33, 0xff]);
const BORDER: Rgba<u8> = Rgba([0x72, 0x89, 0xda, 0xff]);
const TEXT: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

/// Split `text` into lines no wider than `max_width` according to
/// `measure`. A single word wider than the limit gets its own line rather
/// than being broken mid-word.
pub fn wrap_words(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let mut current = first.to_string();
    for word in words {
        let candidate = format!("{} {}", current, word);
        if measure(&candidate) < max_width {
            current = candidate;
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    lines.push(current);
    lines
}

fn line_width(font: &FontArc, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    text.chars().map(|c| scaled.h_advance(font.glyph_id(c))).sum()
}

/// Render `motd_text` as a PNG buffer.
pub fn render_motd_card(font: &FontArc, motd_text: &str) -> Result<Vec<u8>, Error> {
    let mut img = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND);

    for i in 0..BORDER_WIDTH {
        let rect = Rect::at(i as i32, i as i32)
            .of_size(CANVAS_WIDTH - 2 * i, CANVAS_HEIGHT - 2 * i);
        imageproc::drawing::draw_hollow_rect_mut(&mut img, rect, BORDER);
    }

    let scale = PxScale::from(FONT_SIZE);
    let lines = wrap_words(motd_text, MAX_TEXT_WIDTH, |s| line_width(font, scale, s));
    for (i, line) in lines.iter().enumerate() {
        let y = FIRST_BASELINE_Y + (i as i32) * LINE_ADVANCE - FONT_SIZE as i32;
        draw_text_mut(&mut img, TEXT, TEXT_X, y, scale, font, line);
    }

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| Error::Render(format!("PNG encode failed: {}", e)))?;
    Ok(buf.into_inner())
}
