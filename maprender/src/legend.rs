use crate::text::{text_height, text_width};
use crate::{Canvas, Color};

const FONT_POINTS: f64 = 10.0;

// In multiples of the font height
const BORDER_PAD: f32 = 0.4;
const BORDER_AXES_PAD: f32 = 0.5;
const HANDLE_LENGTH: f32 = 2.0;
const HANDLE_TEXT_PAD: f32 = 0.8;
const LABEL_SPACING: f32 = 0.5;

/// A legend of line samples in the upper right corner of the plot box. Draws nothing for no
/// entries.
pub fn draw_legend(canvas: &mut Canvas, entries: &[(String, Color)], line_width: f32) {
    if entries.is_empty() {
        return;
    }
    let scale = canvas.text_scale(FONT_POINTS);
    let em = text_height(scale) as f32;
    let widest = entries
        .iter()
        .map(|(label, _)| text_width(label, scale))
        .max()
        .unwrap_or(0) as f32;

    let n = entries.len() as f32;
    let width = 2.0 * BORDER_PAD * em + HANDLE_LENGTH * em + HANDLE_TEXT_PAD * em + widest;
    let height = 2.0 * BORDER_PAD * em + n * em + (n - 1.0) * LABEL_SPACING * em;

    let (_, top, right, _) = canvas.viewport().plot_box();
    let x = right as f32 - BORDER_AXES_PAD * em - width;
    let y = top as f32 + BORDER_AXES_PAD * em;

    canvas.fill_rect(x, y, width, height, Color::WHITE.alpha(0.8));
    let frame = canvas.points_to_pixels(0.8);
    canvas.stroke_rect(x, y, width, height, Color::LEGEND_EDGE, frame);

    let mut row_top = y + BORDER_PAD * em;
    for (label, color) in entries {
        let mid = row_top + em / 2.0;
        let handle_left = x + BORDER_PAD * em;
        canvas.line(
            (handle_left, mid),
            (handle_left + HANDLE_LENGTH * em, mid),
            *color,
            line_width,
        );
        canvas.text(
            handle_left + (HANDLE_LENGTH + HANDLE_TEXT_PAD) * em,
            row_top,
            label,
            Color::BLACK,
            scale,
        );
        row_top += em * (1.0 + LABEL_SPACING);
    }
}
