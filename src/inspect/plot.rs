//! egui painters for the waveform and MFCC plots.
//!
//! Both plots are redrawn from the current [`Inspection`](super::Inspection)
//! every frame; nothing is cached between selections.

use eframe::egui::{self, Color32, FontId, Rect, Stroke};

use super::mfcc::Mfcc;
use super::waveform::Envelope;

const WAVEFORM_COLOR: Color32 = Color32::from_rgb(68, 136, 255);
const AXIS_FONT_SIZE: f32 = 11.0;

/// Draw the min/max envelope with a centre line and a duration label.
pub fn paint_waveform(ui: &mut egui::Ui, envelope: &Envelope, duration_secs: f32, height: f32) {
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), height),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let visuals = ui.visuals();

    painter.rect_filled(rect, 2.0, visuals.extreme_bg_color);
    painter.line_segment(
        [rect.left_center(), rect.right_center()],
        Stroke::new(1.0, visuals.weak_text_color()),
    );

    if !envelope.is_empty() {
        let half = rect.height() / 2.0;
        let column_width = rect.width() / envelope.len() as f32;
        let stroke = Stroke::new(column_width.max(1.0), WAVEFORM_COLOR);

        for (i, &(lo, hi)) in envelope.columns.iter().enumerate() {
            let x = rect.left() + (i as f32 + 0.5) * column_width;
            let top = rect.center().y - hi.clamp(-1.0, 1.0) * half;
            let bottom = rect.center().y - lo.clamp(-1.0, 1.0) * half;
            painter.line_segment([egui::pos2(x, top), egui::pos2(x, bottom.max(top + 1.0))], stroke);
        }
    }

    painter.text(
        rect.left_top() + egui::vec2(4.0, 2.0),
        egui::Align2::LEFT_TOP,
        "Waveform",
        FontId::proportional(AXIS_FONT_SIZE),
        visuals.text_color(),
    );
    painter.text(
        rect.right_bottom() - egui::vec2(4.0, 2.0),
        egui::Align2::RIGHT_BOTTOM,
        format!("{duration_secs:.2} s"),
        FontId::proportional(AXIS_FONT_SIZE),
        visuals.weak_text_color(),
    );
}

/// Draw the coefficient matrix as a heatmap, coefficient 0 at the bottom.
pub fn paint_mfcc(ui: &mut egui::Ui, mfcc: &Mfcc, height: f32) {
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), height),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let visuals = ui.visuals();
    painter.rect_filled(rect, 2.0, visuals.extreme_bg_color);

    if !mfcc.is_empty() {
        let (lo, hi) = mfcc.value_range();
        let span = (hi - lo).max(f32::EPSILON);

        // At most one cell per horizontal pixel.
        let columns = mfcc.frames.min(rect.width().max(1.0) as usize).max(1);
        let cell_w = rect.width() / columns as f32;
        let cell_h = rect.height() / mfcc.n_coefficients as f32;

        for col in 0..columns {
            let frame = col * mfcc.frames / columns;
            for coef in 0..mfcc.n_coefficients {
                let t = (mfcc.get(coef, frame) - lo) / span;
                let min = egui::pos2(
                    rect.left() + col as f32 * cell_w,
                    rect.bottom() - (coef + 1) as f32 * cell_h,
                );
                let cell = Rect::from_min_size(min, egui::vec2(cell_w + 0.5, cell_h + 0.5));
                painter.rect_filled(cell, 0.0, coolwarm(t));
            }
        }
    }

    painter.text(
        rect.left_top() + egui::vec2(4.0, 2.0),
        egui::Align2::LEFT_TOP,
        "MFCC",
        FontId::proportional(AXIS_FONT_SIZE),
        Color32::BLACK,
    );
}

/// Diverging blue-white-red colour map for `t` in `[0, 1]`.
pub fn coolwarm(t: f32) -> Color32 {
    const COOL: [f32; 3] = [59.0, 76.0, 192.0];
    const MID: [f32; 3] = [221.0, 221.0, 221.0];
    const WARM: [f32; 3] = [180.0, 4.0, 38.0];

    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let (a, b, u) = if t < 0.5 {
        (COOL, MID, t * 2.0)
    } else {
        (MID, WARM, (t - 0.5) * 2.0)
    };
    let mix = |i: usize| (a[i] + (b[i] - a[i]) * u).round() as u8;
    Color32::from_rgb(mix(0), mix(1), mix(2))
}
