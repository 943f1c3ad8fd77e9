use std::f32::consts::TAU;

use eframe::egui::{self, Color32, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};

// ---------------------------------------------------------------------------
// Donut charts painted directly with the egui painter
// ---------------------------------------------------------------------------

/// Inner radius as a fraction of the outer radius.
const HOLE: f32 = 0.3;
/// How far the hovered slice is pulled out, in points.
const PULL: f32 = 8.0;
/// Maximum angle covered by one painted segment.
const SEGMENT: f32 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub color: Color32,
}

/// Share of the total for every value, in percent. All zeros when the
/// total is zero.
pub fn percentages(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    values
        .iter()
        .map(|v| if total > 0.0 { v / total * 100.0 } else { 0.0 })
        .collect()
}

/// `(start, end)` angle of each slice in radians, clockwise from twelve
/// o'clock.
pub fn slice_spans(values: &[f64]) -> Vec<(f32, f32)> {
    let total: f64 = values.iter().sum();
    let mut start = 0.0_f32;
    values
        .iter()
        .map(|v| {
            let sweep = if total > 0.0 {
                (v / total) as f32 * TAU
            } else {
                0.0
            };
            let span = (start, start + sweep);
            start += sweep;
            span
        })
        .collect()
}

/// Clockwise angle from twelve o'clock of `offset` (screen coordinates,
/// y pointing down).
fn angle_of(offset: Vec2) -> f32 {
    offset.x.atan2(-offset.y).rem_euclid(TAU)
}

fn point_at(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + Vec2::new(radius * angle.sin(), -radius * angle.cos())
}

/// Index of the slice under `offset` (relative to the centre), if the
/// offset lies on the ring.
pub fn slice_at(spans: &[(f32, f32)], offset: Vec2, inner: f32, outer: f32) -> Option<usize> {
    let r = offset.length();
    if r < inner || r > outer {
        return None;
    }
    let angle = angle_of(offset);
    spans
        .iter()
        .position(|&(start, end)| end > start && angle >= start && angle < end)
}

fn paint_slice(
    painter: &egui::Painter,
    center: Pos2,
    inner: f32,
    outer: f32,
    (start, end): (f32, f32),
    color: Color32,
) {
    let steps = ((end - start) / SEGMENT).ceil().max(1.0) as usize;
    let step = (end - start) / steps as f32;
    for i in 0..steps {
        let a0 = start + step * i as f32;
        let a1 = a0 + step;
        let quad = vec![
            point_at(center, outer, a0),
            point_at(center, outer, a1),
            point_at(center, inner, a1),
            point_at(center, inner, a0),
        ];
        painter.add(Shape::convex_polygon(quad, color, Stroke::NONE));
    }
}

/// Paint a donut chart. The slice under the pointer is pulled out and its
/// label and share shown in a tooltip. With `legend`, a percentage legend
/// follows the chart.
pub fn donut(ui: &mut Ui, title: &str, slices: &[PieSlice], legend: bool) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(title).strong().color(Color32::WHITE));
    });

    let values: Vec<f64> = slices.iter().map(|s| s.value).collect();
    let spans = slice_spans(&values);
    let shares = percentages(&values);

    let size = ui.available_width().min(320.0);
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
    let center = response.rect.center();
    let outer = size * 0.5 - PULL;
    let inner = outer * HOLE;

    let hovered = response
        .hover_pos()
        .and_then(|pos| slice_at(&spans, pos - center, inner, outer));

    for (i, (slice, span)) in slices.iter().zip(&spans).enumerate() {
        if span.1 <= span.0 {
            continue;
        }
        let mut slice_center = center;
        if hovered == Some(i) {
            let mid = (span.0 + span.1) * 0.5;
            slice_center = point_at(center, PULL, mid);
        }
        paint_slice(&painter, slice_center, inner, outer, *span, slice.color);
    }

    if let Some(i) = hovered {
        response.on_hover_text_at_pointer(format!("{}: {:.1}%", slices[i].label, shares[i]));
    }

    if legend {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for (slice, share) in slices.iter().zip(&shares) {
                let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), Sense::hover());
                ui.painter().rect_filled(rect, 2.0, slice.color);
                ui.label(format!("{} {:.1}%", slice.label, share));
                ui.add_space(8.0);
            }
        });
    }
}
