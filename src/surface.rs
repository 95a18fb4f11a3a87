use crate::color::Rgb;
use crate::trail::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn centered(x: f32, y: f32, size: f32) -> Self {
        Self {
            x: x - size * 0.5,
            y: y - size * 0.5,
            w: size,
            h: size,
        }
    }
}

/// Opacity of the gradient colour at `offset` (0 = centre, 1 = rim).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub blur: f32,
    pub color: Rgb,
}

/// Immediate-mode 2D target, in virtual pixel coordinates.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f32);
    fn fill_radial_gradient(
        &mut self,
        center: Point,
        radius: f32,
        color: Rgb,
        stops: &[GradientStop],
        alpha: f32,
    );
    fn stroke_polyline(&mut self, points: &[Point], width: f32, color: Rgb, alpha: f32);
    /// Applies to subsequent `fill_rect` calls until cleared with `None`.
    fn set_shadow(&mut self, shadow: Option<Shadow>);
}

/// Linear interpolation of stop opacity; outside the stops clamps to the ends.
pub fn stop_opacity(stops: &[GradientStop], t: f32) -> f32 {
    let Some(first) = stops.first() else {
        return 0.0;
    };
    if t <= first.offset {
        return first.opacity;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= f32::EPSILON {
                return b.opacity;
            }
            let k = (t - a.offset) / span;
            return a.opacity + (b.opacity - a.opacity) * k;
        }
    }
    stops[stops.len() - 1].opacity
}
