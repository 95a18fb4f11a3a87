use crate::color::{Palette, Rgb};
use crate::device::DeviceProfile;
use crate::surface::{Rect, Surface};
use crate::trail::Trail;

const LAUNCH_VELOCITY: f32 = -12.0;
const GRAVITY: f32 = 0.15;
const TRAIL_MOBILE: usize = 5;
const TRAIL_DESKTOP: usize = 7;
const TRAIL_COLOR: Rgb = Rgb::hex(0xffaa44);

#[derive(Clone, Debug)]
pub struct Rocket {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    target_y: f32,
    palette: &'static Palette,
    trail: Trail,
    exploded: bool,
}

impl Rocket {
    pub fn new(x: f32, y: f32, target_y: f32, palette: &'static Palette, rng: &mut fastrand::Rng) -> Self {
        Self {
            x,
            y,
            vx: (rng.f32() - 0.5) * 2.0,
            vy: LAUNCH_VELOCITY,
            target_y,
            palette,
            trail: Trail::new(TRAIL_DESKTOP),
            exploded: false,
        }
    }

    pub fn update(&mut self, profile: &DeviceProfile) {
        let capacity = if profile.is_mobile() { TRAIL_MOBILE } else { TRAIL_DESKTOP };
        self.trail.set_capacity(capacity);
        self.trail.push(self.x, self.y);

        self.x += self.vx;
        self.y += self.vy;
        self.vy += GRAVITY;

        // Apex also counts, so a shell that never reaches its mark still bursts.
        if self.y <= self.target_y || self.vy >= 0.0 {
            self.exploded = true;
        }
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let len = self.trail.len() as f32;
        for (i, point) in self.trail.iter().enumerate() {
            let alpha = i as f32 / len * 0.5;
            surface.fill_rect(Rect::centered(point.x, point.y, 2.0), TRAIL_COLOR, alpha);
        }
        surface.fill_rect(Rect::centered(self.x, self.y, 4.0), Rgb::WHITE, 1.0);
    }

    pub fn exploded(&self) -> bool {
        self.exploded
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn target_y(&self) -> f32 {
        self.target_y
    }

    pub fn palette(&self) -> &'static Palette {
        self.palette
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }
}
