//! Layered shell bursts.
//!
//! A primary burst emits five fixed-ratio layers sized by a device
//! multiplier. Full desktops also get delayed shrapnel: three small
//! sub-bursts a little way off the origin.

use std::f32::consts::TAU;
use std::time::Duration;

use crate::color::Palette;
use crate::device::DeviceProfile;
use crate::particle::{Particle, Tier};

/// Base counts per layer before the device multiplier.
pub const LAYERS: [(Tier, u32); 5] = [
    (Tier::Outer, 50),
    (Tier::Middle, 70),
    (Tier::Inner, 55),
    (Tier::Spark, 80),
    (Tier::Glitter, 40),
];

pub const SECONDARY_DELAY: Duration = Duration::from_millis(200);
pub const SECONDARY_BURSTS: usize = 3;
pub const SECONDARY_BASE: u32 = 25;
const SECONDARY_OFFSET: (f32, f32) = (30.0, 80.0);

/// Device multiplier in whole percent so counts floor exactly.
pub fn multiplier_percent(profile: &DeviceProfile) -> u32 {
    if profile.is_small_mobile() {
        40
    } else if profile.is_mobile() {
        50
    } else {
        85
    }
}

pub fn scaled(base: u32, percent: u32) -> usize {
    (base * percent / 100) as usize
}

/// Pending shrapnel, fired [`SECONDARY_DELAY`] after the primary burst.
#[derive(Clone, Debug)]
pub struct Secondary {
    pub x: f32,
    pub y: f32,
    pub palette: &'static Palette,
    pub percent: u32,
}

pub struct Burst {
    pub particles: Vec<Particle>,
    pub secondary: Option<Secondary>,
}

pub fn primary(
    x: f32,
    y: f32,
    palette: &'static Palette,
    profile: &DeviceProfile,
    rng: &mut fastrand::Rng,
) -> Burst {
    let percent = multiplier_percent(profile);
    let total: usize = LAYERS.iter().map(|&(_, base)| scaled(base, percent)).sum();

    let mut particles = Vec::with_capacity(total);
    for (tier, base) in LAYERS {
        for _ in 0..scaled(base, percent) {
            particles.push(Particle::new(x, y, palette, tier, profile, rng));
        }
    }

    let secondary = (!profile.is_mobile()).then(|| Secondary { x, y, palette, percent });
    Burst { particles, secondary }
}

/// Shrapnel uses the profile current when it fires, not when it was queued.
pub fn secondary(
    shell: &Secondary,
    profile: &DeviceProfile,
    rng: &mut fastrand::Rng,
    out: &mut Vec<Particle>,
) {
    let per_burst = scaled(SECONDARY_BASE, shell.percent);
    out.reserve(per_burst * SECONDARY_BURSTS);
    for _ in 0..SECONDARY_BURSTS {
        let offset = SECONDARY_OFFSET.0 + rng.f32() * (SECONDARY_OFFSET.1 - SECONDARY_OFFSET.0);
        let angle = rng.f32() * TAU;
        let mx = shell.x + angle.cos() * offset;
        let my = shell.y + angle.sin() * offset;
        for _ in 0..per_burst {
            out.push(Particle::new(mx, my, shell.palette, Tier::Mini, profile, rng));
        }
    }
}
