//! Burst stars and their per-tier kinematics.
//!
//! Every star is built from a row of [`TIERS`]; the table is the only place
//! tier-specific constants live. Size and speed are scaled by the device
//! profile once, at construction.

use std::f32::consts::TAU;

use crate::color::{self, ORANGE_RAMP, Palette, Rgb};
use crate::device::DeviceProfile;
use crate::surface::{GradientStop, Rect, Shadow, Surface};
use crate::trail::{Point, Trail};

const GRAVITY: f32 = 0.02;
const FRICTION: f32 = 0.993;
const EXPANSION_TICKS: u32 = 50;
const EXPANSION_FRICTION: f32 = 0.997;
const FADE_THRESHOLD: f32 = 0.3;
const COLOR_SHIFT_START: u32 = 30;
const COLOR_SHIFT_SPAN: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    Outer,
    Middle,
    Inner,
    Spark,
    Glitter,
    Mini,
    /// Fallback profile for stars that don't belong to a named layer.
    Fallback,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TierColor {
    Fixed(Rgb),
    Palette,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierSpec {
    pub speed: (f32, f32),
    pub size: (f32, f32),
    pub decay: f32,
    pub max_trail: usize,
    pub color: TierColor,
}

pub const TIERS: [(Tier, TierSpec); 7] = [
    (Tier::Outer, TierSpec { speed: (6.5, 9.0), size: (2.8, 4.6), decay: 0.0025, max_trail: 14, color: TierColor::Fixed(Rgb::hex(0xffaa44)) }),
    (Tier::Middle, TierSpec { speed: (5.0, 7.0), size: (2.0, 3.5), decay: 0.003, max_trail: 10, color: TierColor::Palette }),
    (Tier::Inner, TierSpec { speed: (3.5, 5.0), size: (1.5, 2.7), decay: 0.0035, max_trail: 8, color: TierColor::Palette }),
    (Tier::Spark, TierSpec { speed: (7.0, 10.0), size: (0.8, 1.6), decay: 0.005, max_trail: 6, color: TierColor::Fixed(Rgb::hex(0xffdd88)) }),
    (Tier::Glitter, TierSpec { speed: (2.0, 3.0), size: (1.2, 2.2), decay: 0.004, max_trail: 4, color: TierColor::Fixed(Rgb::hex(0xffffee)) }),
    (Tier::Mini, TierSpec { speed: (2.0, 4.0), size: (1.0, 2.0), decay: 0.007, max_trail: 5, color: TierColor::Palette }),
    (Tier::Fallback, TierSpec { speed: (3.0, 5.0), size: (1.5, 3.0), decay: 0.004, max_trail: 6, color: TierColor::Palette }),
];

impl Tier {
    pub fn spec(self) -> &'static TierSpec {
        let index = match self {
            Tier::Outer => 0,
            Tier::Middle => 1,
            Tier::Inner => 2,
            Tier::Spark => 3,
            Tier::Glitter => 4,
            Tier::Mini => 5,
            Tier::Fallback => 6,
        };
        &TIERS[index].1
    }

    fn glow_factor(self) -> f32 {
        match self {
            Tier::Outer | Tier::Glitter => 3.0,
            _ => 2.5,
        }
    }

    fn cools_down(self) -> bool {
        !matches!(self, Tier::Outer | Tier::Spark | Tier::Glitter)
    }
}

fn sample(range: (f32, f32), rng: &mut fastrand::Rng) -> f32 {
    range.0 + rng.f32() * (range.1 - range.0)
}

#[derive(Clone, Debug)]
pub struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    tier: Tier,
    color: Rgb,
    fading_color: Rgb,
    size: f32,
    alpha: f32,
    decay: f32,
    gravity: f32,
    age: u32,
    trail: Trail,
    twinkle_speed: Option<f32>,
}

impl Particle {
    pub fn new(
        x: f32,
        y: f32,
        palette: &Palette,
        tier: Tier,
        profile: &DeviceProfile,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let spec = tier.spec();
        let scale = profile.scale_factor();

        let angle = rng.f32() * TAU;
        let speed = sample(spec.speed, rng);
        let size = sample(spec.size, rng) * scale;
        let color = match spec.color {
            TierColor::Fixed(c) => c,
            TierColor::Palette => color::pick(palette, rng),
        };
        let twinkle_speed = (tier == Tier::Glitter).then(|| 0.05 + rng.f32() * 0.1);

        Self {
            x,
            y,
            vx: angle.cos() * speed * scale,
            vy: angle.sin() * speed * scale,
            tier,
            color,
            fading_color: color,
            size,
            alpha: 1.0,
            decay: spec.decay,
            gravity: GRAVITY * scale,
            age: 0,
            trail: Trail::new(spec.max_trail),
            twinkle_speed,
        }
    }

    pub fn update(&mut self) {
        self.age += 1;
        self.trail.push(self.x, self.y);

        // Bloom: looser drag and no gravity until the shell has opened.
        let expanding = self.age <= EXPANSION_TICKS;
        let friction = if expanding { EXPANSION_FRICTION } else { FRICTION };
        self.vx *= friction;
        self.vy *= friction;
        if !expanding {
            self.vy += self.gravity;
        }

        self.x += self.vx;
        self.y += self.vy;

        self.alpha -= self.decay;

        // Glitter pays the decay twice and twinkles by a factor in [0.4, 1].
        if let Some(speed) = self.twinkle_speed {
            let twinkle = 0.7 + (self.age as f32 * speed).sin() * 0.3;
            self.alpha = (self.alpha - self.decay).max(0.0) * twinkle;
        }

        if self.tier.cools_down()
            && self.age > COLOR_SHIFT_START
            && self.age < COLOR_SHIFT_START + COLOR_SHIFT_SPAN
        {
            let step = (2 * (self.age - COLOR_SHIFT_START) / COLOR_SHIFT_SPAN) as usize;
            self.fading_color = ORANGE_RAMP[step.min(ORANGE_RAMP.len() - 1)];
        }
    }

    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S, profile: &DeviceProfile) {
        let opacity = self.opacity();
        if opacity <= 0.0 {
            return;
        }

        let fading = self.alpha < FADE_THRESHOLD;
        let fade = if fading { self.alpha / FADE_THRESHOLD } else { 1.0 };
        let color = self.fading_color;

        if self.tier != Tier::Glitter && !fading && self.trail.len() > 1 {
            let width = self.size * 0.6;
            surface.stroke_polyline(self.trail.make_contiguous(), width, color, opacity * 0.5);
        }

        let size = if fading { self.size * (0.3 + fade * 0.7) } else { self.size };
        let radius = size * self.tier.glow_factor();
        let center = Point { x: self.x, y: self.y };
        if fading {
            let stops = [
                GradientStop { offset: 0.0, opacity: 1.0 },
                GradientStop { offset: 0.3, opacity: 0.6 * fade },
                GradientStop { offset: 0.7, opacity: 0.2 * fade },
                GradientStop { offset: 1.0, opacity: 0.0 },
            ];
            surface.fill_radial_gradient(center, radius, color, &stops, opacity);
        } else {
            let stops = [
                GradientStop { offset: 0.0, opacity: 1.0 },
                GradientStop { offset: 0.5, opacity: 0.4 },
                GradientStop { offset: 1.0, opacity: 0.0 },
            ];
            surface.fill_radial_gradient(center, radius, color, &stops, opacity);
        }

        let blur = match (profile.is_mobile(), fading) {
            (true, true) => 8.0,
            (true, false) => 5.0,
            (false, true) => 10.0,
            (false, false) => 6.0,
        };
        surface.set_shadow(Some(Shadow { blur, color }));
        surface.fill_rect(Rect::centered(self.x, self.y, size), color, opacity);
        surface.set_shadow(None);
    }

    /// Whether the scheduler should drop this star.
    pub fn is_spent(&self, surface_height: f32) -> bool {
        self.alpha <= 0.0 || self.y > surface_height
    }

    pub fn opacity(&self) -> f32 {
        self.alpha.clamp(0.0, 1.0)
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vy)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn base_color(&self) -> Rgb {
        self.color
    }

    pub fn color(&self) -> Rgb {
        self.fading_color
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTES;

    #[derive(Debug, PartialEq)]
    enum Op {
        Rect(Rect, Rgb, f32),
        Gradient { radius: f32, stops: Vec<GradientStop> },
        Stroke { points: usize, width: f32, alpha: f32 },
        Shadow(Option<Shadow>),
    }

    /// Keeps every draw call in order.
    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Surface for Recorder {
        fn width(&self) -> f32 {
            1280.0
        }
        fn height(&self) -> f32 {
            800.0
        }
        fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f32) {
            self.ops.push(Op::Rect(rect, color, alpha));
        }
        fn fill_radial_gradient(&mut self, _: Point, radius: f32, _: Rgb, stops: &[GradientStop], _: f32) {
            self.ops.push(Op::Gradient { radius, stops: stops.to_vec() });
        }
        fn stroke_polyline(&mut self, points: &[Point], width: f32, _: Rgb, alpha: f32) {
            self.ops.push(Op::Stroke { points: points.len(), width, alpha });
        }
        fn set_shadow(&mut self, shadow: Option<Shadow>) {
            self.ops.push(Op::Shadow(shadow));
        }
    }

    fn draw(p: &mut Particle, profile: &DeviceProfile) -> Vec<Op> {
        let mut surface = Recorder::default();
        p.render(&mut surface, profile);
        surface.ops
    }

    fn blur_of(ops: &[Op]) -> f32 {
        ops.iter()
            .find_map(|op| match op {
                Op::Shadow(Some(shadow)) => Some(shadow.blur),
                _ => None,
            })
            .unwrap()
    }

    fn desktop() -> DeviceProfile {
        DeviceProfile::from_width(1280.0)
    }

    fn spawn(tier: Tier, seed: u64) -> Particle {
        let mut rng = fastrand::Rng::with_seed(seed);
        Particle::new(400.0, 300.0, &PALETTES[0], tier, &desktop(), &mut rng)
    }

    #[test]
    fn construction_respects_tier_table() {
        for (tier, spec) in TIERS {
            for seed in 0..50 {
                let p = spawn(tier, seed);
                let (vx, vy) = p.velocity();
                let speed = (vx * vx + vy * vy).sqrt();
                assert!(speed >= spec.speed.0 - 1e-3 && speed <= spec.speed.1 + 1e-3, "{tier:?} speed {speed}");
                assert!(p.size() >= spec.size.0 && p.size() <= spec.size.1, "{tier:?} size");
                assert_eq!(p.trail().capacity(), spec.max_trail);
                match spec.color {
                    TierColor::Fixed(c) => assert_eq!(p.base_color(), c),
                    TierColor::Palette => assert!(PALETTES[0].contains(&p.base_color())),
                }
            }
        }
    }

    #[test]
    fn size_and_speed_scale_with_profile() {
        let phone = DeviceProfile::from_width(400.0);
        let mut a = fastrand::Rng::with_seed(9);
        let mut b = fastrand::Rng::with_seed(9);
        let big = Particle::new(0.0, 0.0, &PALETTES[1], Tier::Middle, &desktop(), &mut a);
        let small = Particle::new(0.0, 0.0, &PALETTES[1], Tier::Middle, &phone, &mut b);
        assert!((small.size() - big.size() * 0.6).abs() < 1e-5);
        assert!((small.velocity().0 - big.velocity().0 * 0.6).abs() < 1e-5);
    }

    #[test]
    fn alpha_never_increases() {
        for tier in [Tier::Outer, Tier::Spark, Tier::Glitter, Tier::Mini] {
            let mut p = spawn(tier, 11);
            let mut last = p.alpha();
            for _ in 0..500 {
                p.update();
                assert!(p.alpha() <= last);
                last = p.alpha();
            }
        }
    }

    #[test]
    fn gravity_is_suppressed_during_bloom() {
        let mut p = spawn(Tier::Inner, 4);
        let (_, vy0) = p.velocity();
        for _ in 0..EXPANSION_TICKS {
            p.update();
        }
        let expected = vy0 * EXPANSION_FRICTION.powi(EXPANSION_TICKS as i32);
        assert!((p.velocity().1 - expected).abs() < 1e-4);

        let (_, before) = p.velocity();
        p.update();
        let after = p.velocity().1;
        assert!((after - (before * FRICTION + GRAVITY)).abs() < 1e-5);
    }

    #[test]
    fn trail_stays_bounded() {
        let mut p = spawn(Tier::Outer, 5);
        for _ in 0..100 {
            p.update();
            assert!(p.trail().len() <= 14);
        }
        assert_eq!(p.trail().len(), 14);
    }

    #[test]
    fn color_steps_through_orange_ramp() {
        let mut p = spawn(Tier::Middle, 6);
        let base = p.base_color();
        for _ in 0..30 {
            p.update();
        }
        assert_eq!(p.color(), base);
        p.update();
        assert_eq!(p.age(), 31);
        assert_eq!(p.color(), ORANGE_RAMP[0]);
        while p.age() < 60 {
            p.update();
        }
        assert_eq!(p.color(), ORANGE_RAMP[1]);
        while p.age() < 120 {
            p.update();
        }
        assert_eq!(p.color(), ORANGE_RAMP[1]);
    }

    #[test]
    fn outer_spark_and_glitter_keep_their_color() {
        for tier in [Tier::Outer, Tier::Spark, Tier::Glitter] {
            let mut p = spawn(tier, 8);
            for _ in 0..80 {
                p.update();
            }
            assert_eq!(p.color(), p.base_color(), "{tier:?}");
        }
    }

    #[test]
    fn glitter_twinkle_burns_out_fast() {
        let mut p = spawn(Tier::Glitter, 12);
        let speed = p.twinkle_speed.unwrap();
        let decay = Tier::Glitter.spec().decay;

        let mut expected = 1.0f32;
        let mut culled = None;
        for age in 1..=300u32 {
            p.update();
            expected -= decay;
            expected = (expected - decay).max(0.0) * (0.7 + (age as f32 * speed).sin() * 0.3);
            assert!((p.alpha() - expected).abs() < 1e-6, "age {age}");
            if p.is_spent(f32::INFINITY) {
                culled = Some(age);
                break;
            }
        }
        let culled = culled.unwrap();
        // The twinkle factor drives alpha to zero long before 1 / decay ticks.
        assert!(culled < 60, "culled at {culled}");
        assert_eq!(p.opacity(), 0.0);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let mut a = spawn(Tier::Spark, 42);
        let mut b = spawn(Tier::Spark, 42);
        for _ in 0..150 {
            a.update();
            b.update();
            assert_eq!((a.x(), a.y()), (b.x(), b.y()));
            assert_eq!(a.alpha(), b.alpha());
        }
    }

    #[test]
    fn spent_when_faded_or_below_surface() {
        let mut p = spawn(Tier::Mini, 1);
        assert!(!p.is_spent(600.0));
        assert!(p.is_spent(299.0));
        let mut ticks = 0;
        while p.alpha() > 0.0 {
            p.update();
            ticks += 1;
        }
        assert!(p.is_spent(f32::INFINITY));
        // 1.0 / 0.007 rounds up to 143 steps, give or take float drift.
        assert!((142..=144).contains(&ticks));
    }

    #[test]
    fn bright_star_draws_trail_glow_and_core() {
        let mut p = spawn(Tier::Middle, 2);
        p.update();
        p.update();
        let ops = draw(&mut p, &desktop());
        let size = p.size();
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0], Op::Stroke { points: 2, width: size * 0.6, alpha: p.alpha() * 0.5 });
        match &ops[1] {
            Op::Gradient { radius, stops } => {
                assert!((radius - size * 2.5).abs() < 1e-5);
                let offsets: Vec<f32> = stops.iter().map(|s| s.offset).collect();
                assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
                assert_eq!(stops[1].opacity, 0.4);
            }
            other => panic!("expected gradient, got {other:?}"),
        }
        assert_eq!(ops[2], Op::Shadow(Some(Shadow { blur: 6.0, color: p.color() })));
        assert_eq!(ops[3], Op::Rect(Rect::centered(p.x(), p.y(), size), p.color(), p.alpha()));
        assert_eq!(ops[4], Op::Shadow(None));
    }

    #[test]
    fn single_point_trail_is_not_stroked() {
        let mut p = spawn(Tier::Inner, 2);
        p.update();
        let ops = draw(&mut p, &desktop());
        assert!(!ops.iter().any(|op| matches!(op, Op::Stroke { .. })));
    }

    #[test]
    fn outer_and_glitter_glow_wider_and_glitter_has_no_trail() {
        let mut outer = spawn(Tier::Outer, 3);
        outer.update();
        outer.update();
        let ops = draw(&mut outer, &desktop());
        assert!(matches!(ops[0], Op::Stroke { .. }));
        assert!(matches!(&ops[1], Op::Gradient { radius, .. } if (radius - outer.size() * 3.0).abs() < 1e-5));

        let mut glitter = spawn(Tier::Glitter, 3);
        glitter.update();
        glitter.update();
        assert!(glitter.trail().len() > 1);
        let ops = draw(&mut glitter, &desktop());
        assert!(!ops.iter().any(|op| matches!(op, Op::Stroke { .. })));
        assert!(matches!(&ops[0], Op::Gradient { radius, .. } if (radius - glitter.size() * 3.0).abs() < 1e-5));
    }

    #[test]
    fn fading_star_shrinks_and_drops_its_trail() {
        let mut p = spawn(Tier::Middle, 4);
        for _ in 0..5 {
            p.update();
        }
        p.alpha = 0.15;
        let ops = draw(&mut p, &desktop());
        assert!(!ops.iter().any(|op| matches!(op, Op::Stroke { .. })));

        // fade = 0.5, so the core is drawn at 0.3 + 0.35 of its size.
        let drawn = p.size() * 0.65;
        match &ops[0] {
            Op::Gradient { radius, stops } => {
                assert!((radius - drawn * 2.5).abs() < 1e-5);
                let offsets: Vec<f32> = stops.iter().map(|s| s.offset).collect();
                assert_eq!(offsets, vec![0.0, 0.3, 0.7, 1.0]);
                assert!((stops[1].opacity - 0.3).abs() < 1e-6);
                assert!((stops[2].opacity - 0.1).abs() < 1e-6);
            }
            other => panic!("expected gradient, got {other:?}"),
        }
        assert_eq!(blur_of(&ops), 10.0);
        match &ops[2] {
            Op::Rect(rect, _, alpha) => {
                assert!((rect.w - drawn).abs() < 1e-5);
                assert_eq!(*alpha, 0.15);
            }
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn mobile_blur_is_tighter() {
        let phone = DeviceProfile::from_width(600.0);
        let mut p = spawn(Tier::Inner, 5);
        p.update();
        assert_eq!(blur_of(&draw(&mut p, &phone)), 5.0);
        p.alpha = 0.2;
        assert_eq!(blur_of(&draw(&mut p, &phone)), 8.0);
    }

    #[test]
    fn dead_star_draws_nothing() {
        let mut p = spawn(Tier::Spark, 5);
        p.alpha = 0.0;
        assert!(draw(&mut p, &desktop()).is_empty());
    }
}
