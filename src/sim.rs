//! Frame scheduler and show state.
//!
//! [`Simulation`] owns the live rockets and particles, the device profile,
//! the RNG, the deferred-task queue and the sound sink. The host calls
//! [`Simulation::advance_to`] with the show clock and [`Simulation::frame`]
//! once per display refresh.

use std::time::Duration;

use crate::audio::{Cue, SoundSink};
use crate::color::{Palette, Rgb};
use crate::device::DeviceProfile;
use crate::explosion::{self, SECONDARY_DELAY};
use crate::particle::Particle;
use crate::rocket::Rocket;
use crate::schedule::{Task, TaskQueue};
use crate::surface::{Rect, Surface};

/// Above this many live stars a mobile device renders every other frame.
pub const FRAME_SKIP_THRESHOLD: usize = 80;
const AFTERGLOW_MOBILE: f32 = 0.08;
const AFTERGLOW_DESKTOP: f32 = 0.12;
/// A task this far behind the clock reschedules its follow-ups from `now`.
pub const MAX_LAG: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    Drawn,
    Skipped,
}

pub struct Simulation<S> {
    pub(crate) profile: DeviceProfile,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) rockets: Vec<Rocket>,
    pub(crate) particles: Vec<Particle>,
    pub(crate) tasks: TaskQueue,
    pub(crate) clock: Duration,
    pub(crate) rng: fastrand::Rng,
    pub(crate) sound: S,
    pub(crate) loaded_frames: u64,
    pub(crate) countdown: Option<u32>,
    pub(crate) countdown_started: bool,
    pub(crate) armed: bool,
}

impl<S: SoundSink> Simulation<S> {
    pub fn new(width: f32, height: f32, profile: DeviceProfile, rng: fastrand::Rng, sound: S) -> Self {
        Self {
            profile,
            width,
            height,
            rockets: Vec::new(),
            particles: Vec::new(),
            tasks: TaskQueue::new(),
            clock: Duration::ZERO,
            rng,
            sound,
            loaded_frames: 0,
            countdown: None,
            countdown_started: false,
            armed: false,
        }
    }

    /// Live entities keep the size and speed they were built with.
    pub fn resize(&mut self, width: f32, height: f32, profile: DeviceProfile) {
        if profile.tier() != self.profile.tier() || profile.scale_factor() != self.profile.scale_factor() {
            tracing::info!(
                width = profile.width(),
                tier = ?profile.tier(),
                scale = profile.scale_factor(),
                "device profile changed"
            );
        }
        self.width = width;
        self.height = height;
        self.profile = profile;
    }

    /// Runs every deferred task due by `now`, in deadline order.
    ///
    /// After a stall (suspended terminal) an overdue task still runs once,
    /// but with the clock at `now`, so a self-rescheduling chain does not
    /// replay every missed deadline.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some((deadline, task)) = self.tasks.pop_due(now) {
            if now.saturating_sub(deadline) > MAX_LAG {
                tracing::debug!(lag_ms = (now - deadline).as_millis() as u64, "late task");
                self.clock = self.clock.max(now);
            } else {
                self.clock = self.clock.max(deadline);
            }
            self.run(task);
        }
        self.clock = self.clock.max(now);
    }

    pub(crate) fn schedule_in(&mut self, delay: Duration, task: Task) {
        self.tasks.schedule(self.clock + delay, task);
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::Launch => self.launch_random(),
            Task::AutoLaunch => self.auto_launch(),
            Task::Shrapnel(shell) => {
                let before = self.particles.len();
                explosion::secondary(&shell, &self.profile, &mut self.rng, &mut self.particles);
                tracing::debug!(added = self.particles.len() - before, "shrapnel");
            }
            Task::StartCountdown(from) => self.start_countdown(from),
            Task::CountdownTick => self.countdown_tick(),
            Task::Liftoff => self.liftoff(),
        }
    }

    /// One display refresh: afterglow fade, rockets, then particles.
    ///
    /// Stars spawned by a rocket bursting this frame join the live set after
    /// the particle pass, so they are first updated on the next frame.
    pub fn frame<D: Surface + ?Sized>(&mut self, surface: &mut D) -> Frame {
        let mobile = self.profile.is_mobile();
        if mobile && self.particles.len() > FRAME_SKIP_THRESHOLD {
            self.loaded_frames += 1;
            if self.loaded_frames % 2 == 0 {
                tracing::trace!(live = self.particles.len(), "frame skipped");
                return Frame::Skipped;
            }
        }

        let afterglow = if mobile { AFTERGLOW_MOBILE } else { AFTERGLOW_DESKTOP };
        let full = Rect {
            x: 0.0,
            y: 0.0,
            w: surface.width(),
            h: surface.height(),
        };
        surface.fill_rect(full, Rgb::BLACK, afterglow);

        let profile = self.profile;
        let mut bursts = Vec::new();
        self.rockets.retain_mut(|rocket| {
            rocket.update(&profile);
            rocket.render(&mut *surface);
            if rocket.exploded() {
                bursts.push((rocket.x(), rocket.y(), rocket.palette()));
                false
            } else {
                true
            }
        });

        let mut fresh = Vec::new();
        for (x, y, palette) in bursts {
            fresh.extend(self.burst(x, y, palette));
        }

        let floor = surface.height();
        self.particles.retain_mut(|particle| {
            particle.update();
            particle.render(&mut *surface, &profile);
            !particle.is_spent(floor)
        });
        self.particles.append(&mut fresh);

        Frame::Drawn
    }

    /// Primary burst straight into the live set.
    pub fn explode(&mut self, x: f32, y: f32, palette: &'static Palette) {
        let stars = self.burst(x, y, palette);
        self.particles.extend(stars);
    }

    fn burst(&mut self, x: f32, y: f32, palette: &'static Palette) -> Vec<Particle> {
        let burst = explosion::primary(x, y, palette, &self.profile, &mut self.rng);
        tracing::debug!(x, y, stars = burst.particles.len(), shrapnel = burst.secondary.is_some(), "burst");
        if let Some(shell) = burst.secondary {
            self.schedule_in(SECONDARY_DELAY, Task::Shrapnel(shell));
        }
        self.sound.play(Cue::Explosion);
        burst.particles
    }

    pub(crate) fn spawn_rocket(&mut self, rocket: Rocket) {
        tracing::debug!(x = rocket.x(), target = rocket.target_y(), "launch");
        self.sound.play(Cue::Launch);
        self.rockets.push(rocket);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Digit to show while the countdown runs.
    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }
}
