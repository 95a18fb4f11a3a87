//! When and where rockets go up: the autonomous cadence, pointer launches
//! and the countdown that opens the show.

use std::time::Duration;

use crate::audio::{Cue, SoundSink};
use crate::color;
use crate::device::DeviceProfile;
use crate::rocket::Rocket;
use crate::schedule::Task;
use crate::sim::Simulation;

pub const SALVO_SIZE: usize = 5;
pub const SALVO_STAGGER: Duration = Duration::from_millis(300);
pub const AUTO_AFTER_SALVO: Duration = Duration::from_millis(2000);
pub const COUNTDOWN_STEP: Duration = Duration::from_millis(1000);
pub const LIFTOFF_DELAY: Duration = Duration::from_millis(1000);
/// Pause between the viewer starting the show and the first countdown beep.
pub const START_DELAY: Duration = Duration::from_millis(500);
const PAIR_STAGGER: Duration = Duration::from_millis(500);
const PAIR_CHANCE: f32 = 0.15;

/// Burst altitude band as fractions of surface height from the top.
pub fn burst_band(profile: &DeviceProfile) -> (f32, f32) {
    if profile.is_mobile() { (0.10, 0.35) } else { (0.15, 0.50) }
}

/// Pause before the next autonomous launch, in milliseconds.
pub fn relaunch_window(profile: &DeviceProfile) -> (u64, u64) {
    if profile.is_mobile() { (2800, 5000) } else { (2200, 4000) }
}

impl<S: SoundSink> Simulation<S> {
    /// One rocket from a random point on the bottom edge.
    pub fn launch_random(&mut self) {
        let x = self.rng.f32() * self.width;
        let (low, high) = burst_band(&self.profile);
        let min_y = self.height * low;
        let max_y = self.height * high;
        let target_y = min_y + self.rng.f32() * (max_y - min_y);
        let palette = color::random_palette(&mut self.rng);
        let rocket = Rocket::new(x, self.height, target_y, palette, &mut self.rng);
        self.spawn_rocket(rocket);
    }

    /// Pointer launch: straight up from below the pointer, bursting at its height.
    pub fn launch_at(&mut self, x: f32, y: f32) {
        let palette = color::random_palette(&mut self.rng);
        let rocket = Rocket::new(x, self.height, y, palette, &mut self.rng);
        self.spawn_rocket(rocket);
    }

    /// Keyboard launch: a random column, bursting in the upper third.
    pub fn launch_anywhere(&mut self) {
        let x = self.rng.f32() * self.width;
        let y = self.rng.f32() * self.height / 3.0;
        self.launch_at(x, y);
    }

    pub fn auto_launch(&mut self) {
        let count = if !self.profile.is_mobile() && self.rng.f32() < PAIR_CHANCE { 2 } else { 1 };
        self.launch_random();
        for i in 1..count {
            self.schedule_in(PAIR_STAGGER * i, Task::Launch);
        }

        let (min, max) = relaunch_window(&self.profile);
        let delay = Duration::from_millis(self.rng.u64(min..max));
        self.schedule_in(delay, Task::AutoLaunch);
    }

    /// The viewer asked for the show: count down from `from` after a short pause.
    pub fn arm_countdown(&mut self, from: u32) {
        if self.armed {
            return;
        }
        self.armed = true;
        self.schedule_in(START_DELAY, Task::StartCountdown(from));
    }

    /// Whether the show has been started.
    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Starts the opening countdown; later calls are ignored.
    pub fn start_countdown(&mut self, from: u32) {
        if self.countdown_started {
            return;
        }
        self.countdown_started = true;
        tracing::info!(from, "countdown");

        if from == 0 {
            self.liftoff();
            return;
        }
        self.countdown = Some(from);
        self.sound.play(Cue::CountdownBeep);
        self.schedule_in(COUNTDOWN_STEP, Task::CountdownTick);
    }

    pub(crate) fn countdown_tick(&mut self) {
        let Some(value) = self.countdown else {
            return;
        };
        let next = value.saturating_sub(1);
        self.countdown = Some(next);
        if next > 0 {
            self.sound.play(Cue::CountdownBeep);
            self.schedule_in(COUNTDOWN_STEP, Task::CountdownTick);
        } else {
            self.sound.play(Cue::CountdownZero);
            self.schedule_in(LIFTOFF_DELAY, Task::Liftoff);
        }
    }

    /// Countdown finished: salvo, then hand over to the autonomous cadence.
    pub(crate) fn liftoff(&mut self) {
        self.countdown = None;
        tracing::info!(rockets = SALVO_SIZE, "liftoff");
        for i in 0..SALVO_SIZE as u32 {
            self.schedule_in(SALVO_STAGGER * i, Task::Launch);
        }
        self.schedule_in(AUTO_AFTER_SALVO, Task::AutoLaunch);
    }
}
