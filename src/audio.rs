//! Sound cues the show emits. Synthesis lives elsewhere; a sink only
//! receives fire-and-forget cues.

use std::io::{Stderr, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Launch,
    Explosion,
    CountdownBeep,
    CountdownZero,
}

pub trait SoundSink {
    fn play(&mut self, cue: Cue);
}

impl<S: SoundSink + ?Sized> SoundSink for Box<S> {
    fn play(&mut self, cue: Cue) {
        (**self).play(cue);
    }
}

#[derive(Debug, Default)]
pub struct Silent;

impl SoundSink for Silent {
    fn play(&mut self, _cue: Cue) {}
}

/// Rings the terminal bell for bursts and countdown beeps.
pub struct Bell {
    out: Stderr,
}

impl Bell {
    pub fn new() -> Self {
        Self { out: std::io::stderr() }
    }
}

impl Default for Bell {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundSink for Bell {
    fn play(&mut self, cue: Cue) {
        if cue == Cue::Launch {
            return;
        }
        if let Err(err) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            tracing::warn!(?cue, %err, "bell write failed");
        }
    }
}

/// Keeps every cue in order.
#[derive(Debug, Default)]
pub struct CueLog {
    pub cues: Vec<Cue>,
}

impl CueLog {
    pub fn count(&self, cue: Cue) -> usize {
        self.cues.iter().filter(|c| **c == cue).count()
    }
}

impl SoundSink for CueLog {
    fn play(&mut self, cue: Cue) {
        self.cues.push(cue);
    }
}
