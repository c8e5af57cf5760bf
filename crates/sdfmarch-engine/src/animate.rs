//! Time-based scene updates
//!
//! The evaluator only ever sees an immutable snapshot. Anything that changes
//! over time is an [`Animator`] applied to the [`SceneInput`] between frames.

use glam::Vec3;

use crate::scene::{SceneInput, SceneSource};

/// Frame rate of fixed-step animation when none is given
pub const DEFAULT_FPS: f32 = 24.0;

/// Mutates a frame's input as a function of elapsed time
pub trait Animator {
    /// Adjust `input` for `time` seconds since the animation started
    fn apply(&self, input: &mut SceneInput, time: f32);
}

/// Grows every primitive's first shape parameter at a constant rate.
///
/// Spheres swell, boxes stretch along X, tori widen, cones open and
/// cylinders lengthen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtraDrift {
    /// Units per second added to `extra.x`
    pub rate: f32,
}

impl Default for ExtraDrift {
    fn default() -> Self {
        Self { rate: 0.1 }
    }
}

impl Animator for ExtraDrift {
    fn apply(&self, input: &mut SceneInput, time: f32) {
        let offset = Vec3::new(self.rate * time, 0.0, 0.0);
        for primitive in &mut input.primitives {
            primitive.extra += offset;
        }
    }
}

/// A scene source advanced by a fixed timestep on every poll
#[derive(Debug, Clone)]
pub struct Animated<S, A> {
    source: S,
    animator: A,
    step: f32,
    frame: u64,
}

impl<S: SceneSource, A: Animator> Animated<S, A> {
    /// Animate `source` at `fps` frames per second
    pub fn new(source: S, animator: A, fps: f32) -> Self {
        let step = if fps > 0.0 { fps.recip() } else { DEFAULT_FPS.recip() };
        Self {
            source,
            animator,
            step,
            frame: 0,
        }
    }

    /// Time of the next frame in seconds
    pub fn time(&self) -> f32 {
        self.frame as f32 * self.step
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: SceneSource, A: Animator> SceneSource for Animated<S, A> {
    fn current_frame(&mut self) -> SceneInput {
        let mut input = self.source.current_frame();
        self.animator.apply(&mut input, self.time());
        self.frame += 1;
        input
    }
}
