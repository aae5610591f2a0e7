// crates/ragdoll_core/src/animation/action.rs
use serde::{Deserialize, Serialize};

/// Timing of one loaded animation. Pose data stays with the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    #[default]
    Repeat,
    Once,
}

/// Linear interpolation over mixer time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl Ramp {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Playback state of one clip on a mixer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationAction {
    clip: AnimationClip,
    pub time: f32,
    pub weight: f32,
    pub time_scale: f32,
    pub enabled: bool,
    pub paused: bool,
    pub loop_mode: LoopMode,
    pub clamp_when_finished: bool,
    running: bool,
    fade: Option<Ramp>,
    warp: Option<Ramp>,
}

impl AnimationAction {
    pub fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            weight: 1.0,
            time_scale: 1.0,
            enabled: true,
            paused: false,
            loop_mode: LoopMode::Repeat,
            clamp_when_finished: false,
            running: false,
            fade: None,
            warp: None,
        }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn duration(&self) -> f32 {
        self.clip.duration
    }

    /// Schedules the action on its mixer.
    pub fn play(&mut self) -> &mut Self {
        self.running = true;
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.running = false;
        self.reset()
    }

    pub fn reset(&mut self) -> &mut Self {
        self.paused = false;
        self.enabled = true;
        self.time = 0.0;
        self.fade = None;
        self.warp = None;
        self
    }

    pub fn set_loop(&mut self, mode: LoopMode) -> &mut Self {
        self.loop_mode = mode;
        self
    }

    pub fn is_scheduled(&self) -> bool {
        self.running
    }

    pub fn is_running(&self) -> bool {
        self.running && self.enabled && !self.paused && self.effective_time_scale() != 0.0
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn fade_in(&mut self, duration: f32) -> &mut Self {
        self.fade = Some(Ramp::new(0.0, 1.0, duration));
        self
    }

    /// Ramps the weight to zero; the action disables itself when it gets there.
    pub fn fade_out(&mut self, duration: f32) -> &mut Self {
        self.fade = Some(Ramp::new(1.0, 0.0, duration));
        self
    }

    /// Ramps the effective time scale from `start` to `end`.
    pub fn warp(&mut self, start: f32, end: f32, duration: f32) -> &mut Self {
        self.warp = Some(Ramp::new(start, end, duration));
        self
    }

    /// Sets the weight and cancels any fade in progress.
    pub fn set_effective_weight(&mut self, weight: f32) -> &mut Self {
        self.weight = weight;
        self.fade = None;
        self
    }

    pub fn effective_weight(&self) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        self.weight * self.fade.map_or(1.0, |ramp| ramp.value())
    }

    /// Sets the time scale and cancels any warp in progress.
    pub fn set_effective_time_scale(&mut self, time_scale: f32) -> &mut Self {
        self.time_scale = time_scale;
        self.warp = None;
        self
    }

    pub fn effective_time_scale(&self) -> f32 {
        if self.paused {
            return 0.0;
        }
        match self.warp {
            Some(ramp) => ramp.value(),
            None => self.time_scale,
        }
    }

    /// Advances by `dt` seconds of mixer time. Returns true when a one-shot
    /// clip reached its end during this step.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        if !self.enabled {
            self.advance_fade(dt);
            return false;
        }

        let scale = self.advance_warp(dt);
        let finished = self.advance_time(dt * scale);
        self.advance_fade(dt);
        finished
    }

    fn advance_warp(&mut self, dt: f32) -> f32 {
        if self.paused {
            return 0.0;
        }
        let Some(ramp) = self.warp.as_mut() else {
            return self.time_scale;
        };
        ramp.elapsed += dt;
        let scale = ramp.value();
        if ramp.is_done() {
            self.warp = None;
            if scale == 0.0 {
                self.paused = true;
            } else {
                self.time_scale = scale;
            }
        }
        scale
    }

    fn advance_fade(&mut self, dt: f32) {
        let Some(ramp) = self.fade.as_mut() else {
            return;
        };
        ramp.elapsed += dt;
        if ramp.is_done() {
            let value = ramp.value();
            self.fade = None;
            if value == 0.0 {
                self.enabled = false;
            }
        }
    }

    fn advance_time(&mut self, delta: f32) -> bool {
        if delta == 0.0 {
            return false;
        }
        let duration = self.clip.duration;
        let time = self.time + delta;
        match self.loop_mode {
            LoopMode::Repeat => {
                self.time = if duration > 0.0 { time.rem_euclid(duration) } else { 0.0 };
                false
            }
            LoopMode::Once => {
                if (0.0..duration).contains(&time) {
                    self.time = time;
                    return false;
                }
                self.time = time.clamp(0.0, duration.max(0.0));
                if self.clamp_when_finished {
                    self.paused = true;
                } else {
                    self.enabled = false;
                }
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(duration: f32) -> AnimationAction {
        AnimationAction::new(AnimationClip::new("clip", duration))
    }

    #[test]
    fn idle_until_played() {
        let mut walk = action(1.0);
        assert!(!walk.advance(0.5));
        assert_eq!(walk.time, 0.0);

        walk.play();
        walk.advance(0.25);
        assert!((walk.time - 0.25).abs() < 1e-6);
        assert!(walk.is_running());
    }

    #[test]
    fn repeat_wraps_time() {
        let mut walk = action(1.0);
        walk.play();
        assert!(!walk.advance(1.25));
        assert!((walk.time - 0.25).abs() < 1e-6);
    }

    #[test]
    fn once_finishes_and_disables() {
        let mut jump = action(1.0);
        jump.set_loop(LoopMode::Once).play();
        assert!(!jump.advance(0.6));
        assert!(jump.advance(0.6));
        assert_eq!(jump.time, 1.0);
        assert!(!jump.enabled);
        assert_eq!(jump.effective_weight(), 0.0);
        assert!(!jump.advance(0.6));
    }

    #[test]
    fn clamped_once_pauses_on_last_frame() {
        let mut dance = action(2.0);
        dance.set_loop(LoopMode::Once).play();
        dance.clamp_when_finished = true;
        assert!(dance.advance(3.0));
        assert!(dance.paused);
        assert!(dance.enabled);
        assert_eq!(dance.time, 2.0);
        // Paused: no further finished events
        assert!(!dance.advance(1.0));
    }

    #[test]
    fn fade_out_disables_at_zero() {
        let mut idle = action(1.0);
        idle.play().fade_out(0.5);
        idle.advance(0.25);
        assert!((idle.effective_weight() - 0.5).abs() < 1e-6);
        idle.advance(0.25);
        assert!(!idle.enabled);
        assert!(!idle.is_fading());
    }

    #[test]
    fn set_effective_weight_cancels_fade() {
        let mut idle = action(1.0);
        idle.play().fade_in(1.0);
        idle.set_effective_weight(1.0);
        assert!(!idle.is_fading());
        assert_eq!(idle.effective_weight(), 1.0);
    }

    #[test]
    fn warp_settles_on_end_scale() {
        let mut run = action(1.0);
        run.play().warp(2.0, 1.0, 0.5);
        assert_eq!(run.effective_time_scale(), 2.0);
        run.advance(0.5);
        assert_eq!(run.time_scale, 1.0);
        assert_eq!(run.effective_time_scale(), 1.0);
    }
}
