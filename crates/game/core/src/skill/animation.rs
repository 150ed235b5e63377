//! Hit-event synchronization against normalized animation progress.
//!
//! Progress is `elapsed / duration` where `duration` is the clip length
//! divided by the effective playback speed. Each hit event fires exactly
//! once, in order, on the first tick where progress reaches its timestamp.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;

/// Identifies one animation request; echoed back on completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationToken(pub u64);

/// Indices of hit events crossed during one call.
pub type CrossedHits = ArrayVec<usize, { CombatConfig::MAX_HIT_EVENTS }>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkillAnimationController {
    hit_events: ArrayVec<f32, { CombatConfig::MAX_HIT_EVENTS }>,
    next_hit: usize,
    duration: f32,
    elapsed: f32,
    token: Option<AnimationToken>,
}

impl SkillAnimationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a clip lasting `duration` real seconds. Hit events
    /// are clamped into `[0, 1]` and sorted; NaN timestamps are dropped.
    pub fn start(&mut self, token: AnimationToken, duration: f32, hit_events: &[f32]) {
        self.hit_events = hit_events
            .iter()
            .filter(|event| !event.is_nan())
            .map(|event| event.clamp(0.0, 1.0))
            .take(CombatConfig::MAX_HIT_EVENTS)
            .collect();
        self.hit_events.sort_by(f32::total_cmp);
        self.next_hit = 0;
        self.duration = duration.max(CombatConfig::MIN_TIMING);
        self.elapsed = 0.0;
        self.token = Some(token);
    }

    pub fn is_playing(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<AnimationToken> {
        self.token
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Normalized progress in `[0, 1]`.
    pub fn normalized_progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            0.0
        }
    }

    pub fn remaining_hits(&self) -> usize {
        self.hit_events.len() - self.next_hit
    }

    /// Advances by `dt` and returns the hit events crossed. Playback stops
    /// once progress reaches 1.
    pub fn tick(&mut self, dt: f32) -> CrossedHits {
        let mut crossed = CrossedHits::new();
        if !self.is_playing() {
            return crossed;
        }
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        let progress = self.normalized_progress();

        while self.next_hit < self.hit_events.len() && progress >= self.hit_events[self.next_hit] {
            crossed.push(self.next_hit);
            self.next_hit += 1;
        }
        if progress >= 1.0 {
            self.token = None;
        }
        crossed
    }

    /// Playback finished externally. Returns every hit not yet fired if
    /// `token` matches the current clip.
    pub fn complete(&mut self, token: AnimationToken) -> CrossedHits {
        let mut crossed = CrossedHits::new();
        if self.token != Some(token) {
            return crossed;
        }
        crossed.extend(self.next_hit..self.hit_events.len());
        self.next_hit = self.hit_events.len();
        self.elapsed = self.duration;
        self.token = None;
        crossed
    }

    /// Stops playback without firing remaining hits.
    pub fn stop(&mut self) {
        self.token = None;
        self.next_hit = self.hit_events.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_fire_once_in_order() {
        let mut anim = SkillAnimationController::new();
        anim.start(AnimationToken(1), 2.0, &[0.25, 0.5, 0.9]);

        assert!(anim.tick(0.4).is_empty());
        assert_eq!(anim.tick(0.6).as_slice(), &[0, 1]);
        assert!(anim.tick(0.2).is_empty());
        assert_eq!(anim.tick(10.0).as_slice(), &[2]);
        assert!(!anim.is_playing());
        assert!(anim.tick(1.0).is_empty());
    }

    #[test]
    fn completion_flushes_remaining_hits() {
        let mut anim = SkillAnimationController::new();
        anim.start(AnimationToken(7), 1.0, &[0.2, 0.8]);
        assert_eq!(anim.tick(0.5).as_slice(), &[0]);

        assert!(anim.complete(AnimationToken(3)).is_empty());
        assert_eq!(anim.complete(AnimationToken(7)).as_slice(), &[1]);
        assert!(!anim.is_playing());
        assert_eq!(anim.normalized_progress(), 1.0);
    }

    #[test]
    fn unordered_events_fire_in_timestamp_order() {
        let mut anim = SkillAnimationController::new();
        anim.start(AnimationToken(4), 1.0, &[0.8, 0.2, f32::NAN, 1.5]);
        assert_eq!(anim.remaining_hits(), 3);

        assert_eq!(anim.tick(0.3).as_slice(), &[0]);
        assert_eq!(anim.tick(0.5).as_slice(), &[1]);
        assert_eq!(anim.tick(0.2).as_slice(), &[2]);
    }

    #[test]
    fn stop_discards_hits() {
        let mut anim = SkillAnimationController::new();
        anim.start(AnimationToken(2), 1.0, &[0.5]);
        anim.stop();
        assert_eq!(anim.remaining_hits(), 0);
        assert!(anim.tick(1.0).is_empty());
    }
}
