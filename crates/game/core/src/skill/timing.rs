//! Cooldown and cast-time bookkeeping.

/// Timers owned by one skill controller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SkillTimesController {
    cooldown_duration: f32,
    cooldown_remaining: f32,
    cast_time: f32,
    cast_elapsed: f32,
    casting: bool,
}

impl SkillTimesController {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== cooldown =====

    pub fn start_cooldown(&mut self, seconds: f32) {
        let seconds = if seconds.is_nan() { 0.0 } else { seconds.max(0.0) };
        self.cooldown_duration = seconds;
        self.cooldown_remaining = seconds;
    }

    /// Counts the cooldown down by `dt`, flooring at zero. Returns true on
    /// the tick it reaches zero.
    pub fn tick_cooldown(&mut self, dt: f32) -> bool {
        if self.cooldown_remaining <= 0.0 {
            return false;
        }
        self.cooldown_remaining = (self.cooldown_remaining - dt.max(0.0)).max(0.0);
        self.cooldown_remaining == 0.0
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    pub fn is_on_cooldown(&self) -> bool {
        self.cooldown_remaining > 0.0
    }

    /// Remaining fraction in `[0, 1]`, for UI.
    pub fn cooldown_fraction(&self) -> f32 {
        if self.cooldown_duration > 0.0 {
            self.cooldown_remaining / self.cooldown_duration
        } else {
            0.0
        }
    }

    pub fn reset_cooldown(&mut self) {
        self.cooldown_remaining = 0.0;
    }

    // ===== cast =====

    pub fn begin_cast(&mut self, cast_time: f32) {
        self.cast_time = if cast_time.is_nan() { 0.0 } else { cast_time.max(0.0) };
        self.cast_elapsed = 0.0;
        self.casting = true;
    }

    pub fn tick_cast(&mut self, dt: f32) {
        if self.casting {
            self.cast_elapsed = (self.cast_elapsed + dt.max(0.0)).min(self.cast_time);
        }
    }

    pub fn is_casting(&self) -> bool {
        self.casting
    }

    pub fn is_cast_complete(&self) -> bool {
        self.casting && self.cast_elapsed >= self.cast_time
    }

    pub fn cast_time(&self) -> f32 {
        self.cast_time
    }

    pub fn cast_elapsed(&self) -> f32 {
        self.cast_elapsed
    }

    /// Cast progress in `[0, 1]`; 1 for instant casts.
    pub fn cast_progress(&self) -> f32 {
        if self.cast_time > 0.0 {
            self.cast_elapsed / self.cast_time
        } else {
            1.0
        }
    }

    pub fn end_cast(&mut self) {
        self.casting = false;
        self.cast_elapsed = 0.0;
    }
}
