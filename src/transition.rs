/// Day ↔ night transition state machine.
///
/// | State                   | Event        | Next                                   |
/// |-------------------------|--------------|----------------------------------------|
/// | idle(Day)               | `toggle()`   | active(cur = Day, tgt = Night, p = 0)  |
/// | idle(Night)             | `toggle()`   | active(cur = Night, tgt = Day, p = 0)  |
/// | active(p < 1)           | `update(dt)` | active(p += dt / duration)             |
/// | active(p reaches ≥ 1)   | `update(dt)` | idle(cur = tgt)                        |
/// | active                  | `toggle()`   | active(tgt = opposite(tgt), p kept)    |
///
/// Reversing mid-flight keeps `progress` and `current`, so the blend pair
/// changes on the next update while the eased factor carries on from where
/// it was.  The visible jump this produces is kept as-is.
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::lighting::LightingState;

/// Default seconds a full day ↔ night transition takes.
pub const DEFAULT_TRANSITION_SECONDS: f32 = 2.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPhase {
    Day = 0,
    Night = 1,
}

impl DayPhase {
    pub fn opposite(self) -> Self {
        match self {
            DayPhase::Day => DayPhase::Night,
            DayPhase::Night => DayPhase::Day,
        }
    }

    /// 0.0 for day, 1.0 for night.
    pub fn as_value(self) -> f32 {
        self as u8 as f32
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Seconds per transition.  Non-positive or non-finite values complete a transition on
    /// the first update after it starts.
    pub transition_duration: f32,
    pub start_phase: DayPhase,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            transition_duration: DEFAULT_TRANSITION_SECONDS,
            start_phase: DayPhase::Day,
        }
    }
}

/// Progress of the current (or last) transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionState {
    pub current: DayPhase,
    pub target: DayPhase,
    /// In `[0, 1]`.
    pub progress: f32,
    pub is_transitioning: bool,
    pub duration: f32,
}

/// Receiver of the blended lighting, typically the renderer.
pub trait SceneStateSink {
    /// Takes a complete lighting snapshot; called once per active frame.
    fn apply(&mut self, state: &LightingState);

    /// Receives the running clock every frame, transitioning or not.
    fn advance_time(&mut self, _elapsed: f32) {}
}

/// `4t³` below the midpoint, `1 − (−2t + 2)³ / 2` above it.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

pub struct LightingStateMachine {
    day: LightingState,
    night: LightingState,
    transition: TransitionState,
    blended: LightingState,
}

impl LightingStateMachine {
    pub fn new(config: &LightingConfig) -> Self {
        let day = LightingState::day();
        let night = LightingState::night();
        let start = config.start_phase;
        let blended = match start {
            DayPhase::Day => day.clone(),
            DayPhase::Night => night.clone(),
        };
        let mut machine = Self {
            day,
            night,
            transition: TransitionState {
                current: start,
                target: start,
                progress: 0.0,
                is_transitioning: false,
                duration: DEFAULT_TRANSITION_SECONDS,
            },
            blended,
        };
        machine.set_duration(config.transition_duration);
        machine
    }

    pub fn set_duration(&mut self, seconds: f32) {
        if !(seconds > 0.0 && seconds.is_finite()) {
            warn!(
                "transition duration {seconds} is not a positive finite number; \
                 transitions will complete in one update"
            );
        }
        self.transition.duration = seconds;
    }

    pub fn transition(&self) -> &TransitionState {
        &self.transition
    }

    /// The most recently pushed lighting (the start preset before any push).
    pub fn blended(&self) -> &LightingState {
        &self.blended
    }

    pub fn preset(&self, phase: DayPhase) -> &LightingState {
        match phase {
            DayPhase::Day => &self.day,
            DayPhase::Night => &self.night,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_transitioning
    }

    pub fn is_day(&self) -> bool {
        !self.transition.is_transitioning && self.transition.current == DayPhase::Day
    }

    pub fn is_night(&self) -> bool {
        !self.transition.is_transitioning && self.transition.current == DayPhase::Night
    }

    pub fn toggle(&mut self) {
        let t = &mut self.transition;
        if t.is_transitioning {
            t.target = t.target.opposite();
            debug!(
                "lighting transition reversed towards {:?} at progress {:.3}",
                t.target, t.progress
            );
        } else {
            t.target = t.current.opposite();
            t.is_transitioning = true;
            t.progress = 0.0;
            debug!("lighting transition {:?} -> {:?} started", t.current, t.target);
        }
    }

    /// Advances the transition by `delta` seconds and pushes the blended
    /// state to `sink`.  `elapsed` is forwarded every call.
    ///
    /// Returns `true` when a state was pushed; idle frames push nothing.
    pub fn update<S: SceneStateSink + ?Sized>(
        &mut self,
        delta: f32,
        elapsed: f32,
        sink: &mut S,
    ) -> bool {
        sink.advance_time(elapsed);
        if !self.transition.is_transitioning {
            return false;
        }

        let t = &mut self.transition;
        let step = if t.duration > 0.0 && t.duration.is_finite() {
            delta / t.duration
        } else {
            1.0
        };
        t.progress = if step.is_finite() {
            (t.progress + step).max(0.0)
        } else {
            1.0
        };
        if t.progress >= 1.0 {
            t.progress = 1.0;
            t.current = t.target;
            t.is_transitioning = false;
            debug!("lighting transition settled on {:?}", t.current);
        }

        let eased = ease_in_out_cubic(t.progress);
        let (current, target) = (t.current, t.target);
        self.blended = LightingState::blend(self.preset(current), self.preset(target), eased);
        sink.apply(&self.blended);
        true
    }

    /// Pushes the current lighting unconditionally, e.g. on the first frame.
    pub fn sync<S: SceneStateSink + ?Sized>(&self, sink: &mut S) {
        sink.apply(&self.blended);
    }

    /// Continuous day (0) to night (1) position of the lighting.
    pub fn current_value(&self) -> f32 {
        let t = &self.transition;
        if !t.is_transitioning {
            return t.current.as_value();
        }
        let direction = if t.target > t.current { 1.0 } else { -1.0 };
        // A reversal back onto `current` would otherwise run below 0 or above 1.
        (t.current.as_value() + direction * ease_in_out_cubic(t.progress)).clamp(0.0, 1.0)
    }
}

impl Default for LightingStateMachine {
    fn default() -> Self {
        Self::new(&LightingConfig::default())
    }
}
