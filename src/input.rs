/// Rising-edge detection for the day/night toggle key.
use crate::transition::LightingStateMachine;

/// Turns a held/released key level into discrete presses.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToggleKey {
    was_pressed: bool,
}

impl ToggleKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds this frame's key level; returns `true` only on the frame the
    /// key goes down.
    pub fn observe(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        edge
    }

    /// Toggles `machine` on a rising edge.  Returns whether it toggled.
    pub fn drive(&mut self, pressed: bool, machine: &mut LightingStateMachine) -> bool {
        let edge = self.observe(pressed);
        if edge {
            machine.toggle();
        }
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::DayPhase;

    #[test]
    fn only_rising_edges_fire() {
        let mut key = ToggleKey::new();
        let levels = [false, true, true, true, false, true, false, false];
        let fired: Vec<bool> = levels.iter().map(|&l| key.observe(l)).collect();
        assert_eq!(
            fired,
            vec![false, true, false, false, false, true, false, false]
        );
    }

    #[test]
    fn holding_the_key_toggles_once() {
        let mut key = ToggleKey::new();
        let mut machine = LightingStateMachine::default();
        for _ in 0..10 {
            key.drive(true, &mut machine);
        }
        assert!(machine.is_transitioning());
        assert_eq!(machine.transition().target, DayPhase::Night);
    }
}
