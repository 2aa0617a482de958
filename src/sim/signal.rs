//! Smile signal to jump trigger
//!
//! The webcam sampler reports a happiness level in [0, 1] roughly every
//! 200 ms. A jump fires only on the sample that crosses the threshold, so a
//! held smile produces one jump rather than one per sample.

use serde::{Deserialize, Serialize};

/// Edge detector over the happiness signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmileTrigger {
    threshold: f32,
    /// Previous sample was above threshold
    above: bool,
    /// Most recent (sanitized) level, for HUD display
    level: f32,
}

impl SmileTrigger {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            above: false,
            level: 0.0,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Last reported level
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Feed one sample; returns true if this sample fires a jump
    pub fn sample(&mut self, level: f32) -> bool {
        let level = if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, 1.0)
        };
        self.level = level;

        let above = level > self.threshold;
        let fired = above && !self.above;
        self.above = above;
        fired
    }

    /// Signal dropped or restarted: behave as if the level were 0
    pub fn reset(&mut self) {
        self.above = false;
        self.level = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_count(trigger: &mut SmileTrigger, levels: &[f32]) -> usize {
        levels.iter().filter(|&&l| trigger.sample(l)).count()
    }

    #[test]
    fn test_held_smile_fires_once() {
        let mut trigger = SmileTrigger::new(0.9);
        assert_eq!(fire_count(&mut trigger, &[0.95, 0.96, 0.97]), 1);
    }

    #[test]
    fn test_refires_after_dropping_below() {
        let mut trigger = SmileTrigger::new(0.9);
        assert_eq!(fire_count(&mut trigger, &[0.95, 0.2, 0.91, 0.92, 0.5, 0.99]), 3);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut trigger = SmileTrigger::new(0.9);
        assert!(!trigger.sample(0.9));
        assert!(trigger.sample(0.901));
    }

    #[test]
    fn test_reset_rearms() {
        let mut trigger = SmileTrigger::new(0.8);
        assert!(trigger.sample(0.85));
        trigger.reset();
        assert_eq!(trigger.level(), 0.0);
        assert!(trigger.sample(0.85));
    }

    #[test]
    fn test_out_of_range_levels() {
        let mut trigger = SmileTrigger::new(0.9);
        assert!(!trigger.sample(f32::NAN));
        assert!(trigger.sample(7.0));
        assert_eq!(trigger.level(), 1.0);
        assert!(!trigger.sample(-1.0));
        assert_eq!(trigger.level(), 0.0);
    }
}
