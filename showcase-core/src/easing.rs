/// Easing curves used by pose tweens and the loader reveal
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    #[default]
    Linear,
    Power2Out,
    Power3InOut,
    Power4InOut,
}

impl Ease {
    /// Map linear progress in `[0, 1]` onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power2Out => 1.0 - (1.0 - t).powi(2),
            Ease::Power3InOut => in_out(t, 3),
            Ease::Power4InOut => in_out(t, 4),
        }
    }
}

fn in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        0.5 * (2.0 * t).powi(power)
    } else {
        1.0 - 0.5 * (2.0 * (1.0 - t)).powi(power)
    }
}
