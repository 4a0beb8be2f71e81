use crate::error::WheelError;
use crate::select::{RandomSource, unit_draw};
use std::time::Duration;

/// Screen angle of the fixed pointer (12 o'clock, y axis pointing down).
pub const POINTER_ANGLE: f64 = -90.0;
pub const SPIN_DURATION: Duration = Duration::from_millis(6000);
pub const MIN_SPINS: u32 = 8;
pub const SPIN_SPREAD: u32 = 4;

pub type Easing = fn(f64) -> f64;

/// `1 - (1 - t)^5`, pinned to exactly 0 and 1 at the ends.
pub fn ease_out_quint(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        1.0 - (1.0 - t).powi(5)
    }
}

pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Rotation (mod 360) that puts the centre of sector `winner_index` under the pointer.
/// Sector width always comes from the full pool, never the thinned display set.
pub fn target_offset(winner_index: usize, total: usize) -> f64 {
    POINTER_ANGLE - (winner_index as f64 + 0.5) * (360.0 / total as f64)
}

/// Draws a whole number of turns in `[MIN_SPINS, MIN_SPINS + SPIN_SPREAD)`.
pub fn draw_spins<R: RandomSource>(rng: &mut R) -> u32 {
    let extra = (unit_draw(rng.next_u32()) * SPIN_SPREAD as f64).floor() as u32;
    MIN_SPINS + extra.min(SPIN_SPREAD - 1)
}

/// One spin, created once and consumed by the animation driver.
#[derive(Debug, Clone, Copy)]
pub struct SpinPlan {
    pub winner_index: usize,
    pub start_rotation: f64,
    pub target_rotation: f64,
    pub spins: u32,
    pub duration: Duration,
    pub easing: Easing,
}

impl SpinPlan {
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// At completion this returns `target_rotation` itself rather than an interpolated value.
    pub fn rotation_at(&self, elapsed: Duration) -> f64 {
        let progress = self.progress(elapsed);
        if progress >= 1.0 {
            return self.target_rotation;
        }
        let eased = (self.easing)(progress);
        self.start_rotation + (self.target_rotation - self.start_rotation) * eased
    }

    pub fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

pub struct RotationSolver;

impl RotationSolver {
    pub fn plan<R: RandomSource>(
        winner_index: usize,
        total: usize,
        current_rotation: f64,
        rng: &mut R,
    ) -> Result<SpinPlan, WheelError> {
        Self::plan_with_spins(winner_index, total, current_rotation, draw_spins(rng))
    }

    pub fn plan_with_spins(
        winner_index: usize,
        total: usize,
        current_rotation: f64,
        spins: u32,
    ) -> Result<SpinPlan, WheelError> {
        if total == 0 {
            return Err(WheelError::EmptyPool);
        }
        if winner_index >= total {
            return Err(WheelError::WinnerOutOfRange {
                index: winner_index,
                count: total,
            });
        }

        let offset = target_offset(winner_index, total);
        let to_next_turn = 360.0 - normalize_degrees(current_rotation);
        let target_rotation = current_rotation + spins as f64 * 360.0 + to_next_turn + offset;

        log::debug!(
            "Planned spin: winner={} spins={} offset={:.4} target={:.4}",
            winner_index,
            spins,
            offset,
            target_rotation
        );

        Ok(SpinPlan {
            winner_index,
            start_rotation: current_rotation,
            target_rotation,
            spins,
            duration: SPIN_DURATION,
            easing: ease_out_quint,
        })
    }
}
