//! Time-scheduled parameter automation.
//!
//! Events are kept sorted by their time. Between two events the value follows the
//! curve of the later event: a step for `Set`, a straight line for `Linear`, a
//! geometric curve for `Exponential`.

/// Exponential curves cannot reach zero; targets are clamped to this floor.
pub const EXP_FLOOR: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Curve {
    Set,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Event {
    time: f64,
    value: f64,
    curve: Curve,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    initial: f64,
    events: Vec<Event>,
}

impl Param {
    pub fn new(initial: f64) -> Self {
        Self {
            initial,
            events: Vec::new(),
        }
    }

    fn insert(&mut self, event: Event) {
        let at = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(at, event);
    }

    pub fn set_value_at(&mut self, value: f64, time: f64) -> &mut Self {
        self.insert(Event {
            time,
            value,
            curve: Curve::Set,
        });
        self
    }

    pub fn linear_ramp_to(&mut self, value: f64, end_time: f64) -> &mut Self {
        self.insert(Event {
            time: end_time,
            value,
            curve: Curve::Linear,
        });
        self
    }

    pub fn exponential_ramp_to(&mut self, value: f64, end_time: f64) -> &mut Self {
        self.insert(Event {
            time: end_time,
            value: value.max(EXP_FLOOR),
            curve: Curve::Exponential,
        });
        self
    }

    /// Freezes the curve at `time` and drops everything scheduled after it.
    pub fn cancel_and_hold(&mut self, time: f64) -> &mut Self {
        let held = self.value_at(time);
        self.events.retain(|e| e.time < time);
        self.set_value_at(held, time)
    }

    pub fn value_at(&self, time: f64) -> f64 {
        let (mut from_time, mut from_value) = (0.0, self.initial);

        for event in &self.events {
            if event.time <= time {
                from_time = event.time;
                from_value = event.value;
                continue;
            }

            let span = event.time - from_time;
            if span <= 0.0 {
                return from_value;
            }
            let progress = ((time - from_time) / span).clamp(0.0, 1.0);

            return match event.curve {
                Curve::Set => from_value,
                Curve::Linear => from_value + (event.value - from_value) * progress,
                Curve::Exponential => {
                    let start = from_value.max(EXP_FLOOR);
                    start * (event.value / start).powf(progress)
                }
            };
        }

        from_value
    }

    /// Time of the last scheduled event, if any.
    pub fn last_event_time(&self) -> Option<f64> {
        self.events.last().map(|e| e.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_plateau_then_exponential_decay() {
        let mut gain = Param::new(0.0);
        gain.set_value_at(0.06, 0.0)
            .set_value_at(0.06, 5.95)
            .exponential_ramp_to(0.001, 7.0);

        assert_abs_diff_eq!(gain.value_at(0.0), 0.06);
        assert_abs_diff_eq!(gain.value_at(3.0), 0.06);
        assert_abs_diff_eq!(gain.value_at(5.95), 0.06);
        assert_abs_diff_eq!(gain.value_at(7.0), 0.001, epsilon = 1e-12);
        assert_abs_diff_eq!(gain.value_at(9.0), 0.001, epsilon = 1e-12);

        let mid = gain.value_at(6.475);
        assert_abs_diff_eq!(mid, (0.06f64 * 0.001).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_linear_fade_in_out() {
        let mut gain = Param::new(0.0);
        gain.set_value_at(0.0, 1.0)
            .linear_ramp_to(0.2, 1.05)
            .set_value_at(0.2, 1.08)
            .linear_ramp_to(0.0, 1.18);

        assert_eq!(gain.value_at(0.5), 0.0);
        assert_abs_diff_eq!(gain.value_at(1.025), 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(gain.value_at(1.06), 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(gain.value_at(1.13), 0.1, epsilon = 1e-9);
        assert_eq!(gain.value_at(2.0), 0.0);
    }

    #[test]
    fn test_exponential_zero_target_is_floored() {
        let mut gain = Param::new(0.28);
        gain.exponential_ramp_to(0.0, 1.0);
        assert_abs_diff_eq!(gain.value_at(1.0), EXP_FLOOR);
        assert!(gain.value_at(0.5) > EXP_FLOOR);
    }

    #[test]
    fn test_cancel_and_hold_replaces_tail() {
        let mut gain = Param::new(0.0);
        gain.set_value_at(0.04, 0.0)
            .set_value_at(0.04, 5.6)
            .exponential_ramp_to(0.001, 7.0);

        gain.cancel_and_hold(2.0).exponential_ramp_to(0.001, 2.3);

        assert_abs_diff_eq!(gain.value_at(2.0), 0.04);
        assert_abs_diff_eq!(gain.value_at(2.3), 0.001, epsilon = 1e-12);
        assert_abs_diff_eq!(gain.value_at(5.0), 0.001, epsilon = 1e-12);
        assert_eq!(gain.last_event_time(), Some(2.3));
    }
}
