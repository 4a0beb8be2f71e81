use super::MIN_DISPLAY_COUNT;
use crate::participant::Participant;
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub participant_index: usize,
    /// Normalized name; may be empty, in which case the label is skipped when drawing.
    pub text: String,
}

/// The subset of the pool that is actually drawn this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySet {
    pub items: Vec<DisplayItem>,
    pub source_len: usize,
    pub angle_per_item: f64,
}

impl DisplaySet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_reduced(&self) -> bool {
        self.items.len() < self.source_len
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayItem> {
        self.items.iter()
    }

    /// Mid angle of the `slot`-th drawn item in radians, before wheel rotation.
    pub fn mid_angle(&self, slot: usize) -> f64 {
        (slot as f64 + 0.5) * self.angle_per_item
    }
}

fn spinning_target(pool: usize) -> usize {
    match pool {
        n if n > 2000 => 500,
        n if n > 1000 => 400,
        n if n > 500 => 300,
        n if n > 200 => 200,
        n => n,
    }
}

fn idle_target(pool: usize, max_display_cap: Option<usize>) -> usize {
    match max_display_cap.filter(|cap| *cap > 0) {
        Some(cap) if pool > cap => cap,
        Some(_) => pool,
        None if pool > 1000 => 800,
        None if pool > 700 => 700,
        None => pool,
    }
}

/// How many labels to draw. Spinning thins large pools to hold the frame budget;
/// idle honours the configured cap, else an automatic one for very large pools.
pub fn target_display_count(pool: usize, max_display_cap: Option<usize>, is_spinning: bool) -> usize {
    let target = if is_spinning {
        spinning_target(pool)
    } else {
        idle_target(pool, max_display_cap)
    };

    if target < pool {
        target.max(MIN_DISPLAY_COUNT).min(pool)
    } else {
        pool
    }
}

/// `floor(i * n / k)` for `i in 0..k`, with the final slot forced onto `n - 1`.
/// Spacing is uniform in index, not in arc length, when `n` is not a multiple of `k`.
pub fn sample_indices(n: usize, k: usize) -> Vec<usize> {
    if k >= n {
        return (0..n).collect();
    }
    if k == 0 {
        return Vec::new();
    }

    let mut indices: Vec<usize> = (0..k)
        .map(|i| ((i as u64 * n as u64) / k as u64) as usize)
        .collect();

    if let Some(last) = indices.last_mut()
        && *last != n - 1
    {
        *last = n - 1;
    }
    indices
}

pub fn compute_display_set(
    participants: &[Participant],
    max_display_cap: Option<usize>,
    is_spinning: bool,
) -> DisplaySet {
    let n = participants.len();
    let k = target_display_count(n, max_display_cap, is_spinning);

    let items: Vec<DisplayItem> = sample_indices(n, k)
        .into_iter()
        .map(|i| DisplayItem {
            participant_index: i,
            text: participants[i].normalized(),
        })
        .collect();

    let angle_per_item = if items.is_empty() {
        0.0
    } else {
        2.0 * PI / items.len() as f64
    };

    if items.len() < n {
        log::trace!("Display set reduced {} -> {}", n, items.len());
    }

    DisplaySet {
        items,
        source_len: n,
        angle_per_item,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> Vec<Participant> {
        (0..n).map(|i| Participant::new(format!("name {i}"))).collect()
    }

    #[test]
    fn test_spinning_tiers() {
        let cases = [
            (3000, 500),
            (2001, 500),
            (2000, 400),
            (1500, 400),
            (800, 300),
            (300, 200),
            (200, 200),
            (150, 150),
            (1, 1),
        ];
        for (n, expected) in cases {
            assert_eq!(target_display_count(n, None, true), expected, "n={n}");
            // the idle cap is ignored while spinning
            assert_eq!(target_display_count(n, Some(10), true), expected, "n={n}");
        }
    }

    #[test]
    fn test_idle_caps() {
        let cases = [
            (500, Some(100), 100),
            (500, Some(1000), 500),
            (5000, Some(1000), 1000),
            (1500, None, 800),
            (1500, Some(0), 800),
            (900, None, 700),
            (700, None, 700),
            (600, None, 600),
            (10, Some(1), 2),
        ];
        for (n, cap, expected) in cases {
            assert_eq!(target_display_count(n, cap, false), expected, "n={n} cap={cap:?}");
        }
    }

    #[test]
    fn test_large_spinning_pool_keeps_endpoints() {
        let names = pool(3000);
        let set = compute_display_set(&names, None, true);

        assert_eq!(set.len(), 500);
        assert!(set.is_reduced());
        assert_eq!(set.items.first().unwrap().participant_index, 0);
        assert_eq!(set.items.last().unwrap().participant_index, 2999);
        assert!(
            set.items
                .windows(2)
                .all(|w| w[0].participant_index < w[1].participant_index)
        );
        assert!((set.angle_per_item - 2.0 * PI / 500.0).abs() < 1e-12);
    }

    #[test]
    fn test_sampling_is_index_proportional() {
        assert_eq!(sample_indices(10, 4), vec![0, 2, 5, 9]);
        assert_eq!(sample_indices(9, 3), vec![0, 3, 8]);
        assert_eq!(sample_indices(5, 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(sample_indices(5, 2), vec![0, 4]);
    }

    #[test]
    fn test_display_set_bounds_hold_for_all_sizes() {
        for n in (1..=3000).step_by(37).chain([1, 2, 201, 701, 1001, 2001]) {
            let names = pool(n);
            for (cap, spinning) in [(None, true), (None, false), (Some(50), false), (Some(3), false)] {
                let set = compute_display_set(&names, cap, spinning);
                let limit = target_display_count(n, cap, spinning);
                assert!(!set.is_empty(), "n={n}");
                assert!(set.len() <= limit, "n={n} len={} limit={limit}", set.len());
                if set.is_reduced() {
                    assert_eq!(set.items[0].participant_index, 0);
                    assert_eq!(set.items[set.len() - 1].participant_index, n - 1);
                }
            }
        }
    }

    #[test]
    fn test_empty_pool_gives_empty_set() {
        let set = compute_display_set(&[], Some(10), false);
        assert!(set.is_empty());
        assert_eq!(set.angle_per_item, 0.0);
    }

    #[test]
    fn test_display_text_is_normalized() {
        let names = vec![Participant::new("  Ada   Lovelace "), Participant::new("   ")];
        let set = compute_display_set(&names, None, false);
        assert_eq!(set.items[0].text, "Ada Lovelace");
        assert_eq!(set.items[1].text, "");
    }
}
