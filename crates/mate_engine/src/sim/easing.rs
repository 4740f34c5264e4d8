/// Smallest per-step travel an eased scene may produce on a moving axis.
pub const MIN_STEP_DISTANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
}

pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

pub fn ease_in(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

/// Splits `total` into `steps` per-step deltas.
///
/// Eased distributions never move less than [`MIN_STEP_DISTANCE`] on a step
/// unless the average step is already below it, in which case the split is
/// uniform. The returned deltas always sum to `total`.
pub fn distribute(total: f64, steps: usize, easing: Easing) -> Vec<f64> {
    if steps == 0 {
        return Vec::new();
    }
    if total == 0.0 || !total.is_finite() {
        return vec![0.0; steps];
    }

    let count = steps as f64;
    let uniform = total / count;
    let magnitude = total.abs();
    if easing == Easing::Linear || magnitude / count < MIN_STEP_DISTANCE {
        return vec![uniform; steps];
    }

    let mut shares = (0..steps)
        .map(|index| {
            let from = ease_out(index as f64 / count);
            let to = ease_out((index + 1) as f64 / count);
            magnitude * (to - from)
        })
        .collect::<Vec<_>>();
    apply_step_floor(&mut shares, magnitude);

    if easing == Easing::EaseIn {
        shares.reverse();
    }
    let sign = total.signum();
    shares.into_iter().map(|share| share * sign).collect()
}

fn apply_step_floor(shares: &mut [f64], magnitude: f64) {
    let mut clamped = vec![false; shares.len()];
    loop {
        let mut newly_clamped = false;
        for (share, is_clamped) in shares.iter_mut().zip(clamped.iter_mut()) {
            if !*is_clamped && *share < MIN_STEP_DISTANCE {
                *share = MIN_STEP_DISTANCE;
                *is_clamped = true;
                newly_clamped = true;
            }
        }
        if !newly_clamped {
            break;
        }

        let clamped_count = clamped.iter().filter(|is_clamped| **is_clamped).count();
        let free_total: f64 = shares
            .iter()
            .zip(&clamped)
            .filter(|(_, is_clamped)| !**is_clamped)
            .map(|(share, _)| *share)
            .sum();
        if free_total <= 0.0 {
            break;
        }
        let scale = (magnitude - clamped_count as f64 * MIN_STEP_DISTANCE) / free_total;
        for (share, is_clamped) in shares.iter_mut().zip(&clamped) {
            if !*is_clamped {
                *share *= scale;
            }
        }
    }

    let residue = magnitude - shares.iter().sum::<f64>();
    if let Some(first) = shares.first_mut() {
        *first += residue;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn sum(values: &[f64]) -> f64 {
        values.iter().sum()
    }

    #[test]
    fn curves_hit_their_endpoints() {
        for curve in [linear, ease_in, ease_out] {
            assert_eq!(curve(0.0), 0.0);
            assert_eq!(curve(1.0), 1.0);
            assert_eq!(curve(2.0), 1.0);
        }
        assert!(ease_in(0.5) < linear(0.5));
        assert!(ease_out(0.5) > linear(0.5));
    }

    #[test]
    fn linear_split_is_uniform() {
        let deltas = distribute(-30.0, 6, Easing::Linear);
        assert_eq!(deltas, vec![-5.0; 6]);
    }

    #[test]
    fn ease_out_respects_floor_and_total() {
        for (total, steps) in [(40.0, 10usize), (-40.0, 10), (12.0, 20), (100.0, 7), (9.0, 18)] {
            let deltas = distribute(total, steps, Easing::EaseOut);
            assert_eq!(deltas.len(), steps);
            assert!((sum(&deltas) - total).abs() < EPSILON, "total={total}");
            for delta in &deltas {
                assert!(
                    delta.abs() >= MIN_STEP_DISTANCE - EPSILON,
                    "total={total} steps={steps} delta={delta}"
                );
                assert_eq!(delta.signum(), total.signum());
            }
        }
    }

    #[test]
    fn ease_out_decelerates() {
        let deltas = distribute(100.0, 10, Easing::EaseOut);
        assert!(deltas.windows(2).all(|pair| pair[0] >= pair[1] - EPSILON));
        assert!(deltas[0] > deltas[9]);
    }

    #[test]
    fn ease_in_mirrors_ease_out() {
        let out = distribute(60.0, 12, Easing::EaseOut);
        let mut mirrored = distribute(60.0, 12, Easing::EaseIn);
        mirrored.reverse();
        for (a, b) in out.iter().zip(&mirrored) {
            assert!((a - b).abs() < EPSILON);
        }
    }

    #[test]
    fn small_totals_fall_back_to_uniform() {
        let deltas = distribute(2.0, 8, Easing::EaseOut);
        assert_eq!(deltas, vec![0.25; 8]);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(distribute(10.0, 0, Easing::EaseOut).is_empty());
        assert_eq!(distribute(0.0, 3, Easing::EaseIn), vec![0.0; 3]);
        assert_eq!(distribute(f64::NAN, 2, Easing::Linear), vec![0.0; 2]);
    }
}
