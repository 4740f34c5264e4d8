use thiserror::Error;

use super::host::{Host, LogLevel};
use crate::catalog::AnimationId;

/// Starting value of the weight total. The extra slot leaves a small chance
/// that a draw lands past every entry and yields no animation.
pub const CHOICE_TOTAL_SEED: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChoiceListError {
    #[error("weighted choice list must not be empty")]
    Empty,
    #[error("weight for animation {id} must be greater than zero")]
    ZeroWeight { id: AnimationId },
    #[error("weighted choice total overflows")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceList {
    entries: Vec<(AnimationId, u32)>,
    total: u32,
}

impl ChoiceList {
    pub fn new(entries: Vec<(AnimationId, u32)>) -> Result<Self, ChoiceListError> {
        if entries.is_empty() {
            return Err(ChoiceListError::Empty);
        }
        let mut total = CHOICE_TOTAL_SEED;
        for (id, weight) in &entries {
            if *weight == 0 {
                return Err(ChoiceListError::ZeroWeight { id: *id });
            }
            total = total
                .checked_add(*weight)
                .ok_or(ChoiceListError::Overflow)?;
        }
        Ok(Self { entries, total })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn entries(&self) -> &[(AnimationId, u32)] {
        &self.entries
    }

    pub fn contains(&self, id: AnimationId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = AnimationId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn choose(&self, host: &mut dyn Host) -> Option<AnimationId> {
        let draw = host.random_int(self.total);
        let mut cumulative = 0u32;
        for (id, weight) in &self.entries {
            cumulative += weight;
            if draw < cumulative {
                return Some(*id);
            }
        }
        host.log(
            LogLevel::Warn,
            &format!(
                "weighted choice exhausted: draw {draw} of {} matched no entry",
                self.total
            ),
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::host::{ScriptedHost, SystemHost};
    use crate::sim::position::Viewport;

    fn list() -> ChoiceList {
        ChoiceList::new(vec![
            (AnimationId(1), 6),
            (AnimationId(2), 3),
            (AnimationId(3), 1),
        ])
        .expect("valid list")
    }

    #[test]
    fn total_is_seeded_above_weight_sum() {
        assert_eq!(list().total(), 11);
    }

    #[test]
    fn cumulative_walk_maps_draws_to_entries() {
        let mut host = ScriptedHost::new(vec![0, 5, 6, 8, 9], Viewport::default());
        let choices = list();
        assert_eq!(choices.choose(&mut host), Some(AnimationId(1)));
        assert_eq!(choices.choose(&mut host), Some(AnimationId(1)));
        assert_eq!(choices.choose(&mut host), Some(AnimationId(2)));
        assert_eq!(choices.choose(&mut host), Some(AnimationId(2)));
        assert_eq!(choices.choose(&mut host), Some(AnimationId(3)));
    }

    #[test]
    fn draw_past_all_weights_warns_and_yields_none() {
        let mut host = ScriptedHost::new(vec![10], Viewport::default());
        assert_eq!(list().choose(&mut host), None);
        let logged = host.take_logged();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].0, LogLevel::Warn);
    }

    #[test]
    fn empirical_frequencies_match_weights() {
        let choices = list();
        let mut host = SystemHost::with_seed(7, Viewport::default());
        let draws = 110_000u32;
        let mut counts = [0u32; 4];
        for _ in 0..draws {
            match choices.choose(&mut host) {
                Some(id) => {
                    assert!(choices.contains(id));
                    counts[id.0 as usize] += 1;
                }
                None => counts[0] += 1,
            }
        }
        let expected = [1.0, 6.0, 3.0, 1.0];
        for (count, weight) in counts.iter().zip(expected) {
            let observed = *count as f64 / draws as f64;
            let wanted = weight / choices.total() as f64;
            assert!(
                (observed - wanted).abs() < 0.01,
                "observed={observed} wanted={wanted}"
            );
        }
    }

    #[test]
    fn rejects_bad_weights() {
        assert_eq!(ChoiceList::new(Vec::new()), Err(ChoiceListError::Empty));
        assert_eq!(
            ChoiceList::new(vec![(AnimationId(4), 0)]),
            Err(ChoiceListError::ZeroWeight { id: AnimationId(4) })
        );
        assert_eq!(
            ChoiceList::new(vec![(AnimationId(1), u32::MAX)]),
            Err(ChoiceListError::Overflow)
        );
    }

    #[test]
    fn iterates_member_ids() {
        let ids = list().iter().collect::<Vec<_>>();
        assert_eq!(ids, vec![AnimationId(1), AnimationId(2), AnimationId(3)]);
    }
}
