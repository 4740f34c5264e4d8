use std::collections::VecDeque;

use super::database::{Catalog, CatalogError};
use super::types::AnimationId;

impl Catalog {
    /// Referential integrity plus reachability of every animation.
    ///
    /// The simulation itself only bounds-checks ids; this is the check
    /// catalog authors run before shipping.
    pub fn validate(&self) -> Result<(), CatalogError> {
        self.check_references()?;
        let unreachable = self.unreachable();
        if unreachable.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Unreachable { ids: unreachable })
        }
    }

    pub fn check_references(&self) -> Result<(), CatalogError> {
        for animation in self.animations() {
            for target in animation.successors() {
                if self.get(target).is_none() {
                    return Err(CatalogError::DanglingReference {
                        from: animation.id,
                        to: target,
                    });
                }
            }
        }
        Ok(())
    }

    /// Animations that cannot be reached from the first, entrance or default
    /// choice lists, or from the fallback, falling and dragging roles.
    pub fn unreachable(&self) -> Vec<AnimationId> {
        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::from(self.roots());

        while let Some(id) = queue.pop_front() {
            let Some(index) = id.index().filter(|index| *index < seen.len()) else {
                continue;
            };
            if seen[index] {
                continue;
            }
            seen[index] = true;
            if let Some(animation) = self.get(id) {
                queue.extend(animation.successors());
            }
        }

        self.animations()
            .iter()
            .zip(seen)
            .filter(|(_, reached)| !reached)
            .map(|(animation, _)| animation.id)
            .collect()
    }

    fn roots(&self) -> Vec<AnimationId> {
        let mut roots = vec![self.fallback(), self.falling(), self.dragging()];
        roots.extend(self.first_choice().iter());
        roots.extend(self.entrance_choice().iter());
        roots.extend(self.default_choice().iter());
        roots
    }
}
