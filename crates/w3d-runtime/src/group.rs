use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use w3d_core::SelectionPolicy;

use crate::bind::EntityId;

/// Expands group targets. Owns the random source used by `OneRandom`.
#[derive(Debug, Clone)]
pub struct GroupResolver {
    rng: StdRng,
}

impl GroupResolver {
    /// Seeded for reproducible runs, or from OS entropy when `seed` is `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Members selected by `policy`: every member in order, or one member
    /// drawn uniformly (a fresh draw on every call).
    pub fn resolve(&mut self, members: &[EntityId], policy: SelectionPolicy) -> Vec<EntityId> {
        match policy {
            SelectionPolicy::All => members.to_vec(),
            SelectionPolicy::OneRandom => {
                if members.is_empty() {
                    return Vec::new();
                }
                let pick = self.rng.gen_range(0..members.len());
                vec![members[pick]]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<EntityId> {
        (0..n).map(EntityId::from_index).collect()
    }

    #[test]
    fn test_all_keeps_order() {
        let mut resolver = GroupResolver::new(Some(1));
        let members = ids(3);
        assert_eq!(resolver.resolve(&members, SelectionPolicy::All), members);
    }

    #[test]
    fn test_one_random_picks_a_member() {
        let mut resolver = GroupResolver::new(Some(1));
        let members = ids(4);
        for _ in 0..50 {
            let picked = resolver.resolve(&members, SelectionPolicy::OneRandom);
            assert_eq!(picked.len(), 1);
            assert!(members.contains(&picked[0]));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let members = ids(5);
        let mut a = GroupResolver::new(Some(42));
        let mut b = GroupResolver::new(Some(42));
        for _ in 0..20 {
            assert_eq!(
                a.resolve(&members, SelectionPolicy::OneRandom),
                b.resolve(&members, SelectionPolicy::OneRandom)
            );
        }
    }

    #[test]
    fn test_one_random_is_roughly_uniform() {
        let members = ids(2);
        let mut resolver = GroupResolver::new(Some(7));
        let first = (0..1000)
            .filter(|_| resolver.resolve(&members, SelectionPolicy::OneRandom)[0] == members[0])
            .count();
        assert!((400..=600).contains(&first), "first picked {} times", first);
    }
}
