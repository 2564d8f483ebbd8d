//! Allow-listed reference repair
//!
//! A vocabulary-constrained field that breaks any rule is regenerated whole:
//! the preferred identifier first, then other allowed identifiers in random
//! order, capped at the vocabulary's entry limit.

use std::collections::HashSet;

use blocksmith_schema::{KeyMint, ReferenceObject, ReferenceVocabulary};
use rand::seq::SliceRandom;
use serde_json::Value;

/// Result of checking one vocabulary field
#[derive(Debug, Clone, PartialEq)]
pub enum VocabularyRepair {
    /// Field already satisfies the vocabulary
    Unchanged,
    /// Field was regenerated
    Replaced {
        /// Fresh selection
        value: Value,
        /// What was wrong with the old value
        violations: Vec<String>,
    },
}

/// Check a field value and regenerate it if it breaks the vocabulary
pub fn repair_vocabulary(
    value: Option<&Value>,
    vocabulary: &ReferenceVocabulary,
    keys: &mut KeyMint<'_>,
) -> VocabularyRepair {
    let violations = vocabulary.violations(value);
    if violations.is_empty() {
        return VocabularyRepair::Unchanged;
    }
    VocabularyRepair::Replaced {
        value: generate_selection(vocabulary, keys),
        violations,
    }
}

/// Fresh selection: preferred first, then shuffled allowed identifiers
pub fn generate_selection(vocabulary: &ReferenceVocabulary, keys: &mut KeyMint<'_>) -> Value {
    let limit = vocabulary.max_entries.max(1);
    let mut seen = HashSet::from([vocabulary.preferred.as_str()]);
    let mut others: Vec<&str> = vocabulary
        .allowed
        .iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect();
    others.shuffle(keys.rng());

    let ids = std::iter::once(vocabulary.preferred.as_str())
        .chain(others)
        .take(limit);
    Value::Array(
        ids.map(|id| ReferenceObject::new(id).with_key(keys.mint()).to_value())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn vocabulary() -> ReferenceVocabulary {
        ReferenceVocabulary::new(
            ["ours", "a", "b", "c", "d", "e"].map(String::from).to_vec(),
            "ours",
        )
    }

    fn ids(value: &Value) -> Vec<String> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| ReferenceObject::from_value(v).unwrap().id)
            .collect()
    }

    #[test]
    fn valid_selection_is_kept() {
        let value = json!([
            {"type": "reference", "ref": "ours"},
            {"type": "reference", "ref": "b"}
        ]);
        let mut rng = StdRng::seed_from_u64(3);
        let mut keys = KeyMint::new(&mut rng);
        assert_eq!(
            repair_vocabulary(Some(&value), &vocabulary(), &mut keys),
            VocabularyRepair::Unchanged
        );
    }

    #[test]
    fn wrong_leader_is_regenerated() {
        let value = json!([
            {"type": "reference", "ref": "a"},
            {"type": "reference", "ref": "ours"}
        ]);
        let mut rng = StdRng::seed_from_u64(3);
        let mut keys = KeyMint::new(&mut rng);
        let VocabularyRepair::Replaced { value, violations } =
            repair_vocabulary(Some(&value), &vocabulary(), &mut keys)
        else {
            panic!("expected a replacement");
        };
        assert_eq!(violations.len(), 1);
        let ids = ids(&value);
        assert_eq!(ids[0], "ours");
        assert_eq!(ids.len(), 4);
        assert!(vocabulary().violations(Some(&value)).is_empty());
    }

    #[test]
    fn selection_is_unique_and_capped() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut keys = KeyMint::new(&mut rng);
            let value = generate_selection(&vocabulary(), &mut keys);
            let ids = ids(&value);
            let unique: HashSet<_> = ids.iter().collect();
            assert_eq!(unique.len(), ids.len());
            assert_eq!(ids[0], "ours");
            assert!(ids.len() <= 4);
        }
    }

    #[test]
    fn same_seed_same_selection() {
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut keys = KeyMint::new(&mut rng);
            generate_selection(&vocabulary(), &mut keys)
        };
        assert_eq!(pick(9), pick(9));
    }

    #[test]
    fn missing_field_is_generated() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut keys = KeyMint::new(&mut rng);
        let repaired = repair_vocabulary(None, &vocabulary(), &mut keys);
        assert!(matches!(repaired, VocabularyRepair::Replaced { .. }));
    }
}
