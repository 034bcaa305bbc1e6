use std::collections::HashMap;

use super::criteria::CriteriaConfiguration;
use super::domain::{CandidateObject, ObjectId};
use super::error::RankingError;

/// A candidate paired with its final preference score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry<'a> {
    pub object: &'a CandidateObject,
    /// Position of the object in the caller's input.
    pub position: usize,
    pub score: f64,
}

/// Orders final scores and applies the result limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultAssembler {
    limit: usize,
    ascending: bool,
}

impl ResultAssembler {
    pub fn new(limit: usize, ascending: bool) -> Self {
        Self { limit, ascending }
    }

    pub fn from_config(config: &CriteriaConfiguration) -> Self {
        Self::new(config.limit, config.ascending)
    }

    /// Ties keep the order in which scores were supplied.
    pub fn assemble<'a>(
        &self,
        objects: &'a [CandidateObject],
        scores: impl IntoIterator<Item = (ObjectId, f64)>,
    ) -> Result<Vec<RankedEntry<'a>>, RankingError> {
        let by_id: HashMap<&ObjectId, (usize, &CandidateObject)> = objects
            .iter()
            .enumerate()
            .map(|(position, object)| (&object.id, (position, object)))
            .collect();

        let mut entries = scores
            .into_iter()
            .map(|(id, score)| {
                let (position, object) = by_id
                    .get(&id)
                    .copied()
                    .ok_or(RankingError::UnknownObject(id))?;
                Ok(RankedEntry {
                    object,
                    position,
                    score,
                })
            })
            .collect::<Result<Vec<_>, RankingError>>()?;

        if self.ascending {
            entries.sort_by(|a, b| a.score.total_cmp(&b.score));
        } else {
            entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        }
        entries.truncate(self.limit);

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objects() -> Vec<CandidateObject> {
        ["a", "b", "c", "d"]
            .into_iter()
            .map(|id| CandidateObject::new(id, id.to_uppercase()))
            .collect()
    }

    fn scores() -> Vec<(ObjectId, f64)> {
        vec![
            (ObjectId::from("a"), 0.4),
            (ObjectId::from("b"), 0.9),
            (ObjectId::from("c"), 0.4),
            (ObjectId::from("d"), 0.1),
        ]
    }

    #[test]
    fn sorts_descending_and_keeps_tie_order() {
        let objects = objects();
        let ranked = ResultAssembler::new(10, false)
            .assemble(&objects, scores())
            .expect("assembles");

        let ids: Vec<&str> = ranked.iter().map(|entry| entry.object.id.0.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c", "d"]);
        assert_eq!(ranked[0].position, 1);
    }

    #[test]
    fn sorts_ascending_and_truncates() {
        let objects = objects();
        let ranked = ResultAssembler::new(3, true)
            .assemble(&objects, scores())
            .expect("assembles");

        let ids: Vec<&str> = ranked.iter().map(|entry| entry.object.id.0.as_str()).collect();
        assert_eq!(ids, vec!["d", "a", "c"]);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let objects = objects();
        let err = ResultAssembler::new(3, false)
            .assemble(&objects, vec![(ObjectId::from("zz"), 1.0)])
            .expect_err("unknown id fails");

        assert_eq!(err, RankingError::UnknownObject(ObjectId::from("zz")));
        assert!(!err.is_caller_error());
    }
}
