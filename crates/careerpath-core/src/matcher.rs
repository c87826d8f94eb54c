//! Career matching and personality profiling.
//!
//! Match percentage is cosine similarity between the student's aptitude
//! vector and a career's ideal vector, rescaled to `[0, 100]`:
//!
//! ```text
//! match = 100 * dot(user, ideal) / (|user| * |ideal|)
//! ```
//!
//! Cosine similarity does not depend on vector length, so raw sums and
//! hand-authored ideal vectors compare on the same scale. A zero vector on
//! either side yields 0.

use std::collections::BTreeMap;

use crate::catalog::CareerCatalog;
use crate::model::{
    AptitudeVector, CareerProfile, CareerRecommendation, Dimension, PersonalityEntry,
    PersonalityProfile,
};

/// Number of dimensions reported as dominant.
pub const DOMINANT_COUNT: usize = 3;

/// Ranked careers plus the per-dimension breakdown for one vector.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub recommendations: Vec<CareerRecommendation>,
    pub personality_profile: PersonalityProfile,
}

/// Ranks a catalog of careers against aptitude vectors.
pub struct RecommendationMatcher<'a> {
    catalog: &'a CareerCatalog,
}

impl<'a> RecommendationMatcher<'a> {
    pub fn new(catalog: &'a CareerCatalog) -> Self {
        Self { catalog }
    }

    /// Rank every career and build the personality profile.
    pub fn match_vector(&self, vector: &AptitudeVector) -> MatchOutcome {
        MatchOutcome {
            recommendations: self.recommend(vector),
            personality_profile: self.personality_profile(vector),
        }
    }

    /// Every catalog career, highest match first. Ties keep catalog order.
    pub fn recommend(&self, vector: &AptitudeVector) -> Vec<CareerRecommendation> {
        let mut recommendations: Vec<CareerRecommendation> = self
            .catalog
            .careers
            .iter()
            .map(|career| recommendation_for(career, vector))
            .collect();
        // sort_by is stable, which is what keeps ties in catalog order
        recommendations.sort_by(|a, b| b.match_percentage.total_cmp(&a.match_percentage));
        recommendations
    }

    /// Share of the total score per dimension. All zero when the total is 0.
    pub fn personality_profile(&self, vector: &AptitudeVector) -> PersonalityProfile {
        let total = vector.total();
        let entries: BTreeMap<Dimension, PersonalityEntry> = vector
            .iter()
            .map(|(dimension, score)| {
                let info = self.catalog.dimension_info(dimension);
                let percentage = if total == 0 {
                    0.0
                } else {
                    round_one_decimal(100.0 * f64::from(score) / total as f64)
                };
                (
                    dimension,
                    PersonalityEntry {
                        name: info.name,
                        description: info.description,
                        score,
                        percentage,
                    },
                )
            })
            .collect();
        PersonalityProfile::new(entries)
    }
}

fn recommendation_for(career: &CareerProfile, vector: &AptitudeVector) -> CareerRecommendation {
    CareerRecommendation {
        career: career.name.clone(),
        type_name: career.type_name.clone(),
        description: career.description.clone(),
        match_percentage: match_percentage(vector, &career.ideal_vector),
    }
}

/// Cosine similarity scaled to `[0, 100]` and rounded to one decimal.
pub fn match_percentage(user: &AptitudeVector, ideal: &AptitudeVector) -> f64 {
    let denominator = user.magnitude() * ideal.magnitude();
    if denominator == 0.0 {
        return 0.0;
    }
    round_one_decimal((100.0 * user.dot(ideal) / denominator).clamp(0.0, 100.0))
}

/// The `count` highest-scoring dimensions; ties resolve in canonical
/// R, I, A, S, E, C order.
pub fn dominant_dimensions(vector: &AptitudeVector, count: usize) -> Vec<Dimension> {
    let mut ranked: Vec<(Dimension, u32)> = vector.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(count).map(|(d, _)| d).collect()
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DimensionInfo;

    fn catalog_with(careers: &[(&str, AptitudeVector)]) -> CareerCatalog {
        CareerCatalog {
            dimensions: BTreeMap::new(),
            careers: careers
                .iter()
                .map(|(name, ideal)| CareerProfile {
                    name: (*name).into(),
                    type_name: "Test".into(),
                    description: String::new(),
                    ideal_vector: *ideal,
                })
                .collect(),
        }
    }

    #[test]
    fn personality_profile_two_question_scenario() {
        let catalog = CareerCatalog::builtin();
        let matcher = RecommendationMatcher::new(&catalog);
        let profile = matcher.personality_profile(&AptitudeVector::new(2, 3, 0, 0, 0, 0));

        let pct = |d| profile.get(d).unwrap().percentage;
        assert!((pct(Dimension::Investigative) - 60.0).abs() < f64::EPSILON);
        assert!((pct(Dimension::Realistic) - 40.0).abs() < f64::EPSILON);
        for d in [
            Dimension::Artistic,
            Dimension::Social,
            Dimension::Enterprising,
            Dimension::Conventional,
        ] {
            assert_eq!(pct(d), 0.0);
        }
        assert_eq!(profile.get(Dimension::Investigative).unwrap().score, 3);
        assert_eq!(
            profile.get(Dimension::Realistic).unwrap().name,
            "Realistic"
        );
    }

    #[test]
    fn zero_vector_is_all_zero_without_faulting() {
        let catalog = CareerCatalog::builtin();
        let outcome = RecommendationMatcher::new(&catalog).match_vector(&AptitudeVector::ZERO);

        assert_eq!(outcome.recommendations.len(), catalog.careers.len());
        assert!(outcome
            .recommendations
            .iter()
            .all(|r| r.match_percentage == 0.0));
        assert_eq!(outcome.personality_profile.len(), 6);
        assert!(outcome
            .personality_profile
            .iter()
            .all(|(_, e)| e.percentage == 0.0));

        // Zero-score ties keep catalog order
        let names: Vec<&str> = outcome
            .recommendations
            .iter()
            .map(|r| r.career.as_str())
            .collect();
        let catalog_names: Vec<&str> = catalog.careers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, catalog_names);
    }

    #[test]
    fn identical_direction_is_full_match() {
        let v = AptitudeVector::new(1, 2, 0, 0, 0, 3);
        let scaled = AptitudeVector::new(2, 4, 0, 0, 0, 6);
        assert_eq!(match_percentage(&v, &scaled), 100.0);
    }

    #[test]
    fn orthogonal_vectors_do_not_match() {
        let r = AptitudeVector::new(5, 0, 0, 0, 0, 0);
        let c = AptitudeVector::new(0, 0, 0, 0, 0, 5);
        assert_eq!(match_percentage(&r, &c), 0.0);
    }

    #[test]
    fn match_is_rounded_to_one_decimal() {
        let user = AptitudeVector::new(1, 1, 0, 0, 0, 0);
        let ideal = AptitudeVector::new(1, 0, 0, 0, 0, 0);
        // cos = 1/sqrt(2) = 0.70710...
        assert_eq!(match_percentage(&user, &ideal), 70.7);
    }

    #[test]
    fn ranks_descending_with_stable_ties() {
        let catalog = catalog_with(&[
            ("Tie A", AptitudeVector::new(0, 0, 0, 0, 0, 9)),
            ("Best", AptitudeVector::new(9, 0, 0, 0, 0, 0)),
            ("Tie B", AptitudeVector::new(0, 0, 0, 0, 0, 9)),
            ("Middle", AptitudeVector::new(9, 9, 0, 0, 0, 0)),
        ]);
        let matcher = RecommendationMatcher::new(&catalog);
        let ranked = matcher.recommend(&AptitudeVector::new(10, 1, 0, 0, 0, 1));

        let names: Vec<&str> = ranked.iter().map(|r| r.career.as_str()).collect();
        assert_eq!(names, vec!["Best", "Middle", "Tie A", "Tie B"]);
        assert!(ranked
            .iter()
            .all(|r| (0.0..=100.0).contains(&r.match_percentage)));
    }

    #[test]
    fn matching_is_idempotent() {
        let catalog = CareerCatalog::builtin();
        let matcher = RecommendationMatcher::new(&catalog);
        let vector = AptitudeVector::new(7, 12, 3, 9, 4, 6);

        let first = matcher.match_vector(&vector);
        let second = matcher.match_vector(&vector);
        assert_eq!(first, second);
        for (a, b) in first.recommendations.iter().zip(&second.recommendations) {
            assert_eq!(a.match_percentage.to_bits(), b.match_percentage.to_bits());
        }
    }

    #[test]
    fn investigative_student_gets_investigative_careers_first() {
        let catalog = CareerCatalog::builtin();
        let ranked =
            RecommendationMatcher::new(&catalog).recommend(&AptitudeVector::new(2, 15, 3, 1, 2, 5));
        assert_eq!(ranked[0].type_name, "Investigative (Thinkers)");
    }

    #[test]
    fn profile_uses_catalog_dimension_labels() {
        let mut catalog = catalog_with(&[("Any", AptitudeVector::new(1, 1, 1, 1, 1, 1))]);
        catalog.dimensions.insert(
            Dimension::Social,
            DimensionInfo {
                name: "Helper".into(),
                description: "Likes people".into(),
            },
        );
        let profile = RecommendationMatcher::new(&catalog)
            .personality_profile(&AptitudeVector::new(0, 0, 0, 4, 0, 0));
        let social = profile.get(Dimension::Social).unwrap();
        assert_eq!(social.name, "Helper");
        assert_eq!(social.percentage, 100.0);
    }

    #[test]
    fn dominant_dimensions_break_ties_canonically() {
        let v = AptitudeVector::new(3, 5, 3, 0, 5, 3);
        assert_eq!(
            dominant_dimensions(&v, DOMINANT_COUNT),
            vec![
                Dimension::Investigative,
                Dimension::Enterprising,
                Dimension::Realistic
            ]
        );
        assert_eq!(
            dominant_dimensions(&AptitudeVector::ZERO, 3),
            vec![
                Dimension::Realistic,
                Dimension::Investigative,
                Dimension::Artistic
            ]
        );
    }
}
