//! Career catalog used by the recommendation matcher.
//!
//! The built-in catalog covers every RIASEC type. Deployments can replace it
//! with a TOML file loaded once at startup; the catalog is read-only after
//! that and shared between sessions.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{AptitudeVector, CareerProfile, Dimension};

/// Display name and description for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Careers plus the per-dimension labels used in personality profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerCatalog {
    #[serde(default)]
    pub dimensions: BTreeMap<Dimension, DimensionInfo>,
    #[serde(default)]
    pub careers: Vec<CareerProfile>,
}

impl CareerCatalog {
    /// Name and description for a dimension, falling back to the canonical
    /// name when the catalog has no entry.
    pub fn dimension_info(&self, dimension: Dimension) -> DimensionInfo {
        self.dimensions
            .get(&dimension)
            .cloned()
            .unwrap_or_else(|| DimensionInfo {
                name: dimension.name().to_string(),
                description: String::new(),
            })
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read career catalog: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to load career catalog: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let catalog: CareerCatalog = toml::from_str(content).context("invalid catalog TOML")?;
        anyhow::ensure!(!catalog.careers.is_empty(), "catalog has no careers");
        Ok(catalog)
    }

    /// Load from `path` when given, otherwise use the built-in catalog.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    /// The catalog shipped with careerpath.
    pub fn builtin() -> Self {
        let dimensions = BUILTIN_DIMENSIONS
            .iter()
            .map(|(dimension, name, description)| {
                (
                    *dimension,
                    DimensionInfo {
                        name: (*name).to_string(),
                        description: (*description).to_string(),
                    },
                )
            })
            .collect();

        let careers = BUILTIN_CAREERS
            .iter()
            .map(|(name, dimension, description, ideal)| CareerProfile {
                name: (*name).to_string(),
                type_name: type_label(*dimension).to_string(),
                description: (*description).to_string(),
                ideal_vector: AptitudeVector::new(
                    ideal[0], ideal[1], ideal[2], ideal[3], ideal[4], ideal[5],
                ),
            })
            .collect();

        Self {
            dimensions,
            careers,
        }
    }
}

impl Default for CareerCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn type_label(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Realistic => "Realistic (Doers)",
        Dimension::Investigative => "Investigative (Thinkers)",
        Dimension::Artistic => "Artistic (Creators)",
        Dimension::Social => "Social (Helpers)",
        Dimension::Enterprising => "Enterprising (Persuaders)",
        Dimension::Conventional => "Conventional (Organizers)",
    }
}

const BUILTIN_DIMENSIONS: [(Dimension, &str, &str); 6] = [
    (
        Dimension::Realistic,
        "Realistic",
        "You prefer hands-on, practical work with tools, machines, and physical materials.",
    ),
    (
        Dimension::Investigative,
        "Investigative",
        "You enjoy research, analysis, and solving complex problems through investigation.",
    ),
    (
        Dimension::Artistic,
        "Artistic",
        "You are drawn to creative, expressive activities and innovative thinking.",
    ),
    (
        Dimension::Social,
        "Social",
        "You like helping, teaching, and working with people to improve their lives.",
    ),
    (
        Dimension::Enterprising,
        "Enterprising",
        "You enjoy leading, persuading, and managing people and projects.",
    ),
    (
        Dimension::Conventional,
        "Conventional",
        "You prefer organized, systematic work with data, details, and established procedures.",
    ),
];

// Ideal vectors are in canonical order: R, I, A, S, E, C.
const BUILTIN_CAREERS: [(&str, Dimension, &str, [u32; 6]); 18] = [
    (
        "Mechanical Engineer",
        Dimension::Realistic,
        "Designs, builds and maintains machines and mechanical systems.",
        [9, 6, 2, 1, 2, 4],
    ),
    (
        "Electrician",
        Dimension::Realistic,
        "Installs and repairs electrical wiring, fixtures and equipment.",
        [9, 3, 1, 2, 2, 5],
    ),
    (
        "Pilot",
        Dimension::Realistic,
        "Flies aircraft, combining technical skill with careful procedure.",
        [8, 5, 1, 3, 3, 5],
    ),
    (
        "Data Scientist",
        Dimension::Investigative,
        "Finds patterns in data and builds models that inform decisions.",
        [2, 9, 3, 1, 2, 6],
    ),
    (
        "Research Scientist",
        Dimension::Investigative,
        "Designs experiments and investigates open questions in a field of science.",
        [3, 9, 4, 2, 1, 4],
    ),
    (
        "Software Developer",
        Dimension::Investigative,
        "Analyzes problems and builds software to solve them.",
        [4, 8, 4, 1, 2, 5],
    ),
    (
        "Graphic Designer",
        Dimension::Artistic,
        "Creates visual concepts that communicate ideas and inspire audiences.",
        [2, 2, 9, 2, 3, 3],
    ),
    (
        "Writer",
        Dimension::Artistic,
        "Crafts stories, articles and scripts for readers and viewers.",
        [0, 4, 9, 3, 2, 1],
    ),
    (
        "Musician",
        Dimension::Artistic,
        "Composes and performs music for live and recorded audiences.",
        [2, 1, 9, 4, 3, 0],
    ),
    (
        "Teacher",
        Dimension::Social,
        "Helps students learn and grow inside and outside the classroom.",
        [1, 4, 3, 9, 4, 3],
    ),
    (
        "Counselor",
        Dimension::Social,
        "Supports people through personal, educational and career challenges.",
        [0, 4, 3, 9, 2, 2],
    ),
    (
        "Nurse",
        Dimension::Social,
        "Cares for patients and works alongside doctors to deliver treatment.",
        [4, 5, 1, 9, 1, 4],
    ),
    (
        "Entrepreneur",
        Dimension::Enterprising,
        "Starts and grows new ventures, taking on risk to pursue opportunities.",
        [2, 3, 4, 3, 9, 2],
    ),
    (
        "Sales Manager",
        Dimension::Enterprising,
        "Leads a sales team and builds lasting relationships with customers.",
        [1, 1, 2, 5, 9, 3],
    ),
    (
        "Lawyer",
        Dimension::Enterprising,
        "Advises clients and argues cases, persuading judges and juries.",
        [0, 5, 2, 4, 9, 4],
    ),
    (
        "Accountant",
        Dimension::Conventional,
        "Prepares and examines financial records and keeps them accurate.",
        [1, 4, 0, 1, 3, 9],
    ),
    (
        "Financial Analyst",
        Dimension::Conventional,
        "Evaluates investments and financial data to guide business decisions.",
        [1, 6, 0, 1, 4, 9],
    ),
    (
        "Office Manager",
        Dimension::Conventional,
        "Keeps an office organized, running schedules, records and procedures.",
        [2, 1, 1, 4, 4, 9],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_dimension() {
        let catalog = CareerCatalog::builtin();
        assert_eq!(catalog.careers.len(), 18);
        for dimension in Dimension::ALL {
            assert!(catalog.dimensions.contains_key(&dimension));
            assert!(catalog
                .careers
                .iter()
                .any(|c| c.type_name == type_label(dimension)));
        }
    }

    #[test]
    fn builtin_ideal_vectors_are_dominated_by_their_type() {
        let catalog = CareerCatalog::builtin();
        for career in &catalog.careers {
            let max = career.ideal_vector.as_array().into_iter().max().unwrap();
            assert_eq!(max, 9, "{} should peak at 9", career.name);
        }
    }

    #[test]
    fn parse_catalog_toml() {
        let toml = r#"
[dimensions.R]
name = "Realistic"
description = "Hands-on"

[[careers]]
name = "Carpenter"
type_name = "Realistic (Doers)"
description = "Builds with wood"
ideal_vector = { R = 9, C = 3 }
"#;
        let catalog = CareerCatalog::from_toml_str(toml).unwrap();
        assert_eq!(catalog.careers.len(), 1);
        assert_eq!(catalog.careers[0].ideal_vector.r, 9);
        assert_eq!(
            catalog.dimension_info(Dimension::Realistic).description,
            "Hands-on"
        );
        // Missing dimension entries fall back to the canonical name
        assert_eq!(catalog.dimension_info(Dimension::Social).name, "Social");
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(CareerCatalog::from_toml_str("careers = []").is_err());
    }

    #[test]
    fn load_or_builtin_without_path() {
        let catalog = CareerCatalog::load_or_builtin(None).unwrap();
        assert_eq!(catalog, CareerCatalog::builtin());
    }
}
