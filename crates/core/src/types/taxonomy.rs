//! Fixed taxonomies for bootcamps and courses.

use serde::{Deserialize, Serialize};

/// Error returned when a stored taxonomy value is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseTaxonomyError {
    /// Which taxonomy was being parsed.
    pub kind: &'static str,
    /// The rejected value.
    pub value: String,
}

/// Career track offered by a bootcamp (and taught by a course).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

impl Career {
    /// Every career in display order.
    pub const ALL: [Self; 6] = [
        Self::WebDevelopment,
        Self::MobileDevelopment,
        Self::UiUx,
        Self::DataScience,
        Self::Business,
        Self::Other,
    ];

    /// Human-readable label, also used as the stored value.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::WebDevelopment => "Web Development",
            Self::MobileDevelopment => "Mobile Development",
            Self::UiUx => "UI/UX",
            Self::DataScience => "Data Science",
            Self::Business => "Business",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Career {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Career {
    type Err = ParseTaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|career| career.label() == s)
            .ok_or_else(|| ParseTaxonomyError {
                kind: "career",
                value: s.to_owned(),
            })
    }
}

/// Minimum skill level a course expects from its students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MinimumSkill {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl MinimumSkill {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "BEGINNER",
            Self::Intermediate => "INTERMEDIATE",
            Self::Advanced => "ADVANCED",
        }
    }
}

impl std::fmt::Display for MinimumSkill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MinimumSkill {
    type Err = ParseTaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BEGINNER" => Ok(Self::Beginner),
            "INTERMEDIATE" => Ok(Self::Intermediate),
            "ADVANCED" => Ok(Self::Advanced),
            _ => Err(ParseTaxonomyError {
                kind: "minimum skill",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_career_labels_parse_back() {
        for career in Career::ALL {
            assert_eq!(career.label().parse::<Career>().unwrap(), career);
        }
    }

    #[test]
    fn test_career_serde_uses_label() {
        let json = serde_json::to_string(&Career::UiUx).unwrap();
        assert_eq!(json, "\"UI/UX\"");
    }

    #[test]
    fn test_unknown_career() {
        let err = "Cooking".parse::<Career>().unwrap_err();
        assert_eq!(err.to_string(), "unknown career: Cooking");
    }

    #[test]
    fn test_minimum_skill_parse() {
        assert_eq!(
            "INTERMEDIATE".parse::<MinimumSkill>().unwrap(),
            MinimumSkill::Intermediate
        );
        assert!("expert".parse::<MinimumSkill>().is_err());
    }
}
