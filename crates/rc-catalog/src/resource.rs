//! Resource records and their categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// The kind of assistance a resource offers.
///
/// Serialized with the human-readable labels used throughout the directory
/// (`"Housing"`, `"Food Assistance"`, `"Utility Assistance"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Category {
    #[serde(rename = "Housing", alias = "housing")]
    Housing,
    #[serde(rename = "Food Assistance", alias = "food")]
    FoodAssistance,
    #[serde(rename = "Utility Assistance", alias = "utility")]
    UtilityAssistance,
}

impl Category {
    /// Every category, in bucket order.
    pub const ALL: [Self; 3] = [Self::Housing, Self::FoodAssistance, Self::UtilityAssistance];

    /// Display label, identical to the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Housing => "Housing",
            Self::FoodAssistance => "Food Assistance",
            Self::UtilityAssistance => "Utility Assistance",
        }
    }

    /// Short lowercase slug used in URL paths.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Housing => "housing",
            Self::FoodAssistance => "food",
            Self::UtilityAssistance => "utility",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts either the label or the slug, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(s) || c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One assistance-program entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Resource {
    /// Unique within a catalog.
    pub id: u32,
    pub category: Category,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    pub phone: String,
    /// Absent when the program publishes no site. `"#"` in source data maps here.
    #[serde(default, deserialize_with = "deserialize_website")]
    pub website: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl Resource {
    /// `(lat, lng)` pair.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

fn deserialize_website<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|url| {
        let url = url.trim();
        !url.is_empty() && url != "#"
    }))
}

/// Whether a coordinate pair lies on the globe.
#[must_use]
pub fn valid_coordinates(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}
