use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Regions and the cities offered under each, in display order.
const ETHIOPIA: &[(&str, &[&str])] = &[
    (
        "Addis Ababa",
        &[
            "Bole",
            "Kirkos",
            "Yeka",
            "Arada",
            "Lideta",
            "Gullele",
            "Addis Ketema",
            "Kolfe Keranio",
            "Nifas Silk-Lafto",
            "Akaky Kaliti",
            "Lemi Kura",
        ],
    ),
    ("Afar", &["Semera", "Asaita", "Awash"]),
    ("Amhara", &["Bahir Dar", "Gondar", "Dessie", "Debre Birhan", "Debre Markos", "Lalibela"]),
    ("Benishangul-Gumuz", &["Assosa", "Metekel"]),
    ("Dire Dawa", &["Dire Dawa"]),
    ("Gambela", &["Gambela"]),
    ("Harari", &["Harar"]),
    ("Oromia", &["Adama", "Bishoftu", "Jimma", "Shashemene", "Nekemte", "Ambo", "Sebeta"]),
    ("Sidama", &["Hawassa", "Yirgalem"]),
    ("Somali", &["Jijiga", "Gode", "Degehabur"]),
    ("South Ethiopia", &["Arba Minch", "Wolaita Sodo", "Jinka"]),
    ("Central Ethiopia", &["Hosaena", "Butajira", "Worabe"]),
    ("South West Ethiopia", &["Bonga", "Mizan Teferi", "Tepi"]),
    ("Tigray", &["Mekelle", "Adigrat", "Axum", "Shire"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub region: String,
    pub cities: Vec<String>,
}

/// Read-only region → city lookup backing the city dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDirectory {
    entries: Vec<RegionEntry>,
}

impl RegionDirectory {
    pub fn new(entries: Vec<RegionEntry>) -> Self {
        Self { entries }
    }

    /// The built-in Ethiopian region list
    pub fn ethiopia() -> Self {
        let entries = ETHIOPIA
            .iter()
            .map(|(region, cities)| RegionEntry {
                region: region.to_string(),
                cities: cities.iter().map(|c| c.to_string()).collect(),
            })
            .collect();
        Self { entries }
    }

    /// Parse a JSON array of `{ "region": ..., "cities": [...] }`
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<RegionEntry> =
            serde_json::from_str(json).context("Region directory is not valid JSON")?;
        debug!("Loaded {} regions from JSON", entries.len());
        Ok(Self { entries })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read region directory {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.region.as_str())
    }

    pub fn contains_region(&self, region: &str) -> bool {
        self.entries.iter().any(|e| e.region == region)
    }

    /// Cities for `region`, or an empty slice when it is unset or unknown.
    pub fn cities_for(&self, region: Option<&str>) -> &[String] {
        region
            .and_then(|r| self.entries.iter().find(|e| e.region == r))
            .map(|e| e.cities.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_city(&self, region: Option<&str>, city: &str) -> bool {
        self.cities_for(region).iter().any(|c| c == city)
    }
}

impl Default for RegionDirectory {
    fn default() -> Self {
        Self::ethiopia()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cities_keep_directory_order() {
        let directory = RegionDirectory::ethiopia();
        let cities = directory.cities_for(Some("Addis Ababa"));
        assert_eq!(cities.first().map(String::as_str), Some("Bole"));
        assert_eq!(cities.len(), 11);
    }

    #[test]
    fn test_unknown_or_missing_region_is_empty() {
        let directory = RegionDirectory::ethiopia();
        assert!(directory.cities_for(None).is_empty());
        assert!(directory.cities_for(Some("Atlantis")).is_empty());
        assert!(directory.cities_for(Some("")).is_empty());
    }

    #[test]
    fn test_has_city_is_scoped_to_region() {
        let directory = RegionDirectory::ethiopia();
        assert!(directory.has_city(Some("Oromia"), "Adama"));
        assert!(!directory.has_city(Some("Amhara"), "Adama"));
        assert!(!directory.has_city(None, "Adama"));
    }

    #[test]
    fn test_from_json() {
        let directory = RegionDirectory::from_json(
            r#"[{"region": "Harari", "cities": ["Harar"]}, {"region": "Gambela", "cities": []}]"#,
        )
        .unwrap();
        assert_eq!(directory.regions().collect::<Vec<_>>(), vec!["Harari", "Gambela"]);
        assert_eq!(directory.cities_for(Some("Harari")), ["Harar".to_string()]);
        assert!(RegionDirectory::from_json("{}").is_err());
    }
}
