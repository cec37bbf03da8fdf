#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place-name lookup for Turkish provinces and districts.
//!
//! The table is an opaque static resource: a TOML file embedded at compile
//! time and parsed on first use. Queries take the form `"Province"` or
//! `"Province/District"` and are matched after folding case and Turkish
//! diacritics, so `"istanbul/kadikoy"` finds `İstanbul / Kadıköy`.

use std::sync::LazyLock;

use serde::Deserialize;
use thiserror::Error;

const BUILTIN_TOML: &str = include_str!("../data/turkey.toml");

/// District name marking a province's administrative centre.
const CENTRE_MARKER: &str = "Merkez";

static BUILTIN: LazyLock<Gazetteer> = LazyLock::new(|| {
    Gazetteer::from_toml_str(BUILTIN_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse built-in gazetteer: {e}"))
});

/// Errors that can occur while parsing a gazetteer table.
#[derive(Debug, Error)]
pub enum GazetteerError {
    /// The TOML document is malformed.
    #[error("Invalid gazetteer: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A named location with coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct District {
    /// District name as published (e.g. `"Seyhan (Merkez)"`).
    pub name: String,
    /// `[latitude, longitude]` in decimal degrees.
    #[serde(rename = "at")]
    coordinates: [f64; 2],
}

impl District {
    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates[0]
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates[1]
    }

    fn is_centre(&self) -> bool {
        self.name == CENTRE_MARKER || self.name.contains(&format!("({CENTRE_MARKER})"))
    }

    fn matches(&self, key: &str) -> bool {
        let name = fold(&self.name);
        name == key || strip_centre_suffix(&name) == key
    }
}

/// A province and its districts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Province {
    /// Province name.
    pub name: String,
    /// Districts in table order.
    pub districts: Vec<District>,
}

impl Province {
    /// The administrative centre: the `Merkez` district, a district tagged
    /// `(Merkez)`, or failing both the first district listed.
    #[must_use]
    pub fn centre(&self) -> Option<&District> {
        self.districts
            .iter()
            .find(|d| d.name == CENTRE_MARKER)
            .or_else(|| self.districts.iter().find(|d| d.is_centre()))
            .or_else(|| self.districts.first())
    }

    /// Looks up a district by (folded) name.
    #[must_use]
    pub fn district(&self, name: &str) -> Option<&District> {
        let key = fold(name);
        self.districts.iter().find(|d| d.matches(&key))
    }
}

#[derive(Deserialize)]
struct GazetteerFile {
    province: Vec<Province>,
}

/// A province/district coordinate table.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    provinces: Vec<Province>,
}

impl Gazetteer {
    /// The embedded table of all 81 provinces.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Parses a table from a TOML document of `[[province]]` tables.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::Parse`] if the document is malformed.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, GazetteerError> {
        let file: GazetteerFile = toml::de::from_str(toml_str)?;
        Ok(Self {
            provinces: file.province,
        })
    }

    /// All provinces in table order.
    #[must_use]
    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    /// Looks up a province by (folded) name.
    #[must_use]
    pub fn province(&self, name: &str) -> Option<&Province> {
        let key = fold(name);
        self.provinces.iter().find(|p| fold(&p.name) == key)
    }

    /// Districts of a province, in table order.
    #[must_use]
    pub fn districts(&self, province: &str) -> Option<&[District]> {
        self.province(province).map(|p| p.districts.as_slice())
    }

    /// Resolves `"Province"` or `"Province/District"` to
    /// `(latitude, longitude)`.
    ///
    /// A bare province resolves to its [`Province::centre`].
    #[must_use]
    pub fn resolve(&self, query: &str) -> Option<(f64, f64)> {
        let (province, district) = match query.split_once('/') {
            Some((p, d)) => (p.trim(), Some(d.trim())),
            None => (query.trim(), None),
        };

        let province = self.province(province)?;
        let district = match district {
            Some(name) => province.district(name)?,
            None => province.centre()?,
        };

        Some((district.latitude(), district.longitude()))
    }
}

/// Lowercases and strips Turkish diacritics for matching.
fn fold(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            'ç' | 'Ç' => 'c',
            'ğ' | 'Ğ' => 'g',
            'ı' | 'İ' | 'I' => 'i',
            'ö' | 'Ö' => 'o',
            'ş' | 'Ş' => 's',
            'ü' | 'Ü' => 'u',
            'â' | 'Â' => 'a',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

fn strip_centre_suffix(folded: &str) -> &str {
    folded.strip_suffix(" (merkez)").unwrap_or(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_provinces() {
        assert_eq!(Gazetteer::builtin().provinces().len(), 81);
    }

    #[test]
    fn every_province_has_a_centre() {
        for province in Gazetteer::builtin().provinces() {
            assert!(province.centre().is_some(), "no centre: {}", province.name);
        }
    }

    #[test]
    fn resolves_district_with_diacritics_folded() {
        let (lat, lon) = Gazetteer::builtin().resolve("istanbul/kadikoy").unwrap();
        assert!((lat - 40.99).abs() < f64::EPSILON);
        assert!((lon - 29.02).abs() < f64::EPSILON);
    }

    #[test]
    fn bare_province_uses_merkez() {
        let (lat, lon) = Gazetteer::builtin().resolve("Çorum").unwrap();
        assert!((lat - 40.55).abs() < f64::EPSILON);
        assert!((lon - 34.95).abs() < f64::EPSILON);
    }

    #[test]
    fn bare_province_uses_tagged_centre() {
        let (lat, lon) = Gazetteer::builtin().resolve("Adana").unwrap();
        assert!((lat - 37.00).abs() < f64::EPSILON);
        assert!((lon - 35.32).abs() < f64::EPSILON);
    }

    #[test]
    fn centre_suffix_is_optional() {
        let gazetteer = Gazetteer::builtin();
        assert_eq!(
            gazetteer.resolve("Adana/Seyhan"),
            gazetteer.resolve("Adana/Seyhan (Merkez)")
        );
    }

    #[test]
    fn unknown_names_resolve_to_none() {
        let gazetteer = Gazetteer::builtin();
        assert!(gazetteer.resolve("Atlantis").is_none());
        assert!(gazetteer.resolve("Ankara/Atlantis").is_none());
    }

    #[test]
    fn falls_back_to_first_district() {
        let gazetteer = Gazetteer::from_toml_str(
            "[[province]]\nname = \"X\"\ndistricts = [ { name = \"A\", at = [1.0, 2.0] }, { name = \"B\", at = [3.0, 4.0] } ]\n",
        )
        .unwrap();
        assert_eq!(gazetteer.resolve("x"), Some((1.0, 2.0)));
        let names: Vec<&str> = gazetteer
            .districts("X")
            .unwrap()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, ["A", "B"]);
        assert!(gazetteer.districts("Y").is_none());
    }
}
