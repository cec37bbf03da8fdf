//! Query-point and reference-time arguments.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Args;
use seismiq_gazetteer::Gazetteer;

/// Where to evaluate: explicit coordinates or a gazetteer place.
#[derive(Args, Debug, Clone)]
pub struct Location {
    /// Latitude in decimal degrees
    #[arg(long, requires = "lon", conflicts_with = "place", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
    /// Place name, e.g. "Hatay" or "İstanbul/Kadıköy"
    #[arg(long, conflicts_with = "lon")]
    pub place: Option<String>,
}

impl Location {
    /// Resolves to `(latitude, longitude)`.
    ///
    /// # Errors
    ///
    /// * If the place name is unknown
    /// * If neither coordinates nor a place were given
    pub fn resolve(&self) -> Result<(f64, f64), Box<dyn std::error::Error>> {
        if let Some(place) = &self.place {
            return Gazetteer::builtin()
                .resolve(place)
                .ok_or_else(|| format!("Unknown place: {place}").into());
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err("Provide --lat and --lon, or --place".into()),
        }
    }

    /// Human-readable label for reports.
    #[must_use]
    pub fn label(&self, lat: f64, lon: f64) -> String {
        self.place.as_ref().map_or_else(
            || format!("{lat:.2}, {lon:.2}"),
            |place| format!("{place} ({lat:.2}, {lon:.2})"),
        )
    }
}

/// Reference time: midnight UTC of `date`, or now.
#[must_use]
pub fn reference_time(date: Option<NaiveDate>) -> DateTime<Utc> {
    date.map_or_else(Utc::now, |d| d.and_time(NaiveTime::MIN).and_utc())
}
