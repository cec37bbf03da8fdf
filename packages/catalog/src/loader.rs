//! Text catalog loader.
//!
//! Reads the whitespace-separated earthquake list published by the Kandilli
//! observatory. Everything up to and including the column header line is
//! skipped; every following line with at least ten fields is parsed as
//!
//! ```text
//! No  Code  Date(YYYY.MM.DD)  Time(HH:MM:SS.ss)  Lat  Lon  Depth  xM  MD  ML ...
//! ```
//!
//! Lines that fail to parse are dropped. Exports come in either UTF-8 or
//! Windows-1254; only the place-name columns differ between the two, so
//! lines are decoded lossily and the numeric fields are read unchanged.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use seismiq_catalog_models::Event;

use crate::CatalogError;

const HEADER_MARKERS: &[&str] = &["Olus tarihi", "Enlem"];
const MIN_FIELDS: usize = 10;
const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Loads every parseable event from a catalog file.
///
/// A missing file yields an empty list (and a warning) rather than an
/// error; callers turn that into [`CatalogError::Empty`] when they build
/// the [`crate::Catalog`].
///
/// # Errors
///
/// Returns [`CatalogError::Io`] for read failures other than the file not
/// existing.
pub fn load(path: &Path) -> Result<Vec<Event>, CatalogError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Catalog file {} not found", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let events = parse(&bytes);
    log::info!("Loaded {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Parses a catalog from raw bytes.
#[must_use]
pub fn parse(bytes: &[u8]) -> Vec<Event> {
    let lines: Vec<String> = bytes
        .split(|b| *b == b'\n')
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect();

    let start = lines
        .iter()
        .position(|line| HEADER_MARKERS.iter().any(|m| line.contains(m)))
        .map_or(0, |i| i + 1);

    let mut skipped = 0_usize;
    let events: Vec<Event> = lines[start..]
        .iter()
        .filter_map(|line| {
            let event = parse_line(line);
            if event.is_none() && !line.trim().is_empty() {
                skipped += 1;
            }
            event
        })
        .collect();

    if skipped > 0 {
        log::debug!("Skipped {skipped} unparseable catalog lines");
    }

    events
}

/// Parses a single data line.
///
/// The primary magnitude column (`xM`) is used unless it is exactly zero,
/// in which case the `ML` column is read instead.
#[must_use]
pub fn parse_line(line: &str) -> Option<Event> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < MIN_FIELDS {
        return None;
    }

    let time = parts[3].get(..8).unwrap_or(parts[3]);
    let timestamp = parse_timestamp(parts[2], time)?;

    let latitude = parts[4].parse::<f64>().ok()?;
    let longitude = parts[5].parse::<f64>().ok()?;
    let mut magnitude = parts[7].parse::<f64>().ok()?;
    if magnitude == 0.0 {
        magnitude = parts[9].parse::<f64>().ok()?;
    }

    Some(Event::new(timestamp, latitude, longitude, magnitude))
}

fn parse_timestamp(date: &str, time: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = "\
BOGAZICI UNIVERSITESI KANDILLI RASATHANESI
No   Deprem Kodu   Olus tarihi  Olus zamani  Enlem   Boylam  Der(km) xM  MD  ML  Mw  Ms  Mb  Tip Yer
---- ------------- ----------- ----------- ------- ------- ------- --- --- --- --- --- --- --- ---
1    20230206011732 2023.02.06  01:17:32.31 37.1757 37.0862 8.6     7.7 0.0 6.6 7.7 0.0 0.0 Ke PAZARCIK
2    20230206102448 2023.02.06  10:24:48.56 38.0818 37.1773 7.0     0.0 0.0 7.6 7.6 0.0 0.0 Ke ELBISTAN
3    20230206999999 2023.02.30  10:24:48.56 38.0818 37.1773 7.0     4.0 0.0 4.0 0.0 0.0 0.0 Ke BAD DATE
4    short line
";

    #[test]
    fn skips_header_and_bad_lines() {
        let events = parse(SAMPLE.as_bytes());
        assert_eq!(events.len(), 2);

        let first = &events[0];
        assert_eq!(first.timestamp.to_string(), "2023-02-06 01:17:32 UTC");
        assert!((first.latitude - 37.1757).abs() < f64::EPSILON);
        assert!((first.longitude - 37.0862).abs() < f64::EPSILON);
        assert!((first.magnitude - 7.7).abs() < f64::EPSILON);
    }

    #[test]
    fn falls_back_to_secondary_magnitude() {
        let events = parse(SAMPLE.as_bytes());
        assert!((events[1].magnitude - 7.6).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_magnitude_with_unparseable_fallback_is_dropped() {
        let line = "9 x 2020.01.24 17:55:11.00 38.36 39.06 10.0 0.0 0.0 n/a";
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn headerless_input_parses_from_first_line() {
        let line = "1 x 2020.01.24 17:55:11.00 38.36 39.06 10.0 6.8 0.0 6.5\n";
        assert_eq!(parse(line.as_bytes()).len(), 1);
    }

    #[test]
    fn tolerates_windows_1254_bytes() {
        // "Olus tarihi" header followed by a line whose place name is
        // cp1254-encoded ("ELAZIĞ" with 0xD0 for Ğ).
        let mut bytes = b"No Kod Olus tarihi\n".to_vec();
        bytes.extend_from_slice(
            b"1 x 2020.01.24 17:55:11.00 38.36 39.06 10.0 6.8 0.0 6.5 Ke ELAZI\xD0\r\n",
        );
        let events = parse(&bytes);
        assert_eq!(events.len(), 1);
        assert!((events[0].magnitude - 6.8).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let events = load(&dir.path().join("deprem.txt")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let events = load(file.path()).unwrap();
        assert_eq!(events.len(), 2);
    }
}
