// Survey points: the typed input of the tour builder, plus file import/export.
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::{fmt, fs::File, io, path::Path};
use thiserror::Error;

use super::tour::Tour;

/// The tag that marks the block headquarters, i.e. the tour anchor.
pub const BASE_TAG: &str = "BHQ";

#[derive(Error, Debug)]
pub enum PointsError {
    #[error("Failed to read or write points file: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported points file format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PointKind {
    /// Block headquarters, the start and end of every tour.
    Base,
    /// Point added interactively on the map.
    Other,
    Temporary,
    #[default]
    Survey,
    Custom(String),
}

impl PointKind {
    pub fn is_base(&self) -> bool {
        matches!(self, PointKind::Base)
    }

    fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case(BASE_TAG) {
            PointKind::Base
        } else if tag.eq_ignore_ascii_case("other") {
            PointKind::Other
        } else if tag.eq_ignore_ascii_case("temporary") {
            PointKind::Temporary
        } else if tag.is_empty() || tag.eq_ignore_ascii_case("survey") {
            PointKind::Survey
        } else {
            PointKind::Custom(tag.to_string())
        }
    }
}

impl From<String> for PointKind {
    fn from(tag: String) -> Self {
        PointKind::parse(&tag)
    }
}

impl From<PointKind> for String {
    fn from(kind: PointKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKind::Base => f.write_str(BASE_TAG),
            PointKind::Other => f.write_str("other"),
            PointKind::Temporary => f.write_str("temporary"),
            PointKind::Survey => f.write_str("survey"),
            PointKind::Custom(tag) => f.write_str(tag),
        }
    }
}

/// A geographic coordinate in degrees with an optional label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: PointKind,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            place: None,
            kind: PointKind::Survey,
        }
    }

    pub fn base(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude).with_kind(PointKind::Base)
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    pub fn with_kind(mut self, kind: PointKind) -> Self {
        self.kind = kind;
        self
    }

    /// `[lon, lat]`, the order routing APIs and GeoJSON expect.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Coordinates rounded to 6 decimals (~10 cm). Points with the same key
    /// are treated as one location by the cache and the road providers.
    pub fn location_key(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }

    pub fn same_location(&self, other: &Point) -> bool {
        self.location_key() == other.location_key()
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn label(&self) -> String {
        match &self.place {
            Some(place) => place.clone(),
            None => format!("({:.5}, {:.5})", self.latitude, self.longitude),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PointRecord {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    place: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl From<PointRecord> for Point {
    fn from(record: PointRecord) -> Self {
        Point {
            latitude: record.latitude,
            longitude: record.longitude,
            place: record.place.filter(|p| !p.trim().is_empty()),
            kind: record
                .kind
                .map(PointKind::from)
                .unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
struct StopRecord<'a> {
    sequence: usize,
    latitude: f64,
    longitude: f64,
    place: &'a str,
    #[serde(rename = "type")]
    kind: String,
}

/// Reads points from a CSV with a `latitude,longitude,place,type` header.
pub fn read_points_csv<R: io::Read>(reader: R) -> Result<Vec<Point>, PointsError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut points = Vec::new();
    for result in rdr.deserialize::<PointRecord>() {
        points.push(result?.into());
    }
    Ok(points)
}

pub fn read_points_json<R: io::Read>(reader: R) -> Result<Vec<Point>, PointsError> {
    let records: Vec<PointRecord> = serde_json::from_reader(reader)?;
    Ok(records.into_iter().map(Point::from).collect())
}

/// Loads points from a `.csv` or `.json` file, chosen by extension.
pub fn load_points<P: AsRef<Path>>(path: P) -> Result<Vec<Point>, PointsError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let points = match extension.as_str() {
        "csv" => read_points_csv(File::open(path)?)?,
        "json" => read_points_json(File::open(path)?)?,
        other => return Err(PointsError::UnsupportedFormat(other.to_string())),
    };
    log::debug!("Loaded {} points from {}", points.len(), path.display());
    Ok(points)
}

/// Writes the stops of a tour as `sequence,latitude,longitude,place,type` rows.
pub fn write_tour_csv<W: io::Write>(tour: &Tour, writer: W) -> Result<(), PointsError> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    for stop in &tour.stops {
        wtr.serialize(StopRecord {
            sequence: stop.sequence,
            latitude: stop.point.latitude,
            longitude: stop.point.longitude,
            place: stop.point.place.as_deref().unwrap_or(""),
            kind: stop.point.kind.to_string(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_tour_json<P: AsRef<Path>>(tour: &Tour, path: P) -> Result<(), PointsError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, tour)?;
    Ok(())
}

pub fn save_tour_csv<P: AsRef<Path>>(tour: &Tour, path: P) -> Result<(), PointsError> {
    let file = File::create(path)?;
    write_tour_csv(tour, file)
}
