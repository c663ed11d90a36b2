//! Gazetteer of named places used to centre proximity searches.

use serde::Serialize;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Ocean,
    Sea,
    IndianPort,
    International,
    Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Place {
    pub name: &'static str,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    pub kind: PlaceKind,
}

const fn place(name: &'static str, latitude: f64, longitude: f64, kind: PlaceKind) -> Place {
    Place {
        name,
        latitude,
        longitude,
        kind,
    }
}

pub const GAZETTEER: &[Place] = &[
    place("arabian sea", 15.0, 62.5, PlaceKind::Sea),
    place("bay of bengal", 13.5, 87.5, PlaceKind::Sea),
    place("indian ocean", 0.0, 75.0, PlaceKind::Ocean),
    place("andaman sea", 10.0, 95.0, PlaceKind::Sea),
    place("laccadive sea", 11.0, 74.0, PlaceKind::Sea),
    place("red sea", 20.0, 38.0, PlaceKind::Sea),
    place("persian gulf", 27.0, 52.0, PlaceKind::Sea),
    place("mozambique channel", -18.0, 40.0, PlaceKind::Sea),
    place("pacific ocean", 0.0, 160.0, PlaceKind::Ocean),
    place("south china sea", 15.0, 115.0, PlaceKind::Sea),
    place("philippine sea", 20.0, 130.0, PlaceKind::Sea),
    place("coral sea", -16.0, 155.0, PlaceKind::Sea),
    place("tasman sea", -37.0, 162.0, PlaceKind::Sea),
    place("atlantic ocean", 25.0, -40.0, PlaceKind::Ocean),
    place("caribbean sea", 17.0, -75.0, PlaceKind::Sea),
    place("gulf of mexico", 25.0, -90.0, PlaceKind::Sea),
    place("mediterranean sea", 38.0, 18.0, PlaceKind::Sea),
    place("north sea", 56.0, 3.0, PlaceKind::Sea),
    place("chennai", 13.08, 80.27, PlaceKind::IndianPort),
    place("mumbai", 18.97, 72.82, PlaceKind::IndianPort),
    place("kollam", 8.88, 76.59, PlaceKind::IndianPort),
    place("kochi", 9.93, 76.26, PlaceKind::IndianPort),
    place("cochin", 9.93, 76.26, PlaceKind::IndianPort),
    place("goa", 15.30, 73.82, PlaceKind::IndianPort),
    place("kolkata", 22.57, 88.36, PlaceKind::IndianPort),
    place("visakhapatnam", 17.68, 83.22, PlaceKind::IndianPort),
    place("vizag", 17.68, 83.22, PlaceKind::IndianPort),
    place("mangalore", 12.91, 74.85, PlaceKind::IndianPort),
    place("tuticorin", 8.76, 78.13, PlaceKind::IndianPort),
    place("pondicherry", 11.93, 79.83, PlaceKind::IndianPort),
    place("puducherry", 11.93, 79.83, PlaceKind::IndianPort),
    place("trivandrum", 8.52, 76.94, PlaceKind::IndianPort),
    place("thiruvananthapuram", 8.52, 76.94, PlaceKind::IndianPort),
    place("surat", 21.17, 72.83, PlaceKind::IndianPort),
    place("kandla", 23.03, 70.22, PlaceKind::IndianPort),
    place("paradip", 20.32, 86.61, PlaceKind::IndianPort),
    place("andaman", 11.67, 92.75, PlaceKind::IndianPort),
    place("port blair", 11.62, 92.73, PlaceKind::IndianPort),
    place("karwar", 14.80, 74.13, PlaceKind::IndianPort),
    place("ratnagiri", 16.99, 73.30, PlaceKind::IndianPort),
    place("sri lanka", 7.5, 80.5, PlaceKind::International),
    place("singapore", 1.3, 104.0, PlaceKind::International),
    place("tokyo", 35.5, 140.0, PlaceKind::International),
    place("sydney", -34.0, 151.0, PlaceKind::International),
    place("cape town", -34.0, 18.0, PlaceKind::International),
    place("miami", 26.0, -80.0, PlaceKind::International),
    place("maldives", 4.17, 73.51, PlaceKind::International),
    place("mauritius", -20.2, 57.5, PlaceKind::International),
    place("equator", 0.0, 80.0, PlaceKind::Region),
    place("southern ocean", -55.0, 0.0, PlaceKind::Ocean),
    place("tropics", 10.0, 80.0, PlaceKind::Region),
];

impl Place {
    #[must_use]
    pub fn point(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.latitude, self.longitude).ok()
    }
}

/// Looks a place up by name, ignoring case and repeated whitespace.
#[must_use]
pub fn resolve(name: &str) -> Option<&'static Place> {
    let normalized = normalize_name(name);
    if normalized.is_empty() {
        return None;
    }
    GAZETTEER.iter().find(|place| place.name == normalized)
}

#[must_use]
pub fn entries() -> &'static [Place] {
    GAZETTEER
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
