//! Emergency station entities returned by the station directory.

use serde::{Deserialize, Serialize};

/// Geographic coordinate as sent by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Which list a station arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationCategory {
    Fire,
    Police,
}

impl std::fmt::Display for StationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fire => write!(f, "fire"),
            Self::Police => write!(f, "police"),
        }
    }
}

/// A station entry exactly as it appears inside one of the response lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationEntry {
    pub name: String,
    pub address: String,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, alias = "openingHours", skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<Vec<String>>,
}

/// A station with its category resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub address: String,
    pub location: Location,
    pub category: StationCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<Vec<String>>,
}

impl Station {
    fn from_entry(entry: StationEntry, category: StationCategory) -> Self {
        Self {
            name: entry.name,
            address: entry.address,
            location: entry.location,
            category,
            phone: entry.phone,
            opening_hours: entry.opening_hours,
        }
    }

    pub fn is_fire(&self) -> bool {
        self.category == StationCategory::Fire
    }
}

/// Body of `GET /stations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationsResponse {
    #[serde(default)]
    pub fire_stations: Vec<StationEntry>,
    #[serde(default)]
    pub police_stations: Vec<StationEntry>,
}

impl StationsResponse {
    /// Flatten both lists into one: fire stations first, then police, each in
    /// server order.
    pub fn into_stations(self) -> Vec<Station> {
        let mut out = Vec::with_capacity(self.fire_stations.len() + self.police_stations.len());
        out.extend(
            self.fire_stations
                .into_iter()
                .map(|e| Station::from_entry(e, StationCategory::Fire)),
        );
        out.extend(
            self.police_stations
                .into_iter()
                .map(|e| Station::from_entry(e, StationCategory::Police)),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_orders_fire_before_police() {
        let json = serde_json::json!({
            "police_stations": [
                {"name": "PNC Zona 1", "address": "6a Av", "location": {"lat": 14.64, "lng": -90.51}}
            ],
            "fire_stations": [
                {"name": "Bomberos 1", "address": "2a Calle", "location": {"lat": 14.63, "lng": -90.50}},
                {"name": "Bomberos 2", "address": "4a Calle", "location": {"lat": 14.62, "lng": -90.52},
                 "phone": "122", "opening_hours": ["24h"]}
            ]
        });
        let resp: StationsResponse = serde_json::from_value(json).unwrap();
        let stations = resp.into_stations();

        let names: Vec<_> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Bomberos 1", "Bomberos 2", "PNC Zona 1"]);
        assert!(stations[0].is_fire());
        assert_eq!(stations[1].phone.as_deref(), Some("122"));
        assert_eq!(stations[2].category, StationCategory::Police);
    }

    #[test]
    fn test_missing_list_is_empty() {
        let resp: StationsResponse = serde_json::from_str(r#"{"fire_stations": []}"#).unwrap();
        assert!(resp.into_stations().is_empty());
    }
}
