//! Deterministic stand-in charts.
//!
//! Every pseudo-random choice is drawn from a SHA-256 digest of the birth
//! details, so the same person always gets the same mock.

use std::collections::BTreeMap;

use serde_json::json;
use sha2::{Digest, Sha256};

use super::{ChartConfig, ChartData, Coordinates, MangalDosha, RenderedChart};
use crate::birth::BirthRecord;

pub const PLANET_CODES: [&str; 9] = ["Su", "Mo", "Ma", "Me", "Ju", "Ve", "Sa", "Ra", "Ke"];

pub const SIGN_NAMES: [&str; 12] = [
    "Aries",
    "Taurus",
    "Gemini",
    "Cancer",
    "Leo",
    "Virgo",
    "Libra",
    "Scorpio",
    "Sagittarius",
    "Capricorn",
    "Aquarius",
    "Pisces",
];

const MOCK_PLANET_COUNT: usize = 5;

fn birth_digest(record: &BirthRecord) -> [u8; 32] {
    let dob = record.dob_string();
    let tob = record.tob_string();
    let mut hasher = Sha256::new();
    for part in [record.name.as_str(), dob.as_str(), tob.as_str(), record.place.as_str()] {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    hasher.finalize().into()
}

/// Pick `MOCK_PLANET_COUNT` distinct planets and give each a house.
fn sample_planets(digest: &[u8; 32]) -> BTreeMap<u8, Vec<String>> {
    let mut pool: Vec<&str> = PLANET_CODES.to_vec();
    let mut houses: BTreeMap<u8, Vec<String>> = (1..=12).map(|h| (h, Vec::new())).collect();
    for i in 0..MOCK_PLANET_COUNT {
        let planet = pool.remove(digest[i] as usize % pool.len());
        let house = digest[MOCK_PLANET_COUNT + i] % 12 + 1;
        houses.entry(house).or_default().push(planet.to_string());
    }
    houses
}

/// Mock [`ChartData`] with `is_mock_data` set.
pub fn mock_chart_data(record: &BirthRecord, coordinates: Coordinates) -> ChartData {
    let digest = birth_digest(record);
    let ascendant = digest[12] % 12 + 1;
    let dosha_present = digest[13] % 10 < 3;
    let dosha = MangalDosha {
        is_present: dosha_present,
        description: if dosha_present {
            "Mangal Dosha present - may affect marriage timing"
        } else {
            "Mangal Dosha absent - favorable for marriage"
        }
        .to_string(),
    };

    ChartData {
        name: record.name.clone(),
        dob_date: record.dob_string(),
        tob_time: record.tob_string(),
        ascendant_sign: i64::from(ascendant),
        ascendant_sign_name: SIGN_NAMES[usize::from(ascendant - 1)].to_string(),
        planets: sample_planets(&digest),
        mangal_dosha: json!(dosha),
        birth_location: record.place.clone(),
        coordinates,
        timezone: record.timezone.clone(),
        chart_config: ChartConfig::default(),
        prokerala_data: Some(json!({})),
        dasha_periods: Some(json!({})),
        sade_sati: Some(json!({})),
        yoga: Some(json!([])),
        is_mock_data: true,
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Placeholder SVG with `is_mock` set.
pub fn mock_rendered_chart(record: &BirthRecord) -> RenderedChart {
    let svg = format!(
        r##"<svg width="400" height="400" xmlns="http://www.w3.org/2000/svg">
    <circle cx="200" cy="200" r="180" fill="none" stroke="#333" stroke-width="2"/>
    <text x="200" y="50" text-anchor="middle" font-size="16" font-weight="bold">{name}'s Kundli Chart</text>
    <text x="200" y="80" text-anchor="middle" font-size="12">KP Astrology (Ayanamsa 5)</text>
    <text x="200" y="100" text-anchor="middle" font-size="12">North Indian Style</text>
    <text x="200" y="130" text-anchor="middle" font-size="10">Birth: {dob} {tob}</text>
    <text x="200" y="150" text-anchor="middle" font-size="10">Place: {place}</text>
    <text x="200" y="350" text-anchor="middle" font-size="12" fill="#666">Mock Chart - Real chart will be generated with ProKerala API</text>
</svg>"##,
        name = escape_xml(&record.name),
        dob = record.dob_string(),
        tob = record.tob_string(),
        place = escape_xml(&record.place),
    );
    RenderedChart {
        is_mock: true,
        ..RenderedChart::svg(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn record(name: &str) -> BirthRecord {
        BirthRecord {
            name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 3, 15).unwrap(),
            time_of_birth: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            place: "Pune".to_string(),
            timezone: "Asia/Kolkata".to_string(),
        }
    }

    #[test]
    fn test_mock_is_deterministic() {
        let coordinates = Coordinates::new(18.52, 73.85);
        assert_eq!(
            mock_chart_data(&record("Asha"), coordinates),
            mock_chart_data(&record("Asha"), coordinates)
        );
    }

    #[test]
    fn test_mock_places_five_distinct_planets() {
        for name in ["Asha", "Ravi", "Meera", "Kabir"] {
            let chart = mock_chart_data(&record(name), Coordinates::new(0.0, 0.0));
            let mut placed: Vec<&String> = chart.planets.values().flatten().collect();
            assert_eq!(placed.len(), 5);
            placed.sort();
            placed.dedup();
            assert_eq!(placed.len(), 5);
            assert_eq!(chart.planets.len(), 12);
            assert!((1..=12).contains(&chart.ascendant_sign));
            assert_eq!(
                chart.ascendant_sign_name,
                SIGN_NAMES[(chart.ascendant_sign - 1) as usize]
            );
        }
    }

    #[test]
    fn test_mock_carries_birth_details() {
        let chart = mock_chart_data(&record("Asha"), Coordinates::new(18.52, 73.85));
        assert!(chart.is_mock_data);
        assert_eq!(chart.dob_date, "1990-03-15");
        assert_eq!(chart.tob_time, "10:30:00");
        assert!(chart.mangal_dosha["description"]
            .as_str()
            .unwrap()
            .starts_with("Mangal Dosha"));
    }

    #[test]
    fn test_mock_has_every_live_key() {
        let coordinates = Coordinates::new(18.52, 73.85);
        let live = crate::chart::prokerala::assemble_chart(
            &record("Asha"),
            coordinates,
            vec![json!({"id": 100, "name": "Lagna", "rasi": {"id": 4, "name": "Karka"}})],
            json!({"mangal_dosha": {"has_dosha": false}}),
            Vec::new(),
        );
        let live = serde_json::to_value(&live).unwrap();
        let mock = serde_json::to_value(mock_chart_data(&record("Asha"), coordinates)).unwrap();

        let missing: Vec<&String> = live
            .as_object()
            .unwrap()
            .keys()
            .filter(|key| mock.get(key.as_str()).is_none())
            .collect();
        assert!(missing.is_empty(), "mock lacks live keys: {:?}", missing);
        assert_eq!(mock["yoga"], json!([]));
        assert_eq!(mock["is_mock_data"], true);
    }

    #[test]
    fn test_mock_svg_escapes_text() {
        let chart = mock_rendered_chart(&record("A<b>&c"));
        assert!(chart.is_mock);
        let svg = chart.svg_content.unwrap();
        assert!(svg.contains("A&lt;b&gt;&amp;c's Kundli Chart"));
        assert!(svg.starts_with("<svg"));
    }
}
