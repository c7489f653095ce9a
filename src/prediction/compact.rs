//! Prompt-sized projection of a chart payload.

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

/// Upper bound on the serialized chart context, in characters.
pub const CHART_CONTEXT_LIMIT: usize = 3000;

const MAX_CODES_PER_HOUSE: usize = 5;
const DESCRIPTION_LIMIT: usize = 200;

/// First `limit` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn non_empty_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object).filter(|map| !map.is_empty())
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn compact_planets(chart: &Value) -> Map<String, Value> {
    let Some(planets) = chart.get("planets").and_then(Value::as_object) else {
        return Map::new();
    };
    planets
        .iter()
        .map(|(house, codes)| {
            let kept: Vec<Value> = codes
                .as_array()
                .map(|list| list.iter().take(MAX_CODES_PER_HOUSE).cloned().collect())
                .unwrap_or_default();
            (house.clone(), Value::Array(kept))
        })
        .collect()
}

/// Reduce a chart to the fields a consultation prompt needs.
///
/// `dob` is the already-resolved birth date (possibly the sentinel) so the
/// projection and the age gate always agree.
pub fn compact_chart(chart: &Value, dob: NaiveDate) -> Value {
    let prokerala = non_empty_object(chart.get("prokerala_data"));
    let mangal = non_empty_object(chart.get("mangal_dosha"))
        .or_else(|| prokerala.and_then(|p| non_empty_object(p.get("mangal_dosha"))));

    let is_present = truthy(mangal.and_then(|m| m.get("is_present").or_else(|| m.get("has_dosha"))));
    let description = mangal
        .and_then(|m| m.get("description"))
        .and_then(Value::as_str)
        .map(|d| truncate_chars(d, DESCRIPTION_LIMIT))
        .unwrap_or("");

    let name = chart
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .unwrap_or("User");
    let chart_config = non_empty_object(chart.get("chart_config"))
        .map(|c| Value::Object(c.clone()))
        .unwrap_or_else(|| {
            json!({
                "ayanamsa": 5,
                "chart_style": "north-indian",
                "astrology_system": "KP"
            })
        });
    let field = |key: &str| chart.get(key).cloned().unwrap_or(Value::Null);

    json!({
        "name": name,
        "dob_date": dob.format("%Y-%m-%d").to_string(),
        "ascendant_sign": field("ascendant_sign"),
        "ascendant_sign_name": field("ascendant_sign_name"),
        "planets": compact_planets(chart),
        "mangal_dosha": {
            "is_present": is_present,
            "description": description,
        },
        "birth_location": field("birth_location"),
        "coordinates": field("coordinates"),
        "timezone": field("timezone"),
        "chart_config": chart_config,
        "summary": {
            "has_chart_svg": truthy(chart.get("svg_content")),
            "has_prokerala": prokerala.is_some(),
        }
    })
}

/// Serialized [`compact_chart`], cut to [`CHART_CONTEXT_LIMIT`] characters.
pub fn compact_chart_json(chart: &Value, dob: NaiveDate) -> String {
    let serialized = compact_chart(chart, dob).to_string();
    truncate_chars(&serialized, CHART_CONTEXT_LIMIT).to_string()
}
