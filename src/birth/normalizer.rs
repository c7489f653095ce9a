//! Alias probing and ordered date/time parsing.

use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Value};

use super::{BirthDataError, BirthField, BirthRecord};

/// Accepted date formats as `(chrono pattern, human label)`, in precedence order.
pub const DATE_FORMATS: &[(&str, &str)] = &[
    ("%Y-%m-%d", "YYYY-MM-DD"),
    ("%d-%m-%Y", "DD-MM-YYYY"),
    ("%m/%d/%Y", "MM/DD/YYYY"),
    ("%d/%m/%Y", "DD/MM/YYYY"),
    ("%Y/%m/%d", "YYYY/MM/DD"),
    ("%d.%m.%Y", "DD.MM.YYYY"),
    ("%m.%d.%Y", "MM.DD.YYYY"),
    ("%d %m %Y", "DD MM YYYY"),
    ("%B %d, %Y", "Month DD, YYYY"),
    ("%d %B %Y", "DD Month YYYY"),
];

/// Accepted time formats, in precedence order.
pub const TIME_FORMATS: &[(&str, &str)] = &[
    ("%H:%M:%S", "HH:MM:SS"),
    ("%H:%M", "HH:MM"),
    ("%I:%M:%S %p", "HH:MM:SS AM/PM"),
    ("%I:%M %p", "HH:MM AM/PM"),
];

fn supported(formats: &[(&str, &str)]) -> String {
    formats
        .iter()
        .map(|(_, label)| *label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a date with the first matching entry of [`DATE_FORMATS`].
pub fn parse_birth_date(raw: &str) -> Result<NaiveDate, BirthDataError> {
    let value = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|(pattern, _)| NaiveDate::parse_from_str(value, pattern).ok())
        .ok_or_else(|| BirthDataError::UnparsableDate {
            value: value.to_string(),
            supported: supported(DATE_FORMATS),
        })
}

/// Parse a time with the first matching entry of [`TIME_FORMATS`].
pub fn parse_birth_time(raw: &str) -> Result<NaiveTime, BirthDataError> {
    let value = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|(pattern, _)| NaiveTime::parse_from_str(value, pattern).ok())
        .ok_or_else(|| BirthDataError::UnparsableTime {
            value: value.to_string(),
            supported: supported(TIME_FORMATS),
        })
}

/// First non-empty string value among the field's aliases.
fn probe(data: &Map<String, Value>, field: BirthField) -> Option<String> {
    field.aliases().iter().find_map(|key| {
        data.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Normalize a loosely-keyed birth payload.
///
/// Required fields are checked in the order name, date, time, place before
/// any parsing happens; the timezone falls back to `default_timezone`.
pub fn normalize_birth_data(
    data: &Map<String, Value>,
    default_timezone: &str,
) -> Result<BirthRecord, BirthDataError> {
    let name = probe(data, BirthField::Name);
    let dob = probe(data, BirthField::Date);
    let tob = probe(data, BirthField::Time);
    let place = probe(data, BirthField::Place);
    let timezone =
        probe(data, BirthField::Timezone).unwrap_or_else(|| default_timezone.to_string());

    let name = name.ok_or(BirthDataError::MissingField(BirthField::Name))?;
    let dob = dob.ok_or(BirthDataError::MissingField(BirthField::Date))?;
    let tob = tob.ok_or(BirthDataError::MissingField(BirthField::Time))?;
    let place = place.ok_or(BirthDataError::MissingField(BirthField::Place))?;

    let record = BirthRecord {
        name,
        date_of_birth: parse_birth_date(&dob)?,
        time_of_birth: parse_birth_time(&tob)?,
        place,
        timezone,
    };
    log::debug!(
        "Normalized birth data: dob={}, tob={}, tz={}",
        record.dob_string(),
        record.tob_string(),
        record.timezone
    );
    Ok(record)
}
