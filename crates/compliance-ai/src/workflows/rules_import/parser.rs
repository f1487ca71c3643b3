use super::normalizer::{normalize_name, normalize_state};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::str::FromStr;

#[derive(Debug)]
pub(crate) struct RuleRecord {
    pub(crate) state: String,
    pub(crate) entity_type: String,
    pub(crate) event_type: String,
    pub(crate) rule_name: String,
    pub(crate) month: Option<u32>,
    pub(crate) day: Option<u32>,
    pub(crate) offset_days: Option<i64>,
    pub(crate) lead_times: Option<Vec<i64>>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<RuleRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<RuleRow>() {
        let row = record?;
        records.push(RuleRecord {
            state: normalize_state(&row.state),
            entity_type: normalize_name(&row.entity_type),
            event_type: normalize_name(&row.event_type),
            rule_name: normalize_name(&row.rule),
            month: row.month(),
            day: row.day(),
            offset_days: row.offset_days(),
            lead_times: row.lead_times(),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Entity Type")]
    entity_type: String,
    #[serde(rename = "Event Type")]
    event_type: String,
    #[serde(rename = "Rule")]
    rule: String,
    #[serde(rename = "Month", default, deserialize_with = "empty_string_as_none")]
    month: Option<String>,
    #[serde(rename = "Day", default, deserialize_with = "empty_string_as_none")]
    day: Option<String>,
    #[serde(
        rename = "Offset Days",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    offset_days: Option<String>,
    #[serde(
        rename = "Lead Times",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    lead_times: Option<String>,
}

impl RuleRow {
    fn month(&self) -> Option<u32> {
        self.month.as_deref().and_then(parse_number)
    }

    fn day(&self) -> Option<u32> {
        self.day.as_deref().and_then(parse_number)
    }

    fn offset_days(&self) -> Option<i64> {
        self.offset_days.as_deref().and_then(parse_number)
    }

    fn lead_times(&self) -> Option<Vec<i64>> {
        self.lead_times.as_deref().and_then(parse_lead_times)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_number<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

/// Lead times arrive as a semicolon-separated list ("90;30;7"). One bad
/// segment invalidates the whole list.
fn parse_lead_times(value: &str) -> Option<Vec<i64>> {
    let days: Option<Vec<i64>> = value
        .split(';')
        .map(|segment| parse_number(segment))
        .collect();
    days.filter(|days| !days.is_empty())
}

#[cfg(test)]
pub(crate) fn parse_lead_times_for_tests(value: &str) -> Option<Vec<i64>> {
    parse_lead_times(value)
}
