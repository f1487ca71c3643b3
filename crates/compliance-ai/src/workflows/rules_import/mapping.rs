use super::normalizer::normalize_name;
use super::parser::RuleRecord;
use crate::workflows::compliance::deadline::DueDateRule;
use crate::workflows::compliance::domain::EntityType;
use std::collections::HashMap;
use std::sync::OnceLock;

static ENTITY_TYPE_MAP: OnceLock<HashMap<String, EntityType>> = OnceLock::new();

pub(crate) fn entity_type_for_normalized(normalized_name: &str) -> Option<EntityType> {
    entity_type_map().get(normalized_name).copied()
}

fn entity_type_map() -> &'static HashMap<String, EntityType> {
    ENTITY_TYPE_MAP.get_or_init(|| {
        const NAME_TO_TYPE: &[(&str, EntityType)] = &[
            ("LLC", EntityType::Llc),
            ("L.L.C.", EntityType::Llc),
            ("Limited Liability Company", EntityType::Llc),
            ("C Corporation", EntityType::CCorporation),
            ("C-Corp", EntityType::CCorporation),
            ("C Corp", EntityType::CCorporation),
            ("Corporation", EntityType::CCorporation),
            ("S Corporation", EntityType::SCorporation),
            ("S-Corp", EntityType::SCorporation),
            ("S Corp", EntityType::SCorporation),
            ("Partnership", EntityType::Partnership),
            ("General Partnership", EntityType::Partnership),
            ("Limited Partnership", EntityType::Partnership),
            ("Sole Proprietorship", EntityType::SoleProprietorship),
            ("Sole Proprietor", EntityType::SoleProprietorship),
        ];

        let mut map = HashMap::with_capacity(NAME_TO_TYPE.len());
        for (name, entity_type) in NAME_TO_TYPE {
            map.insert(normalize_name(name), *entity_type);
        }
        map
    })
}

/// Turn one export row into a due-date rule. Rows name the schedule family;
/// fixed dates and formation offsets also need their numeric columns.
pub(crate) fn resolve_rule(record: &RuleRecord) -> Result<DueDateRule, String> {
    match record.rule_name.as_str() {
        "quarterly estimates" | "quarterly estimated tax" => Ok(DueDateRule::QuarterlyEstimates),
        "anniversary month end" | "formation anniversary" => Ok(DueDateRule::AnniversaryMonthEnd),
        "biennial formation month" => Ok(DueDateRule::BiennialFormationMonth),
        "fixed date" => {
            let month = record
                .month
                .filter(|month| (1..=12).contains(month))
                .ok_or_else(|| "fixed date rule needs a month between 1 and 12".to_string())?;
            let day = record
                .day
                .filter(|day| (1..=31).contains(day))
                .ok_or_else(|| "fixed date rule needs a day between 1 and 31".to_string())?;
            Ok(DueDateRule::FixedDate { month, day })
        }
        "days from formation" => {
            let days = record
                .offset_days
                .filter(|days| *days > 0)
                .ok_or_else(|| "days from formation rule needs a positive offset".to_string())?;
            Ok(DueDateRule::DaysFromFormation(days))
        }
        "year after formation" => Ok(DueDateRule::YearAfterFormation),
        other => Err(format!("unrecognized rule {other:?}")),
    }
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(name: &str) -> Option<EntityType> {
    let normalized = normalize_name(name);
    entity_type_for_normalized(&normalized)
}
