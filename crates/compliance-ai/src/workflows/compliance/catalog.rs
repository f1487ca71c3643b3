use std::collections::HashMap;

use chrono::NaiveDate;

use super::deadline::DueDateRule;
use super::domain::{BusinessEntity, EntityType, EventCategory, EventPriority, RecurringInterval};

/// Where a template applies: every state or an explicit list.
#[derive(Debug, Clone, PartialEq)]
pub enum StateScope {
    Nationwide,
    States(Vec<&'static str>),
}

impl StateScope {
    pub fn covers(&self, state: &str) -> bool {
        match self {
            StateScope::Nationwide => true,
            StateScope::States(states) => {
                states.iter().any(|code| code.eq_ignore_ascii_case(state))
            }
        }
    }
}

/// Template describing one kind of compliance obligation: who it applies to,
/// when it falls due, and how far ahead reminders are staged.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceTemplate {
    pub event_type: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: EventCategory,
    pub priority: EventPriority,
    pub recurrence: Option<RecurringInterval>,
    pub entity_types: Vec<EntityType>,
    pub states: StateScope,
    pub due: DueDateRule,
    pub lead_times: Vec<i64>,
}

impl ComplianceTemplate {
    pub fn applies_to(&self, entity: &BusinessEntity) -> bool {
        self.entity_types.contains(&entity.entity_type) && self.states.covers(&entity.state)
    }
}

/// Jurisdiction-specific refinement layered over a catalog template. A row
/// replaces the due-date rule and may replace the reminder lead times.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOverride {
    pub due: DueDateRule,
    pub lead_times: Option<Vec<i64>>,
}

/// Override table keyed by state, entity type, and event type. Loaded from
/// regulatory data exports so rule changes ship as data, not code.
#[derive(Debug, Default, Clone)]
pub struct RuleOverrides {
    rules: HashMap<(String, EntityType, String), RuleOverride>,
}

impl RuleOverrides {
    pub fn insert(
        &mut self,
        state: &str,
        entity_type: EntityType,
        event_type: &str,
        rule: RuleOverride,
    ) {
        self.rules.insert(key(state, entity_type, event_type), rule);
    }

    pub fn lookup(
        &self,
        state: &str,
        entity_type: EntityType,
        event_type: &str,
    ) -> Option<&RuleOverride> {
        self.rules.get(&key(state, entity_type, event_type))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn key(state: &str, entity_type: EntityType, event_type: &str) -> (String, EntityType, String) {
    (
        state.trim().to_ascii_uppercase(),
        entity_type,
        event_type.trim().to_ascii_lowercase(),
    )
}

/// A template with its override (if any) already applied for one entity's
/// jurisdiction.
#[derive(Debug, Clone)]
pub struct EffectiveTemplate<'a> {
    pub template: &'a ComplianceTemplate,
    pub due: DueDateRule,
    pub lead_times: Vec<i64>,
}

/// The standard obligation catalog plus any loaded overrides.
#[derive(Debug, Clone)]
pub struct ComplianceCatalog {
    templates: Vec<ComplianceTemplate>,
    overrides: RuleOverrides,
}

impl ComplianceCatalog {
    pub fn standard() -> Self {
        Self {
            templates: standard_templates(),
            overrides: RuleOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: RuleOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn templates(&self) -> &[ComplianceTemplate] {
        &self.templates
    }

    pub fn template(&self, event_type: &str) -> Option<&ComplianceTemplate> {
        self.templates
            .iter()
            .find(|template| template.event_type == event_type)
    }

    pub fn templates_for_category(&self, category: EventCategory) -> Vec<&ComplianceTemplate> {
        self.templates
            .iter()
            .filter(|template| template.category == category)
            .collect()
    }

    /// Templates applicable to the entity, each with jurisdiction overrides
    /// resolved.
    pub fn applicable(&self, entity: &BusinessEntity) -> Vec<EffectiveTemplate<'_>> {
        self.templates
            .iter()
            .filter(|template| template.applies_to(entity))
            .map(|template| self.resolve(template, entity))
            .collect()
    }

    /// The effective rule for one event type and entity, used when a rolled
    /// entry needs its reminder schedule re-derived.
    pub fn effective(
        &self,
        event_type: &str,
        entity: &BusinessEntity,
    ) -> Option<EffectiveTemplate<'_>> {
        self.template(event_type)
            .map(|template| self.resolve(template, entity))
    }

    fn resolve<'a>(
        &self,
        template: &'a ComplianceTemplate,
        entity: &BusinessEntity,
    ) -> EffectiveTemplate<'a> {
        match self
            .overrides
            .lookup(&entity.state, entity.entity_type, template.event_type)
        {
            Some(rule) => EffectiveTemplate {
                template,
                due: rule.due,
                lead_times: rule
                    .lead_times
                    .clone()
                    .unwrap_or_else(|| template.lead_times.clone()),
            },
            None => EffectiveTemplate {
                template,
                due: template.due,
                lead_times: template.lead_times.clone(),
            },
        }
    }
}

fn standard_templates() -> Vec<ComplianceTemplate> {
    let boir_floor = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid statutory floor");

    vec![
        ComplianceTemplate {
            event_type: "quarterly_estimated_tax",
            title: "Quarterly Estimated Tax Payment",
            description: "Federal estimated tax installment covering income not subject to \
                          withholding. Underpayment accrues penalties from the installment date.",
            category: EventCategory::Tax,
            priority: EventPriority::High,
            recurrence: Some(RecurringInterval::Quarterly),
            entity_types: EntityType::ordered().to_vec(),
            states: StateScope::Nationwide,
            due: DueDateRule::QuarterlyEstimates,
            lead_times: vec![14, 7, 1],
        },
        ComplianceTemplate {
            event_type: "annual_report",
            title: "Annual Report Filing",
            description: "State-of-record annual report confirming registered agent, principal \
                          address, and management. Lapsed reports lead to administrative \
                          dissolution.",
            category: EventCategory::StateFiling,
            priority: EventPriority::High,
            recurrence: Some(RecurringInterval::Annual),
            entity_types: vec![
                EntityType::Llc,
                EntityType::CCorporation,
                EntityType::SCorporation,
            ],
            states: StateScope::Nationwide,
            due: DueDateRule::AnniversaryMonthEnd,
            lead_times: vec![90, 30, 14, 7, 1],
        },
        ComplianceTemplate {
            event_type: "biennial_statement",
            title: "Biennial Statement",
            description: "New York biennial statement updating the service-of-process address \
                          and chief executive details with the Department of State.",
            category: EventCategory::StateFiling,
            priority: EventPriority::Medium,
            recurrence: Some(RecurringInterval::Biennial),
            entity_types: vec![EntityType::Llc, EntityType::CCorporation],
            states: StateScope::States(vec!["NY"]),
            due: DueDateRule::BiennialFormationMonth,
            lead_times: vec![60, 30, 7],
        },
        ComplianceTemplate {
            event_type: "ca_franchise_tax",
            title: "California LLC Franchise Tax",
            description: "Minimum franchise tax owed to the California Franchise Tax Board for \
                          the privilege of doing business in the state.",
            category: EventCategory::Tax,
            priority: EventPriority::High,
            recurrence: Some(RecurringInterval::Annual),
            entity_types: vec![EntityType::Llc],
            states: StateScope::States(vec!["CA"]),
            due: DueDateRule::FixedDate { month: 4, day: 15 },
            lead_times: vec![90, 30, 14, 7, 1],
        },
        ComplianceTemplate {
            event_type: "de_franchise_tax",
            title: "Delaware Franchise Tax",
            description: "Delaware corporate franchise tax and annual report, due March 1 with \
                          interest accruing on late balances.",
            category: EventCategory::Tax,
            priority: EventPriority::High,
            recurrence: Some(RecurringInterval::Annual),
            entity_types: vec![EntityType::CCorporation],
            states: StateScope::States(vec!["DE"]),
            due: DueDateRule::FixedDate { month: 3, day: 1 },
            lead_times: vec![60, 30, 14, 1],
        },
        ComplianceTemplate {
            event_type: "boir_filing",
            title: "Beneficial Ownership Information Report",
            description: "FinCEN beneficial ownership report identifying individuals who own or \
                          control the company. One-time filing for newly formed entities.",
            category: EventCategory::FederalFiling,
            priority: EventPriority::High,
            recurrence: None,
            entity_types: vec![
                EntityType::Llc,
                EntityType::CCorporation,
                EntityType::SCorporation,
            ],
            states: StateScope::Nationwide,
            due: DueDateRule::DaysFromFormationWithFloor {
                days: 90,
                floor: boir_floor,
            },
            lead_times: vec![30, 14, 7, 1],
        },
        ComplianceTemplate {
            event_type: "s_corp_election",
            title: "S Corporation Election (Form 2553)",
            description: "Election window for taxation as an S corporation. Filing after the \
                          window requires late election relief with a reasonable cause \
                          statement.",
            category: EventCategory::FederalFiling,
            priority: EventPriority::Medium,
            recurrence: None,
            entity_types: vec![EntityType::SCorporation],
            states: StateScope::Nationwide,
            due: DueDateRule::DaysFromFormation(75),
            lead_times: vec![30, 14, 1],
        },
        ComplianceTemplate {
            event_type: "initial_statement_of_information",
            title: "Initial Statement of Information",
            description: "California initial statement of information naming managers and the \
                          agent for service of process, owed shortly after formation.",
            category: EventCategory::StateFiling,
            priority: EventPriority::High,
            recurrence: None,
            entity_types: vec![EntityType::Llc, EntityType::CCorporation],
            states: StateScope::States(vec!["CA"]),
            due: DueDateRule::DaysFromFormation(90),
            lead_times: vec![30, 14, 7, 1],
        },
        ComplianceTemplate {
            event_type: "business_license_renewal",
            title: "Business License Renewal",
            description: "Local operating license renewal. Jurisdictions differ; the default \
                          schedule keys off the formation anniversary until an override is \
                          loaded.",
            category: EventCategory::Licensing,
            priority: EventPriority::Medium,
            recurrence: Some(RecurringInterval::Annual),
            entity_types: EntityType::ordered().to_vec(),
            states: StateScope::Nationwide,
            due: DueDateRule::YearAfterFormation,
            lead_times: vec![60, 30, 7],
        },
        ComplianceTemplate {
            event_type: "registered_agent_renewal",
            title: "Registered Agent Renewal",
            description: "Commercial registered agent service renewal keeping the entity \
                          reachable for service of process.",
            category: EventCategory::Governance,
            priority: EventPriority::Low,
            recurrence: Some(RecurringInterval::Annual),
            entity_types: vec![
                EntityType::Llc,
                EntityType::CCorporation,
                EntityType::SCorporation,
                EntityType::Partnership,
            ],
            states: StateScope::Nationwide,
            due: DueDateRule::YearAfterFormation,
            lead_times: vec![30, 7],
        },
    ]
}
