use chrono::{Datelike, Duration, Months, NaiveDate};

/// Due-date policy for one compliance event type.
///
/// Rules are civil-calendar arithmetic over the formation date and a
/// reference year. Statutory deadlines are published as calendar days, so
/// dates stay naive and no timezone shifting is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateRule {
    /// IRS estimated-tax schedule: April 15, June 15, September 15 of the
    /// reference year plus January 15 of the following year.
    QuarterlyEstimates,
    /// Last day of the formation-anniversary month in the reference year.
    AnniversaryMonthEnd,
    /// Last day of the formation month every second year from formation.
    BiennialFormationMonth,
    /// Fixed statutory date in the reference year.
    FixedDate { month: u32, day: u32 },
    /// Offset from the formation date.
    DaysFromFormation(i64),
    /// Offset from the formation date, never earlier than a statutory floor.
    DaysFromFormationWithFloor { days: i64, floor: NaiveDate },
    /// Fallback for event types without a dedicated rule: one year out from
    /// formation.
    YearAfterFormation,
}

impl DueDateRule {
    /// Candidate dates for the cycle anchored at `reference_year`, before
    /// any filtering against the current date.
    pub fn cycle_dates(&self, formation: NaiveDate, reference_year: i32) -> Vec<NaiveDate> {
        match self {
            DueDateRule::QuarterlyEstimates => [
                (reference_year, 4, 15),
                (reference_year, 6, 15),
                (reference_year, 9, 15),
                (reference_year + 1, 1, 15),
            ]
            .into_iter()
            .filter_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day))
            .collect(),
            DueDateRule::AnniversaryMonthEnd => {
                last_day_of_month(reference_year, formation.month())
                    .into_iter()
                    .collect()
            }
            DueDateRule::BiennialFormationMonth => {
                let mut year = if (reference_year - formation.year()).rem_euclid(2) == 0 {
                    reference_year
                } else {
                    reference_year + 1
                };
                // The first statement is never owed in the formation year.
                if year <= formation.year() {
                    year = formation.year() + 2;
                }
                last_day_of_month(year, formation.month())
                    .into_iter()
                    .collect()
            }
            DueDateRule::FixedDate { month, day } => clamped_date(reference_year, *month, *day)
                .into_iter()
                .collect(),
            DueDateRule::DaysFromFormation(days) => {
                vec![formation + Duration::days(*days)]
            }
            DueDateRule::DaysFromFormationWithFloor { days, floor } => {
                vec![(formation + Duration::days(*days)).max(*floor)]
            }
            DueDateRule::YearAfterFormation => formation
                .checked_add_months(Months::new(12))
                .into_iter()
                .collect(),
        }
    }

    /// Concrete due dates for the cycle containing `today`, keeping only
    /// dates strictly in the future. Dates already past are dropped, never
    /// back-filled; the next cycle's materialization picks the obligation up
    /// again.
    pub fn due_dates(&self, formation: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
        self.cycle_dates(formation, today.year())
            .into_iter()
            .filter(|date| *date > today)
            .collect()
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// Resolves a year-month-day triple, clamping day overflow to the month end
/// so a statutory "February 29" stays valid in non-leap years.
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| last_day_of_month(year, month))
}
