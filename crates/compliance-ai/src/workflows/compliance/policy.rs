use super::domain::NotificationChannel;

/// Engine-level policy: which channels fire, how many delivery attempts a
/// reminder gets, and the statutory windows that must stay configuration
/// rather than code.
#[derive(Debug, Clone)]
pub struct EnginePolicy {
    pub channels: Vec<NotificationChannel>,
    pub retry_cap: u8,
    pub upcoming_horizon_days: i64,
    pub regulatory: RegulatoryWindows,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            channels: vec![
                NotificationChannel::Email,
                NotificationChannel::Sms,
                NotificationChannel::Dashboard,
            ],
            retry_cap: 3,
            upcoming_horizon_days: 90,
            regulatory: RegulatoryWindows::default(),
        }
    }
}

/// Relief windows quoted in report guidance.
#[derive(Debug, Clone)]
pub struct RegulatoryWindows {
    /// Form 2553 late election relief: years component of the window.
    pub late_election_relief_years: i32,
    /// Form 2553 late election relief: days component of the window.
    pub late_election_relief_days: i64,
}

impl Default for RegulatoryWindows {
    fn default() -> Self {
        Self {
            late_election_relief_years: 3,
            late_election_relief_days: 75,
        }
    }
}
