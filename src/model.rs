use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The five leave categories an employee can draw from.
///
/// Stored transactions keep the raw tag string (so unknown tags written by
/// older or hand-edited stores survive a round-trip); this enum is what the
/// calculator and validator operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveCategory {
    Annual,
    Sick,
    Family,
    Study,
    Religious,
}

impl LeaveCategory {
    pub const ALL: [LeaveCategory; 5] = [
        LeaveCategory::Annual,
        LeaveCategory::Sick,
        LeaveCategory::Family,
        LeaveCategory::Study,
        LeaveCategory::Religious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveCategory::Annual => "annual",
            LeaveCategory::Sick => "sick",
            LeaveCategory::Family => "family",
            LeaveCategory::Study => "study",
            LeaveCategory::Religious => "religious",
        }
    }

    /// Parse a stored category tag. Unknown tags yield `None` and are
    /// ignored by the balance calculator.
    pub fn parse(tag: &str) -> Option<LeaveCategory> {
        match tag.trim().to_lowercase().as_str() {
            "annual" => Some(LeaveCategory::Annual),
            "sick" => Some(LeaveCategory::Sick),
            "family" => Some(LeaveCategory::Family),
            "study" => Some(LeaveCategory::Study),
            "religious" => Some(LeaveCategory::Religious),
            _ => None,
        }
    }
}

/// A single leave deduction. Append-only: no id, no amendment, no reversal.
///
/// Field names match the browser storage format exactly, so a store written
/// by the browser client loads unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveTransaction {
    /// Raw category tag ("annual", "sick", ...). Kept as a string: unknown
    /// tags are preserved on save and skipped during computation.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Quantity in days. Malformed values in the store collapse to 0.0 and
    /// the transaction is then skipped by the calculator.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub days: f64,

    /// Effective date as an RFC 3339 string. Missing or unparseable dates
    /// fall back to the "as of" instant at computation time.
    #[serde(rename = "dateISO", default, skip_serializing_if = "Option::is_none")]
    pub date_iso: Option<String>,
}

impl LeaveTransaction {
    pub fn new(category: LeaveCategory, days: f64, date: DateTime<Utc>) -> Self {
        LeaveTransaction {
            kind: category.as_str().to_string(),
            days,
            date_iso: Some(date.to_rfc3339()),
        }
    }

    /// Category of this transaction, if the tag is recognized.
    pub fn category(&self) -> Option<LeaveCategory> {
        LeaveCategory::parse(&self.kind)
    }

    /// Effective date, if present and parseable.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.date_iso
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Employee record: starting balances + append-only transaction history.
///
/// Balances are never stored; they are projected from this record by
/// [`crate::balance::balances_as_of`]. Employees are created once and never
/// updated, aside from transaction appends and the global reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Free-text start period, MM/YY (display only).
    #[serde(rename = "startDisplay", default)]
    pub start_display: String,

    #[serde(rename = "annualStart", default)]
    pub annual_start: f64,

    #[serde(rename = "sickStart", default)]
    pub sick_start: f64,

    #[serde(rename = "familyStart", default)]
    pub family_start: f64,

    #[serde(rename = "studyStart", default)]
    pub study_start: f64,

    #[serde(rename = "religiousStart", default)]
    pub religious_start: f64,

    /// Days of annual leave accrued per whole elapsed month since baseline.
    #[serde(rename = "annualAccrualPerMonth", default)]
    pub annual_accrual_per_month: f64,

    #[serde(default)]
    pub transactions: Vec<LeaveTransaction>,
}

/// Starting balances supplied when an employee is created.
#[derive(Debug, Clone, Default)]
pub struct StartingBalances {
    pub annual: f64,
    pub sick: f64,
    pub family: f64,
    pub study: f64,
    pub religious: f64,
    pub accrual_per_month: f64,
}

impl Employee {
    /// Create a new employee with a fresh UUID and empty history.
    pub fn new(name: &str, start_display: &str, start: StartingBalances) -> Self {
        Employee {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            start_display: start_display.to_string(),
            annual_start: start.annual,
            sick_start: start.sick,
            family_start: start.family,
            study_start: start.study,
            religious_start: start.religious,
            annual_accrual_per_month: start.accrual_per_month,
            transactions: Vec::new(),
        }
    }

    /// Starting balance for a category.
    pub fn starting_balance(&self, category: LeaveCategory) -> f64 {
        match category {
            LeaveCategory::Annual => self.annual_start,
            LeaveCategory::Sick => self.sick_start,
            LeaveCategory::Family => self.family_start,
            LeaveCategory::Study => self.study_start,
            LeaveCategory::Religious => self.religious_start,
        }
    }
}

/// Parsed MM/YY start period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPeriod {
    pub month: u32,
    /// Full year (two-digit input is 2000-based).
    pub year: i32,
}

/// Parse a start period in MM/YY form, e.g. "01/26".
///
/// Month must be 01-12; anything else is rejected.
pub fn parse_mm_yy(input: &str) -> Option<StartPeriod> {
    let trimmed = input.trim();
    let (mm, yy) = trimmed.split_once('/')?;
    if mm.len() != 2 || yy.len() != 2 {
        return None;
    }
    if !mm.bytes().all(|b| b.is_ascii_digit()) || !yy.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u32 = mm.parse().ok()?;
    let year_two_digits: i32 = yy.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(StartPeriod {
        month,
        year: 2000 + year_two_digits,
    })
}

/// Accept a JSON number, a numeric string, or anything else as 0.0, so a
/// hand-edited store degrades to skipped transactions rather than a failed
/// load.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}
