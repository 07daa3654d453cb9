use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use ceramerp_core::{DomainError, Entity, define_id, non_negative};

define_id!(TaxId, "TaxId");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    Vat,
    CorporateIncome,
    Withholding,
    SocialSecurity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxStatus {
    #[default]
    Pending,
    Paid,
}

/// Calendar month a tax obligation refers to, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if !(1..=12).contains(&month) || !(1900..=9999).contains(&year) {
            return Err(DomainError::validation(format!(
                "invalid period {year:04}-{month:02}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day() - Duration::days(1)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl core::fmt::Display for Period {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl core::str::FromStr for Period {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| DomainError::validation(format!("period must be YYYY-MM: {s}")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| DomainError::validation(format!("invalid period year: {s}")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| DomainError::validation(format!("invalid period month: {s}")))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

/// Tax obligation row (`taxes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxObligation {
    pub id: TaxId,
    pub tax_type: TaxType,
    pub period: Period,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: TaxStatus,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for TaxObligation {
    type Id = TaxId;
    const TABLE: &'static str = "taxes";

    fn id(&self) -> TaxId {
        self.id
    }
}

impl TaxObligation {
    pub fn is_pending(&self) -> bool {
        self.status == TaxStatus::Pending
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_pending() && self.due_date < today
    }

    /// Pending and due on or before `today + days` (overdue included).
    ///
    /// A horizon past the calendar's range covers every date.
    pub fn is_due_within(&self, today: NaiveDate, days: i64) -> bool {
        if !self.is_pending() {
            return false;
        }
        match TimeDelta::try_days(days).and_then(|span| today.checked_add_signed(span)) {
            Some(horizon) => self.due_date <= horizon,
            None => days > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TaxInput {
    pub tax_type: TaxType,
    pub period: Period,
    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: TaxStatus,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
}

/// VAT position of one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VatSummary {
    pub period: Period,
    /// VAT charged on sales.
    pub collected: Decimal,
    /// VAT paid on purchases.
    pub deductible: Decimal,
    /// Positive: owed to the state. Negative: credit to carry forward.
    pub payable: Decimal,
}

impl VatSummary {
    pub fn compute(
        period: Period,
        collected: impl IntoIterator<Item = Decimal>,
        deductible: impl IntoIterator<Item = Decimal>,
    ) -> Self {
        let collected: Decimal = collected.into_iter().sum();
        let deductible: Decimal = deductible.into_iter().sum();
        Self {
            period,
            collected,
            deductible,
            payable: collected - deductible,
        }
    }
}
