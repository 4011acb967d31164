use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ExpenseError;

pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Food",
    "Transportation",
    "Entertainment",
    "Shopping",
    "Bills",
    "Other",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `created_at` travels in SQLite's `CURRENT_TIMESTAMP` text form.
mod sqlite_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    #[serde(with = "sqlite_timestamp")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Candidate expense as sent by a client. Every field is optional here so that
/// a missing field surfaces as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseInput {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

/// A validated expense, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub amount_cents: i64,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ExpenseInput {
    pub fn new(amount: Decimal, description: &str, category: &str, date: &str) -> Self {
        Self {
            amount: Some(amount),
            description: Some(description.to_string()),
            category: Some(category.to_string()),
            date: Some(date.to_string()),
        }
    }

    pub fn validate(&self) -> Result<ExpenseRecord, ExpenseError> {
        let (Some(amount), Some(description), Some(category), Some(date)) = (
            self.amount.filter(|amount| !amount.is_zero()),
            non_blank(self.description.as_deref()),
            non_blank(self.category.as_deref()),
            non_blank(self.date.as_deref()),
        ) else {
            return Err(ExpenseError::Validation("All fields are required".to_string()));
        };

        Ok(ExpenseRecord {
            amount_cents: amount_to_cents(amount)?,
            description: description.to_string(),
            category: category.to_string(),
            date: parse_date(date)?,
        })
    }
}

impl ExpenseFilter {
    pub fn from_query(category: Option<&str>, date: Option<&str>) -> Result<Self, ExpenseError> {
        Ok(Self {
            category: non_blank(category).map(str::to_string),
            date: non_blank(date).map(parse_date).transpose()?,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_date(input: &str) -> Result<NaiveDate, ExpenseError> {
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| {
        ExpenseError::Validation(format!("Invalid date '{input}', expected YYYY-MM-DD"))
    })
}

pub fn amount_to_cents(amount: Decimal) -> Result<i64, ExpenseError> {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| ExpenseError::Validation(format!("Amount {amount} is out of range")))
}

pub fn cents_to_amount(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
