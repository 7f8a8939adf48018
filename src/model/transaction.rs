use crate::model::Amount;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether money came in or went out. The Indonesian words used by older data, `masuk` and
/// `keluar`, are accepted when parsing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "in", alias = "masuk", alias = "income")]
    In,
    #[serde(rename = "out", alias = "keluar", alias = "expense")]
    Out,
}

serde_plain::derive_display_from_serialize!(Direction);
serde_plain::derive_fromstr_from_deserialize!(Direction);

/// Anything the ledger can aggregate.
pub trait LedgerEntry {
    fn date(&self) -> NaiveDate;
    fn category(&self) -> &str;
    fn amount(&self) -> Amount;
    fn direction(&self) -> Direction;
}

/// The user-supplied fields of a transaction, used to create or replace one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Amount,
    pub direction: Direction,
}

impl TransactionDraft {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<Amount>,
        direction: Direction,
    ) -> Self {
        Self {
            date,
            category: category.into(),
            description: description.into(),
            amount: amount.into(),
            direction,
        }
    }
}

impl LedgerEntry for TransactionDraft {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn amount(&self) -> Amount {
        self.amount
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// A stored financial transaction owned by one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub(crate) id: String,
    pub(crate) owner: String,
    #[serde(flatten)]
    pub(crate) fields: TransactionDraft,
    pub(crate) created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn fields(&self) -> &TransactionDraft {
        &self.fields
    }

    pub fn description(&self) -> &str {
        &self.fields.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl LedgerEntry for Transaction {
    fn date(&self) -> NaiveDate {
        self.fields.date
    }

    fn category(&self) -> &str {
        &self.fields.category
    }

    fn amount(&self) -> Amount {
        self.fields.amount
    }

    fn direction(&self) -> Direction {
        self.fields.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::from_str("in").unwrap(), Direction::In);
        assert_eq!(Direction::from_str("out").unwrap(), Direction::Out);
        assert_eq!(Direction::from_str("masuk").unwrap(), Direction::In);
        assert_eq!(Direction::from_str("keluar").unwrap(), Direction::Out);
        assert!(Direction::from_str("sideways").is_err());
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Out.to_string(), "out");
    }

    #[test]
    fn test_transaction_json_is_flat() {
        let txn = Transaction {
            id: "t1".into(),
            owner: "u1".into(),
            fields: TransactionDraft::new(
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                "Food",
                "nasi goreng",
                Amount::from(15000i64),
                Direction::Out,
            ),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        };
        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(value["category"], "Food");
        assert_eq!(value["direction"], "out");
        assert_eq!(value["amount"], "15000");
        assert_eq!(value["date"], "2025-03-01");
    }
}
