//! Account entity
//!
//! An account is created with a zero balance and a generated account number,
//! mutated by transfers, and soft-deleted by setting `deleted_at`.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Upper bound (exclusive) for generated account numbers
pub const ACCOUNT_NUMBER_MAX: i64 = 1_000_000_000;

/// Maximum length of first/last name (matches the `varchar(50)` columns)
pub const MAX_NAME_LEN: usize = 50;

/// A persisted account record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub number: i64,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Soft-deleted accounts are invisible to every read path
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// An account that has not been inserted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub balance: i64,
}

impl NewAccount {
    /// Validate names and draw a fresh account number.
    pub fn new(first_name: &str, last_name: &str) -> Result<Self, DomainError> {
        let first_name = validate_name("firstName", first_name)?;
        let last_name = validate_name("lastName", last_name)?;

        Ok(Self {
            first_name,
            last_name,
            number: generate_account_number(),
            balance: 0,
        })
    }

    /// Replace the account number (used when a draw collides)
    pub fn with_number(mut self, number: i64) -> Self {
        self.number = number;
        self
    }

    /// Draw a new account number in place
    pub fn regenerate_number(&mut self) {
        self.number = generate_account_number();
    }
}

/// Generate a pseudo-random account number in `[1, ACCOUNT_NUMBER_MAX)`
fn generate_account_number() -> i64 {
    rand::thread_rng().gen_range(1..ACCOUNT_NUMBER_MAX)
}

fn validate_name(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName(format!("{} is required", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::InvalidName(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_starts_at_zero() {
        let account = NewAccount::new("Ada", "Lovelace").unwrap();

        assert_eq!(account.first_name, "Ada");
        assert_eq!(account.last_name, "Lovelace");
        assert_eq!(account.balance, 0);
        assert!(account.number >= 1 && account.number < ACCOUNT_NUMBER_MAX);
    }

    #[test]
    fn test_new_account_trims_names() {
        let account = NewAccount::new("  Ada ", "Lovelace\n").unwrap();
        assert_eq!(account.first_name, "Ada");
        assert_eq!(account.last_name, "Lovelace");
    }

    #[test]
    fn test_new_account_rejects_blank_names() {
        assert!(matches!(
            NewAccount::new("", "Lovelace"),
            Err(DomainError::InvalidName(_))
        ));
        assert!(matches!(
            NewAccount::new("Ada", "   "),
            Err(DomainError::InvalidName(_))
        ));
    }

    #[test]
    fn test_new_account_rejects_long_names() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(NewAccount::new(&long, "Lovelace").is_err());
        assert!(NewAccount::new(&"x".repeat(MAX_NAME_LEN), "Lovelace").is_ok());
    }

    #[test]
    fn test_account_json_field_names() {
        let now = Utc::now();
        let account = Account {
            id: 7,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            number: 42,
            balance: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["lastName"], "Lovelace");
        assert_eq!(json["number"], 42);
        assert!(json["deleted_at"].is_null());
        assert!(json.get("created_at").is_some());
        assert!(!account.is_deleted());
    }
}
