use super::catalog::EntityId;
use super::user::{Credential, UserId};
use crate::error::{BotError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Direction of money flow for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Income,
    Expense,
}

impl OperationKind {
    /// Direction marker of the remote domain model.
    pub fn direction_id(self) -> u32 {
        match self {
            OperationKind::Income => 500,
            OperationKind::Expense => 510,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Income => "income",
            OperationKind::Expense => "expense",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Income => "Income",
            OperationKind::Expense => "Expense",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strictly positive monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(BotError::validation("Amount must be positive"))
        }
    }

    /// Parses user input, accepting both `.` and `,` as decimal separator.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().replace(',', ".");
        let value = Decimal::from_str(&normalized)
            .map_err(|_| BotError::validation("Please enter a valid positive amount."))?;
        Self::new(value)
            .map_err(|_| BotError::validation("Please enter a valid positive amount."))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = BotError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// A selected reference entity: the id sent to the API plus the name shown
/// in the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub id: EntityId,
    pub name: String,
}

impl Selection {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The wizard's in-progress, not yet submitted payment.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOperation {
    pub kind: OperationKind,
    pub credential: Credential,
    /// `None` once answered means "no project".
    pub project: Option<Selection>,
    pub organisation: Option<Selection>,
    pub account: Option<Selection>,
    pub amount: Option<Amount>,
    pub purpose: Option<String>,
}

impl DraftOperation {
    pub fn new(kind: OperationKind, credential: Credential) -> Self {
        Self {
            kind,
            credential,
            project: None,
            organisation: None,
            account: None,
            amount: None,
            purpose: None,
        }
    }

    pub fn summary(&self) -> String {
        let or_dash = |s: Option<&Selection>| s.map_or("-".to_owned(), |s| s.name.clone());
        format!(
            "Please confirm:\nType: {}\nProject: {}\nOrganisation: {}\nAccount: {}\nAmount: {}\nPurpose: {}",
            self.kind.label(),
            self.project.as_ref().map_or("No project".to_owned(), |p| p.name.clone()),
            or_dash(self.organisation.as_ref()),
            or_dash(self.account.as_ref()),
            self.amount.map_or("-".to_owned(), |a| a.to_string()),
            self.purpose.as_deref().unwrap_or("-"),
        )
    }

    /// Builds the wire record; fails if a mandatory step was never answered.
    pub fn into_payment(self, defaults: &PaymentDefaults, date: NaiveDate) -> Result<PaymentRecord> {
        let missing = |field: &str| BotError::internal(format!("draft is missing {}", field));
        let organisation = self.organisation.ok_or_else(|| missing("organisation"))?;
        let account = self.account.ok_or_else(|| missing("account"))?;
        let amount = self.amount.ok_or_else(|| missing("amount"))?;
        let purpose = self.purpose.ok_or_else(|| missing("purpose"))?;

        Ok(PaymentRecord {
            external_id: Uuid::new_v4(),
            account_id: account.id,
            project_id: self.project.map(|p| p.id),
            organisation_id: organisation.id,
            payment_date: date,
            source_payment_sum: amount.value(),
            payment_sum: Decimal::ZERO,
            source_currency_id: defaults.currency.clone(),
            payment_purpose: purpose,
            comment: defaults.comment.clone(),
            direction_id: self.kind.direction_id(),
            operation_type_id: OPERATION_TYPE_ID,
            payment_status_id: PAYMENT_STATUS_ID,
            priority_id: PRIORITY_ID,
        })
    }
}

pub const OPERATION_TYPE_ID: u32 = 411;
pub const PAYMENT_STATUS_ID: u32 = 529;
pub const PRIORITY_ID: u32 = 532;

/// Constant parts of every payment record.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDefaults {
    pub currency: String,
    pub comment: String,
}

impl Default for PaymentDefaults {
    fn default() -> Self {
        Self {
            currency: "RUB".to_owned(),
            comment: "Chat bot".to_owned(),
        }
    }
}

/// Payment as accepted by `POST /api/Payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Correlation token; never reconciled against the response.
    pub external_id: Uuid,
    pub account_id: EntityId,
    pub project_id: Option<EntityId>,
    pub organisation_id: EntityId,
    pub payment_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub source_payment_sum: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub payment_sum: Decimal,
    pub source_currency_id: String,
    pub payment_purpose: String,
    pub comment: String,
    pub direction_id: u32,
    pub operation_type_id: u32,
    pub payment_status_id: u32,
    pub priority_id: u32,
}

/// Reporting record appended after a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationLogEntry {
    pub user_id: UserId,
    #[serde(rename = "operation_type")]
    pub kind: OperationKind,
    pub operation_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_accepts_both_separators() {
        let comma = Amount::parse("1234,56").unwrap();
        let dot = Amount::parse("1234.56").unwrap();
        assert_eq!(comma, dot);
        assert_eq!(dot.value(), dec!(1234.56));
        assert_eq!(Amount::parse(" 500 ").unwrap().value(), dec!(500));
    }

    #[test]
    fn test_amount_rejects_non_positive_and_garbage() {
        for input in ["0", "-5", "abc", "", "1,2,3", "0,00"] {
            let err = Amount::parse(input).unwrap_err();
            assert!(matches!(err, BotError::Validation(_)), "input {:?}", input);
        }
    }

    #[test]
    fn test_direction_markers() {
        assert_eq!(OperationKind::Expense.direction_id(), 510);
        assert_eq!(OperationKind::Income.direction_id(), 500);
    }

    #[test]
    fn test_incomplete_draft_is_not_a_payment() {
        let draft = DraftOperation::new(OperationKind::Income, Credential::new("k"));
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(draft.into_payment(&PaymentDefaults::default(), date).is_err());
    }

    #[test]
    fn test_payment_record_wire_shape() {
        let mut draft = DraftOperation::new(OperationKind::Expense, Credential::new("k"));
        draft.organisation = Some(Selection::new(9, "Org"));
        draft.account = Some(Selection::new(3, "Acc"));
        draft.amount = Some(Amount::parse("500").unwrap());
        draft.purpose = Some("Rent".into());
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let record = draft.into_payment(&PaymentDefaults::default(), date).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["directionId"], 510);
        assert_eq!(json["projectId"], serde_json::Value::Null);
        assert_eq!(json["organisationId"], 9);
        assert_eq!(json["accountId"], 3);
        assert_eq!(json["sourcePaymentSum"], 500.0);
        assert_eq!(json["paymentSum"], 0.0);
        assert_eq!(json["paymentDate"], "2024-01-02");
        assert_eq!(json["sourceCurrencyId"], "RUB");
        assert_eq!(json["operationTypeId"], 411);
        assert_eq!(json["paymentStatusId"], 529);
        assert_eq!(json["priorityId"], 532);
    }

    #[test]
    fn test_log_entry_serializes_kind_lowercase() {
        let entry = OperationLogEntry {
            user_id: 1,
            kind: OperationKind::Expense,
            operation_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"user_id":1,"operation_type":"expense","operation_date":"2024-05-01"}"#
        );
    }
}
