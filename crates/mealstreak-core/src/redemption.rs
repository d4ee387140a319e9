//! Redemption records: tokens spent on rewards.
//!
//! Two redemption types exist: a food donation (flat cost) and a
//! dietitian consultation booking (flat cost plus booking details
//! with a small status lifecycle). Records are immutable once created
//! except for the consult status, which only moves along
//! `pending -> confirmed -> completed | cancelled`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// What the tokens were spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionType {
    Donate,
    Consult,
}

impl RedemptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            RedemptionType::Donate => "donate",
            RedemptionType::Consult => "consult",
        }
    }
}

impl fmt::Display for RedemptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedemptionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donate" => Ok(RedemptionType::Donate),
            "consult" => Ok(RedemptionType::Consult),
            other => Err(ValidationError::UnknownRedemptionType(other.to_string())),
        }
    }
}

/// Lifecycle of a consultation booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl RedemptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Confirmed => "confirmed",
            RedemptionStatus::Completed => "completed",
            RedemptionStatus::Cancelled => "cancelled",
        }
    }

    /// Whether `next` is a legal successor of this status.
    pub fn can_transition(self, next: RedemptionStatus) -> bool {
        use RedemptionStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking details supplied when redeeming a consultation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultRequest {
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub goals: String,
}

impl ConsultRequest {
    /// Reject empty fields before any tokens are deducted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("time", &self.time),
            ("goals", &self.goals),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Consultation details carried by a consult-type redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultDetails {
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub goals: String,
    pub status: RedemptionStatus,
}

/// A record of tokens spent for a reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    pub redemption_type: RedemptionType,
    /// Cost in whole tokens.
    pub cost: u64,
    pub details: Option<ConsultDetails>,
    pub created_at: DateTime<Utc>,
}

impl Redemption {
    /// Create a donation record.
    pub fn donate(user_id: &str, cost: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            redemption_type: RedemptionType::Donate,
            cost,
            details: None,
            created_at: Utc::now(),
        }
    }

    /// Create a consultation record in the `pending` status.
    pub fn consult(user_id: &str, cost: u64, request: ConsultRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            redemption_type: RedemptionType::Consult,
            cost,
            details: Some(ConsultDetails {
                name: request.name,
                date: request.date,
                time: request.time,
                goals: request.goals,
                status: RedemptionStatus::Pending,
            }),
            created_at: Utc::now(),
        }
    }

    /// Current consult status, if this is a consult redemption.
    pub fn status(&self) -> Option<RedemptionStatus> {
        self.details.as_ref().map(|d| d.status)
    }

    /// Move the consult status forward. Illegal transitions and
    /// donation records are rejected.
    pub fn set_status(&mut self, next: RedemptionStatus) -> Result<(), ValidationError> {
        let details = self
            .details
            .as_mut()
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "status".to_string(),
                message: "donation redemptions have no status".to_string(),
            })?;
        if !details.status.can_transition(next) {
            return Err(ValidationError::InvalidStatusTransition {
                from: details.status.to_string(),
                to: next.to_string(),
            });
        }
        details.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ConsultRequest {
        ConsultRequest {
            name: "Alex".into(),
            date: NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(),
            time: "14:00".into(),
            goals: "Lose weight".into(),
        }
    }

    #[test]
    fn consult_starts_pending() {
        let redemption = Redemption::consult("user-1", 30, request());
        assert_eq!(redemption.status(), Some(RedemptionStatus::Pending));
        assert_eq!(redemption.cost, 30);
    }

    #[test]
    fn legal_transitions() {
        let mut redemption = Redemption::consult("user-1", 30, request());
        redemption.set_status(RedemptionStatus::Confirmed).unwrap();
        redemption.set_status(RedemptionStatus::Completed).unwrap();
    }

    #[test]
    fn completed_is_terminal() {
        let mut redemption = Redemption::consult("user-1", 30, request());
        redemption.set_status(RedemptionStatus::Confirmed).unwrap();
        redemption.set_status(RedemptionStatus::Completed).unwrap();
        assert!(redemption.set_status(RedemptionStatus::Cancelled).is_err());
    }

    #[test]
    fn pending_cannot_complete_directly() {
        let mut redemption = Redemption::consult("user-1", 30, request());
        assert!(redemption.set_status(RedemptionStatus::Completed).is_err());
    }

    #[test]
    fn donation_has_no_status() {
        let mut redemption = Redemption::donate("user-1", 10);
        assert_eq!(redemption.status(), None);
        assert!(redemption.set_status(RedemptionStatus::Confirmed).is_err());
    }

    #[test]
    fn empty_consult_fields_rejected() {
        let mut req = request();
        req.goals = "  ".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let redemption = Redemption::donate("user-1", 10);
        let json = serde_json::to_value(&redemption).unwrap();
        assert_eq!(json["type"], "donate");
        assert_eq!(json["userId"], "user-1");
        assert!(json["createdAt"].is_string());
    }
}
