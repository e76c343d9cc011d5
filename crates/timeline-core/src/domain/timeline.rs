//! Timeline entities behind the business functions: client timelines and
//! their items, reusable item templates, referral indications and client
//! profiles with point balances.
//!
//! The item/template system here is parallel to, and only loosely related
//! to, the graph flow system; assigning a timeline instantiates items from
//! template items and never touches the graph.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ClientTimelineId, IndicationId, TemplateId, TimelineItemId, UserId};

/// Progress evaluation for a timeline item, with its point rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    /// Delivered on time: 25 points
    NoPrazo,
    /// Delivered early: 25 points plus the reviewer-granted extra
    Adiantado,
    /// Delivered late: no points
    Atrasado,
}

impl ProgressStatus {
    /// Points awarded for this status; `extra` applies to early delivery only
    pub fn points(&self, extra: i64) -> i64 {
        match self {
            ProgressStatus::NoPrazo => 25,
            ProgressStatus::Adiantado => 25 + extra,
            ProgressStatus::Atrasado => 0,
        }
    }
}

/// A client's assigned timeline, instantiated from a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientTimeline {
    pub id: ClientTimelineId,
    pub client_id: UserId,
    pub template_id: TemplateId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl ClientTimeline {
    /// Create a timeline for a client over the given date window
    pub fn new(
        client_id: UserId,
        template_id: TemplateId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: ClientTimelineId::new(),
            client_id,
            template_id,
            start_date,
            end_date,
            created_at: Utc::now(),
        }
    }
}

/// One deliverable on a client timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub id: TimelineItemId,
    pub timeline_id: ClientTimelineId,
    pub title: String,
    pub due_date: NaiveDate,
    /// Order within the timeline
    pub position: u32,
    /// Set once when the item is evaluated; `None` until then
    pub progress_status: Option<ProgressStatus>,
}

/// A reusable timeline template with a duration in months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineTemplate {
    pub id: TemplateId,
    pub name: String,
    pub duration_months: u32,
    pub created_at: DateTime<Utc>,
}

impl TimelineTemplate {
    /// Create a template spanning the given number of months
    pub fn new(name: impl Into<String>, duration_months: u32) -> Self {
        Self {
            id: TemplateId::new(),
            name: name.into(),
            duration_months,
            created_at: Utc::now(),
        }
    }
}

/// One item of a timeline template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub id: TimelineItemId,
    pub template_id: TemplateId,
    pub title: String,
    pub position: u32,
}

impl TemplateItem {
    /// Create a template item at the given position
    pub fn new(template_id: TemplateId, title: impl Into<String>, position: u32) -> Self {
        Self {
            id: TimelineItemId::new(),
            template_id,
            title: title.into(),
            position,
        }
    }
}

/// Lifecycle of a referral indication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicationStatus {
    Pending,
    Approved,
}

/// A referral submitted by a client, awarded points when approved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indication {
    pub id: IndicationId,
    /// Client who made the referral and receives the points
    pub referrer_id: UserId,
    pub referred_name: String,
    pub status: IndicationStatus,
    pub created_at: DateTime<Utc>,
}

impl Indication {
    /// Create a pending indication
    pub fn new(referrer_id: UserId, referred_name: impl Into<String>) -> Self {
        Self {
            id: IndicationId::new(),
            referrer_id,
            referred_name: referred_name.into(),
            status: IndicationStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Client profile with accumulated referral/bonus points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Create a profile with a zero point balance
    pub fn new(user_id: UserId, full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            full_name: full_name.into(),
            email: email.into(),
            points: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_rule() {
        assert_eq!(ProgressStatus::NoPrazo.points(0), 25);
        assert_eq!(ProgressStatus::NoPrazo.points(10), 25);
        assert_eq!(ProgressStatus::Adiantado.points(10), 35);
        assert_eq!(ProgressStatus::Adiantado.points(0), 25);
        assert_eq!(ProgressStatus::Atrasado.points(10), 0);
    }

    #[test]
    fn progress_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProgressStatus::NoPrazo).unwrap(),
            "\"NO_PRAZO\""
        );
        assert_eq!(
            serde_json::to_string(&ProgressStatus::Adiantado).unwrap(),
            "\"ADIANTADO\""
        );
        assert_eq!(
            serde_json::to_string(&ProgressStatus::Atrasado).unwrap(),
            "\"ATRASADO\""
        );
    }

    #[test]
    fn indications_start_pending() {
        let indication = Indication::new(UserId::new(), "Maria Souza");
        assert_eq!(indication.status, IndicationStatus::Pending);
    }
}
