//! Flow: a named graph scope, either a reusable template or a client instance.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ClientTimelineId, FlowId};

/// Whether a flow is a reusable template or bound to one client timeline.
///
/// Template and instance share identical node/edge shapes; the only
/// behavioral difference is the admin capability gating mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowKind {
    /// Reusable template, not bound to any client
    Template,
    /// Instance bound to exactly one client timeline
    ClientInstance {
        /// The owning client timeline
        client_timeline_id: ClientTimelineId,
    },
}

/// A named graph containing nodes and edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Unique identifier
    pub id: FlowId,
    /// Display name
    pub name: String,
    /// Template/instance duality
    #[serde(flatten)]
    pub kind: FlowKind,
    /// Start of the date ruler window (visual alignment only)
    pub start_date: NaiveDate,
    /// End of the date ruler window (visual alignment only)
    pub end_date: NaiveDate,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Flow {
    /// Create a template flow
    pub fn template(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: FlowId::new(),
            name: name.into(),
            kind: FlowKind::Template,
            start_date,
            end_date,
            created_at: Utc::now(),
        }
    }

    /// Create a client-instance flow bound to a timeline
    pub fn client_instance(
        name: impl Into<String>,
        client_timeline_id: ClientTimelineId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: FlowId::new(),
            name: name.into(),
            kind: FlowKind::ClientInstance { client_timeline_id },
            start_date,
            end_date,
            created_at: Utc::now(),
        }
    }

    /// Whether this flow is a reusable template
    pub fn is_template(&self) -> bool {
        matches!(self.kind, FlowKind::Template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_has_no_client_binding() {
        let flow = Flow::template(
            "Onboarding",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        );
        assert!(flow.is_template());
    }

    #[test]
    fn client_instance_is_bound_to_exactly_one_timeline() {
        let timeline_id = ClientTimelineId::new();
        let flow = Flow::client_instance(
            "Acme onboarding",
            timeline_id,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        );
        assert!(!flow.is_template());
        assert_eq!(
            flow.kind,
            FlowKind::ClientInstance {
                client_timeline_id: timeline_id
            }
        );
    }
}
