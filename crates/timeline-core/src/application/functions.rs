//! Business functions: the admin-invoked operations behind the API.
//!
//! Multi-step functions compensate on failure: whatever they created before
//! the failing step is deleted again, so a failed call leaves no partial
//! state behind.

use chrono::{Months, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::repository::{Repositories, UserDirectory};
use crate::domain::timeline::{
    ClientTimeline, Indication, IndicationStatus, Profile, ProgressStatus, TemplateItem,
    TimelineItem, TimelineTemplate,
};
use crate::error::{CoreError, CoreResult};
use crate::types::{AuthContext, IndicationId, TemplateId, TimelineItemId, UserId};

/// Points awarded to the referrer when an indication is approved
pub const INDICATION_AWARD_POINTS: i64 = 50;

/// Outcome of approving an indication
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApproveIndicationResult {
    pub indication: Indication,
    /// Points credited to the referrer
    pub points_awarded: i64,
    /// Referrer's balance after the award
    pub new_balance: i64,
}

/// Outcome of assigning a timeline to a client
#[derive(Debug, Clone, PartialEq)]
pub struct AssignTimelineResult {
    pub timeline: ClientTimeline,
    pub items_created: usize,
}

/// Outcome of evaluating a timeline item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateProgressResult {
    pub item: TimelineItem,
    /// Points credited to the client by this evaluation
    #[serde(rename = "pointsAdded")]
    pub points_added: i64,
}

/// The admin business functions, over the repositories and the auth
/// backend's account directory
#[derive(Debug, Clone)]
pub struct Functions {
    repos: Repositories,
    users: Arc<dyn UserDirectory>,
}

impl Functions {
    pub fn new(repos: Repositories, users: Arc<dyn UserDirectory>) -> Self {
        Self { repos, users }
    }

    /// Approve a pending indication and credit the referrer 50 points.
    ///
    /// Approving anything but a pending indication is a conflict; approval
    /// is therefore idempotent-unsafe by design of the point award.
    pub async fn approve_indication(
        &self,
        auth: &AuthContext,
        id: IndicationId,
    ) -> CoreResult<ApproveIndicationResult> {
        auth.require_admin("approve indication")?;
        let mut indication = self.repos.indications.get_indication(id).await?;
        if indication.status != IndicationStatus::Pending {
            return Err(CoreError::Conflict(format!(
                "indication {} is not pending",
                id
            )));
        }
        indication.status = IndicationStatus::Approved;
        let indication = self.repos.indications.update_indication(&indication).await?;
        let new_balance = self
            .repos
            .profiles
            .add_points(indication.referrer_id, INDICATION_AWARD_POINTS)
            .await?;
        info!(indication_id = %id, referrer = %indication.referrer_id, new_balance, "indication approved");
        Ok(ApproveIndicationResult {
            indication,
            points_awarded: INDICATION_AWARD_POINTS,
            new_balance,
        })
    }

    /// Assign a timeline template to a client starting on a given date.
    ///
    /// A client holds at most one timeline; assigning a second is a
    /// conflict. The end date is the start plus the template's duration in
    /// months.
    /// Items are instantiated from the template's items with due dates
    /// spread evenly across the window. If item creation fails the timeline
    /// is deleted again.
    pub async fn assign_timeline(
        &self,
        auth: &AuthContext,
        client_id: UserId,
        template_id: TemplateId,
        start_date: NaiveDate,
    ) -> CoreResult<AssignTimelineResult> {
        auth.require_admin("assign timeline")?;
        // Fails with NotFound before anything is written.
        self.repos.profiles.get_profile(client_id).await?;
        let existing = self
            .repos
            .timelines
            .list_timelines_for_client(client_id)
            .await?;
        if !existing.is_empty() {
            return Err(CoreError::Conflict(format!(
                "client {} already has a timeline",
                client_id
            )));
        }
        let template = self.repos.templates.get_template(template_id).await?;
        let template_items = self.repos.templates.list_template_items(template_id).await?;

        let end_date = start_date
            .checked_add_months(Months::new(template.duration_months))
            .ok_or_else(|| CoreError::Validation("start date out of range".to_string()))?;

        let timeline = ClientTimeline::new(client_id, template_id, start_date, end_date);
        self.repos.timelines.create_timeline(&timeline).await?;

        let items = spread_items(&timeline, &template_items);
        if let Err(err) = self.repos.timelines.create_items(&items).await {
            if let Err(cleanup) = self.repos.timelines.delete_timeline(timeline.id).await {
                warn!(timeline_id = %timeline.id, error = %cleanup, "rollback of timeline failed");
            }
            return Err(err);
        }
        info!(timeline_id = %timeline.id, client = %client_id, items = items.len(), "timeline assigned");
        Ok(AssignTimelineResult {
            timeline,
            items_created: items.len(),
        })
    }

    /// Provision a client: an account in the auth directory plus a profile.
    ///
    /// If the profile cannot be written the account is deleted again.
    pub async fn create_client(
        &self,
        auth: &AuthContext,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> CoreResult<Profile> {
        auth.require_admin("create client")?;
        if full_name.trim().is_empty() {
            return Err(CoreError::Validation("full name must not be empty".into()));
        }
        if password.len() < 6 {
            return Err(CoreError::Validation(
                "password must be at least 6 characters".into(),
            ));
        }

        let user_id = self.users.create_user(email, password).await?;
        let profile = Profile::new(user_id, full_name, email);
        if let Err(err) = self.repos.profiles.create_profile(&profile).await {
            if let Err(cleanup) = self.users.delete_user(user_id).await {
                warn!(%user_id, error = %cleanup, "rollback of created account failed");
            }
            return Err(err);
        }
        info!(%user_id, email, "client created");
        Ok(profile)
    }

    /// Import a timeline template with its ordered item titles.
    ///
    /// The item list must be non-empty. If item creation fails the template
    /// is deleted again.
    pub async fn import_timeline(
        &self,
        auth: &AuthContext,
        name: &str,
        duration_months: u32,
        item_titles: &[String],
    ) -> CoreResult<TimelineTemplate> {
        auth.require_admin("import timeline")?;
        if name.trim().is_empty() {
            return Err(CoreError::Validation("template name must not be empty".into()));
        }
        if duration_months == 0 {
            return Err(CoreError::Validation(
                "duration must be at least one month".into(),
            ));
        }
        if item_titles.is_empty() {
            return Err(CoreError::Validation(
                "template must contain at least one item".into(),
            ));
        }

        let template = TimelineTemplate::new(name, duration_months);
        self.repos.templates.create_template(&template).await?;

        let items: Vec<TemplateItem> = item_titles
            .iter()
            .enumerate()
            .map(|(i, title)| TemplateItem::new(template.id, title.clone(), i as u32))
            .collect();
        if let Err(err) = self.repos.templates.create_template_items(&items).await {
            if let Err(cleanup) = self.repos.templates.delete_template(template.id).await {
                warn!(template_id = %template.id, error = %cleanup, "rollback of template failed");
            }
            return Err(err);
        }
        info!(template_id = %template.id, items = items.len(), "template imported");
        Ok(template)
    }

    /// Evaluate a timeline item and credit the client its points.
    ///
    /// An item may be evaluated once; re-evaluating is a conflict. Points
    /// follow the status rule: on time 25, early 25 plus the extra, late 0.
    pub async fn update_timeline_progress(
        &self,
        auth: &AuthContext,
        item_id: TimelineItemId,
        status: ProgressStatus,
        extra_points: i64,
    ) -> CoreResult<UpdateProgressResult> {
        auth.require_admin("update timeline progress")?;
        if extra_points < 0 {
            return Err(CoreError::Validation("extra points must not be negative".into()));
        }

        let mut item = self.repos.timelines.get_item(item_id).await?;
        if item.progress_status.is_some() {
            return Err(CoreError::Conflict(format!(
                "item {} has already been evaluated",
                item_id
            )));
        }
        item.progress_status = Some(status);
        let item = self.repos.timelines.update_item(&item).await?;

        let timeline = self.repos.timelines.get_timeline(item.timeline_id).await?;
        let points_added = status.points(extra_points);
        if points_added > 0 {
            self.repos
                .profiles
                .add_points(timeline.client_id, points_added)
                .await?;
        }
        info!(item_id = %item.id, client = %timeline.client_id, points_added, "item evaluated");
        Ok(UpdateProgressResult { item, points_added })
    }
}

/// Instantiate timeline items from template items, spreading due dates
/// evenly across the window: item k of n falls at day `d * (k + 1) / n` of a
/// d-day window, so the last item lands on the end date.
fn spread_items(timeline: &ClientTimeline, template_items: &[TemplateItem]) -> Vec<TimelineItem> {
    let total_days = (timeline.end_date - timeline.start_date).num_days().max(0);
    let n = template_items.len() as i64;
    template_items
        .iter()
        .enumerate()
        .map(|(k, template_item)| {
            let offset = total_days * (k as i64 + 1) / n;
            TimelineItem {
                id: TimelineItemId::new(),
                timeline_id: timeline.id,
                title: template_item.title.clone(),
                due_date: timeline.start_date + chrono::Duration::days(offset),
                position: k as u32,
                progress_status: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_spread_evenly_with_last_on_end_date() {
        let timeline = ClientTimeline::new(
            UserId::new(),
            TemplateId::new(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let template_items: Vec<TemplateItem> = ["Kickoff", "Draft", "Delivery"]
            .iter()
            .enumerate()
            .map(|(i, t)| TemplateItem::new(timeline.template_id, *t, i as u32))
            .collect();

        let items = spread_items(&timeline, &template_items);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].due_date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert_eq!(items[1].due_date, NaiveDate::from_ymd_opt(2024, 1, 21).unwrap());
        assert_eq!(items[2].due_date, timeline.end_date);
        assert!(items.iter().all(|i| i.progress_status.is_none()));
    }

    #[test]
    fn progress_result_serializes_points_in_camel_case() {
        let item = TimelineItem {
            id: TimelineItemId::new(),
            timeline_id: crate::types::ClientTimelineId::new(),
            title: "Delivery".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            position: 0,
            progress_status: Some(ProgressStatus::NoPrazo),
        };
        let json = serde_json::to_value(UpdateProgressResult {
            item,
            points_added: 25,
        })
        .unwrap();
        assert_eq!(json["pointsAdded"], 25);
    }
}
