//! 工作区创建向导（3 步）：名称 → 工作方式 → 邀请成员

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::StoreError;
use crate::notify::{Notification, Template};
use crate::row;
use crate::store::{tables, Filter, RecordId, RecordStore};
use crate::wizard::definition::split_list;
use crate::wizard::{FieldRule, FieldSpec, Fields, SubmissionPlan, WizardDefinition};

pub const METHODOLOGIES: &[&str] = &["scrum", "kanban"];
pub const DEFAULT_ROLES: &[&str] = &["admin", "member", "viewer"];

const NAMING: &[FieldSpec] = &[
    FieldSpec::new("workspace_name", "Workspace name", FieldRule::Required),
    FieldSpec::new("slug", "URL slug", FieldRule::Slug),
];

const PROCESS: &[FieldSpec] = &[
    FieldSpec::new("methodology", "Methodology", FieldRule::OneOf(METHODOLOGIES)),
    FieldSpec::new("sprint_length_weeks", "Sprint length (weeks)", FieldRule::Positive),
];

const INVITES: &[FieldSpec] = &[FieldSpec::new(
    "invite_emails",
    "Invite teammates (comma separated, optional)",
    FieldRule::EmailList,
)];

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceWizard;

impl WizardDefinition for WorkspaceWizard {
    const TOTAL_STEPS: usize = 3;

    fn step_fields(step: usize) -> &'static [FieldSpec] {
        match step {
            1 => NAMING,
            2 => PROCESS,
            3 => INVITES,
            _ => &[],
        }
    }

    fn step_title(step: usize) -> &'static str {
        match step {
            1 => "Name your workspace",
            2 => "How does your team work?",
            3 => "Invite your team",
            _ => "",
        }
    }
}

/// 工作区创建的提交计划；`owner_id` 是当前登录账户
#[derive(Debug, Clone)]
pub struct WorkspacePlan {
    pub owner_id: String,
}

impl WorkspacePlan {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
        }
    }
}

fn get<'a>(fields: &'a Fields, name: &str) -> &'a str {
    fields.get(name).map(|v| v.trim()).unwrap_or("")
}

#[async_trait]
impl SubmissionPlan for WorkspacePlan {
    type Wizard = WorkspaceWizard;

    async fn create_primary(
        &self,
        store: &dyn RecordStore,
        submission_key: &str,
        fields: &Fields,
    ) -> Result<RecordId, StoreError> {
        let slug = get(fields, "slug");
        let taken = store
            .select(tables::WORKSPACES, &Filter::all().eq("slug", slug))
            .await?
            .iter()
            .any(|r| r.get("submission_key").and_then(Value::as_str) != Some(submission_key));
        if taken {
            return Err(StoreError::Conflict {
                table: tables::WORKSPACES.to_string(),
                key: slug.to_string(),
            });
        }
        store
            .upsert(
                tables::WORKSPACES,
                row! {
                    "submission_key" => submission_key,
                    "name" => get(fields, "workspace_name"),
                    "slug" => slug,
                    "owner_id" => self.owner_id.as_str(),
                    "created_at" => chrono::Utc::now().to_rfc3339(),
                },
                "submission_key",
            )
            .await
    }

    async fn write_dependents(
        &self,
        store: &dyn RecordStore,
        primary_id: &str,
        _fields: &Fields,
    ) -> Result<usize, StoreError> {
        let mut written = 0;
        for role in DEFAULT_ROLES {
            store
                .upsert(
                    tables::ROLES,
                    row! {
                        "role_key" => format!("{primary_id}:{role}"),
                        "workspace_id" => primary_id,
                        "name" => *role,
                    },
                    "role_key",
                )
                .await?;
            written += 1;
        }
        store
            .upsert(
                tables::MEMBERSHIPS,
                row! {
                    "membership_key" => format!("{}:{primary_id}", self.owner_id),
                    "account_id" => self.owner_id.as_str(),
                    "workspace" => primary_id,
                    "role" => "admin",
                },
                "membership_key",
            )
            .await?;
        Ok(written + 1)
    }

    async fn write_auxiliary(
        &self,
        store: &dyn RecordStore,
        primary_id: &str,
        fields: &Fields,
    ) -> Result<(), StoreError> {
        let weeks = get(fields, "sprint_length_weeks").parse::<f64>().unwrap_or(0.0);
        store
            .upsert(
                tables::SPRINT_BASELINES,
                row! {
                    "workspace_id" => primary_id,
                    "methodology" => get(fields, "methodology"),
                    "sprint_length_weeks" => weeks,
                    "planned_velocity" => 0,
                    "invited_count" => split_list(get(fields, "invite_emails")).count(),
                },
                "workspace_id",
            )
            .await?;
        Ok(())
    }

    fn notifications(&self, primary_id: &str, fields: &Fields) -> Vec<Notification> {
        split_list(get(fields, "invite_emails"))
            .map(|email| {
                Notification::new(
                    Template::WorkspaceInvite,
                    json!({
                        "to": email,
                        "workspace_id": primary_id,
                        "workspace_name": get(fields, "workspace_name"),
                        "invited_by": self.owner_id,
                    }),
                )
            })
            .collect()
    }
}
