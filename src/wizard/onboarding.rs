//! 注册引导向导（4 步）：账户 → 公司 → 角色 → 目标
//!
//! 提交：账户（主记录）→ 个人资料 + 工作区成员关系 → 引导基线指标 → 欢迎邮件 / 管理员提醒。

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::StoreError;
use crate::notify::{Notification, Template};
use crate::row;
use crate::store::{tables, Filter, RecordId, RecordStore};
use crate::wizard::{FieldRule, FieldSpec, Fields, SubmissionPlan, WizardDefinition};

pub const ROLES: &[&str] = &["developer", "product_manager", "scrum_master", "designer", "other"];
pub const GOALS: &[&str] = &["velocity", "predictability", "visibility", "collaboration"];

const ACCOUNT: &[FieldSpec] = &[
    FieldSpec::new("email", "Work email", FieldRule::Email),
    FieldSpec::new("password", "Password (8+ characters)", FieldRule::MinLength(8)),
    FieldSpec::new("full_name", "Full name", FieldRule::Required),
];

const COMPANY: &[FieldSpec] = &[
    FieldSpec::new("company", "Company", FieldRule::Required),
    FieldSpec::new("team_size", "Team size", FieldRule::Positive),
];

const ROLE: &[FieldSpec] = &[
    FieldSpec::new("role", "Your role", FieldRule::OneOf(ROLES)),
    FieldSpec::new(
        "role_other",
        "Other role, please specify",
        FieldRule::RequiredWhen {
            sibling: "role",
            equals: "other",
        },
    ),
];

const GOAL: &[FieldSpec] = &[
    FieldSpec::new("primary_goal", "Primary goal", FieldRule::OneOf(GOALS)),
    FieldSpec::new("sprint_length_weeks", "Sprint length (weeks)", FieldRule::Positive),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct OnboardingWizard;

impl WizardDefinition for OnboardingWizard {
    const TOTAL_STEPS: usize = 4;

    fn step_fields(step: usize) -> &'static [FieldSpec] {
        match step {
            1 => ACCOUNT,
            2 => COMPANY,
            3 => ROLE,
            4 => GOAL,
            _ => &[],
        }
    }

    fn step_title(step: usize) -> &'static str {
        match step {
            1 => "Create your account",
            2 => "Tell us about your company",
            3 => "What do you do?",
            4 => "What should Sprintly help with?",
            _ => "",
        }
    }
}

/// 注册引导的提交计划
#[derive(Debug, Clone, Default)]
pub struct OnboardingPlan {
    /// 新用户提醒的收件人；None 时不发管理员提醒
    pub admin_email: Option<String>,
}

fn get<'a>(fields: &'a Fields, name: &str) -> &'a str {
    fields.get(name).map(|v| v.trim()).unwrap_or("")
}

fn number(fields: &Fields, name: &str) -> Value {
    get(fields, name)
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn company_slug(company: &str) -> String {
    company
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn onboarding_membership_key(account_id: &str) -> String {
    format!("{account_id}:onboarding")
}

/// 角色为 other 时取用户填写的说明
fn effective_role(fields: &Fields) -> String {
    match get(fields, "role") {
        "other" => get(fields, "role_other").to_string(),
        role => role.to_string(),
    }
}

#[async_trait]
impl SubmissionPlan for OnboardingPlan {
    type Wizard = OnboardingWizard;

    async fn create_primary(
        &self,
        store: &dyn RecordStore,
        submission_key: &str,
        fields: &Fields,
    ) -> Result<RecordId, StoreError> {
        let email = get(fields, "email").to_lowercase();
        let existing = store
            .select(tables::ACCOUNTS, &Filter::all().eq("email", email.as_str()))
            .await?;
        // 同一邮箱只允许同一次填写（重试）复用
        if existing
            .iter()
            .any(|r| r.get("submission_key").and_then(Value::as_str) != Some(submission_key))
        {
            return Err(StoreError::Conflict {
                table: tables::ACCOUNTS.to_string(),
                key: email,
            });
        }
        // 密码交给认证服务，账户表不保存
        store
            .upsert(
                tables::ACCOUNTS,
                row! {
                    "submission_key" => submission_key,
                    "email" => email,
                    "full_name" => get(fields, "full_name"),
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
        fields: &Fields,
    ) -> Result<usize, StoreError> {
        let company = get(fields, "company");
        store
            .upsert(
                tables::PROFILES,
                row! {
                    "account_id" => primary_id,
                    "full_name" => get(fields, "full_name"),
                    "company" => company,
                    "role" => effective_role(fields),
                },
                "account_id",
            )
            .await?;
        // 每个注册账户只有一条引导成员关系；重试前改了公司名也只会更新这一行
        store
            .upsert(
                tables::MEMBERSHIPS,
                row! {
                    "membership_key" => onboarding_membership_key(primary_id),
                    "account_id" => primary_id,
                    "workspace" => company_slug(company),
                    "role" => "owner",
                },
                "membership_key",
            )
            .await?;
        Ok(2)
    }

    async fn write_auxiliary(
        &self,
        store: &dyn RecordStore,
        primary_id: &str,
        fields: &Fields,
    ) -> Result<(), StoreError> {
        store
            .upsert(
                tables::ONBOARDING_METRICS,
                row! {
                    "account_id" => primary_id,
                    "team_size" => number(fields, "team_size"),
                    "sprint_length_weeks" => number(fields, "sprint_length_weeks"),
                    "primary_goal" => get(fields, "primary_goal"),
                    "recorded_at" => chrono::Utc::now().to_rfc3339(),
                },
                "account_id",
            )
            .await?;
        Ok(())
    }

    fn notifications(&self, primary_id: &str, fields: &Fields) -> Vec<Notification> {
        let mut out = vec![Notification::new(
            Template::WelcomeEmail,
            json!({
                "to": get(fields, "email"),
                "name": get(fields, "full_name"),
                "company": get(fields, "company"),
            }),
        )];
        if let Some(admin) = &self.admin_email {
            out.push(Notification::new(
                Template::AdminSignupAlert,
                json!({
                    "to": admin,
                    "account_id": primary_id,
                    "company": get(fields, "company"),
                    "team_size": number(fields, "team_size"),
                }),
            ));
        }
        out
    }
}
