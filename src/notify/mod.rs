//! 通知发送：Notifier 抽象与实现（仅日志 / Webhook）
//!
//! 通知在业务上永远是非致命的：调用方通过 [`send_best_effort`] 发送，
//! 拿到的是 [`BestEffort`]，失败只会以 warn 记录。

pub mod webhook;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::NotifySection;
use crate::core::{BestEffort, NotifyError};

pub use webhook::WebhookNotifier;

/// 通知模板
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    WelcomeEmail,
    AdminSignupAlert,
    WorkspaceInvite,
}

impl Template {
    pub fn id(&self) -> &'static str {
        match self {
            Template::WelcomeEmail => "welcome_email",
            Template::AdminSignupAlert => "admin_signup_alert",
            Template::WorkspaceInvite => "workspace_invite",
        }
    }
}

/// 单条待发送通知
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub template: Template,
    pub payload: Value,
}

impl Notification {
    pub fn new(template: Template, payload: Value) -> Self {
        Self { template, payload }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// 只写日志的发送器（未配置 webhook 时使用）
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            template = notification.template.id(),
            payload = %notification.payload,
            "notification (log only)"
        );
        Ok(())
    }
}

/// 尽力发送：失败记录后吞掉
pub async fn send_best_effort(notifier: &dyn Notifier, notification: &Notification) -> BestEffort<()> {
    BestEffort::from_result(
        notification.template.id(),
        notifier.send(notification).await,
    )
}

/// 根据 [notify] 配置选择发送器
pub fn create_notifier_from_config(cfg: &NotifySection) -> Box<dyn Notifier> {
    match cfg.webhook_url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            tracing::info!("Using webhook notifier ({})", url);
            Box::new(WebhookNotifier::new(url, cfg.timeout_secs))
        }
        _ => {
            tracing::info!("No notify webhook configured, notifications are logged only");
            Box::new(TracingNotifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Down;

    #[async_trait]
    impl Notifier for Down {
        async fn send(&self, _n: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failure() {
        let n = Notification::new(Template::WelcomeEmail, serde_json::json!({"to": "a@b.io"}));
        let outcome = send_best_effort(&Down, &n).await;
        assert!(!outcome.is_done());
        assert!(send_best_effort(&TracingNotifier, &n).await.is_done());
    }
}
