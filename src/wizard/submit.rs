//! 终态提交：主记录 → 依赖记录 → 辅助记录 → 通知
//!
//! 前三个阶段是致命的，任一失败立即中止并返回对应的 [`SubmitError`] 变体；
//! 通知阶段只产生 [`BestEffort`]，失败记录后继续，流程照常成功。
//! 每个阶段都以幂等方式写入（按 submission_key / 主记录 id upsert），失败后可以从第一阶段整体重试。

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{BestEffort, StoreError, SubmitError};
use crate::notify::{send_best_effort, Notification, Notifier};
use crate::store::{RecordId, RecordStore};
use crate::wizard::{Fields, WizardDefinition, WizardEvent, WizardPhase, WizardState};

/// 一个向导的提交计划
#[async_trait]
pub trait SubmissionPlan: Send + Sync {
    type Wizard: WizardDefinition;

    /// 创建主记录，返回其 id。`submission_key` 在重试之间不变，用于幂等
    async fn create_primary(
        &self,
        store: &dyn RecordStore,
        submission_key: &str,
        fields: &Fields,
    ) -> Result<RecordId, StoreError>;

    /// 以主记录 id 为键写入依赖记录（检查后 upsert），返回写入条数
    async fn write_dependents(
        &self,
        store: &dyn RecordStore,
        primary_id: &str,
        fields: &Fields,
    ) -> Result<usize, StoreError>;

    /// 由收集的字段写入指标 / 审计类辅助记录
    async fn write_auxiliary(
        &self,
        store: &dyn RecordStore,
        primary_id: &str,
        fields: &Fields,
    ) -> Result<(), StoreError>;

    /// 成功后要发送的通知
    fn notifications(&self, primary_id: &str, fields: &Fields) -> Vec<Notification>;
}

/// 一次成功提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub primary_id: RecordId,
    pub dependents_written: usize,
    pub notifications: Vec<BestEffort<()>>,
}

impl SubmissionReport {
    pub fn notifications_sent(&self) -> usize {
        self.notifications.iter().filter(|n| n.is_done()).count()
    }

    pub fn notifications_failed(&self) -> usize {
        self.notifications.len() - self.notifications_sent()
    }
}

/// 严格按顺序执行四个阶段
pub async fn run_submission<P: SubmissionPlan + ?Sized>(
    plan: &P,
    store: &dyn RecordStore,
    notifier: &dyn Notifier,
    submission_key: &str,
    fields: &Fields,
) -> Result<SubmissionReport, SubmitError> {
    let primary_id = plan
        .create_primary(store, submission_key, fields)
        .await
        .map_err(SubmitError::Primary)?;
    tracing::info!(%primary_id, "primary record created");

    let dependents_written = plan
        .write_dependents(store, &primary_id, fields)
        .await
        .map_err(SubmitError::Dependent)?;

    plan.write_auxiliary(store, &primary_id, fields)
        .await
        .map_err(SubmitError::Auxiliary)?;

    let mut notifications = Vec::new();
    for n in plan.notifications(&primary_id, fields) {
        notifications.push(send_best_effort(notifier, &n).await);
    }

    Ok(SubmissionReport {
        primary_id,
        dependents_written,
        notifications,
    })
}

/// 持有向导状态与协作方的控制器：事件经 reducer 更新状态，`submit` 驱动终态提交
pub struct WizardController<P: SubmissionPlan> {
    state: WizardState<P::Wizard>,
    plan: P,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl<P: SubmissionPlan> WizardController<P> {
    pub fn new(plan: P, store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: WizardState::new(),
            plan,
            store,
            notifier,
        }
    }

    pub fn state(&self) -> &WizardState<P::Wizard> {
        &self.state
    }

    pub fn dispatch(&mut self, event: WizardEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(event);
    }

    /// 只能在最后一步、字段全部有效且没有进行中的提交时调用
    pub async fn submit(&mut self) -> Result<SubmissionReport, SubmitError> {
        if *self.state.phase() == WizardPhase::Submitting {
            return Err(SubmitError::AlreadySubmitting);
        }
        if !self.state.is_terminal_step() {
            return Err(SubmitError::NotTerminal {
                step: self.state.current_step(),
                total: self.state.total_steps(),
            });
        }
        let invalid = self.state.validation_errors();
        if !invalid.is_empty() {
            return Err(SubmitError::Invalid {
                step: self.state.current_step(),
                fields: invalid.into_iter().map(String::from).collect(),
            });
        }

        self.dispatch(WizardEvent::SubmitStarted);
        let result = run_submission(
            &self.plan,
            self.store.as_ref(),
            self.notifier.as_ref(),
            self.state.submission_key(),
            self.state.fields(),
        )
        .await;

        match &result {
            Ok(report) => {
                tracing::info!(
                    primary_id = %report.primary_id,
                    notifications_failed = report.notifications_failed(),
                    "wizard submitted"
                );
                self.dispatch(WizardEvent::SubmitSucceeded);
            }
            Err(e) => {
                tracing::error!(error = %e, "wizard submission failed");
                self.dispatch(WizardEvent::SubmitFailed(e.to_string()));
            }
        }
        result
    }
}
