//! 向导状态与纯 reducer
//!
//! `WizardState` 是不可变值：每个用户事件经 `reduce` 得到新状态，UI 层是唯一持有「当前状态」的地方。
//! 步号只能逐步前进 / 后退，前进前必须通过当前步的全部字段校验。

use std::fmt;
use std::marker::PhantomData;

use crate::wizard::{Fields, WizardDefinition};

/// 向导所处阶段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPhase {
    /// 收集输入中
    Collecting,
    /// 终态提交进行中（不可重入）
    Submitting,
    /// 提交成功，字段已清空
    Succeeded,
    /// 提交失败，停留在最后一步，可重试
    Failed(String),
}

/// 驱动向导的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    SetField { name: String, value: String },
    Next,
    Back,
    Reset,
    SubmitStarted,
    SubmitSucceeded,
    SubmitFailed(String),
}

impl WizardEvent {
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetField {
            name: name.into(),
            value: value.into(),
        }
    }
}

pub struct WizardState<W: WizardDefinition> {
    current_step: usize,
    fields: Fields,
    phase: WizardPhase,
    /// 同一次填写（含失败后重试）共用的幂等键；Reset 后重新生成
    submission_key: String,
    _wizard: PhantomData<fn() -> W>,
}

impl<W: WizardDefinition> Clone for WizardState<W> {
    fn clone(&self) -> Self {
        Self {
            current_step: self.current_step,
            fields: self.fields.clone(),
            phase: self.phase.clone(),
            submission_key: self.submission_key.clone(),
            _wizard: PhantomData,
        }
    }
}

impl<W: WizardDefinition> PartialEq for WizardState<W> {
    fn eq(&self, other: &Self) -> bool {
        self.current_step == other.current_step
            && self.fields == other.fields
            && self.phase == other.phase
            && self.submission_key == other.submission_key
    }
}

impl<W: WizardDefinition> fmt::Debug for WizardState<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardState")
            .field("current_step", &self.current_step)
            .field("total_steps", &W::TOTAL_STEPS)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("phase", &self.phase)
            .finish()
    }
}

impl<W: WizardDefinition> Default for WizardState<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: WizardDefinition> WizardState<W> {
    pub fn new() -> Self {
        Self {
            current_step: 1,
            fields: Fields::new(),
            phase: WizardPhase::Collecting,
            submission_key: uuid::Uuid::new_v4().to_string(),
            _wizard: PhantomData,
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        W::TOTAL_STEPS
    }

    pub fn is_terminal_step(&self) -> bool {
        self.current_step == W::TOTAL_STEPS
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    pub fn submission_key(&self) -> &str {
        &self.submission_key
    }

    /// 当前步未通过校验的字段名
    pub fn validation_errors(&self) -> Vec<&'static str> {
        W::step_fields(self.current_step)
            .iter()
            .filter(|spec| !spec.rule.check(spec.name, &self.fields))
            .map(|spec| spec.name)
            .collect()
    }

    /// 当前步声明的全部字段都通过校验；其他步的字段不参与判断
    pub fn can_advance(&self) -> bool {
        self.validation_errors().is_empty()
    }

    /// 通过校验且不在最后一步时前进一步，否则原样返回
    pub fn go_next(mut self) -> Self {
        if self.can_advance() && self.current_step < W::TOTAL_STEPS {
            self.current_step += 1;
        }
        self
    }

    /// 不在第一步时后退一步；已填字段保留
    pub fn go_back(mut self) -> Self {
        if self.current_step > 1 {
            self.current_step -= 1;
        }
        self
    }

    /// 纯 reducer：提交中只接受提交结果；任何编辑或导航都会把失败阶段带回收集阶段
    pub fn reduce(mut self, event: WizardEvent) -> Self {
        let phase = std::mem::replace(&mut self.phase, WizardPhase::Collecting);
        match (event, phase) {
            (WizardEvent::Reset, _) => Self::new(),
            (WizardEvent::SubmitSucceeded, WizardPhase::Submitting) => {
                let mut fresh = Self::new();
                fresh.phase = WizardPhase::Succeeded;
                fresh
            }
            (WizardEvent::SubmitFailed(msg), WizardPhase::Submitting) => {
                self.phase = WizardPhase::Failed(msg);
                self
            }
            (_, WizardPhase::Submitting) => {
                self.phase = WizardPhase::Submitting;
                self
            }
            (WizardEvent::SetField { name, value }, _) => {
                self.fields.insert(name, value);
                self
            }
            (WizardEvent::Next, _) => self.go_next(),
            (WizardEvent::Back, _) => self.go_back(),
            (WizardEvent::SubmitStarted, _) if self.is_terminal_step() && self.can_advance() => {
                self.phase = WizardPhase::Submitting;
                self
            }
            (_, phase) => {
                self.phase = phase;
                self
            }
        }
    }
}
