//! 分步表单控制器：字段规则、纯 reducer 状态、终态提交流水线，以及两个具体向导
//!
//! - **definition**: FieldRule / FieldSpec / WizardDefinition
//! - **state**: WizardState + WizardEvent reducer
//! - **submit**: SubmissionPlan 与 WizardController
//! - **onboarding** / **workspace**: 注册引导、工作区创建

pub mod definition;
pub mod onboarding;
pub mod state;
pub mod submit;
pub mod workspace;

pub use definition::{FieldRule, FieldSpec, Fields, WizardDefinition};
pub use onboarding::{OnboardingPlan, OnboardingWizard};
pub use state::{WizardEvent, WizardPhase, WizardState};
pub use submit::{run_submission, SubmissionPlan, SubmissionReport, WizardController};
pub use workspace::{WorkspacePlan, WorkspaceWizard};
