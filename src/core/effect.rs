//! 尽力而为（best-effort）副作用的结果类型
//!
//! `BestEffort<T>` 故意不实现 `Try`/`Into<Result>`：调用方只能查看或记录它，
//! 无法用 `?` 把非致命失败传播出去。

use std::fmt;

/// 非致命调用的结果：成功值或已记录的失败描述
#[must_use = "best-effort outcomes should at least be counted or logged"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort<T> {
    Done(T),
    Failed(String),
}

impl<T> BestEffort<T> {
    /// 执行一个可能失败的结果；失败时以 warn 级别记录 `what`，然后吞掉错误
    pub fn from_result<E: fmt::Display>(what: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Done(v),
            Err(e) => {
                tracing::warn!(effect = what, error = %e, "best-effort call failed, continuing");
                Self::Failed(e.to_string())
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Done(v) => Some(v),
            Self::Failed(_) => None,
        }
    }
}
