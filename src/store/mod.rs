//! 记录存储层：RecordStore 抽象、内存 / JSON 文件实现、项目与任务目录
//!
//! 向导提交与助手路由只通过 RecordStore 的 insert / upsert / select 三个操作访问数据。

pub mod directory;
pub mod file;
pub mod memory;
pub mod traits;

pub use directory::{NewTask, Project, ProjectDirectory, ScoredTask, Task, TaskDirectory};
pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use traits::{Filter, Predicate, RecordId, RecordStore, Row, Tables};

/// 表名常量
pub mod tables {
    pub const ACCOUNTS: &str = "accounts";
    pub const PROFILES: &str = "profiles";
    pub const MEMBERSHIPS: &str = "workspace_members";
    pub const ONBOARDING_METRICS: &str = "onboarding_metrics";
    pub const WORKSPACES: &str = "workspaces";
    pub const ROLES: &str = "workspace_roles";
    pub const SPRINT_BASELINES: &str = "sprint_baselines";
    pub const PROJECTS: &str = "projects";
    pub const TASKS: &str = "tasks";
}
