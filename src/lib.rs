//! Sprintly - 敏捷规划工作台的引导向导与 AI 助手侧边栏
//!
//! 模块划分：
//! - **assistant**: 对话式意图路由（创建任务 / 查找相似任务 / 委托对话后端）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、尽力而为副作用、UI 状态投影、助手主控循环
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）与对话后端
//! - **notify**: 通知发送（仅日志 / Webhook）
//! - **observability**: tracing 初始化
//! - **store**: 记录存储（内存 / JSON 文件）与项目、任务目录
//! - **ui**: Ratatui TUI 界面
//! - **wizard**: 分步表单控制器与注册引导、工作区创建向导

pub mod assistant;
pub mod config;
pub mod core;
pub mod llm;
pub mod notify;
pub mod observability;
pub mod store;
pub mod ui;
pub mod wizard;
