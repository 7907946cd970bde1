//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SPRINTLY__*` 覆盖（双下划线表示嵌套，如 `SPRINTLY__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub assistant: AssistantSection,
    pub notify: NotifySection,
}

/// [app] 段：应用名、数据目录、消息日志上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 记录存储与日志文件所在目录，未设置时用 ./data
    pub data_dir: PathBuf,
    /// 助手消息日志最多保留的条数（超出时丢弃最旧的）
    pub max_log_entries: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            data_dir: PathBuf::from("data"),
            max_log_entries: 200,
        }
    }
}

impl AppSection {
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai / mock；openai 需要 OPENAI_API_KEY
    pub provider: String,
    pub model: String,
    /// OpenAI 兼容端点（自建代理、DeepSeek 等）
    pub base_url: Option<String>,
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    /// 单次对话请求超时（秒）
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

/// [assistant] 段：相似任务展示数量、描述预览长度、系统提示词
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantSection {
    pub max_similar_results: usize,
    pub description_preview_chars: usize,
    pub system_prompt: String,
}

impl Default for AssistantSection {
    fn default() -> Self {
        Self {
            max_similar_results: 5,
            description_preview_chars: 100,
            system_prompt: "You are Sprintly, an assistant for agile teams. Help with sprints, \
                            tasks, estimates and retrospectives. Keep answers short."
                .to_string(),
        }
    }
}

/// [notify] 段：Webhook 地址与超时；未配置 webhook 时通知只写日志
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifySection {
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
    /// 新用户注册提醒的收件人
    pub admin_email: Option<String>,
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 10,
            admin_email: None,
        }
    }
}

/// 从 config 目录加载配置，环境变量 SPRINTLY__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SPRINTLY__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SPRINTLY")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

/// 加载配置，失败时回退到默认值并一并返回错误，由调用方在日志初始化之后报告
pub fn load_config_lenient(config_path: Option<PathBuf>) -> (AppConfig, Option<config::ConfigError>) {
    match load_config(config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    }
}

/// 加载配置，失败时记录 warn 并回退到默认值（日志已初始化的入口使用）
pub fn load_config_or_default(config_path: Option<PathBuf>) -> AppConfig {
    let (cfg, err) = load_config_lenient(config_path);
    if let Some(e) = err {
        tracing::warn!("Config load failed ({}), using defaults", e);
    }
    cfg
}
