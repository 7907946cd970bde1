//! Sprintly 助手侧边栏
//!
//! 入口：加载配置、初始化文件日志、打开记录存储、启动助手主控循环与 TUI。

use std::sync::Arc;

use anyhow::Context;
use sprintly::config::load_config_lenient;
use sprintly::core::{build_assistant, spawn_assistant};
use sprintly::row;
use sprintly::store::{tables, Filter, JsonFileStore, RecordStore};
use sprintly::{observability, ui::run_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(Into::into);
    let (cfg, config_err) = load_config_lenient(config_path);

    // TUI 占用终端，日志写到数据目录；guard 存活到 main 结束
    let _log_guard = observability::init_to_file(&cfg.app.data_dir, "sprintly.log")
        .context("Failed to initialise logging")?;
    if let Some(e) = config_err {
        tracing::warn!("Config load failed ({}), using defaults", e);
    }

    let store = Arc::new(
        JsonFileStore::open(cfg.app.store_path())
            .await
            .context("Failed to open record store")?,
    );
    seed_demo_project(store.as_ref()).await?;

    let assistant = build_assistant(&cfg, store);
    let (cmd_tx, state_rx) = spawn_assistant(assistant);

    run_app(state_rx, cmd_tx).await.context("App run failed")?;
    Ok(())
}

/// 空存储时写入一个示例项目，方便直接体验「new task」流程
async fn seed_demo_project(store: &dyn RecordStore) -> anyhow::Result<()> {
    if store.select(tables::PROJECTS, &Filter::all()).await?.is_empty() {
        store
            .insert(tables::PROJECTS, row! { "id" => "demo", "name" => "Demo Project" })
            .await?;
        tracing::info!("seeded demo project");
    }
    Ok(())
}
