//! 可观测性：tracing 日志初始化
//!
//! 默认 info，可通过 RUST_LOG 覆盖。TUI 占用终端时日志写入数据目录下的文件，
//! 由 tracing-appender 的后台线程落盘；返回的 WorkerGuard 需要保持到退出，drop 时刷新缓冲。

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 日志输出到 stderr
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// `dir/file_name` 的非阻塞写入器（不滚动），目录不存在时创建
pub fn file_writer(dir: &Path, file_name: &str) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// 日志追加写入 `dir/file_name`
pub fn init_to_file(dir: &Path, file_name: &str) -> std::io::Result<WorkerGuard> {
    let (writer, guard) = file_writer(dir, file_name)?;
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_file_writer_flushes_on_guard_drop() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let (mut writer, guard) = file_writer(&logs, "sprintly.log").unwrap();
        writer.write_all(b"assistant call failed\n").unwrap();
        drop(guard);

        let content = std::fs::read_to_string(logs.join("sprintly.log")).unwrap();
        assert_eq!(content, "assistant call failed\n");
    }
}
