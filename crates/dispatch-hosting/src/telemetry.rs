use std::sync::OnceLock;

use thiserror::Error;
use tracing::dispatcher;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// 日志订阅器安装失败。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("dispatch tracing subscriber is already installed")]
    AlreadyInstalled,

    #[error("a global tracing subscriber was installed by someone else")]
    SubscriberAlreadySet,

    #[error("invalid tracing filter `{filter}`: {detail}")]
    InvalidFilter { filter: String, detail: String },

    #[error("failed to set the global tracing subscriber")]
    SetGlobalSubscriber(#[source] dispatcher::SetGlobalDefaultError),
}

/// 安装进程级 `fmt + EnvFilter` 订阅器。
///
/// # 教案式说明
/// - **逻辑（How）**：
///   1. 已由本函数安装过时返回 [`TelemetryError::AlreadyInstalled`]；
///   2. 外部已设置全局订阅器时返回 [`TelemetryError::SubscriberAlreadySet`]；
///   3. `filter` 为 `None` 时读取 `RUST_LOG`，缺省为 `info`。
/// - **契约（What）**：每个进程只能成功一次。
pub fn install_tracing(filter: Option<&str>) -> Result<(), TelemetryError> {
    if INSTALLED.get().is_some() {
        return Err(TelemetryError::AlreadyInstalled);
    }
    if dispatcher::has_been_set() {
        return Err(TelemetryError::SubscriberAlreadySet);
    }

    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter(filter)?)
        .with(fmt::layer());
    tracing::subscriber::set_global_default(subscriber)
        .map_err(TelemetryError::SetGlobalSubscriber)?;

    INSTALLED.set(()).map_err(|_| TelemetryError::AlreadyInstalled)
}

fn build_env_filter(filter: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    match filter {
        Some(filter) => EnvFilter::try_new(filter).map_err(|error| TelemetryError::InvalidFilter {
            filter: filter.to_owned(),
            detail: error.to_string(),
        }),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}
