//! dispatch-hosting：把目录构建、目录提供方与选择器装配成可用的宿主。
//!
//! # 教案级说明
//! - [`HostBuilder`] 负责一次性装配，[`DispatchHost`] 负责运行期选择与重新加载；
//! - [`install_tracing`] 安装进程级日志订阅器，与宿主装配相互独立。

mod host;
mod telemetry;

pub use host::{DispatchHost, HostBuilder};
pub use telemetry::{TelemetryError, install_tracing};
