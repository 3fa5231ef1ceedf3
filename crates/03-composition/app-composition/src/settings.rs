//! 应用配置
//!
//! 加载顺序：内置默认值 → 配置文件（可选）→ `MINISPRING_` 前缀的环境变量。
//! 环境变量用 `__` 表示层级，例如 `MINISPRING_SCAN__PACKAGE=app.web`。

use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use web_mvc::{DEFAULT_VIEW_PREFIX, DEFAULT_VIEW_SUFFIX};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "MINISPRING";

/// 默认配置文件（不含扩展名）
pub const DEFAULT_CONFIG_FILE: &str = "config/app";

/// 默认监听地址
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSettings {
    /// 组件扫描
    pub scan: ScanSettings,
    /// Web MVC
    pub mvc: MvcSettings,
    /// 演示服务器
    pub server: ServerSettings,
}

/// 组件扫描配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// 逗号分隔的扫描根
    pub package: String,
}

/// Web MVC 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MvcSettings {
    /// 视图解析
    pub view: ViewSettings,
}

/// 视图解析配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// 视图路径前缀
    pub prefix: String,
    /// 视图路径后缀
    pub suffix: String,
}

/// 演示服务器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// 监听地址
    pub bind: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            scan: ScanSettings {
                package: String::new(),
            },
            mvc: MvcSettings {
                view: ViewSettings {
                    prefix: DEFAULT_VIEW_PREFIX.to_string(),
                    suffix: DEFAULT_VIEW_SUFFIX.to_string(),
                },
            },
            server: ServerSettings {
                bind: DEFAULT_BIND_ADDRESS.to_string(),
            },
        }
    }
}

impl ApplicationSettings {
    /// 从默认位置加载：`config/app.*` 与环境变量
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(File::with_name(DEFAULT_CONFIG_FILE).required(false), environment())
    }

    /// 从指定配置文件加载，文件不存在时报错
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_sources(File::from(path.as_ref()).required(true), environment())
    }

    /// 使用显式给出的配置源加载
    pub fn from_sources<F, E>(file: F, environment: E) -> Result<Self, ConfigError>
    where
        F: config::Source + Send + Sync + 'static,
        E: config::Source + Send + Sync + 'static,
    {
        let settings: Self = defaults()?
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        debug!("应用配置加载完成: {:?}", settings);
        Ok(settings)
    }

    /// 以逗号分隔的扫描根
    pub fn scan_packages(&self) -> Vec<&str> {
        self.scan
            .package
            .split(',')
            .map(str::trim)
            .filter(|root| !root.is_empty())
            .collect()
    }
}

/// `MINISPRING_` 前缀、`__` 分隔层级的环境变量源
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let fallback = ApplicationSettings::default();
    Config::builder()
        .set_default("scan.package", fallback.scan.package)?
        .set_default("mvc.view.prefix", fallback.mvc.view.prefix)?
        .set_default("mvc.view.suffix", fallback.mvc.view.suffix)?
        .set_default("server.bind", fallback.server.bind)
}
