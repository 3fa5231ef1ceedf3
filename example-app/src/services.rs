//! 示例服务

use component_macros::{component, service};
use ioc_common::{BoxError, DisposableBean};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// 问候语服务
#[service(disposable)]
#[derive(Debug, Default)]
pub struct GreetingService {
    served: AtomicU64,
}

impl GreetingService {
    /// 生成问候语
    pub fn greet(&self, name: &str) -> String {
        self.served.fetch_add(1, Ordering::Relaxed);
        format!("Hello, {name}!")
    }

    /// 已生成的问候语数量
    pub fn served(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }
}

impl DisposableBean for GreetingService {
    fn destroy(&self) -> Result<(), BoxError> {
        info!("问候语服务关闭, 共处理 {} 次问候", self.served());
        Ok(())
    }
}

/// 内置用户目录
#[component(constructor = "seeded")]
#[derive(Debug)]
pub struct UserDirectory {
    users: BTreeMap<i32, String>,
}

impl UserDirectory {
    /// 带几条演示数据的目录
    pub fn seeded() -> Result<Self, BoxError> {
        let users = [(1, "alice"), (2, "bob"), (7, "grace")]
            .into_iter()
            .map(|(id, name)| (id, name.to_string()))
            .collect();
        Ok(Self { users })
    }

    /// 按编号查找用户名
    pub fn find(&self, id: i32) -> Option<&str> {
        self.users.get(&id).map(String::as_str)
    }
}
