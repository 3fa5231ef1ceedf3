//! 解析上下文

use ioc_common::{BeanError, BeanResult};

/// 解析上下文
///
/// 记录当前线程正在创建的 Bean 链，用于快速发现循环依赖。
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// 当前解析链
    pub resolution_chain: Vec<String>,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 把 Bean 加入解析链，已在链中时返回循环依赖错误
    pub fn push_bean(&mut self, name: &str) -> BeanResult<()> {
        if self.resolution_chain.iter().any(|n| n == name) {
            let mut chain = self.resolution_chain.clone();
            chain.push(name.to_string());
            return Err(BeanError::CircularDependency {
                chain: chain.join(" -> "),
            });
        }
        self.resolution_chain.push(name.to_string());
        Ok(())
    }

    /// 从解析链中移除最近加入的 Bean
    pub fn pop_bean(&mut self) {
        self.resolution_chain.pop();
    }

    /// 当前深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }
}
