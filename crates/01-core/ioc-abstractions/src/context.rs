//! 应用上下文抽象

use crate::factory::BeanFactory;
use ioc_common::{AnnotationIndex, BeanResult, ContextState, TypeMetadata};
use std::sync::Arc;

/// 应用上下文 trait
///
/// 生命周期：`Created --refresh--> Active --close--> Closed`，关闭后不可重新激活。
pub trait ApplicationContext: BeanFactory {
    /// 扫描、注册并预实例化单例
    fn refresh(&self) -> BeanResult<()>;

    /// 销毁单例并进入关闭状态；非活动状态下调用无效果
    fn close(&self);

    /// 当前状态
    fn state(&self) -> ContextState;

    /// 是否处于活动状态
    fn is_active(&self) -> bool {
        self.state() == ContextState::Active
    }

    /// 扫描根路径，逗号分隔
    fn config_location(&self) -> String;

    /// 所有 Bean 名称（注册顺序）
    fn bean_definition_names(&self) -> Vec<String>;

    /// Bean 对应类型的元数据
    fn bean_type(&self, name: &str) -> BeanResult<Arc<dyn TypeMetadata>>;

    /// 上下文使用的注解类型索引
    fn annotation_index(&self) -> Arc<AnnotationIndex>;
}
