//! 元数据定义
//!
//! 编译期由过程宏生成、启动时注册到类型注册表的类型元数据。
//! 容器与 Web 分发层只通过 [`TypeMetadata`] 读取这些信息。

use crate::annotation::markers;
use crate::component::BeanRef;
use crate::errors::BoxError;
use crate::lifecycle::{BeanScope, DisposableBean};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// 零参构造器
pub type Constructor =
    Arc<dyn Fn() -> Result<Box<dyn Any + Send + Sync>, BoxError> + Send + Sync>;

/// 字段注入器：把已解析的依赖写入尚未发布的实例
pub type FieldInjector =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), BeanRef) -> Result<(), BoxError> + Send + Sync>;

/// 销毁回调
pub type Disposer = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Result<(), BoxError> + Send + Sync>;

/// 方法调用句柄，具体函数签名由使用方约定（Web 层为处理器函数指针）
pub type MethodHandle = Arc<dyn Any + Send + Sync>;

/// 注解（标记）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    name: String,
    value: Option<String>,
    platform: bool,
}

impl Annotation {
    /// 创建新注解
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            platform: false,
        }
    }

    /// 创建平台注解（如 `derive`），元数据索引不会遍历它们
    pub fn platform(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            platform: true,
        }
    }

    /// 设置注解值
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// 注解名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 注解值
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// 是否为平台注解
    pub const fn is_platform(&self) -> bool {
        self.platform
    }
}

/// 请求参数可转换的目标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `String`
    Text,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `f64`
    Double,
    /// `bool`
    Bool,
}

impl ScalarType {
    /// 根据 Rust 类型名推断目标类型
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.rsplit("::").next().unwrap_or(name) {
            "String" => Some(Self::Text),
            "i32" => Some(Self::Int),
            "i64" => Some(Self::Long),
            "f64" => Some(Self::Double),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }
}

/// `#[request_param]` 绑定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParamBinding {
    /// 请求参数名
    pub name: String,
    /// 缺失时是否报错
    pub required: bool,
    /// 缺失且非必需时使用的默认文本
    pub default_value: String,
    /// 转换目标；`None` 表示不支持的类型
    pub target: Option<ScalarType>,
}

impl RequestParamBinding {
    /// 创建必需参数绑定
    pub fn required(name: impl Into<String>, target: Option<ScalarType>) -> Self {
        Self {
            name: name.into(),
            required: true,
            default_value: String::new(),
            target,
        }
    }

    /// 创建带默认值的可选参数绑定
    pub fn optional(
        name: impl Into<String>,
        default_value: impl Into<String>,
        target: Option<ScalarType>,
    ) -> Self {
        Self {
            name: name.into(),
            required: false,
            default_value: default_value.into(),
            target,
        }
    }
}

/// 处理器参数的绑定方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterBinding {
    /// 从请求参数解析
    RequestParam(RequestParamBinding),
    /// 直接传入平台请求对象
    PlatformRequest,
    /// 直接传入平台响应对象
    PlatformResponse,
    /// 没有任何绑定声明
    Unbound,
}

/// 方法参数描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    /// 参数位置
    pub index: usize,
    /// 参数名
    pub name: String,
    /// 声明类型名
    pub type_name: String,
    /// 绑定方式
    pub binding: ParameterBinding,
}

impl MethodParameter {
    /// 创建参数描述
    pub fn new(
        index: usize,
        name: impl Into<String>,
        type_name: impl Into<String>,
        binding: ParameterBinding,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            type_name: type_name.into(),
            binding,
        }
    }
}

/// 方法描述
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    annotations: Vec<Annotation>,
    parameters: Vec<MethodParameter>,
    handle: Option<MethodHandle>,
}

impl MethodDescriptor {
    /// 创建方法描述
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            parameters: Vec::new(),
            handle: None,
        }
    }

    /// 添加注解
    #[must_use]
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// 添加参数
    #[must_use]
    pub fn parameter(mut self, parameter: MethodParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// 设置调用句柄
    #[must_use]
    pub fn handle(mut self, handle: MethodHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// 方法名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 方法上的注解
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// 按名称查找注解
    pub fn find_annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name() == name)
    }

    /// 参数列表
    pub fn parameters(&self) -> &[MethodParameter] {
        &self.parameters
    }

    /// 调用句柄
    pub fn invoker(&self) -> Option<&MethodHandle> {
        self.handle.as_ref()
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("annotations", &self.annotations)
            .field("parameters", &self.parameters)
            .field("has_handle", &self.handle.is_some())
            .finish()
    }
}

/// 字段描述（只描述需要自动装配的字段）
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    dependency_type_id: TypeId,
    dependency_type_name: &'static str,
    required: bool,
    injector: FieldInjector,
}

impl FieldDescriptor {
    /// 创建 `#[autowired]` 字段描述
    ///
    /// `setter` 负责把依赖写入 `B` 的字段，通常由宏生成。
    pub fn autowired<B, D>(name: impl Into<String>, required: bool, setter: fn(&mut B, Arc<D>)) -> Self
    where
        B: Any + Send + Sync,
        D: Any + Send + Sync,
    {
        let injector: FieldInjector = Arc::new(
            move |target: &mut (dyn Any + Send + Sync), dependency: BeanRef| -> Result<(), BoxError> {
                let bean = target
                    .downcast_mut::<B>()
                    .ok_or_else(|| format!("注入目标类型不匹配: 期望 {}", type_name::<B>()))?;
                let value = dependency
                    .downcast::<D>()
                    .map_err(|_| format!("依赖类型不匹配: 期望 {}", type_name::<D>()))?;
                setter(bean, value);
                Ok(())
            },
        );

        Self {
            name: name.into(),
            dependency_type_id: TypeId::of::<D>(),
            dependency_type_name: type_name::<D>(),
            required,
            injector,
        }
    }

    /// 字段名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 依赖类型 ID
    pub const fn dependency_type_id(&self) -> TypeId {
        self.dependency_type_id
    }

    /// 依赖类型名
    pub const fn dependency_type_name(&self) -> &'static str {
        self.dependency_type_name
    }

    /// 是否必需
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// 把依赖写入目标实例
    pub fn inject(&self, target: &mut (dyn Any + Send + Sync), dependency: BeanRef) -> Result<(), BoxError> {
        (self.injector)(target, dependency)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("dependency", &self.dependency_type_name)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// 类型元数据能力
///
/// 对外暴露类型的注解、待装配字段和声明方法。
pub trait TypeMetadata: Send + Sync {
    /// 完整类型名（`module::path::Ident`）
    fn type_name(&self) -> &str;

    /// 简单类型名
    fn simple_name(&self) -> &str;

    /// Rust 类型 ID
    fn declared_type_id(&self) -> TypeId;

    /// 直接声明的注解
    fn annotations(&self) -> &[Annotation];

    /// 待装配字段
    fn declared_fields(&self) -> &[FieldDescriptor];

    /// 声明的方法
    fn declared_methods(&self) -> &[MethodDescriptor];

    /// 按名称查找直接声明的注解
    fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations().iter().find(|a| a.name() == name)
    }

    /// 是否直接声明了某个标记
    fn has_marker(&self, marker: &str) -> bool {
        self.annotation(marker).is_some()
    }

    /// 某个方法的参数绑定
    fn parameter_bindings_of(&self, method: &str) -> Option<&[MethodParameter]> {
        self.declared_methods()
            .iter()
            .find(|m| m.name() == method)
            .map(MethodDescriptor::parameters)
    }
}

/// 类型描述符，[`TypeMetadata`] 的标准实现
#[derive(Clone)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: String,
    simple_name: String,
    annotations: Vec<Annotation>,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodDescriptor>,
    constructor: Option<Constructor>,
    disposer: Option<Disposer>,
}

impl TypeDescriptor {
    /// 创建类型描述符构建器
    ///
    /// `module_path` 通常来自 `module_path!()`，与 `simple_name` 拼成完整类型名。
    pub fn builder<T: Any + Send + Sync>(
        module_path: &str,
        simple_name: &str,
    ) -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder {
            descriptor: Self {
                type_id: TypeId::of::<T>(),
                type_name: format!("{module_path}::{simple_name}"),
                simple_name: simple_name.to_string(),
                annotations: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                constructor: None,
                disposer: None,
            },
            _marker: PhantomData,
        }
    }

    /// 声明的作用域，未声明时为单例
    pub fn scope(&self) -> BeanScope {
        self.annotation(markers::SCOPE)
            .and_then(Annotation::value)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    /// 是否有零参构造器
    pub fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }

    /// 调用零参构造器
    ///
    /// 构造器 panic 视为构造失败，panic 信息作为错误来源返回。
    pub fn instantiate(&self) -> Result<Box<dyn Any + Send + Sync>, BoxError> {
        let constructor = self
            .constructor
            .as_ref()
            .ok_or_else(|| format!("类型 {} 没有可用的零参构造器", self.type_name))?;
        catch_unwind(AssertUnwindSafe(|| constructor()))
            .unwrap_or_else(|panic| Err(constructor_panic_message(panic.as_ref()).into()))
    }

    /// 销毁回调
    pub fn disposer(&self) -> Option<&Disposer> {
        self.disposer.as_ref()
    }

    /// 合并额外的方法描述（`#[handlers]` 可能在结构体之后注册）
    #[must_use]
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = MethodDescriptor>) -> Self {
        self.methods.extend(methods);
        self
    }
}

fn constructor_panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .map_or_else(|| "构造器发生 panic".to_string(), |m| format!("构造器发生 panic: {m}"))
}

impl TypeMetadata for TypeDescriptor {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn simple_name(&self) -> &str {
        &self.simple_name
    }

    fn declared_type_id(&self) -> TypeId {
        self.type_id
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn declared_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    fn declared_methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("annotations", &self.annotations)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("instantiable", &self.constructor.is_some())
            .field("disposable", &self.disposer.is_some())
            .finish()
    }
}

/// 类型描述符构建器
pub struct TypeDescriptorBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeDescriptorBuilder<T> {
    /// 添加注解
    #[must_use]
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.descriptor.annotations.push(annotation);
        self
    }

    /// 添加无值标记
    #[must_use]
    pub fn marker(self, name: &str) -> Self {
        self.annotation(Annotation::new(name))
    }

    /// 声明作用域
    #[must_use]
    pub fn scope(self, scope: BeanScope) -> Self {
        self.annotation(Annotation::new(markers::SCOPE).with_value(scope.as_str()))
    }

    /// 添加待装配字段
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.descriptor.fields.push(field);
        self
    }

    /// 添加方法
    #[must_use]
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.descriptor.methods.push(method);
        self
    }

    /// 使用自定义零参构造函数
    #[must_use]
    pub fn constructor<E>(mut self, constructor: fn() -> Result<T, E>) -> Self
    where
        E: Into<BoxError> + 'static,
    {
        self.descriptor.constructor = Some(Arc::new(
            move || -> Result<Box<dyn Any + Send + Sync>, BoxError> {
                constructor()
                    .map(|bean| Box::new(bean) as Box<dyn Any + Send + Sync>)
                    .map_err(Into::into)
            },
        ));
        self
    }

    /// 构建描述符
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

impl<T: Any + Send + Sync + Default> TypeDescriptorBuilder<T> {
    /// 使用 `Default` 作为零参构造器
    #[must_use]
    pub fn default_constructor(mut self) -> Self {
        self.descriptor.constructor = Some(Arc::new(
            || -> Result<Box<dyn Any + Send + Sync>, BoxError> {
                Ok(Box::new(T::default()) as Box<dyn Any + Send + Sync>)
            },
        ));
        self
    }
}

impl<T: Any + DisposableBean> TypeDescriptorBuilder<T> {
    /// 注册 [`DisposableBean::destroy`] 为销毁回调
    #[must_use]
    pub fn disposable(mut self) -> Self {
        self.descriptor.disposer = Some(Arc::new(|bean: &(dyn Any + Send + Sync)| -> Result<(), BoxError> {
            bean.downcast_ref::<T>()
                .ok_or_else(|| format!("销毁目标类型不匹配: 期望 {}", type_name::<T>()))?
                .destroy()
        }));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Repository {
        url: String,
    }

    #[derive(Default)]
    struct Service {
        repository: Option<Arc<Repository>>,
    }

    struct Failing;

    #[test]
    fn test_builder_records_type_information() {
        let descriptor = TypeDescriptor::builder::<Service>("demo::svc", "Service")
            .marker(markers::SERVICE)
            .scope(BeanScope::Prototype)
            .default_constructor()
            .build();

        assert_eq!(descriptor.type_name(), "demo::svc::Service");
        assert_eq!(descriptor.simple_name(), "Service");
        assert_eq!(descriptor.declared_type_id(), TypeId::of::<Service>());
        assert!(descriptor.has_marker(markers::SERVICE));
        assert_eq!(descriptor.scope(), BeanScope::Prototype);
        assert!(descriptor.instantiate().is_ok());
    }

    #[test]
    fn test_missing_constructor_fails_instantiation() {
        let descriptor = TypeDescriptor::builder::<Failing>("demo", "Failing").build();
        assert!(!descriptor.is_instantiable());
        let err = descriptor.instantiate().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("demo::Failing"));
    }

    #[test]
    fn test_autowired_field_injects_dependency() {
        let field = FieldDescriptor::autowired::<Service, Repository>(
            "repository",
            true,
            |bean, dep| bean.repository = Some(dep),
        );
        assert_eq!(field.dependency_type_id(), TypeId::of::<Repository>());

        let mut service: Box<dyn Any + Send + Sync> = Box::new(Service::default());
        let repository: BeanRef = Arc::new(Repository {
            url: "mem://".to_string(),
        });
        field.inject(service.as_mut(), repository).unwrap();

        let service = service.downcast_ref::<Service>().unwrap();
        assert_eq!(service.repository.as_ref().unwrap().url, "mem://");
    }

    #[test]
    fn test_autowired_field_rejects_wrong_dependency() {
        let field = FieldDescriptor::autowired::<Service, Repository>(
            "repository",
            true,
            |bean, dep| bean.repository = Some(dep),
        );
        let mut service: Box<dyn Any + Send + Sync> = Box::new(Service::default());
        let wrong: BeanRef = Arc::new(42_u32);
        assert!(field.inject(service.as_mut(), wrong).is_err());
    }

    #[test]
    fn test_parameter_bindings_lookup() {
        let method = MethodDescriptor::new("get_user").parameter(MethodParameter::new(
            0,
            "id",
            "i32",
            ParameterBinding::RequestParam(RequestParamBinding::required("id", Some(ScalarType::Int))),
        ));
        let descriptor = TypeDescriptor::builder::<Service>("demo", "Service")
            .method(method)
            .build();

        let bindings = descriptor.parameter_bindings_of("get_user").unwrap();
        assert_eq!(bindings.len(), 1);
        assert!(descriptor.parameter_bindings_of("missing").is_none());
    }

    #[test]
    fn test_scalar_type_from_type_name() {
        assert_eq!(ScalarType::from_type_name("String"), Some(ScalarType::Text));
        assert_eq!(ScalarType::from_type_name("std::string::String"), Some(ScalarType::Text));
        assert_eq!(ScalarType::from_type_name("i64"), Some(ScalarType::Long));
        assert_eq!(ScalarType::from_type_name("Vec<u8>"), None);
    }
}
