//! 应用上下文集成测试（使用独立的类型注册表）

use ioc_abstractions::{ApplicationContext, BeanFactory, BeanFactoryExt};
use ioc_common::{
    markers, Annotation, AnnotationIndex, BeanError, BeanScope, BoxError, ContextState,
    DisposableBean, FieldDescriptor, TypeDescriptor, TypeRegistry,
};
use ioc_impl::{AnnotationConfigApplicationContext, RegistryTypeScanner};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct ServiceBean;

impl ServiceBean {
    fn say_hello(&self) -> String {
        "Hello from ServiceBean".to_string()
    }
}

#[derive(Default)]
struct ControllerBean {
    service_bean: Option<Arc<ServiceBean>>,
}

impl ControllerBean {
    fn handle_request(&self) -> String {
        self.service_bean
            .as_ref()
            .map(|s| s.say_hello())
            .unwrap_or_default()
    }
}

#[derive(Default)]
struct PlainHelper;

#[derive(Default)]
struct ReportJob;

static CLOSED_RESOURCES: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct ResourceHolder;

impl DisposableBean for ResourceHolder {
    fn destroy(&self) -> Result<(), BoxError> {
        CLOSED_RESOURCES.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct BrokenBean;

fn build_broken_bean() -> Result<BrokenBean, BoxError> {
    Err("连接失败".into())
}

fn app_registry() -> Arc<TypeRegistry> {
    let registry = Arc::new(TypeRegistry::new());
    registry.register_type(
        TypeDescriptor::builder::<ServiceBean>("app::beans", "ServiceBean")
            .marker(markers::SERVICE)
            .default_constructor()
            .build(),
    );
    registry.register_type(
        TypeDescriptor::builder::<ControllerBean>("app::beans", "ControllerBean")
            .marker(markers::CONTROLLER)
            .default_constructor()
            .field(FieldDescriptor::autowired::<ControllerBean, ServiceBean>(
                "service_bean",
                true,
                |bean, dep| bean.service_bean = Some(dep),
            ))
            .build(),
    );
    registry.register_type(
        TypeDescriptor::builder::<PlainHelper>("app::beans", "PlainHelper")
            .default_constructor()
            .build(),
    );
    registry.register_type(
        TypeDescriptor::builder::<ReportJob>("app::jobs", "ReportJob")
            .annotation(Annotation::new(markers::COMPONENT).with_value("nightlyReport"))
            .scope(BeanScope::Prototype)
            .default_constructor()
            .build(),
    );
    registry
}

fn context(packages: &str, registry: Arc<TypeRegistry>) -> AnnotationConfigApplicationContext {
    AnnotationConfigApplicationContext::builder(packages)
        .with_registry(registry)
        .with_annotation_index(Arc::new(AnnotationIndex::with_builtin_markers()))
        .build()
}

#[test]
fn test_refresh_registers_marked_types_only() {
    let ctx = context("app::beans", app_registry());
    ctx.refresh().unwrap();

    assert_eq!(ctx.state(), ContextState::Active);
    let names = ctx.bean_definition_names();
    assert!(names.contains(&"serviceBean".to_string()));
    assert!(names.contains(&"controllerBean".to_string()));
    assert!(!names.contains(&"plainHelper".to_string()));
    assert_eq!(ctx.bean_factory().singleton_count(), 2);
}

#[test]
fn test_controller_receives_service() {
    let ctx = context("app::beans", app_registry());
    ctx.refresh().unwrap();

    let controller = ctx.get_named::<ControllerBean>("controllerBean").unwrap();
    assert_eq!(controller.handle_request(), "Hello from ServiceBean");

    let by_name = ctx.get_named::<ServiceBean>("serviceBean").unwrap();
    let by_type = ctx.get_bean_of::<ServiceBean>().unwrap();
    assert!(Arc::ptr_eq(&by_name, &by_type));
}

#[test]
fn test_multiple_roots_and_name_override() {
    let ctx = context(" app::beans , app::jobs ", app_registry());
    assert_eq!(ctx.config_location(), "app::beans,app::jobs");
    ctx.refresh().unwrap();

    assert!(ctx.contains_bean("nightlyReport"));
    assert!(!ctx.is_singleton("nightlyReport").unwrap());
    let first = ctx.get_bean("nightlyReport").unwrap();
    let second = ctx.get_bean("nightlyReport").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_dotted_package_roots_are_scanned() {
    let ctx = context("app.beans, app.jobs", app_registry());
    ctx.refresh().unwrap();

    let names = ctx.bean_definition_names();
    assert!(names.contains(&"controllerBean".to_string()));
    assert!(names.contains(&"nightlyReport".to_string()));
}

#[test]
fn test_overlapping_roots_register_once() {
    let ctx = context("app,app::beans", app_registry());
    ctx.refresh().unwrap();
    assert_eq!(ctx.bean_definition_names().len(), 3);
}

#[test]
fn test_refresh_twice_fails() {
    let ctx = context("app::beans", app_registry());
    ctx.refresh().unwrap();
    assert!(matches!(ctx.refresh(), Err(BeanError::IllegalState { .. })));
}

#[test]
fn test_lookup_before_refresh_and_after_close_fails() {
    let ctx = context("app::beans", app_registry());
    assert!(matches!(
        ctx.get_bean("serviceBean"),
        Err(BeanError::IllegalState { .. })
    ));

    ctx.refresh().unwrap();
    ctx.close();
    assert_eq!(ctx.state(), ContextState::Closed);
    assert!(matches!(
        ctx.get_bean("serviceBean"),
        Err(BeanError::IllegalState { .. })
    ));
    assert!(matches!(ctx.refresh(), Err(BeanError::IllegalState { .. })));
}

#[test]
fn test_close_disposes_singletons_and_is_idempotent() {
    let registry = app_registry();
    registry.register_type(
        TypeDescriptor::builder::<ResourceHolder>("res", "ResourceHolder")
            .marker(markers::COMPONENT)
            .default_constructor()
            .disposable()
            .build(),
    );
    let ctx = context("res", registry);

    ctx.close();
    assert_eq!(CLOSED_RESOURCES.load(Ordering::SeqCst), 0);

    ctx.refresh().unwrap();
    ctx.close();
    ctx.close();
    assert_eq!(CLOSED_RESOURCES.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.bean_factory().singleton_count(), 0);
}

#[test]
fn test_failed_eager_instantiation_aborts_refresh() {
    let registry = app_registry();
    registry.register_type(
        TypeDescriptor::builder::<BrokenBean>("broken", "BrokenBean")
            .marker(markers::COMPONENT)
            .constructor(build_broken_bean)
            .build(),
    );
    let ctx = context("app::beans,broken", registry);

    assert!(matches!(
        ctx.refresh(),
        Err(BeanError::Instantiation { .. })
    ));
    assert_eq!(ctx.state(), ContextState::Closed);
    assert_eq!(ctx.bean_factory().singleton_count(), 0);
}

#[test]
fn test_bean_type_exposes_metadata() {
    let ctx = context("app::beans", app_registry());
    ctx.refresh().unwrap();

    let metadata = ctx.bean_type("controllerBean").unwrap();
    assert_eq!(metadata.simple_name(), "ControllerBean");
    assert_eq!(metadata.declared_fields().len(), 1);
    assert!(ctx.bean_type("missing").is_err_and(|e| e.is_not_found()));
}

#[test]
fn test_custom_scanner_is_used() {
    let registry = app_registry();
    let ctx = AnnotationConfigApplicationContext::builder("app::jobs")
        .with_registry(registry.clone())
        .with_annotation_index(Arc::new(AnnotationIndex::with_builtin_markers()))
        .with_scanner(Arc::new(RegistryTypeScanner::new(registry)))
        .build();
    ctx.refresh().unwrap();
    assert_eq!(ctx.bean_definition_names(), vec!["nightlyReport".to_string()]);
}
