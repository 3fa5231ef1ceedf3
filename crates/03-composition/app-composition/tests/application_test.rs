//! Web 应用组装测试

use app_composition::{ApplicationSettings, BootstrapError, WebApplicationBuilder};
use ioc_common::{
    markers, Annotation, AnnotationIndex, BeanError, BoxError, MethodDescriptor, TypeDescriptor,
    TypeRegistry,
};
use std::any::Any;
use std::sync::Arc;
use web_mvc::{status, HandlerFn, HandlerResult, WebError, WebRequest, WebResponse};

#[derive(Default)]
struct PageController;

fn invoke_index(
    bean: &(dyn Any + Send + Sync),
    _args: Vec<web_mvc::ArgumentValue>,
    _request: &WebRequest,
    _response: &mut WebResponse,
) -> Result<HandlerResult, BoxError> {
    bean.downcast_ref::<PageController>().ok_or("处理器类型不匹配")?;
    Ok(HandlerResult::view("index"))
}

fn page_registry(duplicate: bool) -> Arc<TypeRegistry> {
    let registry = Arc::new(TypeRegistry::new());
    let index = || {
        MethodDescriptor::new("index")
            .annotation(Annotation::new(markers::REQUEST_MAPPING).with_value("/index"))
            .handle(Arc::new(invoke_index as HandlerFn))
    };
    let mut builder = TypeDescriptor::builder::<PageController>("site::pages", "PageController")
        .marker(markers::CONTROLLER)
        .default_constructor()
        .method(index());
    if duplicate {
        builder = builder.method(index());
    }
    registry.register_type(builder.build());
    registry
}

fn builder(registry: Arc<TypeRegistry>) -> WebApplicationBuilder {
    let mut settings = ApplicationSettings::default();
    settings.scan.package = "site".to_string();
    settings.mvc.view.prefix = "/templates/".to_string();
    settings.mvc.view.suffix = ".html".to_string();
    WebApplicationBuilder::new(settings)
        .with_registry(registry)
        .with_annotation_index(Arc::new(AnnotationIndex::with_builtin_markers()))
}

#[test]
fn test_view_settings_reach_dispatcher() -> anyhow::Result<()> {
    let app = builder(page_registry(false)).build()?;
    assert!(app.context().is_active());

    let mut response = WebResponse::new();
    app.service(&WebRequest::get("/index"), &mut response);
    assert_eq!(response.status(), status::OK);
    assert_eq!(
        response.forwarded().map(|f| f.target.as_str()),
        Some("/templates/index.html")
    );

    app.shutdown();
    assert!(!app.context().is_active());
    Ok(())
}

#[test]
fn test_missing_scan_package_is_config_error() {
    let result = WebApplicationBuilder::new(ApplicationSettings::default())
        .with_registry(page_registry(false))
        .build();
    assert!(matches!(result, Err(BootstrapError::Config(_))));
}

#[test]
fn test_duplicate_route_fails_bootstrap() {
    let result = builder(page_registry(true)).build();
    assert!(matches!(
        result,
        Err(BootstrapError::Web(WebError::DuplicateRoute { .. }))
    ));
}

#[test]
fn test_failed_refresh_is_context_error() {
    let registry = Arc::new(TypeRegistry::new());
    registry.register_type(
        TypeDescriptor::builder::<PageController>("site::pages", "PageController")
            .marker(markers::CONTROLLER)
            .constructor(|| -> Result<PageController, BoxError> { Err("模板目录不可读".into()) })
            .build(),
    );
    let result = builder(registry).build();
    assert!(matches!(
        result,
        Err(BootstrapError::Context(BeanError::Instantiation { .. }))
    ));
}
