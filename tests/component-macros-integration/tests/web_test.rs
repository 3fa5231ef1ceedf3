//! 宏声明的控制器经由分发器处理请求

use ioc_abstractions::ApplicationContext;
use ioc_impl::AnnotationConfigApplicationContext;
use serde_json::Value;
use std::sync::Arc;
use std::thread;
use web_mvc::{status, Dispatcher, RequestMappingHandlerMapping, WebError, WebRequest, WebResponse};

mod web {
    use component_macros::{controller, handlers, service};
    use ioc_common::BoxError;
    use serde_json::Value;
    use std::sync::Arc;
    use web_mvc::{HandlerResult, WebRequest, WebResponse, TEXT_PLAIN_UTF8};

    #[service]
    #[derive(Default)]
    pub struct Greeter;

    impl Greeter {
        pub fn greet(&self, name: &str) -> String {
            format!("Hello, {name}!")
        }
    }

    #[controller]
    #[request_mapping("/api")]
    #[derive(Default)]
    pub struct UserController {
        #[autowired]
        greeter: Option<Arc<Greeter>>,
    }

    #[handlers]
    impl UserController {
        #[request_mapping("/user")]
        pub fn get_user(&self, #[request_param("id")] id: i32) -> HandlerResult {
            HandlerResult::raw(format!("user-{id}"))
        }

        #[request_mapping("/hello")]
        pub fn hello(
            &self,
            #[request_param(name = "name", default = "World")] name: String,
            response: &mut WebResponse,
        ) -> Result<(), BoxError> {
            let greeter = self.greeter.as_ref().ok_or("greeter 未注入")?;
            response.set_content_type(TEXT_PLAIN_UTF8);
            response.write(&greeter.greet(&name));
            Ok(())
        }

        #[request_mapping("/sum")]
        pub fn sum(
            &self,
            #[request_param] a: i64,
            #[request_param(required = false)] b: Option<String>,
        ) -> i64 {
            let _ = b;
            a
        }

        #[request_mapping("/flag")]
        pub fn flag(&self, #[request_param(default = "false")] on: bool) -> bool {
            on
        }

        #[request_mapping("/panic")]
        pub fn explode(&self) -> HandlerResult {
            panic!("boom")
        }
    }

    #[controller("pages")]
    #[derive(Default)]
    pub struct ViewController;

    #[handlers]
    impl ViewController {
        #[request_mapping("/view/test.do")]
        pub fn test(
            &self,
            #[request_param(name = "message", default = "Hello JSP")] message: String,
            request: &WebRequest,
        ) -> HandlerResult {
            request.set_attribute("message", Value::from(message));
            HandlerResult::view("test")
        }
    }
}

mod clash {
    use component_macros::{controller, handlers};
    use web_mvc::HandlerResult;

    #[controller]
    #[derive(Default)]
    pub struct FirstController;

    #[handlers]
    impl FirstController {
        #[request_mapping("/same")]
        pub fn one(&self) -> HandlerResult {
            HandlerResult::raw("one")
        }
    }

    #[controller]
    #[derive(Default)]
    pub struct SecondController;

    #[handlers]
    impl SecondController {
        #[request_mapping("same/")]
        pub fn two(&self) -> HandlerResult {
            HandlerResult::raw("two")
        }
    }
}

fn context(packages: &str) -> Arc<dyn ApplicationContext> {
    let context = AnnotationConfigApplicationContext::new(packages);
    context.refresh().unwrap();
    Arc::new(context)
}

fn serve(dispatcher: &Dispatcher, uri: &str) -> WebResponse {
    let mut response = WebResponse::new();
    dispatcher.service(&WebRequest::get(uri), &mut response);
    response
}

#[test]
fn test_controller_requests() {
    let dispatcher = Dispatcher::new(context("web_test::web"));

    assert_eq!(serve(&dispatcher, "/api/user?id=7").body(), "user-7");
    assert_eq!(serve(&dispatcher, "/api/hello").body(), "Hello, World!");
    assert_eq!(serve(&dispatcher, "/api/hello?name=Ann").body(), "Hello, Ann!");
    assert_eq!(serve(&dispatcher, "/api/flag?on=TRUE").body(), "true");
    assert_eq!(serve(&dispatcher, "/api/flag?on=yes").body(), "false");
    assert_eq!(serve(&dispatcher, "/api/flag").body(), "false");
}

#[test]
fn test_failures_map_to_status_codes() {
    let dispatcher = Dispatcher::new(context("web_test::web"));

    assert_eq!(serve(&dispatcher, "/api/user").status(), status::INTERNAL_SERVER_ERROR);
    assert_eq!(serve(&dispatcher, "/api/user?id=x").status(), status::INTERNAL_SERVER_ERROR);
    assert_eq!(serve(&dispatcher, "/api/panic").status(), status::INTERNAL_SERVER_ERROR);
    assert_eq!(serve(&dispatcher, "/api/nothing").status(), status::NOT_FOUND);

    // Option<String> 无法作为请求参数绑定
    let mut response = WebResponse::new();
    let outcome = dispatcher.dispatch(&WebRequest::get("/api/sum?a=1&b=2"), &mut response);
    assert!(matches!(outcome, Err(WebError::UnsupportedParameter { ref parameter, .. }) if parameter == "b"));

    // 处理器在 panic 之后仍然可用
    assert_eq!(serve(&dispatcher, "/api/user?id=1").body(), "user-1");
}

#[test]
fn test_view_forward() {
    let dispatcher = Dispatcher::new(context("web_test::web"));
    let request = WebRequest::get("/view/test.do");
    let mut response = WebResponse::new();
    dispatcher.service(&request, &mut response);

    assert_eq!(
        response.forwarded().map(|f| f.target.as_str()),
        Some("/WEB-INF/views/test.jsp")
    );
    assert_eq!(request.attribute("message"), Some(Value::from("Hello JSP")));
}

#[test]
fn test_bean_names_from_annotations() {
    let context = context("web_test::web");
    let names = context.bean_definition_names();
    assert!(names.contains(&"pages".to_string()));
    assert!(names.contains(&"userController".to_string()));
    assert!(names.contains(&"greeter".to_string()));
}

#[test]
fn test_duplicate_routes_are_rejected() {
    let mapping = RequestMappingHandlerMapping::new(context("web_test::clash"));
    match mapping.route_paths() {
        Err(WebError::DuplicateRoute { path, .. }) => assert_eq!(path, "/same"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_concurrent_first_requests() {
    let dispatcher = Arc::new(Dispatcher::new(context("web_test::web")));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            thread::spawn(move || serve(&dispatcher, &format!("/api/user?id={i}")).body().to_string())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("user-{i}"));
    }
}
