use component_macros::{controller, handlers, service};
use ioc_abstractions::ApplicationContext;
use ioc_impl::AnnotationConfigApplicationContext;
use std::sync::Arc;
use web_mvc::{Dispatcher, HandlerResult, WebRequest, WebResponse};

#[service]
#[derive(Default)]
struct Clock;

impl Clock {
    fn now(&self) -> i64 {
        42
    }
}

#[controller]
#[request_mapping("/time")]
#[derive(Default)]
struct TimeController {
    #[autowired]
    clock: Option<Arc<Clock>>,
}

#[handlers]
impl TimeController {
    #[request_mapping]
    fn now(&self) -> i64 {
        self.clock.as_ref().map_or(0, |clock| clock.now())
    }

    #[request_mapping("/echo")]
    fn echo(&self, #[request_param] text: String, _response: &mut WebResponse) -> HandlerResult {
        HandlerResult::raw(text)
    }

    fn helper(&self) -> bool {
        true
    }
}

fn main() {
    let context = AnnotationConfigApplicationContext::new(module_path!());
    context.refresh().unwrap();
    let dispatcher = Dispatcher::new(Arc::new(context));

    let mut response = WebResponse::new();
    dispatcher.service(&WebRequest::get("/time"), &mut response);
    assert_eq!(response.body(), "42");

    let mut response = WebResponse::new();
    dispatcher.service(&WebRequest::get("/time/echo?text=hi"), &mut response);
    assert_eq!(response.body(), "hi");

    assert!(TimeController::default().helper());
    assert!(dispatcher.context().is_active());
}
