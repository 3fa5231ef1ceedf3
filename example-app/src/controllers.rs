//! 示例控制器

use crate::services::{GreetingService, UserDirectory};
use component_macros::{component, controller, handlers, stereotype};
use ioc_common::BoxError;
use serde_json::Value;
use std::sync::Arc;
use web_mvc::{HandlerResult, WebRequest, WebResponse, TEXT_PLAIN_UTF8};

/// 返回纯文本的控制器
#[stereotype(meta = ["controller"])]
pub struct RestController;

/// 用户接口
#[controller]
#[request_mapping("/api")]
#[derive(Default)]
pub struct UserController {
    #[autowired]
    greetings: Option<Arc<GreetingService>>,
    #[autowired(required = false)]
    directory: Option<Arc<UserDirectory>>,
}

#[handlers]
impl UserController {
    #[request_mapping("/user")]
    pub fn get_user(&self, #[request_param("id")] id: i32) -> HandlerResult {
        HandlerResult::raw(format!("user-{id}"))
    }

    #[request_mapping("/user/name")]
    pub fn user_name(&self, #[request_param("id")] id: i32) -> Result<HandlerResult, BoxError> {
        let directory = self.directory.as_ref().ok_or("用户目录不可用")?;
        let name = directory
            .find(id)
            .ok_or_else(|| format!("用户不存在: {id}"))?;
        Ok(HandlerResult::raw(name))
    }

    #[request_mapping("/hello")]
    pub fn hello(
        &self,
        #[request_param(name = "name", default = "World")] name: String,
        response: &mut WebResponse,
    ) -> Result<(), BoxError> {
        let greetings = self.greetings.as_ref().ok_or("问候语服务未注入")?;
        response.set_character_encoding("UTF-8");
        response.set_content_type(TEXT_PLAIN_UTF8);
        response.write(&greetings.greet(&name));
        Ok(())
    }
}

/// 视图示例
#[controller]
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

/// 运行状态
#[component(stereotype = "rest_controller")]
#[request_mapping("/status")]
#[derive(Default)]
pub struct StatusController {
    #[autowired]
    greetings: Option<Arc<GreetingService>>,
}

#[handlers]
impl StatusController {
    #[request_mapping]
    pub fn status(&self) -> u64 {
        self.greetings.as_ref().map_or(0, |g| g.served())
    }
}
