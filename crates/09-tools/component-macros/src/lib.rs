//! # Component Macros
//!
//! 编译时生成类型元数据，并在程序启动时（`ctor`）登记到全局类型注册表。
//!
//! ## 核心宏
//!
//! - [`component`] / [`service`] / [`controller`] - 组件声明
//! - [`handlers`] - 在 impl 块中声明请求处理方法
//! - [`stereotype`] - 声明派生构造型
//!
//! 使用这些宏的 crate 需要依赖 `ioc-common`、`ctor`，声明处理器时还需要 `web-mvc`。
//! 组件宏必须写在其它属性之前，`#[request_mapping]` 等辅助属性才会被识别。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::{controller, handlers, service};
//! use std::sync::Arc;
//! use web_mvc::{HandlerResult, WebResponse};
//!
//! #[service]
//! #[derive(Default)]
//! pub struct GreetingService;
//!
//! #[controller]
//! #[request_mapping("/api")]
//! #[derive(Default)]
//! pub struct UserController {
//!     #[autowired]
//!     greetings: Option<Arc<GreetingService>>,
//! }
//!
//! #[handlers]
//! impl UserController {
//!     #[request_mapping("/user")]
//!     pub fn get_user(&self, #[request_param("id")] id: i32) -> HandlerResult {
//!         HandlerResult::raw(format!("user-{id}"))
//!     }
//!
//!     #[request_mapping("/hello")]
//!     pub fn hello(
//!         &self,
//!         #[request_param(name = "name", default = "World")] name: String,
//!         response: &mut WebResponse,
//!     ) {
//!         response.write(&format!("Hello, {name}!"));
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;

mod component;
mod handlers;
mod stereotype;
mod utils;

/// 通用组件
///
/// # 参数
///
/// - `"name"` 或 `name = "name"` - 自定义 Bean 名称（默认为首字母小写的类型名）
/// - `scope = "singleton" | "prototype"` - 作用域（默认单例）
/// - `disposable` - 类型实现了 `DisposableBean`，关闭容器时调用 `destroy`
/// - `constructor = "fn_name"` - 返回 `Result<Self, E>` 的零参关联函数（默认使用 `Default`）
/// - `annotations = ["marker"]` - 额外的标记注解
/// - `stereotype = "marker"` - 用派生构造型替换主标记
///
/// 字段上的 `#[autowired]` / `#[autowired(required = false)]` 声明依赖，类型必须是 `Option<Arc<T>>`。
///
/// # 示例
///
/// ```rust,ignore
/// #[component(scope = "prototype")]
/// #[derive(Default)]
/// pub struct RequestCounter;
/// ```
#[proc_macro_attribute]
pub fn component(args: TokenStream, input: TokenStream) -> TokenStream {
    component::component_impl(quote! { ::ioc_common::markers::COMPONENT }, args, input)
}

/// 服务组件，参数同 [`component`]
#[proc_macro_attribute]
pub fn service(args: TokenStream, input: TokenStream) -> TokenStream {
    component::component_impl(quote! { ::ioc_common::markers::SERVICE }, args, input)
}

/// 控制器组件，参数同 [`component`]
///
/// 结构体上的 `#[request_mapping("/base")]` 声明类型级路由前缀。
#[proc_macro_attribute]
pub fn controller(args: TokenStream, input: TokenStream) -> TokenStream {
    component::component_impl(quote! { ::ioc_common::markers::CONTROLLER }, args, input)
}

/// 请求处理方法
///
/// 块内带 `#[request_mapping("/path")]` 的方法成为处理器，接收者必须是 `&self`。
/// 参数可以是 `#[request_param]` 标注的 `String`/`i32`/`i64`/`f64`/`bool`，
/// 也可以是 `&WebRequest`、`&mut WebResponse`。
#[proc_macro_attribute]
pub fn handlers(args: TokenStream, input: TokenStream) -> TokenStream {
    handlers::handlers_impl(args, input)
}

/// 派生构造型
///
/// # 示例
///
/// ```rust,ignore
/// #[stereotype(meta = ["controller"])]
/// pub struct RestController;
///
/// #[component(stereotype = "rest_controller")]
/// #[derive(Default)]
/// pub struct OrderApi;
/// ```
#[proc_macro_attribute]
pub fn stereotype(args: TokenStream, input: TokenStream) -> TokenStream {
    stereotype::stereotype_impl(args, input)
}
