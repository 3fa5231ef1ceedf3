//! # 应用组合层
//!
//! 把配置、日志、应用上下文与分发器组装成一个可运行的 Web 应用。
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use app_composition::{ApplicationSettings, LoggingConfig, WebApplicationBuilder};
//! use web_mvc::{WebRequest, WebResponse};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ApplicationSettings::load()?;
//!     let app = WebApplicationBuilder::new(settings)
//!         .with_logging(LoggingConfig::development())
//!         .build()?;
//!
//!     let mut response = WebResponse::new();
//!     app.service(&WebRequest::get("/api/hello"), &mut response);
//!     println!("{}", response.body());
//!
//!     app.shutdown();
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod error;
pub mod logging;
pub mod settings;

pub use application::{WebApplication, WebApplicationBuilder};
pub use error::{BootstrapError, BootstrapResult};
pub use logging::LoggingConfig;
pub use settings::{ApplicationSettings, MvcSettings, ScanSettings, ServerSettings, ViewSettings};
