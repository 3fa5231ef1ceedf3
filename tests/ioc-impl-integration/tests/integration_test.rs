//! 宏声明的组件 + 全局类型注册表 + 应用上下文

use ioc_abstractions::{ApplicationContext, BeanFactory, BeanFactoryExt};
use ioc_common::{BeanError, ContextState};
use ioc_impl::AnnotationConfigApplicationContext;
use std::sync::Arc;

mod wiring {
    use component_macros::{component, service};
    use ioc_common::{BoxError, DisposableBean};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    static NEXT_TICKET: AtomicUsize = AtomicUsize::new(1);

    #[service]
    #[derive(Debug, Default)]
    pub struct Repository {
        pub url: String,
    }

    /// 没有组件注解，不会被注册
    #[derive(Debug, Default)]
    pub struct AuditLog;

    #[service("accountService")]
    #[derive(Default)]
    pub struct AccountService {
        #[autowired]
        pub repository: Option<Arc<Repository>>,
        #[autowired(required = false)]
        pub audit: Option<Arc<AuditLog>>,
    }

    #[component(scope = "prototype", constructor = "issue")]
    pub struct Ticket {
        pub number: usize,
    }

    impl Ticket {
        pub fn issue() -> Result<Self, BoxError> {
            Ok(Self {
                number: NEXT_TICKET.fetch_add(1, Ordering::SeqCst),
            })
        }
    }

    #[component(disposable)]
    #[derive(Default)]
    pub struct Pool {
        pub closed: AtomicBool,
    }

    impl DisposableBean for Pool {
        fn destroy(&self) -> Result<(), BoxError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }
}

mod cycle {
    use component_macros::component;
    use std::sync::Arc;

    #[component]
    #[derive(Default)]
    pub struct Left {
        #[autowired]
        pub right: Option<Arc<Right>>,
    }

    #[component]
    #[derive(Default)]
    pub struct Right {
        #[autowired]
        pub left: Option<Arc<Left>>,
    }
}

mod broken {
    use component_macros::component;
    use ioc_common::BoxError;

    #[component(constructor = "open")]
    pub struct Broken;

    impl Broken {
        pub fn open() -> Result<Self, BoxError> {
            Err("连接被拒绝".into())
        }
    }
}

fn refreshed(packages: &str) -> AnnotationConfigApplicationContext {
    let context = AnnotationConfigApplicationContext::new(packages);
    context.refresh().unwrap();
    context
}

#[test]
fn test_macro_components_are_wired() -> anyhow::Result<()> {
    let context = refreshed("integration_test::wiring");

    let repository = context.get_named::<wiring::Repository>("repository")?;
    let account = context.get_named::<wiring::AccountService>("accountService")?;
    assert!(Arc::ptr_eq(account.repository.as_ref().unwrap(), &repository));
    assert!(account.audit.is_none());

    let by_type = context.get_bean_of::<wiring::AccountService>()?;
    assert!(Arc::ptr_eq(&by_type, &account));
    assert!(!context.contains_bean("auditLog"));
    Ok(())
}

#[test]
fn test_prototype_is_created_per_lookup() -> anyhow::Result<()> {
    let context = refreshed("integration_test::wiring");

    let first = context.get_named::<wiring::Ticket>("ticket")?;
    let second = context.get_named::<wiring::Ticket>("ticket")?;
    assert_ne!(first.number, second.number);
    assert!(!context.is_singleton("ticket")?);
    assert!(context.is_singleton("repository")?);
    Ok(())
}

#[test]
fn test_close_disposes_and_blocks_lookups() -> anyhow::Result<()> {
    let context = refreshed("integration_test::wiring");
    let pool = context.get_bean_of::<wiring::Pool>()?;

    context.close();

    assert!(pool.closed.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(context.state(), ContextState::Closed);
    assert!(matches!(
        context.get_bean("repository"),
        Err(BeanError::IllegalState { .. })
    ));
    Ok(())
}

#[test]
fn test_scan_is_limited_to_roots() {
    let context = refreshed("integration_test::wiring");
    let names = context.bean_definition_names();
    assert!(names.contains(&"accountService".to_string()));
    assert!(!names.contains(&"left".to_string()));
    assert!(!names.contains(&"broken".to_string()));
}

#[test]
fn test_circular_dependency_fails_refresh() {
    let context = AnnotationConfigApplicationContext::new("integration_test::cycle");
    match context.refresh() {
        Err(BeanError::CircularDependency { chain }) => {
            assert!(chain.contains("left") && chain.contains("right"), "{chain}");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(context.state(), ContextState::Closed);
}

#[test]
fn test_constructor_failure_fails_refresh() {
    let context = AnnotationConfigApplicationContext::new("integration_test::broken");
    assert!(matches!(
        context.refresh(),
        Err(BeanError::Instantiation { ref bean_name, .. }) if bean_name == "broken"
    ));
}

#[test]
fn test_multiple_roots() -> anyhow::Result<()> {
    let context = refreshed(" integration_test::wiring , integration_test::nothing_here ");
    assert_eq!(
        context.config_location(),
        "integration_test::wiring,integration_test::nothing_here"
    );
    assert!(context.contains_bean("pool"));
    Ok(())
}
