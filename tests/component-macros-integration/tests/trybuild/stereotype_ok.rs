use component_macros::{component, stereotype};
use ioc_abstractions::{ApplicationContext, BeanFactory};
use ioc_common::markers;
use ioc_impl::AnnotationConfigApplicationContext;

#[stereotype(meta = ["service"])]
struct Repository;

#[component("orders", stereotype = "repository")]
#[derive(Default)]
struct OrderStore;

fn main() {
    assert_eq!(Repository::MARKER, "repository");

    let context = AnnotationConfigApplicationContext::new(module_path!());
    context.refresh().unwrap();
    assert!(context.contains_bean("orders"));

    let metadata = context.bean_type("orders").unwrap();
    let index = context.annotation_index();
    assert!(index.is_marked(metadata.as_ref(), markers::SERVICE));
    assert!(index.is_marked(metadata.as_ref(), markers::COMPONENT));
    assert!(!index.is_marked(metadata.as_ref(), markers::CONTROLLER));
}
