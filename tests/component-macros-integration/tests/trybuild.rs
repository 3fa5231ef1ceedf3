//! trybuild 编译期测试

#[test]
fn trybuild_component_macros() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/controller_ok.rs");
    t.pass("tests/trybuild/stereotype_ok.rs");
}
