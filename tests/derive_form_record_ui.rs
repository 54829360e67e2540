#[test]
fn form_record_derive_ui() {
    let testcases = trybuild::TestCases::new();
    testcases.pass("tests/ui/form_record/pass.rs");
    testcases.compile_fail("tests/ui/form_record/fail_generic.rs");
    testcases.compile_fail("tests/ui/form_record/fail_tuple.rs");
    testcases.compile_fail("tests/ui/form_record/fail_enum.rs");
    testcases.compile_fail("tests/ui/form_record/fail_attr.rs");
}
