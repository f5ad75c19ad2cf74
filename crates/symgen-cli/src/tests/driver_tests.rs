use crate::driver::{is_filtered, last_scope};

#[test]
fn filter_drops_compiler_artifacts() {
    assert!(is_filtered("$vbtable"));
    assert!(is_filtered("__vc_attributes::helper_attributes::usageAttribute"));
    assert!(is_filtered("Foo::`anonymous-namespace'::X"));
    assert!(is_filtered("Foo<int&>"));
    assert!(is_filtered("Outer::<unnamed-type-u>"));
}

#[test]
fn filter_keeps_ordinary_and_template_names() {
    assert!(!is_filtered("Bar<int>"));
    assert!(!is_filtered("Foo"));
    assert!(!is_filtered("ns::Type"));
    assert!(!is_filtered("std::vector<int>"));
}

#[test]
fn last_scope_ignores_separators_inside_argument_lists() {
    assert_eq!(last_scope("Foo"), "Foo");
    assert_eq!(last_scope("A::B::C"), "C");
    assert_eq!(last_scope("Map<K,std::less<K>>::iterator"), "iterator");
    assert_eq!(last_scope("Vec<std::string>"), "Vec<std::string>");
    assert_eq!(last_scope("Outer::<unnamed-type-u>"), "<unnamed-type-u>");
}
