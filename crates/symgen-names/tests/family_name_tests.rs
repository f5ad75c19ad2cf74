//! Family-name erasure properties over well-formed names.

use symgen_names::{family_name, parse};

const WELL_FORMED: &[&str] = &[
    "Foo",
    "A::B::C",
    "Vec<int>",
    "Vec<Vec<int>>",
    "Map<Pair<K,V>,Alloc>",
    "std::basic_string<char,std::char_traits<char>,std::allocator<char>>",
    "Outer<int>::Inner",
    "Buf<unsigned short,16>",
];

#[test]
fn family_name_is_idempotent_over_render() {
    for name in WELL_FORMED {
        let parsed = parse(name).expect("well-formed name parses");
        let rendered = parsed.render();
        let reparsed = parse(&rendered).expect("rendered name parses");
        assert_eq!(
            parsed.family_name(),
            reparsed.family_name(),
            "family name changed after render for `{name}`"
        );
        // Erasure is a fixpoint: the family name of a family name is itself.
        let family = parsed.family_name();
        assert_eq!(
            family_name(&family).expect("family name parses"),
            family,
            "family name not idempotent for `{name}`"
        );
    }
}

#[test]
fn render_round_trips_structure() {
    for name in WELL_FORMED {
        let parsed = parse(name).expect("well-formed name parses");
        let reparsed = parse(&parsed.render()).expect("rendered name parses");
        assert_eq!(parsed, reparsed, "structure changed after render for `{name}`");
    }
}

#[test]
fn specializations_of_one_family_share_a_key() {
    let family: Vec<String> = ["Vec<int>", "Vec<float>", "Vec<Vec<int>>"]
        .iter()
        .map(|n| family_name(n).expect("parses"))
        .collect();
    assert!(family.iter().all(|f| f == "Vec<>"));
}
