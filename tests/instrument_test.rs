// Loop rewriting and array detection over whole programs

use algovis::instrument::{detect_array, instrument, InitError};
use algovis::samples::Example;
use algovis::visual::state::VisualState;
use proptest::prelude::*;

/// Integer literal text: either small, or a digit followed by up to 20 zeros
fn integer_literal() -> impl Strategy<Value = String> {
    prop_oneof![
        (-100_000i64..100_000).prop_map(|n| n.to_string()),
        (1i64..10, 0usize..=20, any::<bool>()).prop_map(|(digit, zeros, negative)| {
            let sign = if negative { "-" } else { "" };
            format!("{}{}{}", sign, digit, "0".repeat(zeros))
        }),
    ]
}

#[test]
fn test_single_loop_order() {
    let source = "for (let i = 0; i < data.length; i++) { swap(i); }";
    let out = instrument(source, 500);

    let highlight = out.find("await highlightElement(i);").unwrap();
    let delay = out.find("await delay(500);").unwrap();
    let body = out.find("swap(i);").unwrap();
    let update = out.find("await updateArrayData(data);").unwrap();
    assert!(highlight < delay && delay < body && body < update);
    assert!(out.ends_with('}'));
}

#[test]
fn test_surrounding_text_preserved() {
    let source = "const data = [1];\n// before\nfor (let k = 0; k < data.length; k++) {\n  log(k);\n}\nlog('after');";
    let out = instrument(source, 10);

    assert!(out.starts_with("const data = [1];\n// before\nfor (let k = 0; k < data.length; k++) {\n"));
    assert!(out.ends_with("}\nlog('after');"));
    assert_eq!(out.matches("await delay(10);").count(), 1);
}

#[test]
fn test_bubble_sort_loops_untouched() {
    // Bounds like `list.length - 1` are not the counted shape
    let source = Example::BubbleSort.source();
    assert_eq!(instrument(source, 500), source);
}

#[test]
fn test_detects_bubble_sort_list() {
    let found = detect_array(Example::BubbleSort.source()).unwrap().unwrap();
    assert_eq!(found.name, "list");
    assert_eq!(
        found.values,
        vec![9.0, 7.0, 5.0, 3.0, 1.0, 8.0, 6.0, 4.0, 2.0, 0.0]
    );
}

#[test]
fn test_detect_rejects_non_numeric() {
    let err = detect_array("const names = ['a', 'b'];").unwrap_err();
    let InitError::InvalidLiteral { name, .. } = err;
    assert_eq!(name, "names");
}

proptest! {
    #[test]
    fn rewriting_without_loops_is_identity(source in "[a-z0-9 ;(){}\\[\\]=<+.\n'\"/]{0,200}") {
        prop_assume!(!source.contains("for"));
        prop_assert_eq!(instrument(&source, 500), source);
    }

    #[test]
    fn initialization_stores_exact_literal(
        name in "[a-z]{1,8}",
        literals in prop::collection::vec(integer_literal(), 0..12),
    ) {
        let list = literals.join(",");
        let source = format!("const {} = [{}];\nlog('after');", name, literals.join(", "));
        let expected: Vec<f64> = literals.iter().map(|l| l.parse().unwrap()).collect();

        let mut state = VisualState::new();
        state.initialize(&source).unwrap();

        prop_assert_eq!(state.array(), expected.as_slice());
        prop_assert_eq!(state.log().len(), 1);
        let expected_list = format!("[{}]", list);
        prop_assert!(state.log()[0].contains(&expected_list));
    }

    #[test]
    fn rewritten_loops_keep_their_body(
        iterator in "[a-h]",
        array in "[p-z]{1,6}",
        body in "[a-z0-9 ;+=]{0,40}",
    ) {
        let source = format!("for (let {i} = 0; {i} < {array}.length; {i}++) {{{body}}}", i = iterator);
        let out = instrument(&source, 500);

        let expected_highlight = format!("await highlightElement({});", iterator);
        let expected_update = format!("await updateArrayData({});", array);
        prop_assert!(out.contains(&body));
        prop_assert!(out.contains(&expected_highlight));
        prop_assert!(out.contains(&expected_update));
    }
}
