use formflow_core::{apply_patch, diff, pointer, Operation};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(Value::from),
        "[a-z]{0,3}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c~/]{0,2}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn arb_path() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just("a"), Just("b"), Just("0"), Just("1"), Just("-")], 1..3)
        .prop_map(|segments| pointer::from_segments(&segments))
}

fn arb_op() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (arb_path(), arb_json()).prop_map(|(path, value)| Operation::add(path, value)),
        (arb_path(), arb_json()).prop_map(|(path, value)| Operation::replace(path, value)),
        arb_path().prop_map(Operation::remove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn diff_then_apply_reaches_target(before in arb_json(), after in arb_json()) {
        let ops = diff(&before, &after);
        prop_assert_eq!(apply_patch(&before, &ops).unwrap(), after);
    }

    #[test]
    fn diff_of_identical_documents_is_empty(doc in arb_json()) {
        prop_assert!(diff(&doc, &doc).is_empty());
    }

    #[test]
    fn rediff_reproduces_accepted_patch(doc in arb_json(), ops in prop::collection::vec(arb_op(), 1..5)) {
        if let Ok(target) = apply_patch(&doc, &ops) {
            let rediffed = diff(&doc, &target);
            prop_assert_eq!(apply_patch(&doc, &rediffed).unwrap(), target);
        }
    }

    #[test]
    fn rejected_patch_leaves_input_untouched(doc in arb_json(), ops in prop::collection::vec(arb_op(), 1..5)) {
        let snapshot = doc.clone();
        let _ = apply_patch(&doc, &ops);
        prop_assert_eq!(doc, snapshot);
    }
}
