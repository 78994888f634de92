use proptest::prelude::*;


pub(crate) fn number_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => (0u32..=1000).prop_map(|n| n.to_string()),
        1 => (0u32..100, 0u32..100).prop_map(|(int, frac)| format!("{int}.{frac}")),
    ]
}

pub(crate) fn parenthesized_strategy(inner: impl Strategy<Value = String>) -> impl Strategy<Value = String> {
    inner.prop_map(|expr| format!("({})", expr))
}

pub(crate) fn negated_strategy(inner: impl Strategy<Value = String>) -> impl Strategy<Value = String> {
    inner.prop_map(|expr| format!("-{}", expr))
}

pub(crate) fn binary_operation_strategy(
    left: impl Strategy<Value = String>,
    right: impl Strategy<Value = String>
) -> impl Strategy<Value = String> {
    (
        left,
        prop_oneof![Just("+"), Just("-"), Just("*"), Just("/"), Just("//")],
        right
    ).prop_map(|(l, op, r)| format!("{} {} {}", l, op, r))
}

pub(crate) fn call_strategy(inner: impl Strategy<Value = String> + Clone) -> impl Strategy<Value = String> {
    prop_oneof![
        inner.clone().prop_map(|arg| format!("abs({arg})")),
        (
            prop_oneof![Just("max"), Just("min")],
            prop::collection::vec(inner, 2..4)
        ).prop_map(|(name, args)| format!("{name}({})", args.join(", ")))
    ]
}

/// Well formed expressions of the evaluator grammar. Some of them divide by
/// zero, which is an evaluation error but not a syntax error.
pub(crate) fn arithmetic_strategy() -> impl Strategy<Value = String> {
    number_strategy().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            parenthesized_strategy(inner.clone()),
            negated_strategy(inner.clone()),
            binary_operation_strategy(inner.clone(), inner.clone()),
            call_strategy(inner),
        ]
    })
}
