use proptest::prelude::*;
use crate::Dice;


pub(crate) fn dice_strategy() -> impl Strategy<Value = Dice> {
    (1..=100u32, 0..=30u32)
        .prop_flat_map(|(sides, amount)| {
            (Just(sides), Just(amount), 0..=amount)
        })
        .prop_flat_map(|(sides, amount, lowest)| {
            (Just(sides), Just(amount), Just(lowest), 0..=amount - lowest)
        })
        .prop_map(|(sides, amount, lowest, highest)| {
            Dice::builder(sides)
                .amount(amount)
                .drop_lowest(lowest)
                .drop_highest(highest)
                .build()
                .unwrap()
        })
}

/// Valid notation strings, in any casing, with optional parts omitted.
pub(crate) fn notation_strategy() -> impl Strategy<Value = String> {
    (
        prop::option::of(1..=50u32),
        prop_oneof![
            Just(String::new()),
            Just("%".to_string()),
            (1..=1000u32).prop_map(|n| n.to_string())
        ],
        prop::option::of(prop::option::of(0..=1u32)),
        prop::option::of(prop::option::of(0..=1u32)),
        any::<bool>()
    ).prop_map(|(amount, sides, lowest, highest, upper)| {
        // a lone die cannot drop both its lowest and highest value
        let (lowest, highest) = if amount.is_some() { (lowest, highest) } else { (lowest, None) };
        let amount_str = amount.map(|n| (n + 2).to_string()).unwrap_or_default();
        let marker = |tag: &str, n: Option<Option<u32>>| match n {
            None => String::new(),
            Some(None) => tag.to_string(),
            Some(Some(n)) => format!("{tag}{n}")
        };

        let notation = format!("{}d{}{}{}", amount_str, sides, marker("l", lowest), marker("h", highest));
        if upper { notation.to_uppercase() } else { notation }
    })
}
