use std::{cmp::Reverse, fmt::Display, str::FromStr};
use rand::Rng;
use crate::{Error, Score};
use crate::notation::{self, DiceMatch};


/// A group of identical dice with optional drop rules, written in notation as
/// `[amount]d[sides][l[n]][h[n]]`.
///
/// The invariant `drop_lowest + drop_highest <= amount` holds for every value of
/// this type: the constructors, the [`DiceBuilder`] and the setters all refuse
/// to produce a group violating it.
///
/// Two groups compare equal when they have the same `sides` and `amount`; drop
/// rules are not part of equality.
///
/// # Examples
/// ```
/// use xdice::Dice;
///
/// let dice = Dice::parse("4d6l1").unwrap();
///
/// assert_eq!(dice.sides(), 6);
/// assert_eq!(dice.amount(), 4);
/// assert_eq!(dice.drop_lowest(), 1);
/// assert_eq!(dice.to_string(), "4d6l1");
///
/// let score = dice.roll();
/// assert_eq!(score.detail().len(), 3);
/// assert_eq!(score.dropped().len(), 1);
/// ```
#[derive(Debug, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Dice {
    sides: u32,
    amount: u32,
    drop_lowest: u32,
    drop_highest: u32
}

impl Dice {
    /// Number of sides used when the notation omits them (`"3d"` is `3d20`).
    pub const DEFAULT_SIDES: u32 = 20;

    /// Creates `amount` dice of `sides` sides, without drop rules.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if `sides` is 0.
    pub fn new(sides: u32, amount: u32) -> Result<Self, Error> {
        Self::builder(sides).amount(amount).build()
    }

    /// Creates a new [`DiceBuilder`] for dice of `sides` sides.
    ///
    /// # Examples
    /// ```
    /// use xdice::Dice;
    ///
    /// let dice = Dice::builder(6)
    ///     .amount(4)
    ///     .drop_lowest(1)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(dice.to_string(), "4d6l1");
    /// ```
    pub fn builder(sides: u32) -> DiceBuilder {
        DiceBuilder::new(sides)
    }

    /// Parses a single die group such as `"3d6"`, `"d%"` or `"4d6l1h1"`.
    ///
    /// The input is normalized first (whitespace removed, lowercased, `d%`
    /// expanded), then must match the notation in full.
    ///
    /// # Errors
    /// - [`Error::Grammar`] if the input is not a die group.
    /// - [`Error::Validation`] if a value is out of its domain (e.g. `"d0"`) or
    ///   more dice are dropped than rolled.
    ///
    /// # Examples
    /// ```
    /// use xdice::{Dice, Error};
    ///
    /// let dice = Dice::parse("D%").unwrap();
    /// assert_eq!((dice.amount(), dice.sides()), (1, 100));
    ///
    /// assert!(matches!(Dice::parse("d0"), Err(Error::Validation(_))));
    /// assert!(matches!(Dice::parse("3x6"), Err(Error::Grammar(_))));
    /// ```
    pub fn parse(input: &str) -> Result<Self, Error> {
        let source = notation::normalize(input);

        match notation::match_at(&source, 0) {
            Some(found) if found.span.end == source.len() => Self::from_match(&found),
            _ => Err(Error::Grammar(source))
        }
    }

    pub(crate) fn from_match(found: &DiceMatch<'_>) -> Result<Self, Error> {
        let sides = digits_or(found.sides, Self::DEFAULT_SIDES, "sides");
        let amount = digits_or(found.amount, 1, "amount");
        let drop_lowest = found.lowest.map_or(Ok(0), |n| digits_or(n, 1, "drop_lowest"));
        let drop_highest = found.highest.map_or(Ok(0), |n| digits_or(n, 1, "drop_highest"));

        // fields are reported in order: sides, amount, drop_lowest, drop_highest
        let sides = sides?;
        if sides < 1 {
            return Err(Error::invalid("sides", sides));
        }

        Self::builder(sides)
            .amount(amount?)
            .drop_lowest(drop_lowest?)
            .drop_highest(drop_highest?)
            .build()
    }

    /// Number of faces of each die.
    pub fn sides(&self) -> u32 {
        self.sides
    }

    /// Number of dice rolled.
    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// Number of lowest values ignored.
    pub fn drop_lowest(&self) -> u32 {
        self.drop_lowest
    }

    /// Number of highest values ignored.
    pub fn drop_highest(&self) -> u32 {
        self.drop_highest
    }

    /// Sets the number of sides.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if `sides` is 0; the group is left unchanged.
    pub fn set_sides(&mut self, sides: u32) -> Result<(), Error> {
        self.update(|builder| builder.sides = sides)
    }

    /// Sets the number of dice.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the new amount is lower than the number
    /// of dropped dice; the group is left unchanged.
    pub fn set_amount(&mut self, amount: u32) -> Result<(), Error> {
        self.update(|builder| builder.amount = amount)
    }

    /// Sets the number of lowest values to drop.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if more dice would be dropped than rolled;
    /// the group is left unchanged.
    pub fn set_drop_lowest(&mut self, drop_lowest: u32) -> Result<(), Error> {
        self.update(|builder| builder.drop_lowest = drop_lowest)
    }

    /// Sets the number of highest values to drop.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if more dice would be dropped than rolled;
    /// the group is left unchanged.
    pub fn set_drop_highest(&mut self, drop_highest: u32) -> Result<(), Error> {
        self.update(|builder| builder.drop_highest = drop_highest)
    }

    fn update(&mut self, change: impl FnOnce(&mut DiceBuilder)) -> Result<(), Error> {
        let mut builder = DiceBuilder::from(&*self);
        change(&mut builder);
        *self = builder.build()?;
        Ok(())
    }

    /// Canonical notation of the group, e.g. `4d6l1h1`. Drop parts are only
    /// written when non-zero.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Rolls the dice using the thread-local random generator.
    pub fn roll(&self) -> Score {
        self.roll_with(&mut rand::rng())
    }

    /// Rolls the dice using `rng`.
    ///
    /// Each die is an independent uniform sample in `1..=sides`. The lowest
    /// values are then removed one at a time, followed by the highest ones.
    ///
    /// # Examples
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use xdice::Dice;
    ///
    /// let dice = Dice::new(6, 3).unwrap();
    /// let first = dice.roll_with(&mut StdRng::seed_from_u64(7));
    /// let second = dice.roll_with(&mut StdRng::seed_from_u64(7));
    ///
    /// assert_eq!(first, second);
    /// ```
    pub fn roll_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Score {
        let values = self.generate_values(rng);
        let (kept, dropped) = drop_values(values, self.drop_lowest, self.drop_highest);
        let score = Score::new(kept, dropped, self.name());

        tracing::trace!(dice = %self, total = score.total(), "rolled dice group");
        score
    }

    /// Draws `amount` raw values in `1..=sides`, before any drop rule.
    pub fn generate_values<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        (0..self.amount)
            .map(|_| rng.random_range(1..=self.sides))
            .collect()
    }

    const fn kept(&self) -> u32 {
        self.amount - self.drop_lowest - self.drop_highest
    }

    /// Lowest total this group can roll.
    ///
    /// # Examples
    /// ```
    /// use xdice::Dice;
    ///
    /// assert_eq!(Dice::parse("3d20").unwrap().min(), 3);
    /// assert_eq!(Dice::parse("3d20l1").unwrap().min(), 2);
    /// ```
    pub const fn min(&self) -> u64 {
        self.kept() as u64
    }

    /// Highest total this group can roll.
    ///
    /// # Examples
    /// ```
    /// use xdice::Dice;
    ///
    /// assert_eq!(Dice::parse("3d20").unwrap().max(), 60);
    /// assert_eq!(Dice::parse("3d20h2").unwrap().max(), 20);
    /// ```
    pub const fn max(&self) -> u64 {
        self.sides as u64 * self.kept() as u64
    }

    /// Average of the lowest and highest totals.
    pub fn avg(&self) -> f64 {
        (self.min() as f64 + self.max() as f64) / 2.0
    }

    /// Equivalent to `(self.min(), self.max())`.
    pub const fn possible_values(&self) -> (u64, u64) {
        (self.min(), self.max())
    }
}

impl PartialEq for Dice {
    fn eq(&self, other: &Self) -> bool {
        self.sides == other.sides && self.amount == other.amount
    }
}

impl Display for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.amount, self.sides)?;

        if self.drop_lowest > 0 {
            write!(f, "l{}", self.drop_lowest)?;
        }

        if self.drop_highest > 0 {
            write!(f, "h{}", self.drop_highest)?;
        }

        Ok(())
    }
}

impl FromStr for Dice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}


fn digits_or(digits: &str, default: u32, field: &str) -> Result<u32, Error> {
    if digits.is_empty() {
        return Ok(default);
    }

    digits.parse().map_err(|_| Error::invalid(field, digits))
}


/// Removes `lowest` minimum values then `highest` maximum values from `values`.
///
/// Ties remove the first occurrence in the working list. Returns the kept values
/// in their remaining order and the removed values in removal order.
fn drop_values(mut values: Vec<u32>, lowest: u32, highest: u32) -> (Vec<u32>, Vec<u32>) {
    let mut dropped = Vec::with_capacity((lowest + highest) as usize);

    for _ in 0..lowest {
        let position = values.iter()
            .enumerate()
            .min_by_key(|&(_, value)| *value)
            .map(|(i, _)| i);

        if let Some(i) = position {
            dropped.push(values.remove(i));
        }
    }

    for _ in 0..highest {
        let position = values.iter()
            .enumerate()
            .min_by_key(|&(_, value)| Reverse(*value))
            .map(|(i, _)| i);

        if let Some(i) = position {
            dropped.push(values.remove(i));
        }
    }

    (values, dropped)
}


/// A builder for [`Dice`] values.
///
/// Fields can be set in any order; the invariants are only checked by
/// [`DiceBuilder::build()`], so no partially valid group is ever observable.
#[derive(Debug, Clone)]
pub struct DiceBuilder {
    sides: u32,
    amount: u32,
    drop_lowest: u32,
    drop_highest: u32
}

impl DiceBuilder {
    /// Starts a builder for a single die of `sides` sides and no drop rules.
    fn new(sides: u32) -> Self {
        Self {
            sides,
            amount: 1,
            drop_lowest: 0,
            drop_highest: 0
        }
    }

    /// Sets the number of dice to roll.
    pub fn amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the number of lowest values to drop.
    pub fn drop_lowest(mut self, n: u32) -> Self {
        self.drop_lowest = n;
        self
    }

    /// Sets the number of highest values to drop.
    pub fn drop_highest(mut self, n: u32) -> Self {
        self.drop_highest = n;
        self
    }

    /// Validates the configuration and builds the [`Dice`].
    ///
    /// # Errors
    /// - [`Error::Validation`] if `sides` is 0.
    /// - [`Error::Validation`] if `drop_lowest + drop_highest > amount`.
    ///
    /// # Examples
    /// ```
    /// use xdice::{Dice, Error};
    ///
    /// assert!(Dice::builder(6).amount(2).drop_lowest(1).drop_highest(1).build().is_ok());
    ///
    /// let too_many = Dice::builder(6).amount(2).drop_lowest(2).drop_highest(1).build();
    /// assert!(matches!(too_many, Err(Error::Validation(_))));
    /// ```
    pub fn build(self) -> Result<Dice, Error> {
        if self.sides < 1 {
            return Err(Error::invalid("sides", self.sides));
        }

        let dropped = u64::from(self.drop_lowest) + u64::from(self.drop_highest);
        if dropped > u64::from(self.amount) {
            return Err(Error::Validation(format!(
                "You can not drop more dice than amount ({} dropped out of {})",
                dropped, self.amount
            )));
        }

        Ok(Dice {
            sides: self.sides,
            amount: self.amount,
            drop_lowest: self.drop_lowest,
            drop_highest: self.drop_highest
        })
    }
}

impl From<&Dice> for DiceBuilder {
    fn from(dice: &Dice) -> Self {
        Self {
            sides: dice.sides,
            amount: dice.amount,
            drop_lowest: dice.drop_lowest,
            drop_highest: dice.drop_highest
        }
    }
}


/// A macro for conveniently creating [`Dice`] values.
///
/// # Syntax
/// - `dice!(SIDES)`: a single die (e.g. `dice!(20)` for 1d20).
/// - `dice!(SIDES, AMOUNT)`: `AMOUNT` dice (e.g. `dice!(6, 3)` for 3d6).
/// - `dice!(SIDES, AMOUNT, l N)`: drop the `N` lowest values.
/// - `dice!(SIDES, AMOUNT, h N)`: drop the `N` highest values.
/// - `dice!(SIDES, AMOUNT, l N, h M)`: drop both.
///
/// # Returns
/// `Result<Dice, Error>` - the result of [`DiceBuilder::build()`].
///
/// # Examples
/// ```
/// use xdice::dice;
///
/// assert_eq!(dice!(20).unwrap().to_string(), "1d20");
/// assert_eq!(dice!(6, 3).unwrap().to_string(), "3d6");
/// assert_eq!(dice!(6, 4, l 1).unwrap().to_string(), "4d6l1");
/// assert_eq!(dice!(20, 2, h 1).unwrap().to_string(), "2d20h1");
/// assert_eq!(dice!(6, 5, l 1, h 1).unwrap().to_string(), "5d6l1h1");
/// assert!(dice!(6, 1, l 2).is_err());
/// ```
#[macro_export]
macro_rules! dice {
    ($sides:expr) => {
        $crate::Dice::builder($sides)
            .build()
    };

    ($sides:expr, $amount:expr) => {
        $crate::Dice::builder($sides)
            .amount($amount)
            .build()
    };

    ($sides:expr, $amount:expr, l $lowest:expr) => {
        $crate::Dice::builder($sides)
            .amount($amount)
            .drop_lowest($lowest)
            .build()
    };

    ($sides:expr, $amount:expr, h $highest:expr) => {
        $crate::Dice::builder($sides)
            .amount($amount)
            .drop_highest($highest)
            .build()
    };

    ($sides:expr, $amount:expr, l $lowest:expr, h $highest:expr) => {
        $crate::Dice::builder($sides)
            .amount($amount)
            .drop_lowest($lowest)
            .drop_highest($highest)
            .build()
    }
}


#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};
    use super::*;
    use crate::dice_test_strategies::{dice_strategy, notation_strategy};


    #[test]
    fn test_parse_defaults() {
        let dice = Dice::parse("d").unwrap();
        assert_eq!((dice.amount(), dice.sides()), (1, Dice::DEFAULT_SIDES));

        let dice = Dice::parse("3d").unwrap();
        assert_eq!((dice.amount(), dice.sides()), (3, 20));

        let dice = Dice::parse("4d6lh").unwrap();
        assert_eq!((dice.drop_lowest(), dice.drop_highest()), (1, 1));
    }

    #[test]
    fn test_parse_percent() {
        let dice = Dice::parse("d%").unwrap();

        assert_eq!(dice.amount(), 1);
        assert_eq!(dice.sides(), 100);
        assert_eq!(dice.name(), "1d100");
    }

    #[test]
    fn test_parse_explicit_zero_drops() {
        let explicit = Dice::parse("1d20l0h0").unwrap();
        let plain = Dice::parse("1d20").unwrap();

        assert_eq!(explicit, plain);
        assert_eq!(explicit.name(), plain.name());
        assert_eq!(explicit.possible_values(), plain.possible_values());
    }

    #[test]
    fn test_parse_is_case_and_whitespace_insensitive() {
        let dice = Dice::parse(" 4 D 6 L 1 ").unwrap();
        assert_eq!(dice.name(), "4d6l1");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Dice::parse("d0"), Err(Error::Validation(_))));
        assert!(matches!(Dice::parse("1d6l2"), Err(Error::Validation(_))));
        assert!(matches!(Dice::parse("2d6l1h2"), Err(Error::Validation(_))));
        assert!(matches!(Dice::parse("99999999999d6"), Err(Error::Validation(_))));
        assert!(matches!(Dice::parse(""), Err(Error::Grammar(_))));
        assert!(matches!(Dice::parse("6"), Err(Error::Grammar(_))));
        assert!(matches!(Dice::parse("1d6+1"), Err(Error::Grammar(_))));
        assert!(matches!(Dice::parse("2d6h1l1"), Err(Error::Grammar(_))));
    }

    #[test]
    fn test_parse_reports_fields_in_order() {
        assert_eq!(Dice::parse("99999999999d0"), Err(Error::invalid("sides", 0)));
        assert_eq!(Dice::parse("99999999999d99999999999"), Err(Error::invalid("sides", "99999999999")));
        assert_eq!(Dice::parse("99999999999d6l99999999999"), Err(Error::invalid("amount", "99999999999")));
        assert_eq!(Dice::parse("2d6l99999999999h99999999999"), Err(Error::invalid("drop_lowest", "99999999999")));
        assert_eq!(Dice::parse("2d6l1h99999999999"), Err(Error::invalid("drop_highest", "99999999999")));
    }

    #[test]
    fn test_equality_ignores_drop_rules() {
        let plain = dice!(6, 4).unwrap();
        let dropping = dice!(6, 4, l 1).unwrap();

        assert_eq!(plain, dropping);
        assert_ne!(plain, dice!(6, 3).unwrap());
        assert_ne!(plain, dice!(8, 4).unwrap());
    }

    #[test]
    fn test_setters_keep_invariant() {
        let mut dice = dice!(6, 2).unwrap();

        assert!(dice.set_drop_lowest(3).is_err());
        assert_eq!(dice.drop_lowest(), 0);

        dice.set_amount(4).unwrap();
        dice.set_drop_lowest(3).unwrap();
        assert!(dice.set_drop_highest(2).is_err());
        assert!(dice.set_amount(2).is_err());
        assert_eq!(dice.amount(), 4);

        assert!(dice.set_sides(0).is_err());
        dice.set_sides(8).unwrap();
        assert_eq!(dice.name(), "4d8l3");
    }

    #[test]
    fn test_zero_amount() {
        let dice = Dice::new(6, 0).unwrap();
        let score = dice.roll();

        assert_eq!(score.total(), 0);
        assert!(score.detail().is_empty());
        assert!(score.dropped().is_empty());
        assert_eq!(dice.possible_values(), (0, 0));
    }

    #[test]
    fn test_drop_values_order() {
        let (kept, dropped) = drop_values(vec![3, 1, 6, 1, 6, 4], 2, 1);

        assert_eq!(dropped, vec![1, 1, 6]);
        assert_eq!(kept, vec![3, 6, 4]);
    }

    #[test]
    fn test_drop_values_ties_remove_first() {
        let (kept, dropped) = drop_values(vec![2, 2, 2], 1, 1);

        assert_eq!(kept, vec![2]);
        assert_eq!(dropped, vec![2, 2]);
    }

    #[test]
    fn test_roll_with_seed_is_reproducible() {
        let dice = Dice::parse("10d12l2h2").unwrap();

        let first = dice.roll_with(&mut StdRng::seed_from_u64(42));
        let second = dice.roll_with(&mut StdRng::seed_from_u64(42));

        assert_eq!(first, second);
        assert_eq!(first.name(), "10d12l2h2");
    }

    #[test]
    fn test_drop_lowest_scenario() {
        let dice = Dice::parse("4d6l1").unwrap();
        let score = dice.roll();

        assert_eq!(score.detail().len(), 3);
        assert_eq!(score.dropped().len(), 1);
        assert!(score.detail().iter().all(|&kept| kept >= score.dropped()[0]));
        assert_eq!(score.total(), score.detail().iter().map(|&v| v as i64).sum::<i64>());
    }

    proptest! {
        #[test]
        fn test_roll_within_bounds(sides in 1..=100u32, amount in 0..=50u32) {
            let dice = Dice::new(sides, amount).unwrap();
            let score = dice.roll();

            prop_assert_eq!(score.detail().len(), amount as usize);
            prop_assert!(score.detail().iter().all(|&v| v >= 1 && v <= sides));
            prop_assert!(score.total() >= amount as i64);
            prop_assert!(score.total() <= (amount * sides) as i64);
        }

        #[test]
        fn test_roll_respects_possible_values(dice in dice_strategy()) {
            let score = dice.roll();
            let (min, max) = dice.possible_values();

            prop_assert_eq!(
                score.detail().len() + score.dropped().len(),
                dice.amount() as usize
            );
            prop_assert_eq!(
                score.dropped().len(),
                (dice.drop_lowest() + dice.drop_highest()) as usize
            );
            prop_assert!(score.total() as u64 >= min);
            prop_assert!(score.total() as u64 <= max);
        }

        #[test]
        fn test_dropped_lowest_are_not_above_kept(values in prop::collection::vec(1..=20u32, 1..12), n in 0..12u32) {
            let n = n.min(values.len() as u32);
            let (kept, dropped) = drop_values(values, n, 0);

            let highest_dropped = dropped.iter().max().copied().unwrap_or(0);
            prop_assert!(kept.iter().all(|&v| v >= highest_dropped));
        }

        #[test]
        fn test_builder_validation(sides in 0..20u32, amount in 0..20u32, lowest in 0..20u32, highest in 0..20u32) {
            let result = Dice::builder(sides)
                .amount(amount)
                .drop_lowest(lowest)
                .drop_highest(highest)
                .build();

            if sides == 0 || lowest + highest > amount {
                prop_assert!(matches!(result, Err(Error::Validation(_))));
            } else {
                prop_assert!(result.is_ok());
            }
        }

        #[test]
        fn test_name_parses_back(dice in dice_strategy()) {
            let parsed = Dice::parse(&dice.name()).unwrap();

            prop_assert_eq!(parsed.name(), dice.name());
            prop_assert_eq!(parsed.drop_lowest(), dice.drop_lowest());
            prop_assert_eq!(parsed.drop_highest(), dice.drop_highest());
        }

        #[test]
        fn test_parse_notation(notation in notation_strategy()) {
            prop_assert!(Dice::parse(&notation).is_ok(), "notation = {notation}");
        }
    }
}
