use std::{fmt::Display, ops::Deref};


/// Implements the integer behaviour shared by [`Score`] and
/// [`crate::PatternScore`]: conversion into `i64`, comparison with `i64` and
/// arithmetic against `i64`. Arithmetic always yields a plain `i64`.
macro_rules! integer_like {
    ($ty:ty) => {
        impl From<&$ty> for i64 {
            fn from(value: &$ty) -> Self {
                value.total()
            }
        }

        impl From<$ty> for i64 {
            fn from(value: $ty) -> Self {
                value.total()
            }
        }

        impl PartialEq<i64> for $ty {
            fn eq(&self, other: &i64) -> bool {
                self.total() == *other
            }
        }

        impl PartialEq<$ty> for i64 {
            fn eq(&self, other: &$ty) -> bool {
                *self == other.total()
            }
        }

        impl PartialOrd<i64> for $ty {
            fn partial_cmp(&self, other: &i64) -> Option<::std::cmp::Ordering> {
                self.total().partial_cmp(other)
            }
        }

        impl PartialOrd<$ty> for i64 {
            fn partial_cmp(&self, other: &$ty) -> Option<::std::cmp::Ordering> {
                self.partial_cmp(&other.total())
            }
        }

        impl ::std::ops::Neg for &$ty {
            type Output = i64;

            fn neg(self) -> i64 {
                -self.total()
            }
        }

        impl ::std::ops::Neg for $ty {
            type Output = i64;

            fn neg(self) -> i64 {
                -self.total()
            }
        }

        integer_like!(@op $ty, Add, add);
        integer_like!(@op $ty, Sub, sub);
        integer_like!(@op $ty, Mul, mul);
        integer_like!(@op $ty, Div, div);
    };

    (@op $ty:ty, $trait:ident, $method:ident) => {
        impl ::std::ops::$trait<i64> for $ty {
            type Output = i64;

            fn $method(self, rhs: i64) -> i64 {
                ::std::ops::$trait::$method(self.total(), rhs)
            }
        }

        impl ::std::ops::$trait<i64> for &$ty {
            type Output = i64;

            fn $method(self, rhs: i64) -> i64 {
                ::std::ops::$trait::$method(self.total(), rhs)
            }
        }

        impl ::std::ops::$trait<$ty> for i64 {
            type Output = i64;

            fn $method(self, rhs: $ty) -> i64 {
                ::std::ops::$trait::$method(self, rhs.total())
            }
        }
    };
}
pub(crate) use integer_like;


/// The outcome of rolling one [`crate::Dice`] group.
///
/// A `Score` behaves like its integer total: it can be compared with and combined
/// with `i64` values, while still exposing the individual face values that were
/// kept ([`Score::detail`]) and the ones removed by drop rules ([`Score::dropped`]).
///
/// # Examples
/// ```
/// use xdice::Score;
///
/// let score = Score::new(vec![2, 5, 6], vec![1], "4d6l1");
///
/// assert_eq!(score, 13i64);
/// assert_eq!(&score + 1, 14);
/// assert!(score.contains(5));
/// assert_eq!(score.format(false), "[2,5,6]");
/// assert_eq!(score.format(true), " 4d6l1 (scores:[2,5,6], dropped:[1]) ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Score {
    total: i64,
    detail: Vec<u32>,
    dropped: Vec<u32>,
    name: String
}

impl Score {
    /// Creates a score from the kept values, the dropped values and the name of
    /// the dice group that produced them. The total is the sum of `detail`.
    pub fn new(detail: Vec<u32>, dropped: Vec<u32>, name: impl Into<String>) -> Self {
        let total = detail.iter().map(|&v| i64::from(v)).sum();
        Self { total, detail, dropped, name: name.into() }
    }

    /// Sum of the kept values.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Values that were kept, in the order they remained after drops.
    pub fn detail(&self) -> &[u32] {
        &self.detail
    }

    /// Values removed by drop rules: lowest drops first, then highest drops.
    pub fn dropped(&self) -> &[u32] {
        &self.dropped
    }

    /// Canonical notation of the dice group, e.g. `4d6l1`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether any kept die shows `value`.
    pub fn contains(&self, value: u32) -> bool {
        self.detail.contains(&value)
    }

    /// Iterates over the kept values.
    pub fn iter(&self) -> std::slice::Iter<'_, u32> {
        self.detail.iter()
    }

    /// Formats the kept values as `[1,5,6]`.
    ///
    /// With `verbose` the name and dropped values are included:
    /// `" 4d6l1 (scores:[2,5,6], dropped:[1]) "`. The dropped part is omitted
    /// when nothing was dropped.
    pub fn format(&self, verbose: bool) -> String {
        let scores = bracketed(&self.detail);
        if !verbose {
            return scores;
        }

        let dropped = if self.dropped.is_empty() {
            String::new()
        } else {
            format!(", dropped:{}", bracketed(&self.dropped))
        };

        format!(" {} (scores:{}{}) ", self.name, scores, dropped)
    }
}

pub(crate) fn bracketed(values: &[u32]) -> String {
    let inner = values.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");

    format!("[{inner}]")
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.total)
    }
}

impl Deref for Score {
    type Target = [u32];

    fn deref(&self) -> &Self::Target {
        &self.detail
    }
}

impl<'a> IntoIterator for &'a Score {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

integer_like!(Score);


#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use super::*;


    #[test]
    fn test_empty_score() {
        let score = Score::new(vec![], vec![], "0d6");

        assert_eq!(score, 0i64);
        assert_eq!(score.format(false), "[]");
        assert_eq!(score.format(true), " 0d6 (scores:[]) ");
    }

    #[test]
    fn test_format_without_dropped() {
        let score = Score::new(vec![1, 5, 6], vec![], "3d6");

        assert_eq!(score.format(false), "[1,5,6]");
        assert_eq!(score.format(true), " 3d6 (scores:[1,5,6]) ");
    }

    #[test]
    fn test_integer_behaviour() {
        let score = Score::new(vec![3, 4], vec![], "2d6");

        assert_eq!(score.clone() + 1, 8);
        assert_eq!(10i64 - score.clone(), 3);
        assert_eq!(&score * 2, 14);
        assert_eq!(-&score, -7);
        assert!(score > 6i64);
        assert!(8i64 > score);
        assert_eq!(i64::from(&score), 7);
        assert_eq!(score.to_string(), "7");
    }

    #[test]
    fn test_iteration() {
        let score = Score::new(vec![2, 4, 2], vec![1], "4d4l1");

        let collected: Vec<u32> = score.iter().copied().collect();
        assert_eq!(collected, vec![2, 4, 2]);

        let mut count = 0;
        for _ in &score {
            count += 1;
        }
        assert_eq!(count, 3);
        assert_eq!(score.len(), 3);
        assert!(!score.contains(1));
    }

    proptest! {
        #[test]
        fn test_total_is_sum_of_detail(
            detail in prop::collection::vec(1..=100u32, 0..20),
            dropped in prop::collection::vec(1..=100u32, 0..5)
        ) {
            let expected: i64 = detail.iter().map(|&v| v as i64).sum();
            let score = Score::new(detail, dropped, "xdy");

            prop_assert_eq!(score.total(), expected);
        }

        #[test]
        fn test_compact_format_lists_detail(detail in prop::collection::vec(1..=6u32, 2..=2)) {
            let score = Score::new(detail.clone(), vec![], "2d6");
            let formatted = score.format(false);

            let inner = formatted.trim_start_matches('[').trim_end_matches(']');
            let values: Vec<u32> = inner.split(',').map(|v| v.parse().unwrap()).collect();

            prop_assert_eq!(values.len(), 2);
            prop_assert_eq!(values.iter().map(|&v| v as i64).sum::<i64>(), score.total());
        }
    }
}
