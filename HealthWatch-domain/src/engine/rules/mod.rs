//! Declarative threshold tables.
//!
//! Every physiological or lab domain is an ordered list of rules per
//! direction, most severe first. Evaluation is first-match-wins, so one
//! direction contributes at most one classification. Lower cutoffs are
//! exclusive (`<`). Vitals danger cutoffs are inclusive (`>=`); an upper edge
//! that is also the top of a published normal range is strict (`>`), so the
//! range value itself stays normal.

pub mod lab;
pub mod vitals;

/// A single threshold edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Holds when `value >= limit`
    AtLeast(f64),
    /// Holds when `value > limit`
    Above(f64),
    /// Holds when `value < limit`
    Below(f64),
}

/// How two bounds on a pair of values combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// Either bound holding is enough
    Any,
    /// Both bounds must hold
    All,
}

/// Bounds on a `(first, second)` pair such as systolic/diastolic pressure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairBound {
    pub first: Bound,
    pub second: Bound,
    pub join: Join,
}

/// Condition a rule checks against its input
pub trait Predicate<I: ?Sized> {
    fn test(&self, input: &I) -> bool;
}

impl Predicate<f64> for Bound {
    fn test(&self, value: &f64) -> bool {
        match *self {
            Bound::AtLeast(limit) => *value >= limit,
            Bound::Above(limit) => *value > limit,
            Bound::Below(limit) => *value < limit,
        }
    }
}

impl Predicate<(f64, f64)> for PairBound {
    fn test(&self, (first, second): &(f64, f64)) -> bool {
        let first = self.first.test(first);
        let second = self.second.test(second);
        match self.join {
            Join::Any => first || second,
            Join::All => first && second,
        }
    }
}

/// One row of a threshold table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule<P, S> {
    pub when: P,
    pub severity: S,
    pub message: &'static str,
}

/// Result of a rule that fired
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<S> {
    pub severity: S,
    pub message: &'static str,
    pub normal_range: &'static str,
}

/// Ordered rules for one direction of one domain
#[derive(Debug, Clone, Copy)]
pub struct RuleSet<P: 'static, S: 'static> {
    pub normal_range: &'static str,
    pub rules: &'static [Rule<P, S>],
}

impl<P, S: Copy> RuleSet<P, S> {
    /// First matching rule, or `None` when the input is inside this direction's normal range
    pub fn classify<I: ?Sized>(&self, input: &I) -> Option<Classification<S>>
    where
        P: Predicate<I>,
    {
        self.rules
            .iter()
            .find(|rule| rule.when.test(input))
            .map(|rule| Classification {
                severity: rule.severity,
                message: rule.message,
                normal_range: self.normal_range,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_edges() {
        assert!(Bound::AtLeast(10.0).test(&10.0));
        assert!(!Bound::AtLeast(10.0).test(&9.99));
        assert!(!Bound::Above(10.0).test(&10.0));
        assert!(Bound::Above(10.0).test(&10.01));
        assert!(Bound::Below(10.0).test(&9.99));
        assert!(!Bound::Below(10.0).test(&10.0));
    }

    #[test]
    fn test_pair_join() {
        let any = PairBound { first: Bound::AtLeast(140.0), second: Bound::AtLeast(90.0), join: Join::Any };
        let all = PairBound { first: Bound::Below(90.0), second: Bound::Below(60.0), join: Join::All };

        assert!(any.test(&(120.0, 95.0)));
        assert!(!any.test(&(120.0, 80.0)));
        assert!(all.test(&(85.0, 55.0)));
        assert!(!all.test(&(85.0, 70.0)));
    }

    #[test]
    fn test_first_match_wins() {
        const RULES: &[Rule<Bound, u8>] = &[
            Rule { when: Bound::AtLeast(20.0), severity: 2, message: "very high" },
            Rule { when: Bound::AtLeast(10.0), severity: 1, message: "high" },
        ];
        let set = RuleSet { normal_range: "<10", rules: RULES };

        assert_eq!(set.classify(&25.0).map(|c| c.severity), Some(2));
        assert_eq!(set.classify(&15.0).map(|c| c.message), Some("high"));
        assert_eq!(set.classify(&5.0), None);
    }
}
