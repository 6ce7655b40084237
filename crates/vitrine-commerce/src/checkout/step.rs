//! Checkout steps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Steps in the checkout flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Cart review and delivery/pickup choice.
    Summary,
    /// Customer name, phone and address.
    PersonalInfo,
    /// Payment method.
    Payment,
    /// Order placed.
    Confirmation,
}

impl CheckoutStep {
    /// Number of steps.
    pub const COUNT: usize = 4;

    /// All steps in order.
    pub const ALL: [CheckoutStep; Self::COUNT] = [
        CheckoutStep::Summary,
        CheckoutStep::PersonalInfo,
        CheckoutStep::Payment,
        CheckoutStep::Confirmation,
    ];

    /// Zero-based position.
    pub fn index(&self) -> usize {
        match self {
            CheckoutStep::Summary => 0,
            CheckoutStep::PersonalInfo => 1,
            CheckoutStep::Payment => 2,
            CheckoutStep::Confirmation => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Summary => "summary",
            CheckoutStep::PersonalInfo => "personal_info",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Confirmation => "confirmation",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::Summary => "Summary",
            CheckoutStep::PersonalInfo => "Personal info",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Confirmation => "Confirmation",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        for (i, step) in CheckoutStep::ALL.iter().enumerate() {
            assert_eq!(step.index(), i);
            assert_eq!(CheckoutStep::from_index(i), Some(*step));
        }
        assert_eq!(CheckoutStep::from_index(4), None);
    }

    #[test]
    fn test_next_and_previous() {
        assert_eq!(CheckoutStep::Summary.next(), Some(CheckoutStep::PersonalInfo));
        assert_eq!(CheckoutStep::Confirmation.next(), None);
        assert_eq!(CheckoutStep::Summary.previous(), None);
        assert_eq!(CheckoutStep::Payment.previous(), Some(CheckoutStep::PersonalInfo));
    }
}
