//! Loan offer matching
//!
//! Resolves a credit score and total income into one of three offer tiers.

use serde::{Deserialize, Serialize};

/// Lowest score that qualifies for a pre-approved loan
pub const PRE_APPROVED_MIN_SCORE: i32 = 700;

/// Lowest score that qualifies for a micro-loan
pub const MICRO_LOAN_MIN_SCORE: i32 = 500;

/// Share of total income offered to pre-approved subjects
const PRE_APPROVED_INCOME_SHARE: f64 = 0.40;

/// Share of total income offered as a micro-loan
const MICRO_LOAN_INCOME_SHARE: f64 = 0.15;

/// Offer tier, determined solely by score band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    #[serde(rename = "Pre-Approved")]
    PreApproved,
    #[serde(rename = "Micro-Loan-Only")]
    MicroLoanOnly,
    #[serde(rename = "Locked")]
    Locked,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreApproved => "Pre-Approved",
            Self::MicroLoanOnly => "Micro-Loan-Only",
            Self::Locked => "Locked",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tentative loan offer in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanOffer {
    pub amount: i64,
    pub status: LoanStatus,
}

impl LoanOffer {
    pub fn locked() -> Self {
        Self {
            amount: 0,
            status: LoanStatus::Locked,
        }
    }
}

/// Match a score and total income to a loan offer
///
/// Amounts round to the nearest unit, halves away from zero.
pub fn match_offer(score: i32, total_income: f64) -> LoanOffer {
    let (share, status) = if score >= PRE_APPROVED_MIN_SCORE {
        (PRE_APPROVED_INCOME_SHARE, LoanStatus::PreApproved)
    } else if score >= MICRO_LOAN_MIN_SCORE {
        (MICRO_LOAN_INCOME_SHARE, LoanStatus::MicroLoanOnly)
    } else {
        return LoanOffer::locked();
    };

    LoanOffer {
        amount: (total_income * share).round() as i64,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_approved_tier() {
        assert_eq!(
            match_offer(720, 100_000.0),
            LoanOffer {
                amount: 40_000,
                status: LoanStatus::PreApproved
            }
        );
    }

    #[test]
    fn test_micro_loan_tier() {
        assert_eq!(
            match_offer(550, 100_000.0),
            LoanOffer {
                amount: 15_000,
                status: LoanStatus::MicroLoanOnly
            }
        );
    }

    #[test]
    fn test_locked_tier() {
        assert_eq!(match_offer(400, 100_000.0), LoanOffer::locked());
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(match_offer(700, 10.0).status, LoanStatus::PreApproved);
        assert_eq!(match_offer(699, 10.0).status, LoanStatus::MicroLoanOnly);
        assert_eq!(match_offer(500, 10.0).status, LoanStatus::MicroLoanOnly);
        assert_eq!(match_offer(499, 10.0).status, LoanStatus::Locked);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        // 0.15 * 10 = 1.5
        assert_eq!(match_offer(600, 10.0).amount, 2);
        // 0.40 * 1234 = 493.6
        assert_eq!(match_offer(800, 1234.0).amount, 494);
    }

    #[test]
    fn test_status_serializes_with_tier_names() {
        let json = serde_json::to_string(&LoanStatus::MicroLoanOnly).unwrap();
        assert_eq!(json, "\"Micro-Loan-Only\"");
        assert_eq!(LoanStatus::PreApproved.to_string(), "Pre-Approved");
    }
}
