//! Credit scoring engine
//!
//! Turns a categorized transaction list into a bounded score and an ordered
//! list of plain-language insights. Scoring is a single sequential fold over
//! the transactions followed by fixed post-pass rules:
//!
//! 1. Every gambling/betting expense costs 100 points (one insight total)
//! 2. Income above expenses earns 100 points, otherwise lose 50
//! 3. More than 5 transactions earns a silent 50 point volume bonus
//! 4. Income above 50,000 earns 100 points
//! 5. The result is clamped to `[MIN_SCORE, MAX_SCORE]`
//!
//! Insight order follows rule firing order, so the same input list always
//! yields the same score and the same insight sequence.

use serde::{Deserialize, Serialize};

use crate::models::{Direction, Transaction};

pub const BASE_SCORE: i32 = 500;
pub const MIN_SCORE: i32 = 300;
pub const MAX_SCORE: i32 = 850;

const GAMBLING_PENALTY: i32 = 100;
const POSITIVE_CASH_FLOW_BONUS: i32 = 100;
const NEGATIVE_CASH_FLOW_PENALTY: i32 = 50;
const VOLUME_BONUS: i32 = 50;
const VOLUME_THRESHOLD: usize = 5;
const HIGH_REVENUE_BONUS: i32 = 100;
const HIGH_REVENUE_THRESHOLD: f64 = 50_000.0;

pub const GAMBLING_INSIGHT: &str = "High Risk: Gambling activity detected (-100 pts).";
pub const POSITIVE_CASH_FLOW_INSIGHT: &str = "Positive: Healthy Cash Flow (Income > Expenses).";
pub const NEGATIVE_CASH_FLOW_INSIGHT: &str = "Negative: High Burn Rate (Expenses > Income).";
pub const HIGH_REVENUE_INSIGHT: &str = "Positive: High Revenue Volume (Income > 50,000).";

/// Score plus the facts that explain it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub score: i32,
    pub insights: Vec<String>,
    pub total_income: f64,
    pub total_expense: f64,
}

/// Running state of the scoring pass
#[derive(Debug, Clone)]
struct Tally {
    score: i32,
    total_income: f64,
    total_expense: f64,
    insights: Vec<String>,
    gambling_flagged: bool,
}

impl Tally {
    fn new() -> Self {
        Self {
            score: BASE_SCORE,
            total_income: 0.0,
            total_expense: 0.0,
            insights: Vec::new(),
            gambling_flagged: false,
        }
    }

    fn with_insight(mut self, insight: &str) -> Self {
        self.insights.push(insight.to_string());
        self
    }

    fn apply(mut self, tx: &Transaction) -> Self {
        match tx.direction {
            Direction::Income => {
                self.total_income += tx.amount;
                self
            }
            Direction::Expense => {
                self.total_expense += tx.amount;
                if !tx.category.is_gambling() {
                    return self;
                }
                self.score -= GAMBLING_PENALTY;
                if self.gambling_flagged {
                    return self;
                }
                self.gambling_flagged = true;
                self.with_insight(GAMBLING_INSIGHT)
            }
        }
    }

    fn apply_cash_flow(mut self) -> Self {
        if self.total_income > self.total_expense {
            self.score += POSITIVE_CASH_FLOW_BONUS;
            self.with_insight(POSITIVE_CASH_FLOW_INSIGHT)
        } else {
            self.score -= NEGATIVE_CASH_FLOW_PENALTY;
            self.with_insight(NEGATIVE_CASH_FLOW_INSIGHT)
        }
    }

    fn apply_volume(mut self, transaction_count: usize) -> Self {
        if transaction_count > VOLUME_THRESHOLD {
            self.score += VOLUME_BONUS;
        }
        self
    }

    fn apply_revenue(mut self) -> Self {
        if self.total_income > HIGH_REVENUE_THRESHOLD {
            self.score += HIGH_REVENUE_BONUS;
            return self.with_insight(HIGH_REVENUE_INSIGHT);
        }
        self
    }

    fn finish(self) -> ScoreCard {
        ScoreCard {
            score: clamp_score(self.score),
            insights: self.insights,
            total_income: self.total_income,
            total_expense: self.total_expense,
        }
    }
}

/// Clamp a raw score into the reportable range
pub fn clamp_score(raw: i32) -> i32 {
    raw.clamp(MIN_SCORE, MAX_SCORE)
}

/// Score a categorized transaction list, in the order given
pub fn score_transactions(transactions: &[Transaction]) -> ScoreCard {
    transactions
        .iter()
        .fold(Tally::new(), Tally::apply)
        .apply_cash_flow()
        .apply_volume(transactions.len())
        .apply_revenue()
        .finish()
}
