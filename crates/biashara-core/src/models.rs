//! Domain models for Biashara

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::loan::LoanOffer;

/// Subject id used when a caller does not name one (single-business deployments)
pub const DEFAULT_SUBJECT_ID: i64 = 1;

/// Name given to the default subject when it is created on demand
pub const DEFAULT_SUBJECT_NAME: &str = "Default Business";

/// A business/account being scored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Which way money moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[serde(alias = "CREDIT")]
    Income,
    #[serde(alias = "DEBIT")]
    Expense,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, Self::Income)
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INCOME" | "CREDIT" | "CR" => Ok(Self::Income),
            "EXPENSE" | "DEBIT" | "DR" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending category assigned by the classifier
///
/// The set is closed: the nine business labels plus two sentinels used when
/// classification could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    BusinessInventory,
    UtilityBills,
    RentPayments,
    TransportTravel,
    FamilyPersonal,
    LoanRepayment,
    GamblingBetting,
    HealthcareMedical,
    EducationalLearning,
    #[default]
    Uncategorized,
    UncategorizedModelLoading,
}

impl Category {
    /// Labels offered to the zero-shot classifier, in ranking-neutral order
    const CANDIDATES: [Category; 9] = [
        Self::BusinessInventory,
        Self::UtilityBills,
        Self::RentPayments,
        Self::TransportTravel,
        Self::FamilyPersonal,
        Self::LoanRepayment,
        Self::GamblingBetting,
        Self::HealthcareMedical,
        Self::EducationalLearning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessInventory => "Business Inventory",
            Self::UtilityBills => "Utility Bills",
            Self::RentPayments => "Rent Payments",
            Self::TransportTravel => "Transport & Travel",
            Self::FamilyPersonal => "Family & Personal",
            Self::LoanRepayment => "Loan Repayment",
            Self::GamblingBetting => "Gambling & Betting",
            Self::HealthcareMedical => "Healthcare & Medical",
            Self::EducationalLearning => "Educational & Learning",
            Self::Uncategorized => "Uncategorized",
            Self::UncategorizedModelLoading => "Uncategorized (Model Loading)",
        }
    }

    /// The non-sentinel categories
    pub fn candidates() -> &'static [Category] {
        &Self::CANDIDATES
    }

    /// Candidate label text sent to the external classifier
    pub fn candidate_labels() -> Vec<&'static str> {
        Self::CANDIDATES.iter().map(|c| c.as_str()).collect()
    }

    /// Whether this is a reserved "could not classify" value
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Uncategorized | Self::UncategorizedModelLoading)
    }

    /// Whether the label names gambling or betting activity
    pub fn is_gambling(&self) -> bool {
        let label = self.as_str().to_lowercase();
        label.contains("gambling") || label.contains("betting")
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        [
            Self::UncategorizedModelLoading,
            Self::Uncategorized,
        ]
        .iter()
        .chain(Self::CANDIDATES.iter())
        .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
        .copied()
        .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A transaction as decoded from a statement, before classification
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: DateTime<Utc>,
    /// Always non-negative; direction carries the sign
    pub amount: f64,
    pub direction: Direction,
    pub description: String,
}

impl NewTransaction {
    /// Attach a category, producing the immutable categorized transaction
    pub fn categorize(self, category: Category) -> Transaction {
        Transaction {
            id: None,
            date: self.date,
            amount: self.amount,
            direction: self.direction,
            description: self.description,
            category,
        }
    }
}

/// A categorized transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Storage id (absent until persisted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: DateTime<Utc>,
    pub amount: f64,
    pub direction: Direction,
    pub description: String,
    pub category: Category,
}

/// Order transactions the way storage returns them: date descending, and
/// within equal dates the later-ingested transaction first.
pub fn order_newest_first(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.reverse();
    // Stable sort keeps the reversed ingestion order for equal dates
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    transactions
}

/// Income/expense totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_income: f64,
    pub total_expense: f64,
}

/// Revenue trend prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub forecast_msg: String,
}

/// The merged result handed to the reporting surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditReport {
    pub score: i32,
    pub transactions: Vec<Transaction>,
    pub summary: Summary,
    pub ai_insights: Vec<String>,
    pub prediction: Prediction,
    pub loan_offer: LoanOffer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx_at(day: u32, description: &str) -> Transaction {
        Transaction {
            id: None,
            date: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
            amount: 100.0,
            direction: Direction::Expense,
            description: description.to_string(),
            category: Category::Uncategorized,
        }
    }

    #[test]
    fn test_direction_accepts_bank_vocabulary() {
        assert_eq!("CREDIT".parse::<Direction>().unwrap(), Direction::Income);
        assert_eq!("debit".parse::<Direction>().unwrap(), Direction::Expense);
        assert_eq!(" income ".parse::<Direction>().unwrap(), Direction::Income);
        assert!("refund".parse::<Direction>().is_err());
    }

    #[test]
    fn test_category_round_trips_through_label() {
        for category in Category::candidates() {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), *category);
        }
        assert_eq!(
            "uncategorized (model loading)".parse::<Category>().unwrap(),
            Category::UncategorizedModelLoading
        );
        assert!("Groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_candidate_labels_exclude_sentinels() {
        let labels = Category::candidate_labels();
        assert_eq!(labels.len(), 9);
        assert_eq!(labels[0], "Business Inventory");
        assert_eq!(labels[8], "Educational & Learning");
        assert!(!labels.iter().any(|l| l.starts_with("Uncategorized")));
    }

    #[test]
    fn test_only_gambling_is_gambling() {
        assert!(Category::GamblingBetting.is_gambling());
        assert!(!Category::Uncategorized.is_gambling());
        assert!(!Category::LoanRepayment.is_gambling());
    }

    #[test]
    fn test_order_newest_first() {
        let ordered = order_newest_first(vec![
            tx_at(1, "a"),
            tx_at(3, "b"),
            tx_at(1, "c"),
            tx_at(2, "d"),
        ]);
        let names: Vec<_> = ordered.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = CreditReport {
            score: 600,
            transactions: vec![],
            summary: Summary {
                total_income: 10.0,
                total_expense: 5.0,
            },
            ai_insights: vec![],
            prediction: Prediction {
                forecast_msg: "Insufficient data.".to_string(),
            },
            loan_offer: LoanOffer {
                amount: 2,
                status: crate::loan::LoanStatus::MicroLoanOnly,
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["totalIncome"], 10.0);
        assert_eq!(json["prediction"]["forecastMsg"], "Insufficient data.");
        assert_eq!(json["loanOffer"]["status"], "Micro-Loan-Only");
        assert!(json["aiInsights"].is_array());
    }
}
