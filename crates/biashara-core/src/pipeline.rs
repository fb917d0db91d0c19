//! Credit pipeline
//!
//! Orchestrates one subject's run: classify every transaction, then score,
//! forecast and match a loan offer over the categorized list, merging the
//! results into a `CreditReport`.

use tracing::{debug, info};

use crate::classifier::CategoryClassifier;
use crate::db::TransactionStore;
use crate::error::Result;
use crate::forecast::forecast_income;
use crate::loan::match_offer;
use crate::models::{order_newest_first, CreditReport, NewTransaction, Prediction, Summary, Transaction};
use crate::scoring::score_transactions;

/// End-to-end credit assessment
///
/// The classifier is an explicit dependency; two pipelines never share state,
/// so subjects can be assessed concurrently.
#[derive(Clone)]
pub struct CreditPipeline {
    classifier: CategoryClassifier,
}

impl CreditPipeline {
    pub fn new(classifier: CategoryClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    /// Categorize a batch, keeping input order
    pub async fn categorize(&self, transactions: Vec<NewTransaction>) -> Vec<Transaction> {
        let descriptions: Vec<&str> = transactions.iter().map(|t| t.description.as_str()).collect();
        let categories = self.classifier.classify_batch(&descriptions).await;

        let categorized: Vec<Transaction> = transactions
            .into_iter()
            .zip(categories)
            .map(|(tx, category)| tx.categorize(category))
            .collect();

        let sentinels = categorized.iter().filter(|t| t.category.is_sentinel()).count();
        info!(
            count = categorized.len(),
            sentinels, "Categorized transactions"
        );
        categorized
    }

    /// Build the report for an already categorized, newest-first list
    pub fn evaluate(&self, transactions: &[Transaction]) -> CreditReport {
        let card = score_transactions(transactions);
        let forecast = forecast_income(transactions);
        let loan_offer = match_offer(card.score, card.total_income);

        info!(
            score = card.score,
            forecast = %forecast,
            loan = %loan_offer.status,
            "Evaluated credit report"
        );

        CreditReport {
            score: card.score,
            transactions: transactions.to_vec(),
            summary: Summary {
                total_income: card.total_income,
                total_expense: card.total_expense,
            },
            ai_insights: card.insights,
            prediction: Prediction {
                forecast_msg: forecast.message().to_string(),
            },
            loan_offer,
        }
    }

    /// Categorize and evaluate a statement without storing it
    pub async fn assess(&self, transactions: Vec<NewTransaction>) -> CreditReport {
        let categorized = self.categorize(transactions).await;
        self.evaluate(&order_newest_first(categorized))
    }

    /// Categorize a statement and replace the subject's stored transactions
    pub async fn import_and_store<S>(
        &self,
        store: &S,
        subject_id: i64,
        transactions: Vec<NewTransaction>,
    ) -> Result<usize>
    where
        S: TransactionStore + ?Sized,
    {
        let categorized = self.categorize(transactions).await;
        let saved = store.save_categorized_transactions(subject_id, &categorized)?;
        info!(subject_id, saved, "Stored categorized statement");
        Ok(saved)
    }

    /// Load a subject's stored transactions and evaluate them
    pub fn report_for<S>(&self, store: &S, subject_id: i64) -> Result<CreditReport>
    where
        S: TransactionStore + ?Sized,
    {
        let transactions = store.load_transactions(subject_id)?;
        debug!(subject_id, count = transactions.len(), "Loaded transactions");
        Ok(self.evaluate(&transactions))
    }
}
