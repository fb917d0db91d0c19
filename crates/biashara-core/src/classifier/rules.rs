//! Deterministic override rules
//!
//! Checked before the zero-shot model, in table order, against the
//! lower-cased description. The first matching rule wins.

use crate::models::Category;

/// A keyword rule mapping any of its substrings to a category
#[derive(Debug, Clone, Copy)]
pub struct OverrideRule {
    pub keywords: &'static [&'static str],
    pub category: Category,
}

impl OverrideRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Override rules in priority order
pub const OVERRIDE_RULES: &[OverrideRule] = &[
    OverrideRule {
        keywords: &["sportpesa", "betika"],
        category: Category::GamblingBetting,
    },
    OverrideRule {
        keywords: &["kplc", "token"],
        category: Category::UtilityBills,
    },
    OverrideRule {
        keywords: &["tuskys", "naivas"],
        category: Category::FamilyPersonal,
    },
    OverrideRule {
        keywords: &["uber", "fuel"],
        category: Category::TransportTravel,
    },
    OverrideRule {
        keywords: &["mabati", "hardware"],
        category: Category::BusinessInventory,
    },
];

/// Return the category of the first rule matching `description`
pub fn match_rule(description: &str) -> Option<Category> {
    let lowered = description.to_lowercase();
    OVERRIDE_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_rule_matches_case_insensitively() {
        assert_eq!(match_rule("SPORTPESA bet 123"), Some(Category::GamblingBetting));
        assert_eq!(match_rule("Betika deposit"), Some(Category::GamblingBetting));
        assert_eq!(match_rule("KPLC prepaid"), Some(Category::UtilityBills));
        assert_eq!(match_rule("Buy Token 0412"), Some(Category::UtilityBills));
        assert_eq!(match_rule("Naivas Westlands"), Some(Category::FamilyPersonal));
        assert_eq!(match_rule("Tuskys"), Some(Category::FamilyPersonal));
        assert_eq!(match_rule("UBER trip"), Some(Category::TransportTravel));
        assert_eq!(match_rule("Shell fuel"), Some(Category::TransportTravel));
        assert_eq!(match_rule("Mabati rolling mills"), Some(Category::BusinessInventory));
        assert_eq!(match_rule("Juja Hardware"), Some(Category::BusinessInventory));
    }

    #[test]
    fn test_first_rule_wins() {
        // Matches both the gambling and utility rules
        assert_eq!(
            match_rule("sportpesa token purchase"),
            Some(Category::GamblingBetting)
        );
        // Matches both the transport and inventory rules
        assert_eq!(
            match_rule("fuel for hardware van"),
            Some(Category::TransportTravel)
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_rule("Rent for March"), None);
        assert_eq!(match_rule(""), None);
    }
}
