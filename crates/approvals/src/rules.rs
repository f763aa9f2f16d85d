//! Pure rule-selection logic (spec §4.6 "Rule selection"). No I/O — the
//! caller is responsible for loading the candidate rule set from storage.

use chrono::{DateTime, Utc};
use ledgerflow_domain::amount::Qirat;
use ledgerflow_domain::approvals::SignatoryRule;

/// Picks the lowest-`rule_order` rule whose filters match, mirroring how
/// `signatory_rules` would be ordered in a SQL `order by rule_order limit 1`
/// query. `candidates` need not be pre-sorted.
pub fn select_rule<'a>(
    candidates: &'a [SignatoryRule],
    transaction_type: &str,
    amount: Qirat,
    now: DateTime<Utc>,
) -> Option<&'a SignatoryRule> {
    candidates
        .iter()
        .filter(|rule| rule.matches(transaction_type, amount, now))
        .min_by_key(|rule| rule.rule_order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerflow_domain::approvals::EntityType;
    use uuid::Uuid;

    fn rule(order: i32, min: Option<i128>, max: Option<i128>, types: Vec<&str>) -> SignatoryRule {
        SignatoryRule {
            rule_id: Uuid::new_v4(),
            entity_type: EntityType::Treasury,
            entity_id: "treasury-1".to_string(),
            rule_order: order,
            min_amount: min.map(Qirat::new),
            max_amount: max.map(Qirat::new),
            required_approvals: 2,
            transaction_types: types.into_iter().map(String::from).collect(),
            approver_roles: vec!["TREASURER".to_string()],
            auto_execute: true,
            valid_from: Utc::now() - chrono::Duration::days(1),
            valid_until: None,
            single_rejection_is_fatal: false,
            is_active: true,
        }
    }

    #[test]
    fn picks_lowest_order_match_regardless_of_input_order() {
        let rules = vec![
            rule(5, Some(0), None, vec!["TRANSFER"]),
            rule(1, Some(0), None, vec!["TRANSFER"]),
            rule(3, Some(0), None, vec!["TRANSFER"]),
        ];
        let picked = select_rule(&rules, "TRANSFER", Qirat::new(1000), Utc::now()).unwrap();
        assert_eq!(picked.rule_order, 1);
    }

    #[test]
    fn no_match_returns_none_meaning_auto_execute() {
        let rules = vec![rule(1, Some(1_000_000), None, vec!["TRANSFER"])];
        assert!(select_rule(&rules, "TRANSFER", Qirat::new(100), Utc::now()).is_none());
    }

    #[test]
    fn amount_range_boundaries_are_inclusive() {
        let rules = vec![rule(1, Some(100), Some(200), vec![])];
        assert!(select_rule(&rules, "ANY", Qirat::new(100), Utc::now()).is_some());
        assert!(select_rule(&rules, "ANY", Qirat::new(200), Utc::now()).is_some());
        assert!(select_rule(&rules, "ANY", Qirat::new(201), Utc::now()).is_none());
    }
}
