//! Stats aggregation, search and per-group projections

use crate::{Dataset, DashboardStats, EmailRecord, GroupSlice, GroupedEmails};
use std::collections::HashMap;

/// Result of a search over the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// No query: show every group unmodified
    ShowAll,
    /// Only groups with at least one matching record, in listing order
    Filtered(GroupedEmails),
}

impl SearchOutcome {
    pub fn is_filtered(&self) -> bool {
        matches!(self, SearchOutcome::Filtered(_))
    }
}

/// Single pass over the records of the listed groups
pub fn compute_stats(groups: &[String], data: &HashMap<String, Vec<EmailRecord>>) -> DashboardStats {
    let mut stats = DashboardStats {
        group_count: groups.len(),
        ..DashboardStats::default()
    };

    for email in groups.iter().flat_map(|g| data.get(g).into_iter().flatten()) {
        stats.total_emails += 1;
        stats.total_opens += email.opens;
        stats.total_clicks += email.clicks;
        stats.max_opens = stats.max_opens.max(email.opens);
    }

    stats
}

/// Case-insensitive substring search over subject, recipient and email
pub fn search(
    groups: &[String],
    data: &HashMap<String, Vec<EmailRecord>>,
    query: Option<&str>,
) -> SearchOutcome {
    let q = match query {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return SearchOutcome::ShowAll,
    };

    let filtered = groups
        .iter()
        .filter_map(|g| {
            let matches: Vec<EmailRecord> = data
                .get(g)
                .into_iter()
                .flatten()
                .filter(|e| matches_query(e, &q))
                .cloned()
                .collect();
            if matches.is_empty() {
                None
            } else {
                Some(GroupSlice {
                    name: g.clone(),
                    emails: matches,
                })
            }
        })
        .collect();

    SearchOutcome::Filtered(filtered)
}

fn matches_query(email: &EmailRecord, lowered_query: &str) -> bool {
    [&email.subject, &email.recipient, &email.email]
        .iter()
        .any(|field| field.to_lowercase().contains(lowered_query))
}

/// Pre-summed opens per group, in group order
pub fn group_totals(groups: &[String], totals: &HashMap<String, u64>) -> Vec<u64> {
    groups
        .iter()
        .map(|g| totals.get(g).copied().unwrap_or(0))
        .collect()
}

/// Record count per group, in group order
pub fn group_counts(groups: &[String], data: &HashMap<String, Vec<EmailRecord>>) -> Vec<usize> {
    groups
        .iter()
        .map(|g| data.get(g).map(Vec::len).unwrap_or(0))
        .collect()
}

/// Sum opens per group, for bundles shipped without a totals section
pub fn derive_totals(data: &HashMap<String, Vec<EmailRecord>>) -> HashMap<String, u64> {
    data.iter()
        .map(|(g, emails)| (g.clone(), emails.iter().map(|e| e.opens).sum()))
        .collect()
}

/// The groups to display for a search outcome
pub fn visible_groups(dataset: &Dataset, outcome: &SearchOutcome) -> GroupedEmails {
    match outcome {
        SearchOutcome::Filtered(groups) => groups.clone(),
        SearchOutcome::ShowAll => dataset
            .groups
            .iter()
            .map(|g| GroupSlice {
                name: g.clone(),
                emails: dataset.emails_in(g).to_vec(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(id: u64, address: &str, subject: &str, opens: u64, clicks: u64) -> EmailRecord {
        EmailRecord {
            id,
            email: address.to_string(),
            recipient: String::new(),
            subject: subject.to_string(),
            sent: "2024-01-10 08:00".to_string(),
            last_opened: None,
            source: "tracker".to_string(),
            opens,
            clicks,
            pdf_views: 0,
        }
    }

    fn sample() -> (Vec<String>, HashMap<String, Vec<EmailRecord>>) {
        let groups = vec!["Police".to_string(), "Media".to_string(), "Empty".to_string()];
        let mut data = HashMap::new();
        data.insert(
            "Police".to_string(),
            vec![
                email(1, "desk@police.uk", "Crime reference update", 12, 1),
                email(2, "chief@police.uk", "Housing complaint", 140, 6),
            ],
        );
        data.insert(
            "Media".to_string(),
            vec![email(3, "news@paper.com", "Press release HOUSING", 30, 2)],
        );
        data.insert("Unlisted".to_string(), vec![email(4, "x@y.z", "ignored", 999, 9)]);
        (groups, data)
    }

    #[test]
    fn test_compute_stats_listed_groups_only() {
        let (groups, data) = sample();
        let stats = compute_stats(&groups, &data);
        assert_eq!(stats.total_emails, 3);
        assert_eq!(stats.total_opens, 182);
        assert_eq!(stats.total_clicks, 9);
        assert_eq!(stats.max_opens, 140);
        assert_eq!(stats.group_count, 3);
    }

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(&[], &HashMap::new());
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_search_empty_query_shows_all() {
        let (groups, data) = sample();
        assert_eq!(search(&groups, &data, None), SearchOutcome::ShowAll);
        assert_eq!(search(&groups, &data, Some("")), SearchOutcome::ShowAll);
    }

    #[test]
    fn test_search_case_insensitive_and_drops_empty_groups() {
        let (groups, data) = sample();
        let SearchOutcome::Filtered(result) = search(&groups, &data, Some("housing")) else {
            panic!("expected filtered outcome");
        };
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Police");
        assert_eq!(result[0].emails.len(), 1);
        assert_eq!(result[0].emails[0].id, 2);
        assert_eq!(result[1].name, "Media");
    }

    #[test]
    fn test_search_matches_address_and_recipient() {
        let (groups, mut data) = sample();
        data.get_mut("Media").unwrap()[0].recipient = "Jane Editor".to_string();
        let SearchOutcome::Filtered(by_recipient) = search(&groups, &data, Some("EDITOR")) else {
            panic!("expected filtered outcome");
        };
        assert_eq!(by_recipient.len(), 1);
        assert_eq!(by_recipient[0].emails[0].id, 3);

        let SearchOutcome::Filtered(by_address) = search(&groups, &data, Some("police.uk")) else {
            panic!("expected filtered outcome");
        };
        assert_eq!(by_address[0].emails.len(), 2);
    }

    #[test]
    fn test_search_no_match_is_empty_filter() {
        let (groups, data) = sample();
        assert_eq!(
            search(&groups, &data, Some("zzz-nothing")),
            SearchOutcome::Filtered(vec![])
        );
    }

    #[test]
    fn test_group_projections() {
        let (groups, data) = sample();
        let mut totals = HashMap::new();
        totals.insert("Police".to_string(), 152);
        assert_eq!(group_totals(&groups, &totals), vec![152, 0, 0]);
        assert_eq!(group_counts(&groups, &data), vec![2, 1, 0]);
    }

    #[test]
    fn test_derive_totals() {
        let (_, data) = sample();
        let totals = derive_totals(&data);
        assert_eq!(totals["Police"], 152);
        assert_eq!(totals["Media"], 30);
    }

    #[test]
    fn test_visible_groups_show_all_keeps_order() {
        let (groups, data) = sample();
        let dataset = Dataset {
            groups,
            emails: data,
            ..Dataset::default()
        };
        let visible = visible_groups(&dataset, &SearchOutcome::ShowAll);
        let names: Vec<&str> = visible.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Police", "Media", "Empty"]);
        assert!(visible[2].emails.is_empty());
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_email() -> impl Strategy<Value = EmailRecord> {
        (0u64..10_000, "[a-z]{0,8}", "[A-Za-z ]{0,20}", 0u64..500, 0u64..50).prop_map(
            |(id, address, subject, opens, clicks)| EmailRecord {
                id,
                email: address,
                recipient: String::new(),
                subject,
                sent: String::new(),
                last_opened: None,
                source: String::new(),
                opens,
                clicks,
                pdf_views: 0,
            },
        )
    }

    fn arb_data() -> impl Strategy<Value = HashMap<String, Vec<EmailRecord>>> {
        prop::collection::hash_map("[A-E]", prop::collection::vec(arb_email(), 0..6), 0..5)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn stats_match_field_sums(data in arb_data()) {
            let groups: Vec<String> = data.keys().cloned().collect();
            let stats = compute_stats(&groups, &data);
            let all: Vec<&EmailRecord> = data.values().flatten().collect();
            prop_assert_eq!(stats.total_emails, all.len() as u64);
            prop_assert_eq!(stats.total_opens, all.iter().map(|e| e.opens).sum::<u64>());
            prop_assert_eq!(stats.total_clicks, all.iter().map(|e| e.clicks).sum::<u64>());
            prop_assert_eq!(stats.max_opens, all.iter().map(|e| e.opens).max().unwrap_or(0));
        }

        #[test]
        fn search_never_returns_empty_groups(data in arb_data(), query in "[a-zA-Z]{1,3}") {
            let groups: Vec<String> = data.keys().cloned().collect();
            if let SearchOutcome::Filtered(result) = search(&groups, &data, Some(&query)) {
                let q = query.to_lowercase();
                for group in &result {
                    prop_assert!(!group.emails.is_empty());
                    for e in &group.emails {
                        prop_assert!(
                            e.subject.to_lowercase().contains(&q)
                                || e.email.to_lowercase().contains(&q)
                                || e.recipient.to_lowercase().contains(&q)
                        );
                    }
                }
            } else {
                prop_assert!(false, "non-empty query must filter");
            }
        }
    }
}
