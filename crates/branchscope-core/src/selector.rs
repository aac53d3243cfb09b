//! Repository selection: exclusion, archive, and recency filters plus a
//! most-recently-pushed cap.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::config::RepoFilters;
use crate::model::RepoInfo;

/// Filter `repos` and keep at most `max_repos`, most recently pushed first.
///
/// A repository is dropped when its name is excluded, when it is archived
/// and archives are not included, or when its last push is older than
/// `filters.min_pushed_days_ago` days before `now`. Repositories without a
/// push timestamp pass the recency filter and sort last. A window too large
/// to represent disables the recency filter.
pub fn select_repos(
    repos: Vec<RepoInfo>,
    filters: &RepoFilters,
    max_repos: usize,
    now: DateTime<Utc>,
) -> Vec<RepoInfo> {
    let cutoff = Duration::try_days(filters.min_pushed_days_ago)
        .and_then(|window| now.checked_sub_signed(window));
    if cutoff.is_none() {
        warn!(
            min_pushed_days_ago = filters.min_pushed_days_ago,
            "recency window out of range, not filtering by push date"
        );
    }

    let mut selected: Vec<RepoInfo> = repos
        .into_iter()
        .filter(|repo| !filters.exclude.iter().any(|name| name == &repo.name))
        .filter(|repo| filters.include_archived || !repo.archived)
        .filter(|repo| match (repo.pushed_at, cutoff) {
            (Some(pushed), Some(cutoff)) => pushed >= cutoff,
            _ => true,
        })
        .collect();

    // Stable: equal timestamps keep listing order.
    selected.sort_by(|a, b| b.pushed_at.cmp(&a.pushed_at));

    if selected.len() > max_repos {
        info!(
            max_repos,
            total = selected.len(),
            "limiting to most recently active repositories"
        );
        selected.truncate(max_repos);
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScopeConfig;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn repo(name: &str, days_ago: i64) -> RepoInfo {
        RepoInfo::new(name, format!("org/{name}"), "main")
            .with_pushed_at(now() - Duration::days(days_ago))
    }

    #[test]
    fn test_keeps_fifty_most_recent_in_descending_order() {
        let repos: Vec<RepoInfo> = (0..60).map(|i| repo(&format!("r{i}"), 60 - i)).collect();
        let selected = select_repos(repos, &RepoFilters::default(), 50, now());

        assert_eq!(selected.len(), 50);
        assert_eq!(selected[0].name, "r59");
        assert_eq!(selected[49].name, "r10");
        assert!(selected
            .windows(2)
            .all(|w| w[0].pushed_at >= w[1].pushed_at));
    }

    #[test]
    fn test_exclusion_archive_and_recency_filters() {
        let repos = vec![
            repo("fresh", 1),
            repo("excluded", 1),
            repo("archived", 1).archived(),
            repo("stale", 400),
            RepoInfo::new("never-pushed", "org/never-pushed", "main"),
        ];
        let filters = RepoFilters {
            exclude: vec!["excluded".to_string()],
            include_archived: false,
            min_pushed_days_ago: 365,
        };
        let names: Vec<String> = select_repos(repos, &filters, 50, now())
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["fresh", "never-pushed"]);
    }

    #[test]
    fn test_include_archived_keeps_archived_repos() {
        let filters = RepoFilters {
            include_archived: true,
            ..RepoFilters::default()
        };
        let selected = select_repos(vec![repo("old-but-archived", 3).archived()], &filters, 50, now());
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_out_of_range_window_disables_recency_filter() {
        let config =
            ScopeConfig::from_json(r#"{"repo_filters": {"min_pushed_days_ago": 100000000}}"#)
                .unwrap();
        let repos = vec![repo("fresh", 1), repo("ancient", 20_000)];
        let names: Vec<String> = select_repos(repos, &config.repo_filters, 50, now())
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["fresh", "ancient"]);
    }

    #[test]
    fn test_extreme_window_values_do_not_panic() {
        for days in [i64::MAX, i64::MIN, -1] {
            let filters = RepoFilters {
                min_pushed_days_ago: days,
                ..RepoFilters::default()
            };
            select_repos(vec![repo("fresh", 1)], &filters, 50, now());
        }
    }
}
