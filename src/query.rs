//! Query service over the task store.
//!
//! Each function returns a freshly sorted snapshot; the CLI and TUI recompute
//! the snapshots they display after every mutation. Unless noted otherwise,
//! listings sort ascending by due date then descending by priority
//! (Urgent > High > Medium > Low), with the task ID as the final tie-break.
//!
//! A task without a due date sorts after every dated task, in ascending and
//! descending listings alike.

use std::cmp::Reverse;

use chrono::NaiveDateTime;

use crate::fields::Priority;
use crate::store::TaskStore;
use crate::task::Task;

fn sort_default(tasks: &mut Vec<&Task>) {
    tasks.sort_by_key(|t| {
        (t.due.unwrap_or(NaiveDateTime::MAX), Reverse(t.priority.rank()), t.id)
    });
}

/// All tasks.
pub fn all(store: &TaskStore) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = store.tasks.iter().collect();
    sort_default(&mut tasks);
    tasks
}

/// Tasks whose completion flag is false.
pub fn active(store: &TaskStore) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = store.tasks.iter().filter(|t| !t.completed).collect();
    sort_default(&mut tasks);
    tasks
}

/// Completed tasks, sorted descending by due date.
pub fn completed(store: &TaskStore) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = store.tasks.iter().filter(|t| t.completed).collect();
    tasks.sort_by_key(|t| (Reverse(t.due.unwrap_or(NaiveDateTime::MIN)), t.id));
    tasks
}

/// Tasks due within the inclusive range.
pub fn by_date_range(store: &TaskStore, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = store
        .tasks
        .iter()
        .filter(|t| matches!(t.due, Some(d) if d >= start && d <= end))
        .collect();
    sort_default(&mut tasks);
    tasks
}

/// Tasks due at exactly the given instant, sorted descending by priority.
pub fn by_date(store: &TaskStore, when: NaiveDateTime) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = store.tasks.iter().filter(|t| t.due == Some(when)).collect();
    tasks.sort_by_key(|t| (Reverse(t.priority.rank()), t.id));
    tasks
}

/// Tasks in a category (exact match).
pub fn by_category<'a>(store: &'a TaskStore, category: &str) -> Vec<&'a Task> {
    let mut tasks: Vec<&Task> = store.tasks.iter().filter(|t| t.category == category).collect();
    sort_default(&mut tasks);
    tasks
}

/// Tasks with an exact priority, sorted ascending by due date only.
pub fn by_priority(store: &TaskStore, priority: Priority) -> Vec<&Task> {
    let mut tasks: Vec<&Task> =
        store.tasks.iter().filter(|t| t.priority == priority).collect();
    tasks.sort_by_key(|t| (t.due.unwrap_or(NaiveDateTime::MAX), t.id));
    tasks
}

/// Case-insensitive substring search over title or description.
pub fn search<'a>(store: &'a TaskStore, text: &str) -> Vec<&'a Task> {
    let needle = text.to_lowercase();
    let mut tasks: Vec<&Task> = store
        .tasks
        .iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
        })
        .collect();
    sort_default(&mut tasks);
    tasks
}

/// Distinct non-empty category names, ascending.
pub fn categories(store: &TaskStore) -> Vec<String> {
    let mut names: Vec<String> = store
        .tasks
        .iter()
        .filter(|t| !t.category.is_empty())
        .map(|t| t.category.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Tasks with a reminder at or before the given instant, sorted by reminder time.
pub fn reminders_due(store: &TaskStore, now: NaiveDateTime) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = store
        .tasks
        .iter()
        .filter(|t| matches!(t.reminder, Some(r) if r <= now))
        .collect();
    tasks.sort_by_key(|t| (t.reminder, t.id));
    tasks
}

/// Tasks flagged recurring, sorted ascending by due date.
pub fn recurring(store: &TaskStore) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = store.tasks.iter().filter(|t| t.recurring).collect();
    tasks.sort_by_key(|t| (t.due.unwrap_or(NaiveDateTime::MAX), t.id));
    tasks
}

/// Count of completed tasks due within the inclusive range.
pub fn completed_count(store: &TaskStore, start: NaiveDateTime, end: NaiveDateTime) -> usize {
    store
        .tasks
        .iter()
        .filter(|t| t.completed && matches!(t.due, Some(d) if d >= start && d <= end))
        .count()
}

/// Count of incomplete tasks due strictly before the given instant.
pub fn overdue_count(store: &TaskStore, now: NaiveDateTime) -> usize {
    store
        .tasks
        .iter()
        .filter(|t| !t.completed && matches!(t.due, Some(d) if d < now))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    fn task(title: &str, due: Option<&str>, priority: Priority) -> Task {
        let mut t = Task::new(title);
        t.due = due.map(dt);
        t.priority = priority;
        t
    }

    fn sample_store() -> TaskStore {
        let mut store = TaskStore::default();
        store.insert(task("groceries", Some("2024-01-03T10:00"), Priority::Low)); // 1
        store.insert(task("rent", Some("2024-01-01T23:59"), Priority::High)); // 2
        store.insert(task("call mum", Some("2024-01-03T10:00"), Priority::Urgent)); // 3
        store.insert(task("someday", None, Priority::Urgent)); // 4
        let mut done = task("dishes", Some("2024-01-02T20:00"), Priority::Medium);
        done.completed = true;
        store.insert(done); // 5
        let mut done2 = task("laundry", Some("2024-01-04T20:00"), Priority::Medium);
        done2.completed = true;
        store.insert(done2); // 6
        store
    }

    #[test]
    fn test_active_ordering_due_asc_priority_desc() {
        let store = sample_store();
        let ids: Vec<u64> = active(&store).iter().map(|t| t.id).collect();
        // rent first, then the two tasks tied on due with the urgent one
        // ahead, then the undated task last.
        assert_eq!(ids, vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_completed_ordering_due_desc() {
        let store = sample_store();
        let ids: Vec<u64> = completed(&store).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![6, 5]);
    }

    #[test]
    fn test_undated_sorts_last_even_descending() {
        let mut store = sample_store();
        let mut undated_done = task("no due done", None, Priority::Low);
        undated_done.completed = true;
        let id = store.insert(undated_done);
        let ids: Vec<u64> = completed(&store).iter().map(|t| t.id).collect();
        assert_eq!(*ids.last().unwrap(), id);
    }

    #[test]
    fn test_by_date_range_inclusive() {
        let store = sample_store();
        let ids: Vec<u64> =
            by_date_range(&store, dt("2024-01-01T23:59"), dt("2024-01-03T10:00"))
                .iter()
                .map(|t| t.id)
                .collect();
        // Both boundary timestamps are included; undated tasks never match.
        assert_eq!(ids, vec![2, 5, 3, 1]);
    }

    #[test]
    fn test_by_date_range_open_ended_bounds() {
        // The listing surface substitutes MIN/MAX for an absent bound.
        let store = sample_store();
        let ids: Vec<u64> = by_date_range(&store, NaiveDateTime::MIN, NaiveDateTime::MAX)
            .iter()
            .map(|t| t.id)
            .collect();
        // Every dated task; the undated one still never matches.
        assert_eq!(ids, vec![2, 5, 3, 1, 6]);
    }

    #[test]
    fn test_by_date_exact_match_priority_desc() {
        let store = sample_store();
        let ids: Vec<u64> = by_date(&store, dt("2024-01-03T10:00")).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_by_priority_due_asc_only() {
        let store = sample_store();
        let ids: Vec<u64> = by_priority(&store, Priority::Urgent).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_by_category_exact() {
        let mut store = sample_store();
        let mut t = task("standup", Some("2024-01-02T09:00"), Priority::Medium);
        t.category = "Work".into();
        let id = store.insert(t);
        let ids: Vec<u64> = by_category(&store, "Work").iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![id]);
        assert!(by_category(&store, "work").is_empty());
    }

    #[test]
    fn test_search_matches_title_or_description_case_insensitive() {
        let mut store = sample_store();
        let mut t = task("errand", None, Priority::Low);
        t.description = "Buy GROCERIES on the way home".into();
        let id = store.insert(t);

        let hits = search(&store, "groceries");
        let ids: Vec<u64> = hits.iter().map(|t| t.id).collect();
        assert!(ids.contains(&1));
        assert!(ids.contains(&id));
        for t in hits {
            let hay = format!("{} {}", t.title, t.description).to_lowercase();
            assert!(hay.contains("groceries"));
        }
        assert!(search(&store, "zzz-no-match").is_empty());
    }

    #[test]
    fn test_categories_distinct_sorted() {
        let mut store = sample_store();
        let mut a = task("a", None, Priority::Low);
        a.category = "Work".into();
        store.insert(a);
        let mut b = task("b", None, Priority::Low);
        b.category = "".into();
        store.insert(b);
        assert_eq!(categories(&store), vec!["General".to_string(), "Work".to_string()]);
    }

    #[test]
    fn test_reminders_due_cutoff() {
        let mut store = TaskStore::default();
        let mut soon = task("soon", None, Priority::Medium);
        soon.reminder = Some(dt("2024-01-02T08:00"));
        let soon_id = store.insert(soon);
        let mut later = task("later", None, Priority::Medium);
        later.reminder = Some(dt("2024-01-02T12:00"));
        store.insert(later);
        store.insert(task("none", None, Priority::Medium));

        let ids: Vec<u64> =
            reminders_due(&store, dt("2024-01-02T08:00")).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![soon_id]);
    }

    #[test]
    fn test_counts() {
        let store = sample_store();
        assert_eq!(completed_count(&store, dt("2024-01-01T00:00"), dt("2024-01-03T00:00")), 1);
        assert_eq!(completed_count(&store, dt("2024-01-01T00:00"), dt("2024-01-05T00:00")), 2);
        // rent (Jan 1) is the only incomplete task due before Jan 2 08:00.
        assert_eq!(overdue_count(&store, dt("2024-01-02T08:00")), 1);
        // Undated tasks never count as overdue.
        assert_eq!(overdue_count(&store, dt("2030-01-01T00:00")), 3);
    }

    #[test]
    fn test_delete_removes_from_all_result_sets() {
        let mut store = sample_store();
        assert!(active(&store).iter().any(|t| t.id == 2));
        store.remove(2);
        assert!(!all(&store).iter().any(|t| t.id == 2));
        assert!(!active(&store).iter().any(|t| t.id == 2));
        assert!(search(&store, "rent").is_empty());
    }

    #[test]
    fn test_toggle_completion_moves_between_sets() {
        let mut store = sample_store();
        let before = store.get(1).unwrap().clone();
        store.set_completed(1, true);
        assert!(!active(&store).iter().any(|t| t.id == 1));
        assert!(completed(&store).iter().any(|t| t.id == 1));
        let after = store.get(1).unwrap();
        assert_eq!(after.title, before.title);
        assert_eq!(after.due, before.due);
        assert_eq!(after.priority, before.priority);

        store.set_completed(1, false);
        assert!(active(&store).iter().any(|t| t.id == 1));
    }
}
