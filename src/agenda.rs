//! Home-screen aggregation over the active and completed task sets.
//!
//! Partitions a snapshot of active tasks into overdue / due-today / upcoming
//! groupings and keeps the ten most recent completed tasks, with an optional
//! free-text filter applied to the active set first. Callers rebuild the
//! agenda whenever either snapshot or the filter text changes.

use chrono::NaiveDateTime;

use crate::task::Task;

/// The four task groupings shown on the home view.
///
/// `overdue` and `today` are deliberately not mutually exclusive: a task
/// that was due earlier today appears in both.
#[derive(Debug, Default)]
pub struct Agenda<'a> {
    pub overdue: Vec<&'a Task>,
    pub today: Vec<&'a Task>,
    pub upcoming: Vec<&'a Task>,
    pub recent_completed: Vec<&'a Task>,
}

/// Maximum number of completed tasks kept in the agenda.
pub const RECENT_COMPLETED_LIMIT: usize = 10;

/// True when the task's title, description or category contains the query
/// as a case-insensitive substring.
pub fn matches_filter(task: &Task, query: &str) -> bool {
    let needle = query.to_lowercase();
    task.title.to_lowercase().contains(&needle)
        || task.description.to_lowercase().contains(&needle)
        || task.category.to_lowercase().contains(&needle)
}

impl<'a> Agenda<'a> {
    /// Build the agenda groupings.
    ///
    /// `active` and `completed` are expected in query-service order (due
    /// ascending / priority descending, and due descending respectively);
    /// `overdue` and `today` preserve that order, `upcoming` re-sorts by due
    /// date, and `recent_completed` takes the first ten completed as given.
    pub fn build(
        active: &[&'a Task],
        completed: &[&'a Task],
        now: NaiveDateTime,
        query: &str,
    ) -> Agenda<'a> {
        let today = now.date();

        let filtered: Vec<&Task> = if query.trim().is_empty() {
            active.to_vec()
        } else {
            active.iter().copied().filter(|t| matches_filter(t, query)).collect()
        };

        let overdue: Vec<&Task> = filtered
            .iter()
            .copied()
            .filter(|t| matches!(t.due, Some(d) if d < now))
            .collect();

        let todays: Vec<&Task> = filtered
            .iter()
            .copied()
            .filter(|t| t.due.map(|d| d.date()) == Some(today))
            .collect();

        let mut upcoming: Vec<&Task> = filtered
            .iter()
            .copied()
            .filter(|t| matches!(t.due, Some(d) if d > now && d.date() != today))
            .collect();
        upcoming.sort_by_key(|t| (t.due, t.id));

        let recent_completed: Vec<&Task> =
            completed.iter().copied().take(RECENT_COMPLETED_LIMIT).collect();

        Agenda { overdue, today: todays, upcoming, recent_completed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use crate::query;
    use crate::store::TaskStore;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    fn task(title: &str, due: Option<&str>) -> Task {
        let mut t = Task::new(title);
        t.due = due.map(dt);
        t
    }

    #[test]
    fn test_overdue_yesterday_not_today_or_upcoming() {
        // Due last night, viewed the next morning.
        let mut store = TaskStore::default();
        let mut rent = task("Pay rent", Some("2024-01-01T23:59"));
        rent.priority = Priority::High;
        let id = store.insert(rent);

        let active = query::active(&store);
        let agenda = Agenda::build(&active, &[], dt("2024-01-02T08:00"), "");
        assert_eq!(agenda.overdue.iter().map(|t| t.id).collect::<Vec<_>>(), vec![id]);
        assert!(agenda.today.is_empty());
        assert!(agenda.upcoming.is_empty());
    }

    #[test]
    fn test_overdue_and_today_overlap() {
        // A task overdue earlier today shows up in both groupings.
        let mut store = TaskStore::default();
        let id = store.insert(task("standup", Some("2024-01-02T07:00")));
        store.insert(task("tonight", Some("2024-01-02T21:00")));

        let active = query::active(&store);
        let agenda = Agenda::build(&active, &[], dt("2024-01-02T09:00"), "");
        assert_eq!(agenda.overdue.iter().map(|t| t.id).collect::<Vec<_>>(), vec![id]);
        assert_eq!(agenda.today.len(), 2);
        assert!(agenda.upcoming.is_empty());
    }

    #[test]
    fn test_upcoming_excludes_today_and_sorts_by_due() {
        let mut store = TaskStore::default();
        store.insert(task("later", Some("2024-01-05T10:00"))); // 1
        store.insert(task("sooner", Some("2024-01-03T10:00"))); // 2
        store.insert(task("today evening", Some("2024-01-02T21:00"))); // 3
        store.insert(task("undated", None)); // 4

        let active = query::active(&store);
        let agenda = Agenda::build(&active, &[], dt("2024-01-02T09:00"), "");
        assert_eq!(agenda.upcoming.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_undated_tasks_in_no_dated_grouping() {
        let mut store = TaskStore::default();
        store.insert(task("undated", None));
        let active = query::active(&store);
        let agenda = Agenda::build(&active, &[], dt("2024-01-02T09:00"), "");
        assert!(agenda.overdue.is_empty());
        assert!(agenda.today.is_empty());
        assert!(agenda.upcoming.is_empty());
    }

    #[test]
    fn test_filter_covers_title_description_and_category() {
        let mut store = TaskStore::default();
        let a = store.insert(task("Buy milk", Some("2024-01-03T10:00")));
        let mut desc = task("errand", Some("2024-01-03T11:00"));
        desc.description = "pick up MILK too".into();
        let b = store.insert(desc);
        let mut cat = task("other", Some("2024-01-03T12:00"));
        cat.category = "Milk runs".into();
        let c = store.insert(cat);
        store.insert(task("unrelated", Some("2024-01-03T13:00")));

        let active = query::active(&store);
        let agenda = Agenda::build(&active, &[], dt("2024-01-02T09:00"), "milk");
        let ids: Vec<u64> = agenda.upcoming.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn test_blank_filter_passes_everything() {
        let mut store = TaskStore::default();
        store.insert(task("a", Some("2024-01-03T10:00")));
        store.insert(task("b", Some("2024-01-04T10:00")));
        let active = query::active(&store);
        let agenda = Agenda::build(&active, &[], dt("2024-01-02T09:00"), "   ");
        assert_eq!(agenda.upcoming.len(), 2);
    }

    #[test]
    fn test_recent_completed_capped_at_ten_in_given_order() {
        let mut store = TaskStore::default();
        for day in 1..=14 {
            let mut t = task(&format!("done {day}"), Some(&format!("2024-01-{day:02}T12:00")));
            t.completed = true;
            store.insert(t);
        }
        let completed = query::completed(&store);
        let agenda = Agenda::build(&[], &completed, dt("2024-02-01T00:00"), "");
        assert_eq!(agenda.recent_completed.len(), RECENT_COMPLETED_LIMIT);
        // Most recently due first, matching the completed-query ordering.
        let dues: Vec<_> = agenda.recent_completed.iter().map(|t| t.due.unwrap()).collect();
        assert!(dues.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(dues[0], dt("2024-01-14T12:00"));
        assert_eq!(dues[9], dt("2024-01-05T12:00"));
    }

    #[test]
    fn test_groupings_keep_active_ordering() {
        let mut store = TaskStore::default();
        let mut urgent = task("urgent late", Some("2024-01-01T10:00"));
        urgent.priority = Priority::Urgent;
        store.insert(urgent); // 1
        let mut low = task("low late", Some("2024-01-01T10:00"));
        low.priority = Priority::Low;
        store.insert(low); // 2
        store.insert(task("earlier late", Some("2023-12-30T10:00"))); // 3

        let active = query::active(&store);
        let agenda = Agenda::build(&active, &[], dt("2024-01-02T09:00"), "");
        // Due ascending, then priority descending, as the active query yields.
        assert_eq!(agenda.overdue.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 1, 2]);
    }
}
