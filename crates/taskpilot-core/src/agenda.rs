//! Date-grouped agenda over a service schedule plan.
//!
//! The plan is walked once, in the order the service returned it. A header
//! row precedes the first item and every item whose date label differs from
//! the previous item's.

use std::iter::FusedIterator;
use std::slice;

use chrono::NaiveDate;
use chrono_tz::Tz;
use taskpilot_shared::ScheduleItem;

use crate::datetime::{date_label, time_label};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaEntry<'a> {
    pub task: &'a str,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaRow<'a> {
    Header(String),
    Entry(AgendaEntry<'a>),
}

#[derive(Debug, Clone)]
pub enum Agenda<'a> {
    NoSchedule,
    Rows(AgendaRows<'a>),
}

/// `today` is the date at render time, not at submission time.
pub fn agenda(plan: &[ScheduleItem], today: NaiveDate, tz: Tz) -> Agenda<'_> {
    if plan.is_empty() {
        return Agenda::NoSchedule;
    }

    Agenda::Rows(AgendaRows {
        items: plan.iter(),
        today,
        tz,
        previous_label: None,
        pending: None,
    })
}

#[derive(Debug, Clone)]
pub struct AgendaRows<'a> {
    items: slice::Iter<'a, ScheduleItem>,
    today: NaiveDate,
    tz: Tz,
    previous_label: Option<String>,
    pending: Option<&'a ScheduleItem>,
}

impl<'a> AgendaRows<'a> {
    fn entry(&self, item: &'a ScheduleItem) -> AgendaRow<'a> {
        AgendaRow::Entry(AgendaEntry {
            task: &item.task,
            start: time_label(&item.start_iso, &self.tz),
            end: time_label(&item.end_iso, &self.tz),
        })
    }
}

impl<'a> Iterator for AgendaRows<'a> {
    type Item = AgendaRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.pending.take() {
            return Some(self.entry(item));
        }

        let item = self.items.next()?;
        let label = date_label(&item.start_iso, self.today, &self.tz);
        if self.previous_label.as_deref() == Some(label.as_str()) {
            return Some(self.entry(item));
        }

        self.previous_label = Some(label.clone());
        self.pending = Some(item);
        Some(AgendaRow::Header(label))
    }
}

impl FusedIterator for AgendaRows<'_> {}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use taskpilot_shared::ScheduleItem;

    use super::{Agenda, AgendaEntry, AgendaRow, agenda};

    fn item(task: &str, start: &str, end: &str) -> ScheduleItem {
        ScheduleItem {
            task: task.to_string(),
            start_iso: start.to_string(),
            end_iso: end.to_string(),
        }
    }

    fn rows<'a>(plan: &'a [ScheduleItem], today: NaiveDate) -> Vec<AgendaRow<'a>> {
        match agenda(plan, today, chrono_tz::UTC) {
            Agenda::Rows(rows) => rows.collect(),
            Agenda::NoSchedule => panic!("expected rows"),
        }
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).expect("valid date")
    }

    #[test]
    fn same_day_items_share_one_header() {
        let plan = vec![
            item("A", "2024-01-01T09:00:00Z", "2024-01-01T09:30:00Z"),
            item("B", "2024-01-01T10:00:00Z", "2024-01-01T10:30:00Z"),
        ];

        assert_eq!(
            rows(&plan, jan(1)),
            vec![
                AgendaRow::Header("Today".to_string()),
                AgendaRow::Entry(AgendaEntry {
                    task: "A",
                    start: "9:00 AM".to_string(),
                    end: "9:30 AM".to_string(),
                }),
                AgendaRow::Entry(AgendaEntry {
                    task: "B",
                    start: "10:00 AM".to_string(),
                    end: "10:30 AM".to_string(),
                }),
            ]
        );
    }

    #[test]
    fn label_change_starts_new_section() {
        let plan = vec![
            item("A", "2024-01-01T20:00:00Z", "2024-01-01T21:00:00Z"),
            item("B", "2024-01-02T09:00:00Z", "2024-01-02T10:00:00Z"),
            item("C", "2024-01-04T09:00:00Z", "2024-01-04T10:00:00Z"),
            item("D", "2024-01-04T11:00:00Z", "2024-01-04T12:00:00Z"),
        ];

        let headers: Vec<String> = rows(&plan, jan(1))
            .into_iter()
            .filter_map(|row| match row {
                AgendaRow::Header(label) => Some(label),
                AgendaRow::Entry(_) => None,
            })
            .collect();
        assert_eq!(headers, vec!["Today", "Tomorrow", "Thu, Jan 4"]);
    }

    #[test]
    fn plan_order_is_not_resorted() {
        let plan = vec![
            item("later", "2024-01-02T09:00:00Z", "2024-01-02T10:00:00Z"),
            item("earlier", "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"),
            item("later again", "2024-01-02T11:00:00Z", "2024-01-02T12:00:00Z"),
        ];

        let rendered = rows(&plan, jan(1));
        let order: Vec<&str> = rendered
            .iter()
            .map(|row| match row {
                AgendaRow::Header(label) => label.as_str(),
                AgendaRow::Entry(entry) => entry.task,
            })
            .collect();
        assert_eq!(
            order,
            vec!["Tomorrow", "later", "Today", "earlier", "Tomorrow", "later again"]
        );
    }

    #[test]
    fn rerendering_is_idempotent() {
        let plan = vec![
            item("A", "2024-01-01T09:00:00Z", "2024-01-01T09:30:00Z"),
            item("B", "2024-01-03T10:00:00Z", "2024-01-03T10:30:00Z"),
        ];
        assert_eq!(rows(&plan, jan(1)), rows(&plan, jan(1)));
    }

    #[test]
    fn labels_follow_render_date() {
        let plan = vec![item("A", "2024-01-02T09:00:00Z", "2024-01-02T09:30:00Z")];
        assert_eq!(rows(&plan, jan(1))[0], AgendaRow::Header("Tomorrow".to_string()));
        assert_eq!(rows(&plan, jan(2))[0], AgendaRow::Header("Today".to_string()));
    }

    #[test]
    fn malformed_timestamp_degrades_only_its_item() {
        let plan = vec![
            item("A", "2024-01-01T09:00:00Z", "2024-01-01T09:30:00Z"),
            item("broken", "tomorrow-ish", "2024-01-01T11:00:00Z"),
            item("C", "2024-01-01T12:00:00Z", "2024-01-01T12:30:00Z"),
        ];

        let rendered = rows(&plan, jan(1));
        assert_eq!(rendered.len(), 6);
        assert_eq!(rendered[2], AgendaRow::Header(String::new()));
        assert_eq!(
            rendered[3],
            AgendaRow::Entry(AgendaEntry {
                task: "broken",
                start: "tomorrow-ish".to_string(),
                end: "11:00 AM".to_string(),
            })
        );
        assert_eq!(rendered[4], AgendaRow::Header("Today".to_string()));
        assert!(matches!(&rendered[5], AgendaRow::Entry(entry) if entry.task == "C"));
    }

    #[test]
    fn empty_plan_is_no_schedule() {
        assert!(matches!(agenda(&[], jan(1), chrono_tz::UTC), Agenda::NoSchedule));
    }
}
