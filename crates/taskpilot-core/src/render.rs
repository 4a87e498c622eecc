use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::NaiveDate;
use chrono_tz::Tz;
use taskpilot_shared::ScheduleResult;
use unicode_width::UnicodeWidthStr;

use crate::agenda::{Agenda, AgendaRow, agenda};
use crate::categories::category_groups;
use crate::config::Config;
use crate::controller::ViewState;
use crate::tasks::TaskList;

const TIME_WIDTH: usize = 8;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn print_tasks<W: Write>(&self, out: &mut W, tasks: &TaskList) -> anyhow::Result<()> {
        if tasks.is_empty() {
            writeln!(out, "No tasks yet.")?;
            return Ok(());
        }

        writeln!(out, "{}", self.paint(&format!("Your Tasks ({})", tasks.len()), "1"))?;
        for (idx, task) in tasks.iter().enumerate() {
            writeln!(out, "  {} {}", self.paint(&format!("{:>2}.", idx + 1), "33"), task)?;
        }
        Ok(())
    }

    /// Loading line and any pending alert.
    pub fn print_status<W: Write>(&self, out: &mut W, state: &ViewState) -> anyhow::Result<()> {
        if state.loading {
            writeln!(out, "Organizing your tasks...")?;
        }
        if let Some(alert) = &state.alert {
            writeln!(out, "{}", self.paint(alert, "31"))?;
        }
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_result<W: Write>(
        &self,
        out: &mut W,
        result: &ScheduleResult,
        today: NaiveDate,
        tz: Tz,
    ) -> anyhow::Result<()> {
        if !result.note.is_empty() {
            writeln!(out, "{}", self.paint(&result.note, "35"))?;
            writeln!(out)?;
        }

        writeln!(out, "{}", self.paint("Your Time-Blocked Schedule", "1"))?;
        match agenda(&result.schedule_plan, today, tz) {
            Agenda::NoSchedule => writeln!(out, "  No schedule generated")?,
            Agenda::Rows(rows) => {
                for row in rows {
                    match row {
                        AgendaRow::Header(label) if label.is_empty() => writeln!(out)?,
                        AgendaRow::Header(label) => {
                            writeln!(out, "  {}", self.paint(&label, "36"))?;
                        }
                        AgendaRow::Entry(entry) => {
                            writeln!(
                                out,
                                "    {}{} - {}  {}",
                                pad_left(&entry.start, TIME_WIDTH),
                                self.paint(&entry.start, "34"),
                                entry.end,
                                entry.task
                            )?;
                        }
                    }
                }
            }
        }

        let mut groups = category_groups(result).peekable();
        if groups.peek().is_some() {
            writeln!(out)?;
            writeln!(out, "{}", self.paint("Task Categories", "1"))?;
        }
        for group in groups {
            writeln!(out, "  {}", self.paint(group.label(), "33"))?;
            for entry in group.entries {
                writeln!(out, "    • {entry}")?;
            }
        }

        Ok(())
    }

    pub fn print_calendar<W: Write>(&self, out: &mut W, calendar: &str) -> anyhow::Result<()> {
        writeln!(out, "{calendar}")?;
        Ok(())
    }

    pub fn print_help<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        writeln!(out, "Type a task and press Enter to add it.")?;
        writeln!(out, "  /rm N   remove task N")?;
        writeln!(out, "  /list   show tasks")?;
        writeln!(out, "  /go     generate the schedule")?;
        writeln!(out, "  /ics    print the schedule as iCalendar")?;
        writeln!(out, "  /help   show this help")?;
        writeln!(out, "  /quit   exit")?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn pad_left(text: &str, width: usize) -> String {
    " ".repeat(width.saturating_sub(UnicodeWidthStr::width(text)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use taskpilot_shared::{ScheduleItem, ScheduleResult};

    use super::Renderer;
    use crate::tasks::TaskList;

    fn render(result: &ScheduleResult) -> String {
        let mut out = Vec::new();
        Renderer::plain()
            .print_result(
                &mut out,
                result,
                NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
                chrono_tz::UTC,
            )
            .expect("render");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn renders_agenda_and_categories() {
        let result = ScheduleResult {
            note: "Small steps.".to_string(),
            schedule_plan: vec![
                ScheduleItem {
                    task: "A".to_string(),
                    start_iso: "2024-01-01T09:00:00Z".to_string(),
                    end_iso: "2024-01-01T09:30:00Z".to_string(),
                },
                ScheduleItem {
                    task: "B".to_string(),
                    start_iso: "2024-01-01T10:00:00Z".to_string(),
                    end_iso: "2024-01-01T10:30:00Z".to_string(),
                },
            ],
            important_not_urgent: vec!["Write report".to_string()],
            ..ScheduleResult::default()
        };

        let text = render(&result);
        assert_eq!(
            text,
            "Small steps.\n\
             \n\
             Your Time-Blocked Schedule\n\
             \x20 Today\n\
             \x20    9:00 AM - 9:30 AM  A\n\
             \x20   10:00 AM - 10:30 AM  B\n\
             \n\
             Task Categories\n\
             \x20 Important (Not Urgent)\n\
             \x20   • Write report\n"
        );
        assert_eq!(text.matches("Today").count(), 1);
    }

    #[test]
    fn undated_first_item_gets_a_bare_break() {
        let result = ScheduleResult {
            schedule_plan: vec![
                ScheduleItem {
                    task: "Broken".to_string(),
                    start_iso: "whenever".to_string(),
                    end_iso: "later".to_string(),
                },
                ScheduleItem {
                    task: "Fine".to_string(),
                    start_iso: "2024-01-01T13:00:00Z".to_string(),
                    end_iso: "2024-01-01T14:00:00Z".to_string(),
                },
            ],
            ..ScheduleResult::default()
        };

        assert_eq!(
            render(&result),
            "Your Time-Blocked Schedule\n\
             \n\
             \x20   whenever - later  Broken\n\
             \x20 Today\n\
             \x20    1:00 PM - 2:00 PM  Fine\n"
        );
    }

    #[test]
    fn empty_plan_says_so() {
        let text = render(&ScheduleResult::default());
        assert!(text.contains("No schedule generated"));
        assert!(!text.contains("Task Categories"));
    }

    #[test]
    fn task_list_is_numbered_from_one() {
        let mut tasks = TaskList::new();
        tasks.add("Email professor");
        tasks.add("Finish slides");

        let mut out = Vec::new();
        Renderer::plain().print_tasks(&mut out, &tasks).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "Your Tasks (2)\n   1. Email professor\n   2. Finish slides\n"
        );
    }
}
