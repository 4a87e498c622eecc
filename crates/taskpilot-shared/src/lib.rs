use serde::{
  Deserialize,
  Serialize
};

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKey {
  UrgentImportant,
  ImportantNotUrgent,
  UrgentNotImportant,
  NotUrgentNotImportant
}

impl CategoryKey {
  /// Display order of the Eisenhower
  /// quadrants.
  pub const ALL: [CategoryKey; 4] = [
    CategoryKey::UrgentImportant,
    CategoryKey::ImportantNotUrgent,
    CategoryKey::UrgentNotImportant,
    CategoryKey::NotUrgentNotImportant
  ];

  #[must_use]
  pub fn as_str(self) -> &'static str {
    match self {
      | CategoryKey::UrgentImportant => {
        "urgent_important"
      }
      | CategoryKey::ImportantNotUrgent => {
        "important_not_urgent"
      }
      | CategoryKey::UrgentNotImportant => {
        "urgent_not_important"
      }
      | CategoryKey::NotUrgentNotImportant => {
        "not_urgent_not_important"
      }
    }
  }

  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      | CategoryKey::UrgentImportant => {
        "Urgent & Important"
      }
      | CategoryKey::ImportantNotUrgent => {
        "Important (Not Urgent)"
      }
      | CategoryKey::UrgentNotImportant => {
        "Urgent (Not Important)"
      }
      | CategoryKey::NotUrgentNotImportant => {
        "Low Priority"
      }
    }
  }
}

impl std::fmt::Display for CategoryKey {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>
  ) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Body of `POST /api/prioritize`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct SubmissionRequest {
  pub tasks_text:  Vec<String>,
  pub created_iso: String,
  pub timezone:    String,
  pub user_id:     String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ScheduleItem {
  pub task:      String,
  pub start_iso: String,
  pub end_iso:   String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct ScheduleResult {
  #[serde(default)]
  pub note: String,
  #[serde(default)]
  pub schedule_plan: Vec<ScheduleItem>,
  #[serde(default)]
  pub urgent_important: Vec<String>,
  #[serde(default)]
  pub important_not_urgent: Vec<String>,
  #[serde(default)]
  pub urgent_not_important: Vec<String>,
  #[serde(default)]
  pub not_urgent_not_important:
    Vec<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub timestamp: Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub timezone: Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub user_id: Option<String>
}

impl ScheduleResult {
  #[must_use]
  pub fn entries(
    &self,
    key: CategoryKey
  ) -> &[String] {
    match key {
      | CategoryKey::UrgentImportant => {
        &self.urgent_important
      }
      | CategoryKey::ImportantNotUrgent => {
        &self.important_not_urgent
      }
      | CategoryKey::UrgentNotImportant => {
        &self.urgent_not_important
      }
      | CategoryKey::NotUrgentNotImportant => {
        &self.not_urgent_not_important
      }
    }
  }
}

/// Body of `POST /api/ics`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct CalendarExportRequest {
  pub user_id:       String,
  pub timezone:      String,
  pub note:          String,
  pub schedule_plan: Vec<ScheduleItem>
}
