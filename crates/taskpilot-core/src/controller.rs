//! View state and its transitions.
//!
//! All UI state lives in one owned [`ViewState`]. [`update`] maps a state and
//! an event to the next state plus an optional [`Effect`] that the caller
//! must run and report back as another event.

use taskpilot_shared::ScheduleResult;
use tracing::{debug, info, warn};

use crate::client::ServiceError;
use crate::tasks::TaskList;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub draft: String,
    pub tasks: TaskList,
    pub loading: bool,
    pub result: Option<ScheduleResult>,
    /// Blocking error notification.
    pub alert: Option<String>,
    pub calendar: Option<String>,
}

impl ViewState {
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.tasks.is_empty()
    }
}

#[derive(Debug)]
pub enum Event {
    DraftChanged(String),
    AddDraft,
    Remove(usize),
    SubmitRequested,
    SubmissionFinished(Result<ScheduleResult, ServiceError>),
    /// The client had nothing to send.
    SubmissionSkipped,
    ExportRequested,
    ExportFinished(Result<String, ServiceError>),
    DismissAlert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit { tasks: Vec<String> },
    ExportCalendar { result: ScheduleResult },
}

pub fn update(mut state: ViewState, event: Event) -> (ViewState, Option<Effect>) {
    match event {
        Event::DraftChanged(text) => {
            state.draft = text;
            (state, None)
        }
        Event::AddDraft => {
            if state.tasks.add(&state.draft) {
                state.draft.clear();
            }
            (state, None)
        }
        Event::Remove(index) => {
            state.tasks.remove(index);
            (state, None)
        }
        Event::SubmitRequested => {
            if !state.can_submit() {
                debug!(
                    loading = state.loading,
                    count = state.tasks.len(),
                    "submit ignored"
                );
                return (state, None);
            }
            state.loading = true;
            state.result = None;
            state.alert = None;
            state.calendar = None;
            let tasks = state.tasks.descriptions();
            info!(count = tasks.len(), "submission started");
            (state, Some(Effect::Submit { tasks }))
        }
        Event::SubmissionFinished(outcome) => {
            state.loading = false;
            match outcome {
                Ok(result) => {
                    info!(items = result.schedule_plan.len(), "schedule received");
                    state.result = Some(result);
                }
                Err(err) => {
                    warn!(error = %err, status = ?err.status(), "submission failed");
                    state.alert = Some(format!("API Error: {err}"));
                }
            }
            (state, None)
        }
        Event::SubmissionSkipped => {
            state.loading = false;
            (state, None)
        }
        Event::ExportRequested => {
            let Some(result) = state.result.clone().filter(|_| !state.loading) else {
                debug!("export ignored; no schedule to export");
                return (state, None);
            };
            state.alert = None;
            state.calendar = None;
            (state, Some(Effect::ExportCalendar { result }))
        }
        Event::ExportFinished(outcome) => {
            match outcome {
                Ok(calendar) => state.calendar = Some(calendar),
                Err(err) => {
                    warn!(error = %err, status = ?err.status(), "calendar export failed");
                    state.alert = Some(format!("API Error: {err}"));
                }
            }
            (state, None)
        }
        Event::DismissAlert => {
            state.alert = None;
            (state, None)
        }
    }
}
