use std::io::{BufRead, Write};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::client::SubmissionClient;
use crate::controller::{Effect, Event, ViewState, update};
use crate::datetime::today_in;
use crate::render::Renderer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Add(String),
    /// Zero-based position.
    Remove(usize),
    List,
    Submit,
    Export,
    Help,
    Quit,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Maps one line of user input. Task numbers are 1-based as displayed.
pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }

    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Add(trimmed.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "add" if !arg.is_empty() => Input::Add(arg.to_string()),
        "rm" | "remove" => match arg.parse::<usize>() {
            Ok(number) if number >= 1 => Input::Remove(number - 1),
            _ => Input::Unknown(trimmed.to_string()),
        },
        "list" | "ls" => Input::List,
        "go" | "submit" => Input::Submit,
        "ics" => Input::Export,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => Input::Unknown(trimmed.to_string()),
    }
}

/// Owns the view state and runs the effects the controller asks for.
pub struct Session<W: Write> {
    state: ViewState,
    client: SubmissionClient,
    renderer: Renderer,
    out: W,
    clock: fn() -> DateTime<Utc>,
}

impl<W: Write> Session<W> {
    pub fn new(client: SubmissionClient, renderer: Renderer, out: W) -> Self {
        Self {
            state: ViewState::default(),
            client,
            renderer,
            out,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn into_output(self) -> W {
        self.out
    }

    #[instrument(skip_all)]
    pub async fn run_interactive<R: BufRead>(&mut self, input: R) -> anyhow::Result<()> {
        info!(api = %self.client.base_url(), "interactive session started");
        self.renderer.print_help(&mut self.out)?;
        self.prompt()?;

        for line in input.lines() {
            let line = line.context("failed reading input")?;
            if self.handle_input(parse_input(&line)).await? == Flow::Quit {
                break;
            }
            self.prompt()?;
        }

        info!("interactive session finished");
        Ok(())
    }

    /// Adds every task, submits once, and fails if no schedule came back.
    #[instrument(skip_all, fields(count = tasks.len()))]
    pub async fn run_plan(&mut self, tasks: &[String], export: bool) -> anyhow::Result<()> {
        for task in tasks {
            self.handle_input(Input::Add(task.clone())).await?;
        }
        self.handle_input(Input::Submit).await?;

        if self.state.result.is_none() {
            let reason = self
                .state
                .alert
                .clone()
                .unwrap_or_else(|| "no tasks to submit".to_string());
            return Err(anyhow!(reason));
        }

        if export {
            self.handle_input(Input::Export).await?;
            if let Some(alert) = self.state.alert.clone() {
                return Err(anyhow!(alert));
            }
        }
        Ok(())
    }

    pub async fn handle_input(&mut self, input: Input) -> anyhow::Result<Flow> {
        debug!(?input, "handling input");
        match input {
            Input::Empty => {}
            Input::Add(text) => {
                self.dispatch(Event::DraftChanged(text)).await?;
                self.dispatch(Event::AddDraft).await?;
                self.renderer.print_tasks(&mut self.out, &self.state.tasks)?;
            }
            Input::Remove(index) => {
                self.dispatch(Event::Remove(index)).await?;
                self.renderer.print_tasks(&mut self.out, &self.state.tasks)?;
            }
            Input::List => self.renderer.print_tasks(&mut self.out, &self.state.tasks)?,
            Input::Submit => {
                if self.state.tasks.is_empty() {
                    writeln!(self.out, "Add a task first.")?;
                }
                self.dispatch(Event::SubmitRequested).await?;
            }
            Input::Export => {
                if self.state.result.is_none() {
                    writeln!(self.out, "Generate a schedule first.")?;
                }
                self.dispatch(Event::ExportRequested).await?;
            }
            Input::Help => self.renderer.print_help(&mut self.out)?,
            Input::Unknown(raw) => writeln!(self.out, "Unknown command: {raw} (try /help)")?,
            Input::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Feeds an event through the controller until no effect remains.
    pub async fn dispatch(&mut self, event: Event) -> anyhow::Result<()> {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let finished = matches!(
                event,
                Event::SubmissionFinished(_) | Event::ExportFinished(_)
            );
            let (state, effect) = update(std::mem::take(&mut self.state), event);
            self.state = state;

            if finished {
                self.present()?;
            }
            if let Some(effect) = effect {
                next = Some(self.run_effect(effect).await?);
            }
        }
        self.out.flush()?;
        Ok(())
    }

    async fn run_effect(&mut self, effect: Effect) -> anyhow::Result<Event> {
        match effect {
            Effect::Submit { tasks } => {
                self.renderer.print_status(&mut self.out, &self.state)?;
                self.out.flush()?;
                let event = match self.client.submit(&tasks, (self.clock)()) {
                    Some(pending) => Event::SubmissionFinished(pending.wait().await),
                    None => Event::SubmissionSkipped,
                };
                Ok(event)
            }
            Effect::ExportCalendar { result } => {
                let request = self.client.calendar_request(&result);
                Ok(Event::ExportFinished(
                    self.client.export_calendar(&request).await,
                ))
            }
        }
    }

    fn present(&mut self) -> anyhow::Result<()> {
        if self.state.alert.is_some() {
            self.renderer.print_status(&mut self.out, &self.state)?;
            return Ok(());
        }

        if let Some(calendar) = &self.state.calendar {
            self.renderer.print_calendar(&mut self.out, calendar)?;
        } else if let Some(result) = &self.state.result {
            let today = today_in((self.clock)(), self.client.timezone());
            self.renderer
                .print_result(&mut self.out, result, today, *self.client.timezone())?;
        }
        Ok(())
    }

    fn prompt(&mut self) -> anyhow::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(())
    }
}
