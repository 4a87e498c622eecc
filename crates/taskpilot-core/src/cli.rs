use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskpilot",
    version,
    about = "TaskPilot: turn a task list into a prioritized, time-blocked day",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    /// Config file to read instead of ~/.taskpilotrc.
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the scheduling service.
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    /// IANA timezone sent with submissions and used for display.
    #[arg(long = "timezone", global = true)]
    pub timezone: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Collect tasks line by line, then generate a schedule (default).
    Interactive,

    /// Submit the given tasks once and print the schedule.
    Plan {
        #[arg(required = true)]
        tasks: Vec<String>,

        /// Also print the schedule as an iCalendar document.
        #[arg(long)]
        ics: bool,
    },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Command, GlobalCli, KeyVal};

    #[test]
    fn parses_key_value() {
        let kv: KeyVal = " user.id = sam ".parse().expect("valid pair");
        assert_eq!(kv.key, "user.id");
        assert_eq!(kv.value, "sam");
        assert!("no-equals".parse::<KeyVal>().is_err());
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = GlobalCli::parse_from(["taskpilot", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.command.is_none());
    }

    #[test]
    fn plan_takes_tasks_and_globals() {
        let cli = GlobalCli::parse_from([
            "taskpilot",
            "plan",
            "Email professor",
            "Finish slides",
            "--ics",
            "--timezone",
            "Europe/Paris",
            "--rc",
            "user.id=sam",
        ]);

        assert_eq!(
            cli.command,
            Some(Command::Plan {
                tasks: vec!["Email professor".to_string(), "Finish slides".to_string()],
                ics: true,
            })
        );
        assert_eq!(cli.timezone.as_deref(), Some("Europe/Paris"));
        assert_eq!(cli.rc_overrides.len(), 1);
    }

    #[test]
    fn plan_requires_a_task() {
        assert!(GlobalCli::try_parse_from(["taskpilot", "plan"]).is_err());
    }
}
