pub mod agenda;
pub mod categories;
pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod datetime;
pub mod render;
pub mod session;
pub mod tasks;

use std::ffi::OsString;
use std::io;

use anyhow::{
  Context,
  anyhow
};
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting taskpilot"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );
  if let Some(url) = cli.api_url {
    cfg.apply_overrides([(
      "api.url".to_string(),
      url
    )]);
  }
  debug!(files = ?cfg.loaded_files, "configuration loaded");

  let timezone = match cli.timezone {
    | Some(raw) => {
      datetime::parse_timezone(
        &raw,
        "--timezone"
      )
      .ok_or_else(|| {
        anyhow!("unknown timezone: {raw}")
      })?
    }
    | None => {
      datetime::resolve_timezone(
        cfg.timezone().as_deref()
      )
    }
  };

  let client =
    client::SubmissionClient::new(
      &cfg.api_url(),
      &cfg.user_id(),
      timezone
    )?;
  let renderer =
    render::Renderer::new(&cfg)?;

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async \
         runtime"
      )?;

  let mut session = session::Session::new(
    client,
    renderer,
    io::stdout()
  );

  runtime.block_on(async {
    match cli.command {
      | None
      | Some(cli::Command::Interactive) => {
        session
          .run_interactive(
            io::stdin().lock()
          )
          .await
      }
      | Some(cli::Command::Plan {
        tasks,
        ics
      }) => {
        session
          .run_plan(&tasks, ics)
          .await
      }
    }
  })?;

  info!("done");
  Ok(())
}
