pub mod cli;
pub mod commands;
pub mod config;
pub mod http;

use std::ffi::OsString;
use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting portal CLI"
  );
  debug!(
    keys = ?pre
      .rc_overrides
      .iter()
      .map(|(key, _)| key.as_str())
      .collect::<Vec<_>>(),
    "preprocessed rc overrides"
  );

  let cfg =
    effective_config(&cli, pre.rc_overrides)?;

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async \
         runtime"
      )?;

  let mut out = std::io::stdout().lock();
  runtime.block_on(commands::dispatch(
    &cfg,
    cli.command,
    &mut out
  ))?;
  out
    .flush()
    .context("failed flushing output")?;

  info!("done");
  Ok(())
}

/// Loads the portalrc chosen on the command
/// line, then applies positional `rc.`
/// words and `--rc` flags over it, in that
/// order.
pub fn effective_config(
  cli: &cli::GlobalCli,
  positional: Vec<(String, String)>
) -> anyhow::Result<config::Config> {
  let mut cfg = config::Config::load(
    cli.portalrc.as_deref()
  )?;
  cfg.apply_overrides(
    positional.into_iter().chain(
      cli.rc_overrides.iter().map(|kv| {
        (kv.key.clone(), kv.value.clone())
      })
    )
  );
  Ok(cfg)
}
