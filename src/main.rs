mod commands;
mod core;
mod pack;

use crate::commands::{PublishArgs, run_publish};
use crate::core::error::{DepotError, print_error};
use clap::Parser;

/// Package, index, and publish versioned software bundles
///
/// Updates a bundle's manifest, packages the bundle directory into a
/// tgz archive, inserts a release entry into the index held on a remote
/// branch (pruning old releases), and pushes the result.
#[derive(Parser)]
#[command(name = "bundle-depot")]
#[command(about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Bundle (directory) name to update and release
  #[arg(short = 'c', long)]
  bundle: String,

  /// New release version to write into the manifest
  #[arg(short = 'v', long)]
  version: Option<String>,

  /// New application version to write into the manifest
  #[arg(short = 'a', long, visible_alias = "appVersion")]
  app_version: Option<String>,

  /// Remote repository owner or organization
  #[arg(short = 'o', long)]
  owner: String,

  /// Remote repository name
  #[arg(short = 'r', long)]
  repository: String,

  /// Branch holding the release index
  #[arg(short = 'b', long, default_value = "gh-pages")]
  branch: String,

  /// How many releases to keep per bundle in the index
  #[arg(short = 'l', long, default_value_t = 10)]
  keep_last_releases: usize,

  /// Override the clone URL of the index repository (useful for mirrors
  /// and testing against local repositories)
  #[arg(long)]
  remote: Option<String>,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let result = run_publish(PublishArgs {
    bundle: cli.bundle,
    version: cli.version,
    app_version: cli.app_version,
    owner: cli.owner,
    repository: cli.repository,
    branch: cli.branch,
    keep_last_releases: cli.keep_last_releases,
    remote: cli.remote,
  });

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: DepotError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
