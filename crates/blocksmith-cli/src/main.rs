//! `blocksmith` operator CLI

mod cli;
mod commands;
mod logging;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let matches = cli::command().get_matches();
    let log_json = matches.get_flag("log-json")
        || matches
            .subcommand()
            .is_some_and(|(_, args)| args.get_flag("log-json"));
    logging::init(log_json);

    let mut out = std::io::stdout().lock();
    match matches.subcommand() {
        Some(("check-manifest", args)) => commands::check_manifest(&cli::CheckManifestArgs::from(args), &mut out),
        Some(("repair", args)) => commands::repair(&cli::RepairArgs::from(args), &mut out).await,
        Some(("validate", args)) => commands::validate(&cli::ValidateArgs::from(args), &mut out),
        _ => {
            cli::command().print_help()?;
            Ok(ExitCode::FAILURE)
        }
    }
}
