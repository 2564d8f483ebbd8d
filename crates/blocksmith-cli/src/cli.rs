//! Argument definitions

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

pub(crate) fn command() -> Command {
    let manifest = Arg::new("manifest")
        .long("manifest")
        .short('m')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Schema manifest (.json, .yaml or .yml)");

    Command::new("blocksmith")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract, repair and validate model-generated content blocks")
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("check-manifest")
                .about("Load a manifest and report every structural problem")
                .arg(manifest.clone()),
        )
        .subcommand(
            Command::new("repair")
                .about("Run a saved model reply through extraction, repair and validation")
                .arg(manifest.clone())
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File holding the raw reply text"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_parser(value_parser!(PathBuf))
                        .help("Pipeline config (TOML)"),
                )
                .arg(
                    Arg::new("select")
                        .long("select")
                        .value_delimiter(',')
                        .help("Optional block types to keep, comma separated"),
                )
                .arg(
                    Arg::new("topic")
                        .long("topic")
                        .default_value("saved reply")
                        .help("Topic recorded on the request"),
                )
                .arg(
                    Arg::new("keywords")
                        .long("keywords")
                        .value_delimiter(',')
                        .default_value("offline")
                        .help("Keywords recorded on the request, comma separated"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducible keys and selections"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the blocks as JSON"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a stored block list against a manifest")
                .arg(manifest)
                .arg(
                    Arg::new("document")
                        .long("document")
                        .short('d')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file with a block array or a contentBlocks object"),
                ),
        )
}

fn path(args: &ArgMatches, id: &str) -> PathBuf {
    args.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}

fn list(args: &ArgMatches, id: &str) -> Vec<String> {
    args.get_many::<String>(id)
        .map(|values| values.filter(|v| !v.trim().is_empty()).cloned().collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub(crate) struct CheckManifestArgs {
    pub(crate) manifest: PathBuf,
}

impl From<&ArgMatches> for CheckManifestArgs {
    fn from(args: &ArgMatches) -> Self {
        Self {
            manifest: path(args, "manifest"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RepairArgs {
    pub(crate) manifest: PathBuf,
    pub(crate) input: PathBuf,
    pub(crate) config: Option<PathBuf>,
    pub(crate) select: Vec<String>,
    pub(crate) topic: String,
    pub(crate) keywords: Vec<String>,
    pub(crate) seed: Option<u64>,
    pub(crate) json: bool,
}

impl From<&ArgMatches> for RepairArgs {
    fn from(args: &ArgMatches) -> Self {
        Self {
            manifest: path(args, "manifest"),
            input: path(args, "input"),
            config: args.get_one::<PathBuf>("config").cloned(),
            select: list(args, "select"),
            topic: args.get_one::<String>("topic").cloned().unwrap_or_default(),
            keywords: list(args, "keywords"),
            seed: args.get_one::<u64>("seed").copied(),
            json: args.get_flag("json"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ValidateArgs {
    pub(crate) manifest: PathBuf,
    pub(crate) document: PathBuf,
}

impl From<&ArgMatches> for ValidateArgs {
    fn from(args: &ArgMatches) -> Self {
        Self {
            manifest: path(args, "manifest"),
            document: path(args, "document"),
        }
    }
}
