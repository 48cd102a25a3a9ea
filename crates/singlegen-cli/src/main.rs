use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use singlegen_core::{
    ChainHazard, GenerationConfig, Generator, Job, Stage, StageSet, SubstitutionTable, VerifyReport,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("singlegen")
        .version(singlegen_core::VERSION)
        .about("Generate the single-precision source tree from the double-precision one")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Source root the job paths are relative to"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("TOML file describing jobs (default: built-in jpower job)"),
        )
        .arg(
            Arg::new("job")
                .long("job")
                .global(true)
                .help("Job to run (default: every configured job)"),
        )
        .arg(
            Arg::new("stage")
                .long("stage")
                .action(ArgAction::Append)
                .value_parser(["copy", "rename", "substitute"])
                .global(true)
                .help("Run only the given stage; repeatable"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Output as JSON"),
        )
        .subcommand(
            Command::new("generate")
                .about("Copy, rename and rewrite (default when no subcommand is given)"),
        )
        .subcommand(
            Command::new("verify").about("Check a generated tree for leftover prefixes and patterns"),
        )
        .subcommand(Command::new("table").about("Print the substitution table and ordering hazards"))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<GenerationConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => GenerationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GenerationConfig::default(),
    };
    if let Some(root) = matches.get_one::<PathBuf>("root") {
        config = config.with_root(root);
    }
    tracing::info!("{} job(s) under {}", config.jobs.len(), config.root.display());
    Ok(config)
}

/// Jobs selected by `--job`, or all of them
fn selected_jobs<'a>(generator: &'a Generator, matches: &ArgMatches) -> Result<Vec<&'a Job>> {
    match matches.get_one::<String>("job") {
        Some(name) => Ok(vec![generator.job(name)?]),
        None => Ok(generator.config().jobs.iter().collect()),
    }
}

fn generate(args: &ArgMatches) -> Result<i32> {
    let stages: StageSet = match args.get_many::<String>("stage") {
        Some(values) => values
            .map(|v| v.parse::<Stage>().map_err(anyhow::Error::msg))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .collect(),
        None => StageSet::all(),
    };
    let json = args.get_flag("json");

    let generator = Generator::new(load_config(args)?).with_stages(stages);
    let mut reports = Vec::new();
    for job in selected_jobs(&generator, args)? {
        let report = generator
            .run(job)
            .with_context(|| format!("job '{}' failed", job.name))?;
        if !json {
            println!("{}", report.generate_text());
        }
        reports.push(report);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(0)
}

fn verify(args: &ArgMatches) -> Result<i32> {
    let generator = Generator::new(load_config(args)?);
    let mut reports = Vec::new();
    for job in selected_jobs(&generator, args)? {
        reports.push(generator.verify(job)?);
    }

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report.generate_text());
        }
    }
    Ok(if reports.iter().all(VerifyReport::passed) { 0 } else { 1 })
}

#[derive(Serialize)]
struct TableListing<'a> {
    job: &'a str,
    table: &'a SubstitutionTable,
    hazards: Vec<ChainHazard>,
}

fn table(args: &ArgMatches) -> Result<i32> {
    let generator = Generator::new(load_config(args)?);
    let jobs = selected_jobs(&generator, args)?;

    if args.get_flag("json") {
        let listings: Vec<_> = jobs
            .iter()
            .map(|job| TableListing {
                job: &job.name,
                table: &job.table,
                hazards: job.table.chain_hazards(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(0);
    }

    for job in jobs {
        println!("Job: {} ({} -> {})", job.name, job.source, job.target);
        println!("  Files: {}* -> {}*", job.prefix.source, job.prefix.target);
        for (i, (from, to)) in job.table.iter().enumerate() {
            println!("  #{i} {from} -> {to}");
        }
        let hazards = job.table.chain_hazards();
        if hazards.is_empty() {
            println!("  Ordering hazards: none");
        }
        for hazard in hazards {
            println!("  Hazard: {hazard}");
        }
    }
    Ok(0)
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    // Global options are propagated into the subcommand's matches
    let args = matches.subcommand().map_or(&matches, |(_, sub)| sub);
    init_logging(args.get_count("verbose"));

    let code = match matches.subcommand_name() {
        Some("verify") => verify(args)?,
        Some("table") => table(args)?,
        _ => generate(args)?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
