use anyhow::{Context, Result};
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use quire::{build_site, clean, scaffold};
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT_DIRECTORY: &str = "build";

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    if let Err(e) = run(&app().get_matches()) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn app() -> App<'static, 'static> {
    let source = Arg::with_name("SOURCE")
        .help("The root of the site's source tree")
        .default_value(".");
    let output = Arg::with_name("output")
        .short("o")
        .long("output")
        .takes_value(true)
        .value_name("DIR")
        .help("The output directory (defaults to `build` in the source tree)");

    App::new("quire")
        .version(crate_version!())
        .about("Compiles a tree of markdown pages into a static HTML site")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site into the output directory")
                .arg(source.clone())
                .arg(output.clone()),
        )
        .subcommand(
            SubCommand::with_name("clean")
                .about("Removes the output directory")
                .arg(source)
                .arg(output),
        )
        .subcommand(
            SubCommand::with_name("new")
                .about("Creates a new site skeleton")
                .arg(
                    Arg::with_name("PATH")
                        .help("Where to create the site")
                        .required(true),
                ),
        )
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("build", Some(matches)) => {
            let (source, output) = directories(matches);
            build_site(&source, &output).with_context(|| {
                format!(
                    "Building `{}` into `{}`",
                    source.display(),
                    output.display()
                )
            })?;
        }
        ("clean", Some(matches)) => {
            let (_, output) = directories(matches);
            clean(&output).with_context(|| {
                format!("Cleaning `{}`", output.display())
            })?;
        }
        ("new", Some(matches)) => {
            // `PATH` is required, so clap guarantees a value
            if let Some(path) = matches.value_of("PATH") {
                scaffold::new_site(Path::new(path))
                    .with_context(|| format!("Creating site `{}`", path))?;
            }
        }
        _ => unreachable!("clap requires a subcommand"),
    }
    Ok(())
}

fn directories(matches: &ArgMatches) -> (PathBuf, PathBuf) {
    let source = PathBuf::from(matches.value_of("SOURCE").unwrap_or("."));
    let output = match matches.value_of("output") {
        Some(output) => PathBuf::from(output),
        None => source.join(DEFAULT_OUTPUT_DIRECTORY),
    };
    (source, output)
}
