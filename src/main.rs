use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::info;
use std::path::{Path, PathBuf};
use toolsite::build::build_site;
use toolsite::catalog::Catalog;
use toolsite::config::Config;
use toolsite::describe;
use toolsite::listing::CategoryFilter;

fn main() -> Result<()> {
    let project_arg = Arg::with_name("project")
        .short("p")
        .long("project")
        .takes_value(true)
        .value_name("DIR")
        .help("Directory to search (along with its parents) for toolsite.yaml");

    let matches = App::new("toolsite")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds a static site for a directory of static analysis tools")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Logs debug output unless RUST_LOG says otherwise"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site")
                .arg(project_arg.clone())
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .value_name("DIR")
                        .default_value("_site")
                        .help("Output directory"),
                ),
        )
        .subcommand(
            SubCommand::with_name("describe")
                .about("Prints the title, description, and tools of a tag page")
                .arg(project_arg)
                .arg(
                    Arg::with_name("category")
                        .short("c")
                        .long("category")
                        .takes_value(true)
                        .possible_values(&["any", "formatter", "linter"])
                        .default_value("any")
                        .help("Category selection"),
                )
                .arg(
                    Arg::with_name("tag")
                        .required(true)
                        .help("Tag value or slug, e.g. `python`"),
                ),
        )
        .get_matches();

    setup_logging(matches.is_present("verbose"));

    match matches.subcommand() {
        ("build", Some(m)) => build(m),
        ("describe", Some(m)) => describe(m),
        (other, _) => Err(anyhow!("unknown subcommand `{}`", other)),
    }
}

fn setup_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
    // RUST_LOG wins over the default level.
    builder.parse_default_env();
    builder.init();
}

fn project_dir(m: &ArgMatches) -> Result<PathBuf> {
    match m.value_of("project") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => std::env::current_dir().context("Getting the working directory"),
    }
}

fn build(m: &ArgMatches) -> Result<()> {
    let output = Path::new(m.value_of("output").unwrap_or("_site"));
    let config = Config::from_directory(&project_dir(m)?, output)
        .context("Loading configuration")?;
    let summary = build_site(&config).context("Building site")?;
    info!(
        "built {} posts, {} tools, and {} tags into {} pages in `{}`",
        summary.posts,
        summary.tools,
        summary.tags,
        summary.pages,
        output.display()
    );
    Ok(())
}

fn describe(m: &ArgMatches) -> Result<()> {
    // The output directory isn't used when describing.
    let config = Config::from_directory(&project_dir(m)?, Path::new("_site"))
        .context("Loading configuration")?;
    let catalog =
        Catalog::load(&config.data_directory, &config.tags_url, &config.static_url)
            .context("Loading catalog")?;

    let key = m.value_of("tag").unwrap_or_default();
    let selection = CategoryFilter::from(m.value_of("category").unwrap_or("any"));
    for line in describe::describe(&catalog, key, selection)? {
        println!("{}", line);
    }
    Ok(())
}
