use anyhow::{anyhow, Result};
use clap::{App, Arg, ArgMatches};
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};
use std::process;

use sitebuilder::build::build_site;
use sitebuilder::collection::FeedOrder;
use sitebuilder::config::{Config, Overrides, SiteFile};

fn main() {
    let matches = app().get_matches();

    // A bare invocation exits quietly.
    let source = match matches.value_of_os("SOURCE") {
        Some(source) => PathBuf::from(source),
        None => process::exit(1),
    };

    init_logging(matches.is_present("verbose"));

    let config = match config(source, &matches) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    };

    match build_site(&config) {
        Ok(report) => info!(
            "built {} pages and {} feeds",
            report.pages.len(),
            report.feeds.len()
        ),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

fn app() -> App<'static, 'static> {
    App::new("sitebuilder")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds a static blog from a directory of markdown entries")
        .arg(
            Arg::with_name("SOURCE")
                .help("The directory holding the `.md` entries")
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .takes_value(true)
                .help("The output directory (default: the current directory)"),
        )
        .arg(
            Arg::with_name("css")
                .long("css")
                .takes_value(true)
                .help("The stylesheet href for every page"),
        )
        .arg(
            Arg::with_name("template")
                .long("template")
                .takes_value(true)
                .help("A custom page layout (default: the built-in layout)"),
        )
        .arg(
            Arg::with_name("about")
                .long("about")
                .takes_value(true)
                .help("A markdown file for the about page"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .takes_value(true)
                .help("A YAML site file with name, url, author, email, css, and feed_order"),
        )
        .arg(Arg::with_name("name").long("name").takes_value(true).help("The site name"))
        .arg(
            Arg::with_name("url")
                .long("url")
                .takes_value(true)
                .help("The absolute base URL of the published output directory"),
        )
        .arg(
            Arg::with_name("author")
                .long("author")
                .takes_value(true)
                .help("The author credited in feeds"),
        )
        .arg(
            Arg::with_name("email")
                .long("email")
                .takes_value(true)
                .help("The author's email address"),
        )
        .arg(
            Arg::with_name("feed-order")
                .long("feed-order")
                .takes_value(true)
                .possible_values(&["newest", "oldest"])
                .help("The order of feed items (default: newest)"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .help("Enables debug logging"),
        )
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Initializing logger: {}", e);
    }
}

fn config(source: PathBuf, matches: &ArgMatches) -> Result<Config> {
    let path = |name: &str| matches.value_of_os(name).map(PathBuf::from);
    let string = |name: &str| matches.value_of(name).map(String::from);

    let file = match matches.value_of_os("config") {
        Some(path) => SiteFile::from_path(Path::new(path))?,
        None => SiteFile::default(),
    };
    let feed_order = match matches.value_of("feed-order") {
        Some(order) => Some(order.parse::<FeedOrder>().map_err(|e| anyhow!(e))?),
        None => None,
    };

    Config::new(
        source,
        Overrides {
            output_directory: path("output"),
            template: path("template"),
            about: path("about"),
            css: string("css"),
            name: string("name"),
            url: string("url"),
            author: string("author"),
            email: string("email"),
            feed_order,
        },
        file,
    )
}
