//! Command-line host for the movie library.
//!
//! # Responsibility
//! - Resolve configuration from `MOVIELIB_*` variables and flags.
//! - Run one controller operation per invocation and print JSON lines.
//! - Warn when a write lands in an in-memory store that dies with the process.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use movielib_core::db::open_configured;
use movielib_core::{
    init_logging_from_config, DatabaseLocation, DocumentMovieRepository, LibraryConfig, Movie,
    MovieController, MovieRepository, SqliteCollection,
};
use std::io::{self, Write};
use std::path::PathBuf;

const MEMORY_WRITE_WARNING: &str =
    "warning: no --db or MOVIELIB_DB_PATH given; this change is kept in memory and lost on exit";

#[derive(Parser)]
#[command(name = "movielib", about = "Manage a movie library document store", version)]
struct Cli {
    /// SQLite database file (default: in-memory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Collection holding the movies
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every movie
    List,
    /// Print the movie with exactly this title
    Get { title: String },
    /// Print movies whose title contains the fragment
    Search { fragment: String },
    /// Add a movie
    Add(AddArgs),
    /// Delete the movie with exactly this title
    Delete { title: String },
    /// Change the title of an existing movie
    Rename { title: String, new_title: String },
}

impl Command {
    fn is_write(&self) -> bool {
        matches!(self, Self::Add(_) | Self::Delete { .. } | Self::Rename { .. })
    }
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    director: String,
    #[arg(long, default_value_t = 0)]
    year: i32,
    #[arg(long, default_value = "")]
    genre: String,
    /// Running time in minutes
    #[arg(long, default_value_t = 0)]
    duration: i32,
    #[arg(long, default_value_t = 0.0)]
    rating: f64,
}

impl AddArgs {
    fn into_movie(self) -> Movie {
        let mut movie = Movie::new(self.title);
        movie.director = self.director;
        movie.year_released = self.year;
        movie.genre = self.genre;
        movie.duration = self.duration;
        movie.rating = self.rating;
        movie
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base = LibraryConfig::from_env().context("invalid MOVIELIB_* environment")?;
    let config = resolve_config(&cli, base)?;
    init_logging_from_config(&config).context("failed to start logging")?;

    if writes_are_discarded(&config, &cli.command) {
        warn!("event=cli_memory_write module=cli status=warn");
        eprintln!("{MEMORY_WRITE_WARNING}");
    }

    let conn = open_configured(&config).context("failed to open movie database")?;
    let collection = SqliteCollection::<Movie>::try_new(&conn, config.collection.as_str())
        .context("failed to bind movie collection")?;
    info!(
        "event=cli_start module=cli status=ok collection={}",
        collection.name()
    );
    let controller = MovieController::new(DocumentMovieRepository::new(collection));

    run(&controller, cli.command, &mut io::stdout().lock())
}

fn writes_are_discarded(config: &LibraryConfig, command: &Command) -> bool {
    config.database == DatabaseLocation::Memory && command.is_write()
}

/// Layers command-line flags over `base`.
fn resolve_config(cli: &Cli, base: LibraryConfig) -> Result<LibraryConfig> {
    let mut config = base;
    if let Some(path) = &cli.db {
        config = config.with_database_file(path);
    }
    if let Some(name) = &cli.collection {
        config = config.with_collection(name.as_str())?;
    }
    if let Some(level) = &cli.log_level {
        config = config.with_log_level(level)?;
    }
    if let Some(dir) = &cli.log_dir {
        config = config.with_log_dir(dir)?;
    }
    Ok(config)
}

fn run<R: MovieRepository>(
    controller: &MovieController<R>,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::List => print_movies(out, &controller.get_all()?),
        Command::Get { title } => match controller.get_by_title(&title)? {
            Some(movie) => print_movies(out, &[movie]),
            None => {
                eprintln!("no movie titled '{title}'");
                Ok(())
            }
        },
        Command::Search { fragment } => {
            print_movies(out, &controller.search_by_title_fragment(&fragment)?)
        }
        Command::Add(args) => {
            let movie = args.into_movie();
            let id = controller.add(&movie)?;
            info!("event=cli_add module=cli status=ok movie_id={id}");
            print_movies(out, &[movie])
        }
        Command::Delete { title } => {
            controller.delete(&title)?;
            info!("event=cli_delete module=cli status=ok");
            Ok(())
        }
        Command::Rename { title, new_title } => {
            let mut movie = controller
                .get_by_title(&title)?
                .with_context(|| format!("no movie titled '{title}'"))?;
            movie.title = new_title;
            controller.update(&movie)?;
            print_movies(out, &[movie])
        }
    }
}

fn print_movies(out: &mut impl Write, movies: &[Movie]) -> Result<()> {
    for movie in movies {
        writeln!(out, "{}", serde_json::to_string(movie)?)?;
    }
    Ok(())
}
