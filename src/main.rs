use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_page_fetcher::comments::CommentRecord;
use catalog_page_fetcher::config::{parse_key_value, AppConfig, CliConfig, FileConfig};
use catalog_page_fetcher::fetcher::{Aggregate, FetchOutcome, FetchReport, FetchSession};
use catalog_page_fetcher::resources::{
    ArtistRecord, CountryRecord, FavoriteSongRecord, GenreRecord, Resource, SongRecord,
    TribeRecord, UserRecord,
};
use catalog_page_fetcher::{CatalogClient, CommentIndex, ProgressStream, VotesState};

mod cli_style;
use cli_style::{get_styles, print_error, print_key_value, print_success, print_warning, TableBuilder};

#[derive(Parser, Debug)]
#[command(name = "catalog-fetch")]
#[command(about = "Fetch every page of a catalog resource")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH")))]
#[command(styles = get_styles())]
struct CliArgs {
    /// Path to a TOML config file. Its values take precedence over flags.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the catalog API, e.g. http://localhost:8080
    #[clap(long)]
    pub base_url: Option<String>,

    /// Bearer token sent with every request.
    #[clap(long)]
    pub token: Option<String>,

    /// Number of items requested per page.
    #[clap(long)]
    pub page_size: Option<u32>,

    /// Maximum number of page requests in flight at once.
    #[clap(long)]
    pub max_concurrent: Option<usize>,

    /// Per-request timeout in seconds. No timeout when omitted.
    #[clap(long)]
    pub timeout_sec: Option<u64>,

    /// Extra request header, can be repeated.
    #[clap(long = "header", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,

    /// Extra query parameter sent with every page, can be repeated.
    #[clap(long = "query", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub query_params: Vec<(String, String)>,

    /// Print the result as JSON instead of a table.
    #[clap(long)]
    pub json: bool,

    #[command(subcommand)]
    pub resource: ResourceCommand,
}

#[derive(Subcommand, Debug)]
enum ResourceCommand {
    Songs,
    Artists,
    Genres,
    Tribes,
    Countries,
    Users,
    /// Fetches all comments and indexes them by user and song.
    Comments {
        #[clap(long)]
        user: Option<i64>,
        #[clap(long)]
        song: Option<i64>,
    },
    /// Fetches the votes cast by a user.
    Votes { user: i64 },
    /// Fetches the songs a user marked as favorite.
    Favorites { user: i64 },
}

impl CliArgs {
    fn cli_config(&self) -> CliConfig {
        CliConfig {
            base_url: self.base_url.clone(),
            auth_token: self.token.clone(),
            page_size: self.page_size,
            max_concurrent_requests: self.max_concurrent,
            request_timeout_sec: self.timeout_sec,
            headers: self.headers.iter().cloned().collect(),
            query_params: self.query_params.iter().cloned().collect(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli_args = CliArgs::parse();

    if let Err(e) = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli_args).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli_args: CliArgs) -> Result<()> {
    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.cli_config(), file_config)?;
    info!(
        "Fetching from {} (page size {}, {} concurrent requests)",
        config.base_url, config.page_size, config.max_concurrent_requests
    );

    let client = CatalogClient::new(&config.client_config())
        .context("Failed to build the catalog client")?;
    let json = cli_args.json;

    match cli_args.resource {
        ResourceCommand::Songs => {
            let (session, progress) = client.songs()?;
            let outcome = fetch::<_, Vec<SongRecord>>(session, progress, json).await?;
            print_records(&outcome, json)?;
        }
        ResourceCommand::Artists => {
            let (session, progress) = client.artists()?;
            let outcome = fetch::<_, Vec<ArtistRecord>>(session, progress, json).await?;
            print_records(&outcome, json)?;
        }
        ResourceCommand::Genres => {
            let (session, progress) = client.genres()?;
            let outcome = fetch::<_, Vec<GenreRecord>>(session, progress, json).await?;
            print_records(&outcome, json)?;
        }
        ResourceCommand::Tribes => {
            let (session, progress) = client.tribes()?;
            let outcome = fetch::<_, Vec<TribeRecord>>(session, progress, json).await?;
            print_records(&outcome, json)?;
        }
        ResourceCommand::Countries => {
            let (session, progress) = client.countries()?;
            let outcome = fetch::<_, Vec<CountryRecord>>(session, progress, json).await?;
            print_records(&outcome, json)?;
        }
        ResourceCommand::Users => {
            let (session, progress) = client.users()?;
            let outcome = fetch::<_, Vec<UserRecord>>(session, progress, json).await?;
            print_records(&outcome, json)?;
        }
        ResourceCommand::Favorites { user } => {
            let (session, progress) = client.favorites_by_user(user)?;
            let outcome = fetch::<_, Vec<FavoriteSongRecord>>(session, progress, json).await?;
            print_records(&outcome, json)?;
        }
        ResourceCommand::Comments { user, song } => {
            let (session, progress) = client.comments()?;
            let outcome = fetch::<_, CommentIndex>(session, progress, json).await?;
            print_comments(&outcome, user, song, json)?;
        }
        ResourceCommand::Votes { user } => {
            let (session, progress) = client.votes_by_user(user)?;
            let outcome = fetch::<_, VotesState>(session, progress, json).await?;
            print_votes(&outcome, json)?;
        }
    }

    Ok(())
}

/// Runs a session while rendering its progress. Ctrl-C cancels the session.
async fn fetch<R, A>(
    session: FetchSession<R>,
    progress: ProgressStream,
    quiet: bool,
) -> Result<FetchOutcome<A>>
where
    R: Resource,
    A: Aggregate<R::Record> + Default,
{
    let cancel = session.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} pages")?
                .progress_chars("=> "),
        );
        bar.set_message(R::NAME);
        bar
    };

    let (result, _) = tokio::join!(session.run::<A>(), render_progress(progress, bar.clone()));
    ctrl_c.abort();
    bar.finish_and_clear();

    result.with_context(|| format!("Failed to fetch {}", R::NAME))
}

async fn render_progress(mut progress: ProgressStream, bar: ProgressBar) {
    while let Some(event) = progress.next().await {
        bar.set_length(event.total as u64);
        bar.set_position(event.current as u64);
    }
}

fn print_report(report: &FetchReport) {
    print_key_value("Pages", &format!("{}/{}", report.pages_fetched, report.total_pages));
    print_key_value("Total elements", &report.total_elements.to_string());
    print_key_value("Batches", &report.batches.to_string());
    for failure in &report.failed_pages {
        print_warning(&format!("Page {} skipped: {}", failure.page, failure.error));
    }
    if report.is_complete() {
        print_success("All pages fetched");
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// How a record is shown in the summary table.
trait TableRow {
    const HEADERS: &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl TableRow for SongRecord {
    const HEADERS: &'static [&'static str] = &["ID", "Title", "Artist", "Genre", "Up", "Down"];
    fn cells(&self) -> Vec<String> {
        vec![
            self.song_id.to_string(),
            self.title.clone(),
            opt(&self.artist_name),
            opt(&self.genre_name),
            self.upvotes.to_string(),
            self.downvotes.to_string(),
        ]
    }
}

impl TableRow for ArtistRecord {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Country", "Tribe"];
    fn cells(&self) -> Vec<String> {
        vec![
            opt(&self.artist_id),
            self.name.clone(),
            opt(&self.country_name),
            opt(&self.tribe_name),
        ]
    }
}

impl TableRow for GenreRecord {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Description"];
    fn cells(&self) -> Vec<String> {
        vec![opt(&self.genre_id), self.name.clone(), opt(&self.description)]
    }
}

impl TableRow for TribeRecord {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Country"];
    fn cells(&self) -> Vec<String> {
        vec![opt(&self.tribe_id), self.name.clone(), opt(&self.country_name)]
    }
}

impl TableRow for CountryRecord {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Code"];
    fn cells(&self) -> Vec<String> {
        vec![opt(&self.country_id), self.name.clone(), opt(&self.code)]
    }
}

impl TableRow for UserRecord {
    const HEADERS: &'static [&'static str] = &["ID", "Username", "Name", "Role"];
    fn cells(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.username.clone(),
            opt(&self.full_name),
            opt(&self.role),
        ]
    }
}

impl TableRow for FavoriteSongRecord {
    const HEADERS: &'static [&'static str] = &["Favorite", "Song", "Title", "Since"];
    fn cells(&self) -> Vec<String> {
        let song = self.song.as_ref();
        vec![
            opt(&self.favorite_id),
            song.map(|s| s.song_id.to_string()).unwrap_or_default(),
            song.map(|s| s.title.clone()).unwrap_or_default(),
            opt(&self.favorited_at),
        ]
    }
}

impl TableRow for CommentRecord {
    const HEADERS: &'static [&'static str] = &["ID", "User", "Song", "Comment"];
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.user.username.clone(),
            self.song.title.clone(),
            self.content.clone(),
        ]
    }
}

fn print_table<'a, T: TableRow + 'a>(rows: impl IntoIterator<Item = &'a T>) {
    let mut table = TableBuilder::new(T::HEADERS.to_vec());
    for row in rows {
        table.add_row(row.cells());
    }
    if table.is_empty() {
        print_warning("No items");
    } else {
        table.print();
    }
}

fn print_records<T: TableRow + Serialize>(outcome: &FetchOutcome<Vec<T>>, json: bool) -> Result<()> {
    if json {
        return print_json(&outcome.data);
    }
    print_table(&outcome.data);
    print_report(&outcome.report);
    Ok(())
}

fn print_comments(
    outcome: &FetchOutcome<CommentIndex>,
    user: Option<i64>,
    song: Option<i64>,
    json: bool,
) -> Result<()> {
    let index = &outcome.data;
    let selected: &[Arc<CommentRecord>] = match (user, song) {
        (Some(user), Some(song)) => index.user_comments_on_song(user, song),
        (Some(user), None) => index.comments_by_user(user),
        (None, Some(song)) => index.comments_by_song(song),
        (None, None) => index.all_comments(),
    };

    if json {
        let comments: Vec<&CommentRecord> = selected.iter().map(|c| &**c).collect();
        return print_json(&comments);
    }

    print_table(selected.iter().map(|c| &**c));
    print_key_value("Comments", &index.len().to_string());
    print_key_value("Commenters", &index.user_count().to_string());
    print_key_value("Songs commented", &index.song_count().to_string());
    print_report(&outcome.report);
    Ok(())
}

fn print_votes(outcome: &FetchOutcome<VotesState>, json: bool) -> Result<()> {
    let votes: BTreeMap<_, _> = outcome.data.as_map().iter().map(|(k, v)| (*k, *v)).collect();

    if json {
        return print_json(&votes);
    }

    let mut table = TableBuilder::new(vec!["Song", "Vote"]);
    for (song_id, vote) in &votes {
        let vote = vote.map(|v| v.as_str()).unwrap_or("-");
        table.add_row(vec![song_id.to_string(), vote.to_string()]);
    }
    if table.is_empty() {
        print_warning("No votes");
    } else {
        table.print();
    }
    print_report(&outcome.report);
    Ok(())
}
