//! incident-map CLI: fetch the report feed and render the map page.

use clap::{Parser, Subcommand};
use incident_map::{render_all, ReportSource, SourceConfig};
use incident_map_page::{LeafletPage, PageConfig};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();
    let cli = Cli::parse();
    match cli.command {
        Command::Render(args) => run_render(args),
        Command::Fetch(args) => run_fetch(args),
    }
}

#[derive(Parser)]
#[command(name = "incident-map")]
#[command(about = "Render incident reports as severity-coded markers on a map page")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the report feed and write a static map page.
    Render(RenderArgs),
    /// Fetch the report feed and print it as JSON.
    Fetch(FetchArgs),
}

#[derive(Parser)]
struct RenderArgs {
    /// Base URL of the service exposing /api/reports.
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    url: String,
    /// Output path of the generated page.
    #[arg(long, default_value = "./map.html")]
    out: PathBuf,
    #[arg(long, default_value = "Incident Map")]
    title: String,
    /// Base path popup images are resolved against.
    #[arg(long, default_value = "/static/uploads")]
    uploads_base: String,
    /// Destination of the popup status-lookup link.
    #[arg(long, default_value = "/status")]
    status_page: String,
}

#[derive(Parser)]
struct FetchArgs {
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    url: String,
    #[arg(long)]
    pretty: bool,
}

fn run_render(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = ReportSource::new(SourceConfig {
        base_url: args.url,
    })?;
    let rt = tokio::runtime::Runtime::new()?;
    // One fetch per render cycle; a feed failure is terminal and no page
    // is written.
    let reports = rt.block_on(source.fetch_reports())?;

    let mut page = LeafletPage::new(PageConfig {
        title: args.title,
        uploads_base: args.uploads_base,
        status_page: args.status_page,
        ..PageConfig::default()
    });
    let placed = render_all(&reports, &mut page);
    page.render_page(&args.out)?;
    info!(out = %args.out.display(), total = reports.len(), placed, "map page written");
    println!("{}", args.out.display());
    Ok(())
}

fn run_fetch(args: FetchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = ReportSource::new(SourceConfig {
        base_url: args.url,
    })?;
    let rt = tokio::runtime::Runtime::new()?;
    let reports = rt.block_on(source.fetch_reports())?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{}", json);
    Ok(())
}
