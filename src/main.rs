use anyhow::Result;
use clap::Parser;
use stylepatch::cli::{AppContext, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Analyze(args) => stylepatch::core::analyze_run(args, &ctx),
        Commands::Patch(args) => stylepatch::core::patch_run(args, &ctx),
        Commands::Scan(args) => stylepatch::core::scan_run(args, &ctx),
        Commands::Tickets(args) => stylepatch::ingest::tickets_run(args, &ctx),
        Commands::ExportCommits(args) => stylepatch::ingest::export_run(args, &ctx),
        Commands::Serve(args) => serve(args),
        Commands::Init(args) => stylepatch::infra::config_init(args, &ctx),
        Commands::Completions(args) => stylepatch::completion::run(args, &ctx),
    }
}

/// Spin up a runtime for the service; every other command stays synchronous.
fn serve(args: stylepatch::cli::ServeArgs) -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(stylepatch::service::start(args))
}
