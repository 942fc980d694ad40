//! Lightbox CLI entry point.

use clap::Parser;
use env_logger::Env;

use lightbox_cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Render {
            session,
            layer,
            output,
        } => commands::render_session(&session, layer, &output),
        Commands::Filter {
            image,
            mode,
            threshold,
            grayscale,
            output,
        } => commands::filter_image(&image, mode, threshold, grayscale, &output),
        Commands::Info { session } => {
            commands::print_session(&session, &mut std::io::stdout().lock())
        }
    }
}
