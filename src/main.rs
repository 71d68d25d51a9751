use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use thumbnailer::cli::{Args, load_options, run_batch};
use thumbnailer::{Ffmpeg, MediaOperations, Mode, Options, server};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(options: &Options) {
    let default_level = if options.quiet {
        "thumbnailer=warn,tower_http=warn"
    } else if options.verbose {
        "thumbnailer=debug,tower_http=debug"
    } else {
        "thumbnailer=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let options = match load_options(&args) {
        Ok(options) => Arc::new(options),
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&options);
    if let Err(err) = color_eyre::install() {
        tracing::warn!(error = %err, "could not install error report handler");
    }

    let media: Arc<dyn MediaOperations> =
        Arc::new(Ffmpeg::new(options.ffmpeg.clone(), options.ffprobe.clone()));
    let result = match options.mode {
        Mode::Cli => run_batch(options, media).await,
        Mode::Http => server::serve(options, media).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
