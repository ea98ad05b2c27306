use anyhow::{Context, Result, bail};
use clap::Parser;
use katha::cli::{Cli, Commands, ConfigAction};
use katha::config::Config;
use katha::dataset::DatasetMirror;
use katha::output;
use katha::pipeline::runner::run_pipeline;
use katha::service::{ServiceServer, TranscribeHandler};
use katha::stt::recognizer::SpeechToText;
use katha::stt::remote::RemoteRecognizer;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Transcribe {
            input,
            output,
            chunk_length,
            overlap,
            workers,
        } => run_transcribe(config, input, output, chunk_length, overlap, workers).await,
        Commands::Serve { socket, output_dir } => run_serve(config, socket, output_dir).await,
        Commands::FetchDataset {
            url,
            cache,
            max_age,
        } => run_fetch_dataset(config, url, cache, max_age).await,
        Commands::Config { action } => {
            match action {
                ConfigAction::Path => {
                    let path = cli.config.unwrap_or_else(Config::default_path);
                    println!("{}", path.display());
                }
                ConfigAction::Show => {
                    println!("{}", toml::to_string_pretty(&config)?);
                }
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    Ok(config)
}

fn recognizer_from(config: &Config) -> Arc<dyn SpeechToText> {
    Arc::new(RemoteRecognizer::new(
        &config.stt.endpoint,
        config.stt.language.as_deref(),
    ))
}

async fn run_transcribe(
    config: Config,
    input: PathBuf,
    output: Option<PathBuf>,
    chunk_length: Option<u64>,
    overlap: Option<u64>,
    workers: Option<usize>,
) -> Result<()> {
    let mut pipeline = config.pipeline_config();
    if let Some(chunk_length_ms) = chunk_length {
        pipeline.chunk_length_ms = chunk_length_ms;
    }
    if let Some(overlap_ms) = overlap {
        pipeline.overlap_ms = overlap_ms;
    }
    if let Some(worker_count) = workers {
        pipeline.worker_count = worker_count;
    }
    pipeline.persist_to = output;

    let recognizer = recognizer_from(&config);
    let result =
        tokio::task::spawn_blocking(move || run_pipeline(&input, recognizer, &pipeline))
            .await
            .context("transcription task failed")??;

    output::print_transcript(&result.transcript);
    if let Some(persist_error) = result.persist_error {
        eprintln!("{}", format!("warning: {persist_error}").yellow());
    }
    Ok(())
}

async fn run_serve(
    config: Config,
    socket: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let recognizer = recognizer_from(&config);
    let handler = TranscribeHandler::new(
        recognizer,
        output_dir.unwrap_or_else(|| config.service.output_dir.clone()),
        config.pipeline_config(),
        config.service.max_upload_bytes,
    )?;

    let socket_path = socket
        .or_else(|| config.service.socket.clone())
        .unwrap_or_else(ServiceServer::default_socket_path);
    let server = Arc::new(ServiceServer::new(socket_path));

    let server_task = {
        let server = Arc::clone(&server);
        tokio::spawn(async move { server.start(handler).await })
    };

    eprintln!(
        "{}",
        format!("katha: listening on {}", server.socket_path().display()).green()
    );
    tokio::signal::ctrl_c()
        .await
        .context("failed to wait for shutdown signal")?;

    server.stop();
    server_task.await.context("server task failed")??;
    Ok(())
}

async fn run_fetch_dataset(
    config: Config,
    url: Option<String>,
    cache: Option<PathBuf>,
    max_age: Option<u64>,
) -> Result<()> {
    let Some(url) = url.or_else(|| config.dataset.url.clone()) else {
        bail!("no dataset URL given; pass --url or set [dataset].url in the config");
    };
    let cache_path = cache.unwrap_or_else(|| config.dataset.cache_file.clone());
    let max_age_secs = max_age.unwrap_or(config.dataset.max_age_secs);

    let mirror = DatasetMirror::new(&url, cache_path, Duration::from_secs(max_age_secs));
    let path = mirror.fetch(true).await?;
    println!("{}", path.display());
    Ok(())
}
