// SPDX-License-Identifier: MPL-2.0
use pico_args::Arguments;
use polyglot_player::catalog::{CatalogClient, MediaEndpoints};
use polyglot_player::config::{self, Config};
use polyglot_player::domain::media::{AudioSelection, LanguageCode, MediaId, MediaItem};
use polyglot_player::error::{PlaybackError, Result};
use polyglot_player::infrastructure::HeadlessBackend;
use polyglot_player::video_player::{LoadRequest, PlaybackSynchronizer};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
polyglot-player

USAGE:
  polyglot-player list [--server URL] [--config PATH]
  polyglot-player play <ID> [--subtitles LANG] [--audio LANG|original]
                            [--server URL] [--config PATH]

COMMANDS:
  list    Print the video catalog
  play    Dry-run a playback session against the headless engine

OPTIONS:
  --server URL      Media server (default from settings, else http://localhost:8080)
  --config PATH     Settings file to use instead of the platform default
  -h, --help        Print this help
";

enum Command {
    List,
    Play {
        id: MediaId,
        subtitles: Option<String>,
        audio: AudioSelection,
    },
    Help,
}

struct Flags {
    server: Option<String>,
    config_path: Option<PathBuf>,
    command: Command,
}

fn parse_flags() -> std::result::Result<Flags, pico_args::Error> {
    let mut args = Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(Flags {
            server: None,
            config_path: None,
            command: Command::Help,
        });
    }

    let subcommand = args.subcommand()?;
    let server = args.opt_value_from_str("--server")?;
    let config_path = args.opt_value_from_str("--config")?;
    let subtitles = args.opt_value_from_str("--subtitles")?;
    let audio: Option<AudioSelection> = args.opt_value_from_str("--audio")?;

    let command = match subcommand.as_deref() {
        Some("list") => Command::List,
        Some("play") => Command::Play {
            id: MediaId(args.free_from_str()?),
            subtitles,
            audio: audio.unwrap_or_default(),
        },
        _ => Command::Help,
    };

    let unused = args.finish();
    if !unused.is_empty() {
        tracing::warn!(?unused, "ignoring unused arguments");
    }

    Ok(Flags {
        server,
        config_path,
        command,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("polyglot_player=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let flags = match parse_flags() {
        Ok(flags) => flags,
        Err(err) => {
            eprintln!("error: {err}\n\n{HELP}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: cannot start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(flags)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(flags: Flags) -> Result<()> {
    if let Command::Help = flags.command {
        print!("{HELP}");
        return Ok(());
    }

    let mut config = match &flags.config_path {
        Some(path) => config::load_from_path(path)?,
        None => config::load()?,
    };
    if let Some(server) = flags.server {
        config.server_url = Some(server);
    }
    let client = CatalogClient::new(MediaEndpoints::new(config.server_url()))?;

    match flags.command {
        Command::List => list(&client).await,
        Command::Play {
            id,
            subtitles,
            audio,
        } => {
            let item = client.fetch_media_item(id).await?;
            play(&config, item, subtitles.as_deref(), audio).await
        }
        Command::Help => Ok(()),
    }
}

fn join_codes(codes: &[LanguageCode]) -> String {
    if codes.is_empty() {
        return "-".to_string();
    }
    codes
        .iter()
        .map(LanguageCode::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

async fn list(client: &CatalogClient) -> Result<()> {
    let items = client.fetch_media_items().await?;
    if items.is_empty() {
        println!("No videos available.");
        return Ok(());
    }
    for item in &items {
        println!(
            "{:>5}  {:<40}  {:>8}  subtitles: {:<16}  audio: {}",
            item.id,
            item.title,
            item.formatted_duration(),
            join_codes(&item.subtitle_languages),
            join_codes(&item.audio_languages),
        );
    }
    Ok(())
}

async fn play(
    config: &Config,
    item: MediaItem,
    subtitles: Option<&str>,
    audio: AudioSelection,
) -> Result<()> {
    let subtitle_language = match subtitles {
        Some(raw) => LanguageCode::new(raw)?,
        None => config::resolve_subtitle_language(None, config, &item)
            .ok_or(PlaybackError::MissingSelection)?,
    };

    let backend = HeadlessBackend::ready();
    let recorder = backend.recorder().clone();
    let mut player =
        PlaybackSynchronizer::from_config(config, backend.provider(), backend.audio_factory());

    let request = LoadRequest::new(item)
        .with_subtitles(subtitle_language)
        .with_audio(audio);
    player.load(request).await?;

    recorder.play();
    let notices = player.process_pending();

    if let Some(session) = player.session() {
        println!("{} \"{}\"", session.id(), session.item().title);
        println!("  state:     {}", session.state());
        if let Some(engine) = recorder.current_engine() {
            if let Some(source) = &engine.source {
                println!("  video:     {} ({})", source.url, source.mime_type);
            }
            if let Some(track) = engine.showing_track() {
                println!("  subtitles: {} [{}]", track.url, track.label);
            }
            println!("  muted:     {}", engine.muted);
        }
        match session.audio_source() {
            Some(url) => println!("  audio:     {url}"),
            None => println!("  audio:     original"),
        }
    }
    for notice in &notices {
        println!("  notice:    {notice}");
    }

    player.stop();
    println!(
        "stopped: {} live engines, {} live audio elements, {} log entries",
        recorder.live_engines(),
        recorder.live_audio(),
        player.log().len()
    );
    Ok(())
}
