use std::path::PathBuf;

use clap::{Arg, Command};
use log::info;

use hushcut::error::config_error;
use hushcut::{audio, dependencies, segment, transcribe};
use hushcut::{
    AudioConfig, Config, ConfigBuilder, ConfigFile, HttpTranscriber, ProfanityFilter,
    ProgressOperation, Result,
};

fn build_cli() -> Command {
    Command::new("hushcut")
        .about("Silences profanity in spoken-word audio using a cloud transcription service")
        .version("0.1.0")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Input audio file to process (or AUDIO_INPUT env var)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output WAV file (defaults to <output-dir>/<input>_clean.wav)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output-dir")
                .short('d')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory, created if absent (default: clean_audio)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("Transcription service API key (or TRANSCRIBE_API_KEY env var)"),
        )
        .arg(
            Arg::new("codec")
                .short('b')
                .long("codec")
                .value_name("PATH")
                .help("Codec binary for decoding audio (or CODEC_BINARY_PATH env var, default: ffmpeg)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("words")
                .short('w')
                .long("words")
                .value_name("WORD,WORD,...")
                .help("Custom comma-separated list of words to censor")
                .value_delimiter(','),
        )
        .arg(
            Arg::new("mask")
                .short('m')
                .long("mask")
                .value_name("CHAR")
                .help("Mask character used in censored text (default: *)")
                .value_parser(clap::value_parser!(char)),
        )
        .arg(
            Arg::new("poll-interval")
                .long("poll-interval")
                .value_name("SECONDS")
                .help("Delay between transcription job polls (default: 1.0)")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("max-polls")
                .long("max-polls")
                .value_name("COUNT")
                .help("Give up after this many polls (default: 120)")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (YAML/JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .help("Disable progress indicators")
                .action(clap::ArgAction::SetTrue),
        )
}

/// Build the run configuration from config file, environment, and flags,
/// in that precedence order (later wins)
async fn parse_config(matches: &clap::ArgMatches) -> Result<Config> {
    let input_file = matches
        .get_one::<PathBuf>("input")
        .cloned()
        .or_else(|| std::env::var("AUDIO_INPUT").ok().map(PathBuf::from))
        .ok_or_else(|| config_error("input", "Input file is required (--input or AUDIO_INPUT)"))?;

    let mut builder = ConfigBuilder::new().input_file(input_file);

    let config_file = if let Some(config_path) = matches.get_one::<PathBuf>("config") {
        Some(ConfigFile::load(config_path).await?)
    } else {
        ConfigFile::load_from_default_locations().await
    };

    if let Some(ref cf) = config_file {
        builder = cf.apply_to_builder(builder)?;
    }

    if let Ok(key) = std::env::var("TRANSCRIBE_API_KEY") {
        if !key.is_empty() {
            builder = builder.api_key(key);
        }
    }
    if let Some(key) = matches.get_one::<String>("api-key") {
        builder = builder.api_key(key.clone());
    }

    if let Ok(codec) = std::env::var("CODEC_BINARY_PATH") {
        if !codec.is_empty() {
            builder = builder.codec_binary(PathBuf::from(codec));
        }
    }
    if let Some(codec) = matches.get_one::<PathBuf>("codec") {
        builder = builder.codec_binary(codec.clone());
    }

    if let Some(output) = matches.get_one::<PathBuf>("output") {
        builder = builder.output_file(output.clone());
    }

    if let Some(dir) = matches.get_one::<PathBuf>("output-dir") {
        builder = builder.output_dir(dir.clone());
    }

    if let Some(words) = matches.get_many::<String>("words") {
        let word_list: Vec<String> = words.cloned().collect();
        builder = builder.profanity_words(word_list)?;
    }

    if let Some(&mask) = matches.get_one::<char>("mask") {
        builder = builder.mask_char(mask);
    }

    if let Some(&interval) = matches.get_one::<f64>("poll-interval") {
        builder = builder.poll_interval_secs(interval)?;
    }

    if let Some(&attempts) = matches.get_one::<u32>("max-polls") {
        builder = builder.max_poll_attempts(attempts)?;
    }

    builder.build()
}

async fn run(matches: &clap::ArgMatches) -> Result<()> {
    let config = parse_config(matches).await?;
    let show_progress = !matches.get_flag("no-progress");
    let progress = ProgressOperation::new(show_progress);

    info!(
        "Starting hushcut: {:?} -> {:?}",
        config.input_file,
        config.output_file.as_ref().map(|p| p.display().to_string())
    );

    // Pre-flight: the codec binary must be runnable
    progress
        .with_spinner("Validating codec binary", |_pb| {
            tokio::task::block_in_place(|| {
                tokio::runtime::Handle::current()
                    .block_on(async { dependencies::validate_codec(&config.codec_binary).await })
            })
        })
        .await?;

    // Load and decode the input audio
    let format = AudioConfig::default();
    let audio_buffer = progress
        .with_spinner("Loading input audio", |_pb| {
            tokio::task::block_in_place(|| {
                tokio::runtime::Handle::current().block_on(async {
                    audio::load_audio(&config.input_file, &config.codec_binary, &format).await
                })
            })
        })
        .await?;

    // Transcribe via the external service
    let backend = match config.api_base_url {
        Some(ref url) => HttpTranscriber::with_base_url(&config.api_key, url),
        None => HttpTranscriber::new(&config.api_key),
    };
    let policy = config.polling_policy();
    let mut transcript = progress
        .with_spinner("Transcribing audio", |_pb| {
            tokio::task::block_in_place(|| {
                tokio::runtime::Handle::current().block_on(async {
                    transcribe::transcribe_audio(&backend, &config.input_file, &policy).await
                })
            })
        })
        .await?;
    info!("Transcription complete: {} words", transcript.words.len());

    // Rescale word timestamps onto the audio's true duration
    transcript.normalize_to_duration(audio_buffer.duration_secs())?;

    // Censor text, slice, silence flagged words, reassemble
    let filter = ProfanityFilter::new(config.profanity_words.clone(), config.mask_char);
    let clean_audio = progress
        .with_spinner("Censoring audio", |_pb| {
            segment::censor_audio(&audio_buffer, &transcript, &filter)
        })
        .await?;

    // Export the duration-preserving clean track
    let output_path = config
        .output_file
        .clone()
        .ok_or_else(|| config_error("output_file", "Output path was not derived"))?;
    progress
        .with_spinner("Exporting clean audio", |_pb| {
            audio::export_wav(&clean_audio, &output_path)
        })
        .await?;

    info!("✓ Clean audio file saved to {:?}", output_path);
    Ok(())
}

#[tokio::main]
async fn main() {
    let app = build_cli();
    let matches = app.get_matches();

    // Initialize logging
    if matches.get_flag("verbose") {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    if let Err(e) = run(&matches).await {
        log::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}
