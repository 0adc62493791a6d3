mod logging;

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use termvid_convert::{AsciiConverter, FfmpegTools, RenderReport, Renderer};
use termvid_core::config::{Config, Resolution};
use termvid_core::error::IoContext;
use termvid_play::{terminal, Player, TerminalSession};

#[derive(Parser)]
#[command(name = "termvid", about = "Render a video to ASCII frames and play them in the terminal")]
struct Cli {
    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    /// TOML config file (defaults are used for anything it leaves out)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a video into numbered text frames
    Render {
        #[arg(long)]
        input: PathBuf,
    },
    /// Play previously rendered frames
    Play,
    /// Render, then play
    Start {
        #[arg(long)]
        input: PathBuf,
    },
}

/// Flags that win over the config file.
#[derive(Args)]
struct Overrides {
    /// Output size preset: 1080, 720, 480, 360, 240, 120 or 60
    #[arg(long, global = true)]
    resolution: Option<Resolution>,

    /// Sampling and playback rate
    #[arg(long, global = true)]
    fps: Option<u32>,

    /// Length of each processing chunk in seconds
    #[arg(long, global = true)]
    chunk_seconds: Option<u64>,

    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Where text frames are written and read from
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(resolution) = self.resolution {
            config.video.resolution = resolution;
        }
        if let Some(fps) = self.fps {
            config.video.fps = fps;
        }
        if let Some(chunk_seconds) = self.chunk_seconds {
            config.video.chunk_seconds = chunk_seconds;
        }
        if let Some(dir) = &self.cache_dir {
            config.paths.cache_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.paths.output_dir = dir.clone();
        }
    }
}

fn load_config(path: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), &cli.overrides)?;
    log::debug!("{config:?}");

    match &cli.command {
        Command::Render { input } => {
            render(&config, input)?;
        }
        Command::Play => play(&config)?,
        Command::Start { input } => {
            render(&config, input)?;
            play(&config)?;
        }
    }
    Ok(())
}

fn render(config: &Config, input: &Path) -> anyhow::Result<RenderReport> {
    if !input.is_file() {
        bail!("input video {} does not exist", input.display());
    }

    let (cols, rows) = config.frame_size();
    log::info!(
        "rendering {} at {cols}x{rows}, {} fps, {}s chunks",
        input.display(),
        config.video.fps,
        config.video.chunk_seconds
    );

    let mut renderer = Renderer::new(config, FfmpegTools::new(), AsciiConverter::from_config(config));
    let report = renderer
        .render(input)
        .with_context(|| format!("failed to render {}", input.display()))?;

    log::info!(
        "rendered {} frames from {:.1}s of video in {} chunk(s), took {:.2?}",
        report.frames,
        report.duration_seconds,
        report.chunk_count(),
        report.elapsed
    );
    Ok(report)
}

fn play(config: &Config) -> anyhow::Result<()> {
    let cued = Player::from_config(config).cue()?;
    log::info!(
        "{} frames ready in {}",
        cued.total(),
        config.paths.output_dir.display()
    );

    let playback = cued.wait_for_start(&mut io::stdin().lock(), &mut io::stdout())?;
    log::debug!("frame interval {:?}", playback.interval());

    let (cols, rows) = config.frame_size();
    terminal::warn_if_too_small(cols, rows);

    let finished = {
        let _session = TerminalSession::enter().context("failed to set up terminal")?;
        let mut stdout = BufWriter::with_capacity(256 * 1024, io::stdout().lock());
        playback.run(&mut stdout, || {
            terminal::quit_requested().io_context(|| "failed to read terminal input")
        })?
    };

    if finished.interrupted {
        log::info!("stopped at frame {}/{}", finished.shown, finished.total);
    } else {
        log::info!("played {} frames", finished.shown);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["termvid", "render", "--input", "clip.mp4"]).unwrap();
        assert!(matches!(cli.command, Command::Render { ref input } if input == Path::new("clip.mp4")));

        let cli = Cli::try_parse_from(["termvid", "--debug", "play"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Command::Play));

        assert!(Cli::try_parse_from(["termvid", "start"]).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("termvid.toml");
        std::fs::write(&path, "[video]\nresolution = 120\nfps = 10\n").unwrap();

        let cli = Cli::try_parse_from(["termvid", "play", "--fps", "25", "--output-dir", "frames"]).unwrap();
        let config = load_config(Some(&path), &cli.overrides).unwrap();

        assert_eq!(config.video.resolution, Resolution::R120);
        assert_eq!(config.video.fps, 25);
        assert_eq!(config.paths.output_dir, PathBuf::from("frames"));
        assert_eq!(config.video.chunk_seconds, 10);
    }

    #[test]
    fn resolution_flag_accepts_presets_only() {
        let cli = Cli::try_parse_from(["termvid", "--resolution", "720p", "play"]).unwrap();
        assert_eq!(cli.overrides.resolution, Some(Resolution::R720));
        assert!(Cli::try_parse_from(["termvid", "--resolution", "100", "play"]).is_err());
    }

    #[test]
    fn failures_surface_with_their_context() {
        let dir = tempfile::TempDir::new().unwrap();
        let frames = dir.path().join("frames");
        let cli = Cli::try_parse_from(["termvid", "play", "--output-dir", frames.to_str().unwrap()]).unwrap();

        let err = run(&cli).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("no frames found"), "{message}");
        assert!(message.contains("termvid render"), "{message}");

        let cli = Cli::try_parse_from(["termvid", "render", "--input", "missing.mp4"]).unwrap();
        let message = format!("{:#}", run(&cli).unwrap_err());
        assert!(message.contains("missing.mp4"), "{message}");
    }

    #[test]
    fn invalid_overrides_fail_validation() {
        let cli = Cli::try_parse_from(["termvid", "play", "--fps", "0"]).unwrap();
        assert!(load_config(None, &cli.overrides).is_err());
    }
}
