//! flifio: convert images to and from FLIF and inspect FLIF files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use log::LevelFilter;
use serde::Serialize;

use flifio::{Decoder, EncoderConfig, FlifApi, ImageInfo};

#[derive(Parser, Debug)]
#[command(name = "flifio", version, about = "Convert and inspect FLIF images")]
struct Cli {
    /// Log progress (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-encode an image. The output extension picks the codec.
    Convert(ConvertArgs),

    /// Print the frames stored in a FLIF file.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    input: PathBuf,
    output: PathBuf,

    /// JSON encoder configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interlaced (progressive) encoding.
    #[arg(long)]
    interlaced: bool,

    /// MANIAC learning passes.
    #[arg(long)]
    learn_repeat: Option<i64>,

    /// MANIAC split threshold factor (minimum 4).
    #[arg(long)]
    split_threshold_factor: Option<i64>,

    /// Allowed loss in percent (0 = lossless).
    #[arg(long)]
    max_loss: Option<i64>,

    /// Do not store a checksum.
    #[arg(long)]
    no_crc: bool,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    file: PathBuf,

    /// Output as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct FileReport {
    path: String,
    frames: Vec<ImageInfo>,
}

impl ConvertArgs {
    fn encoder_config(&self) -> anyhow::Result<EncoderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                EncoderConfig::from_json(&json)?
            }
            None => EncoderConfig::default(),
        };
        if self.interlaced {
            config = config.with_interlaced(true);
        }
        if self.no_crc {
            config = config.with_crc_check(false);
        }
        if let Some(n) = self.learn_repeat {
            config = config.with_learn_repeat(n);
        }
        if let Some(n) = self.split_threshold_factor {
            config = config.with_split_threshold_factor(n);
        }
        if let Some(n) = self.max_loss {
            config = config.with_max_loss(n);
        }
        Ok(config)
    }
}

fn convert(api: &'static FlifApi, args: ConvertArgs) -> anyhow::Result<()> {
    let config = args.encoder_config()?;
    let frames = flifio::read_images_with(api, &args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    flifio::write_images_with(api, &args.output, &frames, &config)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "{} {} -> {} ({} frame{})",
        "converted".green().bold(),
        args.input.display(),
        args.output.display(),
        frames.len(),
        if frames.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

fn inspect(api: &'static FlifApi, path: &Path) -> anyhow::Result<FileReport> {
    let frames = Decoder::scoped(api, path, |decoder| {
        (0..decoder.num_images()?)
            .map(|i| Ok(decoder.frame(i)?.info()))
            .collect::<Result<Vec<_>, flifio::FlifError>>()
    })?;
    Ok(FileReport {
        path: path.display().to_string(),
        frames,
    })
}

fn info(api: &'static FlifApi, args: InfoArgs) -> anyhow::Result<()> {
    let report = inspect(api, &args.file).with_context(|| format!("inspecting {}", args.file.display()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} ({} frames)", report.path.bold(), report.frames.len());
    for (i, frame) in report.frames.iter().enumerate() {
        println!(
            "  [{}] {}x{}  {} channel(s)  {}-bit{}",
            i.to_string().cyan(),
            frame.width,
            frame.height,
            frame.channels,
            frame.depth,
            if frame.palette_size > 0 {
                format!("  palette {}", frame.palette_size).yellow().to_string()
            } else {
                String::new()
            }
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    flifio::enable_verbose_logging(level, None)?;

    let api = FlifApi::system();
    match cli.command {
        Command::Convert(args) => convert(api, args),
        Command::Info(args) => info(api, args),
    }
}
