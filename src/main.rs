use clap::{Parser, ValueEnum};
use dotboy::error::{ArchiveSnafu, EmptyArchiveSnafu, ReadFileSnafu, WriteFileSnafu};
use dotboy::video::palette::Palette;
use dotboy::video::{SCREEN_HEIGHT, SCREEN_WIDTH};
use dotboy::{DotError, GameBoy, RunOptions};
use log::{error, info, LevelFilter};
use snafu::prelude::*;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(about = "Headless DMG emulator: runs a ROM for a number of frames.")]
struct Args {
    #[arg(help = "Path to a .gb ROM or a .zip containing one")]
    rom: PathBuf,

    #[arg(short, long, help = "Optional 256-byte boot ROM")]
    bootrom: Option<PathBuf>,

    #[arg(short, long, default_value_t = 60, help = "Number of frames to run")]
    frames: usize,

    #[arg(short, long, help = "Cartridge RAM file, loaded at start and written on exit")]
    save: Option<PathBuf>,

    #[arg(short, long, help = "Write the last frame as a PGM image")]
    dump: Option<PathBuf>,

    #[arg(short, long, help = "Trace every executed instruction")]
    trace: bool,

    #[arg(short, long, value_enum, default_value_t, help = "Log level")]
    log_level: LogLevel,
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> LevelFilter {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn setup_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}][{}] {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn read_file(path: &Path) -> Result<Vec<u8>, DotError> {
    std::fs::read(path).context(ReadFileSnafu { path })
}

/// Returns the first `.gb` entry of the archive, or its first file when none is named that way.
fn read_zipped_rom(path: &Path) -> Result<Vec<u8>, DotError> {
    let file = File::open(path).context(ReadFileSnafu { path })?;
    let mut archive = zip::ZipArchive::new(file).context(ArchiveSnafu { path })?;

    let names: Vec<String> = archive.file_names().map(String::from).collect();
    let name = names
        .iter()
        .find(|name| name.to_lowercase().ends_with(".gb"))
        .or_else(|| names.first())
        .context(EmptyArchiveSnafu { path })?;

    let mut entry = archive.by_name(name).context(ArchiveSnafu { path })?;
    let mut rom = Vec::new();
    entry.read_to_end(&mut rom).context(ReadFileSnafu { path })?;

    info!("Extracted {} ({} bytes) from {}", name, rom.len(), path.display());
    Ok(rom)
}

fn load_rom(path: &Path) -> Result<Vec<u8>, DotError> {
    if path.extension() == Some(OsStr::new("zip")) {
        read_zipped_rom(path)
    } else {
        read_file(path)
    }
}

/// Binary greymap, one byte per pixel.
fn write_pgm(path: &Path, framebuffer: &[u8]) -> Result<(), DotError> {
    let mut image = format!("P5\n{} {}\n255\n", SCREEN_WIDTH, SCREEN_HEIGHT).into_bytes();
    image.extend(framebuffer.iter().map(|shade| Palette::from_shade(*shade).luminance()));
    std::fs::write(path, image).context(WriteFileSnafu { path })
}

fn run(args: Args) -> Result<(), DotError> {
    let rom = load_rom(&args.rom)?;
    let bootrom = args.bootrom.as_deref().map(read_file).transpose()?;
    let options = RunOptions { trace: args.trace };

    let mut gameboy = GameBoy::new(rom, bootrom, options)?;
    info!("Running \"{}\" for {} frames", gameboy.cartridge_title(), args.frames);

    if let Some(save) = args.save.as_deref().filter(|path| path.exists()) {
        gameboy.load_ram(read_file(save)?);
        info!("Loaded cartridge RAM from {}", save.display());
    }

    for _ in 0..args.frames {
        gameboy.run_frame();
    }
    info!("Ran {} frames in {} machine cycles", args.frames, gameboy.cpu().cycles());

    if let Some(save) = &args.save {
        if gameboy.has_battery_ram() {
            std::fs::write(save, gameboy.save_ram()).context(WriteFileSnafu { path: save })?;
            info!("Wrote cartridge RAM to {}", save.display());
        }
    }

    if let Some(dump) = &args.dump {
        write_pgm(dump, gameboy.framebuffer())?;
        info!("Wrote last frame to {}", dump.display());
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = setup_logger(args.log_level.into()) {
        eprintln!("Failed to set up logging: {}", e);
    }

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
