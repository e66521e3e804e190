use snafu::prelude::*;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DotError {
    #[snafu(display("ROM image is too small to contain a header ({} bytes)", size))]
    TruncatedHeader { size: usize },
    #[snafu(display("Unknown ROM size code: {:02x}", code))]
    UnknownRomSize { code: u8 },
    #[snafu(display("Unknown RAM size code: {:02x}", code))]
    UnknownRamSize { code: u8 },
    #[snafu(display("ROM image is {} bytes, but the header declares {} bytes", actual, declared))]
    TruncatedRom { actual: usize, declared: usize },
    #[snafu(display("Boot ROM must be {} bytes, got {}", expected, actual))]
    InvalidBootRom { expected: usize, actual: usize },
    #[snafu(display("Failed to read {}: {}", path.display(), source))]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[snafu(display("Failed to write {}: {}", path.display(), source))]
    WriteFile { path: PathBuf, source: std::io::Error },
    #[snafu(display("Failed to open archive {}: {}", path.display(), source))]
    Archive { path: PathBuf, source: zip::result::ZipError },
    #[snafu(display("Archive {} does not contain a ROM image", path.display()))]
    EmptyArchive { path: PathBuf },
}
