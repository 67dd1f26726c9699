//! CLI argument definitions for seqconv.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `status` | Server health payload |
//! | `svg` | Render a map as SVG |
//! | `png` | Render a map as PNG |
//! | `import` | Convert any sequence file to native `.dna` |
//! | `export` | Export to FASTA, GenBank or EMBL |
//! | `enzymes` | Restriction enzyme report |
//! | `orfs` | Open reading frame report |
//! | `download` | Fetch a file produced by an earlier command |
//! | `png-download` | Render a PNG map and save its bytes |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--server-url` | `SEQCONV_SERVER_URL` | Conversion server base URL |
//! | `--customer-id` | `SEQCONV_CUSTOMER_ID` | Customer id sent with every request |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! seqconv status
//! seqconv export pUC19.gb --filter fasta --pretty
//! seqconv png-download pUC19.gb --enzymes --features --output pUC19.png
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use seqconv_core::{EnzymeSet, ExportFilter, MapConfig, ReadingFrame};

/// Client for a remote SnapGene conversion server.
///
/// Files that are not in the native `.dna` format are converted on the
/// server first when a command needs it.
#[derive(Debug, Parser)]
#[command(name = "seqconv", author, version, about = "SnapGene conversion server client")]
pub struct Cli {
    /// Conversion server base URL; overrides the environment.
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    /// Customer id sent with uploads and downloads; overrides the environment.
    #[arg(long, global = true)]
    pub customer_id: Option<String>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the server's status payload.
    Status,

    /// Render a map of the sequence as SVG.
    ///
    ///   seqconv svg pUC19.gb --enzymes
    Svg(MapArgs),

    /// Render a map of the sequence as PNG.
    Png(MapArgs),

    /// Convert a sequence file into the native .dna format.
    Import(FileArgs),

    /// Export a sequence to another format.
    ///
    ///   seqconv export pUC19.dna --filter genbank-standard
    Export(ExportArgs),

    /// Report restriction enzymes cutting the sequence.
    Enzymes(EnzymesArgs),

    /// Report open reading frames of the sequence.
    Orfs(OrfsArgs),

    /// Download a file produced by an earlier command.
    ///
    ///   seqconv download export-9a2e.fasta --output pUC19.fasta
    Download(DownloadArgs),

    /// Render a PNG map and save the image.
    PngDownload(PngDownloadArgs),
}

#[derive(Debug, Args)]
pub struct FileArgs {
    /// Sequence file to upload.
    pub file: PathBuf,
}

/// Map rendering options shared by `svg`, `png` and `png-download`.
#[derive(Debug, Args)]
pub struct MapArgs {
    /// Sequence file to upload.
    pub file: PathBuf,

    /// Draw the sequence as linear instead of circular.
    #[arg(long, default_value_t = false)]
    pub linear: bool,

    #[arg(long, default_value_t = false)]
    pub enzymes: bool,

    #[arg(long, default_value_t = false)]
    pub features: bool,

    #[arg(long, default_value_t = false)]
    pub primers: bool,

    #[arg(long, default_value_t = false)]
    pub orfs: bool,
}

impl MapArgs {
    pub fn map_config(&self) -> MapConfig {
        MapConfig::default()
            .linear(self.linear)
            .show_enzymes(self.enzymes)
            .show_features(self.features)
            .show_primers(self.primers)
            .show_orfs(self.orfs)
    }
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Sequence file to export.
    pub file: PathBuf,

    #[arg(long, value_enum, default_value_t = FilterArg::Fasta)]
    pub filter: FilterArg,
}

#[derive(Debug, Args)]
pub struct EnzymesArgs {
    /// Sequence file to analyze.
    pub file: PathBuf,

    #[arg(long = "set", value_enum, default_value_t = EnzymeSetArg::Unique)]
    pub enzyme_set: EnzymeSetArg,
}

#[derive(Debug, Args)]
pub struct OrfsArgs {
    /// Sequence file to analyze.
    pub file: PathBuf,

    #[arg(long, value_enum, default_value_t = FrameArg::AllFrames)]
    pub frame: FrameArg,
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Output file name returned by the server.
    pub file_name: String,

    /// Where to write the downloaded bytes.
    #[arg(long, short)]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct PngDownloadArgs {
    #[command(flatten)]
    pub map: MapArgs,

    /// Where to write the PNG image.
    #[arg(long, short)]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    Fasta,
    GenbankStandard,
    GenbankSnapgene,
    Embl,
}

impl From<FilterArg> for ExportFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::Fasta => Self::Fasta,
            FilterArg::GenbankStandard => Self::GenbankStandard,
            FilterArg::GenbankSnapgene => Self::GenbankSnapgene,
            FilterArg::Embl => Self::Embl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnzymeSetArg {
    /// Enzymes cutting exactly once.
    Unique,
    /// Enzymes cutting once or twice.
    UniqueAndDual,
    /// Unique six-base cutters.
    UniqueSix,
    /// Commercially available enzymes.
    Commercial,
}

impl From<EnzymeSetArg> for EnzymeSet {
    fn from(value: EnzymeSetArg) -> Self {
        match value {
            EnzymeSetArg::Unique => Self::Unique,
            EnzymeSetArg::UniqueAndDual => Self::UniqueAndDual,
            EnzymeSetArg::UniqueSix => Self::UniqueSix,
            EnzymeSetArg::Commercial => Self::Commercial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrameArg {
    FirstForwardFrame,
    AllForwardFrames,
    AllFrames,
}

impl From<FrameArg> for ReadingFrame {
    fn from(value: FrameArg) -> Self {
        match value {
            FrameArg::FirstForwardFrame => Self::FirstForwardFrame,
            FrameArg::AllForwardFrames => Self::AllForwardFrames,
            FrameArg::AllFrames => Self::AllFrames,
        }
    }
}
