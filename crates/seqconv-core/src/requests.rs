//! Request configurations and response payloads of the conversion server.
//!
//! Configs are sent as JSON in the `cfg` field of each multipart upload.
//!
//! | Operation | Config | Success payload |
//! |-----------|--------|-----------------|
//! | SVG map | [`SvgMapConfig`] | [`ConversionResponse`] |
//! | PNG map | [`PngMapConfig`] | [`ConversionResponse`] |
//! | DNA import | [`ImportDnaFileConfig`] | [`ConversionResponse`] |
//! | DNA export | [`ExportDnaFileConfig`] | [`ConversionResponse`] |
//! | Enzyme report | [`ReportEnzymesConfig`] | JSON report text |
//! | ORF report | [`ReportOrfsConfig`] | JSON report text |

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Upload endpoints of the conversion server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ExportSvg,
    ExportPng,
    ImportDna,
    ExportDna,
    ReportEnzymes,
    ReportOrfs,
}

impl Operation {
    pub const ALL: [Self; 6] = [
        Self::ExportSvg,
        Self::ExportPng,
        Self::ImportDna,
        Self::ExportDna,
        Self::ReportEnzymes,
        Self::ReportOrfs,
    ];

    /// Path segment under `/snapgene/`.
    pub const fn path(self) -> &'static str {
        match self {
            Self::ExportSvg => "exportSvg",
            Self::ExportPng => "exportPng",
            Self::ImportDna => "importDNAFile",
            Self::ExportDna => "exportDNAFile",
            Self::ReportEnzymes => "reportEnzymes",
            Self::ReportOrfs => "reportORFs",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Success payload of every upload endpoint that produces a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    /// Server-side name of the produced file, unique per conversion.
    pub output_file_name: String,
}

/// Map rendering options shared by SVG and PNG output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub linear: bool,
    pub show_enzymes: bool,
    pub show_features: bool,
    pub show_primers: bool,
    #[serde(rename = "showORFs")]
    pub show_orfs: bool,
}

impl MapConfig {
    pub fn linear(mut self, linear: bool) -> Self {
        self.linear = linear;
        self
    }

    pub fn show_enzymes(mut self, show: bool) -> Self {
        self.show_enzymes = show;
        self
    }

    pub fn show_features(mut self, show: bool) -> Self {
        self.show_features = show;
        self
    }

    pub fn show_primers(mut self, show: bool) -> Self {
        self.show_primers = show;
        self
    }

    pub fn show_orfs(mut self, show: bool) -> Self {
        self.show_orfs = show;
        self
    }
}

pub type SvgMapConfig = MapConfig;
pub type PngMapConfig = MapConfig;

/// Import takes no options; an empty object is still sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDnaFileConfig {}

/// Target format of a DNA export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportFilter {
    Fasta,
    GenbankStandard,
    GenbankSnapgene,
    Embl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDnaFileConfig {
    pub export_filter: ExportFilter,
}

impl ExportDnaFileConfig {
    pub const fn new(export_filter: ExportFilter) -> Self {
        Self { export_filter }
    }
}

/// Enzyme set the report is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnzymeSet {
    Unique,
    UniqueAndDual,
    UniqueSix,
    Commercial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEnzymesConfig {
    pub enzyme_set: EnzymeSet,
}

impl ReportEnzymesConfig {
    pub const fn new(enzyme_set: EnzymeSet) -> Self {
        Self { enzyme_set }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingFrame {
    FirstForwardFrame,
    AllForwardFrames,
    AllFrames,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOrfsConfig {
    pub reading_frame: ReadingFrame,
}

impl ReportOrfsConfig {
    pub const fn new(reading_frame: ReadingFrame) -> Self {
        Self { reading_frame }
    }
}
