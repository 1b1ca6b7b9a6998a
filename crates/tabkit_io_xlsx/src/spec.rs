//! Shared XLSX export specification models.

use std::fmt;

use polars::prelude::DataFrame;

use crate::conf::{
    C_EMPTY_VALUE_REPR_DEFAULT, C_FLOAT_FORMAT_DEFAULT, N_COLUMN_WIDTH_PADDING_DEFAULT,
};

////////////////////////////////////////////////////////////////////////////////
// #region TableSpecification

/// One named dataset destined for one worksheet.
///
/// Both fields are fixed at construction; the export pipeline only reads them.
#[derive(Debug, Clone)]
pub struct SpecXlsxTable {
    data: DataFrame,
    name: String,
}

impl SpecXlsxTable {
    /// Pair a dataframe with its sheet label.
    pub fn new(data: DataFrame, name: impl Into<String>) -> Self {
        Self {
            data,
            name: name.into(),
        }
    }

    /// Column data written to the sheet.
    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Sheet label.
    pub fn name(&self) -> &str {
        &self.name
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportConfig

/// Formatting policy shared by every sheet of one export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxExportConfig {
    /// printf-style pattern for floating-point cells (`%.10f`, `%.3e`, ...).
    pub float_format: String,
    /// Text written in place of missing values. Empty leaves the cell blank.
    pub empty_value_repr: String,
    /// Extra width units added to every estimated column width.
    pub column_padding: usize,
}

impl Default for SpecXlsxExportConfig {
    fn default() -> Self {
        Self {
            float_format: C_FLOAT_FORMAT_DEFAULT.to_string(),
            empty_value_repr: C_EMPTY_VALUE_REPR_DEFAULT.to_string(),
            column_padding: N_COLUMN_WIDTH_PADDING_DEFAULT,
        }
    }
}

/// Float notation selected by the pattern conversion character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFloatNotation {
    /// `%f`: fixed-point.
    Fixed,
    /// `%e`: scientific, lowercase exponent marker.
    Scientific,
    /// `%E`: scientific, uppercase exponent marker.
    ScientificUpper,
}

/// Parsed float pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecFloatFormat {
    /// Notation.
    pub notation: EnumFloatNotation,
    /// Digits after the decimal point.
    pub precision: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportStage

/// Orchestrator stage, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumExportStage {
    Validating,
    Opening,
    /// Zero-based position of the sheet in the batch.
    WritingSheet(usize),
    Finalizing,
    Done,
}

impl fmt::Display for EnumExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::Opening => write!(f, "opening"),
            Self::WritingSheet(n_idx) => write!(f, "writing sheet #{n_idx}"),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Done => write!(f, "done"),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// What was written for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetReport {
    /// Worksheet name.
    pub sheet_name: String,
    /// Data rows written below the header.
    pub n_rows: usize,
    /// Columns written.
    pub n_cols: usize,
    /// Applied column widths, padding included.
    pub widths: Vec<usize>,
}

/// Per-export call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Committed output path.
    pub file_out: String,
    /// Sheets in workbook order.
    pub sheets: Vec<SpecSheetReport>,
}

impl SpecXlsxReport {
    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.sheet_name.as_str()).collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
