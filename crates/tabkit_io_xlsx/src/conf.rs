//! XLSX constants and default preset factories.

use crate::spec::SpecXlsxExportConfig;

/// Excel worksheet maximum row count (header row included).
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Excel maximum column width in character units.
pub const N_WIDTH_EXCEL_COLUMN_MAX: usize = 255;

/// Default float pattern: fixed-point with 10 fractional digits.
pub const C_FLOAT_FORMAT_DEFAULT: &str = "%.10f";
/// Default text written for missing cells.
pub const C_EMPTY_VALUE_REPR_DEFAULT: &str = "";
/// Default extra width units added to every estimated column width.
pub const N_COLUMN_WIDTH_PADDING_DEFAULT: usize = 2;

/// Precision used by `%f` / `%e` when the pattern carries none.
pub const N_FLOAT_PRECISION_IMPLICIT: usize = 6;
/// Most decimals Excel displays in a number format.
pub const N_FLOAT_PRECISION_MAX: usize = 30;

/// Text written for positive infinity.
pub const C_POSINF_REPR: &str = "inf";
/// Text written for negative infinity.
pub const C_NEGINF_REPR: &str = "-inf";

/// Build default export configuration.
pub fn derive_default_export_config() -> SpecXlsxExportConfig {
    SpecXlsxExportConfig::default()
}
