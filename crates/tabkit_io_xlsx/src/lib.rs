//! `tabkit_io_xlsx` v1:
//! Export named dataframes into one multi-sheet XLSX workbook.
//!
//! Module layout:
//! - `conf`   : constants and default presets
//! - `spec`   : tables/config/report models
//! - `util`   : pure helper functions (validation, width estimation, float formats)
//! - `writer` : workbook handle and per-sheet writer
//! - `export` : batch orchestration
//! - `error`  : error taxonomy
pub mod conf;
pub mod error;
pub mod export;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_EMPTY_VALUE_REPR_DEFAULT, C_FLOAT_FORMAT_DEFAULT, N_COLUMN_WIDTH_PADDING_DEFAULT,
    N_FLOAT_PRECISION_MAX, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    N_WIDTH_EXCEL_COLUMN_MAX,
};
pub use error::{EnumExportErrorKind, XlsxExportError, XlsxExportResult};
pub use export::{export_tables, export_tables_with_defaults};
pub use spec::{
    EnumExportStage, EnumFloatNotation, SpecFloatFormat, SpecSheetReport, SpecXlsxExportConfig,
    SpecXlsxReport, SpecXlsxTable,
};
pub use util::{
    derive_column_letter, estimate_column_width, parse_float_format, render_float,
    validate_export_batch,
};
pub use writer::XlsxWriter;
