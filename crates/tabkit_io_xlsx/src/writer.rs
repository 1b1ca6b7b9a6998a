//! XLSX writer kernel that turns tables into worksheets of a staged workbook.

use std::fs::{self, Permissions};
use std::path::{Path, PathBuf};

use log::debug;
use polars::prelude::{AnyValue, Column};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tempfile::NamedTempFile;

use crate::conf::{
    C_NEGINF_REPR, C_POSINF_REPR, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, N_WIDTH_EXCEL_COLUMN_MAX,
};
use crate::error::{XlsxExportError, XlsxExportResult};
use crate::spec::{SpecFloatFormat, SpecSheetReport, SpecXlsxExportConfig, SpecXlsxTable};
use crate::util::{
    derive_column_letter, derive_float_num_format, estimate_column_width, round_float,
};

/// Normalized cell value during the write pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing value (null or NaN).
    None,
    /// Text value.
    String(String),
    /// Integral numeric value.
    Integer(i128),
    /// Finite floating value, rendered through the float format.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
}

/// Workbook handle bound to one destination.
///
/// Sheets are built in memory and serialized into a staging file next to the
/// destination; [`Self::close`] commits it with a rename. Dropping the handle
/// without closing removes the staging file and leaves the destination as it
/// was.
///
/// An existing destination keeps its permissions; a new one is created with
/// `0o666` minus the process umask.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    perm_file_out: Option<Permissions>,
    file_staged: NamedTempFile,
    workbook: Workbook,
}

impl XlsxWriter {
    /// Acquire the output resource for `path_file_out`.
    pub fn open(path_file_out: impl AsRef<Path>) -> XlsxExportResult<Self> {
        let path_file_out = path_file_out.as_ref().to_path_buf();
        if path_file_out.is_dir() {
            return Err(XlsxExportError::resource(
                &path_file_out,
                "destination is a directory",
            ));
        }

        let path_dir_parent = match path_file_out.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let perm_file_out = fs::metadata(&path_file_out)
            .ok()
            .map(|meta| meta.permissions());

        let mut builder = tempfile::Builder::new();
        builder.prefix(".tabkit-").suffix(".xlsx.part");
        #[cfg(unix)]
        if perm_file_out.is_none() {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(Permissions::from_mode(0o666));
        }
        let file_staged = builder
            .tempfile_in(&path_dir_parent)
            .map_err(|err| XlsxExportError::resource(&path_file_out, err))?;

        debug!(
            "staging {} at {}",
            path_file_out.display(),
            file_staged.path().display()
        );

        Ok(Self {
            path_file_out,
            perm_file_out,
            file_staged,
            workbook: Workbook::new(),
        })
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Write one table as a new worksheet and apply estimated column widths.
    ///
    /// `fmt_float` must be the parsed form of `config.float_format`.
    pub fn write_sheet(
        &mut self,
        table: &SpecXlsxTable,
        config: &SpecXlsxExportConfig,
        fmt_float: &SpecFloatFormat,
    ) -> XlsxExportResult<SpecSheetReport> {
        let sheet_name = table.name();
        let df = table.data();
        let n_width_df = df.width();
        let n_height_df = df.height();

        if n_width_df > N_NCOLS_EXCEL_MAX {
            return Err(XlsxExportError::write(
                sheet_name,
                format!("{n_width_df} columns exceed Excel limit of {N_NCOLS_EXCEL_MAX}"),
            ));
        }
        if n_height_df >= N_NROWS_EXCEL_MAX {
            return Err(XlsxExportError::write(
                sheet_name,
                format!(
                    "{n_height_df} rows exceed Excel limit of {} data rows",
                    N_NROWS_EXCEL_MAX - 1
                ),
            ));
        }

        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(sheet_name)
            .map_err(|err| XlsxExportError::write(sheet_name, derive_xlsx_error_text(err)))?;

        let fmt_float_cell = Format::new().set_num_format(derive_float_num_format(fmt_float));
        let mut l_widths = Vec::with_capacity(n_width_df);

        for (n_idx_col, col) in df.get_columns().iter().enumerate() {
            write_column(
                worksheet,
                n_idx_col,
                col,
                config,
                fmt_float,
                &fmt_float_cell,
            )
            .map_err(|msg| XlsxExportError::write(sheet_name, msg))?;
        }

        for (n_idx_col, col) in df.get_columns().iter().enumerate() {
            let c_header = col.name().as_str();
            let l_texts = derive_width_texts_from_column(col)
                .map_err(|msg| XlsxExportError::write(sheet_name, msg))?;
            let n_width = usize::min(
                N_WIDTH_EXCEL_COLUMN_MAX,
                estimate_column_width(l_texts, c_header) + config.column_padding,
            );
            worksheet
                .set_column_width(
                    cast_col_num(n_idx_col)
                        .map_err(|msg| XlsxExportError::write(sheet_name, msg))?,
                    n_width as f64,
                )
                .map_err(|err| XlsxExportError::write(sheet_name, derive_xlsx_error_text(err)))?;
            debug!(
                "sheet {sheet_name:?} column {} ({c_header:?}) width={n_width}",
                derive_column_letter(n_idx_col)
            );
            l_widths.push(n_width);
        }

        debug!("sheet {sheet_name:?} written: rows={n_height_df} cols={n_width_df}");

        Ok(SpecSheetReport {
            sheet_name: sheet_name.to_string(),
            n_rows: n_height_df,
            n_cols: n_width_df,
            widths: l_widths,
        })
    }

    /// Serialize the workbook and commit it to the destination.
    pub fn close(mut self) -> XlsxExportResult<()> {
        self.workbook
            .save_to_writer(self.file_staged.as_file_mut())
            .map_err(|err| XlsxExportError::write("", derive_xlsx_error_text(err)))?;
        self.file_staged
            .as_file()
            .sync_all()
            .map_err(|err| XlsxExportError::resource(&self.path_file_out, err))?;
        if let Some(perm) = &self.perm_file_out {
            fs::set_permissions(self.file_staged.path(), perm.clone())
                .map_err(|err| XlsxExportError::resource(&self.path_file_out, err))?;
        }

        // Nothing may fail after the rename.
        let path_file_out = self.path_file_out;
        self.file_staged
            .persist(&path_file_out)
            .map_err(|err| XlsxExportError::resource(&path_file_out, err.error))?;
        Ok(())
    }
}

fn write_column(
    worksheet: &mut Worksheet,
    n_idx_col: usize,
    col: &Column,
    config: &SpecXlsxExportConfig,
    fmt_float: &SpecFloatFormat,
    fmt_float_cell: &Format,
) -> Result<(), String> {
    let n_col = cast_col_num(n_idx_col)?;
    worksheet
        .write_string(0, n_col, col.name().as_str())
        .map_err(derive_xlsx_error_text)?;

    for n_idx_row in 0..col.len() {
        let value = derive_cell_value_from_any_value(
            col.get(n_idx_row)
                .map_err(|err| format!("Failed to access cell value: {err}"))?,
        );
        let n_row = cast_row_num(n_idx_row + 1)?;
        match value {
            EnumCellValue::None => {
                if !config.empty_value_repr.is_empty() {
                    worksheet
                        .write_string(n_row, n_col, &config.empty_value_repr)
                        .map_err(derive_xlsx_error_text)?;
                }
            }
            EnumCellValue::String(val) => {
                worksheet
                    .write_string(n_row, n_col, &val)
                    .map_err(derive_xlsx_error_text)?;
            }
            EnumCellValue::Integer(val) => {
                worksheet
                    .write_number(n_row, n_col, val as f64)
                    .map_err(derive_xlsx_error_text)?;
            }
            EnumCellValue::Float(val) => {
                worksheet
                    .write_number_with_format(
                        n_row,
                        n_col,
                        round_float(val, fmt_float),
                        fmt_float_cell,
                    )
                    .map_err(derive_xlsx_error_text)?;
            }
            EnumCellValue::Boolean(val) => {
                worksheet
                    .write_boolean(n_row, n_col, val)
                    .map_err(derive_xlsx_error_text)?;
            }
        }
    }
    Ok(())
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Integer(i128::from(val)),
        AnyValue::UInt16(val) => EnumCellValue::Integer(i128::from(val)),
        AnyValue::UInt32(val) => EnumCellValue::Integer(i128::from(val)),
        AnyValue::UInt64(val) => EnumCellValue::Integer(i128::from(val)),
        AnyValue::Int8(val) => EnumCellValue::Integer(i128::from(val)),
        AnyValue::Int16(val) => EnumCellValue::Integer(i128::from(val)),
        AnyValue::Int32(val) => EnumCellValue::Integer(i128::from(val)),
        AnyValue::Int64(val) => EnumCellValue::Integer(i128::from(val)),
        AnyValue::Int128(val) => EnumCellValue::Integer(val),
        AnyValue::Float32(val) => derive_cell_value_from_float(val as f64),
        AnyValue::Float64(val) => derive_cell_value_from_float(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn derive_cell_value_from_float(x: f64) -> EnumCellValue {
    if x.is_nan() {
        EnumCellValue::None
    } else if x.is_infinite() {
        let c_repr = if x.is_sign_positive() {
            C_POSINF_REPR
        } else {
            C_NEGINF_REPR
        };
        EnumCellValue::String(c_repr.to_string())
    } else {
        EnumCellValue::Float(x)
    }
}

/// Raw display texts of one column for width estimation; `None` for missing.
pub fn derive_width_texts_from_column(col: &Column) -> Result<Vec<Option<String>>, String> {
    (0..col.len())
        .map(|n_idx_row| {
            col.get(n_idx_row)
                .map(derive_width_text_from_any_value)
                .map_err(|err| format!("Failed to access cell value: {err}"))
        })
        .collect()
}

/// Raw display text of one value, independent of the float format.
pub fn derive_width_text_from_any_value(value: AnyValue<'_>) -> Option<String> {
    match derive_cell_value_from_any_value(value) {
        EnumCellValue::None => None,
        EnumCellValue::String(val) => Some(val),
        EnumCellValue::Integer(val) => Some(val.to_string()),
        EnumCellValue::Float(val) => Some(derive_float_width_text(val)),
        EnumCellValue::Boolean(val) => Some(if val { "True" } else { "False" }.to_string()),
    }
}

/// Shortest round-trip text in Python `repr` layout.
///
/// Decimal exponents below -4 or from 16 up switch to `1e+20` / `1.5e-05`;
/// integral values otherwise keep a trailing `.0`.
fn derive_float_width_text(x: f64) -> String {
    let c_sci = format!("{x:e}");
    let Some((mantissa, exponent)) = c_sci.split_once('e') else {
        return c_sci;
    };
    let n_exp: i32 = exponent.parse().unwrap_or(0);
    if x != 0.0 && !(-4..16).contains(&n_exp) {
        let c_sign = if n_exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{c_sign}{:02}", n_exp.unsigned_abs());
    }

    let c_text = x.to_string();
    if c_text.contains('.') {
        c_text
    } else {
        format!("{c_text}.0")
    }
}

fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    #[test]
    fn test_width_texts_skip_missing_and_keep_raw_floats() {
        let df = df!(
            "f" => [Some(1.0f64), None, Some(f64::NAN), Some(1.0 / 3.0)],
            "b" => [Some(true), Some(false), None, Some(true)]
        )
        .expect("df");

        let l_floats = derive_width_texts_from_column(df.column("f").expect("f")).expect("texts");
        assert_eq!(
            l_floats,
            vec![
                Some("1.0".to_string()),
                None,
                None,
                Some("0.3333333333333333".to_string())
            ]
        );

        let l_bools = derive_width_texts_from_column(df.column("b").expect("b")).expect("texts");
        assert_eq!(l_bools[1].as_deref(), Some("False"));
        assert_eq!(l_bools[2], None);
    }

    #[test]
    fn test_cell_value_classification() {
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Int32(7)),
            EnumCellValue::Integer(7)
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Float64(f64::INFINITY)),
            EnumCellValue::String("inf".to_string())
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Float64(f64::NEG_INFINITY)),
            EnumCellValue::String("-inf".to_string())
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Float32(f32::NAN)),
            EnumCellValue::None
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::String("x")),
            EnumCellValue::String("x".to_string())
        );
    }

    #[test]
    fn test_float_width_text_matches_shortest_repr() {
        assert_eq!(derive_float_width_text(2.5), "2.5");
        assert_eq!(derive_float_width_text(-3.0), "-3.0");
        assert_eq!(derive_float_width_text(0.0), "0.0");
        assert_eq!(derive_float_width_text(0.0001), "0.0001");
        assert_eq!(derive_float_width_text(123456789.0), "123456789.0");
        assert_eq!(derive_float_width_text(1e15), "1000000000000000.0");
    }

    #[test]
    fn test_float_width_text_switches_to_exponent_like_repr() {
        assert_eq!(derive_float_width_text(1e16), "1e+16");
        assert_eq!(derive_float_width_text(1e20), "1e+20");
        assert_eq!(derive_float_width_text(-2.5e300), "-2.5e+300");
        assert_eq!(derive_float_width_text(1e-5), "1e-05");
        assert_eq!(derive_float_width_text(1.5e-5), "1.5e-05");
    }

    #[test]
    fn test_int128_values_stay_numeric() {
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Int128(i128::from(i64::MAX) + 1)),
            EnumCellValue::Integer(9_223_372_036_854_775_808)
        );
        assert_eq!(
            derive_width_text_from_any_value(AnyValue::Int128(-42)).as_deref(),
            Some("-42")
        );
    }
}
