//! Multi-sheet export orchestration.

use std::path::Path;

use log::{debug, info, warn};

use crate::conf::derive_default_export_config;
use crate::error::{XlsxExportError, XlsxExportResult};
use crate::spec::{EnumExportStage, SpecXlsxExportConfig, SpecXlsxReport, SpecXlsxTable};
use crate::util::{parse_float_format, validate_export_batch};
use crate::writer::XlsxWriter;

/// Write every table of `tables` as one sheet of a single workbook at `path_file_out`.
///
/// Sheets keep the batch order. The batch and the config are checked before the
/// destination is touched. A failure while writing any sheet aborts the rest of
/// the batch and discards the staged workbook, so `path_file_out` is either
/// replaced by the complete workbook or left exactly as it was.
pub fn export_tables(
    tables: &[SpecXlsxTable],
    path_file_out: impl AsRef<Path>,
    config: &SpecXlsxExportConfig,
) -> XlsxExportResult<SpecXlsxReport> {
    let path_file_out = path_file_out.as_ref();

    log_stage(EnumExportStage::Validating);
    validate_export_batch(tables)?;
    let fmt_float =
        parse_float_format(&config.float_format).map_err(XlsxExportError::InvalidConfig)?;

    log_stage(EnumExportStage::Opening);
    let mut writer = XlsxWriter::open(path_file_out)?;

    let mut report = SpecXlsxReport {
        file_out: writer.file_out(),
        sheets: Vec::with_capacity(tables.len()),
    };
    for (n_idx, table) in tables.iter().enumerate() {
        log_stage(EnumExportStage::WritingSheet(n_idx));
        let sheet_report = writer
            .write_sheet(table, config, &fmt_float)
            .inspect_err(|err| {
                warn!(
                    "aborting export to {} at sheet #{n_idx}: {err}",
                    path_file_out.display()
                );
            })?;
        report.sheets.push(sheet_report);
    }

    log_stage(EnumExportStage::Finalizing);
    writer.close()?;

    log_stage(EnumExportStage::Done);
    info!(
        "wrote {} sheet(s) to {}",
        report.sheets.len(),
        report.file_out
    );
    Ok(report)
}

/// [`export_tables`] with [`SpecXlsxExportConfig::default`].
pub fn export_tables_with_defaults(
    tables: &[SpecXlsxTable],
    path_file_out: impl AsRef<Path>,
) -> XlsxExportResult<SpecXlsxReport> {
    export_tables(tables, path_file_out, &derive_default_export_config())
}

fn log_stage(stage: EnumExportStage) {
    debug!("export stage: {stage}");
}
