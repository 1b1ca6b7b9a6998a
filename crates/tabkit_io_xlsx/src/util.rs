//! Stateless helper utilities used by the XLSX export kernel.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{N_FLOAT_PRECISION_IMPLICIT, N_FLOAT_PRECISION_MAX};
use crate::error::{XlsxExportError, XlsxExportResult};
use crate::spec::{EnumFloatNotation, SpecFloatFormat, SpecXlsxTable};

////////////////////////////////////////////////////////////////////////////////
// #region BatchValidation

/// Check batch preconditions before any output is opened.
///
/// Fails with [`XlsxExportError::EmptyBatch`] for an empty batch and with
/// [`XlsxExportError::DuplicateName`] when any sheet name repeats.
pub fn validate_export_batch(tables: &[SpecXlsxTable]) -> XlsxExportResult<()> {
    if tables.is_empty() {
        return Err(XlsxExportError::EmptyBatch);
    }

    let set_names: BTreeSet<&str> = tables.iter().map(SpecXlsxTable::name).collect();
    if set_names.len() == tables.len() {
        return Ok(());
    }

    let mut dict_count: BTreeMap<&str, usize> = BTreeMap::new();
    for table in tables {
        *dict_count.entry(table.name()).or_default() += 1;
    }
    let names = dict_count
        .into_iter()
        .filter_map(|(c_name, n_count)| (n_count > 1).then(|| c_name.to_string()))
        .collect();

    Err(XlsxExportError::DuplicateName { names })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FloatFormat

/// Parse a printf-style float pattern: `%f`, `%.Nf`, `%e`, `%.Ne`, `%E`, `%.NE`.
///
/// Precision is capped at [`N_FLOAT_PRECISION_MAX`].
pub fn parse_float_format(pattern: &str) -> Result<SpecFloatFormat, String> {
    let err = || {
        format!("Unsupported float format {pattern:?}; expected e.g. \"%.10f\" or \"%.3e\".")
    };

    let body = pattern.strip_prefix('%').ok_or_else(err)?;
    let mut chars = body.chars();
    let notation = match chars.next_back() {
        Some('f' | 'F') => EnumFloatNotation::Fixed,
        Some('e') => EnumFloatNotation::Scientific,
        Some('E') => EnumFloatNotation::ScientificUpper,
        _ => return Err(err()),
    };

    let c_precision = chars.as_str();
    let precision = if c_precision.is_empty() {
        N_FLOAT_PRECISION_IMPLICIT
    } else {
        let digits = c_precision.strip_prefix('.').ok_or_else(err)?;
        if digits.is_empty() {
            0
        } else if digits.chars().all(|chr| chr.is_ascii_digit()) {
            digits.parse::<usize>().map_err(|_| err())?
        } else {
            return Err(err());
        }
    };
    if precision > N_FLOAT_PRECISION_MAX {
        return Err(format!(
            "Float format {pattern:?} asks for {precision} decimals; at most {N_FLOAT_PRECISION_MAX} are supported."
        ));
    }

    Ok(SpecFloatFormat {
        notation,
        precision,
    })
}

/// Render a finite float as text under `fmt` (C `printf` conventions).
pub fn render_float(x: f64, fmt: &SpecFloatFormat) -> String {
    match fmt.notation {
        EnumFloatNotation::Fixed => format!("{x:.*}", fmt.precision),
        EnumFloatNotation::Scientific => render_scientific(x, fmt.precision, 'e'),
        EnumFloatNotation::ScientificUpper => render_scientific(x, fmt.precision, 'E'),
    }
}

fn render_scientific(x: f64, precision: usize, marker: char) -> String {
    let c_rust = format!("{x:.precision$e}");
    let Some((mantissa, exponent)) = c_rust.split_once('e') else {
        return c_rust;
    };
    let n_exp: i32 = exponent.parse().unwrap_or(0);
    let c_sign = if n_exp < 0 { '-' } else { '+' };
    format!("{mantissa}{marker}{c_sign}{:02}", n_exp.unsigned_abs())
}

/// Round a finite float to what `fmt` displays.
pub fn round_float(x: f64, fmt: &SpecFloatFormat) -> f64 {
    render_float(x, fmt).parse::<f64>().unwrap_or(x)
}

/// Excel number format that displays cells the way `fmt` renders them.
pub fn derive_float_num_format(fmt: &SpecFloatFormat) -> String {
    let c_fraction = if fmt.precision == 0 {
        String::new()
    } else {
        format!(".{}", "0".repeat(fmt.precision))
    };
    match fmt.notation {
        EnumFloatNotation::Fixed => format!("0{c_fraction}"),
        EnumFloatNotation::Scientific | EnumFloatNotation::ScientificUpper => {
            format!("0{c_fraction}E+00")
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidth

/// Estimate display width of one column from its raw value texts and header.
///
/// Missing values (`None`) count as zero; the configured empty-value text is
/// never measured.
pub fn estimate_column_width<I, S>(values: I, header: &str) -> usize
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let n_width_values = values
        .into_iter()
        .map(|value| value.map_or(0, |s| estimate_text_width(s.as_ref())))
        .max()
        .unwrap_or(0);
    usize::max(n_width_values, estimate_text_width(header))
}

/// Text length in Unicode scalar values.
pub fn estimate_text_width(s: &str) -> usize {
    s.chars().count()
}

/// Spreadsheet column letters for a zero-based index (`0 -> A`, `26 -> AA`).
pub fn derive_column_letter(col_idx: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = col_idx + 1;
    while n_rest > 0 {
        let n_digit = (n_rest - 1) % 26;
        l_chars.push(char::from(b'A' + n_digit as u8));
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
