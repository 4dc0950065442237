use crate::data::ClaimLine;
use crate::ingest::error::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const YEAR_COLUMN: &str = "Year";
pub const NPI_COLUMN: &str = "Rndrng_NPI";
pub const HCPCS_COLUMN: &str = "HCPCS_Cd";
pub const POS_COLUMN: &str = "Place_Of_Srvc";
pub const SERVICES_COLUMN: &str = "Tot_Srvcs";
pub const ALLOWED_COLUMN: &str = "Avg_Mdcr_Alowd_Amt";

/// Where a row's period comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PeriodMode {
    /// Read the `Year` column
    #[default]
    Column,
    /// No period column: split each provider's rows, in file order, into an
    /// early and a late pseudo-period at `max(1, floor(n / 2))`
    PseudoSplit { early: i32, late: i32 },
}

/// CMS "by Provider and Service" row, as read before coercion
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Year", default)]
    year: Option<String>,
    #[serde(rename = "Rndrng_NPI", default)]
    npi: Option<String>,
    #[serde(rename = "HCPCS_Cd", default)]
    hcpcs: Option<String>,
    #[serde(rename = "Place_Of_Srvc", default)]
    place_of_service: Option<String>,
    #[serde(rename = "Tot_Srvcs", default)]
    services: Option<String>,
    #[serde(rename = "Avg_Mdcr_Alowd_Amt", default)]
    allowed: Option<String>,
}

/// Load claims from a CSV file
pub fn load_claims<P: AsRef<Path>>(path: P, mode: PeriodMode) -> Result<Vec<ClaimLine>, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    let rows = read_claims(file, mode)?;

    info!(path = %path.display(), rows = rows.len(), "loaded claims");
    Ok(rows)
}

/// Parse claims from any CSV source
///
/// Fields are trimmed, short rows are tolerated (missing fields then fail
/// validation), and empty lines are skipped.
pub fn read_claims<R: Read>(reader: R, mode: PeriodMode) -> Result<Vec<ClaimLine>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    check_headers(&headers, mode)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let raw: RawRow = record
            .deserialize(Some(&headers))
            .map_err(|e| LoadError::schema(line, "row", e.to_string()))?;

        rows.push(coerce_row(raw, line, mode)?);
    }

    if let PeriodMode::PseudoSplit { early, late } = mode {
        assign_pseudo_periods(&mut rows, early, late);
    }

    debug!(rows = rows.len(), "parsed claims");
    Ok(rows)
}

/// Assign early/late pseudo-periods per provider, in row order
///
/// Each provider's first `max(1, floor(n / 2))` rows become `early`, the
/// rest `late`.
pub fn assign_pseudo_periods(rows: &mut [ClaimLine], early: i32, late: i32) {
    let mut totals: HashMap<String, usize> = HashMap::new();
    for row in rows.iter() {
        *totals.entry(row.provider_id.clone()).or_insert(0) += 1;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for row in rows.iter_mut() {
        let total = totals.get(&row.provider_id).copied().unwrap_or(0);
        let mid = (total / 2).max(1);

        let index = seen.entry(row.provider_id.clone()).or_insert(0);
        row.period = if *index < mid { early } else { late };
        *index += 1;
    }
}

fn check_headers(headers: &csv::StringRecord, mode: PeriodMode) -> Result<(), LoadError> {
    let mut required = vec![
        NPI_COLUMN,
        HCPCS_COLUMN,
        POS_COLUMN,
        SERVICES_COLUMN,
        ALLOWED_COLUMN,
    ];
    if mode == PeriodMode::Column {
        required.insert(0, YEAR_COLUMN);
    }

    for column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::schema(1, column, "column is missing from the header"));
        }
    }
    Ok(())
}

fn coerce_row(raw: RawRow, line: u64, mode: PeriodMode) -> Result<ClaimLine, LoadError> {
    let period = match mode {
        PeriodMode::Column => parse_period(raw.year, line)?,
        // Overwritten by assign_pseudo_periods once every row is read
        PeriodMode::PseudoSplit { early, .. } => early,
    };

    Ok(ClaimLine {
        provider_id: required_text(raw.npi, line, NPI_COLUMN)?,
        period,
        service_code: required_text(raw.hcpcs, line, HCPCS_COLUMN)?,
        place_of_service: required_text(raw.place_of_service, line, POS_COLUMN)?,
        service_count: non_negative(raw.services, line, SERVICES_COLUMN)?,
        allowed_amount: non_negative(raw.allowed, line, ALLOWED_COLUMN)?,
    })
}

fn required_text(value: Option<String>, line: u64, field: &'static str) -> Result<String, LoadError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(LoadError::schema(line, field, "must be a non-empty string")),
    }
}

fn parse_period(value: Option<String>, line: u64) -> Result<i32, LoadError> {
    let text = required_text(value, line, YEAR_COLUMN)?;

    if let Ok(year) = text.parse::<i32>() {
        return Ok(year);
    }

    // Tolerate integral floats such as "2023.0"
    match text.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 => Ok(v as i32),
        _ => Err(LoadError::schema(
            line,
            YEAR_COLUMN,
            format!("expected an integer period, got {text:?}"),
        )),
    }
}

fn non_negative(value: Option<String>, line: u64, field: &'static str) -> Result<f64, LoadError> {
    let text = required_text(value, line, field)?;

    let number = text
        .parse::<f64>()
        .map_err(|_| LoadError::schema(line, field, format!("expected a number, got {text:?}")))?;

    if !number.is_finite() {
        return Err(LoadError::schema(line, field, "must be finite"));
    }
    if number < 0.0 {
        return Err(LoadError::schema(line, field, format!("must be >= 0, got {number}")));
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Year,Rndrng_NPI,HCPCS_Cd,Place_Of_Srvc,Tot_Srvcs,Avg_Mdcr_Alowd_Amt";

    fn read(csv_text: &str, mode: PeriodMode) -> Result<Vec<ClaimLine>, LoadError> {
        read_claims(csv_text.as_bytes(), mode)
    }

    #[test]
    fn test_reads_valid_rows() {
        let text = format!(
            "{HEADER}\n2023,1001,99213,O,12,75.50\n2024, 1001 ,99214,F,3.0,120\n"
        );

        let rows = read(&text, PeriodMode::Column).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ClaimLine::new("1001", 2023, "99213", "O", 12.0, 75.5));
        // Trimmed
        assert_eq!(rows[1].provider_id, "1001");
        assert_eq!(rows[1].period, 2024);
    }

    #[test]
    fn test_extra_columns_and_blank_lines_are_tolerated() {
        let text = "Year,Rndrng_NPI,Rndrng_Prvdr_Type,HCPCS_Cd,Place_Of_Srvc,Tot_Srvcs,Avg_Mdcr_Alowd_Amt\n\
                    2023,1001,Cardiology,93000,O,4,20\n\
                    \n\
                    2024.0,1001,Cardiology,93000,O,5,22\n";

        let rows = read(text, PeriodMode::Column).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].period, 2024);
    }

    #[test]
    fn test_utf8_bom_header() {
        let text = format!("\u{feff}{HEADER}\n2023,1001,99213,O,1,10\n");
        let rows = read(&text, PeriodMode::Column).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_missing_column_is_schema_violation() {
        let text = "Year,Rndrng_NPI,HCPCS_Cd,Tot_Srvcs,Avg_Mdcr_Alowd_Amt\n2023,1001,99213,1,10\n";

        match read(text, PeriodMode::Column) {
            Err(LoadError::SchemaViolation { line, field, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(field, POS_COLUMN);
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_number_halts_load() {
        let text = format!("{HEADER}\n2023,1001,99213,O,1,10\n2023,1001,99214,O,many,10\n");

        match read(&text, PeriodMode::Column) {
            Err(LoadError::SchemaViolation { line, field, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(field, SERVICES_COLUMN);
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            ("2023.5,1001,99213,O,1,10", YEAR_COLUMN),
            ("2023,,99213,O,1,10", NPI_COLUMN),
            ("2023,1001,,O,1,10", HCPCS_COLUMN),
            ("2023,1001,99213,,1,10", POS_COLUMN),
            ("2023,1001,99213,O,-1,10", SERVICES_COLUMN),
            ("2023,1001,99213,O,1,NaN", ALLOWED_COLUMN),
            ("2023,1001,99213,O,1", ALLOWED_COLUMN),
        ];

        for (row, expected_field) in cases {
            let text = format!("{HEADER}\n{row}\n");
            match read(&text, PeriodMode::Column) {
                Err(LoadError::SchemaViolation { field, .. }) => assert_eq!(field, expected_field, "row {row}"),
                other => panic!("row {row}: expected schema violation, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_pseudo_split_without_year_column() {
        let text = "Rndrng_NPI,HCPCS_Cd,Place_Of_Srvc,Tot_Srvcs,Avg_Mdcr_Alowd_Amt\n\
                    1001,A,O,1,10\n\
                    2002,A,O,1,10\n\
                    1001,B,O,1,10\n\
                    1001,C,O,1,10\n\
                    1001,D,O,1,10\n";

        let rows = read(text, PeriodMode::PseudoSplit { early: 2023, late: 2024 }).unwrap();

        let periods: Vec<i32> = rows.iter().map(|r| r.period).collect();
        // 1001 has 4 rows (2 early, 2 late); 2002 has a single early row
        assert_eq!(periods, vec![2023, 2023, 2023, 2024, 2024]);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_claims("definitely/not/here.csv", PeriodMode::Column);
        assert!(matches!(result, Err(LoadError::InputNotFound { .. })));
    }
}
