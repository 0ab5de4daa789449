//! Payload parsing for uploaded files.
//!
//! Delimited text (delimiter detected on the header line) and JSON arrays of
//! objects. Column types are inferred once per column.

use csv::{ReaderBuilder, Trim};
use fedsql_commons::Value;
use serde::Serialize;

use crate::error::{GatewayError, GatewayResult};

const DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Tsv,
    Json,
    /// Semicolon or pipe separated
    Delimited,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub format: FileFormat,
}

/// Parse `payload`. `filename` is only used as a format hint.
pub fn parse_payload(payload: &[u8], filename: Option<&str>) -> GatewayResult<ParsedTable> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| GatewayError::Validation("File is not valid UTF-8 text".to_string()))?;
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Err(GatewayError::Validation("File is empty".to_string()));
    }

    let extension = filename
        .and_then(|f| f.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    let looks_like_json = matches!(text.trim_start().chars().next(), Some('[') | Some('{'));

    match extension.as_deref() {
        Some("json") => parse_json(text),
        Some("csv") | Some("tsv") | Some("txt") => parse_delimited(text),
        _ if looks_like_json => parse_json(text),
        _ => parse_delimited(text),
    }
}

/// Most frequent candidate on the header line; comma when none appears.
fn detect_delimiter(header: &str) -> u8 {
    let mut best = b',';
    let mut best_count = 0;
    for d in DELIMITERS {
        let count = header.bytes().filter(|b| *b == d).count();
        if count > best_count {
            best = d;
            best_count = count;
        }
    }
    best
}

fn parse_delimited(text: &str) -> GatewayResult<ParsedTable> {
    let header_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or_default();
    let delimiter = detect_delimiter(header_line);
    let format = match delimiter {
        b',' => FileFormat::Csv,
        b'\t' => FileFormat::Tsv,
        _ => FileFormat::Delimited,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| GatewayError::Validation(format!("Cannot read header: {}", e)))?
        .clone();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(GatewayError::Validation("File has no header row".to_string()));
    }
    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| if h.is_empty() { format!("column_{}", i + 1) } else { h.to_string() })
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| GatewayError::Validation(format!("Malformed row {}: {}", line + 2, e)))?;
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        let row = (0..columns.len())
            .map(|i| record.get(i).filter(|c| !c.is_empty()).map(str::to_string))
            .collect();
        cells.push(row);
    }

    let rows = infer_rows(&columns, cells);
    Ok(ParsedTable { columns, rows, format })
}

fn parse_json(text: &str) -> GatewayResult<ParsedTable> {
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| GatewayError::Validation(format!("Invalid JSON file: {}", e)))?;
    let records = match json {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(_) => vec![json],
        _ => {
            return Err(GatewayError::Validation(
                "JSON file must hold an array of objects".to_string(),
            ))
        }
    };

    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        let obj = record.as_object().ok_or_else(|| {
            GatewayError::Validation("JSON file must hold an array of objects".to_string())
        })?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    if columns.is_empty() {
        return Err(GatewayError::Validation("File has no header row".to_string()));
    }

    let rows = records
        .iter()
        .filter_map(|r| r.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|c| obj.get(c).map(Value::from_json).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Ok(ParsedTable {
        columns,
        rows,
        format: FileFormat::Json,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnType {
    Int,
    Float,
    Bool,
    Text,
}

fn infer_column(cells: &[Vec<Option<String>>], col: usize) -> ColumnType {
    let mut ty = None;
    for cell in cells.iter().filter_map(|row| row[col].as_deref()) {
        let cell_ty = if cell.parse::<i64>().is_ok() {
            ColumnType::Int
        } else if cell.parse::<f64>().map(|f| f.is_finite()).unwrap_or(false) {
            ColumnType::Float
        } else if cell.eq_ignore_ascii_case("true") || cell.eq_ignore_ascii_case("false") {
            ColumnType::Bool
        } else {
            return ColumnType::Text;
        };
        ty = Some(match (ty, cell_ty) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(ColumnType::Int), ColumnType::Float) | (Some(ColumnType::Float), ColumnType::Int) => {
                ColumnType::Float
            }
            _ => return ColumnType::Text,
        });
    }
    ty.unwrap_or(ColumnType::Text)
}

fn convert(cell: Option<String>, ty: ColumnType) -> Value {
    let Some(cell) = cell else {
        return Value::Null;
    };
    match ty {
        ColumnType::Int => cell.parse().map(Value::Int).unwrap_or(Value::Text(cell)),
        ColumnType::Float => cell.parse().map(Value::Float).unwrap_or(Value::Text(cell)),
        ColumnType::Bool => Value::Bool(cell.eq_ignore_ascii_case("true")),
        ColumnType::Text => Value::Text(cell),
    }
}

fn infer_rows(columns: &[String], cells: Vec<Vec<Option<String>>>) -> Vec<Vec<Value>> {
    let types: Vec<ColumnType> = (0..columns.len()).map(|c| infer_column(&cells, c)).collect();
    cells
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(types.iter())
                .map(|(cell, ty)| convert(cell, *ty))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_with_inferred_types() {
        let csv = "sqft,location,rental_price,furnished,rating\n\
                   917,great,3901,true,4.5\n\
                   194,poor,1146,false,\n";
        let table = parse_payload(csv.as_bytes(), Some("home_rentals.csv")).unwrap();
        assert_eq!(table.format, FileFormat::Csv);
        assert_eq!(table.columns, vec!["sqft", "location", "rental_price", "furnished", "rating"]);
        assert_eq!(
            table.rows[0],
            vec![
                Value::Int(917),
                Value::from("great"),
                Value::Int(3901),
                Value::Bool(true),
                Value::Float(4.5)
            ]
        );
        assert_eq!(table.rows[1][4], Value::Null);
    }

    #[test]
    fn test_detects_delimiter_from_header() {
        let tsv = "a\tb\n1\tx\n";
        let table = parse_payload(tsv.as_bytes(), None).unwrap();
        assert_eq!(table.format, FileFormat::Tsv);
        assert_eq!(table.rows[0], vec![Value::Int(1), Value::from("x")]);

        let semi = "a;b;c\n1;2.5;z\n";
        let table = parse_payload(semi.as_bytes(), Some("data.txt")).unwrap();
        assert_eq!(table.format, FileFormat::Delimited);
        assert_eq!(table.rows[0][1], Value::Float(2.5));
    }

    #[test]
    fn test_mixed_int_float_column_is_float() {
        let csv = "x\n1\n2.5\n";
        let table = parse_payload(csv.as_bytes(), None).unwrap();
        assert_eq!(table.rows[0][0], Value::Float(1.0));
    }

    #[test]
    fn test_json_array_of_objects() {
        let json = r#"[{"a": 1, "b": "x"}, {"a": 2, "c": true}]"#;
        let table = parse_payload(json.as_bytes(), None).unwrap();
        assert_eq!(table.format, FileFormat::Json);
        assert_eq!(table.columns, vec!["a", "b", "c"]);
        assert_eq!(table.rows[1], vec![Value::Int(2), Value::Null, Value::Bool(true)]);
    }

    #[test]
    fn test_rejects_empty_and_headerless() {
        assert!(parse_payload(b"", None).is_err());
        assert!(parse_payload(b"   \n ", None).is_err());
        assert!(parse_payload(b"[]", Some("x.json")).is_err());
        assert!(parse_payload(&[0xff, 0xfe], None).is_err());
    }
}
