use std::io::{Cursor, Read};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use thiserror::Error;

use crate::domain::{ProcessRecord, Value};

/// Errors raised while reading an uploaded sheet.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Sheet has no header row")]
    MissingHeader,
}

/// Pick the field delimiter from the header line.
///
/// Sheets exported by Brazilian locales use `;` because `,` is the decimal
/// separator.
pub fn sniff_delimiter(data: &[u8]) -> u8 {
    let header = data.split(|&b| b == b'\n').next().unwrap_or_default();
    let semicolons = header.iter().filter(|&&b| b == b';').count();
    let commas = header.iter().filter(|&&b| b == b',').count();

    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Read an uploaded CSV sheet into rows, sniffing the delimiter.
pub fn parse_sheet(data: &[u8]) -> Result<Vec<ProcessRecord>, IngestError> {
    parse_records(data, sniff_delimiter(data))
}

/// Read CSV rows keyed by the header row.
///
/// Blank cells become absent values; everything else stays text.
pub fn parse_records<R: Read>(reader: R, delimiter: u8) -> Result<Vec<ProcessRecord>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|h| decode_cell(h).trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::MissingHeader);
    }

    let mut records = Vec::new();
    for row in csv_reader.byte_records() {
        let row = row?;
        let record = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(idx, header)| (header.as_str(), cell(row.get(idx))))
            .collect::<ProcessRecord>();
        records.push(record);
    }

    Ok(records)
}

fn cell(raw: Option<&[u8]>) -> Value {
    match raw.map(decode_cell) {
        Some(s) if !s.trim().is_empty() => Value::Text(s),
        _ => Value::Absent,
    }
}

/// Decode a cell as UTF-8, falling back to Latin-1 for legacy exports.
fn decode_cell(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(_) => raw.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Read the first sheet of an uploaded workbook (`.xlsx`, `.xls`, `.ods`).
///
/// The first non-empty row is the header. Numeric cells stay numbers, so
/// their amounts are taken as-is instead of going through the text rules.
pub fn parse_workbook(data: &[u8]) -> Result<Vec<ProcessRecord>, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoSheets)??;

    range_records(&range)
}

fn range_records(range: &Range<Data>) -> Result<Vec<ProcessRecord>, IngestError> {
    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));

    let headers: Vec<String> = rows
        .next()
        .ok_or(IngestError::MissingHeader)?
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();

    let records = rows
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, header)| !header.is_empty())
                .map(|(idx, header)| {
                    (header.as_str(), workbook_cell(row.get(idx).unwrap_or(&Data::Empty)))
                })
                .collect::<ProcessRecord>()
        })
        .collect();

    Ok(records)
}

fn workbook_cell(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Absent,
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::String(s) if s.trim().is_empty() => Value::Absent,
        Data::String(s) => Value::text(s.as_str()),
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semicolon_sheet() {
        let data = "N° Processo;Status;Classe Processual;Valor da Causa\n\
                    0001;Ativo;Execução Fiscal;1.500,00\n\
                    0002;Arquivado;Cível;\n";

        let records = parse_sheet(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Valor da Causa"), &Value::text("1.500,00"));
        assert_eq!(records[0].get("Classe Processual"), &Value::text("Execução Fiscal"));
        assert!(records[1].get("Valor da Causa").is_absent());
    }

    #[test]
    fn test_parse_comma_sheet_with_quotes() {
        let data = "Status,Valor da Causa\nAtivo,\"1.234,56\"\n";

        assert_eq!(sniff_delimiter(data.as_bytes()), b',');
        let records = parse_sheet(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Valor da Causa"), &Value::text("1.234,56"));
    }

    #[test]
    fn test_short_rows_are_padded_with_absent() {
        let data = "Status;Valor da Causa;Comarca\nAtivo;100,00\n";

        let records = parse_sheet(data.as_bytes()).unwrap();
        assert!(records[0].get("Comarca").is_absent());
        assert_eq!(records[0].len(), 3);
    }

    #[test]
    fn test_empty_upload() {
        assert!(matches!(parse_sheet(b""), Err(IngestError::MissingHeader)));
    }

    #[test]
    fn test_latin1_row_does_not_abort_sheet() {
        let mut data = b"Status;Classe Processual\nAtivo;Civel\nAtivo;Execu".to_vec();
        data.extend_from_slice(&[0xE7, 0xE3]);
        data.extend_from_slice(b"o Fiscal\nSuspenso;Civel\n");

        let records = parse_sheet(&data).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].get("Classe Processual"), &Value::text("Execução Fiscal"));
        assert_eq!(records[2].get("Status"), &Value::text("Suspenso"));
    }

    fn workbook_bytes() -> Vec<u8> {
        use rust_xlsxwriter::Workbook;

        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();

        ws.write_string(0, 0, "N° Processo").unwrap();
        ws.write_string(0, 1, "Status").unwrap();
        ws.write_string(0, 2, "Valor da Causa").unwrap();

        ws.write_string(1, 0, "0001").unwrap();
        ws.write_string(1, 1, "Ativo").unwrap();
        ws.write_number(1, 2, 1500.5).unwrap();

        ws.write_string(2, 0, "0002").unwrap();
        ws.write_string(2, 1, "Arquivado").unwrap();
        ws.write_string(2, 2, "2.000,00").unwrap();

        ws.write_string(3, 0, "0003").unwrap();
        ws.write_string(3, 1, "Ativo").unwrap();

        wb.save_to_buffer().unwrap()
    }

    #[test]
    fn test_parse_workbook() {
        let records = parse_workbook(&workbook_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("N° Processo"), &Value::text("0001"));
        assert_eq!(records[0].get("Valor da Causa"), &Value::Number(1500.5));
        assert_eq!(records[1].get("Valor da Causa"), &Value::text("2.000,00"));
        assert!(records[2].get("Valor da Causa").is_absent());
    }

    #[test]
    fn test_garbage_workbook_is_rejected() {
        assert!(matches!(
            parse_workbook(b"not a workbook"),
            Err(IngestError::Workbook(_))
        ));
    }
}
