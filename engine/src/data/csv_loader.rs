// Reads delimited exports into RawTables for the pipeline binary.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;

use super::raw_table::RawTable;
use crate::error::EngineError;

pub struct CsvTableLoader;

impl CsvTableLoader {
    // Header: Operacao;Data;CodEmpresa;DocNum;CardCode;Origem;Utilizacao;ItemCode;TotalLinha;Quantidade
    // Example Row: VENDA;15/01/2024;01;9001;C0001;WEB;USO1;123;R$ 1.234,56;10
    pub fn read_table<R: Read>(reader: R, delimiter: u8) -> Result<RawTable, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true) // short rows are handled cell by cell downstream
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|header| header.trim().to_string()).collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!(columns = headers.len(), rows = rows.len(), "Read CSV table");
        Ok(RawTable::new(headers, rows))
    }

    pub fn read_bytes(bytes: &[u8], delimiter: u8) -> Result<RawTable, EngineError> {
        Self::read_table(bytes, delimiter)
    }

    pub fn load_from_path(path: &Path, delimiter: u8) -> Result<RawTable, EngineError> {
        let file = File::open(path)?;
        Self::read_table(BufReader::new(file), delimiter)
    }
}
