// Primitives for reading CSV files.

use crate::quiz::{
    io_common::{accept_response, get_col_indexes, make_response},
    *,
};

/// Reads a survey export in CSV format. The first line must be the header.
pub fn read_csv_responses(path: &str) -> BQResult<Vec<RawResponse>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1usize })?
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    debug!("read_csv_responses: header: {:?}", header);
    let cols = get_col_indexes(&header, path)?;

    let mut res: Vec<RawResponse> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        if line.len() <= cols.max() {
            return Err(Box::new(QuizError::CsvLineTooShort { lineno }));
        }
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        let response = make_response(&cells, &cols);
        debug!("read_csv_responses: lineno: {:?} {:?}", lineno, response);
        if accept_response(&response, lineno, path) {
            res.push(response);
        }
    }
    Ok(res)
}
