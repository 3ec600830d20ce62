use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::quiz::{
    io_common::{accept_response, get_col_indexes, make_response},
    *,
};

/// Reads a survey export from an Excel workbook. The first row of the
/// worksheet must be the header.
pub fn read_excel_responses(
    path: &str,
    worksheet_name: Option<String>,
) -> BQResult<Vec<RawResponse>> {
    let wrange = get_range(path, worksheet_name)?;

    let header: Vec<Option<String>> = wrange
        .rows()
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(|dt| match dt {
            DataType::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    debug!("read_excel_responses: header: {:?}", header);
    let cols = get_col_indexes(&header, path)?;

    let mut res: Vec<RawResponse> = Vec::new();
    // Skipping the header.
    for (idx, row) in wrange.rows().enumerate().skip(1) {
        let lineno = idx + 1;
        let mut cells: Vec<String> = Vec::new();
        for cell in row.iter() {
            cells.push(read_cell(cell, lineno, row)?);
        }
        let response = make_response(&cells, &cols);
        debug!("read_excel_responses: lineno: {:?} {:?}", lineno, response);
        if accept_response(&response, lineno, path) {
            res.push(response);
        }
    }
    Ok(res)
}

fn read_cell(cell: &DataType, lineno: usize, row: &[DataType]) -> BQResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Empty => Ok("".to_string()),
        _ => Err(Box::new(QuizError::ExcelWrongCellType {
            lineno,
            content: format!("{:?} IN {:?}", cell, row),
        })),
    }
}

fn get_range(path: &str, worksheet_name_o: Option<String>) -> BQResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet)
            .context(MissingWorksheetSnafu {
                path,
                worksheet: worksheet.clone(),
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(QuizError::EmptyExcel {
                path: path.to_string(),
            })),
            [(worksheet_name, wrange)] => {
                debug!("get_range: path: {:?} worksheet: {:?}", &path, &worksheet_name);
                Ok(wrange.clone())
            }
            _ => Err(Box::new(QuizError::AmbiguousWorksheet {
                path: path.to_string(),
            })),
        }
    }
}
