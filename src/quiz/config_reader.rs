use crate::quiz::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(rename = "dataSource")]
    pub data_source: Option<DataSource>,
    #[serde(rename = "surveyTag")]
    pub survey_tag: Option<String>,
    pub sentinel: Option<String>,
    pub seed: Option<u32>,
    /// When false, the questions are asked in the order of the poll ids.
    pub shuffle: Option<bool>,
}

pub fn read_config(path: &str) -> QResult<QuizConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: QuizConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> QResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
