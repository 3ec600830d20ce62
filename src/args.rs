use clap::Parser;

/// This is a survey compatibility quiz: answer the polls of a past survey and find out which
/// respondent answered most like you.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the dataset and the quiz settings.
    /// Paths inside it are relative to the directory of the file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing an expected result summary in JSON format. If provided,
    /// quizmatch will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the result will be written in JSON format
    /// to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The survey export. Setting this option overrides the data source of the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or excel.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 'Социологический опрос') Only the rows whose message_text is this tag are used.
    #[clap(long, value_parser)]
    pub survey_tag: Option<String>,

    /// (default 'затрудняюсь ответить') The answer used for respondents who skipped a poll.
    #[clap(long, value_parser)]
    pub sentinel: Option<String>,

    /// (number) Fixes the order of the questions. A random order is picked otherwise.
    #[clap(long, value_parser)]
    pub seed: Option<u32>,

    /// (token) Resumes a session from the token printed by a previous run.
    #[clap(long, value_parser)]
    pub token: Option<String>,

    /// (file path) A JSON object mapping poll ids to answers. If provided, these answers are scored
    /// directly, without asking any question.
    #[clap(long, value_parser)]
    pub answers: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
