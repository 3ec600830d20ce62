mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

use log::{debug, info, warn};

use survey_match::*;

use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::quiz::config_reader::*;

// Tag and sentinel of the Russian-language export the quiz was made for.
const DEFAULT_SURVEY_TAG: &str = "Социологический опрос";
const DEFAULT_SENTINEL: &str = "затрудняюсь ответить";

#[derive(Debug, Snafu)]
pub enum QuizError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The file {path} does not contain any data"))]
    EmptyExcel { path: String },
    #[snafu(display("Could not find worksheet {worksheet} in file {path}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display(
        "The file {path} contains several worksheets, use --excel-worksheet-name to pick one"
    ))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Unexpected cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },

    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Line {lineno} of the CSV file is too short"))]
    CsvLineTooShort { lineno: usize },

    #[snafu(display("Column {column} is missing from the header of {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Unknown input type {provider}: expected csv or excel"))]
    UnknownProvider { provider: String },
    #[snafu(display("No input: provide --input or a data source in --config"))]
    MissingInput {},

    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error while talking to the terminal"))]
    Terminal { source: std::io::Error },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type QResult<T> = Result<T, QuizError>;
pub type BQResult<T> = Result<T, Box<QuizError>>;

/// Everything the quiz needs, after merging the command line and the configuration file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuizSettings {
    pub provider: String,
    pub file_path: String,
    pub excel_worksheet_name: Option<String>,
    pub rules: NormalizeRules,
    pub seed: Option<u32>,
    pub shuffle: bool,
}

/// How an interactive session ended.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SessionOutcome {
    Finished(QuizState),
    /// The visitor left before the end. The token resumes the session.
    Suspended(String),
}

fn resolve_settings(args: &Args) -> BQResult<QuizSettings> {
    let config: Option<(QuizConfig, PathBuf)> = match args.config.clone() {
        Some(config_path) => {
            let config = read_config(&config_path)?;
            let root = Path::new(&config_path)
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            Some((config, root))
        }
        None => None,
    };
    debug!("resolve_settings: config {:?}", config);

    let source: Option<DataSource> = config.as_ref().and_then(|(c, root)| {
        c.data_source.clone().map(|ds| DataSource {
            file_path: root.join(&ds.file_path).display().to_string(),
            ..ds
        })
    });

    let (provider, file_path, excel_worksheet_name) = match (args.input.clone(), source) {
        (Some(input), source) => (
            args.input_type
                .clone()
                .or_else(|| source.clone().map(|s| s.provider))
                .unwrap_or_else(|| "csv".to_string()),
            input,
            args.excel_worksheet_name
                .clone()
                .or_else(|| source.and_then(|s| s.excel_worksheet_name)),
        ),
        (None, Some(source)) => (
            args.input_type.clone().unwrap_or(source.provider),
            source.file_path,
            args.excel_worksheet_name
                .clone()
                .or(source.excel_worksheet_name),
        ),
        (None, None) => {
            return Err(Box::new(QuizError::MissingInput {}));
        }
    };

    let file_config = config.map(|(c, _)| c);
    let survey_tag = args
        .survey_tag
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.survey_tag.clone()))
        .unwrap_or_else(|| DEFAULT_SURVEY_TAG.to_string());
    let sentinel = args
        .sentinel
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.sentinel.clone()))
        .unwrap_or_else(|| DEFAULT_SENTINEL.to_string());

    Ok(QuizSettings {
        provider,
        file_path,
        excel_worksheet_name,
        rules: NormalizeRules::new(&survey_tag, &sentinel),
        seed: args
            .seed
            .or_else(|| file_config.as_ref().and_then(|c| c.seed)),
        shuffle: file_config.and_then(|c| c.shuffle).unwrap_or(true),
    })
}

fn read_responses(settings: &QuizSettings) -> BQResult<Vec<RawResponse>> {
    info!(
        "Attempting to read survey file {:?} (type {:?})",
        settings.file_path, settings.provider
    );
    let res = match settings.provider.as_str() {
        "csv" => io_csv::read_csv_responses(&settings.file_path)?,
        "excel" | "xlsx" => io_excel::read_excel_responses(
            &settings.file_path,
            settings.excel_worksheet_name.clone(),
        )?,
        x => {
            return Err(Box::new(QuizError::UnknownProvider {
                provider: x.to_string(),
            }));
        }
    };
    info!("Read {:?} responses", res.len());
    Ok(res)
}

fn read_answers(path: &str) -> BQResult<VisitorAnswers> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let answers: VisitorAnswers =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_answers: {:?}", answers);
    Ok(answers)
}

/// Asks the questions one by one until the end or until the visitor leaves.
///
/// The state only travels through its token between two questions, the way a
/// stateless web frontend would carry it.
pub fn run_session<R: BufRead, W: Write>(
    ctx: &QuizContext,
    state: QuizState,
    input: &mut R,
    output: &mut W,
) -> QResult<SessionOutcome> {
    // The order only depends on the seed, computed again if the seed changes.
    let mut order_seed = state.seed;
    let mut order = ctx.question_order(order_seed);
    let mut token = codec::encode(&state);
    loop {
        let state = codec::decode(&token);
        if state.seed != order_seed {
            order_seed = state.seed;
            order = ctx.question_order(order_seed);
        }
        let step = ctx.next_step_in(&order, &state);
        let (question_text, options, question_number, total, step_token) = match step {
            QuizStep::Question {
                question_text,
                options,
                question_number,
                total,
                token,
                ..
            } => (question_text, options, question_number, total, token),
            QuizStep::Complete => {
                return Ok(SessionOutcome::Finished(state));
            }
        };

        writeln!(output, "\nQuestion {}/{}: {}", question_number, total, question_text)
            .context(TerminalSnafu {})?;
        for (idx, o) in options.iter().enumerate() {
            writeln!(output, "  {}) {}", idx + 1, o).context(TerminalSnafu {})?;
        }

        // None when the visitor asks to start over.
        let choice: Option<String> = loop {
            write!(output, "Your answer (number, 'r' to restart, 'q' to quit): ")
                .context(TerminalSnafu {})?;
            output.flush().context(TerminalSnafu {})?;
            let mut line = String::new();
            let read = input.read_line(&mut line).context(TerminalSnafu {})?;
            let line = line.trim();
            if read == 0 || line == "q" {
                writeln!(output).context(TerminalSnafu {})?;
                return Ok(SessionOutcome::Suspended(step_token));
            }
            if line == "r" {
                break None;
            }
            match line.parse::<usize>() {
                Ok(n) if n >= 1 && n <= options.len() => {
                    break Some(options[n - 1].clone());
                }
                _ => {
                    writeln!(output, "Please pick a number between 1 and {}", options.len())
                        .context(TerminalSnafu {})?;
                }
            }
        };

        let state = codec::decode(&step_token);
        let next = match choice {
            Some(answer) => ctx.record_answer_in(&order, &state, &answer),
            None => ctx.reset(state.seed),
        };
        token = codec::encode(&next);
    }
}

fn build_summary_js(settings: &QuizSettings, ctx: &QuizContext, res: &MatchResult) -> JSValue {
    json!({
        "config": {
            "surveyTag": settings.rules.survey_tag,
            "sentinel": settings.rules.sentinel,
            "totalQuestions": ctx.total_questions(),
            "users": ctx.table().users().len(),
        },
        "result": res,
    })
}

fn print_result(res: &MatchResult) {
    match (&res.user_name, &res.user_id) {
        (Some(name), _) | (None, Some(name)) => {
            println!(
                "\nYour best match is {}: {} of {} answers in common ({:.1}%)",
                name, res.match_count, res.total_questions, res.percent
            );
        }
        (None, None) => {
            println!("\nNo match found");
        }
    }
}

fn write_summary(out: &str, summary: &str) -> BQResult<()> {
    if out == "stdout" {
        println!("{}", summary);
    } else {
        fs::write(out, summary).context(WritingOutputSnafu { path: out })?;
        info!("Summary written to {:?}", out);
    }
    Ok(())
}

fn check_reference(summary_path: &str, pretty_js_stats: &str) -> QResult<()> {
    let summary_ref = read_summary(summary_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_quiz(args: &Args) -> BQResult<()> {
    let settings = resolve_settings(args)?;
    info!("settings: {:?}", settings);

    let responses = read_responses(&settings)?;
    let ctx = QuizContext::from_responses(&responses, &settings.rules);
    let ctx = if settings.shuffle {
        ctx
    } else {
        ctx.without_shuffle()
    };
    info!(
        "Quiz ready: {:?} questions, {:?} respondents",
        ctx.total_questions(),
        ctx.table().users().len()
    );

    let answers: VisitorAnswers = if let Some(answers_path) = args.answers.clone() {
        read_answers(&answers_path)?
    } else {
        let state = match args.token.clone() {
            Some(token) => codec::decode(&token),
            None => ctx.reset(settings.seed.unwrap_or_else(rand::random::<u32>)),
        };
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let outcome = run_session(&ctx, state, &mut stdin.lock(), &mut stdout.lock())?;
        match outcome {
            SessionOutcome::Finished(state) => state.answers,
            SessionOutcome::Suspended(token) => {
                println!("Resume later with: --token {}", token);
                return Ok(());
            }
        }
    };

    let result = ctx.compute_result(&answers);
    print_result(&result);

    let result_js = build_summary_js(&settings, &ctx, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    if let Some(out) = args.out.clone() {
        write_summary(&out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.clone() {
        check_reference(&summary_p, &pretty_js_stats)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn test_path(name: &str) -> String {
        format!("{}/testdata/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn args() -> Args {
        Args {
            config: None,
            reference: None,
            out: None,
            input: Some(test_path("polls.csv")),
            input_type: None,
            excel_worksheet_name: None,
            survey_tag: None,
            sentinel: None,
            seed: None,
            token: None,
            answers: None,
            verbose: false,
        }
    }

    fn context() -> QuizContext {
        let settings = resolve_settings(&args()).unwrap();
        let responses = read_responses(&settings).unwrap();
        QuizContext::from_responses(&responses, &settings.rules).without_shuffle()
    }

    #[test]
    fn scores_answers_file_against_reference() {
        let _ = env_logger::try_init();
        let out = std::env::temp_dir().join("quizmatch_scores_answers_file.json");
        let args = Args {
            answers: Some(test_path("answers.json")),
            reference: Some(test_path("expected_summary.json")),
            out: Some(out.display().to_string()),
            ..args()
        };
        run_quiz(&args).unwrap();
        let written: JSValue = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["result"]["userName"], json!("Анна"));
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let args = Args {
            answers: Some(test_path("answers.json")),
            reference: Some(test_path("quiz_config.json")),
            ..args()
        };
        assert!(run_quiz(&args).is_err());
    }

    #[test]
    fn settings_from_config_file() {
        let args = Args {
            config: Some(test_path("quiz_config.json")),
            input: None,
            seed: Some(3),
            ..args()
        };
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.provider, "csv");
        assert_eq!(settings.file_path, test_path("polls.csv"));
        assert_eq!(settings.rules.survey_tag, DEFAULT_SURVEY_TAG);
        assert_eq!(settings.rules.sentinel, DEFAULT_SENTINEL);
        assert_eq!(settings.seed, Some(3));
        assert!(!settings.shuffle);
    }

    #[test]
    fn missing_input() {
        let args = Args {
            input: None,
            ..args()
        };
        assert!(matches!(
            resolve_settings(&args).map_err(|e| *e),
            Err(QuizError::MissingInput {})
        ));
    }

    #[test]
    fn unknown_input_type() {
        let args = Args {
            input_type: Some("parquet".to_string()),
            ..args()
        };
        let settings = resolve_settings(&args).unwrap();
        assert!(matches!(
            read_responses(&settings).map_err(|e| *e),
            Err(QuizError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn reads_the_export() {
        let ctx = context();
        assert_eq!(
            ctx.table().polls(),
            &[
                "101".to_string(),
                "102".to_string(),
                "103".to_string(),
                "106".to_string()
            ]
        );
        assert_eq!(
            ctx.table().users(),
            &["1".to_string(), "2".to_string(), "3".to_string()]
        );
        assert_eq!(ctx.table().question("102"), Some("Кошки, собаки?"));
        assert_eq!(ctx.table().answer("103", "1"), Some("да"));
        assert_eq!(ctx.table().answer("102", "3"), Some(DEFAULT_SENTINEL));
        assert_eq!(
            ctx.options("103"),
            &["да".to_string(), "нет".to_string(), DEFAULT_SENTINEL.to_string()]
        );
    }

    #[test]
    fn interactive_session() {
        let ctx = context();
        // Picks Вера's answers: красный, затрудняюсь ответить (x2), нет.
        // The invalid inputs are asked again.
        let mut input = Cursor::new("1\n7\nfoo\n3\n3\n2\n");
        let mut output: Vec<u8> = Vec::new();
        let outcome = run_session(&ctx, ctx.reset(0), &mut input, &mut output).unwrap();
        let state = match outcome {
            SessionOutcome::Finished(state) => state,
            x => panic!("unexpected outcome {:?}", x),
        };
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Question 1/4: Любимый цвет?"));
        assert!(text.contains("Please pick a number between 1 and 3"));

        let res = ctx.compute_result(&state.answers);
        assert_eq!(res.user_name, Some("Вера".to_string()));
        assert_eq!(res.match_count, 4);
        assert_eq!(res.percent, 100.0);
    }

    #[test]
    fn quitting_gives_a_resumable_token() {
        let ctx = context();
        let mut input = Cursor::new("2\nq\n");
        let mut output: Vec<u8> = Vec::new();
        let outcome = run_session(&ctx, ctx.reset(0), &mut input, &mut output).unwrap();
        let token = match outcome {
            SessionOutcome::Suspended(token) => token,
            x => panic!("unexpected outcome {:?}", x),
        };
        let state = codec::decode(&token);
        assert_eq!(state.q_idx, 1);
        assert_eq!(state.answers.get("101"), Some(&"синий".to_string()));

        // Resume and answer like Борис.
        let mut input = Cursor::new("2\n2\n2\n");
        let mut output: Vec<u8> = Vec::new();
        match run_session(&ctx, state, &mut input, &mut output).unwrap() {
            SessionOutcome::Finished(state) => {
                let res = ctx.compute_result(&state.answers);
                assert_eq!(res.user_name, Some("Борис".to_string()));
                assert_eq!(res.match_count, 4);
            }
            x => panic!("unexpected outcome {:?}", x),
        }
    }

    #[test]
    fn restart_clears_answers() {
        let ctx = context();
        let mut input = Cursor::new("1\nr\n");
        let mut output: Vec<u8> = Vec::new();
        let outcome = run_session(&ctx, ctx.reset(0), &mut input, &mut output).unwrap();
        match outcome {
            SessionOutcome::Suspended(token) => {
                let state = codec::decode(&token);
                assert_eq!(state.q_idx, 0);
                assert!(state.answers.is_empty());
            }
            x => panic!("unexpected outcome {:?}", x),
        }
    }
}
