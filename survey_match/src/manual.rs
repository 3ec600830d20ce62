/*!

This is the long-form manual for `survey_match` and `quizmatch`.

## Input formats

The survey export is a table with one row per answer. The following columns are
required, in any order (other columns are ignored):

| column         | content                                              |
|----------------|------------------------------------------------------|
| `poll_id`      | identifier of the poll                               |
| `user_id`      | identifier of the respondent                         |
| `user_name`    | display name of the respondent                       |
| `question`     | text of the poll                                     |
| `answer`       | the answer picked, empty if none                     |
| `message_text` | tag of the survey the poll belongs to                |

Identifiers written as floats by spreadsheet tools (`12.0`) are read as `12`.

### `csv`

Comma Separated Values, with the header on the first line. This is the default.

### `excel`

An Excel (.xlsx) workbook, with the header on the first row. When the workbook has
more than one worksheet, the name of the worksheet must be given with
`--excel-worksheet-name`.

## How the answers are prepared

Only the rows whose `message_text` is the survey tag are used. When a respondent
answered the same poll several times, the last answer counts. Polls with fewer
than two distinct answers are dropped since they cannot tell respondents apart.
Respondents who skipped a poll get the sentinel answer ("затрудняюсь ответить"
by default) for it.

## Matching

Answers are compared without regard to case or surrounding spaces. The best
match is the respondent who agrees with the visitor on the most polls. Ties go to
the respondent with the smallest id (numeric ids first).

## Configuration

A configuration file can be passed with `--config`:

```json
{
  "dataSource": {
    "provider": "csv",
    "filePath": "polls.csv"
  },
  "surveyTag": "Социологический опрос",
  "sentinel": "затрудняюсь ответить",
  "seed": 17,
  "shuffle": true
}
```

All the fields are optional. `filePath` is relative to the configuration file.
Command line flags take precedence over the configuration file.

## Sessions

The questions are asked in an order derived from the seed of the session (a
random seed unless `--seed` is given). Typing `q` stops the quiz and prints a
token; passing it back with `--token` resumes the session at the same question,
in the same order. Typing `r` starts over.

## Output

With `--out`, a summary of the result is written in JSON format:

```json
{
  "config": {
    "sentinel": "затрудняюсь ответить",
    "surveyTag": "Социологический опрос",
    "totalQuestions": 4,
    "users": 3
  },
  "result": {
    "matchCount": 3,
    "percent": 75.0,
    "totalQuestions": 4,
    "userId": "1",
    "userName": "Анна"
  }
}
```

With `--reference`, the summary is compared to a reference file and the
differences are printed.
*/
