//! Console prompts for query values not given as flags.

use std::io::{BufRead, Write};

use pricesheet_core::Query;

use crate::error::CliError;

pub const COMPANY_PROMPT: &str = "Enter company full name or keyword: ";
pub const START_PROMPT: &str = "Enter start date (DD-MM-YYYY): ";
pub const END_PROMPT: &str = "Enter end date (DD-MM-YYYY): ";

/// Query built from the given values, asking for each missing one in
/// company, start, end order. Dates are parsed only after all three answers
/// are in.
pub fn gather_query<R, W>(
    company: Option<String>,
    start: Option<String>,
    end: Option<String>,
    input: &mut R,
    output: &mut W,
) -> Result<Query, CliError>
where
    R: BufRead,
    W: Write,
{
    let company = answer_or_ask(company, COMPANY_PROMPT, input, output)?;
    let start = answer_or_ask(start, START_PROMPT, input, output)?;
    let end = answer_or_ask(end, END_PROMPT, input, output)?;

    Ok(Query::parse(&company, start.trim(), end.trim())?)
}

fn answer_or_ask<R, W>(
    given: Option<String>,
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String, CliError>
where
    R: BufRead,
    W: Write,
{
    match given {
        Some(value) => Ok(value),
        None => ask(prompt, input, output),
    }
}

fn ask<R, W>(prompt: &str, input: &mut R, output: &mut W) -> Result<String, CliError>
where
    R: BufRead,
    W: Write,
{
    output.write_all(prompt.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CliError::InputClosed {
            prompt: prompt.trim_end().to_owned(),
        });
    }

    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pricesheet_core::ValidationError;

    use super::*;

    #[test]
    fn prompts_in_order_for_missing_values() {
        let mut input = Cursor::new("Tesla Inc\n01-07-2024\n16-07-2024\n");
        let mut output = Vec::new();

        let query = gather_query(None, None, None, &mut input, &mut output).expect("valid input");

        assert_eq!(query.company, "Tesla Inc");
        assert_eq!(query.start.format_display(), "01-07-2024");
        assert_eq!(query.end.format_display(), "16-07-2024");
        assert_eq!(
            String::from_utf8(output).expect("utf8"),
            format!("{COMPANY_PROMPT}{START_PROMPT}{END_PROMPT}")
        );
    }

    #[test]
    fn flags_skip_their_prompts() {
        let mut input = Cursor::new("16-07-2024\r\n");
        let mut output = Vec::new();

        let query = gather_query(
            Some(String::from("Apple")),
            Some(String::from("01-07-2024")),
            None,
            &mut input,
            &mut output,
        )
        .expect("valid input");

        assert_eq!(query.company, "Apple");
        assert_eq!(String::from_utf8(output).expect("utf8"), END_PROMPT);
    }

    #[test]
    fn short_dates_and_padded_company_are_accepted() {
        let mut input = Cursor::new(" Tesla Inc \n1-7-2024\n16-7-2024\n");
        let mut output = Vec::new();

        let query = gather_query(None, None, None, &mut input, &mut output).expect("valid input");

        assert_eq!(query.company, " Tesla Inc ");
        assert_eq!(query.start.format_display(), "01-07-2024");
        assert_eq!(query.end.format_display(), "16-07-2024");
    }

    #[test]
    fn closed_input_is_reported() {
        let mut input = Cursor::new("Apple\n");
        let mut output = Vec::new();

        let err = gather_query(None, None, None, &mut input, &mut output).expect_err("must fail");
        assert!(matches!(err, CliError::InputClosed { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn malformed_date_is_a_validation_error() {
        let mut input = Cursor::new("Apple\n2024-01-01\n05-01-2024\n");
        let mut output = Vec::new();

        let err = gather_query(None, None, None, &mut input, &mut output).expect_err("must fail");
        assert!(matches!(
            err,
            CliError::Validation(ValidationError::InvalidDate { .. })
        ));
    }
}
