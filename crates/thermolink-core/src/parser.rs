//! `temperature,humidity` line parser.
//!
//! Serial links are noisy, so a line that does not parse is not an error
//! anyone sees: the caller drops it and the display keeps its last value.

use thiserror::Error;

use crate::model::Reading;

const DELIMITER: char = ',';

/// Why a line was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedLine {
    #[error("expected 2 fields, found {found}")]
    FieldCount { found: usize },

    #[error("{field} is not a number: {value:?}")]
    NotNumeric { field: &'static str, value: String },
}

/// Parse one trimmed, non-empty line into a [`Reading`].
pub fn parse_line(line: &str) -> Result<Reading, MalformedLine> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    let [temperature, humidity] = fields.as_slice() else {
        return Err(MalformedLine::FieldCount {
            found: fields.len(),
        });
    };

    Ok(Reading::new(
        parse_number("temperature", temperature)?,
        parse_number("humidity", humidity)?,
    ))
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, MalformedLine> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MalformedLine::NotNumeric {
            field,
            value: raw.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_numeric_fields() {
        assert_eq!(parse_line("24.50,60.20"), Ok(Reading::new(24.5, 60.2)));
        assert_eq!(parse_line("25.1,59"), Ok(Reading::new(25.1, 59.0)));
    }

    #[test]
    fn negative_and_exponent_forms() {
        assert_eq!(parse_line("-3.5,1e1"), Ok(Reading::new(-3.5, 10.0)));
    }

    #[test]
    fn whitespace_around_fields_is_ignored() {
        assert_eq!(parse_line("24.5 , 60.2"), Ok(Reading::new(24.5, 60.2)));
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        assert_eq!(
            parse_line("abc,60.2"),
            Err(MalformedLine::NotNumeric {
                field: "temperature",
                value: "abc".into(),
            })
        );
        assert!(matches!(
            parse_line("24.5,"),
            Err(MalformedLine::NotNumeric {
                field: "humidity",
                ..
            })
        ));
    }

    #[test]
    fn unit_suffix_makes_field_non_numeric() {
        assert_eq!(
            parse_line("24.5C,60"),
            Err(MalformedLine::NotNumeric {
                field: "temperature",
                value: "24.5C".into(),
            })
        );
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert_eq!(
            parse_line("24.5,60.2,1"),
            Err(MalformedLine::FieldCount { found: 3 })
        );
        assert_eq!(
            parse_line("24.5"),
            Err(MalformedLine::FieldCount { found: 1 })
        );
    }

    #[test]
    fn nan_and_infinity_are_rejected() {
        assert!(parse_line("NaN,60.2").is_err());
        assert!(parse_line("24.5,inf").is_err());
    }

    #[test]
    fn every_two_field_numeric_line_round_trips() {
        for (t, h) in [(0.0, 0.0), (-40.0, 100.0), (85.25, 12.5), (1e-3, 99.999)] {
            let line = format!("{t},{h}");
            assert_eq!(parse_line(&line), Ok(Reading::new(t, h)), "{line}");
        }
    }
}
