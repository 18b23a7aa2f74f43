//! Column codecs shared by the SQLite modules. Lists are stored as JSON text
//! and dates as `YYYY-MM-DD`; NULL always decodes to the empty value.

use chrono::NaiveDate;

use crate::calendar::{format_calendar_date, parse_calendar_date};
use crate::error::{Result, StoreError};

pub(crate) fn encode_list(values: &[String]) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}

pub(crate) fn decode_list(raw: Option<String>) -> Result<Vec<String>> {
    match raw {
        Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
        _ => Ok(Vec::new()),
    }
}

pub(crate) fn encode_date(date: NaiveDate) -> String {
    format_calendar_date(date)
}

pub(crate) fn decode_date(field: &'static str, raw: &str) -> Result<NaiveDate> {
    parse_calendar_date(raw).ok_or_else(|| StoreError::InvalidValue {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_blank_lists_decode_empty() {
        assert!(decode_list(None).unwrap().is_empty());
        assert!(decode_list(Some("  ".into())).unwrap().is_empty());
        assert_eq!(
            decode_list(Some(r#"["G","A"]"#.into())).unwrap(),
            vec!["G".to_string(), "A".to_string()]
        );
    }

    #[test]
    fn bad_dates_surface_the_field() {
        let err = decode_date("date", "soon").unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { field: "date", .. }));
    }
}
