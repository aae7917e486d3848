//! The body of a single monthly retrieval request.

use serde::Serialize;

use crate::plan::YearMonth;

/// Every day of the month. The archive ignores days that don't exist in the
/// requested month (e.g. 30 February).
pub const DAYS: [&str; 31] = [
    "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12", "13", "14", "15",
    "16", "17", "18", "19", "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "30",
    "31",
];

/// Every hour of the day.
pub const TIMES: [&str; 24] = [
    "00:00", "01:00", "02:00", "03:00", "04:00", "05:00", "06:00", "07:00", "08:00", "09:00",
    "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00", "19:00",
    "20:00", "21:00", "22:00", "23:00",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalRequest {
    pub variable: Vec<String>,
    pub year: String,
    pub month: String,
    pub day: &'static [&'static str],
    pub time: &'static [&'static str],
    pub data_format: &'static str,
    pub download_format: &'static str,
}

impl RetrievalRequest {
    /// Requests one month of hourly data for a single variable as an
    /// unarchived NetCDF file.
    pub fn new(variable: &str, month: YearMonth) -> Self {
        RetrievalRequest {
            variable: vec![variable.to_string()],
            year: month.year.to_string(),
            month: format!("{:02}", month.month),
            day: &DAYS,
            time: &TIMES,
            data_format: "netcdf",
            download_format: "unarchived",
        }
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn should_pad_month() {
        let request = RetrievalRequest::new("total_precipitation", YearMonth::new(2020, 3));

        assert_eq!(request.year, "2020");
        assert_eq!(request.month, "03");
        assert_eq!(request.variable, vec!["total_precipitation".to_string()]);
    }

    #[test]
    fn should_enumerate_every_day_and_hour() {
        assert_eq!(DAYS.len(), 31);
        assert_eq!(DAYS.first(), Some(&"01"));
        assert_eq!(DAYS.last(), Some(&"31"));

        assert_eq!(TIMES.len(), 24);
        for (hour, time) in TIMES.iter().enumerate() {
            assert_eq!(*time, format!("{:02}:00", hour));
        }
    }

    #[test]
    fn should_serialise_to_archive_request_body() {
        let request = RetrievalRequest::new("2m_temperature", YearMonth::new(1999, 12));
        let body: Value = serde_json::to_value(&request).unwrap();

        assert_eq!(body["variable"], json!(["2m_temperature"]));
        assert_eq!(body["year"], json!("1999"));
        assert_eq!(body["month"], json!("12"));
        assert_eq!(body["day"].as_array().unwrap().len(), 31);
        assert_eq!(body["time"].as_array().unwrap().len(), 24);
        assert_eq!(body["data_format"], json!("netcdf"));
        assert_eq!(body["download_format"], json!("unarchived"));
        assert_eq!(body.as_object().unwrap().len(), 7);
    }
}
