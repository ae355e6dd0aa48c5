//! Request and response types for the team API.
//!
//! Responses present absent optional text as `""`. Requests keep every
//! field optional so presence can be checked before anything is written.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{
    Athlete, AthleteParams, Meet, MeetParams, MeetResultRow, ResultParams, ResultRecord,
    TopTimeRow,
};

/// Wire format for meet dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Request body validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid date format, use YYYY-MM-DD")]
    InvalidDate(String),
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

fn required_int<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError>
where
    T: Default + PartialEq,
{
    value
        .filter(|v| *v != T::default())
        .ok_or(ValidationError::MissingField(field))
}

/// Parse a calendar date, accepting only zero-padded `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !shape_ok {
        return Err(ValidationError::InvalidDate(value.to_string()));
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ==================== Requests ====================

/// Body for creating or replacing an athlete
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteRequest {
    pub name: Option<String>,
    pub grade: Option<i32>,
    pub personal_record: Option<String>,
    pub events: Option<String>,
}

impl AthleteRequest {
    pub fn validate(self) -> Result<AthleteParams, ValidationError> {
        Ok(AthleteParams {
            name: required_text(self.name, "name")?,
            grade: required_int(self.grade, "grade")?,
            personal_record: self.personal_record,
            events: self.events,
        })
    }
}

/// Body for creating or replacing a meet
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl MeetRequest {
    pub fn validate(self) -> Result<MeetParams, ValidationError> {
        let name = required_text(self.name, "name")?;
        let date = required_text(self.date, "date")?;
        let location = required_text(self.location, "location")?;

        Ok(MeetParams {
            name,
            date: parse_date(&date)?,
            location,
            description: self.description,
        })
    }
}

/// Body for creating or replacing a result
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    pub athlete_id: Option<i64>,
    pub meet_id: Option<i64>,
    pub time: Option<String>,
    pub place: Option<i32>,
}

impl ResultRequest {
    pub fn validate(self) -> Result<ResultParams, ValidationError> {
        Ok(ResultParams {
            athlete_id: required_int(self.athlete_id, "athleteId")?,
            meet_id: required_int(self.meet_id, "meetId")?,
            time: required_text(self.time, "time")?,
            place: required_int(self.place, "place")?,
        })
    }
}

// ==================== Responses ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteResponse {
    pub id: i64,
    pub name: String,
    pub grade: i32,
    pub personal_record: String,
    pub events: String,
}

impl From<Athlete> for AthleteResponse {
    fn from(a: Athlete) -> Self {
        Self {
            id: a.id,
            name: a.name,
            grade: a.grade,
            personal_record: a.personal_record.unwrap_or_default(),
            events: a.events.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetResponse {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub location: String,
    pub description: String,
}

impl From<Meet> for MeetResponse {
    fn from(m: Meet) -> Self {
        Self {
            id: m.id,
            name: m.name,
            date: format_date(m.date),
            location: m.location,
            description: m.description.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub id: i64,
    pub athlete_id: i64,
    pub meet_id: i64,
    pub time: String,
    pub place: i32,
}

impl From<ResultRecord> for ResultResponse {
    fn from(r: ResultRecord) -> Self {
        Self {
            id: r.id,
            athlete_id: r.athlete_id,
            meet_id: r.meet_id,
            time: r.time,
            place: r.place,
        }
    }
}

/// Meet result annotated with the athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetResultResponse {
    pub id: i64,
    pub time: String,
    pub place: i32,
    pub athlete_id: i64,
    pub athlete_name: String,
    pub athlete_grade: i32,
}

impl From<MeetResultRow> for MeetResultResponse {
    fn from(r: MeetResultRow) -> Self {
        Self {
            id: r.id,
            time: r.time,
            place: r.place,
            athlete_id: r.athlete_id,
            athlete_name: r.athlete_name,
            athlete_grade: r.athlete_grade,
        }
    }
}

/// Leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTimeResponse {
    pub id: i64,
    pub time: String,
    pub place: i32,
    pub athlete_id: i64,
    pub athlete_name: String,
    pub meet_id: i64,
    pub meet_name: String,
    pub meet_date: String,
}

impl From<TopTimeRow> for TopTimeResponse {
    fn from(r: TopTimeRow) -> Self {
        Self {
            id: r.id,
            time: r.time,
            place: r.place,
            athlete_id: r.athlete_id,
            athlete_name: r.athlete_name,
            meet_id: r.meet_id,
            meet_name: r.meet_name,
            meet_date: format_date(r.meet_date),
        }
    }
}

/// Returned by create endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

/// Returned by update and delete endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athlete_request(name: Option<&str>, grade: Option<i32>) -> AthleteRequest {
        AthleteRequest {
            name: name.map(String::from),
            grade,
            personal_record: None,
            events: None,
        }
    }

    #[test]
    fn test_athlete_request_deserializes_camel_case() {
        let req: AthleteRequest = serde_json::from_str(
            r#"{"name":"Emma Johnson","grade":11,"personalRecord":"18:42"}"#,
        )
        .unwrap();

        let params = req.validate().unwrap();
        assert_eq!(params.name, "Emma Johnson");
        assert_eq!(params.grade, 11);
        assert_eq!(params.personal_record.as_deref(), Some("18:42"));
        assert_eq!(params.events, None);
    }

    #[test]
    fn test_athlete_required_fields() {
        assert_eq!(
            athlete_request(None, Some(10)).validate(),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            athlete_request(Some(""), Some(10)).validate(),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            athlete_request(Some("Liam"), None).validate(),
            Err(ValidationError::MissingField("grade"))
        );
        assert_eq!(
            athlete_request(Some("Liam"), Some(0)).validate(),
            Err(ValidationError::MissingField("grade"))
        );
    }

    #[test]
    fn test_optional_empty_string_is_kept() {
        let req = AthleteRequest {
            events: Some(String::new()),
            ..athlete_request(Some("Liam"), Some(9))
        };
        let params = req.validate().unwrap();
        assert_eq!(params.events, Some(String::new()));
        assert_eq!(params.personal_record, None);
    }

    #[test]
    fn test_parse_date_strict() {
        assert_eq!(
            parse_date("2024-09-14").unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 14).unwrap()
        );
        for bad in ["2026-02-30", "2024-9-14", "09/14/2024", "2024-09-14T00:00:00", "", "2024-13-01"] {
            assert!(
                matches!(parse_date(bad), Err(ValidationError::InvalidDate(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_meet_missing_date_differs_from_invalid_date() {
        let base = MeetRequest {
            name: Some("Region".to_string()),
            date: None,
            location: Some("Gray, GA".to_string()),
            description: None,
        };

        assert_eq!(
            base.clone().validate(),
            Err(ValidationError::MissingField("date"))
        );

        let bad = MeetRequest {
            date: Some("2026-02-30".to_string()),
            ..base
        };
        assert_eq!(
            bad.validate(),
            Err(ValidationError::InvalidDate("2026-02-30".to_string()))
        );
    }

    #[test]
    fn test_result_required_fields() {
        let req = ResultRequest {
            athlete_id: Some(1),
            meet_id: Some(2),
            time: Some("17:12".to_string()),
            place: Some(0),
        };
        assert_eq!(req.validate(), Err(ValidationError::MissingField("place")));

        let req: ResultRequest =
            serde_json::from_str(r#"{"athleteId":1,"meetId":2,"time":"17:12","place":4}"#).unwrap();
        let params = req.validate().unwrap();
        assert_eq!(params.athlete_id, 1);
        assert_eq!(params.meet_id, 2);
        assert_eq!(params.place, 4);
    }

    #[test]
    fn test_athlete_response_collapses_missing_text() {
        let athlete = Athlete {
            id: 1,
            name: "Emma Johnson".to_string(),
            grade: 11,
            personal_record: Some("18:42".to_string()),
            events: None,
        };

        let json = serde_json::to_value(AthleteResponse::from(athlete)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "name": "Emma Johnson",
                "grade": 11,
                "personalRecord": "18:42",
                "events": ""
            })
        );
    }

    #[test]
    fn test_top_time_response_formats_date() {
        let row = TopTimeRow {
            id: 3,
            time: "16:01".to_string(),
            place: 1,
            athlete_id: 7,
            athlete_name: "Liam Carter".to_string(),
            meet_id: 2,
            meet_name: "State".to_string(),
            meet_date: NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
        };

        let json = serde_json::to_value(TopTimeResponse::from(row)).unwrap();
        assert_eq!(json["meetDate"], "2024-11-02");
        assert_eq!(json["athleteName"], "Liam Carter");
        assert_eq!(json["meetId"], 2);
    }
}
