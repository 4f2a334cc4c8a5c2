//! Letters of recommendation requested from professors

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::resource::{FieldSet, Record, ResourceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub id: i64,
    pub requester_email: String,
    pub professor_email: String,
    pub explanation: String,
    #[serde(with = "crate::resource::fields::timestamp")]
    pub date_requested: NaiveDateTime,
    #[serde(with = "crate::resource::fields::timestamp")]
    pub date_needed: NaiveDateTime,
    pub done: bool,
}

impl Record for RecommendationRequest {
    type Key = i64;

    const TYPE_NAME: &'static str = "RecommendationRequest";
    const COLLECTION: &'static str = "recommendationrequest";
    const KEY_PARAM: &'static str = "id";

    fn key(&self) -> &i64 {
        &self.id
    }

    fn set_key(&mut self, key: i64) {
        self.id = key;
    }

    fn from_fields(fields: &FieldSet) -> ResourceResult<Self> {
        Ok(Self {
            id: 0,
            requester_email: fields.required_str("requesterEmail")?,
            professor_email: fields.required_str("professorEmail")?,
            explanation: fields.required_str("explanation")?,
            date_requested: fields.required_timestamp("dateRequested")?,
            date_needed: fields.required_timestamp("dateNeeded")?,
            done: fields.required_bool("done")?,
        })
    }
}
