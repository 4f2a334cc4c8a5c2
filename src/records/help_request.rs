//! Help requests raised by students

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::resource::{FieldSet, Record, ResourceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpRequest {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub requester: String,
    pub request_body: String,
    #[serde(with = "crate::resource::fields::timestamp")]
    pub request_date_time: NaiveDateTime,
}

impl Record for HelpRequest {
    type Key = i64;

    const TYPE_NAME: &'static str = "HelpRequest";
    const COLLECTION: &'static str = "helprequest";
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
            title: fields.required_str("title")?,
            requester: fields.required_str("requester")?,
            request_body: fields.required_str("requestBody")?,
            request_date_time: fields.required_timestamp("requestDateTime")?,
        })
    }
}
