//! Reviews of dining hall menu items

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::resource::{FieldSet, Record, ResourceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemReview {
    #[serde(default)]
    pub id: i64,
    pub item_id: i64,
    pub reviewer_email: String,
    pub stars: i32,
    #[serde(with = "crate::resource::fields::timestamp")]
    pub date_reviewed: NaiveDateTime,
    pub comments: String,
}

impl Record for MenuItemReview {
    type Key = i64;

    const TYPE_NAME: &'static str = "MenuItemReview";
    const COLLECTION: &'static str = "menuitemreview";
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
            item_id: fields.required_i64("itemId")?,
            reviewer_email: fields.required_str("reviewerEmail")?,
            stars: fields.required_i32("stars")?,
            date_reviewed: fields.required_timestamp("dateReviewed")?,
            comments: fields.required_str("comments")?,
        })
    }
}
