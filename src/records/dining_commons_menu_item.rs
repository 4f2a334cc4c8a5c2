//! Items served at a dining commons station

use serde::{Deserialize, Serialize};

use crate::resource::{FieldSet, Record, ResourceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningCommonsMenuItem {
    #[serde(default)]
    pub id: i64,
    pub dining_commons_code: String,
    pub name: String,
    pub station: String,
}

impl Record for DiningCommonsMenuItem {
    type Key = i64;

    const TYPE_NAME: &'static str = "UCSBDiningCommonsMenuItem";
    const COLLECTION: &'static str = "UCSBDiningCommonsMenuItem";
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
            dining_commons_code: fields.required_str("diningCommonsCode")?,
            name: fields.required_str("name")?,
            station: fields.required_str("station")?,
        })
    }
}
