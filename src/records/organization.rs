//! Registered student organizations, keyed by their organization code

use serde::{Deserialize, Serialize};

use crate::resource::{FieldSet, Record, ResourceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default)]
    pub org_code: String,
    pub org_translation_short: String,
    pub org_translation: String,
    pub inactive: bool,
}

impl Record for Organization {
    type Key = String;

    const TYPE_NAME: &'static str = "UCSBOrganization";
    const COLLECTION: &'static str = "UCSBOrganization";
    const KEY_PARAM: &'static str = "orgCode";

    fn key(&self) -> &String {
        &self.org_code
    }

    fn set_key(&mut self, key: String) {
        self.org_code = key;
    }

    fn from_fields(fields: &FieldSet) -> ResourceResult<Self> {
        Ok(Self {
            org_code: fields.key("orgCode")?,
            org_translation_short: fields.required_str("orgTranslationShort")?,
            org_translation: fields.required_str("orgTranslation")?,
            inactive: fields.required_bool("inactive")?,
        })
    }
}
