//! # Resource Handler
//!
//! One generic CRUD contract, instantiated once per resource type.
//!
//! ## Invariants
//! - Lookups that find nothing fail with `NotFound` and never write
//! - Update replaces every field and keeps the stored key
//! - Each successful write is exactly one store operation
//! - The handler never caches; the store is the source of truth

use std::sync::Arc;

use crate::auth::Role;
use crate::observability::{log_event_with_fields, Event};

use super::errors::{MessageResponse, ResourceError, ResourceResult};
use super::fields::FieldSet;
use super::record::Record;
use super::store::{RecordStore, StoreError};

/// Operations of the CRUD contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn is_read(&self) -> bool {
        matches!(self, Operation::List | Operation::Get)
    }
}

/// Minimum role per operation class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub read: Role,
    pub write: Role,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            read: Role::User,
            write: Role::Admin,
        }
    }
}

/// Wording of delete confirmations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMessage {
    /// `<Type> with id <key> deleted`
    #[default]
    TypeName,
    /// `record <key> deleted`, as older organization clients expect
    Legacy,
}

/// Generic CRUD handler for records of type `R`
pub struct ResourceHandler<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    policy: AccessPolicy,
    delete_message: DeleteMessage,
}

impl<R: Record> ResourceHandler<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self {
            store,
            policy: AccessPolicy::default(),
            delete_message: DeleteMessage::default(),
        }
    }

    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_delete_message(mut self, delete_message: DeleteMessage) -> Self {
        self.delete_message = delete_message;
        self
    }

    /// Minimum role the gate must enforce before `op` runs
    pub fn required_role(&self, op: Operation) -> Role {
        if op.is_read() {
            self.policy.read
        } else {
            self.policy.write
        }
    }

    /// Parse the key a get, update or delete addresses
    ///
    /// Any parseable value is accepted; keys nothing was stored under
    /// surface later as `NotFound`.
    pub fn parse_key(&self, fields: &FieldSet) -> ResourceResult<R::Key> {
        fields
            .required_parse::<R::Key>(R::KEY_PARAM, "a valid key")
            .map_err(|e| self.malformed_input(e))
    }

    /// Log a rejected input and hand the error back
    pub fn malformed_input(&self, e: ResourceError) -> ResourceError {
        log_event_with_fields(
            Event::MalformedInput,
            &[("resource", R::TYPE_NAME), ("reason", &e.to_string())],
        );
        e
    }

    pub fn list_all(&self) -> ResourceResult<Vec<R>> {
        self.store.find_all().map_err(|e| self.store_failure(e))
    }

    pub fn get_by_key(&self, key: &R::Key) -> ResourceResult<R> {
        self.find_existing(key)
    }

    /// Build a record from named inputs and persist it
    pub fn create(&self, fields: &FieldSet) -> ResourceResult<R> {
        let record = R::from_fields(fields).map_err(|e| self.malformed_input(e))?;

        let saved = self.store.save(record).map_err(|e| self.store_failure(e))?;
        log_event_with_fields(
            Event::RecordCreated,
            &[("resource", R::TYPE_NAME), ("key", &saved.key().to_string())],
        );
        Ok(saved)
    }

    /// Replace every field of the record at `key` with `replacement`'s
    ///
    /// Whatever key `replacement` carries is discarded.
    pub fn update(&self, key: &R::Key, replacement: R) -> ResourceResult<R> {
        let existing = self.find_existing(key)?;

        let mut updated = replacement;
        updated.set_key(existing.key().clone());

        let saved = self.store.save(updated).map_err(|e| self.store_failure(e))?;
        log_event_with_fields(
            Event::RecordUpdated,
            &[("resource", R::TYPE_NAME), ("key", &key.to_string())],
        );
        Ok(saved)
    }

    pub fn delete(&self, key: &R::Key) -> ResourceResult<MessageResponse> {
        let existing = self.find_existing(key)?;
        self.store
            .delete(&existing)
            .map_err(|e| self.store_failure(e))?;

        log_event_with_fields(
            Event::RecordDeleted,
            &[("resource", R::TYPE_NAME), ("key", &key.to_string())],
        );
        Ok(MessageResponse::new(self.deleted_message(key)))
    }

    fn deleted_message(&self, key: &R::Key) -> String {
        match self.delete_message {
            DeleteMessage::TypeName => format!("{} with id {} deleted", R::TYPE_NAME, key),
            DeleteMessage::Legacy => format!("record {} deleted", key),
        }
    }

    fn find_existing(&self, key: &R::Key) -> ResourceResult<R> {
        match self.store.find_by_key(key) {
            Ok(Some(record)) => Ok(record),
            Ok(None) => {
                log_event_with_fields(
                    Event::RecordNotFound,
                    &[("resource", R::TYPE_NAME), ("key", &key.to_string())],
                );
                Err(ResourceError::not_found(R::TYPE_NAME, key))
            }
            Err(e) => Err(self.store_failure(e)),
        }
    }

    fn store_failure(&self, e: StoreError) -> ResourceError {
        log_event_with_fields(
            Event::StoreFailure,
            &[("resource", R::TYPE_NAME), ("error", &e.to_string())],
        );
        ResourceError::Storage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{HelpRequest, Organization};
    use crate::resource::store::InMemoryRecordStore;

    fn help_handler() -> (Arc<InMemoryRecordStore<HelpRequest>>, ResourceHandler<HelpRequest>) {
        let store = Arc::new(InMemoryRecordStore::new());
        let handler = ResourceHandler::new(store.clone() as Arc<dyn RecordStore<HelpRequest>>);
        (store, handler)
    }

    fn help_fields(title: &str) -> FieldSet {
        [
            ("title", title),
            ("requester", "someuser"),
            ("requestBody", "test request body 1"),
            ("requestDateTime", "2022-01-03T00:00:00"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_create_then_get_round_trip() {
        let (_, handler) = help_handler();
        let created = handler.create(&help_fields("test request 1")).unwrap();
        assert_eq!(created.id, 1);

        let fetched = handler.get_by_key(&created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(handler.list_all().unwrap(), vec![created]);
    }

    #[test]
    fn test_malformed_create_does_not_write() {
        let (store, handler) = help_handler();
        let fields: FieldSet = [
            ("title", "x"),
            ("requester", "u"),
            ("requestBody", "b"),
            ("requestDateTime", "tomorrow-ish"),
        ]
        .into_iter()
        .collect();

        let err = handler.create(&fields).unwrap_err();
        assert_eq!(err.kind(), "MalformedInput");
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_key_operations_not_found() {
        let (store, handler) = help_handler();
        let replacement = handler.create(&help_fields("a")).unwrap();

        let expected = ResourceError::not_found("HelpRequest", 99);
        assert_eq!(handler.get_by_key(&99).unwrap_err(), expected);
        assert_eq!(handler.update(&99, replacement.clone()).unwrap_err(), expected);
        assert_eq!(handler.delete(&99).unwrap_err(), expected);
        assert_eq!(
            expected.to_string(),
            "HelpRequest with id 99 not found"
        );
        assert_eq!(store.find_all().unwrap(), vec![replacement]);
    }

    #[test]
    fn test_parse_key_accepts_never_assigned_values() {
        let (_, handler) = help_handler();
        for raw in ["0", "-5"] {
            let fields: FieldSet = [("id", raw)].into_iter().collect();
            let key = handler.parse_key(&fields).unwrap();
            assert_eq!(
                handler.get_by_key(&key).unwrap_err().to_string(),
                format!("HelpRequest with id {} not found", raw)
            );
        }

        let fields: FieldSet = [("id", "seven")].into_iter().collect();
        assert_eq!(handler.parse_key(&fields).unwrap_err().kind(), "MalformedInput");
        assert_eq!(
            handler.parse_key(&FieldSet::default()).unwrap_err().to_string(),
            "Required parameter 'id' is not present"
        );
    }

    #[test]
    fn test_parse_key_allows_empty_natural_key() {
        let store: Arc<dyn RecordStore<Organization>> = Arc::new(InMemoryRecordStore::new());
        let handler = ResourceHandler::new(store);
        let fields: FieldSet = [("orgCode", "")].into_iter().collect();

        let key = handler.parse_key(&fields).unwrap();
        assert_eq!(handler.get_by_key(&key).unwrap_err().kind(), "NotFound");
    }

    #[test]
    fn test_natural_key_update_keeps_addressed_code() {
        let store = Arc::new(InMemoryRecordStore::<Organization>::new());
        let handler = ResourceHandler::new(store.clone() as Arc<dyn RecordStore<Organization>>);
        let fields: FieldSet = [
            ("orgCode", "SKY"),
            ("orgTranslationShort", "SKYDIVING CLUB"),
            ("orgTranslation", "SKYDIVING CLUB AT UCSB"),
            ("inactive", "true"),
        ]
        .into_iter()
        .collect();
        let created = handler.create(&fields).unwrap();

        let mut replacement = created.clone();
        replacement.org_code = "OTHER".to_string();
        replacement.inactive = false;

        let updated = handler.update(&"SKY".to_string(), replacement).unwrap();
        assert_eq!(updated.org_code, "SKY");
        assert!(!updated.inactive);
        assert!(store.find_by_key(&"OTHER".to_string()).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_preserves_key_and_replaces_fields() {
        let (store, handler) = help_handler();
        let created = handler.create(&help_fields("original")).unwrap();

        let mut replacement = created.clone();
        replacement.id = 500;
        replacement.title = "changed".to_string();
        replacement.request_body = String::new();

        let updated = handler.update(&created.id, replacement).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "changed");
        assert_eq!(updated.request_body, "");

        assert!(store.find_by_key(&500).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_is_final() {
        let (_, handler) = help_handler();
        let created = handler.create(&help_fields("doomed")).unwrap();

        let confirmation = handler.delete(&created.id).unwrap();
        assert_eq!(confirmation.message, "HelpRequest with id 1 deleted");
        assert_eq!(
            handler.get_by_key(&created.id).unwrap_err().to_string(),
            "HelpRequest with id 1 not found"
        );
        assert!(handler.delete(&created.id).is_err());
    }

    #[test]
    fn test_legacy_delete_message() {
        let store: Arc<dyn RecordStore<Organization>> = Arc::new(InMemoryRecordStore::new());
        let handler = ResourceHandler::new(store).with_delete_message(DeleteMessage::Legacy);
        let fields: FieldSet = [
            ("orgCode", "ZPR"),
            ("orgTranslationShort", "ZETA PHI RHO"),
            ("orgTranslation", "ZETA PHI RHO"),
            ("inactive", "false"),
        ]
        .into_iter()
        .collect();
        handler.create(&fields).unwrap();

        let confirmation = handler.delete(&"ZPR".to_string()).unwrap();
        assert_eq!(confirmation.message, "record ZPR deleted");
    }

    #[test]
    fn test_required_roles() {
        let (_, handler) = help_handler();
        assert_eq!(handler.required_role(Operation::List), Role::User);
        assert_eq!(handler.required_role(Operation::Get), Role::User);
        assert_eq!(handler.required_role(Operation::Create), Role::Admin);
        assert_eq!(handler.required_role(Operation::Update), Role::Admin);
        assert_eq!(handler.required_role(Operation::Delete), Role::Admin);
    }

    #[test]
    fn test_custom_policy() {
        let (_, handler) = help_handler();
        let handler = handler.with_policy(AccessPolicy {
            read: Role::Admin,
            write: Role::Admin,
        });
        assert_eq!(handler.required_role(Operation::List), Role::Admin);
    }
}
