//! In-memory persistence for users, forms, and responses.
//!
//! Collections keep insertion order so "newest first" listings are a reverse
//! walk. Locks are released before any network call made by a handler.

use std::collections::HashMap;

use chrono::Utc;
use form_spec::{AnswerMap, FormSpec};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{AirtableAuth, ConnectedBase, Form, FormResponse, ResponseSource, User};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    forms: HashMap<String, Form>,
    responses: Vec<FormResponse>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

/// Data needed to record a new submission.
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub form_id: String,
    pub owner_id: String,
    pub airtable_record_id: Option<String>,
    pub answers: AnswerMap,
    pub source: ResponseSource,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a user, or returns the existing one with the same email.
    ///
    /// The flag is `true` when a new user was created.
    pub async fn create_user(&self, email: &str, name: Option<String>) -> (User, bool) {
        let email = normalize_email(email);
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.users.iter().find(|user| user.email == email) {
            return (existing.clone(), false);
        }

        let now = Utc::now();
        let user = User {
            id: new_id(),
            email,
            name: name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            airtable: None,
            connected_bases: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        (user, true)
    }

    pub async fn list_users(&self) -> Vec<User> {
        let inner = self.inner.read().await;
        inner.users.iter().rev().cloned().collect()
    }

    pub async fn get_user(&self, id: &str) -> Option<User> {
        let inner = self.inner.read().await;
        inner.users.iter().find(|user| user.id == id).cloned()
    }

    /// Links an Airtable login to a user, matching on Airtable user id first and
    /// email second; creates the user when neither matches.
    pub async fn upsert_airtable_user(&self, auth: AirtableAuth) -> User {
        let email = auth
            .email
            .as_deref()
            .map(normalize_email)
            .unwrap_or_else(|| format!("{}@users.airtable.com", auth.airtable_user_id));
        let now = Utc::now();

        let mut inner = self.inner.write().await;
        let position = inner
            .users
            .iter()
            .position(|user| {
                user.airtable
                    .as_ref()
                    .is_some_and(|linked| linked.airtable_user_id == auth.airtable_user_id)
            })
            .or_else(|| inner.users.iter().position(|user| user.email == email));

        match position {
            Some(index) => {
                let user = &mut inner.users[index];
                user.airtable = Some(auth);
                user.updated_at = now;
                user.clone()
            }
            None => {
                let user = User {
                    id: new_id(),
                    email,
                    name: None,
                    airtable: Some(auth),
                    connected_bases: Vec::new(),
                    created_at: now,
                    updated_at: now,
                };
                inner.users.push(user.clone());
                user
            }
        }
    }

    pub async fn set_airtable_auth(&self, user_id: &str, auth: AirtableAuth) -> bool {
        let mut inner = self.inner.write().await;
        match inner.users.iter_mut().find(|user| user.id == user_id) {
            Some(user) => {
                user.airtable = Some(auth);
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn set_connected_bases(&self, user_id: &str, bases: Vec<ConnectedBase>) {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.iter_mut().find(|user| user.id == user_id) {
            user.connected_bases = bases;
            user.updated_at = Utc::now();
        }
    }

    pub async fn create_form(&self, mut spec: FormSpec, owner_id: &str) -> Form {
        spec.id = new_id();
        let now = Utc::now();
        let form = Form {
            spec,
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut inner = self.inner.write().await;
        inner.forms.insert(form.spec.id.clone(), form.clone());
        form
    }

    pub async fn get_form(&self, id: &str) -> Option<Form> {
        let inner = self.inner.read().await;
        inner.forms.get(id).cloned()
    }

    pub async fn insert_response(&self, new: NewResponse) -> FormResponse {
        let now = Utc::now();
        let response = FormResponse {
            id: new_id(),
            form_id: new.form_id,
            owner_id: new.owner_id,
            airtable_record_id: new.airtable_record_id,
            answers: new.answers,
            source: new.source,
            deleted_in_airtable: false,
            created_at: now,
            updated_at: now,
        };
        let mut inner = self.inner.write().await;
        inner.responses.push(response.clone());
        response
    }

    pub async fn responses_for_form(&self, form_id: &str) -> Vec<FormResponse> {
        let inner = self.inner.read().await;
        inner
            .responses
            .iter()
            .rev()
            .filter(|response| response.form_id == form_id)
            .cloned()
            .collect()
    }

    /// Flags every response linked to the record as deleted upstream.
    pub async fn mark_record_deleted(&self, record_id: &str) -> usize {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let mut matched = 0;
        for response in inner
            .responses
            .iter_mut()
            .filter(|response| response.airtable_record_id.as_deref() == Some(record_id))
        {
            response.deleted_in_airtable = true;
            response.updated_at = now;
            matched += 1;
        }
        matched
    }

    /// Replaces the answers of every response linked to the record with the
    /// record's latest fields.
    ///
    /// Field ids that belong to the response's form are translated back to
    /// question keys; other field names are kept as sent.
    pub async fn sync_record_fields(&self, record_id: &str, fields: &AnswerMap) -> usize {
        let now = Utc::now();
        let mut guard = self.inner.write().await;
        let Collections {
            forms, responses, ..
        } = &mut *guard;

        let mut matched = 0;
        for response in responses
            .iter_mut()
            .filter(|response| response.airtable_record_id.as_deref() == Some(record_id))
        {
            response.answers = match forms.get(&response.form_id) {
                Some(form) => answers_from_fields(&form.spec, fields),
                None => fields.clone(),
            };
            response.source = ResponseSource::Airtable;
            response.updated_at = now;
            matched += 1;
        }
        matched
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn answers_from_fields(spec: &FormSpec, fields: &AnswerMap) -> AnswerMap {
    fields
        .iter()
        .map(|(field, value): (&String, &Value)| {
            let key = spec
                .questions
                .iter()
                .find(|question| &question.airtable_field_id == field)
                .map(|question| question.question_key.clone())
                .unwrap_or_else(|| field.clone());
            (key, value.clone())
        })
        .collect()
}
