//! Assignee `@mention` lookup
//!
//! Each assignee input field resolves typed `@mentions` against a user
//! directory that was fetched once up front. No remote calls happen while
//! typing.
//!
//! # Rules
//!
//! - input ends with `@`: suggest every known user
//! - input contains `@`: suggest users whose name or email contains the
//!   text after the last `@` (case-insensitive); no matches hides the list
//! - no `@`: hide the list
//! - selecting a user replaces everything from the last `@` with the
//!   user's email
//!
//! # Example
//!
//! ```
//! use taskboard_shared::mention::AssigneeField;
//! use taskboard_shared::models::User;
//!
//! let users = vec![User {
//!     id: "u1".into(),
//!     name: "Ada Lovelace".into(),
//!     email: "ada@example.com".into(),
//!     avatar_url: None,
//! }];
//!
//! let mut field = AssigneeField::default();
//! field.input("@lov", &users);
//! assert_eq!(field.suggestions().len(), 1);
//!
//! field.select(&users[0]);
//! assert_eq!(field.value(), "ada@example.com");
//! ```

use serde::Serialize;

use crate::api::clean_assignees;
use crate::models::User;

/// One assignee input with its suggestion list
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssigneeField {
    value: String,
    suggestions: Vec<User>,
    showing: bool,
}

impl AssigneeField {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Suggestions currently shown (empty when hidden)
    pub fn suggestions(&self) -> &[User] {
        if self.showing {
            &self.suggestions
        } else {
            &[]
        }
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    /// Replaces the field text and recomputes suggestions
    pub fn input(&mut self, text: &str, users: &[User]) {
        self.value = text.to_string();

        if text.ends_with('@') {
            self.suggestions = users.to_vec();
            self.showing = true;
            return;
        }

        match text.rfind('@') {
            Some(at) => {
                let term = text[at + 1..].to_lowercase();
                self.suggestions = users
                    .iter()
                    .filter(|user| user.matches(&term))
                    .cloned()
                    .collect();
                self.showing = !self.suggestions.is_empty();
            }
            None => self.dismiss(),
        }
    }

    /// Completes the mention with `user`'s email
    pub fn select(&mut self, user: &User) {
        if let Some(at) = self.value.rfind('@') {
            self.value.truncate(at);
            self.value.push_str(&user.email);
            self.dismiss();
        }
    }

    pub fn dismiss(&mut self) {
        self.suggestions.clear();
        self.showing = false;
    }
}

/// Suggestions for `text` without keeping field state
pub fn suggest(text: &str, users: &[User]) -> Vec<User> {
    let mut field = AssigneeField::default();
    field.input(text, users);
    field.suggestions().to_vec()
}

/// The assignee fields of a task form
#[derive(Debug, Clone, Serialize)]
pub struct AssigneeForm {
    fields: Vec<AssigneeField>,
}

impl Default for AssigneeForm {
    fn default() -> Self {
        Self {
            fields: vec![AssigneeField::default()],
        }
    }
}

impl AssigneeForm {
    pub fn fields(&self) -> &[AssigneeField] {
        &self.fields
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut AssigneeField> {
        self.fields.get_mut(index)
    }

    /// Appends an empty field and returns its index
    pub fn add_field(&mut self) -> usize {
        self.fields.push(AssigneeField::default());
        self.fields.len() - 1
    }

    /// Removes a field; the last remaining field is kept
    pub fn remove_field(&mut self, index: usize) {
        if self.fields.len() > 1 && index < self.fields.len() {
            self.fields.remove(index);
        }
    }

    /// Non-blank entries, trimmed
    pub fn emails(&self) -> Vec<String> {
        let values: Vec<String> = self.fields.iter().map(|f| f.value.clone()).collect();
        clean_assignees(&values)
    }
}
