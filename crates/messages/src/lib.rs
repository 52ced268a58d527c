//! Contact-form intake and dynamic form validation.
//!
//! Two halves: a schema-driven form validator (`FormSchema`) that gates
//! every public submission before anything is written, and the
//! `ContactThread` aggregate that records accepted submissions for the
//! tenant inbox.

pub mod contact;
pub mod form;

pub use contact::{
    ContactCommand, ContactEvent, ContactThread, ContactThreadId, MarkThreadRead, SubmitContact,
};
pub use form::{FieldError, FormField, FormFieldKind, FormSchema, FormValidationError};
