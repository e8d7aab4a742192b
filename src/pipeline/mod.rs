//! Pipeline stages for document analysis.
//!
//! Each submodule implements exactly one step of the two-call protocol.
//! Keeping stages separate makes each independently testable and lets us
//! point the HTTP stages at a mock server without touching acquisition.
//!
//! ## Data Flow
//!
//! ```text
//! acquire ──▶ upload ──▶ chat
//! (bytes+MIME)  (/files)   (/chat/completions)
//! ```
//!
//! 1. [`acquire`] — read bytes, settle the MIME type and filename, decode
//!    the optional preview image
//! 2. [`upload`]  — multipart POST to the Files endpoint; the only stage
//!    that decides the `purpose` tag
//! 3. [`chat`]    — build the two-part user message referencing the file id
//!    and extract the reply text; the only stage with a retry loop
//!
//! The invariant between stages 2 and 3 is strict: `chat` takes a
//! [`upload::FileHandle`] by value, so a chat request cannot be constructed
//! unless the upload produced one.

pub mod acquire;
pub mod chat;
pub mod upload;
