//! Core library for the fmb-remap command line application.
//!
//! The crate moves probation team functional mailboxes onto a new set of
//! area/LDU/team codes. IO adapters live under [`io`], the records in
//! [`model`], the remapping itself in [`reconcile`], command and diagnostic
//! generation in [`report`], and the end-to-end runs in [`pipeline`].
//! [`survey`] holds the spreadsheet checks that precede a run.

pub mod audit;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod survey;

pub use error::{RemapError, Result};
