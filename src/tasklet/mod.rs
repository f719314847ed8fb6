//! Tasklets are single units of work run by a tasklet step.

/// Hands documents to the host's file-save capability.
pub mod download;
