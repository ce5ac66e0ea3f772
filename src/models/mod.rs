//! Domain models: runs, pending approvals, and the message timeline.

pub mod approval;
pub mod run;
pub mod timeline;
