//! Data models for the Nexus social feed application.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod group;
mod post;
mod report;
mod user;

pub use group::*;
pub use post::*;
pub use report::*;
pub use user::*;
