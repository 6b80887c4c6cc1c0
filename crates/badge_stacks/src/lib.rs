//! Declarative stack definitions for the badge functions.
//!
//! Each stack is a plain list of CloudFormation resources that can be
//! synthesized to a JSON template. The definitions carry the deployment
//! settings the handlers rely on: bucket environment variables, zero async
//! retries and the API throttle.

pub mod constructs;
pub mod stacks;
pub mod template;

pub use stacks::{badge_manager_stack, badge_uploader_stack, FunctionSettings};
pub use template::{Resource, Stack};
