//! Environment variable names shared by the functions and their stacks.

pub const UPLOADER_BUCKET_VAR: &str = "BADGE_UPLOADER_BUCKET";
pub const MANAGER_BUCKET_VAR: &str = "BADGE_MANAGER_BUCKET";
pub const REGION_VAR: &str = "REGION";
