pub const BADGE_CONTENT_TYPE: &str = "image/svg+xml";
pub const PUBLIC_S3_ENDPOINT: &str = "https://s3.amazonaws.com";

/// Object key for the current badge of a project branch.
///
/// Branch names may contain `/` (for example `feature/login`); they are kept
/// as-is and simply nest deeper in the bucket.
pub fn badge_object_key(project: &str, branch: &str) -> String {
    format!("{project}/{branch}.svg")
}

pub fn public_badge_url(bucket: &str, key: &str) -> String {
    format!(
        "{PUBLIC_S3_ENDPOINT}/{bucket}/{}",
        key.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_project_branch_key() {
        assert_eq!(badge_object_key("project", "branch"), "project/branch.svg");
    }

    #[test]
    fn keeps_nested_branch_names() {
        assert_eq!(
            badge_object_key("api", "feature/login"),
            "api/feature/login.svg"
        );
    }

    #[test]
    fn builds_public_url_on_global_endpoint() {
        let url = public_badge_url("badge-uploader-test", "project/branch.svg");
        assert_eq!(
            url,
            "https://s3.amazonaws.com/badge-uploader-test/project/branch.svg"
        );
    }

    #[test]
    fn same_report_maps_to_same_key() {
        assert_eq!(
            badge_object_key("project", "main"),
            badge_object_key("project", "main")
        );
    }
}
