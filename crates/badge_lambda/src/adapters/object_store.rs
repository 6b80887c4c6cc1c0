pub trait BadgeStore {
    /// Writes `body` at `key`, replacing any existing object.
    fn write_object(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), String>;

    fn object_exists(&self, key: &str) -> Result<bool, String>;

    fn delete_object(&self, key: &str) -> Result<(), String>;
}
