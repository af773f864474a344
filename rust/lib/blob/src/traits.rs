use crate::error::BlobError;

/// BlobStore holds the raw bytes of uploaded images.
///
/// Keys are path-like strings, e.g. `media/3f2a.../avatar.png`. The service
/// layer only ever records keys — it never inspects file contents. The
/// default implementation (`FileStore`) maps keys to local filesystem paths
/// and can be swapped for an S3-style backend by implementing this trait.
pub trait BlobStore: Send + Sync {
    /// Store a blob. Overwrites if the key already exists.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Retrieve a blob. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Delete a blob. No-op if the key does not exist.
    fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Check whether a blob exists.
    fn exists(&self, key: &str) -> Result<bool, BlobError>;
}
