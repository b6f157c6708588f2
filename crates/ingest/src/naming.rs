use time::OffsetDateTime;

const HASH_MODULUS: u64 = 1_000_000_000;

/// Issues destination file names for extracted photos.
///
/// Names look like `photo-<timestamp_ms>-<index>-<namehash><ext>`. The index
/// is shared by every archive in a run and never resets, so two names can't
/// collide even when the clock hasn't moved and the original names are equal.
#[derive(Debug, Default)]
pub struct NameGenerator {
    next_index: u64,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name for `original` (the entry name inside the archive) stamped with
    /// the current time. `extension` includes its leading dot.
    pub fn generate(&mut self, original: &str, extension: &str) -> String {
        let now = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        self.generate_at(now, original, extension)
    }

    pub fn generate_at(&mut self, timestamp_ms: i128, original: &str, extension: &str) -> String {
        let index = self.next_index;
        self.next_index += 1;
        format!("photo-{timestamp_ms}-{index}-{}{extension}", name_hash(original))
    }

    /// How many names have been issued so far.
    pub fn issued(&self) -> u64 {
        self.next_index
    }
}

/// Stable digest of an entry name, reduced to at most nine decimal digits.
fn name_hash(original: &str) -> u64 {
    let digest = blake3::hash(original.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(prefix) % HASH_MODULUS
}
