use crate::error::ErrorPolicy;
use crate::race::DEFAULT_RACE_CAPACITY;

/// Size limits applied when an archive is unpacked into memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLimits {
    /// Largest single entry, uncompressed
    pub max_entry_size: u64,
    /// Largest sum of all entries of one archive, uncompressed
    pub max_total_size: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_entry_size: 50 * 1024 * 1024,  // 50 MB per entry
            max_total_size: 500 * 1024 * 1024, // 500 MB per archive
        }
    }
}

/// Engine-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deepest nesting analyzed before an entity is reported as `depth-limit`
    pub max_depth: usize,
    /// Tokens an XML racing candidate may lag behind
    pub race_capacity: usize,
    pub error_policy: ErrorPolicy,
    pub archive_limits: ArchiveLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            race_capacity: DEFAULT_RACE_CAPACITY,
            error_policy: ErrorPolicy::Contain,
            archive_limits: ArchiveLimits::default(),
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }
}

/// Builder for [`EngineConfig`]
///
/// # Example
/// ```ignore
/// let config = EngineConfig::builder()
///     .max_depth(8)
///     .error_policy(ErrorPolicy::Propagate)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Create a new builder with default limits
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the per-candidate queue capacity for XML racing (at least 1)
    pub fn race_capacity(mut self, capacity: usize) -> Self {
        self.config.race_capacity = capacity.max(1);
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.error_policy = policy;
        self
    }

    /// Set maximum individual archive entry size
    pub fn max_entry_size(mut self, size: u64) -> Self {
        self.config.archive_limits.max_entry_size = size;
        self
    }

    /// Set maximum total unpacked size of one archive
    pub fn max_total_size(mut self, size: u64) -> Self {
        self.config.archive_limits.max_total_size = size;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}
