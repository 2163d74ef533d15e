//! Heap flag derivation.
//!
//! # Responsibilities
//! - Compute min/max heap, perm and code-cache sizes from `-mem`
//! - Stay out of the way when the caller already tunes memory itself
//! - Pick the modern or legacy flag set from the probed runtime version
//!
//! # Design Decisions
//! - Pure computation: the version probe is performed by the caller,
//!   so the math here is testable without a JVM on the machine
//! - min heap == max heap, so the launched process never resizes

use std::str::FromStr;

/// Lower clamp for the permanent-generation size, in MB.
pub const PERM_MIN_MB: u64 = 256;
/// Upper clamp for the permanent-generation size, in MB.
pub const PERM_MAX_MB: u64 = 1024;

/// Runtime flag prefixes that indicate the caller already fixed a heap
/// or cache size. Any match suppresses the whole plan.
const HEAP_MARKERS: &[&str] = &["-Xms", "-Xmx", "-XX:MaxPermSize", "-XX:ReservedCodeCacheSize"];

/// Parsed runtime version, ordered so `1.7 < 1.8 < 9 < 11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
}

/// First runtime generation without a permanent generation to size.
pub const MODERN_RUNTIME: RuntimeVersion = RuntimeVersion { major: 1, minor: 8 };

impl RuntimeVersion {
    /// Extract the version from a `java -version` banner.
    ///
    /// Handles both the legacy `java version "1.8.0_181"` shape and the
    /// post-JEP-223 `openjdk version "11.0.2"` shape.
    pub fn from_banner(banner: &str) -> Option<Self> {
        let start = banner.find("version \"")? + "version \"".len();
        let rest = &banner[start..];
        let quoted = &rest[..rest.find('"')?];
        quoted.parse().ok()
    }

    /// True when this runtime no longer has a permanent generation.
    pub fn is_modern(&self) -> bool {
        *self >= MODERN_RUNTIME
    }
}

impl FromStr for RuntimeVersion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(|c: char| matches!(c, '.' | '_' | '-' | '+'));
        let major = parts.next().and_then(|p| p.parse().ok()).ok_or(())?;
        let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Ok(Self { major, minor })
    }
}

/// Memory flags derived from `-mem`. Never stored; computed on the way
/// to command assembly and turned straight into runtime flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPlan {
    /// Min and max heap, both set to the same value.
    pub heap_mb: Option<u64>,
    /// Permanent-generation cap; legacy runtimes only.
    pub perm_mb: Option<u64>,
    pub code_cache_mb: Option<u64>,
}

impl MemoryPlan {
    /// Derive the plan for `memory_mb` given the runtime args collected so
    /// far and the probed runtime version (`None` when the probe was
    /// skipped or failed, which selects the legacy flag set).
    pub fn compute(memory_mb: u64, runtime_args: &[String], version: Option<RuntimeVersion>) -> Self {
        if has_heap_marker(runtime_args) {
            return Self::default();
        }

        let perm_mb = (memory_mb / 4).clamp(PERM_MIN_MB, PERM_MAX_MB);
        let modern = version.is_some_and(|v| v.is_modern());

        Self {
            heap_mb: Some(memory_mb),
            perm_mb: if modern { None } else { Some(perm_mb) },
            code_cache_mb: Some(perm_mb / 2),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render the plan as runtime flags, in a fixed order.
    pub fn to_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(heap) = self.heap_mb {
            flags.push(format!("-Xms{heap}m"));
            flags.push(format!("-Xmx{heap}m"));
        }
        if let Some(perm) = self.perm_mb {
            flags.push(format!("-XX:MaxPermSize={perm}m"));
        }
        if let Some(cache) = self.code_cache_mb {
            flags.push(format!("-XX:ReservedCodeCacheSize={cache}m"));
        }
        flags
    }
}

/// True when any runtime arg already fixes a heap or cache size.
pub fn has_heap_marker(args: &[String]) -> bool {
    args.iter()
        .any(|arg| HEAP_MARKERS.iter().any(|marker| arg.starts_with(marker)))
}
