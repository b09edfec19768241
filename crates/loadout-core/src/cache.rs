//! Project resolution service with memoization.
//!
//! Entries are keyed by canonical descriptor path and replaced wholesale
//! when the descriptor's modification time passes the stored load time.
//! The cache is an explicit object owned by the caller; independent services
//! never share entries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::config::ResolverConfig;
use crate::diagnostics::Diagnostics;
use crate::error::ResolveError;
use crate::fs::canonicalize_lenient;
use crate::project::loader::load_project;
use crate::project::ResolvedProject;

/// Resolves project compile configurations, memoizing per descriptor path.
#[derive(Debug)]
pub struct ProjectResolver {
    config: ResolverConfig,
    diagnostics: Diagnostics,
    cache: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<PathBuf, Arc<ResolvedProject>>,
    computations: u64,
}

impl ProjectResolver {
    pub fn new(config: ResolverConfig, diagnostics: Diagnostics) -> Self {
        Self {
            config,
            diagnostics,
            cache: Mutex::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Resolve the compile configuration for the descriptor at `path`,
    /// reusing the cached snapshot while the descriptor is unmodified.
    pub fn resolve(&self, path: &Path) -> Result<Arc<ResolvedProject>, ResolveError> {
        let canonical = canonicalize_lenient(path);

        let cached = {
            let state = self.cache.lock().expect("resolution cache poisoned");
            state.entries.get(&canonical).cloned()
        };
        if let Some(entry) = cached {
            if !descriptor_newer_than(&canonical, entry.last_load_time) {
                tracing::debug!(project = %canonical.display(), "resolution cache hit");
                return Ok(entry);
            }
            tracing::debug!(project = %canonical.display(), "descriptor changed; recomputing");
        }

        // Computed outside the lock; a concurrent first resolution of the
        // same path may race here, and the later store wins wholesale.
        let project = Arc::new(load_project(&canonical, &self.config, &self.diagnostics)?);

        let mut state = self.cache.lock().expect("resolution cache poisoned");
        state.computations += 1;
        state.entries.insert(canonical, project.clone());
        Ok(project)
    }

    /// Drop every cached entry; the next `resolve` for any path recomputes.
    pub fn invalidate_all(&self) {
        let mut state = self.cache.lock().expect("resolution cache poisoned");
        let dropped = state.entries.len();
        state.entries.clear();
        tracing::debug!(dropped, "resolution cache invalidated");
    }

    /// External change notification. Invalidation is coarse: any changed
    /// file clears the whole cache.
    pub fn mark_changed(&self, changed: &Path) {
        tracing::debug!(changed = %changed.display(), "change notification");
        self.invalidate_all();
    }

    /// Number of full recomputations performed so far.
    pub fn computations(&self) -> u64 {
        self.cache.lock().expect("resolution cache poisoned").computations
    }
}

impl Default for ProjectResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default(), Diagnostics::default())
    }
}

/// Whether the descriptor at `path` was modified after `loaded_at`. An
/// unreadable mtime counts as modified, forcing a recomputation.
fn descriptor_newer_than(path: &Path, loaded_at: DateTime<Utc>) -> bool {
    match std::fs::metadata(path).and_then(|metadata| metadata.modified()) {
        Ok(modified) => DateTime::<Utc>::from(modified) > loaded_at,
        Err(_) => true,
    }
}
