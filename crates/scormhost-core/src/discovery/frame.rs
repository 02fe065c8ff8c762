//! Window contexts and their adapter registries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::runtime::adapter::Adapter;
use crate::runtime::model::ScormVersion;

/// Identity of a window context, used for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        FrameId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Adapters installed on one window, keyed by version.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    scorm2004: Option<Adapter>,
    scorm12: Option<Adapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `adapter` in the slot for its version, returning what it replaced.
    pub fn install(&mut self, adapter: Adapter) -> Option<Adapter> {
        let slot = match adapter.version() {
            ScormVersion::Scorm2004 => &mut self.scorm2004,
            ScormVersion::Scorm12 => &mut self.scorm12,
        };
        slot.replace(adapter)
    }

    pub fn remove(&mut self, version: ScormVersion) -> Option<Adapter> {
        match version {
            ScormVersion::Scorm2004 => self.scorm2004.take(),
            ScormVersion::Scorm12 => self.scorm12.take(),
        }
    }

    pub fn get(&self, version: ScormVersion) -> Option<&Adapter> {
        match version {
            ScormVersion::Scorm2004 => self.scorm2004.as_ref(),
            ScormVersion::Scorm12 => self.scorm12.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scorm2004.is_none() && self.scorm12.is_none()
    }
}

/// A window in the hosting hierarchy, as seen by discovery.
///
/// A top-level window either has no parent or reports itself as its own
/// parent; both end the upward walk.
pub trait WindowContext: Send + Sync {
    fn id(&self) -> FrameId;

    fn parent(&self) -> Option<Arc<dyn WindowContext>>;

    /// The window that opened this one, if it was opened as a popup.
    fn opener(&self) -> Option<Arc<dyn WindowContext>>;

    fn adapter(&self, version: ScormVersion) -> Option<Adapter>;
}

/// The concrete window context used by the host.
pub struct Frame {
    id: FrameId,
    name: String,
    parent: Option<Arc<Frame>>,
    opener: Option<Arc<Frame>>,
    registry: RwLock<AdapterRegistry>,
}

impl Frame {
    /// Creates a top-level window.
    pub fn top(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: FrameId::next(),
            name: name.into(),
            parent: None,
            opener: None,
            registry: RwLock::new(AdapterRegistry::new()),
        })
    }

    /// Creates a frame nested inside `parent`.
    pub fn child(parent: &Arc<Frame>, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: FrameId::next(),
            name: name.into(),
            parent: Some(parent.clone()),
            opener: None,
            registry: RwLock::new(AdapterRegistry::new()),
        })
    }

    /// Creates a popup window opened by `opener`.
    pub fn popup(opener: &Arc<Frame>, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: FrameId::next(),
            name: name.into(),
            parent: None,
            opener: Some(opener.clone()),
            registry: RwLock::new(AdapterRegistry::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn install(&self, adapter: Adapter) -> Option<Adapter> {
        tracing::debug!(
            "[Frame] Installing {} on frame '{}'",
            adapter.version().global_name(),
            self.name
        );
        self.registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .install(adapter)
    }

    pub fn uninstall(&self, version: ScormVersion) -> Option<Adapter> {
        self.registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(version)
    }

    pub fn registry(&self) -> AdapterRegistry {
        self.registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl WindowContext for Frame {
    fn id(&self) -> FrameId {
        self.id
    }

    fn parent(&self) -> Option<Arc<dyn WindowContext>> {
        self.parent
            .clone()
            .map(|p| p as Arc<dyn WindowContext>)
    }

    fn opener(&self) -> Option<Arc<dyn WindowContext>> {
        self.opener
            .clone()
            .map(|o| o as Arc<dyn WindowContext>)
    }

    fn adapter(&self, version: ScormVersion) -> Option<Adapter> {
        self.registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(version)
            .cloned()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
