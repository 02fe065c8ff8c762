//! Locating an installed run-time API from inside a content frame.
//!
//! Content walks from its own window up through its parents, then falls
//! back to its opener. Each window is probed for the current shape before
//! the legacy one, and the first window holding either wins.

mod client;
mod frame;

pub use client::RuntimeClient;
pub use frame::{AdapterRegistry, Frame, FrameId, WindowContext};

use std::collections::HashSet;
use std::sync::Arc;

use crate::runtime::adapter::Adapter;
use crate::runtime::model::ScormVersion;

/// Outcome of a successful search.
#[derive(Debug, Clone)]
pub struct DiscoveredApi {
    pub adapter: Adapter,
    /// Window the adapter was found on.
    pub frame: FrameId,
    /// Position of that window in the search chain (0 = starting window).
    pub position: usize,
}

impl DiscoveredApi {
    pub fn version(&self) -> ScormVersion {
        self.adapter.version()
    }
}

/// Builds the ordered search chain for `start`.
///
/// The walk stops at a window that is its own parent, has no parent, or was
/// already visited; the opener of `start` is appended last.
pub fn window_chain(start: Arc<dyn WindowContext>) -> Vec<Arc<dyn WindowContext>> {
    let mut chain: Vec<Arc<dyn WindowContext>> = Vec::new();
    let mut visited = HashSet::new();
    let opener = start.opener();

    let mut current = Some(start);
    while let Some(ctx) = current.take() {
        if !visited.insert(ctx.id()) {
            break;
        }
        let parent = ctx.parent();
        let id = ctx.id();
        chain.push(ctx);
        current = parent.filter(|p| p.id() != id);
    }

    if let Some(opener) = opener {
        chain.push(opener);
    }
    chain
}

/// Finds the first adapter in chain order. `None` means no run-time is
/// available, which callers treat as "not hosted", not as an error.
pub fn find_api(start: Arc<dyn WindowContext>) -> Option<DiscoveredApi> {
    let chain = window_chain(start);
    for (position, ctx) in chain.iter().enumerate() {
        for version in ScormVersion::DISCOVERY_ORDER {
            if let Some(adapter) = ctx.adapter(version) {
                tracing::debug!(
                    "[Discovery] Found {} at chain position {}",
                    version.global_name(),
                    position
                );
                return Some(DiscoveredApi {
                    adapter,
                    frame: ctx.id(),
                    position,
                });
            }
        }
    }
    tracing::debug!(
        "[Discovery] No run-time API in {} searched windows",
        chain.len()
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::adapter::{Scorm12Api, Scorm2004Api, share};
    use crate::runtime::session::{RuntimeOptions, RuntimeSession};
    use crate::runtime::sink::NullSink;
    use crate::runtime::store::MemoryDataStore;
    use std::sync::Weak;

    fn adapter(version: ScormVersion) -> Adapter {
        let session = share(RuntimeSession::new(
            RuntimeOptions::new(version.storage_key("scorm:d"), version),
            Arc::new(MemoryDataStore::new()),
            Arc::new(NullSink),
        ));
        match version {
            ScormVersion::Scorm2004 => Adapter::Scorm2004(Scorm2004Api::new(session)),
            ScormVersion::Scorm12 => Adapter::Scorm12(Scorm12Api::new(session)),
        }
    }

    fn dyn_frame(frame: &Arc<Frame>) -> Arc<dyn WindowContext> {
        frame.clone()
    }

    /// A browser-style top window whose parent is itself.
    struct SelfParented {
        id: FrameId,
        me: Weak<SelfParented>,
        registry: AdapterRegistry,
    }

    impl WindowContext for SelfParented {
        fn id(&self) -> FrameId {
            self.id
        }

        fn parent(&self) -> Option<Arc<dyn WindowContext>> {
            self.me.upgrade().map(|me| me as Arc<dyn WindowContext>)
        }

        fn opener(&self) -> Option<Arc<dyn WindowContext>> {
            None
        }

        fn adapter(&self, version: ScormVersion) -> Option<Adapter> {
            self.registry.get(version).cloned()
        }
    }

    #[test]
    fn chain_walks_parents_then_opener() {
        let launcher = Frame::top("launcher");
        let top = Frame::popup(&launcher, "player");
        let middle = Frame::child(&top, "wrapper");
        let content = Frame::child(&middle, "sco");

        let ids: Vec<FrameId> = window_chain(dyn_frame(&content))
            .iter()
            .map(|c| c.id())
            .collect();
        assert_eq!(ids, vec![content.id(), middle.id(), top.id()]);

        // The opener belongs to the starting window only.
        let popup_content = Frame::popup(&launcher, "direct");
        let ids: Vec<FrameId> = window_chain(dyn_frame(&popup_content))
            .iter()
            .map(|c| c.id())
            .collect();
        assert_eq!(ids, vec![popup_content.id(), launcher.id()]);
    }

    #[test]
    fn self_parented_top_ends_the_walk() {
        let top = Arc::new_cyclic(|me| SelfParented {
            id: FrameId::next(),
            me: me.clone(),
            registry: AdapterRegistry::new(),
        });
        let chain = window_chain(top.clone());
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].id(), top.id());
    }

    #[test]
    fn current_shape_wins_within_a_frame() {
        let top = Frame::top("host");
        top.install(adapter(ScormVersion::Scorm12));
        top.install(adapter(ScormVersion::Scorm2004));
        let content = Frame::child(&top, "sco");

        let found = find_api(dyn_frame(&content)).unwrap();
        assert_eq!(found.version(), ScormVersion::Scorm2004);
        assert_eq!(found.frame, top.id());
        assert_eq!(found.position, 1);
    }

    #[test]
    fn nearer_legacy_frame_beats_farther_current_frame() {
        let top = Frame::top("host");
        top.install(adapter(ScormVersion::Scorm2004));
        let wrapper = Frame::child(&top, "wrapper");
        wrapper.install(adapter(ScormVersion::Scorm12));
        let content = Frame::child(&wrapper, "sco");

        let found = find_api(dyn_frame(&content)).unwrap();
        assert_eq!(found.version(), ScormVersion::Scorm12);
        assert_eq!(found.frame, wrapper.id());
    }

    #[test]
    fn opener_is_searched_last() {
        let launcher = Frame::top("lms");
        launcher.install(adapter(ScormVersion::Scorm2004));
        let popup = Frame::popup(&launcher, "course");

        let found = find_api(dyn_frame(&popup)).unwrap();
        assert_eq!(found.frame, launcher.id());
        assert_eq!(found.position, 1);
    }

    #[test]
    fn absent_runtime_is_none() {
        let top = Frame::top("plain");
        let content = Frame::child(&top, "sco");
        assert!(find_api(dyn_frame(&content)).is_none());
    }
}
