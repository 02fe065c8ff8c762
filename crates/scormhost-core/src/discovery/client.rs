//! Content-side wrapper that discovers the API lazily and drives it.

use std::sync::Arc;

use crate::discovery::{WindowContext, find_api};
use crate::runtime::adapter::Adapter;
use crate::runtime::model::ScormVersion;

/// What packaged content (or a host page acting like it) uses to talk to
/// the emulated LMS.
///
/// Discovery is deferred until first use and retried while nothing has been
/// found. Every call returns a plain value; an absent run-time reads as
/// `false`/`None`.
pub struct RuntimeClient {
    window: Arc<dyn WindowContext>,
    api: Option<Adapter>,
    initialized: bool,
}

impl RuntimeClient {
    pub fn new(window: Arc<dyn WindowContext>) -> Self {
        Self {
            window,
            api: None,
            initialized: false,
        }
    }

    fn discover(&mut self) -> Option<&Adapter> {
        if self.api.is_none() {
            self.api = find_api(self.window.clone()).map(|found| found.adapter);
        }
        self.api.as_ref()
    }

    /// The shape in use, discovering it if needed.
    pub fn version(&mut self) -> Option<ScormVersion> {
        self.discover().map(Adapter::version)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            return true;
        }
        let Some(api) = self.discover() else {
            return false;
        };
        let ok = api.initialize() == "true";
        self.initialized = ok;
        ok
    }

    pub fn terminate(&mut self) -> bool {
        if !self.initialized {
            return true;
        }
        let Some(api) = self.api.as_ref() else {
            return false;
        };
        let ok = api.terminate() == "true";
        self.initialized = !ok;
        ok
    }

    pub fn get_value(&mut self, element: &str) -> Option<String> {
        self.ensure_initialized();
        self.api.as_ref().map(|api| api.get_value(element))
    }

    pub fn set_value(&mut self, element: &str, value: &str) -> bool {
        self.ensure_initialized();
        self.api
            .as_ref()
            .is_some_and(|api| api.set_value(element, value) == "true")
    }

    pub fn commit(&mut self) -> bool {
        self.ensure_initialized();
        self.api.as_ref().is_some_and(|api| api.commit() == "true")
    }

    pub fn last_error(&self) -> Option<String> {
        self.api.as_ref().map(Adapter::get_last_error)
    }

    fn ensure_initialized(&mut self) {
        if !self.initialized {
            self.initialize();
        }
    }
}
