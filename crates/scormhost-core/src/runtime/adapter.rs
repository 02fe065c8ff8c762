//! Version adapters: the two legacy method surfaces over a session.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::runtime::model::{ScormVersion, wire_bool};
use crate::runtime::session::RuntimeSession;

/// A session shared between its adapter and the host.
pub type SharedSession = Arc<Mutex<RuntimeSession>>;

pub fn share(session: RuntimeSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

fn lock(session: &SharedSession) -> MutexGuard<'_, RuntimeSession> {
    // A poisoned session still holds consistent data: every mutation is a
    // single map insert or state assignment.
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Method names of the current (`API_1484_11`) shape.
pub const SCORM2004_METHODS: [&str; 8] = [
    "Initialize",
    "Terminate",
    "GetValue",
    "SetValue",
    "Commit",
    "GetLastError",
    "GetErrorString",
    "GetDiagnostic",
];

/// Method names of the legacy (`API`) shape.
pub const SCORM12_METHODS: [&str; 8] = [
    "LMSInitialize",
    "LMSFinish",
    "LMSGetValue",
    "LMSSetValue",
    "LMSCommit",
    "LMSGetLastError",
    "LMSGetErrorString",
    "LMSGetDiagnostic",
];

fn arg<'a>(args: &[&'a str], index: usize) -> &'a str {
    args.get(index).copied().unwrap_or("")
}

/// The current-version façade.
#[derive(Clone)]
pub struct Scorm2004Api {
    session: SharedSession,
}

impl Scorm2004Api {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn initialize(&self, _param: &str) -> String {
        wire_bool(lock(&self.session).initialize())
    }

    pub fn terminate(&self, _param: &str) -> String {
        wire_bool(lock(&self.session).terminate())
    }

    pub fn get_value(&self, element: &str) -> String {
        lock(&self.session).get_value(element)
    }

    pub fn set_value(&self, element: &str, value: &str) -> String {
        wire_bool(lock(&self.session).set_value(element, value))
    }

    pub fn commit(&self, _param: &str) -> String {
        wire_bool(lock(&self.session).commit())
    }

    pub fn get_last_error(&self) -> String {
        lock(&self.session).last_error().to_string()
    }

    pub fn get_error_string(&self, code: &str) -> String {
        lock(&self.session).error_string(code).to_string()
    }

    pub fn get_diagnostic(&self, code: &str) -> String {
        lock(&self.session).diagnostic(code)
    }

    /// Calls a method by its wire name. `None` if this shape has no such method.
    pub fn invoke(&self, method: &str, args: &[&str]) -> Option<String> {
        let result = match method {
            "Initialize" => self.initialize(arg(args, 0)),
            "Terminate" => self.terminate(arg(args, 0)),
            "GetValue" => self.get_value(arg(args, 0)),
            "SetValue" => self.set_value(arg(args, 0), arg(args, 1)),
            "Commit" => self.commit(arg(args, 0)),
            "GetLastError" => self.get_last_error(),
            "GetErrorString" => self.get_error_string(arg(args, 0)),
            "GetDiagnostic" => self.get_diagnostic(arg(args, 0)),
            _ => return None,
        };
        Some(result)
    }
}

/// The legacy-version façade.
#[derive(Clone)]
pub struct Scorm12Api {
    session: SharedSession,
}

impl Scorm12Api {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn lms_initialize(&self, _param: &str) -> String {
        wire_bool(lock(&self.session).initialize())
    }

    pub fn lms_finish(&self, _param: &str) -> String {
        wire_bool(lock(&self.session).terminate())
    }

    pub fn lms_get_value(&self, element: &str) -> String {
        lock(&self.session).get_value(element)
    }

    pub fn lms_set_value(&self, element: &str, value: &str) -> String {
        wire_bool(lock(&self.session).set_value(element, value))
    }

    pub fn lms_commit(&self, _param: &str) -> String {
        wire_bool(lock(&self.session).commit())
    }

    pub fn lms_get_last_error(&self) -> String {
        lock(&self.session).last_error().to_string()
    }

    pub fn lms_get_error_string(&self, code: &str) -> String {
        lock(&self.session).error_string(code).to_string()
    }

    pub fn lms_get_diagnostic(&self, code: &str) -> String {
        lock(&self.session).diagnostic(code)
    }

    /// Calls a method by its wire name. `None` if this shape has no such method.
    pub fn invoke(&self, method: &str, args: &[&str]) -> Option<String> {
        let result = match method {
            "LMSInitialize" => self.lms_initialize(arg(args, 0)),
            "LMSFinish" => self.lms_finish(arg(args, 0)),
            "LMSGetValue" => self.lms_get_value(arg(args, 0)),
            "LMSSetValue" => self.lms_set_value(arg(args, 0), arg(args, 1)),
            "LMSCommit" => self.lms_commit(arg(args, 0)),
            "LMSGetLastError" => self.lms_get_last_error(),
            "LMSGetErrorString" => self.lms_get_error_string(arg(args, 0)),
            "LMSGetDiagnostic" => self.lms_get_diagnostic(arg(args, 0)),
            _ => return None,
        };
        Some(result)
    }
}

/// An installed adapter of either shape.
///
/// The version-neutral methods let callers drive whichever shape they found
/// without probing for method names.
#[derive(Clone)]
pub enum Adapter {
    Scorm2004(Scorm2004Api),
    Scorm12(Scorm12Api),
}

impl Adapter {
    pub fn version(&self) -> ScormVersion {
        match self {
            Adapter::Scorm2004(_) => ScormVersion::Scorm2004,
            Adapter::Scorm12(_) => ScormVersion::Scorm12,
        }
    }

    pub fn session(&self) -> &SharedSession {
        match self {
            Adapter::Scorm2004(api) => api.session(),
            Adapter::Scorm12(api) => api.session(),
        }
    }

    pub fn method_names(&self) -> &'static [&'static str; 8] {
        match self {
            Adapter::Scorm2004(_) => &SCORM2004_METHODS,
            Adapter::Scorm12(_) => &SCORM12_METHODS,
        }
    }

    pub fn initialize(&self) -> String {
        match self {
            Adapter::Scorm2004(api) => api.initialize(""),
            Adapter::Scorm12(api) => api.lms_initialize(""),
        }
    }

    pub fn terminate(&self) -> String {
        match self {
            Adapter::Scorm2004(api) => api.terminate(""),
            Adapter::Scorm12(api) => api.lms_finish(""),
        }
    }

    pub fn get_value(&self, element: &str) -> String {
        match self {
            Adapter::Scorm2004(api) => api.get_value(element),
            Adapter::Scorm12(api) => api.lms_get_value(element),
        }
    }

    pub fn set_value(&self, element: &str, value: &str) -> String {
        match self {
            Adapter::Scorm2004(api) => api.set_value(element, value),
            Adapter::Scorm12(api) => api.lms_set_value(element, value),
        }
    }

    pub fn commit(&self) -> String {
        match self {
            Adapter::Scorm2004(api) => api.commit(""),
            Adapter::Scorm12(api) => api.lms_commit(""),
        }
    }

    pub fn get_last_error(&self) -> String {
        match self {
            Adapter::Scorm2004(api) => api.get_last_error(),
            Adapter::Scorm12(api) => api.lms_get_last_error(),
        }
    }

    pub fn invoke(&self, method: &str, args: &[&str]) -> Option<String> {
        match self {
            Adapter::Scorm2004(api) => api.invoke(method, args),
            Adapter::Scorm12(api) => api.invoke(method, args),
        }
    }

    /// True if both handles drive the same session.
    pub fn same_session(&self, other: &Adapter) -> bool {
        Arc::ptr_eq(self.session(), other.session())
    }
}

impl std::fmt::Debug for Scorm2004Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Scorm2004Api")
    }
}

impl std::fmt::Debug for Scorm12Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Scorm12Api")
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Adapter").field(&self.version()).finish()
    }
}
