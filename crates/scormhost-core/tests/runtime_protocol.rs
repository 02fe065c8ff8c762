use std::sync::{Arc, Mutex};
use std::time::Duration;

use scormhost_core::discovery::{Frame, RuntimeClient, WindowContext};
use scormhost_core::runtime::{
    DataMap, MemoryDataStore, ScormVersion, SessionState, install_runtime,
};

type Received = Arc<Mutex<Vec<(ScormVersion, DataMap)>>>;

fn recording_sink() -> (Received, impl Fn(ScormVersion, DataMap) + Send + Sync + 'static) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let clone = received.clone();
    (received, move |version: ScormVersion, snapshot: DataMap| {
        clone.lock().unwrap().push((version, snapshot))
    })
}

#[tokio::test(start_paused = true)]
async fn content_in_nested_frame_reaches_host_runtime() {
    let host = Frame::top("player");
    let store = Arc::new(MemoryDataStore::new());
    let (received, sink) = recording_sink();
    let installed = install_runtime(
        &host,
        "scorm_pkg",
        None,
        store.clone(),
        Arc::new(sink),
        Duration::from_millis(800),
    );

    let content = Frame::child(&Frame::child(&host, "course"), "sco");
    let mut client = RuntimeClient::new(content as Arc<dyn WindowContext>);

    assert_eq!(client.version(), Some(ScormVersion::Scorm2004));
    assert!(client.initialize());
    assert!(client.set_value("cmi.location", "page-3"));
    assert_eq!(client.get_value("cmi.location").as_deref(), Some("page-3"));
    assert_eq!(client.last_error().as_deref(), Some("0"));

    // Nothing reaches the sink until the write burst settles.
    assert!(received.lock().unwrap().is_empty());
    tokio::time::sleep(Duration::from_millis(801)).await;
    tokio::task::yield_now().await;
    assert_eq!(received.lock().unwrap().len(), 1);

    assert!(client.commit());
    assert!(client.terminate());
    let received = received.lock().unwrap();
    assert_eq!(received.len(), 3);
    assert!(received.iter().all(|(v, _)| *v == ScormVersion::Scorm2004));
    assert_eq!(received[2].1.get("cmi.location").map(String::as_str), Some("page-3"));

    let session = installed.session(ScormVersion::Scorm2004).unwrap();
    assert_eq!(session.lock().unwrap().state(), SessionState::Terminated);
    assert!(store.keys().contains(&"scorm_pkg:2004".to_string()));
}

#[tokio::test]
async fn legacy_only_install_is_found_from_popup() {
    let host = Frame::top("player");
    let (received, sink) = recording_sink();
    install_runtime(
        &host,
        "scorm_pkg",
        Some(ScormVersion::Scorm12),
        Arc::new(MemoryDataStore::new()),
        Arc::new(sink),
        Duration::from_millis(800),
    );

    let popup = Frame::popup(&host, "launched");
    let mut client = RuntimeClient::new(popup as Arc<dyn WindowContext>);
    assert_eq!(client.version(), Some(ScormVersion::Scorm12));
    assert!(client.initialize());
    assert!(client.set_value("cmi.core.lesson_status", "incomplete"));
    assert!(client.commit());

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, ScormVersion::Scorm12);
    assert_eq!(
        received[0].1.get("cmi.core.lesson_status").map(String::as_str),
        Some("incomplete")
    );
}

#[tokio::test]
async fn restarted_session_sees_persisted_data() {
    let store = Arc::new(MemoryDataStore::new());
    let first = Frame::top("first");
    let installed = install_runtime(
        &first,
        "scorm_pkg",
        Some(ScormVersion::Scorm2004),
        store.clone(),
        Arc::new(|_: ScormVersion, _: DataMap| {}),
        Duration::from_millis(800),
    );
    let api = installed.scorm2004.unwrap();
    assert_eq!(api.initialize(""), "true");
    assert_eq!(api.set_value("cmi.suspend_data", "abc"), "true");
    assert_eq!(api.terminate(""), "true");

    let second = Frame::top("second");
    let installed = install_runtime(
        &second,
        "scorm_pkg",
        Some(ScormVersion::Scorm2004),
        store,
        Arc::new(|_: ScormVersion, _: DataMap| {}),
        Duration::from_millis(800),
    );
    let api = installed.scorm2004.unwrap();
    assert_eq!(api.get_value("cmi.suspend_data"), "");
    assert_eq!(api.get_last_error(), "301");
    assert_eq!(api.initialize(""), "true");
    assert_eq!(api.get_value("cmi.suspend_data"), "abc");
}
