use std::path::Path;
use std::sync::Arc;

use scormhost_application::{LaunchStatus, PlayerContext};
use scormhost_core::config::HostConfig;
use scormhost_core::discovery::{Frame, RuntimeClient, WindowContext};
use scormhost_core::manifest::LaunchOrigin;
use scormhost_core::runtime::ScormVersion;
use tempfile::TempDir;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="com.example.course" xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_v1p3">
  <organizations default="org-1">
    <organization identifier="org-1">
      <title>Course</title>
      <item identifier="item-1" identifierref="res-1"><title>Intro</title></item>
    </organization>
  </organizations>
  <resources>
    <resource identifier="res-1" type="webcontent" adlcp:scormType="sco" href="content/index.html"/>
  </resources>
</manifest>"#;

fn config(data_dir: &Path) -> HostConfig {
    HostConfig {
        data_dir: Some(data_dir.to_path_buf()),
        commit_delay_ms: 50,
        ..HostConfig::default()
    }
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn open_track_complete_close() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join("packages/1700-course/course/imsmanifest.xml"),
        MANIFEST,
    );
    let context = PlayerContext::from_config(&config(dir.path())).unwrap();

    let mut session = context.open("1700-course").await.unwrap();
    match session.launch_status() {
        LaunchStatus::Ready(launch) => {
            assert_eq!(
                launch.url.as_str(),
                "http://localhost:4300/packages/1700-course/course/content/index.html"
            );
            assert_eq!(launch.origin, LaunchOrigin::Manifest);
        }
        LaunchStatus::NotFound => panic!("expected a launch"),
    }
    let visit = session.visit().cloned().unwrap();
    assert_eq!(visit.count, 1);
    assert_eq!(session.version(), Some(ScormVersion::Scorm2004));

    let content = Frame::child(session.frame(), "content");
    let mut client = RuntimeClient::new(content as Arc<dyn WindowContext>);
    assert!(client.initialize());
    assert!(client.set_value("cmi.location", "slide-2"));
    assert!(client.commit());

    assert!(session.mark_complete());
    assert!(session.close().await);
    assert!(session.is_closed());

    let last = session.last_snapshot().unwrap();
    assert_eq!(last.visit_id.as_deref(), Some(visit.visit_id.as_str()));

    let combined = context.tracking().combined("1700-course").await.unwrap();
    assert_eq!(combined.len(), 1);
    let snapshot = &combined[0];
    assert_eq!(snapshot.visit_id, visit.visit_id);
    let visits = context.tracking().visits("1700-course").await.unwrap();
    assert_eq!(snapshot.started_at, Some(visits.visits[0].started_at));
    assert_eq!(snapshot.data["cmi.location"], "slide-2");
    assert_eq!(snapshot.data["cmi.completion_status"], "completed");
    assert_eq!(snapshot.data["cmi.success_status"], "passed");

    let second = context.open("1700-course").await.unwrap();
    assert_eq!(second.visit().unwrap().count, 2);
}

#[tokio::test]
async fn missing_manifest_falls_back_to_first_candidate() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("packages/bare/index.html"), "<html/>");
    let context = PlayerContext::from_config(&config(dir.path())).unwrap();

    let session = context.open("bare").await.unwrap();
    let launch = session.launch().unwrap();
    assert_eq!(launch.origin, LaunchOrigin::Fallback);
    assert_eq!(
        launch.url.as_str(),
        "http://localhost:4300/packages/bare/shared/launchpage.html"
    );
}

#[tokio::test]
async fn unknown_package_still_opens() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path());
    config.fallback_launch_candidates.clear();
    let context = PlayerContext::from_config(&config).unwrap();

    let session = context.open("ghost").await.unwrap();
    assert!(session.package().is_none());
    assert_eq!(session.launch_status(), LaunchStatus::NotFound);
    assert_eq!(
        session.launch_status().to_string(),
        "imsmanifest.xml not parsed or launch file not found."
    );
    assert_eq!(session.installed().versions().len(), 2);

    assert!(context.open("../etc").await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn legacy_content_marks_complete_through_12_api() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join("packages/legacy/imsmanifest.xml"),
        MANIFEST,
    );
    let context = PlayerContext::from_config(&config(dir.path())).unwrap();
    let mut session = context.open("legacy").await.unwrap();

    // Content bound to the 1.2 shape only.
    let api = session.installed().scorm12.clone().unwrap();
    assert_eq!(api.lms_initialize(""), "true");
    assert_eq!(api.lms_set_value("cmi.core.lesson_status", "incomplete"), "true");
    assert_eq!(api.lms_commit(""), "true");
    assert_eq!(api.lms_finish(""), "true");
    assert!(session.close().await);

    let entries = context.tracking().entries("legacy").await.unwrap();
    assert!(entries.iter().any(|e| e.version == Some(ScormVersion::Scorm12)
        && e.data.get("cmi.core.lesson_status").map(String::as_str) == Some("incomplete")));
}
