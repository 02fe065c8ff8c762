//! Read-only view of an `imsmanifest.xml` document.
//!
//! Elements and attributes are matched by local name, so `adlcp:scormType`,
//! `scormtype` and a default-namespaced `scormType` are all the same thing.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Serialize;

use crate::error::{Result, ScormHostError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Item {
    pub identifier: String,
    pub identifierref: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub identifier: String,
    pub is_default: bool,
    /// Every item under this organization, nested ones included, in
    /// document order.
    pub items: Vec<Item>,
}

impl Organization {
    /// First item pointing at a resource.
    pub fn first_ref(&self) -> Option<&str> {
        self.items.iter().find_map(|i| i.identifierref.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub identifier: String,
    pub href: Option<String>,
    pub scorm_type: Option<String>,
}

impl Resource {
    pub fn is_sco(&self) -> bool {
        self.scorm_type
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("sco"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileRef {
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestDocument {
    /// `default` attribute of the first `organizations` element.
    pub default_organization: Option<String>,
    pub organizations: Vec<Organization>,
    pub resources: Vec<Resource>,
    /// Every `file` element in the document, wherever it appears.
    pub files: Vec<FileRef>,
}

impl ManifestDocument {
    /// Parses manifest XML.
    ///
    /// Fails on malformed XML and on documents without a root element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut doc = ManifestDocument::default();
        let mut seen_organizations = false;
        let mut seen_root = false;
        let mut depth: usize = 0;
        // Depth at which the enclosing organization was opened.
        let mut open_org: Option<usize> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    seen_root = true;
                    depth += 1;
                    let opened_org =
                        doc.visit(&e, &mut seen_organizations, open_org.is_some());
                    if opened_org {
                        open_org = Some(depth);
                    }
                }
                Event::Empty(e) => {
                    seen_root = true;
                    doc.visit(&e, &mut seen_organizations, open_org.is_some());
                }
                Event::End(_) => {
                    if open_org == Some(depth) {
                        open_org = None;
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(ScormHostError::manifest("document has no root element"));
        }
        if depth != 0 {
            return Err(ScormHostError::manifest(format!(
                "document ended with {} unclosed element(s)",
                depth
            )));
        }

        if let Some(default_id) = doc.default_organization.clone() {
            for org in doc.organizations.iter_mut() {
                org.is_default = org.identifier == default_id;
            }
        }
        Ok(doc)
    }

    /// Records one element. Returns `true` if it opened an organization.
    fn visit(&mut self, e: &BytesStart<'_>, seen_organizations: &mut bool, in_org: bool) -> bool {
        match e.local_name().as_ref() {
            b"organizations" => {
                if !*seen_organizations {
                    *seen_organizations = true;
                    self.default_organization = attr(e, "default");
                }
                false
            }
            b"organization" => {
                self.organizations.push(Organization {
                    identifier: attr(e, "identifier").unwrap_or_default(),
                    is_default: false,
                    items: Vec::new(),
                });
                true
            }
            b"item" => {
                if in_org && let Some(org) = self.organizations.last_mut() {
                    org.items.push(Item {
                        identifier: attr(e, "identifier").unwrap_or_default(),
                        identifierref: attr(e, "identifierref"),
                    });
                }
                false
            }
            b"resource" => {
                self.resources.push(Resource {
                    identifier: attr(e, "identifier").unwrap_or_default(),
                    href: attr(e, "href"),
                    scorm_type: attr_ignore_case(e, "scormtype"),
                });
                false
            }
            b"file" => {
                if let Some(href) = attr(e, "href") {
                    self.files.push(FileRef { href });
                }
                false
            }
            _ => false,
        }
    }

    pub fn default_org(&self) -> Option<&Organization> {
        self.organizations.iter().find(|o| o.is_default)
    }

    /// `href` of the resource `identifier` refers to.
    ///
    /// With duplicate identifiers the last resource carrying an `href` wins.
    pub fn resource_href(&self, identifier: &str) -> Option<&str> {
        self.resources
            .iter()
            .rev()
            .filter(|r| r.identifier == identifier)
            .find_map(|r| r.href.as_deref())
    }
}

/// Attribute value by local name; empty values count as absent.
fn attr(e: &BytesStart<'_>, local: &str) -> Option<String> {
    find_attr(e, |name| name == local.as_bytes())
}

fn attr_ignore_case(e: &BytesStart<'_>, local: &str) -> Option<String> {
    find_attr(e, |name| name.eq_ignore_ascii_case(local.as_bytes()))
}

fn find_attr(e: &BytesStart<'_>, matches: impl Fn(&[u8]) -> bool) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| matches(a.key.local_name().as_ref()))
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value).into_owned();
            match quick_xml::escape::unescape(&raw) {
                Ok(value) => value.into_owned(),
                Err(_) => raw,
            }
        })
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIXED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ims:manifest identifier="M1"
    xmlns:ims="http://www.imsglobal.org/xsd/imscp_v1p1"
    xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2">
  <ims:organizations default="ORG2">
    <ims:organization identifier="ORG1">
      <ims:item identifier="I1" identifierref="RES1"/>
    </ims:organization>
    <ims:organization identifier="ORG2">
      <ims:title>Course</ims:title>
      <ims:item identifier="CHAPTER">
        <ims:item identifier="I2" identifierref="RES2"/>
      </ims:item>
    </ims:organization>
  </ims:organizations>
  <ims:resources>
    <ims:resource identifier="RES1" type="webcontent" adlcp:scormType="asset" href="a.html">
      <ims:file href="a.html"/>
    </ims:resource>
    <ims:resource identifier="RES2" type="webcontent" adlcp:SCORMTYPE="sco" href="b/start.html?x=1&amp;y=2"/>
  </ims:resources>
</ims:manifest>"#;

    #[test]
    fn prefixed_elements_and_attributes_are_found() {
        let doc = ManifestDocument::parse(PREFIXED).unwrap();

        assert_eq!(doc.default_organization.as_deref(), Some("ORG2"));
        assert_eq!(doc.organizations.len(), 2);
        let default = doc.default_org().unwrap();
        assert_eq!(default.identifier, "ORG2");
        assert_eq!(default.items.len(), 2);
        assert_eq!(default.first_ref(), Some("RES2"));

        assert_eq!(doc.resources.len(), 2);
        assert_eq!(doc.resources[0].scorm_type.as_deref(), Some("asset"));
        assert!(doc.resources[1].is_sco());
        assert_eq!(doc.resource_href("RES2"), Some("b/start.html?x=1&y=2"));
        assert_eq!(doc.files, vec![FileRef { href: "a.html".into() }]);
    }

    #[test]
    fn items_outside_organizations_are_ignored() {
        let xml = r#"<manifest><item identifierref="R"/><organizations/></manifest>"#;
        let doc = ManifestDocument::parse(xml).unwrap();
        assert!(doc.organizations.is_empty());
        assert_eq!(doc.default_organization, None);
    }

    #[test]
    fn empty_attribute_values_are_absent() {
        let xml = r#"<manifest><organizations default=""><organization identifier="O"><item identifierref=" "/></organization></organizations></manifest>"#;
        let doc = ManifestDocument::parse(xml).unwrap();
        assert_eq!(doc.default_organization, None);
        assert_eq!(doc.organizations[0].first_ref(), None);
    }

    #[test]
    fn malformed_and_empty_documents_fail() {
        assert!(ManifestDocument::parse("").is_err());
        assert!(ManifestDocument::parse("   ").is_err());
        assert!(ManifestDocument::parse("<manifest><resources></manifest>").is_err());
        assert!(ManifestDocument::parse("<manifest><resources>").is_err());
    }
}
