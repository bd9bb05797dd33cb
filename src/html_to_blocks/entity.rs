// Entity extraction for links, images and file attachments.
//
// Each kind has a pure capability check over the element's attributes and a
// fixed attribute whitelist copied into the entity data.

use markup5ever_rcdom::Handle;
use serde_json::Value;
use url::Url;

use super::css::Declarations;
use super::util::{get_attr, get_non_empty_attr, is_element};
use crate::model::EntityData;

const ANCHOR_ATTRS: &[&str] = &["className", "href", "rel", "target", "title"];
const IMAGE_ATTRS: &[&str] = &["alt", "className", "height", "src", "width"];
const FILE_ATTRS: &[&str] = &["type", "objectkey", "bucketname", "name", "size"];
const LINK_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Attribute lookup with DOM property naming (`className` reads `class`).
fn dom_attr(handle: &Handle, name: &str) -> Option<String> {
    let attr = if name == "className" { "class" } else { name };
    get_non_empty_attr(handle, attr)
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// Resolve an anchor's `href` to an absolute URL with a supported scheme.
pub(crate) fn valid_anchor_url(handle: &Handle, base_url: Option<&Url>) -> Option<Url> {
    if !is_element(handle, "a") {
        return None;
    }
    let href = get_non_empty_attr(handle, "href")?;
    let url = Url::options().base_url(base_url).parse(href.trim()).ok()?;
    LINK_SCHEMES.contains(&url.scheme()).then_some(url)
}

pub(crate) fn link_data(handle: &Handle, url: &Url) -> EntityData {
    let mut data = EntityData::new();
    for attr in ANCHOR_ATTRS {
        if let Some(value) = dom_attr(handle, attr) {
            data.insert(attr.to_string(), Value::String(value));
        }
    }
    data.insert("url".to_string(), Value::String(url.to_string()));
    data
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

pub(crate) fn is_valid_image(handle: &Handle) -> bool {
    is_element(handle, "img") && get_non_empty_attr(handle, "src").is_some()
}

pub(crate) fn image_data(handle: &Handle) -> EntityData {
    let declarations = Declarations::of(handle);
    let mut data = EntityData::new();
    for attr in IMAGE_ATTRS {
        let value = dom_attr(handle, attr).or_else(|| match *attr {
            // Fall back to the inline style for dimensions.
            "width" | "height" => declarations
                .get(attr)
                .map(|v| v.replace("px", "").trim().to_string())
                .filter(|v| !v.is_empty()),
            _ => None,
        });
        if let Some(value) = value {
            let key = if *attr == "src" { "url" } else { attr };
            data.insert(key.to_string(), Value::String(value));
        }
    }
    data
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

pub(crate) fn is_valid_file(handle: &Handle) -> bool {
    get_attr(handle, "title").as_deref() == Some("file-entity")
        && get_non_empty_attr(handle, "data-bucketname").is_some()
        && get_non_empty_attr(handle, "data-objectkey").is_some()
}

pub(crate) fn file_data(handle: &Handle) -> EntityData {
    let mut data = EntityData::new();
    for attr in FILE_ATTRS {
        if let Some(value) = get_non_empty_attr(handle, &format!("data-{attr}")) {
            let key = match *attr {
                "bucketname" => "bucketName",
                "objectkey" => "objectKey",
                other => other,
            };
            data.insert(key.to_string(), Value::String(value));
        }
    }
    data
}
