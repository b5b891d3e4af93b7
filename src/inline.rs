//! Rewrites an HTML document so local asset references are embedded inline:
//! stylesheet links become `<style>` blocks, external scripts become inline
//! `<script>` blocks, and image paths become base64 data URIs. Remote URLs
//! (http/https/protocol-relative) and existing data URIs pass through
//! untouched, as does any reference that cannot be resolved or read.
//!
//! Matching is textual, not a DOM parse: HTML comments containing tag-like
//! text, nested quoting, and `</script>` strings inside script bodies will
//! confuse it. Relative paths may contain `..` and resolve outside the base
//! directory; the document is trusted local input.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};

/// Inline local stylesheets, scripts, and images referenced by `html`,
/// resolving relative paths against `base_dir`. Returns a new document;
/// every reference that cannot be inlined is left exactly as it was.
pub fn inline_assets(html: &str, base_dir: &Path) -> String {
  let out = inline_stylesheets(html, base_dir);
  let out = inline_scripts(&out, base_dir);
  inline_images(&out, base_dir)
}

/// Replace `<link rel="stylesheet" href="...">` tags with `<style>` blocks.
/// The rel and href attributes may appear in either order.
fn inline_stylesheets(html: &str, base_dir: &Path) -> String {
  let link_tag = Regex::new(r"(?i)<link\b[^>]*>").expect("link pattern");
  let rel_stylesheet =
    Regex::new(r#"(?i)\brel\s*=\s*["']stylesheet["']"#).expect("rel pattern");
  let href_attr =
    Regex::new(r#"(?i)\bhref\s*=\s*["']([^"']+)["']"#).expect("href pattern");

  link_tag
    .replace_all(html, |caps: &Captures| {
      let tag = &caps[0];
      if !rel_stylesheet.is_match(tag) {
        return tag.to_string();
      }
      let href = match href_attr.captures(tag) {
        Some(attr) => attr[1].to_string(),
        None => return tag.to_string(),
      };
      if is_remote(&href) {
        return tag.to_string();
      }
      match local_file(base_dir, &href).and_then(|p| read_text_lossy(&p)) {
        Some(css) => format!("<style>\n{}\n</style>", css),
        None => tag.to_string(),
      }
    })
    .into_owned()
}

/// Replace `<script src="..."></script>` elements with inline `<script>`
/// blocks. Only elements with an explicit closing tag are matched; any
/// content between the tags is discarded in favor of the src file.
fn inline_scripts(html: &str, base_dir: &Path) -> String {
  let script_el =
    Regex::new(r"(?is)<script\b([^>]*)>.*?</script>").expect("script pattern");
  let src_attr =
    Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']+)["']"#).expect("src pattern");

  script_el
    .replace_all(html, |caps: &Captures| {
      let el = &caps[0];
      // Self-closing script references are not matched; the span would
      // otherwise run on to some unrelated closing tag.
      if caps[1].trim_end().ends_with('/') {
        return el.to_string();
      }
      // Scripts without a src attribute are inline already.
      let src = match src_attr.captures(&caps[1]) {
        Some(attr) => attr[1].to_string(),
        None => return el.to_string(),
      };
      if is_remote(&src) {
        return el.to_string();
      }
      match local_file(base_dir, &src).and_then(|p| read_text_lossy(&p)) {
        Some(js) => format!("<script>\n{}\n</script>", js),
        None => el.to_string(),
      }
    })
    .into_owned()
}

/// Replace `<img src="...">` attribute values with base64 data URIs,
/// preserving the surrounding markup byte-for-byte.
fn inline_images(html: &str, base_dir: &Path) -> String {
  // src must follow whitespace so attributes like data-src never match
  let img_src = Regex::new(r#"(?i)(<img\b[^>]*?\ssrc\s*=\s*["'])([^"']+)(["'])"#)
    .expect("img pattern");

  img_src
    .replace_all(html, |caps: &Captures| {
      let (prefix, src, suffix) = (&caps[1], &caps[2], &caps[3]);
      if is_remote(src) || src.starts_with("data:") {
        return caps[0].to_string();
      }
      match local_file(base_dir, src).and_then(|p| image_data_uri(&p)) {
        Some(uri) => format!("{}{}{}", prefix, uri, suffix),
        None => caps[0].to_string(),
      }
    })
    .into_owned()
}

/// Absolute and protocol-relative URLs are never rewritten.
fn is_remote(url: &str) -> bool {
  let lower = url.to_ascii_lowercase();
  lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// Resolve a relative reference against the base directory. Returns None
/// for paths that do not exist or point at a directory.
fn local_file(base_dir: &Path, raw: &str) -> Option<PathBuf> {
  let path = base_dir.join(raw);
  if path.is_file() {
    Some(path)
  } else {
    None
  }
}

/// Read a file as text, replacing invalid UTF-8 sequences instead of
/// failing.
fn read_text_lossy(path: &Path) -> Option<String> {
  let bytes = fs::read(path).ok()?;
  Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn mime_for_extension(path: &Path) -> Option<&'static str> {
  let ext = path.extension()?.to_str()?.to_ascii_lowercase();
  match ext.as_str() {
    "png" => Some("image/png"),
    "jpg" | "jpeg" => Some("image/jpeg"),
    "gif" => Some("image/gif"),
    "svg" => Some("image/svg+xml"),
    "webp" => Some("image/webp"),
    _ => None,
  }
}

/// Build a `data:<mime>;base64,...` URI for a local image. SVG is decoded
/// permissively as text and re-encoded; other formats are read raw.
fn image_data_uri(path: &Path) -> Option<String> {
  let mime = mime_for_extension(path)?;
  let bytes = if mime == "image/svg+xml" {
    read_text_lossy(path)?.into_bytes()
  } else {
    fs::read(path).ok()?
  };
  Some(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
}
