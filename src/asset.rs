use std::ffi::OsStr;

/// Suffixes browsers append to files they save alongside a page.
const DOWNLOAD_MARKERS: [&str; 2] = [".下载", ".download"];

/// Works on the raw name so file names that are not valid UTF-8 are
/// stripped too.
pub fn strip_download_marker(name: &OsStr) -> &OsStr {
    let bytes = name.as_encoded_bytes();

    DOWNLOAD_MARKERS
        .iter()
        .find_map(|marker| bytes.strip_suffix(marker.as_bytes()))
        // SAFETY: the split sits right before a non-empty UTF-8 suffix,
        // which is a valid boundary for encoded OS string bytes.
        .map(|stem| unsafe { OsStr::from_encoded_bytes_unchecked(stem) })
        .unwrap_or(name)
}

/// Only the name as it was downloaded counts, so `page.html.download` is
/// not treated as HTML.
pub fn is_html(name: &OsStr) -> bool {
    name.as_encoded_bytes().ends_with(b".html")
}
