//! Text substitutions applied to every HTML document in a site package.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Tag appended to every rewritten same-origin link. Consumers of the
/// package look for it to tell rewritten links apart.
pub const STATIC_LINK_TAG: &str = "?:HTTPA";

static DOWNLOAD_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\.下载|\.download)""#).unwrap());

static STATIC_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\./([^/]+)/(.+?)""#).unwrap());

static CROSS_ORIGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"http(s?)://([^/]+)([/'"])"#).unwrap());

/// Removes a leftover `.下载` / `.download` suffix from the end of quoted
/// attribute values. The closing quote stays.
pub fn strip_download_markers(text: &str) -> String {
    DOWNLOAD_MARKER_RE.replace_all(text, "\"").into_owned()
}

/// Rewrites `"./<page>/<rest>"` to `"../<static_dir>/<site>/<rest>?:HTTPA"`.
///
/// The page segment is dropped because assets of every page end up in one
/// flat directory.
pub fn rewrite_static_links(text: &str, site_name: &str, static_dir: &str) -> String {
    STATIC_LINK_RE
        .replace_all(text, |caps: &Captures| {
            format!(
                "\"../{static_dir}/{site_name}/{}{STATIC_LINK_TAG}\"",
                &caps[2]
            )
        })
        .into_owned()
}

/// Replaces the host (and whatever precedes the delimiter) of absolute
/// `http(s)://` URLs with `error`, keeping the scheme and the delimiter.
pub fn neutralize_cross_origin(text: &str) -> String {
    CROSS_ORIGIN_RE
        .replace_all(text, "http${1}://error${3}")
        .into_owned()
}

/// Applies all three passes. The order matters: marker cleanup must not
/// see freshly rewritten links, and cross-origin neutralization runs last.
pub fn rewrite_html(text: &str, site_name: &str, static_dir: &str) -> String {
    let text = strip_download_markers(text);
    let text = rewrite_static_links(&text, site_name, static_dir);
    neutralize_cross_origin(&text)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_strip_download_markers_keeps_closing_quote() {
        assert_eq!(
            strip_download_markers(r#"<img src="a/b.png.下载"><script src="x.js.download">"#),
            r#"<img src="a/b.png"><script src="x.js">"#
        );
    }

    #[test]
    fn test_strip_download_markers_ignores_unquoted() {
        let text = "saved as file.download and file.下载 here";
        assert_eq!(strip_download_markers(text), text);
    }

    #[test]
    fn test_static_link_drops_first_segment() {
        assert_eq!(
            rewrite_static_links(r#"<a href="./page1/img.png">"#, "example.com", "static"),
            r#"<a href="../static/example.com/img.png?:HTTPA">"#
        );
    }

    #[test]
    fn test_static_link_keeps_nested_remainder() {
        assert_eq!(
            rewrite_static_links(r#"src="./A/B/C""#, "site", "static"),
            r#"src="../static/site/B/C?:HTTPA""#
        );
    }

    #[test]
    fn test_static_link_rewrites_each_occurrence() {
        assert_eq!(
            rewrite_static_links(r#""./p/a.css" "./q/b.js""#, "s", "static"),
            r#""../static/s/a.css?:HTTPA" "../static/s/b.js?:HTTPA""#
        );
    }

    #[test]
    fn test_static_link_site_name_is_literal() {
        assert_eq!(
            rewrite_static_links(r#""./p/a.css""#, "$2site", "static"),
            r#""../static/$2site/a.css?:HTTPA""#
        );
    }

    #[test]
    fn test_static_link_uses_static_dir() {
        assert_eq!(
            rewrite_static_links(r#""./p/a.css""#, "s", "assets"),
            r#""../assets/s/a.css?:HTTPA""#
        );
    }

    #[test]
    fn test_static_link_ignores_other_relative_paths() {
        let text = r#"<a href="../up/a.png"><a href="page/a.png">"#;
        assert_eq!(rewrite_static_links(text, "s", "static"), text);
    }

    #[test]
    fn test_cross_origin_slash_delimiter() {
        assert_eq!(
            neutralize_cross_origin(r#"<a href="http://evil.com/x">"#),
            r#"<a href="http://error/x">"#
        );
    }

    #[test]
    fn test_cross_origin_quote_delimiters() {
        assert_eq!(
            neutralize_cross_origin("url('https://cdn.example.com')"),
            "url('https://error')"
        );
        assert_eq!(
            neutralize_cross_origin(r#"<meta content="https://other.org">"#),
            r#"<meta content="https://error">"#
        );
    }

    #[test]
    fn test_cross_origin_host_runs_to_first_slash() {
        assert_eq!(
            neutralize_cross_origin(r#"<a href="https://a.com">x</a>"#),
            r#"<a href="https://error/a>"#
        );
    }

    #[test]
    fn test_cross_origin_without_delimiter_is_kept() {
        let text = "see http://example.com";
        assert_eq!(neutralize_cross_origin(text), text);
    }

    #[test]
    fn test_rewrite_html_applies_passes_in_order() {
        let input = r#"<link href="./page_files/style.css.download"><img src="https://cdn.com/logo.png">"#;
        assert_eq!(
            rewrite_html(input, "example.com", "static"),
            r#"<link href="../static/example.com/style.css?:HTTPA"><img src="https://error/logo.png">"#
        );
    }

    #[test]
    fn test_rewrite_html_is_idempotent() {
        let input = concat!(
            r#"<a href="./page1/img.png">"#,
            "\n",
            r#"<script src="./page1/js/app.js.下载"></script>"#,
            "\n",
            r#"<a href="http://evil.com/x">"#,
        );
        let once = rewrite_html(input, "example.com", "static");
        let twice = rewrite_html(&once, "example.com", "static");

        assert_eq!(once, twice);
        assert!(once.contains(r#""../static/example.com/img.png?:HTTPA""#));
        assert!(once.contains(r#""../static/example.com/js/app.js?:HTTPA""#));
    }
}
