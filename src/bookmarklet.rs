use chrono::Utc;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Id of the status overlay the bookmarklet injects into the target page.
/// The remote payload script locates the overlay by this id and reads its
/// `data-host`/`data-email` attributes to continue the job.
pub const OVERLAY_ID: &str = "Tinderizer";

/// Path of the remote payload script on the serving host.
pub const PAYLOAD_PATH: &str = "/static/bookmarklet.js";

/// Query parameter carrying the cache-busting timestamp.
pub const CACHE_BUST_PARAM: &str = "t";

/// Characters `encodeURIComponent` leaves intact: alphanumerics plus
/// `- _ . ! ~ * ' ( )`. Single quotes pass through, so a quote in the email
/// survives into the generated script literal unescaped. Known injection
/// risk, kept to match the browser encoder.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode an email for embedding, mirroring `encodeURIComponent`.
pub fn encode_email(email: &str) -> String {
    utf8_percent_encode(email, URI_COMPONENT).to_string()
}

/// Build the `javascript:` URI for `host` and `email`, stamping
/// `timestamp_ms` into the payload URL.
///
/// Pure string construction; everything the script does happens later, in
/// whatever page the user clicks the bookmarklet on: drop any previously
/// injected overlay, recreate and style it, tag it with the host and the
/// percent-encoded email, then append a `<script>` pointing at
/// `http://<host>/static/bookmarklet.js?t=<timestamp_ms>`.
///
/// The timestamp is fixed here, at generation time, so every rebuild (one
/// per email change) yields a fresh payload URL and defeats script caching
/// on re-injection.
///
/// `host` is spliced into single-quoted literals unescaped. An empty host,
/// or one containing quotes or backslashes, produces a malformed
/// bookmarklet; callers validate.
pub fn build(host: &str, email: &str, timestamp_ms: i64) -> String {
    let email = encode_email(email);
    format!(
        concat!(
            "javascript:(function() {{ ",
            "var id = '{id}'; ",
            "var body = document.getElementsByTagName('body')[0]; ",
            "var div = document.getElementById(id); ",
            "if (null != div) {{ body.removeChild(div); }} ",
            "div = document.createElement('div'); ",
            "div.id = id; ",
            "div.style.width = 'auto'; div.style.height = '30px'; ",
            "div.style.fontSize = '14px'; ",
            "div.style.position = 'fixed'; div.style.top = '10px'; div.style.left = '10px'; ",
            "div.style.background = 'white'; div.style.color = 'black'; ",
            "div.style.borderColor = 'black'; div.style.borderStyle = 'solid'; ",
            "div.style.borderWidth = '2px'; div.style.zIndex = '99999999'; ",
            "div.style.padding = '16px'; div.style.textAlign = 'center'; ",
            "div.setAttribute('data-host', '{host}'); ",
            "var script = document.createElement('script'); ",
            "script.type = 'text/javascript'; ",
            "script.src = 'http://{host}{payload}?{bust}={ts}'; ",
            "div.setAttribute('data-email', '{email}'); ",
            "div.innerHTML = 'Working...'; ",
            "body.appendChild(div); ",
            "document.getElementsByTagName('head')[0].appendChild(script); ",
            "}})();",
        ),
        id = OVERLAY_ID,
        host = host,
        payload = PAYLOAD_PATH,
        bust = CACHE_BUST_PARAM,
        ts = timestamp_ms,
        email = email,
    )
}

/// Current wall clock in the unit the cache buster uses.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: i64 = 1_700_000_000_000;

    #[test]
    fn always_yields_javascript_scheme() {
        for email in ["", "a@b.com", "a&b=c+d", "it's", "\\", "käse@b.de"] {
            let uri = build("example.com", email, TS);
            assert!(uri.starts_with("javascript:"), "email {email:?}");
        }
    }

    #[test]
    fn embeds_encoded_email_not_raw() {
        let uri = build("example.com", "a b@c.com", TS);
        assert!(uri.contains("a%20b%40c.com"));
        assert!(!uri.contains("a b@c.com"));
    }

    #[test]
    fn host_appears_in_attribute_and_payload_url() {
        let uri = build("example.com", "a@b.com", TS);
        assert_eq!(uri.match_indices("example.com").count(), 2);
        assert!(uri.contains("'http://example.com/static/bookmarklet.js?t="));
    }

    #[test]
    fn timestamp_is_the_only_difference() {
        let first = build("example.com", "a@b.com", TS);
        let second = build("example.com", "a@b.com", TS + 1);
        assert_ne!(first, second);
        assert_eq!(first.replace("?t=1700000000000", "?t=1700000000001"), second);
    }

    #[test]
    fn fixed_timestamp_substring_order() {
        let uri = build("example.com", "a@b.com", TS);
        let host = uri.find("data-host', 'example.com'").expect("host attribute");
        let bust = uri.find("?t=1700000000000").expect("cache buster");
        let email = uri.find("data-email', 'a%40b.com'").expect("email attribute");
        assert!(host < bust);
        assert!(bust < email);
    }

    #[test]
    fn creates_exactly_one_remote_script() {
        let uri = build("example.com", "a@b.com", TS);
        assert_eq!(uri.match_indices("createElement('script')").count(), 1);
    }

    #[test]
    fn overlay_cleanup_precedes_recreation() {
        let uri = build("example.com", "", TS);
        let remove = uri.find("body.removeChild(div)").expect("cleanup");
        let create = uri.find("createElement('div')").expect("recreate");
        let append = uri.find("body.appendChild(div)").expect("append");
        assert!(remove < create);
        assert!(create < append);
    }

    #[test]
    fn quoted_email_survives_unescaped() {
        // encodeURIComponent leaves single quotes alone; the generated
        // literal breaks for such emails. Documented risk, not a guarantee.
        let uri = build("example.com", "o'brien@example.ie", TS);
        assert!(uri.contains("o'brien%40example.ie"));
    }

    #[test]
    fn unreserved_marks_survive_encoding() {
        assert_eq!(encode_email("a-b_c.d!e~f*g(h)i"), "a-b_c.d!e~f*g(h)i");
        assert_eq!(encode_email(""), "");
        assert_eq!(encode_email("a+b=c&d"), "a%2Bb%3Dc%26d");
    }

    #[test]
    fn wall_clock_stamp_builds_a_valid_uri() {
        let uri = build("example.com", "a@b.com", now_ms());
        assert!(uri.starts_with("javascript:"));
        assert!(uri.contains("/static/bookmarklet.js?t="));
    }
}
