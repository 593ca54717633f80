//! Embed providers and their URL rewrite rules
//!
//! Each provider maps to one [`ProviderRule`]: how its preview is rendered
//! (server-side through the embed origin, or as a direct client iframe), which
//! Markdown syntax represents it, and a pair of pure string transforms:
//!
//! - `inbound`: Markdown payload → stored `url` attribute
//! - `outbound`: stored `url` attribute → Markdown payload
//!
//! For every provider `outbound(inbound(payload)) == payload` holds over its
//! canonical payloads, and `inbound(outbound(url)) == url` over stored urls.
//!
//!     | Provider    | Rendering | Syntax                | Stored url                                          |
//!     |-------------|-----------|-----------------------|-----------------------------------------------------|
//!     | card        | server    | @[card](URL)          | URL                                                 |
//!     | tweet       | server    | @[tweet](URL)         | URL                                                 |
//!     | github      | server    | @[github](URL)        | URL                                                 |
//!     | gist        | server    | @[gist](URL)          | URL                                                 |
//!     | mermaid     | server    | ```mermaid fence      | diagram source                                      |
//!     | youtube     | client    | bare watch URL        | https://www.youtube-nocookie.com/embed/ID           |
//!     | codepen     | client    | @[codepen](URL)       | .../embed/ID?embed-version=2                        |
//!     | figma       | client    | @[figma](URL)         | https://www.figma.com/embed?embed_host=zenn&url=URL |
//!     | slideshare  | client    | @[slideshare](KEY)    | https://www.slideshare.net/slideshow/embed_code/key/KEY |
//!     | codesandbox, stackblitz, jsfiddle, docswell, blueprintue | client | @[type](URL) | URL |

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Default origin of the server-side embed renderer.
pub const EMBED_ORIGIN: &str = "https://embed.zenn.studio";

const FIGMA_EMBED_PREFIX: &str = "https://www.figma.com/embed?embed_host=zenn&url=";
const SLIDESHARE_EMBED_PREFIX: &str = "https://www.slideshare.net/slideshow/embed_code/key/";
const YOUTUBE_EMBED_PREFIX: &str = "https://www.youtube-nocookie.com/embed/";
const YOUTUBE_WATCH_PREFIX: &str = "https://www.youtube.com/watch?v=";
const CODEPEN_VERSION: &str = "embed-version=2";

/// Characters left alone by `encodeURIComponent`.
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedType {
    Card,
    Tweet,
    Github,
    Gist,
    Mermaid,
    Youtube,
    Codepen,
    Codesandbox,
    Stackblitz,
    Jsfiddle,
    Figma,
    Slideshare,
    Docswell,
    Blueprintue,
}

/// Where the preview markup comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// Rendered by the embed server; payload travels URL-encoded in `data-content`.
    Server,
    /// Third-party iframe pointed straight at the stored url.
    ClientIframe,
}

/// Canonical Markdown form of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// `@[type](payload)`
    Directive,
    /// The payload alone on its own line.
    BareUrl,
    /// A fenced code block tagged with the provider name.
    Fence,
}

#[derive(Debug, Clone, Copy)]
pub struct ProviderRule {
    pub kind: EmbedType,
    pub rendering: Rendering,
    pub syntax: Syntax,
    pub inbound: fn(&str) -> String,
    pub outbound: fn(&str) -> String,
}

impl ProviderRule {
    fn verbatim(kind: EmbedType, rendering: Rendering, syntax: Syntax) -> Self {
        ProviderRule {
            kind,
            rendering,
            syntax,
            inbound: identity,
            outbound: identity,
        }
    }
}

impl EmbedType {
    pub const ALL: [EmbedType; 14] = [
        EmbedType::Card,
        EmbedType::Tweet,
        EmbedType::Github,
        EmbedType::Gist,
        EmbedType::Mermaid,
        EmbedType::Youtube,
        EmbedType::Codepen,
        EmbedType::Codesandbox,
        EmbedType::Stackblitz,
        EmbedType::Jsfiddle,
        EmbedType::Figma,
        EmbedType::Slideshare,
        EmbedType::Docswell,
        EmbedType::Blueprintue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EmbedType::Card => "card",
            EmbedType::Tweet => "tweet",
            EmbedType::Github => "github",
            EmbedType::Gist => "gist",
            EmbedType::Mermaid => "mermaid",
            EmbedType::Youtube => "youtube",
            EmbedType::Codepen => "codepen",
            EmbedType::Codesandbox => "codesandbox",
            EmbedType::Stackblitz => "stackblitz",
            EmbedType::Jsfiddle => "jsfiddle",
            EmbedType::Figma => "figma",
            EmbedType::Slideshare => "slideshare",
            EmbedType::Docswell => "docswell",
            EmbedType::Blueprintue => "blueprintue",
        }
    }

    pub fn from_name(name: &str) -> Option<EmbedType> {
        EmbedType::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The provider table.
    pub fn rule(self) -> ProviderRule {
        use Rendering::{ClientIframe, Server};
        use Syntax::{BareUrl, Directive, Fence};
        match self {
            EmbedType::Card | EmbedType::Tweet | EmbedType::Github | EmbedType::Gist => {
                ProviderRule::verbatim(self, Server, Directive)
            }
            EmbedType::Mermaid => ProviderRule::verbatim(self, Server, Fence),
            EmbedType::Youtube => ProviderRule {
                kind: self,
                rendering: ClientIframe,
                syntax: BareUrl,
                inbound: youtube_inbound,
                outbound: youtube_outbound,
            },
            EmbedType::Codepen => ProviderRule {
                kind: self,
                rendering: ClientIframe,
                syntax: Directive,
                inbound: codepen_inbound,
                outbound: codepen_outbound,
            },
            EmbedType::Figma => ProviderRule {
                kind: self,
                rendering: ClientIframe,
                syntax: Directive,
                inbound: figma_inbound,
                outbound: figma_outbound,
            },
            EmbedType::Slideshare => ProviderRule {
                kind: self,
                rendering: ClientIframe,
                syntax: Directive,
                inbound: slideshare_inbound,
                outbound: slideshare_outbound,
            },
            EmbedType::Codesandbox
            | EmbedType::Stackblitz
            | EmbedType::Jsfiddle
            | EmbedType::Docswell
            | EmbedType::Blueprintue => ProviderRule::verbatim(self, ClientIframe, Directive),
        }
    }

    /// Whether `@[name](...)` is accepted for this provider on input.
    ///
    /// Youtube accepts the directive form with a bare video id in addition to
    /// its canonical bare-URL form.
    pub fn accepts_directive(self) -> bool {
        matches!(self.rule().syntax, Syntax::Directive) || self == EmbedType::Youtube
    }

    pub fn inbound(self, payload: &str) -> String {
        (self.rule().inbound)(payload)
    }

    pub fn outbound(self, url: &str) -> String {
        (self.rule().outbound)(url)
    }
}

/// Percent-encodes like `encodeURIComponent`.
pub fn encode_payload(payload: &str) -> String {
    utf8_percent_encode(payload, URI_COMPONENT).to_string()
}

pub fn decode_payload(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}

/// Video id of a YouTube watch URL (`https://www.youtube.com/watch?v=ID`).
pub fn youtube_video_id(candidate: &str) -> Option<String> {
    let url = Url::parse(candidate).ok()?;
    let host = url.host_str()?;
    if !matches!(host, "www.youtube.com" | "youtube.com" | "m.youtube.com") || url.path() != "/watch"
    {
        return None;
    }
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, id)| id.into_owned())
        .filter(|id| is_video_id(id))
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn identity(value: &str) -> String {
    value.to_string()
}

fn youtube_inbound(payload: &str) -> String {
    if let Some(id) = youtube_video_id(payload) {
        return format!("{YOUTUBE_EMBED_PREFIX}{id}");
    }
    if is_video_id(payload) {
        return format!("{YOUTUBE_EMBED_PREFIX}{payload}");
    }
    payload.to_string()
}

fn youtube_outbound(url: &str) -> String {
    match url.strip_prefix(YOUTUBE_EMBED_PREFIX) {
        Some(id) => format!("{YOUTUBE_WATCH_PREFIX}{id}"),
        None => url.to_string(),
    }
}

fn codepen_inbound(payload: &str) -> String {
    let url = payload.replacen("/pen/", "/embed/", 1);
    if url.contains(CODEPEN_VERSION) {
        url
    } else if url.contains('?') {
        format!("{url}&{CODEPEN_VERSION}")
    } else {
        format!("{url}?{CODEPEN_VERSION}")
    }
}

fn codepen_outbound(url: &str) -> String {
    let url = url.replacen("/embed/", "/pen/", 1);
    if let Some(base) = url.strip_suffix(&format!("?{CODEPEN_VERSION}")) {
        return base.to_string();
    }
    if let Some(base) = url.strip_suffix(&format!("&{CODEPEN_VERSION}")) {
        return base.to_string();
    }
    url.replacen(&format!("{CODEPEN_VERSION}&"), "", 1)
}

fn figma_inbound(payload: &str) -> String {
    if payload.starts_with(FIGMA_EMBED_PREFIX) {
        payload.to_string()
    } else {
        format!("{FIGMA_EMBED_PREFIX}{payload}")
    }
}

fn figma_outbound(url: &str) -> String {
    url.strip_prefix(FIGMA_EMBED_PREFIX).unwrap_or(url).to_string()
}

fn slideshare_inbound(payload: &str) -> String {
    if payload.starts_with(SLIDESHARE_EMBED_PREFIX) {
        payload.to_string()
    } else {
        format!("{SLIDESHARE_EMBED_PREFIX}{payload}")
    }
}

fn slideshare_outbound(url: &str) -> String {
    url.strip_prefix(SLIDESHARE_EMBED_PREFIX)
        .unwrap_or(url)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_codepen_pair() {
        let stored = EmbedType::Codepen.inbound("https://codepen.io/zenn/pen/pen-123");
        assert_eq!(stored, "https://codepen.io/zenn/embed/pen-123?embed-version=2");
        assert_eq!(
            EmbedType::Codepen.outbound(&stored),
            "https://codepen.io/zenn/pen/pen-123"
        );
    }

    #[test]
    fn test_codepen_keeps_existing_query() {
        let stored = EmbedType::Codepen.inbound("https://codepen.io/zenn/pen/abc?default-tab=html");
        assert_eq!(
            stored,
            "https://codepen.io/zenn/embed/abc?default-tab=html&embed-version=2"
        );
        assert_eq!(
            EmbedType::Codepen.outbound(&stored),
            "https://codepen.io/zenn/pen/abc?default-tab=html"
        );
    }

    #[test]
    fn test_youtube_pair() {
        let stored = EmbedType::Youtube.inbound("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(stored, "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ");
        assert_eq!(
            EmbedType::Youtube.outbound(&stored),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(EmbedType::Youtube.inbound("dQw4w9WgXcQ"), stored);
    }

    #[test]
    fn test_figma_and_slideshare_wrap() {
        let figma = "https://www.figma.com/file/abcdefghijabcdefghij1234/example";
        let stored = EmbedType::Figma.inbound(figma);
        assert_eq!(
            stored,
            "https://www.figma.com/embed?embed_host=zenn&url=https://www.figma.com/file/abcdefghijabcdefghij1234/example"
        );
        assert_eq!(EmbedType::Figma.outbound(&stored), figma);

        let stored = EmbedType::Slideshare.inbound("abcd123");
        assert_eq!(
            stored,
            "https://www.slideshare.net/slideshow/embed_code/key/abcd123"
        );
        assert_eq!(EmbedType::Slideshare.outbound(&stored), "abcd123");
    }

    #[test]
    fn test_malformed_urls_are_kept() {
        for kind in EmbedType::ALL {
            let rule = kind.rule();
            if rule.syntax != Syntax::Directive || kind == EmbedType::Codepen {
                continue;
            }
            if matches!(kind, EmbedType::Figma | EmbedType::Slideshare) {
                continue;
            }
            assert_eq!(kind.inbound("not a url"), "not a url");
        }
    }

    #[test]
    fn test_gist_is_server_rendered_directive() {
        let rule = EmbedType::Gist.rule();
        assert_eq!(rule.rendering, Rendering::Server);
        assert_eq!(rule.syntax, Syntax::Directive);
        assert_eq!(EmbedType::Youtube.rule().syntax, Syntax::BareUrl);
        assert!(EmbedType::Youtube.accepts_directive());
        assert!(!EmbedType::Mermaid.accepts_directive());
    }

    #[test]
    fn test_payload_encoding_matches_uri_component() {
        assert_eq!(encode_payload("graph TD;\nA-->B;"), "graph%20TD%3B%0AA--%3EB%3B");
        assert_eq!(decode_payload("graph%20TD%3B%0AA--%3EB%3B"), "graph TD;\nA-->B;");
        assert_eq!(encode_payload("(it's)*"), "(it's)*");
    }

    proptest! {
        #[test]
        fn prop_payload_encoding_inverts(payload in "\\PC*") {
            prop_assert_eq!(decode_payload(&encode_payload(&payload)), payload);
        }

        #[test]
        fn prop_stored_urls_survive_round_trip(
            kind in proptest::sample::select(EmbedType::ALL.to_vec()),
            id in "[A-Za-z0-9_-]{1,16}",
        ) {
            let payload = match kind {
                EmbedType::Youtube => format!("https://www.youtube.com/watch?v={id}"),
                EmbedType::Codepen => format!("https://codepen.io/zenn/pen/{id}"),
                EmbedType::Slideshare => id.clone(),
                _ => format!("https://example.com/{id}"),
            };
            let stored = kind.inbound(&payload);
            prop_assert_eq!(kind.outbound(&stored), payload);
            prop_assert_eq!(kind.inbound(&kind.outbound(&stored)), stored);
        }
    }
}
