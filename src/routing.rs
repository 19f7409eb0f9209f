use crate::config::AppConfig;
use crate::pages::{PageError, PageStore};
use kuchiki::traits::*;
use regex::Regex;
use std::sync::LazyLock;

/// Per-browser instruction chunks, matched the way the original routed them.
static CHUNK_ROUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^/(firefox|safari|chrome|ie|ios)$").expect("chunk route regex"));

static PAGE_ROUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^/(faq|bugs|contact)$").expect("page route regex"));

#[derive(Debug)]
pub enum RouteDecision {
    Serve(String),
    Redirect(String),
    NotFound,
}

/// Full pages carry the layout (and the host meta); chunks are raw partials
/// the modal pulls in.
#[derive(Debug, PartialEq, Eq)]
pub enum Page<'a> {
    Full(&'a str),
    Chunk(&'a str),
}

/// Map a request path to a page, or None for anything we don't serve.
pub fn page_for_path(path: &str) -> Option<Page<'_>> {
    if path == "/" {
        return Some(Page::Full("index"));
    }
    if let Some(captures) = CHUNK_ROUTE.captures(path) {
        return captures.get(1).map(|m| Page::Chunk(m.as_str()));
    }
    PAGE_ROUTE
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| Page::Full(m.as_str()))
}

pub async fn resolve_route(
    config: &AppConfig,
    path: &str,
    request_host: Option<&str>,
    store: &dyn PageStore,
) -> Result<RouteDecision, PageError> {
    let Some(page) = page_for_path(path) else {
        return Ok(RouteDecision::NotFound);
    };

    if let Some(canonical) = &config.canonical_host
        && let Some(request_host) = request_host
        && request_host != canonical
    {
        return Ok(RouteDecision::Redirect(format!("http://{canonical}{path}")));
    }

    let name = match &page {
        Page::Full(name) | Page::Chunk(name) => *name,
    };
    let html = match store.load(name).await {
        Ok(html) => html,
        Err(PageError::Missing(_)) => return Ok(RouteDecision::NotFound),
        Err(err) => return Err(err),
    };

    match page {
        Page::Full(_) => {
            let host = config.host_for_request(request_host);
            Ok(RouteDecision::Serve(inject_host_meta(&html, &host)?))
        }
        Page::Chunk(_) => Ok(RouteDecision::Serve(html)),
    }
}

/// Rewrite (or add) `<meta name=host>` so the enhancement script can read
/// the serving host from page metadata.
pub fn inject_host_meta(html: &str, host: &str) -> Result<String, PageError> {
    let document = kuchiki::parse_html().one(html);

    let mut metas = document
        .select("meta[name=host]")
        .map_err(|_| PageError::Html("query selector meta[name=host] failed".to_string()))?;
    if let Some(meta) = metas.next() {
        meta.attributes
            .borrow_mut()
            .insert("content", host.to_string());
        return Ok(document.to_string());
    }

    let fragment = kuchiki::parse_html().one("<meta name=\"host\">");
    if let Ok(mut parsed) = fragment.select("meta[name=host]")
        && let Some(meta) = parsed.next()
    {
        meta.attributes
            .borrow_mut()
            .insert("content", host.to_string());
        if let Ok(mut heads) = document.select("head")
            && let Some(head) = heads.next()
        {
            let node = meta.as_node().clone();
            node.detach();
            head.as_node().append(node);
        }
    }
    Ok(document.to_string())
}
