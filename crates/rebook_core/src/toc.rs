//! Sidebar table of contents, resolved for one page view.
//!
//! The sidebar markup is the same on every page. Per page view the links
//! are made root-relative, the entry for the current page is marked
//! `active` and every section above it is marked `expanded`. The only
//! state carried between page views is the sidebar scroll offset, kept in
//! session storage.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use kuchikiki::traits::*;
use kuchikiki::{ElementData, NodeDataRef, NodeRef};
use regex::Regex;
use url::Url;

use crate::dom::{
    add_class, get_attr, has_class, inner_html, is_element_named, previous_element_sibling,
    select_all, set_attr, toggle_class,
};
use crate::error::TocError;

pub const SIDEBAR_SCROLL_KEY: &str = "sidebar-scroll";

const SCROLLBOX_TAG: &str = "mdbook-sidebar-scrollbox";
const ACTIVE_CLASS: &str = "active";
const EXPANDED_CLASS: &str = "expanded";
const CHAPTER_ITEM_CLASS: &str = "chapter-item";
const TOGGLE_CLASS: &str = "toggle";
const TOGGLE_SELECTOR: &str = "a.toggle";

static ABSOLUTE_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-z+]+:)?//").expect("valid absolute href pattern"));

/// Static sidebar markup shared by every page of the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarTree {
    markup: String,
}

impl SidebarTree {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Pulls the markup out of the generated sidebar script, which assigns
    /// it as a single-quoted string literal to `innerHTML`.
    pub fn from_toc_script(script: &str) -> Result<Self, TocError> {
        let start = script
            .find("innerHTML = '")
            .map(|idx| idx + "innerHTML = '".len())
            .ok_or(TocError::MissingSidebarMarkup)?;
        let mut markup = String::new();
        let mut chars = script[start..].chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\'' => return Ok(Self::new(markup)),
                '\\' => match chars.next() {
                    Some('n') => markup.push('\n'),
                    Some('t') => markup.push('\t'),
                    Some('u') => {
                        let hex: String = chars.by_ref().take(4).collect();
                        let decoded = u32::from_str_radix(&hex, 16)
                            .ok()
                            .and_then(char::from_u32)
                            .ok_or(TocError::MissingSidebarMarkup)?;
                        markup.push(decoded);
                    }
                    Some(other) => markup.push(other),
                    None => break,
                },
                _ => markup.push(ch),
            }
        }
        Err(TocError::MissingSidebarMarkup)
    }
}

pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str);
    fn remove_item(&mut self, key: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    items: HashMap<String, String>,
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// What the sidebar does with its scroll position when it is connected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialScroll {
    Restored(f64),
    CenterActive,
    Unchanged,
}

pub struct Sidebar {
    _document: NodeRef,
    scrollbox: NodeRef,
    active: Option<NodeDataRef<ElementData>>,
    scroll_top: f64,
    initial_scroll: InitialScroll,
}

impl Sidebar {
    pub fn connect(
        tree: &SidebarTree,
        location: &str,
        path_to_root: &str,
        storage: &mut dyn SessionStorage,
    ) -> Result<Self, TocError> {
        let current_page = current_page_url(location)?;
        let document = kuchikiki::parse_html().one(format!(
            "<{SCROLLBOX_TAG}>{}</{SCROLLBOX_TAG}>",
            tree.markup()
        ));
        let scrollbox = document
            .select_first(SCROLLBOX_TAG)
            .map_err(|()| TocError::MissingSidebarMarkup)?
            .as_node()
            .clone();

        let links = select_all(&scrollbox, "a").map_err(|_| TocError::MissingSidebarMarkup)?;
        let mut active = None;
        for link in &links {
            if let Some(href) = get_attr(link, "href") {
                if !href.starts_with('#') && !ABSOLUTE_HREF.is_match(&href) {
                    set_attr(link, "href", &format!("{path_to_root}{href}"));
                }
            }
            if active.is_none() && resolves_to(link, &current_page) {
                active = Some(link.clone());
            }
        }
        // The index page aliases the first chapter.
        if active.is_none()
            && path_to_root.is_empty()
            && current_page.as_str().ends_with("/index.html")
        {
            active = links.first().cloned();
        }
        if let Some(link) = &active {
            mark_active_path(link);
        }

        let stored = storage.get_item(SIDEBAR_SCROLL_KEY);
        storage.remove_item(SIDEBAR_SCROLL_KEY);
        let (scroll_top, initial_scroll) = match stored.filter(|value| !value.is_empty()) {
            Some(value) => {
                let offset = value.trim().parse::<f64>().unwrap_or(0.0);
                (offset, InitialScroll::Restored(offset))
            }
            None if active.is_some() => (0.0, InitialScroll::CenterActive),
            None => (0.0, InitialScroll::Unchanged),
        };

        Ok(Self {
            _document: document,
            scrollbox,
            active,
            scroll_top,
            initial_scroll,
        })
    }

    pub fn active_href(&self) -> Option<String> {
        self.active.as_ref().and_then(|link| get_attr(link, "href"))
    }

    pub fn initial_scroll(&self) -> InitialScroll {
        self.initial_scroll
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn set_scroll_top(&mut self, offset: f64) {
        self.scroll_top = offset;
    }

    pub fn links(&self) -> Vec<NodeDataRef<ElementData>> {
        select_all(&self.scrollbox, "a").unwrap_or_default()
    }

    pub fn toggles(&self) -> Vec<NodeDataRef<ElementData>> {
        select_all(&self.scrollbox, TOGGLE_SELECTOR).unwrap_or_default()
    }

    /// Clicks on sidebar links remember the scroll offset for the next
    /// page view.
    pub fn on_click(&self, target: &NodeRef, storage: &mut dyn SessionStorage) {
        if is_element_named(target, "a") && self.contains(target) {
            storage.set_item(SIDEBAR_SCROLL_KEY, &self.scroll_top.to_string());
        }
    }

    /// Flips `expanded` on the item holding a sidebar `a.toggle`. Returns
    /// the new state, or `None` when `toggle` is not one of the toggles.
    pub fn toggle_section(&self, toggle: &NodeRef) -> Option<bool> {
        let is_toggle = toggle
            .as_element()
            .map(|element| is_element_named(toggle, "a") && has_class(element, TOGGLE_CLASS))
            .unwrap_or(false);
        if !is_toggle || !self.contains(toggle) {
            return None;
        }
        toggle
            .parent()
            .and_then(|parent| parent.into_element_ref())
            .map(|item| toggle_class(&item, EXPANDED_CLASS))
    }

    fn contains(&self, node: &NodeRef) -> bool {
        node.ancestors().any(|ancestor| ancestor == self.scrollbox)
    }

    pub fn html(&self) -> String {
        inner_html(&self.scrollbox)
    }
}

fn current_page_url(location: &str) -> Result<Url, TocError> {
    let mut page = location.split('#').next().unwrap_or("").to_string();
    if page.ends_with('/') {
        page.push_str("index.html");
    }
    Url::parse(&page).map_err(|_| TocError::InvalidLocation(location.to_string()))
}

fn resolves_to(link: &ElementData, current_page: &Url) -> bool {
    get_attr(link, "href")
        .and_then(|href| current_page.join(&href).ok())
        .map(|resolved| resolved == *current_page)
        .unwrap_or(false)
}

fn mark_active_path(link: &NodeDataRef<ElementData>) {
    add_class(link, ACTIVE_CLASS);
    let mut parent = link.as_node().parent();
    if let Some(item) = parent.as_ref().and_then(|node| node.as_element()) {
        if has_class(item, CHAPTER_ITEM_CLASS) {
            add_class(item, EXPANDED_CLASS);
        }
    }
    while let Some(node) = parent {
        if is_element_named(&node, "li") {
            if let Some(previous) = previous_element_sibling(&node) {
                if let Some(item) = previous.as_element() {
                    if has_class(item, CHAPTER_ITEM_CLASS) {
                        add_class(item, EXPANDED_CLASS);
                    }
                }
            }
        }
        parent = node.parent();
    }
}

/// Relative prefix from a page to the book root, e.g. `../` for `b/c.html`.
pub fn path_to_root(rel_path: &str) -> String {
    let depth = rel_path
        .trim_start_matches("./")
        .split('/')
        .filter(|segment| !segment.is_empty())
        .count()
        .saturating_sub(1);
    "../".repeat(depth)
}

/// `file://` location of a page inside a book directory.
pub fn page_location(book_root: &Path, rel_path: &str) -> Result<String, TocError> {
    let path = book_root.join(rel_path);
    Url::from_file_path(&path)
        .map(|url| url.to_string())
        .map_err(|()| TocError::InvalidLocation(path.display().to_string()))
}
