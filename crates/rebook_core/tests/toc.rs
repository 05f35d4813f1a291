use kuchikiki::{ElementData, NodeDataRef};
use rebook_core::dom::{class_tokens, get_attr, has_class};
use rebook_core::toc::{
    InitialScroll, MemorySessionStorage, SIDEBAR_SCROLL_KEY, SessionStorage, Sidebar, SidebarTree,
};

const TREE: &str = concat!(
    "<ol class=\"chapter\">",
    "<li class=\"chapter-item\"><a href=\"a.html\">A</a></li>",
    "<li class=\"chapter-item\"><a href=\"b.html\">B</a><a class=\"toggle\"><div>❱</div></a></li>",
    "<li><ol class=\"section\">",
    "<li class=\"chapter-item\"><a href=\"b/c.html\">C</a></li>",
    "<li class=\"chapter-item\"><a href=\"b/d.html\">D</a></li>",
    "</ol></li>",
    "<li class=\"chapter-item\"><a href=\"https://github.com/dtolnay/cxx\">GitHub</a></li>",
    "<li class=\"chapter-item\"><a href=\"#top\">Top</a></li>",
    "</ol>"
);

fn connect(location: &str, path_to_root: &str, storage: &mut MemorySessionStorage) -> Sidebar {
    Sidebar::connect(&SidebarTree::new(TREE), location, path_to_root, storage).expect("connect")
}

fn link(sidebar: &Sidebar, label: &str) -> NodeDataRef<ElementData> {
    sidebar
        .links()
        .into_iter()
        .find(|link| link.as_node().text_contents() == label)
        .expect("link")
}

fn item_is_expanded(link: &NodeDataRef<ElementData>) -> bool {
    let item = link.as_node().parent().expect("parent");
    has_class(item.as_element().expect("element"), "expanded")
}

#[test]
fn resolves_nested_active_page_and_expands_ancestors() {
    let mut storage = MemorySessionStorage::default();
    let sidebar = connect("https://cxx.rs/b/c.html", "../", &mut storage);

    assert_eq!(sidebar.active_href().as_deref(), Some("../b/c.html"));
    let c = link(&sidebar, "C");
    assert!(has_class(&c, "active"));
    assert!(item_is_expanded(&c));
    assert!(item_is_expanded(&link(&sidebar, "B")));

    let a = link(&sidebar, "A");
    assert!(!has_class(&a, "active"));
    assert!(!item_is_expanded(&a));
    assert!(!item_is_expanded(&link(&sidebar, "D")));

    let active: Vec<_> = sidebar
        .links()
        .into_iter()
        .filter(|link| has_class(link, "active"))
        .collect();
    assert_eq!(active.len(), 1);
}

#[test]
fn rewrites_only_relative_links() {
    let mut storage = MemorySessionStorage::default();
    let sidebar = connect("https://cxx.rs/b/c.html", "../", &mut storage);

    assert_eq!(get_attr(&link(&sidebar, "A"), "href").as_deref(), Some("../a.html"));
    assert_eq!(
        get_attr(&link(&sidebar, "GitHub"), "href").as_deref(),
        Some("https://github.com/dtolnay/cxx")
    );
    assert_eq!(get_attr(&link(&sidebar, "Top"), "href").as_deref(), Some("#top"));
    assert!(sidebar.html().contains("href=\"../b/d.html\""));
}

#[test]
fn fragment_and_trailing_slash_are_canonicalized() {
    let mut storage = MemorySessionStorage::default();
    let sidebar = connect("https://cxx.rs/a.html#section", "", &mut storage);
    assert_eq!(sidebar.active_href().as_deref(), Some("a.html"));
}

#[test]
fn root_index_aliases_first_chapter() {
    let mut storage = MemorySessionStorage::default();
    let sidebar = connect("https://cxx.rs/", "", &mut storage);

    assert_eq!(sidebar.active_href().as_deref(), Some("a.html"));
    assert!(has_class(&link(&sidebar, "A"), "active"));
    assert_eq!(sidebar.initial_scroll(), InitialScroll::CenterActive);
}

#[test]
fn exact_index_entry_wins_over_alias() {
    let tree = SidebarTree::new(
        "<ol class=\"chapter\"><li class=\"chapter-item\"><a href=\"intro.html\">Intro</a></li><li class=\"chapter-item\"><a href=\"index.html\">Index</a></li></ol>",
    );
    let mut storage = MemorySessionStorage::default();
    let sidebar =
        Sidebar::connect(&tree, "https://cxx.rs/index.html", "", &mut storage).expect("connect");
    assert_eq!(sidebar.active_href().as_deref(), Some("index.html"));
}

#[test]
fn nested_index_does_not_alias() {
    let mut storage = MemorySessionStorage::default();
    let sidebar = connect("https://cxx.rs/b/index.html", "../", &mut storage);

    assert_eq!(sidebar.active_href(), None);
    assert_eq!(sidebar.initial_scroll(), InitialScroll::Unchanged);
    assert!(
        sidebar
            .links()
            .iter()
            .all(|link| !class_tokens(link).contains(&"active".to_string()))
    );
}

#[test]
fn scroll_offset_survives_one_navigation() {
    let mut storage = MemorySessionStorage::default();
    let mut first = connect("https://cxx.rs/a.html", "", &mut storage);
    assert_eq!(first.initial_scroll(), InitialScroll::CenterActive);

    first.set_scroll_top(345.0);
    let target = link(&first, "C");
    first.on_click(target.as_node(), &mut storage);
    assert_eq!(storage.get_item(SIDEBAR_SCROLL_KEY).as_deref(), Some("345"));

    let second = connect("https://cxx.rs/b/c.html", "../", &mut storage);
    assert_eq!(second.initial_scroll(), InitialScroll::Restored(345.0));
    assert_eq!(second.scroll_top(), 345.0);
    assert_eq!(storage.get_item(SIDEBAR_SCROLL_KEY), None);

    let third = connect("https://cxx.rs/b/d.html", "../", &mut storage);
    assert_eq!(third.initial_scroll(), InitialScroll::CenterActive);
}

#[test]
fn clicks_outside_links_store_nothing() {
    let mut storage = MemorySessionStorage::default();
    let sidebar = connect("https://cxx.rs/a.html", "", &mut storage);
    let item = link(&sidebar, "A").as_node().parent().expect("parent");
    sidebar.on_click(&item, &mut storage);
    assert_eq!(storage.get_item(SIDEBAR_SCROLL_KEY), None);
}

#[test]
fn clicks_on_links_outside_the_sidebar_store_nothing() {
    let mut storage = MemorySessionStorage::default();
    let sidebar = connect("https://cxx.rs/a.html", "", &mut storage);
    let other = connect("https://cxx.rs/a.html", "", &mut storage);
    sidebar.on_click(link(&other, "B").as_node(), &mut storage);
    assert_eq!(storage.get_item(SIDEBAR_SCROLL_KEY), None);
}

#[test]
fn only_sidebar_toggles_flip_sections() {
    let mut storage = MemorySessionStorage::default();
    let sidebar = connect("https://cxx.rs/b/c.html", "../", &mut storage);
    let b = link(&sidebar, "B");

    assert_eq!(sidebar.toggle_section(b.as_node()), None);
    assert!(item_is_expanded(&b));

    let other = connect("https://cxx.rs/a.html", "", &mut storage);
    assert_eq!(sidebar.toggle_section(other.toggles()[0].as_node()), None);
    assert!(item_is_expanded(&b));
}

#[test]
fn zero_offset_is_still_restored() {
    let mut storage = MemorySessionStorage::default();
    storage.set_item(SIDEBAR_SCROLL_KEY, "0");
    let sidebar = connect("https://cxx.rs/a.html", "", &mut storage);
    assert_eq!(sidebar.initial_scroll(), InitialScroll::Restored(0.0));
}

#[test]
fn toggle_flips_expanded_on_its_item() {
    let mut storage = MemorySessionStorage::default();
    let sidebar = connect("https://cxx.rs/b/c.html", "../", &mut storage);
    let toggles = sidebar.toggles();
    assert_eq!(toggles.len(), 1);

    let b = link(&sidebar, "B");
    assert!(item_is_expanded(&b));
    assert_eq!(sidebar.toggle_section(toggles[0].as_node()), Some(false));
    assert!(!item_is_expanded(&b));
    assert_eq!(sidebar.toggle_section(toggles[0].as_node()), Some(true));
    assert!(item_is_expanded(&b));
    assert!(has_class(&link(&sidebar, "C"), "active"));
}
