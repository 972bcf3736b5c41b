use lcg::menu::{self, Menu, MenuBehavior};
use lcg::page::Page;
use lcg::prelude::PageConfig;
use lcgdom::NodeId;

const NAV: &str = r#"
<div id="nav">
  <ul>
    <li><a href="/one">One</a></li>
    <li>No link here</li>
    <li><a href="/two" class="current">Two</a>
      <ul>
        <li><a href="/two/a">Two A</a></li>
        <li><a href="/two/b">Two B</a></li>
      </ul>
    </li>
  </ul>
</div>
"#;

/// A menu without any behavior of its own.
struct Plain {
    menu: Menu,
}

impl MenuBehavior for Plain {
    fn menu(&self) -> &Menu {
        &self.menu
    }

    fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }
}

fn build(html: &str, root: &str) -> (Page, Plain) {
    let mut page = Page::from_html(html, PageConfig::new()).unwrap();
    let element = page.document.query(page.document.root(), root).unwrap();
    let id = page.register_widget(element);
    let mut plain = Plain {
        menu: Menu::new(id, element),
    };
    let list = page.document.query(element, "ul");
    menu::build(&mut plain, list, &mut page);
    (page, plain)
}

fn anchors(plain: &Plain) -> Vec<NodeId> {
    plain.menu.items().iter().map(|i| i.node).collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_item_ids_and_links() {
    let (page, plain) = build(NAV, "#nav");
    let ids: Vec<&str> = plain.menu.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["nav-item.1", "nav-item.2", "nav-item.2.1", "nav-item.2.2"]);
    for item in plain.menu.items() {
        assert_eq!(page.document.id(item.node), Some(item.id.as_str()));
    }

    let top = plain.menu.top_level();
    assert_eq!(top.len(), 2);
    let (one, two) = (top[0], top[1]);
    assert_eq!(plain.menu.item(one).next, Some(two));
    assert_eq!(plain.menu.item(two).prev, Some(one));
    let children = plain.menu.item(two).children.clone();
    assert_eq!(children.len(), 2);
    assert_eq!(plain.menu.item(children[0]).parent, Some(two));
    assert_eq!(plain.menu.item(children[1]).prev, Some(children[0]));
    assert_eq!(plain.menu.ancestors(children[1]), vec![two]);
}

#[test]
fn test_items_without_link_are_skipped() {
    let (page, plain) = build(NAV, "#nav");
    assert_eq!(plain.menu.len(), 4);
    let nav = page.document.by_id("nav").unwrap();
    for li in page.document.query_all(nav, "li") {
        assert_eq!(page.document.attr(li, "role"), Some("presentation"));
    }
}

#[test]
fn test_menu_without_list_is_empty() {
    let (page, plain) = build(r#"<div id="empty"><p>Nothing</p></div>"#, "#empty");
    assert!(plain.menu.is_empty());
    assert_eq!(plain.menu.selected(), None);
    let empty = page.document.by_id("empty").unwrap();
    assert!(!page.document.has_attr(empty, "aria-activedescendant"));
}

#[test]
fn test_root_without_id_uses_widget_id() {
    let (_, plain) = build(r#"<div class="anon"><ul><li><a href="/">Home</a></li></ul></div>"#, ".anon");
    let expected = format!("{}-item.1", plain.menu.widget());
    assert_eq!(plain.menu.items()[0].id, expected);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_initial_selection_prefers_current() {
    let (page, plain) = build(NAV, "#nav");
    let two = plain.menu.top_level()[1];
    assert_eq!(plain.menu.selected(), Some(two));
    let nav = page.document.by_id("nav").unwrap();
    assert_eq!(page.document.attr(nav, "aria-activedescendant"), Some("nav-item.2"));
    let node = plain.menu.item(two).node;
    assert_eq!(page.document.attr(node, "tabindex"), Some("0"));
    assert_eq!(page.document.attr(node, "aria-selected"), Some("true"));
}

#[test]
fn test_initial_selection_defaults_to_first() {
    let (_, plain) = build(r#"<div id="m"><ul><li><a>A</a></li><li><a>B</a></li></ul></div>"#, "#m");
    assert_eq!(plain.menu.selected(), plain.menu.first());
}

#[test]
fn test_single_selection_invariant() {
    let (mut page, mut plain) = build(NAV, "#nav");
    let all: Vec<_> = plain.menu.indices().collect();
    for index in [0, 3, 3, 1, 2, 0] {
        plain.select_item(all[index], &mut page);
        let nodes = anchors(&plain);
        let reachable = nodes
            .iter()
            .filter(|n| page.document.attr(**n, "tabindex") == Some("0"))
            .count();
        let selected = nodes
            .iter()
            .filter(|n| page.document.attr(**n, "aria-selected") == Some("true"))
            .count();
        assert_eq!(reachable, 1);
        assert_eq!(selected, 1);
        assert_eq!(plain.menu.selected(), Some(all[index]));
    }
}

#[test]
fn test_select_leaves_missing_aria_selected_alone() {
    let (mut page, mut plain) = build(NAV, "#nav");
    let one = plain.menu.top_level()[0];
    let node = plain.menu.item(one).node;
    page.document.remove_attr(node, "aria-selected");
    plain.select_item(one, &mut page);
    assert!(!page.document.has_attr(node, "aria-selected"));
    assert_eq!(page.document.attr(node, "tabindex"), Some("0"));
}

#[test]
fn test_focus_moves_to_selection() {
    let (mut page, mut plain) = build(NAV, "#nav");
    plain.focus(&mut page);
    assert_eq!(page.document.focused(), None);
    page.run_pending();
    let two = plain.menu.top_level()[1];
    assert_eq!(page.document.focused(), Some(plain.menu.item(two).node));
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn test_next_after_subtree_climbs_out() {
    let (page, plain) = build(NAV, "#nav");
    let top = plain.menu.top_level();
    let children = plain.menu.item(top[1]).children.clone();
    assert_eq!(plain.menu.next_after_subtree(top[0]), Some(top[1]));
    assert_eq!(plain.menu.next_after_subtree(children[0]), Some(children[1]));
    assert_eq!(plain.menu.next_after_subtree(children[1]), None);

    let label = page.document.children(plain.menu.item(children[0]).node)[0];
    assert_eq!(plain.menu.item_at(&page.document, label), Some(children[0]));
    assert_eq!(plain.menu.item_by_id("nav-item.2.2"), Some(children[1]));
}
