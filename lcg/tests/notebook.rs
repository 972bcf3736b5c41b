use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lcg::prelude::*;
use url::Url;

const TABS: &str = r##"
<div id="tabs" class="notebook-widget">
  <ul class="notebook-switcher">
    <li><a href="#t1">One</a></li>
    <li><a href="#t2">Two</a></li>
    <li><a href="#t3">Three</a></li>
  </ul>
  <div id="t1"><h3>One</h3>First</div>
  <div id="t2">Second</div>
  <div id="t3">Third</div>
</div>
"##;

fn page(html: &str, config: PageConfig) -> Page {
    Page::from_html(html, config).unwrap()
}

fn panel(page: &Page, id: &str) -> NodeId {
    page.document.by_id(id).unwrap()
}

fn visible_panels(page: &Page) -> Vec<String> {
    ["t1", "t2", "t3"]
        .into_iter()
        .filter(|id| !page.document.is_hidden(panel(page, id)))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_tabs_and_panels_are_linked() {
    let mut page = page(TABS, PageConfig::new());
    let notebook = Notebook::new(&mut page, "tabs").unwrap();
    let doc = &page.document;

    let list = doc.query(panel(&page, "tabs"), "ul").unwrap();
    assert_eq!(doc.attr(list, "role"), Some("tablist"));
    for (item, panel_id) in notebook.menu().top_level().iter().zip(["t1", "t2", "t3"]) {
        let tab = notebook.menu().item(*item).node;
        assert_eq!(doc.attr(tab, "role"), Some("tab"));
        assert_eq!(doc.attr(tab, "aria-controls"), Some(panel_id));
        let p = notebook.panel(*item).unwrap();
        assert_eq!(doc.id(p), Some(panel_id));
        assert_eq!(doc.attr(p, "role"), Some("tabpanel"));
        assert!(doc.has_class(p, "notebook-page"));
    }
}

#[test]
fn test_panel_headings_are_hidden() {
    let mut page = page(TABS, PageConfig::new());
    Notebook::new(&mut page, "tabs").unwrap();
    let heading = page.document.query(panel(&page, "t1"), "h3").unwrap();
    assert!(page.document.is_hidden(heading));
}

#[test]
fn test_tab_without_panel() {
    let html = r##"
<div id="nb">
  <ul><li><a href="#p">P</a></li></ul>
</div>
"##;
    let mut page = page(html, PageConfig::new());
    let notebook = Notebook::new(&mut page, "nb").unwrap();
    // The link points nowhere: the tab works without a panel.
    let first = notebook.menu().first().unwrap();
    assert_eq!(notebook.panel(first), None);
    assert_eq!(notebook.selected_panel(), None);
}

#[test]
fn test_missing_element() {
    let mut page = page(TABS, PageConfig::new());
    let err = Notebook::new(&mut page, "nope").unwrap_err();
    assert_eq!(err, WidgetError::ElementNotFound("#nope".to_string()));
}

// ============================================================================
// Initial tab
// ============================================================================

#[test]
fn test_first_tab_by_default() {
    let mut page = page(TABS, PageConfig::new());
    let notebook = Notebook::new(&mut page, "tabs").unwrap();
    assert_eq!(notebook.menu().selected(), notebook.menu().first());
    assert_eq!(visible_panels(&page), ["t1"]);
}

#[test]
fn test_current_marker_beats_fragment_and_cookie() {
    let html = TABS.replace(r##"<a href="#t2">"##, r##"<a href="#t2" class="current">"##);
    let config = PageConfig::new()
        .location(Url::parse("https://example.org/doc#t1").unwrap())
        .cookies(format!("{NOTEBOOK_COOKIE}=notebook-widget%3At3"));
    let mut page = page(&html, config);
    let notebook = Notebook::new(&mut page, "tabs").unwrap();
    assert_eq!(notebook.menu().selected(), Some(notebook.menu().top_level()[1]));
    assert_eq!(visible_panels(&page), ["t2"]);
}

#[test]
fn test_fragment_beats_cookie() {
    let config = PageConfig::new()
        .location(Url::parse("https://example.org/doc#t3").unwrap())
        .cookies(format!("{NOTEBOOK_COOKIE}=notebook-widget%3At2"));
    let mut page = page(TABS, config);
    Notebook::new(&mut page, "tabs").unwrap();
    assert_eq!(visible_panels(&page), ["t3"]);
}

#[test]
fn test_cookie_restores_tab() {
    let config = PageConfig::new().cookies(format!("{NOTEBOOK_COOKIE}=notebook-widget%3At3"));
    let mut page = page(TABS, config);
    Notebook::new(&mut page, "tabs").unwrap();
    assert_eq!(visible_panels(&page), ["t3"]);
}

#[test]
fn test_cookie_of_other_notebook_is_ignored() {
    let config = PageConfig::new().cookies(format!("{NOTEBOOK_COOKIE}=other-widget%3At3"));
    let mut page = page(TABS, config);
    Notebook::new(&mut page, "tabs").unwrap();
    assert_eq!(visible_panels(&page), ["t1"]);
}

#[test]
fn test_fragment_outside_notebook_is_ignored() {
    let html = format!(r#"{TABS}<div id="elsewhere">x</div>"#);
    let config = PageConfig::new().location(Url::parse("https://example.org/doc#elsewhere").unwrap());
    let mut page = page(&html, config);
    Notebook::new(&mut page, "tabs").unwrap();
    assert_eq!(visible_panels(&page), ["t1"]);
}

// ============================================================================
// Switching
// ============================================================================

#[test]
fn test_exactly_one_panel_visible() {
    let mut page = page(TABS, PageConfig::new());
    let mut notebook = Notebook::new(&mut page, "tabs").unwrap();
    let tabs = notebook.menu().top_level().to_vec();
    for (index, expected) in [(2, "t3"), (0, "t1"), (0, "t1"), (1, "t2")] {
        notebook.select(tabs[index], &mut page);
        assert_eq!(visible_panels(&page), [expected]);
        let current: Vec<_> = tabs
            .iter()
            .filter(|t| page.document.has_class(notebook.menu().item(**t).node, "current"))
            .collect();
        assert_eq!(current, [&tabs[index]]);
    }
}

#[test]
fn test_switch_is_remembered() {
    let mut page = page(TABS, PageConfig::new());
    let mut notebook = Notebook::new(&mut page, "tabs").unwrap();
    let tabs = notebook.menu().top_level().to_vec();
    notebook.select(tabs[1], &mut page);
    assert_eq!(page.cookies().get(NOTEBOOK_COOKIE).as_deref(), Some("notebook-widget:t2"));

    // A reload shows the same tab.
    let config = PageConfig::new().cookies(format!("{NOTEBOOK_COOKIE}=notebook-widget%3At2"));
    let mut reloaded = self::page(TABS, config);
    Notebook::new(&mut reloaded, "tabs").unwrap();
    assert_eq!(visible_panels(&reloaded), ["t2"]);
}

#[test]
fn test_notebook_without_class_is_not_remembered() {
    let html = TABS.replace(r#" class="notebook-widget""#, "");
    let mut page = page(&html, PageConfig::new());
    let mut notebook = Notebook::new(&mut page, "tabs").unwrap();
    let tabs = notebook.menu().top_level().to_vec();
    notebook.select(tabs[2], &mut page);
    assert_eq!(page.cookies().get(NOTEBOOK_COOKIE), None);
}

#[test]
fn test_item_for_panel() {
    let mut page = page(TABS, PageConfig::new());
    let notebook = Notebook::new(&mut page, "tabs").unwrap();
    assert_eq!(notebook.item_for_panel(&page, "t3"), Some(notebook.menu().top_level()[2]));
    assert_eq!(notebook.item_for_panel(&page, "tabs"), None);
    assert_eq!(notebook.item_for_panel(&page, "missing"), None);
}

// ============================================================================
// Activation callbacks
// ============================================================================

#[test]
fn test_one_shot_and_repeating_callbacks() {
    let mut page = page(TABS, PageConfig::new());
    let once = Rc::new(Cell::new(0));
    let every = Rc::new(Cell::new(0));
    {
        let once = once.clone();
        Notebook::on_activation(&mut page, "t2", move |_| once.set(once.get() + 1), false);
        let every = every.clone();
        Notebook::on_activation(&mut page, "t2", move |_| every.set(every.get() + 1), true);
    }
    let mut notebook = Notebook::new(&mut page, "tabs").unwrap();
    let tabs = notebook.menu().top_level().to_vec();
    for tab in [1, 0, 1, 0, 1] {
        notebook.select(tabs[tab], &mut page);
    }
    assert_eq!(once.get(), 1);
    assert_eq!(every.get(), 3);
}

#[test]
fn test_callbacks_run_for_initial_tab_newest_first() {
    let mut page = page(TABS, PageConfig::new());
    let order = Rc::new(RefCell::new(Vec::new()));
    for name in ["first", "second"] {
        let order = order.clone();
        Notebook::on_activation(&mut page, "t1", move |_| order.borrow_mut().push(name), true);
    }
    Notebook::new(&mut page, "tabs").unwrap();
    assert_eq!(*order.borrow(), ["second", "first"]);
}

#[test]
fn test_callback_sees_page() {
    let mut page = page(TABS, PageConfig::new());
    Notebook::on_activation(
        &mut page,
        "t3",
        |page| {
            let p = page.document.by_id("t3").unwrap();
            page.document.set_attr(p, "data-loaded", "yes");
        },
        false,
    );
    let mut notebook = Notebook::new(&mut page, "tabs").unwrap();
    let last = notebook.menu().top_level()[2];
    notebook.select(last, &mut page);
    assert_eq!(page.document.attr(panel(&page, "t3"), "data-loaded"), Some("yes"));
}

// ============================================================================
// Keyboard
// ============================================================================

fn mounted() -> (Runtime, WidgetId) {
    let mut page = page(TABS, PageConfig::new());
    let notebook = Notebook::new(&mut page, "tabs").unwrap();
    let mut runtime = Runtime::new(page);
    let id = runtime.mount(notebook);
    (runtime, id)
}

fn tab(runtime: &Runtime, id: WidgetId, index: usize) -> NodeId {
    let notebook = runtime.widget::<Notebook>(id).unwrap();
    notebook.menu().item(notebook.menu().top_level()[index]).node
}

#[test]
fn test_right_and_left_move_between_tabs() {
    let (mut runtime, id) = mounted();
    let first = tab(&runtime, id, 0);
    let second = tab(&runtime, id, 1);

    let event = runtime.dispatch(Event::key_down(first, Key::Right.key_code()));
    assert!(event.default_prevented());
    assert_eq!(runtime.page.document.focused(), Some(second));
    assert_eq!(visible_panels(&runtime.page), ["t2"]);
    assert_eq!(runtime.page.document.attr(second, "tabindex"), Some("0"));
    assert_eq!(runtime.page.document.attr(first, "tabindex"), Some("-1"));

    runtime.dispatch(Event::key_down(second, Key::Left.key_code()));
    assert_eq!(runtime.page.document.focused(), Some(first));
    assert_eq!(visible_panels(&runtime.page), ["t1"]);
}

#[test]
fn test_left_on_first_tab_stays() {
    let (mut runtime, id) = mounted();
    let first = tab(&runtime, id, 0);
    let event = runtime.dispatch(Event::key_down(first, Key::Left.key_code()));
    assert!(event.default_prevented());
    assert_eq!(visible_panels(&runtime.page), ["t1"]);
}

#[test]
fn test_enter_focuses_panel() {
    let (mut runtime, id) = mounted();
    let third = tab(&runtime, id, 2);
    runtime.dispatch(Event::key_down(third, Key::Enter.key_code()));
    assert_eq!(visible_panels(&runtime.page), ["t3"]);
    assert_eq!(runtime.page.document.focused(), Some(panel(&runtime.page, "t3")));
}

#[test]
fn test_click_selects_tab() {
    let (mut runtime, id) = mounted();
    let second = tab(&runtime, id, 1);
    let event = runtime.dispatch(Event::click(second));
    assert!(event.default_prevented());
    assert_eq!(visible_panels(&runtime.page), ["t2"]);
}

#[test]
fn test_unbound_key_is_not_consumed() {
    let (mut runtime, id) = mounted();
    let first = tab(&runtime, id, 0);
    let event = runtime.dispatch(Event::key_down(first, 9));
    assert!(!event.default_prevented());
    assert_eq!(runtime.page.document.focused(), None);
}
