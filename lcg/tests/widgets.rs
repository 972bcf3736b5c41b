use std::cell::RefCell;
use std::rc::Rc;

use lcg::prelude::*;
use url::Url;

// ============================================================================
// Collapsible
// ============================================================================

const SECTION: &str = r##"
<div id="sec">
  <h2>Title <a class="backref" href="#toc">^</a></h2>
  <div class="section-content">Body</div>
</div>
"##;

const PANE: &str = r##"
<div id="pane">
  <div class="pane-title"><a href="#">Options</a></div>
  <div class="pane-content" id="opts">Stuff</div>
</div>
"##;

#[test]
fn test_collapsed_section_markup() {
    let mut page = Page::from_html(SECTION, PageConfig::new()).unwrap();
    let section = Collapsible::section(&mut page, "sec", true).unwrap();
    let doc = &page.document;
    let root = doc.by_id("sec").unwrap();
    let heading = section.heading();
    let content = section.content();

    assert_eq!(section.kind(), CollapsibleKind::Section);
    assert_eq!(doc.tag(heading), "h2");
    assert!(doc.has_class(heading, "collapsible-section-heading"));
    assert!(doc.has_class(root, "collapsed"));
    assert!(!section.expanded(&page));
    assert!(doc.is_hidden(content));
    assert_eq!(doc.id(content), Some("sec-collapsible-content"));
    assert_eq!(doc.attr(heading, "aria-expanded"), Some("false"));
    assert_eq!(doc.attr(heading, "aria-controls"), Some("sec-collapsible-content"));

    let backref = doc.query(heading, "a.backref").unwrap();
    assert_eq!(doc.attr(backref, "href"), Some(""));
    let icon = *doc.children(heading).last().unwrap();
    assert!(doc.has_class(icon, "icon"));
}

#[test]
fn test_heading_click_expands() {
    let mut page = Page::from_html(SECTION, PageConfig::new()).unwrap();
    let section = Collapsible::section(&mut page, "sec", true).unwrap();
    let (heading, content) = (section.heading(), section.content());
    let mut runtime = Runtime::new(page);
    let id = runtime.mount(section);

    let event = runtime.dispatch(Event::click(heading));
    assert!(event.default_prevented());
    assert!(!runtime.page.document.is_hidden(content));
    assert_eq!(runtime.page.document.attr(heading, "aria-expanded"), Some("true"));
    assert!(runtime.widget::<Collapsible>(id).unwrap().expanded(&runtime.page));

    runtime.dispatch(Event::click(heading));
    assert!(runtime.page.document.is_hidden(content));
}

#[test]
fn test_collapse_hides_after_transition() {
    let mut page = Page::from_html(SECTION, PageConfig::new()).unwrap();
    let mut section = Collapsible::section(&mut page, "sec", false).unwrap();
    section.collapse(&mut page);
    assert!(!page.document.is_hidden(section.content()));
    assert_eq!(page.pending_tasks(), ["transition"]);
    page.run_pending();
    assert!(page.document.is_hidden(section.content()));
}

#[test]
fn test_expand_during_collapse_keeps_content() {
    let mut page = Page::from_html(SECTION, PageConfig::new()).unwrap();
    let mut section = Collapsible::section(&mut page, "sec", false).unwrap();
    section.collapse(&mut page);
    section.toggle(&mut page);
    page.run_pending();
    assert!(section.expanded(&page));
    assert!(!page.document.is_hidden(section.content()));
}

#[test]
fn test_pane() {
    let mut page = Page::from_html(PANE, PageConfig::new()).unwrap();
    let pane = Collapsible::pane(&mut page, "pane", false).unwrap();
    let doc = &page.document;
    assert_eq!(pane.kind(), CollapsibleKind::Pane);
    assert_eq!(doc.tag(pane.heading()), "a");
    assert_eq!(doc.id(pane.content()), Some("opts"));
    assert_eq!(doc.attr(pane.heading(), "aria-controls"), Some("opts"));
    assert!(doc.has_class(doc.by_id("pane").unwrap(), "expanded"));
    assert!(pane.expanded(&page));
}

#[test]
fn test_section_without_heading() {
    let html = r#"<div id="bad"><p>No heading</p><div class="section-content">x</div></div>"#;
    let mut page = Page::from_html(html, PageConfig::new()).unwrap();
    let err = Collapsible::section(&mut page, "bad", false).unwrap_err();
    assert!(matches!(err, WidgetError::ElementNotFound(_)));
    assert_eq!(page.widget_instance_by_id("bad"), None);
}

// ============================================================================
// Button
// ============================================================================

const TOOLS: &str = r#"
<div id="tools">
  <button id="go">Go</button>
  <button id="stop">Stop</button>
</div>
"#;

type Invocations = Rc<RefCell<Vec<Option<NodeId>>>>;

fn recorder(calls: &Invocations) -> Callback {
    let calls = calls.clone();
    Callback::new(move |_page, _event, invoker, _args| {
        calls.borrow_mut().push(invoker);
        CallbackFlow::Continue
    })
}

#[test]
fn test_button_runs_callback() {
    let calls: Invocations = Rc::default();
    let mut page = Page::from_html(TOOLS, PageConfig::new()).unwrap();
    let button = Button::new(&mut page, "tools", Some(recorder(&calls))).unwrap();
    let mut runtime = Runtime::new(page);
    runtime.mount(button);

    let tools = runtime.page.document.by_id("tools").unwrap();
    let stop = runtime.page.document.by_id("stop").unwrap();
    let event = runtime.dispatch(Event::click(stop));
    assert!(event.default_prevented());
    assert_eq!(*calls.borrow(), [Some(tools)]);
}

#[test]
fn test_button_with_named_callback() {
    let calls: Invocations = Rc::default();
    let mut page = Page::from_html(TOOLS, PageConfig::new()).unwrap();
    {
        let calls = calls.clone();
        page.register_callback("tools.go", move |_page, _event, invoker, _args| {
            calls.borrow_mut().push(invoker);
            CallbackFlow::Continue
        });
    }
    let button = Button::new(&mut page, "tools", Some(Callback::named("tools.go"))).unwrap();
    let mut runtime = Runtime::new(page);
    runtime.mount(button);
    let go = runtime.page.document.by_id("go").unwrap();
    runtime.dispatch(Event::click(go));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn test_button_with_unknown_callback_is_inert() {
    let mut page = Page::from_html(TOOLS, PageConfig::new()).unwrap();
    let button = Button::new(&mut page, "tools", Some(Callback::named("nowhere"))).unwrap();
    let mut runtime = Runtime::new(page);
    runtime.mount(button);
    let go = runtime.page.document.by_id("go").unwrap();
    let event = runtime.dispatch(Event::click(go));
    assert!(!event.default_prevented());
    assert!(runtime.page.listeners().is_empty());
}

// ============================================================================
// Page
// ============================================================================

#[test]
fn test_widget_registry() {
    let mut page = Page::from_html(SECTION, PageConfig::new()).unwrap();
    let section = Collapsible::section(&mut page, "sec", false).unwrap();
    let root = page.document.by_id("sec").unwrap();
    assert_eq!(page.widget_instance_of(root), Some(section.id()));
    assert_eq!(page.widget_instance_by_id("sec"), Some(section.id()));
    assert_eq!(page.widget_instance_of(section.content()), None);
    assert!(section.id().to_string().starts_with("__widget_"));
}

#[test]
fn test_panicking_task_is_recorded() {
    let mut page = Page::from_html(SECTION, PageConfig::new()).unwrap();
    let root = page.document.by_id("sec").unwrap();
    page.defer("boom", |_| panic!("exploded"));
    page.defer("after", move |page| page.document.set_attr(root, "data-ran", "yes"));
    assert_eq!(page.run_pending(), 2);
    assert_eq!(page.task_errors().len(), 1);
    assert_eq!(page.task_errors()[0].task, "boom");
    assert_eq!(page.task_errors()[0].message, "exploded");
    assert_eq!(page.document.attr(root, "data-ran"), Some("yes"));
}

#[test]
fn test_focus_is_deferred() {
    let mut page = Page::from_html(SECTION, PageConfig::new()).unwrap();
    let root = page.document.by_id("sec").unwrap();
    page.set_focus(Some(root));
    assert_eq!(page.document.focused(), None);
    page.run_pending();
    assert_eq!(page.document.focused(), Some(root));
}

#[test]
fn test_focus_on_hidden_element_is_dropped() {
    let mut page = Page::from_html(SECTION, PageConfig::new()).unwrap();
    let root = page.document.by_id("sec").unwrap();
    page.document.hide(root);
    page.set_focus(Some(root));
    page.run_pending();
    assert_eq!(page.document.focused(), None);
    assert!(page.task_errors().is_empty());
}

#[test]
fn test_navigation() {
    let config = PageConfig::new().location(Url::parse("https://example.org/a/b.html").unwrap());
    let mut page = Page::from_html(SECTION, config).unwrap();
    page.navigate("c.html");
    page.navigate("https://other.example/");
    let visited: Vec<String> = page.navigations().iter().map(|u| u.to_string()).collect();
    assert_eq!(visited, ["https://example.org/a/c.html", "https://other.example/"]);
    assert_eq!(page.location().map(Url::as_str), Some("https://other.example/"));

    let mut bare = Page::from_html(SECTION, PageConfig::new()).unwrap();
    bare.navigate("relative.html");
    assert!(bare.navigations().is_empty());
}

#[test]
fn test_cookie_path_is_validated() {
    let err = Page::from_html(SECTION, PageConfig::new().cookie_path("no-slash")).unwrap_err();
    assert!(err.to_string().contains("no-slash"));
}

#[test]
fn test_transition_applies_end_state() {
    let mut page = Page::from_html(SECTION, PageConfig::new()).unwrap();
    let root = page.document.by_id("sec").unwrap();
    let duration = page.config().transition_duration;
    page.transition(root, Transition::new(duration).top(40).height(100), |page| {
        page.navigate("https://example.org/done");
    });
    assert_eq!(page.document.layout(root).rect.height, 0);
    page.run_pending();
    let rect = page.document.layout(root).rect;
    assert_eq!((rect.y, rect.height), (40, 100));
    assert_eq!(page.navigations().len(), 1);
}
