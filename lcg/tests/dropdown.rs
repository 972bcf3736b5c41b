use std::cell::RefCell;
use std::rc::Rc;

use lcg::prelude::*;

const PAGE: &str = r##"
<button id="choose">Pick a colour</button>
<div id="choices">
  <ul>
    <li><a href="#">Red</a></li>
    <li><a href="#">Green</a></li>
    <li><a href="#">Blue</a></li>
  </ul>
</div>
<p id="outside">Elsewhere</p>
"##;

type Picks = Rc<RefCell<Vec<(usize, String)>>>;

fn setup(selected: Option<usize>) -> (Runtime, WidgetId, Picks) {
    let mut page = Page::from_html(PAGE, PageConfig::new()).unwrap();
    let button = page.document.by_id("choose").unwrap();
    let choices = page.document.by_id("choices").unwrap();
    page.document.set_layout(button, BoxModel::new(Rect::new(10, 100, 150, 24)));
    page.document
        .set_layout(choices, BoxModel::new(Rect::from_size(400, 90)).border(Edges::all(1)));

    let picks: Picks = Rc::default();
    let on_activate = {
        let picks = picks.clone();
        Box::new(move |page: &mut Page, item: ItemIndex, node: NodeId| {
            picks.borrow_mut().push((item.index(), page.document.text_content(node)));
        })
    };
    let selected_index = selected.map(|i| Box::new(move |_: &Page| i) as Box<dyn Fn(&Page) -> usize>);
    let dropdown = DropdownSelection::new(&mut page, "choices", "choose", on_activate, selected_index).unwrap();
    let mut runtime = Runtime::new(page);
    let id = runtime.mount(dropdown);
    (runtime, id, picks)
}

fn by_id(runtime: &Runtime, id: &str) -> NodeId {
    runtime.page.document.by_id(id).unwrap()
}

fn option(runtime: &Runtime, id: WidgetId, index: usize) -> NodeId {
    runtime.widget::<DropdownSelection>(id).unwrap().menu().items()[index].node
}

fn selected_lis(runtime: &Runtime) -> Vec<String> {
    let choices = by_id(runtime, "choices");
    runtime
        .page
        .document
        .query_all(choices, "li.selected")
        .into_iter()
        .map(|li| runtime.page.document.text_content(li))
        .collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_listbox_markup() {
    let (runtime, id, _) = setup(None);
    let doc = &runtime.page.document;
    let choices = by_id(&runtime, "choices");
    let button = by_id(&runtime, "choose");
    assert_eq!(doc.attr(choices, "role"), Some("listbox"));
    assert!(doc.is_hidden(choices));
    let ul = doc.query(choices, "ul").unwrap();
    assert_eq!(doc.attr(ul, "role"), Some("presentation"));
    assert_eq!(doc.attr(option(&runtime, id, 0), "role"), Some("option"));

    assert_eq!(doc.attr(button, "tabindex"), Some("0"));
    assert_eq!(doc.attr(button, "role"), Some("button"));
    assert_eq!(doc.attr(button, "aria-haspopup"), Some("true"));
    assert_eq!(doc.attr(button, "aria-expanded"), Some("false"));
    assert_eq!(doc.attr(button, "aria-controls"), Some("choices"));
    assert_eq!(runtime.widget::<DropdownSelection>(id).unwrap().button(), button);
    assert_eq!(selected_lis(&runtime), ["Red"]);
}

// ============================================================================
// Opening
// ============================================================================

#[test]
fn test_button_click_opens_below() {
    let (mut runtime, id, _) = setup(Some(1));
    let button = by_id(&runtime, "choose");
    let event = runtime.dispatch(Event::click(button));
    assert!(event.default_prevented());
    assert_eq!(runtime.page.open_popup(), Some(id));
    assert_eq!(runtime.page.document.attr(button, "aria-expanded"), Some("true"));

    let layout = runtime.page.document.layout(by_id(&runtime, "choices"));
    // As wide as the button, border included.
    assert_eq!(layout.outer_width(), 150);
    assert_eq!(layout.rect, Rect::new(10, 124, 148, 90));
    assert_eq!(runtime.page.document.focused(), Some(option(&runtime, id, 1)));
    assert_eq!(selected_lis(&runtime), ["Green"]);
}

#[test]
fn test_button_click_toggles() {
    let (mut runtime, _, _) = setup(None);
    let button = by_id(&runtime, "choose");
    runtime.dispatch(Event::click(button));
    runtime.dispatch(Event::click(button));
    assert_eq!(runtime.page.open_popup(), None);
    assert_eq!(runtime.page.document.attr(button, "aria-expanded"), Some("false"));
    assert_eq!(runtime.page.document.focused(), Some(button));
    assert!(runtime.page.document.is_hidden(by_id(&runtime, "choices")));
}

#[test]
fn test_open_keys() {
    let cases = [
        (KeyCombo::key(Key::Enter), true),
        (KeyCombo::key(Key::Space), true),
        (KeyCombo::key(Key::Down).alt(), true),
        (KeyCombo::key(Key::Down), false),
        (KeyCombo::key(Key::Enter).alt(), false),
    ];
    for (combo, opens) in cases {
        let (mut runtime, id, _) = setup(None);
        let button = by_id(&runtime, "choose");
        let event = Event::key_down(button, combo.key.key_code()).with_modifiers(combo.modifiers);
        let event = runtime.dispatch(event);
        assert_eq!(runtime.page.open_popup() == Some(id), opens, "{combo}");
        assert_eq!(event.default_prevented(), opens, "{combo}");
    }
}

#[test]
fn test_opens_upwards_near_bottom() {
    let (mut runtime, _, _) = setup(None);
    let button = by_id(&runtime, "choose");
    runtime
        .page
        .document
        .set_layout(button, BoxModel::new(Rect::new(10, 700, 150, 24)));
    runtime.dispatch(Event::click(button));
    let rect = runtime.page.document.layout(by_id(&runtime, "choices")).rect;
    assert_eq!((rect.y, rect.height), (610, 90));
}

// ============================================================================
// Choosing
// ============================================================================

#[test]
fn test_mouse_over_selects() {
    let (mut runtime, id, _) = setup(None);
    runtime.dispatch(Event::click(by_id(&runtime, "choose")));
    let blue = option(&runtime, id, 2);
    runtime.dispatch(Event::mouse_over(blue));
    assert_eq!(selected_lis(&runtime), ["Blue"]);
    assert_eq!(runtime.page.document.focused(), Some(blue));
    assert_eq!(
        runtime.page.document.attr(by_id(&runtime, "choices"), "aria-activedescendant"),
        Some("choices-item.3")
    );
}

#[test]
fn test_arrows_move_selection() {
    let (mut runtime, id, _) = setup(None);
    runtime.dispatch(Event::click(by_id(&runtime, "choose")));
    let red = option(&runtime, id, 0);
    let green = option(&runtime, id, 1);
    runtime.dispatch(Event::key_down(red, Key::Down.key_code()));
    assert_eq!(runtime.page.document.focused(), Some(green));
    assert_eq!(selected_lis(&runtime), ["Green"]);
    runtime.dispatch(Event::key_down(green, Key::Up.key_code()));
    assert_eq!(selected_lis(&runtime), ["Red"]);
}

#[test]
fn test_enter_chooses() {
    let (mut runtime, id, picks) = setup(None);
    runtime.dispatch(Event::click(by_id(&runtime, "choose")));
    let blue = option(&runtime, id, 2);
    runtime.dispatch(Event::mouse_over(blue));
    runtime.dispatch(Event::key_down(blue, Key::Enter.key_code()));
    assert_eq!(*picks.borrow(), [(2, "Blue".to_string())]);
    assert_eq!(runtime.page.open_popup(), None);
    assert_eq!(runtime.page.document.focused(), Some(by_id(&runtime, "choose")));
}

#[test]
fn test_click_chooses() {
    let (mut runtime, id, picks) = setup(None);
    runtime.dispatch(Event::click(by_id(&runtime, "choose")));
    runtime.dispatch(Event::click(option(&runtime, id, 1)));
    assert_eq!(*picks.borrow(), [(1, "Green".to_string())]);
}

#[test]
fn test_escape_and_outside_click_cancel() {
    let (mut runtime, id, picks) = setup(None);
    let button = by_id(&runtime, "choose");
    runtime.dispatch(Event::click(button));
    runtime.dispatch(Event::key_down(option(&runtime, id, 0), Key::Escape.key_code()));
    assert_eq!(runtime.page.open_popup(), None);

    runtime.dispatch(Event::click(button));
    runtime.dispatch(Event::click(by_id(&runtime, "outside")));
    assert_eq!(runtime.page.open_popup(), None);
    assert!(picks.borrow().is_empty());
}
