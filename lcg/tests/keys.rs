use lcg::keys::{event_key, CommandResult, Key, KeyCombo, KeyHandler, Keymap};
use lcg::prelude::{PageConfig, Viewport};
use lcg::page::Page;
use lcgdom::{Document, Event, Modifiers, NodeId};

fn target() -> NodeId {
    Document::new().root()
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn test_named_key_codes() {
    let table = [
        (8, Key::Backspace),
        (10, Key::Enter),
        (13, Key::Enter),
        (27, Key::Escape),
        (32, Key::Space),
        (33, Key::PageUp),
        (34, Key::PageDown),
        (35, Key::End),
        (36, Key::Home),
        (37, Key::Left),
        (38, Key::Up),
        (39, Key::Right),
        (40, Key::Down),
    ];
    for (code, key) in table {
        assert_eq!(Key::from_key_code(code), Some(key), "key code {code}");
    }
}

#[test]
fn test_letters_are_lowercase() {
    assert_eq!(Key::from_key_code(65), Some(Key::Char('a')));
    assert_eq!(Key::from_key_code(90), Some(Key::Char('z')));
    assert_eq!(KeyCombo::key(Key::Char('q')).shift().to_string(), "Shift-q");
}

#[test]
fn test_unmapped_key_codes() {
    for code in [0, 9, 16, 41, 64, 91, 112, 255] {
        assert_eq!(Key::from_key_code(code), None, "key code {code}");
        assert_eq!(event_key(&Event::key_down(target(), code)), None);
    }
}

#[test]
fn test_modifier_prefix_order() {
    let all = Modifiers {
        shift: true,
        ctrl: true,
        alt: true,
    };
    assert_eq!(KeyCombo::new(Key::Char('x'), all).to_string(), "Ctrl-Alt-Shift-x");
    assert_eq!(KeyCombo::key(Key::Up).shift().ctrl().to_string(), "Ctrl-Shift-Up");
    assert_eq!(KeyCombo::key(Key::Down).alt().to_string(), "Alt-Down");
    assert_eq!(KeyCombo::key(Key::Enter).to_string(), "Enter");
}

#[test]
fn test_event_key() {
    let event = Event::key_down(target(), 40).with_modifiers(Modifiers::alt());
    assert_eq!(event_key(&event).as_deref(), Some("Alt-Down"));
    let event = Event::key_down(target(), 39).with_modifiers(Modifiers::ctrl_shift());
    assert_eq!(event_key(&event).as_deref(), Some("Ctrl-Shift-Right"));
    assert_eq!(event_key(&Event::click(target())), None);
}

#[test]
fn test_normalization_is_deterministic() {
    let node = target();
    for code in 0..256 {
        for bits in 0..8u8 {
            let modifiers = Modifiers {
                shift: bits & 1 != 0,
                ctrl: bits & 2 != 0,
                alt: bits & 4 != 0,
            };
            let event = Event::key_down(node, code).with_modifiers(modifiers);
            let first = event_key(&event);
            assert_eq!(first, event_key(&event));
            assert_eq!(first.is_some(), Key::from_key_code(code).is_some());
        }
    }
}

#[test]
fn test_parse_canonical_names() {
    let combo: KeyCombo = "Ctrl-Shift-Right".parse().unwrap();
    assert_eq!(combo, KeyCombo::key(Key::Right).ctrl().shift());
    let combo: KeyCombo = "Alt-Shift-b".parse().unwrap();
    assert_eq!(combo, KeyCombo::key(Key::Char('b')).alt().shift());
    assert!("Hyper-x".parse::<KeyCombo>().is_err());
    assert!("X".parse::<KeyCombo>().is_err());
    assert!("".parse::<KeyCombo>().is_err());
}

// ============================================================================
// Dispatch
// ============================================================================

struct Counter {
    keymap: Keymap<Self>,
    hits: u32,
    peeks: u32,
}

impl Counter {
    fn new() -> Self {
        Self {
            keymap: Keymap::new()
                .bind(KeyCombo::key(Key::Enter), Self::hit)
                .bind(KeyCombo::key(Key::Down).alt(), Self::hit)
                .bind(KeyCombo::key(Key::Escape), Self::peek),
            hits: 0,
            peeks: 0,
        }
    }

    fn hit(&mut self, _event: &mut Event, _target: NodeId, _page: &mut Page) -> CommandResult {
        self.hits += 1;
        CommandResult::Handled
    }

    fn peek(&mut self, _event: &mut Event, _target: NodeId, _page: &mut Page) -> CommandResult {
        self.peeks += 1;
        CommandResult::PassThrough
    }
}

impl KeyHandler for Counter {
    fn keymap(&self) -> &Keymap<Self> {
        &self.keymap
    }
}

fn page() -> Page {
    Page::new(Document::new(), PageConfig::new().viewport(Viewport::new(800, 600))).unwrap()
}

#[test]
fn test_bound_key_is_consumed() {
    let mut page = page();
    let mut counter = Counter::new();
    let mut event = Event::key_down(page.document.root(), 13);
    assert!(counter.on_key_down(&mut event, &mut page));
    assert_eq!(counter.hits, 1);
    assert!(event.default_prevented());
    assert!(event.propagation_stopped());
}

#[test]
fn test_modifiers_select_the_binding() {
    let mut page = page();
    let mut counter = Counter::new();
    let mut plain = Event::key_down(page.document.root(), 40);
    assert!(!counter.on_key_down(&mut plain, &mut page));
    let mut alt = Event::key_down(page.document.root(), 40).with_modifiers(Modifiers::alt());
    assert!(counter.on_key_down(&mut alt, &mut page));
    assert_eq!(counter.hits, 1);
}

#[test]
fn test_unbound_key_passes_through() {
    let mut page = page();
    let mut counter = Counter::new();
    // Tab must keep moving focus out of the widget.
    let mut event = Event::key_down(page.document.root(), 9);
    assert!(!counter.on_key_down(&mut event, &mut page));
    assert!(!event.default_prevented());
    assert!(!event.propagation_stopped());
}

#[test]
fn test_pass_through_command_leaves_event() {
    let mut page = page();
    let mut counter = Counter::new();
    let mut event = Event::key_down(page.document.root(), 27);
    assert!(!counter.on_key_down(&mut event, &mut page));
    assert_eq!(counter.peeks, 1);
    assert!(!event.default_prevented());
}

#[test]
fn test_keymap_lookup() {
    let keymap = Counter::new().keymap;
    assert_eq!(keymap.len(), 3);
    assert!(keymap.contains(&KeyCombo::key(Key::Enter)));
    assert!(keymap.get(&KeyCombo::key(Key::Enter).ctrl()).is_none());
}
