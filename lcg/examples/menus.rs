use std::fs::File;

use lcg::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};

const PAGE: &str = r##"
<h1 id="main-heading">Course</h1>
<div id="tabs" class="notebook-widget">
  <ul class="notebook-switcher">
    <li><a href="#intro">Intro</a></li>
    <li><a href="#exercises">Exercises</a></li>
  </ul>
  <div id="intro"><h2>Intro</h2><p>Welcome.</p></div>
  <div id="exercises"><h2>Exercises</h2><p>Practice.</p></div>
</div>
<div id="toc">
  <ul>
    <li class="foldable collapsed">
      <span class="expander" data-expand-label="Show" data-collapse-label="Hide"><span class="label"></span></span>
      <a href="/ch1"><span class="label">Chapter 1</span></a>
      <ul>
        <li><a href="/ch1/s1"><span class="label">Section 1.1</span></a></li>
        <li><a href="/ch1/s2"><span class="label">Section 1.2</span></a></li>
      </ul>
    </li>
    <li><a href="/ch2"><span class="label">Chapter 2</span></a></li>
  </ul>
</div>
<div id="actions" class="popup-menu-ctrl">
  <span class="invoke-menu">Actions<span class="popup-arrow"></span></span>
  <div id="actions-menu" class="popup-menu-widget" aria-label="Actions"></div>
</div>
"##;

fn key(target: NodeId, key: Key) -> Event {
    Event::key_down(target, key.key_code())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up file logging
    let log_file = File::create("menus.log")?;
    WriteLogger::init(LevelFilter::Trace, Config::default(), log_file)?;

    let config = PageConfig::new().location("https://example.org/course/".parse()?);
    let mut runtime = Runtime::from_html(PAGE, config)?;

    Notebook::on_activation(
        &mut runtime.page,
        "exercises",
        |_| println!("exercises shown for the first time"),
        false,
    );
    let notebook = Notebook::new(&mut runtime.page, "tabs")?;
    let tabs = runtime.mount(notebook);

    let tree = FoldableTree::new(&mut runtime.page, "toc", Some("Expand all"))?;
    let toc = runtime.mount(tree);

    let items = vec![
        PopupMenuItem::new("Print").callback(Callback::new(|_, _, invoker, _| {
            println!("print requested from {invoker:?}");
            CallbackFlow::Suppress
        })),
        PopupMenuItem::new("Help").uri("help"),
        PopupMenuItem::new("Delete").enabled(false),
    ];
    let menu = PopupMenu::new(&mut runtime.page, "actions-menu", items, Some("Close"))?;
    runtime.mount(menu);
    let ctrl = PopupMenuCtrl::new(&mut runtime.page, "actions", None)?;
    let ctrl_node = ctrl.ctrl();
    runtime.mount(ctrl);

    // Switch tabs with the arrow keys.
    let first_tab = runtime
        .widget::<Notebook>(tabs)
        .and_then(|n| n.menu().first().map(|i| n.menu().item(i).node));
    if let Some(tab) = first_tab {
        runtime.dispatch(key(tab, Key::Right));
    }
    println!("focused after Right: {:?}", runtime.page.document.focused());

    // Unfold the first chapter and walk into it.
    let chapter = runtime
        .widget::<FoldableTree>(toc)
        .and_then(|t| t.menu().first().map(|i| t.menu().item(i).node));
    if let Some(chapter) = chapter {
        runtime.dispatch(key(chapter, Key::Right));
        runtime.dispatch(key(chapter, Key::Down));
    }
    println!("focused in tree: {:?}", runtime.page.document.focused());

    // Open the popup menu from the keyboard and run the first item.
    runtime.dispatch(key(ctrl_node, Key::Enter));
    if let Some(focused) = runtime.page.document.focused() {
        runtime.dispatch(key(focused, Key::Enter));
    }
    println!("open popup: {:?}", runtime.page.open_popup());
    println!("visited: {:?}", runtime.page.navigations());
    Ok(())
}
