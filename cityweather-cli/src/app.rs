//! Interactive home screen driven by stdin lines.
//!
//! Each line is one edit of the search box, so typing several lines in
//! quick succession exercises the same debounce a keyboard would.

use std::io::{IsTerminal, Write};

use anyhow::Context;
use cityweather_core::FlowController;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::navigation::{Navigator, Route, StackOptions};

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Quit,
    ToggleSearch,
    Open(Route),
    Back,
    Pick(usize),
    Text(String),
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" => Input::Empty,
        ":q" | ":quit" => Input::Quit,
        "/" => Input::ToggleSearch,
        ":rest" => Input::Open(Route::Rest),
        ":home" => Input::Open(Route::Home),
        ":back" => Input::Back,
        other => match other.parse::<usize>() {
            Ok(n) if n > 0 => Input::Pick(n),
            _ => Input::Text(line.to_string()),
        },
    }
}

const HELP: &str = "/ search  |  1-9 pick  |  :rest  :back  |  :q quit";

pub async fn run(controller: FlowController) -> anyhow::Result<()> {
    let mut nav = Navigator::new(Route::Home, StackOptions { header_shown: false });
    let mut updates = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut hint: Option<&str> = None;

    tokio::spawn({
        let controller = controller.clone();
        async move {
            controller.load().await;
        }
    });

    redraw(&nav, &controller, hint)?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                hint = None;

                match parse_input(&line) {
                    Input::Empty => {}
                    Input::Quit => break,
                    Input::ToggleSearch => {
                        controller.toggle_search();
                    }
                    Input::Open(route) => nav.navigate(route),
                    Input::Back => {
                        if !nav.go_back() {
                            hint = Some("Already on the home screen.");
                        }
                    }
                    Input::Pick(n) if nav.current() == Route::Home && picked(&controller, n) => {}
                    Input::Pick(_) | Input::Text(_) if nav.current() != Route::Home => {
                        hint = Some("Type :back to return to the home screen.");
                    }
                    Input::Pick(_) | Input::Text(_) if !controller.view().search_visible => {
                        hint = Some("Press / to open the search box first.");
                    }
                    Input::Pick(_) | Input::Text(_) => controller.search_text_changed(line),
                }
            }
        }

        redraw(&nav, &controller, hint)?;
    }

    Ok(())
}

/// Select the n-th (1-based) visible candidate, if there is one.
fn picked(controller: &FlowController, n: usize) -> bool {
    let view = controller.view();
    if !view.search_visible {
        return false;
    }
    let Some(candidate) = view.candidates.get(n - 1).cloned() else {
        return false;
    };

    let controller = controller.clone();
    tokio::spawn(async move {
        controller.select_location(&candidate).await;
    });
    true
}

fn redraw(nav: &Navigator, controller: &FlowController, hint: Option<&str>) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();

    if stdout.is_terminal() {
        // Clear screen, cursor home.
        write!(stdout, "\x1b[2J\x1b[H")?;
    }
    write!(stdout, "{}", nav.render(&controller.view()))?;
    if let Some(hint) = hint {
        writeln!(stdout, "\n  {hint}")?;
    }
    write!(stdout, "\n  {HELP}\n> ")?;
    stdout.flush()?;

    Ok(())
}
