//! Headless [`PageHost`] for `globe-ctl watch`.
//!
//! Prints what a kiosk page would show. Targets are synthetic: the names
//! given on the command line become navigable targets, and a payload
//! `answers` array becomes lettered answer targets. A fresh snapshot is
//! reported whenever content settles, the way a real page reports targets
//! after it renders.

#[cfg(test)]
#[path = "console_test.rs"]
mod console_test;

use frames::{Coordinates, Letter, Page};
use kiosk::{ContentState, FocusTarget, NavSet, PageHost, TargetSnapshot};
use serde_json::Value;
use tokio::sync::mpsc;

const LETTERS: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

pub struct ConsoleHost {
    targets: Vec<String>,
    tx: mpsc::Sender<TargetSnapshot<String>>,
}

impl ConsoleHost {
    #[must_use]
    pub fn new(targets: Vec<String>, tx: mpsc::Sender<TargetSnapshot<String>>) -> Self {
        Self { targets, tx }
    }

    fn snapshot(&self, payload: Option<&Value>) -> TargetSnapshot<String> {
        let navigable = self.targets.iter().map(|name| FocusTarget::new(name.clone(), NavSet::ALL)).collect();
        let answers = payload
            .and_then(|payload| payload.get("answers"))
            .and_then(Value::as_array)
            .map(|answers| {
                answers
                    .iter()
                    .zip(LETTERS)
                    .map(|(answer, letter)| {
                        let label = answer.as_str().map_or_else(|| answer.to_string(), ToOwned::to_owned);
                        FocusTarget::answer(format!("{}: {label}", letter.as_char()), letter)
                    })
                    .collect()
            })
            .unwrap_or_default();
        TargetSnapshot { navigable, answers }
    }
}

impl PageHost for ConsoleHost {
    type Element = String;

    fn focus(&mut self, element: &String) {
        println!("focus    {element}");
    }

    fn activate(&mut self, element: &String) -> bool {
        println!("activate {element}");
        true
    }

    fn navigate(&mut self, page: Page) {
        println!("navigate {}", page.path());
    }

    fn render(&mut self, state: &ContentState) {
        match state {
            ContentState::Idle => println!("render   idle"),
            ContentState::Loading => println!("render   loading"),
            ContentState::Ready(payload) => {
                println!("render   ready {payload}");
                let _ = self.tx.try_send(self.snapshot(Some(payload)));
            }
            ContentState::Errored(error) => {
                println!("render   not found {error}");
                let _ = self.tx.try_send(self.snapshot(None));
            }
        }
    }

    fn show_coordinates(&mut self, coords: Coordinates, stable: bool) {
        let label = if stable { "stable " } else { "pending" };
        println!("coords   {label} lat={:.2} lon={:.2}", coords.lat, coords.lon);
    }

    fn show_start(&mut self, start: bool) {
        println!("start    {start}");
    }
}
