#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use core_eval::{Calc, Context, EvalError, Evaluator, Value};
use core_events::KeyEvent;
use core_session::Session;

/// Calc wrapped so tests can see exactly which sources reached the evaluator.
pub fn recording_calc() -> (impl Evaluator + 'static, Rc<RefCell<Vec<String>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let mut calc = Calc::new();
    let eval = move |src: &str, ctx: &mut Context| -> Result<Value, EvalError> {
        log.borrow_mut().push(src.to_string());
        calc.evaluate(src, ctx)
    };
    (eval, seen)
}

pub fn type_line(session: &mut Session<Vec<u8>>, text: &str) {
    session
        .handle_key(KeyEvent::Character(text.to_string()))
        .unwrap();
}

pub fn submit(session: &mut Session<Vec<u8>>, text: &str) {
    type_line(session, text);
    session.handle_key(KeyEvent::Enter).unwrap();
}

pub fn output(session: &Session<Vec<u8>>) -> String {
    String::from_utf8(session.output().clone()).unwrap()
}

/// Replays the raw output on a minimal single-column-per-char screen model
/// (CSI G/K/C/D, CR, LF) and returns the resulting rows.
pub fn visible_rows(raw: &str) -> Vec<String> {
    let mut rows: Vec<Vec<char>> = vec![Vec::new()];
    let mut col = 0usize;
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        let row = rows.last_mut().unwrap();
        match c {
            '\x1b' => {
                chars.next(); // '['
                let mut param = String::new();
                let mut fin = ' ';
                for d in chars.by_ref() {
                    if d.is_ascii_digit() {
                        param.push(d);
                    } else {
                        fin = d;
                        break;
                    }
                }
                let n: usize = param.parse().unwrap_or(1);
                match fin {
                    'G' => col = n.saturating_sub(1),
                    'C' => col += n,
                    'D' => col = col.saturating_sub(n),
                    'K' => row.truncate(col),
                    _ => {}
                }
            }
            '\r' => col = 0,
            '\n' => {
                rows.push(Vec::new());
                col = 0;
            }
            c => {
                if row.len() < col {
                    row.resize(col, ' ');
                }
                if col < row.len() {
                    row[col] = c;
                } else {
                    row.push(c);
                }
                col += 1;
            }
        }
    }
    rows.into_iter().map(|r| r.into_iter().collect()).collect()
}
