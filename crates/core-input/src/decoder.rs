//! Raw terminal byte decoder.
//!
//! Turns arbitrary input chunks into [`KeyEvent`]s. The decoder is stateful:
//! a chunk that ends inside an escape sequence or inside a multi-byte UTF-8
//! character keeps the partial bytes pending until the next chunk arrives, so
//! split sequences are never misread as literal text. [`KeyDecoder::finish`]
//! resolves whatever is still pending once the input source is exhausted.
//! A chunk holding nothing but ESC is the Esc key itself and resolves to
//! `Ignored` at once, so the key typed after it is not read as an Alt chord.
//!
//! Recognized set:
//! * CR / LF -> `Enter` (CR LF collapses into one `Enter`)
//! * DEL / BS -> `Backspace`
//! * ETX (Ctrl+C) -> `Interrupt`, EOT (Ctrl+D) -> `EndOfInput`
//! * `ESC [ .. A|B|C|D` and `ESC O A|B|C|D` -> arrows
//! * every other CSI / SS3 sequence, Alt chords, Tab and the remaining C0
//!   controls -> `Ignored`
//! * printable UTF-8 -> `Character`, coalesced per chunk

use core_events::{INPUT_BYTES, KEYS_DECODED, KEYS_IGNORED, KeyEvent};
use std::sync::atomic::Ordering;
use tracing::trace;

const ESC: u8 = 0x1b;
const CSI_MAX_LEN: usize = 32;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
enum DecodeState {
    #[default]
    Ground,
    /// Saw ESC, waiting for the introducer.
    Escape,
    /// Inside `ESC [`, collecting parameter/intermediate bytes.
    Csi(Vec<u8>),
    /// Overlong CSI already reported; swallow bytes up to its final byte.
    CsiDiscard,
    /// Inside `ESC O`, waiting for the final byte.
    Ss3,
    /// Inside a multi-byte UTF-8 character.
    Utf8 { buf: [u8; 4], len: usize, need: usize },
}

/// Whether a byte was consumed by the current state or must be replayed in ground state.
enum Step {
    Consumed,
    Replay,
}

#[derive(Debug, Default)]
pub struct KeyDecoder {
    state: DecodeState,
    run: String,
    last_was_cr: bool,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while bytes of an incomplete sequence are buffered.
    pub fn is_pending(&self) -> bool {
        !matches!(self.state, DecodeState::Ground)
    }

    /// Decode one input chunk.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<KeyEvent> {
        INPUT_BYTES.fetch_add(chunk.len() as u64, Ordering::Relaxed);
        let mut out = Vec::new();
        if chunk == [ESC] && !self.is_pending() {
            self.last_was_cr = false;
            self.emit(&mut out, KeyEvent::Ignored);
            return out;
        }
        for &byte in chunk {
            while let Step::Replay = self.step(byte, &mut out) {}
        }
        self.flush_run(&mut out);
        if self.is_pending() {
            trace!(target: "input.decoder", "sequence_pending");
        }
        out
    }

    /// Resolve pending bytes at end of input. An unfinished sequence decodes to `Ignored`.
    pub fn finish(&mut self) -> Vec<KeyEvent> {
        let mut out = Vec::new();
        match std::mem::take(&mut self.state) {
            DecodeState::Ground | DecodeState::CsiDiscard => {}
            _ => self.emit(&mut out, KeyEvent::Ignored),
        }
        self.flush_run(&mut out);
        self.last_was_cr = false;
        out
    }

    fn step(&mut self, byte: u8, out: &mut Vec<KeyEvent>) -> Step {
        match std::mem::take(&mut self.state) {
            DecodeState::Ground => {
                self.ground(byte, out);
                Step::Consumed
            }
            DecodeState::Escape => match byte {
                b'[' => {
                    self.state = DecodeState::Csi(Vec::new());
                    Step::Consumed
                }
                b'O' => {
                    self.state = DecodeState::Ss3;
                    Step::Consumed
                }
                ESC => {
                    // Double escape: drop the first, keep waiting on the second.
                    self.emit(out, KeyEvent::Ignored);
                    self.state = DecodeState::Escape;
                    Step::Consumed
                }
                0x20..=0x7e => {
                    // Alt chord.
                    self.emit(out, KeyEvent::Ignored);
                    Step::Consumed
                }
                _ => {
                    self.emit(out, KeyEvent::Ignored);
                    Step::Replay
                }
            },
            DecodeState::Csi(mut params) => match byte {
                0x20..=0x3f => {
                    if params.len() >= CSI_MAX_LEN {
                        self.emit(out, KeyEvent::Ignored);
                        self.state = DecodeState::CsiDiscard;
                    } else {
                        params.push(byte);
                        self.state = DecodeState::Csi(params);
                    }
                    Step::Consumed
                }
                0x40..=0x7e => {
                    let key = match byte {
                        b'A' => KeyEvent::Up,
                        b'B' => KeyEvent::Down,
                        b'C' => KeyEvent::Right,
                        b'D' => KeyEvent::Left,
                        // Home/End, `~` keys (Insert/Delete/paging/F5+), everything else.
                        _ => KeyEvent::Ignored,
                    };
                    self.emit(out, key);
                    Step::Consumed
                }
                _ => {
                    self.emit(out, KeyEvent::Ignored);
                    Step::Replay
                }
            },
            DecodeState::CsiDiscard => match byte {
                0x20..=0x3f => {
                    self.state = DecodeState::CsiDiscard;
                    Step::Consumed
                }
                0x40..=0x7e => Step::Consumed,
                _ => Step::Replay,
            },
            DecodeState::Ss3 => match byte {
                0x40..=0x7e => {
                    let key = match byte {
                        b'A' => KeyEvent::Up,
                        b'B' => KeyEvent::Down,
                        b'C' => KeyEvent::Right,
                        b'D' => KeyEvent::Left,
                        // F1-F4 (P..S), Home/End and keypad application keys.
                        _ => KeyEvent::Ignored,
                    };
                    self.emit(out, key);
                    Step::Consumed
                }
                _ => {
                    self.emit(out, KeyEvent::Ignored);
                    Step::Replay
                }
            },
            DecodeState::Utf8 { mut buf, len, need } => {
                if !(0x80..=0xbf).contains(&byte) {
                    self.emit(out, KeyEvent::Ignored);
                    return Step::Replay;
                }
                buf[len] = byte;
                let len = len + 1;
                if len < need {
                    self.state = DecodeState::Utf8 { buf, len, need };
                    return Step::Consumed;
                }
                match std::str::from_utf8(&buf[..len]) {
                    Ok(s) => self.run.push_str(s),
                    Err(_) => self.emit(out, KeyEvent::Ignored),
                }
                Step::Consumed
            }
        }
    }

    fn ground(&mut self, byte: u8, out: &mut Vec<KeyEvent>) {
        let after_cr = std::mem::replace(&mut self.last_was_cr, false);
        match byte {
            b'\r' => {
                self.last_was_cr = true;
                self.emit(out, KeyEvent::Enter);
            }
            b'\n' => {
                if !after_cr {
                    self.emit(out, KeyEvent::Enter);
                }
            }
            0x7f | 0x08 => self.emit(out, KeyEvent::Backspace),
            0x03 => self.emit(out, KeyEvent::Interrupt),
            0x04 => self.emit(out, KeyEvent::EndOfInput),
            ESC => self.state = DecodeState::Escape,
            0x00..=0x1f => self.emit(out, KeyEvent::Ignored),
            0x20..=0x7e => self.run.push(byte as char),
            0xc2..=0xdf => self.begin_utf8(byte, 2),
            0xe0..=0xef => self.begin_utf8(byte, 3),
            0xf0..=0xf4 => self.begin_utf8(byte, 4),
            _ => self.emit(out, KeyEvent::Ignored),
        }
    }

    fn begin_utf8(&mut self, lead: u8, need: usize) {
        let mut buf = [0u8; 4];
        buf[0] = lead;
        self.state = DecodeState::Utf8 { buf, len: 1, need };
    }

    fn flush_run(&mut self, out: &mut Vec<KeyEvent>) {
        if self.run.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.run);
        KEYS_DECODED.fetch_add(1, Ordering::Relaxed);
        trace!(target: "input.decoder", kind = "character", len = text.len(), "key_decoded");
        out.push(KeyEvent::Character(text));
    }

    fn emit(&mut self, out: &mut Vec<KeyEvent>, key: KeyEvent) {
        self.flush_run(out);
        if matches!(key, KeyEvent::Ignored) {
            KEYS_IGNORED.fetch_add(1, Ordering::Relaxed);
        }
        KEYS_DECODED.fetch_add(1, Ordering::Relaxed);
        trace!(target: "input.decoder", kind = key.kind_label(), "key_decoded");
        out.push(key);
    }
}
