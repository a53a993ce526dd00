use chipvm::keyboard::Keyboard;
use minifb::{Key, Window};

// 1 2 3 C      1 2 3 4
// 4 5 6 D  <-  Q W E R
// 7 8 9 E      A S D F
// A 0 B F      Z X C V
const KEYMAP: [(Key, u8); 16] = [
    (Key::X, 0x0),
    (Key::Key1, 0x1),
    (Key::Key2, 0x2),
    (Key::Key3, 0x3),
    (Key::Q, 0x4),
    (Key::W, 0x5),
    (Key::E, 0x6),
    (Key::A, 0x7),
    (Key::S, 0x8),
    (Key::D, 0x9),
    (Key::Z, 0xA),
    (Key::C, 0xB),
    (Key::Key4, 0xC),
    (Key::R, 0xD),
    (Key::F, 0xE),
    (Key::V, 0xF),
];

pub fn key_to_num(key: Key) -> Option<u8> {
    KEYMAP
        .iter()
        .find(|(host, _)| *host == key)
        .map(|&(_, num)| num)
}

/// Mirrors the host keyboard into the keypad.
pub fn sync_keys(window: &Window, keyboard: &mut Keyboard) {
    keyboard.reset();
    for num in window.get_keys().into_iter().filter_map(key_to_num) {
        keyboard.set_down(num, true);
    }
}
