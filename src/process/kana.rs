//! Character-class conversions for the kana reading fields.
//!
//! The source dataset spells readings in half-width katakana
//! (U+FF61..=U+FF9F). A reading is derived in two fixed steps: widen to
//! full-width katakana, then shift katakana to hiragana. No dictionary is
//! involved.

use once_cell::sync::Lazy;
use std::collections::HashMap;

const HALF_WIDTH_START: u32 = 0xFF61;
const HALF_VOICED_MARK: char = '\u{FF9E}'; // ﾞ
const HALF_SEMI_VOICED_MARK: char = '\u{FF9F}'; // ﾟ

/// Full-width counterpart of every code point in U+FF61..=U+FF9F, in order.
const HALF_TO_FULL: [char; 63] = [
    '。', '「', '」', '、', '・', 'ヲ', 'ァ', 'ィ', 'ゥ', 'ェ', 'ォ', 'ャ', 'ュ', 'ョ', 'ッ', 'ー',
    'ア', 'イ', 'ウ', 'エ', 'オ', 'カ', 'キ', 'ク', 'ケ', 'コ', 'サ', 'シ', 'ス', 'セ', 'ソ', 'タ',
    'チ', 'ツ', 'テ', 'ト', 'ナ', 'ニ', 'ヌ', 'ネ', 'ノ', 'ハ', 'ヒ', 'フ', 'ヘ', 'ホ', 'マ', 'ミ',
    'ム', 'メ', 'モ', 'ヤ', 'ユ', 'ヨ', 'ラ', 'リ', 'ル', 'レ', 'ロ', 'ワ', 'ン', '゛', '゜',
];

/// Full-width → half-width, plus voiced letters → (base, mark).
static FULL_TO_HALF: Lazy<HashMap<char, (char, Option<char>)>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(HALF_TO_FULL.len() + 26);
    for (i, full) in HALF_TO_FULL.iter().enumerate() {
        let Some(half) = char::from_u32(HALF_WIDTH_START + i as u32) else {
            continue;
        };
        map.insert(*full, (half, None));
        if let Some(voiced) = compose(*full, HALF_VOICED_MARK) {
            map.insert(voiced, (half, Some(HALF_VOICED_MARK)));
        }
        if let Some(semi) = compose(*full, HALF_SEMI_VOICED_MARK) {
            map.insert(semi, (half, Some(HALF_SEMI_VOICED_MARK)));
        }
    }
    map
});

fn widen_char(c: char) -> Option<char> {
    let idx = (c as u32).checked_sub(HALF_WIDTH_START)? as usize;
    HALF_TO_FULL.get(idx).copied()
}

/// Combine a full-width katakana base with a following half-width mark.
fn compose(base: char, mark: char) -> Option<char> {
    let offset = match mark {
        HALF_VOICED_MARK => match base {
            'カ' | 'キ' | 'ク' | 'ケ' | 'コ' | 'サ' | 'シ' | 'ス' | 'セ' | 'ソ' | 'タ' | 'チ'
            | 'ツ' | 'テ' | 'ト' | 'ハ' | 'ヒ' | 'フ' | 'ヘ' | 'ホ' => 1,
            'ウ' => return Some('ヴ'),
            _ => return None,
        },
        HALF_SEMI_VOICED_MARK => match base {
            'ハ' | 'ヒ' | 'フ' | 'ヘ' | 'ホ' => 2,
            _ => return None,
        },
        _ => return None,
    };
    char::from_u32(base as u32 + offset)
}

/// Half-width katakana → full-width katakana.
///
/// A base letter followed by `ﾞ`/`ﾟ` becomes the single voiced letter
/// (`ｶﾞ` → `ガ`, `ﾊﾟ` → `パ`, `ｳﾞ` → `ヴ`). A mark that cannot compose turns
/// into the stand-alone `゛`/`゜`. Everything outside the half-width block is
/// copied through.
pub fn widen_katakana(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        let Some(full) = widen_char(c) else {
            out.push(c);
            continue;
        };
        match chars.peek().and_then(|&mark| compose(full, mark)) {
            Some(voiced) => {
                chars.next();
                out.push(voiced);
            }
            None => out.push(full),
        }
    }
    out
}

/// Full-width katakana → half-width katakana; inverse of [`widen_katakana`].
pub fn narrow_katakana(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match FULL_TO_HALF.get(&c) {
            Some((half, mark)) => {
                out.push(*half);
                if let Some(mark) = mark {
                    out.push(*mark);
                }
            }
            None => out.push(c),
        }
    }
    out
}

/// Full-width katakana `ァ`..=`ヶ` → hiragana. `ー` and non-katakana pass through.
pub fn katakana_to_hiragana(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'ァ'..='ヶ' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Hiragana reading of a half-width katakana field.
pub fn kana_reading(half_width: &str) -> String {
    katakana_to_hiragana(&widen_katakana(half_width))
}
