//! Arithmetic on precomposed Hangul syllables (U+AC00..=U+D7A3).
//!
//! A syllable is encoded as `BASE + (initial * 21 + medial) * 28 + final`,
//! which lets us read or swap the final consonant (batchim) and the vowel
//! without any lookup tables.

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const MEDIAL_COUNT: u32 = 21;
const FINAL_COUNT: u32 = 28;

/// Conjoining jamo blocks, produced by NFD-normalized (decomposed) text.
const CONJOINING_JAMO: [(u32, u32); 3] = [(0x1100, 0x11FF), (0xA960, 0xA97F), (0xD7B0, 0xD7FF)];

pub const FINAL_NONE: u32 = 0;
pub const FINAL_NIEUN: u32 = 4;
pub const FINAL_RIEUL: u32 = 8;
pub const FINAL_BIEUP: u32 = 17;
pub const FINAL_SSANGSIOT: u32 = 20;

pub const MEDIAL_A: u32 = 0;
pub const MEDIAL_EO: u32 = 4;
pub const MEDIAL_YEO: u32 = 6;
pub const MEDIAL_O: u32 = 8;
pub const MEDIAL_WA: u32 = 9;
pub const MEDIAL_U: u32 = 13;
pub const MEDIAL_WO: u32 = 14;
pub const MEDIAL_EU: u32 = 18;
pub const MEDIAL_I: u32 = 20;

pub fn is_syllable(c: char) -> bool {
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&(c as u32))
}

pub fn is_conjoining_jamo(c: char) -> bool {
    let code = c as u32;
    CONJOINING_JAMO
        .iter()
        .any(|(start, end)| (*start..=*end).contains(&code))
}

/// True if every character of `word` is a precomposed syllable.
pub fn is_hangul_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(is_syllable)
}

fn offset(c: char) -> Option<u32> {
    if is_syllable(c) {
        Some(c as u32 - SYLLABLE_BASE)
    } else {
        None
    }
}

pub fn final_of(c: char) -> Option<u32> {
    offset(c).map(|o| o % FINAL_COUNT)
}

pub fn medial_of(c: char) -> Option<u32> {
    offset(c).map(|o| (o / FINAL_COUNT) % MEDIAL_COUNT)
}

pub fn has_final(c: char, final_index: u32) -> bool {
    final_of(c) == Some(final_index)
}

/// Replaces the final consonant of `c`. Non-syllables are returned untouched.
pub fn with_final(c: char, final_index: u32) -> char {
    match offset(c) {
        Some(o) => {
            let code = SYLLABLE_BASE + o - (o % FINAL_COUNT) + final_index;
            char::from_u32(code).unwrap_or(c)
        }
        None => c,
    }
}

pub fn without_final(c: char) -> char {
    with_final(c, FINAL_NONE)
}

/// Replaces the vowel of `c`, keeping its initial and final consonants.
pub fn with_medial(c: char, medial_index: u32) -> char {
    match offset(c) {
        Some(o) => {
            let initial = o / (MEDIAL_COUNT * FINAL_COUNT);
            let final_index = o % FINAL_COUNT;
            let code = SYLLABLE_BASE + (initial * MEDIAL_COUNT + medial_index) * FINAL_COUNT
                + final_index;
            char::from_u32(code).unwrap_or(c)
        }
        None => c,
    }
}
