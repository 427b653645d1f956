//! Rule-based Korean morphological analyzer.
//!
//! Words are segmented on Unicode word boundaries, then each Hangul word is
//! matched against closed-class lexicons (adverbs, particles, ...), then
//! against predicate endings (reducing verbs and adjectives to `stem + 다`),
//! and finally split into a noun plus a trailing particle or copula.
//! Predicate stems are only accepted when a lexicon or a productive suffix
//! (`하`, `되`, `있`, `없`, `스럽`, `롭`) vouches for them, so nouns that merely
//! end like a conjugation fall through to the noun path.

use super::hangul::{
    self, FINAL_BIEUP, FINAL_NIEUN, FINAL_NONE, FINAL_RIEUL, FINAL_SSANGSIOT, MEDIAL_A,
    MEDIAL_EO, MEDIAL_EU, MEDIAL_I, MEDIAL_O, MEDIAL_U, MEDIAL_WA, MEDIAL_WO, MEDIAL_YEO,
};
use super::tokenizer::{PartOfSpeech, Token, TokenizeError, Tokenizer};
use lazy_static::lazy_static;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_MAX_TEXT_CHARS: usize = 20_000;

const ADVERBS: &[&str] = &[
    "너무", "정말", "진짜", "아주", "매우", "완전", "그냥", "다시", "좀", "잘", "더", "또", "많이",
    "가장", "제일", "꼭", "참", "되게", "엄청", "아직", "이미", "벌써", "조금", "특히", "역시",
    "그래도", "계속", "항상", "자주", "전혀", "별로", "결국", "오히려", "훨씬", "거의", "다", "안",
    "못", "왜", "어떻게", "이렇게", "그렇게", "저렇게", "같이", "함께", "바로", "드디어", "굉장히",
    "정말로", "완전히", "충분히", "솔직히", "도대체", "차라리", "그저", "늘", "곧", "이제", "한번",
    "진짜로", "매번", "가끔", "살짝", "딱", "꽤", "무척", "상당히", "확실히", "분명히", "너무너무",
];

const CONJUNCTIONS: &[&str] = &[
    "그리고", "그러나", "하지만", "그런데", "그래서", "또는", "및", "그러면", "근데", "그치만",
    "그러니까",
];

const DETERMINERS: &[&str] = &[
    "이", "그", "이런", "그런", "저런", "어떤", "무슨", "첫", "온갖", "모든", "각", "몇", "새",
];

const PRONOUNS: &[&str] = &[
    "나", "너", "저", "우리", "저희", "그녀", "그들", "이것", "그것", "저것", "여기", "거기", "저기",
    "뭐", "무엇", "누구", "내", "제", "자기", "당신",
];

const EXCLAMATIONS: &[&str] = &[
    "와", "우와", "헐", "아", "오", "음", "흠", "아이고", "하하", "으악", "어머", "에휴", "아휴",
];

/// Postpositional particles. Suffix matching always picks the longest.
const JOSA: &[&str] = &[
    "에서는", "에게서", "으로는", "으로도", "에서도", "이라고", "이라는", "라는", "라고", "에서",
    "에게", "한테", "으로", "까지", "부터", "보다", "처럼", "만큼", "마저", "조차", "이나", "이랑",
    "과", "와", "은", "는", "이", "가", "을", "를", "에", "의", "도", "만", "로", "랑", "나", "께",
];

/// Copula forms attached to a noun (`영화였다`, `최고입니다`).
const COPULAS: &[&str] = &[
    "이었습니다", "였습니다", "입니다", "이에요", "이었다", "이었어요", "였어요", "이예요", "예요",
    "에요", "이다", "였다", "이야", "이죠", "이지만", "인데", "이고", "다",
];

const ADJECTIVE_STEMS: &[&str] = &[
    "좋", "나쁘", "싫", "재밌", "슬프", "기쁘", "아름답", "멋지", "예쁘", "이쁘", "짧", "무섭",
    "아쉽", "귀엽", "어렵", "쉽", "괜찮", "같", "많", "적", "크", "작", "새롭", "놀랍", "무겁",
    "가볍", "즐겁", "깊", "높", "낮", "지겹", "외롭", "괴롭", "두렵", "아프", "바쁘", "졸리",
    "어둡", "밝", "뜨겁", "차갑", "젊", "고맙", "반갑", "부럽", "싱겁", "더럽", "시끄럽", "있",
    "없",
];

/// Roots that form adjectives (not verbs) with `하다`: 지루 → 지루하다.
const ADJECTIVE_HA_ROOTS: &[&str] = &[
    "행복", "지루", "심심", "유치", "뻔", "훌륭", "대단", "깔끔", "허무", "진부", "평범", "따분",
    "식상", "완벽", "신선", "황당", "어색", "불편", "충분", "부족", "소중", "특별", "이상", "독특",
    "잔잔", "따뜻", "답답", "착", "유쾌", "통쾌", "상쾌", "훈훈", "뭉클", "찡", "애매", "엉성",
    "허술", "탄탄", "치밀", "섬세", "웅장", "화려", "진지", "무난", "비슷", "똑똑", "불쌍", "피곤",
    "궁금", "아련", "먹먹", "씁쓸", "참신", "산만", "복잡", "단순", "불안", "편안", "조용", "시원",
    "깨끗", "중요", "필요", "가능", "유명", "확실", "정확",
];

const VERB_STEMS: &[&str] = &[
    "보", "가", "오", "하", "되", "먹", "울", "웃", "웃기", "만들", "나오", "들", "듣", "알", "모르",
    "느끼", "찍", "죽", "살", "싸우", "놀", "빠지", "쓰", "주", "받", "찾", "잃", "잊", "믿", "남",
    "끝나", "지나", "보이", "들리", "걸리", "만나", "떠나", "돌아오", "기다리", "흘리", "터지",
    "그리", "담", "풀", "넘", "모으", "바꾸", "보여주", "졸", "깨", "놓치", "즐기", "견디", "참",
    "움직이", "이기", "지", "나가", "들어가", "들어오", "잡", "닫", "사", "타", "키우", "보내",
    "챙기", "끌", "끌리", "빠져들", "이끌", "따라가", "나누", "겪", "버리", "던지", "때리", "맞",
    "달리", "뛰", "지키", "기억나", "생기", "꾸",
];

#[derive(Clone, Copy)]
enum Rewrite {
    /// Stem is the word minus the ending.
    Keep,
    /// Ending swallowed part of the stem (`했다` → `하`).
    Append(&'static str),
    /// ㅂ-irregular: the stem's last syllable regains its final ㅂ (`무서운` → `무섭`).
    AddFinal(u32),
}

struct Ending {
    suffix: &'static str,
    rewrite: Rewrite,
    /// The ending may fuse into the stem's last syllable as ㄴ/ㅂ/ㄹ (`간다`, `봅니다`).
    fused_final: bool,
}

const fn ending(suffix: &'static str, rewrite: Rewrite) -> Ending {
    Ending {
        suffix,
        rewrite,
        fused_final: false,
    }
}

const fn fused(suffix: &'static str) -> Ending {
    Ending {
        suffix,
        rewrite: Rewrite::Keep,
        fused_final: true,
    }
}

const HA: Rewrite = Rewrite::Append("하");
const DOE: Rewrite = Rewrite::Append("되");
const BIEUP: Rewrite = Rewrite::AddFinal(FINAL_BIEUP);
const KEEP: Rewrite = Rewrite::Keep;

const ENDINGS: &[Ending] = &[
    ending("했습니다", HA),
    ending("했어요", HA),
    ending("했는데", HA),
    ending("했지만", HA),
    ending("했던", HA),
    ending("했고", HA),
    ending("했다", HA),
    ending("했어", HA),
    ending("합니다", HA),
    ending("해서", HA),
    ending("해요", HA),
    ending("해도", HA),
    ending("하는", HA),
    ending("하고", HA),
    ending("하게", HA),
    ending("하지", HA),
    ending("하다", HA),
    ending("하면", HA),
    ending("해", HA),
    ending("한", HA),
    ending("할", HA),
    ending("됐다", DOE),
    ending("됐어요", DOE),
    ending("돼요", DOE),
    ending("된", DOE),
    ending("될", DOE),
    ending("웠습니다", BIEUP),
    ending("웠어요", BIEUP),
    ending("웠는데", BIEUP),
    ending("웠던", BIEUP),
    ending("웠고", BIEUP),
    ending("웠다", BIEUP),
    ending("워서", BIEUP),
    ending("워요", BIEUP),
    ending("워도", BIEUP),
    ending("워", BIEUP),
    ending("운", BIEUP),
    ending("울", BIEUP),
    ending("었습니다", KEEP),
    ending("았습니다", KEEP),
    ending("었어요", KEEP),
    ending("았어요", KEEP),
    ending("었는데", KEEP),
    ending("았는데", KEEP),
    ending("었지만", KEEP),
    ending("았지만", KEEP),
    ending("었던", KEEP),
    ending("았던", KEEP),
    ending("었고", KEEP),
    ending("았고", KEEP),
    ending("었다", KEEP),
    ending("았다", KEEP),
    ending("었어", KEEP),
    ending("았어", KEEP),
    ending("습니다", KEEP),
    fused("니다"),
    ending("는데", KEEP),
    ending("은데", KEEP),
    ending("지만", KEEP),
    ending("네요", KEEP),
    ending("군요", KEEP),
    ending("어요", KEEP),
    ending("아요", KEEP),
    ending("어서", KEEP),
    ending("아서", KEEP),
    ending("어도", KEEP),
    ending("아도", KEEP),
    ending("으면", KEEP),
    ending("는다", KEEP),
    ending("려고", KEEP),
    ending("으니", KEEP),
    ending("는", KEEP),
    ending("은", KEEP),
    ending("을", KEEP),
    ending("던", KEEP),
    ending("고", KEEP),
    fused("다"),
    fused("데"),
    ending("면", KEEP),
    ending("서", KEEP),
    ending("게", KEEP),
    ending("지", KEEP),
    ending("죠", KEEP),
    ending("네", KEEP),
    ending("요", KEEP),
    ending("어", KEEP),
    ending("아", KEEP),
    ending("기", KEEP),
];

fn by_length_desc(items: &[&'static str]) -> Vec<&'static str> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));
    sorted
}

lazy_static! {
    static ref ADVERB_SET: HashSet<&'static str> = ADVERBS.iter().copied().collect();
    static ref CONJUNCTION_SET: HashSet<&'static str> = CONJUNCTIONS.iter().copied().collect();
    static ref DETERMINER_SET: HashSet<&'static str> = DETERMINERS.iter().copied().collect();
    static ref PRONOUN_SET: HashSet<&'static str> = PRONOUNS.iter().copied().collect();
    static ref EXCLAMATION_SET: HashSet<&'static str> = EXCLAMATIONS.iter().copied().collect();
    static ref JOSA_SET: HashSet<&'static str> = JOSA.iter().copied().collect();
    static ref ADJECTIVE_SET: HashSet<&'static str> = ADJECTIVE_STEMS.iter().copied().collect();
    static ref ADJECTIVE_HA_SET: HashSet<&'static str> =
        ADJECTIVE_HA_ROOTS.iter().copied().collect();
    static ref VERB_SET: HashSet<&'static str> = VERB_STEMS.iter().copied().collect();
    /// Particles and copulas, longest first.
    static ref NOUN_SUFFIXES: Vec<&'static str> = {
        let mut all = JOSA.to_vec();
        all.extend_from_slice(COPULAS);
        by_length_desc(&all)
    };
    static ref SORTED_ENDINGS: Vec<&'static Ending> = {
        let mut sorted: Vec<&'static Ending> = ENDINGS.iter().collect();
        sorted.sort_by_key(|e| std::cmp::Reverse(e.suffix.chars().count()));
        sorted
    };
}

fn closed_class(word: &str) -> Option<PartOfSpeech> {
    if ADVERB_SET.contains(word) {
        Some(PartOfSpeech::Adverb)
    } else if CONJUNCTION_SET.contains(word) {
        Some(PartOfSpeech::Conjunction)
    } else if EXCLAMATION_SET.contains(word) {
        Some(PartOfSpeech::Exclamation)
    } else if PRONOUN_SET.contains(word) {
        Some(PartOfSpeech::Pronoun)
    } else if DETERMINER_SET.contains(word) {
        Some(PartOfSpeech::Determiner)
    } else if JOSA_SET.contains(word) {
        Some(PartOfSpeech::Josa)
    } else {
        None
    }
}

/// Decides whether `stem` is a verb or adjective stem.
fn classify_stem(stem: &str) -> Option<PartOfSpeech> {
    if !hangul::is_hangul_word(stem) {
        return None;
    }
    if ADJECTIVE_SET.contains(stem) {
        return Some(PartOfSpeech::Adjective);
    }
    if VERB_SET.contains(stem) {
        return Some(PartOfSpeech::Verb);
    }
    let len = stem.chars().count();
    if len < 2 {
        return None;
    }
    if stem.ends_with('있') || stem.ends_with('없') || stem.ends_with("스럽") || stem.ends_with('롭')
    {
        return Some(PartOfSpeech::Adjective);
    }
    if let Some(root) = stem.strip_suffix('하') {
        return if ADJECTIVE_HA_SET.contains(root) {
            Some(PartOfSpeech::Adjective)
        } else {
            Some(PartOfSpeech::Verb)
        };
    }
    if stem.ends_with('되') || stem.ends_with("시키") {
        return Some(PartOfSpeech::Verb);
    }
    None
}

/// Undoes vowel contraction on a stem's last syllable (`봐` → `보`, `져` → `지`).
fn decontract(c: char) -> char {
    if !hangul::has_final(c, FINAL_NONE) {
        return c;
    }
    match c {
        '해' => '하',
        '돼' => '되',
        _ => match hangul::medial_of(c) {
            Some(MEDIAL_WA) => hangul::with_medial(c, MEDIAL_O),
            Some(MEDIAL_WO) => hangul::with_medial(c, MEDIAL_U),
            Some(MEDIAL_YEO) => hangul::with_medial(c, MEDIAL_I),
            _ => c,
        },
    }
}

/// Strips the past-tense marker and vowel contraction from a stem.
fn normalize_stem(stem: &str) -> String {
    let mut chars: Vec<char> = stem.chars().collect();
    if chars.len() > 1 && matches!(chars.last(), Some('었' | '았' | '였')) {
        chars.pop();
    }
    if let Some(last) = chars.last_mut() {
        if hangul::has_final(*last, FINAL_SSANGSIOT) {
            *last = hangul::without_final(*last);
        }
        *last = decontract(*last);
    }
    chars.into_iter().collect()
}

fn replace_last(stem: &str, f: impl Fn(char) -> char) -> String {
    let mut chars: Vec<char> = stem.chars().collect();
    if let Some(last) = chars.last_mut() {
        *last = f(*last);
    }
    chars.into_iter().collect()
}

fn stem_candidates(stem: &str, fused_final: bool) -> Vec<String> {
    let normalized = normalize_stem(stem);
    let mut candidates = vec![stem.to_string(), normalized.clone()];
    let Some(last) = stem.chars().last() else {
        return candidates;
    };
    // ㅡ drops before 어/아 (슬프 → 슬펐다, 아프 → 아팠다)
    if let Some(vowel) = normalized.chars().last() {
        if hangul::has_final(vowel, FINAL_NONE)
            && matches!(hangul::medial_of(vowel), Some(MEDIAL_EO | MEDIAL_A))
        {
            candidates.push(replace_last(&normalized, |c| {
                hangul::with_medial(c, MEDIAL_EU)
            }));
        }
    }
    if fused_final
        && (hangul::has_final(last, FINAL_NIEUN)
            || hangul::has_final(last, FINAL_BIEUP)
            || hangul::has_final(last, FINAL_RIEUL))
    {
        candidates.push(replace_last(stem, hangul::without_final));
    }
    // ㄹ-stems drop their ㄹ before 는/ㄴ (만들 → 만드는)
    if hangul::has_final(last, FINAL_NONE) {
        candidates.push(replace_last(stem, |c| hangul::with_final(c, FINAL_RIEUL)));
    }
    candidates
}

fn predicate_token(stem: &str) -> Option<Token> {
    classify_stem(stem).map(|pos| Token::new(format!("{}다", stem), pos))
}

fn analyze_predicate(word: &str) -> Option<Token> {
    for ending in SORTED_ENDINGS.iter() {
        let Some(prefix) = word.strip_suffix(ending.suffix) else {
            continue;
        };
        if prefix.is_empty() {
            continue;
        }
        let base = match ending.rewrite {
            Rewrite::Keep => prefix.to_string(),
            Rewrite::Append(tail) => format!("{}{}", prefix, tail),
            Rewrite::AddFinal(final_index) => {
                let last = prefix.chars().last()?;
                if !hangul::has_final(last, FINAL_NONE) {
                    continue;
                }
                replace_last(prefix, |c| hangul::with_final(c, final_index))
            }
        };
        for candidate in stem_candidates(&base, ending.fused_final) {
            if let Some(token) = predicate_token(&candidate) {
                return Some(token);
            }
        }
    }

    // Bare stems and adnominal forms: 봐, 슬픈, 본, 만든
    let mut candidates = vec![normalize_stem(word)];
    if let Some(last) = word.chars().last() {
        if hangul::has_final(last, FINAL_NIEUN) || hangul::has_final(last, FINAL_RIEUL) {
            let bare = replace_last(word, hangul::without_final);
            candidates.push(bare.clone());
            if hangul::has_final(last, FINAL_NIEUN) {
                candidates.push(replace_last(&bare, |c| hangul::with_final(c, FINAL_RIEUL)));
            }
        }
    }
    candidates.iter().find_map(|c| predicate_token(c))
}

fn strip_plural(noun: &str) -> &str {
    match noun.strip_suffix('들') {
        Some(base) if base.chars().count() >= 2 => base,
        _ => noun,
    }
}

/// Whether a one-syllable `base` followed by a one-syllable `suffix` is a noun
/// plus a particle. Case particles alternate on the base's final consonant
/// (꿈을, 나는), so 나이 and 마을 stay whole.
fn splits_short_noun(base: &str, suffix: &str) -> bool {
    let Some(last) = base.chars().last() else {
        return false;
    };
    let has_coda = !hangul::has_final(last, FINAL_NONE);
    match suffix {
        "은" | "을" | "이" => has_coda,
        "는" | "를" | "가" => !has_coda,
        _ => PRONOUN_SET.contains(base),
    }
}

fn analyze_noun(word: &str, tokens: &mut Vec<Token>) {
    let word_len = word.chars().count();
    for suffix in NOUN_SUFFIXES.iter() {
        let Some(base) = word.strip_suffix(suffix) else {
            continue;
        };
        let base_len = word_len - suffix.chars().count();
        let suffix_len = word_len - base_len;
        if base_len >= 2
            || (base_len >= 1 && suffix_len >= 2)
            || (base_len == 1 && splits_short_noun(base, suffix))
        {
            let base = strip_plural(base);
            let pos = closed_class(base).unwrap_or(PartOfSpeech::Noun);
            tokens.push(Token::new(base, pos));
            tokens.push(Token::new(*suffix, PartOfSpeech::Josa));
            return;
        }
    }
    tokens.push(Token::new(strip_plural(word), PartOfSpeech::Noun));
}

fn analyze_hangul(word: &str, tokens: &mut Vec<Token>) {
    if let Some(pos) = closed_class(word) {
        tokens.push(Token::new(word, pos));
        return;
    }
    if let Some(token) = analyze_predicate(word) {
        tokens.push(token);
        return;
    }
    analyze_noun(word, tokens);
}

fn analyze_non_hangul(run: &str, tokens: &mut Vec<Token>) {
    let pos = if run.chars().all(char::is_numeric) {
        PartOfSpeech::Number
    } else if run.chars().all(|c| c.is_ascii_alphabetic()) {
        PartOfSpeech::Alpha
    } else {
        PartOfSpeech::Foreign
    };
    tokens.push(Token::new(run, pos));
}

/// Splits a word into maximal runs of Hangul and non-Hangul characters.
fn script_runs(word: &str) -> Vec<(bool, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (index, c) in word.char_indices() {
        let is_hangul = hangul::is_syllable(c);
        match current {
            Some(previous) if previous != is_hangul => {
                runs.push((previous, &word[start..index]));
                start = index;
            }
            _ => {}
        }
        current = Some(is_hangul);
    }
    if let Some(is_hangul) = current {
        runs.push((is_hangul, &word[start..]));
    }
    runs
}

/// Morphological analyzer for Korean review text.
#[derive(Clone, Debug)]
pub struct KoreanTokenizer {
    max_text_chars: usize,
}

impl Default for KoreanTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl KoreanTokenizer {
    pub fn new() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }

    pub fn with_max_text_chars(max_text_chars: usize) -> Self {
        Self { max_text_chars }
    }
}

impl Tokenizer for KoreanTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError> {
        let char_count = text.chars().count();
        if char_count > self.max_text_chars {
            return Err(TokenizeError::TooLong(char_count, self.max_text_chars));
        }
        if let Some(position) = text.chars().position(hangul::is_conjoining_jamo) {
            return Err(TokenizeError::DecomposedHangul(position));
        }

        let mut tokens = Vec::new();
        for word in text.unicode_words() {
            for (is_hangul, run) in script_runs(word) {
                if is_hangul {
                    analyze_hangul(run, &mut tokens);
                } else {
                    analyze_non_hangul(run, &mut tokens);
                }
            }
        }
        Ok(tokens)
    }
}
