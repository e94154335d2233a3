use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// ポケポケのデッキ枚数
pub const DECK_SIZE: u32 = 20;

/// デッキ名 → デッキ。挿入順がそのまま表示順・保存順になる
pub type DeckMap = IndexMap<String, Deck>;

/// デッキのタイプ（エネルギー属性）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckType {
    #[serde(rename = "草")]
    Grass,
    #[serde(rename = "炎")]
    Fire,
    #[serde(rename = "水")]
    Water,
    #[serde(rename = "雷")]
    Lightning,
    #[serde(rename = "超")]
    Psychic,
    #[serde(rename = "闘")]
    Fighting,
    #[serde(rename = "悪")]
    Darkness,
    #[serde(rename = "鋼")]
    Metal,
    #[serde(rename = "無色")]
    Colorless,
    #[serde(rename = "ドラゴン")]
    Dragon,
}

impl DeckType {
    pub const ALL: [DeckType; 10] = [
        DeckType::Grass,
        DeckType::Fire,
        DeckType::Water,
        DeckType::Lightning,
        DeckType::Psychic,
        DeckType::Fighting,
        DeckType::Darkness,
        DeckType::Metal,
        DeckType::Colorless,
        DeckType::Dragon,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DeckType::Grass => "草",
            DeckType::Fire => "炎",
            DeckType::Water => "水",
            DeckType::Lightning => "雷",
            DeckType::Psychic => "超",
            DeckType::Fighting => "闘",
            DeckType::Darkness => "悪",
            DeckType::Metal => "鋼",
            DeckType::Colorless => "無色",
            DeckType::Dragon => "ドラゴン",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            DeckType::Grass => "🌿",
            DeckType::Fire => "🔥",
            DeckType::Water => "💧",
            DeckType::Lightning => "⚡",
            DeckType::Psychic => "🔮",
            DeckType::Fighting => "👊",
            DeckType::Darkness => "🌑",
            DeckType::Metal => "⚙️",
            DeckType::Colorless => "⭐",
            DeckType::Dragon => "🐉",
        }
    }

    fn english(&self) -> &'static str {
        match self {
            DeckType::Grass => "grass",
            DeckType::Fire => "fire",
            DeckType::Water => "water",
            DeckType::Lightning => "lightning",
            DeckType::Psychic => "psychic",
            DeckType::Fighting => "fighting",
            DeckType::Darkness => "darkness",
            DeckType::Metal => "metal",
            DeckType::Colorless => "colorless",
            DeckType::Dragon => "dragon",
        }
    }
}

impl fmt::Display for DeckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeckType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DeckType::ALL
            .into_iter()
            .find(|t| t.label() == s || t.english().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown deck type: {s}"))
    }
}

/// 難易度（1〜5）。ストア上は "★★★" のような星の数で表す
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&stars).then_some(Difficulty(stars))
    }

    pub fn stars(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&"★".repeat(self.0 as usize))
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let stars = if let Ok(n) = s.parse::<u8>() {
            n
        } else if !s.is_empty() && s.chars().all(|c| c == '★' || c == '☆') {
            // ☆ は空き星
            s.chars().filter(|&c| c == '★').count().min(u8::MAX as usize) as u8
        } else {
            return Err(format!("invalid difficulty: {s}"));
        };
        Difficulty::new(stars)
            .ok_or_else(|| format!("difficulty must be {}-{} stars: {s}", Self::MIN, Self::MAX))
    }
}

/// 環境での評価
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
    #[serde(rename = "参考")]
    Reference,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Tier1, Tier::Tier2, Tier::Tier3, Tier::Reference];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Tier1 => "Tier1",
            Tier::Tier2 => "Tier2",
            Tier::Tier3 => "Tier3",
            Tier::Reference => "参考",
        }
    }

    /// 表示用の色（金・銀・銅・グレー）
    pub fn color(&self) -> &'static str {
        match self {
            Tier::Tier1 => "#FFD700",
            Tier::Tier2 => "#C0C0C0",
            Tier::Tier3 => "#CD7F32",
            Tier::Reference => "#6B7280",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("reference") {
            return Ok(Tier::Reference);
        }
        Tier::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tier: {s}"))
    }
}

/// ストアに書かれたラベル
///
/// 書かれていた値はそのまま保持して書き戻す。既知の値として読めたときだけ
/// `known()` が返る。知らない綴りでもエラーにはしない。
#[derive(Debug, Clone, PartialEq)]
pub struct Label<T> {
    raw: Value,
    known: Option<T>,
}

impl<T: FromStr> Label<T> {
    fn from_value(raw: Value) -> Self {
        let known = match &raw {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.to_string().parse().ok(),
            _ => None,
        };
        Self { raw, known }
    }
}

impl<T> Label<T> {
    pub fn known(&self) -> Option<&T> {
        self.known.as_ref()
    }

    /// 書かれていたままの文字列
    pub fn text(&self) -> Cow<'_, str> {
        match &self.raw {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            Value::Null => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

impl<T: PartialEq> Label<T> {
    /// どちらも既知なら値で、そうでなければ綴りで比べる
    pub fn matches(&self, other: &Label<T>) -> bool {
        match (&self.known, &other.known) {
            (Some(a), Some(b)) => a == b,
            _ => !self.is_blank() && self.text().trim() == other.text().trim(),
        }
    }
}

impl<T: fmt::Display> From<T> for Label<T> {
    fn from(value: T) -> Self {
        Self {
            raw: Value::String(value.to_string()),
            known: Some(value),
        }
    }
}

impl<T: FromStr + fmt::Display> FromStr for Label<T> {
    type Err = Infallible;

    /// 入力から作る。読めた値は正規の綴りに揃え、読めなければそのまま残す
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<T>() {
            Ok(value) => Label::from(value),
            Err(_) => Label {
                raw: Value::String(s.to_string()),
                known: None,
            },
        })
    }
}

impl<T: fmt::Display> fmt::Display for Label<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.known {
            Some(value) => value.fmt(f),
            None => f.write_str(&self.text()),
        }
    }
}

impl<T> Serialize for Label<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, T: FromStr> Deserialize<'de> for Label<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Label::from_value)
    }
}

/// キーがあれば null でも Some として読み、書き戻せるようにする
fn present_label<'de, D, T>(deserializer: D) -> Result<Option<Label<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Label::deserialize(deserializer).map(Some)
}

/// レシピの1行（カード名と枚数）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEntry {
    #[serde(rename = "名前", default)]
    pub name: String,
    #[serde(rename = "枚数")]
    pub count: NonZeroU32,
}

impl CardEntry {
    pub fn new(name: impl Into<String>, count: NonZeroU32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl FromStr for CardEntry {
    type Err = String;

    /// "ピカチュウ:2" / "ピカチュウ×2" / "ピカチュウ" (1枚)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, count) = match s.rsplit_once([':', '×', '*']) {
            Some((name, count)) => {
                let count: u32 = count
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid card count in '{s}'"))?;
                (name.trim(), count)
            }
            None => (s, 1),
        };
        if name.is_empty() {
            return Err(format!("card name is empty in '{s}'"));
        }
        let count = NonZeroU32::new(count).ok_or_else(|| format!("card count must be positive in '{s}'"))?;
        Ok(CardEntry::new(name, count))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "ポケモン", default)]
    pub pokemon: Vec<CardEntry>,
    #[serde(rename = "トレーナー", default)]
    pub trainer: Vec<CardEntry>,
}

impl Recipe {
    pub fn pokemon_total(&self) -> u32 {
        sum_counts(&self.pokemon)
    }

    pub fn trainer_total(&self) -> u32 {
        sum_counts(&self.trainer)
    }

    pub fn total(&self) -> u32 {
        self.pokemon_total() + self.trainer_total()
    }

    pub fn is_empty(&self) -> bool {
        self.pokemon.is_empty() && self.trainer.is_empty()
    }
}

fn sum_counts(entries: &[CardEntry]) -> u32 {
    entries.iter().map(|e| e.count.get()).sum()
}

/// デッキ1件分のレコード。JSON のキー名は既存ストアと互換
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deck {
    #[serde(
        rename = "タイプ",
        deserialize_with = "present_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub deck_type: Option<Label<DeckType>>,

    #[serde(
        rename = "難易度",
        deserialize_with = "present_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub difficulty: Option<Label<Difficulty>>,

    #[serde(
        rename = "Tier",
        deserialize_with = "present_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub tier: Option<Label<Tier>>,

    #[serde(rename = "レシピ")]
    pub recipe: Recipe,

    /// 序盤/中盤/終盤 などのラベル → 回し方
    #[serde(rename = "回し方")]
    pub phases: IndexMap<String, String>,

    #[serde(rename = "強み")]
    pub strengths: Vec<String>,

    #[serde(rename = "弱み")]
    pub weaknesses: Vec<String>,

    #[serde(rename = "対策")]
    pub counter_tips: String,

    #[serde(rename = "イメージカラー")]
    pub accent_color: String,

    /// 知らないキーはそのまま書き戻す
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Deck {
    pub fn known_type(&self) -> Option<DeckType> {
        self.deck_type.as_ref().and_then(Label::known).copied()
    }

    pub fn known_difficulty(&self) -> Option<Difficulty> {
        self.difficulty.as_ref().and_then(Label::known).copied()
    }

    pub fn known_tier(&self) -> Option<Tier> {
        self.tier.as_ref().and_then(Label::known).copied()
    }

    /// タイプ未設定（キーなし・空文字）
    pub fn is_untyped(&self) -> bool {
        self.deck_type.as_ref().map_or(true, Label::is_blank)
    }

    pub fn total_cards(&self) -> u32 {
        self.recipe.total()
    }

    /// 20枚に対する空き枠。超過していれば 0
    pub fn open_slots(&self) -> u32 {
        DECK_SIZE.saturating_sub(self.total_cards())
    }

    pub fn accent_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.accent_color.trim().is_empty() {
            fallback
        } else {
            &self.accent_color
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_parse_full_deck() {
        let json = r##"{
            "タイプ": "炎",
            "難易度": "★★★",
            "Tier": "Tier1",
            "レシピ": {
                "ポケモン": [{"名前": "ピカチュウ", "枚数": 2}],
                "トレーナー": [{"名前": "博士の研究", "枚数": 2}, {"名前": "モンスターボール", "枚数": 2}]
            },
            "回し方": {"序盤": "たねを並べる", "中盤": "進化", "終盤": "押し切る"},
            "強み": ["火力が高い"],
            "弱み": ["水に弱い"],
            "対策": "早めに倒す",
            "イメージカラー": "#EF4444"
        }"##;
        let deck: Deck = serde_json::from_str(json).unwrap();

        assert_eq!(deck.known_type(), Some(DeckType::Fire));
        assert_eq!(deck.known_difficulty().map(|d| d.stars()), Some(3));
        assert_eq!(deck.known_tier(), Some(Tier::Tier1));
        assert_eq!(deck.recipe.pokemon_total(), 2);
        assert_eq!(deck.recipe.trainer_total(), 4);
        assert_eq!(deck.total_cards(), 6);
        assert_eq!(deck.open_slots(), 14);
        let labels: Vec<_> = deck.phases.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["序盤", "中盤", "終盤"]);
        assert!(deck.extra.is_empty());
    }

    #[test]
    fn test_partial_record_defaults() {
        let deck: Deck = serde_json::from_str(r#"{"タイプ": "水"}"#).unwrap();
        assert_eq!(deck.known_type(), Some(DeckType::Water));
        assert!(deck.difficulty.is_none());
        assert!(deck.tier.is_none());
        assert!(deck.recipe.is_empty());
        assert!(deck.phases.is_empty());
        assert!(deck.strengths.is_empty());
        assert_eq!(deck.counter_tips, "");
        assert_eq!(deck.total_cards(), 0);

        let empty: Deck = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Deck::default());
    }

    #[test]
    fn test_console_written_record_loads() {
        // 対話入力でそのまま書かれたレコード
        let json = r##"{
            "タイプ": "ほのお",
            "難易度": "むずかしい",
            "Tier": "S",
            "レシピ": {"ポケモン": [], "トレーナー": []},
            "回し方": {"メモ": "とにかく殴る"},
            "強み": [""],
            "弱み": ["遅い"],
            "対策": "",
            "イメージカラー": "#888888"
        }"##;
        let deck: Deck = serde_json::from_str(json).unwrap();

        assert!(deck.known_type().is_none());
        assert!(deck.known_difficulty().is_none());
        assert!(deck.known_tier().is_none());
        assert_eq!(deck.deck_type.as_ref().unwrap().to_string(), "ほのお");
        assert_eq!(deck.difficulty.as_ref().unwrap().to_string(), "むずかしい");
        assert_eq!(deck.tier.as_ref().unwrap().to_string(), "S");
        assert!(!deck.is_untyped());
    }

    #[test]
    fn test_labels_are_written_back_verbatim() {
        let json = r#"{"タイプ":"","難易度":"3","Tier":"tier1"}"#;
        let deck: Deck = serde_json::from_str(json).unwrap();
        assert!(deck.is_untyped());
        assert_eq!(deck.known_difficulty(), Difficulty::new(3));
        assert_eq!(deck.known_tier(), Some(Tier::Tier1));

        let written = serde_json::to_value(&deck).unwrap();
        assert_eq!(written["タイプ"], "");
        assert_eq!(written["難易度"], "3");
        assert_eq!(written["Tier"], "tier1");

        let stars: Deck = serde_json::from_str(r#"{"難易度":"★★☆☆☆"}"#).unwrap();
        assert_eq!(stars.known_difficulty(), Difficulty::new(2));
        assert_eq!(serde_json::to_value(&stars).unwrap()["難易度"], "★★☆☆☆");

        let number: Deck = serde_json::from_str(r#"{"難易度":4,"Tier":null}"#).unwrap();
        assert_eq!(number.known_difficulty(), Difficulty::new(4));
        let written = serde_json::to_value(&number).unwrap();
        assert_eq!(written["難易度"], 4);
        assert!(written["Tier"].is_null());
        assert!(written.as_object().unwrap().contains_key("Tier"));
    }

    #[test]
    fn test_missing_card_count_is_rejected() {
        let json = r#"{"レシピ": {"ポケモン": [{"名前": "ピカチュウ"}]}}"#;
        assert!(serde_json::from_str::<Deck>(json).is_err());

        let zero = r#"{"レシピ": {"ポケモン": [{"名前": "ピカチュウ", "枚数": 0}]}}"#;
        assert!(serde_json::from_str::<Deck>(zero).is_err());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let json = r#"{"タイプ":"超","メモ":"あとで調整","レシピ":{"ポケモン":[],"トレーナー":[]}}"#;
        let deck: Deck = serde_json::from_str(json).unwrap();
        assert_eq!(deck.extra.get("メモ"), Some(&Value::from("あとで調整")));

        let written = serde_json::to_value(&deck).unwrap();
        assert_eq!(written["メモ"], "あとで調整");
        assert_eq!(written["タイプ"], "超");
    }

    #[test]
    fn test_label_from_input() {
        let fire: Label<DeckType> = "fire".parse().unwrap();
        assert_eq!(fire.known(), Some(&DeckType::Fire));
        assert_eq!(fire.text(), "炎");

        let free: Label<DeckType> = " ほのお ".parse().unwrap();
        assert!(free.known().is_none());
        assert_eq!(free.text(), "ほのお");

        let stars: Label<Difficulty> = "3".parse().unwrap();
        assert_eq!(stars.text(), "★★★");
    }

    #[test]
    fn test_label_matches() {
        let stored: Label<DeckType> = serde_json::from_str(r#""fire""#).unwrap();
        assert!(stored.matches(&Label::from(DeckType::Fire)));
        assert!(!stored.matches(&Label::from(DeckType::Water)));

        let free: Label<DeckType> = serde_json::from_str(r#""ほのお""#).unwrap();
        assert!(free.matches(&"ほのお".parse().unwrap()));
        assert!(!free.matches(&Label::from(DeckType::Fire)));

        let blank: Label<DeckType> = serde_json::from_str(r#""""#).unwrap();
        assert!(!blank.matches(&"".parse().unwrap()));
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("★★★".parse::<Difficulty>().unwrap().stars(), 3);
        assert_eq!("★★☆☆☆".parse::<Difficulty>().unwrap().stars(), 2);
        assert_eq!("5".parse::<Difficulty>().unwrap().stars(), 5);
        assert!("0".parse::<Difficulty>().is_err());
        assert!("★★★★★★".parse::<Difficulty>().is_err());
        assert!("hard".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_deck_type_from_str() {
        assert_eq!("炎".parse::<DeckType>().unwrap(), DeckType::Fire);
        assert_eq!("Dragon".parse::<DeckType>().unwrap(), DeckType::Dragon);
        assert!("fairy".parse::<DeckType>().is_err());
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!("tier2".parse::<Tier>().unwrap(), Tier::Tier2);
        assert_eq!("参考".parse::<Tier>().unwrap(), Tier::Reference);
        assert!("S".parse::<Tier>().is_err());
    }

    #[test]
    fn test_card_entry_from_str() {
        assert_eq!(
            "ピカチュウ:2".parse::<CardEntry>().unwrap(),
            CardEntry::new("ピカチュウ", count(2))
        );
        assert_eq!(
            "博士の研究 × 2".parse::<CardEntry>().unwrap(),
            CardEntry::new("博士の研究", count(2))
        );
        assert_eq!(
            "モンスターボール".parse::<CardEntry>().unwrap(),
            CardEntry::new("モンスターボール", count(1))
        );
        assert!("ピカチュウ:0".parse::<CardEntry>().is_err());
        assert!(":2".parse::<CardEntry>().is_err());
    }

    #[test]
    fn test_open_slots_saturates() {
        let deck = Deck {
            recipe: Recipe {
                pokemon: vec![CardEntry::new("ピカチュウ", count(21))],
                trainer: vec![],
            },
            ..Deck::default()
        };
        assert_eq!(deck.total_cards(), 21);
        assert_eq!(deck.open_slots(), 0);
    }
}
