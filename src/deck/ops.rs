use std::str::FromStr;

use super::error::{DeckError, Result};
use super::model::{Deck, DeckMap, DeckType, Label};

/// 名前をチェックして末尾に追加する。失敗時は何も変えない
pub fn add_deck(decks: &mut DeckMap, name: &str, deck: Deck) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DeckError::EmptyName);
    }
    if decks.contains_key(name) {
        return Err(DeckError::DuplicateName(name.to_string()));
    }
    decks.insert(name.to_string(), deck);
    Ok(name.to_string())
}

/// 削除したデッキと、元の位置を返す
pub fn remove_deck(decks: &mut DeckMap, name: &str) -> Result<(usize, Deck)> {
    decks
        .shift_remove_full(name)
        .map(|(index, _, deck)| (index, deck))
        .ok_or_else(|| DeckError::NotFound(name.to_string()))
}

/// タイプで絞り込む。既知のタイプは別名でも一致し、それ以外は綴りで比べる
pub fn filter_by_type<'a>(decks: &'a DeckMap, deck_type: Option<&str>) -> Vec<&'a str> {
    let wanted = deck_type.and_then(|t| Label::<DeckType>::from_str(t).ok());

    decks
        .iter()
        .filter(|(_, deck)| match &wanted {
            None => true,
            Some(wanted) => deck.deck_type.as_ref().is_some_and(|t| t.matches(wanted)),
        })
        .map(|(name, _)| name.as_str())
        .collect()
}

/// ストアに出てくるタイプ。既知のものを定義順に、続けて知らない綴りを出現順に並べる
pub fn present_types(decks: &DeckMap) -> Vec<Label<DeckType>> {
    let mut types: Vec<Label<DeckType>> = DeckType::ALL
        .into_iter()
        .filter(|t| decks.values().any(|d| d.known_type() == Some(*t)))
        .map(Label::from)
        .collect();

    for label in decks.values().filter_map(|d| d.deck_type.as_ref()) {
        if label.known().is_some() || label.is_blank() {
            continue;
        }
        if !types.iter().any(|t| t.matches(label)) {
            types.push(label.clone());
        }
    }
    types
}
