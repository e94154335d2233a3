use log::{info, warn};

use super::error::{DeckError, Result};
use super::model::{Deck, DeckMap, DeckType, Label};
use super::ops;
use super::store::DeckStore;

/// ストアとそこから読んだデッキ一覧の組
///
/// 追加・削除のたびにファイル全体を書き直す。書き込みに失敗したときは
/// メモリ上の一覧も元に戻すので、常にディスクと同じ内容を保つ。
/// 読めなかったストアを空として開いた場合は読み取り専用になる。
pub struct DeckBook {
    store: DeckStore,
    decks: DeckMap,
    fallback: bool,
}

impl DeckBook {
    /// 厳密に読み込む。壊れたストアはエラー
    pub fn open(store: DeckStore) -> Result<Self> {
        let decks = store.load_all()?;
        Ok(Self {
            store,
            decks,
            fallback: false,
        })
    }

    /// 壊れたストアを空として開く。そのファイルは上書きしない
    pub fn open_lenient(store: DeckStore) -> Self {
        match store.load_all() {
            Ok(decks) => Self {
                store,
                decks,
                fallback: false,
            },
            Err(e) => {
                warn!("{e}; continuing with an empty deck list (read-only)");
                Self {
                    store,
                    decks: DeckMap::new(),
                    fallback: true,
                }
            }
        }
    }

    /// 空の一覧で代用している間は true
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn store(&self) -> &DeckStore {
        &self.store
    }

    pub fn decks(&self) -> &DeckMap {
        &self.decks
    }

    pub fn get(&self, name: &str) -> Option<&Deck> {
        self.decks.get(name)
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    /// ファイルから読み直す。失敗したら今の一覧をそのまま残す
    pub fn reload(&mut self) -> Result<()> {
        self.decks = self.store.load_all()?;
        self.fallback = false;
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.fallback {
            return Err(DeckError::StoreNotLoaded {
                path: self.store.path().to_path_buf(),
            });
        }
        Ok(())
    }

    pub fn add_deck(&mut self, name: &str, deck: Deck) -> Result<&Deck> {
        self.ensure_writable()?;
        let name = ops::add_deck(&mut self.decks, name, deck)?;

        if let Err(e) = self.store.save_all(&self.decks) {
            self.decks.shift_remove(&name);
            return Err(e);
        }

        info!("added deck {name}");
        Ok(&self.decks[name.as_str()])
    }

    pub fn remove_deck(&mut self, name: &str) -> Result<Deck> {
        self.ensure_writable()?;
        let (index, deck) = ops::remove_deck(&mut self.decks, name)?;

        if let Err(e) = self.store.save_all(&self.decks) {
            self.decks.shift_insert(index, name.to_string(), deck);
            return Err(e);
        }

        info!("removed deck {name}");
        Ok(deck)
    }

    pub fn filter_by_type(&self, deck_type: Option<&str>) -> Vec<&str> {
        ops::filter_by_type(&self.decks, deck_type)
    }

    pub fn present_types(&self) -> Vec<Label<DeckType>> {
        ops::present_types(&self.decks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::model::{CardEntry, Difficulty, Recipe};
    use std::fs;
    use std::num::NonZeroU32;
    use tempfile::TempDir;

    fn sample() -> Deck {
        Deck {
            deck_type: Some(DeckType::Fire.into()),
            difficulty: Difficulty::new(3).map(Into::into),
            recipe: Recipe {
                pokemon: vec![CardEntry::new("ピカチュウ", NonZeroU32::new(2).unwrap())],
                trainer: vec![],
            },
            ..Deck::default()
        }
    }

    fn create_test_book() -> (TempDir, DeckBook) {
        let dir = TempDir::new().unwrap();
        let store = DeckStore::new(dir.path().join("decks.json"));
        let book = DeckBook::open(store).unwrap();
        (dir, book)
    }

    #[test]
    fn test_add_persists() {
        let (_dir, mut book) = create_test_book();
        let deck = book.add_deck("サンプル", sample()).unwrap();
        assert_eq!(deck.total_cards(), 2);

        let reloaded = book.store().load_all().unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded["サンプル"], sample());
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let (_dir, mut book) = create_test_book();
        book.add_deck("サンプル", sample()).unwrap();

        let err = book.add_deck("サンプル", Deck::default()).unwrap_err();
        assert!(matches!(err, DeckError::DuplicateName(_)));
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("サンプル").unwrap().total_cards(), 2);
        assert_eq!(book.store().load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_then_reload() {
        let (_dir, mut book) = create_test_book();
        book.add_deck("サンプル", sample()).unwrap();
        book.add_deck("その2", Deck::default()).unwrap();

        let removed = book.remove_deck("サンプル").unwrap();
        assert_eq!(removed.known_type(), Some(DeckType::Fire));

        book.reload().unwrap();
        let names: Vec<_> = book.decks().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["その2"]);
    }

    #[test]
    fn test_remove_missing_leaves_store_untouched() {
        let (_dir, mut book) = create_test_book();
        book.add_deck("サンプル", sample()).unwrap();
        let before = fs::read(book.store().path()).unwrap();

        assert!(matches!(book.remove_deck("ミュウ"), Err(DeckError::NotFound(_))));
        assert_eq!(book.len(), 1);
        assert_eq!(fs::read(book.store().path()).unwrap(), before);
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("decks.json");
        let mut book = DeckBook::open(DeckStore::new(&target)).unwrap();

        // ストアの場所をディレクトリで塞いで書き込みを失敗させる
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        let err = book.add_deck("サンプル", sample()).unwrap_err();
        assert!(matches!(err, DeckError::StoreWriteFailed { .. }));
        assert!(book.is_empty());
    }

    #[test]
    fn test_failed_remove_restores_position() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("decks.json");
        let mut book = DeckBook::open(DeckStore::new(&target)).unwrap();
        book.add_deck("一番目", Deck::default()).unwrap();
        book.add_deck("二番目", Deck::default()).unwrap();
        book.add_deck("三番目", Deck::default()).unwrap();

        fs::remove_file(&target).unwrap();
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        assert!(book.remove_deck("二番目").is_err());
        let names: Vec<_> = book.decks().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["一番目", "二番目", "三番目"]);
    }

    #[test]
    fn test_open_lenient_on_corrupt_store() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("decks.json");
        fs::write(&target, "not json").unwrap();

        assert!(matches!(
            DeckBook::open(DeckStore::new(&target)),
            Err(DeckError::StoreCorrupt { .. })
        ));
        let book = DeckBook::open_lenient(DeckStore::new(&target));
        assert!(book.is_empty());
        assert!(book.is_fallback());
    }

    #[test]
    fn test_lenient_fallback_never_overwrites_store() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("decks.json");
        // 1件でも読めないレコードがあるとストア全体が読めない
        let text = r#"{"リザードン": {"タイプ": "炎", "レシピ": {"ポケモン": [{"名前": "ヒトカゲ", "枚数": 2}]}}, "メモ": {"タイプ": "ほのお", "レシピ": {"ポケモン": [{"名前": "ヒトカゲ"}]}}}"#;
        fs::write(&target, text).unwrap();

        let mut book = DeckBook::open_lenient(DeckStore::new(&target));
        assert!(book.is_fallback());

        let err = book.add_deck("新規", sample()).unwrap_err();
        assert!(matches!(err, DeckError::StoreNotLoaded { .. }));
        assert!(book.is_empty());
        assert!(matches!(
            book.remove_deck("リザードン"),
            Err(DeckError::StoreNotLoaded { .. })
        ));
        assert_eq!(fs::read_to_string(&target).unwrap(), text);

        // 直したあとに読み直せば書き込める
        fs::write(&target, "{}").unwrap();
        book.reload().unwrap();
        assert!(!book.is_fallback());
        book.add_deck("新規", sample()).unwrap();
        assert_eq!(book.store().load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_free_text_type_does_not_trigger_fallback() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("decks.json");
        fs::write(
            &target,
            r#"{"リザードン": {"タイプ": "炎"}, "メモ": {"タイプ": "ほのお"}}"#,
        )
        .unwrap();

        let mut book = DeckBook::open_lenient(DeckStore::new(&target));
        assert!(!book.is_fallback());
        book.add_deck("新規", sample()).unwrap();

        let stored = book.store().load_all().unwrap();
        let names: Vec<_> = stored.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["リザードン", "メモ", "新規"]);
        assert_eq!(stored["メモ"].deck_type.as_ref().unwrap().text(), "ほのお");
    }

    #[test]
    fn test_lenient_open_of_good_store_is_writable() {
        let (dir, mut book) = create_test_book();
        book.add_deck("サンプル", sample()).unwrap();

        let mut book = DeckBook::open_lenient(DeckStore::new(dir.path().join("decks.json")));
        assert!(!book.is_fallback());
        book.add_deck("その2", Deck::default()).unwrap();
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_filter_through_book() {
        let (_dir, mut book) = create_test_book();
        book.add_deck("サンプル", sample()).unwrap();
        book.add_deck(
            "カメックス",
            Deck {
                deck_type: Some(DeckType::Water.into()),
                ..Deck::default()
            },
        )
        .unwrap();

        assert_eq!(book.filter_by_type(Some("炎")), vec!["サンプル"]);
        assert_eq!(
            book.present_types(),
            vec![Label::from(DeckType::Fire), Label::from(DeckType::Water)]
        );
    }
}
