use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::Result;

use super::commands::DeckFields;
use super::{confirm, handle_list, handle_remove, handle_show, handle_types};
use crate::config::Config;
use crate::deck::{CardEntry, DeckBook, DeckType, Difficulty, Label, Tier};
use crate::formatter::DeckFormatter;

enum Flow {
    Continue,
    Quit,
}

/// 1行ずつコマンドを読む対話モード
pub struct Session<'a, R, W> {
    book: &'a mut DeckBook,
    config: &'a Config,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(book: &'a mut DeckBook, config: &'a Config, input: R, out: W) -> Self {
        Self {
            book,
            config,
            input,
            out,
        }
    }

    pub fn run(mut self) -> Result<()> {
        writeln!(self.out, "{}", DeckFormatter::banner())?;

        loop {
            handle_list(self.book, None, &mut self.out)?;
            writeln!(
                self.out,
                "\nコマンド: [デッキ名] または [show デッキ名] 表示 / [type タイプ] 絞り込み / [types] タイプ一覧 / [new] 新規追加 / [del デッキ名] 削除 / [reload] 再読込 / [quit] 終了"
            )?;

            let Some(line) = self.prompt("デッキ主軸を入力: ")? else {
                writeln!(self.out, "\n終了します。")?;
                break;
            };

            if let Flow::Quit = self.dispatch(&line)? {
                break;
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow> {
        let lower = line.to_lowercase();

        match lower.as_str() {
            "" => {}
            "quit" | "q" | "exit" => {
                writeln!(self.out, "終了します。")?;
                return Ok(Flow::Quit);
            }
            "new" => self.add_flow(None)?,
            "types" => handle_types(self.book, &mut self.out)?,
            "reload" => {
                let result = self.book.reload().map_err(Into::into);
                self.report(result)?;
            }
            _ => {
                if let Some(name) = line.strip_prefix("show ") {
                    // 予約語と同じ名前のデッキもこれで開ける
                    let result = handle_show(self.book, name.trim(), self.config, &mut self.out);
                    self.report(result)?;
                } else if let Some(label) = line.strip_prefix("type ") {
                    handle_list(self.book, Some(label.trim()), &mut self.out)?;
                } else if let Some(name) = line.strip_prefix("del ") {
                    let result =
                        handle_remove(self.book, name.trim(), false, &mut self.input, &mut self.out);
                    self.report(result)?;
                } else if self.book.get(line).is_some() {
                    handle_show(self.book, line, self.config, &mut self.out)?;
                } else {
                    write!(self.out, "「{}」は見つかりません。新規追加しますか？ (y/n): ", line)?;
                    self.out.flush()?;
                    if confirm(&mut self.input)? {
                        self.add_flow(Some(line.to_string()))?;
                    }
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn add_flow(&mut self, name: Option<String>) -> Result<()> {
        writeln!(self.out, "\n=== 新規デッキ追加 ===")?;

        let name = match name {
            Some(name) => name,
            None => match self.prompt("デッキ名を入力: ")? {
                Some(name) => name,
                None => return self.cancelled(),
            },
        };
        if name.is_empty() {
            writeln!(self.out, "デッキ名が空です。キャンセルします。")?;
            return Ok(());
        }
        if self.book.get(&name).is_some() {
            writeln!(self.out, "同名のデッキが既に存在します。")?;
            return Ok(());
        }

        let Some(deck_type) = self.read_label::<DeckType>("タイプ（例: 炎, 水, 超）: ")? else {
            return self.cancelled();
        };
        let Some(difficulty) = self.read_label::<Difficulty>("難易度（例: ★★★）: ")? else {
            return self.cancelled();
        };
        let Some(tier) = self.read_label::<Tier>("Tier（Tier1/Tier2/Tier3/参考、空欄可）: ")? else {
            return self.cancelled();
        };
        let Some(pokemon) = self.read_cards("ポケモン（例: ピカチュウex:2, ライチュウ:1）: ")? else {
            return self.cancelled();
        };
        let Some(trainer) = self.read_cards("トレーナー（例: 博士の研究:2）: ")? else {
            return self.cancelled();
        };
        let Some(howto) = self.prompt("回し方を一行で入力: ")? else {
            return self.cancelled();
        };
        let Some(strengths) = self.prompt("強み（「、」区切り）: ")? else {
            return self.cancelled();
        };
        let Some(weaknesses) = self.prompt("弱み（「、」区切り）: ")? else {
            return self.cancelled();
        };
        let Some(tips) = self.prompt("対策・アドバイス: ")? else {
            return self.cancelled();
        };

        let fields = DeckFields {
            deck_type,
            difficulty,
            tier,
            pokemon,
            trainer,
            phase: if howto.is_empty() {
                Vec::new()
            } else {
                vec![("メモ".to_string(), howto)]
            },
            strength: split_items(&strengths),
            weakness: split_items(&weaknesses),
            tips: Some(tips),
            color: None,
        };
        let deck = fields.into_deck(&self.config.default_accent_color);

        match self.book.add_deck(&name, deck) {
            Ok(_) => writeln!(self.out, "✅ 「{}」デッキを追加・保存しました。", name)?,
            Err(e) => writeln!(self.out, "❌ {}", e)?,
        }
        Ok(())
    }

    /// 空欄は None。知らない値も書いたまま残す。外側の None は入力終了
    fn read_label<T>(&mut self, label: &str) -> io::Result<Option<Option<Label<T>>>>
    where
        T: FromStr + fmt::Display,
    {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(Some(None));
        }
        Ok(Some(Label::from_str(&raw).ok()))
    }

    fn read_cards(&mut self, label: &str) -> io::Result<Option<Vec<CardEntry>>> {
        loop {
            let Some(raw) = self.prompt(label)? else {
                return Ok(None);
            };
            let parsed: std::result::Result<Vec<CardEntry>, String> = split_items(&raw)
                .iter()
                .map(|item| item.parse())
                .collect();
            match parsed {
                Ok(cards) => return Ok(Some(cards)),
                Err(e) => writeln!(self.out, "❌ {}", e)?,
            }
        }
    }

    /// 入力終了なら None
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn cancelled(&mut self) -> Result<()> {
        writeln!(self.out, "\nキャンセルしました。")?;
        Ok(())
    }

    fn report(&mut self, result: Result<()>) -> io::Result<()> {
        if let Err(e) = result {
            writeln!(self.out, "❌ {:#}", e)?;
        }
        Ok(())
    }
}

fn split_items(raw: &str) -> Vec<String> {
    raw.split(['、', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
