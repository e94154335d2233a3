use colored::*;

use crate::deck::{CardEntry, Deck, DeckMap, DeckType, Label, Tier, DECK_SIZE};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// コンソール向けのデッキ表示
pub struct DeckFormatter;

impl DeckFormatter {
    /// 一覧の1行: "  1. 🔥 リザードン  (炎タイプ  難易度: ★★★)  Tier1"
    pub fn format_summary_line(index: usize, name: &str, deck: &Deck) -> String {
        let mut line = format!(
            "  {}. {} {}  ({}タイプ  難易度: {})",
            index,
            Self::type_emoji(deck),
            name.bold(),
            Self::label_or_unknown(deck.deck_type.as_ref()),
            Self::label_or_unknown(deck.difficulty.as_ref()),
        );
        if let Some(tier) = Self::tier_badge(deck) {
            line.push_str("  ");
            line.push_str(&tier);
        }
        line
    }

    pub fn format_list(decks: &DeckMap, names: &[&str]) -> String {
        if names.is_empty() {
            return "  (デッキがありません)\n".to_string();
        }
        let mut result = String::new();
        for (i, name) in names.iter().enumerate() {
            if let Some(deck) = decks.get(*name) {
                result.push_str(&Self::format_summary_line(i + 1, name, deck));
                result.push('\n');
            }
        }
        result
    }

    /// デッキ詳細
    pub fn format_detail(name: &str, deck: &Deck, fallback_color: &str) -> String {
        let color = deck.accent_or(fallback_color);
        let mut out = String::new();

        out.push_str(&format!("\n{}\n", "=".repeat(50)));
        out.push_str(&format!(
            "  {} {}  タイプ: {}  難易度: {}",
            Self::type_emoji(deck),
            Self::paint(&format!("【{}デッキ】", name), color).bold(),
            Self::label_or_unknown(deck.deck_type.as_ref()),
            Self::label_or_unknown(deck.difficulty.as_ref()),
        ));
        if let Some(tier) = Self::tier_badge(deck) {
            out.push_str(&format!("  {}", tier));
        }
        out.push_str(&format!("\n{}\n", "=".repeat(50)));

        out.push_str(&Self::section("📋 デッキレシピ"));
        let recipe = &deck.recipe;
        out.push_str(&Self::format_entries(
            "ポケモン",
            "🔵",
            &recipe.pokemon,
            recipe.pokemon_total(),
        ));
        out.push_str(&Self::format_entries(
            "トレーナー",
            "🟡",
            &recipe.trainer,
            recipe.trainer_total(),
        ));
        let total = deck.total_cards();
        let slots = if total < DECK_SIZE {
            format!("{} 枠空き", deck.open_slots()).yellow().to_string()
        } else if total == DECK_SIZE {
            format!("✅ {}枚", DECK_SIZE).green().to_string()
        } else {
            format!("{} 枚オーバー", total - DECK_SIZE).red().to_string()
        };
        out.push_str(&format!("  合計: {} 枚  ({})\n", total, slots));

        out.push_str(&Self::section("🎮 回し方"));
        if deck.phases.is_empty() {
            out.push_str("  記録なし\n");
        }
        for (phase, desc) in &deck.phases {
            let label = format!("【{}】", phase);
            out.push_str(&format!(
                "  {}{}\n",
                Self::paint(&label, Self::phase_color(phase)).bold(),
                desc
            ));
        }

        out.push_str(&Self::section("✅ 強み"));
        for s in &deck.strengths {
            out.push_str(&format!("  {}\n", format!("▶ {}", s).green()));
        }

        out.push_str(&Self::section("❌ 弱み"));
        for w in &deck.weaknesses {
            out.push_str(&format!("  {}\n", format!("▶ {}", w).red()));
        }

        out.push_str(&Self::section("💡 対策・アドバイス"));
        let tips = if deck.counter_tips.trim().is_empty() {
            "記録なし"
        } else {
            deck.counter_tips.as_str()
        };
        out.push_str(&format!("  {}\n", tips));

        out
    }

    /// タイプ別の件数
    pub fn format_types(decks: &DeckMap, types: &[Label<DeckType>]) -> String {
        let mut result = String::new();
        for t in types {
            let count = decks
                .values()
                .filter(|d| d.deck_type.as_ref().is_some_and(|l| l.matches(t)))
                .count();
            let emoji = t.known().map_or("🃏", DeckType::emoji);
            result.push_str(&format!("  {} {}  {}件\n", emoji, t, count));
        }
        let untyped = decks.values().filter(|d| d.is_untyped()).count();
        if untyped > 0 {
            result.push_str(&format!("  🃏 不明  {}件\n", untyped));
        }
        result
    }

    pub fn banner() -> String {
        format!(
            r#"╔══════════════════════════════════════╗
║   {}  🃏         ║
╚══════════════════════════════════════╝"#,
            "ポケポケ デッキビルダー".bold()
        )
    }

    fn format_entries(title: &str, marker: &str, entries: &[CardEntry], total: u32) -> String {
        let mut out = format!("  [{}]\n", title);
        if entries.is_empty() {
            out.push_str("    データなし\n");
        }
        for entry in entries {
            out.push_str(&format!("    {} {} × {}\n", marker, entry.name, entry.count));
        }
        out.push_str(&format!("    （計 {} 枚）\n", total));
        out
    }

    fn section(title: &str) -> String {
        format!("\n{}\n{}\n", title.bold(), RULE.dimmed())
    }

    fn type_emoji(deck: &Deck) -> &'static str {
        deck.known_type().map_or("🃏", |t| t.emoji())
    }

    /// 知らない綴りはそのまま出す。空なら "?"
    fn label_or_unknown<T: std::fmt::Display>(label: Option<&Label<T>>) -> String {
        match label {
            Some(label) if !label.is_blank() => label.to_string(),
            _ => "?".to_string(),
        }
    }

    fn tier_badge(deck: &Deck) -> Option<String> {
        let tier = deck.tier.as_ref().filter(|t| !t.is_blank())?;
        let color = tier.known().map_or(Tier::Reference.color(), Tier::color);
        Some(Self::paint(&tier.to_string(), color).bold().to_string())
    }

    fn phase_color(phase: &str) -> &'static str {
        match phase {
            "序盤" => "#3B82F6",
            "中盤" => "#8B5CF6",
            "終盤" => "#EF4444",
            _ => "#64748B",
        }
    }

    /// "#RRGGBB" の色で塗る。読めない色はそのまま
    fn paint(text: &str, hex: &str) -> ColoredString {
        match Self::parse_hex(hex) {
            Some((r, g, b)) => text.truecolor(r, g, b),
            None => text.normal(),
        }
    }

    fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
        let hex = hex.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }
}
