//! Built-in label tables for sorting a collection by color identity, card type,
//! mana cost and name.

use crate::label::{LabelRecord, Title, VisualContent};
use serde::{Deserialize, Serialize};

/// Which labels a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    /// Color, type, cost and alphabetical labels.
    All,
    /// Type, cost and alphabetical labels.
    Tca,
    Type,
    Cost,
    Alpha,
    /// One label per set from the remote catalogue.
    Sets,
}

impl LabelKind {
    /// Static labels for this kind. Empty for [`LabelKind::Sets`], whose labels come
    /// from the catalogue.
    pub fn static_labels(self) -> Vec<LabelRecord> {
        match self {
            Self::All => [
                color_labels(),
                type_labels(),
                cost_labels(),
                alphabetical_labels(),
            ]
            .concat(),
            Self::Tca => [type_labels(), cost_labels(), alphabetical_labels()].concat(),
            Self::Type => type_labels(),
            Self::Cost => cost_labels(),
            Self::Alpha => alphabetical_labels(),
            Self::Sets => Vec::new(),
        }
    }
}

const COLORS: [(&str, &str); 31] = [
    ("White", "{W}"),
    ("Blue", "{U}"),
    ("Black", "{B}"),
    ("Red", "{R}"),
    ("Green", "{G}"),
    ("Colorless", "{C}"),
    ("Azorius", "{W}{U}"),
    ("Boros", "{W}{R}"),
    ("Dimir", "{U}{B}"),
    ("Golgari", "{B}{G}"),
    ("Gruul", "{R}{G}"),
    ("Izzet", "{U}{R}"),
    ("Orzhov", "{W}{B}"),
    ("Rakdos", "{B}{R}"),
    ("Selesnya", "{W}{G}"),
    ("Simic", "{U}{G}"),
    ("Abzan", "{W}{B}{G}"),
    ("Bant", "{W}{U}{G}"),
    ("Esper", "{W}{U}{B}"),
    ("Grixis", "{U}{B}{R}"),
    ("Jeskai", "{W}{U}{R}"),
    ("Jund", "{B}{R}{G}"),
    ("Mardu", "{W}{B}{R}"),
    ("Naya", "{W}{R}{G}"),
    ("Sultai", "{U}{B}{G}"),
    ("Temur", "{U}{R}{G}"),
    ("Dune", "{W}{B}{R}{G}"),
    ("Glint", "{U}{B}{R}{G}"),
    ("Ink", "{W}{U}{R}{G}"),
    ("Witch", "{W}{U}{B}{G}"),
    ("Yore", "{W}{U}{B}{R}"),
];

const COSTS: [(&str, &str); 3] = [
    ("Cost: 0-3", "{0}{1}{2}{3}"),
    ("Cost: 4-6", "{4}{5}{6}"),
    ("Cost: 7+ / X", "{7}{X}"),
];

const ALPHABET_RANGES: [&str; 6] = ["A-D", "E-H", "I-L", "M-Q", "R-T", "U-Z"];
const ALPHA_FONT_SIZE: f32 = 70.0;
const ALPHA_STEP_X: f32 = 80.0;
const ALPHA_OFFSET_Y: f32 = -10.0;

pub fn color_labels() -> Vec<LabelRecord> {
    COLORS
        .iter()
        .map(|(name, symbol)| LabelRecord::with_symbol(Title::new(*name), symbol))
        .collect()
}

pub fn type_labels() -> Vec<LabelRecord> {
    vec![
        LabelRecord::with_icon(Title::new("Artifact"), "artifact.png"),
        LabelRecord::with_icon(Title::new("Creature"), "creature.png"),
        LabelRecord::with_icon(Title::new("Enchantment"), "enchantment.png"),
        LabelRecord::with_icon(Title::new("Instant/Sorcery"), "instant_sorcery.png"),
        LabelRecord::with_symbol(Title::new("Planeswalker"), "{PW}"),
        LabelRecord::with_icon(Title::new("Misc"), "misc.png"),
    ]
}

pub fn cost_labels() -> Vec<LabelRecord> {
    COSTS
        .iter()
        .map(|(name, symbol)| LabelRecord::with_symbol(Title::new(*name), symbol))
        .collect()
}

/// Divider labels; each range is shifted right so the tabs stagger when stacked.
pub fn alphabetical_labels() -> Vec<LabelRecord> {
    ALPHABET_RANGES
        .iter()
        .enumerate()
        .map(|(idx, range)| {
            let title = Title::new(*range)
                .with_font_size(ALPHA_FONT_SIZE)
                .with_offsets(ALPHA_STEP_X * idx as f32, ALPHA_OFFSET_Y);
            LabelRecord::new(title, VisualContent::None)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_combinations() {
        assert_eq!(LabelKind::All.static_labels().len(), 31 + 6 + 3 + 6);
        assert_eq!(LabelKind::Tca.static_labels().len(), 6 + 3 + 6);
        assert_eq!(LabelKind::Type.static_labels().len(), 6);
        assert_eq!(LabelKind::Cost.static_labels().len(), 3);
        assert_eq!(LabelKind::Alpha.static_labels().len(), 6);
        assert!(LabelKind::Sets.static_labels().is_empty());
    }

    #[test]
    fn alphabetical_dividers_stagger() {
        let labels = alphabetical_labels();
        let titles: Vec<&str> = labels.iter().map(|l| l.title.text.as_str()).collect();
        assert_eq!(titles, ["A-D", "E-H", "I-L", "M-Q", "R-T", "U-Z"]);
        assert_eq!(labels[0].title.x_offset, 0.0);
        assert_eq!(labels[5].title.x_offset, 400.0);
        assert!(labels.iter().all(|l| l.title.y_offset == -10.0));
        assert!(labels.iter().all(|l| l.content == VisualContent::None));
        assert!(labels.iter().all(|l| l.title.font_size == Some(70.0)));
    }

    #[test]
    fn planeswalker_uses_a_glyph() {
        let labels = type_labels();
        assert_eq!(
            labels[4].content,
            VisualContent::Glyphs(vec!["PW".to_string()])
        );
        assert_eq!(labels[0].content, VisualContent::Icon("artifact.png".to_string()));
    }

    #[test]
    fn four_color_identities_carry_four_glyphs() {
        let labels = color_labels();
        let dune = labels.iter().find(|l| l.title.text == "Dune").unwrap();
        assert_eq!(
            dune.content,
            VisualContent::Glyphs(vec!["W".into(), "B".into(), "R".into(), "G".into()])
        );
    }
}
