use crate::config::AssetConfig;
use crate::label::{LabelRecord, Title};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

/// One set as listed by the catalogue service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogueRecord {
    pub code: String,
    pub name: String,
    #[serde(rename = "set_type")]
    pub category: String,
    #[serde(rename = "card_count")]
    pub size: u32,
    pub released_at: Option<NaiveDate>,
    #[serde(rename = "icon_svg_uri")]
    pub icon_uri: String,
}

/// A card symbol such as `{W}` and where to fetch its artwork.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SymbolRecord {
    pub symbol: String,
    pub svg_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

/// Remote source of sets, symbols and their icons.
pub trait Catalogue {
    fn sets(&self) -> Result<Vec<CatalogueRecord>>;
    fn symbols(&self) -> Result<Vec<SymbolRecord>>;
    fn download(&self, uri: &str) -> Result<Vec<u8>>;
}

/// Blocking client for the Scryfall API.
#[derive(Debug, Clone)]
pub struct ScryfallClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl ScryfallClient {
    pub fn new(config: &AssetConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("mtglabels/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn get_list<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.endpoint, path);
        let response: ListResponse<T> = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error status"))?
            .json()
            .with_context(|| format!("unexpected response body from {url}"))?;
        Ok(response.data)
    }
}

impl Catalogue for ScryfallClient {
    fn sets(&self) -> Result<Vec<CatalogueRecord>> {
        info!("Getting set data from {}", self.endpoint);
        self.get_list("/sets")
    }

    fn symbols(&self) -> Result<Vec<SymbolRecord>> {
        info!("Getting symbol data from {}", self.endpoint);
        self.get_list("/symbology")
    }

    fn download(&self, uri: &str) -> Result<Vec<u8>> {
        let bytes = self
            .client
            .get(uri)
            .send()
            .with_context(|| format!("failed to download {uri}"))?
            .error_for_status()
            .with_context(|| format!("failed to download {uri}"))?
            .bytes()?;
        Ok(bytes.to_vec())
    }
}

// Shorter names for sets whose official name does not fit on a label.
static RENAME_SETS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Adventures in the Forgotten Realms Minigames", "Forgotten Realms Minigames"),
        ("Adventures in the Forgotten Realms", "Forgotten Realms"),
        ("Angels: They're Just Like Us but Cooler and with Wings", "Angels: They're Just Like Us"),
        ("Archenemy: Nicol Bolas Schemes", "Archenemy: Bolas Schemes"),
        ("Duel Decks Anthology: Divine vs. Demonic", "DDA: Divine vs. Demonic"),
        ("Duel Decks Anthology: Elves vs. Goblins", "DDA: Elves vs. Goblins"),
        ("Duel Decks Anthology: Garruk vs. Liliana", "DDA: Garruk vs. Liliana"),
        ("Duel Decks Anthology: Jace vs. Chandra", "DDA: Jace vs. Chandra"),
        ("Duel Decks: Ajani vs. Nicol Bolas", "DD: Ajani vs. Nicol Bolas"),
        ("Duel Decks: Blessed vs. Cursed", "DD: Blessed vs. Cursed"),
        ("Duel Decks: Divine vs. Demonic", "DD: Divine vs. Demonic"),
        ("Duel Decks: Elspeth vs. Kiora", "DD: Elspeth vs. Kiora"),
        ("Duel Decks: Elspeth vs. Tezzeret", "DD: Elspeth vs. Tezzeret"),
        ("Duel Decks: Elves vs. Goblins", "DD: Elves vs. Goblins"),
        ("Duel Decks: Elves vs. Inventors", "DD: Elves vs. Inventors"),
        ("Duel Decks: Garruk vs. Liliana", "DD: Garruk vs. Liliana"),
        ("Duel Decks: Heroes vs. Monsters", "DD: Heroes vs. Monsters"),
        ("Duel Decks: Jace vs. Chandra", "DD: Jace vs. Chandra"),
        ("Duel Decks: Knights vs. Dragons", "DD: Knights vs. Dragons"),
        ("Duel Decks: Merfolk vs. Goblins", "DD: Merfolk vs. Goblins"),
        ("Duel Decks: Nissa vs. Ob Nixilis", "DD: Nissa vs. Ob Nixilis"),
        ("Duel Decks: Phyrexia vs. the Coalition", "DD: Phyrexia vs. Coalition"),
        ("Duel Decks: Speed vs. Cunning", "DD: Speed vs. Cunning"),
        ("Duel Decks: Zendikar vs. Eldrazi", "DD: Zendikar vs. Eldrazi"),
        ("Forgotten Realms Commander", "CMDR Forgotten Realms"),
        ("Fourth Edition Foreign Black Border", "Fourth Edition FBB"),
        ("Global Series Jiang Yanggu & Mu Yanling", "Jiang Yanggu & Mu Yanling"),
        ("Innistrad: Crimson Vow Minigames", "Crimson Vow Minigames"),
        ("Introductory Two-Player Set", "Intro Two-Player Set"),
        ("Kaldheim Commander", "CMDR Kaldheim"),
        ("March of the Machine Commander", "CMDR March of the Machine"),
        ("March of the Machine: The Aftermath", "March of the Machine: Aftermath"),
        ("Midnight Hunt Commander", "CMDR Midnight Hunt"),
        ("Mystery Booster Playtest Cards 2019", "MB Playtest Cards 2019"),
        ("Mystery Booster Playtest Cards 2021", "MB Playtest Cards 2021"),
        ("Mystery Booster Playtest Cards", "Mystery Booster Playtest"),
        ("Mystery Booster Retail Edition Foils", "Mystery Booster Retail Foils"),
        ("Neon Dynasty Commander", "CMDR Neon Dynasty"),
        ("New Capenna Commander", "CMDR New Capenna"),
        ("Phyrexia: All Will Be One Commander", "CMDR Phyrexia: One"),
        ("Planechase Anthology Planes", "Planechase Anth. Planes"),
        ("Premium Deck Series: Fire and Lightning", "PD: Fire & Lightning"),
        ("Premium Deck Series: Graveborn", "Premium Deck Graveborn"),
        ("Premium Deck Series: Slivers", "Premium Deck Slivers"),
        ("Starter Commander Decks", "CMDR Starter Decks"),
        ("Strixhaven: School of Mages Minigames", "Strixhaven Minigames"),
        ("Tales of Middle-earth Commander", "CMDR The Lord of the Rings"),
        ("The Brothers' War Commander", "CMDR The Brothers' War"),
        ("The Brothers' War Retro Artifacts", "The Brothers' War Retro"),
        ("The Lord of the Rings: Tales of Middle-earth", "The Lord of the Rings"),
        ("The Lost Caverns of Ixalan Commander", "CMDR Lost Caverns of Ixalan"),
        ("Warhammer 40,000 Commander", "CMDR Warhammer 40K"),
        ("Wilds of Eldraine Commander", "CMDR Wilds of Eldraine"),
        ("World Championship Decks 1997", "World Championship 1997"),
        ("World Championship Decks 1998", "World Championship 1998"),
        ("World Championship Decks 1999", "World Championship 1999"),
        ("World Championship Decks 2000", "World Championship 2000"),
        ("World Championship Decks 2001", "World Championship 2001"),
        ("World Championship Decks 2002", "World Championship 2002"),
        ("World Championship Decks 2003", "World Championship 2003"),
        ("World Championship Decks 2004", "World Championship 2004"),
        ("Zendikar Rising Commander", "CMDR Zendikar Rising"),
    ])
});

pub fn display_name(name: &str) -> &str {
    RENAME_SETS.get(name).copied().unwrap_or(name)
}

/// File name an icon is cached under: the last URI segment without its query string.
pub fn icon_file_name(uri: &str) -> String {
    let without_query = uri.split(['?', '#']).next().unwrap_or(uri);
    without_query
        .rsplit('/')
        .next()
        .unwrap_or(without_query)
        .to_string()
}

impl CatalogueRecord {
    /// Label for this set: shortened name, set icon, and code plus release date as caption.
    pub fn to_label(&self) -> LabelRecord {
        let caption = match self.released_at {
            Some(date) => format!("{} · {}", self.code.to_uppercase(), date.format("%Y-%m-%d")),
            None => self.code.to_uppercase(),
        };
        LabelRecord::with_icon(
            Title::new(display_name(&self.name)),
            icon_file_name(&self.icon_uri),
        )
        .with_caption(caption)
    }
}
