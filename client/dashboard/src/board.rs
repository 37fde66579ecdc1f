//! In-memory dashboard: one card per configured printer.
//!
//! Results are matched to cards by recomputing the card id from the result's
//! printer name. Each apply overwrites whatever the card showed before.

use std::fmt::Write;

use printwatch_common::card_id;

use crate::api::{DetailResult, PrinterRef, StatusResult, Toner, Tray};

const BAR_WIDTH: usize = 10;
const LOW_TONER: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Online,
    Offline,
    Unknown,
}

impl Indicator {
    fn from_status(status: &str) -> Self {
        match status {
            "online" => Indicator::Online,
            "offline" => Indicator::Offline,
            _ => Indicator::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::Online => "Online",
            Indicator::Offline => "Offline",
            Indicator::Unknown => "Unknown",
        }
    }

    fn badge(&self) -> &'static str {
        match self {
            Indicator::Online => "[ UP ]",
            Indicator::Offline => "[DOWN]",
            Indicator::Unknown => "[ ?? ]",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Supplies {
    pub status: String,
    pub model: Option<String>,
    pub toners: Vec<Toner>,
    pub trays: Vec<Tray>,
    pub page_count: Option<u32>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub indicator: Indicator,
    pub status_text: String,
    pub error: Option<String>,
    pub supplies: Option<Supplies>,
}

impl Card {
    fn new(printer: &PrinterRef) -> Self {
        Self {
            id: card_id(&printer.name),
            name: printer.name.clone(),
            ip: printer.ip.clone(),
            indicator: Indicator::Unknown,
            status_text: "Checking...".to_string(),
            error: None,
            supplies: None,
        }
    }
}

#[derive(Debug)]
pub struct Board {
    pub cards: Vec<Card>,
    pub last_updated: Option<String>,
    pub banner: Option<String>,
}

impl Board {
    pub fn new(printers: &[PrinterRef]) -> Self {
        Self {
            cards: printers.iter().map(Card::new).collect(),
            last_updated: None,
            banner: None,
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    fn card_mut(&mut self, name: &str) -> Option<&mut Card> {
        let id = card_id(name);
        self.cards.iter_mut().find(|card| card.id == id)
    }

    /// Returns how many results matched a card.
    pub fn apply_status(&mut self, results: &[StatusResult]) -> usize {
        let mut applied = 0;
        for result in results {
            let Some(card) = self.card_mut(&result.name) else {
                tracing::debug!(name = result.name.as_str(), "status for unknown card");
                continue;
            };
            if !result.ip.is_empty() && result.ip != card.ip {
                tracing::debug!(
                    name = result.name.as_str(),
                    expected = card.ip.as_str(),
                    got = result.ip.as_str(),
                    "status result ip differs from card"
                );
            }
            card.indicator = Indicator::from_status(&result.status);
            card.status_text = card.indicator.label().to_string();
            if let Some(ms) = result.response_time.filter(|ms| *ms > 0) {
                let _ = write!(card.status_text, " ({ms}ms)");
            }
            card.error = result.error.clone();
            applied += 1;
        }
        applied
    }

    pub fn apply_details(&mut self, details: &[DetailResult]) -> usize {
        let mut applied = 0;
        for detail in details {
            let Some(card) = self.card_mut(&detail.name) else {
                tracing::debug!(name = detail.name.as_str(), "details for unknown card");
                continue;
            };
            card.supplies = Some(Supplies {
                status: detail.status.clone(),
                model: detail.model.clone(),
                toners: detail.toners.clone(),
                trays: detail.trays.clone(),
                page_count: detail.page_count,
                error: detail.error.clone(),
            });
            applied += 1;
        }
        applied
    }

    pub fn mark_updated(&mut self, time: &str, demo: bool) {
        let mut label = format!("Last updated: {time}");
        if demo {
            label.push_str(" (Demo Mode)");
        }
        self.last_updated = Some(label);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Printer Status ===");
        if let Some(banner) = &self.banner {
            let _ = writeln!(out, "!! Error: {banner}");
        }
        for card in &self.cards {
            render_card(&mut out, card);
        }
        if let Some(updated) = &self.last_updated {
            let _ = writeln!(out, "{updated}");
        }
        out
    }
}

fn render_card(out: &mut String, card: &Card) {
    let _ = writeln!(out, "{} {}", card.indicator.badge(), card.name);
    let _ = writeln!(out, "       IP: {}", card.ip);
    let _ = writeln!(out, "       {}", card.status_text);
    if let Some(error) = &card.error {
        let _ = writeln!(out, "       ({error})");
    }

    let Some(supplies) = &card.supplies else {
        return;
    };
    if supplies.status != "online" {
        let _ = writeln!(out, "       Details: {}", supplies.status);
    }
    if let Some(model) = &supplies.model {
        let _ = writeln!(out, "       Model: {model}");
    }
    if let Some(pages) = supplies.page_count {
        let _ = writeln!(out, "       Pages: {pages}");
    }
    for toner in &supplies.toners {
        let _ = writeln!(out, "       {:<8} {}", toner.color, toner_bar(toner.level));
    }
    if !supplies.trays.is_empty() {
        let trays: Vec<String> = supplies.trays.iter().map(tray_label).collect();
        let _ = writeln!(out, "       Trays: {}", trays.join(" | "));
    }
    if let Some(error) = &supplies.error {
        let _ = writeln!(out, "       Supplies: {error}");
    }
}

pub fn toner_bar(level: u32) -> String {
    let level = level.min(100);
    let filled = (level as usize * BAR_WIDTH + 50) / 100;
    let mut bar = format!(
        "[{}{}] {level:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    );
    if level < LOW_TONER {
        bar.push_str(" low");
    }
    bar
}

fn tray_label(tray: &Tray) -> String {
    match (tray.current, tray.capacity) {
        (Some(current), Some(capacity)) => {
            format!("{} {} {current}/{capacity}", tray.name, tray.status)
        }
        _ => format!("{} {}", tray.name, tray.status),
    }
}
