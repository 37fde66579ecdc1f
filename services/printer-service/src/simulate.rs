//! Simulated printer telemetry.
//!
//! Stand-in for a real SNMP or vendor API integration. Every generator takes
//! the random source as a parameter so callers can seed it.

use rand::Rng;

use crate::models::{Maintenance, Toner, Tray, TrayStatus};

const DEFAULT_MODEL: &str = "HP LaserJet Pro M404dn";

// First matching substring wins.
const MODEL_TABLE: &[(&str, &str)] = &[
    ("color", "Canon imageCLASS MF743Cdw"),
    ("oneill", "HP LaserJet Pro M404dn"),
    ("2150", "Xerox VersaLink C405"),
    ("wihd", "Brother HL-L8360CDW"),
];

// (color, base, spread): level = base + [0, spread)
const COLOR_TONERS: &[(&str, u8, u8)] = &[
    ("Black", 30, 40),
    ("Cyan", 20, 50),
    ("Magenta", 15, 60),
    ("Yellow", 10, 70),
];
const MONO_TONERS: &[(&str, u8, u8)] = &[("Black", 40, 50)];

const PAPER_TRAY_CAPACITY: u32 = 250;
const MANUAL_FEED_CAPACITY: u32 = 50;
const TRAY_NAMES: [&str; 3] = ["Tray 1", "Tray 2", "Manual Feed"];
const TRAY_WEIGHTS: &[(TrayStatus, f64)] = &[
    (TrayStatus::Ok, 0.7),
    (TrayStatus::Low, 0.2),
    (TrayStatus::Empty, 0.1),
];

pub const OFFLINE_ERROR: &str = "Printer offline or not responding";

pub fn printer_model(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    MODEL_TABLE
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, model)| *model)
        .unwrap_or(DEFAULT_MODEL)
}

fn toner_palette(is_color: bool) -> &'static [(&'static str, u8, u8)] {
    if is_color {
        COLOR_TONERS
    } else {
        MONO_TONERS
    }
}

pub fn toner_levels<R: Rng + ?Sized>(rng: &mut R, is_color: bool) -> Vec<Toner> {
    toner_palette(is_color)
        .iter()
        .map(|&(color, base, spread)| Toner {
            color,
            level: base + rng.gen_range(0..spread),
        })
        .collect()
}

pub fn empty_toners(is_color: bool) -> Vec<Toner> {
    toner_palette(is_color)
        .iter()
        .map(|&(color, _, _)| Toner { color, level: 0 })
        .collect()
}

pub fn weighted_tray_status<R: Rng + ?Sized>(rng: &mut R) -> TrayStatus {
    let roll: f64 = rng.gen();
    let mut sum = 0.0;
    for &(status, weight) in TRAY_WEIGHTS {
        sum += weight;
        if roll <= sum {
            return status;
        }
    }
    TRAY_WEIGHTS[0].0
}

pub fn tray_status<R: Rng + ?Sized>(rng: &mut R) -> Vec<Tray> {
    let mut trays: Vec<Tray> = TRAY_NAMES[..2]
        .iter()
        .map(|&name| Tray {
            name,
            status: weighted_tray_status(rng),
            capacity: Some(PAPER_TRAY_CAPACITY),
            current: Some(rng.gen_range(0..PAPER_TRAY_CAPACITY)),
        })
        .collect();
    trays.push(Tray {
        name: TRAY_NAMES[2],
        status: TrayStatus::Ok,
        capacity: Some(MANUAL_FEED_CAPACITY),
        current: Some(rng.gen_range(0..MANUAL_FEED_CAPACITY)),
    });
    trays
}

pub fn unknown_trays() -> Vec<Tray> {
    TRAY_NAMES
        .iter()
        .map(|&name| Tray {
            name,
            status: TrayStatus::Unknown,
            capacity: None,
            current: None,
        })
        .collect()
}

pub fn page_count<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(1_000..51_000)
}

pub fn maintenance<R: Rng + ?Sized>(rng: &mut R) -> Maintenance {
    Maintenance {
        drum_life: rng.gen_range(0..=100),
        fuser_life: rng.gen_range(0..=100),
        next_service_pages: rng.gen_range(0..10_000),
    }
}

/// Bernoulli draw; `ratio` is the probability of `true`.
pub fn coin_flip<R: Rng + ?Sized>(rng: &mut R, ratio: f64) -> bool {
    rng.gen_bool(ratio.clamp(0.0, 1.0))
}

pub fn latency_ms<R: Rng + ?Sized>(rng: &mut R, min_ms: u64, max_ms: u64) -> u64 {
    if min_ms >= max_ms {
        min_ms
    } else {
        rng.gen_range(min_ms..=max_ms)
    }
}
