//! Locally generated stand-in data, used when the service cannot be reached.

use rand::Rng;

use crate::api::{DetailResult, PrinterRef, StatusResult, Toner, Tray};

const DEMO_ONLINE_RATIO: f64 = 0.8;
const TRAY_STATES: [&str; 3] = ["OK", "LOW", "EMPTY"];

pub fn status<R: Rng + ?Sized>(rng: &mut R, printers: &[PrinterRef]) -> Vec<StatusResult> {
    printers
        .iter()
        .map(|printer| {
            let online = rng.gen_bool(DEMO_ONLINE_RATIO);
            StatusResult {
                name: printer.name.clone(),
                ip: printer.ip.clone(),
                status: if online { "online" } else { "offline" }.to_string(),
                response_time: online.then(|| rng.gen_range(5..200)),
                error: None,
            }
        })
        .collect()
}

pub fn details<R: Rng + ?Sized>(rng: &mut R, printers: &[PrinterRef]) -> Vec<DetailResult> {
    printers
        .iter()
        .map(|printer| {
            let colors: &[&str] = if printer.name.to_lowercase().contains("color") {
                &["Black", "Cyan", "Magenta", "Yellow"]
            } else {
                &["Black"]
            };
            let toners = colors
                .iter()
                .map(|color| Toner {
                    color: color.to_string(),
                    level: rng.gen_range(0..=100),
                })
                .collect();
            let trays = ["Tray 1", "Tray 2"]
                .iter()
                .map(|name| Tray {
                    name: name.to_string(),
                    status: TRAY_STATES[rng.gen_range(0..TRAY_STATES.len())].to_string(),
                    capacity: Some(250),
                    current: Some(rng.gen_range(0..250)),
                })
                .collect();
            DetailResult {
                name: printer.name.clone(),
                status: "online".to_string(),
                model: Some("Demo Printer".to_string()),
                toners,
                trays,
                page_count: None,
                error: None,
            }
        })
        .collect()
}
