//! Station directory command.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use ub_core::error::UbResult;
use ub_services::AppContext;

use crate::OutputFormat;

pub async fn run(ctx: &AppContext, lat: f64, lon: f64, format: OutputFormat) -> UbResult<()> {
    let pb = super::spinner("Looking up nearby stations...");
    let stations = ctx.stations.refresh(lat, lon).await;
    pb.finish_and_clear();

    match format {
        OutputFormat::Json => {
            let value = serde_json::to_value(&stations)?;
            super::print_json(&value);
        }
        OutputFormat::Text => {
            if stations.is_empty() {
                println!("No stations found near {lat},{lon}.");
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Type", "Name", "Address", "Phone", "Location"]);

            for s in &stations {
                let kind = if s.is_fire() {
                    style("fire").red().to_string()
                } else {
                    style("police").blue().to_string()
                };
                table.add_row(vec![
                    kind,
                    super::truncate(&s.name, 36),
                    super::truncate(&s.address, 40),
                    s.phone.clone().unwrap_or_else(|| "-".into()),
                    format!("{:.5}, {:.5}", s.location.lat, s.location.lng),
                ]);
            }

            println!("{table}");
            let fire = stations.iter().filter(|s| s.is_fire()).count();
            println!(
                "\n{} fire, {} police stations",
                fire,
                stations.len() - fire
            );
        }
    }
    Ok(())
}
