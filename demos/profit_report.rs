use marketplace_profit::*;
use std::path::PathBuf;

fn usage() -> ! {
    eprintln!(
        "usage: profit_report <orders.csv|xlsx> [--income FILE] [--ads FILE] [--costs costs.json] [--out laporan.txt]"
    );
    std::process::exit(2);
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let orders = args.next().map(PathBuf::from).unwrap_or_else(|| usage());

    let mut income = None;
    let mut ads = None;
    let mut costs_path = None;
    let mut out = None;

    while let Some(flag) = args.next() {
        let value = args.next().map(PathBuf::from).unwrap_or_else(|| usage());
        match flag.as_str() {
            "--income" => income = Some(value),
            "--ads" => ads = Some(value),
            "--costs" => costs_path = Some(value),
            "--out" => out = Some(value),
            _ => usage(),
        }
    }

    let sources = ReportSources::from_paths(&orders, income, ads)?;
    let pipeline = ProfitPipeline::default();

    let mut costs: UnitCostSheet = match costs_path {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => UnitCostSheet::new(),
    };
    costs.seed_from(&pipeline.reconcile(&sources)?.aggregates);

    let report = pipeline.run_with_verification(&sources, &costs, 0.01)?;

    println!("{}", render_summary_document(&report));
    println!(
        "ROAS: {:.2} ({})",
        report.summary.roas,
        report.summary.roas_status.label()
    );
    println!();
    println!("{}", render_product_table(&report.products));
    println!(
        "{} completed orders, {} excluded",
        report.valid_orders, report.excluded_orders
    );

    let unpriced: Vec<&str> = costs
        .iter()
        .filter(|(_, cost)| *cost == 0.0)
        .map(|(product, _)| product)
        .collect();
    if !unpriced.is_empty() {
        println!("Products without a unit cost: {}", unpriced.join(", "));
    }

    if let Some(path) = out {
        write_summary_document(&report, path)?;
    }

    Ok(())
}
