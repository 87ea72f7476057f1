use sitrack_core::compliance::ComplianceReport;
use sitrack_core::model::Measurement;
use sitrack_core::reference::{Bounds, ReferenceTable};
use sitrack_core::review::ReviewRow;
use sitrack_core::ProcessedSheet;

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

/// One block per child, one line per measurement, then status tallies.
pub fn print_processed(sheet: &ProcessedSheet) {
    println!("File:     {}", sheet.file_name);
    println!("Format:   {}", sheet.format_type);
    println!("Periods:  {} ({})", sheet.total_periods, sheet.periods.join(", "));
    println!("Children: {}\n", sheet.total_children);

    for child in &sheet.children {
        println!(
            "{}  NIK {}  {}  lahir {}",
            opt(&child.name),
            opt(&child.nik),
            opt(&child.gender),
            opt(&child.birth_date)
        );
        for m in &child.measurements {
            println!("  {}", measurement_line(m));
        }
        println!();
    }

    let summary = sheet.summary();
    println!(
        "Measurements: {} ({} with weight or height)",
        summary.measurements, summary.complete_measurements
    );
    for (label, tally) in [
        ("Weight", &summary.weight_status),
        ("Height", &summary.height_status),
        ("Height trend", &summary.height_trend),
    ] {
        let counts: Vec<String> = tally.iter().map(|(k, v)| format!("{k}={v}")).collect();
        println!("  {label:<13} {}", counts.join("  "));
    }
}

fn measurement_line(m: &Measurement) -> String {
    format!(
        "{:<10} umur {:>3}  BB {:>6} {:<13}  TB {:>6} {:<13}  {}",
        m.period,
        opt(&m.age_months),
        opt(&m.weight_kg),
        m.weight_status.to_string(),
        opt(&m.height_cm),
        m.height_status.to_string(),
        m.height_trend
    )
}

pub fn print_report(report: &ComplianceReport) {
    let verdict = if report.valid { "VALID" } else { "INVALID" };
    println!("Template check: {verdict}");
    println!("  Format detected: {}", report.format_detected);
    for e in &report.errors {
        println!("  error: {e}");
    }
    for w in &report.warnings {
        println!("  warning: {w}");
    }
    if report.needs_template_download {
        println!("  A template download is recommended.");
    }
}

pub fn print_review(rows: &[ReviewRow]) {
    let name_width = rows
        .iter()
        .map(|r| opt(&r.name).chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    println!(
        "{:<name_width$}  {:<10} {:>4} {:>6} {:>6}  {:<7}  Keterangan",
        "Nama", "Bulan", "Umur", "BB", "TB", "Validasi"
    );
    for r in rows {
        println!(
            "{:<name_width$}  {:<10} {:>4} {:>6} {:>6}  {:<7}  {}",
            opt(&r.name),
            r.period,
            opt(&r.age_months),
            opt(&r.weight_kg),
            opt(&r.height_cm),
            r.verdict.to_string(),
            r.note
        );
    }
}

pub fn print_reference(table: &ReferenceTable) {
    let show = |b: Option<Bounds>| b.map(|b| b.to_string()).unwrap_or_else(|| "-".into());
    println!(
        "{:>4}  {:<12} {:<12} {:<12} {:<12}",
        "Umur", "BB (L)", "BB (P)", "PB (L)", "PB (P)"
    );
    for row in table.rows() {
        println!(
            "{:>4}  {:<12} {:<12} {:<12} {:<12}",
            row.age_months,
            show(row.male.weight),
            show(row.female.weight),
            show(row.male.height),
            show(row.female.height)
        );
    }
    if table.is_empty() {
        println!("(reference table is empty)");
    }
}
