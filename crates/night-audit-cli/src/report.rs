use colored::*;
use night_audit_core::{AuditReport, CountGrid, CountMatrix};
use std::fs;
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Dark-to-bright ramp, roughly the inferno colormap.
const HEAT_RAMP: [(u8, u8, u8); 6] = [
    (0, 0, 4),
    (66, 10, 104),
    (147, 38, 103),
    (221, 81, 58),
    (252, 165, 10),
    (252, 255, 164),
];

#[derive(Tabled)]
struct DiagnosticRow {
    #[tabled(rename = "Camera")]
    camera_id: String,
    #[tabled(rename = "Night")]
    date: String,
    #[tabled(rename = "Issue")]
    kind: String,
    #[tabled(rename = "Videos")]
    video_count: u32,
    #[tabled(rename = "Metadata")]
    metadata_count: u32,
}

#[derive(Tabled)]
struct ZeroByteRow {
    #[tabled(rename = "Camera")]
    camera_id: String,
    #[tabled(rename = "Night")]
    date: String,
    #[tabled(rename = "Zero-byte file")]
    path: String,
}

pub fn print_summary(report: &AuditReport) {
    println!(
        "Video files: {}, metadata files: {}, diagnostics: {}, zero-byte files: {}, unreadable: {}",
        report.total_video_files.to_string().green(),
        report.total_metadata_files.to_string().green(),
        report.diagnostics.len().to_string().red(),
        report.zero_byte_files.len().to_string().red(),
        report.size_failures.len().to_string().yellow(),
    );
    if let Some(date) = report.trimmed_date {
        println!("Trailing date {} had no video and was left out", date);
    }
}

/// Cameras as rows, nights as columns, cell colour scaled to the max count.
pub fn print_heatmap(matrix: &CountMatrix, title: &str) {
    let max = matrix.video.max();
    println!();
    println!(
        "{}",
        format!(
            "{}\nNumber of video files for each night ({} maximum)",
            title, max
        )
        .bold()
    );

    let label_width = matrix
        .camera_ids
        .iter()
        .map(|c| c.len())
        .max()
        .unwrap_or(0)
        .max(6);

    let header: String = matrix
        .dates
        .iter()
        .map(|d| format!("{:>6}", d.format("%m-%d")))
        .collect();
    println!("{:width$} {}", "", header.dimmed(), width = label_width);

    for (row, camera_id) in matrix.camera_ids.iter().enumerate() {
        let cells: String = heat_row(&matrix.video, row, max).join("");
        println!("{:>width$} {}", camera_id, cells, width = label_width);
    }
}

fn heat_row(grid: &CountGrid, row: usize, max: u32) -> Vec<String> {
    grid.row(row)
        .iter()
        .map(|&count| {
            let (r, g, b) = heat_color(count, max);
            let text = format!("{:>5} ", count);
            let fg = if r as u16 + g as u16 + b as u16 > 384 {
                (0, 0, 0)
            } else {
                (255, 255, 255)
            };
            text.truecolor(fg.0, fg.1, fg.2)
                .on_truecolor(r, g, b)
                .to_string()
        })
        .collect()
}

fn heat_color(count: u32, max: u32) -> (u8, u8, u8) {
    if max == 0 {
        return HEAT_RAMP[0];
    }
    let step = (count as u64 * (HEAT_RAMP.len() as u64 - 1) + max as u64 / 2) / max as u64;
    HEAT_RAMP[step.min(HEAT_RAMP.len() as u64 - 1) as usize]
}

pub fn print_diagnostics(report: &AuditReport) {
    if report.diagnostics.is_empty() {
        println!("\nNo mismatched camera nights");
        return;
    }
    let rows: Vec<DiagnosticRow> = report
        .diagnostics
        .iter()
        .map(|d| DiagnosticRow {
            camera_id: d.camera_id.clone(),
            date: d.date.to_string(),
            kind: d.kind.to_string(),
            video_count: d.video_count,
            metadata_count: d.metadata_count,
        })
        .collect();
    println!();
    println!("{}", Table::new(rows).with(Style::psql()));
}

pub fn print_zero_byte_files(report: &AuditReport) {
    if !report.zero_byte_files.is_empty() {
        let rows: Vec<ZeroByteRow> = report
            .zero_byte_files
            .iter()
            .map(|z| ZeroByteRow {
                camera_id: z.camera_id.clone(),
                date: z.date.to_string(),
                path: z.path.clone(),
            })
            .collect();
        println!();
        println!("{}", Table::new(rows).with(Style::psql()));
    }
    for failure in &report.size_failures {
        println!("{} {}: {}", "size unknown".yellow(), failure.path, failure.message);
    }
}

/// Writes `video_counts.csv`, `metadata_counts.csv` and `diagnostics.csv`.
pub fn write_csv(dir: &Path, report: &AuditReport) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    write_grid_csv(&dir.join("video_counts.csv"), &report.matrix, &report.matrix.video)?;
    write_grid_csv(&dir.join("metadata_counts.csv"), &report.matrix, &report.matrix.metadata)?;

    let mut writer = csv::Writer::from_path(dir.join("diagnostics.csv"))?;
    writer.write_record(["camera_id", "date", "kind", "video_count", "metadata_count"])?;
    for d in &report.diagnostics {
        writer.write_record([
            d.camera_id.clone(),
            d.date.to_string(),
            d.kind.to_string(),
            d.video_count.to_string(),
            d.metadata_count.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_grid_csv(
    path: &Path,
    matrix: &CountMatrix,
    grid: &CountGrid,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["camera_id".to_string()];
    header.extend(matrix.dates.iter().map(|d| d.to_string()));
    writer.write_record(&header)?;
    for (row, camera_id) in matrix.camera_ids.iter().enumerate() {
        let mut record = vec![camera_id.clone()];
        record.extend(grid.row(row).iter().map(|c| c.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
