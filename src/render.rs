use crate::view::{ChartSeries, DashboardView};
use std::fmt::{self, Write};

const BAR_WIDTH: usize = 30;

/// Plain-text rendition of a view: count line, listing, then both charts.
pub fn render_report(view: &DashboardView) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "Total UMKM ditemukan: {}", view.total)?;
    writeln!(out, "Pusat peta: {:.4}, {:.4} (zoom {})", view.center.lat, view.center.lon, view.center.zoom)?;
    if let Some(warning) = view.warning {
        writeln!(out, "{}", warning.message())?;
    }

    writeln!(out)?;
    write_listing(&mut out, view)?;
    writeln!(out)?;
    write_chart(&mut out, "Jumlah UMKM per Kabupaten", &view.district_chart)?;
    writeln!(out)?;
    write_chart(&mut out, "Jumlah UMKM per Kategori", &view.category_chart)?;
    Ok(out)
}

fn write_listing(out: &mut impl Write, view: &DashboardView) -> fmt::Result {
    let headers = ["nama_umkm", "kategori", "kabupaten", "alamat", "lat", "lon"];
    let rows: Vec<[String; 6]> = view
        .records
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.category.clone(),
                r.district.clone(),
                r.address.clone(),
                r.lat.to_string(),
                r.lon.to_string(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    write_row(out, headers.iter().copied(), &widths)?;
    write_row(out, rule.iter().map(String::as_str), &widths)?;
    for row in &rows {
        write_row(out, row.iter().map(String::as_str), &widths)?;
    }
    Ok(())
}

fn write_row<'a>(out: &mut impl Write, cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> fmt::Result {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(out, "{}", line.join("  ").trim_end())
}

fn write_chart(out: &mut impl Write, title: &str, series: &ChartSeries) -> fmt::Result {
    writeln!(out, "{}", title)?;

    let max = series.values.iter().copied().max().unwrap_or(0);
    let label_width = series.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    for (label, value) in series.labels.iter().zip(&series.values) {
        let bar = if max == 0 { 0 } else { (value * BAR_WIDTH).div_ceil(max) };
        writeln!(
            out,
            "  {:<width$} | {} {}",
            label,
            "#".repeat(bar),
            value,
            width = label_width
        )?;
    }
    Ok(())
}
