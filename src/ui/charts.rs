use std::f64::consts::TAU;

use eframe::egui::{self, RichText, ScrollArea, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::{generate_palette, series_color, translucent};
use crate::pipeline::aggregate::{AggregateSeries, HistogramBin};
use crate::pipeline::charts::{Chart, ChartKind, TableData};
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 280.0;
const TABLE_HEIGHT: f32 = 260.0;
const ROW_HEIGHT: f32 = 18.0;
const PIE_SEGMENTS: usize = 96;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the data table followed by every chart of the current bundle.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let bundle = match &state.bundle {
        Some(b) => b,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view the dashboard  (File → Open…)");
            });
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Filtered Data");
            data_table(ui, &bundle.table);

            for (i, chart) in bundle.charts.iter().enumerate() {
                ui.add_space(16.0);
                ui.heading(&chart.title);
                if chart.kind.is_empty() {
                    ui.label(RichText::new("No data for the current selection").weak());
                }
                chart_plot(ui, i, chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Data table
// ---------------------------------------------------------------------------

fn data_table(ui: &mut Ui, table: &TableData) {
    ui.push_id("data_table", |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(TABLE_HEIGHT)
                .columns(Column::auto().at_least(60.0), table.columns.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    for name in &table.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, table.rows.len(), |mut row| {
                        let cells = &table.rows[row.index()];
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn chart_plot(ui: &mut Ui, index: usize, chart: &Chart) {
    let plot = Plot::new(("chart", index))
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone());

    match &chart.kind {
        ChartKind::Histogram { bins } => {
            let bars = histogram_chart(bins, &chart.x_label);
            plot.show(ui, |plot_ui| plot_ui.bar_chart(bars));
        }
        ChartKind::Bar { series } => {
            let labels: Vec<String> = series.entries.iter().map(|(k, _)| k.to_string()).collect();
            let charts = category_bars(series);
            plot.x_axis_formatter(move |mark: GridMark, _range| category_tick(&labels, mark))
                .show(ui, |plot_ui| {
                    for c in charts {
                        plot_ui.bar_chart(c);
                    }
                });
        }
        ChartKind::Pie { series } => {
            let slices = pie_slices(series);
            plot.data_aspect(1.0)
                .show_axes(false)
                .show_grid(false)
                .allow_drag(false)
                .allow_zoom(false)
                .allow_boxed_zoom(false)
                .show(ui, |plot_ui| {
                    for s in slices {
                        plot_ui.polygon(s);
                    }
                });
        }
        ChartKind::Scatter { points } => {
            let points = Points::new(PlotPoints::from(points.clone()))
                .radius(3.0)
                .color(series_color())
                .name(&chart.title);
            plot.show(ui, |plot_ui| plot_ui.points(points));
        }
        ChartKind::Line { points } => {
            let line = Line::new(PlotPoints::from(points.clone()))
                .color(series_color())
                .width(1.5)
                .name(&chart.title);
            plot.show(ui, |plot_ui| plot_ui.line(line));
        }
    }
}

fn histogram_chart(bins: &[HistogramBin], name: &str) -> BarChart {
    let bars = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{:.0} – {:.0}", b.start, b.end))
        })
        .collect();
    BarChart::new(bars).color(series_color()).name(name)
}

/// One bar chart per category so each gets its own legend entry.
fn category_bars(series: &AggregateSeries) -> Vec<BarChart> {
    let palette = generate_palette(series.entries.len());
    series
        .entries
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, ((category, value), color))| {
            BarChart::new(vec![Bar::new(i as f64, *value).width(0.7)])
                .color(color)
                .name(category.to_string())
        })
        .collect()
}

/// Axis tick text for categorical bars: a label on integer marks only.
fn category_tick(labels: &[String], mark: GridMark) -> String {
    let rounded = mark.value.round();
    if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

/// Unit-circle wedges, one per category, clockwise from twelve o'clock.
fn pie_slices(series: &AggregateSeries) -> Vec<Polygon<'_>> {
    let shares = series.proportions();
    let palette = generate_palette(shares.len());
    let mut start = 0.0;
    shares
        .into_iter()
        .zip(palette)
        .map(|((category, share), color)| {
            let end = start + share * TAU;
            let steps = ((share * PIE_SEGMENTS as f64).ceil() as usize).max(2);
            let mut points = vec![[0.0, 0.0]];
            points.extend((0..=steps).map(|s| {
                let angle = start + (end - start) * s as f64 / steps as f64;
                [angle.sin(), angle.cos()]
            }));
            start = end;
            Polygon::new(PlotPoints::from(points))
                .fill_color(translucent(color, 200))
                .stroke(Stroke::new(1.0, egui::Color32::WHITE))
                .name(format!("{} ({:.1}%)", category, share * 100.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_on_integer_marks() {
        let labels = vec!["M".to_string(), "S".to_string()];
        let mark = |value| GridMark { value, step_size: 1.0 };
        assert_eq!(category_tick(&labels, mark(1.0)), "S");
        assert_eq!(category_tick(&labels, mark(0.5)), "");
        assert_eq!(category_tick(&labels, mark(7.0)), "");
        assert_eq!(category_tick(&labels, mark(-1.0)), "");
    }
}
