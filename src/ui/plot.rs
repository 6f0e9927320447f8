use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{ColorMap, ramp};
use crate::data::stats::{CategoryCount, DashboardSummary};

const CHART_HEIGHT: f32 = 240.0;
const TREND_COLOR: Color32 = Color32::from_rgb(0xff, 0x6b, 0x6b);

fn unavailable(ui: &mut Ui) {
    ui.label(RichText::new("Labels not loaded").italics().weak());
}

fn empty(ui: &mut Ui) {
    ui.label(RichText::new("No movies match the filters").italics().weak());
}

// ---------------------------------------------------------------------------
// Category distribution (one bar per category)
// ---------------------------------------------------------------------------

pub fn distribution_chart(
    ui: &mut Ui,
    id: &str,
    dist: Option<&[CategoryCount]>,
    colors: &ColorMap,
) {
    let Some(dist) = dist else {
        unavailable(ui);
        return;
    };
    if dist.is_empty() {
        empty(ui);
        return;
    }

    let total: usize = dist.iter().map(|c| c.count).sum();
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Movies")
        .show_x(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, c) in dist.iter().enumerate() {
                let share = c.count as f64 * 100.0 / total as f64;
                let bar = Bar::new(i as f64, c.count as f64)
                    .name(format!("{} ({share:.0}%)", c.category))
                    .fill(colors.color_for(&c.category))
                    .width(0.7);
                let chart = BarChart::new(vec![bar])
                    .name(&c.category)
                    .color(colors.color_for(&c.category));
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Female lead share over the years
// ---------------------------------------------------------------------------

pub fn trend_chart(ui: &mut Ui, summary: &DashboardSummary) {
    let Some(trend) = &summary.female_lead_trend else {
        unavailable(ui);
        return;
    };
    if trend.is_empty() {
        empty(ui);
        return;
    }

    let points: Vec<[f64; 2]> = trend.iter().map(|t| [t.year as f64, t.pct_yes]).collect();
    Plot::new("female_lead_trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Female Lead %")
        .include_y(0.0)
        .include_y(100.0)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(TREND_COLOR)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .color(TREND_COLOR)
                    .radius(3.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Rating spread by female lead (box plot)
// ---------------------------------------------------------------------------

pub fn rating_box_plot(ui: &mut Ui, summary: &DashboardSummary, colors: &ColorMap) {
    let Some(spreads) = &summary.rating_by_female_lead else {
        unavailable(ui);
        return;
    };
    if spreads.is_empty() {
        empty(ui);
        return;
    }

    Plot::new("rating_by_female_lead")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("IMDb rating")
        .show_x(false)
        .show(ui, |plot_ui| {
            for (i, s) in spreads.iter().enumerate() {
                let color = colors.color_for(&s.category);
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max),
                )
                .name(format!("{} (n={})", s.category, s.count))
                .fill(color.gamma_multiply(0.4))
                .box_width(0.5);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&s.category).color(color));
            }
        });
}

// ---------------------------------------------------------------------------
// Top-N ranking (horizontal bars)
// ---------------------------------------------------------------------------

pub fn top_rated_chart(ui: &mut Ui, summary: &DashboardSummary, colors: &ColorMap) {
    if summary.top_rated.is_empty() {
        empty(ui);
        return;
    }

    // Highest rating at the top.
    let n = summary.top_rated.len();
    let bars: Vec<Bar> = summary
        .top_rated
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let rating = r.imdb_rating?;
            let category = r.female_lead.as_deref().unwrap_or("Unknown");
            Some(
                Bar::new((n - i) as f64, rating)
                    .name(format!("{} ({})", r.title, category))
                    .fill(colors.color_for(category)),
            )
        })
        .collect();

    Plot::new("top_rated")
        .height(CHART_HEIGHT + 60.0)
        .x_axis_label("IMDb rating")
        .show_y(false)
        .include_x(0.0)
        .include_x(10.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().width(0.7));
        });
}

// ---------------------------------------------------------------------------
// Movies per year
// ---------------------------------------------------------------------------

pub fn yearly_counts_chart(ui: &mut Ui, summary: &DashboardSummary) {
    if summary.yearly_counts.is_empty() {
        empty(ui);
        return;
    }

    let max = summary
        .yearly_counts
        .iter()
        .map(|y| y.count)
        .max()
        .unwrap_or(1)
        .max(1);
    let bars: Vec<Bar> = summary
        .yearly_counts
        .iter()
        .map(|y| {
            Bar::new(y.year as f64, y.count as f64)
                .name(y.year.to_string())
                .fill(ramp(y.count as f32 / max as f32))
        })
        .collect();

    Plot::new("movies_per_year")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Movies")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.8));
        });
}

// ---------------------------------------------------------------------------
// Rating histogram
// ---------------------------------------------------------------------------

pub fn rating_histogram_chart(ui: &mut Ui, summary: &DashboardSummary) {
    if summary.rating_histogram.is_empty() {
        empty(ui);
        return;
    }

    let bars: Vec<Bar> = summary
        .rating_histogram
        .iter()
        .map(|b| {
            let width = (b.upper - b.lower).max(0.05);
            Bar::new((b.lower + b.upper) / 2.0, b.count as f64)
                .width(width)
                .name(format!("{:.1}–{:.1}", b.lower, b.upper))
        })
        .collect();

    Plot::new("rating_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("IMDb rating")
        .y_axis_label("Movies")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
        });
}
