use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct KollywoodLensApp {
    pub state: AppState,
}

impl KollywoodLensApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for KollywoodLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar, KPI cards ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
            ui.add_space(4.0);
            panels::kpi_row(ui, &self.state);
            ui.add_space(4.0);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a movie table to begin  (File → Open movies…)");
        });
        return;
    };
    let colors = &state.color_map;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("🇮🇳 Tamil Cinema Representation Analysis");
            ui.separator();

            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("👩 Female Lead Distribution");
                plot::distribution_chart(
                    &mut cols[0],
                    "female_lead_distribution",
                    summary.female_lead_distribution.as_deref(),
                    colors,
                );
                cols[1].strong("💼 Working Women Distribution");
                plot::distribution_chart(
                    &mut cols[1],
                    "working_woman_distribution",
                    summary.working_woman_distribution.as_deref(),
                    colors,
                );
            });
            ui.separator();

            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("📈 Female Lead Trend Over Years");
                plot::trend_chart(&mut cols[0], summary);
                cols[1].strong("⭐ Rating: Female Lead vs Others");
                plot::rating_box_plot(&mut cols[1], summary, colors);
            });
            ui.separator();

            ui.strong(format!("🏆 Top {} Movies by Rating", state.top_n));
            plot::top_rated_chart(ui, summary, colors);
            ui.add_space(6.0);
            table::movie_table(ui, "top_rated_table", &summary.top_rated);
            ui.separator();

            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].strong("📊 Movies per Year");
                plot::yearly_counts_chart(&mut cols[0], summary);
                cols[1].strong("📈 Rating Distribution");
                plot::rating_histogram_chart(&mut cols[1], summary);
            });
            ui.separator();

            ui.strong("📋 Filtered Movies Table");
            table::movie_table(ui, "preview_table", &summary.preview);
        });
}
