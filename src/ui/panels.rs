use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::{FilterParams, LabelFilter};
use crate::data::loader::LabelsStatus;
use crate::data::model::LabelField;
use crate::data::stats::{format_pct, format_rating};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filters");
    ui.separator();

    let bounds = match state.table() {
        Some(table) => table.year_bounds(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    let mut changed = false;

    ui.strong("📅 Year Range");
    match bounds {
        Some((lo, hi)) => {
            changed |= ui
                .add(egui::Slider::new(&mut state.filters.year_min, lo..=hi).text("from"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut state.filters.year_max, lo..=hi).text("to"))
                .changed();
            // Keep the range ordered whichever handle moved.
            if state.filters.year_min > state.filters.year_max {
                state.filters.year_max = state.filters.year_min;
            }
        }
        None => {
            ui.label("No movie has a year.");
        }
    }
    ui.separator();

    for (field, icon) in [(LabelField::FemaleLead, "👩"), (LabelField::WorkingWoman, "💼")] {
        ui.strong(format!("{icon} {}", field.display_name()));
        let mut selected = state.filters.label_filter(field);
        egui::ComboBox::from_id_salt(field.column())
            .selected_text(selected.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for option in LabelFilter::ALL {
                    ui.selectable_value(&mut selected, option, option.as_str());
                }
            });
        if selected != state.filters.label_filter(field) {
            state.filters.set_label_filter(field, selected);
            changed = true;
        }
        ui.add_space(4.0);
    }

    ui.separator();
    if ui.button("Reset filters").clicked() {
        if let Some(defaults) = state.table().map(FilterParams::default_for) {
            state.filters = defaults;
            changed = true;
        }
    }

    if changed {
        state.refilter();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open movies…").clicked() {
                open_movies_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open labels…").clicked() {
                open_labels_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(outcome) = &state.dataset {
            ui.label(format!(
                "{} movies loaded from {}",
                outcome.table.len(),
                state.cache.movies_path().display()
            ));
            if let LabelsStatus::Joined {
                label_rows,
                matched_rows,
            } = &outcome.labels
            {
                ui.separator();
                ui.label(format!(
                    "{matched_rows} labelled via {} ({label_rows} label rows)",
                    state.cache.labels_path().display()
                ));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    if let Some(warning) = state.labels_warning() {
        ui.label(RichText::new(format!("⚠ {warning}")).color(Color32::from_rgb(0xe0, 0xa0, 0x00)));
    }
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

fn kpi_card(ui: &mut Ui, title: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(140.0);
        ui.vertical(|ui: &mut Ui| {
            ui.label(title);
            ui.label(RichText::new(value).size(24.0).strong());
        });
    });
}

/// Render the row of headline figures.
pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        return;
    };
    ui.horizontal(|ui: &mut Ui| {
        kpi_card(ui, "🎬 Total Movies", summary.total_count.to_string());
        kpi_card(ui, "⭐ Avg Rating", format_rating(summary.avg_rating));
        kpi_card(ui, "👩 Female Leads", format_pct(summary.female_lead_pct));
        kpi_card(ui, "💼 Working Women", format_pct(summary.working_woman_pct));
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn pick_table(title: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}

pub fn open_movies_dialog(state: &mut AppState) {
    if let Some(path) = pick_table("Open movie table") {
        log::info!("Opening movie table {}", path.display());
        state.open_movies(path);
    }
}

pub fn open_labels_dialog(state: &mut AppState) {
    if let Some(path) = pick_table("Open representation labels") {
        log::info!("Opening labels table {}", path.display());
        state.open_labels(path);
    }
}
