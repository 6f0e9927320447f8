use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::stats::{MovieRow, format_rating};

const HEADERS: [&str; 7] = [
    "Title",
    "Year",
    "Rating",
    "Votes",
    "Genre",
    "Female Lead",
    "Working Woman",
];

fn text<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// Render `rows` as a striped, non-scrolling table.
pub fn movie_table(ui: &mut Ui, id: &str, rows: &[MovieRow]) {
    if rows.is_empty() {
        ui.label("No movies match the filters.");
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(200.0))
            .columns(Column::auto().at_least(50.0), 5)
            .column(Column::remainder())
            .header(20.0, |mut header| {
                for h in HEADERS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for r in rows {
                    body.row(18.0, |mut row| {
                        let cells = [
                            r.title.clone(),
                            text(&r.year),
                            format_rating(r.imdb_rating),
                            text(&r.num_votes),
                            text(&r.genre),
                            text(&r.female_lead),
                            text(&r.working_woman),
                        ];
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
}
