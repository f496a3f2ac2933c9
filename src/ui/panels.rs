use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::FilterChoice;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let marital_options = state.domains.marital_status_options();
    let gender_options = state.domains.gender_options();

    if let Some(choice) = selector(
        ui,
        "Select Marital Status",
        "marital_status",
        &state.selection.marital_status,
        &marital_options,
    ) {
        state.set_marital_status(choice);
    }

    ui.add_space(8.0);

    if let Some(choice) = selector(
        ui,
        "Select Gender",
        "gender",
        &state.selection.gender,
        &gender_options,
    ) {
        state.set_gender(choice);
    }
}

/// A labelled combo box. Returns the newly picked choice, if any.
fn selector(
    ui: &mut Ui,
    label: &str,
    id: &str,
    current: &FilterChoice,
    options: &[FilterChoice],
) -> Option<FilterChoice> {
    ui.strong(label);
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                if ui
                    .selectable_label(option == current, option.to_string())
                    .clicked()
                {
                    picked = Some(option.clone());
                }
            }
        });
    picked
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let source = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{source}: {} rows loaded, {} visible",
                ds.len(),
                state.visible_rows()
            ));
            if !state.selection.is_unconstrained() {
                ui.label(RichText::new("(filtered)").weak());
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open customer data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
