use crate::domain::table::DataTable;
use crate::interfaces::design_system::DesignSystem;
use eframe::egui;

/// Rows drawn per table; exports always carry every row
const MAX_DISPLAY_ROWS: usize = 1_000;

/// Striped grid of a [`DataTable`], scrolling past `max_height`.
///
/// `cell_color` may override the text color of individual cells.
pub fn render_table(
    ui: &mut egui::Ui,
    id: &str,
    table: &DataTable,
    max_height: f32,
    cell_color: impl Fn(usize, usize) -> Option<egui::Color32>,
) {
    if table.is_empty() {
        ui.label(
            egui::RichText::new("No rows.")
                .italics()
                .color(DesignSystem::TEXT_MUTED),
        );
        return;
    }

    egui::ScrollArea::both()
        .id_salt(format!("{}_scroll", id))
        .max_height(max_height)
        .show(ui, |ui| {
            egui::Grid::new(id)
                .striped(true)
                .spacing([20.0, 6.0])
                .show(ui, |ui| {
                    for column in &table.columns {
                        ui.strong(column);
                    }
                    ui.end_row();

                    for (r, row) in table.rows.iter().take(MAX_DISPLAY_ROWS).enumerate() {
                        for (c, cell) in row.iter().enumerate() {
                            match cell_color(r, c) {
                                Some(color) => ui.colored_label(color, cell),
                                None => ui.label(cell),
                            };
                        }
                        ui.end_row();
                    }
                });
        });
}

/// Row count footer under a table
pub fn render_row_count(ui: &mut egui::Ui, table: &DataTable) {
    let text = if table.row_count() > MAX_DISPLAY_ROWS {
        format!("showing {} of {} rows", MAX_DISPLAY_ROWS, table.row_count())
    } else {
        format!("{} rows", table.row_count())
    };
    ui.label(
        egui::RichText::new(text)
            .size(11.0)
            .color(DesignSystem::TEXT_MUTED),
    );
}
