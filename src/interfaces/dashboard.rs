use crate::application::client::FetchJob;
use crate::application::session::DataSource;
use crate::domain::financials::StatementKind;
use crate::domain::market::timespan::Timespan;
use crate::domain::market::weekly::GapKpi;
use crate::interfaces::components::card::Card;
use crate::interfaces::components::charts::render_line_chart;
use crate::interfaces::components::metrics::{render_error, render_metric, render_status_pill};
use crate::interfaces::components::table::{render_row_count, render_table};
use crate::interfaces::design_system::DesignSystem;
use crate::interfaces::view_models::chart_view_model::ChartViewModel;
use crate::interfaces::view_models::dashboard_view_model::{
    AnalysisTab, DashboardTab, DashboardViewModel, ExportRequest,
};
use eframe::egui;

pub enum DashboardAction {
    Submit(FetchJob),
    Export(ExportRequest),
    Back,
}

const TABLE_HEIGHT: f32 = 320.0;

pub fn render_dashboard(
    vm: &mut DashboardViewModel,
    api_key: Option<&str>,
    ctx: &egui::Context,
) -> Vec<DashboardAction> {
    let mut actions = Vec::new();

    egui::SidePanel::left("inputs_panel")
        .exact_width(DesignSystem::SIDEBAR_WIDTH)
        .resizable(false)
        .frame(DesignSystem::sidebar_frame())
        .show(ctx, |ui| render_sidebar(vm, api_key, ui, &mut actions));

    egui::CentralPanel::default()
        .frame(DesignSystem::main_frame())
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(vm.source.to_string());
                ui.separator();
                for (tab, label) in [
                    (DashboardTab::StockData, "Stock Data"),
                    (DashboardTab::FinancialStatements, "Financial Statements"),
                    (DashboardTab::StockAnalysis, "Stock Analysis"),
                ] {
                    if ui.selectable_label(vm.tab == tab, label).clicked() {
                        vm.tab = tab;
                    }
                }
            });
            ui.separator();

            if let Some(Ok(path)) = &vm.export_status {
                render_status_pill(ui, &format!("Saved {}", path), DesignSystem::SUCCESS);
            }
            if let Some(Err(e)) = &vm.export_status {
                render_status_pill(ui, e, DesignSystem::DANGER);
            }
            render_error(ui, vm.input_error.as_deref());
            ui.add_space(DesignSystem::SPACING_SMALL);

            egui::ScrollArea::vertical()
                .id_salt("dashboard_scroll")
                .show(ui, |ui| match vm.tab {
                    DashboardTab::StockData => render_stock_data(vm, ui, &mut actions),
                    DashboardTab::FinancialStatements => render_statements(vm, ui, &mut actions),
                    DashboardTab::StockAnalysis => render_analysis(vm, ui, &mut actions),
                });
        });

    actions
}

fn render_sidebar(
    vm: &mut DashboardViewModel,
    api_key: Option<&str>,
    ui: &mut egui::Ui,
    actions: &mut Vec<DashboardAction>,
) {
    if ui.button("⬅ Back").clicked() {
        actions.push(DashboardAction::Back);
    }
    ui.add_space(DesignSystem::SPACING_MEDIUM);

    ui.label(egui::RichText::new("Inputs").strong().size(16.0));
    ui.add_space(DesignSystem::SPACING_SMALL);

    let form = &mut vm.price_form;
    egui::Grid::new("price_inputs")
        .num_columns(2)
        .spacing([8.0, 8.0])
        .show(ui, |ui| {
            ui.label("Ticker");
            ui.text_edit_singleline(&mut form.ticker);
            ui.end_row();

            ui.label("Multiplier");
            ui.add(egui::DragValue::new(&mut form.multiplier).range(1..=1000));
            ui.end_row();

            ui.label("Timespan");
            egui::ComboBox::from_id_salt("timespan")
                .selected_text(form.timespan.to_string())
                .show_ui(ui, |ui| {
                    for timespan in Timespan::ALL {
                        ui.selectable_value(&mut form.timespan, timespan, timespan.to_string());
                    }
                });
            ui.end_row();

            ui.label("Start date");
            ui.text_edit_singleline(&mut form.start);
            ui.end_row();

            ui.label("End date");
            ui.text_edit_singleline(&mut form.end);
            ui.end_row();
        });

    if vm.source == DataSource::Yahoo {
        ui.label(
            egui::RichText::new("Yahoo Finance ignores the multiplier")
                .size(11.0)
                .color(DesignSystem::TEXT_MUTED),
        );
    }

    ui.add_space(DesignSystem::SPACING_MEDIUM);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!vm.price_loading, egui::Button::new("Fetch prices"))
            .clicked()
            && let Some(job) = vm.price_job(api_key)
        {
            actions.push(DashboardAction::Submit(job));
        }
        if ui
            .add_enabled(!vm.statements_loading, egui::Button::new("Fetch statements"))
            .clicked()
            && let Some(job) = vm.statements_job()
        {
            actions.push(DashboardAction::Submit(job));
        }
    });
}

/// The request is only built when the button is clicked
fn export_button(
    ui: &mut egui::Ui,
    label: &str,
    enabled: bool,
    request: impl FnOnce() -> Option<ExportRequest>,
    actions: &mut Vec<DashboardAction>,
) {
    if ui.add_enabled(enabled, egui::Button::new(label)).clicked()
        && let Some(request) = request()
    {
        actions.push(DashboardAction::Export(request));
    }
}

fn loading(ui: &mut egui::Ui, what: &str) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label(egui::RichText::new(format!("Loading {}...", what)).color(DesignSystem::TEXT_SECONDARY));
    });
}

fn render_stock_data(vm: &mut DashboardViewModel, ui: &mut egui::Ui, actions: &mut Vec<DashboardAction>) {
    if vm.price_loading {
        loading(ui, "price history");
    }

    let Some((request, outcome)) = &vm.price else {
        ui.label(
            egui::RichText::new("Choose a ticker and range, then fetch prices.")
                .italics()
                .color(DesignSystem::TEXT_MUTED),
        );
        return;
    };

    if render_error(ui, outcome.error.as_deref()) {
        return;
    }

    Card::new()
        .title(format!("{} close price", request.ticker))
        .subtitle(format!(
            "{} x {} bars, {} to {}",
            request.multiplier,
            request.timespan,
            request.range.from(),
            request.range.to()
        ))
        .show(ui, |ui| {
            let series = ChartViewModel::close_series(
                request.ticker.as_str(),
                &outcome.data,
                DesignSystem::ACCENT_PRIMARY,
            );
            render_line_chart(ui, "price_chart", vec![series]);
        });

    ui.add_space(DesignSystem::SPACING_MEDIUM);

    let table = &vm.price_table;
    Card::new().title("Price history").show(ui, |ui| {
        render_table(ui, "price_table", table, TABLE_HEIGHT, |_, _| None);
        render_row_count(ui, table);
    });

    ui.add_space(DesignSystem::SPACING_SMALL);
    export_button(
        ui,
        "Export price history",
        !table.is_empty(),
        || vm.price_export(),
        actions,
    );
}

fn render_statements(vm: &mut DashboardViewModel, ui: &mut egui::Ui, actions: &mut Vec<DashboardAction>) {
    if vm.statements_loading {
        loading(ui, "financial statements");
    }

    let Some((ticker, outcome)) = &vm.statements else {
        ui.label(
            egui::RichText::new("Fetch statements to see annual figures.")
                .italics()
                .color(DesignSystem::TEXT_MUTED),
        );
        return;
    };

    if render_error(ui, outcome.error.as_deref()) {
        return;
    }

    for kind in StatementKind::ALL {
        let statement = outcome.data.get(kind);
        Card::new()
            .title(format!("{} {}", ticker, kind.title()))
            .show(ui, |ui| {
                match vm.statement_table(kind) {
                    Some(table) if !statement.is_empty() => {
                        render_table(ui, kind.file_stem(), table, TABLE_HEIGHT, |_, _| None);
                    }
                    _ => {
                        ui.label(
                            egui::RichText::new("No data reported.")
                                .italics()
                                .color(DesignSystem::TEXT_MUTED),
                        );
                    }
                }
                ui.add_space(DesignSystem::SPACING_SMALL);
                export_button(
                    ui,
                    &format!("Export {}", kind.title()),
                    !statement.is_empty(),
                    || vm.statement_export(kind),
                    actions,
                );
            });
        ui.add_space(DesignSystem::SPACING_MEDIUM);
    }
}

fn render_analysis(vm: &mut DashboardViewModel, ui: &mut egui::Ui, actions: &mut Vec<DashboardAction>) {
    ui.horizontal(|ui| {
        if ui
            .selectable_label(vm.analysis_tab == AnalysisTab::Comparison, "Stock Comparison")
            .clicked()
        {
            vm.analysis_tab = AnalysisTab::Comparison;
        }
        if ui
            .selectable_label(vm.analysis_tab == AnalysisTab::GapAnalysis, "Gap Analysis")
            .clicked()
        {
            vm.analysis_tab = AnalysisTab::GapAnalysis;
        }
    });
    ui.add_space(DesignSystem::SPACING_SMALL);

    match vm.analysis_tab {
        AnalysisTab::Comparison => render_comparison(vm, ui, actions),
        AnalysisTab::GapAnalysis => render_gap_analysis(vm, ui, actions),
    }
}

fn date_inputs(ui: &mut egui::Ui, start: &mut String, end: &mut String) {
    ui.label("Start");
    ui.add(egui::TextEdit::singleline(start).desired_width(90.0));
    ui.label("End");
    ui.add(egui::TextEdit::singleline(end).desired_width(90.0));
}

fn render_comparison(vm: &mut DashboardViewModel, ui: &mut egui::Ui, actions: &mut Vec<DashboardAction>) {
    let form = &mut vm.comparison_form;
    ui.horizontal(|ui| {
        ui.label("Ticker 1");
        ui.add(egui::TextEdit::singleline(&mut form.first).desired_width(70.0));
        date_inputs(ui, &mut form.first_start, &mut form.first_end);
    });
    ui.horizontal(|ui| {
        ui.label("Ticker 2");
        ui.add(egui::TextEdit::singleline(&mut form.second).desired_width(70.0));
        date_inputs(ui, &mut form.second_start, &mut form.second_end);
    });
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!vm.comparison_loading, egui::Button::new("Compare"))
            .clicked()
            && let Some(job) = vm.comparison_job()
        {
            actions.push(DashboardAction::Submit(job));
        }
    });
    ui.add_space(DesignSystem::SPACING_MEDIUM);

    if vm.comparison_loading {
        loading(ui, "comparison");
    }
    let Some((first, second, outcome)) = &vm.comparison else {
        return;
    };
    if render_error(ui, outcome.error.as_deref()) {
        return;
    }

    ui.columns(2, |cols| {
        for (col, ticker, bars, color) in [
            (0, first, &outcome.data.first, DesignSystem::ACCENT_PRIMARY),
            (1, second, &outcome.data.second, DesignSystem::ACCENT_SECONDARY),
        ] {
            Card::new()
                .title(format!("{} close price", ticker))
                .show(&mut cols[col], |ui| {
                    let series = ChartViewModel::close_series(ticker.as_str(), bars, color);
                    render_line_chart(ui, &format!("comparison_chart_{}", col), vec![series]);
                });
        }
    });

    ui.add_space(DesignSystem::SPACING_MEDIUM);

    if let Some(summary) = &outcome.data.summary {
        let table = summary.to_table();
        Card::new().title("Comparison summary").show(ui, |ui| {
            render_table(ui, "comparison_table", &table, TABLE_HEIGHT, |_, _| None);
        });
        ui.add_space(DesignSystem::SPACING_SMALL);
        export_button(ui, "Export comparison", true, || vm.comparison_export(), actions);
    }
}

fn render_gap_analysis(vm: &mut DashboardViewModel, ui: &mut egui::Ui, actions: &mut Vec<DashboardAction>) {
    ui.horizontal(|ui| {
        let form = &mut vm.gap_form;
        ui.label("Ticker");
        ui.add(egui::TextEdit::singleline(&mut form.ticker).desired_width(70.0));
        date_inputs(ui, &mut form.start, &mut form.end);

        if ui
            .add_enabled(!vm.gap_loading, egui::Button::new("Analyze"))
            .clicked()
            && let Some(job) = vm.gap_job()
        {
            actions.push(DashboardAction::Submit(job));
        }
    });
    ui.add_space(DesignSystem::SPACING_MEDIUM);

    if vm.gap_loading {
        loading(ui, "gap analysis");
    }
    let Some((ticker, outcome)) = &vm.gap else {
        return;
    };
    if render_error(ui, outcome.error.as_deref()) {
        return;
    }
    let analysis = &outcome.data;

    if let Some(summary) = &analysis.summary {
        Card::new()
            .title(format!("{} highest weekly gap", ticker))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    render_metric(
                        ui,
                        "Week",
                        &format!("{} ({})", summary.week_number, summary.week.week.range_label()),
                        DesignSystem::TEXT_PRIMARY,
                    );
                    ui.add_space(DesignSystem::SPACING_LARGE);
                    render_metric(
                        ui,
                        "Gap %",
                        &GapKpi::label(summary.week.gap_percent),
                        DesignSystem::kpi_color(summary.week.kpi()),
                    );
                });
                ui.add_space(DesignSystem::SPACING_SMALL);
                render_table(ui, "gap_summary_table", &summary.to_table(), TABLE_HEIGHT, |_, _| None);
            });
        ui.add_space(DesignSystem::SPACING_MEDIUM);
    }

    let weekly = &vm.weekly_table;
    let kpi_column = weekly.column_index("Gap % with KPI");
    Card::new()
        .title("Weekly gaps")
        .subtitle("Gap is the close two weeks later minus this week's open")
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                for (kpi, meaning) in ChartViewModel::kpi_legend() {
                    ui.colored_label(
                        DesignSystem::kpi_color(kpi),
                        format!("{} {}", kpi.symbol(), meaning),
                    );
                }
            });
            render_table(ui, "weekly_gap_table", weekly, TABLE_HEIGHT, |row, col| {
                ChartViewModel::weekly_cell_color(&analysis.weeks, kpi_column, row, col)
            });
            render_row_count(ui, weekly);
        });
    ui.add_space(DesignSystem::SPACING_SMALL);
    export_button(
        ui,
        "Export gap analysis",
        !weekly.is_empty(),
        || vm.gap_export(),
        actions,
    );

    ui.add_space(DesignSystem::SPACING_MEDIUM);

    Card::new().title("Daily open and close").show(ui, |ui| {
        render_line_chart(ui, "daily_gap_chart", ChartViewModel::daily_gap_series(&analysis.daily));
        ui.add_space(DesignSystem::SPACING_SMALL);
        render_table(ui, "daily_gap_table", &vm.daily_table, TABLE_HEIGHT, |_, _| None);
        render_row_count(ui, &vm.daily_table);
    });
}
