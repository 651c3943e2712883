// ui.rs - Input polling and grid painting for the egui front end

use std::time::{Duration, Instant};

use eframe::egui;
use egui::{Key, Pos2, Rect, Sense, Stroke, Vec2};
use tracing::{debug, info, warn};

use conway::{Cell, Command, Coord, Mode, PatternKey, Response, SessionError, TickOutcome};

use crate::GameOfLife;

fn egui_key(key: PatternKey) -> Key {
    match key {
        PatternKey::Num1 => Key::Num1,
        PatternKey::Num2 => Key::Num2,
        PatternKey::Num3 => Key::Num3,
        PatternKey::Num4 => Key::Num4,
        PatternKey::Num5 => Key::Num5,
        PatternKey::Num6 => Key::Num6,
        PatternKey::Num7 => Key::Num7,
        PatternKey::Num8 => Key::Num8,
        PatternKey::Num9 => Key::Num9,
        PatternKey::Num0 => Key::Num0,
    }
}

/// Grid coordinate under `pos` for a grid painted from `origin`.
pub fn cell_at(pos: Pos2, origin: Pos2, cell_size: f32) -> Coord {
    let offset = pos - origin;
    Coord::new(
        (offset.y / cell_size).floor() as isize,
        (offset.x / cell_size).floor() as isize,
    )
}

/// `alive_cells = [[r, c], ...]`, ready to paste into a pattern file.
pub fn format_alive_cells(cells: &[Coord]) -> String {
    let pairs: Vec<String> = cells
        .iter()
        .map(|at| format!("[{}, {}]", at.row, at.col))
        .collect();
    format!("alive_cells = [{}]", pairs.join(", "))
}

impl GameOfLife {
    /// Apply `command` to the session. Failures are logged, never fatal.
    fn dispatch(&mut self, command: Command) {
        match self.session.handle(command) {
            Ok(Response::Exported(cells)) => {
                println!("{}", format_alive_cells(&cells));
                info!(cells = cells.len(), "dumped alive cells");
            }
            Ok(Response::Mode(Mode::Running)) => self.last_update = Instant::now(),
            Ok(Response::Ticked(TickOutcome::Exhausted)) => {
                debug!("generation limit reached, load a pattern to run again");
            }
            Ok(Response::Reloaded { patterns }) => {
                info!(patterns, path = %self.pattern_file.display(), "reloaded pattern library");
            }
            Ok(_) => {}
            // Pointer drags repeat every frame; these are expected noise.
            Err(err @ (SessionError::EditWhileRunning | SessionError::OutOfBounds(_))) => {
                debug!(error = %err, "ignored edit");
            }
            Err(err) => warn!(error = %err, "ignored input"),
        }
    }

    fn poll_keys(&mut self, ctx: &egui::Context) {
        let mut commands = Vec::new();
        ctx.input(|input| {
            if input.key_pressed(Key::Space) {
                commands.push(Command::TogglePause);
            }
            for key in PatternKey::ALL {
                if input.key_pressed(egui_key(key)) {
                    commands.push(Command::LoadSlot(key));
                }
            }
            if input.key_pressed(Key::C) {
                commands.push(Command::Clear);
            }
            if input.key_pressed(Key::P) {
                commands.push(Command::ExportAliveCells);
            }
            if input.key_pressed(Key::R) {
                commands.push(Command::ReloadPatterns(self.pattern_file.clone()));
            }
        });
        for command in commands {
            self.dispatch(command);
        }
    }

    /// Primary button paints cells alive, secondary paints them dead.
    fn poll_pointer(&mut self, ctx: &egui::Context, grid_rect: Rect) {
        if self.session.is_running() {
            return;
        }
        let (pos, primary, secondary) = ctx.input(|input| {
            (
                input.pointer.hover_pos(),
                input.pointer.primary_down(),
                input.pointer.secondary_down(),
            )
        });
        let cell = match (primary, secondary) {
            (true, _) => Cell::Alive,
            (false, true) => Cell::Dead,
            (false, false) => return,
        };
        let Some(pos) = pos.filter(|pos| grid_rect.contains(*pos)) else {
            return;
        };
        let at = cell_at(pos, grid_rect.min, self.cell_size);
        self.dispatch(Command::EditCell { at, cell });
    }

    fn draw_grid(&self, ui: &mut egui::Ui) -> Rect {
        let grid = self.session.grid();
        let size = Vec2::new(
            grid.width() as f32 * self.cell_size,
            grid.height() as f32 * self.cell_size,
        );
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let origin = response.rect.min;

        painter.rect_filled(response.rect, 0.0, self.background);

        for (row, cells) in grid.rows().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let rect = Rect::from_min_size(
                    origin + Vec2::new(col as f32 * self.cell_size, row as f32 * self.cell_size),
                    Vec2::splat(self.cell_size),
                );
                if cell.is_alive() {
                    painter.rect_filled(rect, 0.0, self.live_color);
                } else {
                    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, self.dead_color));
                }
            }
        }

        response.rect
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let button_text = if self.session.is_running() { "⏸ Pause" } else { "▶ Start" };
            if ui.button(button_text).clicked() {
                self.dispatch(Command::TogglePause);
            }
            if ui.button("⏹ Clear").clicked() {
                self.dispatch(Command::Clear);
            }
            if ui.button("Dump cells").clicked() {
                self.dispatch(Command::ExportAliveCells);
            }
            if ui.button("Reload patterns").clicked() {
                self.dispatch(Command::ReloadPatterns(self.pattern_file.clone()));
            }

            ui.separator();

            // Pattern dropdown
            ui.label("Pattern:");
            egui::ComboBox::from_id_source("pattern_selector")
                .selected_text(self.selected_pattern.as_str())
                .show_ui(ui, |ui| {
                    for name in self.session.catalog().names() {
                        ui.selectable_value(&mut self.selected_pattern, name.to_owned(), name);
                    }
                });
            if ui.button("Apply Pattern").clicked() {
                self.dispatch(Command::LoadPattern(self.selected_pattern.clone()));
            }
        });

        ui.horizontal(|ui| {
            ui.label("Speed:");
            let mut speed = 1.0 / self.update_interval.as_secs_f32();
            if ui
                .add(egui::Slider::new(&mut speed, 0.5..=90.0).suffix(" gen/sec"))
                .changed()
            {
                self.update_interval = Duration::from_secs_f32(1.0 / speed);
            }

            ui.separator();

            ui.label("Live:");
            ui.color_edit_button_srgba(&mut self.live_color);
            ui.label("Dead:");
            ui.color_edit_button_srgba(&mut self.dead_color);
        });

        let legend: Vec<String> = self
            .session
            .bindings()
            .iter()
            .map(|(key, name)| format!("{key} {name}"))
            .collect();
        ui.label(format!(
            "Space start/pause · C clear · P dump · R reload · {}",
            legend.join(" · ")
        ));
    }

    fn status(&self, ui: &mut egui::Ui) {
        let grid = self.session.grid();
        let total = (grid.width() * grid.height()).max(1);
        let live = self.session.population();
        let remaining = match self.session.remaining() {
            Some(count) => count.to_string(),
            None => "∞".to_string(),
        };
        let mode = match self.session.mode() {
            Mode::Running => "Running",
            Mode::Editing => "Editing",
        };

        ui.horizontal(|ui| {
            ui.label(mode);
            ui.label(format!("Generation: {}", self.session.generation()));
            ui.label(format!("Remaining: {remaining}"));
            ui.label(format!("Live cells: {live}"));
            ui.label(format!("Population: {:.1}%", live as f32 / total as f32 * 100.0));
        });
    }
}

impl eframe::App for GameOfLife {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_keys(ctx);

        // Auto-update if running
        if self.session.is_running() && self.last_update.elapsed() >= self.update_interval {
            self.dispatch(Command::Tick);
            self.last_update = Instant::now();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.controls(ui);
            ui.separator();

            let grid_rect = self.draw_grid(ui);
            self.poll_pointer(ctx, grid_rect);

            ui.separator();
            self.status(ui);
        });

        // Keep ticking without waiting for input
        if self.session.is_running() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn pointer_maps_to_cells() {
        let origin = Pos2::new(8.0, 100.0);
        assert_eq!(cell_at(Pos2::new(8.0, 100.0), origin, 10.0), Coord::new(0, 0));
        assert_eq!(cell_at(Pos2::new(17.9, 109.9), origin, 10.0), Coord::new(0, 0));
        assert_eq!(cell_at(Pos2::new(18.0, 125.0), origin, 10.0), Coord::new(2, 1));
        assert_eq!(cell_at(Pos2::new(2.0, 95.0), origin, 10.0), Coord::new(-1, -1));
    }

    #[test]
    fn dump_is_pasteable_toml() {
        assert_eq!(format_alive_cells(&[]), "alive_cells = []");
        assert_eq!(
            format_alive_cells(&[Coord::new(24, 25), Coord::new(25, 25)]),
            "alive_cells = [[24, 25], [25, 25]]"
        );
    }

    #[test]
    fn every_slot_has_its_own_key() {
        let keys: HashSet<Key> = PatternKey::ALL.into_iter().map(egui_key).collect();
        assert_eq!(keys.len(), PatternKey::ALL.len());
        assert_eq!(egui_key(PatternKey::Num0), Key::Num0);
    }
}
