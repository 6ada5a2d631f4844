use std::rc::Rc;

use anyhow::{Context, Result};
use veil_engine::logging::{LoggingConfig, init_logging};
use veil_engine::window::{WindowConfig, WinitBackend};
use veil_ui::prelude::*;

const SWATCHES: [(&str, Color); 4] = [
    ("Night", Color::rgb(16, 16, 32)),
    ("Forest", Color::rgb(16, 48, 24)),
    ("Rust", Color::rgb(96, 40, 16)),
    ("Slate", Color::rgb(48, 56, 64)),
];

fn swatch(name: &str) -> Color {
    SWATCHES.iter().find(|(n, _)| *n == name).map_or(Color::BLACK, |(_, c)| *c)
}

fn button_at(y: f64) -> Layout {
    Layout::new((0.05, y), (0.25, 0.08))
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let backend = WinitBackend::new(WindowConfig { title: "Veil demo".to_string(), ..WindowConfig::default() })
        .context("opening the demo window")?;
    let mut ui = Ui::new(backend);

    let root = ui.add_focus_dialog(None, Layout::fill())?;
    ui.make_top(root)?;
    ui.tree_mut().set_decoration(root, Some(Decoration::new(SWATCHES[0].1)))?;

    let name = Rc::new(TextField::new(&mut ui, root, Layout::new((0.35, 0.05), (0.4, 0.08)))?);
    name.set_text(&mut ui, "untitled")?;

    // ── Dialogs ───────────────────────────────────────────────────────────

    let about = MessageDialog::new(&mut ui, Some(root), "Veil: retained widgets and modal dialogs.")?;
    let rename = TextEntryDialog::new(&mut ui, Some(root), "New name:")?;
    let quit = YesNoDialog::new(&mut ui, Some(root), "Really quit?")?;
    let picker = ChoiceDialog::new(
        &mut ui,
        Some(root),
        SWATCHES.iter().map(|(n, _)| n.to_string()).collect(),
        |ui, pane, key| {
            let sample = ui.add_widget(pane, Layout::new((-0.1, -0.1), (-0.8, -0.3)))?;
            ui.tree_mut()
                .set_decoration(sample, Some(Decoration::new(swatch(key)).borders(Borders::all())))?;
            Ok(())
        },
    )?;

    // ── Buttons ───────────────────────────────────────────────────────────

    Button::builder("About")
        .layout(button_at(0.05))
        .hotkey('a')
        .build(&mut ui, root, move |ui| {
            ui.call_dialog(&about, Some(root))?;
            Ok(HandlerResult::Handled)
        })?;

    {
        let name = name.clone();
        Button::builder("Rename")
            .layout(button_at(0.2))
            .hotkey('r')
            .build(&mut ui, root, move |ui| {
                rename.set_default_text(name.text());
                if let DialogOutcome::Value(ExitValue::Text(text)) = ui.call_dialog(&rename, Some(root))? {
                    if !text.is_empty() {
                        log::info!("renamed to {text:?}");
                        name.set_text(ui, text)?;
                    }
                }
                Ok(HandlerResult::Handled)
            })?;
    }

    Button::builder("Colour")
        .layout(button_at(0.35))
        .hotkey('c')
        .build(&mut ui, root, move |ui| {
            if let DialogOutcome::Value(ExitValue::Index(i)) = ui.call_dialog(&picker, Some(root))? {
                if let Some((label, color)) = SWATCHES.get(i) {
                    log::info!("background set to {label}");
                    ui.tree_mut().set_decoration(root, Some(Decoration::new(*color)))?;
                }
            }
            Ok(HandlerResult::Handled)
        })?;

    Button::builder("Quit")
        .layout(button_at(0.5))
        .hotkey('q')
        .build(&mut ui, root, move |ui| match ui.call_dialog(&quit, Some(root))? {
            DialogOutcome::Value(ExitValue::Bool(true)) => Ok(HandlerResult::ExitEmpty),
            _ => Ok(HandlerResult::Handled),
        })?;

    // ── Heartbeat ─────────────────────────────────────────────────────────

    let beat = ui.add_widget(root, Layout::new((-0.97, -0.97), (0.02, 0.02)).anchor(Anchor::BOTTOM_RIGHT))?;
    ui.tree_mut().set_decoration(beat, Some(Decoration::new(Color::WHITE)))?;
    let mut frames = 0u32;
    ui.add_handler(root, Category::Tick, move |ui, _| {
        frames = frames.wrapping_add(1);
        if frames % 15 == 0 {
            let visible = ui.tree().is_visible(beat)?;
            ui.tree_mut().set_visible(beat, !visible)?;
        }
        Ok(HandlerResult::Continue)
    })?;

    let outcome = ui.show(root).context("running the main dialog")?;
    log::info!("demo finished: {outcome:?}");
    Ok(())
}
