// services/console-dash/src/app.rs
//
// Terminal event loop: keyboard input, view changes and a slow tick all
// trigger a redraw from the latest DashboardView.
//

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::prelude::*;
use tracing::{debug, info};

use crate::components::{self, MapModel};
use crate::dashboard::Dashboard;

const TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    CycleOrigin,
    CycleDestination,
    CycleMode,
    Compute,
    RefreshEvents,
    CycleTypeFilter,
    CycleSeverityFilter,
}

pub fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('o') => Some(Action::CycleOrigin),
        KeyCode::Char('d') => Some(Action::CycleDestination),
        KeyCode::Char('m') => Some(Action::CycleMode),
        KeyCode::Char('c') | KeyCode::Enter => Some(Action::Compute),
        KeyCode::Char('r') => Some(Action::RefreshEvents),
        KeyCode::Char('t') => Some(Action::CycleTypeFilter),
        KeyCode::Char('s') => Some(Action::CycleSeverityFilter),
        _ => None,
    }
}

/// Apply one action. Returns false when the app should exit.
pub fn dispatch(dashboard: &Dashboard, action: Action) -> bool {
    debug!("Action: {:?}", action);
    match action {
        Action::Quit => return false,
        Action::CycleOrigin => dashboard.cycle_origin(),
        Action::CycleDestination => dashboard.cycle_destination(),
        Action::CycleMode => dashboard.cycle_mode(),
        Action::Compute => {
            // The button is disabled while a computation is running.
            if dashboard.can_compute() {
                let dashboard = dashboard.clone();
                tokio::spawn(async move {
                    dashboard.compute_route().await;
                });
            }
        }
        Action::RefreshEvents => {
            dashboard.events().refresh();
        }
        Action::CycleTypeFilter => dashboard.events().cycle_type_filter(),
        Action::CycleSeverityFilter => dashboard.events().cycle_severity_filter(),
    }
    true
}

pub async fn run<B: Backend>(terminal: &mut Terminal<B>, dashboard: Dashboard, demo_mode: bool) -> Result<()> {
    let mut views = dashboard.subscribe();
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    let mut map = MapModel::default();

    let mount = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { dashboard.mount().await })
    };

    let result = loop {
        let view = views.borrow_and_update().clone();
        if map.sync(&view.locations, view.route.as_ref()) {
            debug!("Map geometry rebuilt (revision {})", map.revision());
        }
        if let Err(e) = terminal.draw(|frame| components::draw(frame, &view, &map, demo_mode)) {
            break Err(e.into());
        }

        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => {
                    if let Some(action) = action_for(key) {
                        if !dispatch(&dashboard, action) {
                            break Ok(());
                        }
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(e.into()),
                None => break Ok(()),
            },
            changed = views.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
            }
            _ = tick.tick() => {}
        }
    };

    mount.abort();
    dashboard.unmount();
    info!("Console closed");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(action_for(press(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(action_for(press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(action_for(press(KeyCode::Enter)), Some(Action::Compute));
        assert_eq!(action_for(press(KeyCode::Char('c'))), Some(Action::Compute));
        assert_eq!(action_for(press(KeyCode::Char('s'))), Some(Action::CycleSeverityFilter));
        assert_eq!(action_for(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_release_events_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(action_for(release), None);
    }
}
