//! Input actions and their effect on the app state.

use tracing::warn;

use super::{App, AppView, StatusMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    ToggleHelp,
    SelectNext,
    SelectPrevious,
    RequestTerminate,
    ConfirmTerminate,
    Dismiss,
}

impl App {
    /// Apply an action. Returns false when the app should exit.
    pub fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::None => {}
            Action::Quit => return false,
            Action::ToggleHelp => {
                self.view = if self.view == AppView::Help {
                    AppView::Main
                } else {
                    AppView::Help
                };
            }
            Action::SelectNext => self.select_next(),
            Action::SelectPrevious => self.select_previous(),
            Action::RequestTerminate => {
                if let Some(process) = self.selected_process().cloned() {
                    self.pending_terminate = Some(process);
                    self.view = AppView::ConfirmTerminate;
                }
            }
            Action::ConfirmTerminate => {
                if let Some(process) = self.pending_terminate.take() {
                    match self.processes.terminate(process.pid) {
                        Ok(()) => {
                            self.status_message = Some(StatusMessage {
                                text: format!(
                                    "Sent terminate to {} ({})",
                                    process.name, process.pid
                                ),
                                is_error: false,
                            });
                        }
                        Err(err) => {
                            warn!(pid = process.pid, %err, "terminate failed");
                            self.status_message = Some(StatusMessage {
                                text: err.to_string(),
                                is_error: true,
                            });
                        }
                    }
                }
                self.view = AppView::Main;
            }
            Action::Dismiss => {
                self.pending_terminate = None;
                self.status_message = None;
                self.view = AppView::Main;
            }
        }

        true
    }
}
