//! The creator page: form, vCard display and downloads wired together.
//!
//! ```text
//! CreatorEvent ──► Creator::handle_event ──► CreatorState ──► views
//!                        │
//!                        └──► Vec<CreatorCommand> (scroll, focus, dialog, timers, links)
//! ```
//!
//! One `Creator` serves both page modes; see [`modes`].

mod event;
pub mod modes;
mod state;

pub use event::{CreatorCommand, CreatorEvent, SubmitOutcome};
pub use modes::{ContactPageCreator, CreatorMode, QrCodeCreator};
pub use state::{
    CreatorState, DisplayView, FormView, PhoneRowView, ResetConfirmation, ScrollTarget,
    VCARD_DISPLAY_ID, VCARD_EDITOR_ID,
};

use crate::artifacts::DownloadBridge;
use crate::config::AppConfig;
use crate::error::{RenderError, Result};
use crate::render::QrRenderer;
use contact_form::{ArtifactTracker, ContactForm, ContactSnapshot, FormError};

pub struct Creator<R> {
    mode: CreatorMode,
    state: CreatorState,
    bridge: DownloadBridge<R>,
    config: AppConfig,
}

#[cfg(feature = "render")]
impl Creator<crate::render::QrCodeRenderer> {
    /// Creator backed by the shipped QR renderer.
    pub fn with_default_renderer(mode: CreatorMode, config: AppConfig) -> Self {
        Self::new(mode, crate::render::QrCodeRenderer::new(), config)
    }
}

impl<R: QrRenderer> Creator<R> {
    pub fn new(mode: CreatorMode, renderer: R, config: AppConfig) -> Self {
        let state = CreatorState::new(config.validation_mode, config.transient_error_ms);
        let bridge = DownloadBridge::new(renderer, config.qr.clone());
        Self {
            mode,
            state,
            bridge,
            config,
        }
    }

    // =========================================================================
    // EVENT HANDLING
    // =========================================================================

    /// Apply one event and return the side effects the host must perform.
    pub fn handle_event(&mut self, event: CreatorEvent) -> Result<Vec<CreatorCommand>> {
        tracing::debug!(mode = %self.mode, ?event, "creator event");
        match event {
            CreatorEvent::SetFirstName(value) => {
                self.state.form.set_first_name(value);
                self.state.revalidate();
                Ok(Vec::new())
            }
            CreatorEvent::SetLastName(value) => {
                self.state.form.set_last_name(value);
                self.state.revalidate();
                Ok(Vec::new())
            }
            CreatorEvent::InsertPhone { index } => {
                let inserted = self.state.form.insert_default(index)?;
                self.state.revalidate();
                let target = ScrollTarget::PhoneEntry(inserted.index);
                self.state.scroll_target = Some(target);
                Ok(vec![
                    CreatorCommand::ScrollTo(target),
                    CreatorCommand::FocusPhoneEntry {
                        index: inserted.index,
                    },
                ])
            }
            CreatorEvent::RemovePhone { index } => {
                if self.state.form.remove(index).is_some() {
                    self.state.revalidate();
                }
                Ok(Vec::new())
            }
            CreatorEvent::UpdatePhone { index, patch } => {
                self.state.form.update(index, &patch)?;
                self.state.revalidate();
                Ok(Vec::new())
            }
            CreatorEvent::Submit => Ok(match self.submit()? {
                SubmitOutcome::Accepted { links, .. } => {
                    let mut commands = vec![CreatorCommand::ScrollTo(ScrollTarget::VCardDisplay)];
                    commands.extend(links.map(CreatorCommand::ArtifactsUpdated));
                    commands
                }
                SubmitOutcome::Rejected(errors) => {
                    vec![CreatorCommand::ShowValidationErrors(errors)]
                }
                SubmitOutcome::RenderFailed(err) => vec![CreatorCommand::ShowRenderError(err)],
            }),
            CreatorEvent::Reset => {
                if self.config.confirm_reset && self.state.tracker.submitted().is_some() {
                    let confirmation = ResetConfirmation::default();
                    self.state.reset_confirmation = Some(confirmation.clone());
                    return Ok(vec![CreatorCommand::ShowResetConfirmation(confirmation)]);
                }
                Ok(self.reset())
            }
            CreatorEvent::ConfirmReset => {
                if self.state.reset_confirmation.take().is_none() {
                    tracing::warn!("reset confirmed without an open confirmation");
                    return Ok(Vec::new());
                }
                Ok(self.reset())
            }
            CreatorEvent::CancelReset => {
                self.state.reset_confirmation = None;
                Ok(Vec::new())
            }
            CreatorEvent::OpenVCardEditor => {
                if self.state.tracker.submitted().is_none() {
                    tracing::debug!("no vcard to edit yet");
                    return Ok(Vec::new());
                }
                self.state.editor_open = true;
                self.state.scroll_target = Some(ScrollTarget::VCardEditor);
                Ok(vec![CreatorCommand::ScrollTo(ScrollTarget::VCardEditor)])
            }
            CreatorEvent::CloseVCardEditor => {
                self.state.editor_open = false;
                Ok(Vec::new())
            }
            CreatorEvent::EditVCard(text) => {
                let previous = self.state.tracker.clone();
                if !self.state.tracker.edit_vcard(&text) {
                    return Ok(Vec::new());
                }
                Ok(match self.refresh_artifacts(previous) {
                    Ok(command) => vec![command],
                    Err(err) => vec![CreatorCommand::ShowRenderError(err)],
                })
            }
            CreatorEvent::ResetVCard => {
                if !self.state.tracker.is_edited() {
                    return Ok(Vec::new());
                }
                let previous = self.state.tracker.clone();
                self.state.tracker.reset_to_original();
                Ok(match self.refresh_artifacts(previous) {
                    Ok(command) => vec![command],
                    Err(err) => vec![CreatorCommand::ShowRenderError(err)],
                })
            }
            CreatorEvent::PhoneInputError {
                index,
                message,
                now_ms,
            } => {
                let id = self
                    .state
                    .form
                    .id_at(index)
                    .ok_or(FormError::IndexOutOfBounds {
                        index,
                        len: self.state.form.len(),
                    })?;
                let ticket = self.state.phone_errors.report(id, message, now_ms);
                Ok(vec![CreatorCommand::ScheduleTimer { id, ticket }])
            }
            CreatorEvent::PhoneErrorExpired { id, ticket } => {
                if !self.state.phone_errors.fire(id, ticket) {
                    tracing::debug!(%id, generation = ticket.generation, "stale phone error timer");
                }
                Ok(Vec::new())
            }
            CreatorEvent::Tick { now_ms } => {
                self.state.phone_errors.poll(now_ms);
                Ok(Vec::new())
            }
        }
    }

    /// Validate the live form and, if it passes and renders, make it the
    /// displayed truth. A render failure leaves the previous submission and
    /// its links in place.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        self.state.submit_attempted = true;
        self.state.revalidate();
        if self.state.errors.blocks_submit() {
            tracing::warn!(errors = self.state.errors.len(), "submit rejected");
            return Ok(SubmitOutcome::Rejected(self.state.errors.clone()));
        }

        let snapshot = self.state.form.snapshot();
        let previous = self.state.tracker.clone();
        self.state.tracker.record_submission(snapshot.clone());
        let links = match self.refresh_artifacts(previous) {
            Ok(CreatorCommand::ArtifactsUpdated(links)) => Some(links),
            Ok(_) => None,
            Err(err) => return Ok(SubmitOutcome::RenderFailed(err)),
        };
        self.state.scroll_target = Some(ScrollTarget::VCardDisplay);
        tracing::info!(
            mode = %self.mode,
            phones = snapshot.phone.len(),
            "contact submitted"
        );
        Ok(SubmitOutcome::Accepted { snapshot, links })
    }

    /// Replace the live form with `snapshot` (e.g. loaded from a file).
    pub fn fill(&mut self, snapshot: &ContactSnapshot) {
        self.state.form = ContactForm::from_snapshot(snapshot);
        self.state.revalidate();
    }

    fn reset(&mut self) -> Vec<CreatorCommand> {
        self.state.reset();
        self.bridge.clear();
        tracing::debug!(mode = %self.mode, "creator reset");
        vec![
            CreatorCommand::ArtifactsCleared,
            CreatorCommand::ScrollTo(ScrollTarget::Top),
        ]
    }

    /// Re-render the tracker's vCard. On failure the tracker is rolled back
    /// to `previous`; the bridge keeps its current links.
    fn refresh_artifacts(
        &mut self,
        previous: ArtifactTracker,
    ) -> std::result::Result<CreatorCommand, RenderError> {
        match self.bridge.refresh(self.state.tracker.vcard()) {
            Ok(Some(links)) => Ok(CreatorCommand::ArtifactsUpdated(links.clone())),
            Ok(None) => Ok(CreatorCommand::ArtifactsCleared),
            Err(err) => {
                tracing::warn!(mode = %self.mode, error = %err, "qr render failed, keeping previous vcard");
                self.state.tracker = previous;
                Err(err)
            }
        }
    }

    // =========================================================================
    // READ SURFACE
    // =========================================================================

    pub fn form_view(&self) -> FormView {
        self.state.form_view()
    }

    pub fn display_view(&self) -> DisplayView {
        self.state.display_view(self.bridge.links())
    }

    /// Pending scroll request, cleared once taken.
    pub fn take_scroll_target(&mut self) -> Option<ScrollTarget> {
        self.state.scroll_target.take()
    }

    pub fn state(&self) -> &CreatorState {
        &self.state
    }

    pub fn bridge(&self) -> &DownloadBridge<R> {
        &self.bridge
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn mode(&self) -> CreatorMode {
        self.mode
    }

    pub fn heading(&self) -> &'static str {
        self.mode.heading()
    }
}

impl<R> std::fmt::Debug for Creator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Creator")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("bridge", &self.bridge)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::tests::{EchoRenderer, FailingRenderer};
    use crate::render::{QrOptions, RenderedImage};
    use contact_form::{FieldPath, Notice, PhoneEntryPatch, SubmitLabel};

    fn creator() -> Creator<EchoRenderer> {
        Creator::new(CreatorMode::QrCode, EchoRenderer::default(), AppConfig::default())
    }

    fn named(creator: &mut Creator<EchoRenderer>) {
        creator
            .handle_event(CreatorEvent::SetFirstName("Jaana".into()))
            .unwrap();
        creator
            .handle_event(CreatorEvent::SetLastName("Tikkanen".into()))
            .unwrap();
    }

    #[test]
    fn test_insert_requests_scroll_and_focus() {
        let mut creator = creator();
        let commands = creator
            .handle_event(CreatorEvent::InsertPhone { index: 1 })
            .unwrap();
        assert_eq!(
            commands,
            vec![
                CreatorCommand::ScrollTo(ScrollTarget::PhoneEntry(1)),
                CreatorCommand::FocusPhoneEntry { index: 1 },
            ]
        );
        assert_eq!(creator.form_view().phones.len(), 2);
        assert!(creator.form_view().phones[0].show_preferred);
    }

    #[test]
    fn test_insert_out_of_bounds_is_error() {
        let mut creator = creator();
        let err = creator
            .handle_event(CreatorEvent::InsertPhone { index: 5 })
            .unwrap_err();
        assert_eq!(err.code(), FormError::IndexOutOfBounds { index: 5, len: 1 }.code());
    }

    #[test]
    fn test_remove_last_row_is_noop() {
        let mut creator = creator();
        let commands = creator
            .handle_event(CreatorEvent::RemovePhone { index: 0 })
            .unwrap();
        assert!(commands.is_empty());
        assert_eq!(creator.state().form.len(), 1);
    }

    #[test]
    fn test_rejected_submit_leaves_artifacts() {
        let mut creator = creator();
        let commands = creator.handle_event(CreatorEvent::Submit).unwrap();
        match &commands[..] {
            [CreatorCommand::ShowValidationErrors(errors)] => {
                assert!(errors.contains(FieldPath::FirstName));
                assert!(errors.contains(FieldPath::LastName));
            }
            other => panic!("unexpected commands: {other:?}"),
        }
        assert!(creator.state().tracker.submitted().is_none());
        assert_eq!(creator.bridge().live_url_count(), 0);
    }

    #[test]
    fn test_accepted_submit_scrolls_and_links() {
        let mut creator = creator();
        named(&mut creator);
        let commands = creator.handle_event(CreatorEvent::Submit).unwrap();
        assert_eq!(commands[0], CreatorCommand::ScrollTo(ScrollTarget::VCardDisplay));
        assert!(matches!(commands[1], CreatorCommand::ArtifactsUpdated(_)));
        assert_eq!(creator.form_view().submit_label, SubmitLabel::Update);
        assert_eq!(creator.take_scroll_target(), Some(ScrollTarget::VCardDisplay));
        assert_eq!(creator.take_scroll_target(), None);
    }

    #[test]
    fn test_reset_without_artifact_skips_confirmation() {
        let mut creator = creator();
        named(&mut creator);
        let commands = creator.handle_event(CreatorEvent::Reset).unwrap();
        assert_eq!(
            commands,
            vec![
                CreatorCommand::ArtifactsCleared,
                CreatorCommand::ScrollTo(ScrollTarget::Top),
            ]
        );
        assert_eq!(creator.state().form.first_name(), "");
    }

    #[test]
    fn test_update_phone_out_of_bounds() {
        let mut creator = creator();
        let result = creator.handle_event(CreatorEvent::UpdatePhone {
            index: 3,
            patch: PhoneEntryPatch::new().number("1"),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_open_editor_requires_artifact() {
        let mut creator = creator();
        assert!(creator
            .handle_event(CreatorEvent::OpenVCardEditor)
            .unwrap()
            .is_empty());
        assert!(!creator.display_view().editor_open);

        named(&mut creator);
        creator.handle_event(CreatorEvent::Submit).unwrap();
        let commands = creator.handle_event(CreatorEvent::OpenVCardEditor).unwrap();
        assert_eq!(commands, vec![CreatorCommand::ScrollTo(ScrollTarget::VCardEditor)]);
        assert!(creator.display_view().editor_open);
    }

    /// Echoes content up to `max_len` bytes, like a QR code with a fixed capacity.
    struct CapacityRenderer {
        max_len: usize,
    }

    impl CapacityRenderer {
        fn check(&self, content: &str) -> std::result::Result<(), RenderError> {
            if content.len() > self.max_len {
                return Err(RenderError::Encode("data too long".into()));
            }
            Ok(())
        }
    }

    impl QrRenderer for CapacityRenderer {
        fn render_vector(&self, content: &str, options: &QrOptions) -> std::result::Result<RenderedImage, RenderError> {
            self.check(content)?;
            EchoRenderer::default().render_vector(content, options)
        }

        fn render_bitmap(&self, content: &str, options: &QrOptions) -> std::result::Result<RenderedImage, RenderError> {
            self.check(content)?;
            EchoRenderer::default().render_bitmap(content, options)
        }
    }

    fn capacity_creator() -> Creator<CapacityRenderer> {
        Creator::new(
            CreatorMode::QrCode,
            CapacityRenderer { max_len: 200 },
            AppConfig::default(),
        )
    }

    fn set_names<R: QrRenderer>(creator: &mut Creator<R>, first: &str, last: &str) {
        creator
            .handle_event(CreatorEvent::SetFirstName(first.into()))
            .unwrap();
        creator
            .handle_event(CreatorEvent::SetLastName(last.into()))
            .unwrap();
    }

    #[test]
    fn test_render_failure_on_first_submit_commits_nothing() {
        let mut creator = Creator::new(CreatorMode::QrCode, FailingRenderer, AppConfig::default());
        set_names(&mut creator, "Jaana", "Tikkanen");

        let commands = creator.handle_event(CreatorEvent::Submit).unwrap();
        let [CreatorCommand::ShowRenderError(err)] = commands.as_slice() else {
            panic!("expected a render error, got {commands:?}");
        };
        assert_eq!(err, &RenderError::Encode("data too long".into()));
        assert!(creator.state().tracker.submitted().is_none());
        assert_eq!(creator.form_view().submit_label, SubmitLabel::Create);
        assert_eq!(creator.display_view().vcard, "");
        assert_eq!(creator.take_scroll_target(), None);
        assert_eq!(creator.bridge().live_url_count(), 0);
    }

    #[test]
    fn test_render_failure_keeps_previous_submission() {
        let mut creator = capacity_creator();
        set_names(&mut creator, "Jaana", "Tikkanen");
        assert!(creator.submit().unwrap().is_accepted());
        let before = creator.display_view();
        let links = before.links.clone().unwrap();

        set_names(&mut creator, &"a".repeat(300), "Tikkanen");
        let outcome = creator.submit().unwrap();
        assert!(matches!(outcome, SubmitOutcome::RenderFailed(RenderError::Encode(_))));

        let after = creator.display_view();
        assert_eq!(after.vcard, before.vcard);
        assert_eq!(after.links, Some(links.clone()));
        assert_eq!(after.notice, Some(Notice::FormDrift));
        assert_eq!(creator.bridge().live_url_count(), 3);
        assert_eq!(
            creator.bridge().artifact(&links.vcard.url).unwrap().bytes,
            before.vcard.as_bytes()
        );
    }

    #[test]
    fn test_render_failure_rolls_back_manual_edit() {
        let mut creator = capacity_creator();
        set_names(&mut creator, "Jaana", "Tikkanen");
        creator.submit().unwrap();
        let original = creator.display_view().vcard;

        let commands = creator
            .handle_event(CreatorEvent::EditVCard("x".repeat(300)))
            .unwrap();
        assert!(matches!(commands.as_slice(), [CreatorCommand::ShowRenderError(_)]));
        assert!(!creator.state().tracker.is_edited());
        assert_eq!(creator.display_view().vcard, original);
        assert_eq!(creator.bridge().live_url_count(), 3);
    }

    #[test]
    fn test_emptied_vcard_still_confirms_reset_and_opens_editor() {
        let mut creator = creator();
        named(&mut creator);
        creator.handle_event(CreatorEvent::Submit).unwrap();

        let commands = creator
            .handle_event(CreatorEvent::EditVCard(String::new()))
            .unwrap();
        assert_eq!(commands, vec![CreatorCommand::ArtifactsCleared]);
        assert!(!creator.state().tracker.has_artifact());

        let commands = creator.handle_event(CreatorEvent::OpenVCardEditor).unwrap();
        assert_eq!(commands, vec![CreatorCommand::ScrollTo(ScrollTarget::VCardEditor)]);

        let commands = creator.handle_event(CreatorEvent::Reset).unwrap();
        assert!(matches!(
            commands.as_slice(),
            [CreatorCommand::ShowResetConfirmation(_)]
        ));
        assert_eq!(creator.state().form.first_name(), "Jaana");
    }

    #[test]
    fn test_phone_input_error_schedules_timer() {
        let mut creator = creator();
        let commands = creator
            .handle_event(CreatorEvent::PhoneInputError {
                index: 0,
                message: "Invalid number".into(),
                now_ms: 100,
            })
            .unwrap();
        let [CreatorCommand::ScheduleTimer { id, ticket }] = commands.as_slice() else {
            panic!("expected a timer, got {commands:?}");
        };
        let (id, ticket) = (*id, *ticket);
        assert_eq!(ticket.deadline_ms, 3_100);
        assert_eq!(
            creator.form_view().phones[0].transient_error.as_deref(),
            Some("Invalid number")
        );

        creator
            .handle_event(CreatorEvent::PhoneErrorExpired { id, ticket })
            .unwrap();
        assert_eq!(creator.form_view().phones[0].transient_error, None);
    }
}
