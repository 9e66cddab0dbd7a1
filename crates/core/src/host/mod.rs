use crate::{ControlState, DisplayText};

pub const STATUS_WAITING: &str = "Waiting for file...";
pub const STATUS_LOADING: &str = "Loading...";

/// The page or window hosting the player controls.
///
/// All calls happen on the session's thread and must take effect before the
/// session handles its next event.
pub trait HostSurface {
    fn set_controls(&mut self, controls: ControlState);

    /// Shows the status overlay with `text`, or hides it when `None`.
    fn set_status(&mut self, text: Option<&str>);

    fn set_track_text(&mut self, text: &DisplayText);

    /// Resets the file picker so the same file can be chosen again.
    fn clear_file_selection(&mut self);
}

impl<H: HostSurface + ?Sized> HostSurface for &mut H {
    fn set_controls(&mut self, controls: ControlState) {
        (**self).set_controls(controls);
    }

    fn set_status(&mut self, text: Option<&str>) {
        (**self).set_status(text);
    }

    fn set_track_text(&mut self, text: &DisplayText) {
        (**self).set_track_text(text);
    }

    fn clear_file_selection(&mut self) {
        (**self).clear_file_selection();
    }
}
