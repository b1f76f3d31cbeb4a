// Screen capture module
// Provides the frame source the locator polls, with an xcap-backed desktop
// implementation and a trait seam for synthetic frames.

pub mod types;
pub mod xcap_screen;

pub use types::{Frame, ScreenSource};
pub use xcap_screen::XcapScreen;
