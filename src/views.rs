//! Screens of the gallery application and which of them need a session.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    /// Public entry point; every forced logout lands here.
    Root,
    Login,
    Signup,
    Home,
    AddImage,
    ResetPassword,
}

impl View {
    pub const ALL: [View; 6] = [View::Root, View::Login, View::Signup, View::Home, View::AddImage, View::ResetPassword];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            View::Root => "/",
            View::Login => "/login",
            View::Signup => "/signup",
            View::Home => "/home",
            View::AddImage => "/add-image",
            View::ResetPassword => "/reset-password",
        }
    }

    #[must_use]
    pub fn is_protected(self) -> bool {
        matches!(self, View::Home | View::AddImage | View::ResetPassword)
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<View> {
        View::ALL.into_iter().find(|v| v.path() == path)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_set_is_home_add_image_reset() {
        let protected: Vec<View> = View::ALL.into_iter().filter(|v| v.is_protected()).collect();
        assert_eq!(protected, vec![View::Home, View::AddImage, View::ResetPassword]);
    }

    #[test]
    fn from_path_round_trips_every_view() {
        for view in View::ALL {
            assert_eq!(View::from_path(view.path()), Some(view));
        }
        assert_eq!(View::from_path("/nope"), None);
    }
}
