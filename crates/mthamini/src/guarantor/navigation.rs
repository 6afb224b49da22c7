use std::fmt;

/// Route of a wizard step, e.g. `/vehicle`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WizardRoute(String);

impl WizardRoute {
    pub fn new(route: impl Into<String>) -> Self {
        Self(route.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WizardRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Neighbouring steps of the guarantor step in the onboarding wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardRoutes {
    pub previous: WizardRoute,
    pub next: WizardRoute,
}

impl Default for WizardRoutes {
    fn default() -> Self {
        Self {
            previous: WizardRoute::new("/personal"),
            next: WizardRoute::new("/vehicle"),
        }
    }
}

/// Navigation collaborator owned by the surrounding wizard.
pub trait WizardNavigator {
    fn navigate_to(&self, route: &WizardRoute);
}
