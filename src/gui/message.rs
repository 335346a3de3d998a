use crate::gui::{
    screens::{
        ScreenMessage, dashboard::DashboardScreen, landing_page::LandingPageScreen,
        loading_page::LoadingPageScreen, login_page::LoginPageScreen, settings::SettingsScreen,
        valuation::ValuationScreen,
    },
    state::LoadedState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Landing,
    Login,
    Dashboard,
    Settings,
    Valuation,
}

#[derive(Debug, Clone)]
pub enum Message {
    Loaded(Result<LoadedState, String>),
    Navigate(Destination),
    Logout,
    Persisted(Result<(), String>),
    LoadingPage(ScreenMessage<LoadingPageScreen>),
    LandingPage(ScreenMessage<LandingPageScreen>),
    LoginPage(ScreenMessage<LoginPageScreen>),
    Dashboard(ScreenMessage<DashboardScreen>),
    Settings(ScreenMessage<SettingsScreen>),
    Valuation(ScreenMessage<ValuationScreen>),
}
