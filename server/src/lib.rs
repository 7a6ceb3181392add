pub mod api {
    pub mod dashboard;
    pub mod donation;
    pub mod event;
}
pub mod async_interceptor;
pub mod config;
pub mod convert {
    pub mod donation;
    pub mod event;
    pub mod from;
    pub mod into;
}
pub mod extract;
pub mod gateway;
pub mod interceptors {
    pub mod authn;
}
pub mod money;
pub mod routes;
pub mod services {
    pub mod dashboard;
    pub mod donation;
    pub mod event;
}
pub mod share;
pub mod side_effect;
pub mod signature;
pub mod validation;
