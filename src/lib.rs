// UdaciRacer client - race lifecycle orchestration for the UdaciRacer server

pub mod client;
pub mod core;

pub use crate::client::{Config, HttpRaceService};
pub use crate::core::{
    event_channel, InputEventRouter, LifecycleEvent, RaceLifecycleController, SessionStore,
    UiEvent,
};
