mod relay_service;

pub use relay_service::{RelayDependencies, RelayService, ARRIVAL_TEXT, DEPARTURE_TEXT};
