pub mod activities;
pub mod availability;
pub mod players;
pub mod web_session;

pub use activities::ActivityRow;
pub use availability::AvailabilityRow;
pub use players::PlayerRow;
pub use web_session::WebSessionRow;
