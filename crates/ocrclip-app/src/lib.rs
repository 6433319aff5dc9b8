pub mod cli;
pub mod controller;
pub mod dispatcher;
pub mod events;
pub mod io;
pub mod logging;
pub mod preflight;
pub mod state;
pub mod status;
pub mod worker;

#[cfg(test)]
mod tests;
