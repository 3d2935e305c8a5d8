//! Today's birthday run.
//!
//! Picks out today's celebrants, chooses a greeting for each one,
//! and hands the rendered text to a [`MessageSender`](crate::telegram::MessageSender).

mod runner;
mod selector;

pub use runner::{Celebrant, Delivery, FailedDelivery, RunError, RunReport, congratulate, run};
pub use selector::{celebrants_on, pick_template};
