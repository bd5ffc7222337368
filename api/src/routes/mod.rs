pub mod health;
pub mod hedera;
pub mod portfolio;
pub mod reminders;
