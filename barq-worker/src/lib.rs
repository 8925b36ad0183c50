//! # Barq Worker Library
//!
//! Background jobs for the Barq system:
//!
//! - `overdue`: hourly overdue-task scan with per-day notification dedup
//! - `reminders`: minute-interval calendar reminder dispatch

pub mod overdue;
pub mod reminders;
